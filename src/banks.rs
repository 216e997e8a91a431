//! Per-mode banked register storage.

use crate::cpsr::Spsr;
use crate::mode::{Bank, BANK_COUNT};

/// The registers a single bank holds while its mode is not the active one.
///
/// Every bank stores r13 (stack pointer), r14 (link register), and SPSR.
/// The FIQ bank additionally privately banks r8..r12, which the ARM
/// architecture reserves to FIQ alone; other banks leave that field unused.
/// This is a deliberate extension beyond the source program, which the
/// specification calls out as a known limitation worth closing (see
/// `DESIGN.md`).
#[derive(Debug, Clone, Copy, Default)]
pub struct BankSlot {
    /// Banked r13 (stack pointer by convention).
    pub r13: u32,
    /// Banked r14 (link register).
    pub r14: u32,
    /// Banked SPSR. Meaningless for the `UsrSys` bank.
    pub spsr: Spsr,
    /// FIQ-private r8..r12; `None` for every non-FIQ bank.
    pub fiq_r8_r12: Option<[u32; 5]>,
}

impl BankSlot {
    const fn new() -> Self {
        Self {
            r13: 0,
            r14: 0,
            spsr: Spsr::new_with_raw_value(0),
            fiq_r8_r12: None,
        }
    }
}

/// The six banked-register slots, indexed by [`Bank::index`].
#[derive(Debug, Clone, Copy)]
pub struct BankedRegisters {
    slots: [BankSlot; BANK_COUNT],
}

impl BankedRegisters {
    /// Construct all banks zeroed, with the FIQ bank's private r8..r12
    /// initialized to zero (present, not absent).
    #[must_use]
    pub fn new() -> Self {
        let mut slots = [BankSlot::new(); BANK_COUNT];
        slots[Bank::Fiq.index()].fiq_r8_r12 = Some([0; 5]);
        Self { slots }
    }

    /// Read-only access to a bank's slot.
    #[must_use]
    pub fn get(&self, bank: Bank) -> &BankSlot {
        &self.slots[bank.index()]
    }

    /// Mutable access to a bank's slot.
    pub fn get_mut(&mut self, bank: Bank) -> &mut BankSlot {
        &mut self.slots[bank.index()]
    }
}

impl Default for BankedRegisters {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fiq_bank_starts_with_private_registers_present() {
        let banks = BankedRegisters::new();
        assert!(banks.get(Bank::Fiq).fiq_r8_r12.is_some());
        assert!(banks.get(Bank::Svc).fiq_r8_r12.is_none());
    }
}
