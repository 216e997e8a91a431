//! The coprocessor slot array.
//!
//! Real ARMv4/v5 cores expose up to 16 coprocessor interfaces (`CP0`..
//! `CP15`), addressed by the `CDP`/`MCR`/`MRC`/`LDC`/`STC` instruction
//! family. This crate doesn't decode those instructions, but it does model
//! the slot array and dispatch a caller-supplied coprocessor implementation
//! by number, the way the decoder would.

use std::fmt;

use crate::error::CpuError;

const SLOT_COUNT: usize = 16;

/// A coprocessor implementation installable into a slot.
///
/// Kept as a plain trait object rather than a generic so `Cpu` can hold a
/// heterogeneous mix of coprocessors (an MMU in `CP15`, something else in
/// `CP14`) behind one array type.
pub trait Coprocessor: fmt::Debug {
    /// Read register `crn`/`opcode`/`crm` (the fields an `MRC` instruction
    /// would carry).
    fn read(&self, crn: u8, opcode: u8, crm: u8) -> u32;

    /// Write register `crn`/`opcode`/`crm` (the fields an `MCR` instruction
    /// would carry).
    fn write(&mut self, crn: u8, opcode: u8, crm: u8, value: u32);
}

/// The 16-slot coprocessor array, plus the decoder's one-entry dispatch
/// cache (`curr_cp`, see [`CoprocessorBank::cached`]).
#[derive(Debug, Default)]
pub struct CoprocessorBank {
    slots: [Option<Box<dyn Coprocessor>>; SLOT_COUNT],
    /// Caches which slot last handled a coprocessor instruction, so a
    /// decoder can skip the dispatch on a run of instructions targeting
    /// the same coprocessor. Invalidated on any mode-changing transition;
    /// see `Cpu::switch_mode` and `Cpu::process_pending_exceptions`.
    cached: Option<u8>,
}

impl CoprocessorBank {
    /// An empty bank with no coprocessors installed.
    #[must_use]
    pub fn new() -> Self {
        Self { slots: Default::default(), cached: None }
    }

    /// Install `coprocessor` at `index`.
    ///
    /// # Errors
    /// Returns [`CpuError::BadCoprocessorNumber`] if `index >= 16`.
    pub fn install(&mut self, index: u8, coprocessor: Box<dyn Coprocessor>) -> Result<(), CpuError> {
        let slot = self.slots.get_mut(index as usize).ok_or(CpuError::BadCoprocessorNumber(index))?;
        *slot = Some(coprocessor);
        Ok(())
    }

    /// Borrow the coprocessor installed at `index`, if any and if `index`
    /// is in range.
    #[must_use]
    pub fn get(&self, index: u8) -> Option<&dyn Coprocessor> {
        self.slots.get(index as usize)?.as_deref()
    }

    /// Mutably borrow the coprocessor installed at `index`.
    #[must_use]
    pub fn get_mut(&mut self, index: u8) -> Option<&mut (dyn Coprocessor + 'static)> {
        self.slots.get_mut(index as usize)?.as_deref_mut()
    }

    /// The slot a decoder last dispatched to, if the cache hasn't been
    /// invalidated since.
    #[must_use]
    pub fn cached(&self) -> Option<u8> {
        self.cached
    }

    /// Remember `index` as the last-dispatched slot.
    pub fn set_cached(&mut self, index: u8) {
        self.cached = Some(index);
    }

    /// Drop the dispatch cache. Called on every architectural mode change.
    pub fn invalidate_cache(&mut self) {
        self.cached = None;
    }
}
