//! The cross-thread pending-exception signal (C4).
//!
//! Any thread holding a [`CpuSignals`] handle — a device model, an MMU, a
//! decoder — can raise an exception without touching the [`crate::cpu::Cpu`]
//! value itself, which stays owned by the execution thread. Raising a bit
//! uses `Release` ordering; the execution loop polls with `Acquire`, so any
//! writes a signalling thread made before raising the bit (e.g. writing a
//! fault address) are visible once the bit is observed set.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tracing::trace;

/// Bit positions within the pending-exception bitmap. Priority order is
/// handled separately in [`crate::exception`]; this only needs stable,
/// distinct bits.
pub(crate) const RESET_BIT: u32 = 1 << 0;
pub(crate) const UNDEFINED_BIT: u32 = 1 << 1;
pub(crate) const SWI_BIT: u32 = 1 << 2;
pub(crate) const PREFETCH_ABT_BIT: u32 = 1 << 3;
pub(crate) const DATA_ABT_BIT: u32 = 1 << 4;
pub(crate) const FIQ_BIT: u32 = 1 << 5;
pub(crate) const IRQ_BIT: u32 = 1 << 6;

/// The shared pending-exception bitmap plus the fault addresses that go
/// with the two abort kinds.
#[derive(Debug, Default)]
pub(crate) struct PendingExceptions {
    bits: AtomicU32,
    prefetch_abort_addr: AtomicU32,
    data_abort_addr: AtomicU32,
}

impl PendingExceptions {
    fn raise(&self, bit: u32) {
        self.bits.fetch_or(bit, Ordering::Release);
    }

    fn lower(&self, bit: u32) {
        self.bits.fetch_and(!bit, Ordering::Release);
    }

    /// The current bitmap, as seen from the polling (execution) thread.
    pub(crate) fn snapshot(&self) -> u32 {
        self.bits.load(Ordering::Acquire)
    }

    /// Clear a one-shot (edge-triggered) bit after it has been taken.
    /// IRQ/FIQ are level-triggered and are never cleared this way; they
    /// only go low when the raising source lowers them.
    pub(crate) fn clear_latched(&self, bit: u32) {
        self.bits.fetch_and(!bit, Ordering::AcqRel);
    }

    pub(crate) fn prefetch_abort_addr(&self) -> u32 {
        self.prefetch_abort_addr.load(Ordering::Acquire)
    }

    pub(crate) fn data_abort_addr(&self) -> u32 {
        self.data_abort_addr.load(Ordering::Acquire)
    }
}

/// A cheaply cloneable handle that lets any thread raise or lower pending
/// exceptions on behalf of a [`crate::cpu::Cpu`] it does not own.
///
/// `Clone + Send + Sync` falls out of wrapping an `Arc` of nothing but
/// atomics; no unsafe impls are needed.
#[derive(Debug, Clone, Default)]
pub struct CpuSignals {
    inner: Arc<PendingExceptions>,
}

impl CpuSignals {
    /// Construct a fresh handle with nothing pending.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn shared(&self) -> &PendingExceptions {
        &self.inner
    }

    /// Assert the IRQ line. Level-triggered: stays pending until
    /// [`CpuSignals::lower_irq`] is called, independent of how many times
    /// the core has already serviced it.
    pub fn raise_irq(&self) {
        trace!("IRQ asserted");
        self.inner.raise(IRQ_BIT);
    }

    /// Deassert the IRQ line.
    pub fn lower_irq(&self) {
        trace!("IRQ deasserted");
        self.inner.lower(IRQ_BIT);
    }

    /// Assert the FIQ line.
    pub fn raise_fiq(&self) {
        trace!("FIQ asserted");
        self.inner.raise(FIQ_BIT);
    }

    /// Deassert the FIQ line.
    pub fn lower_fiq(&self) {
        trace!("FIQ deasserted");
        self.inner.lower(FIQ_BIT);
    }

    /// Latch an undefined-instruction exception.
    pub fn signal_undefined(&self) {
        trace!("undefined instruction signalled");
        self.inner.raise(UNDEFINED_BIT);
    }

    /// Latch a software-interrupt (`SWI`) exception.
    pub fn signal_swi(&self) {
        trace!("SWI signalled");
        self.inner.raise(SWI_BIT);
    }

    /// Latch a prefetch abort at instruction address `addr`.
    pub fn signal_prefetch_abort(&self, addr: u32) {
        trace!(addr, "prefetch abort signalled");
        self.inner.prefetch_abort_addr.store(addr, Ordering::Release);
        self.inner.raise(PREFETCH_ABT_BIT);
    }

    /// Latch a data abort for the access at address `addr`.
    pub fn signal_data_abort(&self, addr: u32) {
        trace!(addr, "data abort signalled");
        self.inner.data_abort_addr.store(addr, Ordering::Release);
        self.inner.raise(DATA_ABT_BIT);
    }

    /// Latch a reset request.
    pub fn signal_reset(&self) {
        trace!("reset signalled");
        self.inner.raise(RESET_BIT);
    }
}
