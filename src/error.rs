//! Caller-recoverable error conditions.
//!
//! These are the mistakes a caller can correct and retry from: installing
//! a coprocessor at a bad slot, or asking to switch into a mode that isn't
//! one of the seven architectural modes. Internal invariant violations
//! (state the core itself should never produce) go through
//! [`crate::cpu::Cpu::panic_cpu`] instead, since there is no caller action
//! that could fix those.

use thiserror::Error;

/// Errors a caller of the public API can hit and recover from.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CpuError {
    /// `install_coprocessor` was given a slot outside `0..16`.
    #[error("coprocessor number {0} is out of range 0..16")]
    BadCoprocessorNumber(u8),

    /// A caller asked to switch into a mode encoding that isn't one of the
    /// seven architectural modes. Note this is distinct from a CPSR write
    /// that happens to carry a reserved mode field — that case is handled
    /// as "no bank" per the switch-mode contract, not as an error.
    #[error("{0:#04x} is not one of the seven architectural mode encodings")]
    UnknownMode(u8),
}
