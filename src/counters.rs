//! Telemetry counters.
//!
//! These track gross execution volume, not correctness-sensitive state, so
//! they use `Relaxed` ordering throughout: a torn read across counters
//! (e.g. `instructions` and `decode_events` sampled a few nanoseconds
//! apart) is an acceptable approximation for a once-a-second telemetry
//! line, never something the core's own logic branches on.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live, incrementing counters. Owned by [`crate::cpu::Cpu`]; formatting a
/// telemetry line out of them is the host's job, not this crate's.
#[derive(Debug, Default)]
pub struct Counters {
    instructions: AtomicU64,
    decode_events: AtomicU64,
    slow_mmu_translations: AtomicU64,
}

impl Counters {
    /// All counters start at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incr_instructions(&self) {
        self.instructions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_decode_events(&self) {
        self.decode_events.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_slow_mmu_translations(&self) {
        self.slow_mmu_translations.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot every counter's current value.
    #[must_use]
    pub fn sample(&self) -> TelemetrySample {
        TelemetrySample {
            instructions: self.instructions.load(Ordering::Relaxed),
            decode_events: self.decode_events.load(Ordering::Relaxed),
            slow_mmu_translations: self.slow_mmu_translations.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of [`Counters`], and the helper for turning two
/// snapshots into a delta (e.g. for a once-per-second telemetry line).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TelemetrySample {
    pub instructions: u64,
    pub decode_events: u64,
    pub slow_mmu_translations: u64,
}

impl TelemetrySample {
    /// The change in each counter since `earlier`. Uses wrapping
    /// subtraction, since a `u64` instruction counter wrapping mid-run is
    /// an multi-century edge case, not one worth a branch for.
    #[must_use]
    pub fn delta_since(&self, earlier: &TelemetrySample) -> TelemetrySample {
        TelemetrySample {
            instructions: self.instructions.wrapping_sub(earlier.instructions),
            decode_events: self.decode_events.wrapping_sub(earlier.decode_events),
            slow_mmu_translations: self.slow_mmu_translations.wrapping_sub(earlier.slow_mmu_translations),
        }
    }
}
