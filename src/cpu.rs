//! The CPU core itself (C5): ties the register file, exception driver,
//! coprocessor bank, identity, and telemetry together behind one value.

use std::sync::Arc;

use tracing::error;

use crate::condition::{Condition, ConditionTable};
use crate::coprocessor::{Coprocessor, CoprocessorBank};
use crate::counters::{Counters, TelemetrySample};
use crate::cpsr::{Cpsr, Spsr};
use crate::error::CpuError;
use crate::exception::{self, ExceptionKind};
use crate::host::HostEnvironment;
use crate::identity::{self, CpuIdentity};
use crate::mode::Mode;
use crate::pending::{CpuSignals, DATA_ABT_BIT, PREFETCH_ABT_BIT, RESET_BIT, SWI_BIT, UNDEFINED_BIT};
use crate::registers::RegisterFile;

/// A snapshot of every architectural register, taken for diagnostics.
/// Produced by [`Cpu::dump_cpu`] and logged in full by [`Cpu::panic_cpu`].
#[derive(Debug, Clone)]
pub struct CpuDump {
    pub gpr: [u32; 16],
    pub cpsr: Cpsr,
    pub spsr: Spsr,
    pub mode: Option<Mode>,
    /// Instructions retired so far, per [`Counters`].
    pub instructions: u64,
}

/// The CPU core.
///
/// Owned by whichever thread runs the execution loop; nothing here is
/// `Sync`. Other threads (devices, an MMU, a decoder) interact with it
/// exclusively through the [`CpuSignals`] handle handed back by
/// [`Cpu::initialize_cpu`].
#[derive(Debug)]
pub struct Cpu {
    registers: RegisterFile,
    signals: CpuSignals,
    condition_table: ConditionTable,
    coprocessors: CoprocessorBank,
    counters: Counters,
    identity: CpuIdentity,
    host: Arc<dyn HostEnvironment>,
}

impl Cpu {
    /// Build a fresh core of the named type (see [`identity::lookup`] for
    /// recognized names), together with the signal handle other threads
    /// will use to raise exceptions into it.
    #[must_use]
    pub fn initialize_cpu(type_name: &str, host: Arc<dyn HostEnvironment>) -> (Self, CpuSignals) {
        let identity = identity::lookup(type_name);
        let signals = CpuSignals::new();
        let cpu = Self {
            registers: RegisterFile::new(),
            signals: signals.clone(),
            condition_table: ConditionTable::new(),
            coprocessors: CoprocessorBank::new(),
            counters: Counters::new(),
            identity,
            host,
        };
        (cpu, signals)
    }

    /// A clone of the signal handle this core listens on.
    #[must_use]
    pub fn signals(&self) -> CpuSignals {
        self.signals.clone()
    }

    /// This core's resolved identity (ISA generation, `CP15`/MMU presence).
    #[must_use]
    pub fn identity(&self) -> CpuIdentity {
        self.identity
    }

    /// Hard-reset every architectural register to its power-on state and
    /// drop the coprocessor dispatch cache. Unlike taking the `Reset`
    /// exception through [`Cpu::process_pending_exceptions`], this does
    /// not go through vectored entry — it's the state a reset exception's
    /// handling collapses back to once entry completes, and is also
    /// exposed directly for callers that want to reset without going
    /// through the pending-exception machinery at all.
    pub fn reset_cpu(&mut self) {
        self.registers = RegisterFile::new();
        self.coprocessors.invalidate_cache();
        self.signals.shared().clear_latched(RESET_BIT | UNDEFINED_BIT | SWI_BIT | PREFETCH_ABT_BIT | DATA_ABT_BIT);
    }

    /// Service the highest-priority pending exception, if any.
    ///
    /// Invalidates the coprocessor dispatch cache on every architectural
    /// transition this causes, and collapses a serviced `Reset` straight
    /// through to [`Cpu::reset_cpu`], since reset entry discards state
    /// rather than merely saving and switching it.
    pub fn process_pending_exceptions(&mut self) -> Option<ExceptionKind> {
        let kind = exception::process_pending_exceptions(&mut self.registers, &self.signals)?;
        self.coprocessors.invalidate_cache();
        if kind == ExceptionKind::Reset {
            self.reset_cpu();
        }
        Some(kind)
    }

    /// Run the core's execution loop on a host-provided thread, calling
    /// `step` once per cycle after servicing any pending exception, until
    /// `cycle_limit` cycles have run (or forever, if `None`). This crate
    /// has no instruction decoder of its own; `step` is supplied by the
    /// caller and is where fetch/decode/execute for a real ISA would live.
    pub fn start_cpu(mut self, cycle_limit: Option<u64>, mut step: impl FnMut(&mut Cpu) + Send + 'static) {
        let host = Arc::clone(&self.host);
        host.spawn(Box::new(move || {
            let mut cycles = 0u64;
            loop {
                if let Some(limit) = cycle_limit {
                    if cycles >= limit {
                        break;
                    }
                }
                self.process_pending_exceptions();
                step(&mut self);
                self.counters.incr_instructions();
                cycles += 1;
            }
            self.host.request_quit(0);
        }));
    }

    /// Install a coprocessor implementation at `index`.
    ///
    /// # Errors
    /// Returns [`CpuError::BadCoprocessorNumber`] if `index >= 16`.
    pub fn install_coprocessor(&mut self, index: u8, coprocessor: Box<dyn Coprocessor>) -> Result<(), CpuError> {
        self.coprocessors.install(index, coprocessor)
    }

    /// Borrow the coprocessor installed at `index`.
    #[must_use]
    pub fn coprocessor(&self, index: u8) -> Option<&dyn Coprocessor> {
        self.coprocessors.get(index)
    }

    /// Mutably borrow the coprocessor installed at `index`.
    #[must_use]
    pub fn coprocessor_mut(&mut self, index: u8) -> Option<&mut (dyn Coprocessor + 'static)> {
        self.coprocessors.get_mut(index)
    }

    /// Read general register `index` (0..=15).
    #[must_use]
    pub fn get_reg(&self, index: u8) -> u32 {
        self.registers.get_reg(index)
    }

    /// Write general register `index` (0..=15).
    pub fn put_reg(&mut self, index: u8, value: u32) {
        self.registers.put_reg(index, value);
    }

    /// CPSR, in full.
    #[must_use]
    pub fn cpsr(&self) -> Cpsr {
        self.registers.cpsr()
    }

    /// Write CPSR, masked, banking registers if the mode field changes.
    pub fn write_cpsr_masked(&mut self, value: Cpsr, mask: u32) {
        self.registers.write_cpsr_masked(value, mask);
        self.coprocessors.invalidate_cache();
    }

    /// Switch the live mode directly.
    ///
    /// # Errors
    /// Returns [`CpuError::UnknownMode`] if `mode_bits` is not one of the
    /// seven architectural mode encodings.
    pub fn set_cpu_mode(&mut self, mode_bits: u8) -> Result<(), CpuError> {
        let mode = Mode::from_bits(mode_bits).ok_or(CpuError::UnknownMode(mode_bits))?;
        self.registers.switch_mode(mode);
        self.coprocessors.invalidate_cache();
        Ok(())
    }

    /// The NZCV condition flags, packed as a `0..=15` index.
    #[must_use]
    pub fn get_condition(&self) -> u8 {
        self.registers.cpsr().nzcv_index()
    }

    /// Overwrite the NZCV condition flags from a `0..=15` index.
    pub fn set_condition(&mut self, nzcv: u8) {
        let cpsr = self.registers.cpsr().with_nzcv_index(nzcv);
        self.registers.set_cpsr(cpsr);
    }

    /// Whether `cond` passes under the live condition flags.
    #[must_use]
    pub fn evaluate_condition(&self, cond: Condition) -> bool {
        self.condition_table.passes(self.get_condition(), cond)
    }

    /// A point-in-time telemetry sample.
    #[must_use]
    pub fn telemetry(&self) -> TelemetrySample {
        self.counters.sample()
    }

    /// Snapshot every architectural register, plus the instruction count.
    #[must_use]
    pub fn dump_cpu(&self) -> CpuDump {
        let mut gpr = [0u32; 16];
        for (index, slot) in gpr.iter_mut().enumerate() {
            *slot = self.registers.get_reg(index as u8);
        }
        CpuDump {
            gpr,
            cpsr: self.registers.cpsr(),
            spsr: self.registers.read_spsr(),
            mode: self.registers.cpsr().mode(),
            instructions: self.counters.sample().instructions,
        }
    }

    /// Log a full register dump at `error` level and ask the host to end
    /// the process. For an internal invariant violation the core itself
    /// can't recover from; callers that can recover from a problem should
    /// be getting a `CpuError` back instead of reaching for this.
    pub fn panic_cpu(&self, reason: &str) {
        let dump = self.dump_cpu();
        error!(reason, ?dump, "cpu core panicked");
        self.host.request_quit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::test_support::RecordingHostEnvironment;

    fn test_cpu(type_name: &str) -> (Cpu, CpuSignals, RecordingHostEnvironment) {
        let host = RecordingHostEnvironment::default();
        let (cpu, signals) = Cpu::initialize_cpu(type_name, Arc::new(host.clone()));
        (cpu, signals, host)
    }

    #[test]
    fn unknown_type_name_falls_back_but_still_initializes() {
        let (cpu, _signals, _host) = test_cpu("totally-bogus");
        assert_eq!(cpu.identity().isa, identity::Isa::V4);
    }

    #[test]
    fn install_coprocessor_rejects_out_of_range_index() {
        let (mut cpu, _signals, _host) = test_cpu("arm9");
        #[derive(Debug)]
        struct Noop;
        impl Coprocessor for Noop {
            fn read(&self, _crn: u8, _opcode: u8, _crm: u8) -> u32 {
                0
            }
            fn write(&mut self, _crn: u8, _opcode: u8, _crm: u8, _value: u32) {}
        }
        assert_eq!(cpu.install_coprocessor(16, Box::new(Noop)), Err(CpuError::BadCoprocessorNumber(16)));
        assert!(cpu.install_coprocessor(0, Box::new(Noop)).is_ok());
    }

    #[test]
    fn external_signal_drives_exception_entry_without_touching_cpu_directly() {
        let (mut cpu, signals, _host) = test_cpu("arm9");
        cpu.put_reg(15, 0x8000);
        signals.signal_swi();
        let kind = cpu.process_pending_exceptions();
        assert_eq!(kind, Some(ExceptionKind::Swi));
        assert_eq!(cpu.get_reg(14), 0x8004);
        assert_eq!(cpu.get_reg(15), 0x08);
    }

    #[test]
    fn reset_exception_collapses_to_a_full_reset() {
        let (mut cpu, signals, _host) = test_cpu("arm9");
        cpu.put_reg(3, 0xDEAD_BEEF);
        signals.signal_reset();
        let kind = cpu.process_pending_exceptions();
        assert_eq!(kind, Some(ExceptionKind::Reset));
        assert_eq!(cpu.get_reg(3), 0);
    }

    #[test]
    fn set_cpu_mode_rejects_reserved_encodings() {
        let (mut cpu, _signals, _host) = test_cpu("arm9");
        assert_eq!(cpu.set_cpu_mode(0b0_0000), Err(CpuError::UnknownMode(0)));
        assert!(cpu.set_cpu_mode(Mode::Fiq.bits()).is_ok());
    }

    #[test]
    fn start_cpu_runs_exactly_cycle_limit_steps_then_quits() {
        let (cpu, _signals, host) = test_cpu("arm9");
        let steps = Arc::new(std::sync::atomic::AtomicU64::new(0));
        let counted = Arc::clone(&steps);
        cpu.start_cpu(Some(5), move |_cpu| {
            counted.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        });
        assert_eq!(steps.load(std::sync::atomic::Ordering::Relaxed), 5);
        assert_eq!(*host.quit_requests.lock().unwrap(), vec![0]);
    }

    #[test]
    fn panic_cpu_requests_quit_with_a_nonzero_code() {
        let (cpu, _signals, host) = test_cpu("arm9");
        cpu.panic_cpu("invariant violated in a test");
        assert_eq!(*host.quit_requests.lock().unwrap(), vec![1]);
    }
}
