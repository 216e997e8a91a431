//! Exception priority, entry, and the pending-exception driver (C3).

use crate::mode::Mode;
use crate::pending::{CpuSignals, DATA_ABT_BIT, FIQ_BIT, IRQ_BIT, PREFETCH_ABT_BIT, RESET_BIT, SWI_BIT, UNDEFINED_BIT};
use crate::registers::{RegisterFile, LR};

/// The seven exception kinds the core recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionKind {
    Reset,
    Undefined,
    Swi,
    PrefetchAbort,
    DataAbort,
    Fiq,
    Irq,
}

/// How far past the live PC the return address lands for a given kind.
#[derive(Clone, Copy)]
enum LrOffset {
    /// A fixed offset, independent of Thumb state: `+4` for prefetch
    /// abort/IRQ/FIQ, `+8` for data abort (ARM-state pipeline adjustment;
    /// this crate doesn't model Thumb fetch, so the same offset covers
    /// both documented ARM/Thumb cases for aborts).
    Fixed(u32),
    /// `pc + (T ? 2 : 4)`: the "next instruction" offset used by
    /// `UNDEFINED` and `SWI`.
    ThumbAware,
}

struct Entry {
    kind: ExceptionKind,
    bit: u32,
    vector: u32,
    mode: Mode,
    lr_offset: LrOffset,
    /// Whether entry additionally sets the FIQ mask. Only `Reset` and `Fiq`
    /// do; every other kind leaves F as the interrupted context left it.
    mask_f: bool,
}

/// One row per exception kind, in architectural priority order (highest
/// first): `Reset` > `Undefined` > `Swi` > `PrefetchAbort` > `DataAbort` >
/// `Fiq` > `Irq`. Representing priority as array order, rather than as a
/// chain of `if`s, keeps the driver a single loop.
const ENTRIES: [Entry; 7] = [
    Entry { kind: ExceptionKind::Reset, bit: RESET_BIT, vector: 0x00, mode: Mode::Svc, lr_offset: LrOffset::Fixed(0), mask_f: true },
    Entry { kind: ExceptionKind::Undefined, bit: UNDEFINED_BIT, vector: 0x04, mode: Mode::Und, lr_offset: LrOffset::ThumbAware, mask_f: false },
    Entry { kind: ExceptionKind::Swi, bit: SWI_BIT, vector: 0x08, mode: Mode::Svc, lr_offset: LrOffset::ThumbAware, mask_f: false },
    Entry { kind: ExceptionKind::PrefetchAbort, bit: PREFETCH_ABT_BIT, vector: 0x0C, mode: Mode::Abt, lr_offset: LrOffset::Fixed(4), mask_f: false },
    Entry { kind: ExceptionKind::DataAbort, bit: DATA_ABT_BIT, vector: 0x10, mode: Mode::Abt, lr_offset: LrOffset::Fixed(8), mask_f: false },
    Entry { kind: ExceptionKind::Fiq, bit: FIQ_BIT, vector: 0x1C, mode: Mode::Fiq, lr_offset: LrOffset::Fixed(4), mask_f: true },
    Entry { kind: ExceptionKind::Irq, bit: IRQ_BIT, vector: 0x18, mode: Mode::Irq, lr_offset: LrOffset::Fixed(4), mask_f: false },
];

/// Perform architectural exception entry for `entry`: save CPSR into the
/// new mode's SPSR, switch mode, mask interrupts, clear Thumb state, set
/// the link register to the return address computed from the live PC (the
/// fault address a raiser passed to `signal_prefetch_abort`/
/// `signal_data_abort` is informational only — see `SPEC_FULL.md` §9), and
/// branch to the vector.
fn enter(regs: &mut RegisterFile, entry: &Entry) {
    let saved_cpsr = regs.cpsr();
    let return_pc = match entry.lr_offset {
        LrOffset::Fixed(offset) => regs.pc().wrapping_add(offset),
        LrOffset::ThumbAware => regs.pc().wrapping_add(if saved_cpsr.t() { 2 } else { 4 }),
    };

    regs.switch_mode(entry.mode);
    regs.write_spsr(saved_cpsr);
    regs.put_reg(LR, return_pc);

    let mut new_cpsr = saved_cpsr.with_mode(entry.mode).with_i(true).with_t(false);
    if entry.mask_f {
        new_cpsr = new_cpsr.with_f(true);
    }
    regs.set_cpsr(new_cpsr);
    regs.set_pc(entry.vector);
}

/// Check for, and service, the highest-priority pending exception.
///
/// Returns the kind entered, or `None` if nothing was pending (or the only
/// pending lines were masked IRQ/FIQ). Callers are responsible for
/// invalidating any cached coprocessor-dispatch state on a `Some` return;
/// see [`crate::cpu::Cpu::process_pending_exceptions`].
pub fn process_pending_exceptions(regs: &mut RegisterFile, signals: &CpuSignals) -> Option<ExceptionKind> {
    let shared = signals.shared();
    let snapshot = shared.snapshot();

    if snapshot & RESET_BIT != 0 {
        // A pending reset supersedes any latched (one-shot) exception, and
        // (like every other kind) clears its own bit on entry; it does not
        // touch the IRQ/FIQ lines, which reflect live hardware state
        // rather than a one-shot latch.
        shared.clear_latched(RESET_BIT | UNDEFINED_BIT | SWI_BIT | PREFETCH_ABT_BIT | DATA_ABT_BIT);
        enter(regs, &ENTRIES[0]);
        return Some(ExceptionKind::Reset);
    }

    let cpsr = regs.cpsr();
    for entry in &ENTRIES[1..] {
        if snapshot & entry.bit == 0 {
            continue;
        }
        match entry.kind {
            ExceptionKind::Fiq if cpsr.f() => continue,
            ExceptionKind::Irq if cpsr.i() => continue,
            _ => {}
        }
        // IRQ/FIQ stay latched until their source lowers the line; every
        // other kind is a one-shot edge that is consumed here.
        if !matches!(entry.kind, ExceptionKind::Fiq | ExceptionKind::Irq) {
            shared.clear_latched(entry.bit);
        }
        enter(regs, entry);
        return Some(entry.kind);
    }
    None
}
