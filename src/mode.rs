//! Processor modes and the banked-register slots they map to.

/// The seven architectural processor modes.
///
/// Each mode has a 5-bit encoding carried in the low bits of CPSR/SPSR. Bit
/// patterns outside this set are reserved; decoding them yields `None`
/// rather than a `Mode` (see [`Mode::from_bits`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Unprivileged user mode.
    Usr,
    /// Fast interrupt mode.
    Fiq,
    /// Normal interrupt mode.
    Irq,
    /// Supervisor mode, entered on reset and `SWI`.
    Svc,
    /// Abort mode, entered on prefetch/data aborts.
    Abt,
    /// Undefined-instruction mode.
    Und,
    /// Privileged system mode; shares registers with `Usr`.
    Sys,
}

impl Mode {
    /// The 5-bit CPSR mode field for this mode.
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Mode::Usr => 0b1_0000,
            Mode::Fiq => 0b1_0001,
            Mode::Irq => 0b1_0010,
            Mode::Svc => 0b1_0011,
            Mode::Abt => 0b1_0111,
            Mode::Und => 0b1_1011,
            Mode::Sys => 0b1_1111,
        }
    }

    /// Decode a 5-bit CPSR mode field.
    ///
    /// Returns `None` for any pattern that is not one of the seven
    /// architectural modes; callers must treat that as "no bank" rather
    /// than guessing a fallback mode.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Option<Mode> {
        match bits & 0b1_1111 {
            0b1_0000 => Some(Mode::Usr),
            0b1_0001 => Some(Mode::Fiq),
            0b1_0010 => Some(Mode::Irq),
            0b1_0011 => Some(Mode::Svc),
            0b1_0111 => Some(Mode::Abt),
            0b1_1011 => Some(Mode::Und),
            0b1_1111 => Some(Mode::Sys),
            _ => None,
        }
    }

    /// The banked-register slot this mode reads and writes.
    ///
    /// `Usr` and `Sys` share a slot; every other mode has its own.
    #[must_use]
    pub const fn bank(self) -> Bank {
        match self {
            Mode::Usr | Mode::Sys => Bank::UsrSys,
            Mode::Fiq => Bank::Fiq,
            Mode::Irq => Bank::Irq,
            Mode::Svc => Bank::Svc,
            Mode::Abt => Bank::Abt,
            Mode::Und => Bank::Und,
        }
    }
}

/// The six distinct banked-register slots.
///
/// `Usr` and `Sys` modes share [`Bank::UsrSys`]; every other mode owns its
/// bank exclusively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bank {
    /// Shared between `Usr` and `Sys` modes.
    UsrSys,
    /// Fast-interrupt bank (also holds private r8..r12).
    Fiq,
    /// Interrupt-mode bank.
    Irq,
    /// Supervisor-mode bank.
    Svc,
    /// Abort-mode bank.
    Abt,
    /// Undefined-instruction-mode bank.
    Und,
}

/// Number of distinct banks; also the length of [`crate::banks::BankedRegisters`]'s backing array.
pub const BANK_COUNT: usize = 6;

impl Bank {
    /// This bank's index into a `[T; BANK_COUNT]` array.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Bank::UsrSys => 0,
            Bank::Fiq => 1,
            Bank::Irq => 2,
            Bank::Svc => 3,
            Bank::Abt => 4,
            Bank::Und => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_architectural_mode() {
        for mode in [
            Mode::Usr,
            Mode::Fiq,
            Mode::Irq,
            Mode::Svc,
            Mode::Abt,
            Mode::Und,
            Mode::Sys,
        ] {
            assert_eq!(Mode::from_bits(mode.bits()), Some(mode));
        }
    }

    #[test]
    fn reserved_mode_bits_decode_to_none() {
        // 0b00000, 0b01010, 0b11000 are all reserved encodings.
        assert_eq!(Mode::from_bits(0b0_0000), None);
        assert_eq!(Mode::from_bits(0b0_1010), None);
        assert_eq!(Mode::from_bits(0b1_1000), None);
    }

    #[test]
    fn usr_and_sys_share_a_bank() {
        assert_eq!(Mode::Usr.bank(), Bank::UsrSys);
        assert_eq!(Mode::Sys.bank(), Bank::UsrSys);
        assert_ne!(Mode::Svc.bank(), Mode::Abt.bank());
    }
}
