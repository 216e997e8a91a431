//! The static CPU type identity table.
//!
//! `initialize_cpu` takes a type-name string rather than a structured
//! descriptor; this module is the one place that turns a name into the
//! ISA generation and feature bits the rest of the core cares about.

use tracing::warn;

/// The ISA generation a given core family implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Isa {
    V4,
    V5,
    V5Te,
    V6,
}

/// The core family a CPU type name belongs to, independent of the ISA
/// generation it implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreFamily {
    Arm7,
    Arm9,
    Arm9e,
}

/// The feature set a given CPU type name resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuIdentity {
    pub isa: Isa,
    pub core_family: CoreFamily,
    pub has_cp15: bool,
    pub has_mmu: bool,
}

const DEFAULT_IDENTITY: CpuIdentity =
    CpuIdentity { isa: Isa::V4, core_family: CoreFamily::Arm7, has_cp15: false, has_mmu: false };

/// `(name, identity)`, matched case-insensitively against the requested
/// type name. Earlier entries are never shadowed by later ones since every
/// name here is distinct, but keeping it as one flat table (rather than a
/// `match`) means adding a core family is a one-line change.
const TABLE: &[(&str, CpuIdentity)] = &[
    ("armv4", CpuIdentity { isa: Isa::V4, core_family: CoreFamily::Arm7, has_cp15: false, has_mmu: false }),
    ("armv5", CpuIdentity { isa: Isa::V5, core_family: CoreFamily::Arm9, has_cp15: true, has_mmu: true }),
    ("armv5e", CpuIdentity { isa: Isa::V5Te, core_family: CoreFamily::Arm9e, has_cp15: true, has_mmu: true }),
    ("armv6", CpuIdentity { isa: Isa::V6, core_family: CoreFamily::Arm9e, has_cp15: true, has_mmu: true }),
    ("arm7tdmi", CpuIdentity { isa: Isa::V4, core_family: CoreFamily::Arm7, has_cp15: false, has_mmu: false }),
    ("arm7", CpuIdentity { isa: Isa::V4, core_family: CoreFamily::Arm7, has_cp15: false, has_mmu: false }),
    ("arm9tdmi", CpuIdentity { isa: Isa::V4, core_family: CoreFamily::Arm9, has_cp15: false, has_mmu: false }),
    ("arm9", CpuIdentity { isa: Isa::V5, core_family: CoreFamily::Arm9, has_cp15: true, has_mmu: true }),
    ("arm9e", CpuIdentity { isa: Isa::V5Te, core_family: CoreFamily::Arm9e, has_cp15: true, has_mmu: true }),
    ("arm926ejs", CpuIdentity { isa: Isa::V5Te, core_family: CoreFamily::Arm9e, has_cp15: true, has_mmu: true }),
    ("arm926", CpuIdentity { isa: Isa::V5Te, core_family: CoreFamily::Arm9e, has_cp15: true, has_mmu: true }),
];

/// Resolve a CPU type name to its identity. Unrecognized names fall back
/// to a minimal `armv4`-equivalent default (no `CP15`, no MMU) rather than
/// failing `initialize_cpu`; a warning is logged so the fallback doesn't
/// pass silently in practice even though it's not an error.
#[must_use]
pub fn lookup(type_name: &str) -> CpuIdentity {
    let needle = type_name.to_ascii_lowercase();
    for (name, identity) in TABLE {
        if *name == needle {
            return *identity;
        }
    }
    warn!(type_name, "unknown CPU type name, falling back to default identity");
    DEFAULT_IDENTITY
}
