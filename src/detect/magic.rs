//! Magic numbers of native executable formats

/// DOS/PE header `MZ`
pub const MZ: &[u8] = &[0x4D, 0x5A];

/// PE stub variant `MZPE\0\0`
pub const PE_STUB: &[u8] = b"MZPE\0\0";

/// Mach-O 32-bit, big-endian byte order
pub const MACH_O_32: &[u8] = &[0xFE, 0xED, 0xFA, 0xCE];

/// Mach-O 64-bit, big-endian byte order
pub const MACH_O_64: &[u8] = &[0xFE, 0xED, 0xFA, 0xCF];

/// Mach-O 32-bit as written by little-endian hosts
pub const MACH_O_32_LE: &[u8] = &[0xCE, 0xFA, 0xED, 0xFE];

/// Mach-O 64-bit as written by little-endian hosts
pub const MACH_O_64_LE: &[u8] = &[0xCF, 0xFA, 0xED, 0xFE];

/// Universal (fat) Mach-O container
pub const MACH_O_FAT: &[u8] = &[0xCA, 0xFE, 0xBA, 0xBE];

/// ELF
pub const ELF: &[u8] = &[0x7F, 0x45, 0x4C, 0x46];

/// Interpreter directive of a script
pub const SHEBANG: &[u8] = b"#!";

pub const WINDOWS_EXE: &[&[u8]] = &[PE_STUB, MZ];
pub const MACH_O_64_BIT: &[&[u8]] = &[MACH_O_64, MACH_O_64_LE, MACH_O_FAT];
pub const MACH_O_32_BIT: &[&[u8]] = &[MACH_O_32, MACH_O_32_LE, MACH_O_FAT];
pub const IOS: &[&[u8]] = &[MACH_O_64, MACH_O_64_LE];
pub const ELF_ONLY: &[&[u8]] = &[ELF];
pub const ELF_OR_SCRIPT: &[&[u8]] = &[ELF, SHEBANG];
pub const MACH_O_64_OR_SCRIPT: &[&[u8]] = &[MACH_O_64, MACH_O_64_LE, MACH_O_FAT, SHEBANG];
pub const MACH_O_32_OR_SCRIPT: &[&[u8]] = &[MACH_O_32, MACH_O_32_LE, MACH_O_FAT, SHEBANG];

/// Mach-O signatures for the bitness of the running process
pub fn mach_o_for_process() -> &'static [&'static [u8]] {
    if cfg!(target_pointer_width = "64") {
        MACH_O_64_BIT
    } else {
        MACH_O_32_BIT
    }
}

/// Mach-O signatures plus `#!` scripts
pub fn mach_o_or_script_for_process() -> &'static [&'static [u8]] {
    if cfg!(target_pointer_width = "64") {
        MACH_O_64_OR_SCRIPT
    } else {
        MACH_O_32_OR_SCRIPT
    }
}

/// Number of header bytes needed to test every signature
pub fn header_len(signatures: &[&[u8]]) -> usize {
    signatures.iter().map(|s| s.len()).max().unwrap_or(0)
}

/// Whether `header` starts with one of `signatures`
///
/// A header shorter than a signature never matches it.
pub fn matches_any(header: &[u8], signatures: &[&[u8]]) -> bool {
    signatures.iter().any(|sig| header.starts_with(sig))
}
