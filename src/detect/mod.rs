//! Binary-format executable detection
//!
//! A file is only reported executable when it carries the permission the
//! host requires and starts with the magic number of the host's native
//! executable format:
//!
//! | Platform | Permission bit | Header |
//! |----------|----------------|--------|
//! | Windows | - | native extension, `MZ` for `.exe` |
//! | macOS | yes | Mach-O for process bitness |
//! | iOS | no | Mach-O 64-bit |
//! | Linux / FreeBSD | yes | ELF |
//! | other | yes | - |

mod detector;
pub mod magic;

pub use detector::{ExecutableDetector, NATIVE_WINDOWS_EXTENSIONS};
