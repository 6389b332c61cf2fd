//! Host platform detection
//!
//! Every component that behaves differently per OS takes a `Platform`
//! explicitly, so Windows rules can be exercised on a Linux host and
//! vice versa.

/// Detected platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Windows - PE/MZ executables, PATHEXT extensions
    Windows,
    /// macOS and Mac Catalyst - Mach-O executables
    MacOS,
    /// iOS - Mach-O 64-bit only, no permission bits
    Ios,
    /// Linux - ELF executables
    Linux,
    /// FreeBSD - ELF executables
    FreeBsd,
    /// WebAssembly in a browser
    Browser,
    /// tvOS
    TvOs,
    /// Anything else - permission bits only
    Other,
}

impl Platform {
    /// Detect the current platform from the compile target
    pub fn detect() -> Self {
        if cfg!(target_family = "wasm") {
            return Platform::Browser;
        }
        match std::env::consts::OS {
            "windows" => Platform::Windows,
            "macos" => Platform::MacOS,
            "ios" => Platform::Ios,
            "linux" => Platform::Linux,
            "freebsd" => Platform::FreeBsd,
            "tvos" => Platform::TvOs,
            _ => Platform::Other,
        }
    }

    /// Get a human-readable platform name
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Windows => "Windows",
            Platform::MacOS => "macOS",
            Platform::Ios => "iOS",
            Platform::Linux => "Linux",
            Platform::FreeBsd => "FreeBSD",
            Platform::Browser => "Browser",
            Platform::TvOs => "tvOS",
            Platform::Other => "Other",
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, Platform::Windows)
    }

    /// Separator between entries of PATH and PATHEXT
    pub fn path_list_separator(&self) -> char {
        if self.is_windows() {
            ';'
        } else {
            ':'
        }
    }

    /// Characters that separate directories inside a single path
    pub fn directory_separators(&self) -> &'static [char] {
        if self.is_windows() {
            &['\\', '/']
        } else {
            &['/']
        }
    }

    /// Whether file names compare case-insensitively
    pub fn case_insensitive_names(&self) -> bool {
        self.is_windows()
    }

    /// Compare two file names with this platform's case rules
    pub fn names_equal(&self, a: &str, b: &str) -> bool {
        if self.case_insensitive_names() {
            a.eq_ignore_ascii_case(b)
        } else {
            a == b
        }
    }
}
