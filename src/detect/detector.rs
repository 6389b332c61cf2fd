//! Executable detection by permission bits and binary magic numbers

use super::magic;
use crate::error::{WhatExecError, WhatExecResult};
use crate::platform::Platform;
use std::fs::Metadata;
use std::io::{self, Read};
use std::path::Path;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Extensions Windows can load or execute natively
pub const NATIVE_WINDOWS_EXTENSIONS: &[&str] = &[
    "exe", "msi", "appx", "com", "sys", "drv", "mui", "ocx", "ax", "msstyles", "scr", "cpl",
    "acm", "efi", "dll", "tsp",
];

/// What must hold for a file to count as executable
#[derive(Debug, Clone, Copy)]
enum Rule {
    /// Never executable (unrecognized extension on Windows)
    Reject,
    /// Execute permission is enough
    PermissionOnly,
    /// Header must match one of the signatures
    Magic {
        require_permission: bool,
        signatures: &'static [&'static [u8]],
        /// Treat unreadable headers as a match instead of an error
        fail_open: bool,
    },
}

/// Decides whether files are executable on a given platform
///
/// No per-file state is kept: every call re-reads metadata and header.
#[derive(Debug, Clone)]
pub struct ExecutableDetector {
    platform: Platform,
    accept_scripts: bool,
}

impl ExecutableDetector {
    /// Detector for the host platform
    pub fn new() -> WhatExecResult<Self> {
        Self::for_platform(Platform::detect())
    }

    /// Detector for an explicit platform
    ///
    /// Fails for targets where "is this file executable" has no meaning.
    pub fn for_platform(platform: Platform) -> WhatExecResult<Self> {
        match platform {
            Platform::Browser | Platform::TvOs => {
                Err(WhatExecError::UnsupportedPlatform(platform.name().to_string()))
            }
            _ => Ok(Self {
                platform,
                accept_scripts: false,
            }),
        }
    }

    /// Also accept `#!` scripts on Unix-like platforms
    pub fn with_scripts(mut self, accept: bool) -> Self {
        self.accept_scripts = accept;
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Check a file, blocking the current thread for I/O
    pub fn is_executable_blocking(&self, path: &Path) -> WhatExecResult<bool> {
        let metadata = std::fs::metadata(path).map_err(|e| metadata_error(path, e))?;
        if !metadata.is_file() {
            return Ok(false);
        }

        match self.rule_for(path) {
            Rule::Reject => Ok(false),
            Rule::PermissionOnly => Ok(has_execute_permission(&metadata)),
            Rule::Magic {
                require_permission,
                signatures,
                fail_open,
            } => {
                if require_permission && !has_execute_permission(&metadata) {
                    return Ok(false);
                }
                let header = read_header_blocking(path, magic::header_len(signatures));
                judge_header(path, header, signatures, fail_open)
            }
        }
    }

    /// Check a file asynchronously, giving up when `cancel` fires
    pub async fn is_executable(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> WhatExecResult<bool> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(WhatExecError::Cancelled),
            verdict = self.inspect(path) => verdict,
        }
    }

    async fn inspect(&self, path: &Path) -> WhatExecResult<bool> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| metadata_error(path, e))?;
        if !metadata.is_file() {
            return Ok(false);
        }

        match self.rule_for(path) {
            Rule::Reject => Ok(false),
            Rule::PermissionOnly => Ok(has_execute_permission(&metadata)),
            Rule::Magic {
                require_permission,
                signatures,
                fail_open,
            } => {
                if require_permission && !has_execute_permission(&metadata) {
                    return Ok(false);
                }
                let header = read_header(path, magic::header_len(signatures)).await;
                judge_header(path, header, signatures, fail_open)
            }
        }
    }

    fn rule_for(&self, path: &Path) -> Rule {
        match self.platform {
            Platform::Windows => {
                let ext = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e.to_ascii_lowercase());
                match ext.as_deref() {
                    Some("exe") => Rule::Magic {
                        require_permission: true,
                        signatures: magic::WINDOWS_EXE,
                        fail_open: true,
                    },
                    Some(ext) if NATIVE_WINDOWS_EXTENSIONS.contains(&ext) => Rule::PermissionOnly,
                    _ => Rule::Reject,
                }
            }
            Platform::MacOS => Rule::Magic {
                require_permission: true,
                signatures: if self.accept_scripts {
                    magic::mach_o_or_script_for_process()
                } else {
                    magic::mach_o_for_process()
                },
                fail_open: false,
            },
            Platform::Ios => Rule::Magic {
                require_permission: false,
                signatures: magic::IOS,
                fail_open: false,
            },
            Platform::Linux | Platform::FreeBsd => Rule::Magic {
                require_permission: true,
                signatures: if self.accept_scripts {
                    magic::ELF_OR_SCRIPT
                } else {
                    magic::ELF_ONLY
                },
                fail_open: false,
            },
            // Unreachable through the constructor
            Platform::Browser | Platform::TvOs => Rule::Reject,
            Platform::Other => Rule::PermissionOnly,
        }
    }
}

fn metadata_error(path: &Path, e: io::Error) -> WhatExecError {
    if e.kind() == io::ErrorKind::NotFound {
        WhatExecError::FileNotFound(path.to_path_buf())
    } else {
        WhatExecError::io(format!("reading metadata of {}", path.display()), e)
    }
}

fn judge_header(
    path: &Path,
    header: io::Result<Vec<u8>>,
    signatures: &[&[u8]],
    fail_open: bool,
) -> WhatExecResult<bool> {
    match header {
        Ok(bytes) => Ok(magic::matches_any(&bytes, signatures)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(WhatExecError::FileNotFound(path.to_path_buf()))
        }
        Err(e) if fail_open => {
            debug!(
                "Could not read header of {} ({}), accepting on extension",
                path.display(),
                e
            );
            Ok(true)
        }
        Err(e) => Err(WhatExecError::io(
            format!("reading header of {}", path.display()),
            e,
        )),
    }
}

fn read_header_blocking(path: &Path, len: usize) -> io::Result<Vec<u8>> {
    let file = std::fs::File::open(path)?;
    let mut header = Vec::with_capacity(len);
    file.take(len as u64).read_to_end(&mut header)?;
    Ok(header)
}

async fn read_header(path: &Path, len: usize) -> io::Result<Vec<u8>> {
    let file = tokio::fs::File::open(path).await?;
    let mut header = Vec::with_capacity(len);
    file.take(len as u64).read_to_end(&mut header).await?;
    Ok(header)
}

#[cfg(unix)]
fn has_execute_permission(metadata: &Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn has_execute_permission(_metadata: &Metadata) -> bool {
    true
}
