//! Error types for whatexec
//!
//! All modules use `WhatExecResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for whatexec operations
pub type WhatExecResult<T> = Result<T, WhatExecError>;

/// All errors that can occur in whatexec
#[derive(Error, Debug)]
pub enum WhatExecError {
    // Resolution errors
    #[error("Could not resolve executable(s): {}", names.join(", "))]
    NotFound { names: Vec<String> },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Unsupported platform: {0}. Executable detection is meaningless on this target.")]
    UnsupportedPlatform(String),

    #[error("Operation cancelled")]
    Cancelled,

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl WhatExecError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Build the aggregated not-found error for a set of names
    pub fn not_found<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::NotFound {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Check if the error was caused by missing access rights
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::Io { source, .. } | Self::ConfigDirCreate { source, .. } => {
                source.kind() == std::io::ErrorKind::PermissionDenied
            }
            _ => false,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => {
                Some("Check the spelling, or run with --all to search every drive")
            }
            Self::ConfigInvalid { .. } => Some("Run: whatexec config init --force"),
            Self::Io { .. } if self.is_permission_denied() => {
                Some("Re-run with elevated permissions to search protected locations")
            }
            _ => None,
        }
    }
}
