//! Configuration schema for whatexec
//!
//! Configuration is stored at `~/.config/whatexec/config.toml`

use crate::cache::CacheLifetimes;
use crate::platform::Platform;
use crate::search::{DriveFilter, SearchDepth};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// PATH / PATHEXT cache settings
    pub cache: CacheConfig,

    /// Filesystem fallback settings
    pub search: SearchConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: "text".to_string(),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache the PATH and extension lists between lookups
    pub enabled: bool,

    /// Lifetime of the PATH directory list in seconds
    pub path_ttl_secs: u64,

    /// Lifetime of the extension list in seconds
    pub extensions_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        let lifetimes = CacheLifetimes::default();
        Self {
            enabled: true,
            path_ttl_secs: lifetimes.directories.as_secs(),
            extensions_ttl_secs: lifetimes.extensions.as_secs(),
        }
    }
}

impl CacheConfig {
    pub fn lifetimes(&self) -> CacheLifetimes {
        CacheLifetimes {
            directories: Duration::from_secs(self.path_ttl_secs),
            extensions: Duration::from_secs(self.extensions_ttl_secs),
        }
    }
}

/// Filesystem fallback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Walk every drive when PATH has no match
    pub fallback: bool,

    /// "top", "all", or a number of directory levels
    pub depth: SearchDepth,

    /// Ask before continuing after access-denied errors
    pub interactive: bool,

    /// Also accept `#!` scripts on Unix-like systems
    pub accept_scripts: bool,

    /// Extra mount points never walked
    pub exclude_mounts: Vec<PathBuf>,

    /// Give up on the whole batch after this many seconds
    pub timeout_secs: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fallback: true,
            depth: SearchDepth::All,
            interactive: false,
            accept_scripts: false,
            exclude_mounts: vec![],
            timeout_secs: None,
        }
    }
}

impl SearchConfig {
    pub fn deadline(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Drive rules for `platform` plus the configured exclusions
    pub fn drive_filter(&self, platform: Platform) -> DriveFilter {
        self.exclude_mounts
            .iter()
            .fold(DriveFilter::new(platform), |f, m| f.exclude(m.clone()))
    }
}
