//! Value types flowing through a resolution call

use crate::platform::Platform;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A requested executable: bare name, name with extension, or a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutableQuery {
    raw: String,
    platform: Platform,
}

impl ExecutableQuery {
    pub fn new(raw: impl Into<String>, platform: Platform) -> Self {
        Self {
            raw: raw.into(),
            platform,
        }
    }

    /// The name exactly as requested
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Rooted, drive-qualified, or containing a directory separator
    ///
    /// Such queries bypass PATH and are checked in place.
    pub fn is_path(&self) -> bool {
        let separators = self.platform.directory_separators();
        if self.raw.contains(separators) {
            return true;
        }
        if self.platform.is_windows() {
            let bytes = self.raw.as_bytes();
            return bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';
        }
        false
    }

    /// Final component of the query
    pub fn file_name(&self) -> &str {
        self.raw
            .rsplit(self.platform.directory_separators())
            .next()
            .unwrap_or(&self.raw)
    }

    /// Extension of the final component, without the dot
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        match name.rfind('.') {
            Some(dot) if dot > 0 && dot + 1 < name.len() => Some(&name[dot + 1..]),
            _ => None,
        }
    }

    pub fn has_extension(&self) -> bool {
        self.extension().is_some()
    }

    /// Compare a file name found on disk against this query
    pub fn matches_file_name(&self, candidate: &str) -> bool {
        self.platform.names_equal(self.file_name(), candidate)
    }
}

/// An unvalidated file found while enumerating a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub name: String,
    pub directory: PathBuf,
}

impl Candidate {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self {
            path,
            name,
            directory,
        }
    }
}

/// A query paired with a file that passed the executable check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedExecutable {
    pub query: String,
    pub path: PathBuf,
}

impl ResolvedExecutable {
    pub fn new(query: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            query: query.into(),
            path: path.into(),
        }
    }
}
