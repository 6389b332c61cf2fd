//! Recursive directory walking with per-entry error tolerance

use crate::error::{WhatExecError, WhatExecResult};
use crate::query::{Candidate, ExecutableQuery};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use walkdir::WalkDir;

/// How deep below a root the walk descends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "DepthValue", into = "DepthValue")]
pub enum SearchDepth {
    /// Files directly inside the root only
    TopOnly,
    /// The whole tree
    #[default]
    All,
    /// At most this many directory levels
    Levels(usize),
}

impl SearchDepth {
    /// Depth handed to `walkdir`, where the root itself is depth 0
    pub fn max_depth(&self) -> usize {
        match self {
            SearchDepth::TopOnly => 1,
            SearchDepth::All => usize::MAX,
            SearchDepth::Levels(n) => (*n).max(1),
        }
    }
}

impl fmt::Display for SearchDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchDepth::TopOnly => write!(f, "top"),
            SearchDepth::All => write!(f, "all"),
            SearchDepth::Levels(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for SearchDepth {
    type Err = WhatExecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(SearchDepth::TopOnly),
            "all" => Ok(SearchDepth::All),
            other => other
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .map(SearchDepth::Levels)
                .ok_or_else(|| {
                    WhatExecError::InvalidArgument(format!(
                        "search depth must be 'top', 'all' or a positive number, got '{s}'"
                    ))
                }),
        }
    }
}

/// Serialized form: a keyword or a level count
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum DepthValue {
    Levels(usize),
    Word(String),
}

impl TryFrom<DepthValue> for SearchDepth {
    type Error = WhatExecError;

    fn try_from(value: DepthValue) -> Result<Self, Self::Error> {
        match value {
            DepthValue::Levels(n) => n.to_string().parse(),
            DepthValue::Word(word) => word.parse(),
        }
    }
}

impl From<SearchDepth> for DepthValue {
    fn from(depth: SearchDepth) -> Self {
        match depth {
            SearchDepth::Levels(n) => DepthValue::Levels(n),
            other => DepthValue::Word(other.to_string()),
        }
    }
}

/// An entry the walk could not read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    pub path: PathBuf,
    pub reason: String,
    pub permission_denied: bool,
}

impl SkippedEntry {
    pub fn from_io(path: impl Into<PathBuf>, err: &io::Error) -> Self {
        Self {
            path: path.into(),
            reason: err.to_string(),
            permission_denied: err.kind() == io::ErrorKind::PermissionDenied,
        }
    }

    pub fn from_error(path: impl Into<PathBuf>, err: &WhatExecError) -> Self {
        Self {
            path: path.into(),
            reason: err.to_string(),
            permission_denied: err.is_permission_denied(),
        }
    }

    fn from_walk(root: &Path, err: &walkdir::Error) -> Self {
        let path = err.path().unwrap_or(root).to_path_buf();
        match err.io_error() {
            Some(io_err) => Self::from_io(path, io_err),
            None => Self {
                path,
                reason: err.to_string(),
                permission_denied: false,
            },
        }
    }
}

/// Pre-filter for file names during a walk
///
/// Admits files carrying the requested name, or its extension when it has
/// one, before the exact comparison under the platform's case rules.
#[derive(Debug, Clone)]
pub struct SearchPattern {
    query: ExecutableQuery,
}

impl SearchPattern {
    pub fn new(query: ExecutableQuery) -> Self {
        Self { query }
    }

    pub fn query(&self) -> &ExecutableQuery {
        &self.query
    }

    pub fn matches(&self, file_name: &str) -> bool {
        let wanted = self.query.file_name();
        let admitted = wanted.eq_ignore_ascii_case(file_name)
            || self.query.extension().is_some_and(|ext| {
                file_name
                    .rsplit_once('.')
                    .is_some_and(|(_, found)| found.eq_ignore_ascii_case(ext))
            });
        admitted && self.query.matches_file_name(file_name)
    }
}

/// Options for one walk
#[derive(Debug, Clone, Copy)]
pub struct WalkOptions {
    pub depth: SearchDepth,
    /// Do not cross into other mounted file systems
    pub same_file_system: bool,
}

/// Errors and cancellation state of a finished walk
#[derive(Debug, Default)]
pub struct WalkStats {
    pub skipped: Vec<SkippedEntry>,
    pub visited: usize,
    pub cancelled: bool,
}

/// Enumerates the files below a root for the fallback search
///
/// Implementations record unreadable entries in `WalkStats::skipped` and
/// keep going. Called on the blocking pool.
pub trait DirectoryWalker: Send + Sync {
    fn walk(
        &self,
        root: &Path,
        options: WalkOptions,
        cancel: &CancellationToken,
        visit: &mut dyn FnMut(&Candidate),
    ) -> WalkStats;
}

/// Walks the real filesystem with `walkdir`
#[derive(Debug, Clone, Copy, Default)]
pub struct FsWalker;

impl DirectoryWalker for FsWalker {
    fn walk(
        &self,
        root: &Path,
        options: WalkOptions,
        cancel: &CancellationToken,
        visit: &mut dyn FnMut(&Candidate),
    ) -> WalkStats {
        walk_files(root, options, cancel, visit)
    }
}

/// Walk `root` and call `visit` with every non-directory entry
///
/// Unreadable directories and entries are recorded and skipped; the walk
/// carries on. Cancellation is checked between entries. Blocking.
pub fn walk_files<F>(
    root: &Path,
    options: WalkOptions,
    cancel: &CancellationToken,
    mut visit: F,
) -> WalkStats
where
    F: FnMut(&Candidate),
{
    let mut stats = WalkStats::default();
    let mut entries = WalkDir::new(root)
        .follow_links(false)
        .same_file_system(options.same_file_system)
        .max_depth(options.depth.max_depth())
        .into_iter();

    loop {
        if cancel.is_cancelled() {
            debug!("Walk of {} cancelled", root.display());
            stats.cancelled = true;
            break;
        }
        let Some(entry) = entries.next() else {
            break;
        };

        match entry {
            Ok(entry) => {
                if entry.file_type().is_dir() {
                    continue;
                }
                stats.visited += 1;
                visit(&Candidate::new(entry.into_path()));
            }
            Err(err) => {
                let skipped = SkippedEntry::from_walk(root, &err);
                debug!("Skipping {}: {}", skipped.path.display(), skipped.reason);
                stats.skipped.push(skipped);
            }
        }
    }

    stats
}

/// Fail early when a directory to search does not exist
pub fn ensure_directory(dir: &Path) -> WhatExecResult<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(WhatExecError::DirectoryNotFound(dir.to_path_buf()))
    }
}

/// Walkers for exercising unreadable subtrees without changing permissions
#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Walks the real tree but reports one subtree as access denied
    pub(crate) struct DenyingWalker {
        pub denied: PathBuf,
    }

    impl DenyingWalker {
        pub(crate) fn new(denied: impl Into<PathBuf>) -> Self {
            Self {
                denied: denied.into(),
            }
        }
    }

    impl DirectoryWalker for DenyingWalker {
        fn walk(
            &self,
            root: &Path,
            options: WalkOptions,
            cancel: &CancellationToken,
            visit: &mut dyn FnMut(&Candidate),
        ) -> WalkStats {
            let mut stats = FsWalker.walk(root, options, cancel, &mut |candidate| {
                if !candidate.path.starts_with(&self.denied) {
                    visit(candidate);
                }
            });
            if self.denied.starts_with(root) {
                let err = io::Error::from(io::ErrorKind::PermissionDenied);
                stats.skipped.push(SkippedEntry::from_io(&self.denied, &err));
            }
            stats
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;
    use tempfile::TempDir;

    fn options(depth: SearchDepth) -> WalkOptions {
        WalkOptions {
            depth,
            same_file_system: false,
        }
    }

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("a/b")).unwrap();
        std::fs::write(dir.path().join("top"), b"").unwrap();
        std::fs::write(dir.path().join("a/one"), b"").unwrap();
        std::fs::write(dir.path().join("a/b/two"), b"").unwrap();
        dir
    }

    fn names(dir: &Path, depth: SearchDepth) -> Vec<String> {
        let mut seen = Vec::new();
        walk_files(dir, options(depth), &CancellationToken::new(), |c| {
            seen.push(c.name.clone())
        });
        seen.sort();
        seen
    }

    #[test]
    fn depth_limits() {
        let dir = tree();
        assert_eq!(names(dir.path(), SearchDepth::TopOnly), vec!["top"]);
        assert_eq!(names(dir.path(), SearchDepth::Levels(2)), vec!["one", "top"]);
        assert_eq!(names(dir.path(), SearchDepth::All), vec!["one", "top", "two"]);
    }

    #[test]
    fn fs_walker_reports_file_candidates() {
        let dir = tree();
        let mut seen = Vec::new();
        let stats = FsWalker.walk(
            dir.path(),
            options(SearchDepth::All),
            &CancellationToken::new(),
            &mut |c| seen.push(c.clone()),
        );
        assert_eq!(stats.visited, 3);
        let two = seen.iter().find(|c| c.name == "two").unwrap();
        assert_eq!(two.path, dir.path().join("a/b/two"));
        assert_eq!(two.directory, dir.path().join("a/b"));
    }

    #[test]
    fn denied_subtree_is_hidden_and_recorded() {
        let dir = tree();
        let walker = testing::DenyingWalker::new(dir.path().join("a/b"));
        let mut seen = Vec::new();
        let stats = walker.walk(
            dir.path(),
            options(SearchDepth::All),
            &CancellationToken::new(),
            &mut |c| seen.push(c.name.clone()),
        );
        seen.sort();
        assert_eq!(seen, vec!["one", "top"]);
        assert_eq!(stats.skipped.len(), 1);
        assert!(stats.skipped[0].permission_denied);
        assert_eq!(stats.skipped[0].path, dir.path().join("a/b"));
    }

    #[test]
    fn cancelled_walk_visits_nothing() {
        let dir = tree();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut visited = 0;
        let stats = walk_files(dir.path(), options(SearchDepth::All), &cancel, |_| {
            visited += 1
        });
        assert!(stats.cancelled);
        assert_eq!(visited, 0);
    }

    #[test]
    fn missing_root_is_recorded_not_fatal() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("gone");
        let stats = walk_files(&missing, options(SearchDepth::All), &CancellationToken::new(), |_| {});
        assert_eq!(stats.skipped.len(), 1);
        assert_eq!(stats.skipped[0].path, missing);
        assert!(!stats.skipped[0].permission_denied);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_is_skipped_and_walk_continues() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tree();
        let locked = dir.path().join("locked");
        std::fs::create_dir(&locked).unwrap();
        std::fs::write(locked.join("hidden"), b"").unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores permission bits
        if std::fs::read_dir(&locked).is_ok() {
            std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let mut seen = Vec::new();
        let stats = walk_files(dir.path(), options(SearchDepth::All), &CancellationToken::new(), |c| {
            seen.push(c.name.clone())
        });
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert!(seen.contains(&"two".to_string()));
        assert!(!seen.contains(&"hidden".to_string()));
        assert!(stats.skipped.iter().any(|s| s.permission_denied && s.path == locked));
    }

    #[test]
    fn pattern_matching_follows_case_rules() {
        let linux = SearchPattern::new(ExecutableQuery::new("tool", Platform::Linux));
        assert!(linux.matches("tool"));
        assert!(!linux.matches("Tool"));
        assert!(!linux.matches("tool.sh"));

        let windows = SearchPattern::new(ExecutableQuery::new("Tool.exe", Platform::Windows));
        assert!(windows.matches("tool.EXE"));
        assert!(!windows.matches("other.exe"));
        assert!(!windows.matches("tool.exe.bak"));
    }

    #[test]
    fn depth_parsing() {
        assert_eq!("top".parse::<SearchDepth>().unwrap(), SearchDepth::TopOnly);
        assert_eq!("ALL".parse::<SearchDepth>().unwrap(), SearchDepth::All);
        assert_eq!("3".parse::<SearchDepth>().unwrap(), SearchDepth::Levels(3));
        assert!("0".parse::<SearchDepth>().is_err());
        assert!("deep".parse::<SearchDepth>().is_err());
    }

    #[test]
    fn depth_serde_accepts_words_and_numbers() {
        #[derive(Deserialize, Serialize)]
        struct Holder {
            depth: SearchDepth,
        }

        let h: Holder = toml::from_str("depth = \"top\"").unwrap();
        assert_eq!(h.depth, SearchDepth::TopOnly);
        let h: Holder = toml::from_str("depth = 4").unwrap();
        assert_eq!(h.depth, SearchDepth::Levels(4));
        assert!(toml::from_str::<Holder>("depth = \"sideways\"").is_err());

        let out = toml::to_string(&Holder {
            depth: SearchDepth::All,
        })
        .unwrap();
        assert!(out.contains("depth = \"all\""));
    }
}
