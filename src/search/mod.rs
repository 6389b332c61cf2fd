//! Full-filesystem fallback search
//!
//! Used for names PATH could not resolve. Every searchable drive is walked
//! on the blocking pool, candidates are validated as they are found and the
//! combined result set is ranked before anything is returned, so the order
//! in which drives finish never changes the answer.

mod drives;
mod searcher;
mod walk;

pub use drives::{Drive, DriveEnumerator, DriveFilter, DriveKind, SystemDrives, PSEUDO_MOUNTS};
pub use searcher::{ExecutableListing, FilesystemSearcher, MatchMode, SearchReport};
pub use walk::{
    ensure_directory, walk_files, DirectoryWalker, FsWalker, SearchDepth, SearchPattern,
    SkippedEntry, WalkOptions, WalkStats,
};

#[cfg(test)]
pub(crate) use walk::testing;
