//! Concurrent fallback search across drives and directories

use super::drives::{DriveEnumerator, DriveFilter};
use super::walk::{
    self, DirectoryWalker, FsWalker, SearchDepth, SearchPattern, SkippedEntry, WalkOptions,
};
use crate::detect::ExecutableDetector;
use crate::error::{WhatExecError, WhatExecResult};
use crate::events::{self, ProgressEvent, ProgressSink};
use crate::query::{ExecutableQuery, ResolvedExecutable};
use crate::rank::{CandidateRanker, SCORE_PROGRAMS};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Whether to keep every match or only the best one per name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    First,
    All,
}

/// Outcome of a fallback search
#[derive(Debug, Clone, Default)]
pub struct SearchReport {
    /// Ranked matches per requested name
    pub matches: HashMap<String, Vec<ResolvedExecutable>>,
    /// Names without any match, in request order
    pub unresolved: Vec<String>,
    /// Entries that could not be read
    pub skipped: Vec<SkippedEntry>,
    /// The caller's token fired before every walk finished
    pub cancelled: bool,
}

impl SearchReport {
    /// Skipped entries caused by missing access rights
    pub fn access_denied(&self) -> Vec<SkippedEntry> {
        self.skipped
            .iter()
            .filter(|s| s.permission_denied)
            .cloned()
            .collect()
    }
}

/// Every executable found below a directory
#[derive(Debug, Clone, Default)]
pub struct ExecutableListing {
    pub executables: Vec<PathBuf>,
    pub skipped: Vec<SkippedEntry>,
    pub cancelled: bool,
}

/// Per-root result of a blocking walk
struct RootOutcome {
    root: PathBuf,
    found: Vec<(usize, PathBuf)>,
    skipped: Vec<SkippedEntry>,
}

/// Searches whole drives, or a single directory tree, for names
#[derive(Clone)]
pub struct FilesystemSearcher {
    drives: Arc<dyn DriveEnumerator>,
    filter: DriveFilter,
    detector: Arc<ExecutableDetector>,
    ranker: Arc<CandidateRanker>,
    walker: Arc<dyn DirectoryWalker>,
    progress: Option<ProgressSink>,
}

impl FilesystemSearcher {
    pub fn new(
        drives: Arc<dyn DriveEnumerator>,
        filter: DriveFilter,
        detector: Arc<ExecutableDetector>,
        ranker: Arc<CandidateRanker>,
    ) -> Self {
        Self {
            drives,
            filter,
            detector,
            ranker,
            walker: Arc::new(FsWalker),
            progress: None,
        }
    }

    /// Replace the filesystem walk used below each root
    pub fn with_walker(mut self, walker: Arc<dyn DirectoryWalker>) -> Self {
        self.walker = walker;
        self
    }

    pub fn with_progress(mut self, sink: ProgressSink) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Every match per name across all searchable drives, ranked
    pub async fn locate<S: AsRef<str>>(
        &self,
        names: &[S],
        depth: SearchDepth,
        cancel: &CancellationToken,
    ) -> SearchReport {
        self.search_drives(names, depth, MatchMode::All, cancel).await
    }

    /// The best-ranked match per name across all searchable drives
    pub async fn locate_first<S: AsRef<str>>(
        &self,
        names: &[S],
        depth: SearchDepth,
        cancel: &CancellationToken,
    ) -> SearchReport {
        self.search_drives(names, depth, MatchMode::First, cancel)
            .await
    }

    /// Search drives in the given mode
    pub async fn search_drives<S: AsRef<str>>(
        &self,
        names: &[S],
        depth: SearchDepth,
        mode: MatchMode,
        cancel: &CancellationToken,
    ) -> SearchReport {
        let roots: Vec<PathBuf> = self
            .drives
            .searchable_drives(&self.filter)
            .into_iter()
            .map(|d| d.root)
            .collect();
        info!("Searching {} drive(s) for {} name(s)", roots.len(), names.len());

        let options = WalkOptions {
            depth,
            same_file_system: true,
        };
        self.search_roots(roots, names, options, mode, cancel).await
    }

    /// Search one directory tree with the same filtering and ranking
    pub async fn locate_in_directory<S: AsRef<str>>(
        &self,
        dir: &Path,
        names: &[S],
        depth: SearchDepth,
        mode: MatchMode,
        cancel: &CancellationToken,
    ) -> WhatExecResult<SearchReport> {
        walk::ensure_directory(dir)?;
        let options = WalkOptions {
            depth,
            same_file_system: false,
        };
        Ok(self
            .search_roots(vec![dir.to_path_buf()], names, options, mode, cancel)
            .await)
    }

    /// Every executable file below `dir`, ranked
    pub async fn list_executables(
        &self,
        dir: &Path,
        depth: SearchDepth,
        cancel: &CancellationToken,
    ) -> WhatExecResult<ExecutableListing> {
        walk::ensure_directory(dir)?;

        let root = dir.to_path_buf();
        let detector = Arc::clone(&self.detector);
        let walker = Arc::clone(&self.walker);
        let token = cancel.clone();
        let sink = self.progress.clone();
        let options = WalkOptions {
            depth,
            same_file_system: false,
        };

        let listing = tokio::task::spawn_blocking(move || {
            events::emit(sink.as_ref(), ProgressEvent::DriveStarted { root: root.clone() });
            let mut listing = ExecutableListing::default();
            let stats = walker.walk(&root, options, &token, &mut |candidate| {
                match detector.is_executable_blocking(&candidate.path) {
                    Ok(true) => {
                        events::emit(
                            sink.as_ref(),
                            ProgressEvent::Confirmed {
                                name: candidate.name.clone(),
                                path: candidate.path.clone(),
                            },
                        );
                        listing.executables.push(candidate.path.clone());
                    }
                    Ok(false) => {}
                    Err(e) => listing
                        .skipped
                        .push(SkippedEntry::from_error(&candidate.path, &e)),
                }
            });
            events::emit(
                sink.as_ref(),
                ProgressEvent::DriveFinished {
                    root,
                    confirmed: listing.executables.len(),
                },
            );
            listing.skipped.extend(stats.skipped);
            listing.cancelled = stats.cancelled;
            listing
        })
        .await
        .map_err(|e| WhatExecError::Internal(format!("directory listing task failed: {e}")))?;

        let mut executables = listing.executables;
        executables.sort();
        Ok(ExecutableListing {
            executables: self.ranker.rank(executables),
            ..listing
        })
    }

    async fn search_roots<S: AsRef<str>>(
        &self,
        roots: Vec<PathBuf>,
        names: &[S],
        options: WalkOptions,
        mode: MatchMode,
        cancel: &CancellationToken,
    ) -> SearchReport {
        let names: Vec<&str> = names.iter().map(|n| n.as_ref()).collect();
        let platform = self.detector.platform();

        // Path queries were already checked in place and are never walked for
        let searchable: Vec<usize> = (0..names.len())
            .filter(|&i| !ExecutableQuery::new(names[i], platform).is_path())
            .collect();
        let patterns: Arc<Vec<SearchPattern>> = Arc::new(
            searchable
                .iter()
                .map(|&i| SearchPattern::new(ExecutableQuery::new(names[i], platform)))
                .collect(),
        );

        let mut found: Vec<Vec<PathBuf>> = vec![Vec::new(); patterns.len()];
        let mut skipped = Vec::new();

        if !patterns.is_empty() {
            // Child token so a first-mode short-circuit never cancels the caller
            let walks = cancel.child_token();
            let mut set = JoinSet::new();
            for root in roots {
                let patterns = Arc::clone(&patterns);
                let detector = Arc::clone(&self.detector);
                let walker = Arc::clone(&self.walker);
                let token = walks.clone();
                let sink = self.progress.clone();
                set.spawn_blocking(move || {
                    let search = RootSearch {
                        patterns: &patterns,
                        detector: &detector,
                        walker: walker.as_ref(),
                        sink: sink.as_ref(),
                    };
                    search.run(root, options, &token)
                });
            }

            let mut best: Vec<Option<u8>> = vec![None; patterns.len()];
            while let Some(joined) = set.join_next().await {
                let outcome = match joined {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!("Drive search task failed: {}", e);
                        continue;
                    }
                };
                debug!(
                    "Finished {} with {} match(es)",
                    outcome.root.display(),
                    outcome.found.len()
                );
                for (index, path) in outcome.found {
                    let score = self.ranker.score(&path);
                    best[index] = Some(best[index].map_or(score, |b| b.min(score)));
                    found[index].push(path);
                }
                skipped.extend(outcome.skipped);

                // Nothing can outrank a programs-folder match
                if mode == MatchMode::First
                    && best.iter().all(|b| *b == Some(SCORE_PROGRAMS))
                    && !walks.is_cancelled()
                {
                    debug!("Every name has a top-priority match, stopping remaining walks");
                    walks.cancel();
                }
            }
        }

        let mut report = SearchReport {
            skipped,
            cancelled: cancel.is_cancelled(),
            ..SearchReport::default()
        };

        for (i, name) in names.iter().enumerate() {
            let candidates = searchable
                .iter()
                .position(|&s| s == i)
                .map(|p| std::mem::take(&mut found[p]))
                .unwrap_or_default();
            let ranked = self.rank_candidates(candidates, mode);

            if ranked.is_empty() {
                report.unresolved.push(name.to_string());
            } else {
                let resolved = ranked
                    .into_iter()
                    .map(|path| ResolvedExecutable::new(*name, path))
                    .collect();
                report.matches.insert(name.to_string(), resolved);
            }
        }

        report
    }

    /// Sort by path first so equal scores break ties the same way every run
    fn rank_candidates(&self, mut candidates: Vec<PathBuf>, mode: MatchMode) -> Vec<PathBuf> {
        candidates.sort();
        candidates.dedup();
        let mut ranked = self.ranker.rank(candidates);
        if mode == MatchMode::First {
            ranked.truncate(1);
        }
        ranked
    }
}

/// Shared state for walking one root on the blocking pool
struct RootSearch<'a> {
    patterns: &'a [SearchPattern],
    detector: &'a ExecutableDetector,
    walker: &'a dyn DirectoryWalker,
    sink: Option<&'a ProgressSink>,
}

impl RootSearch<'_> {
    fn run(&self, root: PathBuf, options: WalkOptions, cancel: &CancellationToken) -> RootOutcome {
        let sink = self.sink;
        events::emit(sink, ProgressEvent::DriveStarted { root: root.clone() });

        let mut found = Vec::new();
        let mut skipped = Vec::new();
        let stats = self.walker.walk(&root, options, cancel, &mut |candidate| {
            for (index, pattern) in self.patterns.iter().enumerate() {
                if !pattern.matches(&candidate.name) {
                    continue;
                }
                match self.detector.is_executable_blocking(&candidate.path) {
                    Ok(true) => {
                        events::emit(
                            sink,
                            ProgressEvent::Confirmed {
                                name: pattern.query().as_str().to_string(),
                                path: candidate.path.clone(),
                            },
                        );
                        found.push((index, candidate.path.clone()));
                    }
                    Ok(false) => {}
                    Err(e) => {
                        debug!("Cannot check {}: {}", candidate.path.display(), e);
                        skipped.push(SkippedEntry::from_error(&candidate.path, &e));
                    }
                }
            }
        });
        skipped.extend(stats.skipped);

        for entry in &skipped {
            events::emit(sink, ProgressEvent::Skipped(entry.clone()));
        }
        events::emit(
            sink,
            ProgressEvent::DriveFinished {
                root: root.clone(),
                confirmed: found.len(),
            },
        );

        RootOutcome {
            root,
            found,
            skipped,
        }
    }
}
