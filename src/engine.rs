//! Resolution engine: PATH first, filesystem fallback for the rest
//!
//! ```text
//! START -> PATH_LOOKUP -> (all resolved?) -> DONE
//!                      -> FILESYSTEM_FALLBACK(unresolved) -> MERGE -> DONE
//! ```
//!
//! Names resolved through PATH are never walked for. A name missing from
//! both stages is reported as unresolved, and only `resolve_required`
//! turns that into an error.

use crate::cache::{CachedPathSource, TtlCache};
use crate::config::Config;
use crate::detect::ExecutableDetector;
use crate::environment::{PathEnvironmentReader, PathSource};
use crate::error::{WhatExecError, WhatExecResult};
use crate::events::{self, ProgressEvent, ProgressSink};
use crate::query::ResolvedExecutable;
use crate::rank::CandidateRanker;
use crate::resolve::PathResolver;
use crate::search::{
    DriveEnumerator, FilesystemSearcher, MatchMode, SearchDepth, SearchReport,
    SkippedEntry, SystemDrives,
};
use async_trait::async_trait;
use futures_util::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// First match only, or every instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    First,
    All,
}

/// Where a name was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionSource {
    Path,
    Filesystem,
}

/// Decision after an access-denied condition during the fallback search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    Continue,
    Abort,
}

/// Asked whether to go on after a name was blocked by access errors
#[async_trait]
pub trait AccessDeniedHandler: Send + Sync {
    /// `name` stayed unresolved and `denied` lists what could not be read
    async fn on_access_denied(&self, name: &str, denied: &[SkippedEntry]) -> Continuation;
}

/// Search behaviour applied when a request does not override it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineDefaults {
    pub depth: SearchDepth,
    pub fallback: bool,
    pub deadline: Option<Duration>,
}

impl Default for EngineDefaults {
    fn default() -> Self {
        Self {
            depth: SearchDepth::All,
            fallback: true,
            deadline: None,
        }
    }
}

/// One batch of names to resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveRequest {
    pub names: Vec<String>,
    pub mode: SearchMode,
    /// Keep at most this many paths per name
    pub limit: Option<usize>,
    pub depth: SearchDepth,
    /// Walk drives for names PATH could not resolve
    pub fallback: bool,
    /// Give up on whatever is still running after this long
    pub deadline: Option<Duration>,
}

impl ResolveRequest {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_defaults(names, EngineDefaults::default())
    }

    pub fn with_defaults<I, S>(names: I, defaults: EngineDefaults) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            mode: SearchMode::First,
            limit: None,
            depth: defaults.depth,
            fallback: defaults.fallback,
            deadline: defaults.deadline,
        }
    }

    pub fn all_instances(mut self) -> Self {
        self.mode = SearchMode::All;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn depth(mut self, depth: SearchDepth) -> Self {
        self.depth = depth;
        self
    }

    pub fn fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    fn keep(&self) -> usize {
        match self.mode {
            SearchMode::First => 1,
            SearchMode::All => self.limit.unwrap_or(usize::MAX).max(1),
        }
    }
}

/// Result for one requested name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameOutcome {
    pub name: String,
    /// Ranked paths, empty when unresolved
    pub paths: Vec<PathBuf>,
    pub source: Option<ResolutionSource>,
}

impl NameOutcome {
    fn unresolved(name: &str) -> Self {
        Self {
            name: name.to_string(),
            paths: Vec::new(),
            source: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !self.paths.is_empty()
    }

    /// The preferred path
    pub fn best(&self) -> Option<&PathBuf> {
        self.paths.first()
    }
}

/// Per-name results of a batch, in request order
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutcome {
    pub results: Vec<NameOutcome>,
    pub skipped: Vec<SkippedEntry>,
    /// Cancellation or the deadline stopped the batch early
    pub cancelled: bool,
    /// The access-denied handler asked to stop
    pub aborted: bool,
}

impl BatchOutcome {
    pub fn get(&self, name: &str) -> Option<&NameOutcome> {
        self.results.iter().find(|r| r.name == name)
    }

    pub fn all_resolved(&self) -> bool {
        self.results.iter().all(NameOutcome::is_resolved)
    }

    pub fn unresolved_names(&self) -> Vec<String> {
        self.results
            .iter()
            .filter(|r| !r.is_resolved())
            .map(|r| r.name.clone())
            .collect()
    }

    /// Flatten into resolved pairs
    pub fn resolved(&self) -> Vec<ResolvedExecutable> {
        self.results
            .iter()
            .flat_map(|r| {
                r.paths
                    .iter()
                    .map(|p| ResolvedExecutable::new(r.name.clone(), p.clone()))
            })
            .collect()
    }

    /// Fail with every unresolved name unless all resolved
    pub fn into_required(self) -> WhatExecResult<Self> {
        if self.all_resolved() {
            Ok(self)
        } else {
            Err(WhatExecError::not_found(self.unresolved_names()))
        }
    }
}

/// Composition root of the resolution pipeline
#[derive(Clone)]
pub struct ResolutionEngine {
    resolver: PathResolver,
    searcher: FilesystemSearcher,
    defaults: EngineDefaults,
    progress: Option<ProgressSink>,
    access_denied: Option<Arc<dyn AccessDeniedHandler>>,
}

impl ResolutionEngine {
    pub fn new(resolver: PathResolver, searcher: FilesystemSearcher) -> Self {
        Self {
            resolver,
            searcher,
            defaults: EngineDefaults::default(),
            progress: None,
            access_denied: None,
        }
    }

    /// Wire the live environment, drives and special folders per `config`
    pub fn from_config(config: &Config) -> WhatExecResult<Self> {
        Self::with_drives(config, Arc::new(SystemDrives))
    }

    /// Like `from_config` with an explicit drive enumerator
    pub fn with_drives(config: &Config, drives: Arc<dyn DriveEnumerator>) -> WhatExecResult<Self> {
        let detector =
            Arc::new(ExecutableDetector::new()?.with_scripts(config.search.accept_scripts));
        let platform = detector.platform();

        let reader: Arc<dyn PathSource> = Arc::new(PathEnvironmentReader::new());
        let source: Arc<dyn PathSource> = if config.cache.enabled {
            Arc::new(CachedPathSource::with_lifetimes(
                reader,
                Arc::new(TtlCache::new()),
                config.cache.lifetimes(),
            ))
        } else {
            reader
        };

        let filter = config.search.drive_filter(platform);
        let searcher = FilesystemSearcher::new(
            drives,
            filter,
            Arc::clone(&detector),
            Arc::new(CandidateRanker::detect()),
        );

        Ok(Self::new(PathResolver::new(source, detector), searcher).with_defaults(
            EngineDefaults {
                depth: config.search.depth,
                fallback: config.search.fallback,
                deadline: config.search.deadline(),
            },
        ))
    }

    pub fn with_defaults(mut self, defaults: EngineDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Send progress events to `sink`
    pub fn with_progress(mut self, sink: ProgressSink) -> Self {
        self.searcher = self.searcher.with_progress(sink.clone());
        self.progress = Some(sink);
        self
    }

    /// Consult `handler` when access errors leave a name unresolved
    ///
    /// Fallback names are then searched one at a time so the handler can
    /// stop the batch between them.
    pub fn with_access_denied_handler(mut self, handler: Arc<dyn AccessDeniedHandler>) -> Self {
        self.access_denied = Some(handler);
        self
    }

    pub fn defaults(&self) -> EngineDefaults {
        self.defaults
    }

    pub fn searcher(&self) -> &FilesystemSearcher {
        &self.searcher
    }

    /// A request carrying this engine's defaults
    pub fn request<I, S>(&self, names: I) -> ResolveRequest
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ResolveRequest::with_defaults(names, self.defaults)
    }

    /// Resolve a batch, reporting unresolved names instead of failing
    pub async fn resolve(
        &self,
        request: &ResolveRequest,
        cancel: &CancellationToken,
    ) -> BatchOutcome {
        let token = cancel.child_token();
        let deadline = request.deadline.map(|after| {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(after).await;
                warn!("Deadline of {:?} reached, cancelling search", after);
                token.cancel();
            })
        });

        let outcome = self.run(request, &token).await;

        if let Some(timer) = deadline {
            timer.abort();
        }
        outcome
    }

    /// Resolve a batch, failing with every unresolved name listed
    pub async fn resolve_required(
        &self,
        request: &ResolveRequest,
        cancel: &CancellationToken,
    ) -> WhatExecResult<BatchOutcome> {
        self.resolve(request, cancel).await.into_required()
    }

    /// Best match for one name
    pub async fn find(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Option<ResolvedExecutable> {
        let outcome = self.resolve(&self.request([name]), cancel).await;
        outcome.resolved().into_iter().next()
    }

    /// Best match for each of several names
    pub async fn find_many<S: AsRef<str>>(
        &self,
        names: &[S],
        cancel: &CancellationToken,
    ) -> BatchOutcome {
        let request = self.request(names.iter().map(|n| n.as_ref()));
        self.resolve(&request, cancel).await
    }

    /// Every instance of one name
    pub async fn find_all_instances(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Vec<ResolvedExecutable> {
        let request = self.request([name]).all_instances();
        self.resolve(&request, cancel).await.resolved()
    }

    /// Every instance of each of several names
    pub async fn find_all_instances_many<S: AsRef<str>>(
        &self,
        names: &[S],
        cancel: &CancellationToken,
    ) -> BatchOutcome {
        let request = self.request(names.iter().map(|n| n.as_ref())).all_instances();
        self.resolve(&request, cancel).await
    }

    async fn run(&self, request: &ResolveRequest, token: &CancellationToken) -> BatchOutcome {
        let keep = request.keep();
        let mut found: HashMap<String, (Vec<PathBuf>, ResolutionSource)> = HashMap::new();

        // PATH_LOOKUP
        for (name, paths) in self.path_lookup(request, token).await {
            for path in &paths {
                events::emit(
                    self.progress.as_ref(),
                    ProgressEvent::Confirmed {
                        name: name.clone(),
                        path: path.clone(),
                    },
                );
            }
            found.insert(name, (paths, ResolutionSource::Path));
        }

        let mut pending: Vec<String> = Vec::new();
        for name in &request.names {
            if !found.contains_key(name) && !pending.contains(name) {
                pending.push(name.clone());
            }
        }
        debug!(
            "{} of {} name(s) left after PATH lookup",
            pending.len(),
            request.names.len()
        );

        // FILESYSTEM_FALLBACK
        let mut skipped = Vec::new();
        let mut aborted = false;
        if request.fallback && !pending.is_empty() && !token.is_cancelled() {
            let mode = match request.mode {
                SearchMode::First => MatchMode::First,
                SearchMode::All => MatchMode::All,
            };

            let reports = match &self.access_denied {
                None => vec![
                    self.searcher
                        .search_drives(&pending, request.depth, mode, token)
                        .await,
                ],
                Some(handler) => {
                    let (reports, stopped) = self
                        .search_interactively(handler.as_ref(), &pending, request.depth, mode, token)
                        .await;
                    aborted = stopped;
                    reports
                }
            };

            // MERGE
            for report in reports {
                for (name, matches) in report.matches {
                    let paths = matches.into_iter().map(|m| m.path).collect();
                    found.insert(name, (paths, ResolutionSource::Filesystem));
                }
                skipped.extend(report.skipped);
            }
        }

        let results = request
            .names
            .iter()
            .map(|name| match found.get(name) {
                Some((paths, source)) if !paths.is_empty() => NameOutcome {
                    name: name.clone(),
                    paths: paths.iter().take(keep).cloned().collect(),
                    source: Some(*source),
                },
                _ => NameOutcome::unresolved(name),
            })
            .collect::<Vec<_>>();

        let resolved = results.iter().filter(|r| r.is_resolved()).count();
        info!("Resolved {} of {} name(s)", resolved, results.len());

        BatchOutcome {
            results,
            skipped,
            cancelled: token.is_cancelled(),
            aborted,
        }
    }

    async fn path_lookup(
        &self,
        request: &ResolveRequest,
        token: &CancellationToken,
    ) -> Vec<(String, Vec<PathBuf>)> {
        match request.mode {
            SearchMode::First => {
                let resolution = self.resolver.try_resolve(&request.names, token).await;
                resolution
                    .resolved
                    .into_iter()
                    .map(|(name, hit)| (name, vec![hit.path]))
                    .collect()
            }
            SearchMode::All => {
                let lookups = request.names.iter().map(|name| async move {
                    (name, self.resolver.resolve_all_matches(name, token).await)
                });
                join_all(lookups)
                    .await
                    .into_iter()
                    .filter_map(|(name, outcome)| match outcome {
                        Ok(matches) if !matches.is_empty() => Some((
                            name.clone(),
                            matches.into_iter().map(|m| m.path).collect(),
                        )),
                        Ok(_) | Err(WhatExecError::Cancelled) => None,
                        Err(e) => {
                            warn!("PATH lookup for {} failed: {}", name, e);
                            None
                        }
                    })
                    .collect()
            }
        }
    }

    /// Search names one by one, asking `handler` after access errors
    ///
    /// Returns the reports gathered and whether the handler aborted.
    async fn search_interactively(
        &self,
        handler: &dyn AccessDeniedHandler,
        names: &[String],
        depth: SearchDepth,
        mode: MatchMode,
        token: &CancellationToken,
    ) -> (Vec<SearchReport>, bool) {
        let mut reports = Vec::new();
        for name in names {
            if token.is_cancelled() {
                break;
            }
            let report = self
                .searcher
                .search_drives(std::slice::from_ref(name), depth, mode, token)
                .await;
            let denied = report.access_denied();
            let unresolved = !report.unresolved.is_empty();
            reports.push(report);

            if unresolved
                && !denied.is_empty()
                && handler.on_access_denied(name, &denied).await == Continuation::Abort
            {
                info!("Search aborted after access errors while looking for {}", name);
                return (reports, true);
            }
        }
        (reports, false)
    }
}
