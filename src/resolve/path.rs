//! Resolution of names through the PATH directory list

use crate::detect::ExecutableDetector;
use crate::environment::PathSource;
use crate::error::{WhatExecError, WhatExecResult};
use crate::platform::Platform;
use crate::query::{ExecutableQuery, ResolvedExecutable};
use futures_util::future::join_all;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Outcome of a batch PATH lookup
#[derive(Debug, Clone, Default)]
pub struct PathResolution {
    /// Resolved names, keyed by the name as requested
    pub resolved: HashMap<String, ResolvedExecutable>,
    /// Names with no PATH match, in request order
    pub unresolved: Vec<String>,
}

impl PathResolution {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Looks names up in PATH directories, validating every candidate
#[derive(Clone)]
pub struct PathResolver {
    source: Arc<dyn PathSource>,
    detector: Arc<ExecutableDetector>,
}

impl PathResolver {
    pub fn new(source: Arc<dyn PathSource>, detector: Arc<ExecutableDetector>) -> Self {
        Self { source, detector }
    }

    fn platform(&self) -> Platform {
        self.detector.platform()
    }

    /// Resolve a single name to the first match in PATH order
    ///
    /// `Ok(None)` means not found. Only cancellation and failures to
    /// absolutize a path query are reported as errors.
    pub async fn resolve_one(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> WhatExecResult<Option<ResolvedExecutable>> {
        let query = ExecutableQuery::new(name, self.platform());
        if query.is_path() {
            return self.resolve_in_place(&query, cancel).await;
        }

        let Some(directories) = self.directories() else {
            debug!("PATH is not set, skipping PATH lookup for {}", name);
            return Ok(None);
        };
        let extensions = self.extensions_for(&query);

        // Directory order wins over extension order
        for dir in &directories {
            for ext in &extensions {
                let candidate = dir.join(format!("{name}{ext}"));
                if self.accept(&candidate, cancel).await? {
                    debug!("Resolved {} to {}", name, candidate.display());
                    return Ok(Some(ResolvedExecutable::new(name, candidate)));
                }
            }
        }

        Ok(None)
    }

    /// Every PATH match for a name, in PATH order
    pub async fn resolve_all_matches(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> WhatExecResult<Vec<ResolvedExecutable>> {
        let query = ExecutableQuery::new(name, self.platform());
        if query.is_path() {
            return Ok(self
                .resolve_in_place(&query, cancel)
                .await?
                .into_iter()
                .collect());
        }

        let Some(directories) = self.directories() else {
            return Ok(Vec::new());
        };
        let extensions = self.extensions_for(&query);

        let mut matches: Vec<ResolvedExecutable> = Vec::new();
        for dir in &directories {
            for ext in &extensions {
                let candidate = dir.join(format!("{name}{ext}"));
                if matches.iter().any(|m| m.path == candidate) {
                    continue;
                }
                if self.accept(&candidate, cancel).await? {
                    matches.push(ResolvedExecutable::new(name, candidate));
                }
            }
        }

        Ok(matches)
    }

    /// Resolve many names concurrently, reporting partial success
    ///
    /// Cancellation leaves the unsettled names in `unresolved`.
    pub async fn try_resolve<S: AsRef<str>>(
        &self,
        names: &[S],
        cancel: &CancellationToken,
    ) -> PathResolution {
        let lookups = names.iter().map(|name| async move {
            let name = name.as_ref();
            (name, self.resolve_one(name, cancel).await)
        });

        let mut resolution = PathResolution::default();
        for (name, outcome) in join_all(lookups).await {
            match outcome {
                Ok(Some(found)) => {
                    resolution.resolved.insert(name.to_string(), found);
                }
                Ok(None) | Err(WhatExecError::Cancelled) => {
                    resolution.unresolved.push(name.to_string());
                }
                Err(e) => {
                    warn!("PATH lookup for {} failed: {}", name, e);
                    resolution.unresolved.push(name.to_string());
                }
            }
        }
        resolution
    }

    /// Resolve every name or fail with a single error listing the misses
    pub async fn resolve<S: AsRef<str>>(
        &self,
        names: &[S],
        cancel: &CancellationToken,
    ) -> WhatExecResult<HashMap<String, ResolvedExecutable>> {
        let resolution = self.try_resolve(names, cancel).await;
        if !resolution.is_complete() {
            return Err(WhatExecError::not_found(resolution.unresolved));
        }
        Ok(resolution.resolved)
    }

    /// PATH directories made absolute against the working directory
    fn directories(&self) -> Option<Vec<PathBuf>> {
        let directories = self.source.directories()?;
        Some(
            directories
                .into_iter()
                .map(|dir| match std::path::absolute(&dir) {
                    Ok(absolute) => absolute,
                    Err(e) => {
                        debug!("Keeping PATH entry {} as is: {}", dir.display(), e);
                        dir
                    }
                })
                .collect(),
        )
    }

    /// Extensions to try: the full list only on Windows for a bare name
    fn extensions_for(&self, query: &ExecutableQuery) -> Vec<String> {
        if self.platform().is_windows() && query.has_extension() {
            vec![String::new()]
        } else {
            self.source.extensions()
        }
    }

    async fn resolve_in_place(
        &self,
        query: &ExecutableQuery,
        cancel: &CancellationToken,
    ) -> WhatExecResult<Option<ResolvedExecutable>> {
        let path = std::path::absolute(PathBuf::from(query.as_str()))
            .map_err(|e| WhatExecError::io(format!("resolving {}", query.as_str()), e))?;

        if self.accept(&path, cancel).await? {
            Ok(Some(ResolvedExecutable::new(query.as_str(), path)))
        } else {
            Ok(None)
        }
    }

    /// Validate one candidate; missing or unreadable files are a miss
    async fn accept(&self, candidate: &Path, cancel: &CancellationToken) -> WhatExecResult<bool> {
        match self.detector.is_executable(candidate, cancel).await {
            Ok(verdict) => Ok(verdict),
            Err(WhatExecError::Cancelled) => Err(WhatExecError::Cancelled),
            Err(WhatExecError::FileNotFound(_)) => Ok(false),
            Err(e) => {
                debug!("Skipping {}: {}", candidate.display(), e);
                Ok(false)
            }
        }
    }
}
