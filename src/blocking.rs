//! Synchronous entry points for callers without an async runtime
//!
//! Each call builds a current-thread runtime and blocks on the matching
//! `ResolutionEngine` method. Calling these from inside a tokio runtime
//! panics; use the async methods there.

use crate::engine::{BatchOutcome, ResolutionEngine, ResolveRequest};
use crate::error::{WhatExecError, WhatExecResult};
use crate::query::ResolvedExecutable;
use std::future::Future;
use tokio_util::sync::CancellationToken;

fn block_on<F: Future>(future: F) -> WhatExecResult<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| WhatExecError::io("starting runtime", e))?;
    Ok(runtime.block_on(future))
}

/// Best match for one name
pub fn find(engine: &ResolutionEngine, name: &str) -> WhatExecResult<Option<ResolvedExecutable>> {
    block_on(engine.find(name, &CancellationToken::new()))
}

/// Best match for each of several names
pub fn find_many<S: AsRef<str>>(
    engine: &ResolutionEngine,
    names: &[S],
) -> WhatExecResult<BatchOutcome> {
    block_on(engine.find_many(names, &CancellationToken::new()))
}

/// Every instance of one name
pub fn find_all_instances(
    engine: &ResolutionEngine,
    name: &str,
) -> WhatExecResult<Vec<ResolvedExecutable>> {
    block_on(engine.find_all_instances(name, &CancellationToken::new()))
}

/// Every instance of each of several names
pub fn find_all_instances_many<S: AsRef<str>>(
    engine: &ResolutionEngine,
    names: &[S],
) -> WhatExecResult<BatchOutcome> {
    block_on(engine.find_all_instances_many(names, &CancellationToken::new()))
}

/// Resolve a request, failing with every unresolved name listed
pub fn resolve_required(
    engine: &ResolutionEngine,
    request: &ResolveRequest,
) -> WhatExecResult<BatchOutcome> {
    block_on(engine.resolve_required(request, &CancellationToken::new()))?
}
