//! Search command - walk drives or a directory without consulting PATH

use super::{apply_walk_args, report, spawn_canceller};
use crate::cli::args::SearchArgs;
use crate::config::Config;
use crate::engine::ResolutionEngine;
use crate::error::WhatExecResult;
use crate::events;
use crate::search::MatchMode;
use crate::ui::{SearchProgress, UiContext};
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Execute the search command
pub async fn execute(args: SearchArgs, config: &Config, verbose: bool) -> WhatExecResult<()> {
    let ctx = UiContext::detect().with_verbose(verbose);
    let config = apply_walk_args(config, &args.walk);

    let (sink, rx) = events::channel();
    let engine = ResolutionEngine::from_config(&config)?.with_progress(sink);
    let progress = SearchProgress::spawn(&ctx, rx);

    let mode = if args.all {
        MatchMode::All
    } else {
        MatchMode::First
    };
    let depth = config.search.depth;

    let cancel = CancellationToken::new();
    let canceller = spawn_canceller(cancel.clone(), config.search.deadline());
    let searcher = engine.searcher();
    let result = match args.dir {
        Some(ref dir) => {
            searcher
                .locate_in_directory(dir, args.names.as_slice(), depth, mode, &cancel)
                .await
        }
        None => Ok(searcher.search_drives(args.names.as_slice(), depth, mode, &cancel).await),
    };
    canceller.abort();

    drop(engine);
    if let Err(e) = progress.await {
        warn!("Progress task failed: {}", e);
    }

    let outcome = report::from_search(&args.names, result?);
    report::print_outcome(&ctx, &outcome, args.format)?;
    report::print_notes(&ctx, &outcome);
    outcome.into_required().map(|_| ())
}
