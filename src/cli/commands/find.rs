//! Find command - resolve names through PATH, then the filesystem

use super::{apply_walk_args, report, spawn_canceller};
use crate::cli::args::FindArgs;
use crate::config::Config;
use crate::engine::{AccessDeniedHandler, Continuation, ResolutionEngine};
use crate::error::WhatExecResult;
use crate::events;
use crate::search::SkippedEntry;
use crate::ui::{self, SearchProgress, UiContext};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Execute the find command
pub async fn execute(args: FindArgs, config: &Config, verbose: bool) -> WhatExecResult<()> {
    let ctx = UiContext::detect().with_verbose(verbose);
    let config = effective_config(config, &args);

    let (sink, rx) = events::channel();
    let mut engine = ResolutionEngine::from_config(&config)?.with_progress(sink);

    // A prompt cannot share the terminal with a live spinner
    let prompting = config.search.interactive && ctx.is_interactive();
    let progress = if prompting {
        engine = engine.with_access_denied_handler(Arc::new(PromptOnDenied { ctx: ctx.clone() }));
        drop(rx);
        None
    } else {
        Some(SearchProgress::spawn(&ctx, rx))
    };

    let mut request = engine.request(args.names.iter().cloned());
    if args.all {
        request = request.all_instances();
    }
    if let Some(limit) = args.limit {
        request = request.limit(limit);
    }
    debug!("Resolving {:?}", request);

    let cancel = CancellationToken::new();
    let canceller = spawn_canceller(cancel.clone(), None);
    let outcome = engine.resolve(&request, &cancel).await;
    canceller.abort();

    // Closes the event channel so the spinner task can finish
    drop(engine);
    if let Some(progress) = progress {
        if let Err(e) = progress.await {
            warn!("Progress task failed: {}", e);
        }
    }

    report::print_outcome(&ctx, &outcome, args.format)?;
    report::print_notes(&ctx, &outcome);
    outcome.into_required().map(|_| ())
}

fn effective_config(config: &Config, args: &FindArgs) -> Config {
    let mut config = apply_walk_args(config, &args.walk);
    if args.no_cache {
        config.cache.enabled = false;
    }
    if args.no_fallback {
        config.search.fallback = false;
    }
    if args.interactive {
        config.search.interactive = true;
    }
    config
}

/// Asks on the terminal whether to keep searching after access errors
struct PromptOnDenied {
    ctx: UiContext,
}

#[async_trait]
impl AccessDeniedHandler for PromptOnDenied {
    async fn on_access_denied(&self, name: &str, denied: &[SkippedEntry]) -> Continuation {
        ui::step_warn(
            &self.ctx,
            &format!(
                "{} not found; {} location(s) could not be read",
                name,
                denied.len()
            ),
        );
        for entry in denied.iter().take(5) {
            ui::remark(&self.ctx, &entry.path.display().to_string());
        }

        match ui::confirm(&self.ctx, "Continue searching for the remaining names?", true).await {
            Ok(true) => Continuation::Continue,
            Ok(false) => Continuation::Abort,
            Err(e) => {
                warn!("{}", e);
                Continuation::Abort
            }
        }
    }
}
