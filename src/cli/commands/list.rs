//! List command - every executable below a directory

use super::{apply_walk_args, report, spawn_canceller};
use crate::cli::args::{ListArgs, OutputFormat};
use crate::config::Config;
use crate::engine::ResolutionEngine;
use crate::error::WhatExecResult;
use crate::search::ExecutableListing;
use crate::ui::{self, UiContext};
use console::style;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

#[derive(Serialize)]
struct ListingJson<'a> {
    directory: &'a Path,
    executables: &'a [PathBuf],
    skipped: usize,
    cancelled: bool,
}

/// Execute the list command
pub async fn execute(args: ListArgs, config: &Config) -> WhatExecResult<()> {
    let ctx = UiContext::detect();
    let config = apply_walk_args(config, &args.walk);
    let engine = ResolutionEngine::from_config(&config)?;

    let cancel = CancellationToken::new();
    let canceller = spawn_canceller(cancel.clone(), config.search.deadline());
    let listing = engine
        .searcher()
        .list_executables(&args.dir, config.search.depth, &cancel)
        .await;
    canceller.abort();
    let listing = listing?;

    if listing.executables.is_empty() && args.format == OutputFormat::Table {
        ui::step_info(
            &ctx,
            &format!("No executables under {}", args.dir.display()),
        );
        report::print_skipped(&ctx, &listing.skipped);
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&ctx, &args.dir, &listing),
        OutputFormat::Json => print_json(&args.dir, &listing)?,
        OutputFormat::Plain => print_plain(&listing),
    }

    if listing.cancelled {
        ui::step_warn(&ctx, "Listing stopped before it finished");
    }
    report::print_skipped(&ctx, &listing.skipped);
    Ok(())
}

fn print_table(ctx: &UiContext, dir: &Path, listing: &ExecutableListing) {
    ui::intro(ctx, &format!("Executables in {}", dir.display()));

    println!("{:<24} {}", style("NAME").bold(), style("PATH").bold());
    println!("{}", "-".repeat(72));

    for path in &listing.executables {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("{:<24} {}", name, style(path.display()).dim());
    }

    println!();
    println!("{} executable(s)", listing.executables.len());
}

fn print_json(dir: &Path, listing: &ExecutableListing) -> WhatExecResult<()> {
    let json = serde_json::to_string_pretty(&ListingJson {
        directory: dir,
        executables: &listing.executables,
        skipped: listing.skipped.len(),
        cancelled: listing.cancelled,
    })?;
    println!("{}", json);
    Ok(())
}

fn print_plain(listing: &ExecutableListing) {
    for path in &listing.executables {
        println!("{}", path.display());
    }
}
