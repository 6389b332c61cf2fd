//! Path command - show the parsed search path

use crate::cli::args::{OutputFormat, PathArgs};
use crate::environment::{PathEnvironmentReader, PathSource};
use crate::error::WhatExecResult;
use crate::ui::{self, UiContext};
use console::style;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct PathJson {
    platform: &'static str,
    /// Null when PATH is unset
    directories: Option<Vec<PathBuf>>,
    extensions: Vec<String>,
}

/// Execute the path command
pub async fn execute(args: PathArgs) -> WhatExecResult<()> {
    let reader = PathEnvironmentReader::new();
    let listing = PathJson {
        platform: reader.platform().name(),
        directories: reader.directories(),
        extensions: reader.extensions(),
    };

    match args.format {
        OutputFormat::Table => print_table(&listing),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&listing)?),
        OutputFormat::Plain => {
            for dir in listing.directories.iter().flatten() {
                println!("{}", dir.display());
            }
        }
    }

    Ok(())
}

fn print_table(listing: &PathJson) {
    let ctx = UiContext::detect();
    ui::intro(&ctx, &format!("Search path ({})", listing.platform));

    let Some(ref directories) = listing.directories else {
        ui::step_warn_hint(&ctx, "PATH is not set", "Only explicit paths can be resolved");
        return;
    };

    println!(
        "{:<4} {:<8} {}",
        style("#").bold(),
        style("EXISTS").bold(),
        style("DIRECTORY").bold()
    );
    println!("{}", "-".repeat(60));

    for (i, dir) in directories.iter().enumerate() {
        let exists = if dir.is_dir() {
            style("yes").green()
        } else {
            style("no").red()
        };
        println!("{:<4} {:<8} {}", i + 1, exists, dir.display());
    }

    println!();
    let extensions: Vec<&str> = listing
        .extensions
        .iter()
        .map(|e| if e.is_empty() { "(none)" } else { e.as_str() })
        .collect();
    println!("{} {}", style("Extensions:").bold(), extensions.join(" "));
}
