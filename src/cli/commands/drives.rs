//! Drives command - show what a fallback search would walk

use crate::cli::args::{DrivesArgs, OutputFormat};
use crate::config::Config;
use crate::error::{WhatExecError, WhatExecResult};
use crate::platform::Platform;
use crate::search::{Drive, DriveEnumerator, DriveFilter, SystemDrives};
use crate::ui::{self, UiContext};
use console::style;
use serde::Serialize;

#[derive(Serialize)]
struct DriveRow {
    #[serde(flatten)]
    drive: Drive,
    searchable: bool,
}

/// Execute the drives command
pub async fn execute(args: DrivesArgs, config: &Config) -> WhatExecResult<()> {
    let filter = config.search.drive_filter(Platform::detect());
    let rows = tokio::task::spawn_blocking(|| SystemDrives.drives())
        .await
        .map_err(|e| WhatExecError::Internal(format!("Drive enumeration failed: {}", e)))?;
    let rows = rows_for(rows, &filter, args.all);

    if rows.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                let ctx = UiContext::detect();
                ui::step_info(&ctx, "No searchable drives");
            }
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&rows),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Plain => {
            for row in &rows {
                println!("{}", row.drive.root.display());
            }
        }
    }

    Ok(())
}

fn rows_for(drives: Vec<Drive>, filter: &DriveFilter, all: bool) -> Vec<DriveRow> {
    drives
        .into_iter()
        .map(|drive| DriveRow {
            searchable: filter.is_searchable(&drive),
            drive,
        })
        .filter(|row| all || row.searchable)
        .collect()
}

fn print_table(rows: &[DriveRow]) {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "Drives");

    println!(
        "{:<28} {:<10} {:<10} {:>10} {:>10} {}",
        style("ROOT").bold(),
        style("KIND").bold(),
        style("FS").bold(),
        style("SIZE").bold(),
        style("FREE").bold(),
        style("SEARCH").bold()
    );
    println!("{}", "-".repeat(80));

    for row in rows {
        let searchable = if row.searchable {
            style("yes").green()
        } else {
            style("no").dim()
        };
        println!(
            "{:<28} {:<10} {:<10} {:>10} {:>10} {}",
            row.drive.root.display(),
            row.drive.kind.as_str(),
            row.drive.file_system,
            format_bytes(row.drive.total_space),
            format_bytes(row.drive.available_space),
            searchable
        );
    }

    println!();
    println!("{} drive(s)", rows.len());
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "K", "M", "G", "T"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{}{}", bytes, UNITS[0])
    } else {
        format!("{:.1}{}", value, UNITS[unit])
    }
}
