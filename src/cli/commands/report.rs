//! Shared rendering of batch results

use crate::cli::args::OutputFormat;
use crate::engine::{BatchOutcome, NameOutcome, ResolutionSource};
use crate::error::WhatExecResult;
use crate::search::{SearchReport, SkippedEntry};
use crate::ui::{self, UiContext};
use console::style;

/// Shape a fallback search report like an engine batch, in `names` order
pub fn from_search(names: &[String], report: SearchReport) -> BatchOutcome {
    let results = names
        .iter()
        .map(|name| {
            let paths: Vec<_> = report
                .matches
                .get(name)
                .map(|found| found.iter().map(|r| r.path.clone()).collect())
                .unwrap_or_default();
            NameOutcome {
                name: name.clone(),
                source: (!paths.is_empty()).then_some(ResolutionSource::Filesystem),
                paths,
            }
        })
        .collect();

    BatchOutcome {
        results,
        skipped: report.skipped,
        cancelled: report.cancelled,
        aborted: false,
    }
}

/// Print a batch in the requested format
pub fn print_outcome(ctx: &UiContext, outcome: &BatchOutcome, format: OutputFormat) -> WhatExecResult<()> {
    match format {
        OutputFormat::Table => print_table(ctx, outcome),
        OutputFormat::Json => print_json(outcome)?,
        OutputFormat::Plain => print_plain(outcome),
    }
    Ok(())
}

/// Warn about early stops and unreadable entries
pub fn print_notes(ctx: &UiContext, outcome: &BatchOutcome) {
    if outcome.cancelled {
        ui::step_warn_hint(ctx, "Search stopped before it finished", "Raise --timeout to search longer");
    }
    if outcome.aborted {
        ui::step_warn(ctx, "Search aborted after access errors");
    }
    print_skipped(ctx, &outcome.skipped);
}

/// Summarise unreadable entries, listing each one when verbose
pub fn print_skipped(ctx: &UiContext, skipped: &[SkippedEntry]) {
    let Some(summary) = skipped_summary(skipped, ctx.is_verbose()) else {
        return;
    };
    if ctx.is_verbose() {
        for line in skipped_details(skipped) {
            ui::step_warn(ctx, &format!("Skipped {}", line));
        }
    }
    ui::remark(ctx, &summary);
}

fn skipped_summary(skipped: &[SkippedEntry], verbose: bool) -> Option<String> {
    if skipped.is_empty() {
        return None;
    }
    let denied = skipped.iter().filter(|s| s.permission_denied).count();
    let mut summary = format!(
        "{} entr{} skipped ({} access denied)",
        skipped.len(),
        if skipped.len() == 1 { "y" } else { "ies" },
        denied
    );
    if !verbose {
        summary.push_str("; use -v to list them");
    }
    Some(summary)
}

fn skipped_details(skipped: &[SkippedEntry]) -> Vec<String> {
    skipped
        .iter()
        .map(|entry| format!("{} ({})", entry.path.display(), entry.reason))
        .collect()
}

fn print_table(ctx: &UiContext, outcome: &BatchOutcome) {
    ui::intro(ctx, "Executables");

    println!(
        "{:<20} {:<12} {}",
        style("NAME").bold(),
        style("SOURCE").bold(),
        style("PATH").bold()
    );
    println!("{}", "-".repeat(72));

    for result in &outcome.results {
        let source = match result.source {
            Some(ResolutionSource::Path) => style("path").green(),
            Some(ResolutionSource::Filesystem) => style("filesystem").cyan(),
            None => style("-").dim(),
        };

        if result.paths.is_empty() {
            println!("{:<20} {:<12} {}", result.name, source, style("not found").red());
            continue;
        }
        for (i, path) in result.paths.iter().enumerate() {
            let name = if i == 0 { result.name.as_str() } else { "" };
            println!("{:<20} {:<12} {}", name, source, path.display());
        }
    }

    let resolved = outcome.results.iter().filter(|r| r.is_resolved()).count();
    println!();
    println!("{} of {} resolved", resolved, outcome.results.len());
}

fn print_json(outcome: &BatchOutcome) -> WhatExecResult<()> {
    let json = serde_json::to_string_pretty(outcome)?;
    println!("{}", json);
    Ok(())
}

fn print_plain(outcome: &BatchOutcome) {
    for result in &outcome.results {
        for path in &result.paths {
            println!("{}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ResolvedExecutable;
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn search_report_keeps_request_order() {
        let mut matches = HashMap::new();
        matches.insert(
            "tool".to_string(),
            vec![ResolvedExecutable::new("tool", PathBuf::from("/opt/tool"))],
        );
        let report = SearchReport {
            matches,
            unresolved: vec!["missing".into()],
            skipped: vec![],
            cancelled: true,
        };

        let outcome = from_search(&["missing".into(), "tool".into()], report);
        assert_eq!(outcome.results[0].name, "missing");
        assert!(!outcome.results[0].is_resolved());
        assert_eq!(outcome.results[0].source, None);
        assert_eq!(outcome.results[1].best(), Some(&PathBuf::from("/opt/tool")));
        assert_eq!(outcome.results[1].source, Some(ResolutionSource::Filesystem));
        assert!(outcome.cancelled);
    }

    fn skipped_entries() -> Vec<SkippedEntry> {
        vec![
            SkippedEntry {
                path: PathBuf::from("/root"),
                reason: "permission denied".into(),
                permission_denied: true,
            },
            SkippedEntry {
                path: PathBuf::from("/mnt/stale"),
                reason: "stale file handle".into(),
                permission_denied: false,
            },
        ]
    }

    #[test]
    fn skipped_summary_points_to_verbose_flag() {
        assert_eq!(skipped_summary(&[], false), None);
        assert_eq!(
            skipped_summary(&skipped_entries(), false).unwrap(),
            "2 entries skipped (1 access denied); use -v to list them"
        );
        assert_eq!(
            skipped_summary(&skipped_entries()[..1], true).unwrap(),
            "1 entry skipped (1 access denied)"
        );
    }

    #[test]
    fn verbose_listing_names_every_entry() {
        assert_eq!(
            skipped_details(&skipped_entries()),
            vec!["/root (permission denied)", "/mnt/stale (stale file handle)"]
        );

        let ctx = UiContext::non_interactive().with_verbose(true);
        print_skipped(&ctx, &skipped_entries());
    }

    #[test]
    fn printing_does_not_panic() {
        let ctx = UiContext::non_interactive();
        let outcome = BatchOutcome {
            results: vec![NameOutcome {
                name: "git".into(),
                paths: vec![PathBuf::from("/usr/bin/git")],
                source: Some(ResolutionSource::Path),
            }],
            ..Default::default()
        };
        for format in [OutputFormat::Table, OutputFormat::Json, OutputFormat::Plain] {
            print_outcome(&ctx, &outcome, format).unwrap();
        }
        print_notes(&ctx, &outcome);
    }
}
