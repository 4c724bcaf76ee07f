//! Renderers for resolution verdicts and database listings.
//!
//! - [`terminal`] — colored summary box and verdict tables; respects `--verbose` / `--quiet`.
//! - [`catalog`] — listings of licenses, aliases and ambiguities, and the `check` summary.
//!
//! JSON and plain-text output, and the table style both renderers share, are
//! small enough to live here.

pub mod catalog;
pub mod terminal;

use anyhow::Result;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};

use crate::cli::ReportFormat;
use crate::models::{ExpressionResolution, Resolution, Verdict};

/// Render verdicts in the requested format.
pub fn render(
    resolutions: &[Resolution],
    format: ReportFormat,
    verbose: bool,
    quiet: bool,
) -> Result<()> {
    match format {
        ReportFormat::Terminal => terminal::render(resolutions, verbose, quiet),
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(resolutions)?);
            Ok(())
        }
        ReportFormat::Plain => {
            for line in plain_lines(resolutions) {
                println!("{}", line);
            }
            Ok(())
        }
    }
}

/// Render a rewritten expression followed by the verdict of each term.
pub fn render_expression(
    result: &ExpressionResolution,
    format: ReportFormat,
    verbose: bool,
    quiet: bool,
) -> Result<()> {
    match format {
        ReportFormat::Terminal => {
            terminal::render_expression(&result.expression);
            terminal::render(&result.terms, verbose, quiet)
        }
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result)?);
            Ok(())
        }
        ReportFormat::Plain => {
            println!("{}\t{}", result.input, result.expression);
            for line in plain_lines(&result.terms) {
                println!("{}", line);
            }
            Ok(())
        }
    }
}

/// A table with bold headers in the report's common style.
pub(crate) fn table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        );
    table
}

/// `input<TAB>verdict` lines, suitable for `cut`/`grep`.
pub fn plain_lines(resolutions: &[Resolution]) -> Vec<String> {
    resolutions
        .iter()
        .map(|r| match &r.verdict {
            Verdict::Resolved { license, .. } => format!("{}\t{}", r.input, license),
            Verdict::Ambiguous { problem, .. } => format!("{}\tambiguous:{}", r.input, problem),
            Verdict::Unknown { .. } => format!("{}\tunknown", r.input),
        })
        .collect()
}

/// Whether the run should exit non-zero: any unknown string, or any ambiguous
/// one unless ambiguity is allowed.
pub fn has_failures(resolutions: &[Resolution], allow_ambiguous: bool) -> bool {
    resolutions
        .iter()
        .any(|r| r.verdict.is_unknown() || (!allow_ambiguous && r.verdict.is_ambiguous()))
}
