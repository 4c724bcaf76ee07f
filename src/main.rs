//! `license-resolvr` — map free-form license names to SPDX identifiers and flag
//! names that are ambiguous without a version.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]) and set up logging.
//! 2. Load config ([`config::load_config`]).
//! 3. Load and validate the alias and ambiguity databases
//!    ([`license::database::LicenseDb`]); any integrity error aborts here.
//! 4. Resolve the requested strings ([`license::resolver::Resolver`]) or list
//!    the database contents.
//! 5. Render the verdicts ([`report`]).
//! 6. Exit `0` when every string resolved, `1` when any is unknown (or ambiguous,
//!    unless `allow_ambiguous` is configured).

mod cli;
mod config;
mod error;
mod license;
mod models;
mod report;

use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command, ReportFormat};
use config::load_config;
use license::database::LicenseDb;
use license::resolver::Resolver;
use models::{CanonicalLicense, Resolution};

/// Inputs per progress-bar step in `batch`.
const BATCH_SIZE: usize = 512;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    let config = load_config(&cwd, cli.config.as_deref())?;

    let aliases_path = cli.aliases.clone().or(config.database.aliases.clone());
    let ambiguities_path = cli.ambiguities.clone().or(config.database.ambiguities.clone());
    let db = LicenseDb::from_paths(aliases_path.as_deref(), ambiguities_path.as_deref())
        .context("failed to load license databases")?;
    let resolver = Resolver::new(&db);

    let format = cli
        .format
        .or(config.report.format)
        .unwrap_or(ReportFormat::Terminal);

    // Single lookups always show their result, not only the summary
    let verbose = cli.verbose || !matches!(cli.command, Command::Batch { .. });

    let resolutions = match cli.command {
        Command::Resolve { licenses } => resolver.resolve_batch(&licenses),
        Command::Expression { expression } => {
            let result = resolver.resolve_expression(&expression);
            debug!(expression = %result.expression, terms = result.terms.len(), "rewrote expression");
            report::render_expression(&result, format, verbose, cli.quiet)?;
            if report::has_failures(&result.terms, config.report.allow_ambiguous) {
                std::process::exit(1);
            }
            return Ok(());
        }
        Command::Batch { file, unknown_only } => {
            let inputs = read_inputs(file.as_deref())?;
            info!(count = inputs.len(), "resolving batch");
            let mut resolutions = resolve_with_progress(resolver, &inputs, cli.quiet);
            if unknown_only {
                resolutions.retain(|r| r.verdict.is_unknown());
            }
            resolutions
        }
        Command::Check => {
            report::catalog::render_check(&db, format, cli.quiet)?;
            return Ok(());
        }
        Command::Licenses => {
            report::catalog::render_licenses(&db, format)?;
            return Ok(());
        }
        Command::Aliases { license, filter } => {
            let pairs: Vec<(&str, &CanonicalLicense)> = match license {
                Some(name) => match db.aliases_of(&name) {
                    Some(entry) => entry
                        .aliases
                        .iter()
                        .map(|a| (a.as_str(), &entry.license))
                        .collect(),
                    None => bail!("no license named {:?} in the alias database", name),
                },
                None => db.aliases_matching(filter.as_deref().unwrap_or("")),
            };
            report::catalog::render_aliases(&pairs, format)?;
            return Ok(());
        }
        Command::Ambiguities => {
            report::catalog::render_ambiguities(&db, format)?;
            return Ok(());
        }
    };

    report::render(&resolutions, format, verbose, cli.quiet)?;

    if report::has_failures(&resolutions, config.report.allow_ambiguous) {
        std::process::exit(1);
    }

    Ok(())
}

/// Read candidate strings, one per line, from `path` or stdin (`None` or `-`).
/// Blank lines and `#` comments are skipped.
fn read_inputs(path: Option<&Path>) -> Result<Vec<String>> {
    let reader: Box<dyn BufRead> = match path {
        Some(p) if p != Path::new("-") => {
            debug!(path = %p.display(), "reading license strings");
            let file = std::fs::File::open(p)
                .with_context(|| format!("failed to open {}", p.display()))?;
            Box::new(BufReader::new(file))
        }
        _ => Box::new(BufReader::new(std::io::stdin())),
    };
    parse_inputs(reader)
}

fn parse_inputs(reader: impl BufRead) -> Result<Vec<String>> {
    let mut inputs = Vec::new();
    for line in reader.lines() {
        let line = line.context("failed to read input")?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        inputs.push(line.trim_end_matches('\r').to_string());
    }
    Ok(inputs)
}

fn resolve_with_progress(resolver: Resolver<'_>, inputs: &[String], quiet: bool) -> Vec<Resolution> {
    if quiet || inputs.len() <= BATCH_SIZE {
        return resolver.resolve_batch(inputs);
    }

    let pb = ProgressBar::new(inputs.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }

    let mut resolutions = Vec::with_capacity(inputs.len());
    for chunk in inputs.chunks(BATCH_SIZE) {
        resolutions.extend(resolver.resolve_batch(chunk));
        pb.inc(chunk.len() as u64);
    }
    pb.finish_with_message("Done");
    resolutions
}
