use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(
    name = "license-resolvr",
    about = "Resolve free-form license names to SPDX identifiers and flag ambiguous ones",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Alias database (JSON) [default: built-in table]
    #[arg(long, global = true, value_name = "FILE")]
    pub aliases: Option<PathBuf>,

    /// Ambiguity database (JSON) [default: built-in table]
    #[arg(long, global = true, value_name = "FILE")]
    pub ambiguities: Option<PathBuf>,

    /// Config file [default: ./.license-resolvr/config.toml, fallback ~/.config/license-resolvr/config.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format [default: terminal]
    #[arg(long, global = true, value_name = "FORMAT")]
    pub format: Option<ReportFormat>,

    /// Show every verdict and debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print the summary line
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve one or more license strings
    Resolve {
        /// License strings, e.g. "Apache License 2.0"
        #[arg(required = true)]
        licenses: Vec<String>,
    },

    /// Resolve a file of license strings, one per line
    Batch {
        /// Input file; `-` or omitted reads stdin
        file: Option<PathBuf>,

        /// Only report strings that could not be identified
        #[arg(long)]
        unknown_only: bool,
    },

    /// Resolve every license name in an expression such as "MIT OR GPLv2"
    Expression {
        expression: String,
    },

    /// Validate the alias and ambiguity databases
    Check,

    /// List canonical license identifiers
    Licenses,

    /// List aliases
    Aliases {
        /// Only aliases of this license (identifier or alias)
        #[arg(long, conflicts_with = "filter")]
        license: Option<String>,

        /// Only aliases of licenses whose identifier contains this text
        #[arg(long)]
        filter: Option<String>,
    },

    /// List ambiguous license names and why they are ambiguous
    Ambiguities,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Terminal,
    Json,
    /// One `input<TAB>verdict` line per string
    Plain,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolve() {
        let cli = Cli::parse_from(["license-resolvr", "resolve", "MIT License", "GPL", "--format", "json"]);
        assert_eq!(cli.format, Some(ReportFormat::Json));
        match cli.command {
            Command::Resolve { licenses } => assert_eq!(licenses, vec!["MIT License", "GPL"]),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_batch_stdin() {
        let cli = Cli::parse_from(["license-resolvr", "-q", "batch", "--unknown-only"]);
        assert!(cli.quiet);
        assert!(matches!(
            cli.command,
            Command::Batch {
                file: None,
                unknown_only: true
            }
        ));
    }

    #[test]
    fn test_aliases_flags_conflict() {
        let result = Cli::try_parse_from(["license-resolvr", "aliases", "--license", "MIT", "--filter", "BSD"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
