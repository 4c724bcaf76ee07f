use anyhow::Result;
use colored::*;
use comfy_table::Cell;
use serde_json::json;

use super::table;
use crate::cli::ReportFormat;
use crate::license::database::{LicenseDb, Meta};
use crate::models::CanonicalLicense;

/// List canonical license identifiers.
pub fn render_licenses(db: &LicenseDb, format: ReportFormat) -> Result<()> {
    let ids: Vec<&str> = db.licenses().map(CanonicalLicense::as_str).collect();
    match format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&ids)?),
        ReportFormat::Terminal | ReportFormat::Plain => {
            for id in ids {
                println!("{}", id);
            }
        }
    }
    Ok(())
}

/// List `(alias, license)` pairs.
pub fn render_aliases(pairs: &[(&str, &CanonicalLicense)], format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Json => {
            let rows: Vec<_> = pairs
                .iter()
                .map(|(alias, license)| json!({ "alias": alias, "license": license }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        ReportFormat::Plain => {
            for (alias, license) in pairs {
                println!("{}\t{}", alias, license);
            }
        }
        ReportFormat::Terminal => {
            let mut t = table(&["Alias", "License"]);
            for (alias, license) in pairs {
                t.add_row(vec![Cell::new(alias), Cell::new(license)]);
            }
            println!("{}", t);
        }
    }
    Ok(())
}

/// List ambiguous names with their explanation.
pub fn render_ambiguities(db: &LicenseDb, format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(db.ambiguities())?),
        ReportFormat::Plain => {
            for entry in db.ambiguities() {
                for alias in &entry.aliases {
                    println!("{}\t{}", alias, entry.name);
                }
            }
        }
        ReportFormat::Terminal => {
            let mut t = table(&["Name", "Aliases", "Problem"]);
            for entry in db.ambiguities() {
                t.add_row(vec![
                    Cell::new(&entry.name),
                    Cell::new(entry.aliases.join("\n")),
                    Cell::new(&entry.problem),
                ]);
            }
            println!("{}", t);
        }
    }
    Ok(())
}

/// Summary printed by `check` once both databases loaded cleanly.
pub fn render_check(db: &LicenseDb, format: ReportFormat, quiet: bool) -> Result<()> {
    let licenses = db.licenses().count();
    let aliases = db.aliases_matching("").len();
    let ambiguities = db.ambiguities().len();
    let ambiguous_forms: usize = db.ambiguities().iter().map(|e| e.aliases.len()).sum();

    match format {
        ReportFormat::Json => {
            let report = json!({
                "ok": true,
                "aliases": {
                    "meta": db.alias_meta(),
                    "licenses": licenses,
                    "aliases": aliases,
                },
                "ambiguities": {
                    "meta": db.ambiguity_meta(),
                    "entries": ambiguities,
                    "aliases": ambiguous_forms,
                },
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        ReportFormat::Terminal | ReportFormat::Plain => {
            println!(
                "{} alias database: {} licenses, {} aliases",
                "✓".green(),
                licenses,
                aliases
            );
            println!(
                "{} ambiguity database: {} entries, {} aliases",
                "✓".green(),
                ambiguities,
                ambiguous_forms
            );
            if !quiet {
                print_meta("alias", db.alias_meta());
                print_meta("ambiguity", db.ambiguity_meta());
            }
        }
    }
    Ok(())
}

fn print_meta(label: &str, meta: &Meta) {
    if meta.is_empty() {
        return;
    }
    println!("\n {} {} meta", "·".dimmed(), label);
    for (key, value) in meta {
        match value {
            serde_json::Value::String(s) => println!("   {}: {}", key.bold(), s),
            serde_json::Value::Array(items) => {
                println!("   {}:", key.bold());
                for item in items {
                    match item.as_str() {
                        Some(s) => println!("     - {}", s),
                        None => println!("     - {}", item),
                    }
                }
            }
            other => println!("   {}: {}", key.bold(), other),
        }
    }
}
