use std::collections::HashMap;

use anyhow::Result;
use colored::*;
use comfy_table::{Cell, Color};

use super::table;
use crate::models::{Resolution, Verdict, VerdictKind};

/// Render a colored terminal report.
pub fn render(resolutions: &[Resolution], verbose: bool, quiet: bool) -> Result<()> {
    let total = resolutions.len();
    let resolved_count = count(resolutions, VerdictKind::Resolved);
    let ambiguous_count = count(resolutions, VerdictKind::Ambiguous);
    let unknown_count = count(resolutions, VerdictKind::Unknown);

    if quiet {
        println!(
            "Total: {}  Resolved: {}  Ambiguous: {}  Unknown: {}",
            total,
            resolved_count.to_string().green(),
            ambiguous_count.to_string().yellow(),
            unknown_count.to_string().red(),
        );
        return Ok(());
    }

    println!(
        "\n {} v{}\n",
        "license-resolvr".bold(),
        env!("CARGO_PKG_VERSION")
    );

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(" │  {:<48} │", format!("License strings    : {}", total));
    println!(
        " │  {:<48} │",
        format!(
            "{}  Resolved        : {:>4}  {}",
            "✓".green(),
            resolved_count,
            top_licenses(resolutions)
        )
    );
    println!(
        " │  {:<48} │",
        format!("{}  Ambiguous       : {:>4}", "⚠".yellow(), ambiguous_count)
    );
    println!(
        " │  {:<48} │",
        format!("{}  Unknown         : {:>4}", "✗".red(), unknown_count)
    );
    println!(" └────────────────────────────────────────────────────┘\n");

    if unknown_count > 0 {
        println!(" {} License strings not recognized:\n", "[UNKNOWN]".red().bold());
        render_unknown(resolutions);
        println!();
    }

    if ambiguous_count > 0 {
        println!(
            " {} License strings that need a version:\n",
            "[AMBIGUOUS]".yellow().bold()
        );
        render_ambiguous(resolutions);
        println!();
    }

    if verbose && resolved_count > 0 {
        println!(" {} Resolved license strings:\n", "[RESOLVED]".green().bold());
        render_resolved(resolutions);
        println!();
    }

    Ok(())
}

/// Print the rewritten expression line above an expression's verdicts.
pub fn render_expression(expression: &str) {
    println!("\n {} {}", "Expression:".bold(), expression.cyan());
}

fn count(resolutions: &[Resolution], kind: VerdictKind) -> usize {
    resolutions
        .iter()
        .filter(|r| r.verdict.kind() == kind)
        .count()
}

fn render_unknown(resolutions: &[Resolution]) {
    let mut t = table(&["Input"]);
    for r in resolutions.iter().filter(|r| r.verdict.is_unknown()) {
        t.add_row(vec![Cell::new(format!("{:?}", r.input)).fg(Color::Red)]);
    }
    println!("{}", t);
}

fn render_ambiguous(resolutions: &[Resolution]) {
    let mut t = table(&["Input", "Ambiguous name", "Why"]);
    for r in resolutions {
        if let Verdict::Ambiguous {
            problem,
            explanation,
        } = &r.verdict
        {
            t.add_row(vec![
                Cell::new(&r.input),
                Cell::new(problem).fg(Color::Yellow),
                Cell::new(explanation),
            ]);
        }
    }
    println!("{}", t);
}

fn render_resolved(resolutions: &[Resolution]) {
    let mut t = table(&["Input", "License", "Via"]);
    for r in resolutions {
        if let Verdict::Resolved {
            license,
            identified_via,
        } = &r.verdict
        {
            t.add_row(vec![
                Cell::new(&r.input),
                Cell::new(license).fg(Color::Green),
                Cell::new(identified_via),
            ]);
        }
    }
    println!("{}", t);
}

/// The three most frequent resolved licenses, e.g. `[MIT (4), Apache-2.0 (2)]`.
fn top_licenses(resolutions: &[Resolution]) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in resolutions {
        if let Some(license) = r.verdict.license() {
            *counts.entry(license.as_str()).or_insert(0) += 1;
        }
    }

    let mut pairs: Vec<(&str, usize)> = counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    let summary: Vec<String> = pairs
        .iter()
        .take(3)
        .map(|(lic, cnt)| format!("{} ({})", lic, cnt))
        .collect();

    if summary.is_empty() {
        String::new()
    } else {
        format!("[{}]", summary.join(", "))
    }
}
