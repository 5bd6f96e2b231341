//! Offline inspection of a saved trace payload from the command line.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;

use tracelens_outline::StepGroup;
use tracelens_sessions::{parse_session_str, NewSession};

use crate::inspect::{graph_views, outline};

fn load_trace(path: &Path) -> Result<NewSession> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_session_str(&text).with_context(|| format!("Invalid trace in {}", path.display()))
}

pub fn handle_outline_command(path: &Path, json: bool) -> Result<()> {
    let trace = load_trace(path)?;
    let groups = outline(&trace);

    if json {
        println!("{}", serde_json::to_string_pretty(&json!({ "groups": groups }))?);
        return Ok(());
    }

    let source = trace
        .file
        .clone()
        .unwrap_or_else(|| path.display().to_string());
    println!(
        "{} {} {}",
        source.bright_blue().bold(),
        format!("{} entries", trace.entries.len()).dimmed(),
        format!("{} groups", groups.len()).dimmed()
    );

    if groups.is_empty() {
        println!("{}", "No entries recorded.".dimmed());
    } else {
        print_groups(&groups, 1);
    }
    Ok(())
}

fn print_groups(groups: &[StepGroup], depth: usize) {
    let indent = "  ".repeat(depth);
    for group in groups {
        let file = group
            .file()
            .map(|f| format!(" {}", f.dimmed()))
            .unwrap_or_default();

        match group {
            StepGroup::Single { line, entry_index, .. } => {
                println!(
                    "{}{} line {}{}",
                    indent,
                    format!("#{:<4}", entry_index).dimmed(),
                    line,
                    file
                );
            }
            StepGroup::Loop {
                line, iterations, ..
            } => {
                println!(
                    "{}{} line {}{} {}",
                    indent,
                    "loop ".yellow().bold(),
                    line,
                    file,
                    format!("x{}", iterations.len()).yellow()
                );
                for (n, iteration) in iterations.iter().enumerate() {
                    println!(
                        "{}  {} {}",
                        indent,
                        format!("iteration {}", n + 1).cyan(),
                        format!("#{}..#{}", iteration.range.start, iteration.range.end - 1).dimmed()
                    );
                    print_groups(&iteration.groups, depth + 2);
                }
            }
        }
    }
}

pub fn handle_graph_command(path: &Path, entry: Option<usize>) -> Result<()> {
    let trace = load_trace(path)?;

    let selected: Vec<usize> = match entry {
        Some(index) if index < trace.entries.len() => vec![index],
        Some(index) => anyhow::bail!(
            "Entry {} out of range ({} entries recorded)",
            index,
            trace.entries.len()
        ),
        None => (0..trace.entries.len()).collect(),
    };

    let report: Vec<_> = selected
        .into_iter()
        .filter_map(|index| {
            let entry = &trace.entries[index];
            let graphs = graph_views(entry);
            (!graphs.is_empty()).then(|| {
                json!({
                    "entryIndex": index,
                    "line": entry.line,
                    "graphs": graphs,
                })
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
