use std::fs;

use anyhow::{Context, Result};

use unflex_core::artifacts;
use unflex_core::split::{self, SplitOutcome};

use crate::canonicalize_or_current;

/// Split a persisted automaton into per-rule automaton files.
///
/// A failure in one rule level is reported and the remaining levels still
/// run; only loading the graph or creating the output directory aborts.
pub fn split_command(graph: &str, out_dir: &str) -> Result<()> {
    let graph_path = canonicalize_or_current(graph)?;
    let out_path = canonicalize_or_current(out_dir)?;
    fs::create_dir_all(&out_path)
        .with_context(|| format!("Failed to create output dir: {}", out_path.display()))?;

    let automaton = artifacts::load_graph(&graph_path)?;

    println!("Splitting {} into per-rule automata:", graph_path.display());
    let reports = split::split_rules(&automaton, &out_path);
    if reports.is_empty() {
        println!("  (no rule levels above the baseline)");
        return Ok(());
    }

    let mut failures = 0;
    for report in &reports {
        if let Some(error) = &report.error {
            failures += 1;
            eprintln!("  rule {}: FAILED: {}", report.rule, error);
            continue;
        }
        if report.outcomes.is_empty() {
            println!("  rule {}: no start states", report.rule);
        }
        for outcome in &report.outcomes {
            match outcome {
                SplitOutcome::Written { start, dfa_path, nodes, edges, .. } => {
                    println!(
                        "  rule {} start {}: {} states, {} edges -> {}",
                        report.rule,
                        start,
                        nodes,
                        edges,
                        dfa_path.display()
                    );
                }
                SplitOutcome::SkippedEmpty { start, .. } => {
                    println!("  rule {} start {}: skipped (no edges)", report.rule, start);
                }
            }
        }
    }
    if failures > 0 {
        println!("{failures} rule level(s) failed; the remaining levels completed.");
    }

    Ok(())
}
