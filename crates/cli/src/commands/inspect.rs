use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;

use unflex_core::artifacts;
use unflex_core::graph::DiGraph;

use crate::canonicalize_or_current;

/// Summary of a persisted automaton, for quick sanity checks after a
/// recovery run.
#[derive(Debug, Serialize)]
pub struct GraphSummary {
    pub states: usize,
    pub edges: usize,
    pub accepting_states: usize,
    /// Accept label -> number of states carrying it.
    pub rules: BTreeMap<u64, usize>,
    /// Whether the conventional start state 1 survived reconstruction.
    pub has_start: bool,
}

pub fn summarize_graph(graph: &DiGraph) -> GraphSummary {
    let mut rules: BTreeMap<u64, usize> = BTreeMap::new();
    let mut accepting = 0;
    for (_, data) in graph.nodes() {
        if data.accepts > 0 {
            accepting += 1;
            *rules.entry(data.accepts).or_default() += 1;
        }
    }
    GraphSummary {
        states: graph.node_count(),
        edges: graph.edge_count(),
        accepting_states: accepting,
        rules,
        has_start: graph.contains_node(1),
    }
}

/// Print a summary of a graph.json artifact.
pub fn inspect_command(graph: &str, json: bool) -> Result<()> {
    let graph_path = canonicalize_or_current(graph)?;
    let automaton = artifacts::load_graph(&graph_path)?;
    let summary = summarize_graph(&automaton);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Automaton {}", graph_path.display());
    println!("  States: {} ({} accepting)", summary.states, summary.accepting_states);
    println!("  Edges: {}", summary.edges);
    if summary.rules.is_empty() {
        println!("  Rules: (none)");
    } else {
        for (rule, count) in &summary.rules {
            println!("  Rule {}: {} state(s)", rule, count);
        }
    }
    println!("  Start state 1 present: {}", if summary.has_start { "yes" } else { "no" });

    Ok(())
}
