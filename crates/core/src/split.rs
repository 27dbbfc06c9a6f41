//! Per-rule splitting of the recovered automaton.
//!
//! The combined automaton accepts every rule at once; each rule level is
//! extracted as the sub-automaton of states from which that rule's
//! accepting states are reachable, with overlapping accept labels resolved
//! by promotion/demotion, and written out once per discovered start state.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;
use thiserror::Error;

use crate::artifacts::{self, ArtifactError};
use crate::graph::{DiGraph, StateId};

/// Error type for the split stage. Failures are scoped to one rule level;
/// the remaining levels still run.
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("Failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// What happened for one (rule, start) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitOutcome {
    /// Both automaton files were written.
    Written { rule: u64, start: StateId, dfa_path: PathBuf, nodes: usize, edges: usize },
    /// The sub-automaton had no edges; nothing was written.
    SkippedEmpty { rule: u64, start: StateId },
}

/// Result of one rule level.
#[derive(Debug)]
pub struct LevelReport {
    pub rule: u64,
    pub outcomes: Vec<SplitOutcome>,
    /// Set when this level failed; other levels are unaffected.
    pub error: Option<SplitError>,
}

/// Highest accept label present, plus one. Levels 2..max_accept are split;
/// level 1 is the baseline rule and only participates as intermediate data.
pub fn max_accept(graph: &DiGraph) -> u64 {
    graph.nodes().map(|(_, data)| data.accepts).max().unwrap_or(0) + 1
}

/// Split every rule level out of `graph`, writing per-(rule, start)
/// automaton files and a per-level dot rendering into `out_dir`.
pub fn split_rules(graph: &DiGraph, out_dir: &Path) -> Vec<LevelReport> {
    let reversed = graph.reverse();
    let mut reports = Vec::new();
    for rule in 2..max_accept(graph) {
        match split_level(graph, &reversed, rule, out_dir) {
            Ok(outcomes) => reports.push(LevelReport { rule, outcomes, error: None }),
            Err(error) => {
                warn!("rule {rule}: split failed: {error}");
                reports.push(LevelReport { rule, outcomes: Vec::new(), error: Some(error) });
            }
        }
    }
    reports
}

/// The candidate automaton for one rule level: the subgraph induced on
/// every state that can reach one of the level's accepting states, with
/// accept labels resolved relative to the level.
pub fn extract_level(graph: &DiGraph, reversed: &DiGraph, rule: u64) -> DiGraph {
    let out_nodes: BTreeSet<StateId> = graph
        .nodes()
        .filter(|(_, data)| data.accepts == rule)
        .map(|(id, _)| id)
        .collect();

    // Ancestors in the original graph are descendants in the reversal.
    let mut subnodes = out_nodes.clone();
    for &id in &out_nodes {
        subnodes.extend(reversed.descendants(id));
    }
    let mut level = graph.induced_subgraph(&subnodes);

    // Accept resolution within this level's view: an earlier rule reached
    // on the way here also terminates this rule along the restricted path;
    // a later rule must not be treated as accepting at all.
    for (_, data) in level.nodes_mut() {
        if data.accepts == 0 {
            continue;
        }
        if data.accepts < rule {
            data.accepts = rule;
            data.label = format!("{}/{}", data.label, rule);
        } else if data.accepts > rule {
            data.accepts = 0;
            data.label = format!("{}/None", data.label);
        }
    }
    level
}

fn split_level(
    graph: &DiGraph,
    reversed: &DiGraph,
    rule: u64,
    out_dir: &Path,
) -> Result<Vec<SplitOutcome>, SplitError> {
    let level = extract_level(graph, reversed, rule);
    artifacts::write_dot(&out_dir.join(format!("{rule}.dot")), &level)?;

    // Normally exactly one start state; disconnected levels yield several,
    // each written as its own automaton.
    let starts: Vec<StateId> = level
        .in_degrees()
        .into_iter()
        .filter(|&(_, degree)| degree == 0)
        .map(|(id, _)| id)
        .collect();

    let mut outcomes = Vec::new();
    for start in starts {
        let mut keep = level.descendants(start);
        keep.insert(start);
        let sub = level.induced_subgraph(&keep);

        if sub.edge_count() == 0 {
            warn!("rule {rule}, start {start}: sub-automaton has no edges; skipping");
            outcomes.push(SplitOutcome::SkippedEmpty { rule, start });
            continue;
        }

        let dfa_path = out_dir.join(format!("{rule}_{start}.dfa"));
        write_automaton(&dfa_path, &sub, start)?;
        outcomes.push(SplitOutcome::Written {
            rule,
            start,
            dfa_path,
            nodes: sub.node_count(),
            edges: sub.edge_count(),
        });
    }
    Ok(outcomes)
}

/// Serialize a sub-automaton in the line-oriented format consumed by the
/// test-generation stage.
///
/// Accept flags are boolean here: 1 iff the resolved accept label exceeds
/// the baseline rule. Nodes are sorted by id and edges by (src, dst), so
/// output is deterministic.
pub fn render_automaton(graph: &DiGraph, start: StateId) -> String {
    let mut out = String::new();
    out.push_str(&format!("{start}\n"));
    out.push_str(&format!("{}\n", graph.node_count()));
    for (id, data) in graph.nodes() {
        out.push_str(&format!("{} {}\n", id, if data.accepts > 1 { 1 } else { 0 }));
    }
    out.push_str(&format!("{}\n", graph.edge_count()));
    for (src, dst, edge) in graph.edges() {
        let bytes: Vec<String> = edge.alphabet.iter().map(|b| b.to_string()).collect();
        out.push_str(&format!("{} {} {}\n", src, dst, bytes.join(" ")));
    }
    out
}

/// Write the `.dfa` file and its `.dfa.nfa` twin. Both carry the same
/// grammar and identical content; downstream consumers rely on either.
pub fn write_automaton(
    dfa_path: &Path,
    graph: &DiGraph,
    start: StateId,
) -> Result<(), SplitError> {
    let body = render_automaton(graph, start);

    let mut nfa_name = OsString::from(dfa_path.as_os_str());
    nfa_name.push(".nfa");
    let nfa_path = PathBuf::from(nfa_name);

    for path in [dfa_path, nfa_path.as_path()] {
        fs::write(path, &body)
            .map_err(|source| SplitError::Write { path: path.to_path_buf(), source })?;
    }
    Ok(())
}
