//! Artifact serialization: the persisted graph, its derived tables, and the
//! dot renderings handed to later stages and to visualization tooling.
//!
//! The graph artifact is a typed JSON document so the split stage (and any
//! other consumer) gets every node and edge attribute back exactly; the
//! flattened transition table serves consumers that need per-byte lookups
//! instead of alphabet sets.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::{DiGraph, EdgeData, NodeData, StateId};

/// Error type for artifact reads and writes.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("Failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to parse graph document {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },

    #[error("Failed to encode {path}: {source}")]
    Encode { path: PathBuf, source: serde_json::Error },
}

/// Convenience result type for artifact operations.
pub type ArtifactResult<T> = Result<T, ArtifactError>;

/// Computed artifact paths under the output directory.
///
/// This does *not* touch the filesystem; frontends create the directory and
/// call the writers below.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    pub out_dir: PathBuf,
    /// The recovered automaton (typed JSON, lossless).
    pub graph_path: PathBuf,
    /// Flattened (state, byte) -> (next, accept) lookups.
    pub transitions_path: PathBuf,
    /// Accepting state -> exit bytes.
    pub exits_path: PathBuf,
    /// Dot rendering of the full graph.
    pub full_dot_path: PathBuf,
    /// Dot rendering of the subgraph reachable from the start state.
    pub start_dot_path: PathBuf,
    /// Run manifest written by the CLI.
    pub manifest_path: PathBuf,
}

impl OutputLayout {
    pub fn new(out_dir: impl AsRef<Path>) -> Self {
        let out_dir = out_dir.as_ref().to_path_buf();
        Self {
            graph_path: out_dir.join("graph.json"),
            transitions_path: out_dir.join("transitions.json"),
            exits_path: out_dir.join("exits.json"),
            full_dot_path: out_dir.join("out.dot"),
            start_dot_path: out_dir.join("start.dot"),
            manifest_path: out_dir.join("recovery.json"),
            out_dir,
        }
    }
}

/// One node of the persisted graph document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: StateId,
    pub accepts: u64,
    pub label: String,
}

/// One edge of the persisted graph document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub src: StateId,
    pub dst: StateId,
    /// Sorted byte values.
    pub alphabet: Vec<u8>,
    pub label: String,
}

/// Lossless on-disk form of the recovered automaton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDoc {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

impl GraphDoc {
    pub fn from_graph(graph: &DiGraph) -> Self {
        let nodes = graph
            .nodes()
            .map(|(id, data)| NodeRecord {
                id,
                accepts: data.accepts,
                label: data.label.clone(),
            })
            .collect();
        let edges = graph
            .edges()
            .map(|(src, dst, data)| EdgeRecord {
                src,
                dst,
                alphabet: data.alphabet.iter().copied().collect(),
                label: data.label.clone(),
            })
            .collect();
        Self { nodes, edges }
    }

    pub fn into_graph(self) -> DiGraph {
        let mut graph = DiGraph::new();
        for node in self.nodes {
            graph.add_node(node.id, NodeData { accepts: node.accepts, label: node.label });
        }
        for edge in self.edges {
            graph.insert_edge(
                edge.src,
                edge.dst,
                EdgeData {
                    alphabet: edge.alphabet.into_iter().collect(),
                    label: edge.label,
                },
            );
        }
        graph
    }
}

/// One entry of the flattened transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub next: StateId,
    pub accept: u64,
}

/// Expand every edge's alphabet into per-byte lookups:
/// state -> byte -> (next state, accept label of the next state).
pub fn transition_table(graph: &DiGraph) -> BTreeMap<StateId, BTreeMap<u8, Transition>> {
    let mut table: BTreeMap<StateId, BTreeMap<u8, Transition>> = BTreeMap::new();
    for (src, dst, edge) in graph.edges() {
        let accept = graph.node(dst).map(|data| data.accepts).unwrap_or(0);
        let row = table.entry(src).or_default();
        for &byte in &edge.alphabet {
            row.insert(byte, Transition { next: dst, accept });
        }
    }
    table
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> ArtifactResult<()> {
    // Pretty-printed so artifacts stay diffable across runs.
    let body = serde_json::to_string_pretty(value)
        .map_err(|source| ArtifactError::Encode { path: path.to_path_buf(), source })?;
    fs::write(path, body)
        .map_err(|source| ArtifactError::Write { path: path.to_path_buf(), source })
}

/// Persist the automaton as a typed JSON document.
pub fn write_graph(path: &Path, graph: &DiGraph) -> ArtifactResult<()> {
    write_json(path, &GraphDoc::from_graph(graph))
}

/// Load an automaton persisted with [`write_graph`].
pub fn load_graph(path: &Path) -> ArtifactResult<DiGraph> {
    let body = fs::read_to_string(path)
        .map_err(|source| ArtifactError::Read { path: path.to_path_buf(), source })?;
    let doc: GraphDoc = serde_json::from_str(&body)
        .map_err(|source| ArtifactError::Parse { path: path.to_path_buf(), source })?;
    Ok(doc.into_graph())
}

/// Persist the flattened transition table.
pub fn write_transitions(path: &Path, graph: &DiGraph) -> ArtifactResult<()> {
    write_json(path, &transition_table(graph))
}

/// Persist the exit-alphabet table.
pub fn write_exits(path: &Path, exits: &BTreeMap<StateId, Vec<u8>>) -> ArtifactResult<()> {
    write_json(path, exits)
}

/// Render the graph in Graphviz dot form. Accepting states are drawn as
/// double circles, the usual automaton notation.
pub fn render_dot(graph: &DiGraph) -> String {
    let mut out = String::from("digraph {\n");
    for (id, data) in graph.nodes() {
        let shape = if data.accepts > 0 { ", shape=doublecircle" } else { "" };
        out.push_str(&format!("    {} [label=\"{}\"{}];\n", id, escape_dot(&data.label), shape));
    }
    for (src, dst, edge) in graph.edges() {
        out.push_str(&format!(
            "    {} -> {} [label=\"{}\"];\n",
            src,
            dst,
            escape_dot(&edge.label)
        ));
    }
    out.push_str("}\n");
    out
}

fn escape_dot(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Render and write a dot file.
pub fn write_dot(path: &Path, graph: &DiGraph) -> ArtifactResult<()> {
    fs::write(path, render_dot(graph))
        .map_err(|source| ArtifactError::Write { path: path.to_path_buf(), source })
}
