//! Reconstruction of the explicit automaton from the compressed tables.
//!
//! For every state and every equivalence class, the compressed lookup chain
//! (base/chk with def fallback and meta remapping) is replayed against the
//! raw tables until it settles, and the resolved destination becomes an
//! explicit edge labeled with the class's bytes.

use log::debug;
use thiserror::Error;

use crate::classes::EquivalenceClasses;
use crate::config::RecoverConfig;
use crate::graph::{alphabet_label, DiGraph, EdgeData, NodeData, StateId};
use crate::target::{TableReader, TargetError};

/// Error type for reconstruction.
#[derive(Debug, Error)]
pub enum RecoverError {
    /// Any single out-of-bounds or failed table read is fatal: a corrupted
    /// table location invalidates the whole result, not one state.
    #[error(transparent)]
    Target(#[from] TargetError),

    /// The default chain for one (state, class) pair never reached a slot
    /// whose chk entry matched. The table construction guarantees a fixed
    /// point on well-formed input, so this means the configured offsets do
    /// not point at real scanner tables.
    #[error(
        "Default chain for state {state}, class {class} did not settle within {bound} steps"
    )]
    DefaultChainDiverged { state: StateId, class: u64, bound: u64 },
}

/// Convenience result type for reconstruction.
pub type RecoverResult<T> = Result<T, RecoverError>;

/// Replay the compressed lookup for every (state, class) pair and build the
/// explicit transition graph.
pub fn reconstruct(
    reader: &mut TableReader,
    classes: &EquivalenceClasses,
    config: &RecoverConfig,
) -> RecoverResult<DiGraph> {
    let max_state = config.max_state;
    let mut graph = DiGraph::new();

    // Every in-range state is added up front with its accept label. Anything
    // else that appears later is an implicit edge endpoint (state 0, jam
    // targets past max_state) and gets removed by the post-pass below.
    for state in 1..max_state {
        let accepts = reader.accept(state)?;
        graph.add_node(state, NodeData { accepts, label: format!("|{state}|") });
    }

    for state in 1..max_state {
        debug!("resolving transitions of state {state}");
        for (class, bytes) in classes.iter() {
            let dest = resolve(reader, state, class, max_state)?;

            if config.states_to_strip.contains(&dest) {
                continue;
            }
            if graph.extend_edge(state, dest, bytes) {
                continue;
            }
            // Class 0 covers NUL handling and bookkeeping defaults; unless
            // a real class already put this edge in the graph, it would
            // only add noise.
            if config.strip_nulls && class == 0 {
                continue;
            }
            graph.insert_edge(
                state,
                dest,
                EdgeData { alphabet: bytes.clone(), label: String::new() },
            );
        }
    }

    for (_, _, edge) in graph.edges_mut() {
        edge.label = alphabet_label(&edge.alphabet);
    }

    // Nodes that only ever appeared as edge endpoints carry no rule
    // information; drop them with their incident edges.
    let unlabeled: Vec<StateId> = graph
        .nodes()
        .filter(|(_, data)| data.label.is_empty())
        .map(|(id, _)| id)
        .collect();
    for id in unlabeled {
        graph.remove_node(id);
    }

    for (_, data) in graph.nodes_mut() {
        if data.accepts > 0 {
            data.label = format!("{}/{}", data.label, data.accepts);
        }
    }

    Ok(graph)
}

/// Follow the compressed lookup chain for one (state, class) pair until the
/// chk entry claims the slot, then return the destination.
///
/// The chain is bounded by `max_state` steps; the original tables always
/// settle, so exceeding the bound means misconfigured offsets rather than a
/// longer chain.
fn resolve(
    reader: &mut TableReader,
    state: StateId,
    class: u64,
    max_state: u64,
) -> RecoverResult<StateId> {
    let mut cursor = state;
    let mut class_cursor = class;
    let mut steps = 0u64;
    loop {
        let base = reader.base(cursor)?;
        let slot = base.saturating_add(class_cursor);
        if reader.chk(slot)? == cursor {
            return Ok(reader.nxt(slot)?);
        }
        cursor = reader.def(cursor)?;
        if cursor >= max_state {
            // Past the valid state range the scanner switches to its
            // meta-equivalence alphabet.
            class_cursor = reader.meta(class_cursor)?;
        }
        steps += 1;
        if steps > max_state {
            return Err(RecoverError::DefaultChainDiverged { state, class, bound: max_state });
        }
    }
}
