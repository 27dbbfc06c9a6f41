//! Exit alphabets: the bytes on which a token match necessarily ends.

use std::collections::BTreeMap;

use crate::graph::{DiGraph, StateId};

/// For every accepting state, the sorted byte values 1..=255 that continue
/// no outgoing transition. Seeing one of these bytes in that state means
/// the token boundary has been reached.
///
/// Accepting states with no outgoing edges map to all 255 values. Pure
/// function over the finished automaton; the graph is not touched.
pub fn analyze_exits(graph: &DiGraph) -> BTreeMap<StateId, Vec<u8>> {
    let mut exits = BTreeMap::new();
    for (id, data) in graph.nodes() {
        if data.accepts == 0 {
            continue;
        }
        let mut covered = [false; 256];
        for (_, edge) in graph.out_edges(id) {
            for &byte in &edge.alphabet {
                covered[byte as usize] = true;
            }
        }
        let bytes: Vec<u8> = (1..=255u8).filter(|&b| !covered[b as usize]).collect();
        exits.insert(id, bytes);
    }
    exits
}
