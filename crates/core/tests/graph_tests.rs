use std::collections::BTreeSet;

use unflex_core::graph::{alphabet_label, DiGraph, EdgeData, NodeData};

fn edge(bytes: &[u8]) -> EdgeData {
    EdgeData { alphabet: bytes.iter().copied().collect(), label: String::new() }
}

fn diamond() -> DiGraph {
    // 1 -> 2 -> 4, 1 -> 3 -> 4
    let mut graph = DiGraph::new();
    for id in 1..=4 {
        graph.add_node(id, NodeData { accepts: 0, label: format!("|{id}|") });
    }
    graph.insert_edge(1, 2, edge(b"a"));
    graph.insert_edge(1, 3, edge(b"b"));
    graph.insert_edge(2, 4, edge(b"c"));
    graph.insert_edge(3, 4, edge(b"d"));
    graph
}

#[test]
fn extend_edge_unions_into_existing_alphabets_only() {
    let mut graph = diamond();
    assert!(graph.extend_edge(1, 2, &BTreeSet::from([b'z'])));
    assert!(!graph.extend_edge(4, 1, &BTreeSet::from([b'z'])));

    let (_, data) = graph.out_edges(1).next().expect("edge 1->2");
    assert_eq!(data.alphabet, BTreeSet::from([b'a', b'z']));
    assert_eq!(graph.edge_count(), 4);
}

#[test]
fn remove_node_drops_incident_edges() {
    let mut graph = diamond();
    graph.remove_node(2);
    assert!(!graph.contains_node(2));
    assert_eq!(graph.edge_count(), 2);
    assert!(graph.edges().all(|(src, dst, _)| src != 2 && dst != 2));
}

#[test]
fn descendants_follow_edges_forward_only() {
    let graph = diamond();
    assert_eq!(graph.descendants(1), BTreeSet::from([2, 3, 4]));
    assert_eq!(graph.descendants(2), BTreeSet::from([4]));
    assert_eq!(graph.descendants(4), BTreeSet::new());
}

#[test]
fn reverse_flips_reachability() {
    let reversed = diamond().reverse();
    assert_eq!(reversed.descendants(4), BTreeSet::from([1, 2, 3]));
    assert_eq!(reversed.descendants(1), BTreeSet::new());
}

#[test]
fn induced_subgraph_keeps_only_internal_edges() {
    let graph = diamond();
    let sub = graph.induced_subgraph(&BTreeSet::from([1, 2, 4]));
    assert_eq!(sub.node_count(), 3);
    let edges: Vec<(u64, u64)> = sub.edges().map(|(src, dst, _)| (src, dst)).collect();
    assert_eq!(edges, vec![(1, 2), (2, 4)]);
}

#[test]
fn in_degrees_include_isolated_nodes() {
    let mut graph = diamond();
    graph.add_node(9, NodeData::default());
    let degrees = graph.in_degrees();
    assert_eq!(degrees[&1], 0);
    assert_eq!(degrees[&4], 2);
    assert_eq!(degrees[&9], 0);
}

#[test]
fn reachable_subgraph_requires_the_start_node() {
    let graph = diamond();
    let sub = graph.reachable_subgraph(2).expect("subgraph from 2");
    let ids: Vec<u64> = sub.nodes().map(|(id, _)| id).collect();
    assert_eq!(ids, vec![2, 4]);
    assert!(graph.reachable_subgraph(42).is_none());
}

#[test]
fn alphabet_labels_summarize_large_sets() {
    let all: BTreeSet<u8> = (1..=255).collect();
    assert_eq!(alphabet_label(&all), "all");

    let long: BTreeSet<u8> = (1..=60).collect();
    assert_eq!(alphabet_label(&long), "long");

    assert_eq!(alphabet_label(&BTreeSet::from([b'a', b'b'])), "ab");
    assert_eq!(alphabet_label(&BTreeSet::from([2u8])), "\\x02");
}
