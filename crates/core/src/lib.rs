//! unflex-core
//!
//! Core library for recovering the finite-state lexer embedded in a
//! flex-generated scanner binary.
//!
//! flex compresses its transition table with equivalence classes and
//! default-state chaining; this crate reverses that compression by reading
//! the raw tables out of the binary and replaying the lookup algorithm:
//!
//! - [`target::TableReader`] reads table elements at configured offsets.
//! - [`classes::EquivalenceClasses`] recovers the byte-to-class partition.
//! - [`recover::reconstruct`] materializes the explicit transition graph.
//! - [`exits`] derives the bytes on which a token match necessarily ends.
//! - [`artifacts`] persists the graph and its derived tables, and renders
//!   dot files for inspection.
//! - [`split`] cuts the combined automaton into per-rule sub-automata.
//!
//! All substantive logic lives here so it is fully testable and reusable
//! from multiple frontends.

pub mod artifacts;
pub mod classes;
pub mod config;
pub mod exits;
pub mod graph;
pub mod recover;
pub mod split;
pub mod target;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
