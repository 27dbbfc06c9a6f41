use std::collections::BTreeSet;
use std::fs;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use clap::{ArgAction, Args, ValueEnum};
use serde::{Deserialize, Serialize};

use unflex_core::artifacts::{self, OutputLayout};
use unflex_core::classes::EquivalenceClasses;
use unflex_core::config::{Endianness, RecoverConfig, SizedOffset, TableLayout};
use unflex_core::recover::reconstruct;
use unflex_core::target::TableReader;
use unflex_core::{exits, split};

use crate::{canonicalize_or_current, parse_offset_value, sha256_file};

/// Start state of the combined automaton, by the generator's convention.
const START_STATE: u64 = 1;

/// Byte order flag. Mirrors `unflex_core::config::Endianness`, which stays
/// clap-free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EndianArg {
    Little,
    Big,
}

impl From<EndianArg> for Endianness {
    fn from(value: EndianArg) -> Self {
        match value {
            EndianArg::Little => Endianness::Little,
            EndianArg::Big => Endianness::Big,
        }
    }
}

/// Arguments for `unflex recover`.
///
/// The seven table flags each take the table's absolute file offset and
/// element width, as recovered from the binary's symbols; `--layout` loads
/// the same information from a YAML file instead.
#[derive(Args, Debug, Clone)]
pub struct RecoverArgs {
    /// Path to the scanner binary to read tables from.
    pub target: String,

    /// Directory to write artifacts into (created if missing).
    pub out_dir: String,

    /// Offset and element width of the accept table.
    #[arg(long, num_args = 2, value_names = ["OFFSET", "SIZE"], value_parser = parse_offset_value, required_unless_present = "layout", conflicts_with = "layout")]
    pub accept: Option<Vec<u64>>,

    /// Offset and element width of the base table.
    #[arg(long, num_args = 2, value_names = ["OFFSET", "SIZE"], value_parser = parse_offset_value, required_unless_present = "layout", conflicts_with = "layout")]
    pub base: Option<Vec<u64>>,

    /// Offset and element width of the check table.
    #[arg(long, num_args = 2, value_names = ["OFFSET", "SIZE"], value_parser = parse_offset_value, required_unless_present = "layout", conflicts_with = "layout")]
    pub chk: Option<Vec<u64>>,

    /// Offset and element width of the default-state table.
    #[arg(long = "def", num_args = 2, value_names = ["OFFSET", "SIZE"], value_parser = parse_offset_value, required_unless_present = "layout", conflicts_with = "layout")]
    pub def_table: Option<Vec<u64>>,

    /// Offset and element width of the equivalence-class table.
    #[arg(long, num_args = 2, value_names = ["OFFSET", "SIZE"], value_parser = parse_offset_value, required_unless_present = "layout", conflicts_with = "layout")]
    pub ec: Option<Vec<u64>>,

    /// Offset and element width of the meta-equivalence table.
    #[arg(long, num_args = 2, value_names = ["OFFSET", "SIZE"], value_parser = parse_offset_value, required_unless_present = "layout", conflicts_with = "layout")]
    pub meta: Option<Vec<u64>>,

    /// Offset and element width of the next-state table.
    #[arg(long, num_args = 2, value_names = ["OFFSET", "SIZE"], value_parser = parse_offset_value, required_unless_present = "layout", conflicts_with = "layout")]
    pub nxt: Option<Vec<u64>>,

    /// Exclusive upper bound on state ids in the scanner.
    #[arg(long, value_parser = parse_offset_value, required_unless_present = "layout", conflicts_with = "layout")]
    pub max_state: Option<u64>,

    /// Byte order of the table elements.
    #[arg(long, value_enum, default_value = "little", conflicts_with = "layout")]
    pub endianness: EndianArg,

    /// Drop transitions driven only by equivalence class 0 (the NUL byte
    /// and generator-internal bookkeeping).
    #[arg(long, default_value_t = true, action = ArgAction::Set, conflicts_with = "layout")]
    pub strip_nulls: bool,

    /// State id to exclude from the reconstructed graph. Repeatable.
    #[arg(long = "strip-state", value_parser = parse_offset_value, conflicts_with = "layout")]
    pub strip_state: Vec<u64>,

    /// YAML file supplying the table layout and reconstruction settings
    /// instead of the individual flags.
    #[arg(long)]
    pub layout: Option<String>,
}

/// YAML form of the reconstruction settings, for `--layout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutFile {
    pub max_state: u64,
    #[serde(default = "default_strip_nulls")]
    pub strip_nulls: bool,
    #[serde(default)]
    pub states_to_strip: Vec<u64>,
    #[serde(default = "default_endianness")]
    pub endianness: Endianness,
    pub tables: TableLayout,
}

fn default_strip_nulls() -> bool {
    true
}

fn default_endianness() -> Endianness {
    Endianness::Little
}

/// Manifest written next to the artifacts, recording what was recovered
/// from what.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecoveryManifest {
    pub target: String,
    pub target_sha256: String,
    pub started_at: String,
    pub finished_at: String,
    pub max_state: u64,
    pub endianness: Endianness,
    pub strip_nulls: bool,
    pub states_to_strip: Vec<u64>,
    pub equivalence_classes: usize,
    pub states: usize,
    pub accepting_states: usize,
    pub edges: usize,
    pub max_accept: u64,
}

struct Settings {
    tables: TableLayout,
    max_state: u64,
    strip_nulls: bool,
    states_to_strip: BTreeSet<u64>,
    endianness: Endianness,
}

fn table_arg(name: &str, values: &Option<Vec<u64>>) -> Result<SizedOffset> {
    let values = values
        .as_ref()
        .ok_or_else(|| anyhow!("Missing --{name} OFFSET SIZE"))?;
    if values.len() != 2 {
        bail!("--{name} takes exactly two values: OFFSET SIZE");
    }
    Ok(SizedOffset::new(values[0], u32::try_from(values[1]).unwrap_or(u32::MAX)))
}

fn resolve_settings(args: &RecoverArgs) -> Result<Settings> {
    if let Some(layout_path) = &args.layout {
        let path = canonicalize_or_current(layout_path)?;
        let body = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read layout file {}", path.display()))?;
        let layout: LayoutFile =
            serde_yaml::from_str(&body).context("Failed to parse layout YAML")?;
        return Ok(Settings {
            tables: layout.tables,
            max_state: layout.max_state,
            strip_nulls: layout.strip_nulls,
            states_to_strip: layout.states_to_strip.into_iter().collect(),
            endianness: layout.endianness,
        });
    }

    Ok(Settings {
        tables: TableLayout {
            accept: table_arg("accept", &args.accept)?,
            base: table_arg("base", &args.base)?,
            chk: table_arg("chk", &args.chk)?,
            def: table_arg("def", &args.def_table)?,
            ec: table_arg("ec", &args.ec)?,
            meta: table_arg("meta", &args.meta)?,
            nxt: table_arg("nxt", &args.nxt)?,
        },
        max_state: args.max_state.ok_or_else(|| anyhow!("Missing --max-state"))?,
        strip_nulls: args.strip_nulls,
        states_to_strip: args.strip_state.iter().copied().collect(),
        endianness: args.endianness.into(),
    })
}

/// Reconstruct the automaton from the target's tables and write every
/// artifact into the output directory.
pub fn recover_command(args: &RecoverArgs) -> Result<()> {
    let target = canonicalize_or_current(&args.target)?;
    let out_dir = canonicalize_or_current(&args.out_dir)?;
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create output dir: {}", out_dir.display()))?;

    let settings = resolve_settings(args)?;
    let config = RecoverConfig {
        target: target.clone(),
        out_dir: out_dir.clone(),
        max_state: settings.max_state,
        strip_nulls: settings.strip_nulls,
        states_to_strip: settings.states_to_strip,
        endianness: settings.endianness,
        tables: settings.tables,
    };
    config.validate().context("Invalid recovery configuration")?;

    let started_at = Utc::now().to_rfc3339();
    let mut reader = TableReader::open(&config.target, config.endianness, config.tables)?;
    let classes = EquivalenceClasses::build(&mut reader)
        .context("Failed to read the equivalence-class table")?;
    let graph = reconstruct(&mut reader, &classes, &config)
        .context("Automaton reconstruction failed")?;
    let exit_map = exits::analyze_exits(&graph);

    let layout = OutputLayout::new(&out_dir);
    artifacts::write_graph(&layout.graph_path, &graph)?;
    artifacts::write_transitions(&layout.transitions_path, &graph)?;
    artifacts::write_exits(&layout.exits_path, &exit_map)?;
    artifacts::write_dot(&layout.full_dot_path, &graph)?;

    let start_rendered = match graph.reachable_subgraph(START_STATE) {
        Some(sub) => {
            artifacts::write_dot(&layout.start_dot_path, &sub)?;
            true
        }
        None => false,
    };

    let finished_at = Utc::now().to_rfc3339();
    let manifest = RecoveryManifest {
        target: config.target.display().to_string(),
        target_sha256: sha256_file(&config.target)?,
        started_at,
        finished_at,
        max_state: config.max_state,
        endianness: config.endianness,
        strip_nulls: config.strip_nulls,
        states_to_strip: config.states_to_strip.iter().copied().collect(),
        equivalence_classes: classes.len(),
        states: graph.node_count(),
        accepting_states: graph.nodes().filter(|(_, data)| data.accepts > 0).count(),
        edges: graph.edge_count(),
        max_accept: split::max_accept(&graph),
    };
    let manifest_json = serde_json::to_string_pretty(&manifest)?;
    fs::write(&layout.manifest_path, manifest_json).with_context(|| {
        format!("Failed to write manifest: {}", layout.manifest_path.display())
    })?;

    println!("Recovered automaton from {}:", config.target.display());
    println!("  SHA-256: {}", manifest.target_sha256);
    println!("  Equivalence classes: {}", manifest.equivalence_classes);
    println!("  States: {} ({} accepting)", manifest.states, manifest.accepting_states);
    println!("  Edges: {}", manifest.edges);
    println!("  Graph: {}", layout.graph_path.display());
    println!("  Transitions: {}", layout.transitions_path.display());
    println!("  Exits: {}", layout.exits_path.display());
    println!("  Rendering: {}", layout.full_dot_path.display());
    if start_rendered {
        println!("  Start rendering: {}", layout.start_dot_path.display());
    } else {
        println!("  Start rendering skipped: state {START_STATE} absent from graph");
    }
    println!("  Manifest: {}", layout.manifest_path.display());

    Ok(())
}
