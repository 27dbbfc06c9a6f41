use anyhow::Result;
use clap::{Parser, Subcommand};

use unflex::commands::{inspect_command, recover_command, split_command, RecoverArgs};

/// Scanner-table recovery CLI.
///
/// This CLI is a thin wrapper around `unflex-core` (exposed in code as
/// `unflex_core`). All substantive logic lives in the library so it can be
/// tested thoroughly and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "unflex",
    version,
    about = "Recovers flex scanner automata from compiled binaries",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconstruct the explicit automaton from a scanner binary's tables.
    ///
    /// Replays the compressed base/chk/def/meta/nxt lookups for every state
    /// and equivalence class, then writes the graph, transition, and exit
    /// artifacts plus dot renderings into OUT_DIR.
    Recover(RecoverArgs),

    /// Split a recovered automaton into one sub-automaton per rule.
    ///
    /// Reads a graph.json produced by `recover` and writes a pair of
    /// textual automaton files per (rule, start state), plus a per-rule
    /// dot rendering.
    Split {
        /// Path to the graph.json artifact.
        graph: String,

        /// Directory to write the per-rule files into (created if missing).
        out_dir: String,
    },

    /// Summarize a recovered automaton artifact.
    Inspect {
        /// Path to the graph.json artifact.
        graph: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Recover(args) => recover_command(&args)?,
        Command::Split { graph, out_dir } => split_command(&graph, &out_dir)?,
        Command::Inspect { graph, json } => inspect_command(&graph, json)?,
    }

    Ok(())
}
