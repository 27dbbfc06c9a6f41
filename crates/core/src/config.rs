//! Configuration for a recovery run.
//!
//! A run is described once at startup and immutable afterward: the target
//! binary, the output directory, the state-id bound, the stripping options,
//! and the locations of the seven compressed tables inside the binary.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A table was configured with an element width we cannot decode.
    #[error("Unsupported element width {width} for table `{table}`; supported widths are 1, 2, and 4")]
    UnsupportedWidth { table: &'static str, width: u32 },

    /// `max_state` must be positive; it is an exclusive upper bound.
    #[error("max_state must be a positive integer")]
    ZeroMaxState,
}

/// Absolute byte offset and element width of one table inside the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizedOffset {
    /// Absolute offset of the table's first element.
    pub offset: u64,
    /// Element width in bytes (1, 2, or 4).
    pub size: u32,
}

impl SizedOffset {
    pub fn new(offset: u64, size: u32) -> Self {
        Self { offset, size }
    }
}

/// Byte order of the table elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    Little,
    Big,
}

/// Locations of the seven compressed scanner tables.
///
/// The names follow the generator's own naming (yy_accept, yy_base, ...);
/// symbol addresses recovered from the binary go straight in here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLayout {
    /// Per-state accept labels (0 = non-accepting).
    pub accept: SizedOffset,
    /// Per-state base offsets into `chk`/`nxt`.
    pub base: SizedOffset,
    /// Ownership check for compressed slots.
    pub chk: SizedOffset,
    /// Per-state default (fallback) states.
    pub def: SizedOffset,
    /// Byte value to equivalence class.
    pub ec: SizedOffset,
    /// Class remapping applied past the valid state range.
    pub meta: SizedOffset,
    /// Destination states for compressed slots.
    pub nxt: SizedOffset,
}

impl TableLayout {
    fn entries(&self) -> [(&'static str, SizedOffset); 7] {
        [
            ("accept", self.accept),
            ("base", self.base),
            ("chk", self.chk),
            ("def", self.def),
            ("ec", self.ec),
            ("meta", self.meta),
            ("nxt", self.nxt),
        ]
    }

    /// Check every table's element width.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (table, sized) in self.entries() {
            match sized.size {
                1 | 2 | 4 => {}
                width => return Err(ConfigError::UnsupportedWidth { table, width }),
            }
        }
        Ok(())
    }
}

/// Full description of one recovery run. Created once, then read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoverConfig {
    /// Path to the scanner binary the tables are read from.
    pub target: PathBuf,
    /// Directory the artifacts are written into.
    pub out_dir: PathBuf,
    /// Exclusive upper bound on state ids (a property of the specific
    /// compiled scanner being reverse-engineered).
    pub max_state: u64,
    /// Drop transitions driven purely by equivalence class 0 (the NUL byte
    /// and generator-internal bookkeeping classes).
    pub strip_nulls: bool,
    /// States excluded from the reconstructed graph entirely.
    #[serde(default)]
    pub states_to_strip: BTreeSet<u64>,
    pub endianness: Endianness,
    pub tables: TableLayout,
}

impl RecoverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_state == 0 {
            return Err(ConfigError::ZeroMaxState);
        }
        self.tables.validate()
    }
}
