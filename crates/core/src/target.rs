//! Random-access reads over the compressed tables inside the target binary.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{Endianness, SizedOffset, TableLayout};

/// Error type for reads from the target binary.
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("Failed to open target binary {path}: {source}")]
    Open { path: PathBuf, source: std::io::Error },

    /// The requested element lies (at least partly) past the end of the
    /// binary. A table location this wrong invalidates the whole result,
    /// so callers treat this as fatal rather than per-state.
    #[error("Read of {len} bytes at offset {offset:#x} exceeds target size {size:#x}")]
    OutOfBounds { offset: u64, len: u32, size: u64 },

    #[error("I/O error reading target at offset {offset:#x}: {source}")]
    Io { offset: u64, source: std::io::Error },
}

/// Convenience result type for target reads.
pub type TargetResult<T> = Result<T, TargetError>;

/// Reader over the scanner tables embedded in a compiled binary.
///
/// Every call seeks and reads from the file again; the binary is
/// authoritative, never mutated, and individual element reads are cheap
/// next to the reconstruction loop that drives them.
pub struct TableReader {
    file: File,
    len: u64,
    endianness: Endianness,
    tables: TableLayout,
}

impl TableReader {
    /// Open the target binary and capture its length for bounds checks.
    pub fn open(
        path: &Path,
        endianness: Endianness,
        tables: TableLayout,
    ) -> TargetResult<Self> {
        let file = File::open(path)
            .map_err(|source| TargetError::Open { path: path.to_path_buf(), source })?;
        let len = file
            .metadata()
            .map_err(|source| TargetError::Open { path: path.to_path_buf(), source })?
            .len();
        Ok(Self { file, len, endianness, tables })
    }

    /// Read the `index`-th element of `table` as an unsigned integer of the
    /// table's element width, decoded with the configured endianness.
    pub fn read(&mut self, table: SizedOffset, index: u64) -> TargetResult<u64> {
        let size = u64::from(table.size);
        let offset = index
            .checked_mul(size)
            .and_then(|rel| table.offset.checked_add(rel))
            .unwrap_or(u64::MAX);
        if offset.saturating_add(size) > self.len {
            return Err(TargetError::OutOfBounds { offset, len: table.size, size: self.len });
        }

        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|source| TargetError::Io { offset, source })?;
        let mut buf = [0u8; 4];
        let buf = &mut buf[..table.size as usize];
        self.file
            .read_exact(buf)
            .map_err(|source| TargetError::Io { offset, source })?;

        let mut value = 0u64;
        match self.endianness {
            Endianness::Little => {
                for &byte in buf.iter().rev() {
                    value = (value << 8) | u64::from(byte);
                }
            }
            Endianness::Big => {
                for &byte in buf.iter() {
                    value = (value << 8) | u64::from(byte);
                }
            }
        }
        Ok(value)
    }

    pub fn accept(&mut self, i: u64) -> TargetResult<u64> {
        self.read(self.tables.accept, i)
    }

    pub fn base(&mut self, i: u64) -> TargetResult<u64> {
        self.read(self.tables.base, i)
    }

    pub fn chk(&mut self, i: u64) -> TargetResult<u64> {
        self.read(self.tables.chk, i)
    }

    pub fn def(&mut self, i: u64) -> TargetResult<u64> {
        self.read(self.tables.def, i)
    }

    pub fn ec(&mut self, i: u64) -> TargetResult<u64> {
        self.read(self.tables.ec, i)
    }

    pub fn meta(&mut self, i: u64) -> TargetResult<u64> {
        self.read(self.tables.meta, i)
    }

    pub fn nxt(&mut self, i: u64) -> TargetResult<u64> {
        self.read(self.tables.nxt, i)
    }
}
