//! Fixture: fabricates a scanner binary whose tables describe a 3-state
//! automaton (state 1 moves to state 2 on 'a', state 2 accepts rule 2).

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use unflex_core::config::{SizedOffset, TableLayout};

/// Write the fixture image into `dir` and return its path and layout.
/// All tables are 2-byte little-endian elements, max_state = 3.
pub fn write_fixture_image(dir: &Path) -> (PathBuf, TableLayout) {
    let mut ec = vec![0u64; 256];
    ec[b'a' as usize] = 1;

    let tables: [&[u64]; 7] = [
        &[0, 0, 2],          // accept: state 2 accepts rule 2
        &[0, 2, 4],          // base
        &[0, 0, 1, 1, 2, 2], // chk
        &[0, 0, 0],          // def
        &ec,                 // ec
        &[0, 0],             // meta
        &[0, 0, 1, 2, 0, 0], // nxt
    ];

    let mut image: Vec<u8> = Vec::new();
    let mut offsets = [SizedOffset::new(0, 2); 7];
    for (slot, values) in offsets.iter_mut().zip(tables) {
        *slot = SizedOffset::new(image.len() as u64, 2);
        for &value in values {
            image.extend_from_slice(&(value as u16).to_le_bytes());
        }
    }

    let layout = TableLayout {
        accept: offsets[0],
        base: offsets[1],
        chk: offsets[2],
        def: offsets[3],
        ec: offsets[4],
        meta: offsets[5],
        nxt: offsets[6],
    };

    let path = dir.join("scanner.bin");
    fs::write(&path, &image).expect("write scanner image");
    (path, layout)
}

/// The flag pair for one table, as CLI argument strings.
pub fn table_args(flag: &str, table: SizedOffset) -> [String; 3] {
    [format!("--{flag}"), table.offset.to_string(), table.size.to_string()]
}
