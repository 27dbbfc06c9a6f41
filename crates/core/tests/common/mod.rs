//! Shared fixture: builds a fake scanner binary with the seven compressed
//! tables laid out back to back at known offsets.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use unflex_core::config::{SizedOffset, TableLayout};

/// Element width used by the generated images.
pub const WIDTH: u32 = 2;

/// In-memory table contents, encoded little-endian at [`WIDTH`] bytes per
/// element when written.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub accept: Vec<u64>,
    pub base: Vec<u64>,
    pub chk: Vec<u64>,
    pub def: Vec<u64>,
    pub ec: Vec<u64>,
    pub meta: Vec<u64>,
    pub nxt: Vec<u64>,
}

/// Write the tables into `dir` as a single binary image and return its path
/// together with the matching layout.
pub fn write_image(dir: &Path, tables: &Tables) -> (PathBuf, TableLayout) {
    let mut image: Vec<u8> = Vec::new();
    let mut place = |values: &[u64]| -> SizedOffset {
        let offset = image.len() as u64;
        for &value in values {
            image.extend_from_slice(&(value as u16).to_le_bytes());
        }
        SizedOffset::new(offset, WIDTH)
    };

    let layout = TableLayout {
        accept: place(&tables.accept),
        base: place(&tables.base),
        chk: place(&tables.chk),
        def: place(&tables.def),
        ec: place(&tables.ec),
        meta: place(&tables.meta),
        nxt: place(&tables.nxt),
    };

    let path = dir.join("scanner.bin");
    fs::write(&path, &image).expect("write scanner image");
    (path, layout)
}

/// The minimal 3-state scanner used across tests: byte 'a' is class 1 and
/// every other byte class 0; state 1 moves to state 2 on 'a' and jams
/// otherwise; state 2 (accept label `accept2`) jams on everything.
pub fn three_state_tables(accept2: u64) -> Tables {
    let mut ec = vec![0u64; 256];
    ec[b'a' as usize] = 1;
    Tables {
        accept: vec![0, 0, accept2],
        base: vec![0, 2, 4],
        chk: vec![0, 0, 1, 1, 2, 2],
        def: vec![0, 0, 0],
        ec,
        meta: vec![0, 0],
        nxt: vec![0, 0, 1, 2, 0, 0],
    }
}

/// A scanner whose state 1 and 2 only reach class 2's slot through the
/// default chain, escalating past `max_state` into the meta alphabet:
/// 'a' is class 1, 'b' class 2, max_state = 4.
///
/// Expected transitions: 1 -a-> 2, 1 -b-> 3, 2 -a-> 2, 2 -b-> 3; state 3
/// accepts rule 1 and jams on everything.
pub fn meta_chain_tables() -> Tables {
    let mut ec = vec![0u64; 256];
    ec[b'a' as usize] = 1;
    ec[b'b' as usize] = 2;

    let mut chk = vec![9u64; 24];
    chk[0] = 1; // state 1, classes 0 and 1
    chk[1] = 1;
    chk[6] = 2; // state 2, classes 0 and 1
    chk[7] = 2;
    chk[13] = 5; // template state 5, class 1 (remapped from class 2)
    chk[18] = 3; // state 3, all classes
    chk[19] = 3;
    chk[20] = 3;

    let mut nxt = vec![0u64; 24];
    nxt[1] = 2;
    nxt[7] = 2;
    nxt[13] = 3;

    Tables {
        accept: vec![0, 0, 0, 1],
        base: vec![0, 0, 6, 18, 0, 12],
        chk,
        def: vec![0, 2, 5, 0],
        ec,
        meta: vec![0, 1, 1],
        nxt,
    }
}
