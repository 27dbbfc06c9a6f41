//! Recovery of the scanner's byte equivalence classes.

use std::collections::{BTreeMap, BTreeSet};

use crate::target::{TableReader, TargetResult};

/// Partition of the byte values 1..=255 into the scanner's equivalence
/// classes: every byte the compressed table treats identically shares a
/// class id. Byte 0 is reserved by the generator and never classified.
///
/// Derived once from the binary's ec table and read-only afterward; the
/// reconstruction stage receives it by value instead of any shared
/// accumulator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EquivalenceClasses {
    class_to_bytes: BTreeMap<u64, BTreeSet<u8>>,
}

impl EquivalenceClasses {
    /// Read the ec table for every byte 1..=255 and group bytes by class.
    pub fn build(reader: &mut TableReader) -> TargetResult<Self> {
        let mut class_to_bytes: BTreeMap<u64, BTreeSet<u8>> = BTreeMap::new();
        for byte in 1..=255u8 {
            let class = reader.ec(u64::from(byte))?;
            class_to_bytes.entry(class).or_default().insert(byte);
        }
        Ok(Self { class_to_bytes })
    }

    /// Iterate classes in ascending class-id order.
    ///
    /// Every yielded byte set is non-empty by construction: classes no byte
    /// maps to simply never appear.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &BTreeSet<u8>)> {
        self.class_to_bytes.iter().map(|(&class, bytes)| (class, bytes))
    }

    /// The bytes belonging to `class`, if any byte maps to it.
    pub fn bytes(&self, class: u64) -> Option<&BTreeSet<u8>> {
        self.class_to_bytes.get(&class)
    }

    /// Number of populated classes.
    pub fn len(&self) -> usize {
        self.class_to_bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.class_to_bytes.is_empty()
    }
}
