//! Key entry and layer data structures.

use crate::constants::CHAR_MAP_SIZE;
use crate::error::{KeymapError, KeymapResult};
use std::fmt;

/// Codepoint sequence produced when one key is pressed under one modifier combination.
///
/// An entry is never empty: a key with no mapping holds the single codepoint `0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry {
    codepoints: Vec<u32>,
}

impl Entry {
    /// Codepoint stored for keys without a mapping.
    pub const NO_MAPPING: u32 = 0;

    /// Creates an entry from a codepoint sequence.
    ///
    /// An empty sequence becomes the unmapped entry `[0]`.
    #[must_use]
    pub fn new(codepoints: Vec<u32>) -> Self {
        if codepoints.is_empty() {
            return Self::unmapped();
        }
        Self { codepoints }
    }

    /// Entry for a key with no mapping.
    #[must_use]
    pub fn unmapped() -> Self {
        Self {
            codepoints: vec![Self::NO_MAPPING],
        }
    }

    /// Decodes a definition string into its codepoints, in source order.
    ///
    /// # Examples
    ///
    /// ```
    /// use keymapctl::models::Entry;
    ///
    /// assert_eq!(Entry::from_definition_str("").codepoints(), &[0]);
    /// assert_eq!(Entry::from_definition_str("é").codepoints(), &[0xe9]);
    /// ```
    #[must_use]
    pub fn from_definition_str(value: &str) -> Self {
        Self::new(value.chars().map(u32::from).collect())
    }

    /// Creates an entry holding a single character.
    #[must_use]
    pub fn from_char(c: char) -> Self {
        Self {
            codepoints: vec![u32::from(c)],
        }
    }

    /// Codepoints of this entry.
    #[must_use]
    pub fn codepoints(&self) -> &[u32] {
        &self.codepoints
    }

    /// Number of codepoints in this entry (always at least 1).
    #[must_use]
    pub fn len(&self) -> usize {
        self.codepoints.len()
    }

    /// Always false; present for API symmetry with slices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codepoints.is_empty()
    }

    /// Checks if this entry is the "no mapping" marker.
    #[must_use]
    pub fn is_unmapped(&self) -> bool {
        self.codepoints == [Self::NO_MAPPING]
    }

    /// Renders the entry back to definition text.
    ///
    /// Unmapped entries render as the empty string; codepoints that are not
    /// Unicode scalar values render as U+FFFD.
    #[must_use]
    pub fn to_definition_string(&self) -> String {
        if self.is_unmapped() {
            return String::new();
        }
        self.codepoints
            .iter()
            .map(|&cp| char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect()
    }
}

impl Default for Entry {
    fn default() -> Self {
        Self::unmapped()
    }
}

impl From<Vec<u32>> for Entry {
    fn from(codepoints: Vec<u32>) -> Self {
        Self::new(codepoints)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for cp in &self.codepoints {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "U+{cp:04X}")?;
            first = false;
        }
        Ok(())
    }
}

/// Table of per-key entries activated by one modifier combination.
///
/// # Validation
///
/// - Exactly `CHAR_MAP_SIZE` (128) entries, one per key position
/// - Every position is populated (unmapped keys hold `[0]`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    entries: Box<[Entry; CHAR_MAP_SIZE]>,
}

impl Layer {
    /// Creates a layer in which every key is unmapped.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Box::new(std::array::from_fn(|_| Entry::unmapped())),
        }
    }

    /// Creates a layer from a full list of entries.
    ///
    /// # Errors
    ///
    /// Returns `MalformedDefinition` unless exactly 128 entries are given.
    pub fn from_entries(entries: Vec<Entry>) -> KeymapResult<Self> {
        let count = entries.len();
        let entries: Box<[Entry; CHAR_MAP_SIZE]> =
            entries.into_boxed_slice().try_into().map_err(|_| {
                KeymapError::malformed(
                    "",
                    format!("layer has {count} entries, expected {CHAR_MAP_SIZE}"),
                )
            })?;
        Ok(Self { entries })
    }

    /// Gets the entry for a key position.
    #[must_use]
    pub fn entry(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// Replaces the entry for a key position, returning the previous one.
    ///
    /// Returns `None` (and drops `entry`) if the index is out of range.
    pub fn set_entry(&mut self, index: usize, entry: Entry) -> Option<Entry> {
        self.entries
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, entry))
    }

    /// Iterates over all 128 entries in key order.
    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Number of keys that carry a mapping.
    #[must_use]
    pub fn mapped_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_unmapped()).count()
    }
}

impl Default for Layer {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a Layer {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
