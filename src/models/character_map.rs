//! Character map: five modifier layers plus a display name.

use crate::constants::{CHAR_MAP_SIZE, MAP_NAME_MAX_LEN};
use crate::error::{KeymapError, KeymapResult};
use crate::models::layer::{Entry, Layer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Modifier combination that selects a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    /// No modifier
    Base,
    /// Shift
    Shift,
    /// Alt
    Alt,
    /// AltGr
    AltGr,
    /// Shift + AltGr
    ShiftAltGr,
}

impl Modifier {
    /// All modifier combinations in storage order.
    pub const ALL: [Self; 5] = [
        Self::Base,
        Self::Shift,
        Self::Alt,
        Self::AltGr,
        Self::ShiftAltGr,
    ];

    /// Storage index of this modifier's layer.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Field name of this layer in a layout definition.
    #[must_use]
    pub const fn definition_key(self) -> &'static str {
        match self {
            Self::Base => "map",
            Self::Shift => "shift_map",
            Self::Alt => "alt_map",
            Self::AltGr => "altgr_map",
            Self::ShiftAltGr => "shift_altgr_map",
        }
    }

    /// Parses a modifier from its short name or definition key.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "base" | "map" => Some(Self::Base),
            "shift" | "shift_map" => Some(Self::Shift),
            "alt" | "alt_map" => Some(Self::Alt),
            "altgr" | "altgr_map" => Some(Self::AltGr),
            "shift_altgr" | "shift+altgr" | "shift_altgr_map" => Some(Self::ShiftAltGr),
            _ => None,
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Base => "base",
            Self::Shift => "shift",
            Self::Alt => "alt",
            Self::AltGr => "altgr",
            Self::ShiftAltGr => "shift+altgr",
        };
        f.write_str(label)
    }
}

/// Complete set of five layers plus a name, installed and queried as one unit.
///
/// # Validation
///
/// - All five layers are present and fully populated
/// - Name must not exceed 50 bytes when installed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterMap {
    name: String,
    layers: [Layer; 5],
}

impl CharacterMap {
    /// Creates a character map from its layers, ordered as [`Modifier::ALL`].
    pub fn new(name: impl Into<String>, layers: [Layer; 5]) -> Self {
        Self {
            name: name.into(),
            layers,
        }
    }

    /// Creates a map in which every key of every layer is unmapped.
    pub fn blank(name: impl Into<String>) -> Self {
        Self::new(name, std::array::from_fn(|_| Layer::new()))
    }

    /// Display name of this map.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames this map.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Gets the layer for a modifier combination.
    #[must_use]
    pub fn layer(&self, modifier: Modifier) -> &Layer {
        &self.layers[modifier.index()]
    }

    /// Gets the layer for a modifier combination mutably.
    pub fn layer_mut(&mut self, modifier: Modifier) -> &mut Layer {
        &mut self.layers[modifier.index()]
    }

    /// Iterates over `(modifier, layer)` pairs in storage order.
    pub fn layers(&self) -> impl Iterator<Item = (Modifier, &Layer)> {
        Modifier::ALL.into_iter().zip(self.layers.iter())
    }

    /// Gets the entry for a key under a modifier combination.
    #[must_use]
    pub fn entry(&self, modifier: Modifier, index: usize) -> Option<&Entry> {
        self.layer(modifier).entry(index)
    }

    /// Checks the name against the install limit.
    ///
    /// # Errors
    ///
    /// Returns `NameTooLong` if the name exceeds 50 bytes.
    pub fn validate_name(name: &str) -> KeymapResult<()> {
        Self::validate_name_len(name.len())
    }

    /// Checks a name length in bytes against the install limit.
    ///
    /// # Errors
    ///
    /// Returns `NameTooLong` if `len` exceeds 50.
    pub fn validate_name_len(len: usize) -> KeymapResult<()> {
        if len > MAP_NAME_MAX_LEN {
            return Err(KeymapError::NameTooLong {
                len,
                max: MAP_NAME_MAX_LEN,
            });
        }
        Ok(())
    }

    /// Total number of codepoints stored across all layers.
    #[must_use]
    pub fn codepoint_count(&self) -> usize {
        self.layers
            .iter()
            .flat_map(Layer::iter)
            .map(Entry::len)
            .sum()
    }
}

/// Accumulates entries for a character map that is not yet visible to anyone.
///
/// Everything pushed into the builder is owned by it, so abandoning a build
/// part way (for example on a copy fault) releases every entry collected so far.
#[derive(Debug, Default)]
pub struct CharacterMapBuilder {
    layers: [Vec<Entry>; 5],
}

impl CharacterMapBuilder {
    /// Creates an empty builder with room for every entry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            layers: std::array::from_fn(|_| Vec::with_capacity(CHAR_MAP_SIZE)),
        }
    }

    /// Appends the next entry of a layer.
    ///
    /// # Errors
    ///
    /// Returns `MalformedDefinition` if the layer already holds 128 entries.
    pub fn push(&mut self, modifier: Modifier, entry: Entry) -> KeymapResult<()> {
        let layer = &mut self.layers[modifier.index()];
        if layer.len() >= CHAR_MAP_SIZE {
            return Err(KeymapError::malformed(
                "",
                format!("{modifier} layer already holds {CHAR_MAP_SIZE} entries"),
            ));
        }
        layer.push(entry);
        Ok(())
    }

    /// Finishes the map.
    ///
    /// # Errors
    ///
    /// Returns `MalformedDefinition` if any layer holds fewer than 128 entries.
    pub fn build(self, name: impl Into<String>) -> KeymapResult<CharacterMap> {
        let [base, shift, alt, altgr, shift_altgr] = self.layers;
        let name = name.into();
        let layers = [
            Layer::from_entries(base),
            Layer::from_entries(shift),
            Layer::from_entries(alt),
            Layer::from_entries(altgr),
            Layer::from_entries(shift_altgr),
        ];

        let mut built = Vec::with_capacity(layers.len());
        for (modifier, layer) in Modifier::ALL.into_iter().zip(layers) {
            built.push(layer.map_err(|e| match e {
                KeymapError::MalformedDefinition { path, reason } => {
                    KeymapError::MalformedDefinition {
                        path,
                        reason: format!("{modifier}: {reason}"),
                    }
                }
                other => other,
            })?);
        }

        let layers: [Layer; 5] = built
            .try_into()
            .map_err(|_| KeymapError::malformed("", "expected five layers"))?;
        Ok(CharacterMap::new(name, layers))
    }
}
