//! Layout definition parser for character maps.
//!
//! A definition is a JSON object with up to five arrays of 128 strings, one
//! per modifier combination. Each string is the character sequence a key
//! produces; the empty string means "no mapping".
//!
//! ```json
//! {
//!   "map":             ["", "\u001b", "1", ...],
//!   "shift_map":       ["", "\u001b", "!", ...],
//!   "alt_map":         ["", "\u001b", "1", ...],
//!   "altgr_map":       [...],
//!   "shift_altgr_map": [...]
//! }
//! ```
//!
//! `altgr_map` and `shift_altgr_map` are optional. When absent, both are
//! filled from `alt_map`. A field that is present must hold exactly 128
//! strings, so `"altgr_map": []` is an error rather than an absent layer.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::constants::CHAR_MAP_SIZE;
use crate::error::{KeymapError, KeymapResult};
use crate::models::{CharacterMap, Entry, Layer, Modifier};

/// Raw layout definition as read from disk.
///
/// A field is `None` only when its key is absent from the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct KeymapDefinition {
    /// Base layer
    #[serde(default)]
    pub map: Option<Vec<String>>,
    /// Shift layer
    #[serde(default)]
    pub shift_map: Option<Vec<String>>,
    /// Alt layer
    #[serde(default)]
    pub alt_map: Option<Vec<String>>,
    /// AltGr layer (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altgr_map: Option<Vec<String>>,
    /// Shift+AltGr layer (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_altgr_map: Option<Vec<String>>,
}

impl KeymapDefinition {
    /// Gets the raw field for a modifier combination, if present.
    #[must_use]
    pub fn field(&self, modifier: Modifier) -> Option<&[String]> {
        match modifier {
            Modifier::Base => self.map.as_deref(),
            Modifier::Shift => self.shift_map.as_deref(),
            Modifier::Alt => self.alt_map.as_deref(),
            Modifier::AltGr => self.altgr_map.as_deref(),
            Modifier::ShiftAltGr => self.shift_altgr_map.as_deref(),
        }
    }

    /// Builds a definition with every layer of a character map written out.
    #[must_use]
    pub fn from_character_map(map: &CharacterMap) -> Self {
        let encode = |modifier: Modifier| -> Option<Vec<String>> {
            Some(
                map.layer(modifier)
                    .iter()
                    .map(Entry::to_definition_string)
                    .collect(),
            )
        };
        Self {
            map: encode(Modifier::Base),
            shift_map: encode(Modifier::Shift),
            alt_map: encode(Modifier::Alt),
            altgr_map: encode(Modifier::AltGr),
            shift_altgr_map: encode(Modifier::ShiftAltGr),
        }
    }
}

/// Parses definition text.
///
/// Strict JSON is tried first; text with comments or trailing commas is
/// accepted through the JSON5 grammar. The strict parser's error is reported
/// when both fail.
///
/// # Errors
///
/// Returns `MalformedDefinition` if the text is not an object of string arrays.
pub fn parse_keymap_json(contents: &str, path: &Path) -> KeymapResult<KeymapDefinition> {
    match serde_json::from_str::<KeymapDefinition>(contents) {
        Ok(definition) => Ok(definition),
        Err(strict_err) => match json5::from_str::<KeymapDefinition>(contents) {
            Ok(definition) => {
                debug!("Parsed {} with the JSON5 grammar", path.display());
                Ok(definition)
            }
            Err(_) => Err(KeymapError::malformed(path, strict_err.to_string())),
        },
    }
}

/// Decodes one definition field into entries.
#[must_use]
pub fn decode_layer(field: &[String]) -> Vec<Entry> {
    field
        .iter()
        .map(|value| Entry::from_definition_str(value))
        .collect()
}

fn decode_field(
    definition: &KeymapDefinition,
    modifier: Modifier,
    path: &Path,
) -> KeymapResult<Option<Layer>> {
    let Some(field) = definition.field(modifier) else {
        return Ok(None);
    };
    if field.len() != CHAR_MAP_SIZE {
        return Err(KeymapError::malformed(
            path,
            format!(
                "field '{}' has {} entries, expected {CHAR_MAP_SIZE}",
                modifier.definition_key(),
                field.len()
            ),
        ));
    }
    Layer::from_entries(decode_layer(field)).map(Some)
}

/// Decodes a parsed definition into a complete character map.
///
/// # Errors
///
/// Returns `MalformedDefinition` if `map`, `shift_map` or `alt_map` is
/// missing, or if any present field does not hold exactly 128 entries.
pub fn decode_keymap(
    definition: &KeymapDefinition,
    name: &str,
    path: &Path,
) -> KeymapResult<CharacterMap> {
    let mut decoded: [Option<Layer>; 5] = Default::default();
    for modifier in Modifier::ALL {
        decoded[modifier.index()] = decode_field(definition, modifier, path)?;
    }

    let [base, shift, alt, altgr, shift_altgr] = decoded;
    let require = |layer: Option<Layer>, modifier: Modifier| {
        layer.ok_or_else(|| {
            KeymapError::malformed(
                path,
                format!("missing required field '{}'", modifier.definition_key()),
            )
        })
    };
    let base = require(base, Modifier::Base)?;
    let shift = require(shift, Modifier::Shift)?;
    let alt = require(alt, Modifier::Alt)?;

    let layers = normalize_layers(base, shift, alt, altgr, shift_altgr);
    Ok(CharacterMap::new(name, layers))
}

/// Fills absent AltGr layers so the stored form is always complete.
///
/// Both absent layers become independent copies of the alt layer.
fn normalize_layers(
    base: Layer,
    shift: Layer,
    alt: Layer,
    altgr: Option<Layer>,
    shift_altgr: Option<Layer>,
) -> [Layer; 5] {
    let altgr = altgr.unwrap_or_else(|| {
        debug!("AltGr map not found, using Alt map as fallback");
        alt.clone()
    });
    let shift_altgr = shift_altgr.unwrap_or_else(|| {
        debug!("Shift+AltGr map not found, using Alt map as fallback");
        alt.clone()
    });
    [base, shift, alt, altgr, shift_altgr]
}

/// Serializes a character map to definition text with all five layers.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn to_keymap_json(map: &CharacterMap) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&KeymapDefinition::from_character_map(map))
}
