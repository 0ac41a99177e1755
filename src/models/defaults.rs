//! Built-in US-English character map the registry starts with.
//!
//! Key positions follow PC scan code set 1. Layers are written as eight rows
//! of sixteen keys each; `'\0'` marks a key without a character.

use crate::constants::DEFAULT_KEYMAP_NAME;
use crate::models::character_map::{CharacterMap, Modifier};
use crate::models::layer::{Entry, Layer};

const Z: char = '\0';

const EN_US_MAP: [[char; 16]; 8] = [
    [Z, '\x1b', '1', '2', '3', '4', '5', '6', '7', '8', '9', '0', '-', '=', '\x08', '\t'],
    ['q', 'w', 'e', 'r', 't', 'y', 'u', 'i', 'o', 'p', '[', ']', '\n', Z, 'a', 's'],
    ['d', 'f', 'g', 'h', 'j', 'k', 'l', ';', '\'', '`', Z, '\\', 'z', 'x', 'c', 'v'],
    ['b', 'n', 'm', ',', '.', '/', Z, '*', Z, ' ', Z, Z, Z, Z, Z, Z],
    [Z, Z, Z, Z, Z, Z, Z, '7', '8', '9', '-', '4', '5', '6', '+', '1'],
    ['2', '3', '0', '.', Z, Z, '\\', Z, Z, Z, Z, Z, Z, Z, Z, Z],
    [Z; 16],
    [Z; 16],
];

const EN_US_SHIFT_MAP: [[char; 16]; 8] = [
    [Z, '\x1b', '!', '@', '#', '$', '%', '^', '&', '*', '(', ')', '_', '+', '\x08', '\t'],
    ['Q', 'W', 'E', 'R', 'T', 'Y', 'U', 'I', 'O', 'P', '{', '}', '\n', Z, 'A', 'S'],
    ['D', 'F', 'G', 'H', 'J', 'K', 'L', ':', '"', '~', Z, '|', 'Z', 'X', 'C', 'V'],
    ['B', 'N', 'M', '<', '>', '?', Z, '*', Z, ' ', Z, Z, Z, Z, Z, Z],
    [Z, Z, Z, Z, Z, Z, Z, '7', '8', '9', '-', '4', '5', '6', '+', '1'],
    ['2', '3', '0', '.', Z, Z, '|', Z, Z, Z, Z, Z, Z, Z, Z, Z],
    [Z; 16],
    [Z; 16],
];

fn layer_from_rows(rows: &[[char; 16]; 8]) -> Layer {
    let mut layer = Layer::new();
    for (index, &c) in rows.iter().flatten().enumerate() {
        if c != Z {
            layer.set_entry(index, Entry::from_char(c));
        }
    }
    layer
}

/// Builds the built-in `en-us` character map.
///
/// The alt layer repeats the base layer and both AltGr layers mirror alt.
#[must_use]
pub fn default_character_map() -> CharacterMap {
    let base = layer_from_rows(&EN_US_MAP);
    let shift = layer_from_rows(&EN_US_SHIFT_MAP);
    let mut map = CharacterMap::blank(DEFAULT_KEYMAP_NAME);
    *map.layer_mut(Modifier::Alt) = base.clone();
    *map.layer_mut(Modifier::AltGr) = base.clone();
    *map.layer_mut(Modifier::ShiftAltGr) = base.clone();
    *map.layer_mut(Modifier::Base) = base;
    *map.layer_mut(Modifier::Shift) = shift;
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_map_letters() {
        let map = default_character_map();
        assert_eq!(map.name(), "en-us");
        assert_eq!(map.entry(Modifier::Base, 0x1e), Some(&Entry::from_char('a')));
        assert_eq!(map.entry(Modifier::Shift, 0x1e), Some(&Entry::from_char('A')));
        assert_eq!(map.entry(Modifier::Base, 0x39), Some(&Entry::from_char(' ')));
        assert_eq!(map.entry(Modifier::Shift, 0x02), Some(&Entry::from_char('!')));
    }

    #[test]
    fn test_default_map_unmapped_keys() {
        let map = default_character_map();
        // Left shift, left control and the unused tail carry no character
        assert!(map.entry(Modifier::Base, 0x2a).unwrap().is_unmapped());
        assert!(map.entry(Modifier::Base, 0x1d).unwrap().is_unmapped());
        assert!(map.entry(Modifier::Base, 0x7f).unwrap().is_unmapped());
    }

    #[test]
    fn test_default_map_altgr_layers_mirror_alt() {
        let map = default_character_map();
        assert_eq!(map.layer(Modifier::AltGr), map.layer(Modifier::Alt));
        assert_eq!(map.layer(Modifier::ShiftAltGr), map.layer(Modifier::Alt));
        assert_eq!(map.layer(Modifier::Alt), map.layer(Modifier::Base));
    }
}
