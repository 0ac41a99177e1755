//! Parsing and serialization of layout definitions.
//!
//! This module turns layout definition text into character maps and writes
//! character maps back out in the same format.

pub mod keymap_json;

// Re-export commonly used functions
pub use keymap_json::{decode_keymap, parse_keymap_json, to_keymap_json, KeymapDefinition};
