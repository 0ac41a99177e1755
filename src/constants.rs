//! Application-wide constants.
//!
//! This module defines constants used throughout the application,
//! including the application name and the fixed geometry of a character map.

/// The display name of the application (human-readable, with proper capitalization).
pub const APP_NAME: &str = "Keymap Control";

/// The binary name of the application (used in command examples).
pub const APP_BINARY_NAME: &str = "keymapctl";

/// Number of key positions in every layer of a character map.
pub const CHAR_MAP_SIZE: usize = 0x80;

/// Maximum length of a character map name, in bytes.
pub const MAP_NAME_MAX_LEN: usize = 50;

/// Directory searched for layout definitions given by bare name.
pub const DEFAULT_KEYMAP_DIR: &str = "/res/keymaps";

/// Extension of layout definition files (without the leading dot).
pub const KEYMAP_EXTENSION: &str = "json";

/// Name of the built-in map the registry starts with.
pub const DEFAULT_KEYMAP_NAME: &str = "en-us";
