//! Data models for character maps, layers and key entries.
//!
//! This module contains the core data structures shared by the loader,
//! the registry and the boundary operations.

pub mod character_map;
pub mod defaults;
pub mod layer;

// Re-export all model types
pub use character_map::{CharacterMap, CharacterMapBuilder, Modifier};
pub use defaults::default_character_map;
pub use layer::{Entry, Layer};
