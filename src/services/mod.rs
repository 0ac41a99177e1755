//! Service layer for business logic.
//!
//! This module contains services that coordinate file access, parsing and
//! decoding of layout definitions.

pub mod keymaps;

// Re-export commonly used types and functions
pub use keymaps::KeymapLoader;
