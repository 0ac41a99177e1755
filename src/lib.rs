//! Keymap Control Library
//!
//! This library provides the keyboard character map registry with its
//! privileged install and query operations, caller-side marshalling for
//! those operations, and loading of JSON layout definitions.

// Module declarations
pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod kernel;
pub mod models;
pub mod parser;
pub mod services;

pub use error::{KeymapError, KeymapResult};
