//! Shared test fixtures for integration and CLI tests.
#![allow(dead_code)] // Not every test binary uses every fixture

use keymapctl::kernel::{AddressSpace, Credentials, Process};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Builds a layer field of 128 strings, every key producing `value`.
pub fn uniform_field(value: &str) -> Vec<String> {
    vec![value.to_string(); 128]
}

/// Builds a layer field whose key `index` produces `value` and every other
/// key produces nothing.
pub fn sparse_field(index: usize, value: &str) -> Vec<String> {
    let mut field = vec![String::new(); 128];
    field[index] = value.to_string();
    field
}

/// Builds a definition document with the three required layers.
pub fn definition(map: &[String], shift_map: &[String], alt_map: &[String]) -> Value {
    json!({
        "map": map,
        "shift_map": shift_map,
        "alt_map": alt_map,
    })
}

/// Builds a definition document with all five layers.
pub fn full_definition(
    map: &[String],
    shift_map: &[String],
    alt_map: &[String],
    altgr_map: &[String],
    shift_altgr_map: &[String],
) -> Value {
    json!({
        "map": map,
        "shift_map": shift_map,
        "alt_map": alt_map,
        "altgr_map": altgr_map,
        "shift_altgr_map": shift_altgr_map,
    })
}

/// A temporary keymap directory.
pub struct KeymapDir {
    dir: TempDir,
}

impl KeymapDir {
    /// Creates an empty keymap directory.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Directory path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes `<name>.json` holding `document`.
    pub fn write(&self, name: &str, document: &Value) -> PathBuf {
        let text = serde_json::to_string_pretty(document).expect("Failed to serialize");
        self.write_raw(name, text.as_bytes())
    }

    /// Writes `<name>.json` holding raw bytes.
    pub fn write_raw(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.dir.path().join(format!("{name}.json"));
        fs::write(&path, bytes).expect("Failed to write definition");
        path
    }
}

/// Writes the standard "de"-like definition: base 'a', shift 'A', alt 'b',
/// with no AltGr layers.
pub fn write_basic(dir: &KeymapDir, name: &str) -> PathBuf {
    dir.write(
        name,
        &definition(
            &uniform_field("a"),
            &uniform_field("A"),
            &uniform_field("b"),
        ),
    )
}

/// Creates a superuser process with an empty address space.
pub fn root_process() -> Process<AddressSpace> {
    Process::new(1, Credentials::root(), AddressSpace::new())
}

/// Creates an unprivileged process with an empty address space.
pub fn user_process(uid: u32) -> Process<AddressSpace> {
    Process::new(100 + uid, Credentials::user(uid, uid), AddressSpace::new())
}
