//! Layout definition loading service.
//!
//! This module resolves layout names to definition files and decodes them
//! into character maps ready to be installed.

use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::{DEFAULT_KEYMAP_DIR, KEYMAP_EXTENSION};
use crate::error::{KeymapError, KeymapResult};
use crate::models::CharacterMap;
use crate::parser;

/// Resolves layout names and loads their definitions.
///
/// A name that already ends in `.json` is used as a literal path; any other
/// name is looked up as `<keymap_dir>/<name>.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeymapLoader {
    keymap_dir: PathBuf,
}

impl KeymapLoader {
    /// Creates a loader that resolves bare names inside `keymap_dir`.
    pub fn new(keymap_dir: impl Into<PathBuf>) -> Self {
        Self {
            keymap_dir: keymap_dir.into(),
        }
    }

    /// Directory searched for bare names.
    #[must_use]
    pub fn keymap_dir(&self) -> &Path {
        &self.keymap_dir
    }

    /// Resolves a layout name to the path of its definition.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use keymapctl::services::KeymapLoader;
    ///
    /// let loader = KeymapLoader::new("/res/keymaps");
    /// assert_eq!(loader.resolve("de"), Path::new("/res/keymaps/de.json"));
    /// assert_eq!(loader.resolve("./mine.json"), Path::new("./mine.json"));
    /// ```
    #[must_use]
    pub fn resolve(&self, name: &str) -> PathBuf {
        if name.ends_with(&format!(".{KEYMAP_EXTENSION}")) {
            PathBuf::from(name)
        } else {
            self.keymap_dir.join(format!("{name}.{KEYMAP_EXTENSION}"))
        }
    }

    /// Loads and decodes a layout definition.
    ///
    /// The returned map carries `name` as given.
    ///
    /// # Errors
    ///
    /// * `ResourceNotFound` - the definition file does not exist
    /// * `Utf8Decode` - the file is not UTF-8 text
    /// * `MalformedDefinition` - the text is not a valid definition
    /// * `Io` - any other read failure
    pub fn load(&self, name: &str) -> KeymapResult<CharacterMap> {
        let path = self.resolve(name);
        debug!("Loading keymap '{}' from {}", name, path.display());

        let bytes = fs::read(&path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => KeymapError::ResourceNotFound { path: path.clone() },
            _ => KeymapError::Io {
                path: path.clone(),
                source,
            },
        })?;
        let contents = std::str::from_utf8(&bytes).map_err(|source| KeymapError::Utf8Decode {
            context: path.display().to_string(),
            source,
        })?;

        let definition = parser::parse_keymap_json(contents, &path)?;
        let map = parser::decode_keymap(&definition, name, &path)?;
        info!(
            "Loaded keymap '{}' ({} codepoints)",
            map.name(),
            map.codepoint_count()
        );
        Ok(map)
    }

    /// Lists the layout names available in the keymap directory, sorted.
    ///
    /// A missing directory yields an empty list.
    pub fn available(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        if !self.keymap_dir.exists() {
            return Ok(names);
        }

        let entries = fs::read_dir(&self.keymap_dir).with_context(|| {
            format!(
                "Failed to read keymap directory: {}",
                self.keymap_dir.display()
            )
        })?;

        for entry in entries {
            let path = entry.context("Failed to read directory entry")?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(KEYMAP_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    /// Writes a character map as a definition file with all five layers.
    ///
    /// Uses temp file + rename so the target is never left half written.
    pub fn save(map: &CharacterMap, path: &Path) -> Result<()> {
        let content = parser::to_keymap_json(map).context("Failed to serialize keymap")?;

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write temp file: {}", temp_path.display()))?;
        fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;

        Ok(())
    }
}

impl Default for KeymapLoader {
    fn default() -> Self {
        Self::new(DEFAULT_KEYMAP_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{default_character_map, Modifier};
    use tempfile::TempDir;

    #[test]
    fn test_resolve_bare_name() {
        let loader = KeymapLoader::default();
        assert_eq!(loader.resolve("en-us"), PathBuf::from("/res/keymaps/en-us.json"));
        assert_eq!(loader.resolve("de.JSON"), PathBuf::from("/res/keymaps/de.JSON.json"));
    }

    #[test]
    fn test_resolve_literal_path() {
        let loader = KeymapLoader::default();
        assert_eq!(
            loader.resolve("/tmp/custom.json"),
            PathBuf::from("/tmp/custom.json")
        );
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let loader = KeymapLoader::new(temp_dir.path());
        let err = loader.load("nope").unwrap_err();
        assert!(matches!(err, KeymapError::ResourceNotFound { .. }));
    }

    #[test]
    fn test_load_invalid_utf8() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("bad.json"), [b'{', 0xff, 0xfe, b'}']).unwrap();

        let loader = KeymapLoader::new(temp_dir.path());
        let err = loader.load("bad").unwrap_err();
        assert!(matches!(err, KeymapError::Utf8Decode { .. }));
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let map = default_character_map();
        KeymapLoader::save(&map, &temp_dir.path().join("en-us.json")).unwrap();

        let loader = KeymapLoader::new(temp_dir.path());
        let loaded = loader.load("en-us").unwrap();
        assert_eq!(loaded, map);
        assert_eq!(
            loaded.layer(Modifier::Shift),
            map.layer(Modifier::Shift)
        );
    }

    #[test]
    fn test_available_lists_definitions() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("fr.json"), "{}").unwrap();
        fs::write(temp_dir.path().join("de.json"), "{}").unwrap();
        fs::write(temp_dir.path().join("README.md"), "").unwrap();

        let loader = KeymapLoader::new(temp_dir.path());
        assert_eq!(loader.available().unwrap(), vec!["de", "fr"]);

        let missing = KeymapLoader::new(temp_dir.path().join("missing"));
        assert!(missing.available().unwrap().is_empty());
    }
}
