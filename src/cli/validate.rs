//! Validation command for layout definitions.

use crate::cli::common::{keymap_loader, keymap_name, load_config, print_json, CliError, CliResult};
use crate::models::CharacterMap;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Validate a layout definition without installing it
#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    /// Layout name or path; defaults to the configured keymap
    #[arg(value_name = "NAME")]
    pub name: Option<String>,

    /// Directory holding layout definitions
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of validating one definition.
#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    /// Whether the definition decodes and its name can be installed
    pub valid: bool,
    /// Layout name as given
    pub name: String,
    /// Resolved definition path
    pub path: String,
    /// Error message when invalid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// errno the failure maps to when invalid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errno: Option<i32>,
}

impl ValidateArgs {
    /// Execute the validate command
    pub fn execute(&self) -> CliResult<()> {
        let config = load_config();
        let loader = keymap_loader(self.dir.as_deref(), &config);
        let name = keymap_name(self.name.as_deref(), &config);

        // A definition that decodes but cannot be installed is still invalid.
        let result = loader
            .load(&name)
            .and_then(|map| CharacterMap::validate_name(map.name()));

        let response = ValidationResponse {
            valid: result.is_ok(),
            name: name.clone(),
            path: loader.resolve(&name).display().to_string(),
            error: result.as_ref().err().map(ToString::to_string),
            errno: result.as_ref().err().map(crate::error::KeymapError::errno),
        };

        if self.json {
            print_json(&response)?;
        } else if response.valid {
            println!("✓ {} is valid ({})", response.name, response.path);
        } else {
            println!("✗ {} is invalid ({})", response.name, response.path);
        }

        result.map_err(CliError::from)
    }
}
