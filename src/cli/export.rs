//! Export command: write a keymap back to the definition format.

use crate::cli::common::{keymap_loader, load_config, CliError, CliResult};
use crate::models::default_character_map;
use crate::parser::to_keymap_json;
use crate::services::KeymapLoader;
use clap::Args;
use std::path::PathBuf;

/// Export a keymap as a definition file with all five layers
#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// Layout name or path; without it the built-in map is exported
    #[arg(value_name = "NAME")]
    pub name: Option<String>,

    /// Directory holding layout definitions
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Output file (prints to stdout when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl ExportArgs {
    /// Execute the export command
    pub fn execute(&self) -> CliResult<()> {
        let map = match &self.name {
            Some(name) => {
                let config = load_config();
                keymap_loader(self.dir.as_deref(), &config).load(name)?
            }
            None => default_character_map(),
        };

        if let Some(path) = &self.output {
            KeymapLoader::save(&map, path)
                .map_err(|e| CliError::io(format!("Failed to write output file: {e:#}")))?;
            println!("Exported '{}' to {}", map.name(), path.display());
        } else {
            let json = to_keymap_json(&map)
                .map_err(|e| CliError::io(format!("Failed to serialize keymap: {e}")))?;
            println!("{json}");
        }
        Ok(())
    }
}
