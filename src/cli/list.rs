//! List command: show the layout definitions available.

use crate::cli::common::{keymap_loader, load_config, print_json, CliError, CliResult};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// List the layout definitions in the keymap directory
#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Directory holding layout definitions
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ListOutput {
    dir: String,
    keymaps: Vec<String>,
}

impl ListArgs {
    /// Execute the list command
    pub fn execute(&self) -> CliResult<()> {
        let config = load_config();
        let loader = keymap_loader(self.dir.as_deref(), &config);
        let keymaps = loader
            .available()
            .map_err(|e| CliError::io(format!("{e:#}")))?;

        let output = ListOutput {
            dir: loader.keymap_dir().display().to_string(),
            keymaps,
        };

        if self.json {
            print_json(&output)?;
        } else if output.keymaps.is_empty() {
            println!("No keymaps found in {}", output.dir);
        } else {
            for name in &output.keymaps {
                println!("{name}");
            }
        }
        Ok(())
    }
}
