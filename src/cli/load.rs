//! Load command: decode a layout definition and summarize it.

use crate::cli::common::{keymap_loader, keymap_name, load_config, print_json, CliResult};
use crate::models::CharacterMap;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Load a layout definition and summarize its layers
#[derive(Debug, Clone, Args)]
pub struct LoadArgs {
    /// Layout name (e.g. "de") or path ending in .json; defaults to the configured keymap
    #[arg(value_name = "NAME")]
    pub name: Option<String>,

    /// Directory holding layout definitions
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Per-layer statistics of a character map.
#[derive(Debug, Serialize)]
pub struct LayerSummary {
    /// Modifier combination
    pub modifier: String,
    /// Keys with a mapping other than "no character"
    pub mapped: usize,
    /// Codepoints stored in the layer
    pub codepoints: usize,
}

/// Statistics of a whole character map.
#[derive(Debug, Serialize)]
pub struct MapSummary {
    /// Map name
    pub name: String,
    /// Resolved definition path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Layers in storage order
    pub layers: Vec<LayerSummary>,
}

impl MapSummary {
    /// Summarizes `map`, optionally recording where it came from.
    #[must_use]
    pub fn new(map: &CharacterMap, path: Option<String>) -> Self {
        let layers = map
            .layers()
            .map(|(modifier, layer)| LayerSummary {
                modifier: modifier.to_string(),
                mapped: layer.mapped_count(),
                codepoints: layer.iter().map(|entry| entry.len()).sum(),
            })
            .collect();
        Self {
            name: map.name().to_string(),
            path,
            layers,
        }
    }

    /// Prints the summary as an aligned table.
    pub fn print(&self) {
        println!("Keymap: {}", self.name);
        if let Some(path) = &self.path {
            println!("Source: {path}");
        }
        println!();
        println!("  {:<12} {:>6} {:>10}", "Layer", "Mapped", "Codepoints");
        for layer in &self.layers {
            println!(
                "  {:<12} {:>6} {:>10}",
                layer.modifier, layer.mapped, layer.codepoints
            );
        }
    }
}

impl LoadArgs {
    /// Execute the load command
    pub fn execute(&self) -> CliResult<()> {
        let config = load_config();
        let loader = keymap_loader(self.dir.as_deref(), &config);
        let name = keymap_name(self.name.as_deref(), &config);

        let map = loader.load(&name)?;
        let path = loader.resolve(&name).display().to_string();
        let summary = MapSummary::new(&map, Some(path));

        if self.json {
            print_json(&summary)?;
        } else {
            summary.print();
        }
        Ok(())
    }
}
