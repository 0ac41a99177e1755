//! Show command: print the entries of one layer.

use crate::cli::common::{keymap_loader, load_config, print_json, CliError, CliResult};
use crate::client;
use crate::kernel::{AddressSpace, Credentials, KeymapRegistry, Process};
use crate::models::{CharacterMap, Entry, Modifier};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Show the entries of one layer of a keymap
#[derive(Debug, Clone, Args)]
pub struct ShowArgs {
    /// Layout name or path; without it the active built-in map is queried
    #[arg(value_name = "NAME")]
    pub name: Option<String>,

    /// Directory holding layout definitions
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Layer to show (base, shift, alt, altgr, shift+altgr)
    #[arg(short, long, value_name = "MODIFIER", default_value = "base")]
    pub layer: String,

    /// Include keys that produce no character
    #[arg(long)]
    pub all: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// One key of a layer.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct EntryRow {
    /// Key index
    pub index: usize,
    /// Codepoints produced by the key
    pub codepoints: Vec<u32>,
    /// Printable rendering of the codepoints
    pub text: String,
}

impl EntryRow {
    fn new(index: usize, entry: &Entry) -> Self {
        let text = if entry.is_unmapped() {
            String::new()
        } else {
            entry.to_definition_string().escape_debug().to_string()
        };
        Self {
            index,
            codepoints: entry.codepoints().to_vec(),
            text,
        }
    }
}

/// Output of the show command.
#[derive(Debug, Serialize)]
pub struct LayerView {
    /// Map name
    pub name: String,
    /// Modifier combination shown
    pub modifier: String,
    /// Keys in index order
    pub entries: Vec<EntryRow>,
}

impl LayerView {
    /// Collects the rows of `modifier` in `map`.
    #[must_use]
    pub fn new(map: &CharacterMap, modifier: Modifier, include_unmapped: bool) -> Self {
        let entries = map
            .layer(modifier)
            .iter()
            .enumerate()
            .filter(|(_, entry)| include_unmapped || !entry.is_unmapped())
            .map(|(index, entry)| EntryRow::new(index, entry))
            .collect();
        Self {
            name: map.name().to_string(),
            modifier: modifier.to_string(),
            entries,
        }
    }
}

impl ShowArgs {
    /// Execute the show command
    pub fn execute(&self) -> CliResult<()> {
        let modifier = Modifier::from_name(&self.layer).ok_or_else(|| {
            CliError::validation(format!(
                "Unknown layer '{}'. Must be one of: base, shift, alt, altgr, shift+altgr",
                self.layer
            ))
        })?;

        let map = if let Some(name) = &self.name {
            let config = load_config();
            keymap_loader(self.dir.as_deref(), &config).load(name)?
        } else {
            let registry = KeymapRegistry::new();
            let mut process = Process::new(1, Credentials::root(), AddressSpace::new());
            client::get_keymap(&registry, &mut process)?
        };

        let view = LayerView::new(&map, modifier, self.all);
        if self.json {
            print_json(&view)?;
        } else {
            println!("Keymap: {} ({} layer)", view.name, view.modifier);
            println!();
            for row in &view.entries {
                let codepoints: Vec<String> =
                    row.codepoints.iter().map(|cp| format!("U+{cp:04X}")).collect();
                println!(
                    "  {:#04x}  {:<8} {}",
                    row.index,
                    row.text,
                    codepoints.join(" ")
                );
            }
        }
        Ok(())
    }
}
