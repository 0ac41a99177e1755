//! Set command: install a layout through the privileged boundary.
//!
//! The registry lives for the duration of the command only. The command loads
//! a definition, installs it as a simulated caller with the given identity and
//! promises, then queries the active map back to confirm the round trip.

use crate::cli::common::{
    keymap_loader, keymap_name, load_config, parse_promises, print_json, CliError, CliResult,
};
use crate::cli::load::MapSummary;
use crate::client;
use crate::kernel::{AddressSpace, Credentials, KeymapRegistry, Process};
use clap::Args;
use std::path::PathBuf;
use tracing::debug;

/// Install a layout as the active character map
///
/// The map name is measured in UTF-8 bytes and may be at most 50 bytes long,
/// so a name with non-ASCII characters holds fewer than 50 characters.
#[derive(Debug, Clone, Args)]
pub struct SetArgs {
    /// Layout name or path (at most 50 bytes); defaults to the configured keymap
    #[arg(value_name = "NAME")]
    pub name: Option<String>,

    /// Directory holding layout definitions
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Effective user id of the calling process
    #[arg(long, value_name = "UID", default_value_t = 0)]
    pub uid: u32,

    /// Comma separated promises the caller pledges (e.g. "stdio,setkeymap")
    #[arg(long, value_name = "PROMISES")]
    pub pledge: Option<String>,

    /// Output the installed map summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl SetArgs {
    /// Execute the set command
    pub fn execute(&self) -> CliResult<()> {
        let config = load_config();
        let loader = keymap_loader(self.dir.as_deref(), &config);
        let name = keymap_name(self.name.as_deref(), &config);
        let map = loader.load(&name)?;

        let registry = KeymapRegistry::new();
        let mut process = Process::new(
            std::process::id(),
            Credentials::user(self.uid, self.uid),
            AddressSpace::new(),
        );
        if let Some(list) = &self.pledge {
            process.pledge(parse_promises(list)?);
        }

        client::set_keymap(&registry, &mut process, &map)?;
        let active = client::get_keymap(&registry, &mut process)?;
        if active != map {
            return Err(CliError::validation(format!(
                "Active keymap '{}' does not match the installed definition",
                active.name()
            )));
        }
        debug!("Round trip of '{}' matched", active.name());

        let summary = MapSummary::new(&active, None);
        if self.json {
            print_json(&summary)?;
        } else {
            println!("Active keymap: {}", active.name());
        }
        Ok(())
    }
}
