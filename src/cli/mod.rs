//! CLI command handlers for keymapctl.
//!
//! Each subcommand loads, inspects or installs character maps headlessly so
//! the library can be driven from scripts and tests.

pub mod common;
pub mod config;
pub mod export;
pub mod list;
pub mod load;
pub mod set;
pub mod show;
pub mod validate;

// Re-export types used by main.rs and tests
pub use common::{CliError, CliResult, ExitCode};
pub use config::ConfigArgs;
pub use export::ExportArgs;
pub use list::ListArgs;
pub use load::LoadArgs;
pub use set::SetArgs;
pub use show::ShowArgs;
pub use validate::ValidateArgs;
