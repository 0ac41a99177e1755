//! Configuration management CLI commands.

use crate::cli::common::{print_json, CliError, CliResult};
use crate::config::Config;
use crate::constants::APP_NAME;
use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

/// Configuration management commands
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Display current configuration
    Show(ConfigShowArgs),
    /// Set configuration values
    Set(ConfigSetArgs),
}

/// Display current configuration
#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Set configuration values
#[derive(Args, Debug)]
pub struct ConfigSetArgs {
    /// Directory holding layout definitions
    #[arg(long, value_name = "DIR")]
    keymap_dir: Option<PathBuf>,

    /// Keymap used when a command is given no name
    #[arg(long, value_name = "NAME")]
    default_keymap: Option<String>,
}

/// JSON-serializable configuration for output
#[derive(Serialize, Debug)]
struct ConfigOutput {
    config_file: Option<String>,
    paths: PathsOutput,
    keyboard: KeyboardOutput,
}

#[derive(Serialize, Debug)]
struct PathsOutput {
    keymap_dir: String,
}

#[derive(Serialize, Debug)]
struct KeyboardOutput {
    default_keymap: String,
}

impl ConfigArgs {
    /// Execute config subcommand
    pub fn execute(&self) -> CliResult<()> {
        match &self.command {
            ConfigCommand::Show(args) => args.execute(),
            ConfigCommand::Set(args) => args.execute(),
        }
    }
}

impl ConfigShowArgs {
    /// Execute show command
    pub fn execute(&self) -> CliResult<()> {
        let config = Config::load()
            .map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))?;

        let output = ConfigOutput {
            config_file: Config::config_file_path()
                .ok()
                .map(|p| p.display().to_string()),
            paths: PathsOutput {
                keymap_dir: config.paths.keymap_dir.display().to_string(),
            },
            keyboard: KeyboardOutput {
                default_keymap: config.keyboard.default_keymap,
            },
        };

        if self.json {
            print_json(&output)?;
        } else {
            let title = format!("{APP_NAME} Configuration");
            println!("{title}");
            println!("{}", "=".repeat(title.len()));
            println!();
            if let Some(file) = &output.config_file {
                println!("File: {file}");
                println!();
            }
            println!("Paths:");
            println!("  Keymap Directory: {}", output.paths.keymap_dir);
            println!();
            println!("Keyboard:");
            println!("  Default Keymap: {}", output.keyboard.default_keymap);
        }

        Ok(())
    }
}

impl ConfigSetArgs {
    /// Execute set command
    pub fn execute(&self) -> CliResult<()> {
        if self.keymap_dir.is_none() && self.default_keymap.is_none() {
            return Err(CliError::validation(
                "At least one configuration option must be specified: --keymap-dir or --default-keymap",
            ));
        }

        let mut config = Config::load().unwrap_or_default();

        if let Some(dir) = &self.keymap_dir {
            config.paths.keymap_dir.clone_from(dir);
        }
        if let Some(name) = &self.default_keymap {
            config.keyboard.default_keymap.clone_from(name);
        }

        config
            .validate()
            .map_err(|e| CliError::validation(format!("Invalid configuration: {e}")))?;
        config
            .save()
            .map_err(|e| CliError::io(format!("Failed to save configuration: {e:#}")))?;

        println!("Configuration updated successfully.");

        Ok(())
    }
}
