//! Keymap Control - inspect, validate and install keyboard character maps
//!
//! This application loads JSON layout definitions and drives the keymap
//! install and query operations through a simulated privileged boundary.

use clap::{Parser, Subcommand};
use keymapctl::cli::{
    CliError, ConfigArgs, ExitCode, ExportArgs, ListArgs, LoadArgs, SetArgs, ShowArgs,
    ValidateArgs,
};
use keymapctl::constants::APP_BINARY_NAME;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Keymap Control - keyboard character map tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a layout definition and summarize its layers
    Load(LoadArgs),
    /// Show the entries of one layer
    Show(ShowArgs),
    /// Validate a layout definition
    Validate(ValidateArgs),
    /// Install a layout as the active character map
    Set(SetArgs),
    /// Export a keymap as a definition file
    Export(ExportArgs),
    /// List available layout definitions
    List(ListArgs),
    /// Manage configuration
    Config(ConfigArgs),
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result: Result<(), CliError> = match cli.command {
        Commands::Load(args) => args.execute(),
        Commands::Show(args) => args.execute(),
        Commands::Validate(args) => args.execute(),
        Commands::Set(args) => args.execute(),
        Commands::Export(args) => args.execute(),
        Commands::List(args) => args.execute(),
        Commands::Config(args) => args.execute(),
    };

    let code = match result {
        Ok(()) => ExitCode::Success,
        Err(err) => {
            eprintln!("{APP_BINARY_NAME}: {err}");
            err.exit_code
        }
    };
    std::process::exit(code.code());
}
