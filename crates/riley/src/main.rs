// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Riley - answers customer messages for a home-exterior contractor.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use riley_config::{ConfigError, RileyConfig};

mod analyze;
mod serve;
mod show_config;

/// Riley - AI assistant for customer conversations.
#[derive(Parser, Debug)]
#[command(name = "riley", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway.
    Serve,
    /// Analyze a message and show the scripted reply it would get.
    Analyze {
        /// Message text.
        text: String,
    },
    /// Validate and print the effective configuration.
    Config,
}

fn load(path: Option<&PathBuf>) -> Result<RileyConfig, Vec<ConfigError>> {
    match path {
        Some(path) => riley_config::load_and_validate_path(path),
        None => riley_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            riley_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Analyze { text }) => analyze::run_analyze(&config, &text),
        Some(Commands::Config) => show_config::run_config(&config),
        None => {
            println!("riley: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
