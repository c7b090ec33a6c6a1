// SPDX-License-Identifier: AGPL-3.0-or-later
//! ProviderFile CLI
//!
//! Drives native-file handles from the shell.

mod commands;

use clap::{Parser, Subcommand};
use pf_core::{PfResult, ProviderFileConfig};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;

#[derive(Parser)]
#[command(name = "pf")]
#[command(author, version, about = "ProviderFile - file operations through document handles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Handle configuration (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List directory contents
    #[command(alias = "dir")]
    Ls {
        /// Path to list (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,

        /// Long format with details
        #[arg(short, long)]
        long: bool,

        /// Show all files including hidden
        #[arg(short, long)]
        all: bool,

        /// Human-readable sizes
        #[arg(short = 'H', long)]
        human: bool,
    },

    /// Show file or directory information
    Stat {
        /// Path to inspect
        path: String,
    },

    /// Create directories
    Mkdir {
        /// Directory path(s) to create
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Create an empty file; the MIME type's extension is appended
    Touch {
        /// File path without extension
        path: String,

        /// MIME type of the new file
        #[arg(short, long, default_value = pf_core::mime::OCTET_STREAM)]
        mime: String,
    },

    /// Remove files or directories (directories recursively)
    Rm {
        /// Path(s) to remove
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Rename a file or directory in place
    Mv {
        /// Path to rename
        path: String,

        /// New name, without any directory part
        new_name: String,
    },

    /// Look up a direct child by name
    Find {
        /// Directory to search
        dir: String,

        /// Exact child name
        name: String,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> PfResult<ProviderFileConfig> {
    match path {
        Some(path) => ProviderFileConfig::load(path),
        None => Ok(ProviderFileConfig::default()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Ls { path, long, all, human } => commands::ls(&config, &path, long, all, human),
        Commands::Stat { path } => commands::stat(&config, &path),
        Commands::Mkdir { paths } => commands::mkdir(&config, &paths),
        Commands::Touch { path, mime } => commands::touch(&config, &path, &mime),
        Commands::Rm { paths } => commands::rm(&config, &paths),
        Commands::Mv { path, new_name } => commands::mv(&config, &path, &new_name),
        Commands::Find { dir, name } => commands::find(&config, &dir, &name),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
