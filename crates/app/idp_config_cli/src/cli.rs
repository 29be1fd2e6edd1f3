use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Validate, preview and compare configuration records without a server.
#[derive(Parser, Debug)]
#[command(name = "idp_config_cli", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a record or environment file; exits 2 when invalid.
    Validate {
        /// YAML or JSON file.
        file: PathBuf,
        /// Environment to validate. Required for single environment files.
        #[arg(short, long)]
        environment: Option<String>,
    },
    /// Render the YAML preview of a record or environment file.
    Preview {
        file: PathBuf,
        #[arg(short, long)]
        environment: Option<String>,
    },
    /// Structural diff of two files.
    Diff {
        a: PathBuf,
        b: PathBuf,
        /// Compare only this environment of each record.
        #[arg(short, long)]
        environment: Option<String>,
    },
    /// List the available templates.
    Templates {
        /// Extra template directory.
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Print the CLI version.
    Version,
}
