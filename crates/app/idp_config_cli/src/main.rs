// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

use clap::Parser;
use cli::{Cli, Commands};

mod cli;
mod commands;
mod logging;

fn main() -> Result<()> {
    match run() {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    logging::init()?;

    let args = Cli::parse();

    match &args.command {
        Commands::Validate { file, environment } => {
            commands::validate(file, environment.as_deref())
        }
        Commands::Preview { file, environment } => commands::preview(file, environment.as_deref()),
        Commands::Diff { a, b, environment } => commands::diff(a, b, environment.as_deref()),
        Commands::Templates { dir } => commands::templates(dir.as_deref()),
        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
    }
}
