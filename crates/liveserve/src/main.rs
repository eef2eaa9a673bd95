//! Liveserve CLI - static development server with live reload.
//!
//! Provides commands for:
//! - `serve`: Serve a directory and reload connected browsers on change

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::ServeArgs;
use output::Output;

/// Liveserve - static dev server with live reload.
#[derive(Parser)]
#[command(name = "liveserve", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve a directory and reload browsers when files change.
    Serve(ServeArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // Check if verbose flag is set for serve command
    let verbose = matches!(&cli.command, Commands::Serve(args) if args.verbose);

    // Initialize tracing with appropriate log level
    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Commands::Serve(args) => {
            let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
            rt.block_on(args.execute())
        }
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_serve_defaults() {
        assert!(Cli::try_parse_from(["liveserve", "serve"]).is_ok());
    }

    #[test]
    fn test_cli_parses_serve_flags() {
        let cli = Cli::try_parse_from([
            "liveserve",
            "serve",
            "site",
            "--port",
            "3000",
            "--ext",
            ".htm",
            "--no-live-reload",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Serve(_)));
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["liveserve"]).is_err());
    }
}
