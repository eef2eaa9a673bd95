//! `liveserve serve` command implementation.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use liveserve_server::{ServerConfig, run_server};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Directory to serve and watch.
    #[arg(default_value = ".")]
    root_dir: PathBuf,

    /// Host to bind to.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to bind to.
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Seconds between file-change scans.
    #[arg(long, default_value_t = 0.5)]
    poll_interval: f64,

    /// File suffix that triggers a reload (repeatable; default: .html .css .js).
    #[arg(long = "ext", value_name = "SUFFIX")]
    extensions: Vec<String>,

    /// Enable verbose output (request and watcher logs).
    #[arg(short, long)]
    pub(crate) verbose: bool,

    /// Disable live reload.
    #[arg(long)]
    no_live_reload: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        if !self.root_dir.is_dir() {
            return Err(CliError::Validation(format!(
                "{} is not a directory",
                self.root_dir.display()
            )));
        }
        if !self.poll_interval.is_finite() || self.poll_interval <= 0.0 {
            return Err(CliError::Validation(format!(
                "poll interval must be a positive number of seconds, got {}",
                self.poll_interval
            )));
        }

        let extensions = if self.extensions.is_empty() {
            liveserve_server::default_extensions()
        } else {
            self.extensions
        };

        let config = ServerConfig {
            host: self.host,
            port: self.port,
            root_dir: self.root_dir,
            extensions,
            poll_interval: Duration::from_secs_f64(self.poll_interval),
            live_reload_enabled: !self.no_live_reload,
        };

        // Print startup info
        output.info(&format!("Serving {}", config.root_dir.display()));
        if config.live_reload_enabled {
            output.info(&format!(
                "Live reload: enabled ({})",
                config.extensions.join(", ")
            ));
        } else {
            output.info("Live reload: disabled");
        }
        output.highlight(&format!("Open http://localhost:{}", config.port));
        output.info("Press CTRL+C to stop");

        run_server(config).await?;

        Ok(())
    }
}
