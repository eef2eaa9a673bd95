//! HTTP server for the liveserve development server.
//!
//! This crate provides a native Rust HTTP server using axum, serving:
//! - Static files from the configured root directory
//! - A WebSocket channel (hand-rolled, no protocol library) that tells
//!   connected browsers to reload when a watched file changes
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use liveserve_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         root_dir: PathBuf::from("site"),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► Rust axum server (liveserve-server)
//!                        │
//!                        ├─► Upgrade: websocket ──► hand-rolled handshake
//!                        │       │                  + frame drain loop
//!                        │       └─► ClientRegistry ◄── FileWatcher
//!                        │                               (polling)
//!                        └─► Static files (tower-http ServeDir)
//! ```

mod app;
mod error;
mod live_reload;
mod middleware;
mod state;
mod static_files;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use live_reload::{ClientRegistry, FileWatcher, WatcherConfig};
use state::AppState;

pub use error::ServerError;

/// Default delay between watcher scans.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// File suffixes watched by default.
#[must_use]
pub fn default_extensions() -> Vec<String> {
    [".html", ".css", ".js"].map(String::from).to_vec()
}

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory served over HTTP and watched for changes.
    pub root_dir: PathBuf,
    /// File suffixes that trigger a reload when they change.
    pub extensions: Vec<String>,
    /// Delay between watcher scans.
    pub poll_interval: Duration,
    /// Enable live reload.
    pub live_reload_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            root_dir: PathBuf::from("."),
            extensions: default_extensions(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            live_reload_enabled: true,
        }
    }
}

/// Run the server.
///
/// Serves until the process receives Ctrl-C. Failing to bind the listener
/// is the only fatal error; everything past startup is recovered per
/// connection or per scan.
///
/// # Arguments
///
/// * `config` - Server configuration
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let registry = Arc::new(ClientRegistry::new());

    if config.live_reload_enabled {
        let watcher = FileWatcher::new(
            WatcherConfig {
                root_dir: config.root_dir.clone(),
                extensions: config.extensions.clone(),
                poll_interval: config.poll_interval,
            },
            Arc::clone(&registry),
        );
        watcher.spawn();
    }

    // Create app state
    let state = Arc::new(AppState {
        registry,
        static_files: static_files::service(&config.root_dir),
        live_reload_enabled: config.live_reload_enabled,
    });

    // Create router
    let app = app::create_router(state);

    // Bind and run server
    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert!(config.live_reload_enabled);
    }

    #[test]
    fn test_default_extensions() {
        assert_eq!(default_extensions(), [".html", ".css", ".js"]);
    }
}
