//! Error types for the HTTP server.

use std::net::AddrParseError;

/// Server startup error.
///
/// Connection-level and scan-level failures are recovered where they
/// happen; the only errors that surface here are the ones that prevent
/// the server from starting at all.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The configured host/port pair is not a valid socket address.
    #[error("invalid bind address: {0}")]
    BindAddress(#[from] AddrParseError),

    /// Binding or serving the listener failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
