//! CLI error types.

use liveserve_server::ServerError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Server(#[from] ServerError),

    #[error("{0}")]
    Validation(String),
}
