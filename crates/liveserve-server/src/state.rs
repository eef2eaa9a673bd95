//! Application state.
//!
//! Shared state for the request dispatcher.

use std::sync::Arc;

use tower_http::services::ServeDir;

use crate::live_reload::ClientRegistry;

/// Application state shared across all connections.
pub(crate) struct AppState {
    /// Registry of live WebSocket connections.
    pub(crate) registry: Arc<ClientRegistry>,
    /// Static file collaborator rooted at the served directory.
    pub(crate) static_files: ServeDir,
    /// Whether upgrade requests are accepted.
    pub(crate) live_reload_enabled: bool,
}
