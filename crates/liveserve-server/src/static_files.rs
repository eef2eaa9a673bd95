//! Static file serving.
//!
//! Everything that is not a WebSocket upgrade is delegated to the
//! tower-http directory service. Index resolution and MIME inference are
//! the collaborator's concern, not ours.

use std::path::Path;

use axum::body::Body;
use axum::extract::Request;
use axum::response::Response;
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::state::AppState;

/// Build the directory service for the served root.
pub(crate) fn service(root_dir: &Path) -> ServeDir {
    ServeDir::new(root_dir)
}

/// Serve one request from the root directory.
pub(crate) async fn serve(state: &AppState, req: Request) -> Response {
    match state.static_files.clone().oneshot(req).await {
        Ok(response) => response.map(Body::new),
        Err(infallible) => match infallible {},
    }
}
