//! Router construction.
//!
//! Builds the axum router: a single fallback dispatches every request to
//! either the WebSocket acceptor or the static file service, depending on
//! the `Upgrade` header.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Request, State};
use axum::response::Response;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::live_reload;
use crate::middleware::caching;
use crate::state::AppState;
use crate::static_files;

/// Create the application router.
///
/// # Arguments
///
/// * `state` - Shared application state
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .fallback(dispatch)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(caching::no_store_layer()),
        )
        .with_state(state)
}

/// Route one request.
///
/// Reload clients may connect on any path, so WebSocket dispatch checks
/// the `Upgrade` header instead of the route table; everything else goes
/// to the static file collaborator.
async fn dispatch(State(state): State<Arc<AppState>>, req: Request) -> Response {
    if state.live_reload_enabled && live_reload::is_websocket_upgrade(req.headers()) {
        live_reload::handle_upgrade(Arc::clone(&state.registry), req).await
    } else {
        static_files::serve(&state, req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::Path;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use crate::live_reload::ClientRegistry;

    fn test_state(root: &Path, live_reload_enabled: bool) -> Arc<AppState> {
        Arc::new(AppState {
            registry: Arc::new(ClientRegistry::new()),
            static_files: static_files::service(root),
            live_reload_enabled,
        })
    }

    fn site_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>hello</h1>").unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_serves_static_file() {
        let dir = site_dir();
        let app = create_router(test_state(dir.path(), true));

        let response = app
            .oneshot(Request::get("/app.js").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_root_resolves_index_html() {
        let dir = site_dir();
        let app = create_router(test_state(dir.path(), true));

        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = site_dir();
        let app = create_router(test_state(dir.path(), true));

        let response = app
            .oneshot(Request::get("/missing.html").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_responses_disable_caching() {
        let dir = site_dir();
        let app = create_router(test_state(dir.path(), true));

        let response = app
            .oneshot(Request::get("/index.html").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "no-store"
        );
    }

    #[tokio::test]
    async fn test_upgrade_without_key_is_rejected_and_unregistered() {
        let dir = site_dir();
        let state = test_state(dir.path(), true);
        let app = create_router(Arc::clone(&state));

        let response = app
            .oneshot(
                Request::get("/anywhere")
                    .header(header::UPGRADE, "websocket")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.registry.len(), 0);
    }

    #[tokio::test]
    async fn test_upgrade_header_is_case_insensitive() {
        let dir = site_dir();
        let app = create_router(test_state(dir.path(), true));

        let response = app
            .oneshot(
                Request::get("/")
                    .header(header::UPGRADE, "WebSocket")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        // Dispatched to the WebSocket path (which rejects the keyless
        // request) instead of serving index.html
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upgrade_falls_through_when_live_reload_disabled() {
        let dir = site_dir();
        let app = create_router(test_state(dir.path(), false));

        let response = app
            .oneshot(
                Request::get("/")
                    .header(header::UPGRADE, "websocket")
                    .header("Sec-WebSocket-Key", "dGhlIHNhbXBsZSBub25jZQ==")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        // Static serving answers as if the header were not there
        assert_eq!(response.status(), StatusCode::OK);
    }
}
