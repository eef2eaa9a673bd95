//! Cache-control middleware.
//!
//! A live-reload server must not let the browser serve stale copies of the
//! files it just told the client to refetch, so every response carries
//! `Cache-Control: no-store`.

use axum::http::HeaderValue;
use axum::http::header;
use tower_http::set_header::SetResponseHeaderLayer;

/// Cache-Control header value for all responses.
const NO_STORE: &str = "no-store";

/// Create layer that disables client-side caching.
pub(crate) fn no_store_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(header::CACHE_CONTROL, HeaderValue::from_static(NO_STORE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_store_value() {
        assert_eq!(NO_STORE, "no-store");
    }
}
