//! WebSocket opening handshake.
//!
//! Server side of the RFC 6455 key exchange. The handshake is the only part
//! of the WebSocket path that speaks HTTP; everything after the `101` is raw
//! frames (see [`frame`](super::frame)).

use axum::http::{HeaderMap, HeaderValue, header};
use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use sha1::{Digest, Sha1};

/// GUID appended to the client key before hashing, fixed by RFC 6455.
const WEBSOCKET_GUID: &[u8] = b"258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// Handshake failure.
#[derive(Debug, thiserror::Error)]
pub(crate) enum HandshakeError {
    /// The upgrade request carried no `Sec-WebSocket-Key` header.
    #[error("missing Sec-WebSocket-Key header")]
    MissingKey,

    /// The HTTP layer did not hand over the connection for upgrading.
    #[error("connection is not upgradable")]
    NotUpgradable,
}

/// Compute the `Sec-WebSocket-Accept` value for a client key.
///
/// SHA-1 over the key concatenated with the protocol GUID, base64-encoded.
/// Pure and deterministic: the RFC 6455 example key
/// `dGhlIHNhbXBsZSBub25jZQ==` produces `s3pPLMBiTxaQ9kYGzzhZRbK+xOo=`.
pub(crate) fn accept_key(key: &[u8]) -> String {
    let mut sha1 = Sha1::new();
    sha1.update(key);
    sha1.update(WEBSOCKET_GUID);
    BASE64_STANDARD.encode(sha1.finalize())
}

/// Check whether a request asks for a WebSocket upgrade.
///
/// Reload clients connect on whatever path they like, so dispatch looks at
/// the `Upgrade` header (case-insensitive) rather than the route table.
pub(crate) fn is_websocket_upgrade(headers: &HeaderMap) -> bool {
    headers
        .get(header::UPGRADE)
        .map(HeaderValue::as_bytes)
        .is_some_and(|value| value.trim_ascii().eq_ignore_ascii_case(b"websocket"))
}
