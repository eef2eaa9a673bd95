//! WebSocket connection acceptance and lifecycle.
//!
//! Performs the upgrade on any request that asks for one, then owns the
//! connection until it drops: frames queued by watcher broadcasts are
//! written out by a dedicated writer task while the read side drains and
//! discards whatever the client sends.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::Request;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use hyper::upgrade::{OnUpgrade, Upgraded};
use hyper_util::rt::TokioIo;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

use super::frame::{self, InboundFrame};
use super::handshake::{self, HandshakeError};
use super::registry::ClientRegistry;

/// Accept a WebSocket upgrade request.
///
/// Replies `101 Switching Protocols` and spawns a task that takes over the
/// connection once the protocol switch completes. A request without the
/// key header is rejected with `400` and never reaches the registry.
pub(crate) async fn handle_upgrade(registry: Arc<ClientRegistry>, req: Request) -> Response {
    match begin_upgrade(registry, req) {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(error = %err, "Rejected WebSocket upgrade");
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
    }
}

fn begin_upgrade(
    registry: Arc<ClientRegistry>,
    mut req: Request,
) -> Result<Response, HandshakeError> {
    let key = req
        .headers()
        .get("Sec-WebSocket-Key")
        .ok_or(HandshakeError::MissingKey)?;
    let accept = handshake::accept_key(key.as_bytes());

    let on_upgrade = req
        .extensions_mut()
        .remove::<OnUpgrade>()
        .ok_or(HandshakeError::NotUpgradable)?;

    tokio::spawn(async move {
        match on_upgrade.await {
            Ok(upgraded) => serve_connection(TokioIo::new(upgraded), registry).await,
            Err(err) => tracing::debug!(error = %err, "WebSocket upgrade did not complete"),
        }
    });

    // The 101 goes out through the HTTP layer; the spawned task receives
    // the raw stream once the response has been written.
    Ok(Response::builder()
        .status(StatusCode::SWITCHING_PROTOCOLS)
        .header(header::UPGRADE, HeaderValue::from_static("websocket"))
        .header(header::CONNECTION, HeaderValue::from_static("Upgrade"))
        .header("Sec-WebSocket-Accept", accept)
        .body(Body::empty())
        .unwrap())
}

/// Drive one open connection until it closes.
///
/// The write half is fed from an unbounded queue registered with the
/// registry, so broadcasts never block on a slow client. The read half
/// only serves to notice disconnection: inbound frames are drained unread
/// until EOF, an I/O error, or a close frame.
async fn serve_connection(io: TokioIo<Upgraded>, registry: Arc<ClientRegistry>) {
    let (mut reader, mut writer) = tokio::io::split(io);
    let (sender, mut outbound) = mpsc::unbounded_channel::<Arc<[u8]>>();
    let id = registry.register(sender);

    let writer_task = tokio::spawn(async move {
        while let Some(bytes) = outbound.recv().await {
            if let Err(err) = writer.write_all(&bytes).await {
                tracing::debug!(error = %err, "Client write failed");
                break;
            }
        }
    });

    loop {
        match frame::drain_frame(&mut reader).await {
            Ok(InboundFrame::Data) => {}
            Ok(InboundFrame::Close) => {
                tracing::debug!("Client sent close frame");
                break;
            }
            // EOF here is just a closed browser tab
            Err(err) => {
                tracing::debug!(error = %err, "Client read ended");
                break;
            }
        }
    }

    // Deregistering drops the only sender, which lets the writer task
    // finish its queue and exit.
    registry.unregister(id);
    let _ = writer_task.await;
}
