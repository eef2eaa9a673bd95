//! Live reload system.
//!
//! A hand-rolled WebSocket channel (handshake, frame codec, client
//! registry) plus a polling file watcher; together they push a `"reload"`
//! text frame to every connected browser when a watched file changes.
//!
//! Protocol scope is intentionally narrow: single unmasked text frames of
//! at most 125 bytes outbound, and a drain-only inbound path that never
//! inspects payloads. Fragmented frames and control-frame semantics beyond
//! noticing a close are not supported.

mod frame;
mod handshake;
mod registry;
mod watcher;
mod websocket;

pub(crate) use handshake::is_websocket_upgrade;
pub(crate) use registry::ClientRegistry;
pub(crate) use watcher::{FileWatcher, WatcherConfig};
pub(crate) use websocket::handle_upgrade;
