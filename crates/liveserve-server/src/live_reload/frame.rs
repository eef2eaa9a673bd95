//! WebSocket frame encoding and inbound draining.
//!
//! The server sends exactly one kind of frame (a short unmasked text frame)
//! and never interprets what clients send back, so this is deliberately not
//! a general codec: outbound payloads are capped at 125 bytes and inbound
//! frames are consumed by length and discarded without allocation.
//! Fragmented frames are out of scope.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt};

/// FIN bit plus text opcode: the first byte of every frame this server sends.
const FIN_TEXT: u8 = 0x81;

/// Close opcode (low nibble of byte 0).
const OPCODE_CLOSE: u8 = 0x8;

/// Largest payload expressible without extended length bytes.
const MAX_PAYLOAD: usize = 125;

/// Payload sent to clients when a watched file changes.
pub(crate) const RELOAD_PAYLOAD: &str = "reload";

/// Frame encoding failure.
#[derive(Debug, thiserror::Error)]
pub(crate) enum FrameError {
    /// Payload would need extended length encoding, which outbound frames
    /// do not support.
    #[error("payload of {0} bytes exceeds the {MAX_PAYLOAD}-byte single-frame limit")]
    PayloadTooLarge(usize),
}

/// What an inbound frame turned out to be once drained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum InboundFrame {
    /// Data or non-close control frame; content discarded.
    Data,
    /// Close frame; the peer is going away.
    Close,
}

/// Encode a text payload as a single unmasked FIN frame.
///
/// Two header bytes followed by the raw payload. Payloads over 125 bytes
/// are rejected; this server never needs them.
pub(crate) fn encode_text(payload: &str) -> Result<Vec<u8>, FrameError> {
    let bytes = payload.as_bytes();
    if bytes.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge(bytes.len()));
    }

    let mut frame = Vec::with_capacity(2 + bytes.len());
    frame.push(FIN_TEXT);
    frame.push(bytes.len() as u8);
    frame.extend_from_slice(bytes);
    Ok(frame)
}

/// The pre-encoded reload frame shared by every broadcast.
pub(crate) fn reload_frame() -> Arc<[u8]> {
    encode_text(RELOAD_PAYLOAD)
        .expect("reload payload fits in a single frame")
        .into()
}

/// Read one inbound frame and discard its payload.
///
/// Consumes the 2-byte header, any extended length bytes (2 when the 7-bit
/// length is 126, 8 when it is 127), the 4 mask bytes when the mask bit is
/// set (client frames always set it), and exactly `length` payload bytes,
/// leaving the reader aligned on the next frame header. The payload is
/// never unmasked or inspected; control frames follow the same length
/// rules, and only a close frame is surfaced to the caller.
pub(crate) async fn drain_frame<R>(reader: &mut R) -> std::io::Result<InboundFrame>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0_u8; 2];
    reader.read_exact(&mut header).await?;

    let opcode = header[0] & 0x0f;
    let masked = header[1] & 0x80 != 0;

    let mut len = u64::from(header[1] & 0x7f);
    if len == 126 {
        let mut ext = [0_u8; 2];
        reader.read_exact(&mut ext).await?;
        len = u64::from(u16::from_be_bytes(ext));
    } else if len == 127 {
        let mut ext = [0_u8; 8];
        reader.read_exact(&mut ext).await?;
        len = u64::from_be_bytes(ext);
    }

    // The masking key is consumed but unused: the payload is discarded
    // unread, so there is nothing to unmask.
    if masked {
        let mut mask = [0_u8; 4];
        reader.read_exact(&mut mask).await?;
    }

    let discarded = tokio::io::copy(&mut (&mut *reader).take(len), &mut tokio::io::sink()).await?;
    if discarded < len {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "frame payload truncated",
        ));
    }

    if opcode == OPCODE_CLOSE {
        Ok(InboundFrame::Close)
    } else {
        Ok(InboundFrame::Data)
    }
}
