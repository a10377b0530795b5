//! Length-prefixed frame I/O over byte streams.
//!
//! Shared by the TCP client transport and the broker server. Each frame on
//! the stream is a `u32` LE body length followed by the body.

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use parley_core::{
    error::{ErrorCode, ParleyError, Result},
    protocol::frame::{decode_frame, encode_frame, Frame, LEN_PREFIX_BYTES},
};

/// Read one frame. `Ok(None)` on a clean EOF at a frame boundary.
///
/// I/O failures and oversized frames are `Transport` errors (the stream is
/// unusable afterwards); a body that fails to decode is `MalformedEnvelope`
/// or `UnsupportedVersion` and the stream stays aligned.
pub async fn read_frame<R>(r: &mut R, max_frame_bytes: usize) -> Result<Option<Frame>>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; LEN_PREFIX_BYTES];
    match r.read_exact(&mut prefix).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(ParleyError::Transport(format!("read failed: {e}"))),
    }
    let len = u32::from_le_bytes(prefix) as usize;
    if len > max_frame_bytes {
        return Err(ParleyError::Transport(format!(
            "frame of {len} bytes exceeds limit of {max_frame_bytes}"
        )));
    }

    let mut body = vec![0u8; len];
    r.read_exact(&mut body)
        .await
        .map_err(|e| ParleyError::Transport(format!("read failed: {e}")))?;

    decode_frame(Bytes::from(body)).map(Some)
}

/// Write an already encoded frame body with its length prefix.
pub async fn write_body<W>(w: &mut W, body: &Bytes) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let len = u32::try_from(body.len())
        .map_err(|_| ParleyError::Transport("frame larger than u32::MAX".into()))?;
    w.write_all(&len.to_le_bytes())
        .await
        .map_err(|e| ParleyError::Transport(format!("write failed: {e}")))?;
    w.write_all(body)
        .await
        .map_err(|e| ParleyError::Transport(format!("write failed: {e}")))?;
    Ok(())
}

/// Encode and write one frame.
pub async fn write_frame<W>(w: &mut W, frame: &Frame) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let body = encode_frame(frame)?;
    write_body(w, &body).await
}

/// Whether a `read_frame` error leaves the stream usable.
pub fn is_recoverable(e: &ParleyError) -> bool {
    matches!(e.code(), ErrorCode::MalformedEnvelope | ErrorCode::UnsupportedVersion)
}
