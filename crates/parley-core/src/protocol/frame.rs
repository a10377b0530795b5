//! Broker frame codec (panic-free).
//!
//! On the stream every frame is preceded by a `u32` little-endian body length.
//! Body layout: `v: u8`, `op: u8`, `topic_len: u16 LE`, `topic` (UTF-8),
//! then the payload (remaining bytes).
//!
//! Parsing rules:
//! - Never index (`buf[0]`), always use `Buf` and `remaining()` checks.
//! - Never `unwrap()` / `expect()` / `panic!()` in production paths.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{ParleyError, Result};

/// Current frame version.
pub const FRAME_VERSION: u8 = 1;

/// Size of the stream length prefix.
pub const LEN_PREFIX_BYTES: usize = 4;

/// Minimum body header: v, op, topic_len.
const HEADER_BYTES: usize = 4;

/// Frame operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Client -> broker: start receiving `topic`.
    Subscribe = 1,
    /// Client -> broker: stop receiving `topic`.
    Unsubscribe = 2,
    /// Client -> broker: fan `payload` out to every subscriber of `topic`.
    Publish = 3,
    /// Broker -> client: one delivery on a subscribed `topic`.
    Message = 4,
}

impl Op {
    fn from_u8(b: u8) -> Option<Self> {
        match b {
            1 => Some(Op::Subscribe),
            2 => Some(Op::Unsubscribe),
            3 => Some(Op::Publish),
            4 => Some(Op::Message),
            _ => None,
        }
    }

    fn carries_payload(self) -> bool {
        matches!(self, Op::Publish | Op::Message)
    }
}

/// Parsed frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub op: Op,
    pub topic: String,
    /// Opaque payload (zero-copy). Empty for subscribe/unsubscribe.
    pub payload: Bytes,
}

impl Frame {
    pub fn subscribe(topic: impl Into<String>) -> Self {
        Self { op: Op::Subscribe, topic: topic.into(), payload: Bytes::new() }
    }

    pub fn unsubscribe(topic: impl Into<String>) -> Self {
        Self { op: Op::Unsubscribe, topic: topic.into(), payload: Bytes::new() }
    }

    pub fn publish(topic: impl Into<String>, payload: Bytes) -> Self {
        Self { op: Op::Publish, topic: topic.into(), payload }
    }

    pub fn message(topic: impl Into<String>, payload: Bytes) -> Self {
        Self { op: Op::Message, topic: topic.into(), payload }
    }
}

/// Encode a frame body (without the stream length prefix).
pub fn encode_frame(frame: &Frame) -> Result<Bytes> {
    if frame.topic.is_empty() {
        return Err(ParleyError::Validation("topic must not be empty".into()));
    }
    let topic_len = u16::try_from(frame.topic.len())
        .map_err(|_| ParleyError::Validation("topic longer than 65535 bytes".into()))?;
    if !frame.op.carries_payload() && !frame.payload.is_empty() {
        return Err(ParleyError::Validation(format!("{:?} frame must not carry a payload", frame.op)));
    }

    let mut buf = BytesMut::with_capacity(HEADER_BYTES + frame.topic.len() + frame.payload.len());
    buf.put_u8(FRAME_VERSION);
    buf.put_u8(frame.op as u8);
    buf.put_u16_le(topic_len);
    buf.put_slice(frame.topic.as_bytes());
    buf.put_slice(&frame.payload);
    Ok(buf.freeze())
}

/// Decode a frame body (without the stream length prefix).
pub fn decode_frame(mut buf: Bytes) -> Result<Frame> {
    if buf.remaining() < HEADER_BYTES {
        return Err(ParleyError::MalformedEnvelope("frame too short".into()));
    }

    let v = buf.get_u8();
    if v != FRAME_VERSION {
        return Err(ParleyError::UnsupportedVersion);
    }

    let op_byte = buf.get_u8();
    let op = Op::from_u8(op_byte)
        .ok_or_else(|| ParleyError::MalformedEnvelope(format!("unknown op: {op_byte}")))?;

    let topic_len = buf.get_u16_le() as usize;
    if topic_len == 0 {
        return Err(ParleyError::MalformedEnvelope("empty topic".into()));
    }
    if buf.remaining() < topic_len {
        return Err(ParleyError::MalformedEnvelope("topic truncated".into()));
    }
    let topic_raw = buf.copy_to_bytes(topic_len);
    let topic = std::str::from_utf8(&topic_raw)
        .map_err(|e| ParleyError::MalformedEnvelope(format!("topic not utf-8: {e}")))?
        .to_owned();

    // Remaining bytes are payload.
    let payload = buf.copy_to_bytes(buf.remaining());
    if !op.carries_payload() && !payload.is_empty() {
        return Err(ParleyError::MalformedEnvelope(format!("{op:?} frame carries a payload")));
    }

    Ok(Frame { op, topic, payload })
}
