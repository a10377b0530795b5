//! Transport collaborators (topic-based publish/subscribe).
//!
//! The chat core only sees the `Transport` trait plus a stream of `Inbound`
//! deliveries. Implementations: an MQTT client for standard brokers, an
//! in-process broker for tests and embedding, and a TCP client for
//! `parley-broker`.

use async_trait::async_trait;
use bytes::Bytes;

use parley_core::error::Result;

pub mod codec;
pub mod memory;
pub mod mqtt;
pub mod tcp;

pub use memory::{MemoryBroker, MemoryTransport};
pub use mqtt::MqttTransport;
pub use tcp::TcpTransport;

/// One delivery on a subscribed topic.
#[derive(Debug, Clone)]
pub struct Inbound {
    pub topic: String,
    pub payload: Bytes,
}

/// Publish/subscribe primitives consumed by the chat core.
///
/// Calls are fire-and-forget: `Ok` means the request was handed to the
/// transport, not that any peer received it.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn subscribe(&self, topic: &str) -> Result<()>;
    async fn unsubscribe(&self, topic: &str) -> Result<()>;
    async fn publish(&self, topic: &str, payload: Bytes) -> Result<()>;
}
