//! In-process broker and transport.
//!
//! Every `MemoryTransport` handed out by one `MemoryBroker` shares the same
//! `TopicRouter`. Publishing enqueues synchronously onto every subscriber's
//! delivery queue (the publisher included), so a test can drain receivers
//! deterministically right after a call returns.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use parley_core::error::Result;

use super::{Inbound, Transport};
use crate::broker::{ClientId, TopicRouter};

/// Default per-client delivery queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct MemoryBroker {
    router: Arc<TopicRouter>,
    queue_capacity: usize,
}

impl Default for MemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::with_queue_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_queue_capacity(queue_capacity: usize) -> Self {
        Self {
            router: Arc::new(TopicRouter::new()),
            queue_capacity,
        }
    }

    /// Attach a new client. Deliveries for its subscriptions arrive on the receiver.
    pub fn connect(&self) -> (MemoryTransport, mpsc::Receiver<Inbound>) {
        let (id, rx) = self.router.register(self.queue_capacity);
        let transport = MemoryTransport {
            id,
            router: Arc::clone(&self.router),
        };
        (transport, rx)
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.router.subscriptions.subscribers(topic).len()
    }
}

/// Client handle on a `MemoryBroker`. Dropping it detaches the client.
pub struct MemoryTransport {
    id: ClientId,
    router: Arc<TopicRouter>,
}

impl MemoryTransport {
    pub fn client_id(&self) -> ClientId {
        self.id
    }
}

impl Drop for MemoryTransport {
    fn drop(&mut self) {
        self.router.unregister(self.id);
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn subscribe(&self, topic: &str) -> Result<()> {
        self.router.subscribe(self.id, topic);
        Ok(())
    }

    async fn unsubscribe(&self, topic: &str) -> Result<()> {
        self.router.unsubscribe(self.id, topic);
        Ok(())
    }

    async fn publish(&self, topic: &str, payload: Bytes) -> Result<()> {
        self.router.publish(topic, payload);
        Ok(())
    }
}
