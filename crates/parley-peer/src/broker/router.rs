use bytes::Bytes;
use tokio::sync::mpsc::error::TrySendError;

use super::{ClientId, ClientRegistry, Subscriptions};
use crate::transport::Inbound;

/// Fan-out engine: registers clients and delivers publishes to subscribers.
///
/// Delivery is lossy: a full client queue drops the delivery instead of
/// blocking the publisher. The publisher receives its own publishes when it
/// is subscribed to the topic.
pub struct TopicRouter {
    pub clients: ClientRegistry,
    pub subscriptions: Subscriptions,
}

impl Default for TopicRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl TopicRouter {
    pub fn new() -> Self {
        Self {
            clients: ClientRegistry::new(),
            subscriptions: Subscriptions::new(),
        }
    }

    pub fn register(&self, queue_capacity: usize) -> (ClientId, tokio::sync::mpsc::Receiver<Inbound>) {
        let (id, rx) = self.clients.register(queue_capacity);
        tracing::debug!(client_id = id, "client registered");
        (id, rx)
    }

    pub fn unregister(&self, client: ClientId) {
        self.subscriptions.cleanup_client(client);
        if self.clients.remove(client).is_some() {
            tracing::debug!(client_id = client, "client unregistered");
        }
    }

    pub fn subscribe(&self, client: ClientId, topic: &str) {
        self.subscriptions.subscribe(topic, client);
        tracing::debug!(client_id = client, %topic, "subscribed");
    }

    pub fn unsubscribe(&self, client: ClientId, topic: &str) {
        self.subscriptions.unsubscribe(topic, client);
        tracing::debug!(client_id = client, %topic, "unsubscribed");
    }

    /// Deliver `payload` to every subscriber of `topic`. Returns the number
    /// of queues the delivery was placed on.
    pub fn publish(&self, topic: &str, payload: Bytes) -> usize {
        let mut delivered = 0;
        for id in self.subscriptions.subscribers(topic) {
            let Some(conn) = self.clients.get(id) else { continue; };
            let msg = Inbound {
                topic: topic.to_string(),
                payload: payload.clone(),
            };
            match conn.tx.try_send(msg) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(client_id = id, %topic, "delivery queue full, dropping");
                }
                Err(TrySendError::Closed(_)) => {}
            }
        }
        delivered
    }
}
