use std::collections::HashSet;

use dashmap::DashMap;

use super::ClientId;

/// Subscription index kept in both directions: topic -> clients for fan-out,
/// client -> topics for cleanup on disconnect.
///
/// An entry is dropped only through `remove_if` while its shard is locked, so
/// a concurrent `subscribe` either lands before the emptiness check or
/// recreates the entry afterwards.
#[derive(Default)]
pub struct Subscriptions {
    by_topic: DashMap<String, HashSet<ClientId>>,
    by_client: DashMap<ClientId, HashSet<String>>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, topic: &str, client: ClientId) {
        self.by_topic.entry(topic.to_string()).or_default().insert(client);
        self.by_client.entry(client).or_default().insert(topic.to_string());
    }

    pub fn unsubscribe(&self, topic: &str, client: ClientId) {
        self.detach(topic, client);
        if let Some(mut topics) = self.by_client.get_mut(&client) {
            topics.remove(topic);
        }
        self.by_client.remove_if(&client, |_, topics| topics.is_empty());
    }

    /// Current subscribers of `topic`, in no particular order.
    pub fn subscribers(&self, topic: &str) -> Vec<ClientId> {
        self.by_topic
            .get(topic)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn topics_of(&self, client: ClientId) -> Vec<String> {
        self.by_client
            .get(&client)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Forget every subscription of a disconnected client.
    pub fn cleanup_client(&self, client: ClientId) {
        let Some((_, topics)) = self.by_client.remove(&client) else {
            return;
        };
        for topic in &topics {
            self.detach(topic, client);
        }
    }

    fn detach(&self, topic: &str, client: ClientId) {
        if let Some(mut clients) = self.by_topic.get_mut(topic) {
            clients.remove(&client);
        }
        self.by_topic.remove_if(topic, |_, clients| clients.is_empty());
    }
}
