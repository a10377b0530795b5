use dashmap::DashMap;
use tokio::sync::mpsc;

use std::sync::atomic::{AtomicU64, Ordering};

use crate::transport::Inbound;

/// Broker-local client identifier.
pub type ClientId = u64;

/// One client's delivery queue sender.
#[derive(Clone)]
pub struct Connection {
    pub tx: mpsc::Sender<Inbound>,
}

/// Client registry: `client_id -> Connection`. Ids start at 1.
pub struct ClientRegistry {
    clients: DashMap<ClientId, Connection>,
    seq: AtomicU64,
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self {
            clients: DashMap::new(),
            seq: AtomicU64::new(1),
        }
    }

    /// Allocate an id and a bounded delivery queue for a new client.
    pub fn register(&self, queue_capacity: usize) -> (ClientId, mpsc::Receiver<Inbound>) {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let id = self.seq.fetch_add(1, Ordering::Relaxed);
        self.clients.insert(id, Connection { tx });
        (id, rx)
    }

    pub fn remove(&self, client: ClientId) -> Option<Connection> {
        self.clients.remove(&client).map(|(_, conn)| conn)
    }

    pub fn get(&self, client: ClientId) -> Option<Connection> {
        self.clients.get(&client).map(|r| r.value().clone())
    }
}
