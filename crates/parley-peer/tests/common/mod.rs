//! Shared participant harness for integration tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use parley_core::error::{ParleyError, Result};
use parley_core::protocol::Envelope;
use parley_peer::chat::{ChannelView, ChatEvent, MruRooms, Participant};
use parley_peer::transport::{Inbound, MemoryBroker, Transport};

/// A participant attached to an in-process broker, with its inbound queue
/// and view events held by the test.
pub struct Peer {
    pub participant: Participant,
    pub inbound: mpsc::Receiver<Inbound>,
    pub events: mpsc::UnboundedReceiver<ChatEvent>,
}

pub fn peer(broker: &MemoryBroker) -> Peer {
    let (transport, inbound) = broker.connect();
    let (view, events) = ChannelView::new();
    let participant = Participant::new(
        Arc::new(transport),
        Arc::new(view),
        Arc::new(MruRooms::default()),
    );
    Peer {
        participant,
        inbound,
        events,
    }
}

impl Peer {
    pub async fn drain(&mut self) -> usize {
        self.participant.reconciler().drain(&mut self.inbound).await
    }

    /// Every view event since the last call.
    pub fn take_events(&mut self) -> Vec<ChatEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = self.events.try_recv() {
            out.push(ev);
        }
        out
    }

    /// Chat lines since the last call (other events are discarded).
    pub fn take_lines(&mut self) -> Vec<String> {
        self.take_events()
            .into_iter()
            .filter_map(|ev| match ev {
                ChatEvent::Line(l) => Some(l),
                _ => None,
            })
            .collect()
    }
}

/// Drain every peer until no deliveries remain anywhere.
pub async fn settle(peers: &mut [&mut Peer]) {
    loop {
        let mut n = 0;
        for p in peers.iter_mut() {
            n += p.drain().await;
        }
        if n == 0 {
            break;
        }
    }
}

pub fn users(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Subscribe(String),
    Unsubscribe(String),
    Publish(String, Envelope),
}

/// Transport double that records every call and can be told to fail.
#[derive(Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<Call>>,
    pub fail_subscribe: AtomicBool,
    pub fail_publish: AtomicBool,
}

impl RecordingTransport {
    pub fn take(&self) -> Vec<Call> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn subscribe(&self, topic: &str) -> Result<()> {
        if self.fail_subscribe.load(Ordering::SeqCst) {
            return Err(ParleyError::Transport("subscribe refused".into()));
        }
        self.record(Call::Subscribe(topic.to_string()));
        Ok(())
    }

    async fn unsubscribe(&self, topic: &str) -> Result<()> {
        self.record(Call::Unsubscribe(topic.to_string()));
        Ok(())
    }

    async fn publish(&self, topic: &str, payload: Bytes) -> Result<()> {
        if self.fail_publish.load(Ordering::SeqCst) {
            return Err(ParleyError::Transport("publish refused".into()));
        }
        let env = Envelope::decode(&payload).expect("core published a malformed envelope");
        self.record(Call::Publish(topic.to_string(), env));
        Ok(())
    }
}

/// A participant over a `RecordingTransport`.
pub struct Recorded {
    pub participant: Participant,
    pub transport: Arc<RecordingTransport>,
    pub events: mpsc::UnboundedReceiver<ChatEvent>,
}

pub fn recorded() -> Recorded {
    let transport = Arc::new(RecordingTransport::default());
    let (view, events) = ChannelView::new();
    let participant = Participant::new(
        transport.clone(),
        Arc::new(view),
        Arc::new(MruRooms::default()),
    );
    Recorded {
        participant,
        transport,
        events,
    }
}

impl Recorded {
    pub fn take_events(&mut self) -> Vec<ChatEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = self.events.try_recv() {
            out.push(ev);
        }
        out
    }

    /// Fold an envelope as if the transport delivered it on `topic`.
    pub async fn deliver(&self, topic: &str, env: &Envelope) {
        let payload = env.encode().unwrap();
        self.participant.reconciler().handle(topic, &payload).await;
    }
}

pub fn join(user: &str) -> Envelope {
    Envelope::Join { user: user.into() }
}

pub fn leave(user: &str) -> Envelope {
    Envelope::Leave { user: user.into() }
}

pub fn request(user: &str) -> Envelope {
    Envelope::RequestUserList { user: user.into() }
}

pub fn update(from: &str, names: &[&str]) -> Envelope {
    Envelope::UpdateUserList {
        user: from.into(),
        users: names.iter().map(|n| n.to_string()).collect(),
    }
}
