//! Presentation hooks.
//!
//! The core never renders anything; it reports what changed through
//! `ChatView`. `ChannelView` turns the callbacks into `ChatEvent`s on a
//! channel for front ends that prefer to poll.

use tokio::sync::mpsc;

pub trait ChatView: Send + Sync {
    /// One line to append to the transcript.
    fn chat_line(&self, line: &str);
    /// Roster for `room` after a mutation, lexicographically sorted.
    fn roster_changed(&self, room: &str, users: &[String]);
    /// The active room changed; the transcript should be cleared.
    fn room_switched(&self, room: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    Line(String),
    Roster { room: String, users: Vec<String> },
    RoomSwitched(String),
}

pub struct ChannelView {
    tx: mpsc::UnboundedSender<ChatEvent>,
}

impl ChannelView {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ChatEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn emit(&self, ev: ChatEvent) {
        // Receiver gone means nobody is watching.
        let _ = self.tx.send(ev);
    }
}

impl ChatView for ChannelView {
    fn chat_line(&self, line: &str) {
        self.emit(ChatEvent::Line(line.to_string()));
    }

    fn roster_changed(&self, room: &str, users: &[String]) {
        self.emit(ChatEvent::Roster {
            room: room.to_string(),
            users: users.to_vec(),
        });
    }

    fn room_switched(&self, room: &str) {
        self.emit(ChatEvent::RoomSwitched(room.to_string()));
    }
}
