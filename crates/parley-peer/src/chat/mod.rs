//! Presence-aware room chat over a pub/sub transport.
//!
//! There is no server: every participant runs the same `RoomController`
//! (membership transitions, outbound envelopes) and `Reconciler` (folds
//! inbound envelopes into the roster). Both share one `ChatState` behind a
//! single async mutex, which is the only serialization point between user
//! actions and transport callbacks.

mod controller;
mod participant;
mod reconciler;
pub mod recent;
mod roster;
mod state;
pub mod view;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::transport::Transport;

pub use controller::RoomController;
pub use participant::Participant;
pub use reconciler::Reconciler;
pub use recent::{MruRooms, RecentRooms};
pub use roster::Roster;
pub use state::{ChatState, Membership};
pub use view::{ChannelView, ChatEvent, ChatView};

/// State and collaborators shared by the controller and the reconciler.
pub(crate) struct Session {
    pub(crate) state: Mutex<ChatState>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) view: Arc<dyn ChatView>,
    pub(crate) recent: Arc<dyn RecentRooms>,
}
