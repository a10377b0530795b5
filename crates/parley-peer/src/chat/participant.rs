use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use super::{ChatState, ChatView, Membership, RecentRooms, Reconciler, RoomController, Session};
use crate::transport::{Inbound, Transport};

/// One chat participant: a controller and a reconciler over shared state.
#[derive(Clone)]
pub struct Participant {
    session: Arc<Session>,
}

impl Participant {
    pub fn new(
        transport: Arc<dyn Transport>,
        view: Arc<dyn ChatView>,
        recent: Arc<dyn RecentRooms>,
    ) -> Self {
        Self {
            session: Arc::new(Session {
                state: Mutex::new(ChatState::default()),
                transport,
                view,
                recent,
            }),
        }
    }

    pub fn controller(&self) -> RoomController {
        RoomController::new(Arc::clone(&self.session))
    }

    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(Arc::clone(&self.session))
    }

    /// Run the reconciler on `inbound` in a background task.
    pub fn spawn_inbound(&self, inbound: mpsc::Receiver<Inbound>) -> JoinHandle<()> {
        tokio::spawn(self.reconciler().run(inbound))
    }

    /// Sorted roster snapshot for `room`.
    pub async fn roster(&self, room: &str) -> Vec<String> {
        self.session.state.lock().await.roster.sorted(room)
    }

    pub async fn membership(&self) -> Membership {
        self.session.state.lock().await.membership.clone()
    }

    pub async fn active_room(&self) -> Option<String> {
        self.session.state.lock().await.active_room().map(str::to_owned)
    }

    pub async fn username(&self) -> Option<String> {
        self.session.state.lock().await.username.clone()
    }

    pub fn recent_rooms(&self) -> Vec<String> {
        self.session.recent.rooms()
    }
}
