use std::sync::Arc;

use parley_core::error::{ParleyError, Result};
use parley_core::protocol::Envelope;

use super::{Membership, Session};

/// Presence & room controller: the local participant's membership transitions.
///
/// Every operation holds the session lock for its whole duration, so inbound
/// envelopes are never folded against a half-applied transition. Transport
/// failures are returned as-is without rollback: a failed `join` may leave
/// the participant unsubscribed from the old room and not yet in the new one.
#[derive(Clone)]
pub struct RoomController {
    session: Arc<Session>,
}

impl RoomController {
    pub(crate) fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Join `room` as `username`, leaving the current room first if it differs.
    ///
    /// Our own name only shows up in the roster once our `join` comes back
    /// from the transport.
    pub async fn join(&self, username: &str, room: &str) -> Result<()> {
        let username = username.trim();
        let room = room.trim();
        if username.is_empty() {
            return Err(ParleyError::Validation("username must not be empty".into()));
        }
        if room.is_empty() {
            return Err(ParleyError::Validation("room must not be empty".into()));
        }

        let mut st = self.session.state.lock().await;

        if let Some(old) = st.active_room().map(str::to_owned) {
            if old != room {
                let old_user = st.username.clone().unwrap_or_else(|| username.to_owned());
                // Best effort: peers converge through later updates if this is lost.
                if let Err(e) = self.publish(&old, &Envelope::Leave { user: old_user }).await {
                    tracing::warn!(room = %old, error = %e, "leave publish failed");
                }
                self.session.transport.unsubscribe(&old).await?;
                st.membership = Membership::Inactive;
                tracing::info!(room = %old, "left room");
            }
        }

        self.session.transport.subscribe(room).await?;
        st.username = Some(username.to_owned());
        st.membership = Membership::Joining { room: room.to_owned() };
        st.roster.clear(room);

        self.session.view.room_switched(room);
        self.session.view.roster_changed(room, &[]);

        self.publish(room, &Envelope::Join { user: username.to_owned() }).await?;
        self.publish(room, &Envelope::RequestUserList { user: username.to_owned() })
            .await?;

        self.session.recent.record_room_used(room);
        tracing::info!(%room, user = %username, "joining room");
        Ok(())
    }

    /// Leave the active room. No-op when not in a room.
    pub async fn leave(&self) -> Result<()> {
        let mut st = self.session.state.lock().await;
        let Some(room) = st.active_room().map(str::to_owned) else {
            return Ok(());
        };
        let user = st.username.clone().unwrap_or_default();

        self.publish(&room, &Envelope::Leave { user }).await?;
        self.session.transport.unsubscribe(&room).await?;
        st.membership = Membership::Inactive;

        tracing::info!(%room, "left room");
        Ok(())
    }

    /// Send a chat message to the active room.
    ///
    /// Silently ignored when not in a room or when `body` is empty.
    pub async fn send_message(&self, body: &str) -> Result<()> {
        if body.is_empty() {
            return Ok(());
        }
        let st = self.session.state.lock().await;
        let (Some(room), Some(user)) = (st.active_room(), st.username.as_deref()) else {
            return Ok(());
        };

        let env = Envelope::Message {
            user: user.to_owned(),
            message: body.to_owned(),
        };
        self.publish(room, &env).await
    }

    async fn publish(&self, room: &str, env: &Envelope) -> Result<()> {
        let payload = env.encode()?;
        self.session.transport.publish(room, payload).await
    }
}
