use std::sync::Arc;

use tokio::sync::mpsc;

use parley_core::protocol::Envelope;

use super::{ChatState, Membership, Session};
use crate::transport::Inbound;

/// Roster reconciler: folds inbound envelopes for the active room.
///
/// | kind                | roster          | observable                        |
/// |---------------------|-----------------|-----------------------------------|
/// | `join`              | add user        | line; echo roster if member       |
/// | `leave`             | remove user     | line; echo roster if member       |
/// | `message`           | -               | `user: body` line                 |
/// | `update_user_list`  | replace         | roster refresh                    |
/// | `request_user_list` | -               | echo roster if member             |
///
/// Our own `join` and `request_user_list` never trigger an echo: a joiner's
/// roster is not yet converged, and publishing it would overwrite everyone
/// else's view with just the joiner.
///
/// Malformed payloads and envelopes for any other topic are dropped without
/// an error.
#[derive(Clone)]
pub struct Reconciler {
    session: Arc<Session>,
}

impl Reconciler {
    pub(crate) fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Fold one delivery.
    pub async fn handle(&self, topic: &str, payload: &[u8]) {
        let env = match Envelope::decode(payload) {
            Ok(env) => env,
            Err(e) => {
                tracing::debug!(%topic, error = %e, "discarding malformed envelope");
                return;
            }
        };

        let mut st = self.session.state.lock().await;
        if st.active_room() != Some(topic) {
            tracing::debug!(%topic, kind = env.kind().as_str(), "discarding envelope for inactive topic");
            return;
        }
        tracing::debug!(%topic, kind = env.kind().as_str(), user = %env.user(), "folding envelope");
        self.fold(&mut st, topic, env).await;
    }

    /// Consume deliveries until the transport closes.
    pub async fn run(self, mut inbound: mpsc::Receiver<Inbound>) {
        while let Some(inb) = inbound.recv().await {
            self.handle(&inb.topic, &inb.payload).await;
        }
        tracing::debug!("inbound stream closed");
    }

    /// Fold everything currently queued without waiting. Returns the count.
    pub async fn drain(&self, inbound: &mut mpsc::Receiver<Inbound>) -> usize {
        let mut n = 0;
        while let Ok(inb) = inbound.try_recv() {
            self.handle(&inb.topic, &inb.payload).await;
            n += 1;
        }
        n
    }

    async fn fold(&self, st: &mut ChatState, topic: &str, env: Envelope) {
        let view = &self.session.view;
        match env {
            Envelope::Join { user } => {
                st.roster.add(topic, &user);
                view.chat_line(&format!("{user} has joined the chat."));
                view.roster_changed(topic, &st.roster.sorted(topic));

                if st.is_self(&user) {
                    if let Membership::Joining { room } = &st.membership {
                        let room = room.clone();
                        tracing::info!(%room, "own join observed");
                        st.membership = Membership::Active { room };
                    }
                } else if st.is_member(topic) {
                    self.echo_roster(st, topic).await;
                }
            }
            Envelope::Leave { user } => {
                if st.roster.remove(topic, &user) {
                    view.roster_changed(topic, &st.roster.sorted(topic));
                }
                view.chat_line(&format!("{user} has left the chat."));
                if st.is_member(topic) {
                    self.echo_roster(st, topic).await;
                }
            }
            Envelope::Message { user, message } => {
                view.chat_line(&format!("{user}: {message}"));
            }
            Envelope::UpdateUserList { users, .. } => {
                st.roster.replace(topic, users);
                view.roster_changed(topic, &st.roster.sorted(topic));
            }
            Envelope::RequestUserList { user } => {
                if !st.is_self(&user) && st.is_member(topic) {
                    self.echo_roster(st, topic).await;
                }
            }
        }
    }

    /// Publish our full roster for `topic`. Failures are logged, never surfaced.
    async fn echo_roster(&self, st: &ChatState, topic: &str) {
        let Some(me) = st.username.clone() else { return; };
        let users = st.roster.users(topic).cloned().unwrap_or_default();
        let env = Envelope::UpdateUserList { user: me, users };

        let res = match env.encode() {
            Ok(payload) => self.session.transport.publish(topic, payload).await,
            Err(e) => Err(e),
        };
        if let Err(e) = res {
            tracing::warn!(%topic, error = %e, "roster echo failed");
        }
    }
}
