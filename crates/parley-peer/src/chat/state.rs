use super::Roster;

/// The local participant's own membership (not the roster).
///
/// `Joining` and `Active` handle inbound envelopes identically; `Active`
/// only records that our own `join` has come back from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Membership {
    Inactive,
    Joining { room: String },
    Active { room: String },
}

impl Membership {
    pub fn room(&self) -> Option<&str> {
        match self {
            Membership::Inactive => None,
            Membership::Joining { room } | Membership::Active { room } => Some(room),
        }
    }
}

/// Per-participant session state guarded by the session mutex.
#[derive(Debug)]
pub struct ChatState {
    /// Username used for the current (or most recent) room.
    pub username: Option<String>,
    pub membership: Membership,
    pub roster: Roster,
}

impl Default for ChatState {
    fn default() -> Self {
        Self {
            username: None,
            membership: Membership::Inactive,
            roster: Roster::new(),
        }
    }
}

impl ChatState {
    pub fn active_room(&self) -> Option<&str> {
        self.membership.room()
    }

    pub fn is_self(&self, user: &str) -> bool {
        self.username.as_deref() == Some(user)
    }

    /// Whether our own username is in the roster for `room`.
    pub fn is_member(&self, room: &str) -> bool {
        match &self.username {
            Some(me) => self.roster.contains(room, me),
            None => false,
        }
    }
}
