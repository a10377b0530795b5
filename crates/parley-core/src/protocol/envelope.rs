//! Room envelope (JSON).
//!
//! One envelope is one protocol message published on a room topic. The tag
//! field is written as `kind`; decoding also accepts the legacy `type` tag.
//! Extra fields are ignored so newer peers can add fields freely.

use std::collections::BTreeSet;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ParleyError, Result};

/// Envelope kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Join,
    Leave,
    Message,
    UpdateUserList,
    RequestUserList,
}

impl Kind {
    /// Wire name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Join => "join",
            Kind::Leave => "leave",
            Kind::Message => "message",
            Kind::UpdateUserList => "update_user_list",
            Kind::RequestUserList => "request_user_list",
        }
    }

    /// Parse a wire name. Unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "join" => Some(Kind::Join),
            "leave" => Some(Kind::Leave),
            "message" => Some(Kind::Message),
            "update_user_list" => Some(Kind::UpdateUserList),
            "request_user_list" => Some(Kind::RequestUserList),
            _ => None,
        }
    }
}

/// A decoded room envelope.
///
/// `user` is the display name of the publisher. It is never empty but is not
/// guaranteed to be unique within a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    Join { user: String },
    Leave { user: String },
    Message { user: String, message: String },
    UpdateUserList { user: String, users: BTreeSet<String> },
    RequestUserList { user: String },
}

impl Envelope {
    pub fn kind(&self) -> Kind {
        match self {
            Envelope::Join { .. } => Kind::Join,
            Envelope::Leave { .. } => Kind::Leave,
            Envelope::Message { .. } => Kind::Message,
            Envelope::UpdateUserList { .. } => Kind::UpdateUserList,
            Envelope::RequestUserList { .. } => Kind::RequestUserList,
        }
    }

    pub fn user(&self) -> &str {
        match self {
            Envelope::Join { user }
            | Envelope::Leave { user }
            | Envelope::Message { user, .. }
            | Envelope::UpdateUserList { user, .. }
            | Envelope::RequestUserList { user } => user,
        }
    }

    /// Encode to compact JSON bytes. `users` are written in lexicographic order.
    pub fn encode(&self) -> Result<Bytes> {
        let (message, users) = match self {
            Envelope::Message { message, .. } => (Some(message.as_str()), None),
            Envelope::UpdateUserList { users, .. } => (None, Some(users)),
            _ => (None, None),
        };
        let wire = WireOut {
            kind: self.kind().as_str(),
            user: self.user(),
            message,
            users,
        };
        serde_json::to_vec(&wire)
            .map(Bytes::from)
            .map_err(|e| ParleyError::Internal(format!("envelope encode failed: {e}")))
    }

    /// Decode JSON bytes into an envelope.
    ///
    /// Anything that is not a JSON object carrying a known kind, a non-empty
    /// `user`, and the kind's payload field is `MalformedEnvelope`.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(payload)
            .map_err(|e| ParleyError::MalformedEnvelope(format!("invalid json: {e}")))?;
        if !value.is_object() {
            return Err(ParleyError::MalformedEnvelope("envelope must be an object".into()));
        }
        let wire: WireIn = serde_json::from_value(value)
            .map_err(|e| ParleyError::MalformedEnvelope(format!("invalid envelope: {e}")))?;

        let tag = wire
            .kind
            .or(wire.legacy_type)
            .ok_or_else(|| ParleyError::MalformedEnvelope("missing kind".into()))?;
        let kind = Kind::parse(&tag)
            .ok_or_else(|| ParleyError::MalformedEnvelope(format!("unknown kind: {tag}")))?;
        if wire.user.is_empty() {
            return Err(ParleyError::MalformedEnvelope("user must not be empty".into()));
        }
        let user = wire.user;

        match kind {
            Kind::Join => Ok(Envelope::Join { user }),
            Kind::Leave => Ok(Envelope::Leave { user }),
            Kind::RequestUserList => Ok(Envelope::RequestUserList { user }),
            Kind::Message => {
                let message = wire.message.ok_or_else(|| {
                    ParleyError::MalformedEnvelope("message requires `message`".into())
                })?;
                Ok(Envelope::Message { user, message })
            }
            Kind::UpdateUserList => {
                let users = wire.users.ok_or_else(|| {
                    ParleyError::MalformedEnvelope("update_user_list requires `users`".into())
                })?;
                Ok(Envelope::UpdateUserList {
                    user,
                    users: users.into_iter().collect(),
                })
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireIn {
    #[serde(default)]
    kind: Option<String>,
    /// Tag used by the earliest peers. `kind` wins when both are present.
    #[serde(default, rename = "type")]
    legacy_type: Option<String>,
    user: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    users: Option<Vec<String>>,
}

#[derive(Serialize)]
struct WireOut<'a> {
    kind: &'static str,
    user: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    users: Option<&'a BTreeSet<String>>,
}
