use serde::Deserialize;
use parley_core::error::{ParleyError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParleyConfig {
    pub version: u32,

    #[serde(default)]
    pub broker: BrokerSection,

    #[serde(default)]
    pub client: ClientSection,
}

impl ParleyConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ParleyError::UnsupportedVersion);
        }

        self.broker.validate()?;
        self.client.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BrokerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Per-client outbound queue; deliveries beyond it are dropped.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

impl Default for BrokerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            queue_capacity: default_queue_capacity(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

impl BrokerSection {
    pub fn validate(&self) -> Result<()> {
        if self.listen.trim().is_empty() {
            return Err(ParleyError::Validation("broker.listen must not be empty".into()));
        }
        if !(16..=65536).contains(&self.queue_capacity) {
            return Err(ParleyError::Validation(
                "broker.queue_capacity must be between 16 and 65536".into(),
            ));
        }
        if !(256..=16 * 1024 * 1024).contains(&self.max_frame_bytes) {
            return Err(ParleyError::Validation(
                "broker.max_frame_bytes must be between 256 and 16777216".into(),
            ));
        }
        Ok(())
    }
}

/// Which transport `parley-chat` connects with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Any MQTT 3.1.1 broker.
    #[default]
    Mqtt,
    /// `parley-broker` framing over TCP.
    Tcp,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientSection {
    #[serde(default)]
    pub transport: TransportKind,

    /// Broker `host:port` handed to the transport.
    #[serde(default = "default_broker_addr")]
    pub broker: String,

    /// MQTT keep-alive interval; ignored by the tcp transport.
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,

    /// Default display name; can be changed between rooms.
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default = "default_recent_rooms")]
    pub recent_rooms: usize,
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            transport: TransportKind::default(),
            broker: default_broker_addr(),
            keep_alive_secs: default_keep_alive_secs(),
            username: None,
            recent_rooms: default_recent_rooms(),
        }
    }
}

impl ClientSection {
    pub fn validate(&self) -> Result<()> {
        if self.broker.trim().is_empty() {
            return Err(ParleyError::Validation("client.broker must not be empty".into()));
        }
        if !(5..=3600).contains(&self.keep_alive_secs) {
            return Err(ParleyError::Validation(
                "client.keep_alive_secs must be between 5 and 3600".into(),
            ));
        }
        if let Some(name) = &self.username {
            if name.trim().is_empty() {
                return Err(ParleyError::Validation(
                    "client.username must not be blank when set".into(),
                ));
            }
        }
        if !(1..=64).contains(&self.recent_rooms) {
            return Err(ParleyError::Validation(
                "client.recent_rooms must be between 1 and 64".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "127.0.0.1:1884".into()
}
fn default_queue_capacity() -> usize {
    1024
}
fn default_max_frame_bytes() -> usize {
    64 * 1024
}
fn default_broker_addr() -> String {
    "127.0.0.1:1883".into()
}
fn default_keep_alive_secs() -> u64 {
    60
}
fn default_recent_rooms() -> usize {
    5
}
