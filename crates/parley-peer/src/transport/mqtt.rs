//! MQTT client transport.
//!
//! Talks to any MQTT 3.1.1 broker, which is how peers outside this repo meet
//! (mosquitto on port 1883 and friends). Every participant gets a random
//! client id and a clean session; all traffic is QoS 0 without retain.
//!
//! `connect` drives the event loop until CONNACK, then hands it to a task
//! that forwards PUBLISH packets as `Inbound`. The task stops when the link
//! drops, which closes the receiver.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use rumqttc::{AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio::sync::mpsc::{self, error::TrySendError};

use parley_core::error::{ParleyError, Result};

use super::{Inbound, Transport};

/// Requests queued between the client handle and the event loop.
const REQUEST_QUEUE: usize = 64;
const INBOUND_QUEUE: usize = 1024;

pub struct MqttTransport {
    client: AsyncClient,
}

impl MqttTransport {
    /// Connect to `host:port`. The receiver yields deliveries until the link closes.
    pub async fn connect(
        addr: &str,
        keep_alive: Duration,
        max_packet_bytes: usize,
    ) -> Result<(Self, mpsc::Receiver<Inbound>)> {
        let (host, port) = split_host_port(addr)?;
        let client_id = format!("parley-{}", uuid::Uuid::new_v4());

        let mut opts = MqttOptions::new(client_id.as_str(), host, port);
        opts.set_keep_alive(keep_alive);
        opts.set_clean_session(true);
        opts.set_max_packet_size(max_packet_bytes, max_packet_bytes);

        let (client, mut eventloop) = AsyncClient::new(opts, REQUEST_QUEUE);
        await_connack(&mut eventloop, addr).await?;
        tracing::info!(%addr, %client_id, "connected to mqtt broker");

        let (in_tx, in_rx) = mpsc::channel(INBOUND_QUEUE);
        tokio::spawn(pump(eventloop, in_tx));

        Ok((Self { client }, in_rx))
    }
}

async fn await_connack(eventloop: &mut EventLoop, addr: &str) -> Result<()> {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                if ack.code == ConnectReturnCode::Success {
                    return Ok(());
                }
                return Err(ParleyError::Transport(format!(
                    "broker {addr} refused connection: {:?}",
                    ack.code
                )));
            }
            Ok(_) => {}
            Err(e) => {
                return Err(ParleyError::Transport(format!("connect {addr} failed: {e}")));
            }
        }
    }
}

/// Forward deliveries until the link drops or the receiver goes away.
///
/// Delivery is lossy: a full inbound queue must not stall the event loop,
/// since outbound publishes are flushed by the same loop.
async fn pump(mut eventloop: EventLoop, tx: mpsc::Sender<Inbound>) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::Publish(p))) => {
                let inb = Inbound {
                    topic: p.topic,
                    payload: p.payload,
                };
                match tx.try_send(inb) {
                    Ok(()) => {}
                    Err(TrySendError::Full(inb)) => {
                        tracing::warn!(topic = %inb.topic, "inbound queue full; dropping delivery");
                    }
                    Err(TrySendError::Closed(_)) => break,
                }
            }
            Ok(Event::Incoming(Packet::Disconnect)) => {
                tracing::info!("mqtt broker closed the session");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "mqtt link lost");
                break;
            }
        }
    }
}

fn split_host_port(addr: &str) -> Result<(&str, u16)> {
    let (host, port) = addr
        .rsplit_once(':')
        .ok_or_else(|| ParleyError::Validation(format!("broker address {addr} needs host:port")))?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        return Err(ParleyError::Validation(format!("broker address {addr} has no host")));
    }
    let port = port
        .parse::<u16>()
        .map_err(|_| ParleyError::Validation(format!("broker address {addr} has a bad port")))?;
    Ok((host, port))
}

#[async_trait]
impl Transport for MqttTransport {
    async fn subscribe(&self, topic: &str) -> Result<()> {
        self.client
            .subscribe(topic, QoS::AtMostOnce)
            .await
            .map_err(|e| ParleyError::Transport(format!("subscribe {topic} failed: {e}")))
    }

    async fn unsubscribe(&self, topic: &str) -> Result<()> {
        self.client
            .unsubscribe(topic)
            .await
            .map_err(|e| ParleyError::Transport(format!("unsubscribe {topic} failed: {e}")))
    }

    async fn publish(&self, topic: &str, payload: Bytes) -> Result<()> {
        self.client
            .publish(topic, QoS::AtMostOnce, false, payload.to_vec())
            .await
            .map_err(|e| ParleyError::Transport(format!("publish {topic} failed: {e}")))
    }
}
