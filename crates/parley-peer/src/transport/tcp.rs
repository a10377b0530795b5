//! TCP client transport for `parley-broker`.
//!
//! `connect` splits the socket: a writer task drains queued frame bodies,
//! a reader task forwards `Message` frames as `Inbound` deliveries. Frames
//! are encoded before they are queued so a bad topic fails the caller
//! instead of the connection.

use async_trait::async_trait;
use bytes::Bytes;
use tokio::net::TcpStream;
use tokio::sync::mpsc;

use parley_core::error::{ParleyError, Result};
use parley_core::protocol::frame::{encode_frame, Frame, Op};

use super::codec::{is_recoverable, read_frame, write_body};
use super::{Inbound, Transport};

const OUTBOUND_QUEUE: usize = 1024;
const INBOUND_QUEUE: usize = 1024;

pub struct TcpTransport {
    tx: mpsc::Sender<Bytes>,
}

impl TcpTransport {
    /// Connect to a broker. The receiver yields deliveries until the link closes.
    pub async fn connect(addr: &str, max_frame_bytes: usize) -> Result<(Self, mpsc::Receiver<Inbound>)> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| ParleyError::Transport(format!("connect {addr} failed: {e}")))?;
        let _ = stream.set_nodelay(true);
        tracing::info!(%addr, "connected to broker");

        let (mut rd, mut wr) = stream.into_split();
        let (out_tx, mut out_rx) = mpsc::channel::<Bytes>(OUTBOUND_QUEUE);
        let (in_tx, in_rx) = mpsc::channel::<Inbound>(INBOUND_QUEUE);

        tokio::spawn(async move {
            while let Some(body) = out_rx.recv().await {
                if let Err(e) = write_body(&mut wr, &body).await {
                    tracing::warn!(error = %e, "broker write failed");
                    break;
                }
            }
        });

        tokio::spawn(async move {
            loop {
                match read_frame(&mut rd, max_frame_bytes).await {
                    Ok(Some(frame)) if frame.op == Op::Message => {
                        let inb = Inbound {
                            topic: frame.topic,
                            payload: frame.payload,
                        };
                        if in_tx.send(inb).await.is_err() {
                            break;
                        }
                    }
                    Ok(Some(frame)) => {
                        tracing::debug!(op = ?frame.op, "ignoring unexpected frame from broker");
                    }
                    Ok(None) => {
                        tracing::info!("broker closed the connection");
                        break;
                    }
                    Err(e) if is_recoverable(&e) => {
                        tracing::debug!(error = %e, "skipping undecodable frame");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "broker link lost");
                        break;
                    }
                }
            }
        });

        Ok((Self { tx: out_tx }, in_rx))
    }

    async fn send(&self, frame: Frame) -> Result<()> {
        let body = encode_frame(&frame)?;
        self.tx
            .send(body)
            .await
            .map_err(|_| ParleyError::Transport("broker connection closed".into()))
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn subscribe(&self, topic: &str) -> Result<()> {
        self.send(Frame::subscribe(topic)).await
    }

    async fn unsubscribe(&self, topic: &str) -> Result<()> {
        self.send(Frame::unsubscribe(topic)).await
    }

    async fn publish(&self, topic: &str, payload: Bytes) -> Result<()> {
        self.send(Frame::publish(topic, payload)).await
    }
}
