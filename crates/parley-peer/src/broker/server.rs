//! TCP broker server.
//!
//! Responsibilities:
//! - Accept clients, one task per connection
//! - Reader loop: decode frames, apply subscribe/unsubscribe/publish
//! - Writer task: drain the client's delivery queue as `Message` frames
//! - Cleanup subscriptions when the client goes away

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tracing::Instrument;

use parley_core::error::{ParleyError, Result};
use parley_core::protocol::frame::{Frame, Op};

use super::{ClientId, TopicRouter};
use crate::config::BrokerSection;
use crate::transport::codec::{is_recoverable, read_frame, write_frame};

/// Accept loop. Returns only when `accept` fails.
pub async fn serve(listener: TcpListener, router: Arc<TopicRouter>, cfg: BrokerSection) -> Result<()> {
    loop {
        let (stream, peer) = listener
            .accept()
            .await
            .map_err(|e| ParleyError::Transport(format!("accept failed: {e}")))?;
        let _ = stream.set_nodelay(true);

        let router = Arc::clone(&router);
        let cfg = cfg.clone();
        tokio::spawn(async move {
            run_client(router, stream, peer, &cfg).await;
        });
    }
}

async fn run_client(router: Arc<TopicRouter>, stream: TcpStream, peer: SocketAddr, cfg: &BrokerSection) {
    let (id, mut deliveries) = router.register(cfg.queue_capacity);
    let span = tracing::info_span!("client", client_id = id, %peer);

    async move {
        tracing::info!("client connected");
        let (mut rd, mut wr) = stream.into_split();

        let writer = tokio::spawn(
            async move {
                while let Some(inb) = deliveries.recv().await {
                    let frame = Frame::message(inb.topic, inb.payload);
                    if let Err(e) = write_frame(&mut wr, &frame).await {
                        tracing::debug!(error = %e, "write failed");
                        break;
                    }
                }
            }
            .in_current_span(),
        );

        loop {
            match read_frame(&mut rd, cfg.max_frame_bytes).await {
                Ok(Some(frame)) => apply(&router, id, frame),
                Ok(None) => break,
                Err(e) if is_recoverable(&e) => {
                    tracing::debug!(error = %e, "skipping undecodable frame");
                }
                Err(e) => {
                    tracing::info!(error = %e, "closing client");
                    break;
                }
            }
        }

        // Removing the registry entry drops the queue sender, which ends the writer.
        router.unregister(id);
        let _ = writer.await;
        tracing::info!("client disconnected");
    }
    .instrument(span)
    .await
}

fn apply(router: &TopicRouter, id: ClientId, frame: Frame) {
    match frame.op {
        Op::Subscribe => router.subscribe(id, &frame.topic),
        Op::Unsubscribe => router.unsubscribe(id, &frame.topic),
        Op::Publish => {
            let n = router.publish(&frame.topic, frame.payload);
            tracing::trace!(topic = %frame.topic, delivered = n, "published");
        }
        Op::Message => {
            tracing::debug!(topic = %frame.topic, "ignoring client-sent message frame");
        }
    }
}
