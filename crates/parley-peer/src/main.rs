//! parley-chat: console participant.
//!
//! Commands (one per line on stdin):
//! - `/join <room>`  join a room (leaving the current one)
//! - `/nick <name>`  username for the next join
//! - `/leave`        leave the current room
//! - `/who`          print the roster of the current room
//! - `/rooms`        print recently used rooms
//! - `/quit`         leave and exit
//!
//! Anything else is sent as a chat message.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing_subscriber::{fmt, EnvFilter};

use parley_core::error::{ParleyError, Result};
use parley_peer::chat::{ChatView, MruRooms, Participant};
use parley_peer::config::{self, ParleyConfig, TransportKind};
use parley_peer::transport::{Inbound, MqttTransport, TcpTransport, Transport};

struct ConsoleView;

impl ChatView for ConsoleView {
    fn chat_line(&self, line: &str) {
        println!("{line}");
    }

    fn roster_changed(&self, room: &str, users: &[String]) {
        println!("[{room}] online: {}", users.join(", "));
    }

    fn room_switched(&self, room: &str) {
        println!("--- {room} ---");
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Join(&'a str),
    Nick(&'a str),
    Leave,
    Who,
    Rooms,
    Quit,
    Say(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        let (head, rest) = match line.split_once(' ') {
            Some((h, r)) => (h, r.trim()),
            None => (line.trim_end(), ""),
        };
        match head {
            "/join" => Command::Join(rest),
            "/nick" => Command::Nick(rest),
            "/leave" => Command::Leave,
            "/who" => Command::Who,
            "/rooms" => Command::Rooms,
            "/quit" => Command::Quit,
            _ => Command::Say(line),
        }
    }
}

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "parley-chat exited");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "parley.yaml".to_string());
    let cfg = config::load_from_file(&path)?;

    let (transport, inbound) = connect(&cfg).await?;
    println!("Connected to broker.");

    let recent = Arc::new(MruRooms::new(cfg.client.recent_rooms));
    let participant = Participant::new(transport, Arc::new(ConsoleView), recent);
    let mut inbound_task = participant.spawn_inbound(inbound);

    let username = cfg.client.username.clone().unwrap_or_default();
    let stdin = BufReader::new(tokio::io::stdin());
    let exit = command_loop(&participant, stdin, username, &mut inbound_task).await?;

    match exit {
        Exit::LinkLost => {
            println!("Disconnected from broker.");
        }
        Exit::Quit | Exit::Eof => {
            if let Err(e) = participant.controller().leave().await {
                tracing::warn!(error = %e, "leave on exit failed");
            }
            inbound_task.abort();
        }
    }
    Ok(())
}

async fn connect(cfg: &ParleyConfig) -> Result<(Arc<dyn Transport>, mpsc::Receiver<Inbound>)> {
    let addr = cfg.client.broker.as_str();
    match cfg.client.transport {
        TransportKind::Mqtt => {
            let keep_alive = Duration::from_secs(cfg.client.keep_alive_secs);
            let (t, rx) = MqttTransport::connect(addr, keep_alive, cfg.broker.max_frame_bytes).await?;
            Ok((Arc::new(t), rx))
        }
        TransportKind::Tcp => {
            let (t, rx) = TcpTransport::connect(addr, cfg.broker.max_frame_bytes).await?;
            Ok((Arc::new(t), rx))
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Exit {
    Quit,
    Eof,
    LinkLost,
}

/// Run commands until `/quit`, end of input, or the inbound stream closes.
///
/// A failed command is printed and the loop keeps going; the user retries.
async fn command_loop<R>(
    participant: &Participant,
    input: R,
    mut username: String,
    inbound_task: &mut JoinHandle<()>,
) -> Result<Exit>
where
    R: AsyncBufRead + Unpin,
{
    let controller = participant.controller();
    let mut lines = input.lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line
                .map_err(|e| ParleyError::Internal(format!("stdin read failed: {e}")))?,
            _ = &mut *inbound_task => return Ok(Exit::LinkLost),
        };
        let Some(line) = line else {
            return Ok(Exit::Eof);
        };

        let res = match Command::parse(&line) {
            Command::Join(room) => controller.join(&username, room).await,
            Command::Nick(name) => {
                username = name.to_string();
                Ok(())
            }
            Command::Leave => controller.leave().await,
            Command::Who => {
                if let Some(room) = participant.active_room().await {
                    println!("[{room}] online: {}", participant.roster(&room).await.join(", "));
                }
                Ok(())
            }
            Command::Rooms => {
                println!("recent: {}", participant.recent_rooms().join(", "));
                Ok(())
            }
            Command::Quit => return Ok(Exit::Quit),
            Command::Say(body) => controller.send_message(body).await,
        };

        if let Err(e) = res {
            println!("{}", failure_line(&e));
        }
    }
}

fn failure_line(e: &ParleyError) -> String {
    match e {
        ParleyError::Validation(msg) => format!("error: {msg}"),
        ParleyError::Transport(msg) => format!("error: {msg} (try again)"),
        other => format!("error: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse("/join lobby"), Command::Join("lobby"));
        assert_eq!(Command::parse("/nick  bob "), Command::Nick("bob"));
        assert_eq!(Command::parse("/leave"), Command::Leave);
        assert_eq!(Command::parse("/quit"), Command::Quit);
        assert_eq!(Command::parse("hello there"), Command::Say("hello there"));
        assert_eq!(Command::parse("/join"), Command::Join(""));
    }

    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use bytes::Bytes;

    use parley_peer::chat::ChannelView;
    use parley_peer::transport::{MemoryBroker, MemoryTransport};

    /// Memory transport whose first subscribe fails.
    struct FirstSubscribeFails {
        inner: MemoryTransport,
        failed: AtomicBool,
    }

    #[async_trait]
    impl Transport for FirstSubscribeFails {
        async fn subscribe(&self, topic: &str) -> Result<()> {
            if !self.failed.swap(true, Ordering::SeqCst) {
                return Err(ParleyError::Transport("broker unavailable".into()));
            }
            self.inner.subscribe(topic).await
        }

        async fn unsubscribe(&self, topic: &str) -> Result<()> {
            self.inner.unsubscribe(topic).await
        }

        async fn publish(&self, topic: &str, payload: Bytes) -> Result<()> {
            self.inner.publish(topic, payload).await
        }
    }

    fn participant(transport: Arc<dyn Transport>) -> Participant {
        let (view, _events) = ChannelView::new();
        Participant::new(transport, Arc::new(view), Arc::new(MruRooms::default()))
    }

    #[tokio::test]
    async fn transport_failure_keeps_reading_commands() {
        let broker = MemoryBroker::new();
        let (inner, _rx) = broker.connect();
        let transport = FirstSubscribeFails {
            inner,
            failed: AtomicBool::new(false),
        };
        let p = participant(Arc::new(transport));
        let mut inbound = tokio::spawn(std::future::pending::<()>());

        let input: &[u8] = b"/join lobby\n/join lobby\n";
        let exit = command_loop(&p, input, "alice".into(), &mut inbound).await.unwrap();

        assert_eq!(exit, Exit::Eof);
        assert_eq!(p.active_room().await.as_deref(), Some("lobby"));
        assert_eq!(p.recent_rooms(), vec!["lobby".to_string()]);
        inbound.abort();
    }

    #[tokio::test]
    async fn closed_inbound_stream_ends_the_loop() {
        let broker = MemoryBroker::new();
        let (transport, _rx) = broker.connect();
        let p = participant(Arc::new(transport));
        let mut inbound = tokio::spawn(async {});

        let (_keep_open, input) = tokio::io::duplex(64);
        let exit = command_loop(&p, BufReader::new(input), "alice".into(), &mut inbound)
            .await
            .unwrap();
        assert_eq!(exit, Exit::LinkLost);
    }

    #[test]
    fn transport_failures_ask_for_a_retry() {
        let line = failure_line(&ParleyError::Transport("publish lobby failed".into()));
        assert_eq!(line, "error: publish lobby failed (try again)");
        let line = failure_line(&ParleyError::Validation("room must not be empty".into()));
        assert_eq!(line, "error: room must not be empty");
    }
}
