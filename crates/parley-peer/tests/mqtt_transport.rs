//! MQTT transport against a scripted MQTT 3.1.1 broker on loopback.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

use parley_core::protocol::Envelope;
use parley_peer::transport::{MqttTransport, Transport};

const WAIT: Duration = Duration::from_secs(5);
const KEEP_ALIVE: Duration = Duration::from_secs(60);

const CONNECT: u8 = 0x10;
const CONNACK_OK: [u8; 4] = [0x20, 0x02, 0x00, 0x00];
const CONNACK_NOT_AUTHORIZED: [u8; 4] = [0x20, 0x02, 0x00, 0x05];
const PUBLISH_QOS0: u8 = 0x30;

/// Read one control packet: (first header byte, variable header + payload).
async fn read_packet(stream: &mut TcpStream) -> (u8, Vec<u8>) {
    let header = stream.read_u8().await.unwrap();
    let mut len = 0usize;
    let mut shift = 0;
    loop {
        let b = stream.read_u8().await.unwrap();
        len |= usize::from(b & 0x7f) << shift;
        if b & 0x80 == 0 {
            break;
        }
        shift += 7;
    }
    let mut body = vec![0u8; len];
    stream.read_exact(&mut body).await.unwrap();
    (header, body)
}

fn publish_packet(topic: &str, payload: &[u8]) -> Vec<u8> {
    let remaining = 2 + topic.len() + payload.len();
    assert!(remaining < 128);
    let mut out = vec![PUBLISH_QOS0, remaining as u8];
    out.extend_from_slice(&(topic.len() as u16).to_be_bytes());
    out.extend_from_slice(topic.as_bytes());
    out.extend_from_slice(payload);
    out
}

/// Split a QoS 0 PUBLISH body into (topic, payload).
fn parse_publish(body: &[u8]) -> (String, Vec<u8>) {
    let topic_len = usize::from(u16::from_be_bytes([body[0], body[1]]));
    let topic = String::from_utf8(body[2..2 + topic_len].to_vec()).unwrap();
    (topic, body[2 + topic_len..].to_vec())
}

#[tokio::test]
async fn publish_goes_out_and_deliveries_come_back() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let join = Envelope::Join { user: "bob".into() }.encode().unwrap();
    let (seen_tx, seen_rx) = oneshot::channel();

    let delivery = join.clone();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let (header, _) = read_packet(&mut stream).await;
        assert_eq!(header, CONNECT);
        stream.write_all(&CONNACK_OK).await.unwrap();

        let (header, body) = read_packet(&mut stream).await;
        seen_tx.send((header, body)).unwrap();

        stream.write_all(&publish_packet("lobby", &delivery)).await.unwrap();
        // Closing the socket ends the client's event loop.
        tokio::time::sleep(Duration::from_millis(50)).await;
    });

    let (transport, mut inbound) = MqttTransport::connect(&addr, KEEP_ALIVE, 64 * 1024).await.unwrap();
    transport.publish("lobby", Bytes::from_static(b"hello")).await.unwrap();

    let (header, body) = tokio::time::timeout(WAIT, seen_rx).await.unwrap().unwrap();
    assert_eq!(header & 0xf0, PUBLISH_QOS0);
    assert_eq!(parse_publish(&body), ("lobby".to_string(), b"hello".to_vec()));

    let inb = tokio::time::timeout(WAIT, inbound.recv()).await.unwrap().unwrap();
    assert_eq!(inb.topic, "lobby");
    assert_eq!(inb.payload, join);
    assert_eq!(Envelope::decode(&inb.payload).unwrap(), Envelope::Join { user: "bob".into() });

    let closed = tokio::time::timeout(WAIT, inbound.recv()).await.unwrap();
    assert!(closed.is_none());
}

#[tokio::test]
async fn refused_connack_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let _ = read_packet(&mut stream).await;
        stream.write_all(&CONNACK_NOT_AUTHORIZED).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
    });

    let res = tokio::time::timeout(WAIT, MqttTransport::connect(&addr, KEEP_ALIVE, 64 * 1024))
        .await
        .unwrap();
    let err = res.err().expect("connect must fail");
    assert_eq!(err.code().as_str(), "TRANSPORT");
}

#[tokio::test]
async fn unreachable_broker_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let res = tokio::time::timeout(WAIT, MqttTransport::connect(&addr, KEEP_ALIVE, 64 * 1024))
        .await
        .unwrap();
    let err = res.err().expect("connect must fail");
    assert_eq!(err.code().as_str(), "TRANSPORT");
}
