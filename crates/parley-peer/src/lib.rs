//! parley participant runtime.
//!
//! This crate wires the chat core (room controller + roster reconciler) to
//! pluggable pub/sub transports, and ships a small topic broker so the whole
//! system can run without external infrastructure. It is consumed by the
//! `parley-chat` console participant, the `parley-broker` daemon, and the
//! integration tests.

pub mod broker;
pub mod chat;
pub mod config;
pub mod transport;
