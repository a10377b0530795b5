//! parley core: transport-agnostic protocol primitives and the shared error type.
//!
//! This crate defines the wire-level contracts shared by every participant:
//! the chat envelope exchanged on a room topic and the frame codec spoken
//! between a participant and the broker. It carries no runtime dependencies
//! so it can be reused by any transport or front end.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here.
//! Every fallible path surfaces as `ParleyError`/`Result`, so a peer
//! publishing garbage can never crash a well-behaved participant.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{ErrorCode, ParleyError, Result};
