//! Protocol modules (room envelope + broker frame).
//!
//! - Envelope: JSON record published on a room topic by every participant.
//! - Frame: length-prefixed binary frames between a participant and the broker.
//!
//! All parsers are panic-free: malformed input is reported as `ParleyError`
//! instead of panicking or indexing raw buffers.

pub mod envelope;
pub mod frame;

pub use envelope::{Envelope, Kind};
pub use frame::{Frame, Op};
