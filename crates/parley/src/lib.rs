//! Top-level facade crate for parley.
//!
//! Re-exports the protocol core and the participant runtime so users can depend on a single crate.

pub mod core {
    pub use parley_core::*;
}

pub mod peer {
    pub use parley_peer::*;
}
