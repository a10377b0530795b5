//! Topic broker shared by the in-process transport and `parley-broker`.
//!
//! Subscription index, client registry, the fan-out router, and the TCP
//! server loop that exposes the router over the frame codec.

mod registry;
mod router;
pub mod server;
mod subscriptions;

pub use registry::{ClientId, ClientRegistry, Connection};
pub use router::TopicRouter;
pub use subscriptions::Subscriptions;
