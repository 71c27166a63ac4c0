//! The broker core: the message value type, the subscription router, and the
//! registry/dispatch engine that fans broadcasts out to delivery channels.

pub mod engine;
pub mod message;
pub mod router;

pub use engine::Broker;
pub use message::Message;
pub use router::{ClientId, Router, Rule};
