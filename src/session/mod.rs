//! The session layer: protocol-level client lifecycle (handshake, connect,
//! disconnect) and validated publish/subscribe entry points on top of the
//! broker core.

pub mod server;

pub use server::{Connection, Server};

#[cfg(test)]
mod tests;
