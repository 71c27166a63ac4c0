//! # pollbus
//!
//! `pollbus` is an in-memory, long-polling publish/subscribe broker. Clients
//! handshake for an identity, subscribe to named channels, and receive
//! messages broadcast to those channels over a single outstanding receive
//! connection per client. Delivery is best-effort, only to currently
//! subscribed and connected clients; nothing is persisted or replayed.
//!
//! ## Core Modules
//!
//! - `broker`: the registry/routing engine — client records, the
//!   subscription index, and broadcast dispatch.
//! - `session`: the protocol layer — identity issuance, the single active
//!   connection per client, and validated publish/subscribe calls.
//! - `transport`: the WebSocket server and the wire protocol.
//! - `config`: loading and merging server configuration.
//! - `utils`: shared error types.

pub mod broker;
pub mod config;
pub mod session;
pub mod transport;
pub mod utils;
