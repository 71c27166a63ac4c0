//! The transport layer: the WebSocket listener and the wire protocol it
//! speaks. The transport maps inbound requests to session-layer calls and
//! serializes replies and deliveries back to clients; it adds no semantics
//! of its own.

pub mod message;
pub mod websocket;
