use serde::{Deserialize, Serialize};

/// A request sent by a client over the WebSocket transport.
///
/// Every request except `handshake` names the client identity it acts for;
/// the transport performs no authentication beyond handing the identity to
/// the session layer for validation.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ClientRequest {
    #[serde(rename = "handshake")]
    Handshake,

    #[serde(rename = "connect")]
    Connect { client_id: String },

    #[serde(rename = "disconnect")]
    Disconnect { client_id: String },

    #[serde(rename = "subscribe")]
    Subscribe { client_id: String, channel: String },

    #[serde(rename = "unsubscribe")]
    Unsubscribe { client_id: String, channel: String },

    #[serde(rename = "publish")]
    Publish {
        client_id: String,
        channel: String,
        payload: String,
    },
}

/// A frame sent back to the client: the handshake reply carrying the issued
/// ID, a boolean acknowledgment, or a delivered message.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum ServerReply {
    #[serde(rename = "handshake")]
    Handshake { client_id: String },

    #[serde(rename = "ack")]
    Ack { ok: bool },

    #[serde(rename = "deliver")]
    Deliver { channel: String, payload: String },
}
