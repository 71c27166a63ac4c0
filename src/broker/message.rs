use std::fmt;

use serde::{Deserialize, Serialize};

/// A single broadcast message in the Pub/Sub system.
///
/// A message is an immutable value pairing the channel it was published to
/// with its payload. It carries no identity beyond value equality and is
/// never persisted: a message that reaches no connected subscriber is gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Name of the channel this message was broadcast to.
    pub channel: String,

    /// The message content, usually a JSON-encoded string.
    pub payload: String,
}

impl Message {
    pub fn new(channel: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            payload: payload.into(),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}: {}", self.channel, self.payload)
    }
}
