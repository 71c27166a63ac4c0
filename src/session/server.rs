use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::debug;
use uuid::Uuid;

use crate::broker::engine::Handout;
use crate::broker::{Broker, ClientId, Message};
use crate::utils::error::HandshakeError;

/// Candidate IDs tried before a handshake gives up. A v4 UUID colliding with
/// a live registration is astronomically unlikely, so more than one attempt
/// should never be needed in practice.
const MAX_HANDSHAKE_ATTEMPTS: usize = 8;

/// One granted long-poll connection.
///
/// `messages` is the receiver half of the client's delivery channel; reading
/// `None` from it means the session terminated the connection. `timeout` is
/// a send-once side channel: firing it asks the session to release this
/// connection so a later `connect` for the same client can succeed.
#[derive(Debug)]
pub struct Connection {
    pub messages: mpsc::Receiver<Message>,
    pub timeout: oneshot::Sender<()>,
}

impl Connection {
    /// A connection that is already terminated: reading it yields the closed
    /// signal immediately and firing its timeout does nothing. Handed out
    /// when the client already holds an active connection.
    fn closed() -> Self {
        let (_, messages) = mpsc::channel(1);
        let (timeout, _) = oneshot::channel();
        Self { messages, timeout }
    }
}

/// The client-facing protocol layer on top of [`Broker`].
///
/// Issues client identities, enforces the one-active-connection-per-client
/// rule, and validates the publish/subscribe entry points. All expected
/// failures (unknown client, redundant unsubscribe, duplicate connection)
/// are ordinary boolean or `Option` outcomes, never panics.
#[derive(Debug, Default)]
pub struct Server {
    broker: Arc<Broker>,
}

impl Server {
    pub fn new() -> Self {
        Self {
            broker: Arc::new(Broker::new()),
        }
    }

    /// Allocates a fresh client identity and registers it with the broker.
    /// Registration reports whether the ID was actually fresh, so a
    /// collision with a live client simply retries with a new candidate.
    pub fn handshake(&self) -> Result<ClientId, HandshakeError> {
        for _ in 0..MAX_HANDSHAKE_ATTEMPTS {
            let id = Uuid::new_v4().to_string();
            if self.broker.register(&id) {
                return Ok(id);
            }
        }
        Err(HandshakeError::Exhausted(MAX_HANDSHAKE_ATTEMPTS))
    }

    /// Establishes the client's active long-poll connection.
    ///
    /// Returns `None` for an unknown client. If the client already has an
    /// active connection, that one stays undisturbed and the caller gets a
    /// connection whose message channel is already closed, signaling that
    /// only one active channel is allowed. Otherwise the returned connection
    /// carries the live delivery channel; its timeout signal, once fired,
    /// closes the channel and lets a later `connect` succeed.
    pub fn connect(&self, client_id: &str) -> Option<Connection> {
        match self.broker.acquire_connection(client_id) {
            Handout::Unknown => None,
            Handout::Busy => {
                debug!(client = %client_id, "rejected second active connection");
                Some(Connection::closed())
            }
            Handout::Granted {
                messages,
                generation,
            } => {
                let (timeout, fired) = oneshot::channel();
                let broker = Arc::clone(&self.broker);
                let id = client_id.to_string();
                tokio::spawn(async move {
                    if fired.await.is_ok() {
                        broker.release_connection(&id, generation);
                    }
                });
                Some(Connection { messages, timeout })
            }
        }
    }

    /// Deregisters the client, closing its delivery channel and releasing
    /// all its subscriptions. Returns false for an unknown client, so a
    /// second disconnect of the same client reports failure.
    pub fn disconnect(&self, client_id: &str) -> bool {
        self.broker.deregister(client_id)
    }

    /// Subscribes the client to `channel`. Succeeds for any registered
    /// client, connected or not; subscriptions may be set up before the
    /// first long-poll is established.
    pub fn subscribe(&self, client_id: &str, channel: &str) -> bool {
        self.broker.subscribe(client_id, channel)
    }

    /// Removes the client's subscription to `channel`. Returns false if the
    /// client is unknown or never subscribed to it.
    pub fn unsubscribe(&self, client_id: &str, channel: &str) -> bool {
        self.broker.unsubscribe(client_id, channel)
    }

    /// Broadcasts `payload` on `channel` on behalf of a registered client.
    /// Success means accepted and routed, not received; delivery to each
    /// subscriber remains best-effort.
    pub async fn publish(&self, client_id: &str, channel: &str, payload: &str) -> bool {
        if !self.broker.has_client(client_id) {
            return false;
        }
        self.broker.broadcast(channel, payload).await;
        true
    }

    /// Server-originated broadcast that bypasses client-identity validation,
    /// used for system messages. With no subscribers it is a silent no-op.
    pub async fn whisper(&self, channel: &str, payload: &str) {
        self.broker.broadcast(channel, payload).await;
    }
}
