use std::collections::HashMap;
use std::sync::RwLock;

use tokio::sync::mpsc;
use tracing::debug;

use crate::broker::message::Message;
use crate::broker::router::{ClientId, Router, Rule};

/// Capacity of a client's delivery channel. A single slot mirrors the
/// rendezvous behavior a long-poll transport expects: a broadcast parks on
/// the send until the client's poll has drained the previous message.
const DELIVERY_CAPACITY: usize = 1;

/// Registry entry for one registered client.
///
/// `sender` is the broker-side half of the delivery channel. `parked` holds
/// the receiver half while no long-poll connection has claimed it; an empty
/// slot means a connection is active. `generation` counts channel
/// replacements so a stale release cannot tear down a successor connection.
#[derive(Debug)]
struct ClientRecord {
    sender: mpsc::Sender<Message>,
    parked: Option<mpsc::Receiver<Message>>,
    generation: u64,
    rules: HashMap<String, Rule>,
}

impl ClientRecord {
    fn new() -> Self {
        let (sender, receiver) = mpsc::channel(DELIVERY_CAPACITY);
        Self {
            sender,
            parked: Some(receiver),
            generation: 0,
            rules: HashMap::new(),
        }
    }
}

/// Outcome of a session-layer attempt to claim a client's delivery channel.
#[derive(Debug)]
pub(crate) enum Handout {
    /// No such client.
    Unknown,
    /// The client already holds an active connection; it stays undisturbed.
    Busy,
    /// The receiver half, plus the generation identifying this grant.
    Granted {
        messages: mpsc::Receiver<Message>,
        generation: u64,
    },
}

/// The registry and dispatch core of the broker.
///
/// Owns the client records and the subscription router, guarded by a single
/// reader/writer lock: existence checks and sender lookups take the read
/// lock, every structural mutation takes the write lock. The lock is never
/// held across a delivery send, so one slow subscriber cannot stall
/// registration or subscription traffic.
#[derive(Debug, Default)]
pub struct Broker {
    state: RwLock<BrokerState>,
}

#[derive(Debug, Default)]
struct BrokerState {
    clients: HashMap<ClientId, ClientRecord>,
    router: Router,
}

impl Broker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a client, creating its delivery channel and an empty rule
    /// map. Returns false, changing nothing, if the ID is already taken.
    pub fn register(&self, client_id: &str) -> bool {
        let mut state = self.state.write().unwrap();
        if state.clients.contains_key(client_id) {
            return false;
        }
        state
            .clients
            .insert(client_id.to_string(), ClientRecord::new());
        true
    }

    /// Removes the client and releases every subscription it held. Dropping
    /// the record closes the delivery channel, waking any parked reader with
    /// the closed signal. Returns false for an unknown client.
    pub fn deregister(&self, client_id: &str) -> bool {
        let mut state = self.state.write().unwrap();
        match state.clients.remove(client_id) {
            Some(record) => {
                for rule in record.rules.values() {
                    state.router.remove(rule);
                }
                true
            }
            None => false,
        }
    }

    /// True if the client is currently registered.
    pub fn has_client(&self, client_id: &str) -> bool {
        self.state.read().unwrap().clients.contains_key(client_id)
    }

    /// Subscribes the client to `channel`. Returns false for an unknown
    /// client. Subscribing twice to the same channel keeps a single rule per
    /// `(client, channel)` pair.
    pub fn subscribe(&self, client_id: &str, channel: &str) -> bool {
        let mut state = self.state.write().unwrap();
        if !state.clients.contains_key(client_id) {
            return false;
        }
        let rule = state.router.add(channel, client_id.to_string());
        if let Some(record) = state.clients.get_mut(client_id) {
            record.rules.insert(channel.to_string(), rule);
        }
        true
    }

    /// Removes the client's subscription to `channel`. Returns false if the
    /// client is unknown or holds no such subscription.
    pub fn unsubscribe(&self, client_id: &str, channel: &str) -> bool {
        let mut state = self.state.write().unwrap();
        let Some(record) = state.clients.get_mut(client_id) else {
            return false;
        };
        let Some(rule) = record.rules.remove(channel) else {
            return false;
        };
        state.router.remove(&rule);
        true
    }

    /// Delivers `payload` to every current subscriber of `channel`.
    ///
    /// Targets are served in unspecified order and each send blocks until
    /// the target's delivery channel accepts the message, so a stalled
    /// receiver delays the targets after it. A target whose channel closed
    /// mid-broadcast loses the message; that is not an error. The sender
    /// handles are snapshotted under the read lock and the sends happen
    /// after it is dropped.
    pub async fn broadcast(&self, channel: &str, payload: &str) {
        let targets: Vec<(ClientId, mpsc::Sender<Message>)> = {
            let state = self.state.read().unwrap();
            state
                .router
                .fanout(channel)
                .into_iter()
                .filter_map(|id| {
                    let sender = state.clients.get(&id)?.sender.clone();
                    Some((id, sender))
                })
                .collect()
        };
        if targets.is_empty() {
            return;
        }
        let target_ids: Vec<&str> = targets.iter().map(|(id, _)| id.as_str()).collect();
        debug!(channel, targets = ?target_ids, "broadcasting");
        for (client_id, sender) in targets {
            if sender.send(Message::new(channel, payload)).await.is_err() {
                debug!(client = %client_id, channel, "delivery channel closed, message dropped");
            }
        }
    }

    /// Claims the client's parked delivery receiver for a new long-poll
    /// connection.
    pub(crate) fn acquire_connection(&self, client_id: &str) -> Handout {
        let mut state = self.state.write().unwrap();
        let Some(record) = state.clients.get_mut(client_id) else {
            return Handout::Unknown;
        };
        match record.parked.take() {
            Some(messages) => Handout::Granted {
                messages,
                generation: record.generation,
            },
            None => Handout::Busy,
        }
    }

    /// Tears down the active connection identified by `generation`: drops
    /// the old sender, which closes the channel under its reader, and parks
    /// a fresh pair so a later acquire succeeds. Ignored when the client is
    /// gone, no connection is outstanding, or the generation is stale.
    pub(crate) fn release_connection(&self, client_id: &str, generation: u64) -> bool {
        let mut state = self.state.write().unwrap();
        let Some(record) = state.clients.get_mut(client_id) else {
            return false;
        };
        if record.generation != generation || record.parked.is_some() {
            return false;
        }
        let (sender, receiver) = mpsc::channel(DELIVERY_CAPACITY);
        record.sender = sender;
        record.parked = Some(receiver);
        record.generation += 1;
        true
    }
}
