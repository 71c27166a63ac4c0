use std::collections::{HashMap, HashSet};

/// Opaque identifier issued to a client at handshake time.
pub type ClientId = String;

/// Token representing one live `(client, channel)` subscription.
///
/// The rule remembers the channel key and the client entry it stands for, so
/// [`Router::remove`] can cancel exactly that binding without rescanning the
/// channel's subscriber set. Rules are created by [`Router::add`] and
/// destroyed by `remove` or by client deregistration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    channel: String,
    client: ClientId,
}

impl Rule {
    /// The channel this rule subscribes to.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// The subscribed client.
    pub fn client(&self) -> &str {
        &self.client
    }
}

/// Subscription index mapping channel name to the set of subscribed clients.
///
/// The router is a plain data structure with no locking of its own; the
/// enclosing broker serializes all access under its lock. Channels with no
/// subscribers left are dropped from the index entirely, so the index never
/// accumulates empty entries.
#[derive(Debug, Default)]
pub struct Router {
    channels: HashMap<String, HashSet<ClientId>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `client` as a subscriber of `channel` and returns the rule
    /// that cancels the registration. Adding the same pair again returns an
    /// equivalent rule without duplicating the index entry.
    pub fn add(&mut self, channel: &str, client: ClientId) -> Rule {
        let rule = Rule {
            channel: channel.to_string(),
            client: client.clone(),
        };
        self.channels
            .entry(channel.to_string())
            .or_default()
            .insert(client);
        rule
    }

    /// Cancels the subscription the rule represents. Other subscribers of
    /// the same channel are unaffected.
    pub fn remove(&mut self, rule: &Rule) {
        if let Some(subscribers) = self.channels.get_mut(&rule.channel) {
            subscribers.remove(&rule.client);
            if subscribers.is_empty() {
                self.channels.remove(&rule.channel);
            }
        }
    }

    /// Point-in-time snapshot of the subscribers of `channel`; empty if the
    /// channel has none.
    pub fn fanout(&self, channel: &str) -> Vec<ClientId> {
        self.channels
            .get(channel)
            .map(|subscribers| subscribers.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// True when no channel has any subscriber.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of channels with at least one subscriber.
    pub fn len(&self) -> usize {
        self.channels.len()
    }
}
