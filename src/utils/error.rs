use thiserror::Error;

/// Failure to allocate a fresh client identity.
///
/// Expected failures elsewhere in the system (unknown client, redundant
/// unsubscribe) are reported as plain booleans; handshake is the one
/// operation with a structured error, and even that should essentially
/// never occur under correct operation.
#[derive(Debug, Error)]
pub enum HandshakeError {
    /// Every generated candidate collided with a live registration.
    #[error("client ID space exhausted after {0} attempts")]
    Exhausted(usize),
}
