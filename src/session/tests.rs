use std::collections::HashSet;

use super::Server;

#[test]
fn handshake_issues_distinct_ids() {
    let s = Server::new();
    let c1 = s.handshake().expect("simple handshake should not fail");
    let c2 = s.handshake().expect("simple handshake should not fail");
    assert_ne!(c1, c2, "client IDs should not conflict");
}

#[test]
fn handshake_never_reuses_ids() {
    let s = Server::new();
    let mut seen = HashSet::new();
    for _ in 0..10_000 {
        let id = s.handshake().expect("handshake should not fail");
        assert!(seen.insert(id), "client IDs should not conflict");
    }
}

#[tokio::test]
async fn connect_requires_handshake() {
    let s = Server::new();
    let c1 = s.handshake().unwrap();
    assert!(s.connect(&c1).is_some());
    assert!(s.connect("invalid").is_none());
}

#[tokio::test]
async fn disconnect_lifecycle() {
    let s = Server::new();
    assert!(!s.disconnect("invalid"));

    let c1 = s.handshake().unwrap();
    assert!(s.disconnect(&c1));
    assert!(!s.disconnect(&c1), "second disconnect reports failure");

    let c2 = s.handshake().unwrap();
    let mut conn = s.connect(&c2).unwrap();
    assert!(s.disconnect(&c2));
    assert!(
        conn.messages.recv().await.is_none(),
        "channel should be closed after disconnect"
    );
}

#[tokio::test]
async fn subscribe_before_connect_is_allowed() {
    let s = Server::new();
    assert!(!s.subscribe("invalid", "/foo/bar"));

    let c1 = s.handshake().unwrap();
    assert!(s.subscribe(&c1, "/foo/bar"), "subscribe without connect");

    let _ = s.connect(&c1);
    assert!(s.subscribe(&c1, "/foo/bar"));
}

#[test]
fn unsubscribe_requires_prior_subscribe() {
    let s = Server::new();
    assert!(!s.unsubscribe("invalid", "/foo/bar"));

    let c1 = s.handshake().unwrap();
    assert!(!s.unsubscribe(&c1, "/foo/bar"));

    s.subscribe(&c1, "/foo/bar");
    assert!(s.unsubscribe(&c1, "/foo/bar"));
    assert!(!s.unsubscribe(&c1, "/foo/bar"));
}

#[tokio::test]
async fn publish_delivers_to_subscribers() {
    let s = Server::new();
    assert!(!s.publish("invalid", "/foo/bar", "ping").await);

    let c1 = s.handshake().unwrap();
    // Accepted even with nobody subscribed and the publisher not connected.
    assert!(s.publish(&c1, "/foo/bar", "ping").await);

    let c2 = s.handshake().unwrap();
    let mut conn = s.connect(&c2).unwrap();
    s.subscribe(&c2, "/foo/bar");
    assert!(s.publish(&c1, "/foo/bar", "ping").await);

    let msg = conn.messages.recv().await.expect("delivered message");
    assert_eq!(msg.channel, "/foo/bar");
    assert_eq!(msg.payload, "ping");
}

#[tokio::test]
async fn whisper_bypasses_identity_validation() {
    let s = Server::new();
    // No subscribers yet: a silent no-op.
    s.whisper("/foo/bar", "ping").await;

    let c1 = s.handshake().unwrap();
    let mut conn = s.connect(&c1).unwrap();
    s.subscribe(&c1, "/foo/bar");
    s.whisper("/foo/bar", "ping").await;
    assert_eq!(conn.messages.recv().await.unwrap().payload, "ping");
}

#[tokio::test]
async fn second_connection_is_handed_out_closed() {
    let s = Server::new();
    let c1 = s.handshake().unwrap();
    let mut first = s.connect(&c1).unwrap();

    let mut second = s.connect(&c1).unwrap();
    assert!(
        second.messages.recv().await.is_none(),
        "only one active channel is allowed"
    );

    // The first connection is undisturbed and keeps receiving.
    let c2 = s.handshake().unwrap();
    s.subscribe(&c1, "/foo/bar");
    assert!(s.publish(&c2, "/foo/bar", "ping").await);
    assert_eq!(first.messages.recv().await.unwrap().payload, "ping");
}

#[tokio::test]
async fn timeout_releases_the_active_connection() {
    let s = Server::new();
    let c1 = s.handshake().unwrap();
    let c2 = s.handshake().unwrap();

    let mut first = s.connect(&c1).unwrap();
    first.timeout.send(()).unwrap();
    assert!(
        first.messages.recv().await.is_none(),
        "active channel should close once the timeout fires"
    );

    s.subscribe(&c1, "/foo/bar/2");
    let mut next = s.connect(&c1).expect("reconnect after timeout");
    assert!(s.publish(&c2, "/foo/bar/2", "ping").await);
    assert_eq!(next.messages.recv().await.unwrap().payload, "ping");
}

#[tokio::test]
async fn disconnect_cascades_subscriptions() {
    let s = Server::new();
    let c1 = s.handshake().unwrap();
    let _ = s.connect(&c1);
    s.subscribe(&c1, "/foo/bar");
    assert!(s.disconnect(&c1));

    // A later broadcast must not stall on the departed subscriber.
    let c2 = s.handshake().unwrap();
    let mut conn = s.connect(&c2).unwrap();
    s.subscribe(&c2, "/foo/bar");
    s.whisper("/foo/bar", "ping").await;
    assert_eq!(conn.messages.recv().await.unwrap().payload, "ping");
}
