use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time;
use tokio_tungstenite::accept_async;
use tracing::{debug, error, info, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::session::{Connection, Server};
use crate::transport::message::{ClientRequest, ServerReply};

/// Accepts WebSocket clients and maps their requests onto the session layer.
///
/// Each socket may carry any number of protocol calls. A `connect` request
/// spawns a forwarder that pushes deliveries to the socket until the
/// session closes the channel or the poll deadline elapses.
pub async fn start_websocket_server(addr: &str, server: Arc<Server>, poll_timeout: Duration) {
    let listener = TcpListener::bind(addr).await.expect("can't bind");

    info!(%addr, "listening for websocket clients");

    while let Ok((stream, peer)) = listener.accept().await {
        let server = server.clone();

        tokio::spawn(async move {
            let ws_stream = match accept_async(stream).await {
                Ok(ws) => ws,
                Err(e) => {
                    warn!(%peer, "websocket handshake error: {e}");
                    return;
                }
            };

            let (mut ws_sender, mut ws_receiver) = ws_stream.split();

            // Replies and deliveries funnel through one channel so the
            // delivery forwarder and the request loop never contend for the
            // socket's write half.
            let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ServerReply>();

            tokio::spawn(async move {
                while let Some(reply) = out_rx.recv().await {
                    let text = match serde_json::to_string(&reply) {
                        Ok(text) => text,
                        Err(e) => {
                            error!("failed to serialize reply: {e}");
                            continue;
                        }
                    };
                    if ws_sender.send(WsMessage::text(text)).await.is_err() {
                        break;
                    }
                }
            });

            while let Some(Ok(msg)) = ws_receiver.next().await {
                if !msg.is_text() {
                    continue;
                }
                let text = msg.to_text().unwrap_or_default();
                match serde_json::from_str::<ClientRequest>(text) {
                    Ok(request) => {
                        handle_request(&server, request, &out_tx, poll_timeout).await;
                    }
                    Err(e) => {
                        warn!("invalid client request: {e} | {text}");
                    }
                }
            }

            debug!(%peer, "websocket closed");
        });
    }
}

pub(crate) async fn handle_request(
    server: &Arc<Server>,
    request: ClientRequest,
    out: &mpsc::UnboundedSender<ServerReply>,
    poll_timeout: Duration,
) {
    match request {
        ClientRequest::Handshake => match server.handshake() {
            Ok(client_id) => {
                info!(client = %client_id, "handshake");
                let _ = out.send(ServerReply::Handshake { client_id });
            }
            Err(e) => {
                error!("handshake failed: {e}");
                ack(out, false);
            }
        },
        ClientRequest::Connect { client_id } => match server.connect(&client_id) {
            Some(connection) => {
                ack(out, true);
                tokio::spawn(forward_deliveries(connection, out.clone(), poll_timeout));
            }
            None => ack(out, false),
        },
        ClientRequest::Disconnect { client_id } => {
            ack(out, server.disconnect(&client_id));
        }
        ClientRequest::Subscribe { client_id, channel } => {
            ack(out, server.subscribe(&client_id, &channel));
        }
        ClientRequest::Unsubscribe { client_id, channel } => {
            ack(out, server.unsubscribe(&client_id, &channel));
        }
        ClientRequest::Publish {
            client_id,
            channel,
            payload,
        } => {
            let ok = server.publish(&client_id, &channel, &payload).await;
            ack(out, ok);
        }
    }
}

fn ack(out: &mpsc::UnboundedSender<ServerReply>, ok: bool) {
    let _ = out.send(ServerReply::Ack { ok });
}

/// Pushes deliveries from the session's channel to the socket until the
/// channel closes or the poll deadline passes with nothing delivered. The
/// deadline fires the connection's timeout signal so the session releases
/// the slot for the client's next connect; so does losing the socket.
async fn forward_deliveries(
    mut connection: Connection,
    out: mpsc::UnboundedSender<ServerReply>,
    poll_timeout: Duration,
) {
    loop {
        match time::timeout(poll_timeout, connection.messages.recv()).await {
            Ok(Some(message)) => {
                let delivered = out.send(ServerReply::Deliver {
                    channel: message.channel,
                    payload: message.payload,
                });
                if delivered.is_err() {
                    let _ = connection.timeout.send(());
                    return;
                }
            }
            // Session terminated the connection (disconnect or replacement).
            Ok(None) => return,
            Err(_) => {
                debug!("long-poll deadline elapsed");
                let _ = connection.timeout.send(());
                return;
            }
        }
    }
}
