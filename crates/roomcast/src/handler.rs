//! Per-connection handler: greet, read events, and clean up.
//!
//! Each accepted connection gets its own Tokio task running this handler,
//! plus a writer task that drains the connection's outbound queue:
//!   0. Finish the WebSocket upgrade (bounded by the handshake timeout)
//!   1. Register with the relay → welcome notice is queued
//!   2. Loop: receive frames → decode → hand to the relay
//!   3. On close, error, or idle timeout → disconnect from the relay

use std::sync::Arc;

use roomcast_protocol::{ClientEvent, Codec, ServerEvent};
use roomcast_room::{Clock, Inbound};
use roomcast_transport::{
    Connection, ConnectionId, DEFAULT_QUEUE_CAPACITY, Incoming, PendingWebSocket,
    WebSocketConnection,
};
use tokio::sync::mpsc;

use crate::server::ServerState;
use crate::RoomcastError;

/// Drop guard that removes a connection from the relay when the handler
/// exits.
///
/// This ensures cleanup happens even if the handler panics. Since `Drop`
/// is synchronous, we spawn a fire-and-forget task for the async lock.
struct DisconnectGuard<C: Codec, K: Clock> {
    conn_id: ConnectionId,
    state: Arc<ServerState<C, K>>,
}

impl<C: Codec, K: Clock> Drop for DisconnectGuard<C, K> {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            state.relay.lock().await.disconnect(conn_id);
            tracing::info!(%conn_id, "connection closed");
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C, K>(
    incoming: PendingWebSocket,
    state: Arc<ServerState<C, K>>,
) -> Result<(), RoomcastError>
where
    C: Codec,
    K: Clock,
{
    let conn = incoming.establish().await?;
    let conn_id = conn.id();
    let conn = Arc::new(conn);
    tracing::info!(%conn_id, peer = %conn.peer_addr(), "connection opened");

    // Register the outbound queue before anything can be routed to it.
    let (tx, rx) = mpsc::channel(DEFAULT_QUEUE_CAPACITY);
    state.relay.lock().await.connect(conn_id, tx);
    let _guard = DisconnectGuard {
        conn_id,
        state: Arc::clone(&state),
    };

    tokio::spawn(write_loop(Arc::clone(&conn), Arc::clone(&state), rx));

    loop {
        let received = match state.config.idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, conn.recv()).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::info!(%conn_id, "connection idle, closing");
                    break;
                }
            },
            None => conn.recv().await,
        };

        let data = match received {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let event: ClientEvent = match state.codec.decode(&data) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode event");
                continue;
            }
        };

        let result = state.relay.lock().await.handle(conn_id, Inbound::from(event));
        if let Err(e) = result {
            tracing::debug!(%conn_id, error = %e, "event rejected");
        }
    }

    if let Err(e) = conn.close().await {
        tracing::trace!(%conn_id, error = %e, "close after read loop");
    }

    // _guard drops here → relay disconnect fires.
    Ok(())
}

/// Drains a connection's outbound queue onto the socket.
///
/// Ends when the relay drops the queue's sender (disconnect) or the
/// socket refuses a write.
async fn write_loop<C, K>(
    conn: Arc<WebSocketConnection>,
    state: Arc<ServerState<C, K>>,
    mut rx: mpsc::Receiver<ServerEvent>,
) where
    C: Codec,
    K: Clock,
{
    let conn_id = conn.id();
    while let Some(event) = rx.recv().await {
        let bytes = match state.codec.encode(&event) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "failed to encode event");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%conn_id, error = %e, "send failed, stopping writer");
            break;
        }
    }
}
