//! Per-connection handler: decode frames and route them to rooms.
//!
//! Each accepted connection gets its own task running [`handle_connection`]
//! plus a writer task that drains the connection's outbound queue. Rooms
//! push into that queue, so a slow socket never blocks a room.

use std::sync::Arc;

use haven_protocol::{ClientMessage, Codec, ProtocolError, ServerMessage};
use haven_room::PlayerSender;
use haven_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc;

use crate::HavenError;
use crate::server::ServerState;

/// Drop guard that releases the connection's seat when the handler exits.
///
/// `Drop` is synchronous, so the async cleanup runs on a spawned task.
struct SeatGuard<C: Codec> {
    conn_id: ConnectionId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for SeatGuard<C> {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let mut rooms = state.rooms.lock().await;
            if let Some(code) = rooms.disconnect(conn_id).await {
                tracing::info!(%conn_id, %code, "seat released");
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), HavenError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    let writer = {
        let conn = Arc::clone(&conn);
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                if let Err(e) = write_frame(conn.as_ref(), &state.codec, &msg).await {
                    tracing::debug!(%conn_id, error = %e, "write failed");
                    break;
                }
            }
        })
    };

    let _guard = SeatGuard {
        conn_id,
        state: Arc::clone(&state),
    };

    loop {
        let data = match tokio::time::timeout(state.idle_timeout, conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::info!(%conn_id, "connection closed cleanly");
                break;
            }
            Ok(Err(e)) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
            Err(_) => {
                tracing::info!(%conn_id, "connection idle, closing");
                let _ = conn.close().await;
                break;
            }
        };

        let msg: ClientMessage = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode frame");
                let _ = tx.send(ServerMessage::error(format!("invalid message: {e}")));
                continue;
            }
        };

        dispatch(&state, conn_id, msg, &tx).await;
    }

    writer.abort();
    // _guard drops here → seat released, opponent notified.
    Ok(())
}

/// Routes one decoded frame. Room-level failures go back to the sender as
/// an `error` frame; gameplay failures are reported by the room itself.
async fn dispatch<C: Codec>(
    state: &ServerState<C>,
    conn_id: ConnectionId,
    msg: ClientMessage,
    tx: &PlayerSender,
) {
    let result = match msg {
        ClientMessage::CreateRoom { name } => state
            .rooms
            .lock()
            .await
            .create_room(conn_id, &name, tx.clone())
            .map(|_| ()),
        ClientMessage::JoinRoom { code, name } => state
            .rooms
            .lock()
            .await
            .join_room(conn_id, &code, &name, tx.clone())
            .await
            .map(|_| ()),
        other => state.rooms.lock().await.route(conn_id, other).await,
    };

    if let Err(e) = result {
        tracing::debug!(%conn_id, error = %e, "request rejected");
        let _ = tx.send(ServerMessage::error(e.to_string()));
    }
}

async fn write_frame<C: Codec>(
    conn: &WebSocketConnection,
    codec: &C,
    msg: &ServerMessage,
) -> Result<(), HavenError> {
    let bytes = codec.encode(msg)?;
    if codec.is_text() {
        let text =
            String::from_utf8(bytes).map_err(|e| ProtocolError::InvalidMessage(e.to_string()))?;
        conn.send_text(&text).await?;
    } else {
        conn.send(&bytes).await?;
    }
    Ok(())
}
