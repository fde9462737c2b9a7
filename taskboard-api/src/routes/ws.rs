/// Live-update WebSocket endpoint
///
/// Admission authenticates with the same session credential as the HTTP
/// API, passed as a `token` query parameter because browser WebSocket
/// clients cannot set an Authorization header. A missing or invalid
/// token still completes the upgrade, then closes immediately with
/// policy code 1008 so clients can distinguish auth failure from
/// network failure.
///
/// Once admitted, the connection is registered under the user's ID and
/// receives every board event until it closes. A newer connection for
/// the same user supersedes this one; the superseded socket's command
/// channel drops, its pump ends, and the socket closes.

use crate::app::AppState;
use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use taskboard_shared::auth::jwt::validate_token;
use taskboard_shared::realtime::registry::{ClientHandle, SocketCommand};
use tracing::{debug, info, warn};

/// Policy-violation close code (RFC 6455)
const CLOSE_POLICY: u16 = 1008;

/// Query parameters for GET /ws
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Session credential
    pub token: Option<String>,
}

/// GET /ws?token=...
///
/// Upgrades to a WebSocket. Authentication happens before any events
/// flow; unauthenticated sockets are closed right after the handshake.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let token = match query.token {
        Some(token) => token,
        None => {
            return ws.on_upgrade(|socket| close_with_policy(socket, "Token required"));
        }
    };

    let claims = match validate_token(&token, state.jwt_secret()) {
        Ok(claims) => claims,
        Err(err) => {
            debug!(error = %err, "WebSocket admission rejected");
            return ws.on_upgrade(|socket| close_with_policy(socket, "Invalid token"));
        }
    };

    ws.on_upgrade(move |socket| handle_socket(state, claims.sub, socket))
}

/// Completes the handshake, then closes with code 1008
async fn close_with_policy(mut socket: WebSocket, reason: &'static str) {
    let frame = CloseFrame {
        code: CLOSE_POLICY,
        reason: reason.into(),
    };

    if let Err(err) = socket.send(Message::Close(Some(frame))).await {
        debug!(error = %err, "Failed to send policy close frame");
    }
}

/// Drives one admitted connection until either side goes away
async fn handle_socket(state: AppState, user_id: i64, socket: WebSocket) {
    let (mut sink, mut stream) = socket.split();

    let (handle, mut commands) = ClientHandle::new();
    let connection_id = handle.connection_id();

    // Registering drops any previous handle for this user. Its socket
    // task sees the command channel close and shuts the old socket.
    if state.registry.admit(user_id, handle).await.is_some() {
        info!(user_id, "Superseded previous connection for user");
    }

    info!(user_id, %connection_id, "WebSocket connected");

    // Pump: registry commands become outbound frames.
    let mut send_task = tokio::spawn(async move {
        while let Some(command) = commands.recv().await {
            let message = match command {
                SocketCommand::Event(payload) => Message::Text(payload),
                SocketCommand::Ping => Message::Ping(Vec::new()),
            };

            if sink.send(message).await.is_err() {
                break;
            }
        }

        // Channel closed (superseded) or send failed: say goodbye.
        let _ = sink.send(Message::Close(None)).await;
    });

    // Reader: inbound frames are only consumed for liveness and close.
    let mut recv_task = tokio::spawn(async move {
        while let Some(message) = stream.next().await {
            match message {
                Ok(Message::Close(_)) | Err(_) => break,
                // Pongs and stray client frames carry no meaning here.
                Ok(_) => {}
            }
        }
    });

    tokio::select! {
        result = &mut send_task => {
            if let Err(err) = result {
                warn!(user_id, error = %err, "Socket send task failed");
            }
            recv_task.abort();
        }
        result = &mut recv_task => {
            if let Err(err) = result {
                warn!(user_id, error = %err, "Socket receive task failed");
            }
            send_task.abort();
        }
    }

    // Guarded by connection ID: if a newer socket superseded this one,
    // its registry entry stays.
    state.registry.remove(user_id, connection_id).await;
    info!(user_id, %connection_id, "WebSocket disconnected");
}
