//! WebSocket connection handler.
//!
//! One upgraded socket is split into a pusher loop (frames queued by
//! the registry drain into the sink) and a receive loop (inbound
//! frames dispatch to usecases). Handlers of one connection run to
//! completion in order; different connections interleave freely.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use renraku_shared::protocol::{ClientEvent, ServerEvent, WireErrorKind};
use renraku_shared::types::Identity;

use crate::domain::ConnectionId;
use crate::usecase::{JoinOrderRoomError, MarkReadError, SendMessageError};

use super::super::state::AppState;

/// Query parameters for the WebSocket upgrade.
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    /// Optional auth token; absent or invalid means anonymous.
    pub token: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> impl IntoResponse {
    // The upgrade itself is never rejected for auth reasons; a bad
    // token downgrades to anonymous inside the connect usecase.
    ws.on_upgrade(move |socket| handle_socket(socket, state, query.token))
}

/// Drains frames queued for this connection into the WebSocket sink.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, token: Option<String>) {
    let (ws_sender, mut ws_receiver) = socket.split();

    let (tx, rx) = mpsc::unbounded_channel();
    let (connection_id, identity) = state.connect_usecase.execute(token.as_deref(), tx).await;

    let mut send_task = pusher_loop(rx, ws_sender);

    // Echo the resolved identity so the client knows whether it was
    // downgraded.
    push_event(
        &state,
        &connection_id,
        &ServerEvent::Connected {
            identity: identity.clone(),
        },
    )
    .await;

    let recv_state = state.clone();
    let recv_connection_id = connection_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(frame) = ws_receiver.next().await {
            let frame = match frame {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::debug!("WebSocket error on '{}': {}", recv_connection_id, e);
                    break;
                }
            };

            // Any inbound traffic counts as liveness.
            let now = recv_state.clock.now_millis();
            recv_state.pusher.touch(&recv_connection_id, now).await;

            match frame {
                Message::Text(text) => {
                    dispatch_event(&recv_state, &recv_connection_id, &identity, &text).await;
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", recv_connection_id);
                    break;
                }
                // Protocol-level ping/pong is handled by axum itself.
                _ => {}
            }
        }
    });

    // Whichever side finishes first tears the other down.
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state.disconnect_usecase.execute(&connection_id).await;
}

async fn dispatch_event(
    state: &Arc<AppState>,
    connection_id: &ConnectionId,
    identity: &Identity,
    raw: &str,
) {
    let event = match serde_json::from_str::<ClientEvent>(raw) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Unparseable frame from '{}': {}", connection_id, e);
            push_event(
                state,
                connection_id,
                &ServerEvent::Error {
                    kind: WireErrorKind::Transport,
                    detail: "unrecognized event".to_string(),
                    temp_id: None,
                },
            )
            .await;
            return;
        }
    };

    match event {
        ClientEvent::JoinOrderRoom { order_id } => {
            match state
                .join_order_room_usecase
                .execute(connection_id, identity, order_id.clone())
                .await
            {
                Ok(outcome) => {
                    push_event(
                        state,
                        connection_id,
                        &ServerEvent::RoomSnapshot {
                            order_id: order_id.clone(),
                            messages: outcome.messages,
                        },
                    )
                    .await;
                    if let Some(e) = outcome.snapshot_error {
                        push_event(
                            state,
                            connection_id,
                            &ServerEvent::Error {
                                kind: WireErrorKind::Store,
                                detail: e.to_string(),
                                temp_id: None,
                            },
                        )
                        .await;
                    }
                }
                Err(e) => {
                    let kind = match &e {
                        JoinOrderRoomError::Authorization(_) => WireErrorKind::Authorization,
                        JoinOrderRoomError::OrderNotFound(_) => WireErrorKind::NotFound,
                        _ => WireErrorKind::Store,
                    };
                    push_event(
                        state,
                        connection_id,
                        &ServerEvent::Error {
                            kind,
                            detail: e.to_string(),
                            temp_id: None,
                        },
                    )
                    .await;
                }
            }
        }
        ClientEvent::LeaveOrderRoom { order_id } => {
            state
                .pusher
                .leave_room(
                    connection_id,
                    &renraku_shared::types::RoomId::Order(order_id),
                )
                .await;
        }
        ClientEvent::SendMessage {
            order_id,
            body,
            kind,
            temp_id,
        } => {
            match state
                .send_message_usecase
                .execute(identity, order_id, body, kind)
                .await
            {
                Ok(message) => {
                    // Acknowledge directly to the sender so its
                    // optimistic entry reconciles even if it has not
                    // joined the order room.
                    push_event(
                        state,
                        connection_id,
                        &ServerEvent::MessageAck { temp_id, message },
                    )
                    .await;
                }
                Err(e) => {
                    let kind = match &e {
                        SendMessageError::Authorization(_) => WireErrorKind::Authorization,
                        SendMessageError::OrderNotFound(_) => WireErrorKind::NotFound,
                        SendMessageError::Store(_) => WireErrorKind::Store,
                    };
                    push_event(
                        state,
                        connection_id,
                        &ServerEvent::Error {
                            kind,
                            detail: e.to_string(),
                            temp_id: Some(temp_id),
                        },
                    )
                    .await;
                }
            }
        }
        ClientEvent::MarkMessagesRead { order_id } => {
            if let Err(e) = state
                .mark_read_usecase
                .execute(identity, order_id)
                .await
            {
                let kind = match &e {
                    MarkReadError::Authorization(_) => WireErrorKind::Authorization,
                    MarkReadError::OrderNotFound(_) => WireErrorKind::NotFound,
                    MarkReadError::Store(_) => WireErrorKind::Store,
                };
                push_event(
                    state,
                    connection_id,
                    &ServerEvent::Error {
                        kind,
                        detail: e.to_string(),
                        temp_id: None,
                    },
                )
                .await;
            }
        }
        ClientEvent::Ping => {
            push_event(state, connection_id, &ServerEvent::Pong).await;
        }
    }
}

async fn push_event(state: &Arc<AppState>, connection_id: &ConnectionId, event: &ServerEvent) {
    let frame = match serde_json::to_string(event) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::error!("Failed to serialize event: {}", e);
            return;
        }
    };
    if let Err(e) = state.pusher.push_to_connection(connection_id, &frame).await {
        tracing::debug!("Push to '{}' failed: {}", connection_id, e);
    }
}
