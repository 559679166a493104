//! HTTP API endpoint handlers.
//!
//! `GET /api/orders/{id}/messages` is the poll fallback clients use
//! while their live transport is down; the POST endpoints are the
//! boundary the (out-of-scope) order/payment collaborators call.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use renraku_shared::types::{
    Identity, Message, Notification, NotificationKind, NotificationTarget, OrderId,
};

use crate::usecase::{ListMessagesError, UpdateOrderStatusError};

use super::super::state::AppState;

const DEFAULT_POLL_LIMIT: usize = 50;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
pub struct AuthQuery {
    pub token: Option<String>,
    pub limit: Option<usize>,
    pub since_id: Option<String>,
}

fn resolve_identity(state: &AppState, token: Option<&str>) -> Identity {
    token
        .and_then(|t| state.verifier.verify(t))
        .unwrap_or(Identity::Anonymous)
}

/// Poll path: authorized message listing for one order.
pub async fn list_order_messages(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
    Query(query): Query<AuthQuery>,
) -> Result<Json<Vec<Message>>, StatusCode> {
    let identity = resolve_identity(&state, query.token.as_deref());
    let limit = query.limit.unwrap_or(DEFAULT_POLL_LIMIT);

    match state
        .list_messages_usecase
        .execute(&identity, OrderId::new(order_id), limit, query.since_id)
        .await
    {
        Ok(messages) => Ok(Json(messages)),
        Err(ListMessagesError::Authorization(_)) => Err(StatusCode::FORBIDDEN),
        Err(ListMessagesError::OrderNotFound(_)) => Err(StatusCode::NOT_FOUND),
        Err(ListMessagesError::Store(_)) => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}

/// Notification feed for the authenticated identity.
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AuthQuery>,
) -> Result<Json<Vec<Notification>>, StatusCode> {
    let identity = resolve_identity(&state, query.token.as_deref());

    match state.list_notifications_usecase.execute(&identity).await {
        Ok(notifications) => Ok(Json(notifications)),
        Err(ListMessagesError::Authorization(_)) => Err(StatusCode::UNAUTHORIZED),
        Err(_) => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Admin-only order status change.
pub async fn update_order_status(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
    Query(query): Query<AuthQuery>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Notification>, StatusCode> {
    let identity = resolve_identity(&state, query.token.as_deref());

    match state
        .update_order_status_usecase
        .execute(&identity, OrderId::new(order_id), request.status)
        .await
    {
        Ok(notification) => Ok(Json(notification)),
        Err(UpdateOrderStatusError::Authorization) => Err(StatusCode::FORBIDDEN),
        Err(UpdateOrderStatusError::OrderNotFound(_)) => Err(StatusCode::NOT_FOUND),
        Err(UpdateOrderStatusError::Store(_)) => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}

#[derive(Debug, Deserialize)]
pub struct PublishNotificationRequest {
    pub kind: NotificationKind,
    pub target: NotificationTarget,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Boundary for the order/payment collaborators. The notification kind
/// is an explicit input: whether an order-created or payment-confirmed
/// notification fires is the caller's decision, never re-derived here.
pub async fn publish_notification(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AuthQuery>,
    Json(request): Json<PublishNotificationRequest>,
) -> Result<(StatusCode, Json<Notification>), StatusCode> {
    let identity = resolve_identity(&state, query.token.as_deref());
    if !identity.is_admin() {
        return Err(StatusCode::FORBIDDEN);
    }

    match state
        .publish_notification_usecase
        .execute(request.kind, request.target, request.payload)
        .await
    {
        Ok(notification) => Ok((StatusCode::CREATED, Json(notification))),
        Err(_) => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}

/// Debug endpoint: current room membership index.
pub async fn debug_rooms(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let snapshot = state.pusher.rooms_snapshot().await;
    let rooms: serde_json::Map<String, serde_json::Value> = snapshot
        .into_iter()
        .map(|(room, members)| {
            (
                room.to_string(),
                serde_json::json!(members
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<String>>()),
            )
        })
        .collect();
    Json(serde_json::Value::Object(rooms))
}
