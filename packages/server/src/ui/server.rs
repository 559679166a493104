//! Server wiring and execution.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use renraku_shared::time::Clock;

use crate::auth::TokenVerifier;
use crate::domain::{MessageStore, RoomPusher};
use crate::router::RoomRouter;
use crate::usecase::{
    ConnectUseCase, DisconnectUseCase, JoinOrderRoomUseCase, ListMessagesUseCase,
    ListNotificationsUseCase, MarkReadUseCase, PublishNotificationUseCase, SendMessageUseCase,
    UpdateOrderStatusUseCase,
};

use super::handler::http::{
    debug_rooms, health_check, list_notifications, list_order_messages, publish_notification,
    update_order_status,
};
use super::handler::websocket::websocket_handler;
use super::signal::shutdown_signal;
use super::state::AppState;

/// The gateway server.
///
/// Wires the store, pusher, router, and verifier into the usecases and
/// exposes them over one axum router.
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(
        store: Arc<dyn MessageStore>,
        pusher: Arc<dyn RoomPusher>,
        verifier: Arc<dyn TokenVerifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let room_router = Arc::new(RoomRouter::new(pusher.clone()));

        let state = Arc::new(AppState {
            connect_usecase: Arc::new(ConnectUseCase::new(
                verifier.clone(),
                pusher.clone(),
                clock.clone(),
            )),
            disconnect_usecase: Arc::new(DisconnectUseCase::new(pusher.clone())),
            join_order_room_usecase: Arc::new(JoinOrderRoomUseCase::new(
                store.clone(),
                pusher.clone(),
            )),
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                store.clone(),
                room_router.clone(),
            )),
            mark_read_usecase: Arc::new(MarkReadUseCase::new(store.clone(), room_router.clone())),
            publish_notification_usecase: Arc::new(PublishNotificationUseCase::new(
                store.clone(),
                room_router.clone(),
            )),
            update_order_status_usecase: Arc::new(UpdateOrderStatusUseCase::new(
                store.clone(),
                room_router.clone(),
            )),
            list_messages_usecase: Arc::new(ListMessagesUseCase::new(store.clone())),
            list_notifications_usecase: Arc::new(ListNotificationsUseCase::new(store)),
            verifier,
            pusher,
            clock,
        });

        Self { state }
    }

    /// Build the axum router. Split out so tests can serve it on an
    /// ephemeral in-process listener.
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket endpoint
            .route("/ws", get(websocket_handler))
            // HTTP endpoints
            .route("/api/health", get(health_check))
            .route("/api/orders/{order_id}/messages", get(list_order_messages))
            .route("/api/orders/{order_id}/status", post(update_order_status))
            .route(
                "/api/notifications",
                get(list_notifications).post(publish_notification),
            )
            .route("/debug/rooms", get(debug_rooms))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the gateway until a shutdown signal arrives.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();

        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("Gateway listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
