//! Shared application state for the axum handlers.

use std::sync::Arc;

use renraku_shared::time::Clock;

use crate::auth::TokenVerifier;
use crate::domain::RoomPusher;
use crate::usecase::{
    ConnectUseCase, DisconnectUseCase, JoinOrderRoomUseCase, ListMessagesUseCase,
    ListNotificationsUseCase, MarkReadUseCase, PublishNotificationUseCase, SendMessageUseCase,
    UpdateOrderStatusUseCase,
};

/// Everything the handlers need, wired once at startup.
pub struct AppState {
    pub connect_usecase: Arc<ConnectUseCase>,
    pub disconnect_usecase: Arc<DisconnectUseCase>,
    pub join_order_room_usecase: Arc<JoinOrderRoomUseCase>,
    pub send_message_usecase: Arc<SendMessageUseCase>,
    pub mark_read_usecase: Arc<MarkReadUseCase>,
    pub publish_notification_usecase: Arc<PublishNotificationUseCase>,
    pub update_order_status_usecase: Arc<UpdateOrderStatusUseCase>,
    pub list_messages_usecase: Arc<ListMessagesUseCase>,
    pub list_notifications_usecase: Arc<ListNotificationsUseCase>,
    /// Token verification for the HTTP endpoints (the WebSocket path
    /// verifies during the handshake usecase).
    pub verifier: Arc<dyn TokenVerifier>,
    /// Registry access for liveness updates and diagnostics.
    pub pusher: Arc<dyn RoomPusher>,
    pub clock: Arc<dyn Clock>,
}
