//! Application usecases.
//!
//! Each usecase is constructed once at startup with its collaborators
//! (store, pusher, router, verifier) behind `Arc`s, and invoked from
//! the UI layer's handlers.

mod connect;
mod disconnect;
mod error;
mod join_order_room;
mod list_messages;
mod list_notifications;
mod mark_read;
mod publish_notification;
mod send_message;
mod update_order_status;

pub use connect::ConnectUseCase;
pub use disconnect::DisconnectUseCase;
pub use error::{
    JoinOrderRoomError, ListMessagesError, MarkReadError, PublishNotificationError,
    SendMessageError, UpdateOrderStatusError,
};
pub use join_order_room::{JoinOrderRoomUseCase, JoinOutcome};
pub use list_messages::ListMessagesUseCase;
pub use list_notifications::ListNotificationsUseCase;
pub use mark_read::MarkReadUseCase;
pub use publish_notification::PublishNotificationUseCase;
pub use send_message::SendMessageUseCase;
pub use update_order_status::UpdateOrderStatusUseCase;
