//! Usecase-level error types.
//!
//! Authorization and not-found failures are returned to the caller and
//! never retried; store failures either degrade (snapshot fetch) or
//! surface as a typed store error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum JoinOrderRoomError {
    #[error("not authorized to join order '{0}'")]
    Authorization(String),

    #[error("order '{0}' not found")]
    OrderNotFound(String),

    /// Ownership could not be checked, so the join cannot proceed.
    #[error("store unavailable while authorizing join: {0}")]
    Store(String),

    #[error("connection is not registered with the gateway")]
    UnknownConnection,
}

#[derive(Debug, Error)]
pub enum SendMessageError {
    #[error("not authorized to send to order '{0}'")]
    Authorization(String),

    #[error("order '{0}' not found")]
    OrderNotFound(String),

    #[error("store failure while persisting message: {0}")]
    Store(String),
}

#[derive(Debug, Error)]
pub enum MarkReadError {
    #[error("not authorized to mark order '{0}' as read")]
    Authorization(String),

    #[error("order '{0}' not found")]
    OrderNotFound(String),

    #[error("store failure while marking read: {0}")]
    Store(String),
}

#[derive(Debug, Error)]
pub enum PublishNotificationError {
    #[error("store failure while persisting notification: {0}")]
    Store(String),
}

#[derive(Debug, Error)]
pub enum ListMessagesError {
    #[error("not authorized to read order '{0}'")]
    Authorization(String),

    #[error("order '{0}' not found")]
    OrderNotFound(String),

    #[error("store failure while listing messages: {0}")]
    Store(String),
}

#[derive(Debug, Error)]
pub enum UpdateOrderStatusError {
    #[error("only admins may update order status")]
    Authorization,

    #[error("order '{0}' not found")]
    OrderNotFound(String),

    #[error("store failure while updating status: {0}")]
    Store(String),
}
