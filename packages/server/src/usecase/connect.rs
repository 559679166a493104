//! UseCase: connection handshake.
//!
//! Resolves the optional token to an identity and places the fresh
//! connection into its initial rooms. An invalid or missing token
//! downgrades to anonymous rather than rejecting the connection.

use std::sync::Arc;

use renraku_shared::time::Clock;
use renraku_shared::types::Identity;

use crate::auth::TokenVerifier;
use crate::domain::{initial_rooms, ConnectionId, PusherChannel, RoomPusher};

pub struct ConnectUseCase {
    verifier: Arc<dyn TokenVerifier>,
    pusher: Arc<dyn RoomPusher>,
    clock: Arc<dyn Clock>,
}

impl ConnectUseCase {
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        pusher: Arc<dyn RoomPusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            verifier,
            pusher,
            clock,
        }
    }

    /// Execute the handshake. Infallible by design: the worst outcome
    /// is an anonymous connection in the `general` room.
    pub async fn execute(
        &self,
        token: Option<&str>,
        sender: PusherChannel,
    ) -> (ConnectionId, Identity) {
        let identity = match token {
            Some(token) => match self.verifier.verify(token) {
                Some(identity) => identity,
                None => {
                    tracing::warn!("Invalid token presented; downgrading to anonymous");
                    Identity::Anonymous
                }
            },
            None => Identity::Anonymous,
        };

        let connection_id = ConnectionId::generate();
        self.pusher
            .register_connection(connection_id.clone(), sender, self.clock.now_millis())
            .await;

        for room in initial_rooms(&identity) {
            // The connection was registered a moment ago, so a join
            // failure here means it raced its own disconnect; log and
            // carry on.
            if let Err(e) = self.pusher.join_room(&connection_id, room.clone()).await {
                tracing::warn!("Initial join of {} failed: {}", room, e);
            }
        }

        tracing::info!(
            "Connection '{}' established as {:?}",
            connection_id,
            identity
        );
        (connection_id, identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenVerifier;
    use crate::domain::test_support::RecordingPusher;
    use renraku_shared::time::FixedClock;
    use renraku_shared::types::{RoomId, UserId};
    use tokio::sync::mpsc;

    fn usecase_with_pusher() -> (ConnectUseCase, Arc<RecordingPusher>) {
        let pusher = Arc::new(RecordingPusher::default());
        let usecase = ConnectUseCase::new(
            Arc::new(StaticTokenVerifier),
            pusher.clone(),
            Arc::new(FixedClock::new(1000)),
        );
        (usecase, pusher)
    }

    #[tokio::test]
    async fn test_connect_with_valid_customer_token() {
        // given:
        let (usecase, pusher) = usecase_with_pusher();
        let (tx, _rx) = mpsc::unbounded_channel();

        // when:
        let (_, identity) = usecase.execute(Some("customer:alice"), tx).await;

        // then: personal room joined
        assert_eq!(
            identity,
            Identity::User {
                user_id: UserId::new("alice"),
                role: renraku_shared::types::Role::Customer,
            }
        );
        assert_eq!(
            pusher.joined_rooms(),
            vec![RoomId::User(UserId::new("alice"))]
        );
    }

    #[tokio::test]
    async fn test_connect_with_admin_token_joins_admin_room() {
        // given:
        let (usecase, pusher) = usecase_with_pusher();
        let (tx, _rx) = mpsc::unbounded_channel();

        // when:
        let (_, identity) = usecase.execute(Some("admin:carol"), tx).await;

        // then:
        assert!(identity.is_admin());
        assert_eq!(
            pusher.joined_rooms(),
            vec![RoomId::User(UserId::new("carol")), RoomId::Admin]
        );
    }

    #[tokio::test]
    async fn test_connect_with_invalid_token_downgrades_to_anonymous() {
        // given:
        let (usecase, pusher) = usecase_with_pusher();
        let (tx, _rx) = mpsc::unbounded_channel();

        // when: a garbage token must not reject the connection
        let (_, identity) = usecase.execute(Some("not-a-token"), tx).await;

        // then:
        assert_eq!(identity, Identity::Anonymous);
        assert_eq!(pusher.joined_rooms(), vec![RoomId::General]);
    }

    #[tokio::test]
    async fn test_connect_without_token_is_anonymous() {
        // given:
        let (usecase, pusher) = usecase_with_pusher();
        let (tx, _rx) = mpsc::unbounded_channel();

        // when:
        let (_, identity) = usecase.execute(None, tx).await;

        // then:
        assert_eq!(identity, Identity::Anonymous);
        assert_eq!(pusher.joined_rooms(), vec![RoomId::General]);
    }
}
