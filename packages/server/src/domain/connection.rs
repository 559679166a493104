//! Connection identity.

use std::fmt;

use uuid::Uuid;

/// Identifier of one live connection.
///
/// A user may hold any number of simultaneous connections (multiple
/// tabs, reconnects racing each other), so connections are keyed by a
/// generated id rather than by user id. Identity is fixed for the
/// connection's lifetime; room membership is not.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
