//! Token verification boundary.
//!
//! Real session management lives outside this core. The gateway only
//! needs one question answered: "which identity does this token map
//! to?". A missing or unverifiable token is not a failure — the
//! connection is downgraded to anonymous.

use renraku_shared::types::{Identity, Role, UserId};

/// Verifies an opaque connection token.
pub trait TokenVerifier: Send + Sync {
    /// `Some(identity)` if the token is valid, `None` otherwise.
    fn verify(&self, token: &str) -> Option<Identity>;
}

/// Development verifier for tokens of the form `customer:<id>` or
/// `admin:<id>`. Stands in for the platform's session layer in local
/// runs and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticTokenVerifier;

impl TokenVerifier for StaticTokenVerifier {
    fn verify(&self, token: &str) -> Option<Identity> {
        let (role, user_id) = token.split_once(':')?;
        if user_id.is_empty() {
            return None;
        }
        let role = match role {
            "customer" => Role::Customer,
            "admin" => Role::Admin,
            _ => return None,
        };
        Some(Identity::User {
            user_id: UserId::new(user_id),
            role,
        })
    }
}
