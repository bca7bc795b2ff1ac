//! In-memory token storage and session factory
//!
//! Reference implementations used by the demo server and the test suite.
//! Production applications adapt their own session layer behind the same
//! traits.

use parking_lot::RwLock;
use uuid::Uuid;

use super::{AuthToken, SessionFactory, TokenStorage};

/// Token storage holding a single token slot in memory.
#[derive(Debug, Default)]
pub struct InMemoryTokenStorage {
    slot: RwLock<Option<AuthToken>>,
}

impl TokenStorage for InMemoryTokenStorage {
    fn token(&self) -> Option<AuthToken> {
        self.slot.read().clone()
    }

    fn set_token(&self, token: Option<AuthToken>) {
        *self.slot.write() = token;
    }
}

/// Session factory that mints fresh session identifiers.
#[derive(Debug, Default)]
pub struct InMemorySessionFactory;

impl SessionFactory for InMemorySessionFactory {
    fn create_session(&self) -> Uuid {
        Uuid::new_v4()
    }
}
