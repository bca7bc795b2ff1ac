//! The `me` query

use std::sync::Arc;

use crate::error::Result;
use crate::security::{AuthenticationService, TokenStorage, User};

/// Controller backing the `me` query: returns the currently authenticated
/// user, or `None` for anonymous visitors.
pub struct MeController {
    authentication: AuthenticationService,
}

impl MeController {
    pub fn new(token_storage: Arc<dyn TokenStorage>) -> Self {
        Self {
            authentication: AuthenticationService::new(Some(token_storage)),
        }
    }

    pub fn me(&self) -> Result<Option<Arc<User>>> {
        self.authentication.current_user()
    }
}
