//! Login and logout mutations

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::security::{AuthToken, PasswordHasher, SessionFactory, TokenStorage, User, UserProvider};

/// Controller backing the `login` and `logout` mutations.
///
/// Registered by the wiring pass only when the login toggle resolves to
/// enabled, so the collaborators are mandatory here rather than optional.
pub struct LoginController {
    user_provider: Arc<dyn UserProvider>,
    password_hasher: Arc<dyn PasswordHasher>,
    token_storage: Arc<dyn TokenStorage>,
    session_factory: Arc<dyn SessionFactory>,
}

impl LoginController {
    pub fn new(
        user_provider: Arc<dyn UserProvider>,
        password_hasher: Arc<dyn PasswordHasher>,
        token_storage: Arc<dyn TokenStorage>,
        session_factory: Arc<dyn SessionFactory>,
    ) -> Self {
        Self {
            user_provider,
            password_hasher,
            token_storage,
            session_factory,
        }
    }

    /// Authenticate and open a session for `user_name`.
    ///
    /// Unknown users and wrong passwords both produce the same
    /// authentication error, so the response does not reveal which logins
    /// exist.
    pub fn login(&self, user_name: &str, password: &str) -> Result<Arc<User>> {
        let Some((user, stored_hash)) = self.user_provider.load_user(user_name) else {
            tracing::debug!(user = user_name, "Login attempt for unknown user");
            return Err(Error::authentication("Invalid username or password"));
        };

        if !self.password_hasher.verify(password, &stored_hash) {
            tracing::debug!(user = user_name, "Login attempt with wrong password");
            return Err(Error::authentication("Invalid username or password"));
        }

        // The token identity is the freshly opened session
        let token = AuthToken {
            id: self.session_factory.create_session(),
            user: Arc::clone(&user),
        };
        self.token_storage.set_token(Some(token));
        tracing::info!(user = user_name, "User logged in");
        Ok(user)
    }

    /// Close the current session. Always succeeds, even when nobody was
    /// logged in.
    pub fn logout(&self) -> bool {
        self.token_storage.set_token(None);
        true
    }
}
