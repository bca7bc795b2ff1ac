//! Security integration
//!
//! The bundle does not implement authentication itself; it adapts the host
//! application's security services behind narrow traits. The two services in
//! this module answer the only two questions GraphQL execution ever asks:
//! "who is logged in?" and "is this user allowed to do that?".
//!
//! Both services distinguish an *unconfigured* security subsystem (a fatal
//! wiring error when an operation actually needs it) from the ordinary
//! anonymous state, and fail closed whenever the answer cannot be computed.

pub mod password;
pub mod token;

use std::sync::Arc;

use async_graphql::SimpleObject;
use uuid::Uuid;

use crate::error::{Error, Result};

pub use password::Argon2PasswordHasher;
pub use token::{InMemorySessionFactory, InMemoryTokenStorage};

/// An authenticated application user exposed as a GraphQL type.
#[derive(Debug, Clone, PartialEq, Eq, SimpleObject)]
pub struct User {
    /// Unique login name
    pub username: String,
    /// Granted roles, e.g. `ROLE_USER`
    pub roles: Vec<String>,
}

impl User {
    pub fn new(username: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            username: username.into(),
            roles,
        }
    }
}

/// Proof of a completed authentication, bound to a user.
#[derive(Debug, Clone)]
pub struct AuthToken {
    /// Token identity
    pub id: Uuid,
    /// The authenticated user
    pub user: Arc<User>,
}

impl AuthToken {
    pub fn new(user: Arc<User>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user,
        }
    }
}

/// Storage for the authentication token of the current session.
pub trait TokenStorage: Send + Sync {
    /// The currently stored token, if any.
    fn token(&self) -> Option<AuthToken>;

    /// Replace the stored token. `None` clears it, logging the user out.
    fn set_token(&self, token: Option<AuthToken>);
}

/// Decides whether a user holds a given right.
pub trait AuthorizationChecker: Send + Sync {
    /// Whether `user` is granted `right`, optionally scoped to a subject.
    fn is_granted(&self, user: &User, right: &str, subject: Option<&str>) -> bool;
}

/// Loads users and their password hashes from the application's user store.
pub trait UserProvider: Send + Sync {
    /// Look up a user by login name; `None` when the user does not exist.
    fn load_user(&self, username: &str) -> Option<(Arc<User>, String)>;
}

/// Hashes and verifies user passwords.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password for storage.
    fn hash(&self, password: &str) -> Result<String>;

    /// Verify a plaintext password against a stored hash.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Creates server-side sessions for freshly authenticated users.
pub trait SessionFactory: Send + Sync {
    /// Open a new session and return its identifier.
    fn create_session(&self) -> Uuid;
}

/// Role-membership authorization: a right is granted iff it appears in the
/// user's role list. Subjects are not consulted.
#[derive(Debug, Default)]
pub struct RoleChecker;

impl AuthorizationChecker for RoleChecker {
    fn is_granted(&self, user: &User, right: &str, _subject: Option<&str>) -> bool {
        user.roles.iter().any(|role| role == right)
    }
}

/// Answers "who is logged in?" on top of an optional token storage.
///
/// When the host application has no token storage wired at all, every query
/// is a fatal security error rather than a silent "nobody": the distinction
/// matters because an unconfigured subsystem is a deployment bug, while an
/// anonymous visitor is business as usual.
pub struct AuthenticationService {
    token_storage: Option<Arc<dyn TokenStorage>>,
}

impl AuthenticationService {
    pub fn new(token_storage: Option<Arc<dyn TokenStorage>>) -> Self {
        Self { token_storage }
    }

    /// The currently authenticated user, or `None` for anonymous visitors.
    pub fn current_user(&self) -> Result<Option<Arc<User>>> {
        let storage = self.storage()?;
        Ok(storage.token().map(|token| token.user))
    }

    /// Whether a user is currently logged in.
    pub fn is_logged(&self) -> Result<bool> {
        let storage = self.storage()?;
        Ok(storage.token().is_some())
    }

    fn storage(&self) -> Result<&Arc<dyn TokenStorage>> {
        self.token_storage.as_ref().ok_or_else(|| {
            Error::security(
                "The security subsystem is not configured. Wire a token storage \
                 service to use authentication-aware resolvers.",
            )
        })
    }
}

/// Answers "is the current user allowed?" on top of the authentication state.
///
/// An unconfigured subsystem (no checker or no token storage wired) is a
/// fatal security error, like in [`AuthenticationService`]. Once configured
/// the service fails closed: anonymous visitors are denied every right.
pub struct AuthorizationService {
    checker: Option<Arc<dyn AuthorizationChecker>>,
    token_storage: Option<Arc<dyn TokenStorage>>,
}

impl AuthorizationService {
    pub fn new(
        checker: Option<Arc<dyn AuthorizationChecker>>,
        token_storage: Option<Arc<dyn TokenStorage>>,
    ) -> Self {
        Self {
            checker,
            token_storage,
        }
    }

    /// Whether the currently authenticated user holds `right`.
    pub fn is_allowed(&self, right: &str, subject: Option<&str>) -> Result<bool> {
        let (checker, storage) = self.collaborators()?;
        Ok(match storage.token() {
            Some(token) => checker.is_granted(&token.user, right, subject),
            None => false,
        })
    }

    fn collaborators(&self) -> Result<(&Arc<dyn AuthorizationChecker>, &Arc<dyn TokenStorage>)> {
        match (&self.checker, &self.token_storage) {
            (Some(checker), Some(storage)) => Ok((checker, storage)),
            _ => Err(Error::security(
                "The security subsystem is not configured. Wire an authorization \
                 checker and a token storage service to use authorization-aware \
                 resolvers.",
            )),
        }
    }
}
