//! Error types for Graphweld Core

use thiserror::Error;

/// Result type alias using the Graphweld Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the Graphweld bundle
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors from configuration or cache files
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Build-time configuration errors (missing collaborators, unknown
    /// classes referenced by tags, malformed config files)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Service registry errors (unknown service ids, mutation of a frozen
    /// registry)
    #[error("Registry error: {0}")]
    Registry(String),

    /// The security subsystem is not wired into the application at all.
    /// Distinct from "no user is logged in", which is not an error.
    #[error("Security error: {0}")]
    Security(String),

    /// A login attempt failed (unknown user, wrong password)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Wiring/integration bugs, e.g. asking a context that carries no
    /// request for the request object
    #[error("Integration error: {0}")]
    Integration(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a registry error
    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry(msg.into())
    }

    /// Create a security error
    pub fn security(msg: impl Into<String>) -> Self {
        Self::Security(msg.into())
    }

    /// Create an authentication error
    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create an integration error
    pub fn integration(msg: impl Into<String>) -> Self {
        Self::Integration(msg.into())
    }
}
