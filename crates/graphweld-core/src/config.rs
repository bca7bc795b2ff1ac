//! Bundle configuration
//!
//! The configuration surface mirrors what applications declare for the
//! bundle: the namespaces to scan for controllers and types, the security
//! toggles, the query-protection limits and the firewall name used to locate
//! collaborator services.

use serde::Deserialize;
use std::path::Path;

use crate::error::{Error, Result};

/// Tri-state toggle for the optional security features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureToggle {
    /// Enable the feature iff every required collaborator is present
    Auto,
    /// Enable the feature; missing collaborators abort the build
    On,
    /// Disable the feature unconditionally
    Off,
}

impl Default for FeatureToggle {
    fn default() -> Self {
        Self::Auto
    }
}

/// Application environment forwarded to the schema factory
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Environment {
    /// Aggressive schema caching
    Prod,
    /// Fast-iteration schema rebuilding
    Dev,
    /// Any other environment name; no mode is forwarded
    Other(String),
}

impl From<String> for Environment {
    fn from(value: String) -> Self {
        match value.as_str() {
            "prod" => Self::Prod,
            "dev" => Self::Dev,
            _ => Self::Other(value),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::Dev
    }
}

/// Namespaces scanned for annotated classes
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Namespaces {
    /// Namespaces containing resolver controllers
    pub controllers: Vec<String>,
    /// Namespaces containing GraphQL types and type extensions
    pub types: Vec<String>,
}

/// Security-related configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Toggle for the login/logout mutations
    pub enable_login: FeatureToggle,
    /// Toggle for the "me" query
    pub enable_me: FeatureToggle,
    /// Whether schema introspection is allowed
    pub introspection: bool,
    /// Maximum query complexity; 0 means unlimited
    pub maximum_query_complexity: u32,
    /// Maximum query depth; 0 means unlimited
    pub maximum_query_depth: u32,
    /// Firewall name used to locate the firewall config service
    pub firewall_name: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_login: FeatureToggle::Auto,
            enable_me: FeatureToggle::Auto,
            introspection: true,
            maximum_query_complexity: 0,
            maximum_query_depth: 0,
            firewall_name: "main".to_string(),
        }
    }
}

/// Bundle configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    /// Namespaces to scan
    pub namespaces: Namespaces,
    /// Security toggles and query-protection limits
    pub security: SecurityConfig,
    /// Application environment
    pub environment: Environment,
}

impl BundleConfig {
    /// Load configuration from a `graphweld.toml` file in the given directory.
    /// A missing file yields the defaults; a malformed file is a fatal
    /// configuration error.
    pub fn from_dir(config_dir: impl AsRef<Path>) -> Result<Self> {
        let config_path = config_dir.as_ref().join("graphweld.toml");

        if !config_path.exists() {
            tracing::debug!("Bundle config file not found: {:?}", config_path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config = toml::from_str::<Self>(&content).map_err(|e| {
            Error::config(format!(
                "Failed to parse bundle config file {:?}: {}",
                config_path, e
            ))
        })?;

        tracing::info!("Loaded bundle configuration from {:?}", config_path);
        Ok(config)
    }

    /// Apply environment-variable overrides.
    /// `GRAPHWELD_ENV` overrides the environment name.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(env) = std::env::var("GRAPHWELD_ENV") {
            self.environment = Environment::from(env);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = BundleConfig::default();
        assert_eq!(config.security.enable_login, FeatureToggle::Auto);
        assert_eq!(config.security.enable_me, FeatureToggle::Auto);
        assert!(config.security.introspection);
        assert_eq!(config.security.maximum_query_complexity, 0);
        assert_eq!(config.security.maximum_query_depth, 0);
        assert_eq!(config.security.firewall_name, "main");
        assert_eq!(config.environment, Environment::Dev);
        assert!(config.namespaces.controllers.is_empty());
        assert!(config.namespaces.types.is_empty());
    }

    #[test]
    fn test_config_from_toml() {
        let config: BundleConfig = toml::from_str(
            r#"
environment = "prod"

[namespaces]
controllers = ["demo::controllers"]
types = ["demo::types"]

[security]
enable_login = "on"
enable_me = "off"
introspection = false
maximum_query_complexity = 250
maximum_query_depth = 10
firewall_name = "api"
"#,
        )
        .unwrap();

        assert_eq!(config.environment, Environment::Prod);
        assert_eq!(config.namespaces.controllers, vec!["demo::controllers"]);
        assert_eq!(config.namespaces.types, vec!["demo::types"]);
        assert_eq!(config.security.enable_login, FeatureToggle::On);
        assert_eq!(config.security.enable_me, FeatureToggle::Off);
        assert!(!config.security.introspection);
        assert_eq!(config.security.maximum_query_complexity, 250);
        assert_eq!(config.security.maximum_query_depth, 10);
        assert_eq!(config.security.firewall_name, "api");
    }

    #[test]
    fn test_environment_from_string() {
        assert_eq!(Environment::from("prod".to_string()), Environment::Prod);
        assert_eq!(Environment::from("dev".to_string()), Environment::Dev);
        assert_eq!(
            Environment::from("staging".to_string()),
            Environment::Other("staging".to_string())
        );
    }

    #[test]
    fn test_config_from_dir_not_found() {
        let config = BundleConfig::from_dir("/nonexistent/path").unwrap();
        assert_eq!(config.security.firewall_name, "main");
    }

    #[test]
    fn test_config_from_dir_valid() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("graphweld.toml"),
            r#"
environment = "prod"

[security]
enable_me = "on"
"#,
        )
        .unwrap();

        let config = BundleConfig::from_dir(dir.path()).unwrap();
        assert_eq!(config.environment, Environment::Prod);
        assert_eq!(config.security.enable_me, FeatureToggle::On);
        // Untouched settings keep their defaults
        assert_eq!(config.security.enable_login, FeatureToggle::Auto);
    }

    #[test]
    fn test_config_from_dir_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("graphweld.toml"), "invalid toml [").unwrap();

        let err = BundleConfig::from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
