//! Service registry
//!
//! A build-time model of the application's dependency-injection container:
//! service definitions, aliases and tags. The wiring pass reads and rewrites
//! this registry before it is frozen and the application boots.

pub mod explorer;
pub mod metadata;
pub mod pass;

use std::collections::BTreeMap;

use crate::error::{Error, Result};

pub use explorer::{CachedExplorer, ClassExplorer, RegistryExplorer};
pub use metadata::{
    AutowireBinding, ClassMetadata, MetadataRegistry, MethodMetadata, ParameterMetadata,
    ResolverKind, TypeAnnotation,
};
pub use pass::{CapabilitySet, ExecutionMode, WiringPass};

/// Identifier of a registered service
pub type ServiceId = String;

/// Service id of the built-in login controller
pub const LOGIN_CONTROLLER: &str = "graphweld.login_controller";
/// Service id of the built-in "me" controller
pub const ME_CONTROLLER: &str = "graphweld.me_controller";
/// Service id of the aggregated controller list
pub const AGGREGATE_CONTROLLERS: &str = "graphweld.aggregate_controllers";
/// Service id of the cache backend alias
pub const CACHE_ALIAS: &str = "graphweld.cache";

/// Service id of the host application's session factory
pub const SESSION_FACTORY: &str = "session.factory";
/// Service id of the host application's password hasher
pub const PASSWORD_HASHER: &str = "security.password_hasher";
/// Service id of the host application's token storage
pub const TOKEN_STORAGE: &str = "security.token_storage";

/// Service id of the config service describing a named firewall.
pub fn firewall_config_id(firewall_name: &str) -> ServiceId {
    format!("security.firewall.map.config.{}", firewall_name)
}

/// A constructor argument of a service definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    /// Reference to another service
    Ref(ServiceId),
    /// Literal string value
    Str(String),
}

/// A tag attached to a service definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceTag {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
}

impl ServiceTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// A single service definition.
#[derive(Debug, Clone)]
pub struct ServiceDefinition {
    pub id: ServiceId,
    /// Fully qualified class path, e.g. `demo::types::Product`
    pub class: String,
    /// Whether the service can be fetched from the booted container
    pub public: bool,
    /// Abstract definitions are templates and are never instantiated
    pub abstract_: bool,
    pub arguments: Vec<Argument>,
    pub tags: Vec<ServiceTag>,
}

impl ServiceDefinition {
    pub fn new(id: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            class: class.into(),
            public: false,
            abstract_: false,
            arguments: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub fn public(mut self) -> Self {
        self.public = true;
        self
    }

    pub fn abstract_(mut self) -> Self {
        self.abstract_ = true;
        self
    }

    pub fn with_argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn with_tag(mut self, tag: ServiceTag) -> Self {
        self.tags.push(tag);
        self
    }

    /// The first constructor argument referencing another service, if any.
    pub fn first_service_ref(&self) -> Option<&ServiceId> {
        self.arguments.iter().find_map(|argument| match argument {
            Argument::Ref(id) => Some(id),
            Argument::Str(_) => None,
        })
    }
}

/// An alias pointing at a concrete service.
#[derive(Debug, Clone)]
pub struct AliasDefinition {
    pub target: ServiceId,
    pub public: bool,
}

/// The mutable container model processed by the wiring pass.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    definitions: BTreeMap<ServiceId, ServiceDefinition>,
    aliases: BTreeMap<ServiceId, AliasDefinition>,
    frozen: bool,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the bundle's own services: the two
    /// optional feature controllers, the aggregated controller list and the
    /// cache backends. The wiring pass removes what the configuration does
    /// not enable.
    pub fn with_bundle_services() -> Result<Self> {
        let mut registry = Self::new();
        for (id, class) in [
            (LOGIN_CONTROLLER, "graphweld::controllers::LoginController"),
            (ME_CONTROLLER, "graphweld::controllers::MeController"),
            (
                AGGREGATE_CONTROLLERS,
                "graphweld::schema::AggregateControllers",
            ),
            (
                crate::cache::SHARED_MEMORY_CACHE,
                "graphweld::cache::SharedMemoryCache",
            ),
            (crate::cache::FILE_CACHE, "graphweld::cache::FileCache"),
        ] {
            registry.register(ServiceDefinition::new(id, class))?;
        }
        Ok(registry)
    }

    /// Register a definition, replacing any previous definition with the
    /// same id.
    pub fn register(&mut self, definition: ServiceDefinition) -> Result<()> {
        self.ensure_mutable()?;
        self.definitions.insert(definition.id.clone(), definition);
        Ok(())
    }

    /// Remove a definition. Removing an unknown id is a no-op.
    pub fn remove(&mut self, id: &str) -> Result<()> {
        self.ensure_mutable()?;
        self.definitions.remove(id);
        Ok(())
    }

    /// Whether a definition or alias exists under `id`.
    pub fn has(&self, id: &str) -> bool {
        self.definitions.contains_key(id) || self.aliases.contains_key(id)
    }

    /// The definition registered under `id`, following one alias hop.
    pub fn definition(&self, id: &str) -> Option<&ServiceDefinition> {
        if let Some(definition) = self.definitions.get(id) {
            return Some(definition);
        }
        let alias = self.aliases.get(id)?;
        self.definitions.get(&alias.target)
    }

    pub fn definition_mut(&mut self, id: &str) -> Option<&mut ServiceDefinition> {
        let id = match self.aliases.get(id) {
            Some(alias) if !self.definitions.contains_key(id) => alias.target.clone(),
            _ => id.to_string(),
        };
        self.definitions.get_mut(&id)
    }

    /// Register an alias pointing at `target`.
    pub fn alias(&mut self, id: impl Into<String>, target: impl Into<String>) -> Result<()> {
        self.ensure_mutable()?;
        self.aliases.insert(
            id.into(),
            AliasDefinition {
                target: target.into(),
                public: false,
            },
        );
        Ok(())
    }

    /// Mark a definition or alias public so it can be fetched from the
    /// booted container. Unknown ids are an error.
    pub fn make_public(&mut self, id: &str) -> Result<()> {
        self.ensure_mutable()?;
        if let Some(definition) = self.definitions.get_mut(id) {
            definition.public = true;
            return Ok(());
        }
        if let Some(alias) = self.aliases.get_mut(id) {
            alias.public = true;
            return Ok(());
        }
        Err(Error::registry(format!(
            "Cannot make unknown service '{}' public",
            id
        )))
    }

    /// All non-abstract definitions carrying a tag named `tag_name`, in id
    /// order.
    pub fn find_tagged(&self, tag_name: &str) -> Vec<&ServiceDefinition> {
        self.definitions
            .values()
            .filter(|definition| !definition.abstract_)
            .filter(|definition| definition.tags.iter().any(|tag| tag.name == tag_name))
            .collect()
    }

    /// Iterate all definitions in id order.
    pub fn definitions(&self) -> impl Iterator<Item = &ServiceDefinition> {
        self.definitions.values()
    }

    /// Freeze the registry; every later mutation is an error.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    fn ensure_mutable(&self) -> Result<()> {
        if self.frozen {
            return Err(Error::registry(
                "The service registry is frozen and can no longer be modified",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ServiceRegistry::new();
        registry
            .register(ServiceDefinition::new("app.service", "app::Service"))
            .unwrap();

        assert!(registry.has("app.service"));
        assert_eq!(registry.definition("app.service").unwrap().class, "app::Service");
        assert!(registry.definition("app.other").is_none());
    }

    #[test]
    fn test_alias_resolution() {
        let mut registry = ServiceRegistry::new();
        registry
            .register(ServiceDefinition::new("app.cache.files", "app::FileCache"))
            .unwrap();
        registry.alias("app.cache", "app.cache.files").unwrap();

        assert!(registry.has("app.cache"));
        assert_eq!(
            registry.definition("app.cache").unwrap().class,
            "app::FileCache"
        );
    }

    #[test]
    fn test_make_public() {
        let mut registry = ServiceRegistry::new();
        registry
            .register(ServiceDefinition::new("app.service", "app::Service"))
            .unwrap();
        registry.alias("app.alias", "app.service").unwrap();

        registry.make_public("app.service").unwrap();
        registry.make_public("app.alias").unwrap();
        assert!(registry.definition("app.service").unwrap().public);

        let err = registry.make_public("app.missing").unwrap_err();
        assert!(matches!(err, Error::Registry(_)));
    }

    #[test]
    fn test_find_tagged_skips_abstract() {
        let mut registry = ServiceRegistry::new();
        registry
            .register(
                ServiceDefinition::new("app.b", "app::B")
                    .with_tag(ServiceTag::new("graphql.type")),
            )
            .unwrap();
        registry
            .register(
                ServiceDefinition::new("app.a", "app::A")
                    .with_tag(ServiceTag::new("graphql.type")),
            )
            .unwrap();
        registry
            .register(
                ServiceDefinition::new("app.template", "app::T")
                    .abstract_()
                    .with_tag(ServiceTag::new("graphql.type")),
            )
            .unwrap();

        let tagged = registry.find_tagged("graphql.type");
        let ids: Vec<_> = tagged.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["app.a", "app.b"]);
    }

    #[test]
    fn test_frozen_registry_rejects_mutation() {
        let mut registry = ServiceRegistry::new();
        registry
            .register(ServiceDefinition::new("app.service", "app::Service"))
            .unwrap();
        registry.freeze();

        assert!(registry
            .register(ServiceDefinition::new("app.other", "app::Other"))
            .is_err());
        assert!(registry.remove("app.service").is_err());
        assert!(registry.make_public("app.service").is_err());
        // Reads still work
        assert!(registry.has("app.service"));
    }

    #[test]
    fn test_first_service_ref() {
        let definition = ServiceDefinition::new("app.service", "app::Service")
            .with_argument(Argument::Str("main".to_string()))
            .with_argument(Argument::Ref("app.user_provider".to_string()))
            .with_argument(Argument::Ref("app.other".to_string()));

        assert_eq!(
            definition.first_service_ref().map(String::as_str),
            Some("app.user_provider")
        );
        assert!(ServiceDefinition::new("x", "y").first_service_ref().is_none());
    }
}
