//! The container wiring pass
//!
//! Runs exactly once per build, before the registry is frozen: resolves the
//! security feature toggles, assembles the validation rules, discovers
//! annotated classes and the services their resolvers inject, propagates
//! tagged extension points into the schema factory and selects the cache
//! backend.
//!
//! Annotated classes are registered in the service registry under their
//! class path, so a class path doubles as a service id during discovery.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::cache::{CacheBackend, SharedMemoryCache, select_backend};
use crate::config::{BundleConfig, Environment, FeatureToggle};
use crate::error::{Error, Result};
use crate::schema::{SchemaFactory, ServiceRef};
use crate::server::{RuleSource, ServerConfig, ValidationRule};

use super::explorer::ClassExplorer;
use super::metadata::{ClassMetadata, MetadataRegistry, MethodMetadata};
use super::{
    AGGREGATE_CONTROLLERS, CACHE_ALIAS, LOGIN_CONTROLLER, ME_CONTROLLER, PASSWORD_HASHER,
    SESSION_FACTORY, ServiceId, ServiceRegistry, TOKEN_STORAGE, firewall_config_id,
};

/// Tag marking query-provider services
pub const TAG_QUERY_PROVIDER: &str = "graphql.queryprovider";
/// Tag marking query-provider-factory services
pub const TAG_QUERY_PROVIDER_FACTORY: &str = "graphql.queryprovider_factory";
/// Tag marking root-type-mapper-factory services
pub const TAG_ROOT_TYPE_MAPPER_FACTORY: &str = "graphql.root_type_mapper_factory";
/// Tag marking parameter-middleware services
pub const TAG_PARAMETER_MIDDLEWARE: &str = "graphql.parameter_middleware";
/// Tag marking field-middleware services
pub const TAG_FIELD_MIDDLEWARE: &str = "graphql.field_middleware";
/// Tag marking type-mapper services
pub const TAG_TYPE_MAPPER: &str = "graphql.type_mapper";
/// Tag marking type-mapper-factory services
pub const TAG_TYPE_MAPPER_FACTORY: &str = "graphql.type_mapper_factory";
/// Tag marking custom output types
pub const TAG_OUTPUT_TYPE: &str = "graphql.output_type";

/// Class path of the built-in user type, exposed as a static class.
const USER_TYPE_CLASS: &str = "graphweld::security::User";

/// What kind of process the container is being built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Long-lived server process
    Server,
    /// Short-lived command-line process
    Cli {
        /// Whether the shared-memory cache is explicitly enabled for CLI
        /// processes
        shared_memory_enabled: bool,
    },
}

/// Presence of the collaborator services the security features need.
#[derive(Debug, Clone, Copy)]
pub struct CapabilitySet {
    pub session_factory: bool,
    pub password_hasher: bool,
    pub token_storage: bool,
    pub firewall_config: bool,
}

impl CapabilitySet {
    /// Probe the registry for the collaborators of the named firewall.
    pub fn probe(registry: &ServiceRegistry, firewall_name: &str) -> Self {
        Self {
            session_factory: registry.has(SESSION_FACTORY),
            password_hasher: registry.has(PASSWORD_HASHER),
            token_storage: registry.has(TOKEN_STORAGE),
            firewall_config: registry.has(&firewall_config_id(firewall_name)),
        }
    }

    fn all_login_collaborators(&self) -> bool {
        self.session_factory && self.password_hasher && self.token_storage && self.firewall_config
    }
}

/// Resolve the login toggle into a boolean.
///
/// `on` with a missing collaborator is a fatal configuration error with a
/// remediation hint; `auto` silently disables the feature instead.
pub fn resolve_login(toggle: FeatureToggle, caps: &CapabilitySet) -> Result<bool> {
    match toggle {
        FeatureToggle::Off => Ok(false),
        FeatureToggle::Auto => Ok(caps.all_login_collaborators()),
        FeatureToggle::On => {
            if !caps.session_factory {
                return Err(Error::config(
                    "In order to enable the login/logout mutations (via the \
                     security.enable_login setting), you need to enable session \
                     support in the host application.",
                ));
            }
            if !caps.password_hasher || !caps.token_storage || !caps.firewall_config {
                return Err(Error::config(
                    "In order to enable the login/logout mutations (via the \
                     security.enable_login setting), you need to configure the \
                     security services. Please make sure a password hasher, a \
                     token storage and the firewall configuration are registered.",
                ));
            }
            Ok(true)
        }
    }
}

/// Resolve the "me" toggle into a boolean. Only the token storage is needed.
pub fn resolve_me(toggle: FeatureToggle, has_token_storage: bool) -> Result<bool> {
    match toggle {
        FeatureToggle::Off => Ok(false),
        FeatureToggle::Auto => Ok(has_token_storage),
        FeatureToggle::On => {
            if !has_token_storage {
                return Err(Error::config(
                    "In order to enable the \"me\" query (via the \
                     security.enable_me setting), you need to configure the \
                     security services.",
                ));
            }
            Ok(true)
        }
    }
}

/// The build-time wiring pass.
pub struct WiringPass {
    explorer: Arc<dyn ClassExplorer>,
    metadata: Arc<MetadataRegistry>,
    mode: ExecutionMode,
    /// Cache for per-class analysis results, keyed by class path and
    /// namespace kind.
    analysis_cache: Arc<dyn CacheBackend>,
}

impl WiringPass {
    pub fn new(
        explorer: Arc<dyn ClassExplorer>,
        metadata: Arc<MetadataRegistry>,
        mode: ExecutionMode,
    ) -> Self {
        Self {
            explorer,
            metadata,
            mode,
            analysis_cache: Arc::new(SharedMemoryCache::new()),
        }
    }

    /// Replace the analysis cache, e.g. with a file backend for short-lived
    /// processes.
    pub fn with_analysis_cache(mut self, cache: Arc<dyn CacheBackend>) -> Self {
        self.analysis_cache = cache;
        self
    }

    /// Run the pass. Mutates the registry, the schema factory and the server
    /// configuration in place. Every failure is a fatal build error.
    pub fn process(
        &self,
        config: &BundleConfig,
        registry: &mut ServiceRegistry,
        factory: &mut dyn SchemaFactory,
        server_config: &mut ServerConfig,
    ) -> Result<()> {
        match &config.environment {
            Environment::Prod => factory.prod_mode(),
            Environment::Dev => factory.dev_mode(),
            Environment::Other(name) => {
                tracing::debug!(environment = name.as_str(), "No schema-factory mode forwarded");
            }
        }

        self.wire_login(config, registry, factory)?;
        self.wire_me(config, registry, factory)?;
        Self::assemble_rules(config, server_config);

        // Perf: drop the aggregated controller list when nothing registered
        if factory.controllers().is_empty() {
            registry.remove(AGGREGATE_CONTROLLERS)?;
        }

        factory.add_static_class(USER_TYPE_CLASS);

        self.publish_annotated_types(config, registry)?;

        for namespace in &config.namespaces.controllers {
            factory.add_controller_namespace(namespace);
            for class in self.explorer.classes_in(namespace) {
                self.make_public_injected_services(&class, registry, true)?;
            }
        }

        for namespace in &config.namespaces.types {
            factory.add_type_namespace(namespace);
            for class in self.explorer.classes_in(namespace) {
                self.make_public_injected_services(&class, registry, false)?;
            }
        }

        self.register_output_types(registry, factory)?;

        for (tag, add) in Self::tag_adders() {
            let services: Vec<ServiceRef> = registry
                .find_tagged(tag)
                .iter()
                .map(|definition| ServiceRef::new(definition.id.clone()))
                .collect();
            for service in services {
                add(factory, service);
            }
        }

        let choice = select_backend(SharedMemoryCache::is_supported(), self.mode);
        registry.alias(CACHE_ALIAS, choice.service_id())?;
        tracing::debug!(backend = choice.service_id(), "Selected cache backend");

        Ok(())
    }

    fn wire_login(
        &self,
        config: &BundleConfig,
        registry: &mut ServiceRegistry,
        factory: &mut dyn SchemaFactory,
    ) -> Result<()> {
        let caps = CapabilitySet::probe(registry, &config.security.firewall_name);
        let enabled = resolve_login(config.security.enable_login, &caps)?;

        if !enabled {
            registry.remove(LOGIN_CONTROLLER)?;
            return Ok(());
        }

        // The active user provider is referenced by the firewall's config
        // service; wire it into the login controller.
        let firewall_id = firewall_config_id(&config.security.firewall_name);
        let provider = registry
            .definition(&firewall_id)
            .and_then(|definition| definition.first_service_ref())
            .cloned()
            .ok_or_else(|| {
                Error::config(format!(
                    "The firewall configuration '{}' does not declare a user provider",
                    firewall_id
                ))
            })?;

        let login = registry.definition_mut(LOGIN_CONTROLLER).ok_or_else(|| {
            Error::registry(format!(
                "The login controller service '{}' is not registered",
                LOGIN_CONTROLLER
            ))
        })?;
        let provider_ref = super::Argument::Ref(provider);
        if login.arguments.is_empty() {
            login.arguments.push(provider_ref);
        } else {
            login.arguments[0] = provider_ref;
        }

        factory.register_controller(ServiceRef::new(LOGIN_CONTROLLER));
        Ok(())
    }

    fn wire_me(
        &self,
        config: &BundleConfig,
        registry: &mut ServiceRegistry,
        factory: &mut dyn SchemaFactory,
    ) -> Result<()> {
        let enabled = resolve_me(config.security.enable_me, registry.has(TOKEN_STORAGE))?;

        if enabled {
            factory.register_controller(ServiceRef::new(ME_CONTROLLER));
        } else {
            registry.remove(ME_CONTROLLER)?;
        }
        Ok(())
    }

    /// Translate the three protection flags into configured rules. The
    /// baseline set is contributed by the server configuration itself.
    fn assemble_rules(config: &BundleConfig, server_config: &mut ServerConfig) {
        let mut rules = Vec::new();
        if !config.security.introspection {
            rules.push(ValidationRule::DisableIntrospection);
        }
        if config.security.maximum_query_complexity > 0 {
            rules.push(ValidationRule::QueryComplexity(
                config.security.maximum_query_complexity,
            ));
        }
        if config.security.maximum_query_depth > 0 {
            rules.push(ValidationRule::QueryDepth(config.security.maximum_query_depth));
        }
        server_config.set_validation_rules(RuleSource::List(rules));
    }

    /// Make the services of annotated types publicly retrievable, so the
    /// execution library can fetch them from the booted container.
    fn publish_annotated_types(
        &self,
        config: &BundleConfig,
        registry: &mut ServiceRegistry,
    ) -> Result<()> {
        let mut to_publish: Vec<ServiceId> = Vec::new();

        for definition in registry.definitions() {
            if definition.abstract_ || definition.class.is_empty() {
                continue;
            }

            for namespace in &config.namespaces.types {
                let prefix = format!("{}::", namespace.trim_end_matches("::"));
                if !definition.class.starts_with(&prefix) {
                    continue;
                }
                let Some(class) = self.metadata.class(&definition.class) else {
                    continue;
                };

                // Self-types are inlined by the execution library and never
                // fetched as services.
                if class.is_self_type() {
                    continue;
                }

                if class.type_annotation.is_some() || class.extend_type {
                    to_publish.push(definition.id.clone());
                }

                // Factories are invoked from outside the normal resolution
                // graph and must stay reachable.
                if class
                    .methods
                    .iter()
                    .any(|method| method.public && method.factory)
                {
                    to_publish.push(definition.id.clone());
                }
            }
        }

        for id in to_publish {
            registry.make_public(&id)?;
        }
        Ok(())
    }

    /// Make the services a class's resolvers inject publicly retrievable.
    ///
    /// For controller namespaces the class itself is included, since the
    /// execution library instantiates controllers through the container.
    fn make_public_injected_services(
        &self,
        class: &Arc<ClassMetadata>,
        registry: &mut ServiceRegistry,
        is_controller: bool,
    ) -> Result<()> {
        let services = self.injected_services(class, registry, is_controller)?;
        for service in services.iter() {
            registry.make_public(service)?;
        }
        Ok(())
    }

    /// The injected-service set of one class, memoized in the analysis
    /// cache.
    fn injected_services(
        &self,
        class: &Arc<ClassMetadata>,
        registry: &ServiceRegistry,
        is_controller: bool,
    ) -> Result<Arc<BTreeSet<ServiceId>>> {
        let key = format!(
            "injected-services/{}#{}",
            class.class,
            if is_controller { "controller" } else { "type" }
        );
        if let Some(cached) = self.analysis_cache.get(&key) {
            return Ok(Arc::new(decode_service_set(&cached)));
        }

        let mut services = BTreeSet::new();
        for method in &class.methods {
            if !method.public || method.resolver.is_none() {
                continue;
            }

            if is_controller {
                services.insert(class.class.clone());
            }

            Self::collect_method_services(class, method, registry, &mut services)?;

            if let Some(prefetch_name) = &method.prefetch_method {
                let prefetch = class
                    .methods
                    .iter()
                    .find(|m| &m.name == prefetch_name)
                    .ok_or_else(|| {
                        Error::config(format!(
                            "In method {}::{}, the prefetch method refers to a non \
                             existing method named \"{}\"",
                            class.class, method.name, prefetch_name
                        ))
                    })?;
                Self::collect_method_services(class, prefetch, registry, &mut services)?;
            }
        }

        self.analysis_cache.set(&key, encode_service_set(&services));
        Ok(Arc::new(services))
    }

    /// Resolve one method's autowire bindings into service ids.
    fn collect_method_services(
        class: &ClassMetadata,
        method: &MethodMetadata,
        registry: &ServiceRegistry,
        services: &mut BTreeSet<ServiceId>,
    ) -> Result<()> {
        for binding in &method.autowire {
            let parameter = method.parameter(&binding.parameter).ok_or_else(|| {
                Error::config(format!(
                    "In method {}::{}, the autowire annotation refers to a non \
                     existing parameter named \"{}\"",
                    class.class, method.name, binding.parameter
                ))
            })?;

            if let Some(service_id) = &binding.service_id {
                services.insert(service_id.clone());
            } else if let Some(parameter_class) = &parameter.class {
                // Resolve by type, only when the type is itself a service
                if registry.has(parameter_class) {
                    services.insert(parameter_class.clone());
                }
            }
        }
        Ok(())
    }

    /// Register the custom output types: explicitly mapped types keyed by
    /// class, and not-yet-mapped types as a plain list.
    fn register_output_types(
        &self,
        registry: &ServiceRegistry,
        factory: &mut dyn SchemaFactory,
    ) -> Result<()> {
        let mut static_types: BTreeMap<String, ServiceRef> = BTreeMap::new();
        let mut not_mapped: Vec<ServiceRef> = Vec::new();

        for definition in registry.find_tagged(TAG_OUTPUT_TYPE) {
            for tag in definition.tags.iter().filter(|t| t.name == TAG_OUTPUT_TYPE) {
                match tag.attribute("class") {
                    Some(class) => {
                        if !self.metadata.class_exists(class) {
                            return Err(Error::config(format!(
                                "The class attribute of the {} tag of the {} service \
                                 must point to an existing class. Value passed: {}",
                                TAG_OUTPUT_TYPE, definition.id, class
                            )));
                        }
                        static_types
                            .insert(class.to_string(), ServiceRef::new(definition.id.clone()));
                    }
                    None => not_mapped.push(ServiceRef::new(definition.id.clone())),
                }
            }
        }

        if !static_types.is_empty() {
            factory.set_static_types(static_types);
        }
        if !not_mapped.is_empty() {
            factory.set_not_mapped_types(not_mapped);
        }
        Ok(())
    }

    /// The fixed tag-to-adder mapping for extension-point propagation.
    fn tag_adders() -> [(&'static str, fn(&mut dyn SchemaFactory, ServiceRef)); 7] {
        [
            (TAG_QUERY_PROVIDER, |f, s| f.add_query_provider(s)),
            (TAG_QUERY_PROVIDER_FACTORY, |f, s| {
                f.add_query_provider_factory(s)
            }),
            (TAG_ROOT_TYPE_MAPPER_FACTORY, |f, s| {
                f.add_root_type_mapper_factory(s)
            }),
            (TAG_PARAMETER_MIDDLEWARE, |f, s| {
                f.add_parameter_middleware(s)
            }),
            (TAG_FIELD_MIDDLEWARE, |f, s| f.add_field_middleware(s)),
            (TAG_TYPE_MAPPER, |f, s| f.add_type_mapper(s)),
            (TAG_TYPE_MAPPER_FACTORY, |f, s| f.add_type_mapper_factory(s)),
        ]
    }
}

/// Serialize a service-id set for the analysis cache, one id per line.
fn encode_service_set(services: &BTreeSet<ServiceId>) -> Vec<u8> {
    services
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
        .into_bytes()
}

fn decode_service_set(bytes: &[u8]) -> BTreeSet<ServiceId> {
    String::from_utf8_lossy(bytes)
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
