//! Schema factory seam
//!
//! The wiring pass does not build a schema itself; it *configures* a schema
//! factory with everything it discovered: namespaces, controllers, mappers,
//! middlewares and type registrations. [`SchemaFactory`] is that seam, and
//! [`RecordingSchemaFactory`] is the plain implementation used by the demo
//! stack and the test suite.

use std::collections::BTreeMap;

use crate::registry::ServiceId;

/// A reference to a registered service, as recorded by the wiring pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRef(pub ServiceId);

impl ServiceRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Receives the wiring pass's discoveries.
pub trait SchemaFactory: Send {
    /// Cache the built schema aggressively.
    fn prod_mode(&mut self);
    /// Rebuild the schema eagerly for fast iteration.
    fn dev_mode(&mut self);

    /// Add a namespace to scan for resolver controllers.
    fn add_controller_namespace(&mut self, namespace: &str);
    /// Add a namespace to scan for GraphQL types.
    fn add_type_namespace(&mut self, namespace: &str);

    /// Register a controller service as a resolver source.
    fn register_controller(&mut self, service: ServiceRef);
    /// The controllers registered so far.
    fn controllers(&self) -> &[ServiceRef];

    fn add_query_provider(&mut self, service: ServiceRef);
    fn add_query_provider_factory(&mut self, service: ServiceRef);
    fn add_root_type_mapper_factory(&mut self, service: ServiceRef);
    fn add_parameter_middleware(&mut self, service: ServiceRef);
    fn add_field_middleware(&mut self, service: ServiceRef);
    fn add_type_mapper(&mut self, service: ServiceRef);
    fn add_type_mapper_factory(&mut self, service: ServiceRef);

    /// Expose a class with no resolver service of its own.
    fn add_static_class(&mut self, class: &str);

    /// Record the explicit GraphQL-name-to-service type registrations.
    fn set_static_types(&mut self, types: BTreeMap<String, ServiceRef>);
    /// Record the annotated type services mapped by class discovery.
    fn set_not_mapped_types(&mut self, types: Vec<ServiceRef>);
}

/// Schema factory that records every call into public fields.
#[derive(Debug, Default)]
pub struct RecordingSchemaFactory {
    pub prod_mode: bool,
    pub dev_mode: bool,
    pub controller_namespaces: Vec<String>,
    pub type_namespaces: Vec<String>,
    pub controllers: Vec<ServiceRef>,
    pub query_providers: Vec<ServiceRef>,
    pub query_provider_factories: Vec<ServiceRef>,
    pub root_type_mapper_factories: Vec<ServiceRef>,
    pub parameter_middlewares: Vec<ServiceRef>,
    pub field_middlewares: Vec<ServiceRef>,
    pub type_mappers: Vec<ServiceRef>,
    pub type_mapper_factories: Vec<ServiceRef>,
    pub static_classes: Vec<String>,
    pub static_types: BTreeMap<String, ServiceRef>,
    pub not_mapped_types: Vec<ServiceRef>,
}

impl RecordingSchemaFactory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SchemaFactory for RecordingSchemaFactory {
    fn prod_mode(&mut self) {
        self.prod_mode = true;
    }

    fn dev_mode(&mut self) {
        self.dev_mode = true;
    }

    fn add_controller_namespace(&mut self, namespace: &str) {
        self.controller_namespaces.push(namespace.to_string());
    }

    fn add_type_namespace(&mut self, namespace: &str) {
        self.type_namespaces.push(namespace.to_string());
    }

    fn register_controller(&mut self, service: ServiceRef) {
        self.controllers.push(service);
    }

    fn controllers(&self) -> &[ServiceRef] {
        &self.controllers
    }

    fn add_query_provider(&mut self, service: ServiceRef) {
        self.query_providers.push(service);
    }

    fn add_query_provider_factory(&mut self, service: ServiceRef) {
        self.query_provider_factories.push(service);
    }

    fn add_root_type_mapper_factory(&mut self, service: ServiceRef) {
        self.root_type_mapper_factories.push(service);
    }

    fn add_parameter_middleware(&mut self, service: ServiceRef) {
        self.parameter_middlewares.push(service);
    }

    fn add_field_middleware(&mut self, service: ServiceRef) {
        self.field_middlewares.push(service);
    }

    fn add_type_mapper(&mut self, service: ServiceRef) {
        self.type_mappers.push(service);
    }

    fn add_type_mapper_factory(&mut self, service: ServiceRef) {
        self.type_mapper_factories.push(service);
    }

    fn add_static_class(&mut self, class: &str) {
        self.static_classes.push(class.to_string());
    }

    fn set_static_types(&mut self, types: BTreeMap<String, ServiceRef>) {
        self.static_types = types;
    }

    fn set_not_mapped_types(&mut self, types: Vec<ServiceRef>) {
        self.not_mapped_types = types;
    }
}
