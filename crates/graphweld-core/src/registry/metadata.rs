//! Class metadata
//!
//! A registered, static description of the annotated classes the wiring pass
//! discovers: which classes are GraphQL types or type extensions, which
//! methods are resolvers, and which method parameters request an injected
//! service. Applications register their metadata up front; the pass only
//! ever reads it.

use std::collections::BTreeMap;
use std::sync::Arc;

/// What kind of resolver a method is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverKind {
    /// A field on an output type
    Field,
    /// A root query
    Query,
    /// A root mutation
    Mutation,
}

/// One method parameter.
#[derive(Debug, Clone)]
pub struct ParameterMetadata {
    pub name: String,
    /// Class path of the parameter type, when it is a class type
    pub class: Option<String>,
}

impl ParameterMetadata {
    pub fn new(name: impl Into<String>, class: Option<String>) -> Self {
        Self {
            name: name.into(),
            class,
        }
    }
}

/// A parameter that requests an injected service.
#[derive(Debug, Clone)]
pub struct AutowireBinding {
    /// Name of the annotated parameter
    pub parameter: String,
    /// Explicit service id; `None` means "resolve by the parameter's class"
    pub service_id: Option<String>,
}

/// One method of an annotated class.
#[derive(Debug, Clone)]
pub struct MethodMetadata {
    pub name: String,
    pub public: bool,
    /// Static factory methods produce instances of another class
    pub factory: bool,
    /// Set when the method is a resolver
    pub resolver: Option<ResolverKind>,
    /// Companion method that batch-loads data for this resolver
    pub prefetch_method: Option<String>,
    pub parameters: Vec<ParameterMetadata>,
    /// Injected-service requests on this method's parameters
    pub autowire: Vec<AutowireBinding>,
}

impl MethodMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            public: true,
            factory: false,
            resolver: None,
            prefetch_method: None,
            parameters: Vec::new(),
            autowire: Vec::new(),
        }
    }

    pub fn resolver(mut self, kind: ResolverKind) -> Self {
        self.resolver = Some(kind);
        self
    }

    pub fn factory(mut self) -> Self {
        self.factory = true;
        self
    }

    pub fn prefetch(mut self, method: impl Into<String>) -> Self {
        self.prefetch_method = Some(method.into());
        self
    }

    pub fn with_parameter(mut self, parameter: ParameterMetadata) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_autowire(mut self, binding: AutowireBinding) -> Self {
        self.autowire.push(binding);
        self
    }

    /// Look up a parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&ParameterMetadata> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// A `#[Type]`-style annotation on a class.
#[derive(Debug, Clone)]
pub struct TypeAnnotation {
    /// Whether the annotation maps the class onto itself (as opposed to
    /// exposing a different class)
    pub self_type: bool,
}

/// Everything the wiring pass knows about one annotated class.
#[derive(Debug, Clone)]
pub struct ClassMetadata {
    /// Fully qualified class path, e.g. `demo::types::Product`
    pub class: String,
    /// Whether the class can be instantiated (not abstract, not a trait)
    pub instantiable: bool,
    /// Present when the class is annotated as a GraphQL type
    pub type_annotation: Option<TypeAnnotation>,
    /// Whether the class extends an existing GraphQL type
    pub extend_type: bool,
    pub methods: Vec<MethodMetadata>,
}

impl ClassMetadata {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            instantiable: true,
            type_annotation: None,
            extend_type: false,
            methods: Vec::new(),
        }
    }

    pub fn not_instantiable(mut self) -> Self {
        self.instantiable = false;
        self
    }

    pub fn type_annotation(mut self, self_type: bool) -> Self {
        self.type_annotation = Some(TypeAnnotation { self_type });
        self
    }

    pub fn extend_type(mut self) -> Self {
        self.extend_type = true;
        self
    }

    pub fn with_method(mut self, method: MethodMetadata) -> Self {
        self.methods.push(method);
        self
    }

    /// Whether the annotation maps this class onto itself.
    pub fn is_self_type(&self) -> bool {
        self.type_annotation
            .as_ref()
            .is_some_and(|annotation| annotation.self_type)
    }
}

/// The application-wide class metadata, keyed by class path.
#[derive(Debug, Default)]
pub struct MetadataRegistry {
    classes: BTreeMap<String, Arc<ClassMetadata>>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, metadata: ClassMetadata) {
        self.classes
            .insert(metadata.class.clone(), Arc::new(metadata));
    }

    /// Whether `class` is a registered class.
    pub fn class_exists(&self, class: &str) -> bool {
        self.classes.contains_key(class)
    }

    pub fn class(&self, class: &str) -> Option<&Arc<ClassMetadata>> {
        self.classes.get(class)
    }

    /// All registered classes under a namespace prefix, in class-path order.
    pub fn classes_in_namespace(&self, namespace: &str) -> Vec<Arc<ClassMetadata>> {
        let prefix = format!("{}::", namespace.trim_end_matches("::"));
        self.classes
            .range(namespace.to_string()..)
            .take_while(|(class, _)| class.starts_with(&prefix) || *class == namespace)
            .map(|(_, metadata)| Arc::clone(metadata))
            .collect()
    }
}
