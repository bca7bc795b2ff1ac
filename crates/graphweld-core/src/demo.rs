//! Demo application fixture
//!
//! A small but complete annotated application — a product catalogue with the
//! optional security features — used by the demo server binary, the
//! schema-dump command and the integration tests. Field declaration order is
//! deliberately not alphabetical so that sorted schema output is observable.

use std::sync::Arc;

use async_graphql::{Context, EmptySubscription, Object, Schema, SimpleObject, Subscription};
use futures_util::Stream;

use crate::config::{BundleConfig, Namespaces};
use crate::controllers::{LoginController, MeController};
use crate::error::Result;
use crate::params::RequestParameter;
use crate::registry::metadata::{
    AutowireBinding, ClassMetadata, MetadataRegistry, MethodMetadata, ParameterMetadata,
    ResolverKind,
};
use crate::registry::{
    Argument, PASSWORD_HASHER, SESSION_FACTORY, ServiceDefinition, ServiceRegistry, TOKEN_STORAGE,
    firewall_config_id,
};
use crate::security::{
    Argon2PasswordHasher, InMemorySessionFactory, InMemoryTokenStorage, PasswordHasher,
    SessionFactory, TokenStorage, User, UserProvider,
};
use crate::server::{OperationType, ServerConfig, apply_rules};

/// A product of the demo catalogue.
#[derive(Debug, Clone, SimpleObject)]
pub struct Product {
    pub seller: String,
    pub price: f64,
    pub name: String,
}

/// A vendor contact of the demo catalogue.
#[derive(Debug, Clone, SimpleObject)]
pub struct Contact {
    pub name: String,
    pub email: String,
}

/// Root query type of the demo schema.
pub struct QueryRoot {
    me_controller: Arc<MeController>,
}

#[Object(name = "Query")]
impl QueryRoot {
    /// The demo catalogue.
    async fn products(&self) -> Vec<Product> {
        vec![
            Product {
                seller: "Joe".to_string(),
                price: 9.99,
                name: "Mouf".to_string(),
            },
            Product {
                seller: "Joe".to_string(),
                price: 10.99,
                name: "Fenouil".to_string(),
            },
        ]
    }

    async fn contact(&self) -> Contact {
        Contact {
            name: "Joe".to_string(),
            email: "joe@example.com".to_string(),
        }
    }

    /// The currently authenticated user.
    async fn me(&self) -> async_graphql::Result<Option<Arc<User>>> {
        Ok(self.me_controller.me()?)
    }

    /// HTTP method of the request executing this query. Exercises the
    /// request parameter resolution.
    async fn request_method(&self, ctx: &Context<'_>) -> async_graphql::Result<String> {
        let request = RequestParameter::resolve_request(ctx)?;
        Ok(request.method().to_string())
    }
}

/// Root mutation type of the demo schema.
pub struct MutationRoot {
    login_controller: Arc<LoginController>,
}

#[Object(name = "Mutation")]
impl MutationRoot {
    async fn login(
        &self,
        user_name: String,
        password: String,
    ) -> async_graphql::Result<Arc<User>> {
        Ok(self.login_controller.login(&user_name, &password)?)
    }

    async fn logout(&self) -> bool {
        self.login_controller.logout()
    }
}

/// Root subscription type of the demo schema.
pub struct SubscriptionRoot;

#[Subscription(name = "Subscription")]
impl SubscriptionRoot {
    /// Streams the catalogue as a stand-in for a live feed.
    async fn product_updates(&self) -> impl Stream<Item = Product> {
        futures_util::stream::iter(vec![Product {
            seller: "Joe".to_string(),
            price: 9.99,
            name: "Mouf".to_string(),
        }])
    }
}

/// The demo schema type.
pub type DemoSchema = Schema<QueryRoot, MutationRoot, SubscriptionRoot>;

/// The demo schema without its subscription root, as executed over plain
/// HTTP.
pub type DemoHttpSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// User provider with one fixed account.
pub struct DemoUserProvider {
    user: Arc<User>,
    password_hash: String,
}

impl UserProvider for DemoUserProvider {
    fn load_user(&self, username: &str) -> Option<(Arc<User>, String)> {
        (username == self.user.username)
            .then(|| (Arc::clone(&self.user), self.password_hash.clone()))
    }
}

/// The security collaborators of the demo application.
pub struct SecurityServices {
    pub user_provider: Arc<dyn UserProvider>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub token_storage: Arc<dyn TokenStorage>,
    pub session_factory: Arc<dyn SessionFactory>,
}

impl SecurityServices {
    /// Demo services with one account, `admin` / `secret`.
    pub fn demo() -> Result<Self> {
        let password_hasher = Arc::new(Argon2PasswordHasher::default());
        let password_hash = password_hasher.hash("secret")?;
        let user_provider = Arc::new(DemoUserProvider {
            user: Arc::new(User::new("admin", vec!["ROLE_ADMIN".to_string()])),
            password_hash,
        });
        Ok(Self {
            user_provider,
            password_hasher,
            token_storage: Arc::new(InMemoryTokenStorage::default()),
            session_factory: Arc::new(InMemorySessionFactory),
        })
    }
}

/// Build the demo schema roots on top of the security services.
fn roots(services: &SecurityServices) -> (QueryRoot, MutationRoot) {
    let login_controller = Arc::new(LoginController::new(
        Arc::clone(&services.user_provider),
        Arc::clone(&services.password_hasher),
        Arc::clone(&services.token_storage),
        Arc::clone(&services.session_factory),
    ));
    let me_controller = Arc::new(MeController::new(Arc::clone(&services.token_storage)));
    (
        QueryRoot { me_controller },
        MutationRoot { login_controller },
    )
}

/// The full demo schema, including the subscription root. The server
/// configuration contributes the validation rules applied at build time.
pub fn demo_schema(services: &SecurityServices, server_config: &ServerConfig) -> DemoSchema {
    let (query, mutation) = roots(services);
    let builder = Schema::build(query, mutation, SubscriptionRoot);
    let rules = server_config.validation_rules(OperationType::Query, "");
    apply_rules(builder, &rules).finish()
}

/// The demo schema as served over HTTP, without subscriptions.
pub fn demo_http_schema(
    services: &SecurityServices,
    server_config: &ServerConfig,
) -> DemoHttpSchema {
    let (query, mutation) = roots(services);
    let builder = Schema::build(query, mutation, EmptySubscription);
    let rules = server_config.validation_rules(OperationType::Query, "");
    apply_rules(builder, &rules).finish()
}

/// Bundle configuration of the demo application.
pub fn demo_config() -> BundleConfig {
    BundleConfig {
        namespaces: Namespaces {
            controllers: vec!["demo::controllers".to_string()],
            types: vec!["demo::types".to_string()],
        },
        ..BundleConfig::default()
    }
}

/// Class metadata of the demo application.
pub fn demo_metadata() -> MetadataRegistry {
    let mut metadata = MetadataRegistry::new();

    metadata.register(
        ClassMetadata::new("demo::controllers::ProductController").with_method(
            MethodMetadata::new("products")
                .resolver(ResolverKind::Query)
                .with_parameter(ParameterMetadata::new(
                    "repository",
                    Some("demo::ProductRepository".to_string()),
                ))
                .with_autowire(AutowireBinding {
                    parameter: "repository".to_string(),
                    service_id: None,
                }),
        ),
    );
    metadata.register(
        ClassMetadata::new("demo::controllers::ContactController")
            .with_method(MethodMetadata::new("contact").resolver(ResolverKind::Query)),
    );
    metadata.register(
        ClassMetadata::new("demo::types::Product")
            .type_annotation(false)
            .with_method(
                MethodMetadata::new("seller")
                    .resolver(ResolverKind::Field)
                    .prefetch("prefetch_sellers"),
            )
            .with_method(
                MethodMetadata::new("prefetch_sellers")
                    .with_parameter(ParameterMetadata::new(
                        "loader",
                        Some("demo::SellerLoader".to_string()),
                    ))
                    .with_autowire(AutowireBinding {
                        parameter: "loader".to_string(),
                        service_id: None,
                    }),
            ),
    );
    metadata.register(ClassMetadata::new("demo::types::Contact").type_annotation(false));

    metadata
}

/// Service registry of the demo application: the bundle services, the demo
/// services and all security collaborators.
pub fn demo_registry() -> Result<ServiceRegistry> {
    let mut registry = ServiceRegistry::with_bundle_services()?;

    for (id, class) in [
        (SESSION_FACTORY, "demo::session::Factory"),
        (PASSWORD_HASHER, "demo::security::Hasher"),
        (TOKEN_STORAGE, "demo::security::TokenStorage"),
        ("demo.user_provider", "demo::security::UserProvider"),
        (
            "demo::controllers::ProductController",
            "demo::controllers::ProductController",
        ),
        (
            "demo::controllers::ContactController",
            "demo::controllers::ContactController",
        ),
        ("demo::ProductRepository", "demo::ProductRepository"),
        ("demo::SellerLoader", "demo::SellerLoader"),
        ("demo::types::Product", "demo::types::Product"),
        ("demo::types::Contact", "demo::types::Contact"),
    ] {
        registry.register(ServiceDefinition::new(id, class))?;
    }

    registry.register(
        ServiceDefinition::new(firewall_config_id("main"), "demo::security::FirewallConfig")
            .with_argument(Argument::Str("main".to_string()))
            .with_argument(Argument::Ref("demo.user_provider".to_string())),
    )?;

    Ok(registry)
}
