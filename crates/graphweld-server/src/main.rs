//! Graphweld demo server
//!
//! Boots the demo application: loads the bundle configuration, runs the
//! container wiring pass, builds the demo schema and serves it on
//! `/graphql`.

use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use graphweld_core::demo::{self, SecurityServices};
use graphweld_core::registry::{CachedExplorer, RegistryExplorer};
use graphweld_core::{
    BundleConfig, Environment, ExecutionMode, RecordingSchemaFactory, ServerConfig, WiringPass,
};
use graphweld_server::{GraphQLState, router};

/// Graphweld demo server CLI arguments
#[derive(Parser, Debug)]
#[command(name = "graphweld-server")]
#[command(about = "Graphweld demo GraphQL server", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: String,

    /// Directory containing graphweld.toml
    #[arg(long, default_value = ".")]
    config_dir: String,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "graphweld_server=debug,graphweld_core=debug,tower_http=debug".into())
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "graphweld_server=info,tower_http=warn".into())
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = BundleConfig::from_dir(&args.config_dir)
        .context("failed to load bundle configuration")?
        .with_env_overrides();
    config.namespaces = demo::demo_config().namespaces;

    // Build-time wiring: runs once, before the first request
    let metadata = Arc::new(demo::demo_metadata());
    let explorer = Arc::new(CachedExplorer::for_environment(
        Arc::new(RegistryExplorer::new(Arc::clone(&metadata))),
        &config.environment,
    ));
    let pass = WiringPass::new(explorer, metadata, ExecutionMode::Server);

    let mut registry = demo::demo_registry()?;
    let mut factory = RecordingSchemaFactory::new();
    let mut server_config = ServerConfig::new();
    pass.process(&config, &mut registry, &mut factory, &mut server_config)?;
    registry.freeze();

    server_config.set_debug(config.environment != Environment::Prod);
    info!(
        environment = ?config.environment,
        controllers = factory.controllers.len(),
        "Container wiring complete"
    );

    let services = SecurityServices::demo()?;
    let schema = demo::demo_http_schema(&services, &server_config);
    let state = GraphQLState::new(Arc::new(schema), Arc::new(server_config));

    let app = router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&args.addr)
        .await
        .with_context(|| format!("failed to bind {}", args.addr))?;
    info!("Listening on http://{}/graphql", args.addr);

    axum::serve(listener, app).await?;
    Ok(())
}
