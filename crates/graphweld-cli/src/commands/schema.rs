//! The `dump-schema` command
//!
//! Builds the application through the same wiring pass the server uses, but
//! in CLI execution mode, then writes the sorted SDL to stdout or a file.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Args;

use graphweld_core::cache::FileCache;
use graphweld_core::demo::{self, SecurityServices};
use graphweld_core::registry::{CachedExplorer, RegistryExplorer};
use graphweld_core::{ExecutionMode, RecordingSchemaFactory, ServerConfig, WiringPass};

use crate::sdl;

/// Arguments of the `dump-schema` command
#[derive(Args, Debug)]
pub struct DumpSchemaArgs {
    /// Write the SDL to this file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn execute(args: DumpSchemaArgs) -> anyhow::Result<()> {
    let config = demo::demo_config();

    let metadata = Arc::new(demo::demo_metadata());
    let explorer = Arc::new(CachedExplorer::for_environment(
        Arc::new(RegistryExplorer::new(Arc::clone(&metadata))),
        &config.environment,
    ));
    // Short-lived process: analysis results are cached on disk so repeated
    // invocations skip the class analysis
    let analysis_cache = FileCache::new(std::env::temp_dir().join("graphweld-analysis"))?;
    let pass = WiringPass::new(
        explorer,
        metadata,
        ExecutionMode::Cli {
            shared_memory_enabled: false,
        },
    )
    .with_analysis_cache(Arc::new(analysis_cache));

    let mut registry = demo::demo_registry()?;
    let mut factory = RecordingSchemaFactory::new();
    let mut server_config = ServerConfig::new();
    pass.process(&config, &mut registry, &mut factory, &mut server_config)?;
    registry.freeze();

    let services = SecurityServices::demo()?;
    let schema = demo::demo_schema(&services, &server_config);
    let output = sdl::export_sdl(&schema);

    match &args.output {
        Some(path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("failed to write schema to {}", path.display()))?;
            tracing::info!("Schema written to {}", path.display());
        }
        None => print!("{}", output),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dumped_sdl() -> String {
        let services = SecurityServices::demo().unwrap();
        let schema = demo::demo_schema(&services, &ServerConfig::new());
        sdl::export_sdl(&schema)
    }

    #[test]
    fn test_dump_sorts_fields() {
        let output = dumped_sdl();
        let product_block = output
            .split("type Product {")
            .nth(1)
            .and_then(|rest| rest.split('}').next())
            .unwrap();

        let name = product_block.find("name:").unwrap();
        let price = product_block.find("price:").unwrap();
        let seller = product_block.find("seller:").unwrap();
        assert!(name < price && price < seller);
    }

    #[test]
    fn test_dump_suppresses_subscriptions() {
        let output = dumped_sdl();
        assert!(!output.contains("Subscription"));
        assert!(!output.contains("productUpdates"));
    }

    #[test]
    fn test_dump_keeps_security_operations() {
        let output = dumped_sdl();
        assert!(output.contains("login("));
        assert!(output.contains("me: User"));
    }

    #[test]
    fn test_dump_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.graphql");
        execute(DumpSchemaArgs {
            output: Some(path.clone()),
        })
        .unwrap();

        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.contains("type Product {"));
        assert_eq!(written, dumped_sdl());
    }
}
