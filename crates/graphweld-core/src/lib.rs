//! Graphweld Core - GraphQL framework-integration bundle
//!
//! This crate provides the framework-facing half of a GraphQL server
//! integration:
//! - Container wiring pass (feature toggles, annotated-class discovery,
//!   extension-point propagation, cache backend selection)
//! - Request-scoped execution context and resolver parameter resolution
//! - Security adapters (authentication, authorization, login/me controllers)
//! - Validation-rule decoration so the baseline rule set always applies
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │          Wiring Pass (build time)           │
//! │  toggles, discovery, tags, cache selection  │
//! └──────────────┬──────────────────────────────┘
//!                │ configures
//! ┌──────────────┴──────────────────────────────┐
//! │     Schema Factory + Server Config          │
//! └──────────────┬──────────────────────────────┘
//!                │ consumed per request by
//! ┌──────────────┴──────────────────────────────┐
//! │   HTTP Adapter (graphweld-server crate)     │
//! │   context, execution, status aggregation    │
//! └─────────────────────────────────────────────┘
//! ```

#![warn(clippy::all)]

pub mod cache;
pub mod config;
pub mod context;
pub mod controllers;
pub mod demo;
pub mod error;
pub mod params;
pub mod registry;
pub mod schema;
pub mod security;
pub mod server;

pub use config::{BundleConfig, Environment, FeatureToggle};
pub use context::RequestContext;
pub use error::{Error, Result};
pub use registry::{ExecutionMode, ServiceRegistry, WiringPass};
pub use schema::{RecordingSchemaFactory, SchemaFactory, ServiceRef};
pub use server::ServerConfig;
