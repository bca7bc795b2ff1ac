//! CLI subcommands

pub mod schema;
