//! usermap core library.
//!
//! This crate provides the pieces behind the `usermap` command line: the
//! `UserIdentityMapping` resource types, connection configuration, the REST
//! client for the cluster API server, and the object printers.

pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod printer;

// Re-exports for convenience.
pub use client::{ClientFactory, ConfigClientFactory, RestClient, UserIdentityMappingInterface};
pub use config::ClientConfig;
pub use models::UserIdentityMapping;
pub use printer::{ObjectPrinter, OutputFormat};
