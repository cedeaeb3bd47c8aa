//! porttrack - ship tracking demo service
//!
//! A small HTTP service keeping an in-memory list of ships, with a health
//! probe, a fault injection endpoint, one-JSON-object-per-line logging and
//! an optional Secrets Manager lookup at startup.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface definitions
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Error types and error handling
//! - [`logging`] - Structured log records
//! - [`secrets`] - Startup secret bootstrap
//! - [`server`] - HTTP routes and handlers
//! - [`store`] - Ship records and their store

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod secrets;
pub mod server;
pub mod store;

// Re-exports for convenience
pub use cli::Cli;
pub use config::Config;
pub use error::{PortTrackError, Result};
pub use server::serve;
pub use store::{MemoryStore, NewShip, Ship, ShipStore};
