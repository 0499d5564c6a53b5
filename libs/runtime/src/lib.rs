//! Shared runtime plumbing for the PetCare server: layered configuration,
//! structured logging with per-subsystem file routing, and home directory
//! resolution.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{AppConfig, CliArgs, DatabaseConfig, LoggingConfig, Section, ServerConfig};
pub use logging::init_logging_from_config;
