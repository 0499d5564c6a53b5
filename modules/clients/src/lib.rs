//! Client profiles: the pet owners of the platform.
//!
//! Owns the `client_profiles` table. Profiles are soft-deleted and the
//! public views are enriched with display fields fetched from the auth
//! directory.

pub mod api;
pub mod config;
pub mod domain;
pub mod infra;

pub use config::ClientsConfig;
pub use domain::service::Service;
pub use infra::storage::migrations::Migrator;
pub use infra::storage::repo::SeaOrmClientsRepository;
