//! Account store and token issuer for the PetCare platform.
//!
//! Owns the `users`, `tenants`, and `password_resets` tables. Serves the
//! public credential endpoints (`/api/auth`), the admin operations gateway
//! (`/api/admin`), and the unauthenticated directory lookups other modules
//! use for display enrichment.

pub mod api;
pub mod config;
pub mod domain;
pub mod infra;

pub use config::AuthConfig;
pub use domain::service::Service;
pub use infra::storage::migrations::Migrator;
pub use infra::storage::repo::SeaOrmAuthRepository;
