//! Caregiver profiles: the marketplace side of the platform.
//!
//! Owns the `caregiver_profiles` table, including the cached rating
//! average that the ratings module pushes into. Other modules reach this
//! one through [`contract::CaregiversApi`].

pub mod api;
pub mod config;
pub mod contract;
pub mod domain;
pub mod gateways;
pub mod infra;

pub use config::CaregiversConfig;
pub use contract::client::CaregiversApi;
pub use domain::service::Service;
pub use gateways::local::CaregiversLocalClient;
pub use infra::storage::migrations::Migrator;
pub use infra::storage::repo::SeaOrmCaregiversRepository;
