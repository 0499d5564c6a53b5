//! Booking requests between clients and caregivers.
//!
//! Owns the `bookings` table and the status machine that governs it.
//! The paid/rated flags are one-way and flipped through
//! [`contract::BookingsApi`] by the payments and ratings modules.

pub mod api;
pub mod contract;
pub mod domain;
pub mod gateways;
pub mod infra;

pub use contract::client::BookingsApi;
pub use domain::service::Service;
pub use gateways::local::BookingsLocalClient;
pub use infra::storage::migrations::Migrator;
pub use infra::storage::repo::SeaOrmBookingsRepository;
