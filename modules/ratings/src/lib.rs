//! Per-booking ratings and the caregiver score averages derived from
//! them.
//!
//! A booking is rated once, ever, and only after it finished. Every
//! accepted rating flips the booking's rated flag through the bookings
//! contract and pushes a refreshed mean into the caregiver profile
//! cache, best-effort.

pub mod api;
pub mod domain;
pub mod infra;

pub use domain::service::Service;
pub use infra::storage::migrations::Migrator;
pub use infra::storage::repo::SeaOrmRatingsRepository;
