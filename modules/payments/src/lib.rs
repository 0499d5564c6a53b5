//! PayPal checkout orders and the encrypted card vault.
//!
//! Order creation is a thin pass-through to PayPal's Checkout API: the
//! gateway's JSON answer goes back to the browser verbatim so the SDK
//! there can drive approval. When an order is tied to a booking, the
//! booking's paid flag flips through the bookings contract in the same
//! call. Saved cards are held AES-256-GCM encrypted and only ever leave
//! the module as a masked number.

pub mod api;
pub mod config;
pub mod domain;
pub mod infra;

pub use config::PaymentsConfig;
pub use domain::service::Service;
pub use infra::crypto::CardVault;
pub use infra::paypal::PayPalClient;
pub use infra::storage::migrations::Migrator;
pub use infra::storage::repo::SeaOrmCardsRepository;
