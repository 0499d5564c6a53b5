pub mod client;
pub mod error;
pub mod model;

pub use client::BookingsApi;
pub use error::BookingsError;
pub use model::RatingView;
