pub mod client;
pub mod error;

pub use client::CaregiversApi;
pub use error::CaregiversError;
