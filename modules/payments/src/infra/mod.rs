pub mod crypto;
pub mod paypal;
pub mod storage;
