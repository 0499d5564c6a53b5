pub mod password_resets;
pub mod tenants;
pub mod users;
