pub mod client_profiles;
