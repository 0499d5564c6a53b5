pub mod caregiver_profiles;
