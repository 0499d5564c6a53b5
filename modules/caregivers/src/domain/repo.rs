use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

use super::model::{CaregiverProfile, NewProfile, ProfilePatch};

/// Persistence port for caregiver profiles. All reads are scoped to
/// `Activo` rows; soft-deleted history never surfaces.
#[async_trait]
pub trait CaregiversRepository: Send + Sync {
    async fn find_active(&self, id: i64) -> Result<Option<CaregiverProfile>>;
    async fn find_active_by_user(&self, user_id: i64) -> Result<Option<CaregiverProfile>>;
    async fn list_active(&self) -> Result<Vec<CaregiverProfile>>;
    /// Is the document registered to an active profile other than `except`?
    async fn document_taken(&self, document_id: &str, except: Option<i64>) -> Result<bool>;
    async fn insert(&self, user_id: i64, profile: NewProfile) -> Result<CaregiverProfile>;
    async fn update(&self, id: i64, patch: ProfilePatch) -> Result<CaregiverProfile>;
    /// Returns false when the user has no active profile to delete.
    async fn soft_delete_by_user(&self, user_id: i64) -> Result<bool>;
    async fn mark_verified(&self, id: i64) -> Result<()>;
    /// Returns false when no active profile has this id.
    async fn set_avg_rating(&self, id: i64, avg: Decimal) -> Result<bool>;
}
