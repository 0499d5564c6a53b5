use anyhow::Result;
use async_trait::async_trait;

use super::model::{ClientProfile, NewProfile, ProfilePatch};

/// Persistence port for client profiles. All reads are scoped to active
/// rows unless stated otherwise; soft-deleted rows never resurface.
#[async_trait]
pub trait ClientsRepository: Send + Sync {
    async fn find_active(&self, id: i64) -> Result<Option<ClientProfile>>;

    async fn find_active_by_user(&self, user_id: i64) -> Result<Option<ClientProfile>>;

    async fn list_active(&self) -> Result<Vec<ClientProfile>>;

    /// Whether an active row other than `except` holds this document id.
    async fn document_taken(&self, document_id: &str, except: Option<i64>) -> Result<bool>;

    async fn insert(&self, user_id: i64, profile: NewProfile) -> Result<ClientProfile>;

    async fn update(&self, id: i64, patch: ProfilePatch) -> Result<ClientProfile>;

    /// Flip an active row to `Eliminado`. Returns false when no active row
    /// belonged to the user.
    async fn soft_delete_by_user(&self, user_id: i64) -> Result<bool>;

    async fn mark_verified(&self, id: i64) -> Result<()>;
}
