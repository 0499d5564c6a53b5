use anyhow::Result;
use async_trait::async_trait;

use crate::domain::model::{EncryptedCard, StoredCard};

/// Persistence port for the card vault.
#[async_trait]
pub trait CardsRepository: Send + Sync {
    async fn insert(&self, user_id: i64, card: EncryptedCard) -> Result<StoredCard>;

    /// All cards of one user, newest first.
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<StoredCard>>;

    async fn find(&self, id: i64) -> Result<Option<StoredCard>>;

    async fn delete(&self, id: i64) -> Result<()>;
}
