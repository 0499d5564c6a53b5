use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cards")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user id (token subject).
    pub user_id: i64,
    pub card_holder: String,
    /// base64(nonce || AES-256-GCM ciphertext); never serialized out.
    pub encrypted_number: String,
    pub masked_number: String,
    /// `MM/YY`.
    pub expires: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
