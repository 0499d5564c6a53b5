use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "caregiver_profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub document_id: String,
    pub emergency_phone: String,
    pub bio: String,
    pub experience: String,
    pub service_hours: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub hourly_rate: Decimal,
    /// Cache refreshed by the ratings module; reads never fan out.
    #[sea_orm(column_type = "Decimal(Some((4, 2)))")]
    pub avg_rating: Decimal,
    pub document_verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    /// `Activo` or `Eliminado`; soft delete keeps the row.
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
