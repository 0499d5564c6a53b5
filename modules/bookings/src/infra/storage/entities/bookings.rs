use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// The requesting user's id.
    pub client_id: i64,
    /// The assigned caregiver's marketplace profile id.
    pub caregiver_id: i64,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub service_type: String,
    pub notes: Option<String>,
    /// One of the lifecycle states; never free text.
    pub status: String,
    pub is_paid: bool,
    pub is_rated: bool,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
