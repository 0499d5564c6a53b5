use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub phone: String,
    pub tenant_id: String,
    pub role: String,
    pub locked: bool,
    pub locked_at: Option<DateTime<Utc>>,
    pub failed_logins: i32,
    pub last_failed_login: Option<DateTime<Utc>>,
    pub mfa_enabled: bool,
    /// Opaque enrolment material; nothing in this module interprets it.
    pub mfa_secret: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
