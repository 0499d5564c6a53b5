use apikit::DirectoryEntry;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::model::{CaregiverProfile, NewProfile, ProfilePatch};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileReq {
    pub document_id: String,
    pub emergency_phone: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub service_hours: String,
    pub hourly_rate: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileReq {
    pub document_id: Option<String>,
    pub emergency_phone: Option<String>,
    pub bio: Option<String>,
    pub experience: Option<String>,
    pub service_hours: Option<String>,
    pub hourly_rate: Option<Decimal>,
}

/// Rating cache refresh pushed by the ratings wiring.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRatingReq {
    pub average_rating: Decimal,
}

/// Profile view plus display fields resolved from the auth directory.
/// The display fields are `null` when the directory was unreachable.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaregiverProfileDto {
    pub id: i64,
    pub user_id: i64,
    pub document_id: String,
    pub emergency_phone: String,
    pub bio: String,
    pub experience: String,
    pub service_hours: String,
    pub hourly_rate: Decimal,
    pub avg_rating: Decimal,
    pub document_verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub user_phone: Option<String>,
    pub account_locked: Option<bool>,
}

impl From<CaregiverProfile> for CaregiverProfileDto {
    fn from(p: CaregiverProfile) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            document_id: p.document_id,
            emergency_phone: p.emergency_phone,
            bio: p.bio,
            experience: p.experience,
            service_hours: p.service_hours,
            hourly_rate: p.hourly_rate,
            avg_rating: p.avg_rating,
            document_verified: p.document_verified,
            verified_at: p.verified_at,
            created_at: p.created_at,
            updated_at: p.updated_at,
            user_name: None,
            user_email: None,
            user_phone: None,
            account_locked: None,
        }
    }
}

impl CaregiverProfileDto {
    pub fn with_directory(mut self, entry: Option<&DirectoryEntry>) -> Self {
        if let Some(e) = entry {
            self.user_name = Some(e.name.clone());
            self.user_email = Some(e.email.clone());
            self.user_phone = Some(e.phone_number.clone());
            self.account_locked = Some(e.account_locked);
        }
        self
    }
}

impl From<CreateProfileReq> for NewProfile {
    fn from(req: CreateProfileReq) -> Self {
        Self {
            document_id: req.document_id,
            emergency_phone: req.emergency_phone,
            bio: req.bio,
            experience: req.experience,
            service_hours: req.service_hours,
            hourly_rate: req.hourly_rate,
        }
    }
}

impl From<UpdateProfileReq> for ProfilePatch {
    fn from(req: UpdateProfileReq) -> Self {
        Self {
            document_id: req.document_id,
            emergency_phone: req.emergency_phone,
            bio: req.bio,
            experience: req.experience,
            service_hours: req.service_hours,
            hourly_rate: req.hourly_rate,
        }
    }
}
