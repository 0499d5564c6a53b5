use apikit::DirectoryEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::model::{ClientProfile, NewProfile, ProfilePatch};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileReq {
    pub document_id: String,
    pub emergency_phone: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileReq {
    pub document_id: Option<String>,
    pub emergency_phone: Option<String>,
}

/// Profile view plus display fields resolved from the auth directory.
/// The display fields are `null` when the directory was unreachable.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfileDto {
    pub id: i64,
    pub user_id: i64,
    pub document_id: String,
    pub emergency_phone: String,
    pub document_verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub user_phone: Option<String>,
    pub account_locked: Option<bool>,
}

impl From<ClientProfile> for ClientProfileDto {
    fn from(p: ClientProfile) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            document_id: p.document_id,
            emergency_phone: p.emergency_phone,
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

impl ClientProfileDto {
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
        }
    }
}

impl From<UpdateProfileReq> for ProfilePatch {
    fn from(req: UpdateProfileReq) -> Self {
        Self {
            document_id: req.document_id,
            emergency_phone: req.emergency_phone,
        }
    }
}
