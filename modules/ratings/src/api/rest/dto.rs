use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::model::{NewRating, Rating};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRatingReq {
    pub booking_id: i64,
    pub score: i16,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingDto {
    pub id: i64,
    pub booking_id: i64,
    pub client_id: i64,
    pub caregiver_id: i64,
    pub score: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Rating> for RatingDto {
    fn from(r: Rating) -> Self {
        Self {
            id: r.id,
            booking_id: r.booking_id,
            client_id: r.client_id,
            caregiver_id: r.caregiver_id,
            score: r.score,
            comment: r.comment,
            created_at: r.created_at,
        }
    }
}

impl From<CreateRatingReq> for NewRating {
    fn from(req: CreateRatingReq) -> Self {
        Self {
            booking_id: req.booking_id,
            score: req.score,
            comment: req.comment,
        }
    }
}
