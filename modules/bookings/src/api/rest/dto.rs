use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::model::{Booking, NewBooking};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingReq {
    pub caregiver_id: i64,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub service_type: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Target lifecycle state, e.g. `{"estado": "Aceptada"}`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChangeStatusReq {
    pub estado: String,
}

/// Payment confirmation pushed by the payments wiring.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkPaidReq {
    pub payment_method: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingDto {
    pub id: i64,
    pub client_id: i64,
    pub caregiver_id: i64,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub service_type: String,
    pub notes: Option<String>,
    #[serde(rename = "estado")]
    pub status: String,
    pub is_paid: bool,
    pub is_rated: bool,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Booking> for BookingDto {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            client_id: b.client_id,
            caregiver_id: b.caregiver_id,
            start_at: b.start_at,
            end_at: b.end_at,
            service_type: b.service_type,
            notes: b.notes,
            status: b.status.as_str().to_owned(),
            is_paid: b.is_paid,
            is_rated: b.is_rated,
            payment_method: b.payment_method,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

impl From<CreateBookingReq> for NewBooking {
    fn from(req: CreateBookingReq) -> Self {
        Self {
            caregiver_id: req.caregiver_id,
            start_at: req.start_at,
            end_at: req.end_at,
            service_type: req.service_type,
            notes: req.notes,
        }
    }
}
