use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::model::{NewCard, OrderRequest, StoredCard};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderReq {
    /// Amount in the order currency; accepts `"20.50"` or `20.5`.
    pub amount: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub return_url: String,
    #[serde(default)]
    pub cancel_url: String,
    /// Booking to mark paid once the order is created.
    #[serde(default)]
    pub booking_id: Option<i64>,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl From<CreateOrderReq> for OrderRequest {
    fn from(req: CreateOrderReq) -> Self {
        Self {
            amount: req.amount,
            currency: req.currency,
            description: req.description,
            return_url: req.return_url,
            cancel_url: req.cancel_url,
            booking_id: req.booking_id,
        }
    }
}

#[derive(Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveCardReq {
    pub card_number: String,
    pub card_holder: String,
    /// `MM/YY`.
    pub expires: String,
    /// Checked for shape, then dropped. Never stored.
    pub cvv: String,
}

impl fmt::Debug for SaveCardReq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaveCardReq")
            .field("card_number", &"[REDACTED]")
            .field("card_holder", &self.card_holder)
            .field("expires", &self.expires)
            .field("cvv", &"[REDACTED]")
            .finish()
    }
}

impl From<SaveCardReq> for NewCard {
    fn from(req: SaveCardReq) -> Self {
        Self {
            card_number: req.card_number,
            card_holder: req.card_holder,
            expires: req.expires,
            cvv: req.cvv,
        }
    }
}

/// The caller-visible slice of a stored card. The number only ever
/// appears as its mask.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CardDto {
    pub id: i64,
    pub card_holder: String,
    pub masked_number: String,
    pub expires: String,
    pub created_at: DateTime<Utc>,
}

impl From<StoredCard> for CardDto {
    fn from(c: StoredCard) -> Self {
        Self {
            id: c.id,
            card_holder: c.card_holder,
            masked_number: c.masked_number,
            expires: c.expires,
            created_at: c.created_at,
        }
    }
}
