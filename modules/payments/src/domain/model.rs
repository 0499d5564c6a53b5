use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// A saved card as persisted. The number is held only in encrypted
/// form; everything a caller may see is the mask.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredCard {
    pub id: i64,
    /// Owning user id (token subject).
    pub user_id: i64,
    pub card_holder: String,
    /// base64(nonce || AES-256-GCM ciphertext) of the card number.
    pub encrypted_number: String,
    /// Twelve asterisks plus the last four digits.
    pub masked_number: String,
    /// `MM/YY`.
    pub expires: String,
    pub created_at: DateTime<Utc>,
}

/// Card data as submitted for saving. The CVV is checked for shape and
/// then dropped; it is never persisted.
#[derive(Clone)]
pub struct NewCard {
    pub card_number: String,
    pub card_holder: String,
    pub expires: String,
    pub cvv: String,
}

impl fmt::Debug for NewCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewCard")
            .field("card_number", &"[REDACTED]")
            .field("card_holder", &self.card_holder)
            .field("expires", &self.expires)
            .field("cvv", &"[REDACTED]")
            .finish()
    }
}

/// The encrypted shape of a card, ready for the repository.
#[derive(Debug, Clone)]
pub struct EncryptedCard {
    pub card_holder: String,
    pub encrypted_number: String,
    pub masked_number: String,
    pub expires: String,
}

/// A checkout order to be placed with the gateway.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub amount: Decimal,
    pub currency: String,
    pub description: String,
    /// Where the gateway sends the buyer after approval.
    pub return_url: String,
    pub cancel_url: String,
    /// When set, the booking's paid flag flips once the order is
    /// created.
    pub booking_id: Option<i64>,
}
