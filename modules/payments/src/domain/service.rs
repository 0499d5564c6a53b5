//! Checkout orders and the card vault.
//!
//! Orders are placed with PayPal and the gateway's answer is handed
//! back untouched; when the order belongs to a booking, its paid flag
//! flips through the bookings contract before the answer goes out, so a
//! reported success always means the booking is marked. Cards are
//! encrypted before they reach the repository and validation failures
//! never carry the submitted number back.

use std::sync::Arc;

use bookings::contract::{BookingsApi, BookingsError};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use super::error::DomainError;
use super::model::{EncryptedCard, NewCard, OrderRequest, StoredCard};
use super::repo::CardsRepository;
use crate::infra::crypto::CardVault;
use crate::infra::paypal::PayPalClient;

const HOLDER_MAX: usize = 100;

static EXPIRES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(0[1-9]|1[0-2])/\d{2}$").expect("expiry regex"));
static CVV_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{3,4}$").expect("cvv regex"));

pub struct Service {
    repo: Arc<dyn CardsRepository>,
    paypal: PayPalClient,
    vault: CardVault,
    bookings: Arc<dyn BookingsApi>,
}

fn db_err(e: anyhow::Error) -> DomainError {
    DomainError::database(e.to_string())
}

impl Service {
    pub fn new(
        repo: Arc<dyn CardsRepository>,
        paypal: PayPalClient,
        vault: CardVault,
        bookings: Arc<dyn BookingsApi>,
    ) -> Self {
        Self {
            repo,
            paypal,
            vault,
            bookings,
        }
    }

    /// Place a CAPTURE order with the gateway and pass its JSON answer
    /// through. With a booking id attached, the booking is marked paid
    /// before returning; a refusal there fails the whole call even
    /// though the gateway order already exists, so the caller retries
    /// against a consistent state.
    #[instrument(name = "payments.service.create_order", skip(self, order), fields(booking_id = order.booking_id))]
    pub async fn create_order(
        &self,
        order: OrderRequest,
    ) -> Result<serde_json::Value, DomainError> {
        if order.amount <= Decimal::ZERO {
            return Err(DomainError::validation("amount", "must be positive"));
        }
        if order.currency.trim().is_empty() {
            return Err(DomainError::validation("currency", "must not be blank"));
        }

        let answer = self.paypal.create_order(&order).await.map_err(|e| {
            warn!(error = %e, "gateway refused the order");
            DomainError::Gateway {
                message: e.to_string(),
            }
        })?;

        if let Some(booking_id) = order.booking_id {
            self.bookings
                .mark_paid(booking_id, "PayPal")
                .await
                .map_err(|e| match e {
                    BookingsError::NotFound => DomainError::BookingNotFound,
                    BookingsError::Conflict { message } => DomainError::BookingConflict { message },
                    BookingsError::Internal => DomainError::database("bookings mark_paid failed"),
                })?;
            info!(booking_id, "booking marked paid");
        }

        Ok(answer)
    }

    /// Validate, encrypt and store a card. The CVV gates the save but
    /// is dropped here; only the ciphertext and the mask persist.
    #[instrument(name = "payments.service.save_card", skip(self, card))]
    pub async fn save_card(&self, user_id: i64, card: NewCard) -> Result<StoredCard, DomainError> {
        let number: String = card
            .card_number
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if number.len() < 12 || number.len() > 19 || !number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::validation(
                "cardNumber",
                "must be 12-19 digits",
            ));
        }
        let holder = card.card_holder.trim();
        if holder.is_empty() || holder.chars().count() > HOLDER_MAX {
            return Err(DomainError::validation(
                "cardHolder",
                "must be 1-100 characters",
            ));
        }
        if !EXPIRES_RE.is_match(&card.expires) {
            return Err(DomainError::validation("expires", "must look like MM/YY"));
        }
        if !CVV_RE.is_match(&card.cvv) {
            return Err(DomainError::validation("cvv", "must be 3-4 digits"));
        }

        let masked = format!("************{}", &number[number.len() - 4..]);
        let encrypted = self
            .vault
            .encrypt(&number)
            .map_err(|e| DomainError::crypto(e.to_string()))?;

        let stored = self
            .repo
            .insert(
                user_id,
                EncryptedCard {
                    card_holder: holder.to_owned(),
                    encrypted_number: encrypted,
                    masked_number: masked,
                    expires: card.expires.clone(),
                },
            )
            .await
            .map_err(db_err)?;
        info!(card_id = stored.id, "card stored");
        Ok(stored)
    }

    #[instrument(name = "payments.service.list_cards", skip(self))]
    pub async fn list_cards(&self, user_id: i64) -> Result<Vec<StoredCard>, DomainError> {
        self.repo.list_by_user(user_id).await.map_err(db_err)
    }

    /// Delete one of the caller's cards. Foreign and missing ids answer
    /// identically, so card ids cannot be probed.
    #[instrument(name = "payments.service.delete_card", skip(self))]
    pub async fn delete_card(&self, user_id: i64, id: i64) -> Result<(), DomainError> {
        match self.repo.find(id).await.map_err(db_err)? {
            Some(card) if card.user_id == user_id => {
                self.repo.delete(id).await.map_err(db_err)?;
                info!(card_id = id, "card deleted");
                Ok(())
            }
            _ => Err(DomainError::CardNotFound),
        }
    }
}
