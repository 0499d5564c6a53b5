//! Rating rules: one score per finished booking, written by the booking's
//! client, with the caregiver average cache refreshed after every write.

use std::sync::Arc;

use bookings::contract::{BookingsApi, BookingsError};
use caregivers::contract::CaregiversApi;
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use super::error::DomainError;
use super::model::{NewRating, Rating};
use super::repo::RatingsRepository;

const COMMENT_MAX: usize = 500;

pub struct Service {
    repo: Arc<dyn RatingsRepository>,
    bookings: Arc<dyn BookingsApi>,
    caregivers: Arc<dyn CaregiversApi>,
}

fn db_err(e: anyhow::Error) -> DomainError {
    DomainError::database(e.to_string())
}

fn wiring_err(e: BookingsError) -> DomainError {
    DomainError::database(format!("bookings lookup failed: {e}"))
}

impl Service {
    pub fn new(
        repo: Arc<dyn RatingsRepository>,
        bookings: Arc<dyn BookingsApi>,
        caregivers: Arc<dyn CaregiversApi>,
    ) -> Self {
        Self {
            repo,
            bookings,
            caregivers,
        }
    }

    #[instrument(name = "ratings.service.create", skip(self, rating))]
    pub async fn create(&self, client_id: i64, rating: NewRating) -> Result<Rating, DomainError> {
        if !(1..=5).contains(&rating.score) {
            return Err(DomainError::validation("score", "must be between 1 and 5"));
        }
        let comment = rating
            .comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_owned);
        if let Some(ref c) = comment {
            if c.chars().count() > COMMENT_MAX {
                return Err(DomainError::validation(
                    "comment",
                    format!("must be at most {COMMENT_MAX} characters"),
                ));
            }
        }

        let view = self
            .bookings
            .rating_view(rating.booking_id)
            .await
            .map_err(wiring_err)?
            .filter(|v| v.client_id == client_id)
            .ok_or(DomainError::NotYourBooking)?;
        if !view.finished {
            return Err(DomainError::NotFinished);
        }
        if view.rated {
            return Err(DomainError::AlreadyRated);
        }

        let created = self
            .repo
            .insert(
                view.client_id,
                view.caregiver_id,
                NewRating { comment, ..rating },
            )
            .await
            .map_err(db_err)?;

        self.bookings
            .mark_rated(view.id)
            .await
            .map_err(|e| match e {
                BookingsError::Conflict { .. } => DomainError::AlreadyRated,
                e => DomainError::database(format!("bookings mark_rated failed: {e}")),
            })?;

        self.refresh_average(view.caregiver_id).await;
        info!(
            rating_id = created.id,
            booking_id = created.booking_id,
            caregiver_id = created.caregiver_id,
            score = created.score,
            "rating recorded"
        );
        Ok(created)
    }

    #[instrument(name = "ratings.service.list_for_caregiver", skip(self))]
    pub async fn list_for_caregiver(&self, caregiver_id: i64) -> Result<Vec<Rating>, DomainError> {
        self.repo
            .list_by_caregiver(caregiver_id)
            .await
            .map_err(db_err)
    }

    /// Mean score rounded to two decimals; zero when unrated.
    #[instrument(name = "ratings.service.average_for_caregiver", skip(self))]
    pub async fn average_for_caregiver(&self, caregiver_id: i64) -> Result<Decimal, DomainError> {
        Ok(self
            .repo
            .average_for_caregiver(caregiver_id)
            .await
            .map_err(db_err)?
            .round_dp(2))
    }

    /// Best-effort cache push; a failure leaves the cache stale until the
    /// next write.
    async fn refresh_average(&self, caregiver_id: i64) {
        let avg = match self.repo.average_for_caregiver(caregiver_id).await {
            Ok(avg) => avg.round_dp(2),
            Err(e) => {
                warn!(caregiver_id, error = %e, "rating average recompute failed");
                return;
            }
        };
        if let Err(e) = self.caregivers.set_avg_rating(caregiver_id, avg).await {
            warn!(caregiver_id, error = %e, "rating average push failed");
        }
    }
}
