//! The booking state machine and who may drive it.
//!
//! Acceptance, rejection, progress and finish belong to the assigned
//! caregiver; cancellation belongs to the requesting client. Admins can
//! read any booking but do not drive transitions. The paid and rated
//! flags are one-way and pushed in through the contract by the payments
//! and ratings modules.

use std::sync::Arc;

use caregivers::contract::{CaregiversApi, CaregiversError};
use chrono::Utc;
use tracing::{info, instrument};

use super::error::DomainError;
use super::model::{Booking, BookingStatus, Caller, NewBooking};
use super::repo::BookingsRepository;

const SERVICE_TYPE_MAX: usize = 100;
const NOTES_MAX: usize = 1000;

pub struct Service {
    repo: Arc<dyn BookingsRepository>,
    caregivers: Arc<dyn CaregiversApi>,
}

fn db_err(e: anyhow::Error) -> DomainError {
    DomainError::database(e.to_string())
}

fn wiring_err(e: CaregiversError) -> DomainError {
    DomainError::database(format!("caregivers lookup failed: {e}"))
}

impl Service {
    pub fn new(repo: Arc<dyn BookingsRepository>, caregivers: Arc<dyn CaregiversApi>) -> Self {
        Self { repo, caregivers }
    }

    #[instrument(name = "bookings.service.create", skip(self, booking))]
    pub async fn create(
        &self,
        client_id: i64,
        booking: NewBooking,
    ) -> Result<Booking, DomainError> {
        if booking.end_at <= booking.start_at {
            return Err(DomainError::validation("endAt", "must be after startAt"));
        }
        if booking.start_at <= Utc::now() {
            return Err(DomainError::validation("startAt", "must be in the future"));
        }
        let service_type = booking.service_type.trim().to_owned();
        if service_type.is_empty() || service_type.chars().count() > SERVICE_TYPE_MAX {
            return Err(DomainError::validation(
                "serviceType",
                "must be 1-100 characters",
            ));
        }
        let notes = booking
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_owned);
        if let Some(ref n) = notes {
            if n.chars().count() > NOTES_MAX {
                return Err(DomainError::validation(
                    "notes",
                    format!("must be at most {NOTES_MAX} characters"),
                ));
            }
        }

        let exists = self
            .caregivers
            .exists_active(booking.caregiver_id)
            .await
            .map_err(wiring_err)?;
        if !exists {
            return Err(DomainError::validation(
                "caregiverId",
                "no active caregiver profile with this id",
            ));
        }

        let created = self
            .repo
            .insert(
                client_id,
                NewBooking {
                    service_type,
                    notes,
                    ..booking
                },
            )
            .await
            .map_err(db_err)?;
        info!(
            booking_id = created.id,
            client_id,
            caregiver_id = created.caregiver_id,
            "booking created"
        );
        Ok(created)
    }

    /// Visibility: participants and admins only. For everyone else the
    /// answer is the same as for a booking that does not exist, so ids
    /// cannot be probed.
    #[instrument(name = "bookings.service.get", skip(self, caller), fields(user_id = caller.user_id))]
    pub async fn get(&self, id: i64, caller: &Caller) -> Result<Booking, DomainError> {
        let found = self.repo.find(id).await.map_err(db_err)?;
        if caller.is_admin {
            return found.ok_or(DomainError::BookingNotFound);
        }
        let Some(booking) = found else {
            return Err(DomainError::NotAuthorized);
        };
        if self.is_participant(&booking, caller.user_id).await? {
            Ok(booking)
        } else {
            Err(DomainError::NotAuthorized)
        }
    }

    #[instrument(name = "bookings.service.list_mine", skip(self))]
    pub async fn list_mine(&self, client_id: i64) -> Result<Vec<Booking>, DomainError> {
        self.repo.list_by_client(client_id).await.map_err(db_err)
    }

    /// Bookings assigned to the caller's caregiver profile; a user with
    /// no active profile simply has none.
    #[instrument(name = "bookings.service.list_assigned", skip(self))]
    pub async fn list_assigned(&self, user_id: i64) -> Result<Vec<Booking>, DomainError> {
        match self
            .caregivers
            .profile_id_for_user(user_id)
            .await
            .map_err(wiring_err)?
        {
            Some(profile_id) => self
                .repo
                .list_by_caregiver(profile_id)
                .await
                .map_err(db_err),
            None => Ok(Vec::new()),
        }
    }

    /// Applies one lifecycle transition. A wrong actor answers 403 before
    /// the transition itself is examined, so a client probing caregiver
    /// moves learns nothing about the booking's state.
    #[instrument(name = "bookings.service.change_status", skip(self, caller), fields(user_id = caller.user_id))]
    pub async fn change_status(
        &self,
        id: i64,
        target: BookingStatus,
        caller: &Caller,
    ) -> Result<Booking, DomainError> {
        let booking = match self.repo.find(id).await.map_err(db_err)? {
            Some(b) => b,
            None if caller.is_admin => return Err(DomainError::BookingNotFound),
            None => return Err(DomainError::NotAuthorized),
        };

        let as_client = booking.client_id == caller.user_id;
        let as_caregiver = {
            let profile = self
                .caregivers
                .profile_id_for_user(caller.user_id)
                .await
                .map_err(wiring_err)?;
            profile == Some(booking.caregiver_id)
        };
        if !as_client && !as_caregiver {
            return Err(DomainError::NotAuthorized);
        }

        let caregiver_drives = matches!(
            target,
            BookingStatus::Aceptada
                | BookingStatus::Rechazada
                | BookingStatus::EnProgreso
                | BookingStatus::Finalizada
        );
        if caregiver_drives && !as_caregiver {
            return Err(DomainError::NotAuthorized);
        }
        if target == BookingStatus::Cancelada && !as_client {
            return Err(DomainError::NotAuthorized);
        }

        let allowed_from: &[BookingStatus] = match target {
            BookingStatus::Pendiente => &[],
            BookingStatus::Aceptada | BookingStatus::Rechazada => &[BookingStatus::Pendiente],
            BookingStatus::EnProgreso => &[BookingStatus::Aceptada],
            BookingStatus::Finalizada => &[BookingStatus::EnProgreso],
            BookingStatus::Cancelada => &[BookingStatus::Pendiente, BookingStatus::Aceptada],
        };
        if !allowed_from.contains(&booking.status) {
            return Err(DomainError::InvalidTransition {
                from: booking.status,
                to: target,
            });
        }

        let updated = self.repo.set_status(id, target).await.map_err(db_err)?;
        info!(booking_id = id, from = %booking.status, to = %target, "booking status changed");
        Ok(updated)
    }

    /// Flags the booking paid. Payments attach from acceptance onward; a
    /// pending, rejected or cancelled booking takes none, and paying
    /// twice conflicts.
    #[instrument(name = "bookings.service.mark_paid", skip(self))]
    pub async fn mark_paid(&self, id: i64, payment_method: &str) -> Result<(), DomainError> {
        let booking = self
            .repo
            .find(id)
            .await
            .map_err(db_err)?
            .ok_or(DomainError::BookingNotFound)?;
        if booking.is_paid {
            return Err(DomainError::AlreadyPaid);
        }
        if !matches!(
            booking.status,
            BookingStatus::Aceptada | BookingStatus::EnProgreso | BookingStatus::Finalizada
        ) {
            return Err(DomainError::NotPayable {
                status: booking.status,
            });
        }
        self.repo
            .set_paid(id, payment_method)
            .await
            .map_err(db_err)?;
        info!(booking_id = id, payment_method, "booking marked paid");
        Ok(())
    }

    /// Flags the booking rated. Only a finished booking takes a rating,
    /// and only once.
    #[instrument(name = "bookings.service.mark_rated", skip(self))]
    pub async fn mark_rated(&self, id: i64) -> Result<(), DomainError> {
        let booking = self
            .repo
            .find(id)
            .await
            .map_err(db_err)?
            .ok_or(DomainError::BookingNotFound)?;
        if booking.status != BookingStatus::Finalizada {
            return Err(DomainError::NotFinished {
                status: booking.status,
            });
        }
        if booking.is_rated {
            return Err(DomainError::AlreadyRated);
        }
        self.repo.set_rated(id).await.map_err(db_err)?;
        info!(booking_id = id, "booking marked rated");
        Ok(())
    }

    /// Contract-side lookup used by the ratings wiring; no caller checks.
    pub async fn find_booking(&self, id: i64) -> Result<Option<Booking>, DomainError> {
        self.repo.find(id).await.map_err(db_err)
    }

    async fn is_participant(&self, booking: &Booking, user_id: i64) -> Result<bool, DomainError> {
        if booking.client_id == user_id {
            return Ok(true);
        }
        let profile = self
            .caregivers
            .profile_id_for_user(user_id)
            .await
            .map_err(wiring_err)?;
        Ok(profile == Some(booking.caregiver_id))
    }
}
