//! Profile lifecycle rules: one active profile per user, unique document
//! ids among active rows, soft delete, one-way verification, and the
//! rating cache that the ratings module pushes into.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::{info, instrument};

use super::error::DomainError;
use super::model::{CaregiverProfile, NewProfile, ProfilePatch};
use super::repo::CaregiversRepository;

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9]{1,15}$").expect("phone regex"));

const BIO_MAX: usize = 2000;
const EXPERIENCE_MAX: usize = 2000;
const SERVICE_HOURS_MAX: usize = 200;

pub struct Service {
    repo: Arc<dyn CaregiversRepository>,
}

fn db_err(e: anyhow::Error) -> DomainError {
    DomainError::database(e.to_string())
}

fn validate_document(document_id: &str) -> Result<(), DomainError> {
    let trimmed = document_id.trim();
    if trimmed.is_empty() || trimmed.chars().count() > 50 {
        return Err(DomainError::validation(
            "documentId",
            "must be 1-50 characters",
        ));
    }
    Ok(())
}

fn validate_phone(phone: &str) -> Result<(), DomainError> {
    if !PHONE_RE.is_match(phone) {
        return Err(DomainError::validation(
            "emergencyPhone",
            "must be digits with an optional leading '+', at most 15 digits",
        ));
    }
    Ok(())
}

fn validate_text(field: &'static str, value: &str, max: usize) -> Result<(), DomainError> {
    if value.chars().count() > max {
        return Err(DomainError::validation(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

fn validate_rate(rate: Decimal) -> Result<(), DomainError> {
    if rate.is_sign_negative() {
        return Err(DomainError::validation(
            "hourlyRate",
            "must not be negative",
        ));
    }
    Ok(())
}

impl Service {
    pub fn new(repo: Arc<dyn CaregiversRepository>) -> Self {
        Self { repo }
    }

    #[instrument(name = "caregivers.service.create", skip(self, profile))]
    pub async fn create(
        &self,
        user_id: i64,
        profile: NewProfile,
    ) -> Result<CaregiverProfile, DomainError> {
        validate_document(&profile.document_id)?;
        validate_phone(&profile.emergency_phone)?;
        validate_text("bio", &profile.bio, BIO_MAX)?;
        validate_text("experience", &profile.experience, EXPERIENCE_MAX)?;
        validate_text("serviceHours", &profile.service_hours, SERVICE_HOURS_MAX)?;
        validate_rate(profile.hourly_rate)?;

        if self
            .repo
            .find_active_by_user(user_id)
            .await
            .map_err(db_err)?
            .is_some()
        {
            return Err(DomainError::profile_exists(user_id));
        }
        if self
            .repo
            .document_taken(profile.document_id.trim(), None)
            .await
            .map_err(db_err)?
        {
            return Err(DomainError::document_taken(profile.document_id.trim()));
        }

        let created = self
            .repo
            .insert(
                user_id,
                NewProfile {
                    document_id: profile.document_id.trim().to_owned(),
                    ..profile
                },
            )
            .await
            .map_err(db_err)?;

        info!(profile_id = created.id, user_id, "caregiver profile created");
        Ok(created)
    }

    #[instrument(name = "caregivers.service.list", skip(self))]
    pub async fn list(&self) -> Result<Vec<CaregiverProfile>, DomainError> {
        self.repo.list_active().await.map_err(db_err)
    }

    #[instrument(name = "caregivers.service.get", skip(self))]
    pub async fn get(&self, id: i64) -> Result<CaregiverProfile, DomainError> {
        self.repo
            .find_active(id)
            .await
            .map_err(db_err)?
            .ok_or(DomainError::ProfileNotFound)
    }

    #[instrument(name = "caregivers.service.get_by_user", skip(self))]
    pub async fn get_by_user(&self, user_id: i64) -> Result<CaregiverProfile, DomainError> {
        self.repo
            .find_active_by_user(user_id)
            .await
            .map_err(db_err)?
            .ok_or(DomainError::ProfileNotFound)
    }

    /// Updates the caller's own active profile. A document change re-runs
    /// the uniqueness check against other active rows.
    #[instrument(name = "caregivers.service.update_own", skip(self, patch))]
    pub async fn update_own(
        &self,
        user_id: i64,
        patch: ProfilePatch,
    ) -> Result<CaregiverProfile, DomainError> {
        let current = self
            .repo
            .find_active_by_user(user_id)
            .await
            .map_err(db_err)?
            .ok_or(DomainError::ProfileNotFound)?;

        let mut clean = ProfilePatch::default();
        if let Some(document_id) = patch.document_id {
            validate_document(&document_id)?;
            let trimmed = document_id.trim().to_owned();
            if trimmed != current.document_id
                && self
                    .repo
                    .document_taken(&trimmed, Some(current.id))
                    .await
                    .map_err(db_err)?
            {
                return Err(DomainError::document_taken(trimmed));
            }
            clean.document_id = Some(trimmed);
        }
        if let Some(phone) = patch.emergency_phone {
            validate_phone(&phone)?;
            clean.emergency_phone = Some(phone);
        }
        if let Some(bio) = patch.bio {
            validate_text("bio", &bio, BIO_MAX)?;
            clean.bio = Some(bio);
        }
        if let Some(experience) = patch.experience {
            validate_text("experience", &experience, EXPERIENCE_MAX)?;
            clean.experience = Some(experience);
        }
        if let Some(service_hours) = patch.service_hours {
            validate_text("serviceHours", &service_hours, SERVICE_HOURS_MAX)?;
            clean.service_hours = Some(service_hours);
        }
        if let Some(rate) = patch.hourly_rate {
            validate_rate(rate)?;
            clean.hourly_rate = Some(rate);
        }

        let updated = self
            .repo
            .update(current.id, clean)
            .await
            .map_err(db_err)?;
        info!(profile_id = updated.id, "caregiver profile updated");
        Ok(updated)
    }

    /// Soft delete; reports not-found when no active profile exists, so a
    /// second delete answers 404.
    #[instrument(name = "caregivers.service.delete_own", skip(self))]
    pub async fn delete_own(&self, user_id: i64) -> Result<(), DomainError> {
        let removed = self
            .repo
            .soft_delete_by_user(user_id)
            .await
            .map_err(db_err)?;
        if !removed {
            return Err(DomainError::ProfileNotFound);
        }
        info!(user_id, "caregiver profile soft-deleted");
        Ok(())
    }

    /// One-way verification flip; verifying twice is a no-op success.
    #[instrument(name = "caregivers.service.verify", skip(self))]
    pub async fn verify(&self, id: i64) -> Result<CaregiverProfile, DomainError> {
        let profile = self
            .repo
            .find_active(id)
            .await
            .map_err(db_err)?
            .ok_or(DomainError::ProfileNotFound)?;

        if profile.document_verified {
            return Ok(profile);
        }

        self.repo.mark_verified(profile.id).await.map_err(db_err)?;
        info!(profile_id = profile.id, "caregiver document verified");
        self.repo
            .find_active(id)
            .await
            .map_err(db_err)?
            .ok_or(DomainError::ProfileNotFound)
    }

    /// Refreshes the cached rating average, rounded to two decimals.
    /// Zero means unrated; scores themselves are 1..=5.
    #[instrument(name = "caregivers.service.set_avg_rating", skip(self))]
    pub async fn set_avg_rating(&self, id: i64, avg: Decimal) -> Result<(), DomainError> {
        if avg.is_sign_negative() || avg > Decimal::from(5) {
            return Err(DomainError::validation(
                "averageRating",
                "must be between 0 and 5",
            ));
        }
        let rounded = avg.round_dp(2);
        let found = self
            .repo
            .set_avg_rating(id, rounded)
            .await
            .map_err(db_err)?;
        if !found {
            return Err(DomainError::ProfileNotFound);
        }
        info!(profile_id = id, avg = %rounded, "caregiver rating cache refreshed");
        Ok(())
    }

    /// Contract-side check used by bookings before accepting a request.
    pub async fn exists_active(&self, id: i64) -> Result<bool, DomainError> {
        Ok(self.repo.find_active(id).await.map_err(db_err)?.is_some())
    }

    /// Contract-side translation of a caregiver's user id to their
    /// marketplace profile id.
    pub async fn profile_id_for_user(&self, user_id: i64) -> Result<Option<i64>, DomainError> {
        Ok(self
            .repo
            .find_active_by_user(user_id)
            .await
            .map_err(db_err)?
            .map(|p| p.id))
    }
}
