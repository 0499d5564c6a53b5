//! Profile lifecycle rules: one active profile per user, unique document
//! ids among active rows, soft delete, one-way verification.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, instrument};

use super::error::DomainError;
use super::model::{ClientProfile, NewProfile, ProfilePatch};
use super::repo::ClientsRepository;

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9]{1,15}$").expect("phone regex"));

pub struct Service {
    repo: Arc<dyn ClientsRepository>,
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

impl Service {
    pub fn new(repo: Arc<dyn ClientsRepository>) -> Self {
        Self { repo }
    }

    #[instrument(name = "clients.service.create", skip(self, profile))]
    pub async fn create(
        &self,
        user_id: i64,
        profile: NewProfile,
    ) -> Result<ClientProfile, DomainError> {
        validate_document(&profile.document_id)?;
        validate_phone(&profile.emergency_phone)?;

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
                    emergency_phone: profile.emergency_phone,
                },
            )
            .await
            .map_err(db_err)?;

        info!(profile_id = created.id, user_id, "client profile created");
        Ok(created)
    }

    #[instrument(name = "clients.service.list", skip(self))]
    pub async fn list(&self) -> Result<Vec<ClientProfile>, DomainError> {
        self.repo.list_active().await.map_err(db_err)
    }

    #[instrument(name = "clients.service.get", skip(self))]
    pub async fn get(&self, id: i64) -> Result<ClientProfile, DomainError> {
        self.repo
            .find_active(id)
            .await
            .map_err(db_err)?
            .ok_or(DomainError::ProfileNotFound)
    }

    #[instrument(name = "clients.service.get_by_user", skip(self))]
    pub async fn get_by_user(&self, user_id: i64) -> Result<ClientProfile, DomainError> {
        self.repo
            .find_active_by_user(user_id)
            .await
            .map_err(db_err)?
            .ok_or(DomainError::ProfileNotFound)
    }

    /// Updates the caller's own active profile. A document change re-runs
    /// the uniqueness check against other active rows.
    #[instrument(name = "clients.service.update_own", skip(self, patch))]
    pub async fn update_own(
        &self,
        user_id: i64,
        patch: ProfilePatch,
    ) -> Result<ClientProfile, DomainError> {
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

        let updated = self
            .repo
            .update(current.id, clean)
            .await
            .map_err(db_err)?;
        info!(profile_id = updated.id, "client profile updated");
        Ok(updated)
    }

    /// Soft delete; reports not-found when no active profile exists, so a
    /// second delete answers 404.
    #[instrument(name = "clients.service.delete_own", skip(self))]
    pub async fn delete_own(&self, user_id: i64) -> Result<(), DomainError> {
        let removed = self
            .repo
            .soft_delete_by_user(user_id)
            .await
            .map_err(db_err)?;
        if !removed {
            return Err(DomainError::ProfileNotFound);
        }
        info!(user_id, "client profile soft-deleted");
        Ok(())
    }

    /// One-way verification flip; verifying twice is a no-op success.
    #[instrument(name = "clients.service.verify", skip(self))]
    pub async fn verify(&self, id: i64) -> Result<ClientProfile, DomainError> {
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
        info!(profile_id = profile.id, "client document verified");
        self.repo
            .find_active(id)
            .await
            .map_err(db_err)?
            .ok_or(DomainError::ProfileNotFound)
    }
}
