use anyhow::{anyhow, Result};

use crate::domain::model::CaregiverProfile;
use crate::infra::storage::entities::caregiver_profiles;

pub fn profile_from_row(row: caregiver_profiles::Model) -> Result<CaregiverProfile> {
    let status = row
        .status
        .parse()
        .map_err(|_| anyhow!("profile {} has unknown status '{}'", row.id, row.status))?;
    Ok(CaregiverProfile {
        id: row.id,
        user_id: row.user_id,
        document_id: row.document_id,
        emergency_phone: row.emergency_phone,
        bio: row.bio,
        experience: row.experience,
        service_hours: row.service_hours,
        hourly_rate: row.hourly_rate,
        avg_rating: row.avg_rating,
        document_verified: row.document_verified,
        verified_at: row.verified_at,
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}
