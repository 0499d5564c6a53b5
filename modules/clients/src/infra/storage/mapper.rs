use anyhow::{anyhow, Result};

use crate::domain::model::ClientProfile;
use crate::infra::storage::entities::client_profiles;

pub fn profile_from_row(row: client_profiles::Model) -> Result<ClientProfile> {
    let status = row
        .status
        .parse()
        .map_err(|_| anyhow!("profile {} has unknown status '{}'", row.id, row.status))?;
    Ok(ClientProfile {
        id: row.id,
        user_id: row.user_id,
        document_id: row.document_id,
        emergency_phone: row.emergency_phone,
        document_verified: row.document_verified,
        verified_at: row.verified_at,
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}
