use anyhow::{anyhow, Result};

use crate::domain::model::{ResetToken, User};
use crate::infra::storage::entities::{password_resets, users};

/// Convert a database row to the domain user. The role column is free text
/// at rest; an unknown value is a data corruption error, not a variant.
pub fn user_from_row(row: users::Model) -> Result<User> {
    let role = row
        .role
        .parse()
        .map_err(|_| anyhow!("user {} has unknown role '{}'", row.id, row.role))?;
    Ok(User {
        id: row.id,
        email: row.email,
        password_hash: row.password_hash,
        name: row.display_name,
        phone: row.phone,
        tenant: row.tenant_id,
        role,
        locked: row.locked,
        locked_at: row.locked_at,
        failed_logins: row.failed_logins,
        last_failed_login: row.last_failed_login,
        mfa_enabled: row.mfa_enabled,
        created_at: row.created_at,
    })
}

pub fn reset_token_from_row(row: password_resets::Model) -> ResetToken {
    ResetToken {
        id: row.id,
        expires_at: row.expires_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apikit::auth::Role;
    use chrono::Utc;

    fn row(role: &str) -> users::Model {
        users::Model {
            id: 7,
            email: "ana@example.com".into(),
            password_hash: "x".into(),
            display_name: "Ana".into(),
            phone: "+573001112233".into(),
            tenant_id: "acme".into(),
            role: role.into(),
            locked: false,
            locked_at: None,
            failed_logins: 0,
            last_failed_login: None,
            mfa_enabled: false,
            mfa_secret: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn maps_known_role() {
        let user = user_from_row(row("Cuidador")).unwrap();
        assert_eq!(user.role, Role::Cuidador);
        assert_eq!(user.tenant, "acme");
    }

    #[test]
    fn rejects_unknown_role() {
        let err = user_from_row(row("SuperUser")).unwrap_err();
        assert!(err.to_string().contains("unknown role"));
    }
}
