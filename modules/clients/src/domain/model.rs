use chrono::{DateTime, Utc};

/// Lifecycle of a profile row. Deleted rows stay in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileStatus {
    Activo,
    Eliminado,
}

impl ProfileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileStatus::Activo => "Activo",
            ProfileStatus::Eliminado => "Eliminado",
        }
    }
}

impl std::str::FromStr for ProfileStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Activo" => Ok(ProfileStatus::Activo),
            "Eliminado" => Ok(ProfileStatus::Eliminado),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientProfile {
    pub id: i64,
    pub user_id: i64,
    pub document_id: String,
    pub emergency_phone: String,
    pub document_verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub status: ProfileStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Creation payload; the owning user comes from the access token.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub document_id: String,
    pub emergency_phone: String,
}

/// Partial update of the caller's own profile.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub document_id: Option<String>,
    pub emergency_phone: Option<String>,
}
