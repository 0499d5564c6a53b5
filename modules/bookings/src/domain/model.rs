use chrono::{DateTime, Utc};

/// Booking lifecycle. Transitions and their actors are enforced in the
/// service; no other state ever reaches storage.
///
/// ```text
/// Pendiente -> Aceptada -> EnProgreso -> Finalizada
///     |    \-> Rechazada
///     \------> Cancelada (also from Aceptada)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Pendiente,
    Aceptada,
    Rechazada,
    EnProgreso,
    Finalizada,
    Cancelada,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pendiente => "Pendiente",
            BookingStatus::Aceptada => "Aceptada",
            BookingStatus::Rechazada => "Rechazada",
            BookingStatus::EnProgreso => "EnProgreso",
            BookingStatus::Finalizada => "Finalizada",
            BookingStatus::Cancelada => "Cancelada",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pendiente" => Ok(BookingStatus::Pendiente),
            "Aceptada" => Ok(BookingStatus::Aceptada),
            "Rechazada" => Ok(BookingStatus::Rechazada),
            "EnProgreso" => Ok(BookingStatus::EnProgreso),
            "Finalizada" => Ok(BookingStatus::Finalizada),
            "Cancelada" => Ok(BookingStatus::Cancelada),
            _ => Err(()),
        }
    }
}

/// `client_id` is the requesting user's id; `caregiver_id` is the
/// caregiver's marketplace profile id.
#[derive(Debug, Clone)]
pub struct Booking {
    pub id: i64,
    pub client_id: i64,
    pub caregiver_id: i64,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub service_type: String,
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub is_paid: bool,
    pub is_rated: bool,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Creation payload; the client comes from the access token.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub caregiver_id: i64,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub service_type: String,
    pub notes: Option<String>,
}

/// Who is asking. Built from token claims by the REST layer.
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub user_id: i64,
    pub is_admin: bool,
}
