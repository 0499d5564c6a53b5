use std::sync::Arc;

use apikit::auth::{Identity, Role};
use apikit::problem::{from_parts, Problem, ProblemResponse};
use axum::{
    extract::Path,
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};

use crate::api::rest::dto::{BookingDto, ChangeStatusReq, CreateBookingReq, MarkPaidReq};
use crate::api::rest::error::map_domain_error;
use crate::domain::model::{BookingStatus, Caller};
use crate::domain::service::Service;

fn caller_of(identity: &Identity) -> Caller {
    Caller {
        user_id: identity.user_id,
        is_admin: identity.is_admin(),
    }
}

#[utoipa::path(
    post,
    path = "/api/solicitudes",
    request_body = CreateBookingReq,
    responses(
        (status = 201, description = "Booking created in Pendiente", body = BookingDto),
        (status = 400, description = "Validation failed or caregiver unknown", body = Problem),
        (status = 403, description = "Caller is not a client", body = Problem)
    ),
    tag = "bookings"
)]
pub async fn create(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    uri: Uri,
    Json(req): Json<CreateBookingReq>,
) -> Result<(StatusCode, Json<BookingDto>), ProblemResponse> {
    identity.require_role(Role::Cliente)?;
    match svc.create(identity.user_id, req.into()).await {
        Ok(booking) => Ok((StatusCode::CREATED, Json(booking.into()))),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

/// Participants and admins see the booking; everyone else gets the same
/// 403 whether or not the id exists.
#[utoipa::path(
    get,
    path = "/api/solicitudes/{id}",
    params(("id" = i64, Path, description = "Booking id")),
    responses(
        (status = 200, description = "The booking", body = BookingDto),
        (status = 403, description = "Caller is not a participant", body = Problem),
        (status = 404, description = "No booking with this id (admins only)", body = Problem)
    ),
    tag = "bookings"
)]
pub async fn get(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    uri: Uri,
    Path(id): Path<i64>,
) -> Result<Json<BookingDto>, ProblemResponse> {
    match svc.get(id, &caller_of(&identity)).await {
        Ok(booking) => Ok(Json(booking.into())),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

#[utoipa::path(
    get,
    path = "/api/solicitudes/mias",
    responses(
        (status = 200, description = "The caller's bookings, newest first", body = [BookingDto]),
        (status = 403, description = "Caller is not a client", body = Problem)
    ),
    tag = "bookings"
)]
pub async fn mine(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    uri: Uri,
) -> Result<Json<Vec<BookingDto>>, ProblemResponse> {
    identity.require_role(Role::Cliente)?;
    match svc.list_mine(identity.user_id).await {
        Ok(bookings) => Ok(Json(bookings.into_iter().map(Into::into).collect())),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

/// Empty when the caller has no active caregiver profile.
#[utoipa::path(
    get,
    path = "/api/solicitudes/asignadas",
    responses(
        (status = 200, description = "Bookings assigned to the caller's profile, newest first", body = [BookingDto]),
        (status = 403, description = "Caller is not a caregiver", body = Problem)
    ),
    tag = "bookings"
)]
pub async fn assigned(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    uri: Uri,
) -> Result<Json<Vec<BookingDto>>, ProblemResponse> {
    identity.require_role(Role::Cuidador)?;
    match svc.list_assigned(identity.user_id).await {
        Ok(bookings) => Ok(Json(bookings.into_iter().map(Into::into).collect())),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

#[utoipa::path(
    put,
    path = "/api/solicitudes/{id}/estado",
    params(("id" = i64, Path, description = "Booking id")),
    request_body = ChangeStatusReq,
    responses(
        (status = 200, description = "Booking after the transition", body = BookingDto),
        (status = 400, description = "Unknown target status", body = Problem),
        (status = 403, description = "Caller may not drive this transition", body = Problem),
        (status = 409, description = "Transition not allowed from the current status", body = Problem)
    ),
    tag = "bookings"
)]
pub async fn change_status(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    uri: Uri,
    Path(id): Path<i64>,
    Json(req): Json<ChangeStatusReq>,
) -> Result<Json<BookingDto>, ProblemResponse> {
    let Ok(target) = req.estado.parse::<BookingStatus>() else {
        return Err(from_parts(
            StatusCode::BAD_REQUEST,
            "BOOKINGS_VALIDATION",
            "Validation error",
            format!("estado: unknown status '{}'", req.estado),
            uri.path(),
        ));
    };
    match svc.change_status(id, target, &caller_of(&identity)).await {
        Ok(booking) => Ok(Json(booking.into())),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

/// Service-wiring endpoint: the payments module confirms a capture here
/// when deployed out of process. Unauthenticated like the directory
/// lookups; it carries no account data.
#[utoipa::path(
    post,
    path = "/api/solicitudes/{id}/pagar",
    params(("id" = i64, Path, description = "Booking id")),
    request_body = MarkPaidReq,
    responses(
        (status = 204, description = "Booking flagged paid"),
        (status = 404, description = "No booking with this id", body = Problem),
        (status = 409, description = "Already paid or not in a payable status", body = Problem)
    ),
    tag = "bookings"
)]
pub async fn pay(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Path(id): Path<i64>,
    Json(req): Json<MarkPaidReq>,
) -> Result<StatusCode, ProblemResponse> {
    let method = req.payment_method.trim();
    if method.is_empty() || method.chars().count() > 50 {
        return Err(from_parts(
            StatusCode::BAD_REQUEST,
            "BOOKINGS_VALIDATION",
            "Validation error",
            "paymentMethod: must be 1-50 characters",
            uri.path(),
        ));
    }
    match svc.mark_paid(id, method).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

/// Service-wiring endpoint: the ratings module flips the rated flag here
/// when deployed out of process.
#[utoipa::path(
    post,
    path = "/api/solicitudes/{id}/calificar",
    params(("id" = i64, Path, description = "Booking id")),
    responses(
        (status = 204, description = "Booking flagged rated"),
        (status = 404, description = "No booking with this id", body = Problem),
        (status = 409, description = "Not finished or already rated", body = Problem)
    ),
    tag = "bookings"
)]
pub async fn rate(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Path(id): Path<i64>,
) -> Result<StatusCode, ProblemResponse> {
    match svc.mark_rated(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}
