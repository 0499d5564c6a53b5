use std::sync::Arc;

use apikit::auth::{Identity, Role};
use apikit::problem::{Problem, ProblemResponse};
use axum::{
    extract::Path,
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};
use rust_decimal::Decimal;

use crate::api::rest::dto::{CreateRatingReq, RatingDto};
use crate::api::rest::error::map_domain_error;
use crate::domain::service::Service;

#[utoipa::path(
    post,
    path = "/api/calificaciones",
    request_body = CreateRatingReq,
    responses(
        (status = 201, description = "Rating recorded", body = RatingDto),
        (status = 400, description = "Score or comment out of bounds", body = Problem),
        (status = 403, description = "Caller is not the booking's client", body = Problem),
        (status = 409, description = "Booking not finished or already rated", body = Problem)
    ),
    tag = "ratings"
)]
pub async fn create(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    uri: Uri,
    Json(req): Json<CreateRatingReq>,
) -> Result<(StatusCode, Json<RatingDto>), ProblemResponse> {
    identity.require_role(Role::Cliente)?;
    match svc.create(identity.user_id, req.into()).await {
        Ok(rating) => Ok((StatusCode::CREATED, Json(rating.into()))),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

#[utoipa::path(
    get,
    path = "/api/calificaciones/cuidador/{caregiverId}",
    params(("caregiverId" = i64, Path, description = "Caregiver profile id")),
    responses(
        (status = 200, description = "The caregiver's ratings, newest first", body = [RatingDto]),
        (status = 401, description = "Missing or invalid token", body = Problem)
    ),
    tag = "ratings"
)]
pub async fn list_for_caregiver(
    Extension(svc): Extension<Arc<Service>>,
    _identity: Identity,
    uri: Uri,
    Path(caregiver_id): Path<i64>,
) -> Result<Json<Vec<RatingDto>>, ProblemResponse> {
    match svc.list_for_caregiver(caregiver_id).await {
        Ok(ratings) => Ok(Json(ratings.into_iter().map(Into::into).collect())),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

/// An unknown caregiver id reads as unrated, not as an error.
#[utoipa::path(
    get,
    path = "/api/calificaciones/cuidador/{caregiverId}/promedio",
    params(("caregiverId" = i64, Path, description = "Caregiver profile id")),
    responses(
        (status = 200, description = "Mean score rounded to two decimals; 0 when unrated", body = Decimal),
        (status = 401, description = "Missing or invalid token", body = Problem)
    ),
    tag = "ratings"
)]
pub async fn average(
    Extension(svc): Extension<Arc<Service>>,
    _identity: Identity,
    uri: Uri,
    Path(caregiver_id): Path<i64>,
) -> Result<Json<Decimal>, ProblemResponse> {
    match svc.average_for_caregiver(caregiver_id).await {
        Ok(avg) => Ok(Json(avg)),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}
