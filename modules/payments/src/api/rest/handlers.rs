use std::sync::Arc;

use apikit::auth::Identity;
use apikit::problem::{Problem, ProblemResponse};
use axum::{
    extract::Path,
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};

use crate::api::rest::dto::{CardDto, CreateOrderReq, SaveCardReq};
use crate::api::rest::error::map_domain_error;
use crate::domain::service::Service;

/// The gateway's answer goes back verbatim so the browser SDK can read
/// the order id and approval links from it.
#[utoipa::path(
    post,
    path = "/api/pagos/create-order",
    request_body = CreateOrderReq,
    responses(
        (status = 200, description = "PayPal's order answer, passed through verbatim"),
        (status = 400, description = "Invalid amount or gateway refusal", body = Problem),
        (status = 404, description = "Attached booking does not exist", body = Problem),
        (status = 409, description = "Attached booking cannot be paid", body = Problem)
    ),
    tag = "payments"
)]
pub async fn create_order(
    Extension(svc): Extension<Arc<Service>>,
    _identity: Identity,
    uri: Uri,
    Json(req): Json<CreateOrderReq>,
) -> Result<Json<serde_json::Value>, ProblemResponse> {
    match svc.create_order(req.into()).await {
        Ok(answer) => Ok(Json(answer)),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

#[utoipa::path(
    post,
    path = "/api/pagos/cards",
    request_body = SaveCardReq,
    responses(
        (status = 201, description = "Card stored; only the mask is returned", body = CardDto),
        (status = 400, description = "Number, holder, expiry or CVV out of shape", body = Problem),
        (status = 401, description = "Missing or invalid token", body = Problem)
    ),
    tag = "payments"
)]
pub async fn save_card(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    uri: Uri,
    Json(req): Json<SaveCardReq>,
) -> Result<(StatusCode, Json<CardDto>), ProblemResponse> {
    match svc.save_card(identity.user_id, req.into()).await {
        Ok(card) => Ok((StatusCode::CREATED, Json(card.into()))),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

#[utoipa::path(
    get,
    path = "/api/pagos/cards",
    responses(
        (status = 200, description = "The caller's cards, newest first", body = [CardDto]),
        (status = 401, description = "Missing or invalid token", body = Problem)
    ),
    tag = "payments"
)]
pub async fn my_cards(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    uri: Uri,
) -> Result<Json<Vec<CardDto>>, ProblemResponse> {
    match svc.list_cards(identity.user_id).await {
        Ok(cards) => Ok(Json(cards.into_iter().map(Into::into).collect())),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

/// Foreign and missing card ids both answer 404.
#[utoipa::path(
    delete,
    path = "/api/pagos/cards/{id}",
    params(("id" = i64, Path, description = "Card id")),
    responses(
        (status = 204, description = "Card deleted"),
        (status = 404, description = "No card of the caller's matches", body = Problem)
    ),
    tag = "payments"
)]
pub async fn delete_card(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    uri: Uri,
    Path(id): Path<i64>,
) -> Result<StatusCode, ProblemResponse> {
    match svc.delete_card(identity.user_id, id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}
