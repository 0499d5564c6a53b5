use std::sync::Arc;

use apikit::auth::{Identity, Role};
use apikit::problem::{Problem, ProblemResponse};
use apikit::DirectoryClient;
use axum::{
    extract::Path,
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};

use crate::api::rest::dto::{ClientProfileDto, CreateProfileReq, UpdateProfileReq};
use crate::api::rest::error::map_domain_error;
use crate::domain::model::ClientProfile;
use crate::domain::service::Service;

#[utoipa::path(
    post,
    path = "/api/clientes",
    request_body = CreateProfileReq,
    responses(
        (status = 201, description = "Profile created", body = ClientProfileDto),
        (status = 400, description = "Validation failed", body = Problem),
        (status = 403, description = "Caller is not a client", body = Problem),
        (status = 409, description = "Active profile or document already exists", body = Problem)
    ),
    tag = "clients"
)]
pub async fn create(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    uri: Uri,
    Json(req): Json<CreateProfileReq>,
) -> Result<(StatusCode, Json<ClientProfileDto>), ProblemResponse> {
    identity.require_role(Role::Cliente)?;
    match svc.create(identity.user_id, req.into()).await {
        Ok(profile) => Ok((StatusCode::CREATED, Json(profile.into()))),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

#[utoipa::path(
    get,
    path = "/api/clientes",
    responses(
        (status = 200, description = "Every active profile, enriched", body = [ClientProfileDto]),
        (status = 403, description = "Caller is not an admin", body = Problem)
    ),
    tag = "clients"
)]
pub async fn list(
    Extension(svc): Extension<Arc<Service>>,
    Extension(directory): Extension<Arc<DirectoryClient>>,
    identity: Identity,
    uri: Uri,
) -> Result<Json<Vec<ClientProfileDto>>, ProblemResponse> {
    identity.require_admin()?;
    match svc.list().await {
        Ok(profiles) => Ok(Json(enrich_all(&directory, profiles).await)),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

#[utoipa::path(
    get,
    path = "/api/clientes/{id}",
    params(("id" = i64, Path, description = "Profile id")),
    responses(
        (status = 200, description = "The profile, enriched", body = ClientProfileDto),
        (status = 404, description = "No active profile with this id", body = Problem)
    ),
    tag = "clients"
)]
pub async fn get(
    Extension(svc): Extension<Arc<Service>>,
    Extension(directory): Extension<Arc<DirectoryClient>>,
    _identity: Identity,
    uri: Uri,
    Path(id): Path<i64>,
) -> Result<Json<ClientProfileDto>, ProblemResponse> {
    match svc.get(id).await {
        Ok(profile) => Ok(Json(enrich_one(&directory, profile).await)),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

#[utoipa::path(
    get,
    path = "/api/clientes/usuario/{userId}",
    params(("userId" = i64, Path, description = "Owning user id")),
    responses(
        (status = 200, description = "The user's active profile, enriched", body = ClientProfileDto),
        (status = 404, description = "The user has no active profile", body = Problem)
    ),
    tag = "clients"
)]
pub async fn get_by_user(
    Extension(svc): Extension<Arc<Service>>,
    Extension(directory): Extension<Arc<DirectoryClient>>,
    _identity: Identity,
    uri: Uri,
    Path(user_id): Path<i64>,
) -> Result<Json<ClientProfileDto>, ProblemResponse> {
    match svc.get_by_user(user_id).await {
        Ok(profile) => Ok(Json(enrich_one(&directory, profile).await)),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

#[utoipa::path(
    put,
    path = "/api/clientes",
    request_body = UpdateProfileReq,
    responses(
        (status = 200, description = "Updated profile", body = ClientProfileDto),
        (status = 404, description = "The caller has no active profile", body = Problem),
        (status = 409, description = "Document taken by another active profile", body = Problem)
    ),
    tag = "clients"
)]
pub async fn update_own(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    uri: Uri,
    Json(req): Json<UpdateProfileReq>,
) -> Result<Json<ClientProfileDto>, ProblemResponse> {
    identity.require_role(Role::Cliente)?;
    match svc.update_own(identity.user_id, req.into()).await {
        Ok(profile) => Ok(Json(profile.into())),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

#[utoipa::path(
    delete,
    path = "/api/clientes",
    responses(
        (status = 204, description = "Profile soft-deleted"),
        (status = 404, description = "The caller has no active profile", body = Problem)
    ),
    tag = "clients"
)]
pub async fn delete_own(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    uri: Uri,
) -> Result<StatusCode, ProblemResponse> {
    identity.require_role(Role::Cliente)?;
    match svc.delete_own(identity.user_id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

#[utoipa::path(
    post,
    path = "/api/clientes/{id}/verificar",
    params(("id" = i64, Path, description = "Profile id")),
    responses(
        (status = 200, description = "Profile with the verification flag set", body = ClientProfileDto),
        (status = 403, description = "Caller is not an admin", body = Problem),
        (status = 404, description = "No active profile with this id", body = Problem)
    ),
    tag = "clients"
)]
pub async fn verify(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    uri: Uri,
    Path(id): Path<i64>,
) -> Result<Json<ClientProfileDto>, ProblemResponse> {
    identity.require_admin()?;
    match svc.verify(id).await {
        Ok(profile) => Ok(Json(profile.into())),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

async fn enrich_one(directory: &DirectoryClient, profile: ClientProfile) -> ClientProfileDto {
    let entry = directory.lookup(profile.user_id).await;
    ClientProfileDto::from(profile).with_directory(entry.as_ref())
}

/// One batch directory call for the whole list.
async fn enrich_all(
    directory: &DirectoryClient,
    profiles: Vec<ClientProfile>,
) -> Vec<ClientProfileDto> {
    let ids: Vec<i64> = profiles.iter().map(|p| p.user_id).collect();
    let entries = directory.lookup_many(&ids).await;
    profiles
        .into_iter()
        .map(|p| {
            let entry = entries.get(&p.user_id);
            ClientProfileDto::from(p).with_directory(entry)
        })
        .collect()
}
