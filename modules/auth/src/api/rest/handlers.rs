use std::sync::Arc;

use apikit::auth::Identity;
use apikit::problem::{from_parts, Problem, ProblemResponse};
use axum::{
    extract::{Path, Query},
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};
use tracing::{error, info};

use crate::api::rest::dto::{
    ChangePasswordReq, ConfirmResetReq, DirectoryEntryDto, DirectoryQuery, LoginReq, RegisterReq,
    ResetAckDto, ResetRequestReq, SessionDto, SetRoleReq, UserDto,
};
use crate::api::rest::error::map_domain_error;
use crate::domain::service::Service;

// Request bodies on this surface carry credentials; they are never logged.

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterReq,
    responses(
        (status = 200, description = "Account created, session issued", body = SessionDto),
        (status = 400, description = "Validation failed", body = Problem),
        (status = 409, description = "Email or phone already registered", body = Problem)
    ),
    tag = "auth"
)]
pub async fn register(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Json(req): Json<RegisterReq>,
) -> Result<Json<SessionDto>, ProblemResponse> {
    info!(tenant = %req.tenant_id, "registration requested");

    match svc.register(req.into()).await {
        Ok(session) => Ok(Json(session.into())),
        Err(e) => {
            error!("registration failed: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Session issued", body = SessionDto),
        (status = 401, description = "Invalid credentials", body = Problem)
    ),
    tag = "auth"
)]
pub async fn login(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Json(req): Json<LoginReq>,
) -> Result<Json<SessionDto>, ProblemResponse> {
    match svc.login(&req.tenant_id, &req.email, &req.password).await {
        Ok(session) => Ok(Json(session.into())),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "The caller's own account", body = UserDto),
        (status = 401, description = "Missing or invalid token", body = Problem)
    ),
    tag = "auth"
)]
pub async fn me(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    uri: Uri,
) -> Result<Json<UserDto>, ProblemResponse> {
    match svc.me(identity.user_id).await {
        Ok(user) => Ok(Json(user.into())),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    request_body = ResetRequestReq,
    responses(
        (status = 200, description = "Acknowledged whether or not the account exists", body = ResetAckDto)
    ),
    tag = "auth"
)]
pub async fn request_reset(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Json(req): Json<ResetRequestReq>,
) -> Result<Json<ResetAckDto>, ProblemResponse> {
    match svc.request_password_reset(&req.tenant_id, &req.email).await {
        Ok(token) => Ok(Json(ResetAckDto {
            message: "If the account exists, a reset token has been issued".to_owned(),
            reset_token: token,
        })),
        Err(e) => {
            error!("password reset request failed: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/confirm-reset",
    request_body = ConfirmResetReq,
    responses(
        (status = 204, description = "Password replaced"),
        (status = 400, description = "Token invalid, expired, or already used", body = Problem)
    ),
    tag = "auth"
)]
pub async fn confirm_reset(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Json(req): Json<ConfirmResetReq>,
) -> Result<StatusCode, ProblemResponse> {
    match svc
        .confirm_password_reset(&req.tenant_id, &req.email, &req.token, &req.new_password)
        .await
    {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    request_body = ChangePasswordReq,
    responses(
        (status = 204, description = "Password replaced"),
        (status = 400, description = "Current password wrong or new one too weak", body = Problem),
        (status = 401, description = "Missing or invalid token", body = Problem)
    ),
    tag = "auth"
)]
pub async fn change_password(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    uri: Uri,
    Json(req): Json<ChangePasswordReq>,
) -> Result<StatusCode, ProblemResponse> {
    match svc
        .change_password(identity.user_id, &req.current_password, &req.new_password)
        .await
    {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

#[utoipa::path(
    get,
    path = "/api/auth/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Directory entry", body = DirectoryEntryDto),
        (status = 404, description = "Unknown user", body = Problem)
    ),
    tag = "auth"
)]
pub async fn directory_get(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Path(id): Path<i64>,
) -> Result<Json<DirectoryEntryDto>, ProblemResponse> {
    match svc.directory_lookup(id).await {
        Ok(entry) => Ok(Json(entry.into())),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

#[utoipa::path(
    get,
    path = "/api/auth/users",
    params(("ids" = String, Query, description = "Comma-separated user ids, at most 200")),
    responses(
        (status = 200, description = "Entries for the ids that exist", body = [DirectoryEntryDto]),
        (status = 400, description = "Malformed or oversized id list", body = Problem)
    ),
    tag = "auth"
)]
pub async fn directory_batch(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Query(query): Query<DirectoryQuery>,
) -> Result<Json<Vec<DirectoryEntryDto>>, ProblemResponse> {
    let Some(raw) = query.ids else {
        return Err(from_parts(
            StatusCode::BAD_REQUEST,
            "AUTH_VALIDATION",
            "Validation error",
            "the 'ids' query parameter is required",
            uri.path(),
        ));
    };

    let mut ids = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.parse::<i64>() {
            Ok(id) => ids.push(id),
            Err(_) => {
                return Err(from_parts(
                    StatusCode::BAD_REQUEST,
                    "AUTH_VALIDATION",
                    "Validation error",
                    "ids must be a comma-separated list of integers",
                    uri.path(),
                ));
            }
        }
    }

    match svc.directory_batch(&ids).await {
        Ok(entries) => Ok(Json(entries.into_iter().map(Into::into).collect())),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/bootstrap",
    request_body = RegisterReq,
    responses(
        (status = 200, description = "First admin created, session issued", body = SessionDto),
        (status = 409, description = "Tenant already has an admin", body = Problem)
    ),
    tag = "admin"
)]
pub async fn bootstrap(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    Json(req): Json<RegisterReq>,
) -> Result<Json<SessionDto>, ProblemResponse> {
    info!(tenant = %req.tenant_id, "bootstrap requested");

    match svc.bootstrap(req.into()).await {
        Ok(session) => Ok(Json(session.into())),
        Err(e) => {
            error!("bootstrap failed: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/register",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "Admin account created", body = UserDto),
        (status = 403, description = "Caller is not an admin of that tenant", body = Problem)
    ),
    tag = "admin"
)]
pub async fn admin_register(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    uri: Uri,
    Json(req): Json<RegisterReq>,
) -> Result<(StatusCode, Json<UserDto>), ProblemResponse> {
    match svc.admin_register(identity.user_id, req.into()).await {
        Ok(user) => Ok((StatusCode::CREATED, Json(user.into()))),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "Every user in the caller's tenant", body = [UserDto]),
        (status = 403, description = "Caller is not an admin", body = Problem)
    ),
    tag = "admin"
)]
pub async fn admin_list(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    uri: Uri,
) -> Result<Json<Vec<UserDto>>, ProblemResponse> {
    match svc.admin_list_users(identity.user_id).await {
        Ok(users) => Ok(Json(users.into_iter().map(Into::into).collect())),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    params(("id" = i64, Path, description = "Target user id")),
    responses(
        (status = 200, description = "The user", body = UserDto),
        (status = 403, description = "Foreign tenant or caller not admin", body = Problem),
        (status = 404, description = "No such user in the caller's tenant", body = Problem)
    ),
    tag = "admin"
)]
pub async fn admin_get(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    uri: Uri,
    Path(id): Path<i64>,
) -> Result<Json<UserDto>, ProblemResponse> {
    match svc.admin_get_user(identity.user_id, id).await {
        Ok(user) => Ok(Json(user.into())),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/role",
    params(("id" = i64, Path, description = "Target user id")),
    request_body = SetRoleReq,
    responses(
        (status = 200, description = "Updated user", body = UserDto),
        (status = 409, description = "Demotion of an admin refused", body = Problem)
    ),
    tag = "admin"
)]
pub async fn admin_set_role(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    uri: Uri,
    Path(id): Path<i64>,
    Json(req): Json<SetRoleReq>,
) -> Result<Json<UserDto>, ProblemResponse> {
    match svc.admin_set_role(identity.user_id, id, req.role).await {
        Ok(user) => Ok(Json(user.into())),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/lock",
    params(("id" = i64, Path, description = "Target user id")),
    responses(
        (status = 204, description = "Account locked"),
        (status = 403, description = "Foreign tenant or caller not admin", body = Problem)
    ),
    tag = "admin"
)]
pub async fn admin_lock(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    uri: Uri,
    Path(id): Path<i64>,
) -> Result<StatusCode, ProblemResponse> {
    match svc.admin_lock(identity.user_id, id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/unlock",
    params(("id" = i64, Path, description = "Target user id")),
    responses(
        (status = 204, description = "Account unlocked, failure counter cleared"),
        (status = 403, description = "Foreign tenant or caller not admin", body = Problem)
    ),
    tag = "admin"
)]
pub async fn admin_unlock(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    uri: Uri,
    Path(id): Path<i64>,
) -> Result<StatusCode, ProblemResponse> {
    match svc.admin_unlock(identity.user_id, id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = i64, Path, description = "Target user id")),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 409, description = "Self-deletion refused", body = Problem)
    ),
    tag = "admin"
)]
pub async fn admin_delete(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    uri: Uri,
    Path(id): Path<i64>,
) -> Result<StatusCode, ProblemResponse> {
    match svc.admin_delete(identity.user_id, id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}
