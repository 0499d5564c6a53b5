use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Extension, Router,
};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Public surface, mounted at `/api/auth`.
pub fn router(service: Arc<Service>) -> Router {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/me", get(handlers::me))
        .route("/reset-password", post(handlers::request_reset))
        .route("/confirm-reset", post(handlers::confirm_reset))
        .route("/change-password", post(handlers::change_password))
        .route("/users", get(handlers::directory_batch))
        .route("/users/{id}", get(handlers::directory_get))
        .layer(Extension(service))
}

/// Admin surface, mounted at `/api/admin`.
pub fn admin_router(service: Arc<Service>) -> Router {
    Router::new()
        .route("/bootstrap", post(handlers::bootstrap))
        .route("/register", post(handlers::admin_register))
        .route("/users", get(handlers::admin_list))
        .route(
            "/users/{id}",
            get(handlers::admin_get).delete(handlers::admin_delete),
        )
        .route("/users/{id}/role", put(handlers::admin_set_role))
        .route("/users/{id}/lock", post(handlers::admin_lock))
        .route("/users/{id}/unlock", post(handlers::admin_unlock))
        .layer(Extension(service))
}
