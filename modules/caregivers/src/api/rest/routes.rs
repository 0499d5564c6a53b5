use std::sync::Arc;

use apikit::DirectoryClient;
use axum::{
    routing::{get, post, put},
    Extension, Router,
};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Caregiver profile surface, mounted at `/api/cuidadores`.
pub fn router(service: Arc<Service>, directory: Arc<DirectoryClient>) -> Router {
    Router::new()
        .route(
            "/",
            post(handlers::create)
                .get(handlers::list)
                .put(handlers::update_own)
                .delete(handlers::delete_own),
        )
        .route("/{id}", get(handlers::get))
        .route("/usuario/{userId}", get(handlers::get_by_user))
        .route("/{id}/verificar", post(handlers::verify))
        .route("/{id}/rating", put(handlers::set_rating))
        .layer(Extension(service))
        .layer(Extension(directory))
}
