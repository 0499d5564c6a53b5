use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Rating surface, mounted at `/api/calificaciones`.
pub fn router(service: Arc<Service>) -> Router {
    Router::new()
        .route("/", post(handlers::create))
        .route("/cuidador/{caregiverId}", get(handlers::list_for_caregiver))
        .route(
            "/cuidador/{caregiverId}/promedio",
            get(handlers::average),
        )
        .layer(Extension(service))
}
