use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Extension, Router,
};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Booking surface, mounted at `/api/solicitudes`. The static segments
/// `mias` and `asignadas` win over `{id}` in route matching.
pub fn router(service: Arc<Service>) -> Router {
    Router::new()
        .route("/", post(handlers::create))
        .route("/mias", get(handlers::mine))
        .route("/asignadas", get(handlers::assigned))
        .route("/{id}", get(handlers::get))
        .route("/{id}/estado", put(handlers::change_status))
        .route("/{id}/pagar", post(handlers::pay))
        .route("/{id}/calificar", post(handlers::rate))
        .layer(Extension(service))
}
