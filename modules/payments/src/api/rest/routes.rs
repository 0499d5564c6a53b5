use std::sync::Arc;

use axum::{
    routing::{delete, post},
    Extension, Router,
};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Payment surface, mounted at `/api/pagos`.
pub fn router(service: Arc<Service>) -> Router {
    Router::new()
        .route("/create-order", post(handlers::create_order))
        .route("/cards", post(handlers::save_card).get(handlers::my_cards))
        .route("/cards/{id}", delete(handlers::delete_card))
        .layer(Extension(service))
}
