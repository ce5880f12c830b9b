//! Translation record service: an axum app over a [`RecordStore`].

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::records::RecordStore;

mod controllers;
pub mod error;

pub use error::ServiceError;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

/// Build the router with permissive CORS and request tracing.
pub fn create_app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/translations", post(controllers::create_translation))
        .route("/export", get(controllers::export_translations));

    Router::new()
        .route("/healthcheck", get(controllers::healthcheck))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
