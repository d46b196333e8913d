use axum::{Router, http::Method, middleware, routing::get};
use std::error::Error;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handler::AppState;

pub mod auth;
pub mod bookmarks;
pub mod config;
pub mod db;
pub mod error;
pub mod handler;

/// Builds the full application router. Everything under
/// [`bookmarks::BASE_PATH`] requires the configured bearer token.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    let api = bookmarks::routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth::require_api_token,
    ));

    Router::new()
        .route("/", get(handler::healthcheck))
        .nest(bookmarks::BASE_PATH, api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub fn unpack_error(err: &dyn Error) -> String {
    let mut parts = Vec::new();
    parts.push(err.to_string());
    let mut current = err.source();
    while let Some(source) = current {
        parts.push(source.to_string());
        current = source.source();
    }
    parts.join(": ")
}
