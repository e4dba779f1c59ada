//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: database, repositories, token codec, config
//! - `routes/`: HTTP handlers (one file per area)
//! - `views/`: server-rendered HTML pages and fragments
//! - `dto.rs`: form/JSON payloads
//! - `errors.rs`: consistent error responses
//! - `extract.rs`: form/path extractors with JSON rejections
//! - `cookies.rs`, `htmx.rs`, `themes.rs`: response helpers

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware;

pub mod cookies;
pub mod dto;
pub mod errors;
pub mod extract;
pub mod htmx;
pub mod routes;
pub mod services;
pub mod themes;
pub mod views;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: AppServices) -> Router {
    let auth_state = services.auth_state();
    let services = Arc::new(services);

    // Protected routes: reject anonymous callers with 401.
    let protected = routes::protected_router()
        .route_layer(axum::middleware::from_fn(middleware::require_auth_middleware));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::public_router())
        .merge(protected)
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::identify_middleware,
        ))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
