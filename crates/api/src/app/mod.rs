//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection, repositories, credential verifier, seeding
//! - `routes/`: HTTP routes + handlers (one file per record kind)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: the single error-kind to status translation

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    Extension, Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use clientdesk_infra::AppConfig;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub async fn build_app(config: &AppConfig) -> Result<Router, services::StartupError> {
    let services = Arc::new(services::build_services(config).await?);
    Ok(router(services, config.frontend_url.as_deref()))
}

/// Router over already-built services.
pub fn router(services: Arc<AppServices>, frontend_url: Option<&str>) -> Router {
    routes::router().layer(
        ServiceBuilder::new()
            .layer(cors_layer(frontend_url))
            .layer(Extension(services.clone()))
            .layer(axum::middleware::from_fn_with_state(
                services,
                middleware::auth_middleware,
            )),
    )
}

fn cors_layer(frontend_url: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    match frontend_url {
        Some(origin) => match origin.parse::<HeaderValue>() {
            Ok(origin) => layer.allow_origin(origin),
            Err(_) => {
                tracing::warn!(origin, "FRONTEND_URL is not a valid origin; allowing any");
                layer.allow_origin(Any)
            }
        },
        None => layer.allow_origin(Any),
    }
}
