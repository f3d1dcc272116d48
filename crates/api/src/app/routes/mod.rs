use axum::{routing::get, Router};

pub mod clients;
pub mod system;
pub mod users;

/// Router for every endpoint. Authorization is decided per handler.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .nest("/clients", clients::router())
        .nest("/user", users::router())
}
