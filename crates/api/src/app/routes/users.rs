use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use clientdesk_auth::{authorize, Action};
use clientdesk_core::UserId;

use crate::app::dto::{self, UserResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route(
            "/",
            get(list_users).put(update_user).delete(delete_user),
        )
        .route("/login", post(login))
        .route("/register", post(register_user))
        .route("/me", get(me))
        .route("/:id", get(get_user))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body?;
    let (email, password) = body.into_credentials()?;

    let token = services
        .verifier
        .authenticate(&email, &password, Utc::now())
        .await?;
    Ok((StatusCode::OK, Json(token)).into_response())
}

pub async fn register_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    body: Result<Json<dto::RegisterUserRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    authorize(caller.identity(), &Action::RegisterUser)?;
    let Json(body) = body?;

    let user = services.users().create(body.into_new_user()?).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))).into_response())
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
) -> Result<Response, ApiError> {
    authorize(caller.identity(), &Action::ListUsers)?;
    let users = services
        .users()
        .list()
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect::<Vec<_>>();
    Ok((StatusCode::OK, Json(users)).into_response())
}

pub async fn me(Extension(caller): Extension<CallerContext>) -> Result<Response, ApiError> {
    let identity = caller.require()?;
    Ok((StatusCode::OK, Json(identity)).into_response())
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    caller.require()?;
    let id = id.parse::<UserId>()?;
    authorize(caller.identity(), &Action::GetUser(id))?;

    let user = services.users().get_by_id(id).await?;
    Ok((StatusCode::OK, Json(UserResponse::from(user))).into_response())
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    body: Result<Json<dto::UpdateUserRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    caller.require()?;
    let Json(body) = body?;
    let email = body.target_email()?;

    authorize(
        caller.identity(),
        &Action::UpdateUser {
            email: &email,
            changes_role: body.sets_role(),
        },
    )?;
    let patch = body.into_patch()?;

    let user = services.users().update(&email, patch).await?;
    tracing::info!(user_id = %user.id, "user updated");
    Ok((StatusCode::OK, Json(UserResponse::from(user))).into_response())
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    body: Result<Json<dto::UserEmailRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    caller.require()?;
    let Json(body) = body?;
    let email = body.into_email()?;
    authorize(caller.identity(), &Action::DeleteUser { email: &email })?;

    services.users().delete_by_email(&email).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
