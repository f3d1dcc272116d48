use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use clientdesk_auth::{authorize, Action};
use clientdesk_clients::ClientPatch;
use clientdesk_core::ClientId;

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(register_client).get(list_clients))
        .route(
            "/:id",
            get(get_client).put(update_client).delete(delete_client),
        )
}

pub async fn register_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    body: Result<Json<dto::CreateClientRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    authorize(caller.identity(), &Action::RegisterClient)?;
    let Json(body) = body?;

    let client = services.clients.create(body.into_new_client()?).await?;
    Ok((StatusCode::CREATED, Json(client)).into_response())
}

pub async fn list_clients(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
) -> Result<Response, ApiError> {
    authorize(caller.identity(), &Action::ListClients)?;
    let clients = services.clients.list().await?;
    Ok((StatusCode::OK, Json(clients)).into_response())
}

pub async fn get_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_client_id(&caller, &id)?;
    authorize(caller.identity(), &Action::GetClient(id))?;
    let client = services.clients.get_by_id(id).await?;
    Ok((StatusCode::OK, Json(client)).into_response())
}

pub async fn update_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    body: Result<Json<ClientPatch>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id = parse_client_id(&caller, &id)?;
    authorize(caller.identity(), &Action::UpdateClient(id))?;
    let Json(patch) = body?;

    let client = services.clients.update(id, patch).await?;
    tracing::info!(client_id = %id, "client updated");
    Ok((StatusCode::OK, Json(client)).into_response())
}

pub async fn delete_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_client_id(&caller, &id)?;
    authorize(caller.identity(), &Action::DeleteClient(id))?;

    services.clients.delete_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Anonymous callers get `Unauthenticated` before the id is even looked at.
fn parse_client_id(caller: &CallerContext, raw: &str) -> Result<ClientId, ApiError> {
    caller.require()?;
    Ok(raw.parse::<ClientId>()?)
}
