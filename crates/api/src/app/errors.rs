//! Error kind to HTTP status translation.
//!
//! Handlers return `Result<_, ApiError>`; this is the only place a
//! `DomainError` becomes a status code.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use clientdesk_auth::AuthzError;
use clientdesk_core::{DomainError, ValidationErrors};

#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(value: DomainError) -> Self {
        Self(value)
    }
}

impl From<AuthzError> for ApiError {
    fn from(value: AuthzError) -> Self {
        Self(value.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self(DomainError::validation("body", value.body_text()))
    }
}

pub fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let code = self.0.code();
        match self.0 {
            DomainError::Validation(errors) => validation_error(&errors),
            DomainError::Internal(detail) => {
                tracing::error!(error = %detail, "internal error");
                json_error(status, code, "internal server error")
            }
            DomainError::Unauthenticated(msg)
            | DomainError::Forbidden(msg)
            | DomainError::NotFound(msg)
            | DomainError::Conflict(msg) => json_error(status, code, msg),
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

fn validation_error(errors: &ValidationErrors) -> Response {
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({
            "error": "validation_error",
            "message": errors.to_string(),
            "fields": errors.violations(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_distinct_status() {
        let cases = [
            (DomainError::validation("cpf", "bad"), 400),
            (DomainError::unauthenticated("x"), 401),
            (DomainError::forbidden("x"), 403),
            (DomainError::not_found("x"), 404),
            (DomainError::conflict("x"), 409),
            (DomainError::internal("x"), 500),
        ];
        for (err, status) in cases {
            assert_eq!(status_for(&err).as_u16(), status, "{err:?}");
        }
    }

    #[test]
    fn internal_detail_is_not_exposed() {
        let res = ApiError(DomainError::internal("connection refused to 10.0.0.5")).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn policy_errors_map_to_401_and_403() {
        assert_eq!(
            ApiError::from(AuthzError::Unauthenticated).into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthzError::Forbidden("nope")).into_response().status(),
            StatusCode::FORBIDDEN
        );
    }
}
