use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use clientdesk_core::DomainError;

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::CallerContext;

/// Resolve the bearer token (if any) and attach a [`CallerContext`].
///
/// Missing or invalid tokens are not rejected here: the request continues
/// anonymously and the access policy answers `Unauthenticated` where needed.
pub async fn auth_middleware(
    State(services): State<Arc<AppServices>>,
    mut req: Request,
    next: Next,
) -> Response {
    let identity = match extract_bearer(req.headers()) {
        None => None,
        Some(token) => match services.verifier.resolve(token, Utc::now()).await {
            Ok(identity) => Some(identity),
            Err(err @ DomainError::Internal(_)) => return ApiError::from(err).into_response(),
            Err(err) => {
                tracing::debug!(error = %err, "bearer token rejected");
                None
            }
        },
    };

    req.extensions_mut().insert(CallerContext::new(identity));
    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use axum::http::{header::AUTHORIZATION, HeaderValue};

    use super::*;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn bearer_extraction() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(extract_bearer(&headers("Bearer   abc  ")), Some("abc"));
        assert_eq!(extract_bearer(&headers("Basic abc")), None);
        assert_eq!(extract_bearer(&headers("Bearer ")), None);
        assert_eq!(extract_bearer(&HeaderMap::new()), None);
    }
}
