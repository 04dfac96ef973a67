//! # Service Authorization Middleware
//!
//! Callbacks must carry a `ServiceAuthorization` header. When a trusted token
//! is configured the header has to match it; otherwise presence is enough and
//! verification is left to the platform's gateway.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};

use crate::constants::headers;
use crate::web::errors::ApiError;
use crate::web::state::AppState;

pub async fn require_service_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let presented = request
        .headers()
        .get(headers::SERVICE_AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            warn!(path = %request.uri().path(), "Callback rejected: missing service authorization");
            ApiError::Unauthorized
        })?;

    if let Some(expected) = &state.config.config().web.trusted_service_token {
        if strip_bearer(presented) != strip_bearer(expected) {
            warn!(path = %request.uri().path(), "Callback rejected: untrusted service token");
            return Err(ApiError::Unauthorized);
        }
    }

    debug!("Service authorization accepted");
    Ok(next.run(request).await)
}

fn strip_bearer(token: &str) -> &str {
    token.strip_prefix("Bearer ").unwrap_or(token).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_bearer() {
        assert_eq!(strip_bearer("Bearer abc123"), "abc123");
        assert_eq!(strip_bearer("abc123"), "abc123");
    }
}
