//! # Web API Middleware
//!
//! Request ids, tracing, and service-to-service authorization for callbacks.

pub mod auth;
pub mod request_id;

use axum::http::StatusCode;
use axum::middleware;
use axum::Router;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Apply the middleware shared by every route.
///
/// The last layer added is the outermost, so from the outside in the stack is:
/// request id, timeout, tracing.
pub fn apply_middleware_stack<S>(router: Router<S>, request_timeout: Duration) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(middleware::from_fn(request_id::add_request_id))
}
