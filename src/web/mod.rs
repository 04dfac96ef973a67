//! # Web API
//!
//! Axum surface for the case-data platform's callbacks and for locally
//! submitted hearing-update messages.
//!
//! | Route                    | Purpose                          |
//! |--------------------------|----------------------------------|
//! | `POST /ccdAboutToStart`  | about-to-start callback          |
//! | `POST /ccdMidEvent`      | mid-event callback               |
//! | `POST /ccdAboutToSubmit` | about-to-submit callback         |
//! | `POST /ccdSubmittedEvent`| submitted callback               |
//! | `GET /health`            | liveness plus dispatch counters  |
//! | `POST /hearings/messages`| enqueue a hearing-update message |
//!
//! Every route except health requires `ServiceAuthorization`.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod state;

use axum::routing::{get, post};
use axum::Router;

use crate::constants::endpoints;

pub use errors::ApiError;
pub use state::AppState;

/// Build the application router with the production middleware stack
pub fn create_router(state: AppState) -> Router {
    // Everything that can change case state requires a service token.
    let authenticated = Router::new()
        .route(endpoints::ABOUT_TO_START, post(handlers::callbacks::about_to_start))
        .route(endpoints::MID_EVENT, post(handlers::callbacks::mid_event))
        .route(endpoints::ABOUT_TO_SUBMIT, post(handlers::callbacks::about_to_submit))
        .route(endpoints::SUBMITTED, post(handlers::callbacks::submitted))
        .route(endpoints::HEARING_MESSAGES, post(handlers::hearings::enqueue_message))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_service_auth,
        ));

    let app = Router::new()
        .merge(authenticated)
        .route(endpoints::HEALTH, get(handlers::health::basic_health));

    let request_timeout = state.config.config().web.request_timeout();
    middleware::apply_middleware_stack(app, request_timeout).with_state(state)
}
