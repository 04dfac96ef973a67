//! # Callback Handlers
//!
//! One route per lifecycle phase. The body is parsed here rather than through
//! `Json` so malformed payloads map to the API's own 400 error shape.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::callback::{CallbackContext, CallbackPhase, CallerToken, CaseData, HandlerResult};
use crate::constants::headers;
use crate::web::errors::ApiError;
use crate::web::state::AppState;

/// Inbound callback payload
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackRequest {
    pub event_id: String,
    pub case_details: CaseDetails,
    #[serde(default)]
    pub case_details_before: Option<CaseDetails>,
    #[serde(default)]
    pub ignore_warning: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaseDetails {
    /// Numeric on the platform, but accepted as a string too
    pub id: Value,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub case_data: CaseData,
}

impl CaseDetails {
    pub fn case_id(&self) -> String {
        match &self.id {
            Value::String(id) => id.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

impl CallbackRequest {
    pub fn parse(body: &[u8]) -> Result<Self, ApiError> {
        serde_json::from_slice(body).map_err(|e| ApiError::bad_request(format!("Invalid callback body: {e}")))
    }

    /// Build the immutable dispatch context for `phase`
    pub fn into_context(self, phase: CallbackPhase, caller_token: CallerToken) -> CallbackContext {
        let case_id = self.case_details.case_id();
        CallbackContext::new(phase, self.event_id, case_id, self.case_details.case_data)
            .with_prior(self.case_details_before.map(|before| before.case_data))
            .with_caller_token(caller_token)
            .with_ignore_warnings(self.ignore_warning)
    }
}

pub async fn about_to_start(
    State(state): State<AppState>,
    header_map: HeaderMap,
    body: Bytes,
) -> Result<Json<HandlerResult>, ApiError> {
    handle_callback(&state, CallbackPhase::AboutToStart, &header_map, &body).await
}

pub async fn mid_event(
    State(state): State<AppState>,
    header_map: HeaderMap,
    body: Bytes,
) -> Result<Json<HandlerResult>, ApiError> {
    handle_callback(&state, CallbackPhase::MidEvent, &header_map, &body).await
}

pub async fn about_to_submit(
    State(state): State<AppState>,
    header_map: HeaderMap,
    body: Bytes,
) -> Result<Json<HandlerResult>, ApiError> {
    handle_callback(&state, CallbackPhase::AboutToSubmit, &header_map, &body).await
}

pub async fn submitted(
    State(state): State<AppState>,
    header_map: HeaderMap,
    body: Bytes,
) -> Result<Json<HandlerResult>, ApiError> {
    handle_callback(&state, CallbackPhase::Submitted, &header_map, &body).await
}

async fn handle_callback(
    state: &AppState,
    phase: CallbackPhase,
    header_map: &HeaderMap,
    body: &[u8],
) -> Result<Json<HandlerResult>, ApiError> {
    let request = CallbackRequest::parse(body)?;
    let caller_token = header_map
        .get(headers::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(CallerToken::new)
        .unwrap_or_default();

    let context = request.into_context(phase, caller_token);
    debug!(
        phase = %phase,
        event_kind = %context.event_kind(),
        case_id = %context.case_id(),
        has_prior = context.prior().is_some(),
        "Callback received"
    );

    let timeout = state.config.config().dispatch.timeout();
    let result = state.dispatcher.dispatch_with_timeout(context, timeout).await?;

    info!(
        phase = %phase,
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "Callback dispatched"
    );
    Ok(Json(result))
}
