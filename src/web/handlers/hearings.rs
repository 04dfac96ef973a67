//! Local entry point for hearing-update messages, used when no broker is attached.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

use crate::constants::{headers, message_properties};
use crate::hearings::HmcMessage;
use crate::web::errors::ApiError;
use crate::web::state::AppState;

#[derive(Debug, Serialize)]
pub struct EnqueueResponse {
    pub receipt: i64,
    pub queue: String,
}

/// POST /hearings/messages
///
/// The body must at least deserialize as a hearing message; semantic checks
/// (service code, request version) happen in the ingestor.
pub async fn enqueue_message(
    State(state): State<AppState>,
    header_map: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<EnqueueResponse>), ApiError> {
    let message: HmcMessage = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("Invalid hearing message: {e}")))?;

    let mut properties = HashMap::new();
    if let Some(deployment_id) = header_map
        .get(headers::DEPLOYMENT_ID)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
    {
        properties.insert(message_properties::DEPLOYMENT_ID.to_string(), deployment_id.to_string());
    }

    let receipt = state.hearing_queue.send(body.to_vec(), properties).await?;
    info!(
        receipt = %receipt,
        case_id = %message.case_ref,
        hearing_id = %message.hearing_id,
        "Hearing message enqueued"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(EnqueueResponse {
            receipt: receipt.0,
            queue: state.hearing_queue.name().to_string(),
        }),
    ))
}
