//! Official queue-management endpoints.
//!
//! - `GET /api/offices/:id/queue?date=` - The ordered queue view
//! - `POST /api/offices/:id/call-next` - Advance the queue
//! - `POST /api/tokens/:id/status` - Record completed/skipped
//! - `GET /api/offices/:id/stats` - Today's dashboard counters

use crate::error::ApiError;
use crate::extractors::OfficialIdentity;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use janseva_core::types::{OfficeId, QueueStats, QueueView, Token, TokenId};
use janseva_core::TokenOutcome;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Optional date filter for queue reads; defaults to today.
#[derive(Debug, Default, Deserialize)]
pub struct QueueQuery {
    /// Queue day (`YYYY-MM-DD`).
    pub date: Option<NaiveDate>,
}

/// The queue for an office and day.
pub async fn get_queue(
    State(state): State<AppState>,
    OfficialIdentity(official): OfficialIdentity,
    Path(office_id): Path<String>,
    Query(query): Query<QueueQuery>,
) -> Result<Json<QueueView>, ApiError> {
    let office_id: OfficeId = office_id
        .parse()
        .map_err(|_| ApiError::bad_request("office id must not be empty"))?;
    if official.office_id != office_id {
        return Err(ApiError::from(janseva_core::QueueError::validation(
            "official is not assigned to this office",
        )));
    }
    let date = query.date.unwrap_or_else(|| today(&state));
    Ok(Json(state.engine.queue(&office_id, date).await?))
}

/// Response of a `call-next` advance.
#[derive(Debug, Serialize)]
pub struct CallNextResponse {
    /// The newly serving token; `null` when the queue was empty.
    pub token: Option<Token>,
}

/// Advance the office queue: complete the serving token, promote the
/// next. An empty queue is a 200 with a null token.
pub async fn call_next(
    State(state): State<AppState>,
    OfficialIdentity(official): OfficialIdentity,
    Path(office_id): Path<String>,
) -> Result<Json<CallNextResponse>, ApiError> {
    let office_id: OfficeId = office_id
        .parse()
        .map_err(|_| ApiError::bad_request("office id must not be empty"))?;
    let token = state.engine.call_next(&official, &office_id).await?;
    Ok(Json(CallNextResponse { token }))
}

/// Request to finalize a token.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    /// Terminal outcome: `completed` or `skipped`.
    pub status: TokenOutcome,
}

/// Record a terminal outcome for a token.
pub async fn set_status(
    State(state): State<AppState>,
    OfficialIdentity(official): OfficialIdentity,
    Path(token_id): Path<Uuid>,
    Json(request): Json<SetStatusRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .engine
        .set_status(&official, TokenId::from_uuid(token_id), request.status)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Today's counters for the office dashboard.
pub async fn today_stats(
    State(state): State<AppState>,
    OfficialIdentity(official): OfficialIdentity,
    Path(office_id): Path<String>,
) -> Result<Json<QueueStats>, ApiError> {
    let office_id: OfficeId = office_id
        .parse()
        .map_err(|_| ApiError::bad_request("office id must not be empty"))?;
    if official.office_id != office_id {
        return Err(ApiError::from(janseva_core::QueueError::validation(
            "official is not assigned to this office",
        )));
    }
    Ok(Json(state.engine.today_stats(&office_id).await?))
}

fn today(state: &AppState) -> NaiveDate {
    state.engine.today()
}
