//! Citizen token endpoints.
//!
//! - `POST /api/tokens` - Book a token (requires citizen identity)
//! - `GET /api/tokens` - List the caller's tokens
//! - `POST /api/tokens/:id/cancel` - Cancel a pending/waiting token

use crate::error::ApiError;
use crate::extractors::CitizenIdentity;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use janseva_core::types::{BookingRequest, OfficeId, ServiceId, Token, TokenId};
use serde::Deserialize;
use uuid::Uuid;

/// Request to book a token.
#[derive(Debug, Deserialize)]
pub struct BookTokenRequest {
    /// Office to queue at.
    pub office_id: String,
    /// Requested service.
    pub service_id: String,
    /// Appointment day (`YYYY-MM-DD`).
    pub appointment_date: NaiveDate,
    /// Display slot label (e.g. `"09:00"`).
    pub appointment_time: String,
}

/// Book a token for the authenticated citizen.
pub async fn book_token(
    State(state): State<AppState>,
    CitizenIdentity(owner): CitizenIdentity,
    Json(request): Json<BookTokenRequest>,
) -> Result<(StatusCode, Json<Token>), ApiError> {
    let office_id: OfficeId = request
        .office_id
        .parse()
        .map_err(|_| ApiError::bad_request("office_id must not be empty"))?;
    let service_id: ServiceId = request
        .service_id
        .parse()
        .map_err(|_| ApiError::bad_request("service_id must not be empty"))?;

    let token = state
        .engine
        .book_token(
            owner,
            BookingRequest {
                office_id,
                service_id,
                appointment_date: request.appointment_date,
                appointment_time: request.appointment_time,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(token)))
}

/// List every token the authenticated citizen owns, newest appointment
/// first.
pub async fn my_tokens(
    State(state): State<AppState>,
    CitizenIdentity(owner): CitizenIdentity,
) -> Result<Json<Vec<Token>>, ApiError> {
    Ok(Json(state.engine.my_tokens(owner).await?))
}

/// Cancel one of the caller's tokens.
pub async fn cancel_token(
    State(state): State<AppState>,
    CitizenIdentity(owner): CitizenIdentity,
    Path(token_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .engine
        .cancel_token(owner, TokenId::from_uuid(token_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
