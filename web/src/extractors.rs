//! Identity extractors.
//!
//! Identity management is an external collaborator: an upstream gateway
//! authenticates the caller and forwards their identity in headers -
//! `X-Citizen-Id` for citizens, `X-Official-Id` plus `X-Official-Office`
//! for officials. These extractors only parse and type those headers;
//! they never mint or verify credentials.

use crate::error::ApiError;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use janseva_core::types::{CitizenId, OfficeId, Official, OfficialId};
use uuid::Uuid;

/// Header carrying the authenticated citizen's id.
pub const CITIZEN_ID_HEADER: &str = "x-citizen-id";
/// Header carrying the authenticated official's id.
pub const OFFICIAL_ID_HEADER: &str = "x-official-id";
/// Header carrying the official's office assignment.
pub const OFFICIAL_OFFICE_HEADER: &str = "x-official-office";

fn header_uuid(parts: &Parts, name: &str) -> Result<Uuid, ApiError> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| ApiError::unauthorized(format!("missing or malformed {name} header")))
}

/// The authenticated citizen making a request.
#[derive(Debug, Clone, Copy)]
pub struct CitizenIdentity(pub CitizenId);

#[async_trait]
impl<S> FromRequestParts<S> for CitizenIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header_uuid(parts, CITIZEN_ID_HEADER)?;
        Ok(Self(CitizenId::from_uuid(id)))
    }
}

/// The authenticated official making a request, with their office
/// assignment.
#[derive(Debug, Clone)]
pub struct OfficialIdentity(pub Official);

#[async_trait]
impl<S> FromRequestParts<S> for OfficialIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header_uuid(parts, OFFICIAL_ID_HEADER)?;
        let office = parts
            .headers
            .get(OFFICIAL_OFFICE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<OfficeId>().ok())
            .ok_or_else(|| {
                ApiError::unauthorized(format!(
                    "missing or malformed {OFFICIAL_OFFICE_HEADER} header"
                ))
            })?;
        Ok(Self(Official {
            id: OfficialId::from_uuid(id),
            office_id: office,
        }))
    }
}
