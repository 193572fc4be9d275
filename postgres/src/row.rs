//! Row mapping between the `tokens` table and the domain [`Token`].

use chrono::{DateTime, NaiveDate, Utc};
use janseva_core::status::TokenStatus;
use janseva_core::store::TokenStoreError;
use janseva_core::types::{
    CitizenId, OfficeId, OfficialId, ServiceId, Token, TokenId, TokenNumber,
};
use uuid::Uuid;

/// Raw `tokens` row. Status stays TEXT at this layer; the parse into the
/// closed enum happens exactly once, in [`TokenRow::into_token`].
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TokenRow {
    pub id: Uuid,
    pub token_number: String,
    pub owner_id: Uuid,
    pub office_id: String,
    pub office_name: String,
    pub service_id: String,
    pub service_name: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub status: String,
    pub position_in_queue: Option<i32>,
    pub estimated_wait_minutes: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub served_at: Option<DateTime<Utc>>,
    pub served_by: Option<Uuid>,
}

impl TokenRow {
    /// Convert into the domain entity.
    ///
    /// A status string outside the enum means the table's CHECK
    /// constraint was bypassed; surfaced as a serialization error
    /// rather than a panic.
    pub(crate) fn into_token(self) -> Result<Token, TokenStoreError> {
        let status: TokenStatus = self
            .status
            .parse()
            .map_err(|e| TokenStoreError::Serialization(format!("status column: {e}")))?;

        #[allow(clippy::cast_sign_loss)] // columns are written from u32 values
        Ok(Token {
            id: TokenId::from_uuid(self.id),
            token_number: TokenNumber::from_string(self.token_number),
            owner_id: CitizenId::from_uuid(self.owner_id),
            office_id: OfficeId::new(self.office_id),
            office_name: self.office_name,
            service_id: ServiceId::new(self.service_id),
            service_name: self.service_name,
            appointment_date: self.appointment_date,
            appointment_time: self.appointment_time,
            status,
            position_in_queue: self.position_in_queue.map(|v| v as u32),
            estimated_wait_minutes: self.estimated_wait_minutes.map(|v| v as u32),
            created_at: self.created_at,
            updated_at: self.updated_at,
            served_at: self.served_at,
            served_by: self.served_by.map(OfficialId::from_uuid),
        })
    }
}

/// Collect rows into tokens, failing on the first bad row.
pub(crate) fn into_tokens(rows: Vec<TokenRow>) -> Result<Vec<Token>, TokenStoreError> {
    rows.into_iter().map(TokenRow::into_token).collect()
}
