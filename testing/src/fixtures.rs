//! Token fixtures for arranging test state.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)]

use chrono::{DateTime, Duration, NaiveDate, Utc};
use janseva_core::status::TokenStatus;
use janseva_core::types::{
    CitizenId, OfficeId, OfficialId, ServiceId, Token, TokenId, TokenNumber,
};

/// Builder for [`Token`] values with sensible defaults.
///
/// Defaults: owner and id freshly minted, service `learning-licence`,
/// status `waiting`, created at 08:00 UTC on the appointment day.
///
/// # Example
///
/// ```
/// use janseva_testing::TokenFixture;
/// use janseva_core::TokenStatus;
/// use chrono::NaiveDate;
///
/// let day = NaiveDate::from_ymd_opt(2025, 1, 14).unwrap();
/// let token = TokenFixture::new("rto-pune", day)
///     .sequence(3)
///     .status(TokenStatus::Pending)
///     .build();
/// assert_eq!(token.token_number.as_str(), "RTO-PUNE-20250114-003");
/// ```
#[derive(Clone, Debug)]
pub struct TokenFixture {
    office_id: OfficeId,
    date: NaiveDate,
    owner_id: CitizenId,
    service_id: ServiceId,
    service_name: String,
    status: TokenStatus,
    sequence: u32,
    created_offset: Duration,
    appointment_time: String,
    served_at: Option<DateTime<Utc>>,
    served_by: Option<OfficialId>,
}

impl TokenFixture {
    /// Start a fixture for an office and appointment day.
    #[must_use]
    pub fn new(office_id: &str, date: NaiveDate) -> Self {
        Self {
            office_id: OfficeId::new(office_id),
            date,
            owner_id: CitizenId::new(),
            service_id: ServiceId::new("learning-licence"),
            service_name: "Learning Licence".to_string(),
            status: TokenStatus::Waiting,
            sequence: 1,
            created_offset: Duration::zero(),
            appointment_time: "09:00".to_string(),
            served_at: None,
            served_by: None,
        }
    }

    /// Set the owner.
    #[must_use]
    pub const fn owner(mut self, owner_id: CitizenId) -> Self {
        self.owner_id = owner_id;
        self
    }

    /// Set the status.
    #[must_use]
    pub const fn status(mut self, status: TokenStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the daily sequence the token number derives from.
    #[must_use]
    pub const fn sequence(mut self, sequence: u32) -> Self {
        self.sequence = sequence;
        self
    }

    /// Offset `created_at` from the day's 08:00 UTC baseline.
    #[must_use]
    pub fn created_offset_secs(mut self, secs: i64) -> Self {
        self.created_offset = Duration::seconds(secs);
        self
    }

    /// Set the display slot label.
    #[must_use]
    pub fn appointment_time(mut self, time: &str) -> Self {
        self.appointment_time = time.to_string();
        self
    }

    /// Set the service id and display name.
    #[must_use]
    pub fn service(mut self, id: &str, name: &str) -> Self {
        self.service_id = ServiceId::new(id);
        self.service_name = name.to_string();
        self
    }

    /// Stamp terminal bookkeeping fields (for seeding completed/skipped
    /// tokens).
    #[must_use]
    pub const fn served(mut self, at: DateTime<Utc>, by: OfficialId) -> Self {
        self.served_at = Some(at);
        self.served_by = Some(by);
        self
    }

    /// Build the token.
    #[must_use]
    pub fn build(self) -> Token {
        let created_at = self
            .date
            .and_hms_opt(8, 0, 0)
            .unwrap()
            .and_utc()
            + self.created_offset;
        Token {
            id: TokenId::new(),
            token_number: TokenNumber::compose(&self.office_id, self.date, self.sequence),
            owner_id: self.owner_id,
            office_name: format!("Office {}", self.office_id),
            office_id: self.office_id,
            service_id: self.service_id,
            service_name: self.service_name,
            appointment_date: self.date,
            appointment_time: self.appointment_time,
            status: self.status,
            position_in_queue: None,
            estimated_wait_minutes: None,
            created_at,
            updated_at: created_at,
            served_at: self.served_at,
            served_by: self.served_by,
        }
    }
}
