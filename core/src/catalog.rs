//! Office/service catalog interface.
//!
//! The catalog is an external collaborator: it owns which offices and
//! services exist, their display names, and per-office policy. The
//! engine only consults it - catalog content, administration, and
//! refresh are out of scope. Deployments typically load a snapshot at
//! startup and swap it on change.

use crate::types::{OfficeId, ServiceId};
use serde::{Deserialize, Serialize};

/// Per-office operating policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficePolicy {
    /// Maximum tokens bookable per calendar day. Bookings beyond this
    /// are rejected with a capacity error.
    pub daily_capacity: u32,
    /// Fallback per-token service duration for the wait estimator when
    /// the office has no completion history yet.
    pub default_service_minutes: u32,
}

impl Default for OfficePolicy {
    fn default() -> Self {
        Self {
            daily_capacity: 200,
            default_service_minutes: 20,
        }
    }
}

/// A catalog entry for one office.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficeProfile {
    /// Catalog-owned identifier.
    pub id: OfficeId,
    /// Display name, denormalized onto tokens at booking.
    pub name: String,
    /// Operating policy.
    pub policy: OfficePolicy,
}

/// A catalog entry for one service offered at an office.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceProfile {
    /// Catalog-owned identifier.
    pub id: ServiceId,
    /// Display name, denormalized onto tokens at booking.
    pub name: String,
}

/// Read access to the office/service catalog.
///
/// Lookups are synchronous: implementations hold an in-memory snapshot
/// (the engine never blocks on a remote catalog mid-booking).
pub trait OfficeCatalog: Send + Sync {
    /// Look up an office. `None` means the id is unknown - a validation
    /// failure for the caller.
    fn office(&self, office_id: &OfficeId) -> Option<OfficeProfile>;

    /// Look up a service offered at an office. `None` if the office does
    /// not offer it (or does not exist).
    fn service(&self, office_id: &OfficeId, service_id: &ServiceId) -> Option<ServiceProfile>;
}
