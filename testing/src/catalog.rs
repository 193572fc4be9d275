//! Static in-memory office/service catalog.

use janseva_core::catalog::{OfficeCatalog, OfficePolicy, OfficeProfile, ServiceProfile};
use janseva_core::types::{OfficeId, ServiceId};
use std::collections::HashMap;

/// [`OfficeCatalog`] backed by maps populated up front.
///
/// # Example
///
/// ```
/// use janseva_testing::StaticCatalog;
/// use janseva_core::catalog::{OfficeCatalog, OfficePolicy};
/// use janseva_core::types::OfficeId;
///
/// let catalog = StaticCatalog::new()
///     .with_office("rto-pune", "RTO Pune", OfficePolicy::default())
///     .with_service("rto-pune", "learning-licence", "Learning Licence");
///
/// assert!(catalog.office(&OfficeId::new("rto-pune")).is_some());
/// assert!(catalog.office(&OfficeId::new("unknown")).is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
    offices: HashMap<OfficeId, OfficeProfile>,
    services: HashMap<(OfficeId, ServiceId), ServiceProfile>,
}

impl StaticCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an office.
    #[must_use]
    pub fn with_office(mut self, id: &str, name: &str, policy: OfficePolicy) -> Self {
        let office_id = OfficeId::new(id);
        self.offices.insert(
            office_id.clone(),
            OfficeProfile {
                id: office_id,
                name: name.to_string(),
                policy,
            },
        );
        self
    }

    /// Register a service offered at an office.
    #[must_use]
    pub fn with_service(mut self, office_id: &str, id: &str, name: &str) -> Self {
        let service_id = ServiceId::new(id);
        self.services.insert(
            (OfficeId::new(office_id), service_id.clone()),
            ServiceProfile {
                id: service_id,
                name: name.to_string(),
            },
        );
        self
    }

    /// A one-office catalog covering the common test setup.
    #[must_use]
    pub fn rto_pune() -> Self {
        Self::new()
            .with_office("rto-pune", "RTO Pune", OfficePolicy::default())
            .with_service("rto-pune", "learning-licence", "Learning Licence")
            .with_service("rto-pune", "vehicle-registration", "Vehicle Registration")
    }
}

impl OfficeCatalog for StaticCatalog {
    fn office(&self, office_id: &OfficeId) -> Option<OfficeProfile> {
        self.offices.get(office_id).cloned()
    }

    fn service(&self, office_id: &OfficeId, service_id: &ServiceId) -> Option<ServiceProfile> {
        self.services
            .get(&(office_id.clone(), service_id.clone()))
            .cloned()
    }
}
