//! Catalog snapshot loading.
//!
//! The office/service catalog is owned by an external system; this
//! deployment consumes a JSON snapshot loaded at startup:
//!
//! ```json
//! [
//!   {
//!     "id": "rto-pune",
//!     "name": "RTO Pune",
//!     "daily_capacity": 200,
//!     "default_service_minutes": 20,
//!     "services": [
//!       { "id": "learning-licence", "name": "Learning Licence" }
//!     ]
//!   }
//! ]
//! ```
//!
//! Without `CATALOG_PATH`, a small built-in demo set is served.

use anyhow::Context;
use janseva_core::catalog::{OfficeCatalog, OfficePolicy, OfficeProfile, ServiceProfile};
use janseva_core::types::{OfficeId, ServiceId};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// One office entry in the snapshot file.
#[derive(Debug, Deserialize)]
struct OfficeEntry {
    id: String,
    name: String,
    #[serde(default = "default_capacity")]
    daily_capacity: u32,
    #[serde(default = "default_service_minutes")]
    default_service_minutes: u32,
    services: Vec<ServiceEntry>,
}

#[derive(Debug, Deserialize)]
struct ServiceEntry {
    id: String,
    name: String,
}

const fn default_capacity() -> u32 {
    200
}

const fn default_service_minutes() -> u32 {
    20
}

/// In-memory catalog snapshot.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCatalog {
    offices: HashMap<OfficeId, OfficeProfile>,
    services: HashMap<(OfficeId, ServiceId), ServiceProfile>,
}

impl SnapshotCatalog {
    /// Load a snapshot from a JSON file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("reading catalog {}", path.as_ref().display()))?;
        let entries: Vec<OfficeEntry> =
            serde_json::from_str(&raw).context("parsing catalog JSON")?;
        Ok(Self::from_entries(entries))
    }

    /// The built-in demo catalog.
    #[must_use]
    pub fn demo() -> Self {
        let entries = vec![
            OfficeEntry {
                id: "rto-pune".to_string(),
                name: "RTO Pune".to_string(),
                daily_capacity: 200,
                default_service_minutes: 20,
                services: vec![
                    ServiceEntry {
                        id: "learning-licence".to_string(),
                        name: "Learning Licence".to_string(),
                    },
                    ServiceEntry {
                        id: "vehicle-registration".to_string(),
                        name: "Vehicle Registration".to_string(),
                    },
                ],
            },
            OfficeEntry {
                id: "rto-mumbai".to_string(),
                name: "RTO Mumbai".to_string(),
                daily_capacity: 300,
                default_service_minutes: 15,
                services: vec![ServiceEntry {
                    id: "driving-licence".to_string(),
                    name: "Driving Licence".to_string(),
                }],
            },
        ];
        Self::from_entries(entries)
    }

    /// Number of offices in the snapshot.
    #[must_use]
    pub fn office_count(&self) -> usize {
        self.offices.len()
    }

    fn from_entries(entries: Vec<OfficeEntry>) -> Self {
        let mut catalog = Self::default();
        for entry in entries {
            let office_id = OfficeId::new(&entry.id);
            catalog.offices.insert(
                office_id.clone(),
                OfficeProfile {
                    id: office_id.clone(),
                    name: entry.name,
                    policy: OfficePolicy {
                        daily_capacity: entry.daily_capacity,
                        default_service_minutes: entry.default_service_minutes,
                    },
                },
            );
            for service in entry.services {
                let service_id = ServiceId::new(&service.id);
                catalog.services.insert(
                    (office_id.clone(), service_id.clone()),
                    ServiceProfile {
                        id: service_id,
                        name: service.name,
                    },
                );
            }
        }
        catalog
    }
}

impl OfficeCatalog for SnapshotCatalog {
    fn office(&self, office_id: &OfficeId) -> Option<OfficeProfile> {
        self.offices.get(office_id).cloned()
    }

    fn service(&self, office_id: &OfficeId, service_id: &ServiceId) -> Option<ServiceProfile> {
        self.services
            .get(&(office_id.clone(), service_id.clone()))
            .cloned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn demo_catalog_resolves_offices_and_services() {
        let catalog = SnapshotCatalog::demo();
        assert_eq!(catalog.office_count(), 2);

        let office = catalog.office(&OfficeId::new("rto-pune")).unwrap();
        assert_eq!(office.name, "RTO Pune");
        assert_eq!(office.policy.daily_capacity, 200);

        assert!(
            catalog
                .service(
                    &OfficeId::new("rto-pune"),
                    &ServiceId::new("learning-licence")
                )
                .is_some()
        );
        assert!(
            catalog
                .service(
                    &OfficeId::new("rto-mumbai"),
                    &ServiceId::new("learning-licence")
                )
                .is_none()
        );
    }

    #[test]
    fn snapshot_parses_from_json() {
        let raw = r#"[{
            "id": "rto-nashik",
            "name": "RTO Nashik",
            "services": [{ "id": "permit", "name": "Permit" }]
        }]"#;
        let entries: Vec<OfficeEntry> = serde_json::from_str(raw).unwrap();
        let catalog = SnapshotCatalog::from_entries(entries);

        let office = catalog.office(&OfficeId::new("rto-nashik")).unwrap();
        assert_eq!(office.policy.daily_capacity, 200);
    }
}
