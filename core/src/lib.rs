//! # Janseva Core
//!
//! Domain model and abstractions for the Janseva queue engine - the
//! token lifecycle behind citizen-service office queues.
//!
//! ## Core Concepts
//!
//! - **Token**: a citizen's reservation for a service visit, tracked
//!   through a closed status lifecycle ([`status::TokenStatus`])
//! - **Token Store**: durable source of truth for every token
//!   ([`store::TokenStore`])
//! - **Queue Projection**: the ordered per-office, per-day view derived
//!   from the store on every read (pure functions in [`ordering`])
//! - **Change Notifier**: publish/subscribe channel for lightweight
//!   "queue changed" signals ([`notifier::ChangeNotifier`])
//! - **Office Catalog**: external collaborator supplying valid offices,
//!   services, and per-office policy ([`catalog::OfficeCatalog`])
//!
//! ## Architecture Principles
//!
//! - Functional core, imperative shell: ordering and advancement
//!   *selection* are pure functions; synchronization lives in the store
//! - The store is the only authority - projections are recomputed per
//!   read, and subscribers reconcile by re-reading rather than trusting
//!   pushed payloads
//! - Illegal status transitions are unrepresentable at the call site:
//!   the transition table is part of the type, not the data

// Re-export commonly used types
pub use chrono::{DateTime, NaiveDate, Utc};

pub mod catalog;
pub mod environment;
pub mod error;
pub mod notifier;
pub mod ordering;
pub mod status;
pub mod store;
pub mod types;

pub use error::QueueError;
pub use status::{TokenOutcome, TokenStatus};
pub use types::{
    BookingRequest, CitizenId, OfficeId, Official, OfficialId, QueueStats, QueueView, ServiceId,
    Token, TokenId, TokenNumber,
};
