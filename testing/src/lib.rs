//! # Janseva Testing
//!
//! Deterministic test doubles for the queue engine:
//!
//! - [`InMemoryTokenStore`]: `HashMap`-backed [`janseva_core::store::TokenStore`]
//!   with the same concurrency contract as the Postgres store
//! - [`FixedClock`] / [`test_clock`]: reproducible time
//! - [`RecordingNotifier`]: captures published signals and feeds live
//!   subscribers
//! - [`StaticCatalog`]: in-memory office/service catalog
//! - [`TokenFixture`]: builder for tokens with sensible defaults
//!
//! ## Example
//!
//! ```ignore
//! let store = Arc::new(InMemoryTokenStore::new());
//! let engine = QueueEngine::new(store, notifier, catalog, Arc::new(test_clock()), config);
//!
//! let token = engine.book_token(owner, request).await?;
//! assert_eq!(token.status, TokenStatus::Waiting);
//! ```

pub mod catalog;
pub mod fixtures;
pub mod mocks;
pub mod notifier;
pub mod store;

pub use catalog::StaticCatalog;
pub use fixtures::TokenFixture;
pub use mocks::{FixedClock, SteppingClock, stepping_clock, test_clock};
pub use notifier::RecordingNotifier;
pub use store::InMemoryTokenStore;
