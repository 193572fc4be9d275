//! # Janseva Engine
//!
//! The queue/token lifecycle engine: the rules by which a citizen's
//! booking becomes a position in an office queue, how an official
//! advances that queue, and how concurrent readers observe consistent
//! state.
//!
//! The engine is a thin, stateless facade over injected collaborators -
//! the durable [`janseva_core::store::TokenStore`], a
//! [`janseva_core::notifier::ChangeNotifier`], the external
//! [`janseva_core::catalog::OfficeCatalog`], and a clock. Every
//! operation is an independent request; the store provides all
//! synchronization, so two engine instances over the same store behave
//! as one.
//!
//! ## Operations
//!
//! | Operation        | Caller   | Module        |
//! |------------------|----------|---------------|
//! | `book_token`     | citizen  | [`admission`] |
//! | `cancel_token`   | citizen  | [`advancer`]  |
//! | `my_tokens`      | citizen  | [`projection`]|
//! | `queue`          | official | [`projection`]|
//! | `call_next`      | official | [`advancer`]  |
//! | `set_status`     | official | [`advancer`]  |
//! | `today_stats`    | official | [`projection`]|
//! | `subscribe`      | both     | [`QueueEngine::subscribe`] |

pub mod admission;
pub mod advancer;
pub mod estimator;
pub mod metrics;
pub mod notify;
pub mod projection;

mod engine;

pub use engine::{EngineConfig, QueueEngine};
pub use estimator::{EstimatorConfig, WaitEstimator};
pub use notify::BroadcastNotifier;
