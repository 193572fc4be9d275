//! Application state for Axum handlers.

use janseva_engine::QueueEngine;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// The queue engine every handler delegates to.
    pub engine: Arc<QueueEngine>,
}

impl AppState {
    /// Create application state around an engine.
    #[must_use]
    pub fn new(engine: QueueEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}
