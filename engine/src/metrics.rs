//! Business metrics for the queue engine.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `janseva_tokens_booked_total` - Tokens admitted
//! - `janseva_tokens_cancelled_total` - Citizen cancellations
//! - `janseva_tokens_finalized_total{outcome}` - Completed/skipped tokens
//! - `janseva_queue_advances_total` - `call_next` invocations that mutated
//!
//! ## Histograms
//! - `janseva_wait_estimate_minutes` - Estimates handed out at booking

use metrics::{counter, describe_counter, describe_histogram, histogram};

/// Register metric descriptions. Called once when the first engine is
/// constructed; re-registration is a no-op at the recorder level.
pub fn register_queue_metrics() {
    describe_counter!(
        "janseva_tokens_booked_total",
        "Total number of tokens admitted through booking"
    );
    describe_counter!(
        "janseva_tokens_cancelled_total",
        "Total number of tokens cancelled by their owners"
    );
    describe_counter!(
        "janseva_tokens_finalized_total",
        "Total number of tokens finalized, labelled by outcome (completed, skipped)"
    );
    describe_counter!(
        "janseva_queue_advances_total",
        "Total number of call-next invocations that touched the queue"
    );
    describe_histogram!(
        "janseva_wait_estimate_minutes",
        "Wait estimates handed out at booking time"
    );
}

/// Record an admitted booking and the estimate it was given.
pub fn record_booking(estimated_wait_minutes: u32) {
    counter!("janseva_tokens_booked_total").increment(1);
    histogram!("janseva_wait_estimate_minutes").record(f64::from(estimated_wait_minutes));
}

/// Record a citizen cancellation.
pub fn record_cancellation() {
    counter!("janseva_tokens_cancelled_total").increment(1);
}

/// Record a finalized token by outcome label.
pub fn record_finalized(outcome: &'static str) {
    counter!("janseva_tokens_finalized_total", "outcome" => outcome).increment(1);
}

/// Record a queue advance that mutated state.
pub fn record_advance() {
    counter!("janseva_queue_advances_total").increment(1);
}
