//! Concurrency tests for queue advancement.
//!
//! The single-serving invariant must hold across arbitrarily interleaved
//! `call_next` calls - the store serializes advances per office, so no
//! interleaving may ever promote two tokens at once or promote the same
//! token twice.

#![allow(clippy::unwrap_used, clippy::panic)] // Test code

use janseva_core::environment::Clock;
use janseva_core::status::TokenStatus;
use janseva_core::store::TokenStore;
use janseva_core::types::{CitizenId, OfficeId, Official, OfficialId};
use janseva_engine::{EngineConfig, QueueEngine};
use janseva_testing::{
    InMemoryTokenStore, RecordingNotifier, StaticCatalog, TokenFixture, test_clock,
};
use std::collections::HashSet;
use std::sync::Arc;

fn build_engine() -> (QueueEngine, Arc<InMemoryTokenStore>) {
    let store = Arc::new(InMemoryTokenStore::new());
    let engine = QueueEngine::new(
        store.clone(),
        Arc::new(RecordingNotifier::new()),
        Arc::new(StaticCatalog::rto_pune()),
        Arc::new(test_clock()),
        EngineConfig::default(),
    );
    (engine, store)
}

fn pune_official() -> Official {
    Official {
        id: OfficialId::new(),
        office_id: OfficeId::new("rto-pune"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn interleaved_call_next_never_double_serves() {
    let (engine, store) = build_engine();
    let today = test_clock().today();
    let office = OfficeId::new("rto-pune");

    const QUEUED: usize = 5;
    const CALLS: usize = 12;

    for seq in 0..QUEUED {
        store.seed(
            TokenFixture::new("rto-pune", today)
                .sequence(u32::try_from(seq + 1).unwrap())
                .created_offset_secs(i64::try_from(seq).unwrap() * 10)
                .build(),
        );
    }

    let mut handles = Vec::new();
    for _ in 0..CALLS {
        let engine = engine.clone();
        let office = office.clone();
        let official = pune_official();
        handles.push(tokio::spawn(async move {
            engine.call_next(&official, &office).await.unwrap()
        }));
    }

    let mut promoted = Vec::new();
    for handle in handles {
        if let Some(token) = handle.await.unwrap() {
            promoted.push(token.id);
        }
    }

    // Each queued token is promoted exactly once across all calls.
    assert_eq!(promoted.len(), QUEUED);
    let distinct: HashSet<_> = promoted.iter().collect();
    assert_eq!(distinct.len(), QUEUED);

    // More calls than tokens: the tail of calls drained the queue, so
    // everything ends completed and nothing is left at the counter.
    let remaining = store.active_for_office(office, today).await.unwrap();
    let serving = remaining
        .iter()
        .filter(|t| t.status == TokenStatus::Serving)
        .count();
    assert!(serving <= 1, "single-serving invariant violated");
    assert!(
        remaining.len() <= 1,
        "at most the final promotion may still be at the counter"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_cancel_and_advance_agree_on_one_outcome() {
    for _ in 0..20 {
        let (engine, store) = build_engine();
        let today = test_clock().today();
        let office = OfficeId::new("rto-pune");
        let owner = CitizenId::new();
        let token = TokenFixture::new("rto-pune", today).owner(owner).build();
        store.seed(token.clone());

        let cancel = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.cancel_token(owner, token.id).await })
        };
        let advance = {
            let engine = engine.clone();
            let office = office.clone();
            let official = pune_official();
            tokio::spawn(async move { engine.call_next(&official, &office).await })
        };

        let cancel_result = cancel.await.unwrap();
        let advance_result = advance.await.unwrap().unwrap();

        let stored = store.get(token.id).await.unwrap().unwrap();
        match stored.status {
            // Cancel won: the advance found an empty queue.
            TokenStatus::Cancelled => {
                assert!(cancel_result.is_ok());
                assert!(advance_result.is_none());
            }
            // Advance won: the cancel hit the serving guard.
            TokenStatus::Serving => {
                assert!(cancel_result.is_err());
                assert_eq!(advance_result.map(|t| t.id), Some(token.id));
            }
            other => panic!("unexpected terminal state: {other}"),
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_bookings_receive_distinct_numbers_and_positions() {
    let (engine, _) = build_engine();
    let today = test_clock().today();

    let mut handles = Vec::new();
    for _ in 0..16 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine
                .book_token(
                    CitizenId::new(),
                    janseva_core::BookingRequest {
                        office_id: "rto-pune".parse().unwrap(),
                        service_id: "learning-licence".parse().unwrap(),
                        appointment_date: today,
                        appointment_time: "09:00".to_string(),
                    },
                )
                .await
                .unwrap()
        }));
    }

    let mut numbers = HashSet::new();
    for handle in handles {
        let token = handle.await.unwrap();
        assert!(
            numbers.insert(token.token_number.clone()),
            "token numbers must be unique per office and day"
        );
    }
    assert_eq!(numbers.len(), 16);
}
