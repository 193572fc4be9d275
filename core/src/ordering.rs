//! Pure queue-ordering functions.
//!
//! The scheduling discipline is FIFO by `created_at` - first booked,
//! first served - with the token id as tie-break for identical
//! timestamps, so the order is total and deterministic. No priority
//! classes exist.
//!
//! Everything here is a pure function over token slices. Store
//! implementations reuse [`advance_plan`] under their own
//! synchronization, and the queue projection reuses [`partition_queue`],
//! so the one ordering definition cannot drift between read and write
//! paths.

use crate::status::TokenStatus;
use crate::types::{Token, TokenId};
use chrono::NaiveDate;
use std::cmp::Ordering;

/// FIFO comparator: `created_at` ascending, then token id ascending.
///
/// The id tie-break keeps ordering total under clock collisions - two
/// tokens created in the same instant still have one deterministic
/// relative order on every node and every read.
#[must_use]
pub fn queue_order(a: &Token, b: &Token) -> Ordering {
    a.created_at
        .cmp(&b.created_at)
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort tokens into service order, in place.
pub fn sort_queue(tokens: &mut [Token]) {
    tokens.sort_by(queue_order);
}

/// Split an office's active tokens into the serving token and the
/// FIFO-ordered waiting list, assigning fresh 1-based positions.
///
/// `pending` tokens are treated as waiting - a pending token for today is
/// queue-eligible. Tokens in any other status are discarded. If the
/// store ever held more than one serving row (unreachable through the
/// store primitives), the earliest by queue order is surfaced.
#[must_use]
pub fn partition_queue(mut tokens: Vec<Token>) -> (Option<Token>, Vec<Token>) {
    sort_queue(&mut tokens);

    let mut serving = None;
    let mut waiting = Vec::with_capacity(tokens.len());
    for token in tokens {
        match token.status {
            TokenStatus::Serving if serving.is_none() => serving = Some(token),
            TokenStatus::Pending | TokenStatus::Waiting => waiting.push(token),
            _ => {}
        }
    }

    for (index, token) in waiting.iter_mut().enumerate() {
        #[allow(clippy::cast_possible_truncation)] // queue depth is far below u32::MAX
        let position = (index + 1) as u32;
        token.position_in_queue = Some(position);
    }

    (serving, waiting)
}

/// The two token moves a queue advance consists of.
///
/// Selection only - durability and mutual exclusion are the store's job.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AdvancePlan {
    /// The serving token to auto-complete, if one is at the counter.
    pub complete: Option<TokenId>,
    /// The FIFO head to promote to serving, if the day's queue is
    /// non-empty.
    pub promote: Option<TokenId>,
}

impl AdvancePlan {
    /// Whether the plan changes nothing (empty queue, idle counter).
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.complete.is_none() && self.promote.is_none()
    }
}

/// Decide which token an advance completes and which it promotes.
///
/// The outgoing serving token (if any) is completed. The promoted token
/// is the queue-order head among queue-eligible tokens whose appointment
/// day is `today` - a future-dated pending token never jumps into
/// today's queue.
#[must_use]
pub fn advance_plan(active: &[Token], today: NaiveDate) -> AdvancePlan {
    let complete = active
        .iter()
        .find(|t| t.status == TokenStatus::Serving)
        .map(|t| t.id);

    let promote = active
        .iter()
        .filter(|t| t.status.is_queue_eligible() && t.appointment_date == today)
        .min_by(|a, b| queue_order(a, b))
        .map(|t| t.id);

    AdvancePlan { complete, promote }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{CitizenId, OfficeId, ServiceId, TokenNumber};
    use chrono::{DateTime, Duration, Utc};
    use proptest::prelude::*;

    fn base_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-01-14T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn token_at(offset_secs: i64, status: TokenStatus, date: NaiveDate) -> Token {
        let office = OfficeId::new("rto-pune");
        let created = base_time() + Duration::seconds(offset_secs);
        Token {
            id: TokenId::new(),
            token_number: TokenNumber::compose(&office, date, 1),
            owner_id: CitizenId::new(),
            office_id: office,
            office_name: "RTO Pune".to_string(),
            service_id: ServiceId::new("learning-licence"),
            service_name: "Learning Licence".to_string(),
            appointment_date: date,
            appointment_time: "09:00".to_string(),
            status,
            position_in_queue: None,
            estimated_wait_minutes: None,
            created_at: created,
            updated_at: created,
            served_at: None,
            served_by: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 14).unwrap()
    }

    #[test]
    fn partition_orders_waiting_fifo_with_positions() {
        let t1 = token_at(0, TokenStatus::Waiting, today());
        let t2 = token_at(30, TokenStatus::Pending, today());
        let t3 = token_at(60, TokenStatus::Waiting, today());
        let (serving, waiting) = partition_queue(vec![t3.clone(), t1.clone(), t2.clone()]);

        assert!(serving.is_none());
        let ids: Vec<_> = waiting.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![t1.id, t2.id, t3.id]);
        let positions: Vec<_> = waiting.iter().map(|t| t.position_in_queue).collect();
        assert_eq!(positions, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn partition_separates_serving_token() {
        let serving_token = token_at(0, TokenStatus::Serving, today());
        let waiting_token = token_at(10, TokenStatus::Waiting, today());
        let (serving, waiting) =
            partition_queue(vec![waiting_token.clone(), serving_token.clone()]);

        assert_eq!(serving.map(|t| t.id), Some(serving_token.id));
        assert_eq!(waiting.len(), 1);
        assert_eq!(waiting[0].id, waiting_token.id);
    }

    #[test]
    fn partition_drops_terminal_tokens() {
        let cancelled = token_at(0, TokenStatus::Cancelled, today());
        let completed = token_at(5, TokenStatus::Completed, today());
        let (serving, waiting) = partition_queue(vec![cancelled, completed]);
        assert!(serving.is_none());
        assert!(waiting.is_empty());
    }

    #[test]
    fn advance_plan_completes_and_promotes_head() {
        let serving = token_at(0, TokenStatus::Serving, today());
        let w1 = token_at(10, TokenStatus::Waiting, today());
        let w2 = token_at(20, TokenStatus::Waiting, today());
        let plan = advance_plan(&[w2, serving.clone(), w1.clone()], today());

        assert_eq!(plan.complete, Some(serving.id));
        assert_eq!(plan.promote, Some(w1.id));
    }

    #[test]
    fn advance_plan_skips_future_dated_pending() {
        let tomorrow = today().succ_opt().unwrap();
        let future = token_at(0, TokenStatus::Pending, tomorrow);
        let plan = advance_plan(&[future], today());
        assert!(plan.is_noop());
    }

    #[test]
    fn advance_plan_on_empty_queue_is_noop() {
        assert!(advance_plan(&[], today()).is_noop());
    }

    proptest! {
        /// FIFO: earlier created_at always means smaller position.
        #[test]
        fn fifo_positions_follow_creation_order(offsets in proptest::collection::vec(0i64..86_400, 1..40)) {
            let tokens: Vec<Token> = offsets
                .iter()
                .map(|&o| token_at(o, TokenStatus::Waiting, today()))
                .collect();
            let (_, waiting) = partition_queue(tokens);

            for pair in waiting.windows(2) {
                prop_assert!(pair[0].created_at <= pair[1].created_at);
                if pair[0].created_at == pair[1].created_at {
                    prop_assert!(pair[0].id < pair[1].id);
                }
                prop_assert!(
                    pair[0].position_in_queue.unwrap() < pair[1].position_in_queue.unwrap()
                );
            }
        }

        /// The comparator is a total order: sorting any permutation of
        /// the same tokens yields the same sequence.
        #[test]
        fn ordering_is_deterministic_under_shuffle(offsets in proptest::collection::vec(0i64..60, 2..20)) {
            let tokens: Vec<Token> = offsets
                .iter()
                .map(|&o| token_at(o, TokenStatus::Waiting, today()))
                .collect();

            let mut forward = tokens.clone();
            let mut reversed: Vec<Token> = tokens.into_iter().rev().collect();
            sort_queue(&mut forward);
            sort_queue(&mut reversed);

            let a: Vec<_> = forward.iter().map(|t| t.id).collect();
            let b: Vec<_> = reversed.iter().map(|t| t.id).collect();
            prop_assert_eq!(a, b);
        }

        /// The promoted token is always the queue-order minimum of the
        /// eligible set.
        #[test]
        fn promoted_token_is_queue_head(offsets in proptest::collection::vec(0i64..3_600, 1..30)) {
            let tokens: Vec<Token> = offsets
                .iter()
                .map(|&o| token_at(o, TokenStatus::Waiting, today()))
                .collect();
            let plan = advance_plan(&tokens, today());

            let mut sorted = tokens;
            sort_queue(&mut sorted);
            prop_assert_eq!(plan.promote, Some(sorted[0].id));
            prop_assert_eq!(plan.complete, None);
        }
    }
}
