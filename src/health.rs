//! Liveness policy for a configured instance.
//!
//! An instance is working when it has emitted something within its
//! expected receive period and has not failed since.

use crate::store::StoredState;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Whether the instance should be considered healthy at `now` (unix seconds).
pub fn is_working(state: &StoredState, expected_receive_period_days: u32, now: u64) -> bool {
    let Some(last_event_at) = state.last_event_at else {
        return false;
    };
    let window = u64::from(expected_receive_period_days) * SECS_PER_DAY;
    let recent_event = now.saturating_sub(last_event_at) <= window;
    let failed_since = state.last_error_at.is_some_and(|err| err > last_event_at);
    recent_event && !failed_since
}
