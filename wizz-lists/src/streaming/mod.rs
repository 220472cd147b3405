//! Streaming phases
//!
//! Each phase is the body of one connection task (see
//! [`wizz_common::sse::spawn_connection`]). The task owns its interval
//! timer, so the timer is gone as soon as the task returns after `done` or
//! is cancelled by a disconnect.

pub mod generate_phase;
pub mod sort_phase;

pub use generate_phase::{run_generate_phase, GenerateParams, StreamMode, STREAM_LIMIT_MAX};
pub use sort_phase::{run_sort_phase, SortCandidate, SortParams};

use std::time::Duration;
use tokio::time::{interval, Interval, MissedTickBehavior};

/// Interval whose first tick completes immediately and whose late ticks are
/// delayed rather than bunched up
pub(crate) fn ticker(period: Duration) -> Interval {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}
