//! Dwell schedule — how long an order sits in each status before the next
//! automatic transition.

use std::time::Duration;

use chrono::{DateTime, Utc};
use pza_schemas::OrderStatus;

/// Per-status dwell durations plus the backoff used when a status write must
/// be retried. Callers inject the schedule, so tests run the full lifecycle
/// in milliseconds while production uses the standard minutes-scale timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DwellSchedule {
    pub placed: Duration,
    pub accepted: Duration,
    pub preparing: Duration,
    pub dispatched: Duration,
    pub retry_backoff: Duration,
}

impl DwellSchedule {
    /// Production timings: 1 min to accept, 3 min to start preparing, 5 min
    /// to dispatch, 5 min to deliver.
    pub fn standard() -> Self {
        Self {
            placed: Duration::from_secs(60),
            accepted: Duration::from_secs(180),
            preparing: Duration::from_secs(300),
            dispatched: Duration::from_secs(300),
            retry_backoff: Duration::from_secs(1),
        }
    }

    /// Same dwell in every status. Test convenience.
    pub fn uniform(dwell: Duration, retry_backoff: Duration) -> Self {
        Self {
            placed: dwell,
            accepted: dwell,
            preparing: dwell,
            dispatched: dwell,
            retry_backoff,
        }
    }

    /// Dwell spent in `status` before advancing; `None` at the terminal state.
    pub fn dwell_for(&self, status: OrderStatus) -> Option<Duration> {
        match status {
            OrderStatus::Placed => Some(self.placed),
            OrderStatus::Accepted => Some(self.accepted),
            OrderStatus::Preparing => Some(self.preparing),
            OrderStatus::Dispatched => Some(self.dispatched),
            OrderStatus::Delivered => None,
        }
    }

    /// Remaining dwell for an order that entered `status` at `entered_at`.
    ///
    /// Saturates at zero — an order that already overstayed its dwell (e.g.
    /// found stuck after a restart) is due immediately. `None` at terminal.
    pub fn remaining(
        &self,
        status: OrderStatus,
        entered_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Option<Duration> {
        let dwell = self.dwell_for(status)?;
        let elapsed = now
            .signed_duration_since(entered_at)
            .to_std()
            .unwrap_or(Duration::ZERO); // entered_at in the future: treat as no elapsed time
        Some(dwell.saturating_sub(elapsed))
    }
}

impl Default for DwellSchedule {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn standard_timings_match_the_fixed_lifecycle() {
        let s = DwellSchedule::standard();
        assert_eq!(s.dwell_for(OrderStatus::Placed), Some(Duration::from_secs(60)));
        assert_eq!(
            s.dwell_for(OrderStatus::Accepted),
            Some(Duration::from_secs(180))
        );
        assert_eq!(
            s.dwell_for(OrderStatus::Preparing),
            Some(Duration::from_secs(300))
        );
        assert_eq!(
            s.dwell_for(OrderStatus::Dispatched),
            Some(Duration::from_secs(300))
        );
        assert_eq!(s.dwell_for(OrderStatus::Delivered), None);
    }

    #[test]
    fn remaining_subtracts_elapsed_time() {
        let s = DwellSchedule::standard();
        let entered = Utc::now();
        let now = entered + TimeDelta::seconds(40);
        assert_eq!(
            s.remaining(OrderStatus::Placed, entered, now),
            Some(Duration::from_secs(20))
        );
    }

    #[test]
    fn remaining_saturates_for_overdue_orders() {
        let s = DwellSchedule::standard();
        let entered = Utc::now();
        let now = entered + TimeDelta::seconds(3600);
        assert_eq!(
            s.remaining(OrderStatus::Preparing, entered, now),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn remaining_is_none_at_terminal() {
        let s = DwellSchedule::standard();
        assert_eq!(s.remaining(OrderStatus::Delivered, Utc::now(), Utc::now()), None);
    }

    #[test]
    fn future_entry_time_is_clamped_to_full_dwell() {
        let s = DwellSchedule::standard();
        let now = Utc::now();
        let entered = now + TimeDelta::seconds(30); // clock skew
        assert_eq!(
            s.remaining(OrderStatus::Placed, entered, now),
            Some(Duration::from_secs(60))
        );
    }
}
