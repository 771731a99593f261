//! Order lifecycle tracker.
//!
//! One detached tokio task per order drives its status through the fixed
//! sequence `Placed → Accepted → Preparing → Dispatched → Delivered`, waiting
//! the scheduled dwell before each transition. Every transition is persisted
//! through the store **before** it is published on the progress bus, so a
//! reader that sees an event can always re-fetch at least that status from
//! the store.
//!
//! The tracker is the only writer of order status; within one order the loop
//! is strictly sequential, and trackers for different orders share nothing
//! but the store. Status entry times are persisted (`status_changed_at`), so
//! [`OrderTracker::resume_in_flight`] can pick up stuck orders after a
//! process restart and wait only the dwell they have left.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use pza_schemas::{OrderRecord, OrderStatus, ProgressEvent};
use pza_store::{OrderStore, StoreError};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

pub mod schedule;

pub use schedule::DwellSchedule;

// ---------------------------------------------------------------------------
// TrackError
// ---------------------------------------------------------------------------

/// Errors returned by [`OrderTracker::start`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum TrackError {
    #[error("Order {0} not found")]
    OrderNotFound(i64),

    /// A driver task for this order is already running. Starting a second
    /// one would double-fire every remaining transition.
    #[error("order {0} is already being tracked")]
    AlreadyTracking(i64),

    #[error(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// OrderTracker
// ---------------------------------------------------------------------------

/// Spawns and supervises one lifecycle driver task per order.
pub struct OrderTracker {
    store: Arc<dyn OrderStore>,
    schedule: DwellSchedule,
    bus: broadcast::Sender<ProgressEvent>,
    /// Order ids with a live driver task. Guards against duplicate starts.
    active: Arc<Mutex<HashSet<i64>>>,
}

impl OrderTracker {
    pub fn new(store: Arc<dyn OrderStore>, schedule: DwellSchedule) -> Self {
        let (bus, _rx) = broadcast::channel::<ProgressEvent>(1024);
        Self {
            store,
            schedule,
            bus,
            active: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Subscribe to the progress feed. Events are best-effort (a lagging
    /// receiver drops old events); the store is the authoritative fallback.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.bus.subscribe()
    }

    /// Whether a driver task for `order_id` is currently running.
    pub fn is_tracking(&self, order_id: i64) -> bool {
        self.active
            .lock()
            .expect("active set poisoned")
            .contains(&order_id)
    }

    /// Start driving `order_id` through the rest of its lifecycle.
    ///
    /// Verifies the order exists, claims the per-order driver slot, then
    /// spawns a detached task and returns immediately — callers never block
    /// on dwell waits. An order already at `Delivered` is a no-op.
    pub async fn start(&self, order_id: i64) -> Result<(), TrackError> {
        let order = match self.store.fetch_order(order_id).await {
            Ok(order) => order,
            Err(StoreError::OrderNotFound(id)) => return Err(TrackError::OrderNotFound(id)),
            Err(e) => return Err(TrackError::Store(e)),
        };

        if order.status.is_terminal() {
            debug!(order_id, "order already delivered; nothing to track");
            return Ok(());
        }

        {
            let mut active = self.active.lock().expect("active set poisoned");
            if !active.insert(order_id) {
                return Err(TrackError::AlreadyTracking(order_id));
            }
        }

        let store = Arc::clone(&self.store);
        let schedule = self.schedule;
        let bus = self.bus.clone();
        let active = Arc::clone(&self.active);
        tokio::spawn(async move {
            drive(store.as_ref(), schedule, &bus, order).await;
            active
                .lock()
                .expect("active set poisoned")
                .remove(&order_id);
        });

        Ok(())
    }

    /// Start a driver for every non-terminal order in the store.
    ///
    /// Called once at boot so orders stranded mid-lifecycle by a process
    /// restart resume from their persisted status instead of staying stuck.
    /// Orders already being tracked are skipped. Returns the number of
    /// drivers started.
    pub async fn resume_in_flight(&self) -> Result<usize, TrackError> {
        let stuck = self.store.list_in_flight().await?;
        let mut started = 0;
        for order in stuck {
            match self.start(order.id).await {
                Ok(()) => started += 1,
                Err(TrackError::AlreadyTracking(_)) => {}
                // The order was visible in the scan a moment ago; if it is
                // gone now there is simply nothing to resume.
                Err(TrackError::OrderNotFound(id)) => {
                    warn!(order_id = id, "order vanished between scan and resume");
                }
                Err(e) => return Err(e),
            }
        }
        if started > 0 {
            info!(count = started, "resumed in-flight order trackers");
        }
        Ok(started)
    }
}

// ---------------------------------------------------------------------------
// Driver loop
// ---------------------------------------------------------------------------

/// The per-order driver. Strictly sequential: each transition is persisted
/// and published before the next dwell begins.
async fn drive(
    store: &dyn OrderStore,
    schedule: DwellSchedule,
    bus: &broadcast::Sender<ProgressEvent>,
    order: OrderRecord,
) {
    let order_id = order.id;
    let mut status = order.status;
    let mut entered_at = order.status_changed_at;

    // The current status is already persisted (at creation or by a previous
    // incarnation of this task), so announcing it keeps the
    // persist-before-publish ordering.
    let _ = bus.send(ProgressEvent { order_id, status });
    info!(order_id, status = status.as_str(), "tracking order");

    while let Some(wait) = schedule.remaining(status, entered_at, Utc::now()) {
        tokio::time::sleep(wait).await;

        let Some(next) = status.next() else {
            break;
        };

        if !persist_status(store, schedule, order_id, next).await {
            return; // order vanished; logged inside
        }

        status = next;
        entered_at = Utc::now();
        let _ = bus.send(ProgressEvent { order_id, status });
        info!(order_id, status = status.as_str(), "order status advanced");
    }

    info!(order_id, "order delivered; tracking complete");
}

/// Persist one status write, retrying transient failures indefinitely — the
/// pending target status is never dropped. Returns `false` if the order
/// disappeared out-of-band, in which case no further writes happen.
async fn persist_status(
    store: &dyn OrderStore,
    schedule: DwellSchedule,
    order_id: i64,
    status: OrderStatus,
) -> bool {
    let mut attempt = 0u32;
    loop {
        match store.update_status(order_id, status).await {
            Ok(()) => return true,
            Err(e) if e.is_transient() => {
                attempt += 1;
                warn!(
                    order_id,
                    status = status.as_str(),
                    attempt,
                    error = %e,
                    "status write failed; retrying"
                );
                tokio::time::sleep(schedule.retry_backoff).await;
            }
            Err(StoreError::OrderNotFound(_)) => {
                error!(
                    order_id,
                    status = status.as_str(),
                    "order vanished mid-lifecycle; aborting tracker"
                );
                return false;
            }
            Err(e) => {
                // Non-transient, non-vanished failures should not occur for a
                // plain status write; abort rather than spin on a permanent
                // error.
                error!(order_id, error = %e, "unrecoverable status write failure");
                return false;
            }
        }
    }
}
