//! Shared runtime state for pza-daemon.
//!
//! Handlers receive `State<Arc<AppState>>` from Axum. All collaborators are
//! injected explicitly — there is no process-wide singleton: the catalog is
//! an immutable snapshot, the store is whichever backend the wiring chose,
//! and the tracker owns every background lifecycle task.

use std::sync::Arc;

use pza_catalog::Catalog;
use pza_store::{MemoryStore, OrderStore};
use pza_tracker::{DwellSchedule, OrderTracker};

/// Static build metadata included in the health response.
#[derive(Clone, Debug)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

/// Cloneable (Arc) handle shared across all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub build: BuildInfo,
    pub catalog: Arc<Catalog>,
    pub store: Arc<dyn OrderStore>,
    pub tracker: Arc<OrderTracker>,
}

impl AppState {
    /// Wire the daemon against an arbitrary store backend.
    pub fn new(store: Arc<dyn OrderStore>, schedule: DwellSchedule) -> Self {
        let tracker = Arc::new(OrderTracker::new(Arc::clone(&store), schedule));
        Self {
            build: BuildInfo {
                service: "pza-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
            catalog: Arc::new(Catalog::seeded()),
            store,
            tracker,
        }
    }

    /// In-memory wiring for tests and dev runs.
    pub fn in_memory(schedule: DwellSchedule) -> Self {
        Self::new(Arc::new(MemoryStore::new()), schedule)
    }
}
