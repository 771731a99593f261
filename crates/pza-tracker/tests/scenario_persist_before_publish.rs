//! Persistence happens-before publication: whenever a progress event is
//! observed, the store already reflects at least that status.

mod common;

use std::sync::Arc;
use std::time::Duration;

use pza_schemas::OrderStatus;
use pza_store::{MemoryStore, OrderStore};
use pza_tracker::{DwellSchedule, OrderTracker};

fn ordinal(s: OrderStatus) -> usize {
    match s {
        OrderStatus::Placed => 0,
        OrderStatus::Accepted => 1,
        OrderStatus::Preparing => 2,
        OrderStatus::Dispatched => 3,
        OrderStatus::Delivered => 4,
    }
}

#[tokio::test]
async fn store_reflects_every_published_status() {
    let store: Arc<dyn OrderStore> = Arc::new(MemoryStore::new());
    let order_id = common::seed_order(store.as_ref()).await;

    let schedule = DwellSchedule::uniform(Duration::from_millis(15), Duration::from_millis(5));
    let tracker = OrderTracker::new(Arc::clone(&store), schedule);

    let mut rx = tracker.subscribe();
    tracker.start(order_id).await.expect("start tracker");

    loop {
        let ev = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for progress event")
            .expect("progress bus closed");

        let persisted = store.fetch_order(order_id).await.expect("fetch order");
        assert!(
            ordinal(persisted.status) >= ordinal(ev.status),
            "event {:?} published before persisted status {:?}",
            ev.status,
            persisted.status
        );

        if ev.status.is_terminal() {
            break;
        }
    }
}
