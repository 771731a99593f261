//! Transient status-write failures are retried until the write lands; the
//! pending target status is never dropped and the lifecycle still completes
//! in order.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use common::FaultStore;
use pza_schemas::OrderStatus;
use pza_store::OrderStore;
use pza_tracker::{DwellSchedule, OrderTracker};

#[tokio::test]
async fn retries_until_the_write_lands() {
    let fault = Arc::new(FaultStore::new());
    let order_id = common::seed_order(fault.as_ref()).await;

    // The first two attempts at the Placed → Accepted write fail.
    fault.fail_next_updates(2);

    let store: Arc<dyn OrderStore> = Arc::clone(&fault) as Arc<dyn OrderStore>;
    let schedule = DwellSchedule::uniform(Duration::from_millis(15), Duration::from_millis(5));
    let tracker = OrderTracker::new(store, schedule);

    let mut rx = tracker.subscribe();
    tracker.start(order_id).await.expect("start tracker");

    let mut seen = Vec::new();
    loop {
        let ev = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for progress event")
            .expect("progress bus closed");
        seen.push(ev.status);
        if ev.status.is_terminal() {
            break;
        }
    }

    // Sequence is unaffected by the injected failures.
    assert_eq!(
        seen,
        vec![
            OrderStatus::Placed,
            OrderStatus::Accepted,
            OrderStatus::Preparing,
            OrderStatus::Dispatched,
            OrderStatus::Delivered,
        ]
    );

    // 4 transitions + 2 retried attempts.
    assert_eq!(fault.update_attempts.load(Ordering::SeqCst), 6);

    let persisted = fault.fetch_order(order_id).await.expect("fetch order");
    assert_eq!(persisted.status, OrderStatus::Delivered);
}
