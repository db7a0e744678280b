use std::sync::Arc;

use pathwise_core::event_types::{JOB_PROGRESS, SYSTEM_HEALTH};
use pathwise_events::{BroadcastEvent, Broadcaster, TopicFilter};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_publishers_reach_every_subscriber() {
    let bus = Arc::new(Broadcaster::new());
    let mut sub = bus.subscribe(TopicFilter::All).await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let bus = Arc::clone(&bus);
        handles.push(tokio::spawn(async move {
            bus.publish(BroadcastEvent::new(JOB_PROGRESS).with_payload(serde_json::json!({"batch": i})))
                .await
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), 1);
    }

    let mut seen = 0;
    while sub.try_recv().is_some() {
        seen += 1;
    }
    assert_eq!(seen, 8);
}

#[tokio::test]
async fn subscribe_during_publishing_is_safe() {
    let bus = Arc::new(Broadcaster::new());
    let publisher = {
        let bus = Arc::clone(&bus);
        tokio::spawn(async move {
            for _ in 0..50 {
                bus.publish(BroadcastEvent::new(SYSTEM_HEALTH)).await;
                tokio::task::yield_now().await;
            }
        })
    };

    let mut subs = Vec::new();
    for _ in 0..10 {
        subs.push(bus.subscribe(TopicFilter::topics(["system"])).await);
    }
    publisher.await.unwrap();

    assert_eq!(bus.subscriber_count().await, 10);
}
