//! Integration test: the mock feed server driving a real feed client

mod common;

use common::{collect_events, price_updates, sample_snapshot};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokenfeed::domain::{PriceDirection, TokenCategory};
use tokenfeed::infrastructure::client::feed::{spawn_feed_client, FeedClientConfig, FeedEvent};
use tokenfeed::infrastructure::mock_feed::{MockFeedServer, PriceSimulator};
use tokenfeed::LiveTokenDashboard;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_mock_feed_updates_reach_dashboard() {
    let snapshot = sample_snapshot();
    let simulator = PriceSimulator::with_rng(&snapshot, StdRng::seed_from_u64(42));

    let server = MockFeedServer::bind("127.0.0.1:0".parse().unwrap())
        .await
        .unwrap();
    let url = format!("ws://{}", server.local_addr().unwrap());

    let server_flag = Arc::new(AtomicBool::new(true));
    let server_task = tokio::spawn(server.run(
        simulator,
        Duration::from_millis(50),
        server_flag.clone(),
    ));

    let client_flag = Arc::new(AtomicBool::new(true));
    let handle = spawn_feed_client(FeedClientConfig::new(url), client_flag.clone());

    let events = collect_events(&handle, Duration::from_secs(10), |e| price_updates(e) >= 6).await;
    verbose_println!("received {} events", events.len());
    assert!(price_updates(&events) >= 6);

    let mut dashboard = LiveTokenDashboard::default();
    dashboard.initialize(&snapshot, Some(TokenCategory::New));

    for event in &events {
        if let FeedEvent::PriceUpdate(update) = event {
            let before = dashboard.token(&update.token_id).unwrap().price;
            let view = dashboard.apply_price_update(update).unwrap();

            assert!(view.price > 0.0);
            assert_eq!(view.prev_price(), before);
            assert_ne!(view.price_direction(), PriceDirection::Neutral);
        }
    }
    assert_eq!(dashboard.stats().unknown_id, 0);
    assert_eq!(handle.status.dropped(), 0);

    client_flag.store(false, Ordering::Release);
    server_flag.store(false, Ordering::Release);
    let _ = tokio::time::timeout(Duration::from_secs(2), handle.task).await;
    let _ = tokio::time::timeout(Duration::from_secs(2), server_task).await;
}
