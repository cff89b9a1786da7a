//! End-to-end tests: HTTP snapshot → decode → evaluate → alert sink

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use stats_monitor::{
    Resource,
    actors::messages::{AlertEvent, CycleOutcome},
};
use wiremock::MockServer;

use crate::helpers::*;

#[tokio::test]
async fn test_healthy_host_produces_no_alerts() {
    let mock_server = MockServer::start().await;
    mount_snapshot(&mock_server, "10,1000,100,1000,100,1000,100").await;

    let (handle, mut alert_rx) = spawn_collector(&create_test_config(&mock_server));

    let outcome = handle.poll_now().await.unwrap();

    assert_eq!(outcome, CycleOutcome::Evaluated { alerts: vec![] });
    assert!(drain(&mut alert_rx).await.is_empty());

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_overloaded_host_alerts_in_fixed_order() {
    let mock_server = MockServer::start().await;
    mount_snapshot(&mock_server, "35,1000,900,1000,950,1000,950\n").await;

    let (handle, mut alert_rx) = spawn_collector(&create_test_config(&mock_server));

    handle.poll_now().await.unwrap();
    let events = drain(&mut alert_rx).await;

    let messages: Vec<_> = events
        .iter()
        .map(|event| match event {
            AlertEvent::Alert { server, record, .. } => {
                assert_eq!(server, "test-host");
                (record.metric, record.message.clone())
            }
            AlertEvent::Unavailable { .. } => panic!("unexpected unavailable signal"),
        })
        .collect();

    assert_eq!(
        messages,
        vec![
            (
                Resource::LoadAverage,
                "Load Average is too high: 35".to_string()
            ),
            (Resource::Memory, "Memory usage too high: 90%".to_string()),
            (
                Resource::Disk,
                "Free disk space is too low: 0 Mb left".to_string()
            ),
            (
                Resource::Network,
                "Network bandwidth usage high: 0 Mbit/s available".to_string()
            ),
        ]
    );

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_realistic_host_figures() {
    let mock_server = MockServer::start().await;
    // 16 GiB RAM at 85%, 500 GiB disk with 20 GiB free, 1 Gbit/s link fully idle
    mount_snapshot(
        &mock_server,
        "2.5,17179869184,14602888806,536870912000,515396075520,125000000,0",
    )
    .await;

    let (handle, _alert_rx) = spawn_collector(&create_test_config(&mock_server));

    let outcome = handle.poll_now().await.unwrap();

    assert_matches!(outcome, CycleOutcome::Evaluated { alerts } => {
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].metric, Resource::Memory);
        assert_eq!(alerts[0].message, "Memory usage too high: 85%");
        assert_eq!(alerts[1].metric, Resource::Disk);
        assert_eq!(alerts[1].message, "Free disk space is too low: 20480 Mb left");
    });

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_space_delimited_host() {
    let mock_server = MockServer::start().await;
    mount_snapshot(&mock_server, "31 1000 100 1000 100 1000 100").await;

    let mut config = create_test_config(&mock_server);
    config.delimiter = ' ';
    let (handle, _alert_rx) = spawn_collector(&config);

    let outcome = handle.poll_now().await.unwrap();

    assert_matches!(outcome, CycleOutcome::Evaluated { alerts } if alerts.len() == 1);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_each_cycle_is_evaluated_independently() {
    let mock_server = MockServer::start().await;
    mount_snapshot(&mock_server, "31,0,0,0,0,0,0").await;

    let (handle, mut alert_rx) = spawn_collector(&create_test_config(&mock_server));

    for _ in 0..3 {
        handle.poll_now().await.unwrap();
    }

    // no suppression across cycles
    assert_eq!(drain(&mut alert_rx).await.len(), 3);

    handle.shutdown().await.unwrap();
}
