//! Failure tests for the poll loop
//!
//! - Unreachable host and non-2xx replies
//! - Malformed payloads
//! - Unavailable signal debouncing and recovery

use std::time::Duration;

use assert_matches::assert_matches;
use stats_monitor::{
    actors::messages::{AlertEvent, CycleOutcome},
    config::MonitorConfig,
    monitors::snapshot::FormatError,
    transport::TransportError,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

fn unavailable_count(events: &[AlertEvent]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, AlertEvent::Unavailable { .. }))
        .count()
}

#[tokio::test]
async fn test_unreachable_host_counts_failures() {
    let config = MonitorConfig {
        url: "http://127.0.0.1:9/_stats".to_string(),
        interval: 3600,
        timeout: 1,
        ..Default::default()
    };
    let (handle, mut alert_rx) = spawn_collector(&config);

    for expected in 1..=2 {
        let outcome = handle.poll_now().await.unwrap();
        assert_matches!(
            outcome,
            CycleOutcome::TransportFailed { consecutive_failures, unavailable_signalled: false, .. }
                if consecutive_failures == expected
        );
    }

    let outcome = handle.poll_now().await.unwrap();
    assert_matches!(
        outcome,
        CycleOutcome::TransportFailed {
            consecutive_failures: 3,
            unavailable_signalled: true,
            ..
        }
    );
    assert_eq!(unavailable_count(&drain(&mut alert_rx).await), 1);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_server_error_is_a_transport_failure() {
    let mock_server = MockServer::start().await;
    mount_status(&mock_server, 500).await;

    let (handle, _alert_rx) = spawn_collector(&create_test_config(&mock_server));

    let outcome = handle.poll_now().await.unwrap();
    assert_matches!(
        outcome,
        CycleOutcome::TransportFailed {
            error: TransportError::Status(500),
            consecutive_failures: 1,
            ..
        }
    );

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_slow_host_times_out() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STATS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("1,1,1,1,1,1,1")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let (handle, _alert_rx) = spawn_collector(&create_test_config(&mock_server));

    let outcome = handle.poll_now().await.unwrap();
    assert_matches!(
        outcome,
        CycleOutcome::TransportFailed {
            error: TransportError::Timeout,
            ..
        }
    );

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_malformed_payloads_are_decode_failures() {
    let cases = [
        ("1,2,3,4,5,6", "field-count"),
        ("1,2,3,4,5,6,7,8", "field-count"),
        ("1,2,three,4,5,6,7", "not-a-number"),
        ("-1,100,50,100,50,100,50", "negative-value"),
    ];

    for (body, kind) in cases {
        let mock_server = MockServer::start().await;
        mount_snapshot(&mock_server, body).await;
        let (handle, mut alert_rx) = spawn_collector(&create_test_config(&mock_server));

        let outcome = handle.poll_now().await.unwrap();
        assert_matches!(outcome, CycleOutcome::DecodeFailed(ref e) if e.kind() == kind, "body {body:?}");
        assert_eq!(handle.state().await.unwrap().consecutive_failures(), 0);
        assert!(drain(&mut alert_rx).await.is_empty());

        handle.shutdown().await.unwrap();
    }
}

#[tokio::test]
async fn test_decode_failure_after_outage_resets_counter() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STATS_PATH))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;
    mount_snapshot(&mock_server, "not,a,snapshot").await;

    let (handle, _alert_rx) = spawn_collector(&create_test_config(&mock_server));

    handle.poll_now().await.unwrap();
    handle.poll_now().await.unwrap();
    assert_eq!(handle.state().await.unwrap().consecutive_failures(), 2);

    let outcome = handle.poll_now().await.unwrap();
    assert_matches!(
        outcome,
        CycleOutcome::DecodeFailed(FormatError::FieldCount { found: 3, .. })
    );
    assert_eq!(handle.state().await.unwrap().consecutive_failures(), 0);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_unavailable_resignalled_only_after_new_crossing() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STATS_PATH))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(4)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(STATS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("1,1,0,1,0,1,0"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    mount_status(&mock_server, 503).await;

    let (handle, mut alert_rx) = spawn_collector(&create_test_config(&mock_server));

    // 4 failures: one signal at the third
    for _ in 0..4 {
        handle.poll_now().await.unwrap();
    }
    assert_eq!(unavailable_count(&drain(&mut alert_rx).await), 1);

    // success resets the counter
    let outcome = handle.poll_now().await.unwrap();
    assert_matches!(outcome, CycleOutcome::Evaluated { .. });
    assert_eq!(handle.state().await.unwrap().consecutive_failures(), 0);

    // two failures are not enough to signal again
    handle.poll_now().await.unwrap();
    handle.poll_now().await.unwrap();
    assert_eq!(unavailable_count(&drain(&mut alert_rx).await), 0);

    // the third one is
    handle.poll_now().await.unwrap();
    assert_eq!(unavailable_count(&drain(&mut alert_rx).await), 1);

    handle.shutdown().await.unwrap();
}
