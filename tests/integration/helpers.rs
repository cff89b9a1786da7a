//! Helper functions for integration tests

use std::sync::Arc;
use std::time::Duration;

use stats_monitor::{
    actors::{
        collector::{CollectorHandle, StatsCollector},
        messages::AlertEvent,
    },
    alerts::ChannelSink,
    config::MonitorConfig,
    transport::HttpTransport,
};
use tokio::sync::broadcast;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const STATS_PATH: &str = "/_stats";

pub fn create_test_config(server: &MockServer) -> MonitorConfig {
    MonitorConfig {
        url: format!("{}{STATS_PATH}", server.uri()),
        display: Some("test-host".to_string()),
        // long enough that only poll_now drives the loop
        interval: 3600,
        timeout: 1,
        ..Default::default()
    }
}

/// Spawn a collector against `config` publishing its alerts on a broadcast channel.
pub fn spawn_collector(
    config: &MonitorConfig,
) -> (CollectorHandle, broadcast::Receiver<AlertEvent>) {
    let (alert_tx, alert_rx) = broadcast::channel(64);
    let sink = ChannelSink::new(alert_tx, config.display_name());

    let collector = StatsCollector::new(
        config,
        Arc::new(HttpTransport::default()),
        Arc::new(sink),
    );

    (CollectorHandle::spawn(collector), alert_rx)
}

pub async fn mount_snapshot(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path(STATS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

pub async fn mount_status(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path(STATS_PATH))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Drain every event already published on the channel.
pub async fn drain(alert_rx: &mut broadcast::Receiver<AlertEvent>) -> Vec<AlertEvent> {
    let mut events = vec![];
    while let Ok(Ok(event)) =
        tokio::time::timeout(Duration::from_millis(50), alert_rx.recv()).await
    {
        events.push(event);
    }
    events
}
