use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use reqwest::Client;
use serde_json::json;
use tokio::sync::broadcast;
use tracing::{error, info, instrument, trace};

use crate::AlertRecord;
use crate::actors::messages::AlertEvent;
use crate::config::{Alert, MonitorConfig, Webhook};
use crate::discord::DiscordSink;

/// Line printed when the host has been unreachable for too long.
pub const UNAVAILABLE_MESSAGE: &str = "Unable to fetch server statistic";

/// Destination for alert records
///
/// Sinks are fire-and-forget: delivery failures are logged by the sink and never reported back
/// to the collector.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn emit(&self, record: &AlertRecord);

    async fn emit_unavailable(&self);
}

/// Prints alerts on stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

#[async_trait]
impl AlertSink for ConsoleSink {
    async fn emit(&self, record: &AlertRecord) {
        println!("{}", record.message);
    }

    async fn emit_unavailable(&self) {
        println!("{UNAVAILABLE_MESSAGE}");
    }
}

/// Posts alerts as JSON to a generic webhook
#[derive(Debug, Clone)]
pub struct WebhookSink {
    client: Client,
    webhook: Webhook,
    server: String,
}

impl WebhookSink {
    pub fn new(webhook: Webhook, server: impl ToString) -> Self {
        Self {
            client: Client::new(),
            webhook,
            server: server.to_string(),
        }
    }

    #[instrument(skip(self, payload))]
    async fn post(&self, payload: serde_json::Value) {
        match self.client.post(&self.webhook.url).json(&payload).send().await {
            Ok(response) => {
                if response.status().is_success() {
                    info!("Successfully sent webhook alert");
                } else {
                    error!("Webhook alert failed with status: {}", response.status());
                }
            }
            Err(e) => {
                error!("Failed to send webhook alert: {}", e);
            }
        }
    }
}

#[async_trait]
impl AlertSink for WebhookSink {
    async fn emit(&self, record: &AlertRecord) {
        self.post(json!({
            "message": record.message,
            "metric": record.metric,
            "value": record.observed_value,
            "server": self.server,
            "timestamp": Utc::now().to_rfc3339()
        }))
        .await;
    }

    async fn emit_unavailable(&self) {
        self.post(json!({
            "message": UNAVAILABLE_MESSAGE,
            "metric": "unavailable",
            "value": null,
            "server": self.server,
            "timestamp": Utc::now().to_rfc3339()
        }))
        .await;
    }
}

/// Publishes alerts on a broadcast channel
///
/// It is OK if nobody is subscribed, events are simply dropped then.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: broadcast::Sender<AlertEvent>,
    server: String,
}

impl ChannelSink {
    pub fn new(sender: broadcast::Sender<AlertEvent>, server: impl ToString) -> Self {
        Self {
            sender,
            server: server.to_string(),
        }
    }

    fn publish(&self, event: AlertEvent) {
        match self.sender.send(event) {
            Ok(num_receivers) => trace!("published alert event to {num_receivers} receivers"),
            Err(_) => trace!("no receivers for alert event"),
        }
    }
}

#[async_trait]
impl AlertSink for ChannelSink {
    async fn emit(&self, record: &AlertRecord) {
        self.publish(AlertEvent::Alert {
            server: self.server.clone(),
            record: record.clone(),
            timestamp: Utc::now(),
        });
    }

    async fn emit_unavailable(&self) {
        self.publish(AlertEvent::Unavailable {
            server: self.server.clone(),
            timestamp: Utc::now(),
        });
    }
}

/// Forwards to several sinks concurrently
#[derive(Clone, Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn AlertSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn AlertSink>>) -> Self {
        Self { sinks }
    }

    pub fn with(mut self, sink: impl AlertSink + 'static) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Console output plus every destination configured in `alerts`.
    pub fn from_config(config: &MonitorConfig) -> Self {
        let server = config.display_name();

        config
            .alerts
            .iter()
            .fold(FanoutSink::default().with(ConsoleSink), |sinks, alert| {
                match alert {
                    Alert::Discord(discord) => {
                        sinks.with(DiscordSink::new(discord.clone(), &server))
                    }
                    Alert::Webhook(webhook) => {
                        sinks.with(WebhookSink::new(webhook.clone(), &server))
                    }
                }
            })
    }
}

#[async_trait]
impl AlertSink for FanoutSink {
    async fn emit(&self, record: &AlertRecord) {
        join_all(self.sinks.iter().map(|sink| sink.emit(record))).await;
    }

    async fn emit_unavailable(&self) {
        join_all(self.sinks.iter().map(|sink| sink.emit_unavailable())).await;
    }
}
