use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::alerts::{AlertSink, UNAVAILABLE_MESSAGE};
use crate::config::Discord;
use crate::{AlertRecord, Resource};

const RED: u32 = 15158332;
const GREY: u32 = 9807270;

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

#[derive(Debug, Default)]
pub struct MessageBuilder {
    content: Option<String>,
    embeds: Vec<Embed>,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: impl ToString) -> Self {
        self.content = Some(content.to_string());
        self
    }

    pub fn add_embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    pub fn build(self) -> Message {
        Message {
            content: self.content,
            embeds: self.embeds,
        }
    }
}

/// Sends alerts to a Discord webhook
#[derive(Debug, Clone)]
pub struct DiscordSink {
    client: Client,
    discord: Discord,
    server: String,
}

impl DiscordSink {
    pub fn new(discord: Discord, server: impl ToString) -> Self {
        Self {
            client: Client::new(),
            discord,
            server: server.to_string(),
        }
    }

    pub fn build_alert_embed(&self, record: &AlertRecord) -> Embed {
        let (title, field_name, value) = match record.metric {
            Resource::LoadAverage => (
                "🔥 Load Average Alert",
                "⚙️ Load Average",
                format!("{:.2}", record.observed_value),
            ),
            Resource::Memory => (
                "🧠 Memory Alert",
                "🧠 Memory Usage",
                format!("{:.1}%", record.observed_value),
            ),
            Resource::Disk => (
                "💾 Disk Space Alert",
                "💾 Free Disk Space",
                format!("{:.0} Mb", record.observed_value),
            ),
            Resource::Network => (
                "🌐 Network Alert",
                "🌐 Available Bandwidth",
                format!("{:.0} Mbit/s", record.observed_value),
            ),
        };

        Embed {
            title: Some(title.to_string()),
            description: Some(format!("**{}**: {}", self.server, record.message)),
            color: Some(RED),
            fields: vec![EmbedField {
                name: field_name.to_string(),
                value,
                inline: true,
            }],
            footer: Some(self.footer()),
            timestamp: Some(Utc::now().to_rfc3339()),
        }
    }

    pub fn build_unavailable_embed(&self) -> Embed {
        Embed {
            title: Some("🔴 Statistics Unavailable".to_string()),
            description: Some(format!("**{}**: {UNAVAILABLE_MESSAGE}", self.server)),
            color: Some(GREY),
            fields: vec![],
            footer: Some(self.footer()),
            timestamp: Some(Utc::now().to_rfc3339()),
        }
    }

    fn footer(&self) -> EmbedFooter {
        EmbedFooter {
            text: format!("Server: {}", self.server),
        }
    }

    fn message(&self, embed: Embed) -> Message {
        let mut message_builder = MessageBuilder::new().add_embed(embed);
        if let Some(user_id) = &self.discord.user_id {
            message_builder = message_builder.content(format!("({}) <@{user_id}>", self.server));
        }
        message_builder.build()
    }

    #[instrument(skip(self, message))]
    pub async fn send_message(&self, message: &Message) {
        match self.client.post(&self.discord.url).json(message).send().await {
            Ok(response) => {
                if response.status().is_success() {
                    info!("Successfully sent Discord message");
                } else {
                    error!("Discord message failed with status: {}", response.status());
                    if let Ok(error_text) = response.text().await {
                        error!("Discord API error response: {}", error_text);
                    }
                }
            }
            Err(e) => {
                error!("Failed to send Discord message: {}", e);
            }
        }
    }
}

#[async_trait]
impl AlertSink for DiscordSink {
    async fn emit(&self, record: &AlertRecord) {
        let message = self.message(self.build_alert_embed(record));
        self.send_message(&message).await;
    }

    async fn emit_unavailable(&self) {
        let message = self.message(self.build_unavailable_embed());
        self.send_message(&message).await;
    }
}
