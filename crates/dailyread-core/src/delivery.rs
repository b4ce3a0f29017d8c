//! Outbound message seam.
//!
//! The engine never talks to a chat platform directly. Sweeps and the CLI
//! hand a rendered [`Message`] to a [`Messenger`]; `HttpMessenger` posts it
//! to a relay endpoint and `LogMessenger` only logs it.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use crate::engine::DailyCard;
use crate::error::{ConfigError, DeliveryError};
use crate::interaction::Interaction;
use crate::render;
use crate::storage::DeliveryConfig;

/// Inline button carrying an interaction payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub payload: String,
}

impl Button {
    pub fn new(label: impl Into<String>, interaction: Interaction) -> Self {
        Self {
            label: label.into(),
            payload: interaction.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub chat_id: i64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<Button>,
}

impl Message {
    /// Daily card with read/break buttons for the shown position and a preview button.
    pub fn daily_card(chat_id: i64, card: &DailyCard) -> Self {
        let pos = card.entry.position();
        Self {
            chat_id,
            text: render::daily_card(card),
            buttons: vec![
                Button::new("Read", Interaction::Read(pos)),
                Button::new("Break", Interaction::Break(pos)),
                Button::new("Next", Interaction::Next),
            ],
        }
    }

    pub fn nudge(chat_id: i64) -> Self {
        Self {
            chat_id,
            text: render::nudge().to_string(),
            buttons: Vec::new(),
        }
    }
}

/// Sends messages to users.
pub trait Messenger: Send + Sync {
    fn send(&self, message: &Message) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}

/// Posts each message as JSON to a relay endpoint.
pub struct HttpMessenger {
    client: Client,
    endpoint: Url,
}

impl HttpMessenger {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, DeliveryError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    /// Messenger for the configured endpoint, or `None` when no endpoint is set.
    pub fn from_config(config: &DeliveryConfig) -> Result<Option<Self>, ConfigError> {
        let Some(endpoint) = &config.endpoint else {
            return Ok(None);
        };
        let endpoint = Url::parse(endpoint).map_err(|e| ConfigError::InvalidValue {
            key: "delivery.endpoint".to_string(),
            message: e.to_string(),
        })?;
        let messenger = Self::new(endpoint, Duration::from_secs(config.timeout_secs)).map_err(|e| {
            ConfigError::InvalidValue {
                key: "delivery".to_string(),
                message: e.to_string(),
            }
        })?;
        Ok(Some(messenger))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl Messenger for HttpMessenger {
    async fn send(&self, message: &Message) -> Result<(), DeliveryError> {
        let resp = self
            .client
            .post(self.endpoint.clone())
            .json(message)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Dry-run messenger: logs every message and always succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMessenger;

impl Messenger for LogMessenger {
    async fn send(&self, message: &Message) -> Result<(), DeliveryError> {
        info!(chat_id = message.chat_id, buttons = message.buttons.len(), text = %message.text, "message (dry run)");
        Ok(())
    }
}
