//! Critical error alerting layer for tracing.
//!
//! Events at or above the configured level are copied to an alert sender
//! (console in development, a chat webhook in production).

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{Layer, layer::Context};

/// Alert message containing error details.
#[derive(Debug, Clone)]
pub struct AlertMessage {
    pub level: String,
    pub message: String,
    pub target: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub fields: Vec<(String, String)>,
}

impl AlertMessage {
    fn summary(&self) -> String {
        let mut text = format!(
            "[{}] {}\nTarget: {}\nTime: {}",
            self.level,
            self.message,
            self.target,
            self.timestamp.to_rfc3339()
        );
        for (name, value) in &self.fields {
            text.push_str(&format!("\n{name}: {value}"));
        }
        text
    }
}

/// Configuration for the alert layer.
#[derive(Debug, Clone)]
pub struct AlertConfig {
    /// Least severe level that raises an alert (default: ERROR).
    pub min_level: Level,
    /// Alerts queued beyond this are dropped.
    pub buffer_size: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            min_level: Level::ERROR,
            buffer_size: 100,
        }
    }
}

/// Alert delivery backend.
#[async_trait::async_trait]
pub trait AlertSender: Send + Sync {
    async fn send(&self, alert: AlertMessage) -> Result<(), AlertError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("Failed to send alert: {0}")]
    SendError(String),
}

/// Writes alerts to stderr.
pub struct ConsoleAlertSender;

#[async_trait::async_trait]
impl AlertSender for ConsoleAlertSender {
    async fn send(&self, alert: AlertMessage) -> Result<(), AlertError> {
        eprintln!("\nALERT {}\n", alert.summary());
        Ok(())
    }
}

/// Posts alerts to a Slack-compatible webhook.
pub struct WebhookAlertSender {
    url: String,
    client: reqwest::Client,
}

impl WebhookAlertSender {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl AlertSender for WebhookAlertSender {
    async fn send(&self, alert: AlertMessage) -> Result<(), AlertError> {
        let payload = serde_json::json!({ "text": alert.summary() });

        self.client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AlertError::SendError(e.to_string()))?;

        Ok(())
    }
}

/// Tracing layer that forwards severe events to an [`AlertSender`].
pub struct AlertLayer {
    min_level: Level,
    sender: mpsc::Sender<AlertMessage>,
}

impl AlertLayer {
    /// Spawns the delivery task, so this must run inside a Tokio runtime.
    pub fn new(config: AlertConfig, alert_sender: Arc<dyn AlertSender>) -> Self {
        let (tx, mut rx) = mpsc::channel::<AlertMessage>(config.buffer_size.max(1));

        tokio::spawn(async move {
            while let Some(alert) = rx.recv().await {
                // Logging here would feed back into this layer.
                if let Err(e) = alert_sender.send(alert).await {
                    eprintln!("{e}");
                }
            }
        });

        Self {
            min_level: config.min_level,
            sender: tx,
        }
    }

    pub fn console(config: AlertConfig) -> Self {
        Self::new(config, Arc::new(ConsoleAlertSender))
    }

    pub fn webhook(config: AlertConfig, url: String) -> Self {
        Self::new(config, Arc::new(WebhookAlertSender::new(url)))
    }
}

struct FieldVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl FieldVisitor {
    fn new() -> Self {
        Self {
            message: String::new(),
            fields: Vec::new(),
        }
    }
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields
                .push((field.name().to_string(), format!("{:?}", value)));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields
                .push((field.name().to_string(), value.to_string()));
        }
    }
}

impl<S> Layer<S> for AlertLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        // ERROR < WARN < INFO in tracing's ordering.
        if *event.metadata().level() > self.min_level {
            return;
        }

        let mut visitor = FieldVisitor::new();
        event.record(&mut visitor);

        let alert = AlertMessage {
            level: event.metadata().level().to_string(),
            message: visitor.message,
            target: event.metadata().target().to_string(),
            timestamp: chrono::Utc::now(),
            fields: visitor.fields,
        };

        let _ = self.sender.try_send(alert);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tracing_subscriber::layer::SubscriberExt;

    struct Captured(mpsc::UnboundedSender<AlertMessage>);

    #[async_trait::async_trait]
    impl AlertSender for Captured {
        async fn send(&self, alert: AlertMessage) -> Result<(), AlertError> {
            let _ = self.0.send(alert);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_only_events_at_min_level_alert() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let layer = AlertLayer::new(AlertConfig::default(), Arc::new(Captured(tx)));
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("just a warning");
            tracing::error!(post_id = 7, "Publish sweep failed");
        });

        let alert = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(alert.level, "ERROR");
        assert_eq!(alert.message, "Publish sweep failed");
        assert!(alert.fields.iter().any(|(k, v)| k == "post_id" && v == "7"));
        assert!(alert.summary().contains("post_id: 7"));

        // The delivery task exits once the layer is gone, closing the channel.
        let mut rest = Vec::new();
        while let Ok(Some(alert)) = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await {
            rest.push(alert);
        }
        assert!(rest.iter().all(|a| a.level != "WARN"));
        assert!(rest.is_empty());
    }
}
