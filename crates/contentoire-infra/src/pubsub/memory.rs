//! In-process pub/sub on tokio broadcast channels.
//!
//! Used when Redis is not configured. Delivery is limited to this process.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{RwLock, broadcast};

use contentoire_core::ports::{MessageHandler, PubSub, PubSubError, PubSubMessage, Subscription};

#[cfg(test)]
use contentoire_core::ports::message_handler;

pub struct InMemoryPubSub {
    channels: Arc<RwLock<HashMap<String, broadcast::Sender<String>>>>,
    buffer_size: usize,
}

impl InMemoryPubSub {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            buffer_size,
        }
    }

    /// Number of live receivers on a channel.
    pub async fn subscriber_count(&self, channel: &str) -> usize {
        self.channels
            .read()
            .await
            .get(channel)
            .map_or(0, |sender| sender.receiver_count())
    }
}

impl Default for InMemoryPubSub {
    fn default() -> Self {
        Self::new(100)
    }
}

#[async_trait]
impl PubSub for InMemoryPubSub {
    async fn publish(&self, channel: &str, message: &str) -> Result<(), PubSubError> {
        let channels = self.channels.read().await;

        match channels.get(channel) {
            Some(sender) => {
                // Err only means nobody is listening right now.
                let delivered = sender.send(message.to_string()).unwrap_or(0);
                tracing::debug!(channel = %channel, delivered, "Message published");
            }
            None => tracing::debug!(channel = %channel, "No subscribers for channel"),
        }

        Ok(())
    }

    async fn subscribe(
        &self,
        channel: &str,
        handler: MessageHandler,
    ) -> Result<Subscription, PubSubError> {
        let mut receiver = {
            let mut channels = self.channels.write().await;
            channels
                .entry(channel.to_string())
                .or_insert_with(|| broadcast::channel(self.buffer_size).0)
                .subscribe()
        };

        let channel_name = channel.to_string();
        let task = tokio::spawn(async move {
            tracing::debug!(channel = %channel_name, "Subscribed to channel");

            loop {
                match receiver.recv().await {
                    Ok(payload) => {
                        handler(PubSubMessage {
                            channel: channel_name.clone(),
                            payload,
                        })
                        .await;
                    }
                    Err(broadcast::error::RecvError::Lagged(count)) => {
                        tracing::warn!(
                            channel = %channel_name,
                            lagged = count,
                            "Subscriber lagged behind"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::debug!(channel = %channel_name, "Channel closed");
                        break;
                    }
                }
            }
        });

        let abort = task.abort_handle();
        Ok(Subscription::new(channel, move || abort.abort()))
    }

    async fn unsubscribe(&self, channel: &str) -> Result<(), PubSubError> {
        // Dropping the sender closes every receiver, which ends their tasks.
        self.channels.write().await.remove(channel);
        tracing::debug!(channel = %channel, "Unsubscribed from channel");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn forward_to(tx: mpsc::UnboundedSender<String>) -> MessageHandler {
        message_handler(move |msg| {
            let _ = tx.send(msg.payload);
            async {}
        })
    }

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let pubsub = InMemoryPubSub::default();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _sub = pubsub.subscribe("posts", forward_to(tx)).await.unwrap();

        pubsub.publish("posts", "hello").await.unwrap();

        let received = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        assert_eq!(received.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let pubsub = InMemoryPubSub::default();
        assert!(pubsub.publish("nobody", "x").await.is_ok());
    }

    #[tokio::test]
    async fn test_dropped_subscription_stops_delivery() {
        let pubsub = InMemoryPubSub::default();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sub = pubsub.subscribe("posts", forward_to(tx)).await.unwrap();
        assert_eq!(pubsub.subscriber_count("posts").await, 1);

        drop(sub);
        // Let the aborted task unwind and release its receiver.
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(pubsub.subscriber_count("posts").await, 0);
        pubsub.publish("posts", "late").await.unwrap();
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_unsubscribe_closes_channel() {
        let pubsub = InMemoryPubSub::default();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _sub = pubsub.subscribe("posts", forward_to(tx)).await.unwrap();

        pubsub.unsubscribe("posts").await.unwrap();

        let closed = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        assert!(closed.is_none());
    }
}
