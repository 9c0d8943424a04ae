//! Redis pub/sub, fanning post changes out across server instances.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tokio::sync::RwLock;
use tokio::task::AbortHandle;

use contentoire_core::ports::{MessageHandler, PubSub, PubSubError, PubSubMessage, Subscription};

use crate::cache::RedisConfig;

pub struct RedisPubSub {
    conn: ConnectionManager,
    client: Client,
    prefix: String,
    listeners: Arc<RwLock<HashMap<String, Vec<AbortHandle>>>>,
}

impl RedisPubSub {
    pub async fn new(config: RedisConfig) -> Result<Self, PubSubError> {
        let (client, conn) = config.connect().await.map_err(PubSubError::Connection)?;
        tracing::info!(url = %config.url, "Connected to Redis PubSub");

        Ok(Self {
            conn,
            client,
            prefix: config.key_prefix,
            listeners: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    fn channel_key(&self, channel: &str) -> String {
        format!("{}{}", self.prefix, channel)
    }
}

#[async_trait]
impl PubSub for RedisPubSub {
    async fn publish(&self, channel: &str, message: &str) -> Result<(), PubSubError> {
        let mut conn = self.conn.clone();
        conn.publish::<_, _, ()>(self.channel_key(channel), message)
            .await
            .map_err(|e| PubSubError::PublishError(e.to_string()))
    }

    async fn subscribe(
        &self,
        channel: &str,
        handler: MessageHandler,
    ) -> Result<Subscription, PubSubError> {
        // Subscribe before returning so no message published afterwards is missed.
        let mut pubsub = self
            .client
            .get_async_pubsub()
            .await
            .map_err(|e| PubSubError::Connection(e.to_string()))?;
        pubsub
            .subscribe(self.channel_key(channel))
            .await
            .map_err(|e| PubSubError::SubscribeError(e.to_string()))?;

        let channel_name = channel.to_string();
        let task = tokio::spawn(async move {
            tracing::debug!(channel = %channel_name, "Subscribed to Redis channel");

            let mut stream = pubsub.on_message();
            while let Some(msg) = stream.next().await {
                let payload: String = match msg.get_payload() {
                    Ok(p) => p,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to read message payload");
                        continue;
                    }
                };
                handler(PubSubMessage {
                    channel: channel_name.clone(),
                    payload,
                })
                .await;
            }

            tracing::info!(channel = %channel_name, "PubSub connection closed");
        });

        let abort = task.abort_handle();
        {
            let mut listeners = self.listeners.write().await;
            let handles = listeners.entry(channel.to_string()).or_default();
            handles.retain(|h| !h.is_finished());
            handles.push(abort.clone());
        }

        Ok(Subscription::new(channel, move || abort.abort()))
    }

    async fn unsubscribe(&self, channel: &str) -> Result<(), PubSubError> {
        if let Some(handles) = self.listeners.write().await.remove(channel) {
            for handle in handles {
                handle.abort();
            }
            tracing::debug!(channel = %channel, "Unsubscribed from Redis channel");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contentoire_core::ports::message_handler;
    use std::time::Duration;
    use tokio::sync::mpsc;

    async fn test_pubsub() -> Option<RedisPubSub> {
        let config = RedisConfig {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6389".to_string()),
            connect_timeout: Duration::from_secs(1),
            fallback_to_memory: false,
            key_prefix: "contentoire-test:".to_string(),
        };
        RedisPubSub::new(config).await.ok()
    }

    #[tokio::test]
    async fn test_redis_pubsub_round_trip() {
        let Some(pubsub) = test_pubsub().await else {
            return;
        };

        let (tx, mut rx) = mpsc::channel(1);
        let sub = pubsub
            .subscribe(
                "posts",
                message_handler(move |msg| {
                    let tx = tx.clone();
                    async move {
                        let _ = tx.send(msg.payload).await;
                    }
                }),
            )
            .await
            .unwrap();

        pubsub.publish("posts", "changed").await.unwrap();

        let received = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap();
        assert_eq!(received.as_deref(), Some("changed"));

        sub.cancel();
    }
}
