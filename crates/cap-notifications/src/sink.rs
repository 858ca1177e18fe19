//! Notification sinks

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::notification::Notification;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Where notifications go
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, notification: Notification) -> Result<(), SinkError>;
}

/// Hand a notification to the sink, swallowing failures.
///
/// Notification delivery never blocks or fails a core operation; a failed
/// delivery is logged at warn and dropped.
pub async fn deliver_best_effort(sink: &dyn NotificationSink, notification: Notification) {
    let recipient = notification.recipient;
    let kind = notification.kind;
    if let Err(err) = sink.deliver(notification).await {
        tracing::warn!(recipient, ?kind, error = %err, "notification delivery failed");
    }
}

/// Sink that logs deliveries; the default when no delivery service is wired.
#[derive(Default)]
pub struct TracingSink;

#[async_trait]
impl NotificationSink for TracingSink {
    async fn deliver(&self, notification: Notification) -> Result<(), SinkError> {
        tracing::info!(
            recipient = notification.recipient,
            kind = ?notification.kind,
            message = %notification.message,
            "notification"
        );
        Ok(())
    }
}

/// In-memory sink for tests
#[derive(Default)]
pub struct MemorySink {
    delivered: RwLock<Vec<Notification>>,
    fail: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose deliveries always fail, for exercising the
    /// fire-and-forget path.
    pub fn failing() -> Self {
        Self {
            delivered: RwLock::new(Vec::new()),
            fail: true,
        }
    }

    pub async fn delivered(&self) -> Vec<Notification> {
        self.delivered.read().await.clone()
    }
}

#[async_trait]
impl NotificationSink for MemorySink {
    async fn deliver(&self, mut notification: Notification) -> Result<(), SinkError> {
        if self.fail {
            return Err(SinkError::Delivery("sink unavailable".into()));
        }
        notification.created_at = Some(Utc::now());
        self.delivered.write().await.push(notification);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::NotificationKind;

    #[tokio::test]
    async fn test_memory_sink_records() {
        let sink = MemorySink::new();
        deliver_best_effort(
            &sink,
            Notification::new(7, NotificationKind::TeamInviteReceived, "you are invited"),
        )
        .await;

        let delivered = sink.delivered().await;
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].recipient, 7);
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let sink = MemorySink::failing();
        // Must not panic or propagate.
        deliver_best_effort(
            &sink,
            Notification::new(7, NotificationKind::ProposalSubmitted, "submitted"),
        )
        .await;
        assert!(sink.delivered().await.is_empty());
    }
}
