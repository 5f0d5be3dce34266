use crate::domain::events::NotificationEvent;
use crate::domain::ports::Notifier;
use crate::error::{EscrowError, Result};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::info;

/// Publishes events as structured log records.
#[derive(Debug, Default, Clone)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn publish(&self, event: NotificationEvent) -> Result<()> {
        let payload = serde_json::to_string(&event)?;
        info!(
            event = event.name(),
            order_id = %event.order_id(),
            %payload,
            "notification"
        );
        Ok(())
    }
}

/// Forwards events to an in-process consumer over a tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<NotificationEvent>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<NotificationEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn publish(&self, event: NotificationEvent) -> Result<()> {
        self.sender
            .send(event)
            .map_err(|_| EscrowError::UpstreamUnavailable("notification channel closed".into()))
    }
}
