//! Best-effort notification dispatch.

use std::sync::Arc;

use tracing::{info, warn};

use super::channels::NotificationChannel;
use super::events::NotificationEvent;

/// Sends events to the configured channel, if any.
///
/// Never fails: a missing channel is a logged no-op and delivery errors are
/// logged and swallowed so they cannot affect the cycle that raised them.
#[derive(Clone, Default)]
pub struct Notifier {
    channel: Option<Arc<dyn NotificationChannel>>,
}

impl Notifier {
    pub fn new(channel: Arc<dyn NotificationChannel>) -> Self {
        Self {
            channel: Some(channel),
        }
    }

    /// A notifier without a sink.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub async fn notify(&self, event: &NotificationEvent) {
        let Some(channel) = self.channel.as_ref().filter(|c| c.is_enabled()) else {
            info!(
                event_type = event.event_type(),
                "No notification sink configured; message not sent:\n{}",
                event.message()
            );
            return;
        };

        if let Err(e) = channel.send(event).await {
            warn!(
                channel = channel.channel_type(),
                event_type = event.event_type(),
                error = %e,
                "Failed to deliver notification"
            );
        }
    }
}
