//! Outbound notifications.
//!
//! Delivery is best-effort: a missing sink turns [`Notifier::notify`] into a
//! logged no-op, and failed deliveries are logged and dropped.

pub mod channels;
pub mod events;
pub mod service;

pub use channels::{NotificationChannel, WebhookChannel, WebhookConfig};
pub use events::{NotificationEvent, ProductLink};
pub use service::Notifier;
