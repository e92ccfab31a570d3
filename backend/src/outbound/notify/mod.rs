//! Logging stand-in for the external notification pipeline.
//!
//! Real delivery (templated email through the mail worker) lives outside
//! this crate. This adapter satisfies the `Notifier` port by recording the
//! send, which keeps the fire-and-forget contract observable in development
//! and in environments without a broker.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{NotificationMessage, Notifier, NotifierError};

/// Notifier adapter that logs each message instead of delivering it.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl LogNotifier {
    /// Create a new logging notifier.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: NotificationMessage) -> Result<(), NotifierError> {
        match message {
            NotificationMessage::BookingCreated {
                guest_id,
                booking_id,
            } => {
                info!(%guest_id, %booking_id, "booking confirmation notification queued");
            }
            NotificationMessage::StayFinished {
                guest_id,
                booking_id,
            } => {
                info!(%guest_id, %booking_id, "stay finished notification queued");
            }
        }
        Ok(())
    }
}
