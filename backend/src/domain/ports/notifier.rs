//! Port for the external notification pipeline.
//!
//! Sends are fire-and-forget with at-most-once delivery. The core logs a
//! failed dispatch and moves on; it never retries and never propagates the
//! failure to the caller of the surrounding mutation.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::UserId;

use super::define_port_error;

/// Messages the reservation core emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationMessage {
    /// A stay was admitted and recorded.
    BookingCreated { guest_id: UserId, booking_id: Uuid },
    /// The listing owner confirmed the guest checked out.
    StayFinished { guest_id: UserId, booking_id: Uuid },
}

define_port_error! {
    /// Errors surfaced by notifier adapters.
    pub enum NotifierError {
        /// The message could not be handed to the delivery pipeline.
        Dispatch { message: String } => "notification dispatch failed: {message}",
    }
}

/// Port for handing messages to the asynchronous delivery pipeline.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Hand a message to the pipeline, best effort.
    async fn send(&self, message: NotificationMessage) -> Result<(), NotifierError>;
}

/// Fixture implementation for tests that do not assert on notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotifier;

#[async_trait]
impl Notifier for FixtureNotifier {
    async fn send(&self, _message: NotificationMessage) -> Result<(), NotifierError> {
        Ok(())
    }
}
