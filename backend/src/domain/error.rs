//! Domain-level error type and failure taxonomy.
//!
//! Every operation in the reservation core returns one of these typed
//! failures. They are transport agnostic: inbound adapters map them onto
//! HTTP statuses or any other protocol envelope. Only [`ErrorCode::Transient`]
//! is safe for the caller to retry; every other code is terminal for the
//! given input and must reach the end user unchanged.

use serde::{Deserialize, Serialize};

/// Stable machine-readable code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request payload is malformed or fails field validation.
    InvalidRequest,
    /// The stay range is inverted or starts in the past.
    InvalidRange,
    /// An existing booking overlaps the requested stay.
    Conflict,
    /// The referenced booking or listing is absent, or not owned by the
    /// caller.
    NotFound,
    /// The caller lacks rights over the resource.
    Forbidden,
    /// Checkout confirmation attempted before the checkout date.
    NotYetDue,
    /// The caller has already reviewed this listing.
    AlreadyReviewed,
    /// No finished booking entitles the caller to review this listing.
    NoEligibleBooking,
    /// The durable store is unavailable or a lock timed out; safe to retry.
    Transient,
    /// An unexpected failure inside the domain or an adapter.
    Internal,
}

/// Typed failure returned by the reservation core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    code: ErrorCode,
    message: String,
}

impl Error {
    /// Create an error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message for adapters and logs.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Whether the caller may retry the operation unchanged.
    pub fn is_retryable(&self) -> bool {
        self.code == ErrorCode::Transient
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::InvalidRange`].
    pub fn invalid_range(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRange, message)
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorCode::NotYetDue`].
    pub fn not_yet_due(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotYetDue, message)
    }

    /// Convenience constructor for [`ErrorCode::AlreadyReviewed`].
    pub fn already_reviewed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AlreadyReviewed, message)
    }

    /// Convenience constructor for [`ErrorCode::NoEligibleBooking`].
    pub fn no_eligible_booking(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NoEligibleBooking, message)
    }

    /// Convenience constructor for [`ErrorCode::Transient`].
    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Transient, message)
    }

    /// Convenience constructor for [`ErrorCode::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}
