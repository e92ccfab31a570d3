//! Driving port for filing reviews.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Error, Review, UserId};

/// Serializable review representation returned to the transport layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPayload {
    pub id: Uuid,
    pub author_id: UserId,
    pub listing_id: Uuid,
    pub rating: i32,
    pub text: String,
    pub reviewed_on: NaiveDate,
}

impl From<Review> for ReviewPayload {
    fn from(value: Review) -> Self {
        Self {
            id: value.id(),
            author_id: *value.author_id(),
            listing_id: value.listing_id(),
            rating: value.rating().value(),
            text: value.text().to_owned(),
            reviewed_on: value.reviewed_on(),
        }
    }
}

/// Request to file a review for a finished stay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReviewRequest {
    pub author_id: UserId,
    pub listing_id: Uuid,
    pub rating: i32,
    pub text: String,
}

/// Response from filing a review, including the listing's new displayed
/// rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReviewResponse {
    pub review: ReviewPayload,
    pub listing_rating: f64,
}

/// Driving port for review write operations.
#[async_trait]
pub trait ReviewCommand: Send + Sync {
    /// File a review.
    ///
    /// Preconditions, checked in order: a `Finished` booking by the author
    /// for the listing (`NoEligibleBooking`), then no prior review by the
    /// author for the listing (`AlreadyReviewed`). The review insert, the
    /// rating increment and the booking's `Finished → Reviewed` transition
    /// commit as one atomic unit.
    async fn file_review(&self, request: FileReviewRequest) -> Result<FileReviewResponse, Error>;
}
