//! Review entity filed by a guest after a finished stay.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::rating::RatingScore;
use crate::domain::UserId;

/// Validation errors raised by review constructors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewValidationError {
    /// Reviews need non-empty text.
    #[error("review text must not be empty")]
    EmptyText,
}

/// Input payload for [`Review::new`].
#[derive(Debug, Clone)]
pub struct ReviewDraft {
    pub id: Uuid,
    pub author_id: UserId,
    pub listing_id: Uuid,
    pub text: String,
    pub rating: RatingScore,
    pub reviewed_on: NaiveDate,
}

/// A guest's review of a listing.
///
/// At most one review exists per (author, listing); the review date is
/// stamped at write time and never reconstructed from client input.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    id: Uuid,
    author_id: UserId,
    listing_id: Uuid,
    text: String,
    rating: RatingScore,
    reviewed_on: NaiveDate,
}

impl Review {
    /// Creates a validated review.
    pub fn new(draft: ReviewDraft) -> Result<Self, ReviewValidationError> {
        if draft.text.trim().is_empty() {
            return Err(ReviewValidationError::EmptyText);
        }
        Ok(Self {
            id: draft.id,
            author_id: draft.author_id,
            listing_id: draft.listing_id,
            text: draft.text,
            rating: draft.rating,
            reviewed_on: draft.reviewed_on,
        })
    }

    /// Returns the review id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the authoring guest.
    pub fn author_id(&self) -> &UserId {
        &self.author_id
    }

    /// Returns the reviewed listing id.
    pub fn listing_id(&self) -> Uuid {
        self.listing_id
    }

    /// Returns the review body.
    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    /// Returns the score given.
    pub fn rating(&self) -> RatingScore {
        self.rating
    }

    /// Returns the server-side filing date.
    pub fn reviewed_on(&self) -> NaiveDate {
        self.reviewed_on
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use uuid::Uuid;

    use super::{Review, ReviewDraft, ReviewValidationError};
    use crate::domain::rating::RatingScore;
    use crate::domain::UserId;

    #[rstest]
    fn review_rejects_blank_text() {
        let err = Review::new(ReviewDraft {
            id: Uuid::new_v4(),
            author_id: UserId::random(),
            listing_id: Uuid::new_v4(),
            text: "  ".to_owned(),
            rating: RatingScore::new(4).expect("valid score"),
            reviewed_on: "2025-06-05".parse().expect("valid ISO date"),
        })
        .expect_err("blank text rejected");
        assert_eq!(err, ReviewValidationError::EmptyText);
    }
}
