//! Domain entities, services and ports for the reservation core.
//!
//! Purpose: own the booking lifecycle, the review/rating aggregate and the
//! cache coherence discipline as transport-agnostic services. Entities are
//! immutable once constructed; every invariant is enforced in a validating
//! constructor and documented on the type.
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`] — typed failure taxonomy returned by services.
//! - [`Booking`], [`Listing`], [`Review`] — validated aggregates.
//! - [`AvailabilityChecker`] — stay admission control.
//! - [`BookingLedgerService`] — booking commands and cached booking reads.
//! - [`ReviewRegistryService`] — review filing and rating aggregation.
//! - [`CacheCoherencer`] — delete-on-write invalidation of read views.

pub mod availability;
pub mod booking;
pub mod booking_ledger;
pub mod cache_coherence;
pub mod error;
pub mod listing;
pub mod ports;
pub mod rating;
pub mod review;
pub mod review_registry;
pub mod user;

pub use self::availability::AvailabilityChecker;
pub use self::booking::{Booking, BookingDraft, BookingStatus, BookingValidationError, StayRange};
pub use self::booking_ledger::BookingLedgerService;
pub use self::cache_coherence::{CacheCoherencer, DEFAULT_CACHE_TTL, OWNER_RESERVATIONS_TTL};
pub use self::error::{Error, ErrorCode};
pub use self::listing::{Listing, ListingDraft, ListingValidationError, RateUnit};
pub use self::rating::{RatingAggregate, RatingScore, RatingValidationError};
pub use self::review::{Review, ReviewDraft, ReviewValidationError};
pub use self::review_registry::ReviewRegistryService;
pub use self::user::UserId;
