//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod booking_command;
mod booking_query;
mod booking_repository;
mod cache_key;
mod listing_repository;
mod notifier;
mod read_cache;
mod review_command;
mod review_repository;
mod user_directory;

pub use booking_command::{
    BookingCommand, BookingPayload, ConfirmCheckoutRequest, ConfirmCheckoutResponse,
    CreateBookingRequest, CreateBookingResponse, RemoveBookingRequest, RemoveBookingResponse,
};
pub use booking_query::{
    BookingQuery, ListGuestBookingsRequest, ListGuestBookingsResponse,
    ListOwnerReservationsRequest, ListOwnerReservationsResponse,
};
#[cfg(test)]
pub use booking_repository::MockBookingRepository;
pub use booking_repository::{
    AdmissionOutcome, BookingRepository, BookingRepositoryError, FixtureBookingRepository,
};
pub use cache_key::{CacheKey, CacheKeyValidationError};
#[cfg(test)]
pub use listing_repository::MockListingRepository;
pub use listing_repository::{
    FixtureListingRepository, ListingRepository, ListingRepositoryError,
};
#[cfg(test)]
pub use notifier::MockNotifier;
pub use notifier::{FixtureNotifier, NotificationMessage, Notifier, NotifierError};
#[cfg(test)]
pub use read_cache::MockReadCache;
pub use read_cache::{FixtureReadCache, ReadCache, ReadCacheError};
pub use review_command::{FileReviewRequest, FileReviewResponse, ReviewCommand, ReviewPayload};
#[cfg(test)]
pub use review_repository::MockReviewRepository;
pub use review_repository::{
    FixtureReviewRepository, ReviewRepository, ReviewRepositoryError,
};
#[cfg(test)]
pub use user_directory::MockUserDirectory;
pub use user_directory::{
    FixtureUserDirectory, UserAccount, UserDirectory, UserDirectoryError,
};
