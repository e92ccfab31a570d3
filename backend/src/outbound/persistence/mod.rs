//! Diesel/PostgreSQL persistence adapters for the reservation core.

mod diesel_booking_repository;
mod diesel_error_map;
mod diesel_listing_repository;
mod diesel_review_repository;
mod diesel_user_directory;
mod models;
pub mod pool;
pub mod schema;

pub use diesel_booking_repository::DieselBookingRepository;
pub use diesel_listing_repository::DieselListingRepository;
pub use diesel_review_repository::DieselReviewRepository;
pub use diesel_user_directory::DieselUserDirectory;
pub use pool::{DbPool, PoolConfig, PoolError};
