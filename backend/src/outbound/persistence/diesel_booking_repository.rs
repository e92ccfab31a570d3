//! PostgreSQL-backed `BookingRepository` implementation using Diesel ORM.
//!
//! The admission write runs its overlap re-check and the insert inside one
//! transaction, locking the guest's existing rows for the listing so
//! concurrent admissions for the same (guest, listing) pair serialise. The
//! unique index on (guest_id, listing_id, check_in, check_out) remains the
//! last-resort backstop and is reported as an overlap, not an error.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{AdmissionOutcome, BookingRepository, BookingRepositoryError};
use crate::domain::{Booking, BookingDraft, BookingStatus, StayRange, UserId};

use super::diesel_error_map::{is_unique_violation, map_diesel_error_with, map_pool_error_with};
use super::models::{BookingRow, NewBookingRow};
use super::pool::{DbPool, PoolError};
use super::schema::{bookings, listings};

/// Diesel-backed implementation of the booking repository port.
#[derive(Clone)]
pub struct DieselBookingRepository {
    pool: DbPool,
}

impl DieselBookingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> BookingRepositoryError {
    map_pool_error_with(error, BookingRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> BookingRepositoryError {
    map_diesel_error_with(
        error,
        BookingRepositoryError::query,
        BookingRepositoryError::connection,
    )
}

/// Convert a database row into a validated domain booking.
fn row_to_booking(row: BookingRow) -> Result<Booking, BookingRepositoryError> {
    let BookingRow {
        id,
        guest_id,
        listing_id,
        check_in,
        check_out,
        guest_count,
        amount_due,
        status,
        created_at,
    } = row;

    let status: BookingStatus = status
        .parse()
        .map_err(|err: crate::domain::BookingValidationError| {
            BookingRepositoryError::query(err.to_string())
        })?;
    let stay = StayRange::new(check_in, check_out)
        .map_err(|err| BookingRepositoryError::query(err.to_string()))?;

    Booking::new(BookingDraft {
        id,
        guest_id: UserId::from_uuid(guest_id),
        listing_id,
        stay,
        guest_count,
        amount_due,
        status,
        created_at,
    })
    .map_err(|err| BookingRepositoryError::query(err.to_string()))
}

fn new_row<'a>(booking: &'a Booking) -> NewBookingRow<'a> {
    NewBookingRow {
        id: booking.id(),
        guest_id: *booking.guest_id().as_uuid(),
        listing_id: booking.listing_id(),
        check_in: booking.stay().check_in(),
        check_out: booking.stay().check_out(),
        guest_count: booking.guest_count(),
        amount_due: booking.amount_due(),
        status: booking.status().as_str(),
        created_at: booking.created_at(),
    }
}

#[async_trait]
impl BookingRepository for DieselBookingRepository {
    async fn has_overlap(
        &self,
        guest_id: &UserId,
        listing_id: &Uuid,
        stay: &StayRange,
    ) -> Result<bool, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let overlapping: i64 = bookings::table
            .filter(bookings::guest_id.eq(guest_id.as_uuid()))
            .filter(bookings::listing_id.eq(listing_id))
            .filter(bookings::check_in.lt(stay.check_out()))
            .filter(bookings::check_out.gt(stay.check_in()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(overlapping > 0)
    }

    async fn insert_if_vacant(
        &self,
        booking: &Booking,
    ) -> Result<AdmissionOutcome, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = new_row(booking);
        let guest_id = *booking.guest_id().as_uuid();
        let listing_id = booking.listing_id();
        let stay = *booking.stay();

        let result = conn
            .transaction::<AdmissionOutcome, diesel::result::Error, _>(|conn| {
                async move {
                    // Lock the guest's overlapping rows so a concurrent
                    // admission for the same pair waits behind this one.
                    let overlapping: Vec<Uuid> = bookings::table
                        .filter(bookings::guest_id.eq(guest_id))
                        .filter(bookings::listing_id.eq(listing_id))
                        .filter(bookings::check_in.lt(stay.check_out()))
                        .filter(bookings::check_out.gt(stay.check_in()))
                        .select(bookings::id)
                        .for_update()
                        .load(conn)
                        .await?;

                    if !overlapping.is_empty() {
                        return Ok(AdmissionOutcome::Overlapping);
                    }

                    diesel::insert_into(bookings::table)
                        .values(&row)
                        .execute(conn)
                        .await?;

                    Ok(AdmissionOutcome::Created)
                }
                .scope_boxed()
            })
            .await;

        match result {
            Ok(outcome) => Ok(outcome),
            Err(error) if is_unique_violation(&error) => Ok(AdmissionOutcome::Overlapping),
            Err(error) => Err(map_diesel_error(error)),
        }
    }

    async fn find_by_id(
        &self,
        booking_id: &Uuid,
    ) -> Result<Option<Booking>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = bookings::table
            .filter(bookings::id.eq(booking_id))
            .select(BookingRow::as_select())
            .first::<BookingRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_booking).transpose()
    }

    async fn transition_status(
        &self,
        booking_id: &Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<bool, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(
            bookings::table
                .filter(bookings::id.eq(booking_id))
                .filter(bookings::status.eq(from.as_str())),
        )
        .set(bookings::status.eq(to.as_str()))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(updated == 1)
    }

    async fn delete_if_booked(
        &self,
        booking_id: &Uuid,
        guest_id: &UserId,
    ) -> Result<bool, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(
            bookings::table
                .filter(bookings::id.eq(booking_id))
                .filter(bookings::guest_id.eq(guest_id.as_uuid()))
                .filter(bookings::status.eq(BookingStatus::Booked.as_str())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(deleted == 1)
    }

    async fn find_finished_for(
        &self,
        guest_id: &UserId,
        listing_id: &Uuid,
    ) -> Result<Option<Booking>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Oldest finished stay first, so repeat guests review their stays in
        // order.
        let row = bookings::table
            .filter(bookings::guest_id.eq(guest_id.as_uuid()))
            .filter(bookings::listing_id.eq(listing_id))
            .filter(bookings::status.eq(BookingStatus::Finished.as_str()))
            .order(bookings::check_out.asc())
            .select(BookingRow::as_select())
            .first::<BookingRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_booking).transpose()
    }

    async fn list_active_for_guest(
        &self,
        guest_id: &UserId,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<BookingRow> = bookings::table
            .filter(bookings::guest_id.eq(guest_id.as_uuid()))
            .filter(bookings::status.ne(BookingStatus::Reviewed.as_str()))
            .order(bookings::created_at.desc())
            .select(BookingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_booking).collect()
    }

    async fn list_for_owner(
        &self,
        owner_id: &UserId,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<BookingRow> = bookings::table
            .inner_join(listings::table)
            .filter(listings::owner_id.eq(owner_id.as_uuid()))
            .order(bookings::created_at.desc())
            .select(BookingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_booking).collect()
    }
}
