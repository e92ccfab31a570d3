//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly; Diesel uses
//! them for compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Marketplace accounts mirrored from the identity service.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        banned -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Rentable properties with their running rating counters.
    listings (id) {
        id -> Uuid,
        owner_id -> Uuid,
        name -> Varchar,
        /// Price in minor currency units.
        price -> Int8,
        /// Billing period: per_day, per_week or per_month.
        rate_unit -> Varchar,
        rating_sum -> Int8,
        rating_count -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Reserved stays; unique over (guest_id, listing_id, check_in, check_out).
    bookings (id) {
        id -> Uuid,
        guest_id -> Uuid,
        listing_id -> Uuid,
        check_in -> Date,
        check_out -> Date,
        guest_count -> Int4,
        amount_due -> Int8,
        /// Lifecycle state: Booked, Finished or Reviewed.
        status -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Guest reviews; unique over (author_id, listing_id).
    reviews (id) {
        id -> Uuid,
        author_id -> Uuid,
        listing_id -> Uuid,
        rating -> Int4,
        text -> Text,
        reviewed_on -> Date,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(bookings -> listings (listing_id));
diesel::joinable!(bookings -> users (guest_id));
diesel::joinable!(listings -> users (owner_id));
diesel::joinable!(reviews -> listings (listing_id));
diesel::joinable!(reviews -> users (author_id));

diesel::allow_tables_to_appear_in_same_query!(users, listings, bookings, reviews);
