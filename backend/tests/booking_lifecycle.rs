//! End-to-end lifecycle coverage driving the domain services through
//! in-memory adapters: admission, checkout confirmation, review filing and
//! the cache coherence discipline.

mod support;

use std::sync::Arc;

use chrono::NaiveDate;
use rstest::rstest;
use uuid::Uuid;

use backend::domain::ports::{
    BookingCommand, BookingQuery, ConfirmCheckoutRequest, CreateBookingRequest, FileReviewRequest,
    ListGuestBookingsRequest, ListOwnerReservationsRequest, NotificationMessage,
    RemoveBookingRequest, ReviewCommand, UserAccount,
};
use backend::domain::{
    BookingLedgerService, BookingStatus, ErrorCode, Listing, ListingDraft, RateUnit,
    RatingAggregate, ReviewRegistryService, UserId, DEFAULT_CACHE_TTL, OWNER_RESERVATIONS_TTL,
};

use support::{
    InMemoryBookings, InMemoryDirectory, InMemoryListings, InMemoryReviews, MutableClock,
    RecordingCache, RecordingNotifier, SharedStore,
};

struct World {
    store: Arc<SharedStore>,
    cache: Arc<RecordingCache>,
    notifier: Arc<RecordingNotifier>,
    directory: Arc<InMemoryDirectory>,
    clock: Arc<MutableClock>,
    ledger: BookingLedgerService<InMemoryBookings, InMemoryListings>,
    registry: ReviewRegistryService<InMemoryBookings, InMemoryListings, InMemoryReviews>,
    guest: UserId,
    owner: UserId,
    listing_id: Uuid,
}

fn date(value: &str) -> NaiveDate {
    value.parse().expect("valid ISO date")
}

fn world() -> World {
    // Make service warn/info lines visible when a scenario fails.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();

    let guest = UserId::random();
    let owner = UserId::random();
    let listing_id = Uuid::new_v4();

    let store = Arc::new(SharedStore::default());
    store.insert_listing(
        Listing::new(ListingDraft {
            id: listing_id,
            owner_id: owner,
            name: "Harbour loft".to_owned(),
            price: 12_000,
            rate_unit: RateUnit::PerDay,
            rating: RatingAggregate::zero(),
        })
        .expect("valid listing"),
    );

    let cache = Arc::new(RecordingCache::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let directory = Arc::new(InMemoryDirectory::with_accounts([
        UserAccount {
            id: guest,
            username: "maria".to_owned(),
            banned: false,
        },
        UserAccount {
            id: owner,
            username: "sven".to_owned(),
            banned: false,
        },
    ]));
    let clock = Arc::new(MutableClock::new(
        "2025-05-20T09:00:00Z"
            .parse()
            .expect("RFC3339 fixture timestamp"),
    ));

    let bookings = Arc::new(InMemoryBookings::new(store.clone()));
    let listings = Arc::new(InMemoryListings::new(store.clone()));
    let reviews = Arc::new(InMemoryReviews::new(store.clone()));

    let ledger = BookingLedgerService::new(
        bookings.clone(),
        listings.clone(),
        directory.clone(),
        notifier.clone(),
        cache.clone(),
        clock.clone(),
    );
    let registry = ReviewRegistryService::new(
        bookings,
        listings,
        reviews,
        directory.clone(),
        cache.clone(),
        clock.clone(),
    );

    World {
        store,
        cache,
        notifier,
        directory,
        clock,
        ledger,
        registry,
        guest,
        owner,
        listing_id,
    }
}

fn stay_request(world: &World, check_in: &str, check_out: &str) -> CreateBookingRequest {
    CreateBookingRequest {
        guest_id: world.guest,
        listing_id: world.listing_id,
        check_in: date(check_in),
        check_out: date(check_out),
        guest_count: 2,
        amount_due: 48_000,
    }
}

#[rstest]
#[tokio::test]
async fn overlapping_rebooking_is_rejected_with_conflict() {
    let world = world();

    world
        .ledger
        .create_booking(stay_request(&world, "2025-06-01", "2025-06-05"))
        .await
        .expect("first stay admitted");

    let error = world
        .ledger
        .create_booking(stay_request(&world, "2025-06-03", "2025-06-07"))
        .await
        .expect_err("overlapping stay rejected");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn touching_stay_is_admitted() {
    let world = world();

    world
        .ledger
        .create_booking(stay_request(&world, "2025-06-01", "2025-06-05"))
        .await
        .expect("first stay admitted");

    // Checkout day and the next check-in coincide: no conflict.
    world
        .ledger
        .create_booking(stay_request(&world, "2025-06-05", "2025-06-10"))
        .await
        .expect("back-to-back stay admitted");
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_overlapping_admissions_admit_exactly_one() {
    let world = world();

    // Both requests may pass the advisory pre-check before either inserts;
    // the repository's check-then-insert is the decision of record and lets
    // only one through.
    let first = tokio::spawn({
        let ledger = world.ledger.clone();
        let request = stay_request(&world, "2025-06-01", "2025-06-05");
        async move { ledger.create_booking(request).await }
    });
    let second = tokio::spawn({
        let ledger = world.ledger.clone();
        let request = stay_request(&world, "2025-06-03", "2025-06-07");
        async move { ledger.create_booking(request).await }
    });

    let outcomes = [
        first.await.expect("first admission task completes"),
        second.await.expect("second admission task completes"),
    ];
    let admitted = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(admitted, 1, "exactly one overlapping stay is admitted");
    let conflict = outcomes
        .iter()
        .find_map(|outcome| outcome.as_ref().err())
        .expect("the losing request surfaces a failure");
    assert_eq!(conflict.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn different_guests_may_hold_overlapping_stays_on_one_listing() {
    let world = world();
    let other_guest = UserId::random();
    world.directory.insert(UserAccount {
        id: other_guest,
        username: "noor".to_owned(),
        banned: false,
    });

    world
        .ledger
        .create_booking(stay_request(&world, "2025-06-01", "2025-06-05"))
        .await
        .expect("first guest admitted");

    // Admission scope is per-(guest, listing): the same dates from another
    // guest are admitted. Deliberate policy, not a missing check.
    world
        .ledger
        .create_booking(CreateBookingRequest {
            guest_id: other_guest,
            listing_id: world.listing_id,
            check_in: date("2025-06-01"),
            check_out: date("2025-06-05"),
            guest_count: 1,
            amount_due: 48_000,
        })
        .await
        .expect("second guest admitted on the same dates");
}

#[rstest]
#[tokio::test]
async fn full_lifecycle_from_booking_to_review() {
    let world = world();

    let created = world
        .ledger
        .create_booking(stay_request(&world, "2025-06-01", "2025-06-05"))
        .await
        .expect("stay admitted");
    let booking_id = created.booking.id;
    assert_eq!(created.booking.status, BookingStatus::Booked);
    assert_eq!(
        world.cache.deleted_keys(),
        vec!["user_bookings_maria".to_owned()]
    );

    // Too early: guests have not checked out yet.
    world.clock.set("2025-06-04T08:00:00Z".parse().expect("RFC3339 fixture timestamp"));
    let error = world
        .ledger
        .confirm_checkout(ConfirmCheckoutRequest {
            owner_id: world.owner,
            booking_id,
        })
        .await
        .expect_err("early confirmation rejected");
    assert_eq!(error.code(), ErrorCode::NotYetDue);

    // On the checkout day the owner confirms.
    world.clock.advance_days(1);
    let confirmed = world
        .ledger
        .confirm_checkout(ConfirmCheckoutRequest {
            owner_id: world.owner,
            booking_id,
        })
        .await
        .expect("due checkout confirmed");
    assert_eq!(confirmed.booking.status, BookingStatus::Finished);

    // A second confirmation finds nothing left to transition.
    let error = world
        .ledger
        .confirm_checkout(ConfirmCheckoutRequest {
            owner_id: world.owner,
            booking_id,
        })
        .await
        .expect_err("repeat confirmation rejected");
    assert_eq!(error.code(), ErrorCode::NotFound);

    // The guest reviews the finished stay.
    let reviewed = world
        .registry
        .file_review(FileReviewRequest {
            author_id: world.guest,
            listing_id: world.listing_id,
            rating: 5,
            text: "Great stay!".to_owned(),
        })
        .await
        .expect("review filed");
    assert_eq!(reviewed.listing_rating, 5.0);

    // Lifecycle landed in Reviewed and the aggregate moved with it.
    let booking = world.store.booking(booking_id).expect("booking kept");
    assert_eq!(booking.status(), BookingStatus::Reviewed);
    let listing = world.store.listing(world.listing_id).expect("listing kept");
    assert_eq!(listing.rating().count(), 1);
    assert_eq!(listing.displayed_rating(), 5.0);

    // Both notifications went out, in order, at most once each.
    let sent = world.notifier.sent();
    assert_eq!(sent.len(), 2);
    assert!(matches!(
        sent[0],
        NotificationMessage::BookingCreated { booking_id: id, .. } if id == booking_id
    ));
    assert!(matches!(
        sent[1],
        NotificationMessage::StayFinished { booking_id: id, .. } if id == booking_id
    ));

    // Review filing invalidated all four affected views.
    let deleted = world.cache.deleted_keys();
    for expected in [
        format!("housing_{}", world.listing_id),
        format!("review_{}", world.listing_id),
        "user_bookings_maria".to_owned(),
        "my_housing_reservations_sven".to_owned(),
    ] {
        assert!(
            deleted.contains(&expected),
            "missing invalidation for {expected}"
        );
    }
}

#[rstest]
#[tokio::test]
async fn second_review_fails_and_leaves_counters_unchanged() {
    let world = world();

    let created = world
        .ledger
        .create_booking(stay_request(&world, "2025-06-01", "2025-06-05"))
        .await
        .expect("stay admitted");
    world.clock.set("2025-06-05T12:00:00Z".parse().expect("RFC3339 fixture timestamp"));
    world
        .ledger
        .confirm_checkout(ConfirmCheckoutRequest {
            owner_id: world.owner,
            booking_id: created.booking.id,
        })
        .await
        .expect("checkout confirmed");
    world
        .registry
        .file_review(FileReviewRequest {
            author_id: world.guest,
            listing_id: world.listing_id,
            rating: 5,
            text: "Great stay!".to_owned(),
        })
        .await
        .expect("first review filed");

    let error = world
        .registry
        .file_review(FileReviewRequest {
            author_id: world.guest,
            listing_id: world.listing_id,
            rating: 1,
            text: "Changed my mind".to_owned(),
        })
        .await
        .expect_err("second review rejected");
    assert_eq!(error.code(), ErrorCode::AlreadyReviewed);

    // Counters and review rows are untouched by the failed attempt.
    let listing = world.store.listing(world.listing_id).expect("listing kept");
    assert_eq!(listing.rating().count(), 1);
    assert_eq!(listing.displayed_rating(), 5.0);
    assert_eq!(world.store.review_count(), 1);

    // And the reviewed booking can no longer be withdrawn.
    let error = world
        .ledger
        .remove_booking(RemoveBookingRequest {
            guest_id: world.guest,
            booking_id: created.booking.id,
        })
        .await
        .expect_err("reviewed booking is not removable");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn booked_stay_can_be_withdrawn() {
    let world = world();

    let created = world
        .ledger
        .create_booking(stay_request(&world, "2025-06-01", "2025-06-05"))
        .await
        .expect("stay admitted");

    world
        .ledger
        .remove_booking(RemoveBookingRequest {
            guest_id: world.guest,
            booking_id: created.booking.id,
        })
        .await
        .expect("booked stay removed");
    assert!(world.store.booking(created.booking.id).is_none());

    // The slot is free again.
    world
        .ledger
        .create_booking(stay_request(&world, "2025-06-01", "2025-06-05"))
        .await
        .expect("slot rebookable after withdrawal");
}

#[rstest]
#[tokio::test]
async fn banned_guests_are_locked_out_of_mutations() {
    let world = world();
    world.directory.ban(&world.guest);

    let error = world
        .ledger
        .create_booking(stay_request(&world, "2025-06-01", "2025-06-05"))
        .await
        .expect_err("banned guest rejected");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn guest_booking_list_is_cached_with_the_default_ttl() {
    let world = world();

    world
        .ledger
        .create_booking(stay_request(&world, "2025-06-01", "2025-06-05"))
        .await
        .expect("stay admitted");

    let first = world
        .ledger
        .list_guest_bookings(ListGuestBookingsRequest {
            guest_id: world.guest,
        })
        .await
        .expect("list read");
    assert_eq!(first.bookings.len(), 1);
    assert!(world.cache.contains("user_bookings_maria"));
    assert_eq!(
        world.cache.puts(),
        vec![("user_bookings_maria".to_owned(), DEFAULT_CACHE_TTL)]
    );

    // The repopulated entry serves the second read unchanged.
    let second = world
        .ledger
        .list_guest_bookings(ListGuestBookingsRequest {
            guest_id: world.guest,
        })
        .await
        .expect("cached read");
    assert_eq!(second.bookings, first.bookings);
    assert_eq!(world.cache.puts().len(), 1, "second read hits the cache");
}

#[rstest]
#[tokio::test]
async fn owner_reservation_list_uses_the_short_ttl_and_sees_all_states() {
    let world = world();

    let created = world
        .ledger
        .create_booking(stay_request(&world, "2025-06-01", "2025-06-05"))
        .await
        .expect("stay admitted");
    world.clock.set("2025-06-05T12:00:00Z".parse().expect("RFC3339 fixture timestamp"));
    world
        .ledger
        .confirm_checkout(ConfirmCheckoutRequest {
            owner_id: world.owner,
            booking_id: created.booking.id,
        })
        .await
        .expect("checkout confirmed");

    let reservations = world
        .ledger
        .list_owner_reservations(ListOwnerReservationsRequest {
            owner_id: world.owner,
        })
        .await
        .expect("owner list read");
    assert_eq!(reservations.reservations.len(), 1);
    assert_eq!(
        reservations.reservations[0].status,
        BookingStatus::Finished
    );
    assert_eq!(
        world.cache.puts(),
        vec![(
            "my_housing_reservations_sven".to_owned(),
            OWNER_RESERVATIONS_TTL
        )]
    );

    // Guest lists exclude reviewed stays; owner lists keep them. Verified
    // after the guest files the review.
    world
        .registry
        .file_review(FileReviewRequest {
            author_id: world.guest,
            listing_id: world.listing_id,
            rating: 4,
            text: "Lovely spot".to_owned(),
        })
        .await
        .expect("review filed");

    let guest_view = world
        .ledger
        .list_guest_bookings(ListGuestBookingsRequest {
            guest_id: world.guest,
        })
        .await
        .expect("guest list read");
    assert!(guest_view.bookings.is_empty());

    let owner_view = world
        .ledger
        .list_owner_reservations(ListOwnerReservationsRequest {
            owner_id: world.owner,
        })
        .await
        .expect("owner list read");
    assert_eq!(owner_view.reservations.len(), 1);
    assert_eq!(
        owner_view.reservations[0].status,
        BookingStatus::Reviewed
    );
}
