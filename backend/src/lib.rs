//! Reservation and rating core for a short-term rental marketplace backend.
//!
//! The crate is organised hexagonally: `domain` holds entities, services and
//! ports; `outbound` holds the Diesel, Redis and notification adapters that
//! satisfy the driven ports. Inbound transports (HTTP handlers, sessions,
//! OpenAPI) live outside this crate and speak to the domain exclusively via
//! the driving ports in [`domain::ports`].

pub mod domain;
pub mod outbound;
