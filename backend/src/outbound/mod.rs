//! Outbound adapters satisfying the domain's driven ports.

pub mod cache;
pub mod notify;
pub mod persistence;
