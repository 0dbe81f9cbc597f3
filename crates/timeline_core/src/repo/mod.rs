//! Repository layer abstractions and implementations.
//!
//! # Responsibility
//! - Define the event storage contract used by services.
//! - Keep storage layout and id allocation out of service orchestration.
//!
//! # Invariants
//! - Repository writes must enforce event validation before mutating storage.
//! - Lookups with stale ids report not-found as values, never as faults.

pub mod event_repo;
