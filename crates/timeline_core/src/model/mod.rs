//! Domain model for timeline events.
//!
//! # Responsibility
//! - Define canonical event structures used by parser, store and service.
//!
//! # Invariants
//! - Every stored event is identified by a store-assigned `EventId`.
//! - Deletion is a hard removal; ids are still never handed out again.

pub mod event;
