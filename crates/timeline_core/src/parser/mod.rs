//! Import text parsing.
//!
//! # Responsibility
//! - Recognize locale-tagged year/date/period tokens (`tokens`).
//! - Fold import text into event drafts with soft warnings (`import`).
//!
//! # Invariants
//! - Parsing is pure: no I/O, no shared state, no store access.

pub mod import;
pub mod tokens;
