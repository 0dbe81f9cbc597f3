//! Core domain logic for the timeline journal.
//! Import parsing, the session event store and its queries live here.

pub mod config;
pub mod logging;
pub mod model;
pub mod parser;
pub mod repo;
pub mod service;

pub use config::{load_config, ConfigError, ImportConfig, TimelineConfig};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use model::event::{
    format_canonical_time, parse_canonical_time, Event, EventDraft, EventId, EventPatch,
    EventValidationError, Period,
};
pub use parser::import::{
    parse, parse_bytes, ImportError, ParseOutcome, ParseWarning, ParseWarningKind,
};
pub use repo::event_repo::{
    EventFilter, EventRepository, InMemoryEventRepository, RepoError, RepoResult,
};
pub use service::timeline_service::{ImportReport, SnapshotError, TimelineService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
