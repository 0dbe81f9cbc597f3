//! Timeline use-case service.
//!
//! # Responsibility
//! - Provide import, manual entry, edit, delete and query entry points.
//! - Export/restore the session store as a JSON snapshot.
//!
//! # Invariants
//! - Service APIs never bypass repository validation.
//! - Import inserts drafts one by one; a draft rejected by the store becomes a
//!   report entry, not a failure of the whole import.
//! - Logs carry counts and ids only, never event text.

use crate::config::ImportConfig;
use crate::model::event::{Event, EventDraft, EventId, EventPatch};
use crate::parser::import::{parse, parse_bytes, ImportError, ParseOutcome, ParseWarning};
use crate::repo::event_repo::{EventFilter, EventRepository, RepoError, RepoResult};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result of one import call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Ids assigned to imported events, in document order.
    pub inserted: Vec<EventId>,
    /// Parser warnings for skipped or degraded blocks.
    pub warnings: Vec<ParseWarning>,
    /// Drafts the store refused, with the reason.
    pub rejected: Vec<(EventDraft, RepoError)>,
}

/// Snapshot export/restore failures.
#[derive(Debug)]
pub enum SnapshotError {
    Json(serde_json::Error),
    Repo(RepoError),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid event snapshot: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<RepoError> for SnapshotError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Timeline service facade over repository implementations.
pub struct TimelineService<R: EventRepository> {
    repo: R,
    import_config: ImportConfig,
}

impl<R: EventRepository> TimelineService<R> {
    /// Creates a service with default import options.
    pub fn new(repo: R) -> Self {
        Self::with_config(repo, ImportConfig::default())
    }

    pub fn with_config(repo: R, import_config: ImportConfig) -> Self {
        Self {
            repo,
            import_config,
        }
    }

    pub fn import_config(&self) -> &ImportConfig {
        &self.import_config
    }

    /// Parses import text and stores every successfully parsed event.
    pub fn import_text(&mut self, raw: &str) -> ImportReport {
        let outcome = parse(raw, &self.import_config);
        self.store_outcome(outcome)
    }

    /// Like `import_text`, for raw bytes. Non-UTF-8 input is the only error.
    pub fn import_bytes(&mut self, bytes: &[u8]) -> Result<ImportReport, ImportError> {
        let outcome = parse_bytes(bytes, &self.import_config).inspect_err(|err| {
            warn!("event=import module=service status=error reason={err}");
        })?;
        Ok(self.store_outcome(outcome))
    }

    fn store_outcome(&mut self, outcome: ParseOutcome) -> ImportReport {
        let mut report = ImportReport {
            warnings: outcome.warnings,
            ..ImportReport::default()
        };

        for draft in outcome.drafts {
            match self.repo.insert(draft.clone()) {
                Ok(id) => report.inserted.push(id),
                Err(err) => report.rejected.push((draft, err)),
            }
        }

        info!(
            "event=import module=service status=ok inserted={} warnings={} rejected={}",
            report.inserted.len(),
            report.warnings.len(),
            report.rejected.len()
        );
        report
    }

    /// Adds one manually entered event.
    pub fn add(&mut self, draft: EventDraft) -> RepoResult<EventId> {
        let id = self.repo.insert(draft)?;
        info!("event=event_add module=service status=ok id={id}");
        Ok(id)
    }

    pub fn get(&self, id: EventId) -> Option<Event> {
        self.repo.get(id)
    }

    /// Applies a partial edit. `Ok(false)` when the id is unknown.
    pub fn update(&mut self, id: EventId, patch: &EventPatch) -> RepoResult<bool> {
        let updated = self.repo.update(id, patch)?;
        if !updated {
            warn!("event=event_update module=service status=not_found id={id}");
        }
        Ok(updated)
    }

    /// Removes one event. `false` when the id is unknown.
    pub fn remove(&mut self, id: EventId) -> bool {
        let removed = self.repo.remove(id);
        if !removed {
            warn!("event=event_remove module=service status=not_found id={id}");
        }
        removed
    }

    pub fn list(&self, filter: &EventFilter) -> Vec<Event> {
        self.repo.list(filter)
    }

    /// Distinct years with at least one event, for year selectors.
    pub fn available_years(&self) -> Vec<i32> {
        self.repo.years()
    }

    pub fn len(&self) -> usize {
        self.repo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repo.is_empty()
    }

    /// Serializes every event (ordered by time, then id) as a JSON array.
    pub fn export_json(&self) -> Result<String, SnapshotError> {
        let events = self.repo.list(&EventFilter::default());
        Ok(serde_json::to_string_pretty(&events)?)
    }

    /// Restores events from a JSON array produced by `export_json`.
    ///
    /// Ids are kept and must not collide with ids this session already
    /// issued. A malformed document or a rejected event leaves the store untouched.
    pub fn restore_json(&mut self, raw: &str) -> Result<usize, SnapshotError> {
        let events: Vec<Event> = serde_json::from_str(raw)?;
        let count = self.repo.restore(events).inspect_err(|err| {
            warn!("event=snapshot_restore module=service status=error reason={err}");
        })?;
        info!("event=snapshot_restore module=service status=ok events={count}");
        Ok(count)
    }
}
