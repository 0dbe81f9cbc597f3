//! Event repository contract and in-memory implementation.
//!
//! # Responsibility
//! - Own every event record of a session and hand out ids.
//! - Answer filtered, deterministically ordered list queries.
//!
//! # Invariants
//! - Write paths call `validate()` before mutating storage.
//! - Ids are monotonic and never reused, even after removal or restore.
//! - `restore` is all-or-nothing: a rejected batch leaves storage untouched.
//! - `list` ordering is `time ASC, id ASC` regardless of insertion order.
//! - Unknown ids on `update`/`remove` are reported as `false`, never as errors.

use crate::model::event::{Event, EventDraft, EventId, EventPatch, EventValidationError, Period};
use chrono::{Datelike, NaiveDateTime};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for event writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    Validation(EventValidationError),
    /// Restoring an event whose id is already present (or repeated in the batch).
    DuplicateId(EventId),
    /// Restoring an id this store already issued and retired.
    RetiredId(EventId),
    /// The id counter cannot advance any further.
    IdSpaceExhausted,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateId(id) => write!(f, "event id already present: {id}"),
            Self::RetiredId(id) => write!(f, "event id was already issued and removed: {id}"),
            Self::IdSpaceExhausted => write!(f, "event id space exhausted"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::DuplicateId(_) | Self::RetiredId(_) | Self::IdSpaceExhausted => None,
        }
    }
}

impl From<EventValidationError> for RepoError {
    fn from(value: EventValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Query options for listing events. Every present option narrows the result (AND).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Keep events whose `time` falls in this calendar year.
    pub year: Option<i32>,
    pub period: Option<Period>,
    /// Case-insensitive substring of `location`.
    pub location_contains: Option<String>,
    /// Inclusive lower bound on `time`.
    pub from: Option<NaiveDateTime>,
    /// Exclusive upper bound on `time`.
    pub until: Option<NaiveDateTime>,
    /// Case-insensitive substring of `title` or `content`.
    pub text: Option<String>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl EventFilter {
    /// Filter matching only `year`.
    pub fn for_year(year: i32) -> Self {
        Self {
            year: Some(year),
            ..Self::default()
        }
    }

    /// Returns whether `event` satisfies every predicate. Ignores paging.
    pub fn matches(&self, event: &Event) -> bool {
        if self.year.is_some_and(|year| event.time.year() != year) {
            return false;
        }
        if self.period.is_some() && event.period != self.period {
            return false;
        }
        if let Some(needle) = normalized_needle(self.location_contains.as_deref()) {
            if !event.location.to_lowercase().contains(&needle) {
                return false;
            }
        }
        if self.from.is_some_and(|from| event.time < from) {
            return false;
        }
        if self.until.is_some_and(|until| event.time >= until) {
            return false;
        }
        if let Some(needle) = normalized_needle(self.text.as_deref()) {
            if !event.title.to_lowercase().contains(&needle)
                && !event.content.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

fn normalized_needle(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|needle| !needle.is_empty())
        .map(str::to_lowercase)
}

/// Repository interface for event CRUD and queries.
pub trait EventRepository {
    /// Stores a new event and returns its assigned id.
    fn insert(&mut self, draft: EventDraft) -> RepoResult<EventId>;
    /// Stores a batch of events under their existing ids (snapshot restore).
    ///
    /// Every id must be above all ids this store has issued. The batch is
    /// checked as a whole before anything is stored. Returns the stored count.
    fn restore(&mut self, events: Vec<Event>) -> RepoResult<usize>;
    fn get(&self, id: EventId) -> Option<Event>;
    /// Applies `patch`; `Ok(false)` when `id` is unknown.
    fn update(&mut self, id: EventId, patch: &EventPatch) -> RepoResult<bool>;
    /// Removes one event; `false` when `id` is unknown.
    fn remove(&mut self, id: EventId) -> bool;
    /// Lists matching events ordered by `time ASC, id ASC`.
    fn list(&self, filter: &EventFilter) -> Vec<Event>;
    /// Distinct years present, ascending.
    fn years(&self) -> Vec<i32>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Session-scoped in-memory event repository.
#[derive(Debug, Clone)]
pub struct InMemoryEventRepository {
    events: BTreeMap<EventId, Event>,
    next_id: EventId,
}

impl Default for InMemoryEventRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self {
            events: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl EventRepository for InMemoryEventRepository {
    fn insert(&mut self, draft: EventDraft) -> RepoResult<EventId> {
        draft.validate()?;

        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(RepoError::IdSpaceExhausted)?;
        self.events.insert(id, Event::from_draft(id, draft));
        Ok(id)
    }

    fn restore(&mut self, events: Vec<Event>) -> RepoResult<usize> {
        let mut batch_ids = BTreeSet::new();
        for event in &events {
            event.validate()?;
            if self.events.contains_key(&event.id) || !batch_ids.insert(event.id) {
                return Err(RepoError::DuplicateId(event.id));
            }
            if event.id < self.next_id {
                return Err(RepoError::RetiredId(event.id));
            }
        }

        let next_id = match batch_ids.last() {
            Some(max_id) => max_id
                .checked_add(1)
                .ok_or(RepoError::IdSpaceExhausted)?
                .max(self.next_id),
            None => self.next_id,
        };

        let count = events.len();
        for event in events {
            self.events.insert(event.id, event);
        }
        self.next_id = next_id;
        Ok(count)
    }

    fn get(&self, id: EventId) -> Option<Event> {
        self.events.get(&id).cloned()
    }

    fn update(&mut self, id: EventId, patch: &EventPatch) -> RepoResult<bool> {
        let Some(current) = self.events.get(&id) else {
            return Ok(false);
        };

        let next = patch.apply_to(current);
        next.validate()?;
        self.events.insert(id, next);
        Ok(true)
    }

    fn remove(&mut self, id: EventId) -> bool {
        self.events.remove(&id).is_some()
    }

    fn list(&self, filter: &EventFilter) -> Vec<Event> {
        let mut matched: Vec<&Event> = self
            .events
            .values()
            .filter(|event| filter.matches(event))
            .collect();
        matched.sort_by(|a, b| a.time.cmp(&b.time).then(a.id.cmp(&b.id)));

        let page = matched.into_iter().skip(filter.offset);
        match filter.limit {
            Some(limit) => page.take(limit).cloned().collect(),
            None => page.cloned().collect(),
        }
    }

    fn years(&self) -> Vec<i32> {
        self.events
            .values()
            .map(|event| event.time.year())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn len(&self) -> usize {
        self.events.len()
    }
}
