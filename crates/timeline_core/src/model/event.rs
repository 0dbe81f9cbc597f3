//! Timeline event domain model.
//!
//! # Responsibility
//! - Define the canonical event record shown by timeline projections.
//! - Own the canonical `YYYY-MM-DDTHH:MM` time wire format.
//!
//! # Invariants
//! - `id` is assigned by the store and never reused within a session.
//! - `time` is always a valid calendar date (enforced by `NaiveDateTime`).
//! - `period` is either a recognized `Period` or absent.
//! - `title` is non-empty after trimming once validated.

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Canonical, sortable time format used on every external boundary.
pub const CANONICAL_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Store-assigned event identifier.
pub type EventId = u64;

/// Coarse time-of-day bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Period {
    EarlyMorning,
    Morning,
    Noon,
    Afternoon,
    Evening,
    Night,
    LateNight,
}

impl Period {
    /// All periods in chronological order of their representative time.
    pub const ALL: [Period; 7] = [
        Period::EarlyMorning,
        Period::Morning,
        Period::Noon,
        Period::Afternoon,
        Period::Evening,
        Period::Night,
        Period::LateNight,
    ];

    /// Returns the canonical wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EarlyMorning => "early-morning",
            Self::Morning => "morning",
            Self::Noon => "noon",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
            Self::Night => "night",
            Self::LateNight => "late-night",
        }
    }

    /// Parses a canonical wire name (case-insensitive, surrounding spaces ignored).
    pub fn from_name(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|period| period.as_str() == normalized)
    }

    /// Parses a locale token (`深夜`, `上午`) or a canonical name.
    pub fn from_token(token: &str) -> Option<Self> {
        crate::parser::tokens::period_from_token(token)
    }

    /// Clock time stamped on events that name a period but no explicit time.
    pub fn representative_time(self) -> NaiveTime {
        let hour = match self {
            Self::EarlyMorning => 4,
            Self::Morning => 9,
            Self::Noon => 12,
            Self::Afternoon => 15,
            Self::Evening => 18,
            Self::Night => 21,
            Self::LateNight => 23,
        };
        NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failures for event records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventValidationError {
    /// Title is empty after trimming.
    EmptyTitle,
}

impl Display for EventValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "event title must not be empty"),
        }
    }
}

impl Error for EventValidationError {}

/// Event record before the store assigns an id.
///
/// Produced by the import parser or by manual entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(with = "canonical_time")]
    pub time: NaiveDateTime,
    #[serde(default, deserialize_with = "deserialize_lenient_period")]
    pub period: Option<Period>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub image: String,
}

impl EventDraft {
    /// Creates a draft with empty optional fields.
    pub fn new(title: impl Into<String>, time: NaiveDateTime) -> Self {
        Self {
            title: title.into(),
            content: String::new(),
            time,
            period: None,
            location: String::new(),
            image: String::new(),
        }
    }

    /// Checks record-level invariants.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        validate_title(&self.title)
    }
}

/// Stored event record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Serialized as canonical `YYYY-MM-DDTHH:MM`.
    #[serde(with = "canonical_time")]
    pub time: NaiveDateTime,
    #[serde(default, deserialize_with = "deserialize_lenient_period")]
    pub period: Option<Period>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub image: String,
}

impl Event {
    /// Binds a store-assigned id to a draft.
    pub fn from_draft(id: EventId, draft: EventDraft) -> Self {
        Self {
            id,
            title: draft.title,
            content: draft.content,
            time: draft.time,
            period: draft.period,
            location: draft.location,
            image: draft.image,
        }
    }

    /// Returns every field except `id`.
    pub fn to_draft(&self) -> EventDraft {
        EventDraft {
            title: self.title.clone(),
            content: self.content.clone(),
            time: self.time,
            period: self.period,
            location: self.location.clone(),
            image: self.image.clone(),
        }
    }

    /// Canonical time label, e.g. `2022-12-17T23:00`.
    pub fn time_label(&self) -> String {
        format_canonical_time(&self.time)
    }

    pub fn validate(&self) -> Result<(), EventValidationError> {
        validate_title(&self.title)
    }
}

fn validate_title(title: &str) -> Result<(), EventValidationError> {
    if title.trim().is_empty() {
        return Err(EventValidationError::EmptyTitle);
    }
    Ok(())
}

/// Partial update for one stored event.
///
/// `None` leaves a field untouched. `period: Some(None)` clears the period.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub time: Option<NaiveDateTime>,
    pub period: Option<Option<Period>>,
    pub location: Option<String>,
    pub image: Option<String>,
}

impl EventPatch {
    /// Returns whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.time.is_none()
            && self.period.is_none()
            && self.location.is_none()
            && self.image.is_none()
    }

    /// Applies the patch to a copy of `event`.
    pub fn apply_to(&self, event: &Event) -> Event {
        let mut next = event.clone();
        if let Some(title) = &self.title {
            next.title = title.clone();
        }
        if let Some(content) = &self.content {
            next.content = content.clone();
        }
        if let Some(time) = self.time {
            next.time = time;
        }
        if let Some(period) = self.period {
            next.period = period;
        }
        if let Some(location) = &self.location {
            next.location = location.clone();
        }
        if let Some(image) = &self.image {
            next.image = image.clone();
        }
        next
    }
}

/// Formats a timestamp as canonical `YYYY-MM-DDTHH:MM`.
pub fn format_canonical_time(time: &NaiveDateTime) -> String {
    time.format(CANONICAL_TIME_FORMAT).to_string()
}

/// Parses canonical `YYYY-MM-DDTHH:MM`. Rejects invalid calendar dates.
pub fn parse_canonical_time(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), CANONICAL_TIME_FORMAT).ok()
}

mod canonical_time {
    use super::{format_canonical_time, parse_canonical_time};
    use chrono::NaiveDateTime;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_canonical_time(time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_canonical_time(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid canonical time `{raw}`")))
    }
}

/// Accepts either a canonical period name or `null`; unknown names become `None`.
fn deserialize_lenient_period<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Period>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Period::from_name))
}
