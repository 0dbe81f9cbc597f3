//! Import text → event drafts.
//!
//! # Responsibility
//! - Turn free-form journal text into `EventDraft`s plus soft warnings.
//! - Keep the running year context as explicit fold state.
//!
//! # Invariants
//! - A malformed block never aborts the import; it becomes a warning.
//! - Every draft carries the year of the nearest preceding year line.
//! - Only non-text (non UTF-8) input is a hard error.

use crate::config::ImportConfig;
use crate::model::event::{EventDraft, Period};
use crate::parser::tokens::{classify_line, period_from_token, split_clock, DateMarker, LineKind};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::debug;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Drafts and warnings produced by one import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    /// Successfully parsed drafts in document order.
    pub drafts: Vec<EventDraft>,
    pub warnings: Vec<ParseWarning>,
}

/// Non-fatal import problem anchored to a 1-based source line (0 = whole input).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseWarning {
    pub line: usize,
    pub kind: ParseWarningKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParseWarningKind {
    /// Input has no non-blank line.
    EmptyInput,
    /// Year-like line that is not a four-digit year; year context cleared.
    MalformedYear { text: String },
    /// Date line appears before any year line; block skipped.
    DateWithoutYear { month: u32, day: u32 },
    /// Year/month/day do not form a calendar date; block skipped.
    InvalidDate { year: i32, month: u32, day: u32 },
    /// Explicit clock is out of range; period or default time used instead.
    InvalidTime { clock: String },
    /// Period token outside the vocabulary; stored as absent.
    UnrecognizedPeriod { token: String },
    /// Date block has no content lines.
    EmptyContent,
}

impl Display for ParseWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: ", self.line)?;
        match &self.kind {
            ParseWarningKind::EmptyInput => write!(f, "nothing to parse"),
            ParseWarningKind::MalformedYear { text } => {
                write!(f, "`{text}` is not a four-digit year; year context cleared")
            }
            ParseWarningKind::DateWithoutYear { month, day } => {
                write!(f, "date {month}/{day} has no preceding year line; skipped")
            }
            ParseWarningKind::InvalidDate { year, month, day } => {
                write!(f, "{year}-{month:02}-{day:02} is not a valid date; skipped")
            }
            ParseWarningKind::InvalidTime { clock } => {
                write!(f, "invalid clock `{clock}`; using default time")
            }
            ParseWarningKind::UnrecognizedPeriod { token } => {
                write!(f, "unrecognized period `{token}`; stored without period")
            }
            ParseWarningKind::EmptyContent => write!(f, "event block has no content"),
        }
    }
}

/// Fatal import failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// Input bytes are not UTF-8 text.
    NotText { valid_up_to: usize },
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotText { valid_up_to } => write!(
                f,
                "import input is not UTF-8 text (invalid byte at offset {valid_up_to})"
            ),
        }
    }
}

impl Error for ImportError {}

/// Parses raw import bytes. Fails only when the bytes are not UTF-8.
pub fn parse_bytes(bytes: &[u8], config: &ImportConfig) -> Result<ParseOutcome, ImportError> {
    let text = std::str::from_utf8(bytes).map_err(|err| ImportError::NotText {
        valid_up_to: err.valid_up_to(),
    })?;
    Ok(parse(text, config))
}

/// Parses import text into drafts and warnings.
///
/// Grammar: `YYYY年` lines set the year context; `M月D日[period][HH:MM]`
/// lines open a block; every following line up to the next year/date line is
/// block content. Text before the first date line is ignored.
pub fn parse(raw: &str, config: &ImportConfig) -> ParseOutcome {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    if raw.trim().is_empty() {
        return ParseOutcome {
            drafts: Vec::new(),
            warnings: vec![ParseWarning {
                line: 0,
                kind: ParseWarningKind::EmptyInput,
            }],
        };
    }

    let outcome = raw
        .lines()
        .enumerate()
        .fold(FoldState::new(config), |state, (index, line)| {
            state.step(index + 1, line)
        })
        .finish();

    debug!(
        "event=import_parse module=parser status=ok drafts={} warnings={}",
        outcome.drafts.len(),
        outcome.warnings.len()
    );
    outcome
}

struct FoldState<'a> {
    config: &'a ImportConfig,
    default_time: NaiveTime,
    year: Option<i32>,
    open: Option<OpenBlock<'a>>,
    outcome: ParseOutcome,
}

struct OpenBlock<'a> {
    line: usize,
    header: &'a str,
    time: NaiveDateTime,
    period: Option<Period>,
    lines: Vec<&'a str>,
}

impl<'a> FoldState<'a> {
    fn new(config: &'a ImportConfig) -> Self {
        Self {
            config,
            default_time: config.default_clock().unwrap_or(NaiveTime::MIN),
            year: None,
            open: None,
            outcome: ParseOutcome::default(),
        }
    }

    fn step(mut self, line_no: usize, line: &'a str) -> Self {
        match classify_line(line) {
            LineKind::Blank => {
                if let Some(block) = self.open.as_mut() {
                    block.lines.push("");
                }
            }
            LineKind::Year(year) => {
                self.close_block();
                self.year = Some(year);
            }
            LineKind::MalformedYear(text) => {
                self.close_block();
                self.year = None;
                self.warn(
                    line_no,
                    ParseWarningKind::MalformedYear {
                        text: text.to_string(),
                    },
                );
            }
            LineKind::Date(marker) => {
                self.close_block();
                self.open = self.open_block(line_no, line.trim(), &marker);
            }
            LineKind::Text(text) => match self.open.as_mut() {
                Some(block) => block.lines.push(text),
                None => debug!("event=import_orphan_line module=parser line={line_no}"),
            },
        }
        self
    }

    fn finish(mut self) -> ParseOutcome {
        self.close_block();
        self.outcome
    }

    fn warn(&mut self, line: usize, kind: ParseWarningKind) {
        self.outcome.warnings.push(ParseWarning { line, kind });
    }

    fn open_block(
        &mut self,
        line_no: usize,
        header: &'a str,
        marker: &DateMarker<'_>,
    ) -> Option<OpenBlock<'a>> {
        let Some(year) = self.year else {
            self.warn(
                line_no,
                ParseWarningKind::DateWithoutYear {
                    month: marker.month,
                    day: marker.day,
                },
            );
            return None;
        };

        let Some(date) = NaiveDate::from_ymd_opt(year, marker.month, marker.day) else {
            self.warn(
                line_no,
                ParseWarningKind::InvalidDate {
                    year,
                    month: marker.month,
                    day: marker.day,
                },
            );
            return None;
        };

        let period = if marker.period_token.is_empty() {
            None
        } else {
            let period = period_from_token(marker.period_token);
            if period.is_none() {
                self.warn(
                    line_no,
                    ParseWarningKind::UnrecognizedPeriod {
                        token: marker.period_token.to_string(),
                    },
                );
            }
            period
        };

        let explicit = marker.clock.and_then(|clock| {
            let parsed = split_clock(clock).and_then(|(h, m)| NaiveTime::from_hms_opt(h, m, 0));
            if parsed.is_none() {
                self.warn(
                    line_no,
                    ParseWarningKind::InvalidTime {
                        clock: clock.to_string(),
                    },
                );
            }
            parsed
        });
        let clock = explicit
            .or_else(|| period.map(Period::representative_time))
            .unwrap_or(self.default_time);

        Some(OpenBlock {
            line: line_no,
            header,
            time: date.and_time(clock),
            period,
            lines: Vec::new(),
        })
    }

    fn close_block(&mut self) {
        let Some(block) = self.open.take() else {
            return;
        };

        let lines = collapse_blank_runs(&block.lines);
        if lines.is_empty() {
            self.warn(block.line, ParseWarningKind::EmptyContent);
            if self.config.skip_empty_blocks {
                return;
            }
        }

        let title = lines
            .first()
            .map(|first| truncate_chars(first, self.config.title_max_chars.max(1)))
            .unwrap_or_else(|| block.header.to_string());

        let mut draft = EventDraft::new(title, block.time);
        draft.content = lines.join("\n");
        draft.period = block.period;
        self.outcome.drafts.push(draft);
    }
}

/// Trims blank lines at both ends and keeps at most one blank between paragraphs.
fn collapse_blank_runs<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let mut collapsed: Vec<&'a str> = Vec::with_capacity(lines.len());
    for &line in lines {
        if line.is_empty() && collapsed.last().map_or(true, |prev| prev.is_empty()) {
            continue;
        }
        collapsed.push(line);
    }
    while collapsed.last().is_some_and(|line| line.is_empty()) {
        collapsed.pop();
    }
    collapsed
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}
