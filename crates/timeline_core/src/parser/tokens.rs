//! Locale token recognition for import text.
//!
//! # Responsibility
//! - Classify one raw line as blank, year marker, date marker or free text.
//! - Map locale period-of-day tokens to `Period`.
//!
//! # Invariants
//! - Classification is purely lexical; calendar validity is checked by the caller.
//! - ASCII and full-width digits are equivalent everywhere a number is read.
//! - Extending the vocabulary only touches `PERIOD_TOKENS` (and `PERIOD_SUFFIXES`
//!   for what still counts as an attempted period word).

use crate::model::event::Period;
use once_cell::sync::Lazy;
use regex::Regex;

static YEAR_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9０-９]{4})\s*年$").expect("valid year regex"));
static LOOSE_YEAR_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\s*年$").expect("valid loose year regex"));
static DATE_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([0-9０-９]{1,2})\s*月\s*([0-9０-９]{1,2})\s*[日号]\s*(?P<period>[^\d\s:：]{0,4})\s*(?P<clock>[0-9０-９]{1,2}\s*[:：]\s*[0-9０-９]{1,2})?$",
    )
    .expect("valid date regex")
});

/// Locale token → period table. Lookups are exact matches.
const PERIOD_TOKENS: &[(&str, Period)] = &[
    ("凌晨", Period::EarlyMorning),
    ("早上", Period::Morning),
    ("早晨", Period::Morning),
    ("清晨", Period::Morning),
    ("上午", Period::Morning),
    ("中午", Period::Noon),
    ("下午", Period::Afternoon),
    ("傍晚", Period::Evening),
    ("黄昏", Period::Evening),
    ("晚上", Period::Night),
    ("夜里", Period::Night),
    ("夜晚", Period::Night),
    ("深夜", Period::LateNight),
    ("半夜", Period::LateNight),
    ("午夜", Period::LateNight),
];

/// Last characters of words that name a time of day (`某时`, `夜间`).
/// Unknown words ending in one of these still mark a date line.
const PERIOD_SUFFIXES: &[char] = &['时', '晨', '午', '晚', '夜', '间'];

/// Lexical class of one import line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    Year(i32),
    /// Looks like a year line but is not a four-digit year (`22年`).
    MalformedYear(&'a str),
    Date(DateMarker<'a>),
    Text(&'a str),
}

/// Raw fields of a date line, not yet validated against the calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateMarker<'a> {
    pub month: u32,
    pub day: u32,
    /// Period token text as written; empty when the line has none.
    pub period_token: &'a str,
    /// Explicit clock text such as `23:40`, when present.
    pub clock: Option<&'a str>,
}

/// Classifies one line of import text.
pub fn classify_line(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }

    if let Some(caps) = YEAR_LINE_RE.captures(trimmed) {
        if let Some(year) = caps.get(1).and_then(|m| parse_number::<i32>(m.as_str())) {
            return LineKind::Year(year);
        }
    }
    if LOOSE_YEAR_LINE_RE.is_match(trimmed) {
        return LineKind::MalformedYear(trimmed);
    }

    if let Some(caps) = DATE_LINE_RE.captures(trimmed) {
        let month = caps.get(1).and_then(|m| parse_number::<u32>(m.as_str()));
        let day = caps.get(2).and_then(|m| parse_number::<u32>(m.as_str()));
        let period_token = caps.name("period").map_or("", |m| m.as_str());
        if let (Some(month), Some(day)) = (month, day) {
            if is_period_slot(period_token) {
                return LineKind::Date(DateMarker {
                    month,
                    day,
                    period_token,
                    clock: caps.name("clock").map(|m| m.as_str()),
                });
            }
        }
    }

    LineKind::Text(trimmed)
}

/// Whether the text after `日` reads as a period word rather than prose (`晴`).
fn is_period_slot(token: &str) -> bool {
    token.is_empty()
        || period_from_token(token).is_some()
        || token.ends_with(PERIOD_SUFFIXES)
}

/// Parses ASCII or full-width decimal digits.
fn parse_number<T: std::str::FromStr>(digits: &str) -> Option<T> {
    let ascii: String = digits
        .trim()
        .chars()
        .map(|c| match c {
            '０'..='９' => char::from_digit(c as u32 - '０' as u32, 10).unwrap_or(c),
            _ => c,
        })
        .collect();
    ascii.parse().ok()
}

/// Looks up a locale period token. Canonical names (`late-night`) are accepted too.
pub fn period_from_token(token: &str) -> Option<Period> {
    let token = token.trim();
    PERIOD_TOKENS
        .iter()
        .find(|(candidate, _)| *candidate == token)
        .map(|(_, period)| *period)
        .or_else(|| Period::from_name(token))
}

/// Returns every locale token mapped to `period`.
pub fn tokens_for(period: Period) -> impl Iterator<Item = &'static str> {
    PERIOD_TOKENS
        .iter()
        .filter(move |(_, candidate)| *candidate == period)
        .map(|(token, _)| *token)
}

/// Parses `H:MM` / `HH：MM` clock text into hour and minute.
pub fn split_clock(clock: &str) -> Option<(u32, u32)> {
    let (hour, minute) = clock.split_once([':', '：'])?;
    Some((parse_number(hour)?, parse_number(minute)?))
}
