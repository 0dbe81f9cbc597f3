use chrono::{Datelike, Timelike};
use timeline_core::{parse, parse_bytes, ImportConfig, ImportError, ParseWarningKind, Period};

fn parse_default(raw: &str) -> timeline_core::ParseOutcome {
    parse(raw, &ImportConfig::default())
}

#[test]
fn parses_single_late_night_block() {
    let outcome = parse_default("2022年\n\n12月17日深夜\nTest event content here");

    assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);
    assert_eq!(outcome.drafts.len(), 1);
    let draft = &outcome.drafts[0];
    assert_eq!(draft.time.year(), 2022);
    assert_eq!(draft.time.month(), 12);
    assert_eq!(draft.time.day(), 17);
    assert_eq!(draft.time.hour(), 23);
    assert_eq!(draft.period, Some(Period::LateNight));
    assert!(draft.content.contains("Test event content here"));
    assert_eq!(draft.title, "Test event content here");
    assert_eq!(draft.location, "");
    assert_eq!(draft.image, "");
}

#[test]
fn empty_input_yields_only_nothing_to_parse_warning() {
    for raw in ["", "  \n\n \t"] {
        let outcome = parse_default(raw);
        assert!(outcome.drafts.is_empty());
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].kind, ParseWarningKind::EmptyInput);
    }
}

#[test]
fn year_context_carries_until_overridden() {
    let raw = "2022年\n\n12月30日上午\n年末\n\n12月31日晚上\n跨年\n\n2023年\n\n1月1日凌晨\n新年";
    let outcome = parse_default(raw);

    let years: Vec<i32> = outcome.drafts.iter().map(|d| d.time.year()).collect();
    assert_eq!(years, vec![2022, 2022, 2023]);
    let periods: Vec<Option<Period>> = outcome.drafts.iter().map(|d| d.period).collect();
    assert_eq!(
        periods,
        vec![
            Some(Period::Morning),
            Some(Period::Night),
            Some(Period::EarlyMorning)
        ]
    );
}

#[test]
fn date_before_any_year_is_skipped_with_warning() {
    let raw = "3月1日下午\n孤立的内容\n\n2022年\n3月2日下午\n有年份";
    let outcome = parse_default(raw);

    assert_eq!(outcome.drafts.len(), 1);
    assert_eq!(outcome.drafts[0].title, "有年份");
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].line, 1);
    assert_eq!(
        outcome.warnings[0].kind,
        ParseWarningKind::DateWithoutYear { month: 3, day: 1 }
    );
}

#[test]
fn invalid_calendar_date_is_dropped() {
    let outcome = parse_default("2023年\n2月29日中午\n不存在的日子\n3月1日中午\n存在");

    assert_eq!(outcome.drafts.len(), 1);
    assert_eq!(outcome.drafts[0].title, "存在");
    assert!(outcome.warnings.iter().any(|w| w.kind
        == ParseWarningKind::InvalidDate {
            year: 2023,
            month: 2,
            day: 29
        }));
}

#[test]
fn unrecognized_period_is_stored_as_absent() {
    let outcome = parse_default("2022年\n5月4日某时\n内容");

    assert_eq!(outcome.drafts.len(), 1);
    assert_eq!(outcome.drafts[0].period, None);
    assert_eq!(outcome.drafts[0].time.hour(), 0);
    assert_eq!(
        outcome.warnings[0].kind,
        ParseWarningKind::UnrecognizedPeriod {
            token: "某时".to_string()
        }
    );
}

#[test]
fn fullwidth_year_line_switches_year_context() {
    let outcome = parse_default("2022年\n1月1日上午\nA\n\n２０２３年\n\n1月2日上午\nB");

    assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);
    let years: Vec<i32> = outcome.drafts.iter().map(|d| d.time.year()).collect();
    assert_eq!(years, vec![2022, 2023]);
    assert_eq!(outcome.drafts[0].content, "A");
    assert_eq!(outcome.drafts[1].content, "B");
}

#[test]
fn malformed_year_line_warns_and_clears_year_context() {
    let outcome = parse_default("2022年\n1月1日上午\nA\n22年\n1月2日上午\nB");

    assert_eq!(outcome.drafts.len(), 1);
    assert_eq!(outcome.drafts[0].content, "A");
    let kinds: Vec<(usize, ParseWarningKind)> = outcome
        .warnings
        .into_iter()
        .map(|w| (w.line, w.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (
                4,
                ParseWarningKind::MalformedYear {
                    text: "22年".to_string()
                }
            ),
            (5, ParseWarningKind::DateWithoutYear { month: 1, day: 2 }),
        ]
    );
}

#[test]
fn date_followed_by_prose_stays_in_current_block() {
    let outcome = parse_default("2022年\n3月4日上午\n出门\n3月5日晴\n12月17日的事\n回家");

    assert!(outcome.warnings.is_empty(), "{:?}", outcome.warnings);
    assert_eq!(outcome.drafts.len(), 1);
    assert_eq!(outcome.drafts[0].content, "出门\n3月5日晴\n12月17日的事\n回家");
}

#[test]
fn explicit_clock_overrides_period_time() {
    let outcome = parse_default("2022年\n6月1日下午 16:45\n下午茶");
    let draft = &outcome.drafts[0];
    assert_eq!((draft.time.hour(), draft.time.minute()), (16, 45));
    assert_eq!(draft.period, Some(Period::Afternoon));

    let bad = parse_default("2022年\n6月1日下午 26:00\n下午茶");
    assert_eq!(bad.drafts[0].time.hour(), 15);
    assert_eq!(
        bad.warnings[0].kind,
        ParseWarningKind::InvalidTime {
            clock: "26:00".to_string()
        }
    );
}

#[test]
fn first_line_is_title_and_paragraphs_are_kept() {
    let raw = "2022年\n7月7日傍晚\n\n海边散步\n风很大\n\n\n\n回家吃面\n\n";
    let outcome = parse_default(raw);
    let draft = &outcome.drafts[0];
    assert_eq!(draft.title, "海边散步");
    assert_eq!(draft.content, "海边散步\n风很大\n\n回家吃面");
}

#[test]
fn long_first_line_is_truncated_for_title() {
    let config = ImportConfig {
        title_max_chars: 4,
        ..ImportConfig::default()
    };
    let outcome = parse("2022年\n8月8日中午\n今天去海边散步了", &config);
    assert_eq!(outcome.drafts[0].title, "今天去海");
    assert_eq!(outcome.drafts[0].content, "今天去海边散步了");
}

#[test]
fn empty_block_is_kept_with_header_title_unless_configured() {
    let raw = "2022年\n9月9日早上\n9月10日早上\n有内容";
    let outcome = parse_default(raw);
    assert_eq!(outcome.drafts.len(), 2);
    assert_eq!(outcome.drafts[0].title, "9月9日早上");
    assert_eq!(outcome.drafts[0].content, "");
    assert_eq!(outcome.warnings[0].kind, ParseWarningKind::EmptyContent);
    assert_eq!(outcome.warnings[0].line, 2);

    let config = ImportConfig {
        skip_empty_blocks: true,
        ..ImportConfig::default()
    };
    let skipped = parse(raw, &config);
    assert_eq!(skipped.drafts.len(), 1);
    assert_eq!(skipped.drafts[0].title, "有内容");
}

#[test]
fn text_before_first_date_line_is_ignored() {
    let outcome = parse_default("日记导出\n2022年\n前言\n1月2日下午\n正文");
    assert_eq!(outcome.drafts.len(), 1);
    assert_eq!(outcome.drafts[0].content, "正文");
    assert!(outcome.warnings.is_empty());
}

#[test]
fn default_time_applies_without_period_or_clock() {
    let config = ImportConfig {
        default_time: "08:30".to_string(),
        ..ImportConfig::default()
    };
    let outcome = parse("2022年\n1月3日\n无时段", &config);
    let draft = &outcome.drafts[0];
    assert_eq!((draft.time.hour(), draft.time.minute()), (8, 30));
}

#[test]
fn crlf_and_bom_are_tolerated() {
    let outcome = parse_default("\u{feff}2022年\r\n\r\n12月17日深夜\r\n内容\r\n");
    assert_eq!(outcome.drafts.len(), 1);
    assert_eq!(outcome.drafts[0].content, "内容");
}

#[test]
fn parse_bytes_rejects_non_utf8() {
    let err = parse_bytes(&[0x32, 0x30, 0xff, 0xfe], &ImportConfig::default()).unwrap_err();
    assert_eq!(err, ImportError::NotText { valid_up_to: 2 });

    let ok = parse_bytes("2022年\n1月1日中午\n饺子".as_bytes(), &ImportConfig::default()).unwrap();
    assert_eq!(ok.drafts.len(), 1);
}
