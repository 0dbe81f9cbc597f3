use std::collections::HashSet;
use timeline_core::{
    parse_canonical_time, EventDraft, EventFilter, EventPatch, EventRepository,
    EventValidationError, InMemoryEventRepository, Period, RepoError,
};

fn draft(title: &str, time: &str, period: Option<Period>) -> EventDraft {
    let mut draft = EventDraft::new(title, parse_canonical_time(time).unwrap());
    draft.content = format!("Event {title}");
    draft.period = period;
    draft
}

fn seeded() -> InMemoryEventRepository {
    let mut repo = InMemoryEventRepository::new();
    repo.insert(draft("2023 Event", "2023-01-01T12:00", Some(Period::Afternoon)))
        .unwrap();
    repo.insert(draft("2022 Event", "2022-12-01T12:00", Some(Period::Morning)))
        .unwrap();
    repo.insert(draft("2022 Early", "2022-03-05T09:00", Some(Period::Morning)))
        .unwrap();
    repo
}

#[test]
fn list_without_filter_orders_by_time_then_id() {
    let mut repo = seeded();
    repo.insert(draft("tie", "2022-12-01T12:00", None)).unwrap();

    let titles: Vec<String> = repo
        .list(&EventFilter::default())
        .into_iter()
        .map(|event| event.title)
        .collect();
    assert_eq!(
        titles,
        vec!["2022 Early", "2022 Event", "tie", "2023 Event"]
    );
}

#[test]
fn year_filter_returns_exact_subset_and_is_stable() {
    let repo = seeded();

    let first = repo.list(&EventFilter::for_year(2022));
    let second = repo.list(&EventFilter::for_year(2022));
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert!(first.iter().all(|event| event.title.starts_with("2022")));

    let only_2023 = repo.list(&EventFilter::for_year(2023));
    assert_eq!(only_2023.len(), 1);
    assert_eq!(only_2023[0].title, "2023 Event");
    assert!(repo.list(&EventFilter::for_year(1999)).is_empty());
}

#[test]
fn filters_combine_with_and() {
    let mut repo = seeded();
    let mut at_harbor = draft("harbor", "2022-06-01T15:00", Some(Period::Afternoon));
    at_harbor.location = "Old Harbor".to_string();
    repo.insert(at_harbor).unwrap();

    let filter = EventFilter {
        year: Some(2022),
        period: Some(Period::Afternoon),
        location_contains: Some("harbor".to_string()),
        ..EventFilter::default()
    };
    let matched = repo.list(&filter);
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].title, "harbor");

    let by_period = EventFilter {
        period: Some(Period::Morning),
        ..EventFilter::default()
    };
    assert_eq!(repo.list(&by_period).len(), 2);
}

#[test]
fn date_range_is_inclusive_start_exclusive_end() {
    let repo = seeded();
    let filter = EventFilter {
        from: parse_canonical_time("2022-12-01T12:00"),
        until: parse_canonical_time("2023-01-01T12:00"),
        ..EventFilter::default()
    };
    let matched = repo.list(&filter);
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].title, "2022 Event");
}

#[test]
fn text_filter_matches_title_or_content_case_insensitively() {
    let repo = seeded();
    let filter = EventFilter {
        text: Some("EARLY".to_string()),
        ..EventFilter::default()
    };
    let matched = repo.list(&filter);
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].title, "2022 Early");
}

#[test]
fn removed_id_never_reappears_and_second_remove_is_not_found() {
    let mut repo = seeded();
    let id = repo
        .insert(draft("temp", "2022-07-01T10:00", None))
        .unwrap();

    assert!(repo.remove(id));
    assert!(!repo.remove(id));
    assert!(repo.get(id).is_none());
    assert!(repo
        .list(&EventFilter::default())
        .iter()
        .all(|event| event.id != id));

    let next = repo.insert(draft("next", "2022-07-02T10:00", None)).unwrap();
    assert!(next > id);
}

#[test]
fn ids_are_unique_across_inserts() {
    let mut repo = InMemoryEventRepository::new();
    let mut seen = HashSet::new();
    for day in 1..=20 {
        let id = repo
            .insert(draft("bulk", &format!("2022-01-{day:02}T08:00"), None))
            .unwrap();
        assert!(seen.insert(id));
    }
    assert_eq!(repo.len(), 20);
}

#[test]
fn update_unknown_id_returns_false_and_keeps_store_intact() {
    let mut repo = seeded();
    let before = repo.list(&EventFilter::default());

    let patch = EventPatch {
        title: Some("ghost".to_string()),
        ..EventPatch::default()
    };
    assert_eq!(repo.update(999, &patch), Ok(false));
    assert_eq!(repo.list(&EventFilter::default()), before);
}

#[test]
fn update_moves_event_between_years() {
    let mut repo = seeded();
    let id = repo.list(&EventFilter::for_year(2023))[0].id;

    let patch = EventPatch {
        time: parse_canonical_time("2021-05-05T05:05"),
        ..EventPatch::default()
    };
    assert_eq!(repo.update(id, &patch), Ok(true));
    assert!(repo.list(&EventFilter::for_year(2023)).is_empty());
    assert_eq!(repo.list(&EventFilter::for_year(2021))[0].id, id);
    assert_eq!(repo.years(), vec![2021, 2022]);
}

#[test]
fn update_rejecting_blank_title_leaves_record_unchanged() {
    let mut repo = seeded();
    let original = repo.list(&EventFilter::default())[0].clone();

    let patch = EventPatch {
        title: Some("  ".to_string()),
        ..EventPatch::default()
    };
    assert_eq!(
        repo.update(original.id, &patch),
        Err(RepoError::Validation(EventValidationError::EmptyTitle))
    );
    assert_eq!(repo.get(original.id), Some(original));
}

#[test]
fn inserted_record_roundtrips_field_for_field() {
    let mut repo = InMemoryEventRepository::new();
    let mut input = draft("roundtrip", "2024-02-29T23:00", Some(Period::LateNight));
    input.location = "Rooftop".to_string();
    input.image = "photos/rooftop.jpg".to_string();

    let id = repo.insert(input.clone()).unwrap();
    let fetched = repo.list(&EventFilter::for_year(2024));
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].id, id);
    assert_eq!(fetched[0].to_draft(), input);
}

#[test]
fn restore_keeps_ids_and_advances_counter() {
    let mut source = seeded();
    let events = source.list(&EventFilter::default());
    source.remove(events[0].id);

    let mut target = InMemoryEventRepository::new();
    let snapshot = source.list(&EventFilter::default());
    assert_eq!(target.restore(snapshot).unwrap(), 2);
    let max_id = target
        .list(&EventFilter::default())
        .iter()
        .map(|event| event.id)
        .max()
        .unwrap();

    let fresh = target.insert(draft("fresh", "2022-01-01T00:00", None)).unwrap();
    assert!(fresh > max_id);

    let duplicate = target.get(max_id).unwrap();
    assert_eq!(
        target.restore(vec![duplicate]),
        Err(RepoError::DuplicateId(max_id))
    );
}

#[test]
fn restore_rejects_removed_id() {
    let mut repo = InMemoryEventRepository::new();
    let id = repo.insert(draft("gone", "2022-01-01T00:00", None)).unwrap();
    let removed = repo.get(id).unwrap();
    assert!(repo.remove(id));

    assert_eq!(repo.restore(vec![removed]), Err(RepoError::RetiredId(id)));
    assert_eq!(repo.get(id), None);
    assert!(repo.is_empty());
}

#[test]
fn restore_with_repeated_id_stores_nothing() {
    let mut source = InMemoryEventRepository::new();
    let id = source.insert(draft("first", "2022-01-01T00:00", None)).unwrap();
    let event = source.get(id).unwrap();
    let mut twin = event.clone();
    twin.title = "second".to_string();

    let mut target = InMemoryEventRepository::new();
    assert_eq!(
        target.restore(vec![event, twin]),
        Err(RepoError::DuplicateId(id))
    );
    assert!(target.is_empty());
    assert_eq!(target.insert(draft("next", "2022-01-02T00:00", None)).unwrap(), 1);
}
