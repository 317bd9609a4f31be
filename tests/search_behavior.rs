use std::time::{Duration, Instant};

use choir_hymn_reader::search::{MatchLocation, Segment, EMPHASIS_WINDOW};
use choir_hymn_reader::models::RecordId;
use choir_hymn_reader::{filter_hymns, render_highlighted, FoldingTable, Hymn, MatchCursor};

fn ids(hymns: &[&Hymn]) -> Vec<RecordId> {
    hymns.iter().map(|hymn| hymn.id.clone()).collect()
}

fn joined(segments: &[Segment]) -> String {
    segments.iter().map(|segment| segment.text.as_str()).collect()
}

#[test]
fn alef_forms_match_each_other() {
    let table = FoldingTable::default();
    let hymns = vec![
        Hymn::new(1, "أحمد", "ترنيمة"),
        Hymn::new(2, "إيمان", "سلام"),
        Hymn::new(3, "Other", "نور"),
    ];

    assert_eq!(ids(&filter_hymns(&hymns, "احمد", &table)), vec![RecordId::from(1)]);
    assert_eq!(ids(&filter_hymns(&hymns, "ايمان", &table)), vec![RecordId::from(2)]);
}

#[test]
fn filter_keeps_catalog_order_and_searches_lyrics() {
    let table = FoldingTable::default();
    let hymns = vec![
        Hymn::new(1, "A", "first"),
        Hymn::new(2, "B", "second"),
        Hymn::new(3, "AB", "third"),
    ];
    let titles: Vec<&str> = filter_hymns(&hymns, "a", &table)
        .iter()
        .map(|h| h.title.as_str())
        .collect();
    assert_eq!(titles, vec!["A", "AB"]);

    assert_eq!(ids(&filter_hymns(&hymns, "SECOND", &table)), vec![RecordId::from(2)]);
    assert_eq!(filter_hymns(&hymns, "   ", &table).len(), 3);
}

#[test]
fn highlighting_never_changes_the_text() {
    let table = FoldingTable::default();
    let lines = [
        "Amazing grace, how sweet the sound",
        "يا أبانا الذي في السماوات",
        "(x) [y] *z*",
        "",
    ];
    for line in lines {
        for query in ["a", "ابانا", "(", "*", "grace", "zzz"] {
            assert_eq!(joined(&render_highlighted(line, query, &table)), line);
        }
    }
}

#[test]
fn highlight_marks_folded_matches() {
    let segments = render_highlighted("يا أبانا", "ابانا", &FoldingTable::default());
    assert_eq!(
        segments,
        vec![
            Segment { text: "يا ".to_string(), is_match: false },
            Segment { text: "أبانا".to_string(), is_match: true },
        ]
    );
}

#[test]
fn match_cursor_wraps_and_emphasis_expires() {
    let table = FoldingTable::default();
    let lines = ["holy holy", "", "holy"];
    let start = Instant::now();
    let mut cursor = MatchCursor::new(&lines, "holy", &table, start);

    assert_eq!(cursor.count(), 3);
    assert_eq!(cursor.current(), Some(MatchLocation { line: 0, occurrence: 0 }));
    assert_eq!(cursor.prev(start), Some(MatchLocation { line: 2, occurrence: 0 }));
    assert_eq!(cursor.next(start), Some(MatchLocation { line: 0, occurrence: 0 }));
    assert_eq!(cursor.next(start), Some(MatchLocation { line: 0, occurrence: 1 }));

    let later = start + Duration::from_secs(3);
    cursor.next(later);
    assert!(cursor.is_emphasized(start + EMPHASIS_WINDOW));
    assert!(!cursor.is_emphasized(later + EMPHASIS_WINDOW));
}

#[test]
fn empty_query_has_no_matches() {
    let cursor = MatchCursor::new(&["anything"], "  ", &FoldingTable::default(), Instant::now());
    assert_eq!(cursor.count(), 0);
    assert_eq!(cursor.current(), None);
}

#[test]
fn overlapping_fold_classes_match_in_both_directions() {
    let table = FoldingTable::default().with_class(['ا', 'ه']);
    let hymns = vec![Hymn::new(1, "ه", ""), Hymn::new(2, "ا", ""), Hymn::new(3, "أ", "")];
    let all = vec![RecordId::from(1), RecordId::from(2), RecordId::from(3)];

    assert_eq!(ids(&filter_hymns(&hymns, "ه", &table)), all);
    assert_eq!(ids(&filter_hymns(&hymns, "ا", &table)), all);
    assert_eq!(ids(&filter_hymns(&hymns, "إ", &table)), all);
}
