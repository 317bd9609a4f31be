use std::cell::Cell;
use std::cmp::min;
use std::time::{Duration, Instant};

use crate::models::{Hymn, RecordId};
use crate::nav::View;
use crate::search::{
    split_matches, Deadline, FoldingTable, MatchCursor, MatchLocation, Matcher, Segment,
};

/// How long a search term carried over from the hymn list stays applied in
/// the reader before it clears itself.
const SEED_WINDOW: Duration = Duration::from_secs(5);

/// Menu entries in display order.
pub(crate) const MENU_ITEMS: [(View, &str, &str); 4] = [
    (View::Members, "Little Angel", "فريق الكورال"),
    (View::HymnList, "نغمة أجيال", "كلمات ترانيم الحفلة"),
    (View::Videos, "ترانيم الكورال", "Choir videos"),
    (View::Photos, "صور الكورال", "Choir photos"),
];

/// Cursor over a vertical list whose length can change between frames.
#[derive(Default)]
pub(crate) struct ListCursor {
    pub(crate) selected: usize,
}

impl ListCursor {
    pub(crate) fn move_selection(&mut self, offset: isize, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        let mut new = self.selected as isize + offset;
        if new < 0 {
            new = 0;
        }
        if new >= len as isize {
            new = len as isize - 1;
        }
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    pub(crate) fn ensure_in_bounds(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    /// First index to draw so the selection stays inside `capacity` rows.
    pub(crate) fn window_start(&self, capacity: usize, len: usize) -> usize {
        let capacity = capacity.max(1);
        let mut start = if self.selected >= capacity {
            self.selected + 1 - capacity
        } else {
            0
        };
        if start + capacity > len {
            start = len.saturating_sub(capacity);
        }
        start
    }
}

/// Selection inside the photo grid.
pub(crate) struct GridCursor {
    pub(crate) selected: usize,
    columns: usize,
}

impl GridCursor {
    pub(crate) fn new(columns: usize) -> Self {
        Self {
            selected: 0,
            columns: columns.max(1),
        }
    }

    pub(crate) fn columns(&self) -> usize {
        self.columns
    }

    pub(crate) fn move_horizontal(&mut self, offset: isize, len: usize) {
        if len == 0 {
            return;
        }
        let new = self.selected as isize + offset;
        if (0..len as isize).contains(&new) {
            self.selected = new as usize;
        }
    }

    pub(crate) fn move_vertical(&mut self, offset: isize, len: usize) {
        if len == 0 {
            return;
        }
        let new = self.selected as isize + offset * self.columns as isize;
        if new < 0 {
            self.selected %= self.columns;
        } else {
            self.selected = min(new as usize, len - 1);
        }
    }
}

/// In-hymn search and scroll state for the detail view.
pub(crate) struct ReaderScreen {
    pub(crate) hymn_id: Option<RecordId>,
    pub(crate) query: String,
    pub(crate) cursor: MatchCursor,
    /// `query` compiled once per edit; `None` while the query is blank.
    matcher: Option<Matcher>,
    pub(crate) scroll: u16,
    /// Query carried over from the list, cleared after [`SEED_WINDOW`] unless
    /// the reader edits it first.
    seeded: Option<String>,
    seed_expiry: Deadline,
    /// Height of the lyrics area at the last draw.
    pub(crate) viewport: Cell<u16>,
}

impl Default for ReaderScreen {
    fn default() -> Self {
        Self {
            hymn_id: None,
            query: String::new(),
            cursor: MatchCursor::empty(),
            matcher: None,
            scroll: 0,
            seeded: None,
            seed_expiry: Deadline::new(SEED_WINDOW),
            viewport: Cell::new(0),
        }
    }
}

impl ReaderScreen {
    /// Reset for a newly shown hymn, pre-filling the list's search term.
    pub(crate) fn open(
        &mut self,
        hymn: &Hymn,
        list_term: &str,
        table: &FoldingTable,
        spacing: u16,
        now: Instant,
    ) {
        self.hymn_id = Some(hymn.id.clone());
        self.scroll = 0;
        self.seed_expiry.clear();
        self.seeded = None;

        let term = list_term.trim();
        if term.is_empty() {
            self.query.clear();
            self.cursor = MatchCursor::empty();
            self.matcher = None;
            return;
        }

        self.query = term.to_string();
        self.seeded = Some(self.query.clone());
        self.seed_expiry.arm(now);
        self.rebuild(hymn, table, spacing, now);
    }

    pub(crate) fn close(&mut self) {
        self.hymn_id = None;
        self.query.clear();
        self.cursor = MatchCursor::empty();
        self.matcher = None;
        self.seeded = None;
        self.seed_expiry.clear();
    }

    /// Re-run the query after it was edited.
    pub(crate) fn set_query(
        &mut self,
        query: String,
        hymn: &Hymn,
        table: &FoldingTable,
        spacing: u16,
        now: Instant,
    ) {
        self.query = query;
        self.rebuild(hymn, table, spacing, now);
    }

    pub(crate) fn next_match(&mut self, spacing: u16, now: Instant) -> Option<MatchLocation> {
        let location = self.cursor.next(now);
        self.follow(location, spacing);
        location
    }

    pub(crate) fn prev_match(&mut self, spacing: u16, now: Instant) -> Option<MatchLocation> {
        let location = self.cursor.prev(now);
        self.follow(location, spacing);
        location
    }

    /// Highlight segments for one lyric line under the current query.
    pub(crate) fn segments(&self, line: &str) -> Vec<Segment> {
        match &self.matcher {
            Some(matcher) => split_matches(line, matcher),
            None => vec![Segment {
                text: line.to_string(),
                is_match: false,
            }],
        }
    }

    pub(crate) fn scroll_by(&mut self, delta: i32) {
        let next = (self.scroll as i32 + delta).max(0);
        self.scroll = next.min(u16::MAX as i32) as u16;
    }

    /// Drop timed state that has run out. Returns `true` if the screen changed.
    pub(crate) fn tick(&mut self, hymn: Option<&Hymn>, table: &FoldingTable, now: Instant) -> bool {
        let mut changed = self.cursor.expire(now);
        if self.seed_expiry.expire(now) {
            if let (Some(seed), Some(hymn)) = (self.seeded.take(), hymn) {
                if seed == self.query {
                    self.set_query(String::new(), hymn, table, 0, now);
                    changed = true;
                }
            }
        }
        changed
    }

    fn rebuild(&mut self, hymn: &Hymn, table: &FoldingTable, spacing: u16, now: Instant) {
        if self.seeded.as_deref() != Some(self.query.as_str()) {
            self.seeded = None;
            self.seed_expiry.clear();
        }
        let query = self.query.trim();
        self.matcher = (!query.is_empty()).then(|| table.matcher(query));
        self.cursor = MatchCursor::new(&hymn.lines(), &self.query, table, now);
        let current = self.cursor.current();
        self.follow(current, spacing);
    }

    /// Scroll so the line holding `location` sits mid-screen.
    fn follow(&mut self, location: Option<MatchLocation>, spacing: u16) {
        if let Some(location) = location {
            let row = location.line as u32 * (1 + spacing as u32);
            let half = (self.viewport.get() / 2) as u32;
            self.scroll = row.saturating_sub(half).min(u16::MAX as u32) as u16;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_cursor_clamps_to_bounds() {
        let mut cursor = ListCursor::default();
        cursor.move_selection(5, 3);
        assert_eq!(cursor.selected, 2);
        cursor.move_selection(-10, 3);
        assert_eq!(cursor.selected, 0);
        cursor.select_last(3);
        cursor.ensure_in_bounds(1);
        assert_eq!(cursor.selected, 0);
    }

    #[test]
    fn window_keeps_selection_visible() {
        let cursor = ListCursor { selected: 7 };
        assert_eq!(cursor.window_start(3, 10), 5);
        assert_eq!(cursor.window_start(20, 10), 0);
    }

    #[test]
    fn grid_moves_by_rows() {
        let mut grid = GridCursor::new(4);
        grid.move_vertical(1, 10);
        assert_eq!(grid.selected, 4);
        grid.move_vertical(1, 10);
        assert_eq!(grid.selected, 8);
        grid.move_vertical(1, 10);
        assert_eq!(grid.selected, 9);
        grid.move_horizontal(1, 10);
        assert_eq!(grid.selected, 9);
        grid.move_vertical(-5, 10);
        assert_eq!(grid.selected, 1);
    }

    #[test]
    fn seeded_query_clears_after_window() {
        let table = FoldingTable::default();
        let hymn = Hymn::new(2, "Amazing Grace", "Amazing grace\nhow sweet");
        let start = Instant::now();
        let mut reader = ReaderScreen::default();
        reader.open(&hymn, " grace ", &table, 0, start);
        assert_eq!(reader.query, "grace");
        assert_eq!(reader.cursor.count(), 1);

        assert!(!reader.tick(Some(&hymn), &table, start + Duration::from_secs(1)));
        assert!(reader.tick(Some(&hymn), &table, start + SEED_WINDOW));
        assert!(reader.query.is_empty());
        assert_eq!(reader.cursor.count(), 0);
    }

    #[test]
    fn edited_query_survives_seed_expiry() {
        let table = FoldingTable::default();
        let hymn = Hymn::new(2, "Amazing Grace", "Amazing grace\nhow sweet");
        let start = Instant::now();
        let mut reader = ReaderScreen::default();
        reader.open(&hymn, "grace", &table, 0, start);
        reader.set_query("sweet".to_string(), &hymn, &table, 0, start);

        reader.tick(Some(&hymn), &table, start + SEED_WINDOW);
        assert_eq!(reader.query, "sweet");
        assert_eq!(reader.cursor.count(), 1);
    }

    #[test]
    fn cached_matcher_follows_query_edits() {
        let table = FoldingTable::default();
        let hymn = Hymn::new(2, "Amazing Grace", "Amazing grace\nhow sweet");
        let now = Instant::now();
        let mut reader = ReaderScreen::default();
        reader.open(&hymn, "", &table, 0, now);
        assert_eq!(reader.segments("how sweet").len(), 1);

        reader.set_query("sweet".to_string(), &hymn, &table, 0, now);
        let segments = reader.segments("how sweet");
        assert_eq!(segments.len(), 2);
        assert!(segments[1].is_match);

        reader.set_query(" ".to_string(), &hymn, &table, 0, now);
        assert!(reader.segments("how sweet").iter().all(|segment| !segment.is_match));
    }

    #[test]
    fn match_navigation_scrolls_to_line() {
        let table = FoldingTable::default();
        let lyrics = (0..40).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let hymn = Hymn::new(1, "Long", lyrics + "\ntarget");
        let now = Instant::now();
        let mut reader = ReaderScreen::default();
        reader.viewport.set(10);
        reader.set_query("target".to_string(), &hymn, &table, 0, now);
        assert_eq!(reader.scroll, 35);
    }
}
