use std::time::{Duration, Instant};

use super::folding::{FoldingTable, Matcher};

/// How long a navigated-to match stays emphasized.
pub const EMPHASIS_WINDOW: Duration = Duration::from_secs(5);

/// A run of text that is either plain or part of a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub is_match: bool,
}

impl Segment {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            is_match: false,
        }
    }

    fn matched(text: &str) -> Self {
        Self {
            text: text.to_string(),
            is_match: true,
        }
    }
}

/// Split `line` into plain and matching segments. Concatenating the segment
/// texts always gives back `line`.
pub fn render_highlighted(line: &str, query: &str, table: &FoldingTable) -> Vec<Segment> {
    let query = query.trim();
    if query.is_empty() {
        return vec![Segment::plain(line)];
    }
    split_matches(line, &table.matcher(query))
}

/// Same as [`render_highlighted`] with an already compiled matcher, for
/// callers that highlight many lines with one query.
pub fn split_matches(line: &str, matcher: &Matcher) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0;
    for range in matcher.find_ranges(line) {
        if range.start > cursor {
            segments.push(Segment::plain(&line[cursor..range.start]));
        }
        segments.push(Segment::matched(&line[range.clone()]));
        cursor = range.end;
    }
    if cursor < line.len() {
        segments.push(Segment::plain(&line[cursor..]));
    }
    if segments.is_empty() {
        segments.push(Segment::plain(line));
    }
    segments
}

/// A single pending expiry. Arming again replaces the previous deadline, so an
/// older request can never clear a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    until: Option<Instant>,
    window: Duration,
}

impl Deadline {
    pub fn new(window: Duration) -> Self {
        Self {
            until: None,
            window,
        }
    }

    pub fn arm(&mut self, now: Instant) {
        self.until = Some(now + self.window);
    }

    pub fn clear(&mut self) {
        self.until = None;
    }

    pub fn is_active(&self, now: Instant) -> bool {
        self.until.is_some_and(|until| now < until)
    }

    /// Drop the deadline if it has passed. Returns `true` exactly once per
    /// expiry.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.until {
            Some(until) if now >= until => {
                self.until = None;
                true
            }
            _ => false,
        }
    }
}

/// Position of one occurrence: the lyric line and which match within that line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchLocation {
    pub line: usize,
    pub occurrence: usize,
}

/// Walks the matches of a query through a hymn's lines, wrapping at both ends,
/// and keeps the current match emphasized for a short while after each move.
#[derive(Debug, Clone)]
pub struct MatchCursor {
    matches: Vec<MatchLocation>,
    index: Option<usize>,
    emphasis: Deadline,
}

impl Default for MatchCursor {
    fn default() -> Self {
        Self::empty()
    }
}

impl MatchCursor {
    pub fn empty() -> Self {
        Self {
            matches: Vec::new(),
            index: None,
            emphasis: Deadline::new(EMPHASIS_WINDOW),
        }
    }

    /// Count the matches of `query` in `lines` and focus the first one.
    pub fn new<S: AsRef<str>>(lines: &[S], query: &str, table: &FoldingTable, now: Instant) -> Self {
        let mut cursor = Self::empty();
        let query = query.trim();
        if query.is_empty() {
            return cursor;
        }

        let matcher = table.matcher(query);
        for (line_idx, line) in lines.iter().enumerate() {
            let found = matcher.find_ranges(line.as_ref()).len();
            cursor.matches.extend((0..found).map(|occurrence| MatchLocation {
                line: line_idx,
                occurrence,
            }));
        }

        cursor.go_to(0, now);
        cursor
    }

    pub fn count(&self) -> usize {
        self.matches.len()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn current(&self) -> Option<MatchLocation> {
        self.index.and_then(|idx| self.matches.get(idx).copied())
    }

    /// Jump to `index`, wrapping into range. Does nothing without matches.
    pub fn go_to(&mut self, index: isize, now: Instant) -> Option<MatchLocation> {
        let count = self.matches.len();
        if count == 0 {
            return None;
        }
        let wrapped = index.rem_euclid(count as isize) as usize;
        self.index = Some(wrapped);
        self.emphasis.arm(now);
        self.current()
    }

    pub fn next(&mut self, now: Instant) -> Option<MatchLocation> {
        let target = self.index.map_or(0, |idx| idx as isize + 1);
        self.go_to(target, now)
    }

    pub fn prev(&mut self, now: Instant) -> Option<MatchLocation> {
        let target = self.index.map_or(-1, |idx| idx as isize - 1);
        self.go_to(target, now)
    }

    pub fn is_emphasized(&self, now: Instant) -> bool {
        self.index.is_some() && self.emphasis.is_active(now)
    }

    /// Clear an emphasis whose window has passed. Returns `true` when
    /// something changed and the view should redraw.
    pub fn expire(&mut self, now: Instant) -> bool {
        self.emphasis.expire(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(segments: &[Segment]) -> String {
        segments.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn shared_matcher_splits_like_a_fresh_query() {
        let table = FoldingTable::default();
        let matcher = table.matcher("holy");
        for line in ["Holy, holy, holy", "no match here", ""] {
            assert_eq!(
                split_matches(line, &matcher),
                render_highlighted(line, "holy", &table)
            );
        }
    }

    #[test]
    fn blank_query_yields_the_whole_line() {
        let table = FoldingTable::default();
        let segments = render_highlighted("Amazing grace", "  ", &table);
        assert_eq!(segments, vec![Segment::plain("Amazing grace")]);
        assert_eq!(render_highlighted("", "", &table), vec![Segment::plain("")]);
    }

    #[test]
    fn segments_reconstruct_the_line() {
        let table = FoldingTable::default();
        let lines = [
            "Amazing grace! How sweet the sound",
            "grace",
            "no hit here",
            "",
            "أنا كالخزف بين يديك",
        ];
        for line in lines {
            for query in ["grace", "a", "أ", "ي", "zzz", "("] {
                assert_eq!(joined(&render_highlighted(line, query, &table)), line);
            }
        }
    }

    #[test]
    fn matches_keep_their_original_case() {
        let segments = render_highlighted("Grace, grace", "GRACE", &FoldingTable::default());
        let hits: Vec<&str> = segments
            .iter()
            .filter(|s| s.is_match)
            .map(|s| s.text.as_str())
            .collect();
        assert_eq!(hits, vec!["Grace", "grace"]);
    }

    #[test]
    fn folded_query_highlights_other_letter_forms() {
        let line = "أنا لست أرجو منك شيئاً";
        let segments = render_highlighted(line, "انا", &FoldingTable::default());
        assert_eq!(segments[0], Segment::matched("أنا"));
        assert_eq!(joined(&segments), line);

        let yeh = render_highlighted("على", "علي", &FoldingTable::default());
        assert_eq!(yeh, vec![Segment::matched("على")]);
    }

    #[test]
    fn cursor_wraps_in_both_directions() {
        let now = Instant::now();
        let lines = ["holy holy", "holy"];
        let mut cursor = MatchCursor::new(&lines, "holy", &FoldingTable::default(), now);
        assert_eq!(cursor.count(), 3);
        assert_eq!(cursor.index(), Some(0));

        cursor.go_to(2, now);
        assert_eq!(cursor.next(now).map(|m| m.line), Some(0));
        assert_eq!(cursor.index(), Some(0));
        assert_eq!(
            cursor.prev(now),
            Some(MatchLocation {
                line: 1,
                occurrence: 0
            })
        );
        assert_eq!(cursor.index(), Some(2));
    }

    #[test]
    fn cursor_without_matches_is_inert() {
        let now = Instant::now();
        let mut cursor = MatchCursor::new(&["abc"], "zzz", &FoldingTable::default(), now);
        assert_eq!(cursor.count(), 0);
        assert_eq!(cursor.next(now), None);
        assert_eq!(cursor.prev(now), None);
        assert_eq!(cursor.index(), None);
        assert!(!cursor.is_emphasized(now));
    }

    #[test]
    fn emphasis_expires_after_window() {
        let start = Instant::now();
        let mut cursor = MatchCursor::new(&["grace"], "grace", &FoldingTable::default(), start);
        assert!(cursor.is_emphasized(start));
        assert!(!cursor.expire(start + Duration::from_secs(4)));
        assert!(cursor.expire(start + EMPHASIS_WINDOW));
        assert!(!cursor.is_emphasized(start + EMPHASIS_WINDOW));
        assert!(!cursor.expire(start + Duration::from_secs(6)));
    }

    #[test]
    fn new_navigation_supersedes_pending_expiry() {
        let start = Instant::now();
        let lines = ["grace grace"];
        let mut cursor = MatchCursor::new(&lines, "grace", &FoldingTable::default(), start);
        let later = start + Duration::from_secs(4);
        cursor.next(later);

        let old_deadline = start + EMPHASIS_WINDOW;
        assert!(!cursor.expire(old_deadline));
        assert!(cursor.is_emphasized(old_deadline));
        assert!(cursor.expire(later + EMPHASIS_WINDOW));
    }
}
