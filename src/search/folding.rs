use std::ops::Range;

use regex::{Regex, RegexBuilder};
use tracing::debug;

/// Alef variants that readers type interchangeably.
const ALEF_FORMS: [char; 4] = ['ا', 'أ', 'إ', 'آ'];
/// Yeh and alef maksura.
const YEH_FORMS: [char; 2] = ['ي', 'ى'];

/// Groups of characters treated as the same letter when matching.
///
/// The matching code never looks at which script a class belongs to; it only
/// asks the table whether a query character has interchangeable forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldingTable {
    classes: Vec<Vec<char>>,
}

impl Default for FoldingTable {
    fn default() -> Self {
        Self::arabic()
    }
}

impl FoldingTable {
    /// A table without any classes: every character only matches itself
    /// (modulo case).
    pub fn empty() -> Self {
        Self {
            classes: Vec::new(),
        }
    }

    /// The alef and yeh classes.
    pub fn arabic() -> Self {
        Self::empty()
            .with_class(ALEF_FORMS)
            .with_class(YEH_FORMS)
    }

    /// Add a class. Classes with fewer than two distinct characters change
    /// nothing and are dropped. Existing classes that share a character with
    /// the new one are merged into it, so classes stay disjoint and folding
    /// stays symmetric.
    pub fn with_class(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        let mut class: Vec<char> = Vec::new();
        push_distinct(&mut class, chars);
        if class.len() < 2 {
            return self;
        }

        let (overlapping, disjoint): (Vec<_>, Vec<_>) = self
            .classes
            .into_iter()
            .partition(|existing| existing.iter().any(|ch| class.contains(ch)));
        let mut merged: Vec<char> = Vec::new();
        push_distinct(&mut merged, overlapping.into_iter().flatten());
        push_distinct(&mut merged, class);

        self.classes = disjoint;
        self.classes.push(merged);
        self
    }

    pub fn classes(&self) -> &[Vec<char>] {
        &self.classes
    }

    /// The class containing `ch`.
    pub fn class_of(&self, ch: char) -> Option<&[char]> {
        self.classes
            .iter()
            .find(|class| class.contains(&ch))
            .map(Vec::as_slice)
    }

    /// Regex source for `query`: folded characters become a character class,
    /// everything else is escaped.
    pub fn pattern_for(&self, query: &str) -> String {
        let mut pattern = String::with_capacity(query.len() * 2);
        let mut buf = [0u8; 4];
        for ch in query.chars() {
            match self.class_of(ch) {
                Some(class) => {
                    pattern.push('[');
                    for member in class {
                        pattern.push_str(&regex::escape(member.encode_utf8(&mut buf)));
                    }
                    pattern.push(']');
                }
                None => pattern.push_str(&regex::escape(ch.encode_utf8(&mut buf))),
            }
        }
        pattern
    }

    /// Build a case-insensitive matcher for an already trimmed query.
    pub fn matcher(&self, query: &str) -> Matcher {
        let pattern = self.pattern_for(query);
        match RegexBuilder::new(&pattern).case_insensitive(true).build() {
            Ok(regex) => Matcher::Pattern(regex),
            Err(err) => {
                debug!(error = %err, "query pattern rejected, using literal match");
                Matcher::literal(query)
            }
        }
    }
}

/// Compiled form of a search query.
#[derive(Debug, Clone)]
pub enum Matcher {
    Pattern(Regex),
    /// Case-insensitive literal comparison, used when the pattern cannot be
    /// compiled.
    Literal(Vec<char>),
}

impl Matcher {
    pub fn literal(query: &str) -> Self {
        Matcher::Literal(query.chars().collect())
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        match self {
            Matcher::Pattern(regex) => regex.is_match(haystack),
            Matcher::Literal(needle) => !find_literal(haystack, needle).is_empty(),
        }
    }

    /// Byte ranges of every non-overlapping match, left to right.
    pub fn find_ranges(&self, haystack: &str) -> Vec<Range<usize>> {
        match self {
            Matcher::Pattern(regex) => regex
                .find_iter(haystack)
                .filter(|m| !m.is_empty())
                .map(|m| m.range())
                .collect(),
            Matcher::Literal(needle) => find_literal(haystack, needle),
        }
    }
}

fn push_distinct(class: &mut Vec<char>, chars: impl IntoIterator<Item = char>) {
    for ch in chars {
        if !class.contains(&ch) {
            class.push(ch);
        }
    }
}

fn find_literal(haystack: &str, needle: &[char]) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    if needle.is_empty() {
        return ranges;
    }

    let mut start = 0;
    while start < haystack.len() {
        let rest = &haystack[start..];
        if let Some(len) = literal_match_len(rest, needle) {
            ranges.push(start..start + len);
            start += len;
        } else {
            start += rest.chars().next().map_or(1, char::len_utf8);
        }
    }
    ranges
}

fn literal_match_len(text: &str, needle: &[char]) -> Option<usize> {
    let mut chars = text.char_indices();
    for &expected in needle {
        let (_, actual) = chars.next()?;
        if !same_letter(actual, expected) {
            return None;
        }
    }
    Some(chars.next().map_or(text.len(), |(idx, _)| idx))
}

fn same_letter(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folded_characters_become_classes() {
        let table = FoldingTable::arabic();
        assert_eq!(table.pattern_for("أ"), "[اأإآ]");
        assert_eq!(table.pattern_for("ى"), "[يى]");
        assert_eq!(table.pattern_for("a.b"), r"a\.b");
    }

    #[test]
    fn metacharacters_match_literally() {
        let matcher = FoldingTable::arabic().matcher("(a+)");
        assert!(matcher.is_match("x (A+) y"));
        assert!(!matcher.is_match("aaa"));
    }

    #[test]
    fn extra_class_folds_both_members() {
        let table = FoldingTable::arabic().with_class(['ة', 'ه']);
        let matcher = table.matcher("محبه");
        assert!(matcher.is_match("كلك محبة"));
    }

    #[test]
    fn overlapping_class_is_merged() {
        let table = FoldingTable::arabic().with_class(['ا', 'ه']);
        assert_eq!(table.classes().len(), 2);
        assert_eq!(table.class_of('ه'), table.class_of('آ'));
        assert_eq!(table.pattern_for("ا"), "[اأإآه]");

        assert!(table.matcher("ا").is_match("ه"));
        assert!(table.matcher("ه").is_match("ا"));
        assert!(table.matcher("ه").is_match("إ"));
    }

    #[test]
    fn class_bridging_two_classes_joins_them() {
        let table = FoldingTable::arabic().with_class(['أ', 'ى']);
        assert_eq!(table.classes().len(), 1);
        assert!(table.matcher("ي").is_match("آ"));
    }

    #[test]
    fn single_member_class_is_ignored() {
        let table = FoldingTable::empty().with_class(['x', 'x']);
        assert!(table.classes().is_empty());
    }

    #[test]
    fn literal_matcher_is_case_insensitive() {
        let matcher = Matcher::literal("GRACE");
        assert_eq!(matcher.find_ranges("Amazing grace, grace"), vec![8..13, 15..20]);
    }

    #[test]
    fn literal_matcher_handles_multibyte_text() {
        let matcher = Matcher::literal("رب");
        let text = "يا رب مجدك";
        let ranges = matcher.find_ranges(text);
        assert_eq!(ranges.len(), 1);
        assert_eq!(&text[ranges[0].clone()], "رب");
    }
}
