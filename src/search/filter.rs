use crate::models::Hymn;

use super::folding::FoldingTable;

/// Hymns whose title or lyrics match `query`, in their original order.
///
/// A blank query keeps everything. Matching is case-insensitive and folds the
/// letter forms registered in `table`.
pub fn filter_hymns<'a>(hymns: &'a [Hymn], query: &str, table: &FoldingTable) -> Vec<&'a Hymn> {
    let query = query.trim();
    if query.is_empty() {
        return hymns.iter().collect();
    }

    let matcher = table.matcher(query);
    hymns
        .iter()
        .filter(|hymn| matcher.is_match(&hymn.title) || matcher.is_match(&hymn.plain_lyrics()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles<'a>(hymns: &[&'a Hymn]) -> Vec<&'a str> {
        hymns.iter().map(|h| h.title.as_str()).collect()
    }

    fn sample() -> Vec<Hymn> {
        vec![
            Hymn::new(1, "A", ""),
            Hymn::new(2, "B", ""),
            Hymn::new(3, "AB", ""),
        ]
    }

    #[test]
    fn blank_query_keeps_everything_in_order() {
        let hymns = sample();
        let table = FoldingTable::default();
        assert_eq!(titles(&filter_hymns(&hymns, "", &table)), vec!["A", "B", "AB"]);
        assert_eq!(titles(&filter_hymns(&hymns, "   ", &table)), vec!["A", "B", "AB"]);
    }

    #[test]
    fn case_insensitive_title_match_preserves_order() {
        let hymns = sample();
        let filtered = filter_hymns(&hymns, "a", &FoldingTable::default());
        assert_eq!(titles(&filtered), vec!["A", "AB"]);
    }

    #[test]
    fn lyrics_are_searched_without_markup() {
        let hymns = vec![
            Hymn::new(1, "One", "<b>Holy</b> night"),
            Hymn::new(2, "Two", "<b>bold</b>"),
        ];
        let table = FoldingTable::default();
        assert_eq!(titles(&filter_hymns(&hymns, "holy night", &table)), vec!["One"]);
        assert!(filter_hymns(&hymns, "<b>", &table).is_empty());
    }

    #[test]
    fn alef_forms_are_interchangeable() {
        let hymns = vec![
            Hymn::new(1, "أيها الفخاري الأعظم", ""),
            Hymn::new(2, "بارك بلادي", ""),
        ];
        let filtered = filter_hymns(&hymns, "ايها", &FoldingTable::default());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 1.into());
    }

    #[test]
    fn result_is_a_subsequence_of_the_input() {
        let hymns = vec![
            Hymn::new(5, "grace", ""),
            Hymn::new(1, "holy", "grace"),
            Hymn::new(3, "peace", ""),
            Hymn::new(2, "Grace again", ""),
        ];
        let filtered = filter_hymns(&hymns, "grace", &FoldingTable::default());
        let ids: Vec<String> = filtered.iter().map(|h| h.id.to_string()).collect();
        assert_eq!(ids, vec!["5", "1", "2"]);
    }
}
