use std::fmt;

use crate::models::RecordId;

/// Every screen the navigator can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Intro,
    Menu,
    Members,
    HymnList,
    HymnDetail,
    Videos,
    VideoDetail,
    Photos,
    PhotoDetail,
}

impl View {
    /// The list a detail view falls back to, or the menu for top-level areas.
    pub fn parent(self) -> Option<View> {
        match self {
            View::Intro | View::Menu => None,
            View::Members | View::HymnList | View::Videos | View::Photos => Some(View::Menu),
            View::HymnDetail => Some(View::HymnList),
            View::VideoDetail => Some(View::Videos),
            View::PhotoDetail => Some(View::Photos),
        }
    }

    /// Areas reachable straight from the menu.
    pub fn is_section(self) -> bool {
        matches!(
            self,
            View::Members | View::HymnList | View::Videos | View::Photos
        )
    }

    pub fn title(self) -> &'static str {
        match self {
            View::Intro => "Little Angel",
            View::Menu => "Menu",
            View::Members => "Choir Members",
            View::HymnList => "Hymns",
            View::HymnDetail => "Hymn",
            View::Videos => "Videos",
            View::VideoDetail => "Video",
            View::Photos => "Photos",
            View::PhotoDetail => "Photo",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// The entity a history entry points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Hymn(RecordId),
    Video(RecordId),
    /// 1-based gallery index.
    Photo(usize),
}

/// One record on the history stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub view: View,
    pub entity: Option<EntityRef>,
}

impl HistoryEntry {
    pub fn view(view: View) -> Self {
        Self { view, entity: None }
    }

    pub fn with_entity(view: View, entity: EntityRef) -> Self {
        Self {
            view,
            entity: Some(entity),
        }
    }
}

/// Back-stack service the navigator drives. Implementations only record
/// entries; turning an entry back into screen state is the navigator's job.
pub trait History {
    fn push(&mut self, entry: HistoryEntry);

    /// Overwrite the top entry, or push when the stack is empty.
    fn replace(&mut self, entry: HistoryEntry);

    /// Drop the top entry and return the one that becomes current. Returns
    /// `None` and leaves the stack untouched at the base entry.
    fn back(&mut self) -> Option<HistoryEntry>;

    fn current(&self) -> Option<&HistoryEntry>;

    fn depth(&self) -> usize;
}

/// Plain in-process stack.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    entries: Vec<HistoryEntry>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }
}

impl History for MemoryHistory {
    fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    fn replace(&mut self, entry: HistoryEntry) {
        match self.entries.last_mut() {
            Some(last) => *last = entry,
            None => self.entries.push(entry),
        }
    }

    fn back(&mut self) -> Option<HistoryEntry> {
        if self.entries.len() > 1 {
            self.entries.pop();
            self.entries.last().cloned()
        } else {
            None
        }
    }

    fn current(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    fn depth(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn back_stops_at_the_base_entry() {
        let mut history = MemoryHistory::new();
        history.push(HistoryEntry::view(View::Menu));
        history.push(HistoryEntry::view(View::HymnList));

        assert_eq!(history.back(), Some(HistoryEntry::view(View::Menu)));
        assert_eq!(history.back(), None);
        assert_eq!(history.depth(), 1);
    }

    #[test]
    fn replace_overwrites_top_without_growing() {
        let mut history = MemoryHistory::new();
        history.replace(HistoryEntry::view(View::Intro));
        history.replace(HistoryEntry::view(View::Menu));
        assert_eq!(history.entries(), &[HistoryEntry::view(View::Menu)]);
    }

    #[test]
    fn parents_lead_back_to_the_menu() {
        assert_eq!(View::HymnDetail.parent(), Some(View::HymnList));
        assert_eq!(View::HymnList.parent(), Some(View::Menu));
        assert_eq!(View::Menu.parent(), None);
        assert!(View::Photos.is_section());
        assert!(!View::PhotoDetail.is_section());
    }
}
