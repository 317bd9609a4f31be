use std::rc::Rc;

use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::models::RecordId;

use super::history::{EntityRef, History, HistoryEntry, MemoryHistory, View};

/// Knobs that differ between deployments of the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavPolicy {
    /// Reset the hymn search term whenever the menu becomes active.
    pub clear_search_on_menu: bool,
}

impl Default for NavPolicy {
    fn default() -> Self {
        Self {
            clear_search_on_menu: true,
        }
    }
}

/// Everything the screens need to know about where the user is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    pub active_view: View,
    pub selected_hymn_id: Option<RecordId>,
    pub selected_video_id: Option<RecordId>,
    pub selected_photo_index: Option<usize>,
    pub search_term: String,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            active_view: View::Intro,
            selected_hymn_id: None,
            selected_video_id: None,
            selected_photo_index: None,
            search_term: String::new(),
        }
    }
}

/// View state machine kept in lockstep with a [`History`] stack.
///
/// Forward moves push an entry, paging inside a detail view replaces the top
/// entry, and every state change funnels through [`Navigator::restore`] so a
/// back action and a forward move can never disagree about what an entry
/// means.
#[derive(Debug)]
pub struct Navigator<H: History = MemoryHistory> {
    catalog: Rc<Catalog>,
    history: H,
    policy: NavPolicy,
    state: NavigationState,
}

impl Navigator<MemoryHistory> {
    pub fn in_memory(catalog: Rc<Catalog>, policy: NavPolicy) -> Self {
        Self::new(catalog, MemoryHistory::new(), policy)
    }
}

impl<H: History> Navigator<H> {
    /// Start on the intro splash. The splash owns the base history entry until
    /// [`Navigator::enter`] swaps it for the menu.
    pub fn new(catalog: Rc<Catalog>, mut history: H, policy: NavPolicy) -> Self {
        history.replace(HistoryEntry::view(View::Intro));
        Self {
            catalog,
            history,
            policy,
            state: NavigationState::default(),
        }
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn view(&self) -> View {
        self.state.active_view
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn policy(&self) -> NavPolicy {
        self.policy
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn search_term(&self) -> &str {
        &self.state.search_term
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.state.search_term = term.into();
    }

    /// Leave the splash for the menu. The splash entry is replaced rather than
    /// pushed over, so back can never return to it.
    pub fn enter(&mut self) -> bool {
        if self.state.active_view != View::Intro {
            return false;
        }
        let entry = HistoryEntry::view(View::Menu);
        self.history.replace(entry.clone());
        self.restore(&entry);
        true
    }

    /// Push one of the menu sections (or the menu itself).
    pub fn open(&mut self, view: View) -> bool {
        if self.state.active_view == View::Intro || !(view.is_section() || view == View::Menu) {
            return false;
        }
        self.forward(HistoryEntry::view(view));
        true
    }

    /// Header "home" affordance: unwind the stack to its base entry (the
    /// menu once entered). Returns `false` when already there.
    pub fn go_home(&mut self) -> bool {
        let mut base = None;
        while let Some(entry) = self.history.back() {
            base = Some(entry);
        }
        match base {
            Some(entry) => {
                self.restore(&entry);
                true
            }
            None => false,
        }
    }

    pub fn open_hymn(&mut self, id: impl Into<RecordId>) -> bool {
        let id = id.into();
        if self.catalog.hymn(&id).is_none() {
            debug!(%id, "refusing to open unknown hymn");
            return false;
        }
        self.forward(HistoryEntry::with_entity(View::HymnDetail, EntityRef::Hymn(id)));
        true
    }

    pub fn open_video(&mut self, id: impl Into<RecordId>) -> bool {
        let id = id.into();
        if self.catalog.video(&id).is_none() {
            debug!(%id, "refusing to open unknown video");
            return false;
        }
        self.forward(HistoryEntry::with_entity(View::VideoDetail, EntityRef::Video(id)));
        true
    }

    pub fn open_photo(&mut self, index: usize) -> bool {
        if !self.catalog.has_photo(index) {
            debug!(index, "refusing to open unknown photo");
            return false;
        }
        self.forward(HistoryEntry::with_entity(View::PhotoDetail, EntityRef::Photo(index)));
        true
    }

    /// Move to the following entity of the current detail view. No-op at the
    /// end of the list or outside a detail view.
    pub fn next(&mut self) -> bool {
        self.step(1)
    }

    pub fn prev(&mut self) -> bool {
        self.step(-1)
    }

    pub fn can_next(&self) -> bool {
        self.neighbor(1).is_some()
    }

    pub fn can_prev(&self) -> bool {
        self.neighbor(-1).is_some()
    }

    /// Same as the platform back action: pop one entry and restore the one
    /// underneath. Returns `false` at the base entry.
    pub fn back(&mut self) -> bool {
        match self.history.back() {
            Some(entry) => {
                self.restore(&entry);
                true
            }
            None => false,
        }
    }

    /// Rebuild the screen state from a history entry. Ids are resolved against
    /// the catalog again; anything that no longer resolves drops to the parent
    /// list and the stale entry is rewritten to match.
    pub fn restore(&mut self, entry: &HistoryEntry) {
        let resolved = self.resolve(entry);
        if resolved != *entry {
            warn!(?entry, fallback = ?resolved.view, "history entry no longer resolves");
            self.history.replace(resolved.clone());
        }

        let state = &mut self.state;
        state.active_view = resolved.view;
        state.selected_hymn_id = None;
        state.selected_video_id = None;
        state.selected_photo_index = None;
        match resolved.entity {
            Some(EntityRef::Hymn(id)) => state.selected_hymn_id = Some(id),
            Some(EntityRef::Video(id)) => state.selected_video_id = Some(id),
            Some(EntityRef::Photo(index)) => state.selected_photo_index = Some(index),
            None => {}
        }

        if resolved.view == View::Menu && self.policy.clear_search_on_menu {
            state.search_term.clear();
        }
        debug!(view = ?resolved.view, depth = self.history.depth(), "navigated");
    }

    fn forward(&mut self, entry: HistoryEntry) {
        self.history.push(entry.clone());
        self.restore(&entry);
    }

    fn resolve(&self, entry: &HistoryEntry) -> HistoryEntry {
        let valid = match (entry.view, entry.entity.as_ref()) {
            (View::HymnDetail, Some(EntityRef::Hymn(id))) => self.catalog.hymn(id).is_some(),
            (View::VideoDetail, Some(EntityRef::Video(id))) => self.catalog.video(id).is_some(),
            (View::PhotoDetail, Some(EntityRef::Photo(index))) => self.catalog.has_photo(*index),
            (View::HymnDetail | View::VideoDetail | View::PhotoDetail, _) => false,
            // List views carry no selection.
            (view, _) => return HistoryEntry::view(view),
        };

        if valid {
            entry.clone()
        } else {
            HistoryEntry::view(entry.view.parent().unwrap_or(View::Menu))
        }
    }

    fn step(&mut self, delta: isize) -> bool {
        match self.neighbor(delta) {
            Some(entity) => {
                let entry = HistoryEntry::with_entity(self.state.active_view, entity);
                self.history.replace(entry.clone());
                self.restore(&entry);
                true
            }
            None => false,
        }
    }

    /// The entity `delta` places away in id order, if there is one.
    fn neighbor(&self, delta: isize) -> Option<EntityRef> {
        match self.state.active_view {
            View::HymnDetail => {
                let ids = self.catalog.sorted_hymn_ids();
                let current = self.state.selected_hymn_id.as_ref()?;
                offset_in(&ids, current, delta).map(EntityRef::Hymn)
            }
            View::VideoDetail => {
                let ids = self.catalog.sorted_video_ids();
                let current = self.state.selected_video_id.as_ref()?;
                offset_in(&ids, current, delta).map(EntityRef::Video)
            }
            View::PhotoDetail => {
                let current = self.state.selected_photo_index?;
                let target = current.checked_add_signed(delta)?;
                self.catalog.has_photo(target).then_some(EntityRef::Photo(target))
            }
            _ => None,
        }
    }
}

fn offset_in<T: PartialEq + Clone>(items: &[T], current: &T, delta: isize) -> Option<T> {
    let position = items.iter().position(|item| item == current)?;
    let target = position.checked_add_signed(delta)?;
    items.get(target).cloned()
}
