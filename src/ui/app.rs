use std::mem;
use std::rc::Rc;
use std::time::Instant;

use anyhow::Result;
use crossterm::event::KeyCode;
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use rusqlite::Connection;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::media::{embed_url, existing_photo, photo_path, thumbnail_url, youtube_id};
use crate::models::{ChoirVideo, Hymn};
use crate::nav::{Navigator, View};
use crate::search::{filter_hymns, split_matches, Segment};
use crate::store::{
    save_font_size, save_reading_font, save_theme, Preferences, FONT_SIZE_STEP,
};

use super::helpers::{
    centered_rect, line_spacing, reading_style, segments_to_line, surface_error, Palette,
};
use super::screens::{GridCursor, ListCursor, ReaderScreen, MENU_ITEMS};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Photo cells per grid row.
const GRID_COLUMNS: usize = 4;
/// Height of one photo cell.
const PHOTO_CELL_HEIGHT: u16 = 3;
/// Height allocation per hymn card in the list view.
const HYMN_CARD_HEIGHT: u16 = 4;
/// Rows skipped by PageUp/PageDown.
const PAGE: isize = 5;

/// Fine-grained modes scoped to the current view.
enum Mode {
    Normal,
    Searching(SearchState),
}

/// Which query the search bar is editing.
#[derive(Clone, Copy)]
enum SearchTarget {
    HymnList,
    Reader,
}

/// State for an active inline search. The query itself lives with its owner
/// (the navigator for the list, the reader for in-hymn search).
struct SearchState {
    target: SearchTarget,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    conn: Connection,
    catalog: Rc<Catalog>,
    nav: Navigator,
    config: AppConfig,
    prefs: Preferences,
    mode: Mode,
    status: Option<StatusMessage>,
    menu: ListCursor,
    members: ListCursor,
    hymns: ListCursor,
    videos: ListCursor,
    photos: GridCursor,
    reader: ReaderScreen,
}

impl App {
    pub fn new(
        conn: Connection,
        catalog: Catalog,
        prefs: Preferences,
        config: AppConfig,
        load_error: Option<String>,
    ) -> Self {
        let catalog = match config.photo_count {
            Some(count) => catalog.with_photo_count(count),
            None => catalog,
        };
        let catalog = Rc::new(catalog);
        let mut nav = Navigator::in_memory(Rc::clone(&catalog), config.policy);
        if config.skip_intro {
            nav.enter();
        }

        let mut app = Self {
            conn,
            catalog,
            nav,
            config,
            prefs,
            mode: Mode::Normal,
            status: None,
            menu: ListCursor::default(),
            members: ListCursor::default(),
            hymns: ListCursor::default(),
            videos: ListCursor::default(),
            photos: GridCursor::new(GRID_COLUMNS),
            reader: ReaderScreen::default(),
        };
        if let Some(message) = load_error {
            app.set_status(message, StatusKind::Error);
        }
        app
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let now = Instant::now();
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, now, &mut exit)?,
            Mode::Searching(state) => self.handle_search(code, state, now),
        };

        self.sync_reader(now);
        Ok(exit)
    }

    /// Let timed highlights run out. Called on every pass of the event loop.
    pub(crate) fn tick(&mut self, now: Instant) {
        let catalog = Rc::clone(&self.catalog);
        let hymn = self.reader.hymn_id.as_ref().and_then(|id| catalog.hymn(id));
        if self.reader.tick(hymn, &self.config.folding, now) {
            debug!("reader highlight expired");
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode, now: Instant, exit: &mut bool) -> Result<Mode> {
        if self.nav.view() == View::Intro {
            match code {
                KeyCode::Char('q') | KeyCode::Esc => *exit = true,
                KeyCode::Enter | KeyCode::Char(' ') => {
                    self.nav.enter();
                    info!("entered the reader");
                }
                _ => {}
            }
            return Ok(Mode::Normal);
        }

        match code {
            KeyCode::Char('q') => {
                *exit = true;
                return Ok(Mode::Normal);
            }
            KeyCode::Esc | KeyCode::Backspace => {
                self.go_back();
                return Ok(Mode::Normal);
            }
            KeyCode::Char('h') => {
                self.clear_status();
                self.nav.go_home();
                return Ok(Mode::Normal);
            }
            KeyCode::Char('t') => {
                self.toggle_theme();
                return Ok(Mode::Normal);
            }
            _ => {}
        }

        match self.nav.view() {
            View::Intro => {}
            View::Menu => self.handle_menu_key(code),
            View::Members => {
                let len = self.catalog.members().len();
                move_list(&mut self.members, code, len);
            }
            View::HymnList => return Ok(self.handle_hymn_list_key(code)),
            View::HymnDetail => return Ok(self.handle_reader_key(code, now)),
            View::Videos => self.handle_video_list_key(code),
            View::VideoDetail => self.handle_video_detail_key(code),
            View::Photos => self.handle_photo_grid_key(code),
            View::PhotoDetail => self.handle_photo_detail_key(code),
        }
        Ok(Mode::Normal)
    }

    fn handle_menu_key(&mut self, code: KeyCode) {
        let target = match code {
            KeyCode::Enter => MENU_ITEMS.get(self.menu.selected).map(|item| item.0),
            KeyCode::Char(ch @ '1'..='4') => {
                let index = ch as usize - '1' as usize;
                self.menu.selected = index;
                MENU_ITEMS.get(index).map(|item| item.0)
            }
            _ => {
                move_list(&mut self.menu, code, MENU_ITEMS.len());
                None
            }
        };

        if let Some(view) = target {
            self.clear_status();
            self.nav.open(view);
        }
    }

    fn handle_hymn_list_key(&mut self, code: KeyCode) -> Mode {
        match code {
            KeyCode::Char('/') | KeyCode::Char('f') => {
                return Mode::Searching(SearchState {
                    target: SearchTarget::HymnList,
                });
            }
            KeyCode::Enter => self.open_selected_hymn(),
            _ => {
                let len = self.filtered_hymns().len();
                move_list(&mut self.hymns, code, len);
            }
        }
        Mode::Normal
    }

    fn handle_reader_key(&mut self, code: KeyCode, now: Instant) -> Mode {
        let spacing = self.spacing();
        match code {
            KeyCode::Left => {
                self.nav.prev();
            }
            KeyCode::Right => {
                self.nav.next();
            }
            KeyCode::Up => self.reader.scroll_by(-1),
            KeyCode::Down => self.reader.scroll_by(1),
            KeyCode::PageUp => self.reader.scroll_by(-(PAGE as i32) * 2),
            KeyCode::PageDown => self.reader.scroll_by(PAGE as i32 * 2),
            KeyCode::Home => self.reader.scroll = 0,
            KeyCode::Char('/') | KeyCode::Char('f') => {
                return Mode::Searching(SearchState {
                    target: SearchTarget::Reader,
                });
            }
            KeyCode::Char('n') => {
                if self.reader.next_match(spacing, now).is_none() {
                    self.set_status("No matches.", StatusKind::Info);
                }
            }
            KeyCode::Char('N') => {
                if self.reader.prev_match(spacing, now).is_none() {
                    self.set_status("No matches.", StatusKind::Info);
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.change_font_size(FONT_SIZE_STEP as i32);
            }
            KeyCode::Char('-') => {
                self.change_font_size(-(FONT_SIZE_STEP as i32));
            }
            KeyCode::Char('r') => self.cycle_reading_font(),
            _ => {}
        }
        Mode::Normal
    }

    fn handle_video_list_key(&mut self, code: KeyCode) {
        let ids = self.catalog.sorted_video_ids();
        match code {
            KeyCode::Enter => {
                if let Some(id) = ids.get(self.videos.selected).cloned() {
                    self.clear_status();
                    self.nav.open_video(id);
                }
            }
            KeyCode::Char('o') => {
                let catalog = Rc::clone(&self.catalog);
                if let Some(video) = ids.get(self.videos.selected).and_then(|id| catalog.video(id)) {
                    self.open_video_link(video);
                }
            }
            _ => move_list(&mut self.videos, code, ids.len()),
        }
    }

    fn handle_video_detail_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Left => {
                self.nav.prev();
            }
            KeyCode::Right => {
                self.nav.next();
            }
            KeyCode::Enter | KeyCode::Char('o') => {
                let catalog = Rc::clone(&self.catalog);
                if let Some(video) = self
                    .nav
                    .state()
                    .selected_video_id
                    .as_ref()
                    .and_then(|id| catalog.video(id))
                {
                    self.open_video_link(video);
                }
            }
            _ => {}
        }
    }

    fn handle_photo_grid_key(&mut self, code: KeyCode) {
        let len = self.catalog.photo_count();
        match code {
            KeyCode::Left => self.photos.move_horizontal(-1, len),
            KeyCode::Right => self.photos.move_horizontal(1, len),
            KeyCode::Up => self.photos.move_vertical(-1, len),
            KeyCode::Down => self.photos.move_vertical(1, len),
            KeyCode::Enter => {
                self.clear_status();
                self.nav.open_photo(self.photos.selected + 1);
            }
            _ => {}
        }
    }

    fn handle_photo_detail_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Left => {
                self.nav.prev();
            }
            KeyCode::Right => {
                self.nav.next();
            }
            KeyCode::Enter | KeyCode::Char('o') => {
                let Some(index) = self.nav.state().selected_photo_index else {
                    return;
                };
                match existing_photo(&self.config.photo_dir, index) {
                    None => self.set_status("Image not found.", StatusKind::Error),
                    Some(path) => {
                        if let Err(err) = open_link(&path) {
                            self.set_status(format!("Failed to open photo: {err}"), StatusKind::Error);
                        } else {
                            self.set_status(format!("Opened photo {index}."), StatusKind::Info);
                        }
                    }
                }
            }
            _ => {}
        }
        if let Some(index) = self.nav.state().selected_photo_index {
            self.photos.selected = index - 1;
        }
    }

    fn handle_search(&mut self, code: KeyCode, state: SearchState, now: Instant) -> Mode {
        match state.target {
            SearchTarget::HymnList => {
                match code {
                    KeyCode::Esc => {
                        self.nav.set_search_term("");
                        self.hymns.select_first();
                        return Mode::Normal;
                    }
                    KeyCode::Enter => return Mode::Normal,
                    KeyCode::Backspace => {
                        let mut term = self.nav.search_term().to_string();
                        term.pop();
                        self.nav.set_search_term(term);
                        self.hymns.select_first();
                    }
                    KeyCode::Char(ch) => {
                        let mut term = self.nav.search_term().to_string();
                        term.push(ch);
                        self.nav.set_search_term(term);
                        self.hymns.select_first();
                    }
                    _ => {
                        let len = self.filtered_hymns().len();
                        move_list(&mut self.hymns, code, len);
                    }
                }
                Mode::Searching(state)
            }
            SearchTarget::Reader => {
                let catalog = Rc::clone(&self.catalog);
                let Some(hymn) = self.reader.hymn_id.as_ref().and_then(|id| catalog.hymn(id)) else {
                    return Mode::Normal;
                };
                let spacing = self.spacing();
                match code {
                    KeyCode::Esc => {
                        self.reader
                            .set_query(String::new(), hymn, &self.config.folding, spacing, now);
                        return Mode::Normal;
                    }
                    KeyCode::Enter => return Mode::Normal,
                    KeyCode::Down => {
                        self.reader.next_match(spacing, now);
                    }
                    KeyCode::Up => {
                        self.reader.prev_match(spacing, now);
                    }
                    KeyCode::Backspace => {
                        let mut query = self.reader.query.clone();
                        query.pop();
                        self.reader
                            .set_query(query, hymn, &self.config.folding, spacing, now);
                    }
                    KeyCode::Char(ch) => {
                        let mut query = self.reader.query.clone();
                        query.push(ch);
                        self.reader
                            .set_query(query, hymn, &self.config.folding, spacing, now);
                    }
                    _ => {}
                }
                Mode::Searching(state)
            }
        }
    }

    /// Keep the reader in step with whatever hymn the navigator now shows, and
    /// the list cursor inside the filtered list.
    fn sync_reader(&mut self, now: Instant) {
        let len = self.filtered_hymns().len();
        self.hymns.ensure_in_bounds(len);

        let spacing = self.spacing();
        match (self.nav.view(), self.nav.state().selected_hymn_id.clone()) {
            (View::HymnDetail, Some(id)) => {
                if self.reader.hymn_id.as_ref() != Some(&id) {
                    if let Some(hymn) = self.catalog.hymn(&id) {
                        self.reader.open(
                            hymn,
                            self.nav.search_term(),
                            &self.config.folding,
                            spacing,
                            now,
                        );
                    }
                }
            }
            _ => {
                if self.reader.hymn_id.is_some() {
                    self.reader.close();
                }
            }
        }
    }

    fn go_back(&mut self) {
        if self.nav.back() {
            self.clear_status();
        } else {
            self.set_status("Already at the menu. Press q to quit.", StatusKind::Info);
        }
    }

    fn open_selected_hymn(&mut self) {
        let id = self.filtered_hymns().get(self.hymns.selected).map(|hymn| hymn.id.clone());
        match id {
            Some(id) => {
                self.clear_status();
                self.nav.open_hymn(id);
            }
            None => self.set_status("No hymn selected.", StatusKind::Error),
        }
    }

    fn open_video_link(&mut self, video: &ChoirVideo) {
        let link = video.link.trim();
        if link.is_empty() {
            self.set_status("This video does not have a link.", StatusKind::Error);
        } else if let Err(err) = open_link(link) {
            self.set_status(format!("Failed to open link: {err}"), StatusKind::Error);
        } else {
            self.set_status(format!("Opened {video}."), StatusKind::Info);
        }
    }

    fn toggle_theme(&mut self) {
        let theme = self.prefs.theme.toggled();
        match save_theme(&self.conn, theme) {
            Ok(()) => {
                self.prefs.theme = theme;
                self.set_status(format!("Theme: {theme}."), StatusKind::Info);
            }
            Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
        }
    }

    fn change_font_size(&mut self, delta: i32) {
        match save_font_size(&self.conn, self.prefs.font_size as i32 + delta) {
            Ok(size) => {
                self.prefs.font_size = size;
                self.set_status(format!("Font size {size}."), StatusKind::Info);
            }
            Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
        }
    }

    fn cycle_reading_font(&mut self) {
        let font = self.prefs.reading_font.cycled();
        match save_reading_font(&self.conn, font) {
            Ok(()) => {
                self.prefs.reading_font = font;
                self.set_status(format!("Reading font: {font}."), StatusKind::Info);
            }
            Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
        }
    }

    fn filtered_hymns(&self) -> Vec<&Hymn> {
        filter_hymns(
            self.catalog.hymns(),
            self.nav.search_term(),
            &self.config.folding,
        )
    }

    fn current_hymn(&self) -> Option<&Hymn> {
        self.nav
            .state()
            .selected_hymn_id
            .as_ref()
            .and_then(|id| self.catalog.hymn(id))
    }

    fn spacing(&self) -> u16 {
        line_spacing(self.prefs.font_size)
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let palette = Palette::for_theme(self.prefs.theme);
        frame.render_widget(Block::default().style(palette.base()), area);

        if self.nav.view() == View::Intro {
            self.draw_intro(frame, area, &palette);
            return;
        }

        let footer_height = FOOTER_HEIGHT.min(area.height);
        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match self.nav.view() {
            View::Intro => {}
            View::Menu => self.draw_menu(frame, content_area, &palette),
            View::Members => self.draw_members(frame, content_area, &palette),
            View::HymnList => self.draw_hymn_list(frame, content_area, &palette),
            View::HymnDetail => self.draw_reader(frame, content_area, &palette),
            View::Videos => self.draw_videos(frame, content_area, &palette),
            View::VideoDetail => self.draw_video_detail(frame, content_area, &palette),
            View::Photos => self.draw_photos(frame, content_area, &palette),
            View::PhotoDetail => self.draw_photo_detail(frame, content_area, &palette),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        if let Mode::Searching(state) = &self.mode {
            self.draw_search_bar(frame, content_area, state.target);
        }
    }

    fn titled_block(&self, title: &str, palette: &Palette) -> Block<'static> {
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.accent))
            .title(format!(" Little Angel • {title} "))
    }

    fn draw_intro(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let popup = centered_rect(70, 60, area);
        let lines = vec![
            Line::from(Span::styled(
                "الملاك الصغير",
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from("خدمة الكورال"),
            Line::from(""),
            Line::from("أهلاً بكم في تطبيق كورال الملاك الصغير"),
            Line::from("مجموعة من الترانيم والألحان الروحية"),
            Line::from(""),
            Line::from(Span::styled(
                "Press Enter to continue",
                Style::default().fg(palette.muted),
            )),
        ];
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.accent)),
            );
        frame.render_widget(paragraph, popup);
    }

    fn draw_menu(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let block = self.titled_block(View::Menu.title(), palette);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let items: Vec<ListItem> = MENU_ITEMS
            .iter()
            .enumerate()
            .map(|(index, (_, title, subtitle))| {
                ListItem::new(vec![
                    Line::from(Span::styled(
                        format!("{}. {title}", index + 1),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        format!("   {subtitle}"),
                        Style::default().fg(palette.muted),
                    )),
                    Line::from(""),
                ])
            })
            .collect();

        let list = List::new(items)
            .highlight_style(Style::default().fg(palette.selected))
            .highlight_symbol("▶ ");
        let mut state = ListState::default();
        state.select(Some(self.menu.selected));
        frame.render_stateful_widget(list, inner, &mut state);
    }

    fn draw_members(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let block = self.titled_block(View::Members.title(), palette);
        let members = self.catalog.members();
        if members.is_empty() {
            let message = Paragraph::new("No members listed.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = members
            .iter()
            .map(|member| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        member.name.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!("  {}", member.role), Style::default().fg(palette.muted)),
                ]))
            })
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(palette.selected))
            .highlight_symbol("▶ ");
        let mut state = ListState::default();
        state.select(Some(self.members.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_hymn_list(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(area);

        let hymns = self.filtered_hymns();
        let term = self.nav.search_term();
        let summary = if term.trim().is_empty() {
            format!("{} hymns", hymns.len())
        } else {
            format!("{} of {} hymns match \"{term}\"", hymns.len(), self.catalog.hymns().len())
        };
        let header = Paragraph::new(Line::from(Span::raw(summary)))
            .block(self.titled_block(View::HymnList.title(), palette));
        frame.render_widget(header, chunks[0]);

        if hymns.is_empty() {
            let message = Paragraph::new("لا توجد ترانيم بهذا الاسم")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(message, chunks[1]);
            return;
        }

        self.render_hymn_cards(frame, chunks[1], &hymns, palette);
    }

    fn render_hymn_cards(&self, frame: &mut Frame, area: Rect, hymns: &[&Hymn], palette: &Palette) {
        if area.height == 0 {
            return;
        }

        let capacity = (area.height / HYMN_CARD_HEIGHT).max(1) as usize;
        let start = self.hymns.window_start(capacity, hymns.len());
        let end = (start + capacity).min(hymns.len());
        let constraints: Vec<Constraint> = (start..end)
            .map(|_| Constraint::Length(HYMN_CARD_HEIGHT))
            .collect();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let term = self.nav.search_term().trim();
        let matcher = (!term.is_empty()).then(|| self.config.folding.matcher(term));
        let highlight = |text: &str| match &matcher {
            Some(matcher) => split_matches(text, matcher),
            None => vec![Segment {
                text: text.to_string(),
                is_match: false,
            }],
        };
        let title_style = Style::default().add_modifier(Modifier::BOLD);
        for (row, hymn_index) in rows.iter().zip(start..end) {
            let hymn = hymns[hymn_index];
            let selected = hymn_index == self.hymns.selected;
            let mut block = Block::default().borders(Borders::ALL);
            if selected {
                block = block.border_style(Style::default().fg(palette.selected));
            }

            let title = highlight(&hymn.to_string());
            let preview = highlight(&hymn.first_line());
            let mut title_line = segments_to_line(title, title_style, palette, None);
            if selected {
                title_line.spans.insert(0, Span::styled("▶ ", Style::default().fg(palette.selected)));
            }
            let lines = vec![
                title_line,
                segments_to_line(preview, Style::default().fg(palette.muted), palette, None),
            ];

            let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
            frame.render_widget(paragraph, *row);
        }
    }

    fn draw_reader(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let Some(hymn) = self.current_hymn() else {
            let message = Paragraph::new("This hymn is no longer available.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(message, area);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(1)])
            .split(area);

        let cursor = &self.reader.cursor;
        let matches = match cursor.index() {
            Some(index) => format!("{}/{}", index + 1, cursor.count()),
            None if !self.reader.query.trim().is_empty() => "0/0".to_string(),
            None => String::new(),
        };
        let paging = format!(
            "{} prev   next {}",
            if self.nav.can_prev() { "◀" } else { " " },
            if self.nav.can_next() { "▶" } else { " " },
        );
        let header = Paragraph::new(vec![
            Line::from(Span::styled(
                hymn.to_string(),
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::raw(paging),
                Span::styled(
                    format!("   Aa {}  {}", self.prefs.font_size, self.prefs.reading_font),
                    Style::default().fg(palette.muted),
                ),
                Span::styled(format!("   {matches}"), Style::default().fg(palette.selected)),
            ]),
        ])
        .alignment(Alignment::Center)
        .block(self.titled_block(View::HymnDetail.title(), palette));
        frame.render_widget(header, chunks[0]);

        let now = Instant::now();
        let emphasized = if cursor.is_emphasized(now) {
            cursor.current()
        } else {
            None
        };
        let spacing = self.spacing();
        let base = palette.base().patch(reading_style(self.prefs.reading_font));

        let mut lines = Vec::new();
        for (index, text) in hymn.lines().iter().enumerate() {
            let segments = self.reader.segments(text);
            let occurrence = emphasized
                .filter(|location| location.line == index)
                .map(|location| location.occurrence);
            lines.push(segments_to_line(segments, base, palette, occurrence));
            for _ in 0..spacing {
                lines.push(Line::from(""));
            }
        }

        let block = Block::default().borders(Borders::ALL);
        self.reader.viewport.set(block.inner(chunks[1]).height);
        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .scroll((self.reader.scroll, 0));
        frame.render_widget(paragraph, chunks[1]);
    }

    fn draw_videos(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let block = self.titled_block(View::Videos.title(), palette);
        let ids = self.catalog.sorted_video_ids();
        if ids.is_empty() {
            let message = Paragraph::new("No videos yet.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = ids
            .iter()
            .filter_map(|id| self.catalog.video(id))
            .map(|video| {
                let preview = match youtube_id(&video.link) {
                    Some(_) => thumbnail_url(&video.link),
                    None => "(no preview)".to_string(),
                };
                ListItem::new(vec![
                    Line::from(Span::styled(
                        video.to_string(),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        format!("   {preview}"),
                        Style::default().fg(palette.muted),
                    )),
                ])
            })
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(palette.selected))
            .highlight_symbol("▶ ");
        let mut state = ListState::default();
        state.select(Some(self.videos.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_video_detail(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let block = self.titled_block(View::VideoDetail.title(), palette);
        let Some(video) = self
            .nav
            .state()
            .selected_video_id
            .as_ref()
            .and_then(|id| self.catalog.video(id))
        else {
            frame.render_widget(Paragraph::new("Video unavailable.").block(block), area);
            return;
        };

        let label = Style::default().fg(palette.muted);
        let mut lines = vec![
            Line::from(Span::styled(
                video.to_string(),
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![Span::styled("Link:      ", label), Span::raw(video.link.clone())]),
            Line::from(vec![
                Span::styled("Thumbnail: ", label),
                Span::raw(thumbnail_url(&video.link)),
            ]),
        ];
        match embed_url(&video.link) {
            Some(embed) => lines.push(Line::from(vec![
                Span::styled("Embed:     ", label),
                Span::raw(embed),
            ])),
            None => lines.push(Line::from(Span::styled(
                "No video id found in this link; it will open as is.",
                Style::default().fg(Color::Red),
            ))),
        }

        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn draw_photos(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let block = self.titled_block(View::Photos.title(), palette);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let count = self.catalog.photo_count();
        if count == 0 || inner.height == 0 {
            frame.render_widget(
                Paragraph::new("No photos yet.").alignment(Alignment::Center),
                inner,
            );
            return;
        }

        let columns = self.photos.columns();
        let total_rows = count.div_ceil(columns);
        let capacity = (inner.height / PHOTO_CELL_HEIGHT).max(1) as usize;
        let selected_row = self.photos.selected / columns;
        let first_row = selected_row.saturating_sub(capacity - 1).min(total_rows.saturating_sub(capacity));
        let last_row = (first_row + capacity).min(total_rows);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(PHOTO_CELL_HEIGHT); last_row - first_row])
            .split(inner);
        for (row_area, row) in rows.iter().zip(first_row..last_row) {
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, columns as u32); columns])
                .split(*row_area);
            for (col, cell) in cells.iter().enumerate() {
                let position = row * columns + col;
                if position >= count {
                    break;
                }
                let index = position + 1;
                let found = existing_photo(&self.config.photo_dir, index).is_some();
                let mut cell_block = Block::default().borders(Borders::ALL);
                if position == self.photos.selected {
                    cell_block = cell_block.border_style(Style::default().fg(palette.selected));
                }
                let text = if found {
                    Span::raw(format!("#{index}"))
                } else {
                    Span::styled(format!("#{index} Image not found"), Style::default().fg(palette.muted))
                };
                frame.render_widget(
                    Paragraph::new(Line::from(text))
                        .alignment(Alignment::Center)
                        .block(cell_block),
                    *cell,
                );
            }
        }
    }

    fn draw_photo_detail(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let block = self.titled_block(View::PhotoDetail.title(), palette);
        let Some(index) = self.nav.state().selected_photo_index else {
            frame.render_widget(Paragraph::new("Photo unavailable.").block(block), area);
            return;
        };

        let path = photo_path(&self.config.photo_dir, index);
        let status = if path.is_file() {
            Line::from(Span::styled(
                "Press o to open in the system viewer.",
                Style::default().fg(palette.muted),
            ))
        } else {
            Line::from(Span::styled("Image not found", Style::default().fg(palette.muted)))
        };
        let lines = vec![
            Line::from(Span::styled(
                format!("Photo {index} of {}", self.catalog.photo_count()),
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(path.display().to_string()),
            status,
        ];
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, target: SearchTarget) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let (title, query) = match target {
            SearchTarget::HymnList => ("Search hymns", self.nav.search_term()),
            SearchTarget::Reader => ("Search in hymn", self.reader.query.as_str()),
        };
        let block = Block::default().borders(Borders::ALL).title(title);
        let paragraph = Paragraph::new(Span::raw(format!("Search: {query}")))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Search: ".len() as u16 + query.chars().count() as u16;
        let cursor_y = inner.y;
        frame.set_cursor_position((cursor_x, cursor_y));
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let mut spans = Vec::new();
        let mut push = |key: &'static str, label: &'static str| {
            spans.push(Span::styled(key, key_style));
            spans.push(Span::raw(format!(" {label}   ")));
        };

        if let Mode::Searching(state) = &self.mode {
            push("[Type]", "Filter");
            match state.target {
                SearchTarget::HymnList => push("[↑↓]", "Navigate"),
                SearchTarget::Reader => push("[↑↓]", "Prev/Next Match"),
            }
            push("[Enter]", "Done");
            push("[Esc]", "Clear");
            return Line::from(spans);
        }

        match self.nav.view() {
            View::Intro => push("[Enter]", "Enter"),
            View::Menu => {
                push("[↑↓]", "Navigate");
                push("[Enter]", "Open");
            }
            View::Members => push("[↑↓]", "Scroll"),
            View::HymnList => {
                push("[↑↓]", "Navigate");
                push("[Enter]", "Read");
                push("[/]", "Search");
            }
            View::HymnDetail => {
                push("[←→]", "Prev/Next");
                push("[/]", "Find");
                push("[n/N]", "Match");
                push("[+/-]", "Size");
                push("[r]", "Font");
            }
            View::Videos => {
                push("[Enter]", "Details");
                push("[o]", "Open");
            }
            View::VideoDetail | View::PhotoDetail => {
                push("[←→]", "Prev/Next");
                push("[o]", "Open");
            }
            View::Photos => {
                push("[←↑↓→]", "Navigate");
                push("[Enter]", "View");
            }
        }
        push("[Esc]", "Back");
        push("[h]", "Home");
        push("[t]", "Theme");
        push("[q]", "Quit");
        Line::from(spans)
    }
}

/// Shared list movement keys.
fn move_list(cursor: &mut ListCursor, code: KeyCode, len: usize) {
    match code {
        KeyCode::Up => cursor.move_selection(-1, len),
        KeyCode::Down => cursor.move_selection(1, len),
        KeyCode::PageUp => cursor.move_selection(-PAGE, len),
        KeyCode::PageDown => cursor.move_selection(PAGE, len),
        KeyCode::Home => cursor.select_first(),
        KeyCode::End => cursor.select_last(len),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ensure_schema, load_preferences, ReadingFont};

    fn app() -> App {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        let catalog = Catalog::embedded().unwrap();
        App::new(conn, catalog, Preferences::default(), AppConfig::default(), None)
    }

    fn press(app: &mut App, keys: &[KeyCode]) {
        for key in keys {
            assert!(!app.handle_key(*key).unwrap());
        }
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            press(app, &[KeyCode::Char(ch)]);
        }
    }

    #[test]
    fn list_search_seeds_the_reader_and_survives_back() {
        let mut app = app();
        press(&mut app, &[KeyCode::Enter, KeyCode::Char('2'), KeyCode::Char('/')]);
        assert_eq!(app.nav.view(), View::HymnList);

        type_text(&mut app, "اله");
        press(&mut app, &[KeyCode::Enter]);
        let expected = app.filtered_hymns().first().map(|hymn| hymn.id.clone());
        assert!(expected.is_some());

        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(app.nav.view(), View::HymnDetail);
        assert_eq!(app.reader.hymn_id, expected);
        assert_eq!(app.reader.query, "اله");

        press(&mut app, &[KeyCode::Esc]);
        assert_eq!(app.nav.view(), View::HymnList);
        assert_eq!(app.nav.search_term(), "اله");
        assert_eq!(app.reader.hymn_id, None);
    }

    #[test]
    fn paging_in_the_reader_reopens_the_next_hymn() {
        let mut app = app();
        press(&mut app, &[KeyCode::Enter, KeyCode::Char('2'), KeyCode::Enter]);
        assert_eq!(app.reader.hymn_id, Some(1.into()));
        press(&mut app, &[KeyCode::Right]);
        assert_eq!(app.reader.hymn_id, Some(2.into()));
        assert!(app.reader.query.is_empty());
    }

    #[test]
    fn reader_preferences_are_persisted() {
        let mut app = app();
        press(&mut app, &[KeyCode::Enter, KeyCode::Char('2'), KeyCode::Enter]);
        press(&mut app, &[KeyCode::Char('+'), KeyCode::Char('+'), KeyCode::Char('r')]);
        press(&mut app, &[KeyCode::Char('t')]);

        let stored = load_preferences(&app.conn).unwrap();
        assert_eq!(stored.font_size, 28);
        assert_eq!(stored.reading_font, ReadingFont::Bold);
        assert_eq!(stored, app.prefs);
    }

    #[test]
    fn back_at_the_menu_hints_at_quitting() {
        let mut app = app();
        press(&mut app, &[KeyCode::Enter, KeyCode::Esc]);
        assert_eq!(app.nav.view(), View::Menu);
        let status = app.status.as_ref().map(|status| status.text.as_str());
        assert_eq!(status, Some("Already at the menu. Press q to quit."));
        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
    }

    #[test]
    fn photo_grid_opens_the_selected_photo() {
        let mut app = app();
        press(&mut app, &[KeyCode::Enter, KeyCode::Char('4')]);
        press(&mut app, &[KeyCode::Down, KeyCode::Right, KeyCode::Enter]);
        assert_eq!(app.nav.state().selected_photo_index, Some(6));
        press(&mut app, &[KeyCode::Left]);
        assert_eq!(app.nav.state().selected_photo_index, Some(5));
        assert_eq!(app.photos.selected, 4);
    }
}
