use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::search::Segment;
use crate::store::{ReadingFont, Theme, MIN_FONT_SIZE};

/// Colors for one theme.
pub(crate) struct Palette {
    pub(crate) text: Color,
    pub(crate) background: Color,
    pub(crate) accent: Color,
    pub(crate) muted: Color,
    pub(crate) selected: Color,
    pub(crate) highlight: Style,
    pub(crate) emphasis: Style,
}

impl Palette {
    pub(crate) fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                text: Color::Black,
                background: Color::White,
                accent: Color::Blue,
                muted: Color::DarkGray,
                selected: Color::Magenta,
                highlight: Style::default().bg(Color::Yellow).fg(Color::Black),
                emphasis: Style::default()
                    .bg(Color::LightBlue)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD),
            },
            Theme::Dark => Self {
                text: Color::Gray,
                background: Color::Black,
                accent: Color::Cyan,
                muted: Color::DarkGray,
                selected: Color::Yellow,
                highlight: Style::default().bg(Color::Yellow).fg(Color::Black),
                emphasis: Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            },
        }
    }

    pub(crate) fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }
}

/// Blank rows inserted between lyric lines for a given font size. A terminal
/// cannot scale glyphs, so larger sizes read as looser spacing.
pub(crate) fn line_spacing(font_size: u16) -> u16 {
    (font_size.saturating_sub(MIN_FONT_SIZE) / 16).min(3)
}

pub(crate) fn reading_style(font: ReadingFont) -> Style {
    match font {
        ReadingFont::Standard => Style::default(),
        ReadingFont::Bold => Style::default().add_modifier(Modifier::BOLD),
        ReadingFont::Italic => Style::default().add_modifier(Modifier::ITALIC),
    }
}

/// Turn highlight segments into a styled line. `emphasized` picks out one
/// match (by its position among the line's matches) for the stronger style.
pub(crate) fn segments_to_line(
    segments: Vec<Segment>,
    base: Style,
    palette: &Palette,
    emphasized: Option<usize>,
) -> Line<'static> {
    let mut occurrence = 0;
    let spans: Vec<Span<'static>> = segments
        .into_iter()
        .map(|segment| {
            if segment.is_match {
                let style = if emphasized == Some(occurrence) {
                    palette.emphasis
                } else {
                    palette.highlight
                };
                occurrence += 1;
                Span::styled(segment.text, style)
            } else {
                Span::styled(segment.text, base)
            }
        })
        .collect();
    Line::from(spans)
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for the intro splash.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{render_highlighted, FoldingTable};
    use anyhow::anyhow;

    #[test]
    fn spacing_grows_with_font_size() {
        assert_eq!(line_spacing(16), 0);
        assert_eq!(line_spacing(24), 0);
        assert_eq!(line_spacing(32), 1);
        assert_eq!(line_spacing(64), 3);
    }

    #[test]
    fn only_the_chosen_occurrence_is_emphasized() {
        let palette = Palette::for_theme(Theme::Light);
        let segments = render_highlighted("holy, holy, holy", "holy", &FoldingTable::default());
        let line = segments_to_line(segments, Style::default(), &palette, Some(1));
        let styles: Vec<Style> = line
            .spans
            .iter()
            .filter(|span| span.content.contains("holy"))
            .map(|span| span.style)
            .collect();
        assert_eq!(styles, vec![palette.highlight, palette.emphasis, palette.highlight]);
    }

    #[test]
    fn surfaces_root_cause() {
        let err = anyhow!("disk full").context("failed to save preference theme");
        assert_eq!(surface_error(&err), "disk full");
    }
}
