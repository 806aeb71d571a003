//! Draws one preview as a bordered card: cover, two-line title, author.

use bookbrowse_application::PreviewMarkup;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use ratatui_image::Image as ImageWidget;
use ratatui_image::protocol::Protocol as ImageProtocol;

use crate::text::clamp_lines;

pub(crate) const CARD_HEIGHT: u16 = 5;
pub(crate) const CARD_MIN_WIDTH: u16 = 28;
const COVER_WIDTH: u16 = 5;
const TITLE_LINES: usize = 2;

#[derive(Debug, Clone, Copy)]
pub(crate) struct CardColors {
    pub ink: Color,
    pub paper: Color,
    pub accent: Color,
}

/// Cells the cover occupies inside a card drawn at `area`.
pub(crate) fn cover_area(area: Rect) -> Rect {
    let inner = Rect::new(
        area.x.saturating_add(1),
        area.y.saturating_add(1),
        area.width.saturating_sub(2),
        area.height.saturating_sub(2),
    );
    Rect::new(
        inner.x,
        inner.y,
        COVER_WIDTH.saturating_sub(1).min(inner.width),
        inner.height,
    )
}

pub(crate) struct PreviewCard<'a> {
    markup: &'a PreviewMarkup,
    colors: CardColors,
    selected: bool,
    cover: Option<&'a ImageProtocol>,
}

impl<'a> PreviewCard<'a> {
    pub(crate) fn new(markup: &'a PreviewMarkup, colors: CardColors) -> Self {
        Self {
            markup,
            colors,
            selected: false,
            cover: None,
        }
    }

    /// Without a cover protocol the card shows a swatch instead.
    pub(crate) fn cover(mut self, cover: Option<&'a ImageProtocol>) -> Self {
        self.cover = cover;
        self
    }

    pub(crate) fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}

impl Widget for PreviewCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let CardColors { ink, paper, accent } = self.colors;
        let border_style = if self.selected {
            Style::default().fg(accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .style(Style::default().fg(ink).bg(paper));
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(COVER_WIDTH), Constraint::Min(0)])
            .split(inner);

        match self.cover {
            Some(protocol) => ImageWidget::new(protocol).render(cover_area(area), buf),
            None => {
                let swatch = if self.markup.image.is_empty() {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default().fg(accent)
                };
                let cover_cols = usize::from(COVER_WIDTH.saturating_sub(1));
                let cover_lines: Vec<Line> = (0..inner.height)
                    .map(|_| Line::from(Span::styled("▒".repeat(cover_cols), swatch)))
                    .collect();
                Paragraph::new(Text::from(cover_lines)).render(columns[0], buf);
            }
        }

        let width = usize::from(columns[1].width);
        let mut lines: Vec<Line> = clamp_lines(&self.markup.title, width, TITLE_LINES)
            .into_iter()
            .map(|line| Line::from(Span::styled(line, Style::default().add_modifier(Modifier::BOLD))))
            .collect();
        let author = clamp_lines(&self.markup.author, width, 1)
            .into_iter()
            .next()
            .unwrap_or_default();
        lines.push(Line::from(Span::styled(
            author,
            Style::default().add_modifier(Modifier::DIM),
        )));
        Paragraph::new(Text::from(lines)).render(columns[1], buf);
    }
}
