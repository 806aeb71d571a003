//! ratatui-based UI.

use std::collections::HashSet;
use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::Context as _;
use bookbrowse_application::{Browser, SearchField, forms};
use bookbrowse_core::{Rgb, Theme};
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{event, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui_image::Image as ImageWidget;
use ratatui_image::picker::Picker;

mod card;
mod cover;
mod image_protocol;
mod text;

use card::{CARD_HEIGHT, CARD_MIN_WIDTH, CardColors, PreviewCard};
use cover::{CardCovers, CoverCache, DetailImages};
use image_protocol::TermHints;

const EMPTY_MESSAGE: &str = "No results found. Your filters might be too narrow.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiExit {
    Quit,
    /// Re-read the catalog from disk and start over.
    Reload,
}

#[derive(Debug, Clone)]
pub struct UiOutcome {
    pub browser: Browser,
    pub exit: UiExit,
}

pub struct Ui {
    browser: Browser,
    selected: usize,
    scroll_row: usize,
    card_hits: Vec<(usize, Rect)>,
    control_hit: Option<Rect>,
    detail_hit: Option<Rect>,
    image_picker: Picker,
    covers: CoverCache,
    card_covers: CardCovers,
    detail_images: DetailImages,
}

impl Ui {
    pub fn new(browser: Browser) -> Self {
        Self {
            browser,
            selected: 0,
            scroll_row: 0,
            card_hits: Vec::new(),
            control_hit: None,
            detail_hit: None,
            image_picker: Picker::halfblocks(),
            covers: CoverCache::default(),
            card_covers: CardCovers::default(),
            detail_images: DetailImages::default(),
        }
    }

    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    pub fn run(&mut self) -> anyhow::Result<UiOutcome> {
        let mut terminal = setup_terminal()?;
        self.image_picker = image_protocol::picker_for_terminal(&TermHints::from_env());
        let Rgb(r, g, b) = self.browser.palette().light;
        self.image_picker
            .set_background_color(image::Rgba([r, g, b, 255u8]));
        self.card_covers.clear();
        self.detail_images.clear();
        terminal.clear().ok();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.event_loop(&mut terminal)
        }));
        let restore_result = restore_terminal(&mut terminal);

        match (result, restore_result) {
            (Ok(Ok(outcome)), Ok(())) => Ok(outcome),
            (Ok(Ok(_)), Err(err)) => Err(err),
            (Ok(Err(err)), Ok(())) => Err(err),
            (Ok(Err(_)), Err(err)) => Err(err),
            (Err(panic), Ok(())) => Err(anyhow::anyhow!(panic_to_string(panic))),
            (Err(panic), Err(err)) => Err(anyhow::anyhow!(
                "{}\n(additionally failed to restore terminal: {err})",
                panic_to_string(panic)
            )),
        }
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> anyhow::Result<UiOutcome> {
        let tick_rate = Duration::from_millis(250);
        let mut needs_redraw = true;

        loop {
            if needs_redraw {
                terminal.draw(|frame| self.draw(frame.area(), frame))?;
                needs_redraw = false;
            }

            if !event::poll(tick_rate)? {
                continue;
            }

            match event::read()? {
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        continue;
                    }
                    needs_redraw = true;
                    if let Some(exit) = self.handle_key(key)? {
                        return Ok(UiOutcome {
                            browser: self.browser.clone(),
                            exit,
                        });
                    }
                }
                Event::Mouse(mouse) => {
                    needs_redraw |= self.handle_mouse(mouse);
                }
                _ => {}
            }
        }
    }

    /// Routes a key to the topmost open overlay, or to the list.
    pub fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<Option<UiExit>> {
        if self.browser.settings_form().open {
            self.handle_settings_panel_key(key);
            Ok(None)
        } else if self.browser.search_form().open {
            self.handle_search_panel_key(key);
            Ok(None)
        } else if self.browser.detail().open {
            self.handle_detail_key(key);
            Ok(None)
        } else {
            Ok(self.handle_main_key(key))
        }
    }

    fn handle_main_key(&mut self, key: KeyEvent) -> Option<UiExit> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Some(UiExit::Quit),
            KeyCode::Char('r') => return Some(UiExit::Reload),
            KeyCode::Char('/') => self.browser.open_search(),
            KeyCode::Char('s') => self.browser.open_settings(),
            KeyCode::Enter => self.open_selected(),
            KeyCode::Char(' ') | KeyCode::Char('m') => self.activate_control(),
            KeyCode::Char('n') => {
                self.browser.advance_page();
            }
            KeyCode::Char('b') => {
                let was_search = self.browser.state().is_search();
                self.browser.return_to_library();
                if was_search {
                    self.reset_selection();
                }
            }
            KeyCode::Left => self.move_selection(-1),
            KeyCode::Right => self.move_selection(1),
            KeyCode::Up => self.move_selection(-(self.last_columns() as isize)),
            KeyCode::Down => self.move_selection(self.last_columns() as isize),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.browser.list().len().saturating_sub(1),
            _ => {}
        }
        None
    }

    fn handle_search_panel_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('u') {
            self.browser.search_form_mut().reset();
            return;
        }

        let focus = self.browser.search_form().focus;
        match key.code {
            KeyCode::Esc => self.browser.cancel_search(),
            KeyCode::Enter => {
                self.browser.submit_search_form();
                self.reset_selection();
            }
            KeyCode::Tab | KeyCode::Down => {
                self.browser.search_form_mut().focus = focus.next();
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.browser.search_form_mut().focus = focus.prev();
            }
            KeyCode::Left => self.cycle_search_select(focus, -1),
            KeyCode::Right => self.cycle_search_select(focus, 1),
            KeyCode::Backspace => {
                if focus == SearchField::Title {
                    self.browser.search_form_mut().title.pop();
                }
            }
            KeyCode::Char(ch) => {
                if focus == SearchField::Title && !ch.is_control() {
                    self.browser.search_form_mut().title.push(ch);
                }
            }
            _ => {}
        }
    }

    fn cycle_search_select(&mut self, focus: SearchField, step: isize) {
        match focus {
            SearchField::Title => {}
            SearchField::Genre => {
                let options = self.browser.genre_options();
                let form = self.browser.search_form_mut();
                form.genre = forms::cycle_option(&options, &form.genre, step);
            }
            SearchField::Author => {
                let options = self.browser.author_options();
                let form = self.browser.search_form_mut();
                form.author = forms::cycle_option(&options, &form.author, step);
            }
        }
    }

    fn handle_settings_panel_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.browser.cancel_settings(),
            KeyCode::Enter => {
                self.browser.submit_settings();
                let Rgb(r, g, b) = self.browser.palette().light;
                self.image_picker
                    .set_background_color(image::Rgba([r, g, b, 255u8]));
                self.card_covers.clear();
                self.detail_images.clear();
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down | KeyCode::Char(' ') => {
                let form = self.browser.settings_form_mut();
                form.theme = form.theme.toggled();
            }
            _ => {}
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent) {
        if matches!(
            key.code,
            KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('q')
        ) {
            self.close_detail();
        }
    }

    /// Returns whether anything changed.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> bool {
        let at = Position::new(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.browser.settings_form().open || self.browser.search_form().open {
                    return false;
                }
                if self.browser.detail().open {
                    if !self.detail_hit.is_some_and(|area| area.contains(at)) {
                        self.close_detail();
                        return true;
                    }
                    return false;
                }
                if self.control_hit.is_some_and(|area| area.contains(at)) {
                    self.activate_control();
                    return true;
                }
                let hit = self
                    .card_hits
                    .iter()
                    .find(|(_, area)| area.contains(at))
                    .map(|(idx, _)| *idx);
                if let Some(idx) = hit {
                    self.selected = idx;
                    self.open_selected();
                    return true;
                }
                false
            }
            MouseEventKind::ScrollDown if !self.any_overlay_open() => {
                self.move_selection(self.last_columns() as isize);
                true
            }
            MouseEventKind::ScrollUp if !self.any_overlay_open() => {
                self.move_selection(-(self.last_columns() as isize));
                true
            }
            _ => false,
        }
    }

    fn any_overlay_open(&self) -> bool {
        self.browser.settings_form().open
            || self.browser.search_form().open
            || self.browser.detail().open
    }

    fn open_selected(&mut self) {
        self.clamp_selection();
        self.browser.click_preview(self.selected);
    }

    fn close_detail(&mut self) {
        self.browser.close_detail();
        self.detail_images.clear();
    }

    fn activate_control(&mut self) {
        let was_search = self.browser.state().is_search();
        self.browser.activate_control();
        if was_search && !self.browser.state().is_search() {
            self.reset_selection();
        }
    }

    fn reset_selection(&mut self) {
        self.selected = 0;
        self.scroll_row = 0;
    }

    fn clamp_selection(&mut self) {
        let len = self.browser.list().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.browser.list().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let next = (self.selected as isize + delta).clamp(0, len as isize - 1);
        self.selected = next as usize;
    }

    /// Grid width from the last draw, so arrow keys move by whole rows.
    fn last_columns(&self) -> usize {
        let Some((_, first)) = self.card_hits.first() else {
            return 1;
        };
        self.card_hits
            .iter()
            .take_while(|(_, area)| area.y == first.y)
            .count()
            .max(1)
    }

    fn colors(&self) -> CardColors {
        let palette = self.browser.palette();
        CardColors {
            ink: ink(palette.dark),
            paper: ink(palette.light),
            accent: self.accent_color(),
        }
    }

    fn accent_color(&self) -> Color {
        match self.browser.theme() {
            Theme::Day => Color::Blue,
            Theme::Night => Color::Yellow,
        }
    }

    fn base_style(&self) -> Style {
        let colors = self.colors();
        Style::default().fg(colors.ink).bg(colors.paper)
    }

    pub fn draw(&mut self, area: Rect, frame: &mut ratatui::Frame) {
        frame.render_widget(Clear, area);
        frame.render_widget(Block::default().style(self.base_style()), area);
        self.clamp_selection();

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(area);

        let title = Paragraph::new(Text::from(self.main_header_lines()))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::BOTTOM));
        frame.render_widget(title, layout[0]);

        self.draw_list(frame, layout[1]);
        self.draw_control(frame, layout[2]);

        let footer = Paragraph::new(Text::from(self.main_footer_lines()))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::TOP));
        frame.render_widget(footer, layout[3]);

        self.detail_hit = None;
        if self.browser.detail().open {
            self.draw_detail_panel(area, frame);
        }
        if self.browser.search_form().open {
            self.draw_search_panel(area, frame);
        }
        if self.browser.settings_form().open {
            self.draw_settings_panel(area, frame);
        }
    }

    fn main_header_lines(&self) -> Vec<Line<'static>> {
        let state = self.browser.state();
        let mode = if state.is_search() {
            "search results"
        } else {
            "library"
        };
        vec![
            Line::from(vec![
                Span::styled("bookbrowse", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(format!(" · {mode}")),
            ]),
            Line::from(Span::styled(
                format!(
                    "{} of {} shown  |  theme: {}",
                    self.browser.list().len(),
                    state.matches.len(),
                    self.browser.theme()
                ),
                Style::default().fg(Color::Cyan),
            )),
        ]
    }

    fn main_footer_lines(&self) -> Vec<Line<'static>> {
        let key = Style::default().add_modifier(Modifier::BOLD);
        if self.browser.detail().open {
            return vec![Line::from(vec![
                Span::styled("Esc", key),
                Span::raw(" close"),
            ])];
        }
        if self.browser.search_form().open || self.browser.settings_form().open {
            return vec![Line::from(vec![
                Span::styled("Esc", key),
                Span::raw(" cancel  "),
                Span::styled("Enter", key),
                Span::raw(" submit"),
            ])];
        }
        vec![
            Line::from(vec![
                Span::styled("Esc", key),
                Span::raw(" quit  "),
                Span::styled("←↑↓→", key),
                Span::raw(" move  "),
                Span::styled("Enter", key),
                Span::raw(" details  "),
                Span::styled("/", key),
                Span::raw(" search  "),
                Span::styled("s", key),
                Span::raw(" settings"),
            ]),
            Line::from(vec![
                Span::styled("Space", key),
                Span::raw(format!(" {}  ", self.browser.control().label())),
                Span::styled("n", key),
                Span::raw(" more  "),
                Span::styled("b", key),
                Span::raw(" back  "),
                Span::styled("r", key),
                Span::raw(" reload"),
            ]),
        ]
    }

    fn draw_list(&mut self, frame: &mut ratatui::Frame, area: Rect) {
        self.card_hits.clear();

        if self.browser.empty_message_visible() {
            let message = Paragraph::new(Text::from(vec![
                Line::raw(""),
                Line::styled(EMPTY_MESSAGE, Style::default().add_modifier(Modifier::BOLD)),
            ]))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
            frame.render_widget(message, area);
            return;
        }

        let total = self.browser.list().len();
        if total == 0 || area.width == 0 || area.height < CARD_HEIGHT {
            return;
        }

        let columns = usize::from((area.width / CARD_MIN_WIDTH).max(1));
        let card_width = area.width / columns as u16;
        let visible_rows = usize::from((area.height / CARD_HEIGHT).max(1));

        let selected_row = self.selected / columns;
        if selected_row < self.scroll_row {
            self.scroll_row = selected_row;
        } else if selected_row >= self.scroll_row + visible_rows {
            self.scroll_row = selected_row + 1 - visible_rows;
        }

        let colors = self.colors();
        let first = self.scroll_row * columns;
        let last = (first + visible_rows * columns).min(total);
        let mut visible_covers = HashSet::new();
        for idx in first..last {
            let Some(element) = self.browser.list().get(idx) else {
                continue;
            };
            let offset = idx - first;
            let col = (offset % columns) as u16;
            let row = (offset / columns) as u16;
            let card_area = Rect::new(
                area.x + col * card_width,
                area.y + row * CARD_HEIGHT,
                card_width,
                CARD_HEIGHT,
            );
            let source = element.markup().image.as_str();
            let cover_area = card::cover_area(card_area);
            if cover::is_local_source(source) {
                self.card_covers
                    .ensure(&mut self.covers, &self.image_picker, source, cover_area);
                visible_covers.insert((source.to_string(), cover_area));
            }
            let card = PreviewCard::new(element.markup(), colors)
                .selected(idx == self.selected)
                .cover(self.card_covers.get(source, cover_area));
            frame.render_widget(card, card_area);
            self.card_hits.push((idx, card_area));
        }
        self.card_covers.retain_visible(&visible_covers);
    }

    fn draw_control(&mut self, frame: &mut ratatui::Frame, area: Rect) {
        let control = *self.browser.control();
        let label = format!(" {} ", control.label());
        let width = (label.chars().count() as u16 + 2).min(area.width);
        let button_area = Rect::new(
            area.x + area.width.saturating_sub(width) / 2,
            area.y,
            width,
            area.height,
        );
        let style = if control.disabled {
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::DIM)
        } else {
            Style::default()
                .fg(self.accent_color())
                .add_modifier(Modifier::BOLD)
        };
        let button = Paragraph::new(Line::styled(label, style))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(style));
        frame.render_widget(button, button_area);
        self.control_hit = (!control.disabled).then_some(button_area);
    }

    fn draw_search_panel(&self, area: Rect, frame: &mut ratatui::Frame) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .style(self.base_style())
            .title(Span::styled(
                "Search",
                Style::default().add_modifier(Modifier::BOLD),
            ));
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(inner);

        let form = self.browser.search_form();
        let label_style = Style::default().add_modifier(Modifier::BOLD);
        let focus_style = Style::default()
            .fg(self.accent_color())
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        let field_label = |field: SearchField, text: &'static str| {
            if form.focus == field {
                Span::styled(text, focus_style)
            } else {
                Span::styled(text, label_style)
            }
        };

        let genre_options = self.browser.genre_options();
        let author_options = self.browser.author_options();
        let cursor = if form.focus == SearchField::Title {
            "▏"
        } else {
            ""
        };
        let lines = vec![
            Line::from(vec![
                field_label(SearchField::Title, "Title: "),
                Span::raw(format!("{}{cursor}", form.title)),
            ]),
            Line::raw(""),
            Line::from(vec![
                field_label(SearchField::Genre, "Genre: "),
                Span::raw(format!(
                    "< {} >",
                    forms::option_label(&genre_options, &form.genre)
                )),
            ]),
            Line::raw(""),
            Line::from(vec![
                field_label(SearchField::Author, "Author: "),
                Span::raw(format!(
                    "< {} >",
                    forms::option_label(&author_options, &form.author)
                )),
            ]),
        ];
        frame.render_widget(
            Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false }),
            sections[0],
        );

        let key = Style::default().add_modifier(Modifier::BOLD);
        let help_lines = vec![
            Line::from(vec![
                Span::styled("Tab", key),
                Span::raw(" field  "),
                Span::styled("←/→", key),
                Span::raw(" choose  "),
                Span::styled("Ctrl+u", key),
                Span::raw(" clear"),
            ]),
            Line::from(vec![
                Span::styled("Esc", key),
                Span::raw(" cancel  "),
                Span::styled("Enter", key),
                Span::raw(" search"),
            ]),
        ];
        frame.render_widget(
            Paragraph::new(Text::from(help_lines)).wrap(Wrap { trim: true }),
            sections[1],
        );
    }

    fn draw_settings_panel(&self, area: Rect, frame: &mut ratatui::Frame) {
        let popup_area = centered_rect(45, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .style(self.base_style())
            .title(Span::styled(
                "Settings",
                Style::default().add_modifier(Modifier::BOLD),
            ));
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(2)])
            .split(inner);

        let chosen = self.browser.settings_form().theme;
        let line = Line::from(vec![
            Span::styled("Theme: ", Style::default().add_modifier(Modifier::BOLD)),
            option_chip("day", chosen == Theme::Day),
            Span::raw(" "),
            option_chip("night", chosen == Theme::Night),
        ]);
        frame.render_widget(Paragraph::new(line), sections[0]);

        let key = Style::default().add_modifier(Modifier::BOLD);
        let help = Line::from(vec![
            Span::styled("←/→", key),
            Span::raw(" toggle  "),
            Span::styled("Enter", key),
            Span::raw(" save  "),
            Span::styled("Esc", key),
            Span::raw(" cancel"),
        ]);
        frame.render_widget(
            Paragraph::new(help).wrap(Wrap { trim: true }),
            sections[1],
        );
    }

    fn draw_detail_panel(&mut self, area: Rect, frame: &mut ratatui::Frame) {
        let popup_area = centered_rect(80, 80, area);
        frame.render_widget(Clear, popup_area);
        self.detail_hit = Some(popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .style(self.base_style());
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(12u16.min(inner.height / 2)),
                Constraint::Min(0),
            ])
            .split(inner);
        let banner = sections[0];
        let cover_width = 16u16.min(banner.width);
        let cover_area = Rect::new(
            banner.x + banner.width.saturating_sub(cover_width) / 2,
            banner.y,
            cover_width,
            banner.height,
        );

        let detail = self.browser.detail();
        self.detail_images.ensure(
            &mut self.covers,
            &self.image_picker,
            &detail.cover,
            banner,
            cover_area,
        );
        if let Some(backdrop) = self.detail_images.backdrop.as_ref() {
            frame.render_widget(ImageWidget::new(backdrop), banner);
        }
        if let Some(cover) = self.detail_images.cover.as_ref() {
            frame.render_widget(ImageWidget::new(cover), cover_area);
        } else {
            let placeholder = Paragraph::new(Text::from(vec![
                Line::raw(""),
                Line::styled("no cover", Style::default().add_modifier(Modifier::DIM)),
            ]))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
            frame.render_widget(placeholder, cover_area);
        }

        let lines = vec![
            Line::styled(
                detail.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Line::styled(
                detail.subtitle.clone(),
                Style::default().add_modifier(Modifier::DIM),
            ),
            Line::styled(
                detail.genres.join(" · "),
                Style::default().fg(self.accent_color()),
            ),
            Line::raw(""),
            Line::raw(detail.description.clone()),
        ];
        let body = Paragraph::new(Text::from(lines))
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::TOP));
        frame.render_widget(body, sections[1]);
    }
}

fn ink(rgb: Rgb) -> Color {
    let Rgb(r, g, b) = rgb;
    Color::Rgb(r, g, b)
}

fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<Stdout>>> {
    terminal::enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("enter alt screen")?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("create terminal")
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    terminal::disable_raw_mode().context("disable raw mode")?;
    crossterm::execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )
    .context("leave alt screen")?;
    Ok(())
}

fn panic_to_string(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panic: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panic: {s}")
    } else {
        "panic: (unknown payload)".to_string()
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn option_chip(label: &str, selected: bool) -> Span<'static> {
    let base = if selected {
        Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };

    Span::styled(label.to_string(), base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookbrowse_application::ViewMode;
    use bookbrowse_core::{AuthorId, Book, BookId, Catalog, ColorScheme, GenreId};
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;

    fn catalog(count: usize, per_page: usize) -> Catalog {
        let mut catalog = Catalog {
            books_per_page: per_page,
            ..Catalog::default()
        };
        catalog
            .authors
            .insert(AuthorId::new("a1"), "Ann Author".to_string());
        catalog
            .genres
            .insert(GenreId::new("g1"), "Fiction".to_string());
        for n in 1..=count {
            catalog.books.push(Book {
                id: BookId::new(n.to_string()),
                title: format!("Book {n}"),
                author: AuthorId::new("a1"),
                image: String::new(),
                published: "1990-01-01".to_string(),
                description: format!("About book {n}."),
                genres: vec![GenreId::new("g1")],
            });
        }
        catalog
    }

    fn ui(count: usize, per_page: usize) -> Ui {
        Ui::new(Browser::new(catalog(count, per_page), ColorScheme::Light))
    }

    fn press(ui: &mut Ui, code: KeyCode) -> Option<UiExit> {
        ui.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
            .expect("key handled")
    }

    fn type_text(ui: &mut Ui, text: &str) {
        for ch in text.chars() {
            press(ui, KeyCode::Char(ch));
        }
    }

    fn render(ui: &mut Ui, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).expect("terminal");
        terminal
            .draw(|frame| ui.draw(frame.area(), frame))
            .expect("draw");
        buffer_text(terminal.backend().buffer())
    }

    fn buffer_text(buf: &Buffer) -> String {
        let mut out = String::new();
        for y in buf.area.y..buf.area.y + buf.area.height {
            for x in buf.area.x..buf.area.x + buf.area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn draws_cards_and_control() {
        let mut ui = ui(6, 4);
        let screen = render(&mut ui, 120, 40);
        assert!(screen.contains("Book 1"));
        assert!(screen.contains("Book 4"));
        assert!(!screen.contains("Book 5"));
        assert!(screen.contains("Show more (2)"));
        assert!(screen.contains("Ann Author"));
    }

    #[test]
    fn space_shows_more() {
        let mut ui = ui(6, 4);
        press(&mut ui, KeyCode::Char(' '));
        assert_eq!(ui.browser().list().len(), 6);
        let screen = render(&mut ui, 120, 40);
        assert!(screen.contains("Book 6"));
        assert!(screen.contains("Show more (0)"));
    }

    #[test]
    fn search_flow_through_keys() {
        let mut ui = ui(12, 4);
        press(&mut ui, KeyCode::Char('/'));
        assert!(ui.browser().search_form().open);
        type_text(&mut ui, "book 1");
        press(&mut ui, KeyCode::Enter);

        assert_eq!(ui.browser().state().mode, ViewMode::Search);
        assert_eq!(ui.browser().list().book_ids(), vec!["1", "10", "11", "12"]);
        let screen = render(&mut ui, 120, 40);
        assert!(screen.contains("Back to Library"));
        assert!(screen.contains("search results"));

        press(&mut ui, KeyCode::Char(' '));
        assert_eq!(ui.browser().state().mode, ViewMode::Library);
    }

    #[test]
    fn empty_search_shows_message() {
        let mut ui = ui(3, 4);
        press(&mut ui, KeyCode::Char('/'));
        type_text(&mut ui, "zzz-no-match");
        press(&mut ui, KeyCode::Enter);
        let screen = render(&mut ui, 120, 40);
        assert!(screen.contains(EMPTY_MESSAGE));
    }

    #[test]
    fn search_selects_cycle_with_arrows() {
        let mut ui = ui(3, 4);
        press(&mut ui, KeyCode::Char('/'));
        press(&mut ui, KeyCode::Tab);
        press(&mut ui, KeyCode::Right);
        assert_eq!(
            ui.browser().search_form().genre.selected(),
            Some(&GenreId::new("g1"))
        );
        let screen = render(&mut ui, 120, 40);
        assert!(screen.contains("< Fiction >"));

        press(&mut ui, KeyCode::Esc);
        assert!(!ui.browser().search_form().open);
        assert_eq!(ui.browser().state().mode, ViewMode::Library);
    }

    #[test]
    fn enter_opens_detail_and_esc_closes() {
        let mut ui = ui(6, 4);
        render(&mut ui, 120, 40);
        press(&mut ui, KeyCode::Right);
        press(&mut ui, KeyCode::Enter);
        assert!(ui.browser().detail().open);
        assert_eq!(ui.browser().detail().title, "Book 2");

        let screen = render(&mut ui, 120, 40);
        assert!(screen.contains("Ann Author (1990)"));
        assert!(screen.contains("About book 2."));

        assert_eq!(press(&mut ui, KeyCode::Esc), None);
        assert!(!ui.browser().detail().open);
    }

    #[test]
    fn settings_toggle_theme() {
        let mut ui = ui(2, 4);
        press(&mut ui, KeyCode::Char('s'));
        press(&mut ui, KeyCode::Right);
        press(&mut ui, KeyCode::Enter);
        assert_eq!(ui.browser().theme(), Theme::Night);
        assert!(!ui.browser().settings_form().open);
    }

    #[test]
    fn mouse_click_on_card_opens_detail() {
        let mut ui = ui(6, 4);
        render(&mut ui, 120, 40);
        let (_, area) = ui.card_hits[2];
        let changed = ui.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: area.x + 1,
            row: area.y + 1,
            modifiers: KeyModifiers::NONE,
        });
        assert!(changed);
        assert_eq!(ui.browser().detail().title, "Book 3");
    }

    #[test]
    fn readable_local_cover_is_drawn_on_its_card() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("red.png");
        image::RgbaImage::from_pixel(40, 60, image::Rgba([200, 30, 30, 255])).save(&path)?;

        let mut catalog = catalog(2, 4);
        catalog.books[0].image = path.to_string_lossy().to_string();
        catalog.books[1].image = dir.path().join("missing.png").to_string_lossy().to_string();
        let mut ui = Ui::new(Browser::new(catalog, ColorScheme::Light));

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).expect("terminal");
        terminal
            .draw(|frame| ui.draw(frame.area(), frame))
            .expect("draw");
        let buf = terminal.backend().buffer();

        let with_cover = card::cover_area(ui.card_hits[0].1);
        let without_cover = card::cover_area(ui.card_hits[1].1);
        assert_ne!(buf[(with_cover.x, with_cover.y)].symbol(), "▒");
        assert_eq!(buf[(without_cover.x, without_cover.y)].symbol(), "▒");
        Ok(())
    }

    #[test]
    fn detail_lists_genre_names() {
        let mut ui = ui(2, 4);
        press(&mut ui, KeyCode::Enter);
        let screen = render(&mut ui, 120, 40);
        assert!(screen.contains("Fiction"));
    }

    #[test]
    fn option_chip_highlights_only_the_chosen_value() {
        let chosen = option_chip("night", true);
        let other = option_chip("day", false);
        assert!(chosen.style.add_modifier.contains(Modifier::REVERSED));
        assert!(!other.style.add_modifier.contains(Modifier::REVERSED));
        assert_eq!(other.style.fg, Some(Color::Gray));
    }

    #[test]
    fn quit_and_reload_keys() {
        let mut ui = ui(1, 4);
        assert_eq!(press(&mut ui, KeyCode::Char('r')), Some(UiExit::Reload));
        assert_eq!(press(&mut ui, KeyCode::Esc), Some(UiExit::Quit));
    }
}
