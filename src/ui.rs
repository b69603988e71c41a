use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use ratatui::{Frame, Terminal};
use tracing::debug;
use unicode_width::UnicodeWidthChar;

use crate::data::ImageSource;
use crate::dispatcher::Dispatcher;
use crate::grid::{GridHandle, GridOptions, GridView, PointerEvent, PointerTarget};
use crate::layout::GridLayout;
use crate::state::{Action, AppState, CatalogStatus};

const COLOR_BG: Color = Color::Rgb(30, 30, 46);
const COLOR_PANEL_SELECTED_BG: Color = Color::Rgb(69, 71, 90);
const COLOR_BORDER_IDLE: Color = Color::Rgb(49, 50, 68);
const COLOR_BORDER_FOCUSED: Color = Color::Rgb(137, 180, 250);
const COLOR_TEXT_PRIMARY: Color = Color::Rgb(205, 214, 244);
const COLOR_TEXT_SECONDARY: Color = Color::Rgb(166, 173, 200);
const COLOR_ACCENT: Color = Color::Rgb(137, 180, 250);
const COLOR_SUCCESS: Color = Color::Rgb(166, 227, 161);
const COLOR_ERROR: Color = Color::Rgb(243, 139, 168);

/// Paints a [`GridView`] onto the cell rectangles of a [`GridLayout`].
pub struct GridWidget<'a> {
    view: &'a GridView,
    layout: &'a GridLayout,
}

impl<'a> GridWidget<'a> {
    pub fn new(view: &'a GridView, layout: &'a GridLayout) -> Self {
        Self { view, layout }
    }
}

impl Widget for GridWidget<'_> {
    fn render(self, _area: Rect, buf: &mut Buffer) {
        for cell in self.view.cells() {
            let Some(rect) = self.layout.cell(cell.index()) else {
                continue;
            };
            let border = if cell.holds_overlay() {
                COLOR_BORDER_FOCUSED
            } else {
                COLOR_BORDER_IDLE
            };
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border));
            let inner = block.inner(rect);
            let label = fit_label(&cell.logo().alt, inner.width as usize);
            Paragraph::new(centered(vec![Line::from(label)], inner.height))
                .alignment(Alignment::Center)
                .style(Style::default().fg(COLOR_TEXT_PRIMARY))
                .block(block)
                .render(rect, buf);

            if cell.holds_overlay() {
                render_overlay(self.view, GridLayout::overlay_area(rect), buf);
            }
        }
    }
}

fn render_overlay(view: &GridView, area: Rect, buf: &mut Buffer) {
    let overlay = view.overlay();
    let button_style = if overlay.is_subscribed() {
        Style::default().fg(COLOR_TEXT_SECONDARY)
    } else {
        Style::default()
            .fg(COLOR_ACCENT)
            .add_modifier(Modifier::BOLD)
    };
    let width = area.width as usize;
    let lines = vec![
        Line::from(Span::styled(
            fit_label(overlay.media_name(), width),
            Style::default()
                .fg(COLOR_TEXT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(fit_label(overlay.label(), width), button_style)),
    ];
    Clear.render(area, buf);
    Paragraph::new(centered(lines, area.height))
        .alignment(Alignment::Center)
        .style(Style::default().bg(COLOR_PANEL_SELECTED_BG))
        .render(area, buf);
}

fn centered(lines: Vec<Line<'static>>, height: u16) -> Text<'static> {
    let pad = (height as usize).saturating_sub(lines.len()) / 2;
    let mut out = vec![Line::default(); pad];
    out.extend(lines);
    Text::from(out)
}

fn fit_label(text: &str, width: usize) -> String {
    let total: usize = text.chars().filter_map(UnicodeWidthChar::width).sum();
    if total <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

fn status_line(state: &AppState) -> Line<'static> {
    let hint = Span::styled(
        "  ←/→ page · s subscribe · q quit",
        Style::default().fg(COLOR_TEXT_SECONDARY),
    );
    let main = match &state.catalog {
        CatalogStatus::Loading => {
            Span::styled("Loading catalog…", Style::default().fg(COLOR_ACCENT))
        }
        CatalogStatus::Failed(reason) => Span::styled(
            format!("Catalog unavailable: {reason}"),
            Style::default().fg(COLOR_ERROR),
        ),
        CatalogStatus::Loaded => {
            let grid = &state.grid;
            let mut text = format!(
                "Page {}/{} · {} outlets · {} subscribed",
                grid.page + 1,
                grid.page_count().max(1),
                grid.images.len(),
                state.subscriptions.len()
            );
            if let Some(media) = state.hovered_media() {
                text.push_str(&format!(" · {}", media.alt));
            }
            Span::styled(text, Style::default().fg(COLOR_SUCCESS))
        }
    };
    Line::from(vec![main, hint])
}

pub struct Options {
    pub dispatcher: Dispatcher,
    pub source: Arc<dyn ImageSource>,
    pub grid: GridOptions,
    pub tick_rate: Duration,
}

pub struct Model {
    dispatcher: Dispatcher,
    grid: GridHandle,
    layout: Option<GridLayout>,
    pointer_inside: bool,
    needs_redraw: bool,
    tick_rate: Duration,
}

impl Model {
    pub fn new(options: Options) -> Self {
        let grid = GridHandle::mount(&options.dispatcher, options.source, options.grid);
        Self {
            dispatcher: options.dispatcher,
            grid,
            layout: None,
            pointer_inside: false,
            needs_redraw: true,
            tick_rate: options.tick_rate,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode()?;
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        terminal.backend_mut().execute(DisableMouseCapture)?;
        terminal.backend_mut().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let mut last_tick = Instant::now();

        loop {
            if self.grid.poll_images() {
                self.mark_dirty();
            }

            if self.needs_redraw {
                terminal.draw(|frame| self.draw(frame))?;
                self.needs_redraw = false;
            }

            let timeout = self
                .tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_millis(16));

            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if self.handle_key(key.code) {
                            break;
                        }
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    Event::Resize(_, _) => self.mark_dirty(),
                    _ => {}
                }
            }

            if last_tick.elapsed() >= self.tick_rate {
                last_tick = Instant::now();
            }
        }

        Ok(())
    }

    fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') => self.turn_page(1),
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p') => self.turn_page(-1),
            KeyCode::Char('s') | KeyCode::Enter => self.toggle_hovered_subscription(),
            _ => {}
        }
        false
    }

    fn handle_mouse(&mut self, event: MouseEvent) {
        match event.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                self.pointer_at(event.column, event.row);
            }
            MouseEventKind::Down(MouseButton::Left) => {
                let owner = self.grid.view().overlay_owner();
                let target = self
                    .layout
                    .as_ref()
                    .and_then(|layout| layout.hit(event.column, event.row, owner));
                if target == Some(PointerTarget::Overlay) {
                    self.toggle_hovered_subscription();
                }
            }
            _ => {}
        }
    }

    fn pointer_at(&mut self, column: u16, row: u16) {
        let Some(layout) = self.layout.as_ref() else {
            return;
        };
        let owner = self.grid.view().overlay_owner();
        match layout.hit(column, row, owner) {
            Some(target) => {
                self.pointer_inside = true;
                if self.grid.handle_pointer(PointerEvent::Over(target)) {
                    self.mark_dirty();
                }
            }
            None if self.pointer_inside => {
                self.pointer_inside = false;
                self.grid.handle_pointer(PointerEvent::Leave);
                self.mark_dirty();
            }
            None => {}
        }
    }

    fn turn_page(&mut self, delta: isize) {
        let grid = self.dispatcher.state().grid;
        let last = grid.page_count().saturating_sub(1);
        let page = grid.page.saturating_add_signed(delta).min(last);
        if page != grid.page {
            debug!(page, "turn page");
            self.dispatcher.dispatch(Action::SetPage { page });
            // Page changes do not move the overlay; replay the hover so it
            // follows the outlet now under the pointer.
            if grid.is_hover {
                self.dispatcher.dispatch(Action::TurnOffSubscriptionCover);
                self.dispatcher.dispatch(Action::TurnOnSubscriptionCover {
                    hovered_cell_index: grid.hover_index,
                });
            }
            self.mark_dirty();
        }
    }

    fn toggle_hovered_subscription(&mut self) {
        let name = {
            let view = self.grid.view();
            if view.overlay_owner().is_none() {
                return;
            }
            view.overlay().media_name().to_string()
        };
        let state = self.dispatcher.state();
        let action = if state.is_subscribed(&name) {
            Action::Unsubscribe { name }
        } else {
            Action::Subscribe { name }
        };
        self.dispatcher.dispatch(action);
        self.mark_dirty();
    }

    pub fn draw(&mut self, frame: &mut Frame<'_>) {
        let area = frame.size();
        frame.render_widget(Block::default().style(Style::default().bg(COLOR_BG)), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(4), Constraint::Length(1)])
            .split(area);

        let layout = GridLayout::new(chunks[0]);
        {
            let view = self.grid.view();
            frame.render_widget(GridWidget::new(&view, &layout), chunks[0]);
        }
        self.layout = Some(layout);

        let status = Paragraph::new(status_line(&self.dispatcher.state()));
        frame.render_widget(status, chunks[1]);
    }
}
