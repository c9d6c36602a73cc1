use anyhow::Result;
use chrono::Utc;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

use feedboard::client::DashboardClient;
use feedboard::drag::{apply_intent, DragController, DropTarget};
use feedboard::layout::{project, DashboardLayout, FeedCard};
use feedboard::normalize::normalize_feed_order;
use feedboard::session::{Session, REMEDIATION_HINTS};
use feedboard::store::{PreferenceStore, COUNT_CHOICES};

const THEMES: [&str; 3] = ["warm-neutral", "midnight", "paper"];

const TICK: Duration = Duration::from_millis(250);

/// Screen regions that accept a drop, rebuilt on every draw.
struct HitZones {
    /// Card header rects: where a drag can start.
    headers: Vec<(Rect, String, i64)>,
    /// Whole-card rects and column end-zones: where a drag can land.
    targets: Vec<(Rect, DropTarget)>,
}

impl HitZones {
    fn empty() -> Self {
        HitZones {
            headers: Vec::new(),
            targets: Vec::new(),
        }
    }

    fn header_at(&self, x: u16, y: u16) -> Option<(&str, i64)> {
        self.headers
            .iter()
            .find(|(rect, _, _)| contains(*rect, x, y))
            .map(|(_, key, column)| (key.as_str(), *column))
    }

    fn target_at(&self, x: u16, y: u16) -> Option<DropTarget> {
        self.targets
            .iter()
            .find(|(rect, _)| contains(*rect, x, y))
            .map(|(_, target)| target.clone())
    }
}

fn contains(rect: Rect, x: u16, y: u16) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

pub struct App {
    store: PreferenceStore,
    client: DashboardClient,
    session: Session,
    drag: DragController,
    layout: Option<DashboardLayout>,
    zones: HitZones,
    theme: String,
    /// Selected card index in column-major order, for keyboard handling.
    selected: usize,
}

impl App {
    pub fn new(store: PreferenceStore, client: DashboardClient) -> Self {
        let theme = store.load_theme();
        Self {
            store,
            client,
            session: Session::new(),
            drag: DragController::new(),
            layout: None,
            zones: HitZones::empty(),
            theme,
            selected: 0,
        }
    }

    pub fn refresh(&mut self) {
        let result = self.client.fetch();
        self.session.apply_fetch(result, Utc::now());
        self.reproject();
    }

    /// Recompute normalization and projection from the cached snapshot.
    /// Runs fresh on every call so a refresh landing mid-gesture can never
    /// leave a stale layout behind; drag subjects are looked up by identity.
    fn reproject(&mut self) {
        self.layout = self.session.data().and_then(|data| {
            let keys = data.feed_keys();
            let order = normalize_feed_order(&keys, &self.store);
            project(&data.feeds, &order, &self.store.load_counts())
        });
        let count = self.card_count();
        if count > 0 && self.selected >= count {
            self.selected = count - 1;
        }
    }

    fn card_count(&self) -> usize {
        self.layout.as_ref().map_or(0, DashboardLayout::card_count)
    }

    /// Cards in column-major order, matching the `selected` index.
    fn cards(&self) -> Vec<&FeedCard> {
        self.layout
            .iter()
            .flat_map(|l| l.columns.iter().flatten())
            .collect()
    }

    fn selected_card(&self) -> Option<&FeedCard> {
        self.cards().get(self.selected).copied()
    }

    fn select_next(&mut self) {
        let count = self.card_count();
        if count > 0 {
            self.selected = (self.selected + 1) % count;
        }
    }

    fn select_previous(&mut self) {
        let count = self.card_count();
        if count > 0 {
            self.selected = (self.selected + count - 1) % count;
        }
    }

    /// Step the selected feed's item count through the selectable set and
    /// re-project from the cached snapshot; no network round-trip.
    fn step_count(&mut self, delta: i64) {
        let Some(card) = self.selected_card() else {
            return;
        };
        let key = card.key.clone();
        let current = self.store.feed_count(&key);
        let idx = COUNT_CHOICES
            .iter()
            .position(|&c| c >= current)
            .unwrap_or(COUNT_CHOICES.len() - 1) as i64;
        let next = (idx + delta).clamp(0, COUNT_CHOICES.len() as i64 - 1) as usize;
        self.store.set_feed_count(&key, COUNT_CHOICES[next]);
        self.reproject();
    }

    fn cycle_theme(&mut self) {
        let idx = THEMES
            .iter()
            .position(|&t| t == self.theme)
            .map_or(0, |i| (i + 1) % THEMES.len());
        self.theme = THEMES[idx].to_string();
        self.store.save_theme(&self.theme);
    }

    fn accent(&self) -> Color {
        match self.theme.as_str() {
            "midnight" => Color::Blue,
            "paper" => Color::Gray,
            _ => Color::Yellow,
        }
    }

    fn on_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some((key, column)) = self.zones.header_at(mouse.column, mouse.row) {
                    let (key, column) = (key.to_string(), column);
                    self.drag.start(key, column);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let target = self.zones.target_at(mouse.column, mouse.row);
                self.drag.hover(target);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if self.drag.is_dragging() {
                    let target = self.zones.target_at(mouse.column, mouse.row);
                    if let Some(intent) = self.drag.drop(target) {
                        self.commit_move(&intent);
                    }
                }
            }
            _ => {}
        }
    }

    fn commit_move(&mut self, intent: &feedboard::drag::MoveIntent) {
        let Some(data) = self.session.data() else {
            return;
        };
        let keys = data.feed_keys();
        let order = normalize_feed_order(&keys, &self.store);
        let next = apply_intent(&order, &keys, intent);
        tracing::debug!(?intent, "committing feed move");
        self.store.save_order(&next);
        self.reproject();
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(TICK)? {
            match event::read()? {
                Event::Key(key) => match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Esc => {
                        if app.drag.is_dragging() {
                            app.drag.cancel();
                        } else {
                            return Ok(());
                        }
                    }
                    KeyCode::Char('r') => app.refresh(),
                    KeyCode::Char('x') => app.session.dismiss_overlay(),
                    KeyCode::Char('t') => app.cycle_theme(),
                    KeyCode::Down | KeyCode::Char('j') => app.select_next(),
                    KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
                    KeyCode::Left | KeyCode::Char('h') => app.step_count(-1),
                    KeyCode::Right | KeyCode::Char('l') => app.step_count(1),
                    _ => {}
                },
                Event::Mouse(mouse) => app.on_mouse(mouse),
                _ => {}
            }
        }

        let now = Utc::now();
        app.session.tick(now);
        if app.session.refresh_due(now) {
            app.refresh();
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    app.zones = HitZones::empty();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),  // Title bar
            Constraint::Length(10), // Markets + recommendations
            Constraint::Min(0),     // Feed columns
            Constraint::Length(1),  // Status bar
        ])
        .split(f.size());

    render_title(f, chunks[0], app);

    if app.session.has_data() {
        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[1]);
        render_market(f, top[0], app);
        render_recommendations(f, top[1], app);
        render_feed_columns(f, chunks[2], app);
    } else {
        render_no_data(f, chunks[1].union(chunks[2]), app);
    }

    render_status_bar(f, chunks[3], app);

    if app.session.overlay().is_some() {
        render_overlay(f, app);
    }
}

fn render_title(f: &mut Frame, area: Rect, app: &App) {
    let now = Utc::now();
    let line = Line::from(vec![
        Span::styled(
            " feedboard ",
            Style::default()
                .fg(app.accent())
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("│ "),
        Span::styled(app.theme.clone(), Style::default().fg(Color::DarkGray)),
        Span::raw(" │ "),
        Span::styled(
            format!("{} UTC", now.format("%H:%M")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_market(f: &mut Frame, area: Rect, app: &App) {
    let Some(data) = app.session.data() else {
        return;
    };
    let now = Utc::now();

    let mut lines = Vec::new();
    for stock in &data.stocks {
        let mut spans = vec![
            Span::styled(
                format!(" {:<6}", stock.symbol),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(sparkline(&stock.trend), Style::default().fg(Color::DarkGray)),
            Span::raw(" "),
        ];
        if stock.has_quote() {
            spans.push(Span::raw(format!("{:>9.2} ", stock.price)));
            let up = stock.change >= 0.0;
            spans.push(Span::styled(
                stock.change_label(),
                Style::default().fg(if up { Color::Cyan } else { Color::Red }),
            ));
        } else {
            spans.push(Span::styled("— (no data)", Style::default().fg(Color::DarkGray)));
        }
        lines.push(Line::from(spans));
    }

    if !data.timezones.is_empty() {
        lines.push(Line::from(""));
        let mut zone_spans = vec![Span::raw(" ")];
        for tz in data.timezones.iter().filter(|tz| tz.is_valid()) {
            zone_spans.push(Span::styled(
                format!("{} ", tz.city),
                Style::default().fg(Color::DarkGray),
            ));
            zone_spans.push(Span::styled(
                tz.local_time(now),
                Style::default().add_modifier(Modifier::BOLD),
            ));
            zone_spans.push(Span::raw("  "));
        }
        lines.push(Line::from(zone_spans));
    }

    let card = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Markets ")
            .title_style(Style::default().fg(app.accent())),
    );
    f.render_widget(card, area);
}

fn render_recommendations(f: &mut Frame, area: Rect, app: &App) {
    let Some(data) = app.session.data() else {
        return;
    };

    let visible = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = data
        .recommendations
        .iter()
        .take(visible)
        .map(|item| {
            let meta = if item.source.is_empty() {
                item.age.clone()
            } else {
                format!("{} · {}", item.age, item.source)
            };
            Line::from(vec![
                Span::styled(
                    format!(" {:>3}% ", item.score_percent()),
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                ),
                Span::raw(truncated(&item.title, area.width.saturating_sub(30) as usize)),
                Span::styled(format!("  {meta}"), Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();

    let card = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Recommended For You ")
            .title_style(Style::default().fg(app.accent())),
    );
    f.render_widget(card, area);
}

fn render_feed_columns(f: &mut Frame, area: Rect, app: &mut App) {
    let Some(layout) = app.layout.clone() else {
        return;
    };
    let now = Utc::now();
    let dragging = app.drag.is_dragging();
    let subject = app.drag.subject().map(str::to_string);
    let hover = app.drag.hover_target().cloned();
    let selected_key = app.selected_card().map(|c| c.key.clone());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(34),
            Constraint::Percentage(33),
        ])
        .split(area);

    for (col_index, col_area) in columns.iter().enumerate() {
        let cards = &layout.columns[col_index];

        // One slot per card plus a drop zone at the column's end.
        let mut constraints: Vec<Constraint> = cards
            .iter()
            .map(|card| Constraint::Max(card.items.len() as u16 + 2))
            .collect();
        constraints.push(Constraint::Min(1));
        let slots = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(*col_area);

        for (card, slot) in cards.iter().zip(slots.iter()) {
            render_feed_card(
                f,
                *slot,
                app,
                card,
                now,
                subject.as_deref() == Some(card.key.as_str()),
                hover == Some(DropTarget::Card(card.key.clone())),
                selected_key.as_deref() == Some(card.key.as_str()),
            );
            if slot.height > 0 {
                let header = Rect { height: 1, ..*slot };
                app.zones
                    .headers
                    .push((header, card.key.clone(), col_index as i64));
                app.zones
                    .targets
                    .push((*slot, DropTarget::Card(card.key.clone())));
            }
        }

        // End-zone: the remainder of the column.
        let zone = slots[cards.len()];
        let zone_hovered = hover == Some(DropTarget::ColumnEnd(col_index as i64));
        if dragging {
            let style = if zone_hovered {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let marker = Paragraph::new("▼ drop here ▼")
                .alignment(Alignment::Center)
                .style(style);
            f.render_widget(marker, zone);
        }
        app.zones
            .targets
            .push((zone, DropTarget::ColumnEnd(col_index as i64)));
    }
}

#[allow(clippy::too_many_arguments)]
fn render_feed_card(
    f: &mut Frame,
    area: Rect,
    app: &App,
    card: &FeedCard,
    now: chrono::DateTime<Utc>,
    is_subject: bool,
    is_hovered: bool,
    is_selected: bool,
) {
    if area.height == 0 {
        return;
    }

    let border = if is_subject {
        Style::default().fg(app.accent()).add_modifier(Modifier::BOLD)
    } else if is_hovered {
        Style::default().fg(Color::Green)
    } else if is_selected {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(hex_color(&card.accent))
    };

    let lines: Vec<Line> = card
        .items
        .iter()
        .map(|item| {
            let style = if item.is_old(now) {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(
                    format!(
                        " {} ",
                        truncated(&item.title, area.width.saturating_sub(12) as usize)
                    ),
                    style,
                ),
                Span::styled(
                    item.humanized_age(now),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();

    let title = format!(" {} · {} items ", card.title, card.item_count);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_no_data(f: &mut Frame, area: Rect, app: &App) {
    let style = Style::default().fg(Color::DarkGray);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "No data available yet.",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("Waiting for {}", app.client.dashboard_url()),
            style,
        )),
        Line::from(Span::styled("Press r to retry now.", style)),
    ];
    let panel = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(panel, area);
}

fn render_overlay(f: &mut Frame, app: &App) {
    let Some(overlay) = app.session.overlay() else {
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            "⚠ Failed to refresh dashboard",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(overlay.message.clone()),
        Line::from(""),
    ];
    if overlay.is_sticky() {
        lines.push(Line::from("Please check:"));
        for hint in REMEDIATION_HINTS {
            lines.push(Line::from(format!("  • {hint}")));
        }
    } else {
        lines.push(Line::from(Span::styled(
            "Showing cached data. Will retry in 5 minutes.",
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(Span::styled(
            "Press x to dismiss.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let height = lines.len() as u16 + 2;
    let width = 52.min(f.size().width.saturating_sub(4));
    let area = Rect {
        x: f.size().width.saturating_sub(width + 2),
        y: 1,
        width,
        height: height.min(f.size().height.saturating_sub(2)),
    };

    f.render_widget(Clear, area);
    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );
    f.render_widget(panel, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let hint = if app.drag.is_dragging() {
        format!(
            " dragging {}: release over a card or drop zone, Esc cancels",
            app.drag.subject().unwrap_or("?")
        )
    } else {
        " q quit │ r refresh │ j/k select │ h/l items │ t theme │ drag headers with the mouse"
            .to_string()
    };
    let bar = Paragraph::new(Line::from(Span::styled(
        hint,
        Style::default().fg(Color::DarkGray),
    )));
    f.render_widget(bar, area);
}

/// "#rrggbb" accent from the backend, falling back to cyan.
/// The backend is not trusted here: arbitrary strings must never break
/// the render.
fn hex_color(hex: &str) -> Color {
    let raw = hex.strip_prefix('#').unwrap_or(hex);
    if raw.len() != 6 || !raw.is_ascii() {
        return Color::Cyan;
    }
    match (
        u8::from_str_radix(&raw[0..2], 16),
        u8::from_str_radix(&raw[2..4], 16),
        u8::from_str_radix(&raw[4..6], 16),
    ) {
        (Ok(r), Ok(g), Ok(b)) => Color::Rgb(r, g, b),
        _ => Color::Cyan,
    }
}

fn sparkline(trend: &[i64]) -> String {
    const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
    if trend.is_empty() {
        return String::new();
    }
    let min = *trend.iter().min().unwrap_or(&0);
    let max = *trend.iter().max().unwrap_or(&0);
    let span = (max - min).max(1) as f64;
    trend
        .iter()
        .map(|&v| {
            let idx = (((v - min) as f64 / span) * (BARS.len() - 1) as f64).round() as usize;
            BARS[idx.min(BARS.len() - 1)]
        })
        .collect()
}

fn truncated(text: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_color_parses_rrggbb() {
        assert_eq!(hex_color("#ff8800"), Color::Rgb(0xff, 0x88, 0x00));
        assert_eq!(hex_color("4ba6cd"), Color::Rgb(0x4b, 0xa6, 0xcd));
    }

    #[test]
    fn hex_color_never_panics_on_backend_strings() {
        // Wrong length, bad digits, and multi-byte characters whose byte
        // count still looks like six all fall back instead of slicing.
        assert_eq!(hex_color(""), Color::Cyan);
        assert_eq!(hex_color("#fff"), Color::Cyan);
        assert_eq!(hex_color("zzzzzz"), Color::Cyan);
        assert_eq!(hex_color("aéaaa"), Color::Cyan);
        assert_eq!(hex_color("#ааа"), Color::Cyan);
    }

    #[test]
    fn sparkline_scales_into_bar_range() {
        assert_eq!(sparkline(&[]), "");
        let bars = sparkline(&[0, 5, 10]);
        assert_eq!(bars.chars().count(), 3);
        assert!(bars.starts_with('▁'));
        assert!(bars.ends_with('█'));
    }

    #[test]
    fn truncated_respects_char_boundaries() {
        assert_eq!(truncated("short", 10), "short");
        assert_eq!(truncated("a long headline", 7), "a long…");
        assert_eq!(truncated("ééééé", 3), "éé…");
    }
}
