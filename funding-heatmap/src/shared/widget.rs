//! Ratatui rendering for the funding heatmap
//!
//! Everything here reads [`ViewState`]; the only thing written back is the
//! [`HeatmapUi`] cursor and cell map used for mouse hit-testing.

use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame,
};

use super::{
    classify::{classify, Bucket, LEGEND},
    format::{
        format_percentage, format_price, format_rate, format_usd, format_usd_with,
        opportunity_text, trade_url,
    },
    state::ViewState,
    types::{AssetRecord, Side},
};

const C_LONG: Color = Color::Rgb(34, 197, 94);
const C_SHORT: Color = Color::Rgb(239, 68, 68);
const C_DIM: Color = Color::Rgb(120, 120, 120);
const C_BRIGHT: Color = Color::Rgb(220, 220, 220);
const C_ACCENT: Color = Color::Rgb(100, 180, 220);
const C_HEADER: Color = Color::Rgb(180, 130, 220);
const C_WARN: Color = Color::Rgb(248, 113, 113);
const C_CELL_TEXT: Color = Color::Rgb(15, 23, 42);
const C_PANEL_BG: Color = Color::Rgb(18, 18, 28);

/// Grid cell footprint including borders
pub const CELL_WIDTH: u16 = 16;
pub const CELL_HEIGHT: u16 = 5;

const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];

/// Presentation-only state: grid cursor, spinner frame and last cell layout
#[derive(Debug, Default)]
pub struct HeatmapUi {
    /// Index into the visible list
    pub cursor: usize,
    /// Incremented by the view loop, drives the spinner
    pub tick: usize,
    columns: usize,
    cells: Vec<(Rect, String)>,
}

impl HeatmapUi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Columns in the last rendered grid (at least 1)
    pub fn columns(&self) -> usize {
        self.columns.max(1)
    }

    /// Move the cursor by whole cells/rows, staying inside `len`
    pub fn move_cursor(&mut self, dx: i64, dy: i64, len: usize) {
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let target = self.cursor as i64 + dx + dy * self.columns() as i64;
        self.cursor = target.clamp(0, len as i64 - 1) as usize;
    }

    pub fn clamp_cursor(&mut self, len: usize) {
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    /// Asset name under a terminal position, from the last render
    pub fn hit(&self, column: u16, row: u16) -> Option<&str> {
        self.cells
            .iter()
            .find(|(rect, _)| {
                column >= rect.x
                    && column < rect.x + rect.width
                    && row >= rect.y
                    && row < rect.y + rect.height
            })
            .map(|(_, name)| name.as_str())
    }
}

/// Fill color of a bucket
pub fn bucket_color(bucket: Bucket) -> Color {
    let (r, g, b) = bucket.rgb();
    Color::Rgb(r, g, b)
}

fn side_color(side: Side) -> Color {
    match side {
        Side::Long => C_LONG,
        Side::Short => C_SHORT,
    }
}

/// Layout of the grid: which visible indices land in which rectangles.
///
/// Rows scroll so the cursor row is always on screen.
pub fn grid_layout(area: Rect, count: usize, cursor: usize) -> (usize, Vec<(usize, Rect)>) {
    let columns = (area.width / CELL_WIDTH).max(1) as usize;
    let rows_on_screen = (area.height / CELL_HEIGHT).max(1) as usize;
    let cursor_row = cursor.min(count.saturating_sub(1)) / columns;
    let first_row = cursor_row.saturating_sub(rows_on_screen - 1);

    let start = first_row * columns;
    let end = count.min((first_row + rows_on_screen) * columns);

    let cells = (start..end)
        .map(|index| {
            let offset = index - start;
            let col = (offset % columns) as u16;
            let row = (offset / columns) as u16;
            let rect = Rect {
                x: area.x + col * CELL_WIDTH,
                y: area.y + row * CELL_HEIGHT,
                width: CELL_WIDTH.min(area.width),
                height: CELL_HEIGHT.min(area.height),
            };
            (index, rect)
        })
        .collect();

    (columns, cells)
}

/// Render the whole screen
pub fn render_heatmap(f: &mut Frame, state: &ViewState, ui: &mut HeatmapUi) {
    let area = f.area();
    f.render_widget(Block::default().style(Style::default().bg(C_PANEL_BG)), area);

    if state.shows_initial_loading() {
        ui.cells.clear();
        render_loading(f, area, ui.tick, "Loading Hyperliquid data...");
        return;
    }
    if state.shows_fullscreen_error() && state.is_loading() {
        ui.cells.clear();
        render_loading(f, area, ui.tick, "Retrying...");
        return;
    }
    if state.shows_fullscreen_error() {
        ui.cells.clear();
        render_fullscreen_error(f, area, state.catalog.error_message().unwrap_or_default());
        return;
    }

    let banner_height = if state.catalog.error_message().is_some() { 1 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(5),
            Constraint::Length(banner_height),
            Constraint::Min(CELL_HEIGHT),
            Constraint::Length(5),
        ])
        .split(area);

    let visible = state.visible();
    ui.clamp_cursor(visible.len());

    render_header(f, chunks[0], state, ui.tick);
    render_threshold(f, chunks[1], state, visible.len());
    if let Some(message) = state.catalog.error_message() {
        render_error_banner(f, chunks[2], message);
    }
    render_grid(f, chunks[3], &visible, ui);
    render_legend(f, chunks[4]);

    if let Some(asset) = state.selected_asset() {
        render_detail(f, area, asset);
    }
}

fn render_loading(f: &mut Frame, area: Rect, tick: usize, label: &str) {
    let spinner = SPINNER[tick % SPINNER.len()];
    let text = Paragraph::new(Line::from(vec![
        Span::styled(format!("{spinner} "), Style::default().fg(C_ACCENT)),
        Span::styled(label.to_string(), Style::default().fg(C_BRIGHT)),
    ]))
    .alignment(Alignment::Center);

    f.render_widget(text, centered(area, 40, 1));
}

fn render_fullscreen_error(f: &mut Frame, area: Rect, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(C_SHORT));

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(C_WARN))),
        Line::from(""),
        Line::from(vec![
            Span::styled("[R] Retry", Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD)),
            Span::styled("   [Q] Quit", Style::default().fg(C_DIM)),
        ]),
    ];

    let popup = centered(area, 50, 6);
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines).block(block).alignment(Alignment::Center).wrap(Wrap { trim: true }),
        popup,
    );
}

fn render_header(f: &mut Frame, area: Rect, state: &ViewState, tick: usize) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(C_HEADER));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(30)])
        .split(inner);

    let title = vec![
        Line::from(Span::styled(
            "◆ Hyperliquid Funding Tracker",
            Style::default().fg(C_HEADER).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(
                "Real-time funding rates with annualized returns • Tracking {} perpetual assets",
                state.catalog.len()
            ),
            Style::default().fg(C_DIM),
        )),
    ];
    f.render_widget(Paragraph::new(title), halves[0]);

    let refresh = if state.is_loading() {
        Span::styled(
            format!("{} Refreshing", SPINNER[tick % SPINNER.len()]),
            Style::default().fg(C_ACCENT),
        )
    } else {
        Span::styled("[R] Refresh", Style::default().fg(C_BRIGHT))
    };
    let updated = state
        .catalog
        .last_updated_at()
        .map(|t| format!("Last update: {}", t.with_timezone(&Local).format("%H:%M:%S")))
        .unwrap_or_default();

    f.render_widget(
        Paragraph::new(vec![
            Line::from(refresh),
            Line::from(Span::styled(updated, Style::default().fg(C_DIM))),
        ])
        .alignment(Alignment::Right),
        halves[1],
    );
}

fn render_threshold(f: &mut Frame, area: Rect, state: &ViewState, shown: usize) {
    let threshold = &state.threshold;
    let block = Block::default()
        .title(" Minimum Liquidity (USD) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(C_ACCENT));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                format!("{}+", format_usd(threshold.min_liquidity_usd())),
                Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
            ),
            Span::styled("   [+/-] 0.1M  [PgUp/PgDn] 1M", Style::default().fg(C_DIM)),
        ])),
        rows[0],
    );

    f.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(C_ACCENT).bg(Color::Rgb(40, 40, 55)))
            .ratio(threshold.ratio())
            .label(""),
        rows[1],
    );

    let bound_label = format_usd_with(threshold.max_liquidity_bound_millions() * 1_000_000.0, 2);
    let summary = format!("Showing {} of {} assets", shown, state.catalog.len());
    let footer = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(6),
            Constraint::Min(0),
            Constraint::Length(bound_label.len() as u16),
        ])
        .split(rows[2]);

    f.render_widget(Paragraph::new(Span::styled("$0", Style::default().fg(C_DIM))), footer[0]);
    f.render_widget(
        Paragraph::new(Span::styled(summary, Style::default().fg(C_BRIGHT))).alignment(Alignment::Center),
        footer[1],
    );
    f.render_widget(
        Paragraph::new(Span::styled(bound_label, Style::default().fg(C_DIM))).alignment(Alignment::Right),
        footer[2],
    );
}

fn render_error_banner(f: &mut Frame, area: Rect, message: &str) {
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(" ⚠ ", Style::default().fg(C_WARN).add_modifier(Modifier::BOLD)),
            Span::styled(message.to_string(), Style::default().fg(C_WARN)),
            Span::styled("  (showing last good data)", Style::default().fg(C_DIM)),
        ])),
        area,
    );
}

fn render_grid(f: &mut Frame, area: Rect, visible: &[&AssetRecord], ui: &mut HeatmapUi) {
    ui.cells.clear();

    if visible.is_empty() {
        ui.columns = 1;
        f.render_widget(
            Paragraph::new(Span::styled(
                "No assets match the current liquidity filter",
                Style::default().fg(C_DIM),
            ))
            .alignment(Alignment::Center),
            centered(area, area.width, 1),
        );
        return;
    }

    let (columns, cells) = grid_layout(area, visible.len(), ui.cursor);
    ui.columns = columns;

    for (index, rect) in cells {
        let asset = visible[index];
        render_cell(f, rect, asset, index == ui.cursor);
        ui.cells.push((rect, asset.name.clone()));
    }
}

fn render_cell(f: &mut Frame, area: Rect, asset: &AssetRecord, focused: bool) {
    let bucket = classify(asset.annualized_return);
    let fill = bucket_color(bucket);

    let (border_type, border_color) = if focused {
        (BorderType::Thick, C_ACCENT)
    } else if bucket.is_emphasized() {
        (BorderType::Plain, Color::White)
    } else {
        (BorderType::Plain, fill)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(Style::default().fg(border_color).bg(fill))
        .style(Style::default().bg(fill).fg(C_CELL_TEXT));

    let arrow = if asset.annualized_return > 0.0 { "▲" } else { "▼" };
    let lines = vec![
        Line::from(Span::styled(asset.name.clone(), Style::default().add_modifier(Modifier::BOLD))),
        Line::from(format!("{arrow} {}", format_percentage(asset.annualized_return))),
        Line::from(Span::styled(
            format_usd(asset.liquidity_usd),
            Style::default().fg(Color::Rgb(51, 65, 85)),
        )),
    ];

    f.render_widget(Paragraph::new(lines).block(block).alignment(Alignment::Center), area);
}

fn render_legend(f: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(" Color Legend (Annualized Return) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(C_DIM));

    let mut spans = Vec::with_capacity(LEGEND.len() * 2);
    for entry in LEGEND.iter() {
        spans.push(Span::styled("  ", Style::default().bg(bucket_color(entry.bucket))));
        spans.push(Span::styled(format!(" {}  ", entry.label), Style::default().fg(C_BRIGHT)));
    }

    let help = Line::from(Span::styled(
        "[←↑↓→] Move  [Enter] Details  [R] Refresh  [Q] Quit",
        Style::default().fg(C_DIM),
    ));

    f.render_widget(
        Paragraph::new(vec![Line::from(spans), help]).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_detail(f: &mut Frame, area: Rect, asset: &AssetRecord) {
    let side = asset.side();
    let popup = centered(area, 64, 19);
    f.render_widget(Clear, popup);

    let title = Line::from(vec![
        Span::styled(
            format!(" {} ", asset.name),
            Style::default().fg(C_BRIGHT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("[{}] ", side),
            Style::default().fg(side_color(side)).add_modifier(Modifier::BOLD),
        ),
    ]);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(C_ACCENT))
        .style(Style::default().bg(C_PANEL_BG));

    let field = |label: &str, value: String, color: Color| {
        Line::from(vec![
            Span::styled(format!("{:<22}", label), Style::default().fg(C_DIM)),
            Span::styled(value, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        ])
    };

    let lines = vec![
        Line::from(Span::styled("Perpetual futures funding details", Style::default().fg(C_DIM))),
        Line::from(""),
        field("Annualized Return", format_percentage(asset.annualized_return), side_color(side)),
        field("Hourly Funding Rate", format_rate(asset.funding_rate), C_BRIGHT),
        field("Mark Price", format_price(asset.mark_price), C_BRIGHT),
        field("Liquidity (OI)", format_usd(asset.liquidity_usd), C_BRIGHT),
        field("24h Volume", format_usd(asset.day_volume), C_BRIGHT),
        field("Premium", format_rate(asset.premium), C_BRIGHT),
        Line::from(""),
        Line::from(vec![
            Span::styled("Opportunity: ", Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD)),
            Span::styled(opportunity_text(asset), Style::default().fg(C_ACCENT)),
        ]),
        Line::from(Span::styled(
            "Funding is paid hourly based on the difference between perpetual and spot prices.",
            Style::default().fg(C_DIM),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Trade: ", Style::default().fg(C_DIM)),
            Span::styled(trade_url(&asset.name), Style::default().fg(C_ACCENT)),
        ]),
        Line::from(Span::styled("[O] Trade on Hyperliquid   [Esc] Close", Style::default().fg(C_BRIGHT))),
    ];

    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), popup);
}

/// Rectangle of at most `width` x `height` centered in `area`
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::{
        catalog::Snapshot,
        error::FetchError,
        state::ViewEvent,
        types::asset,
    };
    use ratatui::{backend::TestBackend, Terminal};

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn loaded_state() -> ViewState {
        let mut state = ViewState::new();
        state.apply(ViewEvent::FetchStarted { generation: 1 });
        state.apply(ViewEvent::FetchCompleted {
            generation: 1,
            outcome: Ok(Snapshot::new(vec![
                asset("BTC", 12.5, 8_500_000.0),
                asset("ETH", -61.0, 4_000_000.0),
                asset("SOL", 3.0, 800_000.0),
            ])),
            received_at: chrono::Utc::now(),
        });
        state
    }

    #[test]
    fn test_grid_layout_wraps_and_scrolls() {
        let area = Rect::new(0, 0, CELL_WIDTH * 3, CELL_HEIGHT * 2);

        let (columns, cells) = grid_layout(area, 10, 0);
        assert_eq!(columns, 3);
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[4], (4, Rect::new(CELL_WIDTH, CELL_HEIGHT, CELL_WIDTH, CELL_HEIGHT)));

        // Cursor on the last item scrolls so its row is the bottom row
        let (_, cells) = grid_layout(area, 10, 9);
        assert_eq!(cells.first().map(|c| c.0), Some(6));
        assert_eq!(cells.last().map(|c| c.0), Some(9));
        assert_eq!(cells[3].1.y, CELL_HEIGHT);
    }

    #[test]
    fn test_cursor_movement_is_bounded() {
        let mut ui = HeatmapUi::new();
        ui.columns = 4;

        ui.move_cursor(1, 0, 10);
        assert_eq!(ui.cursor, 1);
        ui.move_cursor(0, 1, 10);
        assert_eq!(ui.cursor, 5);
        ui.move_cursor(0, 5, 10);
        assert_eq!(ui.cursor, 9);
        ui.move_cursor(-20, 0, 10);
        assert_eq!(ui.cursor, 0);
        ui.move_cursor(1, 0, 0);
        assert_eq!(ui.cursor, 0);
    }

    #[test]
    fn test_render_grid_and_hit_test() {
        let state = loaded_state();
        let mut ui = HeatmapUi::new();
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();

        terminal.draw(|f| render_heatmap(f, &state, &mut ui)).unwrap();
        let text = screen_text(&terminal);

        assert!(text.contains("Hyperliquid Funding Tracker"));
        assert!(text.contains("Showing 3 of 3 assets"));
        assert!(text.contains("-61.00%"));
        assert!(text.contains(">50% (Long)"));

        // First cell holds the largest magnitude
        let (rect, name) = ui.cells[0].clone();
        assert_eq!(name, "ETH");
        assert_eq!(ui.hit(rect.x + 1, rect.y + 1), Some("ETH"));
        assert_eq!(ui.hit(0, 0), None);
    }

    #[test]
    fn test_render_detail_popup() {
        let mut state = loaded_state();
        state.apply(ViewEvent::Select("BTC".to_string()));
        let mut ui = HeatmapUi::new();
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();

        terminal.draw(|f| render_heatmap(f, &state, &mut ui)).unwrap();
        let text = screen_text(&terminal);

        assert!(text.contains("[Long]"));
        assert!(text.contains("Hourly Funding Rate"));
        assert!(text.contains("https://app.hyperliquid.xyz/trade/BTC"));
    }

    #[test]
    fn test_render_empty_filter_and_fullscreen_error() {
        let mut state = loaded_state();
        state.apply(ViewEvent::SetThreshold(9.5));
        let mut ui = HeatmapUi::new();
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| render_heatmap(f, &state, &mut ui)).unwrap();
        assert!(screen_text(&terminal).contains("No assets match the current liquidity filter"));
        assert_eq!(ui.hit(60, 20), None);

        let mut failed = ViewState::new();
        failed.apply(ViewEvent::FetchStarted { generation: 1 });
        failed.apply(ViewEvent::FetchCompleted {
            generation: 1,
            outcome: Err(FetchError::Transport("refused".to_string())),
            received_at: chrono::Utc::now(),
        });
        terminal.draw(|f| render_heatmap(f, &failed, &mut ui)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("Failed to fetch data from server"));
        assert!(text.contains("[R] Retry"));
    }

    #[test]
    fn test_retry_after_failed_first_load_shows_progress() {
        let mut state = ViewState::new();
        state.apply(ViewEvent::FetchStarted { generation: 1 });
        state.apply(ViewEvent::FetchCompleted {
            generation: 1,
            outcome: Err(FetchError::Transport("refused".to_string())),
            received_at: chrono::Utc::now(),
        });
        state.apply(ViewEvent::FetchStarted { generation: 2 });

        let mut ui = HeatmapUi::new();
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| render_heatmap(f, &state, &mut ui)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("Retrying..."));
        assert!(!text.contains("[R] Retry"));

        state.apply(ViewEvent::FetchCompleted {
            generation: 2,
            outcome: Err(FetchError::Transport("refused".to_string())),
            received_at: chrono::Utc::now(),
        });
        terminal.draw(|f| render_heatmap(f, &state, &mut ui)).unwrap();
        assert!(screen_text(&terminal).contains("[R] Retry"));
    }
}
