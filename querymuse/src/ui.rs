//! UI rendering for the TUI.

use chrono::{DateTime, Local, Utc};
use querymuse_core::format::{count_noun, format_relative_time};
use querymuse_core::table::TableOutput;
use querymuse_core::types::{Message, MessageKind, StageStatus};
use querymuse_core::STAGE_COUNT;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Gauge, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::app::{App, Panel};

// ========== Palette ==========

/// Accent for headers and the active panel border
const ACCENT: Color = Color::Rgb(200, 60, 60);
/// Secondary accent for gauges and highlights
const ACCENT_ALT: Color = Color::Rgb(138, 43, 226);
/// User message label color
const USER_COLOR: Color = Color::Rgb(0, 180, 180);
/// System message label color
const SYSTEM_COLOR: Color = Color::Rgb(80, 160, 80);
/// Error message color
const ERROR_COLOR: Color = Color::Rgb(220, 80, 80);
/// Dim gray for secondary text
const DIM: Color = Color::Rgb(128, 128, 128);
/// Completed stage color
const STAGE_DONE: Color = Color::Rgb(50, 205, 50);
/// Active stage color
const STAGE_ACTIVE: Color = Color::Rgb(220, 180, 0);

/// Render the application UI.
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    let columns = Layout::horizontal([
        Constraint::Length(34), // Sidebar
        Constraint::Min(40),    // Chat column
    ])
    .split(area);

    render_sidebar(frame, app, columns[0]);
    render_chat_column(frame, app, columns[1]);
}

// ========== Sidebar ==========

fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let halves = Layout::vertical([
        Constraint::Percentage(50), // History
        Constraint::Percentage(50), // Bookmarks
    ])
    .split(area);

    render_history_panel(frame, app, halves[0]);
    render_bookmark_panel(frame, app, halves[1]);
}

fn panel_block(title: String, focused: bool) -> Block<'static> {
    let border_style = if focused {
        Style::default().fg(ACCENT)
    } else {
        Style::default().fg(DIM)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style)
        .title(title)
}

fn render_history_panel(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.panel == Panel::History;
    let entries = app.history.entries();

    let mut lines: Vec<Line> = Vec::new();
    if focused {
        lines.push(Line::from(vec![
            Span::styled("Search: ", Style::default().fg(DIM)),
            Span::raw(app.sidebar_query.clone()),
            Span::styled("█", Style::default().fg(ACCENT)),
        ]));
    }
    lines.push(Line::from(Span::styled(
        format!("Window: {}  (Ctrl-T)", app.history.time_filter().label()),
        Style::default().fg(DIM),
    )));
    lines.push(Line::default());

    if app.history.is_searching() {
        lines.push(Line::from(Span::styled(
            "Searching...",
            Style::default().fg(ACCENT_ALT),
        )));
    } else if entries.is_empty() {
        let hint = if app.history.search_query().is_empty() {
            "No conversations yet"
        } else {
            "No conversations found"
        };
        lines.push(Line::from(Span::styled(hint, Style::default().fg(DIM))));
    } else {
        for (i, entry) in entries.iter().enumerate() {
            let selected = focused && i == app.history_selected;
            let marker = if selected { "> " } else { "  " };
            let title_style = if selected {
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.push(Line::from(vec![
                Span::styled(marker, title_style),
                Span::styled(entry.title.clone(), title_style),
            ]));
            lines.push(Line::from(Span::styled(
                format!("    {} · {}", format_relative_time(entry.timestamp), truncate(&entry.preview, 24)),
                Style::default().fg(DIM),
            )));
        }
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!("{} found", count_noun(entries.len(), "conversation")),
            Style::default().fg(DIM),
        )));
    }

    let block = panel_block("History".to_string(), focused);
    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

fn render_bookmark_panel(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.panel == Panel::Bookmarks;
    let bookmarks = app.visible_bookmarks();

    let mut lines: Vec<Line> = Vec::new();
    if focused {
        lines.push(Line::from(vec![
            Span::styled("Search: ", Style::default().fg(DIM)),
            Span::raw(app.sidebar_query.clone()),
            Span::styled("█", Style::default().fg(ACCENT)),
        ]));
    }
    let tag_label = app.bookmark_tag.clone().unwrap_or_else(|| "All".to_string());
    lines.push(Line::from(Span::styled(
        format!("Tag: {}  (Ctrl-T)", tag_label),
        Style::default().fg(DIM),
    )));
    lines.push(Line::default());

    if bookmarks.is_empty() {
        let hint = if app.bookmarks.is_empty() {
            "No bookmarks yet"
        } else {
            "No bookmarks match your search"
        };
        lines.push(Line::from(Span::styled(hint, Style::default().fg(DIM))));
    } else {
        for (i, bookmark) in bookmarks.iter().enumerate() {
            let selected = focused && i == app.bookmark_selected;
            let marker = if selected { "> " } else { "  " };
            let title_style = if selected {
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.push(Line::from(vec![
                Span::styled(marker, title_style),
                Span::styled(bookmark.title.clone(), title_style),
            ]));
            let tags = if bookmark.tags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", bookmark.tags.join(", "))
            };
            lines.push(Line::from(Span::styled(
                format!(
                    "    {}{}",
                    format_relative_time(bookmark.timestamp),
                    tags
                ),
                Style::default().fg(DIM),
            )));
        }
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!("{} shown", count_noun(bookmarks.len(), "bookmark")),
            Style::default().fg(DIM),
        )));
    }

    let block = panel_block(format!("Bookmarks ({})", app.bookmarks.len()), focused);
    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

// ========== Chat column ==========

fn render_chat_column(frame: &mut Frame, app: &mut App, area: Rect) {
    let thinking = app.session.is_loading();
    let has_table = app.table.is_some() && !thinking;

    let mut constraints = vec![
        Constraint::Length(3), // Header
        Constraint::Min(6),    // Messages
    ];
    if thinking {
        constraints.push(Constraint::Length((STAGE_COUNT + 5) as u16));
    }
    if has_table {
        constraints.push(Constraint::Length(12));
    }
    constraints.push(Constraint::Length(3)); // Input
    constraints.push(Constraint::Length(1)); // Footer

    let chunks = Layout::vertical(constraints).split(area);
    let mut idx = 0;

    render_header(frame, app, chunks[idx]);
    idx += 1;
    render_messages(frame, app, chunks[idx]);
    idx += 1;
    if thinking {
        render_thinking(frame, app, chunks[idx]);
        idx += 1;
    }
    if has_table {
        render_table(frame, app, chunks[idx]);
        idx += 1;
    }
    render_input(frame, app, chunks[idx]);
    idx += 1;
    render_footer(frame, app, chunks[idx]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = Line::from(vec![
        Span::styled(
            "querymuse",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("NL2SQL Assistant", Style::default().fg(DIM)),
        Span::raw("  "),
        Span::styled(
            format!("{} messages", app.session.messages().len()),
            Style::default().fg(DIM),
        ),
    ]);
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(DIM));
    frame.render_widget(Paragraph::new(title).block(block), area);
}

fn render_messages(frame: &mut Frame, app: &App, area: Rect) {
    let messages = app.session.messages();

    if messages.is_empty() {
        let welcome = vec![
            Line::default(),
            Line::from(Span::styled(
                "Welcome to the NL2SQL Assistant",
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Ask me anything about your enterprise data in natural language",
                Style::default().fg(DIM),
            )),
            Line::default(),
            Line::from(Span::styled(
                "  \"What is MTD collection in Mumbai?\"",
                Style::default().fg(DIM),
            )),
            Line::from(Span::styled(
                "  \"Show budget achievement by channel\"",
                Style::default().fg(DIM),
            )),
        ];
        let paragraph = Paragraph::new(welcome)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    for message in messages {
        lines.extend(message_lines(message));
        lines.push(Line::default());
    }

    // Keep the newest messages visible
    let height = area.height.saturating_sub(1) as usize;
    let scroll = lines.len().saturating_sub(height) as u16;

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

fn message_lines(message: &Message) -> Vec<Line<'static>> {
    let (label, color) = match message.kind {
        MessageKind::User => ("You", USER_COLOR),
        MessageKind::System if message.error => ("Assistant", ERROR_COLOR),
        MessageKind::System => ("Assistant", SYSTEM_COLOR),
    };

    let mut header = vec![
        Span::styled(
            label,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", format_local_time(message.timestamp)),
            Style::default().fg(DIM),
        ),
    ];
    if let Some(tool) = &message.tool {
        header.push(Span::styled(
            format!("  via {}", tool),
            Style::default().fg(DIM),
        ));
    }
    if message.has_table() {
        header.push(Span::styled("  [table]", Style::default().fg(ACCENT_ALT)));
    }

    let content_style = if message.error {
        Style::default().fg(ERROR_COLOR)
    } else {
        Style::default()
    };

    let mut lines = vec![Line::from(header)];
    for text in message.content.lines() {
        lines.push(Line::from(Span::styled(text.to_string(), content_style)));
    }
    lines
}

fn render_thinking(frame: &mut Frame, app: &App, area: Rect) {
    let simulator = app.session.simulator();
    let stage_number = simulator.active_index().map(|i| i + 1).unwrap_or(0);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT_ALT))
        .title(format!("Processing Query — Stage {} of {}", stage_number, STAGE_COUNT));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::vertical([
        Constraint::Length(1),                // Gauge
        Constraint::Length(STAGE_COUNT as u16), // Stage list
    ])
    .split(inner);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(ACCENT_ALT))
        .percent(simulator.progress_percent())
        .label(format!("{}% Complete", simulator.progress_percent()));
    frame.render_widget(gauge, rows[0]);

    let mut lines: Vec<Line> = Vec::new();
    for stage in simulator.stages() {
        let (icon, style) = match stage.status {
            StageStatus::Completed => ("✓", Style::default().fg(STAGE_DONE)),
            StageStatus::Active => ("▶", Style::default().fg(STAGE_ACTIVE).add_modifier(Modifier::BOLD)),
            StageStatus::Error => ("✗", Style::default().fg(ERROR_COLOR)),
            StageStatus::Pending => ("○", Style::default().fg(DIM)),
        };
        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", icon), style),
            Span::styled(stage.title.clone(), style),
            Span::styled(
                format!(" — {}", stage.description),
                Style::default().fg(DIM),
            ),
        ]));
    }
    frame.render_widget(Paragraph::new(lines), rows[1]);
}

fn render_table(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(view) = &mut app.table else {
        return;
    };

    let sort_hint = match view.sort_field() {
        Some(field) => format!(
            " sort: {} {}",
            field,
            match view.sort_direction() {
                querymuse_core::SortDirection::Ascending => "▲",
                querymuse_core::SortDirection::Descending => "▼",
            }
        ),
        None => String::new(),
    };

    match view.process() {
        TableOutput::NoData => {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(DIM))
                .title("Results");
            frame.render_widget(
                Paragraph::new("No data available")
                    .style(Style::default().fg(DIM))
                    .alignment(Alignment::Center)
                    .block(block),
                area,
            );
        }
        TableOutput::Page(page) => {
            let window = querymuse_core::table::page_window(page.page, page.page_count)
                .iter()
                .map(|n| {
                    if *n == page.page {
                        format!("[{}]", n)
                    } else {
                        n.to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(" ");
            let title = format!("Results — {} — {}{}", page.summary(), window, sort_hint);
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(SYSTEM_COLOR))
                .title(title);

            let header = Row::new(
                page.columns
                    .iter()
                    .map(|col| {
                        Cell::from(col.header.clone())
                            .style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
                    })
                    .collect::<Vec<_>>(),
            );

            let rows: Vec<Row> = page
                .rows
                .iter()
                .map(|row| {
                    Row::new(
                        page.columns
                            .iter()
                            .map(|col| Cell::from(cell_text(row, &col.key)))
                            .collect::<Vec<_>>(),
                    )
                })
                .collect();

            let widths = vec![
                Constraint::Ratio(1, page.columns.len().max(1) as u32);
                page.columns.len()
            ];

            let table = Table::new(rows, widths).header(header).block(block);
            frame.render_widget(table, area);
        }
    }
}

fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.panel == Panel::Chat;
    let (text, style) = if app.session.is_loading() {
        (
            "Thinking...".to_string(),
            Style::default().fg(DIM),
        )
    } else {
        (format!("{}█", app.input), Style::default())
    };

    let block = panel_block("Ask a question about your data".to_string(), focused);
    frame.render_widget(Paragraph::new(Span::styled(text, style)).block(block), area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let text = if let Some(status) = &app.status {
        status.clone()
    } else {
        match app.panel {
            Panel::Chat => {
                "Enter send · Tab panels · ^L clear · ^B bookmark · ^E export · ^N/^P page · ^O sort · Esc quit"
                    .to_string()
            }
            Panel::History => {
                "type to search · ↑/↓ select · Del delete · ^T window · Tab panels · Esc quit"
                    .to_string()
            }
            Panel::Bookmarks => {
                "type to search · ↑/↓ select · Del delete · ^T tag · Tab panels · Esc quit"
                    .to_string()
            }
        }
    };
    frame.render_widget(
        Paragraph::new(Span::styled(text, Style::default().fg(DIM))),
        area,
    );
}

// ========== Helpers ==========

/// String form of a table cell for display.
fn cell_text(row: &querymuse_core::Row, key: &str) -> String {
    match row.get(key) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(value) => value.to_string(),
        None => String::new(),
    }
}

/// Message timestamps render in local wall-clock time.
fn format_local_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%H:%M:%S").to_string()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
