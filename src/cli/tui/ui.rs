//! UI rendering for the TUI.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Wrap},
};

use crate::core::results::NO_FILES_PLACEHOLDER;
use crate::core::{ProgressDisplay, ResultsView, StatusStyle};

use super::app::{Field, TuiApp};

/// Main render function.
pub fn render(frame: &mut Frame, app: &TuiApp) {
    let page = app.page();

    let mut constraints = vec![
        Constraint::Length(3),                            // Header
        Constraint::Length(Field::ALL.len() as u16 + 2), // Form
    ];
    if page.progress.is_some() {
        constraints.push(Constraint::Length(6));
    }
    constraints.push(Constraint::Min(0)); // Results
    constraints.push(Constraint::Length(3)); // Footer

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(frame.area());

    let mut next = 0;
    let mut take = || {
        let area = chunks[next];
        next += 1;
        area
    };

    render_header(frame, app, take());
    render_form(frame, app, take());
    if let Some(progress) = &page.progress {
        render_progress(frame, progress, take());
    }
    let results_area = take();
    if let Some(results) = &page.results {
        render_results(frame, results, page.results_scroll, results_area);
    }
    render_footer(frame, app, take());

    if let Some(message) = &page.notification {
        render_notification(frame, message);
    }
}

fn render_header(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let title = if app.page().busy {
        "MAILGRAB  PDF retrieval  (working...)"
    } else {
        "MAILGRAB  PDF retrieval"
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(block, area);
}

fn render_form(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let block = Block::default()
        .title("New Job")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let lines: Vec<Line> = Field::ALL
        .iter()
        .map(|&field| {
            let focused = field == app.form.focus;
            let value = app.form.value(field);
            let shown = if field.masked() {
                "•".repeat(value.chars().count())
            } else {
                value.to_string()
            };

            let label_style = if focused {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Cyan)
            };

            Line::from(vec![
                Span::raw(if focused { "> " } else { "  " }),
                Span::styled(format!("{:<14}", field.label()), label_style),
                Span::raw(shown),
                Span::raw(if focused { "_" } else { "" }),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn status_color(style: StatusStyle) -> Color {
    match style {
        StatusStyle::Connecting => Color::Yellow,
        StatusStyle::Completed => Color::Green,
        StatusStyle::Error => Color::Red,
        StatusStyle::Neutral => Color::White,
    }
}

fn render_progress(frame: &mut Frame, progress: &ProgressDisplay, area: Rect) {
    let block = Block::default()
        .title("Progress")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Status message
            Constraint::Length(1), // Gauge
            Constraint::Length(2), // Counters
        ])
        .split(inner);

    let message = Paragraph::new(Span::styled(
        format!(" {}", progress.message),
        Style::default().fg(status_color(progress.style)),
    ));
    frame.render_widget(message, rows[0]);

    // The gauge only accepts ratios in 0..=1.
    let ratio = (progress.bar_percent / 100.0).clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(ratio)
        .label(format!("{:.0}%", progress.bar_percent));
    frame.render_widget(gauge, rows[1]);

    let counters = Paragraph::new(vec![
        Line::from(format!(" {}", progress.progress_text)),
        Line::from(Span::styled(
            format!(" {}", progress.download_text),
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    frame.render_widget(counters, rows[2]);
}

fn render_results(frame: &mut Frame, results: &ResultsView, scroll: u16, area: Rect) {
    let block = Block::default()
        .title(format!("Downloaded Files ({})", results.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let items = match results {
        ResultsView::Empty => {
            let text = Paragraph::new(format!("  {NO_FILES_PLACEHOLDER}"))
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(text, area);
            return;
        }
        ResultsView::Items(items) => items,
    };

    let list_items: Vec<ListItem> = items
        .iter()
        .skip(scroll as usize)
        .map(|item| {
            ListItem::new(vec![
                Line::from(Span::styled(
                    format!("  {}", item.name),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(format!("    From: {}   Date: {}", item.from, item.date)),
                Line::from(format!("    Subject: {}", item.subject)),
                Line::from(Span::styled(
                    format!("    {}", item.download_url),
                    Style::default().fg(Color::Blue),
                )),
            ])
        })
        .collect();

    frame.render_widget(List::new(list_items).block(block), area);
}

fn render_footer(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let help_text = if app.page().notification.is_some() {
        "[Enter/Esc] Dismiss"
    } else if app.page().busy {
        "[Tab] Next field  [PgUp/PgDn] Scroll  [Esc] Quit    Working..."
    } else {
        "[Tab] Next field  [Enter] Start  [PgUp/PgDn] Scroll  [Esc] Quit"
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let paragraph = Paragraph::new(Line::from(format!("  {}", help_text))).block(block);
    frame.render_widget(paragraph, area);
}

fn render_notification(frame: &mut Frame, message: &str) {
    let area = centered(frame.area(), 60, 7);
    let block = Block::default()
        .title("Notice")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let paragraph = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to continue",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .wrap(Wrap { trim: true })
    .block(block);

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

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

    #[test]
    fn centered_fits_inside_small_areas() {
        let area = Rect::new(0, 0, 40, 5);
        let popup = centered(area, 60, 7);
        assert_eq!(popup, Rect::new(0, 0, 40, 5));

        let popup = centered(Rect::new(0, 0, 100, 30), 60, 7);
        assert_eq!(popup, Rect::new(20, 11, 60, 7));
    }

    #[test]
    fn status_colors() {
        assert_eq!(status_color(StatusStyle::Error), Color::Red);
        assert_eq!(status_color(StatusStyle::Neutral), Color::White);
    }
}
