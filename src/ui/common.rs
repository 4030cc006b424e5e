//! Common UI components.
//!
//! This module contains the header bar, chart tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::App;
use crate::render::format_count;

/// Render the header bar: report, source, record count and scale.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut spans = vec![
        Span::styled(" DIAGCHART ", bold),
        Span::raw("│ "),
        Span::styled(app.report.name(), app.theme.header),
        Span::raw(" │ "),
        Span::raw(app.source_description().to_string()),
    ];

    if app.last_updated.is_none() {
        spans.push(Span::raw(" │ Loading..."));
    } else {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(format_count(app.records.len() as f64), bold));
        spans.push(Span::raw(" records │ scale "));
        spans.push(Span::styled(app.scale.to_string(), bold));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar with one tab per chart of the report.
///
/// Highlights the selected chart.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = app
        .charts()
        .iter()
        .enumerate()
        .map(|(i, chart)| Line::from(format!(" {}:{} ", i + 1, chart.title)))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows time since last update and available controls, or a temporary
/// status message, or the source error.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = "+/-:scale Tab:chart r:reload e:export ?:help q:quit";
    let (status, is_error) = match (&app.load_error, app.last_updated) {
        (Some(err), _) => (format!(" Error: {} | r:retry q:quit", err), true),
        (None, Some(updated)) => (
            format!(" Updated {:.1}s ago | {}", updated.elapsed().as_secs_f64(), controls),
            false,
        ),
        (None, None) => (" Loading... | q:quit".to_string(), false),
    };

    let paragraph = Paragraph::new(status).style(app.theme.status_style(is_error));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current chart.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(title, Style::default().add_modifier(Modifier::BOLD))])
    };
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Charts"),
        Line::from("  Tab/→ l     Next chart"),
        Line::from("  S-Tab/← h   Previous chart"),
        Line::from("  1-9         Jump to chart"),
        Line::from(""),
        section(" Scale"),
        Line::from("  +           Merge more points"),
        Line::from("  -           Merge fewer points"),
        Line::from(""),
        section(" General"),
        Line::from("  r         Reload data"),
        Line::from("  e         Export Chart.js JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled("Press any key to close", app.theme.dim)]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 19u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
