//! The chart pane.

use ratatui::{
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::render::{ChartRenderer, TuiRenderer};

/// Render the selected chart, or a placeholder while there is none.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let Some(chart) = app.current_chart() else {
        let message = if app.last_updated.is_some() { " No charts" } else { " Waiting for data..." };
        frame.render_widget(Paragraph::new(message).style(app.theme.dim).block(block), area);
        return;
    };

    let title = Line::styled(format!(" {} ", chart.title), app.theme.header);
    match TuiRenderer::new().render(chart) {
        Ok(prepared) => {
            let prepared = prepared.block(block.title(title));
            frame.render_widget(&prepared, area);
        }
        Err(e) => {
            tracing::warn!(chart = %chart.id, error = %e, "cannot draw chart");
            let paragraph = Paragraph::new(format!(" {}", e))
                .style(app.theme.status_style(true))
                .block(block.title(title));
            frame.render_widget(paragraph, area);
        }
    }
}
