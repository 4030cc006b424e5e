//! Plain-text chart summaries.

use std::fmt::Write;

use super::format::{format_count, format_millis, format_tick};
use super::{check_shape, ChartRenderer};
use crate::chart::{AxisId, ChartConfig, DatasetData};
use crate::error::RenderError;

/// Renders a chart as a small table: one row per dataset with its point
/// count and total.
///
/// ```text
/// Slow Operations per Minute (bar, 3 labels, 10:00:00 .. 10:02:00)
///   Dataset                          Points      Total
///   Count                                 3         12
/// ```
#[derive(Debug, Clone)]
pub struct TextRenderer {
    label_width: usize,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self { label_width: 32 }
    }
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Width of the dataset column; longer labels are truncated.
    pub fn label_width(mut self, width: usize) -> Self {
        self.label_width = width.max(8);
        self
    }

    fn heading(&self, chart: &ChartConfig) -> String {
        let mut heading = format!("{} ({}", chart.title, chart.chart_type.name());
        if !chart.labels.is_empty() {
            let _ = write!(heading, ", {} labels", chart.labels.len());
        }
        if let (Some(first), Some(last)) = (chart.labels.first(), chart.labels.last()) {
            if chart.options.time_axis {
                let _ = write!(heading, ", {} .. {}", format_tick(first), format_tick(last));
            }
        }
        heading.push(')');
        heading
    }

    fn truncate(&self, label: &str) -> String {
        if label.chars().count() <= self.label_width {
            label.to_string()
        } else {
            let mut short: String = label.chars().take(self.label_width - 1).collect();
            short.push('~');
            short
        }
    }
}

impl ChartRenderer for TextRenderer {
    type Output = String;

    fn render(&mut self, chart: &ChartConfig) -> Result<String, RenderError> {
        check_shape(chart)?;

        let width = self.label_width;
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.heading(chart));

        if chart.is_empty() {
            let _ = writeln!(out, "  (no data)");
            return Ok(out);
        }

        let _ = writeln!(out, "  {:<width$} {:>8} {:>10}", "Dataset", "Points", "Total");
        for dataset in &chart.datasets {
            let total = match &dataset.data {
                DatasetData::Timeline(events) => match (events.first(), events.last()) {
                    (Some(first), Some(last)) => {
                        format!("{}..{}", format_millis(first.x), format_millis(last.x))
                    }
                    _ => "-".to_string(),
                },
                data => format_count(data.total()),
            };
            let mut label = self.truncate(&dataset.label);
            if dataset.axis == AxisId::Secondary {
                label = self.truncate(&format!("{} (y2)", dataset.label));
            }
            let _ = writeln!(out, "  {:<width$} {:>8} {:>10}", label, dataset.data.len(), total);
        }
        if !chart.options.legend.display {
            let _ = writeln!(out, "  legend hidden ({} datasets)", chart.datasets.len());
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartType, Dataset};
    use diagchart_types::Tick;

    #[test]
    fn test_text_summary() {
        let chart = ChartConfig::new("rate", "Slow Operations", ChartType::Bar)
            .labels(vec![Tick::Millis(1_714_557_600_000), Tick::Millis(1_714_557_660_000)])
            .dataset(Dataset::values("Count", vec![1.0, 1_500.0]))
            .dataset(Dataset::values("Total", vec![2.0, 2.0]).axis(AxisId::Secondary))
            .time_axis();
        let text = TextRenderer::new().label_width(10).render(&chart).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Slow Operations (bar, 2 labels, 10:00:00 .. 10:01:00)");
        assert_eq!(lines[2], format!("  {:<10} {:>8} {:>10}", "Count", 2, "1.5K"));
        assert!(lines[3].starts_with("  Total (y2)"));
    }

    #[test]
    fn test_empty_chart() {
        let chart = ChartConfig::new("empty", "Nothing", ChartType::Pie).dataset(Dataset::values("Count", vec![]));
        let text = TextRenderer::new().render(&chart).unwrap();
        assert_eq!(text, "Nothing (pie)\n  (no data)\n");
    }

    #[test]
    fn test_truncates_long_labels() {
        let renderer = TextRenderer::new().label_width(8);
        assert_eq!(renderer.truncate("app.collection"), "app.col~");
        assert_eq!(renderer.truncate("short"), "short");
    }
}
