//! Renderer adapters.
//!
//! A renderer turns a [`ChartConfig`] into something displayable. The
//! pipeline and reports never render; the application picks an adapter:
//!
//! - [`ChartJsRenderer`]: Chart.js configuration JSON, used for export
//! - [`TextRenderer`]: a plain-text summary, used for `--print`
//! - [`TuiRenderer`]: a ratatui widget for the terminal UI

mod chartjs;
mod format;
mod text;
mod tui;

pub use chartjs::ChartJsRenderer;
pub use format::{format_count, format_size, format_tick};
pub use text::TextRenderer;
pub use tui::{PreparedChart, TuiRenderer};

use crate::chart::{ChartConfig, DatasetData};
use crate::error::RenderError;

/// Turns chart configurations into renderer output.
pub trait ChartRenderer {
    type Output;

    fn render(&mut self, chart: &ChartConfig) -> Result<Self::Output, RenderError>;
}

/// Reject charts whose value datasets do not line up with the labels.
fn check_shape(chart: &ChartConfig) -> Result<(), RenderError> {
    for dataset in &chart.datasets {
        if let DatasetData::Values(values) = &dataset.data {
            if values.len() != chart.labels.len() {
                return Err(RenderError::Unsupported(format!(
                    "{}: dataset {:?} has {} values for {} labels",
                    chart.id,
                    dataset.label,
                    values.len(),
                    chart.labels.len()
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartType, Dataset};
    use diagchart_types::Tick;

    #[test]
    fn test_check_shape() {
        let chart = ChartConfig::new("c", "C", ChartType::Bar)
            .labels(vec![Tick::label("a"), Tick::label("b")])
            .dataset(Dataset::values("ok", vec![1.0, 2.0]));
        assert!(check_shape(&chart).is_ok());

        let chart = chart.dataset(Dataset::values("short", vec![1.0]));
        let err = check_shape(&chart).unwrap_err();
        assert!(err.to_string().contains("\"short\" has 1 values for 2 labels"));
    }
}
