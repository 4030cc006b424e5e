//! Assembly of grouped series into ordered chart datasets.

use diagchart_types::Tick;

use super::aggregate::{Grouped, Reducer};
use crate::chart::{AxisId, ChartType, Dataset, Palette};

/// Default number of datasets above which the legend is hidden.
pub const DEFAULT_MAX_LEGENDS: usize = 20;

/// How grouped series become datasets.
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Hide the legend when there are more datasets than this.
    pub max_legends: usize,
    /// Stack group shared by every dataset.
    pub stack: Option<String>,
    pub palette: Palette,
    /// Per-dataset chart type override.
    pub chart_type: Option<ChartType>,
    pub axis: AxisId,
    pub reducer: Reducer,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            max_legends: DEFAULT_MAX_LEGENDS,
            stack: None,
            palette: Palette::Spread,
            chart_type: None,
            axis: AxisId::Primary,
            reducer: Reducer::Sum,
        }
    }
}

impl AssembleOptions {
    pub fn max_legends(mut self, max_legends: usize) -> Self {
        self.max_legends = max_legends;
        self
    }

    pub fn stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    pub fn palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn reducer(mut self, reducer: Reducer) -> Self {
        self.reducer = reducer;
        self
    }
}

/// Datasets ready to drop into a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembled {
    /// Shared x labels.
    pub labels: Vec<Tick>,
    /// One dataset per group key, in key order.
    pub datasets: Vec<Dataset>,
    pub show_legend: bool,
}

/// Turn grouped series into labelled, coloured datasets.
///
/// Every series is kept. When there are more series than
/// `options.max_legends` only the legend is suppressed.
pub fn assemble(grouped: &Grouped<f64>, options: &AssembleOptions) -> Assembled {
    let count = grouped.len();
    let datasets = grouped
        .series
        .iter()
        .enumerate()
        .map(|(i, (key, series))| {
            let mut dataset = Dataset::values(key.to_string(), series.values().copied().collect())
                .color(options.palette.color(i, count))
                .axis(options.axis)
                .reducer(options.reducer);
            if let Some(stack) = &options.stack {
                dataset = dataset.stack(stack.clone());
            }
            if let Some(chart_type) = options.chart_type {
                dataset = dataset.chart_type(chart_type);
            }
            dataset
        })
        .collect::<Vec<_>>();

    let show_legend = datasets.len() <= options.max_legends;
    if !show_legend {
        tracing::debug!(
            datasets = datasets.len(),
            max_legends = options.max_legends,
            "legend suppressed"
        );
    }

    Assembled {
        labels: grouped.ticks.clone(),
        datasets,
        show_legend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{Color, DatasetData};
    use crate::pipeline::group_by;
    use diagchart_types::{GroupKey, Record};

    fn grouped(keys: usize) -> Grouped {
        let records: Vec<Record> = (0..keys)
            .map(|i| Record::builder().field("k", format!("ip{}", i)).field("t", 1).build())
            .collect();
        group_by(
            &records,
            |r| Tick::Millis(r.number("t").unwrap_or(0.0) as i64),
            |r| GroupKey::new(r.text("k").unwrap_or_default()),
            |_| 1.0,
            Reducer::Sum,
        )
    }

    #[test]
    fn test_legend_cap_keeps_series() {
        let options = AssembleOptions::default().max_legends(3);

        let small = assemble(&grouped(3), &options);
        assert!(small.show_legend);
        assert_eq!(small.datasets.len(), 3);

        let large = assemble(&grouped(4), &options);
        assert!(!large.show_legend);
        assert_eq!(large.datasets.len(), 4);
    }

    #[test]
    fn test_labels_colors_and_stack() {
        let options = AssembleOptions::default()
            .stack("Stack 0")
            .palette(Palette::Cycle(vec![Color::rgb(1, 1, 1), Color::rgb(2, 2, 2)]));
        let out = assemble(&grouped(3), &options);

        let labels: Vec<&str> = out.datasets.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, ["ip0", "ip1", "ip2"]);
        assert_eq!(out.datasets[2].color, Color::rgb(1, 1, 1));
        assert!(out.datasets.iter().all(|d| d.stack.as_deref() == Some("Stack 0")));
        assert_eq!(out.labels, [Tick::Millis(1)]);
        assert_eq!(out.datasets[0].data, DatasetData::Values(vec![1.0]));
    }

    #[test]
    fn test_empty_grouped() {
        let out = assemble(&Grouped::empty(), &AssembleOptions::default());
        assert!(out.datasets.is_empty());
        assert!(out.show_legend);
    }
}
