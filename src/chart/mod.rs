//! Chart configuration values.
//!
//! A [`ChartConfig`] is the plain, renderer-independent description of one
//! chart: shared x labels, ordered datasets and a single set of recognised
//! options. Reports produce configs, renderers consume them.

mod color;

pub use color::{Color, Palette};

use diagchart_types::Tick;
use serde::Serialize;

use crate::pipeline::{downsample_by, Reducer, Scale};

/// Kind of chart (or of one dataset in a mixed chart).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Line,
    Pie,
    Scatter,
    Timeline,
}

impl ChartType {
    pub fn name(self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Pie => "pie",
            ChartType::Scatter => "scatter",
            ChartType::Timeline => "timeline",
        }
    }
}

/// Value axis a dataset is plotted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisId {
    #[default]
    Primary,
    Secondary,
}

/// One point of a scatter dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    /// Epoch milliseconds.
    pub x: i64,
    pub y: f64,
    /// Position of the source record in the input.
    pub index: usize,
}

/// One event on a state timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelinePoint {
    /// Epoch milliseconds.
    pub x: i64,
    /// Row of the host this event belongs to (1-based).
    pub y: f64,
    /// State in effect after this event.
    pub state: String,
    pub event: String,
    pub id: i64,
    /// Log message attached to the event.
    pub message: String,
    /// Human-readable summary of what changed.
    pub detail: String,
}

/// Data carried by a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DatasetData {
    /// One value per chart label.
    Values(Vec<f64>),
    Points(Vec<ScatterPoint>),
    Timeline(Vec<TimelinePoint>),
}

impl DatasetData {
    pub fn len(&self) -> usize {
        match self {
            DatasetData::Values(v) => v.len(),
            DatasetData::Points(p) => p.len(),
            DatasetData::Timeline(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of the plotted y values.
    pub fn total(&self) -> f64 {
        match self {
            DatasetData::Values(v) => v.iter().sum(),
            DatasetData::Points(p) => p.iter().map(|p| p.y).sum(),
            DatasetData::Timeline(_) => 0.0,
        }
    }

    pub fn values(&self) -> Option<&[f64]> {
        match self {
            DatasetData::Values(v) => Some(v),
            _ => None,
        }
    }
}

/// An extra per-label series shown alongside a dataset (tooltips).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Companion {
    pub name: String,
    pub values: Vec<f64>,
}

/// One series of a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    /// Overrides the chart type for mixed charts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<ChartType>,
    pub data: DatasetData,
    /// One colour for the whole dataset.
    pub color: Color,
    /// Per-element colours, used by pies.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<Color>,
    /// Datasets sharing a stack id are stacked on each other.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    pub axis: AxisId,
    /// How values combine when the chart is downsampled.
    #[serde(skip)]
    pub reducer: Reducer,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub companions: Vec<Companion>,
}

impl Dataset {
    fn with_data(label: impl Into<String>, data: DatasetData) -> Self {
        Self {
            label: label.into(),
            chart_type: None,
            data,
            color: Color::rgb(128, 128, 128),
            colors: Vec::new(),
            stack: None,
            axis: AxisId::Primary,
            reducer: Reducer::Sum,
            companions: Vec::new(),
        }
    }

    pub fn values(label: impl Into<String>, values: Vec<f64>) -> Self {
        Self::with_data(label, DatasetData::Values(values))
    }

    pub fn points(label: impl Into<String>, points: Vec<ScatterPoint>) -> Self {
        Self::with_data(label, DatasetData::Points(points))
    }

    pub fn timeline(label: impl Into<String>, events: Vec<TimelinePoint>) -> Self {
        Self::with_data(label, DatasetData::Timeline(events))
    }

    pub fn chart_type(mut self, chart_type: ChartType) -> Self {
        self.chart_type = Some(chart_type);
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn colors(mut self, colors: Vec<Color>) -> Self {
        self.colors = colors;
        self
    }

    pub fn stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    pub fn axis(mut self, axis: AxisId) -> Self {
        self.axis = axis;
        self
    }

    pub fn reducer(mut self, reducer: Reducer) -> Self {
        self.reducer = reducer;
        self
    }

    pub fn companion(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.companions.push(Companion {
            name: name.into(),
            values,
        });
        self
    }

    /// Chart type of this dataset within a chart of type `default`.
    pub fn effective_type(&self, default: ChartType) -> ChartType {
        self.chart_type.unwrap_or(default)
    }
}

/// Where the legend is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendPosition {
    #[default]
    Top,
    Right,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendOptions {
    pub display: bool,
    pub position: LegendPosition,
}

impl Default for LegendOptions {
    fn default() -> Self {
        Self {
            display: true,
            position: LegendPosition::Top,
        }
    }
}

/// Options for one axis.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AxisOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub stacked: bool,
    pub begin_at_zero: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Category names for numeric tick positions (1-based).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tick_labels: Vec<String>,
}

impl AxisOptions {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn stacked(mut self) -> Self {
        self.stacked = true;
        self
    }

    pub fn begin_at_zero(mut self) -> Self {
        self.begin_at_zero = true;
        self
    }

    pub fn range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn tick_labels(mut self, labels: Vec<String>) -> Self {
        self.tick_labels = labels;
        self
    }
}

/// Options recognised by every renderer.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ChartOptions {
    pub legend: LegendOptions,
    pub x: AxisOptions,
    pub y: AxisOptions,
    /// Secondary value axis, drawn on the right.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y2: Option<AxisOptions>,
    /// Bars run horizontally (categories on the y axis).
    pub horizontal: bool,
    pub zoomable: bool,
    /// Labels are timestamps; the chart accepts downsampling.
    pub time_axis: bool,
}

/// A named colour shown in a category legend (timeline states).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub label: String,
    pub color: Color,
}

/// A complete chart description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    pub id: String,
    pub title: String,
    pub chart_type: ChartType,
    pub labels: Vec<Tick>,
    pub datasets: Vec<Dataset>,
    pub options: ChartOptions,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<Category>,
}

impl ChartConfig {
    pub fn new(id: impl Into<String>, title: impl Into<String>, chart_type: ChartType) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            chart_type,
            labels: Vec::new(),
            datasets: Vec::new(),
            options: ChartOptions::default(),
            categories: Vec::new(),
        }
    }

    pub fn labels(mut self, labels: Vec<Tick>) -> Self {
        self.labels = labels;
        self
    }

    pub fn dataset(mut self, dataset: Dataset) -> Self {
        self.datasets.push(dataset);
        self
    }

    pub fn datasets(mut self, datasets: impl IntoIterator<Item = Dataset>) -> Self {
        self.datasets.extend(datasets);
        self
    }

    pub fn legend(mut self, display: bool) -> Self {
        self.options.legend.display = display;
        self
    }

    pub fn legend_position(mut self, position: LegendPosition) -> Self {
        self.options.legend.position = position;
        self
    }

    pub fn x_axis(mut self, axis: AxisOptions) -> Self {
        self.options.x = axis;
        self
    }

    pub fn y_axis(mut self, axis: AxisOptions) -> Self {
        self.options.y = axis;
        self
    }

    pub fn y2_axis(mut self, axis: AxisOptions) -> Self {
        self.options.y2 = Some(axis);
        self
    }

    pub fn horizontal(mut self) -> Self {
        self.options.horizontal = true;
        self
    }

    pub fn zoomable(mut self) -> Self {
        self.options.zoomable = true;
        self
    }

    pub fn time_axis(mut self) -> Self {
        self.options.time_axis = true;
        self
    }

    pub fn category(mut self, label: impl Into<String>, color: Color) -> Self {
        self.categories.push(Category {
            label: label.into(),
            color,
        });
        self
    }

    /// True when no dataset has any data.
    pub fn is_empty(&self) -> bool {
        self.datasets.iter().all(|d| d.data.is_empty())
    }

    /// Whether [`ChartConfig::downsample`] changes this chart.
    pub fn accepts_scale(&self) -> bool {
        self.options.time_axis
            && self
                .datasets
                .iter()
                .all(|d| matches!(d.data, DatasetData::Values(_)))
    }

    /// Downsample a time-axis chart.
    ///
    /// Labels take the first tick of each window; each dataset and its
    /// companions combine with the dataset's own reducer. Charts that do not
    /// plot values against time are returned unchanged.
    pub fn downsample(&self, scale: Scale) -> ChartConfig {
        if scale == Scale::ONE || !self.accepts_scale() {
            return self.clone();
        }
        let datasets = self
            .datasets
            .iter()
            .map(|d| {
                let data = match &d.data {
                    DatasetData::Values(v) => DatasetData::Values(downsample_by(v, scale, d.reducer)),
                    other => other.clone(),
                };
                let companions = d
                    .companions
                    .iter()
                    .map(|c| Companion {
                        name: c.name.clone(),
                        values: downsample_by(&c.values, scale, d.reducer),
                    })
                    .collect();
                Dataset {
                    data,
                    companions,
                    ..d.clone()
                }
            })
            .collect();
        ChartConfig {
            labels: downsample_by(&self.labels, scale, Reducer::Sum),
            datasets,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate_chart() -> ChartConfig {
        ChartConfig::new("rate", "Rate", ChartType::Bar)
            .labels((0..5).map(|i| Tick::Millis(i * 60_000)).collect())
            .dataset(Dataset::values("count", vec![1.0, 2.0, 3.0, 4.0, 5.0]))
            .dataset(
                Dataset::values("total", vec![10.0, 11.0, 12.0, 13.0, 14.0])
                    .reducer(Reducer::Last)
                    .companion("available", vec![5.0, 4.0, 3.0, 2.0, 1.0]),
            )
            .time_axis()
    }

    #[test]
    fn test_downsample_time_chart() {
        let scaled = rate_chart().downsample(Scale::new(2).unwrap());

        assert_eq!(scaled.labels, [Tick::Millis(0), Tick::Millis(120_000), Tick::Millis(240_000)]);
        assert_eq!(scaled.datasets[0].data, DatasetData::Values(vec![3.0, 7.0, 5.0]));
        assert_eq!(scaled.datasets[1].data, DatasetData::Values(vec![11.0, 13.0, 14.0]));
        assert_eq!(scaled.datasets[1].companions[0].values, [4.0, 2.0, 1.0]);
    }

    #[test]
    fn test_downsample_leaves_category_charts() {
        let pie = ChartConfig::new("pie", "Pie", ChartType::Pie)
            .labels(vec![Tick::label("a"), Tick::label("b")])
            .dataset(Dataset::values("n", vec![1.0, 2.0]));

        assert!(!pie.accepts_scale());
        assert_eq!(pie.downsample(Scale::new(2).unwrap()), pie);
        assert_eq!(rate_chart().downsample(Scale::ONE), rate_chart());
    }

    #[test]
    fn test_empty_chart() {
        let chart = ChartConfig::new("x", "X", ChartType::Line).dataset(Dataset::values("a", vec![]));
        assert!(chart.is_empty());
        assert!(!rate_chart().is_empty());
    }
}
