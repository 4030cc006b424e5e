//! Terminal chart widget.
//!
//! [`TuiRenderer`] precomputes plot coordinates once per chart so that the
//! resulting [`PreparedChart`] can be drawn every frame without touching the
//! configuration again.

use diagchart_types::Tick;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Rect},
    style::{Color as TuiColor, Modifier, Style},
    symbols::Marker,
    text::Line,
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Chart, Dataset as TuiDataset, GraphType,
        LegendPosition as TuiLegendPosition, Paragraph, Widget,
    },
};

use super::format::{format_count, format_millis, format_tick};
use super::{check_shape, ChartRenderer};
use crate::chart::{AxisId, ChartConfig, ChartType, Color, Dataset, DatasetData, LegendPosition};
use crate::error::RenderError;

fn tui_color(color: Color) -> TuiColor {
    TuiColor::Rgb(color.r, color.g, color.b)
}

#[derive(Debug, Clone, PartialEq)]
struct AxisSpec {
    title: String,
    bounds: [f64; 2],
    labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct XySeries {
    name: Option<String>,
    points: Vec<(f64, f64)>,
    color: TuiColor,
    graph: GraphType,
}

#[derive(Debug, Clone, PartialEq)]
struct BarSpec {
    label: String,
    value: f64,
    color: TuiColor,
}

#[derive(Debug, Clone, PartialEq)]
struct BarGroupSpec {
    label: String,
    bars: Vec<BarSpec>,
}

#[derive(Debug, Clone, PartialEq)]
enum Plot {
    Xy {
        series: Vec<XySeries>,
        x: AxisSpec,
        y: AxisSpec,
    },
    Bars {
        groups: Vec<BarGroupSpec>,
        horizontal: bool,
    },
    Empty,
}

/// A chart ready to be drawn as a ratatui widget.
#[derive(Debug, Clone)]
pub struct PreparedChart {
    title: String,
    plot: Plot,
    legend: Option<TuiLegendPosition>,
    block: Option<Block<'static>>,
}

impl PreparedChart {
    pub fn title(&self) -> &str {
        &self.title
    }

    /// True when there is nothing to plot.
    pub fn is_empty(&self) -> bool {
        matches!(self.plot, Plot::Empty)
    }

    /// Wrap the chart in a block (borders, title).
    pub fn block(mut self, block: Block<'static>) -> Self {
        self.block = Some(block);
        self
    }
}

/// Renders charts as [`PreparedChart`] widgets.
///
/// Time and scatter charts are drawn with braille line, bar and scatter
/// graphs; category bars and pies become bar charts; timelines become one
/// line per state run, coloured by the chart's state categories.
/// Secondary-axis datasets are rescaled onto the primary axis.
#[derive(Debug, Clone, Default)]
pub struct TuiRenderer;

impl TuiRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl ChartRenderer for TuiRenderer {
    type Output = PreparedChart;

    fn render(&mut self, chart: &ChartConfig) -> Result<PreparedChart, RenderError> {
        check_shape(chart)?;

        let plot = if chart.is_empty() {
            Plot::Empty
        } else {
            match chart.chart_type {
                ChartType::Pie => pie(chart),
                ChartType::Timeline => timeline(chart),
                ChartType::Scatter => scatter(chart),
                ChartType::Bar if !chart.options.time_axis => category_bars(chart),
                ChartType::Bar | ChartType::Line => series(chart),
            }
        };
        let legend = chart.options.legend.display.then(|| match chart.options.legend.position {
            LegendPosition::Top => TuiLegendPosition::TopRight,
            LegendPosition::Right => TuiLegendPosition::Right,
            LegendPosition::Bottom => TuiLegendPosition::Bottom,
        });

        Ok(PreparedChart {
            title: chart.title.clone(),
            plot,
            legend,
            block: None,
        })
    }
}

fn pie(chart: &ChartConfig) -> Plot {
    let Some(dataset) = chart.datasets.first() else {
        return Plot::Empty;
    };
    let values = dataset.data.values().unwrap_or_default();
    let bars = chart
        .labels
        .iter()
        .zip(values)
        .enumerate()
        .map(|(i, (label, value))| BarSpec {
            label: format_tick(label),
            value: *value,
            color: tui_color(dataset.colors.get(i).copied().unwrap_or(dataset.color)),
        })
        .collect();
    Plot::Bars {
        groups: vec![BarGroupSpec {
            label: String::new(),
            bars,
        }],
        horizontal: true,
    }
}

fn category_bars(chart: &ChartConfig) -> Plot {
    let horizontal = chart.options.horizontal;
    let groups = chart
        .labels
        .iter()
        .enumerate()
        .map(|(i, tick)| BarGroupSpec {
            label: format_tick(tick),
            bars: chart
                .datasets
                .iter()
                .filter_map(|d| {
                    let value = d.data.values()?.get(i)?;
                    Some(BarSpec {
                        label: if horizontal { d.label.clone() } else { String::new() },
                        value: *value,
                        color: tui_color(d.color),
                    })
                })
                .collect(),
        })
        .collect();
    Plot::Bars { groups, horizontal }
}

/// x coordinate of each label: epoch millis for time labels, the index otherwise.
fn x_positions(labels: &[Tick]) -> Vec<f64> {
    if labels.iter().all(|t| t.as_millis().is_some()) {
        labels.iter().filter_map(Tick::as_millis).map(|ms| ms as f64).collect()
    } else {
        (0..labels.len()).map(|i| i as f64).collect()
    }
}

fn series(chart: &ChartConfig) -> Plot {
    let xs = x_positions(&chart.labels);
    let max_of = |axis: AxisId| {
        chart
            .datasets
            .iter()
            .filter(|d| d.axis == axis)
            .filter_map(|d| d.data.values())
            .flatten()
            .fold(0.0_f64, |acc, v| acc.max(v.abs()))
    };
    let (primary_max, secondary_max) = (max_of(AxisId::Primary), max_of(AxisId::Secondary));
    let secondary_factor = if primary_max > 0.0 && secondary_max > 0.0 {
        primary_max / secondary_max
    } else {
        1.0
    };

    let series = chart
        .datasets
        .iter()
        .filter_map(|d| {
            let values = d.data.values()?;
            let factor = if d.axis == AxisId::Secondary { secondary_factor } else { 1.0 };
            let graph = match d.effective_type(chart.chart_type) {
                ChartType::Bar => GraphType::Bar,
                _ => GraphType::Line,
            };
            Some(XySeries {
                name: Some(series_name(d, factor)),
                points: xs.iter().zip(values).map(|(x, y)| (*x, y * factor)).collect(),
                color: tui_color(d.color),
                graph,
            })
        })
        .collect::<Vec<_>>();

    let x = AxisSpec {
        title: chart.options.x.title.clone().unwrap_or_default(),
        bounds: bounds(xs.iter().copied()),
        labels: edge_labels(&chart.labels, format_tick),
    };
    let y = value_axis(chart, &series);
    Plot::Xy { series, x, y }
}

fn series_name(dataset: &Dataset, factor: f64) -> String {
    if dataset.axis == AxisId::Secondary && (factor - 1.0).abs() > f64::EPSILON {
        format!("{} (x{})", dataset.label, format_count(factor))
    } else {
        dataset.label.clone()
    }
}

fn scatter(chart: &ChartConfig) -> Plot {
    let series: Vec<XySeries> = chart
        .datasets
        .iter()
        .filter_map(|d| match &d.data {
            DatasetData::Points(points) => Some(XySeries {
                name: Some(d.label.clone()),
                points: points.iter().map(|p| (p.x as f64, p.y)).collect(),
                color: tui_color(d.color),
                graph: GraphType::Scatter,
            }),
            _ => None,
        })
        .collect();
    let xs: Vec<f64> = series.iter().flat_map(|s| s.points.iter().map(|p| p.0)).collect();
    let x = time_axis(chart, &xs);
    let y = value_axis(chart, &series);
    Plot::Xy { series, x, y }
}

/// One two-point line per state run; a run lasts until the host's next
/// event, and the last run of every host extends to the latest event.
fn timeline(chart: &ChartConfig) -> Plot {
    let end = chart
        .datasets
        .iter()
        .filter_map(|d| match &d.data {
            DatasetData::Timeline(events) => events.iter().map(|e| e.x).max(),
            _ => None,
        })
        .max()
        .unwrap_or(0);
    let color_of = |state: &str, fallback: Color| {
        chart
            .categories
            .iter()
            .find(|c| c.label == state)
            .map(|c| c.color)
            .unwrap_or(fallback)
    };

    let mut named: Vec<String> = Vec::new();
    let mut series = Vec::new();
    for dataset in &chart.datasets {
        let DatasetData::Timeline(events) = &dataset.data else {
            continue;
        };
        for (i, event) in events.iter().enumerate() {
            let until = events.get(i + 1).map(|next| next.x).unwrap_or(end);
            let name = if named.contains(&event.state) {
                None
            } else {
                named.push(event.state.clone());
                Some(event.state.clone())
            };
            series.push(XySeries {
                name,
                points: vec![(event.x as f64, event.y), (until as f64, event.y)],
                color: tui_color(color_of(&event.state, dataset.color)),
                graph: GraphType::Line,
            });
        }
    }

    let xs: Vec<f64> = series.iter().flat_map(|s| s.points.iter().map(|p| p.0)).collect();
    let x = time_axis(chart, &xs);
    let rows = chart.options.y.tick_labels.len();
    let y = AxisSpec {
        title: chart.options.y.title.clone().unwrap_or_default(),
        bounds: [
            chart.options.y.min.unwrap_or(0.0),
            chart.options.y.max.unwrap_or((rows + 1) as f64),
        ],
        labels: std::iter::once(String::new())
            .chain(chart.options.y.tick_labels.iter().cloned())
            .chain(std::iter::once(String::new()))
            .collect(),
    };
    Plot::Xy { series, x, y }
}

fn time_axis(chart: &ChartConfig, xs: &[f64]) -> AxisSpec {
    let [lo, hi] = bounds(xs.iter().copied());
    AxisSpec {
        title: chart.options.x.title.clone().unwrap_or_default(),
        bounds: [lo, hi],
        labels: vec![
            format_millis(lo as i64),
            format_millis(((lo + hi) / 2.0) as i64),
            format_millis(hi as i64),
        ],
    }
}

fn value_axis(chart: &ChartConfig, series: &[XySeries]) -> AxisSpec {
    let ys = series.iter().flat_map(|s| s.points.iter().map(|p| p.1));
    let [lo, hi] = bounds(ys.chain([0.0]));
    let lo = chart.options.y.min.unwrap_or(lo);
    let hi = chart.options.y.max.unwrap_or(hi);
    AxisSpec {
        title: chart.options.y.title.clone().unwrap_or_default(),
        bounds: [lo, hi],
        labels: vec![format_count(lo), format_count((lo + hi) / 2.0), format_count(hi)],
    }
}

/// Smallest and largest value, widened when they coincide.
fn bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        [0.0, 1.0]
    } else if lo == hi {
        [lo, lo + 1.0]
    } else {
        [lo, hi]
    }
}

fn edge_labels(ticks: &[Tick], format: impl Fn(&Tick) -> String) -> Vec<String> {
    match ticks {
        [] => Vec::new(),
        [only] => vec![format(only)],
        [first, .., last] => vec![format(first), format(&ticks[ticks.len() / 2]), format(last)],
    }
}

impl Widget for &PreparedChart {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = self.block.clone().unwrap_or_default();
        match &self.plot {
            Plot::Empty => {
                Paragraph::new(Line::from(" No data"))
                    .style(Style::default().add_modifier(Modifier::DIM))
                    .block(block)
                    .render(area, buf);
            }
            Plot::Xy { series, x, y } => {
                let datasets = series
                    .iter()
                    .map(|s| {
                        let dataset = TuiDataset::default()
                            .marker(Marker::Braille)
                            .graph_type(s.graph)
                            .style(Style::default().fg(s.color))
                            .data(&s.points);
                        match &s.name {
                            Some(name) => dataset.name(name.clone()),
                            None => dataset,
                        }
                    })
                    .collect::<Vec<_>>();
                let axis = |def: &AxisSpec| {
                    Axis::default()
                        .title(def.title.clone())
                        .bounds(def.bounds)
                        .labels(def.labels.clone())
                        .style(Style::default().add_modifier(Modifier::DIM))
                };
                let mut chart = Chart::new(datasets)
                    .block(block)
                    .x_axis(axis(x))
                    .y_axis(axis(y))
                    .legend_position(self.legend);
                if self.legend.is_none() {
                    chart = chart.hidden_legend_constraints((Constraint::Length(0), Constraint::Length(0)));
                }
                chart.render(area, buf);
            }
            Plot::Bars { groups, horizontal } => {
                let max = groups
                    .iter()
                    .flat_map(|g| g.bars.iter())
                    .fold(0.0_f64, |acc, b| acc.max(b.value));
                let mut chart = BarChart::default()
                    .block(block)
                    .direction(if *horizontal {
                        Direction::Horizontal
                    } else {
                        Direction::Vertical
                    })
                    .bar_width(if *horizontal { 1 } else { 3 })
                    .bar_gap(if *horizontal { 0 } else { 1 })
                    .group_gap(1)
                    .max(max.ceil().max(1.0) as u64);
                for group in groups {
                    let bars: Vec<Bar> = group
                        .bars
                        .iter()
                        .map(|b| {
                            Bar::default()
                                .value(b.value.max(0.0).round() as u64)
                                .text_value(format_count(b.value))
                                .label(Line::from(b.label.clone()))
                                .style(Style::default().fg(b.color))
                        })
                        .collect();
                    chart = chart.data(
                        BarGroup::default()
                            .label(Line::from(group.label.clone()))
                            .bars(&bars),
                    );
                }
                chart.render(area, buf);
            }
        }
    }
}
