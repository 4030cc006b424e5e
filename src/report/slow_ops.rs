//! Individual slow operations, one scatter point per log line.

use diagchart_types::Record;

use super::ReportOptions;
use crate::chart::{AxisOptions, ChartConfig, ChartType, Dataset, Palette, ScatterPoint};
use crate::pipeline::{fields, partition};

/// The measures plotted, one chart each: (id suffix, field, title, axis title).
const MEASURES: [(&str, &str, &str, &str); 3] = [
    (
        "duration",
        "attr.durationMillis",
        "Slow Operations - Duration vs Time by Namespace",
        "Duration (milliseconds)",
    ),
    (
        "scanned",
        "attr.keysExamined",
        "Slow Operations - Scanned vs Time by Namespace",
        "Scanned Keys",
    ),
    (
        "scannedObj",
        "attr.docsExamined",
        "Slow Operations - Scanned Objects vs Time by Namespace",
        "Scanned Objects",
    ),
];

pub(super) fn build(records: &[Record], options: &ReportOptions) -> Vec<ChartConfig> {
    MEASURES
        .iter()
        .map(|(suffix, field, title, axis)| scatter(records, options, suffix, field, title, axis))
        .collect()
}

fn scatter(
    records: &[Record],
    options: &ReportOptions,
    suffix: &str,
    field: &str,
    title: &str,
    axis: &str,
) -> ChartConfig {
    let groups = partition(
        records,
        |r| fields::group_key(r, "attr.ns"),
        |index, r| {
            let x = fields::tick(r, "t").as_millis()?;
            Some(ScatterPoint {
                x,
                y: fields::number(r, field),
                index,
            })
        },
    );
    let palette = Palette::Spread;
    let count = groups.len();
    let datasets = groups
        .into_iter()
        .enumerate()
        .map(|(i, (ns, points))| Dataset::points(ns.to_string(), points).color(palette.color(i, count)));

    ChartConfig::new(format!("slow_ops_{}", suffix), title, ChartType::Scatter)
        .datasets(datasets)
        .legend(count <= options.max_legends)
        .x_axis(AxisOptions::titled("Time"))
        .y_axis(AxisOptions::titled(axis).begin_at_zero())
}
