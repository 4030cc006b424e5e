//! Collection statistics: sizes, fragmentation and latency per namespace.

use diagchart_types::{GroupKey, Record, Tick};
use indexmap::IndexSet;

use super::{pie, ReportOptions, Rgb, BLUE, RED, TEAL, YELLOW};
use crate::chart::{AxisOptions, ChartConfig, ChartType, Color, Dataset, LegendPosition};
use crate::pipeline::{fields, group_by, Grouped, Reducer};

const NAMESPACE_AXIS: &str = "Namespace";

/// Data and index size pies, one record per namespace.
pub(super) fn sizes(records: &[Record]) -> Vec<ChartConfig> {
    let slices = |field: &'static str| {
        records
            .iter()
            .map(move |r| (fields::entity_key(r, "ns"), fields::number(r, field)))
    };
    vec![
        pie("coll_size", "Data Size", "Size", slices("size")),
        pie("coll_index_size", "Index Size", "Index Size", slices("index_size")),
    ]
}

/// Values of `field` per namespace (ticks) and per label (series).
///
/// Records are `{ns, label, ...}` rows where `label` names the source of the
/// figures (e.g. a shard or a sample). The first row of a (ns, label) pair wins.
fn by_label(records: &[Record], field: &str, scale: f64) -> Grouped {
    group_by(
        records,
        |r| Tick::label(fields::entity_key(r, "ns").to_string()),
        |r| fields::group_key(r, "label"),
        |r| fields::number(r, field) * scale,
        Reducer::First,
    )
}

/// Channel `base + step * index`, clamped to a valid colour channel.
fn channel(base: i32, step: i32, index: usize) -> u8 {
    (base + step * index as i32).clamp(0, 255) as u8
}

pub(super) fn fragmentation(records: &[Record], options: &ReportOptions) -> Vec<ChartConfig> {
    let coll_color = |i| Color::rgba(channel(54, 80, i), channel(162, 30, i), channel(235, -50, i), 0.8);
    let index_color = |i| Color::rgba(channel(255, -50, i), channel(99, 40, i), channel(132, 30, i), 0.8);
    vec![
        fragmentation_chart(records, options, "collFrag", "Collection", coll_color),
        fragmentation_chart(records, options, "indexFrag", "Index", index_color),
    ]
}

fn fragmentation_chart(
    records: &[Record],
    options: &ReportOptions,
    field: &str,
    kind: &str,
    color: impl Fn(usize) -> Color,
) -> ChartConfig {
    let grouped = by_label(records, field, 100.0);
    let datasets = grouped
        .series
        .iter()
        .enumerate()
        .map(|(i, (label, series))| {
            Dataset::values(label.to_string(), series.values().copied().collect()).color(color(i))
        })
        .collect::<Vec<_>>();

    ChartConfig::new(
        format!("coll_{}", field),
        format!("{} Fragmentation by Namespace", kind),
        ChartType::Bar,
    )
    .labels(grouped.ticks.clone())
    .legend(datasets.len() <= options.max_legends)
    .legend_position(LegendPosition::Right)
    .datasets(datasets)
    .horizontal()
    .x_axis(AxisOptions::titled(format!("{} Fragmentation (%)", kind)).range(None, Some(100.0)))
    .y_axis(AxisOptions::titled(NAMESPACE_AXIS))
}

/// Latency measures: (field, display name, colour).
const LATENCY_TYPES: [(&str, &str, Rgb); 4] = [
    ("readsLatency", "Reads", BLUE),
    ("writesLatency", "Writes", RED),
    ("commandsLatency", "Commands", YELLOW),
    ("transactionsLatency", "Transactions", TEAL),
];

/// Stacked latency bars: one stack per label, one segment per latency type.
pub(super) fn latency(records: &[Record], options: &ReportOptions) -> ChartConfig {
    let labels: IndexSet<GroupKey> = records.iter().map(|r| fields::group_key(r, "label")).collect();
    let tables: Vec<Grouped> = LATENCY_TYPES
        .iter()
        .map(|(field, _, _)| by_label(records, field, 1.0))
        .collect();
    let ticks = tables.first().map(|t| t.ticks.clone()).unwrap_or_default();

    let mut datasets = Vec::new();
    for (label_index, label) in labels.iter().enumerate() {
        let alpha = (0.8 - label_index as f32 * 0.15).max(0.1);
        for ((_, name, (r, g, b)), table) in LATENCY_TYPES.iter().zip(&tables) {
            let values = table
                .get(label)
                .map(|s| s.values().copied().collect())
                .unwrap_or_else(|| vec![0.0; ticks.len()]);
            datasets.push(
                Dataset::values(format!("{} - {}", label, name), values)
                    .color(Color::rgba(*r, *g, *b, alpha))
                    .stack(format!("stack{}", label_index)),
            );
        }
    }

    ChartConfig::new("coll_latency", "Operation Latency by Namespace", ChartType::Bar)
        .labels(ticks)
        .legend(datasets.len() <= options.max_legends)
        .legend_position(LegendPosition::Right)
        .datasets(datasets)
        .horizontal()
        .x_axis(AxisOptions::titled("Latency (ms)").stacked())
        .y_axis(AxisOptions::titled(NAMESPACE_AXIS).stacked())
}
