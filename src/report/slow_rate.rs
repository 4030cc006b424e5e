//! Slow operations per minute.
//!
//! Input rows look like
//! `{time, count, total_slow_ms, byNs: {ns: {count, total_slow_ms}}}`.

use diagchart_types::{GroupKey, Record};

use super::{pie, shade, BLUE, RED};
use crate::chart::{AxisId, AxisOptions, ChartConfig, ChartType, Dataset};
use crate::pipeline::{fields, group_entries, totals_by_key, Reducer};

const COUNT: &str = "Slow Count";
const TOTAL_MS: &str = "Total Slow (ms)";

pub(super) fn build(records: &[Record]) -> Vec<ChartConfig> {
    let grouped = group_entries(
        records,
        |r| fields::tick(r, "time"),
        |r| {
            [
                (GroupKey::new(COUNT), fields::number(r, "count")),
                (GroupKey::new(TOTAL_MS), fields::number(r, "total_slow_ms")),
            ]
        },
        Reducer::Sum,
    );
    let column = |name: &str| -> Vec<f64> {
        grouped
            .get(&GroupKey::new(name))
            .map(|s| s.values().copied().collect())
            .unwrap_or_default()
    };

    let rate = ChartConfig::new("slow_rate", "Slow Operations per Minute", ChartType::Bar)
        .labels(grouped.ticks.clone())
        .dataset(Dataset::values(COUNT, column(COUNT)).color(shade(BLUE, 0.7)))
        .dataset(
            Dataset::values(TOTAL_MS, column(TOTAL_MS))
                .chart_type(ChartType::Line)
                .color(shade(RED, 1.0))
                .axis(AxisId::Secondary),
        )
        .y_axis(AxisOptions::titled("Count").begin_at_zero())
        .y2_axis(AxisOptions::titled(TOTAL_MS).begin_at_zero())
        .zoomable()
        .time_axis();

    let by_ns = totals_by_key(records, ns_entries, Reducer::Sum);
    let count_pie = pie(
        "slow_rate_byns",
        "Slow Count by Namespace",
        "Count",
        by_ns.iter().map(|(k, [count, _])| (k.clone(), *count)),
    );
    let ms_pie = pie(
        "slow_rate_byns_ms",
        "Slow MS by Namespace",
        "Slow MS",
        by_ns.iter().map(|(k, [_, ms])| (k.clone(), *ms)),
    );

    vec![rate, count_pie, ms_pie]
}

/// `(count, total_slow_ms)` per namespace of one minute row.
fn ns_entries(record: &Record) -> Vec<(GroupKey, [f64; 2])> {
    record
        .entries("byNs")
        .map(|(ns, value)| {
            let field = |name: &str| value.child(name).and_then(fields::numeric).unwrap_or(0.0);
            (GroupKey::new(ns), [field("count"), field("total_slow_ms")])
        })
        .collect()
}
