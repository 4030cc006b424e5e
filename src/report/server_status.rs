//! Per-server status charts: connections, operation counters, cache.
//!
//! One record per server, keyed by host. A server listed twice keeps its
//! latest figures.

use diagchart_types::{GroupKey, Record, Tick};

use super::{shade, Rgb, BLUE, ORANGE, PURPLE, RED, TEAL, YELLOW};
use crate::chart::{AxisId, AxisOptions, ChartConfig, ChartType, Dataset};
use crate::pipeline::{fields, group_entries, Grouped, Reducer};

const SERVER_AXIS: &str = "Server";

/// Table of `columns` per server: one series per field, one tick per server.
fn per_server(records: &[Record], columns: &[&str]) -> Grouped {
    group_entries(
        records,
        |r| Tick::label(fields::entity_key(r, "host").to_string()),
        |r| {
            columns
                .iter()
                .map(|c| (GroupKey::new(*c), fields::number(r, c)))
                .collect::<Vec<_>>()
        },
        Reducer::Last,
    )
}

fn column(table: &Grouped, field: &str) -> Vec<f64> {
    table
        .get(&GroupKey::new(field))
        .map(|s| s.values().copied().collect())
        .unwrap_or_default()
}

pub(super) fn connections(records: &[Record]) -> ChartConfig {
    let table = per_server(
        records,
        &["current", "available", "active", "threaded", "totalCreated"],
    );
    let bar = |label: &str, field: &str, color: Rgb, stack: &str| {
        Dataset::values(label, column(&table, field))
            .color(shade(color, 0.8))
            .stack(stack)
    };

    ChartConfig::new("server_connections", "Connection Statistics by Server", ChartType::Bar)
        .labels(table.ticks.clone())
        .dataset(bar("Current", "current", BLUE, "stack1").companion("Available", column(&table, "available")))
        .dataset(bar("Active", "active", YELLOW, "stack2"))
        .dataset(bar("Threaded", "threaded", PURPLE, "stack3"))
        .dataset(bar("Total Created", "totalCreated", RED, "stack4").axis(AxisId::Secondary))
        .x_axis(AxisOptions::titled(SERVER_AXIS))
        .y_axis(AxisOptions::titled("Connection Count").stacked())
        .y2_axis(AxisOptions::titled("Total Created"))
}

const OPERATIONS: [&str; 6] = ["insert", "query", "update", "delete", "command", "getmore"];
const OPERATION_COLORS: [Rgb; 6] = [RED, BLUE, YELLOW, TEAL, PURPLE, ORANGE];

pub(super) fn opcounters(records: &[Record]) -> ChartConfig {
    let table = per_server(records, &OPERATIONS);
    let datasets = OPERATIONS.iter().zip(OPERATION_COLORS).map(|(op, color)| {
        Dataset::values(capitalize(op), column(&table, op)).color(shade(color, 0.8))
    });

    ChartConfig::new("server_opcounters", "Operations by Server", ChartType::Bar)
        .labels(table.ticks.clone())
        .datasets(datasets)
        .x_axis(AxisOptions::titled(SERVER_AXIS))
        .y_axis(AxisOptions::titled("Operation Count"))
}

pub(super) fn cache(records: &[Record]) -> ChartConfig {
    let table = per_server(
        records,
        &["inCacheSize", "forUpdates", "dirty", "readInto", "writtenFrom", "cacheSize"],
    );
    let cache_sizes = column(&table, "cacheSize");
    let cached = |label: &str, field: &str, color: Rgb| {
        Dataset::values(label, column(&table, field))
            .color(shade(color, 0.8))
            .companion("Cache Size", cache_sizes.clone())
    };
    let io = |label: &str, values: Vec<f64>, color: Rgb| {
        Dataset::values(label, values)
            .color(shade(color, 0.8))
            .axis(AxisId::Secondary)
    };
    let written = column(&table, "writtenFrom").into_iter().map(f64::abs).collect();

    ChartConfig::new("server_cache", "WiredTiger Cache Statistics", ChartType::Bar)
        .labels(table.ticks.clone())
        .dataset(cached("Bytes In Cache", "inCacheSize", BLUE))
        .dataset(cached("Bytes Allocated for Updates", "forUpdates", YELLOW))
        .dataset(cached("Bytes Dirty in Cache", "dirty", PURPLE))
        .dataset(io("Bytes Read Into", column(&table, "readInto"), TEAL))
        .dataset(io("Bytes Written From", written, RED))
        .x_axis(AxisOptions::titled(SERVER_AXIS))
        .y_axis(AxisOptions::titled("Cache Size (Bytes)").begin_at_zero())
        .y2_axis(AxisOptions::titled("I/O (Bytes/sec)").begin_at_zero())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
