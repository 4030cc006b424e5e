//! Report definitions.
//!
//! A report fixes the key, value and reducer functions for one kind of
//! diagnostics input and turns its records into one or more charts.

mod build_info;
mod client_meta;
mod coll_info;
mod connection_rate;
mod server_status;
mod slow_ops;
mod slow_rate;
mod state_trace;

pub use state_trace::{state_color, STATE_COLORS};

use std::fmt;

use clap::ValueEnum;
use diagchart_types::{GroupKey, Record, Tick};
use serde::{Deserialize, Serialize};

use crate::chart::{ChartConfig, ChartType, Color, Dataset, LegendPosition, Palette};
use crate::pipeline::DEFAULT_MAX_LEGENDS;

/// Options shared by every report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    /// Hide legends of charts with more datasets than this.
    pub max_legends: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            max_legends: DEFAULT_MAX_LEGENDS,
        }
    }
}

/// The kinds of diagnostics input that can be charted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Report {
    /// Slow operations per minute, overall and by namespace.
    SlowRate,
    /// Connections created and ended per minute, overall and by client IP.
    ConnectionRate,
    /// Individual slow operations plotted over time by namespace.
    SlowOps,
    /// Replica set member state transitions.
    StateTrace,
    /// Client connections by driver and by IP.
    ClientMeta,
    /// Connection statistics per server.
    ServerConnections,
    /// Operation counters per server.
    ServerOpcounters,
    /// WiredTiger cache statistics per server.
    ServerCache,
    /// Data and index size per namespace.
    CollSize,
    /// Collection and index fragmentation per namespace.
    CollFragmentation,
    /// Operation latency per namespace.
    CollLatency,
    /// Server versions across the deployment.
    VersionDistribution,
}

impl Report {
    pub const ALL: [Report; 12] = [
        Report::SlowRate,
        Report::ConnectionRate,
        Report::SlowOps,
        Report::StateTrace,
        Report::ClientMeta,
        Report::ServerConnections,
        Report::ServerOpcounters,
        Report::ServerCache,
        Report::CollSize,
        Report::CollFragmentation,
        Report::CollLatency,
        Report::VersionDistribution,
    ];

    /// Command-line name of the report.
    pub fn name(self) -> &'static str {
        match self {
            Report::SlowRate => "slow-rate",
            Report::ConnectionRate => "connection-rate",
            Report::SlowOps => "slow-ops",
            Report::StateTrace => "state-trace",
            Report::ClientMeta => "client-meta",
            Report::ServerConnections => "server-connections",
            Report::ServerOpcounters => "server-opcounters",
            Report::ServerCache => "server-cache",
            Report::CollSize => "coll-size",
            Report::CollFragmentation => "coll-fragmentation",
            Report::CollLatency => "coll-latency",
            Report::VersionDistribution => "version-distribution",
        }
    }

    /// Build the report's charts from `records`.
    ///
    /// Empty input yields charts without data, never an error.
    pub fn build(self, records: &[Record], options: &ReportOptions) -> Vec<ChartConfig> {
        let charts = match self {
            Report::SlowRate => slow_rate::build(records),
            Report::ConnectionRate => connection_rate::build(records, options),
            Report::SlowOps => slow_ops::build(records, options),
            Report::StateTrace => state_trace::build(records),
            Report::ClientMeta => client_meta::build(records),
            Report::ServerConnections => vec![server_status::connections(records)],
            Report::ServerOpcounters => vec![server_status::opcounters(records)],
            Report::ServerCache => vec![server_status::cache(records)],
            Report::CollSize => coll_info::sizes(records),
            Report::CollFragmentation => coll_info::fragmentation(records, options),
            Report::CollLatency => vec![coll_info::latency(records, options)],
            Report::VersionDistribution => vec![build_info::versions(records)],
        };
        tracing::debug!(
            report = self.name(),
            records = records.len(),
            charts = charts.len(),
            "built report"
        );
        charts
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A pie chart with one slice per key, coloured with evenly spaced hues.
fn pie<I>(id: &str, title: &str, label: &str, slices: I) -> ChartConfig
where
    I: IntoIterator<Item = (GroupKey, f64)>,
{
    let (labels, values): (Vec<Tick>, Vec<f64>) = slices
        .into_iter()
        .map(|(key, value)| (Tick::label(key.to_string()), value))
        .unzip();
    let colors = Palette::Spread.colors(labels.len());
    ChartConfig::new(id, title, ChartType::Pie)
        .labels(labels)
        .dataset(Dataset::values(label, values).colors(colors))
        .legend_position(LegendPosition::Right)
}

type Rgb = (u8, u8, u8);

const BLUE: Rgb = (54, 162, 235);
const RED: Rgb = (255, 99, 132);
const YELLOW: Rgb = (255, 206, 86);
const TEAL: Rgb = (75, 192, 192);
const PURPLE: Rgb = (153, 102, 255);
const ORANGE: Rgb = (255, 159, 64);

/// One of the standard dataset colours at the given opacity.
fn shade((r, g, b): Rgb, alpha: f32) -> Color {
    Color::rgba(r, g, b, alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_match_value_enum() {
        for report in Report::ALL {
            let parsed = Report::from_str(report.name(), false).unwrap();
            assert_eq!(parsed, report);
        }
    }

    #[test]
    fn test_every_report_handles_empty_input() {
        let options = ReportOptions::default();
        for report in Report::ALL {
            let charts = report.build(&[], &options);
            assert!(!charts.is_empty(), "{} produced no charts", report);
            assert!(charts.iter().all(ChartConfig::is_empty), "{} has data", report);
        }
    }

    #[test]
    fn test_pie_colors_spread() {
        let chart = pie("p", "P", "Count", [(GroupKey::new("a"), 1.0), (GroupKey::new("b"), 3.0)]);
        assert_eq!(chart.labels, [Tick::label("a"), Tick::label("b")]);
        assert_eq!(chart.datasets[0].colors, Palette::Spread.colors(2));
        assert_eq!(chart.datasets[0].data.total(), 4.0);
    }
}
