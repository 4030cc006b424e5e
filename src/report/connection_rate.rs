//! Connections created and ended per minute.
//!
//! Input rows look like
//! `{time, created, ended, total, byIp: {ip: {created, ended}}}`. Ended
//! connections are plotted as negative values so they stack below the axis.

use diagchart_types::{GroupKey, Record};

use super::{shade, ReportOptions, BLUE, RED, YELLOW};
use crate::chart::{AxisId, AxisOptions, ChartConfig, ChartType, Dataset};
use crate::pipeline::{assemble, fields, group_by, group_entries, AssembleOptions, Grouped, Reducer};

const STACK: &str = "Stack 0";
const CREATED: &str = "Connections Created";
const ENDED: &str = "Connections Ended";
const TOTAL: &str = "Total Connections";

pub(super) fn build(records: &[Record], options: &ReportOptions) -> Vec<ChartConfig> {
    vec![rate(records), by_ip(records, options)]
}

fn rate(records: &[Record]) -> ChartConfig {
    let flows = group_entries(
        records,
        |r| fields::tick(r, "time"),
        |r| {
            [
                (GroupKey::new(CREATED), fields::number(r, "created")),
                (GroupKey::new(ENDED), -fields::number(r, "ended")),
            ]
        },
        Reducer::Sum,
    );
    // The total is a gauge: rows sharing a minute keep the latest reading.
    let total = group_by(
        records,
        |r| fields::tick(r, "time"),
        |_| GroupKey::new(TOTAL),
        |r| fields::number(r, "total"),
        Reducer::Last,
    );

    ChartConfig::new("connection_rate", "Connection Create/Ended Rate Over Time", ChartType::Bar)
        .labels(flows.ticks.clone())
        .dataset(
            Dataset::values(CREATED, column(&flows, CREATED))
                .stack(STACK)
                .color(shade(BLUE, 0.7)),
        )
        .dataset(
            Dataset::values(ENDED, column(&flows, ENDED))
                .stack(STACK)
                .color(shade(RED, 0.7)),
        )
        .dataset(
            Dataset::values(TOTAL, column(&total, TOTAL))
                .chart_type(ChartType::Line)
                .color(shade(YELLOW, 1.0))
                .axis(AxisId::Secondary)
                .reducer(Reducer::Last),
        )
        .y_axis(AxisOptions::titled("Connections per minute").begin_at_zero())
        .y2_axis(AxisOptions::titled(TOTAL).begin_at_zero())
        .zoomable()
        .time_axis()
}

fn by_ip(records: &[Record], options: &ReportOptions) -> ChartConfig {
    let grouped = group_entries(
        records,
        |r| fields::tick(r, "time"),
        |r| {
            r.entries("byIp")
                .flat_map(|(ip, counts)| {
                    let field = |name: &str| counts.child(name).and_then(fields::numeric).unwrap_or(0.0);
                    [
                        (GroupKey::compound([ip, "created"]), field("created")),
                        (GroupKey::compound([ip, "ended"]), -field("ended")),
                    ]
                })
                .collect::<Vec<_>>()
        },
        Reducer::Sum,
    );
    let assembled = assemble(
        &grouped,
        &AssembleOptions::default()
            .max_legends(options.max_legends)
            .stack(STACK),
    );

    ChartConfig::new("connection_rate_byip", "Connections Created/Ended by IP Over Time", ChartType::Bar)
        .labels(assembled.labels)
        .datasets(assembled.datasets)
        .legend(assembled.show_legend)
        .x_axis(AxisOptions::default().stacked())
        .y_axis(AxisOptions::titled("Connections").stacked().begin_at_zero())
        .zoomable()
        .time_axis()
}

fn column(grouped: &Grouped, name: &str) -> Vec<f64> {
    grouped
        .get(&GroupKey::new(name))
        .map(|s| s.values().copied().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::DatasetData;
    use crate::pipeline::Scale;

    fn row(minute: i64, total: i64, by_ip: &[(&str, i64, i64)]) -> Record {
        let created: i64 = by_ip.iter().map(|(_, c, _)| c).sum();
        let ended: i64 = by_ip.iter().map(|(_, _, e)| e).sum();
        Record::builder()
            .field("time", minute * 60_000)
            .field("created", created)
            .field("ended", ended)
            .field("total", total)
            .object("byIp", |mut b| {
                for (ip, c, e) in by_ip {
                    b = b.object(*ip, |n| n.field("created", *c).field("ended", *e));
                }
                b
            })
            .build()
    }

    fn sample() -> Vec<Record> {
        vec![
            row(0, 10, &[("10.0.0.1", 3, 1)]),
            row(1, 12, &[("10.0.0.2", 2, 0)]),
            row(2, 11, &[("10.0.0.1", 0, 1), ("10.0.0.2", 0, 0)]),
        ]
    }

    #[test]
    fn test_rate_chart() {
        let chart = rate(&sample());

        assert_eq!(chart.datasets[0].data, DatasetData::Values(vec![3.0, 2.0, 0.0]));
        assert_eq!(chart.datasets[1].data, DatasetData::Values(vec![-1.0, 0.0, -1.0]));
        assert_eq!(chart.datasets[2].data, DatasetData::Values(vec![10.0, 12.0, 11.0]));
        assert_eq!(chart.datasets[0].stack.as_deref(), Some(STACK));
    }

    #[test]
    fn test_total_is_last_write_wins() {
        let records = vec![row(0, 10, &[]), row(0, 14, &[])];
        let chart = rate(&records);
        assert_eq!(chart.datasets[2].data, DatasetData::Values(vec![14.0]));

        let scaled = rate(&sample()).downsample(Scale::new(2).unwrap());
        assert_eq!(scaled.datasets[2].data, DatasetData::Values(vec![12.0, 11.0]));
        assert_eq!(scaled.datasets[0].data, DatasetData::Values(vec![5.0, 0.0]));
    }

    #[test]
    fn test_by_ip_gap_fill_and_order() {
        let chart = by_ip(&sample(), &ReportOptions::default());

        let labels: Vec<&str> = chart.datasets.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(
            labels,
            ["10.0.0.1 created", "10.0.0.1 ended", "10.0.0.2 created", "10.0.0.2 ended"]
        );
        assert_eq!(chart.datasets[0].data, DatasetData::Values(vec![3.0, 0.0, 0.0]));
        assert_eq!(chart.datasets[1].data, DatasetData::Values(vec![-1.0, 0.0, -1.0]));
        assert_eq!(chart.datasets[2].data, DatasetData::Values(vec![0.0, 2.0, 0.0]));
        assert!(chart.options.legend.display);
    }

    #[test]
    fn test_by_ip_legend_cap() {
        let chart = by_ip(&sample(), &ReportOptions { max_legends: 3 });
        assert!(!chart.options.legend.display);
        assert_eq!(chart.datasets.len(), 4);
    }
}
