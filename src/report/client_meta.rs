//! Client connections by driver and by IP.
//!
//! Input records look like `{doc: {driver: {name}}, ips: [{ip, count}]}`.

use diagchart_types::{GroupKey, Record};

use super::pie;
use crate::chart::ChartConfig;
use crate::pipeline::{fields, totals_by_key, Reducer};

pub(super) fn build(records: &[Record]) -> Vec<ChartConfig> {
    let by_driver = totals_by_key(
        records,
        |r| {
            let connections: f64 = ip_counts(r).map(|(_, count)| count).sum();
            [(fields::group_key(r, "doc.driver.name"), connections)]
        },
        Reducer::Sum,
    );
    let by_ip = totals_by_key(records, |r| ip_counts(r).collect::<Vec<_>>(), Reducer::Sum);

    vec![
        pie("client_meta", "Client By Driver", "Connections", by_driver),
        pie("client_meta_ip", "Client By IP", "Connections", by_ip),
    ]
}

fn ip_counts(record: &Record) -> impl Iterator<Item = (GroupKey, f64)> + '_ {
    record.items("ips").map(|item| {
        let ip = match item.child("ip").and_then(|v| v.as_str()) {
            Some(ip) => GroupKey::new(ip),
            None => GroupKey::unknown(),
        };
        let count = item.child("count").and_then(fields::numeric).unwrap_or(0.0);
        (ip, count)
    })
}
