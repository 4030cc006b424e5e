//! Server version distribution.
//!
//! Accepts `{version: count}` objects (normalised to one record per version)
//! or explicit `{version, count}` rows.

use diagchart_types::Record;

use super::pie;
use crate::chart::{ChartConfig, LegendPosition};
use crate::pipeline::{fields, totals_by_key, Reducer};

pub(super) fn versions(records: &[Record]) -> ChartConfig {
    let counts = totals_by_key(
        records,
        |r| {
            let count = if r.get("value").is_some() {
                fields::number(r, "value")
            } else {
                fields::number(r, "count")
            };
            [(fields::entity_key(r, "version"), count)]
        },
        Reducer::Sum,
    );
    pie("version_distribution", "Version Distribution", "Count", counts).legend_position(LegendPosition::Top)
}
