//! Replica set member state transitions.
//!
//! Each host becomes one row of a timeline. Events do not all carry a state,
//! so the latest known state is carried forward from `UNKNOWN` and updated by
//! the state-change log ids.

use diagchart_types::{GroupKey, Record, Value};

use crate::chart::{AxisOptions, ChartConfig, ChartType, Color, Dataset, TimelinePoint};
use crate::pipeline::{fields, partition};

/// Log ids whose `details.new_state` sets the member state.
const STATE_CHANGE_IDS: [i64; 4] = [20722, 21215, 21216, 21358];
const CONFIG_CHANGE_ID: i64 = 21392;
const PRIORITY_TAKEOVER_ID: i64 = 4615660;

const UNKNOWN_STATE: &str = "UNKNOWN";

/// Member states and the colour of their timeline segments.
pub const STATE_COLORS: [(&str, Color); 10] = [
    ("STARTUP", Color::rgba(102, 29, 248, 0.85)),
    ("PRIMARY", Color::rgba(54, 197, 22, 0.85)),
    ("SECONDARY", Color::rgba(249, 224, 0, 0.85)),
    ("RECOVERING", Color::rgba(255, 159, 64, 0.85)),
    ("STARTUP2", Color::rgba(153, 102, 255, 0.85)),
    ("UNKNOWN", Color::rgba(0, 0, 0, 0.85)),
    ("ARBITER", Color::rgba(51, 182, 247, 0.85)),
    ("DOWN", Color::rgba(128, 0, 0, 0.85)),
    ("ROLLBACK", Color::rgba(255, 99, 132, 0.85)),
    ("REMOVED", Color::rgba(201, 203, 207, 0.85)),
];

/// Colour of a member state, opaque black for states outside the legend.
pub fn state_color(state: &str) -> Color {
    STATE_COLORS
        .iter()
        .find(|(name, _)| *name == state)
        .map(|(_, color)| *color)
        .unwrap_or(Color::rgb(0, 0, 0))
}

pub(super) fn build(records: &[Record]) -> Vec<ChartConfig> {
    let events = flatten(records);
    let by_host = partition(&events, |(host, _)| host.clone(), |_, (_, event)| Some(event));

    let hosts: Vec<String> = by_host.keys().map(|h| h.to_string()).collect();
    let datasets = by_host.into_iter().enumerate().map(|(i, (host, events))| {
        let row = (i + 1) as f64;
        Dataset::timeline(host.to_string(), trace(&events, row)).color(Color::rgb(128, 128, 128))
    });

    let mut chart = ChartConfig::new("state_trace", "State Transition Timeline", ChartType::Timeline)
        .datasets(datasets)
        .x_axis(AxisOptions::titled("Time"))
        .y_axis(
            AxisOptions::titled("Replica Set Members")
                .range(Some(0.0), Some((hosts.len() + 1) as f64))
                .tick_labels(hosts),
        )
        .zoomable();
    for (state, color) in STATE_COLORS {
        chart = chart.category(state, color);
    }
    vec![chart]
}

/// Flatten the input into (host, event) pairs.
///
/// Accepts either one record per event (host in `host`, or in the entry key
/// of an object-shaped input) or records mapping host names to event lists.
fn flatten(records: &[Record]) -> Vec<(GroupKey, Record)> {
    let mut events = Vec::new();
    for record in records {
        if record.get("timestamp").is_some() {
            events.push((fields::entity_key(record, "host"), record.clone()));
            continue;
        }
        for (host, value) in record.iter() {
            let nested = value.as_list().unwrap_or_default();
            events.extend(nested.iter().filter_map(|item| {
                let map = item.as_object()?;
                Some((GroupKey::new(host.as_str()), Record::from(map.clone())))
            }));
        }
    }
    events
}

/// Timeline points for one host, carrying the member state forward.
fn trace(events: &[&Record], row: f64) -> Vec<TimelinePoint> {
    let mut state = UNKNOWN_STATE.to_string();
    events
        .iter()
        .filter_map(|event| {
            let Some(x) = fields::tick(event, "timestamp").as_millis() else {
                tracing::debug!("state event without a parseable timestamp skipped");
                return None;
            };
            let id = fields::number(event, "id") as i64;
            if STATE_CHANGE_IDS.contains(&id) {
                state = event
                    .text("details.new_state")
                    .unwrap_or(UNKNOWN_STATE)
                    .to_string();
            }
            Some(TimelinePoint {
                x,
                y: row,
                state: state.clone(),
                event: event.text("event").unwrap_or_default().to_string(),
                id,
                message: event.text("details.msg").unwrap_or_default().to_string(),
                detail: describe(event, id),
            })
        })
        .collect()
}

/// Short description of what an event changed.
fn describe(event: &Record, id: i64) -> String {
    let text = |path: &str| event.get(path).map(Value::to_string).unwrap_or_default();
    match id {
        CONFIG_CHANGE_ID => format!(
            "{{version: {}, term: {}}}",
            text("details.config.version"),
            text("details.config.term")
        ),
        21215 | 21216 => text("details.new_state"),
        21358 => format!("{} → {}", text("details.old_state"), text("details.new_state")),
        PRIORITY_TAKEOVER_ID => "Priority Takeover".to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::DatasetData;

    fn event(ts: &str, id: i64, name: &str, details: impl FnOnce(diagchart_types::RecordBuilder) -> diagchart_types::RecordBuilder) -> Record {
        Record::builder()
            .field("timestamp", ts)
            .field("id", id)
            .field("event", name)
            .object("details", details)
            .build()
    }

    fn timeline(chart: &ChartConfig, i: usize) -> &[TimelinePoint] {
        match &chart.datasets[i].data {
            DatasetData::Timeline(points) => points,
            other => panic!("expected timeline, got {:?}", other),
        }
    }

    #[test]
    fn test_state_carried_forward() {
        let host = Record::builder()
            .list(
                "rs0-a:27017",
                [
                    event("2024-05-01T10:00:00Z", 21392, "Config change", |d| {
                        d.object("config", |c| c.field("version", 3).field("term", 1))
                    }),
                    event("2024-05-01T10:00:01Z", 21358, "State change", |d| {
                        d.field("old_state", "STARTUP2").field("new_state", "SECONDARY")
                    }),
                    event("2024-05-01T10:00:02Z", 4615660, "Takeover", |d| d.field("msg", "stepping up")),
                    event("2024-05-01T10:00:03Z", 21216, "New state", |d| d.field("new_state", "PRIMARY")),
                ],
            )
            .list(
                "rs0-b:27017",
                [event("2024-05-01T10:00:00Z", 1, "Other", |d| d)],
            )
            .build();

        let charts = build(&[host]);
        let chart = &charts[0];
        assert_eq!(chart.datasets.len(), 2);
        assert_eq!(chart.options.y.tick_labels, ["rs0-a:27017", "rs0-b:27017"]);
        assert_eq!(chart.options.y.max, Some(3.0));
        assert_eq!(chart.categories.len(), 10);

        let a = timeline(chart, 0);
        let states: Vec<&str> = a.iter().map(|p| p.state.as_str()).collect();
        assert_eq!(states, ["UNKNOWN", "SECONDARY", "SECONDARY", "PRIMARY"]);
        assert_eq!(a[0].detail, "{version: 3, term: 1}");
        assert_eq!(a[1].detail, "STARTUP2 → SECONDARY");
        assert_eq!(a[2].detail, "Priority Takeover");
        assert_eq!(a[2].message, "stepping up");
        assert_eq!(a[3].detail, "PRIMARY");
        assert!(a.iter().all(|p| p.y == 1.0));

        let b = timeline(chart, 1);
        assert_eq!(b[0].y, 2.0);
        assert_eq!(b[0].state, "UNKNOWN");
    }

    #[test]
    fn test_flat_events_use_entry_key() {
        let mut flat = event("2024-05-01T10:00:00Z", 21215, "New state", |d| d.field("new_state", "ARBITER"));
        flat.insert("_key", "rs0-c:27017");

        let charts = build(&[flat]);
        assert_eq!(charts[0].datasets[0].label, "rs0-c:27017");
        assert_eq!(timeline(&charts[0], 0)[0].state, "ARBITER");
    }

    #[test]
    fn test_state_colors() {
        assert_eq!(state_color("PRIMARY"), Color::rgba(54, 197, 22, 0.85));
        assert_eq!(state_color("FATAL"), Color::rgb(0, 0, 0));
    }
}
