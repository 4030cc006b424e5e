//! Field extraction helpers used by key and value functions.
//!
//! These helpers never fail: a missing or malformed field resolves to a
//! documented fallback (0 for measures, the `(unknown)` sentinel for keys) so
//! one bad record cannot abort a whole chart.

use chrono::{DateTime, NaiveDateTime};
use diagchart_types::{GroupKey, Record, Tick, Value, UNKNOWN_KEY};

/// Field holding the entry key of records read from an object-shaped input.
pub const ENTRY_KEY: &str = "_key";

/// Naive timestamp layouts accepted besides RFC 3339, read as UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Numeric value of a field, or 0 when absent or non-numeric.
pub fn number(record: &Record, path: &str) -> f64 {
    record.get(path).and_then(numeric).unwrap_or(0.0)
}

/// Numeric value of an arbitrary value.
///
/// Accepts plain numbers, numeric strings, and extended-JSON wrappers
/// (`{"$numberLong": "42"}`).
pub fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => Some(*n),
        Value::Text(s) => s.trim().parse().ok(),
        Value::Object(map) => ["$numberLong", "$numberInt", "$numberDouble"]
            .iter()
            .find_map(|k| map.get(*k))
            .and_then(numeric),
        _ => None,
    }
}

/// Group key taken from a text field, or the `(unknown)` sentinel.
pub fn group_key(record: &Record, path: &str) -> GroupKey {
    match record.get(path) {
        Some(Value::Text(s)) if !s.is_empty() => GroupKey::new(s.as_str()),
        Some(Value::Number(n)) => GroupKey::new(Value::Number(*n).to_string()),
        _ => {
            tracing::trace!(field = path, "record missing group field, using sentinel key");
            GroupKey::unknown()
        }
    }
}

/// Key of an entity (host, namespace, version).
///
/// Records normalised from an object input carry their entry key in
/// [`ENTRY_KEY`]; otherwise the key comes from `field`.
pub fn entity_key(record: &Record, field: &str) -> GroupKey {
    if record.get(ENTRY_KEY).is_some() {
        group_key(record, ENTRY_KEY)
    } else {
        group_key(record, field)
    }
}

/// X-axis tick taken from a field, or the `(unknown)` label.
pub fn tick(record: &Record, path: &str) -> Tick {
    record.get(path).and_then(tick_of).unwrap_or_else(|| Tick::label(UNKNOWN_KEY))
}

/// Interpret a value as a tick.
///
/// Numbers are taken as epoch milliseconds, strings are parsed as timestamps
/// and otherwise kept as labels, and `{"$date": ...}` wrappers are unwrapped.
pub fn tick_of(value: &Value) -> Option<Tick> {
    match value {
        Value::Number(n) => Some(Tick::Millis(*n as i64)),
        Value::Text(s) => Some(parse_time(s).map(Tick::Millis).unwrap_or_else(|| Tick::label(s.as_str()))),
        Value::Object(map) => map.get("$date").and_then(tick_of),
        _ => None,
    }
}

/// Parse a timestamp string into epoch milliseconds.
pub fn parse_time(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_fallbacks() {
        let record = Record::builder()
            .field("a", 3)
            .field("b", "12.5")
            .field("c", "n/a")
            .object("d", |d| d.field("$numberLong", "9000000000"))
            .build();

        assert_eq!(number(&record, "a"), 3.0);
        assert_eq!(number(&record, "b"), 12.5);
        assert_eq!(number(&record, "c"), 0.0);
        assert_eq!(number(&record, "d"), 9_000_000_000.0);
        assert_eq!(number(&record, "missing"), 0.0);
    }

    #[test]
    fn test_group_key_sentinel() {
        let record = Record::builder()
            .object("attr", |a| a.field("ns", "db.c").field("empty", ""))
            .build();

        assert_eq!(group_key(&record, "attr.ns"), GroupKey::new("db.c"));
        assert_eq!(group_key(&record, "attr.empty"), GroupKey::unknown());
        assert_eq!(group_key(&record, "attr.missing"), GroupKey::unknown());
    }

    #[test]
    fn test_entity_key_prefers_entry_key() {
        let keyed = Record::builder().field("_key", "rs0-a:27017").field("host", "other").build();
        let plain = Record::builder().field("host", "rs0-b:27017").build();

        assert_eq!(entity_key(&keyed, "host"), GroupKey::new("rs0-a:27017"));
        assert_eq!(entity_key(&plain, "host"), GroupKey::new("rs0-b:27017"));
        assert!(entity_key(&Record::new(), "host").is_unknown());
    }

    #[test]
    fn test_parse_time_formats() {
        assert_eq!(parse_time("1970-01-01T00:01:00Z"), Some(60_000));
        assert_eq!(parse_time("1970-01-01T00:00:01.500+00:00"), Some(1_500));
        assert_eq!(parse_time("1970-01-01 00:02:00"), Some(120_000));
        assert_eq!(parse_time("1970-01-01T00:00:02"), Some(2_000));
        assert_eq!(parse_time("host-a:27017"), None);
    }

    #[test]
    fn test_tick_of_variants() {
        let wrapped = Record::builder()
            .object("t", |t| t.field("$date", "1970-01-01T00:00:01Z"))
            .field("host", "rs0-a:27017")
            .field("n", 7)
            .build();

        assert_eq!(tick(&wrapped, "t"), Tick::Millis(1_000));
        assert_eq!(tick(&wrapped, "host"), Tick::label("rs0-a:27017"));
        assert_eq!(tick(&wrapped, "n"), Tick::Millis(7));
        assert_eq!(tick(&wrapped, "missing"), Tick::label("(unknown)"));
    }
}
