//! Normalisation of parsed JSON into flat records.
//!
//! Diagnostics exports come in two shapes:
//!
//! - an array of row objects, one record each;
//! - an object keyed by entity (host, namespace, version), one record per
//!   entry with the entry key stored in `_key`.
//!
//! Object entries contribute their own fields, list entries contribute one
//! record per element and scalar entries are stored under `value`.
//! Newline-delimited JSON is accepted when the input is not a single document.

use diagchart_types::{Record, Value};
use indexmap::IndexMap;

use crate::error::SourceError;
use crate::pipeline::fields::ENTRY_KEY;

/// Field holding scalar entries of object-shaped input.
pub const VALUE_FIELD: &str = "value";

/// Parse JSON or newline-delimited JSON text into records.
pub fn records_from_str(input: &str) -> Result<Vec<Record>, SourceError> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str::<Value>(input) {
        Ok(value) => Ok(records_from_value(value)),
        Err(document_error) => {
            let mut records = Vec::new();
            for (number, line) in input.lines().enumerate() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let value = serde_json::from_str::<Value>(line).map_err(|e| {
                    // A single-line input failed as a document already; report that error.
                    if number == 0 && !input.trim_end().contains('\n') {
                        SourceError::Parse(document_error.to_string())
                    } else {
                        SourceError::Parse(format!("line {}: {}", number + 1, e))
                    }
                })?;
                records.extend(records_from_value(value));
            }
            Ok(records)
        }
    }
}

/// Flatten one parsed document into records.
pub fn records_from_value(value: Value) -> Vec<Record> {
    match value {
        Value::List(items) => items.into_iter().filter_map(row).collect(),
        Value::Object(entries) => entries
            .into_iter()
            .flat_map(|(key, value)| keyed(key, value))
            .collect(),
        Value::Null => Vec::new(),
        other => {
            tracing::warn!(value = %other, "ignoring scalar document");
            Vec::new()
        }
    }
}

fn row(value: Value) -> Option<Record> {
    match value {
        Value::Object(fields) => Some(Record::from(fields)),
        other => {
            tracing::debug!(value = %other, "skipping non-object array element");
            None
        }
    }
}

fn keyed(key: String, value: Value) -> Vec<Record> {
    match value {
        Value::List(items) => items
            .into_iter()
            .map(|item| with_key(key.clone(), item))
            .collect(),
        other => vec![with_key(key, other)],
    }
}

fn with_key(key: String, value: Value) -> Record {
    let mut fields = IndexMap::new();
    fields.insert(ENTRY_KEY.to_string(), Value::Text(key));
    match value {
        Value::Object(map) => fields.extend(map),
        other => {
            fields.insert(VALUE_FIELD.to_string(), other);
        }
    }
    Record::from(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_of_rows() {
        let records = records_from_str(r#"[{"time": 1, "count": 2}, 3, {"time": 2}]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].number("count"), Some(2.0));
    }

    #[test]
    fn test_keyed_object() {
        let input = r#"{
            "rs0-a:27017": {"current": 10, "available": 90},
            "rs0-b:27017": [{"id": 1}, {"id": 2}],
            "7.0.4": 3
        }"#;
        let records = records_from_str(input).unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(records[0].text("_key"), Some("rs0-a:27017"));
        assert_eq!(records[0].number("available"), Some(90.0));
        let keys: Vec<_> = records[0].iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["_key", "current", "available"]);
        assert_eq!(records[2].text("_key"), Some("rs0-b:27017"));
        assert_eq!(records[2].number("id"), Some(2.0));
        assert_eq!(records[3].number("value"), Some(3.0));
    }

    #[test]
    fn test_ndjson_fallback() {
        let input = "{\"t\": \"2024-05-01T10:00:00Z\", \"attr\": {\"ns\": \"a.b\"}}\n\n{\"t\": 5}\n";
        let records = records_from_str(input).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text("attr.ns"), Some("a.b"));
    }

    #[test]
    fn test_parse_errors() {
        let err = records_from_str("not json").unwrap_err();
        assert!(err.to_string().starts_with("Parse error"));

        let err = records_from_str("{\"a\": 1}\n{broken\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(records_from_str("").unwrap().is_empty());
        assert!(records_from_str("  \n").unwrap().is_empty());
        assert!(records_from_str("[]").unwrap().is_empty());
        assert!(records_from_str("null").unwrap().is_empty());
    }
}
