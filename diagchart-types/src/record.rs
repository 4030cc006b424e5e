//! Record - one timestamped measurement from a diagnostics source.

use indexmap::IndexMap;

use crate::Value;

/// A flat-or-nested key/value record.
///
/// Records are the pipeline's input and are never mutated by it. Fields keep
/// the order they were read in.
///
/// # Example
///
/// ```rust
/// use diagchart_types::Record;
///
/// let row = Record::builder()
///     .field("time", "2024-05-01T10:00:00Z")
///     .field("count", 3)
///     .object("byNs", |m| m.object("shop.orders", |n| n.field("count", 3)))
///     .build();
///
/// assert_eq!(row.number("count"), Some(3.0));
/// assert_eq!(row.entries("byNs").count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for constructing records.
    pub fn builder() -> RecordBuilder {
        RecordBuilder::new()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Get a field by dotted path (`"attr.ns"`).
    pub fn get(&self, path: &str) -> Option<&Value> {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        let value = self.fields.get(head)?;
        match rest {
            Some(rest) => value.lookup(rest),
            None => Some(value),
        }
    }

    /// Numeric field at `path`, if present and numeric.
    pub fn number(&self, path: &str) -> Option<f64> {
        self.get(path).and_then(Value::as_f64)
    }

    /// Text field at `path`, if present and textual.
    pub fn text(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Iterate the entries of an object field at `path`.
    ///
    /// Yields nothing when the field is missing or not an object.
    pub fn entries<'a>(&'a self, path: &str) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        self.get(path)
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|map| map.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Iterate the elements of a list field at `path`.
    pub fn items<'a>(&'a self, path: &str) -> impl Iterator<Item = &'a Value> + 'a {
        self.get(path).and_then(Value::as_list).into_iter().flatten()
    }

    /// Iterate over all top-level fields.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Insert or replace a top-level field.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }
}

impl From<IndexMap<String, Value>> for Record {
    fn from(fields: IndexMap<String, Value>) -> Self {
        Self { fields }
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Object(record.fields)
    }
}

/// Builder for constructing `Record` instances.
#[derive(Debug, Default)]
pub struct RecordBuilder {
    fields: IndexMap<String, Value>,
}

impl RecordBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Add a nested object built using a closure.
    pub fn object<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(RecordBuilder) -> RecordBuilder,
    {
        let nested = f(RecordBuilder::new()).build();
        self.fields.insert(name.into(), nested.into());
        self
    }

    /// Add a list of nested records.
    pub fn list<I>(mut self, name: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = Record>,
    {
        let items = items.into_iter().map(Value::from).collect::<Vec<_>>();
        self.fields.insert(name.into(), Value::List(items));
        self
    }

    /// Build the record.
    pub fn build(self) -> Record {
        Record {
            fields: self.fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        Record::builder()
            .field("t", 1_000i64)
            .object("attr", |a| a.field("ns", "db.coll").field("keysExamined", 12))
            .list(
                "ips",
                vec![
                    Record::builder().field("ip", "10.0.0.1").field("count", 2).build(),
                    Record::builder().field("ip", "10.0.0.2").field("count", 5).build(),
                ],
            )
            .build()
    }

    #[test]
    fn test_get_by_path() {
        let record = sample();
        assert_eq!(record.number("t"), Some(1000.0));
        assert_eq!(record.text("attr.ns"), Some("db.coll"));
        assert_eq!(record.number("attr.keysExamined"), Some(12.0));
        assert!(record.get("attr.docsExamined").is_none());
        assert!(record.get("nope").is_none());
    }

    #[test]
    fn test_typed_accessors_reject_mismatched_types() {
        let record = sample();
        assert_eq!(record.number("attr.ns"), None);
        assert_eq!(record.text("t"), None);
    }

    #[test]
    fn test_items_and_entries() {
        let record = sample();
        let ips: Vec<&str> = record.items("ips").filter_map(|v| v.child("ip")?.as_str()).collect();
        assert_eq!(ips, ["10.0.0.1", "10.0.0.2"]);

        let attr: Vec<&str> = record.entries("attr").map(|(k, _)| k).collect();
        assert_eq!(attr, ["ns", "keysExamined"]);
        assert_eq!(record.entries("t").count(), 0);
    }

    #[test]
    fn test_insert_replaces() {
        let mut record = sample();
        record.insert("t", 5i64);
        assert_eq!(record.number("t"), Some(5.0));
        assert_eq!(record.len(), 3);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip() {
        let record = sample();
        let json = serde_json::to_string(&record).unwrap();
        let parsed: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(record, parsed);
    }
}
