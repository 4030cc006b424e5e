//! Grouped aggregation of records into per-key series.
//!
//! Records are partitioned by a [`GroupKey`] and a measure is accumulated per
//! (key, tick) pair. Keys and ticks keep first-seen order, and every series
//! carries exactly one point per tick so stacked charts render without gaps.
//!
//! ```text
//! records ──▶ tick_fn ──┐
//!         └─▶ entries_fn ──▶ (key, value)* ──▶ reduce per (key, tick) ──▶ Grouped
//! ```

use std::collections::HashMap;
use std::fmt::Debug;

use diagchart_types::{GroupKey, Point, Series, Tick};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// How values sharing a (key, tick) pair, or a downsampling window, combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    /// Additive metrics (counts, bytes). Preserves totals.
    #[default]
    Sum,
    /// Latest-state fields: the last value wins.
    Last,
    /// One row per (key, tick) expected; later duplicates are ignored.
    First,
    /// Peak metrics such as latency.
    Max,
}

impl Reducer {
    /// Combine an accumulated value with the next one.
    pub fn apply(self, acc: f64, next: f64) -> f64 {
        match self {
            Reducer::Sum => acc + next,
            Reducer::Last => next,
            Reducer::First => acc,
            Reducer::Max => acc.max(next),
        }
    }
}

/// A value that can be accumulated per (key, tick).
///
/// Implemented for single numbers and fixed-size number tuples.
pub trait Measure: Clone + PartialEq + Debug {
    /// The value of a missing (key, tick) combination.
    fn zero() -> Self;

    /// Fold `next` into `self`.
    fn reduce(&mut self, next: &Self, reducer: Reducer);

    /// Sum of all components, used for totals checks and pie slices.
    fn total(&self) -> f64;
}

impl Measure for f64 {
    fn zero() -> Self {
        0.0
    }

    fn reduce(&mut self, next: &Self, reducer: Reducer) {
        *self = reducer.apply(*self, *next);
    }

    fn total(&self) -> f64 {
        *self
    }
}

impl<const N: usize> Measure for [f64; N] {
    fn zero() -> Self {
        [0.0; N]
    }

    fn reduce(&mut self, next: &Self, reducer: Reducer) {
        for (acc, v) in self.iter_mut().zip(next) {
            *acc = reducer.apply(*acc, *v);
        }
    }

    fn total(&self) -> f64 {
        self.iter().sum()
    }
}

/// Per-key series sharing one tick axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Grouped<V = f64> {
    /// Distinct ticks in first-seen order.
    pub ticks: Vec<Tick>,
    /// One series per key, keys in first-seen order.
    pub series: IndexMap<GroupKey, Series<V>>,
}

impl<V: Measure> Grouped<V> {
    pub fn empty() -> Self {
        Self {
            ticks: Vec::new(),
            series: IndexMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Number of series.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn get(&self, key: &GroupKey) -> Option<&Series<V>> {
        self.series.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &GroupKey> {
        self.series.keys()
    }

    /// Per-key totals across all ticks.
    pub fn totals(&self) -> IndexMap<GroupKey, f64> {
        self.series
            .iter()
            .map(|(k, s)| (k.clone(), s.values().map(Measure::total).sum()))
            .collect()
    }

    /// Grand total across every series.
    pub fn total(&self) -> f64 {
        self.totals().values().sum()
    }
}

impl<V: Measure> Default for Grouped<V> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Group records by a single key per record.
///
/// Values sharing a (key, tick) pair are combined with `reducer`.
///
/// # Example
///
/// ```
/// use diagchart::pipeline::{group_by, Reducer};
/// use diagchart_types::{GroupKey, Record, Tick};
///
/// let records = vec![
///     Record::builder().field("ns", "a").field("t", 1).field("v", 5).build(),
///     Record::builder().field("ns", "b").field("t", 2).field("v", 3).build(),
/// ];
/// let grouped = group_by(
///     &records,
///     |r| Tick::Millis(r.number("t").unwrap_or(0.0) as i64),
///     |r| GroupKey::new(r.text("ns").unwrap_or("(unknown)")),
///     |r| r.number("v").unwrap_or(0.0),
///     Reducer::Sum,
/// );
///
/// let a: Vec<f64> = grouped.get(&"a".into()).unwrap().values().copied().collect();
/// assert_eq!(a, [5.0, 0.0]);
/// ```
pub fn group_by<R, V, T, K, F>(
    records: &[R],
    tick_fn: T,
    key_fn: K,
    value_fn: F,
    reducer: Reducer,
) -> Grouped<V>
where
    V: Measure,
    T: Fn(&R) -> Tick,
    K: Fn(&R) -> GroupKey,
    F: Fn(&R) -> V,
{
    group_entries(records, tick_fn, |r| [(key_fn(r), value_fn(r))], reducer)
}

/// Group records where each record may contribute to several keys.
///
/// `entries_fn` yields the (key, value) pairs for one record, e.g. one entry
/// per namespace of a minute row's `byNs` map. A record that yields no
/// entries still registers its tick.
pub fn group_entries<R, V, T, E, I>(
    records: &[R],
    tick_fn: T,
    entries_fn: E,
    reducer: Reducer,
) -> Grouped<V>
where
    V: Measure,
    T: Fn(&R) -> Tick,
    E: Fn(&R) -> I,
    I: IntoIterator<Item = (GroupKey, V)>,
{
    let mut ticks: IndexSet<Tick> = IndexSet::new();
    let mut cells: IndexMap<GroupKey, HashMap<usize, V>> = IndexMap::new();

    for record in records {
        let (tick_index, _) = ticks.insert_full(tick_fn(record));
        for (key, value) in entries_fn(record) {
            let row = cells.entry(key).or_default();
            match row.get_mut(&tick_index) {
                Some(acc) => acc.reduce(&value, reducer),
                None => {
                    row.insert(tick_index, value);
                }
            }
        }
    }

    let series = cells
        .into_iter()
        .map(|(key, mut row)| {
            let points = ticks
                .iter()
                .enumerate()
                .map(|(i, tick)| Point {
                    x: tick.clone(),
                    y: row.remove(&i).unwrap_or_else(V::zero),
                })
                .collect::<Series<V>>();
            (key, points)
        })
        .collect::<IndexMap<_, _>>();

    tracing::debug!(
        records = records.len(),
        ticks = ticks.len(),
        keys = series.len(),
        "grouped records"
    );

    Grouped {
        ticks: ticks.into_iter().collect(),
        series,
    }
}

/// Per-key totals over all records, keys in first-seen order.
pub fn totals_by_key<R, V, E, I>(records: &[R], entries_fn: E, reducer: Reducer) -> IndexMap<GroupKey, V>
where
    V: Measure,
    E: Fn(&R) -> I,
    I: IntoIterator<Item = (GroupKey, V)>,
{
    let mut totals: IndexMap<GroupKey, V> = IndexMap::new();
    for record in records {
        for (key, value) in entries_fn(record) {
            match totals.get_mut(&key) {
                Some(acc) => acc.reduce(&value, reducer),
                None => {
                    totals.insert(key, value);
                }
            }
        }
    }
    totals
}

/// Partition records into per-key point lists without merging or gap filling.
///
/// `point_fn` receives the record's index in the input so callers can link a
/// plotted point back to its source record. Returning `None` skips the record.
pub fn partition<'a, R, P, K, F>(records: &'a [R], key_fn: K, point_fn: F) -> IndexMap<GroupKey, Vec<P>>
where
    K: Fn(&R) -> GroupKey,
    F: Fn(usize, &'a R) -> Option<P>,
{
    let mut groups: IndexMap<GroupKey, Vec<P>> = IndexMap::new();
    let mut skipped = 0usize;
    for (index, record) in records.iter().enumerate() {
        match point_fn(index, record) {
            Some(point) => groups.entry(key_fn(record)).or_default().push(point),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::debug!(skipped, "records without a plottable point were skipped");
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use diagchart_types::Record;

    fn rec(ns: &str, t: i64, v: f64) -> Record {
        Record::builder().field("ns", ns).field("t", t).field("v", v).build()
    }

    fn by_ns(records: &[Record], reducer: Reducer) -> Grouped {
        group_by(
            records,
            |r| Tick::Millis(r.number("t").unwrap_or(0.0) as i64),
            |r| GroupKey::new(r.text("ns").unwrap_or("(unknown)")),
            |r| r.number("v").unwrap_or(0.0),
            reducer,
        )
    }

    fn ys(grouped: &Grouped, key: &str) -> Vec<(Tick, f64)> {
        grouped
            .get(&GroupKey::new(key))
            .unwrap()
            .iter()
            .map(|p| (p.x.clone(), p.y))
            .collect()
    }

    #[test]
    fn test_gap_filling() {
        let grouped = by_ns(&[rec("a", 1, 5.0), rec("b", 2, 3.0)], Reducer::Sum);

        assert_eq!(grouped.ticks, [Tick::Millis(1), Tick::Millis(2)]);
        assert_eq!(ys(&grouped, "a"), [(Tick::Millis(1), 5.0), (Tick::Millis(2), 0.0)]);
        assert_eq!(ys(&grouped, "b"), [(Tick::Millis(1), 0.0), (Tick::Millis(2), 3.0)]);
    }

    #[test]
    fn test_additive_aggregation() {
        let grouped = by_ns(&[rec("a", 1, 2.0), rec("a", 1, 3.0)], Reducer::Sum);
        assert_eq!(ys(&grouped, "a"), [(Tick::Millis(1), 5.0)]);
    }

    #[test]
    fn test_last_and_max_reducers() {
        let records = [rec("a", 1, 7.0), rec("a", 1, 3.0), rec("a", 1, 4.0)];
        assert_eq!(ys(&by_ns(&records, Reducer::Last), "a")[0].1, 4.0);
        assert_eq!(ys(&by_ns(&records, Reducer::First), "a")[0].1, 7.0);
        assert_eq!(ys(&by_ns(&records, Reducer::Max), "a")[0].1, 7.0);
    }

    #[test]
    fn test_first_seen_order() {
        let records = [rec("z", 30, 1.0), rec("a", 10, 1.0), rec("m", 20, 1.0), rec("a", 30, 1.0)];
        let grouped = by_ns(&records, Reducer::Sum);

        let keys: Vec<String> = grouped.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, ["z", "a", "m"]);
        assert_eq!(grouped.ticks, [Tick::Millis(30), Tick::Millis(10), Tick::Millis(20)]);
    }

    #[test]
    fn test_deterministic_output() {
        let records: Vec<Record> = (0..200)
            .map(|i| rec(&format!("ns{}", i % 17), i % 23, i as f64))
            .collect();
        assert_eq!(by_ns(&records, Reducer::Sum), by_ns(&records, Reducer::Sum));
    }

    #[test]
    fn test_totals_reconstruct_input() {
        let records: Vec<Record> = (0..50)
            .map(|i| rec(&format!("ns{}", i % 4), i % 7, (i * 3) as f64))
            .collect();
        let grouped = by_ns(&records, Reducer::Sum);

        for (key, total) in grouped.totals() {
            let expected: f64 = records
                .iter()
                .filter(|r| r.text("ns") == Some(key.primary()))
                .filter_map(|r| r.number("v"))
                .sum();
            assert_eq!(total, expected, "total for {}", key);
        }
    }

    #[test]
    fn test_empty_input() {
        let grouped = by_ns(&[], Reducer::Sum);
        assert!(grouped.is_empty());
        assert!(grouped.ticks.is_empty());
        assert_eq!(grouped.total(), 0.0);
    }

    #[test]
    fn test_entries_with_tuple_measure() {
        let row = Record::builder()
            .field("t", 1)
            .object("byNs", |m| {
                m.object("a", |n| n.field("count", 2).field("ms", 40))
                    .object("b", |n| n.field("count", 1).field("ms", 5))
            })
            .build();
        let grouped: Grouped<[f64; 2]> = group_entries(
            &[row.clone(), row],
            |r| Tick::Millis(r.number("t").unwrap_or(0.0) as i64),
            |r| {
                r.entries("byNs")
                    .map(|(ns, v)| {
                        let count = v.child("count").and_then(|c| c.as_f64()).unwrap_or(0.0);
                        let ms = v.child("ms").and_then(|c| c.as_f64()).unwrap_or(0.0);
                        (GroupKey::new(ns), [count, ms])
                    })
                    .collect::<Vec<_>>()
            },
            Reducer::Sum,
        );

        assert_eq!(grouped.get(&"a".into()).unwrap().points()[0].y, [4.0, 80.0]);
        assert_eq!(grouped.get(&"b".into()).unwrap().points()[0].y, [2.0, 10.0]);
        assert_eq!(grouped.total(), 96.0);
    }

    #[test]
    fn test_totals_by_key_and_partition() {
        let records = [rec("a", 1, 2.0), rec("b", 2, 3.0), rec("a", 3, 4.0)];

        let totals = totals_by_key(&records, |r| [(GroupKey::new(r.text("ns").unwrap()), r.number("v").unwrap())], Reducer::Sum);
        assert_eq!(totals.get(&GroupKey::new("a")), Some(&6.0));
        assert_eq!(totals.keys().next(), Some(&GroupKey::new("a")));

        let parts = partition(
            &records,
            |r| GroupKey::new(r.text("ns").unwrap()),
            |i, r| (r.number("v")? > 2.5).then_some(i),
        );
        assert_eq!(parts.get(&GroupKey::new("a")), Some(&vec![2]));
        assert_eq!(parts.get(&GroupKey::new("b")), Some(&vec![1]));
    }
}
