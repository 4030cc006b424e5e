//! Downsampling of long series into fixed-width windows.
//!
//! A series of `n` elements downsampled by `scale` yields `ceil(n / scale)`
//! elements. Windows are consecutive and non-overlapping, taken left to right;
//! the last one may be short. Numbers in a window combine with the dataset's
//! [`Reducer`], ticks and labels take the window's first element.

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use diagchart_types::{Point, Series, Tick};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use super::aggregate::{Grouped, Measure, Reducer};
use crate::error::PipelineError;

/// Largest scale the viewer can step up to.
pub const MAX_SCALE: usize = 1_000;

/// A validated downsampling factor (an integer >= 1).
///
/// Every conversion fails on invalid input instead of clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u64")]
pub struct Scale(NonZeroUsize);

impl Scale {
    pub const ONE: Scale = Scale(NonZeroUsize::MIN);

    pub fn new(scale: usize) -> Result<Self, PipelineError> {
        NonZeroUsize::new(scale)
            .map(Scale)
            .ok_or_else(|| PipelineError::InvalidScale(scale.to_string()))
    }

    pub fn get(self) -> usize {
        self.0.get()
    }

    /// The next coarser scale, saturating at [`MAX_SCALE`].
    pub fn increment(self) -> Self {
        Scale::new((self.get() + 1).min(MAX_SCALE)).unwrap_or(self)
    }

    /// The next finer scale, never below 1.
    pub fn decrement(self) -> Self {
        Scale::new(self.get().saturating_sub(1)).unwrap_or(Scale::ONE)
    }
}

impl Default for Scale {
    fn default() -> Self {
        Scale::ONE
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Scale {
    type Error = PipelineError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Scale)
            .ok_or_else(|| PipelineError::InvalidScale(value.to_string()))
    }
}

impl TryFrom<f64> for Scale {
    type Error = PipelineError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() || value.fract() != 0.0 || value < 1.0 || value > usize::MAX as f64 {
            return Err(PipelineError::InvalidScale(value.to_string()));
        }
        Scale::new(value as usize)
    }
}

impl FromStr for Scale {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(n) = trimmed.parse::<i64>() {
            return Scale::try_from(n);
        }
        match trimmed.parse::<f64>() {
            Ok(f) => Scale::try_from(f),
            Err(_) => Err(PipelineError::InvalidScale(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for Scale {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ScaleVisitor;

        // Integers, integral floats and numeric strings; floats are never rounded.
        impl<'de> Visitor<'de> for ScaleVisitor {
            type Value = Scale;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an integer scale >= 1")
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Scale, E> {
                Scale::try_from(value).map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Scale, E> {
                usize::try_from(value)
                    .map_err(E::custom)
                    .and_then(|n| Scale::new(n).map_err(E::custom))
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> Result<Scale, E> {
                Scale::try_from(value).map_err(E::custom)
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Scale, E> {
                value.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(ScaleVisitor)
    }
}

impl From<Scale> for u64 {
    fn from(scale: Scale) -> Self {
        scale.get() as u64
    }
}

/// A value that can stand in for a window of values.
pub trait Downsample: Clone {
    /// Collapse a non-empty window, given as its first element and the rest.
    fn merge(first: &Self, rest: &[Self], reducer: Reducer) -> Self;
}

impl Downsample for f64 {
    fn merge(first: &Self, rest: &[Self], reducer: Reducer) -> Self {
        rest.iter().fold(*first, |acc, v| reducer.apply(acc, *v))
    }
}

impl<const N: usize> Downsample for [f64; N] {
    fn merge(first: &Self, rest: &[Self], reducer: Reducer) -> Self {
        let mut acc = *first;
        for next in rest {
            acc.reduce(next, reducer);
        }
        acc
    }
}

impl Downsample for Tick {
    fn merge(first: &Self, _rest: &[Self], _reducer: Reducer) -> Self {
        first.clone()
    }
}

impl Downsample for String {
    fn merge(first: &Self, _rest: &[Self], _reducer: Reducer) -> Self {
        first.clone()
    }
}

impl<V: Downsample> Downsample for Point<V> {
    fn merge(first: &Self, rest: &[Self], reducer: Reducer) -> Self {
        let ys = rest.iter().map(|p| p.y.clone()).collect::<Vec<_>>();
        Point {
            x: first.x.clone(),
            y: V::merge(&first.y, &ys, reducer),
        }
    }
}

/// Downsample a series by summing consecutive windows of `scale` elements.
///
/// `scale == 1` returns an exact copy. `scale == 0` is rejected, including
/// for empty input.
///
/// ```
/// use diagchart::pipeline::scale_data;
///
/// let counts = [1.0, 2.0, 3.0, 4.0, 5.0];
/// assert_eq!(scale_data(&counts, 2).unwrap(), [3.0, 7.0, 5.0]);
/// assert!(scale_data(&counts, 0).is_err());
/// ```
pub fn scale_data<T: Downsample>(series: &[T], scale: usize) -> Result<Vec<T>, PipelineError> {
    scale_data_with(series, scale, Reducer::Sum)
}

/// Downsample a series, combining numbers in each window with `reducer`.
pub fn scale_data_with<T: Downsample>(
    series: &[T],
    scale: usize,
    reducer: Reducer,
) -> Result<Vec<T>, PipelineError> {
    Ok(downsample_by(series, Scale::new(scale)?, reducer))
}

/// Downsample with an already validated scale.
pub fn downsample_by<T: Downsample>(series: &[T], scale: Scale, reducer: Reducer) -> Vec<T> {
    if scale == Scale::ONE {
        return series.to_vec();
    }
    series
        .chunks(scale.get())
        .filter_map(|window| window.split_first())
        .map(|(first, rest)| T::merge(first, rest, reducer))
        .collect()
}

impl<V: Measure + Downsample> Grouped<V> {
    /// Downsample the shared ticks and every series with the same windows.
    pub fn downsample(&self, scale: Scale, reducer: Reducer) -> Grouped<V> {
        let ticks = downsample_by(&self.ticks, scale, reducer);
        let series = self
            .series
            .iter()
            .map(|(key, s)| (key.clone(), Series::from(downsample_by(s.points(), scale, reducer))))
            .collect();
        Grouped { ticks, series }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::group_by;
    use diagchart_types::{GroupKey, Record};
    use proptest::prelude::*;

    #[test]
    fn test_windows_sum_left_to_right() {
        let s = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        assert_eq!(scale_data(&s, 3).unwrap(), [6.0, 15.0, 7.0]);
        assert_eq!(scale_data(&s, 7).unwrap(), [28.0]);
        assert_eq!(scale_data(&s, 100).unwrap(), [28.0]);
    }

    #[test]
    fn test_zero_scale_fails() {
        assert_eq!(
            scale_data(&[1.0, 2.0], 0),
            Err(PipelineError::InvalidScale("0".to_string()))
        );
        assert!(scale_data::<f64>(&[], 0).is_err());
    }

    #[test]
    fn test_empty_series() {
        assert!(scale_data::<f64>(&[], 4).unwrap().is_empty());
    }

    #[test]
    fn test_reducers() {
        let s = [3.0, 9.0, 4.0, 1.0];
        assert_eq!(scale_data_with(&s, 2, Reducer::Last).unwrap(), [9.0, 1.0]);
        assert_eq!(scale_data_with(&s, 2, Reducer::Max).unwrap(), [9.0, 4.0]);
        assert_eq!(scale_data_with(&s, 2, Reducer::First).unwrap(), [3.0, 4.0]);
    }

    #[test]
    fn test_points_take_first_tick() {
        let points = vec![
            Point::new(1_000i64, 1.0),
            Point::new(2_000i64, 2.0),
            Point::new(3_000i64, 3.0),
        ];
        let scaled = scale_data(&points, 2).unwrap();
        assert_eq!(scaled, [Point::new(1_000i64, 3.0), Point::new(3_000i64, 3.0)]);
    }

    #[test]
    fn test_grouped_downsample() {
        let records: Vec<Record> = (0..5)
            .map(|t| Record::builder().field("ns", "a").field("t", t).field("v", 1).build())
            .collect();
        let grouped = group_by(
            &records,
            |r| Tick::Millis(r.number("t").unwrap_or(0.0) as i64),
            |_| GroupKey::new("a"),
            |r| r.number("v").unwrap_or(0.0),
            Reducer::Sum,
        );

        let scaled = grouped.downsample(Scale::new(2).unwrap(), Reducer::Sum);
        assert_eq!(scaled.ticks, [Tick::Millis(0), Tick::Millis(2), Tick::Millis(4)]);
        let ys: Vec<f64> = scaled.get(&"a".into()).unwrap().values().copied().collect();
        assert_eq!(ys, [2.0, 2.0, 1.0]);
        assert_eq!(scaled.total(), grouped.total());
    }

    #[test]
    fn test_scale_parsing() {
        assert_eq!("4".parse::<Scale>().unwrap().get(), 4);
        assert_eq!(" 2.0 ".parse::<Scale>().unwrap().get(), 2);
        assert!("0".parse::<Scale>().is_err());
        assert!("-3".parse::<Scale>().is_err());
        assert!("1.5".parse::<Scale>().is_err());
        assert!("fast".parse::<Scale>().is_err());
        assert!(Scale::try_from(f64::NAN).is_err());
        assert!(Scale::try_from(0i64).is_err());
    }

    #[test]
    fn test_scale_stepping() {
        assert_eq!(Scale::ONE.decrement(), Scale::ONE);
        assert_eq!(Scale::ONE.increment().get(), 2);
        assert_eq!(Scale::new(MAX_SCALE).unwrap().increment().get(), MAX_SCALE);
    }

    #[test]
    fn test_scale_serde() {
        let scale: Scale = serde_json::from_str("3").unwrap();
        assert_eq!(scale.get(), 3);
        assert!(serde_json::from_str::<Scale>("0").is_err());
        assert_eq!(serde_json::to_string(&scale).unwrap(), "3");

        assert_eq!(serde_json::from_str::<Scale>("4.0").unwrap().get(), 4);
        assert_eq!(serde_json::from_str::<Scale>("\"5\"").unwrap().get(), 5);
        assert!(serde_json::from_str::<Scale>("2.5").is_err());
        assert!(serde_json::from_str::<Scale>("-1").is_err());
        assert!(serde_json::from_str::<Scale>("true").is_err());
        assert!(serde_json::from_str::<Scale>("null").is_err());
    }

    proptest! {
        #[test]
        fn prop_sum_preserved(values in prop::collection::vec(0u32..10_000, 0..300), k in 1usize..64) {
            let series: Vec<f64> = values.iter().map(|v| *v as f64).collect();
            let scaled = scale_data(&series, k).unwrap();
            prop_assert_eq!(scaled.iter().sum::<f64>(), series.iter().sum::<f64>());
        }

        #[test]
        fn prop_identity_at_one(values in prop::collection::vec(-1e6f64..1e6, 0..200)) {
            prop_assert_eq!(scale_data(&values, 1).unwrap(), values);
        }

        #[test]
        fn prop_length(len in 0usize..500, k in 1usize..80) {
            let series = vec![1.0; len];
            prop_assert_eq!(scale_data(&series, k).unwrap().len(), len.div_ceil(k));
        }

        #[test]
        fn prop_pure(values in prop::collection::vec(0u32..100, 0..100), k in 1usize..10) {
            let series: Vec<f64> = values.iter().map(|v| *v as f64).collect();
            let before = series.clone();
            let a = scale_data(&series, k).unwrap();
            let b = scale_data(&series, k).unwrap();
            prop_assert_eq!(a, b);
            prop_assert_eq!(series, before);
        }
    }
}
