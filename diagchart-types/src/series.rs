//! Series - one line/bar/segment's worth of points.

use crate::Tick;

/// One (x, y) point of a series.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point<V = f64> {
    pub x: Tick,
    pub y: V,
}

impl<V> Point<V> {
    pub fn new(x: impl Into<Tick>, y: V) -> Self {
        Self { x: x.into(), y }
    }
}

/// An ordered sequence of points for one group key.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Series<V = f64> {
    points: Vec<Point<V>>,
}

impl<V> Series<V> {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, point: Point<V>) {
        self.points.push(point);
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[Point<V>] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point<V>> {
        self.points.iter()
    }

    /// The y values in point order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.points.iter().map(|p| &p.y)
    }

    pub fn into_points(self) -> Vec<Point<V>> {
        self.points
    }
}

impl Series<f64> {
    /// Sum of all y values.
    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.y).sum()
    }
}

impl<V> Default for Series<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> From<Vec<Point<V>>> for Series<V> {
    fn from(points: Vec<Point<V>>) -> Self {
        Self { points }
    }
}

impl<V> FromIterator<Point<V>> for Series<V> {
    fn from_iter<I: IntoIterator<Item = Point<V>>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_total_and_order() {
        let series: Series = [(1, 5.0), (2, 0.0), (3, 2.5)]
            .into_iter()
            .map(|(x, y)| Point::new(x as i64, y))
            .collect();

        assert_eq!(series.len(), 3);
        assert_eq!(series.total(), 7.5);
        let xs: Vec<&Tick> = series.iter().map(|p| &p.x).collect();
        assert_eq!(xs, [&Tick::Millis(1), &Tick::Millis(2), &Tick::Millis(3)]);
    }

    #[test]
    fn test_tuple_values() {
        let mut series: Series<[f64; 2]> = Series::new();
        series.push(Point::new("a", [1.0, 2.0]));
        assert_eq!(series.values().next(), Some(&[1.0, 2.0]));
    }
}
