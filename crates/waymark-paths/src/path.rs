use std::fmt;
use std::ops::Deref;

use waymark_core::{Area, Point};

/// An ordered route of cells, from start (first) to end (last).
///
/// Consecutive points are at most one cell apart on each axis. A `Path` is
/// never mutated in place; operations such as [`reversed`](Path::reversed)
/// return new values, and the cache hands out clones.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Path(Vec<Point>);

impl Path {
    /// Wrap a list of points.
    pub fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// First point.
    #[inline]
    pub fn start(&self) -> Option<Point> {
        self.0.first().copied()
    }

    /// Last point.
    #[inline]
    pub fn end(&self) -> Option<Point> {
        self.0.last().copied()
    }

    /// Number of steps (one less than the number of points).
    #[inline]
    pub fn steps(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// The same route walked the other way.
    pub fn reversed(&self) -> Path {
        Path(self.0.iter().rev().copied().collect())
    }

    /// Whether any point of the path lies inside `area`.
    pub fn crosses(&self, area: &Area) -> bool {
        self.0.iter().any(|&p| area.contains(p))
    }

    /// Whether every consecutive pair is one step apart, with diagonal
    /// steps only when `diagonal` is set.
    pub fn is_connected(&self, diagonal: bool) -> bool {
        self.0.windows(2).all(|w| {
            w[0] != w[1] && w[0].is_adjacent(w[1]) && (diagonal || !w[0].is_diagonal_step(w[1]))
        })
    }

    /// Unwrap into the underlying points.
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }
}

impl Deref for Path {
    type Target = [Point];

    fn deref(&self) -> &[Point] {
        &self.0
    }
}

impl From<Vec<Point>> for Path {
    fn from(points: Vec<Point>) -> Self {
        Self(points)
    }
}

impl FromIterator<Point> for Path {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{p}")?;
        }
        Ok(())
    }
}
