use std::f64::consts::SQRT_2;
use std::fmt;

use waymark_core::Point;

/// Manhattan (L1) distance between two points.
#[inline]
pub fn manhattan(a: Point, b: Point) -> f64 {
    f64::from((a.x - b.x).abs() + (a.y - b.y).abs())
}

/// Euclidean (L2) distance between two points.
#[inline]
pub fn euclidean(a: Point, b: Point) -> f64 {
    let dx = f64::from(a.x - b.x);
    let dy = f64::from(a.y - b.y);
    dx.hypot(dy)
}

/// Chebyshev (L∞) distance between two points.
#[inline]
pub fn chebyshev(a: Point, b: Point) -> f64 {
    f64::from((a.x - b.x).abs().max((a.y - b.y).abs()))
}

/// Octile distance: the cost of the cheapest 8-connected walk when
/// orthogonal steps cost 1 and diagonal steps cost √2.
#[inline]
pub fn octile(a: Point, b: Point) -> f64 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    f64::from(dx.max(dy)) + (SQRT_2 - 1.0) * f64::from(dx.min(dy))
}

/// Distance estimate used to order the A* frontier.
///
/// Every variant is a lower bound on the unit-cost walk. When diagonal
/// steps are allowed, [`Manhattan`](Heuristic::Manhattan) is measured as
/// [`octile`] distance, the 8-connected counterpart of the L1 walk.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "String", into = "String"))]
pub enum Heuristic {
    #[default]
    Manhattan,
    Euclidean,
    Chebyshev,
}

impl Heuristic {
    /// Look a heuristic up by name (case-insensitive). Unknown names fall
    /// back to [`Heuristic::Manhattan`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "euclidean" => Heuristic::Euclidean,
            "chebyshev" => Heuristic::Chebyshev,
            "manhattan" => Heuristic::Manhattan,
            other => {
                log::debug!("unknown heuristic {other:?}, using manhattan");
                Heuristic::Manhattan
            }
        }
    }

    /// Lower-case name.
    pub const fn name(self) -> &'static str {
        match self {
            Heuristic::Manhattan => "manhattan",
            Heuristic::Euclidean => "euclidean",
            Heuristic::Chebyshev => "chebyshev",
        }
    }

    /// Estimated distance from `from` to `to` on a grid that does or does
    /// not allow diagonal steps.
    #[inline]
    pub fn estimate(self, from: Point, to: Point, diagonal: bool) -> f64 {
        match self {
            Heuristic::Manhattan if diagonal => octile(from, to),
            Heuristic::Manhattan => manhattan(from, to),
            Heuristic::Euclidean => euclidean(from, to),
            Heuristic::Chebyshev => chebyshev(from, to),
        }
    }
}

impl From<String> for Heuristic {
    fn from(name: String) -> Self {
        Heuristic::from_name(&name)
    }
}

impl From<Heuristic> for String {
    fn from(h: Heuristic) -> Self {
        h.name().to_owned()
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics() {
        let a = Point::new(0, 0);
        let b = Point::new(3, 4);
        assert_eq!(manhattan(a, b), 7.0);
        assert_eq!(euclidean(a, b), 5.0);
        assert_eq!(chebyshev(a, b), 4.0);
        assert_eq!(octile(a, b), 4.0 + (SQRT_2 - 1.0) * 3.0);
        assert_eq!(Heuristic::Chebyshev.estimate(b, a, true), 4.0);
    }

    #[test]
    fn manhattan_turns_octile_with_diagonals() {
        let a = Point::new(2, 2);
        let b = Point::new(5, 3);
        assert_eq!(Heuristic::Manhattan.estimate(a, b, false), 4.0);
        assert_eq!(Heuristic::Manhattan.estimate(a, b, true), octile(a, b));
        // Never above the true cost of one diagonal plus two straight steps.
        assert!(Heuristic::Manhattan.estimate(a, b, true) <= SQRT_2 + 2.0 + 1e-12);
    }

    #[test]
    fn unknown_names_fall_back_to_manhattan() {
        assert_eq!(Heuristic::from_name("Euclidean"), Heuristic::Euclidean);
        assert_eq!(Heuristic::from_name("chebyshev"), Heuristic::Chebyshev);
        assert_eq!(Heuristic::from_name("octile"), Heuristic::Manhattan);
        assert_eq!(Heuristic::from_name(""), Heuristic::Manhattan);
    }
}
