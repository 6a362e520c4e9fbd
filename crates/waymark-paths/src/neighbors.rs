use waymark_core::Point;

/// Reusable neighbor enumeration helper.
///
/// Provides methods for enumerating cardinal (4-way) or all (8-way)
/// neighbors of a grid point, filtered by a predicate.
pub struct Neighbors {
    buf: Vec<Point>,
}

impl Default for Neighbors {
    fn default() -> Self {
        Self::new()
    }
}

impl Neighbors {
    /// Create a new `Neighbors` helper.
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(8),
        }
    }

    /// Return 4-directional (cardinal) neighbors of `p`, keeping only those
    /// for which `keep` returns `true`.
    pub fn cardinal(&mut self, p: Point, keep: impl Fn(Point) -> bool) -> &[Point] {
        self.buf.clear();
        self.buf.extend(p.neighbors_4().into_iter().filter(|&n| keep(n)));
        &self.buf
    }

    /// Return 8-directional neighbors of `p`, keeping only those for which
    /// `keep` returns `true`.
    pub fn all(&mut self, p: Point, keep: impl Fn(Point) -> bool) -> &[Point] {
        self.buf.clear();
        self.buf.extend(p.neighbors_8().into_iter().filter(|&n| keep(n)));
        &self.buf
    }

    /// [`all`](Self::all) when `diagonal` is set, [`cardinal`](Self::cardinal)
    /// otherwise.
    pub fn step(&mut self, p: Point, diagonal: bool, keep: impl Fn(Point) -> bool) -> &[Point] {
        if diagonal {
            self.all(p, keep)
        } else {
            self.cardinal(p, keep)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_core::Range;

    #[test]
    fn filters_by_predicate() {
        let rng = Range::with_size(3, 3);
        let mut nb = Neighbors::new();
        assert_eq!(nb.cardinal(Point::ZERO, |p| rng.contains(p)).len(), 2);
        assert_eq!(nb.all(Point::ZERO, |p| rng.contains(p)).len(), 3);
        assert_eq!(nb.step(Point::new(1, 1), true, |p| rng.contains(p)).len(), 8);
        assert_eq!(nb.step(Point::new(1, 1), false, |p| rng.contains(p)).len(), 4);
    }
}
