use waymark_core::{Point, Terrain, TileMap};

/// The grid a path search runs on.
pub trait GridMap {
    /// Number of columns.
    fn width(&self) -> i32;

    /// Number of rows.
    fn height(&self) -> i32;

    /// Whether a mover may stand on `p`. Only called for in-bounds points.
    fn is_passable(&self, p: Point) -> bool;

    /// Multiplier applied to the cost of stepping onto `p` (≥ 0, or
    /// infinity for "never"). `None` means the grid has no terrain costs,
    /// which is treated as a multiplier of 1.
    fn terrain_cost(&self, _p: Point) -> Option<f64> {
        None
    }

    /// Lower bound of [`terrain_cost`](GridMap::terrain_cost) over passable
    /// cells. Search estimates are scaled by it so they never overestimate.
    fn min_terrain_cost(&self) -> f64 {
        1.0
    }
}

/// World-side lookup used by movement-cost calculation.
pub trait TerrainSource {
    /// Terrain at `p`, or `None` when it is unknown.
    fn terrain_at(&self, p: Point) -> Option<Terrain>;
}

impl GridMap for TileMap {
    fn width(&self) -> i32 {
        TileMap::width(self)
    }

    fn height(&self) -> i32 {
        TileMap::height(self)
    }

    fn is_passable(&self, p: Point) -> bool {
        self.at(p).is_some_and(Terrain::is_passable)
    }

    fn terrain_cost(&self, p: Point) -> Option<f64> {
        self.at(p).map(|t| self.weight(t))
    }

    fn min_terrain_cost(&self) -> f64 {
        Terrain::ALL
            .into_iter()
            .filter(|t| t.is_passable())
            .map(|t| self.weight(t))
            .fold(f64::INFINITY, f64::min)
    }
}

impl TerrainSource for TileMap {
    fn terrain_at(&self, p: Point) -> Option<Terrain> {
        self.at(p)
    }
}
