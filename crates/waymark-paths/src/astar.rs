//! A* shortest-path search over a [`GridMap`].

use std::f64::consts::SQRT_2;

use log::{debug, error, trace};
use waymark_core::{Point, Range};

use crate::distance::Heuristic;
use crate::error::{PathError, Result};
use crate::neighbors::Neighbors;
use crate::path::Path;
use crate::queue::PriorityQueue;
use crate::traits::GridMap;

/// Default expansion budget of a single search.
pub const DEFAULT_MAX_SEARCH_NODES: usize = 10_000;

/// Search settings.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PathfinderConfig {
    /// Enable 8-directional movement
    pub allow_diagonal: bool,

    /// Frontier ordering estimate
    pub heuristic: Heuristic,

    /// Maximum nodes to expand before giving up
    pub max_search_nodes: usize,
}

impl Default for PathfinderConfig {
    fn default() -> Self {
        Self {
            allow_diagonal: true,
            heuristic: Heuristic::Manhattan,
            max_search_nodes: DEFAULT_MAX_SEARCH_NODES,
        }
    }
}

impl PathfinderConfig {
    pub fn with_diagonal(mut self, allow: bool) -> Self {
        self.allow_diagonal = allow;
        self
    }

    pub fn with_heuristic(mut self, heuristic: Heuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    pub fn with_max_search_nodes(mut self, max: usize) -> Self {
        self.max_search_nodes = max;
        self
    }
}

/// Result of a search, with the reason when no path was produced.
///
/// [`PathfindingSystem::find_path`] collapses every non-`Found` variant
/// into `None`.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchOutcome {
    /// A cheapest path and its cost under the grid's edge costs.
    Found {
        path: Path,
        cost: f64,
        expanded: usize,
    },
    /// The start or end cell is not passable.
    Blocked,
    /// The frontier emptied without reaching the end.
    Unreachable { expanded: usize },
    /// The expansion budget ran out first.
    BudgetExhausted { expanded: usize },
    /// The predecessor chain could not be walked back to the start.
    Corrupted,
}

impl SearchOutcome {
    /// The path, if one was found.
    pub fn into_path(self) -> Option<Path> {
        match self {
            SearchOutcome::Found { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Borrow the path, if one was found.
    pub fn path(&self) -> Option<&Path> {
        match self {
            SearchOutcome::Found { path, .. } => Some(path),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found { .. })
    }

    /// Number of nodes expanded by the search.
    pub fn expanded(&self) -> usize {
        match *self {
            SearchOutcome::Found { expanded, .. }
            | SearchOutcome::Unreachable { expanded }
            | SearchOutcome::BudgetExhausted { expanded } => expanded,
            SearchOutcome::Blocked | SearchOutcome::Corrupted => 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Search scratch
// ---------------------------------------------------------------------------

const NO_PARENT: usize = usize::MAX;

#[derive(Clone)]
struct Node {
    g: f64,
    parent: usize,
    generation: u32,
    closed: bool,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            g: f64::INFINITY,
            parent: NO_PARENT,
            generation: 0,
            closed: false,
        }
    }
}

// ---------------------------------------------------------------------------
// PathfindingSystem
// ---------------------------------------------------------------------------

/// A* path planner.
///
/// The planner owns its node array, open set and neighbor buffer so that
/// repeated searches allocate nothing once the largest grid has been seen.
/// Nodes are invalidated lazily by bumping a generation counter.
///
/// Edge costs are 1 for orthogonal and √2 for diagonal steps, multiplied by
/// [`GridMap::terrain_cost`] of the destination. Occupancy is not
/// consulted: pricing occupied cells is the job of
/// [`MovementCostCalculator`](crate::MovementCostCalculator).
pub struct PathfindingSystem {
    config: PathfinderConfig,
    nodes: Vec<Node>,
    width: usize,
    generation: u32,
    open: PriorityQueue<usize, f64>,
    nbuf: Neighbors,
}

impl Default for PathfindingSystem {
    fn default() -> Self {
        Self::new(PathfinderConfig::default())
    }
}

impl PathfindingSystem {
    /// Create a planner with the given settings.
    pub fn new(config: PathfinderConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            width: 0,
            generation: 0,
            open: PriorityQueue::new(),
            nbuf: Neighbors::new(),
        }
    }

    /// Current settings.
    pub fn config(&self) -> &PathfinderConfig {
        &self.config
    }

    /// Replace the settings. Scratch buffers are kept.
    pub fn set_config(&mut self, config: PathfinderConfig) {
        self.config = config;
    }

    /// Cheapest path from `start` to `end`, or `None` when there is none.
    ///
    /// Fails with [`PathError::InvalidPosition`] when either endpoint is
    /// outside `[0, width) × [0, height)`. An impassable endpoint, an
    /// unreachable end and an exhausted search budget all yield `None`; use
    /// [`search`](Self::search) to tell them apart.
    pub fn find_path<G: GridMap>(
        &mut self,
        start: Point,
        end: Point,
        grid: &G,
    ) -> Result<Option<Path>> {
        self.search(start, end, grid).map(SearchOutcome::into_path)
    }

    /// Run the search and report why it stopped.
    pub fn search<G: GridMap>(&mut self, start: Point, end: Point, grid: &G) -> Result<SearchOutcome> {
        let (width, height) = (grid.width(), grid.height());
        let bounds = Range::with_size(width, height);
        for pos in [start, end] {
            if !bounds.contains(pos) {
                return Err(PathError::InvalidPosition { pos, width, height });
            }
        }

        if start == end {
            return Ok(SearchOutcome::Found {
                path: Path::new(vec![start]),
                cost: 0.0,
                expanded: 0,
            });
        }

        if !grid.is_passable(start) || !grid.is_passable(end) {
            debug!("search {start} -> {end}: endpoint blocked");
            return Ok(SearchOutcome::Blocked);
        }

        trace!(
            "search {start} -> {end} on {width}x{height} (diagonal={}, heuristic={})",
            self.config.allow_diagonal, self.config.heuristic
        );

        let cur_gen = self.prepare(bounds);
        let heuristic = self.config.heuristic;
        let diagonal = self.config.allow_diagonal;
        let budget = self.config.max_search_nodes;
        let scale = match grid.min_terrain_cost() {
            c if c >= 0.0 => c.min(1.0),
            _ => 0.0,
        };

        let start_idx = self.idx(start);
        let goal_idx = self.idx(end);
        {
            let node = &mut self.nodes[start_idx];
            node.g = 0.0;
            node.parent = NO_PARENT;
            node.generation = cur_gen;
            node.closed = false;
        }
        self.open.clear();
        let estimate = |p: Point| scale * heuristic.estimate(p, end, diagonal);
        self.open.enqueue(start_idx, estimate(start));

        let mut nbuf = std::mem::take(&mut self.nbuf);
        let mut expanded = 0usize;

        let outcome = loop {
            let Some(current) = self.open.dequeue() else {
                break SearchOutcome::Unreachable { expanded };
            };
            let ci = current.value;

            if ci == goal_idx {
                break self.reconstruct(start_idx, goal_idx, cur_gen, expanded);
            }
            if self.nodes[ci].closed {
                continue;
            }
            if expanded >= budget {
                break SearchOutcome::BudgetExhausted { expanded };
            }
            expanded += 1;

            self.nodes[ci].closed = true;
            let current_g = self.nodes[ci].g;
            let current_point = self.point(ci);

            let neighbors = nbuf.step(current_point, diagonal, |p| {
                bounds.contains(p) && grid.is_passable(p)
            });
            for &np in neighbors {
                let step = if current_point.is_diagonal_step(np) {
                    SQRT_2
                } else {
                    1.0
                };
                let tentative_g = current_g + step * grid.terrain_cost(np).unwrap_or(1.0);
                if !tentative_g.is_finite() {
                    continue;
                }

                let ni = self.idx(np);
                let n = &mut self.nodes[ni];
                if n.generation == cur_gen {
                    if n.closed || tentative_g >= n.g {
                        continue;
                    }
                } else {
                    n.generation = cur_gen;
                    n.closed = false;
                }
                n.g = tentative_g;
                n.parent = ci;

                let f = tentative_g + estimate(np);
                if !self.open.update_priority(&ni, f) {
                    self.open.enqueue(ni, f);
                }
            }
        };

        self.nbuf = nbuf;
        self.open.clear();

        match &outcome {
            SearchOutcome::Found { path, cost, expanded } => debug!(
                "search {start} -> {end}: {} steps, cost {cost:.3}, {expanded} expanded",
                path.steps()
            ),
            SearchOutcome::Unreachable { expanded } => {
                debug!("search {start} -> {end}: unreachable after {expanded} expanded")
            }
            SearchOutcome::BudgetExhausted { expanded } => {
                debug!("search {start} -> {end}: budget of {expanded} nodes exhausted")
            }
            SearchOutcome::Blocked | SearchOutcome::Corrupted => {}
        }
        Ok(outcome)
    }

    /// Size the node array for `bounds` and start a new generation.
    fn prepare(&mut self, bounds: Range) -> u32 {
        let len = bounds.len();
        self.width = bounds.width() as usize;
        if self.nodes.len() < len {
            self.nodes.resize(len, Node::default());
        }

        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            // Wrapped: old stamps could collide with the new generation.
            self.nodes.fill(Node::default());
            self.generation = 1;
        }
        self.generation
    }

    /// Walk the predecessor chain from `goal` back to `start`.
    fn reconstruct(&self, start: usize, goal: usize, cur_gen: u32, expanded: usize) -> SearchOutcome {
        let mut points = Vec::new();
        let mut ci = goal;
        loop {
            points.push(self.point(ci));
            if ci == start {
                break;
            }
            let node = &self.nodes[ci];
            if node.generation != cur_gen || node.parent == NO_PARENT || points.len() > self.nodes.len() {
                error!(
                    "predecessor chain broken at {} while rebuilding {} -> {}",
                    self.point(ci),
                    self.point(start),
                    self.point(goal)
                );
                return SearchOutcome::Corrupted;
            }
            ci = node.parent;
        }
        points.reverse();
        SearchOutcome::Found {
            path: Path::new(points),
            cost: self.nodes[goal].g,
            expanded,
        }
    }

    /// Flat index of an in-bounds point.
    #[inline]
    fn idx(&self, p: Point) -> usize {
        p.y as usize * self.width + p.x as usize
    }

    /// Inverse of [`idx`](Self::idx).
    #[inline]
    fn point(&self, idx: usize) -> Point {
        Point::new((idx % self.width) as i32, (idx / self.width) as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_core::{Terrain, TileMap};

    fn map(rows: &str) -> TileMap {
        TileMap::from_ascii(rows).unwrap()
    }

    fn orthogonal() -> PathfindingSystem {
        PathfindingSystem::new(PathfinderConfig::default().with_diagonal(false))
    }

    #[test]
    fn same_cell_is_single_point_path() {
        let m = map("#");
        let mut ps = PathfindingSystem::default();
        let p = Point::new(0, 0);
        // Even an impassable cell routes to itself.
        assert_eq!(ps.find_path(p, p, &m).unwrap(), Some(Path::new(vec![p])));
    }

    #[test]
    fn out_of_bounds_is_an_error() {
        let m = TileMap::new(4, 4, Terrain::Ground).unwrap();
        let mut ps = PathfindingSystem::default();
        let err = ps
            .find_path(Point::new(0, 0), Point::new(4, 0), &m)
            .unwrap_err();
        assert_eq!(
            err,
            PathError::InvalidPosition {
                pos: Point::new(4, 0),
                width: 4,
                height: 4
            }
        );
        assert!(ps.find_path(Point::new(-1, 0), Point::new(0, 0), &m).is_err());
    }

    #[test]
    fn blocked_endpoints_yield_none() {
        let m = map(
            r"
            .#.
            ...
            ",
        );
        let mut ps = PathfindingSystem::default();
        let wall = Point::new(1, 0);
        assert_eq!(ps.search(Point::new(0, 0), wall, &m).unwrap(), SearchOutcome::Blocked);
        assert_eq!(ps.find_path(wall, Point::new(2, 1), &m).unwrap(), None);
    }

    #[test]
    fn straight_line_orthogonal() {
        let m = TileMap::new(6, 3, Terrain::Ground).unwrap();
        let mut ps = orthogonal();
        let path = ps
            .find_path(Point::new(0, 1), Point::new(5, 1), &m)
            .unwrap()
            .unwrap();
        assert_eq!(path.len(), 6);
        assert!(path.is_connected(false));
        assert!(path.iter().all(|p| p.y == 1));
    }

    #[test]
    fn default_config_returns_the_cheapest_diagonal_route() {
        let m = TileMap::new(12, 12, Terrain::Ground).unwrap();
        let mut ps = PathfindingSystem::default();
        let outcome = ps.search(Point::new(7, 0), Point::new(0, 11), &m).unwrap();
        let SearchOutcome::Found { cost, .. } = outcome else {
            panic!("expected a path, got {outcome:?}");
        };
        assert!((cost - (11.0 + 7.0 * (SQRT_2 - 1.0))).abs() < 1e-9, "{cost}");
    }

    #[test]
    fn cheap_terrain_keeps_the_estimate_admissible() {
        // Roads cost a quarter; the long way round on the road wins.
        let mut m = map(
            r"
            .....
            =====
            ",
        );
        m.set_weight(Terrain::Road, 0.25);
        let mut ps = orthogonal();
        let outcome = ps.search(Point::new(0, 0), Point::new(4, 0), &m).unwrap();
        let SearchOutcome::Found { path, cost, .. } = outcome else {
            panic!("expected a path, got {outcome:?}");
        };
        assert!((cost - 2.25).abs() < 1e-9, "{cost} via {path}");
        assert_eq!(path.len(), 7);
    }

    #[test]
    fn diagonal_moves_shorten_paths() {
        let m = TileMap::new(5, 5, Terrain::Ground).unwrap();
        let mut ps = PathfindingSystem::new(
            PathfinderConfig::default().with_heuristic(Heuristic::Chebyshev),
        );
        let outcome = ps.search(Point::new(0, 0), Point::new(4, 4), &m).unwrap();
        let SearchOutcome::Found { path, cost, .. } = outcome else {
            panic!("expected a path, got {outcome:?}");
        };
        assert_eq!(path.len(), 5);
        assert!((cost - 4.0 * SQRT_2).abs() < 1e-9);
        assert!(path.is_connected(true));
    }

    #[test]
    fn walled_off_target_is_unreachable() {
        let m = map(
            r"
            ..#..
            ..#..
            ..#..
            ",
        );
        let mut ps = PathfindingSystem::default();
        let outcome = ps.search(Point::new(0, 1), Point::new(4, 1), &m).unwrap();
        assert!(matches!(outcome, SearchOutcome::Unreachable { expanded } if expanded == 6));
        assert_eq!(outcome.into_path(), None);
    }

    #[test]
    fn budget_exhaustion_yields_none() {
        let m = TileMap::new(30, 30, Terrain::Ground).unwrap();
        let mut ps = PathfindingSystem::new(PathfinderConfig::default().with_max_search_nodes(5));
        let outcome = ps.search(Point::new(0, 0), Point::new(29, 29), &m).unwrap();
        assert_eq!(outcome, SearchOutcome::BudgetExhausted { expanded: 5 });
        assert_eq!(ps.find_path(Point::new(0, 0), Point::new(29, 29), &m).unwrap(), None);
    }

    #[test]
    fn terrain_costs_steer_the_route() {
        // Going straight through the water costs 3 per cell; the road
        // around it is longer but cheaper.
        let m = map(
            r"
            .....
            .~~~.
            .....
            ",
        );
        let mut ps = orthogonal();
        let path = ps
            .find_path(Point::new(0, 1), Point::new(4, 1), &m)
            .unwrap()
            .unwrap();
        assert!(path.iter().all(|&p| m.at(p) != Some(Terrain::Water)), "{path}");
        assert_eq!(path.len(), 7);
    }

    #[test]
    fn infinite_terrain_cost_is_never_entered() {
        let mut m = map(
            r"
            ...
            .~.
            ...
            ",
        );
        m.set_weight(Terrain::Water, f64::INFINITY);
        let mut ps = orthogonal();
        let path = ps
            .find_path(Point::new(1, 0), Point::new(1, 2), &m)
            .unwrap()
            .unwrap();
        assert!(!path.contains(&Point::new(1, 1)));
        assert_eq!(ps.find_path(Point::new(1, 0), Point::new(1, 1), &m).unwrap(), None);
    }

    #[test]
    fn scratch_is_reused_across_grids() {
        let big = TileMap::new(20, 20, Terrain::Ground).unwrap();
        let small = TileMap::new(5, 3, Terrain::Ground).unwrap();
        let mut ps = orthogonal();

        assert!(ps.find_path(Point::new(0, 0), Point::new(19, 19), &big).unwrap().is_some());
        let cap = ps.nodes.len();
        assert_eq!(cap, 400);

        let path = ps
            .find_path(Point::new(0, 0), Point::new(4, 2), &small)
            .unwrap()
            .unwrap();
        assert_eq!(ps.nodes.len(), cap);
        assert_eq!(path.len(), 7);
        assert!(path.iter().all(|&p| small.bounds().contains(p)));
    }

    #[test]
    fn generation_wrap_resets_stamps() {
        let m = TileMap::new(4, 4, Terrain::Ground).unwrap();
        let mut ps = orthogonal();
        assert!(ps.find_path(Point::new(0, 0), Point::new(3, 3), &m).unwrap().is_some());
        ps.generation = u32::MAX;
        let path = ps.find_path(Point::new(3, 0), Point::new(0, 3), &m).unwrap().unwrap();
        assert_eq!(ps.generation, 1);
        assert_eq!(path.len(), 7);
    }

    #[test]
    fn broken_predecessor_chain_is_reported() {
        let m = TileMap::new(3, 1, Terrain::Ground).unwrap();
        let mut ps = orthogonal();
        let cur_gen = ps.prepare(m.bounds());
        ps.nodes[2] = Node {
            g: 2.0,
            parent: NO_PARENT,
            generation: cur_gen,
            closed: false,
        };
        assert_eq!(ps.reconstruct(0, 2, cur_gen, 3), SearchOutcome::Corrupted);
    }
}
