use log::trace;
use waymark_core::{Area, Point};

use crate::astar::{PathfinderConfig, PathfindingSystem};
use crate::cache::{CacheConfig, Clock, MonotonicClock, PathCache};
use crate::cost::{CostConfig, MovementCostCalculator};
use crate::error::Result;
use crate::mover::MoveState;
use crate::path::Path;
use crate::traits::{GridMap, TerrainSource};

/// Search, caching and pricing for one map, wired together.
///
/// `route` answers from the cache when it can and remembers every path it
/// had to search for. `terrain_changed` keeps both caches honest after the
/// map is edited.
pub struct NavSession<C: Clock = MonotonicClock> {
    pathfinder: PathfindingSystem,
    cache: PathCache<C>,
    costs: MovementCostCalculator,
}

impl Default for NavSession {
    fn default() -> Self {
        Self::new(
            PathfinderConfig::default(),
            CacheConfig::default(),
            CostConfig::default(),
        )
    }
}

impl NavSession {
    pub fn new(search: PathfinderConfig, cache: CacheConfig, costs: CostConfig) -> Self {
        Self::from_parts(
            PathfindingSystem::new(search),
            PathCache::new(cache),
            MovementCostCalculator::new(costs),
        )
    }
}

impl<C: Clock> NavSession<C> {
    /// Assemble a session from already built components.
    pub fn from_parts(
        pathfinder: PathfindingSystem,
        cache: PathCache<C>,
        costs: MovementCostCalculator,
    ) -> Self {
        Self {
            pathfinder,
            cache,
            costs,
        }
    }

    /// Path from `start` to `end`, from the cache when possible.
    ///
    /// Failed searches are not cached, so a later call searches again.
    pub fn route<G: GridMap>(&mut self, start: Point, end: Point, grid: &G) -> Result<Option<Path>> {
        if let Some(path) = self.cache.get(start, end) {
            trace!("route {start} -> {end}: cached");
            return Ok(Some(path));
        }
        let found = self.pathfinder.find_path(start, end, grid)?;
        if let Some(path) = &found {
            self.cache.set(start, end, path.clone())?;
        }
        Ok(found)
    }

    /// Movement cost of walking `path` in the given state.
    pub fn route_cost<W: TerrainSource + ?Sized>(
        &mut self,
        path: &[Point],
        state: Option<&MoveState<'_, W>>,
    ) -> Result<f64> {
        self.costs.get_path_cost(path, state)
    }

    /// Forget everything that depends on the terrain inside `area`.
    /// Returns the number of cached paths dropped.
    pub fn terrain_changed(&mut self, area: &Area) -> usize {
        let dropped = self.cache.invalidate_area(area);
        self.costs.invalidate_cache();
        dropped
    }

    pub fn pathfinder(&self) -> &PathfindingSystem {
        &self.pathfinder
    }

    pub fn pathfinder_mut(&mut self) -> &mut PathfindingSystem {
        &mut self.pathfinder
    }

    pub fn cache(&self) -> &PathCache<C> {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut PathCache<C> {
        &mut self.cache
    }

    pub fn costs(&self) -> &MovementCostCalculator {
        &self.costs
    }

    pub fn costs_mut(&mut self) -> &mut MovementCostCalculator {
        &mut self.costs
    }
}
