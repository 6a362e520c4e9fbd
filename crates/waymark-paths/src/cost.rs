//! Movement-cost model.
//!
//! [`MovementCostCalculator`] prices a single step `(from, to)` for a given
//! mover in a given world. The price is built up in a fixed order:
//!
//! 1. a step onto the same cell is free;
//! 2. the terrain cost of the destination (unknown terrain counts as the
//!    configured default terrain);
//! 3. ×√2 for a diagonal step;
//! 4. × the product of the multipliers of every active status effect;
//! 5. boots that match the destination terrain replace the terrain cost
//!    with their own multiplier;
//! 6. × the occupancy factor of whoever stands on the destination
//!    (allies 2, neutrals 3, enemies ∞).
//!
//! Steps 2 and 3 only depend on the world, so they are memoized per
//! `(from, to, generation)`. [`invalidate_cache`](MovementCostCalculator::invalidate_cache)
//! moves to a new generation, so old entries are never read again.

use std::collections::HashMap;
use std::f64::consts::SQRT_2;

use log::debug;
use waymark_core::{DEFAULT_WEIGHTS, Point, Terrain};

use crate::error::{PathError, Result};
use crate::mover::{BootsType, EntityType, MoveState, StatusEffect};
use crate::traits::TerrainSource;

/// Boots worn on a matching terrain cost `multiplier` instead of the
/// terrain's own cost.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BootsRule {
    pub boots: BootsType,
    pub terrain: Terrain,
    pub multiplier: f64,
}

/// Cost tables.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CostConfig {
    /// Base cost of entering each terrain, indexed by [`Terrain::index`]
    #[cfg_attr(feature = "serde", serde(with = "waymark_core::costs_serde"))]
    pub terrain_costs: [f64; Terrain::COUNT],

    /// Terrain assumed where the world does not know
    pub default_terrain: Terrain,

    /// Multiplier of each status, indexed by [`StatusEffect::index`]
    #[cfg_attr(feature = "serde", serde(with = "waymark_core::costs_serde"))]
    pub status_multipliers: [f64; StatusEffect::COUNT],

    /// Boots overrides, first match wins
    pub boots: Vec<BootsRule>,

    /// Factor for an occupied destination, indexed by [`EntityType::index`]
    #[cfg_attr(feature = "serde", serde(with = "waymark_core::costs_serde"))]
    pub occupancy_factors: [f64; EntityType::COUNT],
}

impl Default for CostConfig {
    fn default() -> Self {
        let mut status_multipliers = [1.0; StatusEffect::COUNT];
        status_multipliers[StatusEffect::Speed.index()] = 0.5;
        status_multipliers[StatusEffect::Slow.index()] = 2.0;
        status_multipliers[StatusEffect::Wet.index()] = 1.5;
        status_multipliers[StatusEffect::Burdened.index()] = 1.25;

        let rule = |boots, terrain, multiplier| BootsRule {
            boots,
            terrain,
            multiplier,
        };

        Self {
            terrain_costs: DEFAULT_WEIGHTS,
            default_terrain: Terrain::Ground,
            status_multipliers,
            boots: vec![
                rule(BootsType::Waders, Terrain::Swamp, 1.0),
                rule(BootsType::Waders, Terrain::Water, 1.5),
                rule(BootsType::Crampons, Terrain::Mountain, 2.0),
                rule(BootsType::Crampons, Terrain::Snow, 1.0),
                rule(BootsType::Sandals, Terrain::Sand, 1.0),
            ],
            occupancy_factors: [2.0, 3.0, f64::INFINITY],
        }
    }
}

impl CostConfig {
    pub fn with_terrain_cost(mut self, terrain: Terrain, cost: f64) -> Self {
        self.terrain_costs[terrain.index()] = cost;
        self
    }

    pub fn with_status_multiplier(mut self, status: StatusEffect, multiplier: f64) -> Self {
        self.status_multipliers[status.index()] = multiplier;
        self
    }

    pub fn with_boots_rule(mut self, boots: BootsType, terrain: Terrain, multiplier: f64) -> Self {
        self.boots.push(BootsRule {
            boots,
            terrain,
            multiplier,
        });
        self
    }

    pub fn with_default_terrain(mut self, terrain: Terrain) -> Self {
        self.default_terrain = terrain;
        self
    }
}

/// World-only part of a step cost.
#[derive(Copy, Clone, Debug)]
struct StepBase {
    terrain: Terrain,
    terrain_cost: f64,
    diagonal: f64,
}

/// Prices moves for a mover in a world.
pub struct MovementCostCalculator {
    config: CostConfig,
    memo: HashMap<(Point, Point, u32), StepBase>,
    generation: u32,
}

impl Default for MovementCostCalculator {
    fn default() -> Self {
        Self::new(CostConfig::default())
    }
}

impl MovementCostCalculator {
    pub fn new(config: CostConfig) -> Self {
        Self {
            config,
            memo: HashMap::new(),
            generation: 0,
        }
    }

    pub fn config(&self) -> &CostConfig {
        &self.config
    }

    /// Base cost of entering `terrain`.
    #[inline]
    pub fn get_terrain_cost(&self, terrain: Terrain) -> f64 {
        self.config.terrain_costs[terrain.index()]
    }

    /// Base cost of a terrain given by name; unknown names cost as much as
    /// the default terrain.
    pub fn terrain_cost_by_name(&self, name: &str) -> f64 {
        let terrain = Terrain::from_name(name).unwrap_or(self.config.default_terrain);
        self.get_terrain_cost(terrain)
    }

    /// Cost of a single step from `from` to `to`.
    ///
    /// Returns `f64::INFINITY` for moves that are impossible (impassable
    /// terrain, an enemy on the destination). Fails with
    /// [`PathError::StateRequired`] when `state` is missing.
    pub fn calculate_move_cost<W: TerrainSource + ?Sized>(
        &mut self,
        from: Point,
        to: Point,
        state: Option<&MoveState<'_, W>>,
    ) -> Result<f64> {
        let state = state.ok_or(PathError::StateRequired)?;
        if from == to {
            return Ok(0.0);
        }

        let base = self.step_base(from, to, state.world);
        let mover = state.mover;

        let status_factor: f64 = mover
            .statuses
            .iter()
            .map(|s| self.config.status_multipliers[s.index()])
            .product();

        let terrain_part = mover
            .boots()
            .and_then(|boots| self.boots_multiplier(boots, base.terrain))
            .unwrap_or(base.terrain_cost);

        if !terrain_part.is_finite() {
            return Ok(f64::INFINITY);
        }
        let mut cost = terrain_part * base.diagonal * status_factor;
        if cost.is_nan() {
            return Ok(f64::INFINITY);
        }

        if let Some(occupant) = mover.occupant_at(to) {
            let factor = self.config.occupancy_factors[occupant.entity_type.index()];
            if factor.is_infinite() {
                return Ok(f64::INFINITY);
            }
            cost *= factor;
        }
        Ok(cost)
    }

    /// Sum of step costs along `path`. Paths with fewer than two points
    /// cost nothing.
    pub fn get_path_cost<W: TerrainSource + ?Sized>(
        &mut self,
        path: &[Point],
        state: Option<&MoveState<'_, W>>,
    ) -> Result<f64> {
        if path.len() < 2 {
            return Ok(0.0);
        }
        let mut total = 0.0;
        for w in path.windows(2) {
            total += self.calculate_move_cost(w[0], w[1], state)?;
            if total.is_infinite() {
                break;
            }
        }
        Ok(total)
    }

    /// Whether the step has a finite cost.
    pub fn can_move<W: TerrainSource + ?Sized>(
        &mut self,
        from: Point,
        to: Point,
        state: Option<&MoveState<'_, W>>,
    ) -> Result<bool> {
        Ok(self.calculate_move_cost(from, to, state)? != f64::INFINITY)
    }

    /// Forget every memoized step. Call after the world's terrain changed.
    pub fn invalidate_cache(&mut self) {
        let dropped = self.memo.len();
        self.memo.clear();
        self.generation = self.generation.wrapping_add(1);
        debug!(
            "movement cost cache invalidated ({dropped} entries), generation {}",
            self.generation
        );
    }

    /// Number of memoized steps.
    pub fn cached_entries(&self) -> usize {
        self.memo.len()
    }

    /// Current memo generation.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    fn boots_multiplier(&self, boots: BootsType, terrain: Terrain) -> Option<f64> {
        self.config
            .boots
            .iter()
            .find(|r| r.boots == boots && r.terrain == terrain)
            .map(|r| r.multiplier)
    }

    fn step_base<W: TerrainSource + ?Sized>(&mut self, from: Point, to: Point, world: &W) -> StepBase {
        let key = (from, to, self.generation);
        if let Some(&base) = self.memo.get(&key) {
            return base;
        }
        let terrain = world.terrain_at(to).unwrap_or(self.config.default_terrain);
        let base = StepBase {
            terrain,
            terrain_cost: self.get_terrain_cost(terrain),
            diagonal: if from.is_diagonal_step(to) { SQRT_2 } else { 1.0 },
        };
        self.memo.insert(key, base);
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mover::Mover;
    use proptest::prelude::*;
    use waymark_core::TileMap;

    fn ground(w: i32, h: i32) -> TileMap {
        TileMap::new(w, h, Terrain::Ground).unwrap()
    }

    fn cost(calc: &mut MovementCostCalculator, world: &TileMap, mover: &Mover, to: (i32, i32)) -> f64 {
        calc.calculate_move_cost(Point::new(1, 1), Point::from(to), Some(&MoveState::new(world, mover)))
            .unwrap()
    }

    /// World that knows nothing.
    struct Fog;

    impl TerrainSource for Fog {
        fn terrain_at(&self, _p: Point) -> Option<Terrain> {
            None
        }
    }

    #[test]
    fn missing_state_is_an_error() {
        let mut calc = MovementCostCalculator::default();
        let err = calc
            .calculate_move_cost::<TileMap>(Point::new(0, 0), Point::new(1, 0), None)
            .unwrap_err();
        assert_eq!(err, PathError::StateRequired);
        assert!(calc.can_move::<TileMap>(Point::ZERO, Point::ZERO, None).is_err());
    }

    #[test]
    fn same_cell_is_free() {
        let world = ground(3, 3);
        let mover = Mover::new()
            .with_status(StatusEffect::Slow)
            .with_occupant(Point::new(1, 1), EntityType::Enemy);
        let mut calc = MovementCostCalculator::default();
        assert_eq!(cost(&mut calc, &world, &mover, (1, 1)), 0.0);
    }

    #[test]
    fn terrain_and_diagonal() {
        let mut world = ground(3, 3);
        world.set(Point::new(2, 1), Terrain::Water);
        let mover = Mover::new();
        let mut calc = MovementCostCalculator::default();
        assert_eq!(cost(&mut calc, &world, &mover, (1, 0)), 1.0);
        assert_eq!(cost(&mut calc, &world, &mover, (2, 1)), 3.0);
        assert!((cost(&mut calc, &world, &mover, (2, 2)) - SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn unknown_terrain_uses_default() {
        let mover = Mover::new();
        let mut calc = MovementCostCalculator::new(CostConfig::default().with_default_terrain(Terrain::Sand));
        let c = calc
            .calculate_move_cost(Point::ZERO, Point::new(1, 0), Some(&MoveState::new(&Fog, &mover)))
            .unwrap();
        assert_eq!(c, 1.5);
        assert_eq!(calc.terrain_cost_by_name("lava"), 1.5);
        assert_eq!(calc.terrain_cost_by_name("mountain"), 4.0);
    }

    #[test]
    fn statuses_multiply() {
        let world = ground(3, 3);
        let mut calc = MovementCostCalculator::default();

        let fast = Mover::new().with_status(StatusEffect::Speed);
        assert_eq!(cost(&mut calc, &world, &fast, (1, 0)), 0.5);

        let soggy = Mover::new()
            .with_status(StatusEffect::Slow)
            .with_status(StatusEffect::Wet);
        assert_eq!(cost(&mut calc, &world, &soggy, (1, 0)), 3.0);

        let sick = Mover::new().with_status(StatusEffect::Poisoned);
        assert_eq!(cost(&mut calc, &world, &sick, (1, 0)), 1.0);
    }

    #[test]
    fn zero_multiplier_never_opens_a_wall() {
        let mut world = ground(3, 3);
        world.set(Point::new(2, 1), Terrain::Wall);
        let mut calc = MovementCostCalculator::new(
            CostConfig::default().with_status_multiplier(StatusEffect::Speed, 0.0),
        );
        let weightless = Mover::new().with_status(StatusEffect::Speed);
        assert_eq!(cost(&mut calc, &world, &weightless, (2, 1)), f64::INFINITY);
        assert_eq!(cost(&mut calc, &world, &weightless, (1, 0)), 0.0);

        let state = MoveState::new(&world, &weightless);
        assert!(!calc
            .can_move(Point::new(1, 1), Point::new(2, 1), Some(&state))
            .unwrap());
    }

    #[test]
    fn boots_replace_terrain_cost_after_statuses() {
        let mut world = ground(3, 3);
        world.set(Point::new(2, 1), Terrain::Swamp);
        world.set(Point::new(0, 1), Terrain::Mountain);
        let mut calc = MovementCostCalculator::default();

        let barefoot = Mover::new().with_status(StatusEffect::Slow);
        assert_eq!(cost(&mut calc, &world, &barefoot, (2, 1)), 5.0);

        let waders = barefoot.clone().with_boots(BootsType::Waders);
        assert_eq!(cost(&mut calc, &world, &waders, (2, 1)), 2.0);
        // No rule for waders on mountains.
        assert_eq!(cost(&mut calc, &world, &waders, (0, 1)), 8.0);
    }

    #[test]
    fn occupancy_factors() {
        let world = ground(4, 4);
        let mover = Mover::new()
            .with_occupant(Point::new(2, 1), EntityType::Ally)
            .with_occupant(Point::new(1, 2), EntityType::Neutral)
            .with_occupant(Point::new(0, 1), EntityType::Enemy);
        let mut calc = MovementCostCalculator::default();
        let state = MoveState::new(&world, &mover);

        assert_eq!(cost(&mut calc, &world, &mover, (2, 1)), 2.0);
        assert_eq!(cost(&mut calc, &world, &mover, (1, 2)), 3.0);
        assert_eq!(cost(&mut calc, &world, &mover, (0, 1)), f64::INFINITY);
        assert!(!calc.can_move(Point::new(1, 1), Point::new(0, 1), Some(&state)).unwrap());
        assert!(calc.can_move(Point::new(1, 1), Point::new(2, 1), Some(&state)).unwrap());
    }

    #[test]
    fn path_cost_sums_steps() {
        let mut world = ground(4, 1);
        world.set(Point::new(2, 0), Terrain::Forest);
        let mover = Mover::new();
        let state = MoveState::new(&world, &mover);
        let mut calc = MovementCostCalculator::default();

        let path: Vec<Point> = (0..4).map(|x| Point::new(x, 0)).collect();
        assert_eq!(calc.get_path_cost(&path, Some(&state)).unwrap(), 4.0);
        assert_eq!(calc.get_path_cost(&path[..1], Some(&state)).unwrap(), 0.0);
        assert_eq!(calc.get_path_cost::<TileMap>(&[], None).unwrap(), 0.0);
        assert!(calc.get_path_cost::<TileMap>(&path, None).is_err());
    }

    #[test]
    fn invalidation_drops_stale_terrain() {
        let mut world = ground(3, 1);
        let mover = Mover::new();
        let mut calc = MovementCostCalculator::default();
        let (a, b) = (Point::new(0, 0), Point::new(1, 0));

        assert_eq!(cost_between(&mut calc, &world, &mover, a, b), 1.0);
        assert_eq!(calc.cached_entries(), 1);

        world.set(b, Terrain::Water);
        // Memoized until told otherwise.
        assert_eq!(cost_between(&mut calc, &world, &mover, a, b), 1.0);

        let before = calc.generation();
        calc.invalidate_cache();
        assert_eq!(calc.generation(), before + 1);
        assert_eq!(calc.cached_entries(), 0);
        assert_eq!(cost_between(&mut calc, &world, &mover, a, b), 3.0);
    }

    #[test]
    fn memo_ignores_mover_changes() {
        let world = ground(3, 1);
        let mut calc = MovementCostCalculator::default();
        let (a, b) = (Point::new(0, 0), Point::new(1, 0));
        assert_eq!(cost_between(&mut calc, &world, &Mover::new(), a, b), 1.0);
        let slow = Mover::new().with_status(StatusEffect::Slow);
        assert_eq!(cost_between(&mut calc, &world, &slow, a, b), 2.0);
        let blocked = Mover::new().with_occupant(b, EntityType::Enemy);
        assert_eq!(cost_between(&mut calc, &world, &blocked, a, b), f64::INFINITY);
    }

    fn cost_between(calc: &mut MovementCostCalculator, world: &TileMap, mover: &Mover, a: Point, b: Point) -> f64 {
        calc.calculate_move_cost(a, b, Some(&MoveState::new(world, mover)))
            .unwrap()
    }

    proptest! {
        #[test]
        fn path_cost_grows_with_multipliers(
            steps in proptest::collection::vec(0usize..8, 1..20),
            slow in 0.1f64..5.0,
            bump in 0.0f64..5.0,
            water in 0.1f64..5.0,
        ) {
            let mut world = ground(50, 50);
            for y in 0..50 {
                world.set(Point::new(25, y), Terrain::Water);
            }
            let mut path = vec![Point::new(24, 24)];
            for s in steps {
                let last = *path.last().unwrap();
                path.push(last.neighbors_8()[s]);
            }
            let mover = Mover::new().with_status(StatusEffect::Slow);
            let state = MoveState::new(&world, &mover);

            let config = CostConfig::default()
                .with_status_multiplier(StatusEffect::Slow, slow)
                .with_terrain_cost(Terrain::Water, water);
            let base = MovementCostCalculator::new(config.clone())
                .get_path_cost(&path, Some(&state)).unwrap();
            prop_assert!(base >= 0.0);

            let slower = MovementCostCalculator::new(
                config.clone().with_status_multiplier(StatusEffect::Slow, slow + bump),
            ).get_path_cost(&path, Some(&state)).unwrap();
            prop_assert!(slower >= base);

            let wetter = MovementCostCalculator::new(
                config.with_terrain_cost(Terrain::Water, water + bump),
            ).get_path_cost(&path, Some(&state)).unwrap();
            prop_assert!(wetter >= base);
        }
    }
}
