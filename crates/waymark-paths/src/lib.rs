//! Path planning for tile worlds.
//!
//! This crate provides the pieces a game needs to move entities across a
//! grid of terrain:
//!
//! - **A\*** shortest-path search with a node budget ([`PathfindingSystem`])
//! - **Movement costs** for a mover's statuses, boots and the occupancy of
//!   the destination ([`MovementCostCalculator`])
//! - **Path caching** with LRU eviction, expiry and spatial invalidation
//!   ([`PathCache`])
//! - an indexed **priority queue** with in-place priority updates
//!   ([`PriorityQueue`])
//!
//! [`NavSession`] wires the three services together for one map.
//!
//! # Traits
//!
//! | Trait | Required for |
//! |---|---|
//! | [`GridMap`] | A* search |
//! | [`TerrainSource`] | movement costs |
//! | [`Clock`] | cache expiry |

mod astar;
mod cache;
mod cost;
mod distance;
mod error;
mod mover;
mod neighbors;
mod path;
mod queue;
mod session;
mod traits;

pub use astar::{DEFAULT_MAX_SEARCH_NODES, PathfinderConfig, PathfindingSystem, SearchOutcome};
pub use cache::{CacheConfig, CacheStats, Clock, MonotonicClock, PathCache};
pub use cost::{BootsRule, CostConfig, MovementCostCalculator};
pub use distance::{Heuristic, chebyshev, euclidean, manhattan, octile};
pub use error::{PathError, Result};
pub use mover::{BootsType, EntityType, Equipment, MoveState, Mover, Occupant, StatusEffect};
pub use neighbors::Neighbors;
pub use path::Path;
pub use queue::{Comparator, HeapNode, PriorityQueue};
pub use session::NavSession;
pub use traits::{GridMap, TerrainSource};
