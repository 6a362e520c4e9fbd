//! Value types for tile-world path planning.
//!
//! This crate provides the foundational types shared across the *waymark*
//! workspace: grid geometry ([`Point`], [`Range`]), invalidation regions
//! ([`Area`]), the closed set of [`Terrain`] kinds and a dense [`TileMap`].

#[cfg(feature = "serde")]
pub mod costs_serde;
pub mod geom;
pub mod map;
pub mod terrain;

pub use geom::{Area, Point, Range, RangeIter};
pub use map::{DEFAULT_WEIGHTS, MapError, TileMap};
pub use terrain::Terrain;
