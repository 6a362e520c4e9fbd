//! Mover-side inputs to movement-cost calculation: status effects,
//! equipment and the occupancy of nearby cells.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use waymark_core::Point;

use crate::traits::TerrainSource;

/// Status effects that can change how expensive moving is.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StatusEffect {
    Speed,
    Slow,
    Wet,
    Burdened,
    Poisoned,
}

impl StatusEffect {
    pub const COUNT: usize = 5;

    pub const ALL: [StatusEffect; StatusEffect::COUNT] = [
        StatusEffect::Speed,
        StatusEffect::Slow,
        StatusEffect::Wet,
        StatusEffect::Burdened,
        StatusEffect::Poisoned,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            StatusEffect::Speed => "speed",
            StatusEffect::Slow => "slow",
            StatusEffect::Wet => "wet",
            StatusEffect::Burdened => "burdened",
            StatusEffect::Poisoned => "poisoned",
        }
    }

    /// Parse a status name (case-insensitive).
    pub fn from_name(name: &str) -> Option<StatusEffect> {
        StatusEffect::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for StatusEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kinds of boots a mover can wear.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BootsType {
    Waders,
    Crampons,
    Sandals,
}

/// What the mover is wearing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Equipment {
    pub boots: BootsType,
}

/// Disposition of an entity standing on a cell, relative to the mover.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EntityType {
    Ally,
    Neutral,
    Enemy,
}

impl EntityType {
    pub const COUNT: usize = 3;

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// An entity occupying a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Occupant {
    pub entity_type: EntityType,
}

/// The moving entity's context: active statuses, equipment and who stands
/// where.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mover {
    pub statuses: BTreeSet<StatusEffect>,
    pub equipment: Option<Equipment>,
    pub occupancy: HashMap<Point, Occupant>,
}

impl Mover {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: StatusEffect) -> Self {
        self.statuses.insert(status);
        self
    }

    pub fn with_boots(mut self, boots: BootsType) -> Self {
        self.equipment = Some(Equipment { boots });
        self
    }

    pub fn with_occupant(mut self, p: Point, entity_type: EntityType) -> Self {
        self.occupancy.insert(p, Occupant { entity_type });
        self
    }

    /// Boots currently worn, if any.
    pub fn boots(&self) -> Option<BootsType> {
        self.equipment.map(|e| e.boots)
    }

    /// Occupant of `p`, if any.
    pub fn occupant_at(&self, p: Point) -> Option<Occupant> {
        self.occupancy.get(&p).copied()
    }
}

/// Everything a cost query needs: the world and the mover.
pub struct MoveState<'a, W: TerrainSource + ?Sized> {
    pub world: &'a W,
    pub mover: &'a Mover,
}

impl<'a, W: TerrainSource + ?Sized> MoveState<'a, W> {
    pub fn new(world: &'a W, mover: &'a Mover) -> Self {
        Self { world, mover }
    }
}

impl<W: TerrainSource + ?Sized> Clone for MoveState<'_, W> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<W: TerrainSource + ?Sized> Copy for MoveState<'_, W> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_names() {
        for s in StatusEffect::ALL {
            assert_eq!(StatusEffect::from_name(s.name()), Some(s));
        }
        assert_eq!(StatusEffect::from_name(" SLOW "), Some(StatusEffect::Slow));
        assert_eq!(StatusEffect::from_name("flying"), None);
    }

    #[test]
    fn builder_collects_context() {
        let m = Mover::new()
            .with_status(StatusEffect::Wet)
            .with_status(StatusEffect::Wet)
            .with_boots(BootsType::Waders)
            .with_occupant(Point::new(1, 1), EntityType::Enemy);
        assert_eq!(m.statuses.len(), 1);
        assert_eq!(m.boots(), Some(BootsType::Waders));
        assert_eq!(
            m.occupant_at(Point::new(1, 1)).map(|o| o.entity_type),
            Some(EntityType::Enemy)
        );
        assert_eq!(m.occupant_at(Point::new(0, 0)), None);
    }
}
