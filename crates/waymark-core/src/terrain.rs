//! Terrain kinds and helpers.

use std::fmt;

/// The closed set of terrain kinds a tile can have.
///
/// Each kind has a stable [`index`](Terrain::index) so cost tables can be
/// plain arrays instead of name-keyed maps.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Terrain {
    #[default]
    Ground,
    Grass,
    Road,
    Bridge,
    Sand,
    Forest,
    Snow,
    Swamp,
    Water,
    Mountain,
    Wall,
}

impl Terrain {
    /// Number of terrain kinds.
    pub const COUNT: usize = 11;

    /// Every terrain kind, in index order.
    pub const ALL: [Terrain; Terrain::COUNT] = [
        Terrain::Ground,
        Terrain::Grass,
        Terrain::Road,
        Terrain::Bridge,
        Terrain::Sand,
        Terrain::Forest,
        Terrain::Snow,
        Terrain::Swamp,
        Terrain::Water,
        Terrain::Mountain,
        Terrain::Wall,
    ];

    /// Position of this kind in [`Terrain::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lower-case name.
    pub const fn name(self) -> &'static str {
        match self {
            Terrain::Ground => "ground",
            Terrain::Grass => "grass",
            Terrain::Road => "road",
            Terrain::Bridge => "bridge",
            Terrain::Sand => "sand",
            Terrain::Forest => "forest",
            Terrain::Snow => "snow",
            Terrain::Swamp => "swamp",
            Terrain::Water => "water",
            Terrain::Mountain => "mountain",
            Terrain::Wall => "wall",
        }
    }

    /// Parse a terrain name (case-insensitive). Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Terrain> {
        Terrain::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Whether anything can stand on this terrain.
    #[inline]
    pub const fn is_passable(self) -> bool {
        !matches!(self, Terrain::Wall)
    }

    /// Character representation of terrain.
    pub const fn glyph(self) -> char {
        match self {
            Terrain::Ground => '.',
            Terrain::Grass => ',',
            Terrain::Road => '=',
            Terrain::Bridge => 'H',
            Terrain::Sand => ':',
            Terrain::Forest => 'T',
            Terrain::Snow => '*',
            Terrain::Swamp => '%',
            Terrain::Water => '~',
            Terrain::Mountain => '^',
            Terrain::Wall => '#',
        }
    }

    /// Inverse of [`glyph`](Terrain::glyph).
    pub fn from_glyph(c: char) -> Option<Terrain> {
        Terrain::ALL.into_iter().find(|t| t.glyph() == c)
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
