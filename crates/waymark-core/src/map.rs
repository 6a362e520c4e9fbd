//! A dense terrain grid for map representation.
//!
//! [`TileMap`] stores one [`Terrain`] per cell in row-major order, plus a
//! per-terrain weight table that path searches read as the terrain-cost
//! multiplier of a cell.

use thiserror::Error;

use crate::geom::{Point, Range};
use crate::terrain::Terrain;

/// Errors raised while building a [`TileMap`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("map has no rows")]
    Empty,

    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown terrain glyph {glyph:?} at {pos}")]
    UnknownGlyph { glyph: char, pos: Point },

    #[error("invalid map size {width}x{height}")]
    InvalidSize { width: i32, height: i32 },

    #[error("map has {found} cells, expected {expected}")]
    CellCount { expected: usize, found: usize },
}

/// Default search weight of each terrain kind, indexed by [`Terrain::index`].
pub const DEFAULT_WEIGHTS: [f64; Terrain::COUNT] = [
    1.0,           // ground
    1.0,           // grass
    1.0,           // road
    1.0,           // bridge
    1.5,           // sand
    2.0,           // forest
    2.0,           // snow
    2.5,           // swamp
    3.0,           // water
    4.0,           // mountain
    f64::INFINITY, // wall
];

/// A `width`×`height` grid of terrain.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawTileMap"))]
pub struct TileMap {
    width: i32,
    height: i32,
    cells: Vec<Terrain>,
    #[cfg_attr(feature = "serde", serde(with = "crate::costs_serde"))]
    weights: [f64; Terrain::COUNT],
}

/// Unchecked wire form of a [`TileMap`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawTileMap {
    width: i32,
    height: i32,
    cells: Vec<Terrain>,
    #[serde(with = "crate::costs_serde")]
    weights: [f64; Terrain::COUNT],
}

#[cfg(feature = "serde")]
impl TryFrom<RawTileMap> for TileMap {
    type Error = MapError;

    fn try_from(raw: RawTileMap) -> Result<Self, MapError> {
        let expected = cell_count(raw.width, raw.height)?;
        if raw.cells.len() != expected {
            return Err(MapError::CellCount {
                expected,
                found: raw.cells.len(),
            });
        }
        Ok(Self {
            width: raw.width,
            height: raw.height,
            cells: raw.cells,
            weights: raw.weights,
        })
    }
}

/// Number of cells of a `width`×`height` map.
fn cell_count(width: i32, height: i32) -> Result<usize, MapError> {
    if width <= 0 || height <= 0 {
        return Err(MapError::InvalidSize { width, height });
    }
    width
        .checked_mul(height)
        .map(|n| n as usize)
        .ok_or(MapError::InvalidSize { width, height })
}

impl TileMap {
    /// Create a new map filled with `fill`.
    pub fn new(width: i32, height: i32, fill: Terrain) -> Result<Self, MapError> {
        let len = cell_count(width, height)?;
        Ok(Self {
            width,
            height,
            cells: vec![fill; len],
            weights: DEFAULT_WEIGHTS,
        })
    }

    /// Parse a map from rows of terrain glyphs (see [`Terrain::glyph`]).
    ///
    /// Leading and trailing blank lines are ignored, as is indentation, so
    /// maps can be written inline in raw string literals.
    pub fn from_ascii(text: &str) -> Result<Self, MapError> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim)
            .skip_while(|l| l.is_empty())
            .collect();
        let rows: Vec<&str> = match rows.iter().rposition(|l| !l.is_empty()) {
            Some(last) => rows[..=last].to_vec(),
            None => return Err(MapError::Empty),
        };

        let width = rows[0].chars().count();
        let mut cells = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(MapError::Ragged {
                    row: y,
                    expected: width,
                    found,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let terrain = Terrain::from_glyph(glyph).ok_or(MapError::UnknownGlyph {
                    glyph,
                    pos: Point::new(x as i32, y as i32),
                })?;
                cells.push(terrain);
            }
        }

        Ok(Self {
            width: width as i32,
            height: rows.len() as i32,
            cells,
            weights: DEFAULT_WEIGHTS,
        })
    }

    /// Width of the map.
    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height of the map.
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// The range `[0, width) × [0, height)`.
    #[inline]
    pub fn bounds(&self) -> Range {
        Range::with_size(self.width, self.height)
    }

    #[inline]
    fn index(&self, p: Point) -> Option<usize> {
        if !self.bounds().contains(p) {
            return None;
        }
        Some((p.y * self.width + p.x) as usize)
    }

    /// Terrain at a point, or `None` if out of bounds.
    pub fn at(&self, p: Point) -> Option<Terrain> {
        self.index(p).map(|i| self.cells[i])
    }

    /// Set the terrain at a point. Returns `false` if out of bounds.
    pub fn set(&mut self, p: Point, terrain: Terrain) -> bool {
        match self.index(p) {
            Some(i) => {
                self.cells[i] = terrain;
                true
            }
            None => false,
        }
    }

    /// Set every in-bounds cell of `rng` to `terrain`.
    pub fn fill_range(&mut self, rng: Range, terrain: Terrain) {
        for p in rng.intersect(self.bounds()) {
            self.set(p, terrain);
        }
    }

    /// Search weight of a terrain kind.
    #[inline]
    pub fn weight(&self, terrain: Terrain) -> f64 {
        self.weights[terrain.index()]
    }

    /// Override the search weight of a terrain kind.
    pub fn set_weight(&mut self, terrain: Terrain, weight: f64) {
        self.weights[terrain.index()] = weight;
    }

    /// Count how many cells hold `terrain`.
    pub fn count(&self, terrain: Terrain) -> usize {
        self.cells.iter().filter(|&&t| t == terrain).count()
    }

    /// Iterate over `(Point, Terrain)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Point, Terrain)> + '_ {
        self.bounds().iter().zip(self.cells.iter().copied())
    }

    /// Render the map back to glyph rows.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.height as usize);
        for row in self.cells.chunks(self.width as usize) {
            out.extend(row.iter().map(|t| t.glyph()));
            out.push('\n');
        }
        out
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn walls_survive_a_round_trip() {
        let mut m = TileMap::from_ascii(".#~").unwrap();
        m.set_weight(Terrain::Water, f64::INFINITY);
        let json = serde_json::to_string(&m).unwrap();
        let back: TileMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
        assert_eq!(back.weight(Terrain::Wall), f64::INFINITY);
        assert_eq!(back.weight(Terrain::Water), f64::INFINITY);
    }

    #[test]
    fn short_cell_lists_are_rejected() {
        let m = TileMap::new(2, 2, Terrain::Ground).unwrap();
        let mut value = serde_json::to_value(&m).unwrap();
        value["cells"].as_array_mut().unwrap().pop();
        let err = serde_json::from_value::<TileMap>(value).unwrap_err();
        assert!(err.to_string().contains("3 cells, expected 4"), "{err}");

        let mut value = serde_json::to_value(&m).unwrap();
        value["width"] = serde_json::json!(0);
        assert!(serde_json::from_value::<TileMap>(value).is_err());
    }
}
