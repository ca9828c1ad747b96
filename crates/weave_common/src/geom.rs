//! Tile-grid geometry.
//!
//! Devices are laid out on an integer grid of tiles. A routing node may span
//! several tiles (long wires), so the router reasons about axis-aligned tile
//! rectangles and the Manhattan gap between them.

use serde::{Deserialize, Serialize};

/// A tile position on the device grid.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct TileCoord {
    /// Column (0-based, left to right).
    pub x: u32,
    /// Row (0-based).
    pub y: u32,
}

impl TileCoord {
    /// Creates a coordinate.
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// An inclusive, axis-aligned rectangle of tiles.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct TileRect {
    /// Smallest column covered.
    pub min_x: u32,
    /// Smallest row covered.
    pub min_y: u32,
    /// Largest column covered.
    pub max_x: u32,
    /// Largest row covered.
    pub max_y: u32,
}

impl TileRect {
    /// A rectangle covering exactly one tile.
    pub fn point(coord: TileCoord) -> Self {
        Self {
            min_x: coord.x,
            min_y: coord.y,
            max_x: coord.x,
            max_y: coord.y,
        }
    }

    /// Grows the rectangle to include `coord`.
    pub fn include(&mut self, coord: TileCoord) {
        self.min_x = self.min_x.min(coord.x);
        self.min_y = self.min_y.min(coord.y);
        self.max_x = self.max_x.max(coord.x);
        self.max_y = self.max_y.max(coord.y);
    }

    /// Returns the bounding rectangle of all `coords`, or `None` if empty.
    pub fn enclosing(coords: impl IntoIterator<Item = TileCoord>) -> Option<Self> {
        let mut iter = coords.into_iter();
        let mut rect = Self::point(iter.next()?);
        for coord in iter {
            rect.include(coord);
        }
        Some(rect)
    }

    /// Width plus height in tiles; zero for a single tile.
    pub fn span(&self) -> u32 {
        (self.max_x - self.min_x) + (self.max_y - self.min_y)
    }

    /// Manhattan gap between the two rectangles; zero when they overlap.
    pub fn distance(&self, other: &TileRect) -> u32 {
        let dx = gap(self.min_x, self.max_x, other.min_x, other.max_x);
        let dy = gap(self.min_y, self.max_y, other.min_y, other.max_y);
        dx + dy
    }
}

fn gap(a_min: u32, a_max: u32, b_min: u32, b_max: u32) -> u32 {
    if b_min > a_max {
        b_min - a_max
    } else if a_min > b_max {
        a_min - b_max
    } else {
        0
    }
}
