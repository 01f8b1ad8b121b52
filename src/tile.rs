//! Tile data model - 8x8 blocks of 2-bit palette indices, the deduplicated
//! tile table and the position grid the reduction pipeline mutates.

use std::collections::HashMap;
use std::fmt;

/// Tile width in pixels.
pub const TILE_WIDTH: usize = 8;
/// Tile height in pixels.
pub const TILE_HEIGHT: usize = 8;
/// Pixels per tile.
pub const TILE_PIXELS: usize = TILE_WIDTH * TILE_HEIGHT;

/// Stable identity of a distinct tile within a [`TileTable`].
pub type TileId = usize;

/// The blank sentinel is always interned first.
pub const BLANK_ID: TileId = 0;

/// An 8x8 block of 2-bit palette indices (values 0-3).
///
/// Equality and hashing are element-wise over the pixel sequence.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pixels: [u8; TILE_PIXELS],
}

impl Tile {
    /// The blank sentinel: every pixel is colour 0. Used for margins and for
    /// positions vacated by sprite assignment; never eliminated.
    pub const BLANK: Tile = Tile {
        pixels: [0; TILE_PIXELS],
    };

    /// Filler for unused tile-sheet slots: every pixel is colour 3.
    pub const UNUSED: Tile = Tile {
        pixels: [3; TILE_PIXELS],
    };

    /// Create a tile from 64 pixels in row-major order. Pixel values must
    /// already be quantized to 0-3.
    pub fn new(pixels: [u8; TILE_PIXELS]) -> Self {
        Tile { pixels }
    }

    /// All 64 pixels in row-major order.
    pub fn pixels(&self) -> &[u8; TILE_PIXELS] {
        &self.pixels
    }

    /// Pixel at (x, y) within the tile.
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * TILE_WIDTH + x]
    }

    pub fn is_blank(&self) -> bool {
        *self == Tile::BLANK
    }

    /// Mirror left-to-right: each row is reversed in place.
    ///
    /// # Examples
    ///
    /// ```
    /// use px2nes::tile::Tile;
    ///
    /// let mut pixels = [0u8; 64];
    /// pixels[0] = 3; // top-left corner
    /// let tile = Tile::new(pixels);
    /// assert_eq!(tile.flip_horizontal().pixel(7, 0), 3);
    /// ```
    pub fn flip_horizontal(&self) -> Tile {
        let mut pixels = [0u8; TILE_PIXELS];
        for y in 0..TILE_HEIGHT {
            for x in 0..TILE_WIDTH {
                pixels[y * TILE_WIDTH + x] = self.pixel(TILE_WIDTH - 1 - x, y);
            }
        }
        Tile { pixels }
    }

    /// Mirror top-to-bottom: the row order is reversed.
    pub fn flip_vertical(&self) -> Tile {
        let mut pixels = [0u8; TILE_PIXELS];
        for y in 0..TILE_HEIGHT {
            for x in 0..TILE_WIDTH {
                pixels[y * TILE_WIDTH + x] = self.pixel(x, TILE_HEIGHT - 1 - y);
            }
        }
        Tile { pixels }
    }
}

impl fmt::Debug for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_blank() {
            return write!(f, "Tile(blank)");
        }
        write!(f, "Tile(")?;
        for (i, p) in self.pixels.iter().enumerate() {
            if i > 0 && i % TILE_WIDTH == 0 {
                write!(f, "|")?;
            }
            write!(f, "{}", p)?;
        }
        write!(f, ")")
    }
}

/// The deduplicated set of all distinct tiles in a source image.
///
/// The blank sentinel is interned at construction and always holds
/// [`BLANK_ID`]. Identities are assigned in first-seen order and never
/// change; elimination merges operate on grid positions, not on this table.
#[derive(Debug, Clone)]
pub struct TileTable {
    tiles: Vec<Tile>,
    lookup: HashMap<Tile, TileId>,
}

impl TileTable {
    pub fn new() -> Self {
        let mut table = TileTable {
            tiles: Vec::new(),
            lookup: HashMap::new(),
        };
        table.intern(Tile::BLANK);
        table
    }

    /// Return the id of `tile`, interning it if unseen.
    pub fn intern(&mut self, tile: Tile) -> TileId {
        if let Some(&id) = self.lookup.get(&tile) {
            return id;
        }
        let id = self.tiles.len();
        self.tiles.push(tile);
        self.lookup.insert(tile, id);
        id
    }

    pub fn get(&self, id: TileId) -> &Tile {
        &self.tiles[id]
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }
}

impl Default for TileTable {
    fn default() -> Self {
        TileTable::new()
    }
}

/// A width x height grid (in tile units) of [`TileId`]s.
///
/// This is the mutable state threaded through the reduction loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    cells: Vec<TileId>,
}

impl TileGrid {
    /// A grid filled with the blank sentinel.
    pub fn new(width: usize, height: usize) -> Self {
        TileGrid {
            width,
            height,
            cells: vec![BLANK_ID; width * height],
        }
    }

    /// Build a grid from row-major cells. `cells.len()` must equal
    /// `width * height`.
    pub fn from_cells(width: usize, height: usize, cells: Vec<TileId>) -> Self {
        assert_eq!(cells.len(), width * height, "grid shape mismatch");
        TileGrid {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> TileId {
        self.cells[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, id: TileId) {
        self.cells[y * self.width + x] = id;
    }

    pub fn cells(&self) -> &[TileId] {
        &self.cells
    }

    /// Rewrite every occurrence of `from` to `to`; returns the number of
    /// cells rewritten.
    pub fn replace(&mut self, from: TileId, to: TileId) -> usize {
        let mut moved = 0;
        for cell in &mut self.cells {
            if *cell == from {
                *cell = to;
                moved += 1;
            }
        }
        moved
    }

    /// Number of distinct ids present in the grid, always counting the blank
    /// sentinel even when no cell holds it.
    pub fn distinct_with_blank(&self) -> usize {
        let mut seen: Vec<TileId> = self.cells.clone();
        seen.push(BLANK_ID);
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }

    /// Per-id occurrence counts, indexed by [`TileId`] up to `table_len`.
    pub fn occurrence_counts(&self, table_len: usize) -> Vec<usize> {
        let mut counts = vec![0usize; table_len];
        for &cell in &self.cells {
            counts[cell] += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile_with(pixel: usize, value: u8) -> Tile {
        let mut pixels = [0u8; TILE_PIXELS];
        pixels[pixel] = value;
        Tile::new(pixels)
    }

    #[test]
    fn test_blank_is_interned_first() {
        let table = TileTable::new();
        assert_eq!(table.len(), 1);
        assert_eq!(*table.get(BLANK_ID), Tile::BLANK);
    }

    #[test]
    fn test_intern_deduplicates() {
        let mut table = TileTable::new();
        let a = table.intern(tile_with(0, 1));
        let b = table.intern(tile_with(0, 1));
        let c = table.intern(tile_with(0, 2));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_intern_blank_returns_sentinel() {
        let mut table = TileTable::new();
        assert_eq!(table.intern(Tile::BLANK), BLANK_ID);
    }

    #[test]
    fn test_flip_horizontal_moves_corner() {
        let tile = tile_with(0, 3); // top-left
        let flipped = tile.flip_horizontal();
        assert_eq!(flipped.pixel(7, 0), 3);
        assert_eq!(flipped.pixel(0, 0), 0);
        assert_eq!(flipped.flip_horizontal(), tile);
    }

    #[test]
    fn test_flip_vertical_moves_corner() {
        let tile = tile_with(0, 3); // top-left
        let flipped = tile.flip_vertical();
        assert_eq!(flipped.pixel(0, 7), 3);
        assert_eq!(flipped.flip_vertical(), tile);
    }

    #[test]
    fn test_flips_commute() {
        let mut pixels = [0u8; TILE_PIXELS];
        for (i, p) in pixels.iter_mut().enumerate() {
            *p = (i % 4) as u8;
        }
        let tile = Tile::new(pixels);
        assert_eq!(
            tile.flip_horizontal().flip_vertical(),
            tile.flip_vertical().flip_horizontal()
        );
    }

    #[test]
    fn test_grid_replace() {
        let mut grid = TileGrid::from_cells(2, 2, vec![1, 2, 1, 0]);
        assert_eq!(grid.replace(1, 2), 2);
        assert_eq!(grid.cells(), &[2, 2, 2, 0]);
    }

    #[test]
    fn test_distinct_with_blank_counts_absent_blank() {
        let grid = TileGrid::from_cells(2, 1, vec![1, 2]);
        assert_eq!(grid.distinct_with_blank(), 3);

        let grid = TileGrid::from_cells(2, 1, vec![0, 2]);
        assert_eq!(grid.distinct_with_blank(), 2);
    }

    #[test]
    fn test_occurrence_counts() {
        let grid = TileGrid::from_cells(2, 2, vec![1, 1, 2, 0]);
        assert_eq!(grid.occurrence_counts(3), vec![1, 2, 1]);
    }
}
