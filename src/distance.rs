//! Tile distance metric and the precomputed pairwise distance matrix.

use rayon::prelude::*;

use crate::tile::{Tile, TileId, TileTable, TILE_PIXELS};

/// Largest possible distance between two tiles: every pixel differing by the
/// full palette range (0 vs 3).
pub const MAX_TILE_DISTANCE: u32 = (TILE_PIXELS as u32) * 3;

/// Perceptual distance between two tiles: the sum of absolute differences
/// between their palette indices, pixel by pixel.
///
/// Symmetric, and zero exactly when the tiles are equal.
///
/// # Examples
///
/// ```
/// use px2nes::distance::tile_distance;
/// use px2nes::tile::Tile;
///
/// let mut pixels = [0u8; 64];
/// pixels[0] = 2;
/// pixels[1] = 1;
/// let tile = Tile::new(pixels);
/// assert_eq!(tile_distance(&Tile::BLANK, &tile), 3);
/// assert_eq!(tile_distance(&tile, &tile), 0);
/// ```
pub fn tile_distance(a: &Tile, b: &Tile) -> u32 {
    a.pixels()
        .iter()
        .zip(b.pixels().iter())
        .map(|(&pa, &pb)| pa.abs_diff(pb) as u32)
        .sum()
}

/// Full pairwise distance matrix over a [`TileTable`].
///
/// Built once per conversion; tile content is immutable, so the matrix never
/// changes while the reduction loop shrinks the alive-id set. The build is
/// parallelised per row, which cannot affect the stored values.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    size: usize,
    values: Vec<u32>,
}

impl DistanceMatrix {
    pub fn build(table: &TileTable) -> Self {
        let tiles: Vec<&Tile> = table.iter().collect();
        let size = tiles.len();
        let values: Vec<u32> = (0..size)
            .into_par_iter()
            .flat_map_iter(|row| {
                let a = tiles[row];
                tiles
                    .iter()
                    .map(move |&b| tile_distance(a, b))
                    .collect::<Vec<u32>>()
            })
            .collect();
        DistanceMatrix { size, values }
    }

    pub fn get(&self, a: TileId, b: TileId) -> u32 {
        self.values[a * self.size + b]
    }

    pub fn size(&self) -> usize {
        self.size
    }
}
