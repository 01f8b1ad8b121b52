//! Conversion pipeline - runs reduction, sprite assignment and flip
//! canonicalization as one deterministic pass and checks the hardware
//! invariants before anything is encoded.

use serde::Serialize;
use thiserror::Error;

use crate::budget::{BudgetError, HardwareBudget};
use crate::distance::MAX_TILE_DISTANCE;
use crate::flip::{self, PairRef, TilePair};
use crate::reduce::{self, ReduceError};
use crate::tile::{TileGrid, TileId, TileTable, BLANK_ID};

/// Error type for pipeline failures
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Budget(#[from] BudgetError),
    #[error(transparent)]
    Reduce(#[from] ReduceError),
    /// A post-condition failed after the algorithm claimed completion. This
    /// is a logic defect, not bad input; no output should be written.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
}

/// One sprite after canonicalization: grid placement plus a flip-qualified
/// reference into the representative pair list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalSprite {
    pub x: usize,
    pub band: usize,
    pub pair: PairRef,
}

/// Summary numbers for reporting; serialized as the JSON conversion report.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionStats {
    /// Tile positions in the source grid.
    pub total_tiles: usize,
    /// Distinct tiles in the source, blank included.
    pub distinct_tiles: usize,
    /// Elimination merges performed.
    pub merges: usize,
    /// Sum of accepted merge costs.
    pub total_error: u64,
    /// `total_error` relative to every pixel flipping across the full
    /// palette range.
    pub error_fraction: f64,
    /// Sprites assigned.
    pub sprites: usize,
    /// Distinct sprite tile pairs before mirror deduplication.
    pub distinct_pairs: usize,
    /// Representative pairs after mirror deduplication.
    pub representative_pairs: usize,
    /// Distinct background tiles in the final grid, blank included.
    pub background_tiles: usize,
}

/// Final state of one conversion, ready for byte encoding.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Background grid; sprite-covered cells hold the blank sentinel.
    pub background: TileGrid,
    /// Distinct ids present in `background` (plus blank), ascending. The
    /// name table references tiles by position in this sheet.
    pub background_sheet: Vec<TileId>,
    /// Sprites sorted by (band, x).
    pub sprites: Vec<CanonicalSprite>,
    /// Representative sprite tile pairs, first-seen order.
    pub pairs: Vec<TilePair>,
    pub stats: ConversionStats,
}

/// Run the full pipeline on an imported image.
///
/// Pure function of its inputs: identical (table, grid, budget) always
/// yields an identical [`Conversion`].
pub fn convert(
    table: &TileTable,
    grid: &TileGrid,
    budget: &HardwareBudget,
) -> Result<Conversion, PipelineError> {
    budget.validate()?;

    let reduction = reduce::reduce(table, grid, budget)?;
    check_invariants(&reduction, budget)?;

    let mut descriptors = reduction.sprites.clone();
    descriptors.sort_by_key(|s| (s.band, s.x));

    // Distinct (upper, lower) id pairs, ascending; the canonicalizer's
    // fixed input order.
    let mut pair_ids: Vec<(TileId, TileId)> =
        descriptors.iter().map(|s| (s.upper, s.lower)).collect();
    pair_ids.sort_unstable();
    pair_ids.dedup();

    let pair_pixels: Vec<TilePair> = pair_ids
        .iter()
        .map(|&(upper, lower)| TilePair::new(*table.get(upper), *table.get(lower)))
        .collect();
    let canonical = flip::canonicalize(&pair_pixels);

    let mut sprites = Vec::with_capacity(descriptors.len());
    for descriptor in &descriptors {
        let position = pair_ids
            .binary_search(&(descriptor.upper, descriptor.lower))
            .map_err(|_| {
                PipelineError::InvariantViolation(
                    "sprite references a pair missing from the distinct pair list".into(),
                )
            })?;
        sprites.push(CanonicalSprite {
            x: descriptor.x,
            band: descriptor.band,
            pair: canonical.mapping[position],
        });
    }

    let mut background_sheet: Vec<TileId> = reduction.background.cells().to_vec();
    background_sheet.push(BLANK_ID);
    background_sheet.sort_unstable();
    background_sheet.dedup();

    let total_tiles = grid.cells().len();
    let stats = ConversionStats {
        total_tiles,
        distinct_tiles: table.len(),
        merges: reduction.merges(),
        total_error: reduction.total_error,
        error_fraction: reduction.total_error as f64
            / (total_tiles as u64 * MAX_TILE_DISTANCE as u64) as f64,
        sprites: sprites.len(),
        distinct_pairs: pair_ids.len(),
        representative_pairs: canonical.representatives.len(),
        background_tiles: background_sheet.len(),
    };

    Ok(Conversion {
        background: reduction.background,
        background_sheet,
        sprites,
        pairs: canonical.representatives,
        stats,
    })
}

/// The hardware limits the reducer claims to have met, re-checked before
/// any bytes are produced.
fn check_invariants(
    reduction: &reduce::Reduction,
    budget: &HardwareBudget,
) -> Result<(), PipelineError> {
    let background_tiles = reduction.background.distinct_with_blank();
    if background_tiles > budget.max_background_tiles {
        return Err(PipelineError::InvariantViolation(format!(
            "final background has {background_tiles} distinct tiles, budget is {}",
            budget.max_background_tiles
        )));
    }

    if reduction.sprites.len() > budget.max_sprites {
        return Err(PipelineError::InvariantViolation(format!(
            "{} sprites assigned, budget is {}",
            reduction.sprites.len(),
            budget.max_sprites
        )));
    }

    let bands = reduction.background.height() / 2;
    let mut per_band = vec![0usize; bands.max(1)];
    for sprite in &reduction.sprites {
        per_band[sprite.band] += 1;
    }
    for (band, &count) in per_band.iter().enumerate() {
        if count > budget.max_sprites_per_scanline {
            return Err(PipelineError::InvariantViolation(format!(
                "row band {band} holds {count} sprites, per-scanline cap is {}",
                budget.max_sprites_per_scanline
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{Tile, TILE_PIXELS};

    fn marked(value: u8, pixel: usize) -> Tile {
        let mut pixels = [0u8; TILE_PIXELS];
        pixels[pixel] = value;
        Tile::new(pixels)
    }

    #[test]
    fn test_convert_within_budget_is_lossless() {
        let mut table = TileTable::new();
        let a = table.intern(marked(1, 0));
        let grid = TileGrid::from_cells(2, 1, vec![a, a]);

        let conversion = convert(&table, &grid, &HardwareBudget::NES).unwrap();
        assert_eq!(conversion.stats.merges, 0);
        assert_eq!(conversion.stats.total_error, 0);
        assert_eq!(conversion.stats.error_fraction, 0.0);
        assert_eq!(conversion.background_sheet, vec![BLANK_ID, a]);
    }

    #[test]
    fn test_sprites_are_sorted_and_canonicalized() {
        // Two columns whose pairs are horizontal mirrors: one representative
        // pair, two sprites, the second carrying the H flip.
        let mut table = TileTable::new();
        let up = table.intern(marked(1, 0));
        let up_m = table.intern(marked(1, 7));
        let lo = table.intern(marked(2, 8));
        let lo_m = table.intern(marked(2, 15));
        let grid = TileGrid::from_cells(2, 2, vec![up, up_m, lo, lo_m]);

        let conversion = convert(&table, &grid, &HardwareBudget::NES).unwrap();
        assert_eq!(conversion.sprites.len(), 2);
        assert_eq!(conversion.stats.distinct_pairs, 2);
        assert_eq!(conversion.stats.representative_pairs, 1);

        let first = conversion.sprites[0];
        let second = conversion.sprites[1];
        assert_eq!((first.x, first.band), (0, 0));
        assert_eq!((second.x, second.band), (1, 0));
        assert_eq!(first.pair.index, 0);
        assert_eq!(second.pair.index, 0);
        assert!(!first.pair.h_flip && !first.pair.v_flip);
        assert!(second.pair.h_flip && !second.pair.v_flip);
    }

    #[test]
    fn test_invalid_budget_rejected_up_front() {
        let table = TileTable::new();
        let grid = TileGrid::new(1, 1);
        let budget = HardwareBudget {
            max_background_tiles: 0,
            ..HardwareBudget::NES
        };
        assert!(matches!(
            convert(&table, &grid, &budget),
            Err(PipelineError::Budget(_))
        ));
    }
}
