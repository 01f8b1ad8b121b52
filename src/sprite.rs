//! Greedy reassignment of vertical tile pairs from the background pool to
//! hardware sprites.
//!
//! Sprites here are 8x16 objects: a vertically adjacent pair of tiles taken
//! out of the background grid. Pulling a pair out removes its tiles from the
//! background distinct-tile count, which is what lets an over-budget image
//! squeeze under the 256-tile limit.

use crate::budget::HardwareBudget;
use crate::tile::{TileGrid, TileId, BLANK_ID};

/// Number of eligibility rounds. Each round enables one more clause of the
/// preference ladder in [`assign`].
const ASSIGNMENT_ROUNDS: usize = 6;

/// A 1x2-tile pair pulled out of the background grid.
///
/// `x` is the column and `band` the 2-tile row band, both in tile-pair
/// units. `upper` and `lower` are the pre-removal tile ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteDescriptor {
    pub x: usize,
    pub band: usize,
    pub upper: TileId,
    pub lower: TileId,
}

/// Result of one assignment pass: the grid with assigned cells blanked, and
/// the sprites in discovery order.
#[derive(Debug, Clone)]
pub struct SpriteAssignment {
    pub background: TileGrid,
    pub sprites: Vec<SpriteDescriptor>,
}

/// Greedily assign vertical tile pairs to sprites.
///
/// Scans row bands top to bottom and columns left to right, over six rounds
/// with a widening eligibility ladder, so the earliest-assigned sprites are
/// the pairs whose removal saves the most distinct background tiles:
///
/// - round 0: both tiles occur exactly once
/// - round 1: either tile occurs exactly once
/// - round 2: both tiles occur exactly twice
/// - round 3: either tile occurs exactly twice
/// - round 4: both tiles occur exactly three times
/// - round 5: either tile occurs exactly three times
///
/// Earlier clauses stay enabled in later rounds, so a pair skipped only
/// because a cap was momentarily reached is reconsidered. Occurrence counts
/// are live: they track the grid as cells are blanked, not the original
/// image. A pair is only ever eligible when both tiles are non-blank.
///
/// A band stops accepting sprites at `max_sprites_per_scanline`; the whole
/// assignment stops at `max_sprites`. If the grid height is odd, the last
/// row is never considered.
///
/// The scan order is part of the output contract: sprite selection decides
/// which tiles remain in the background pool, and the reduction loop's
/// budget check depends on it.
pub fn assign(grid: &TileGrid, table_len: usize, budget: &HardwareBudget) -> SpriteAssignment {
    let mut background = grid.clone();
    let mut counts = background.occurrence_counts(table_len);
    let mut sprites = Vec::new();

    let bands = grid.height() / 2;
    let mut per_band = vec![0usize; bands];

    for round in 0..ASSIGNMENT_ROUNDS {
        for band in 0..bands {
            for x in 0..grid.width() {
                if sprites.len() >= budget.max_sprites {
                    return SpriteAssignment { background, sprites };
                }
                if per_band[band] >= budget.max_sprites_per_scanline {
                    break;
                }

                let upper = background.get(x, band * 2);
                let lower = background.get(x, band * 2 + 1);
                if upper == BLANK_ID || lower == BLANK_ID {
                    continue;
                }

                let up = counts[upper];
                let lo = counts[lower];
                let eligible = (up == 1 && lo == 1)
                    || (round >= 1 && (up == 1 || lo == 1))
                    || (round >= 2 && up == 2 && lo == 2)
                    || (round >= 3 && (up == 2 || lo == 2))
                    || (round >= 4 && up == 3 && lo == 3)
                    || (round >= 5 && (up == 3 || lo == 3));
                if !eligible {
                    continue;
                }

                sprites.push(SpriteDescriptor {
                    x,
                    band,
                    upper,
                    lower,
                });
                counts[upper] -= 1;
                counts[lower] -= 1;
                counts[BLANK_ID] += 2;
                background.set(x, band * 2, BLANK_ID);
                background.set(x, band * 2 + 1, BLANK_ID);
                per_band[band] += 1;
            }
        }
    }

    SpriteAssignment { background, sprites }
}
