//! Tile-budget reduction: merge excess distinct tiles into their perceptually
//! closest neighbours until the background fits the hardware budget.
//!
//! Each iteration first probes sprite assignment on the current grid, because
//! sprite-covered positions do not count against the background budget. If
//! the probe is still over budget, the cheapest elimination merge is applied:
//! one distinct tile is redirected to its nearest alive neighbour everywhere
//! it occurs, and its id leaves the alive set. The loop terminates because
//! every iteration removes exactly one alive id.

use thiserror::Error;

use crate::budget::HardwareBudget;
use crate::distance::DistanceMatrix;
use crate::sprite::{self, SpriteDescriptor};
use crate::tile::{TileGrid, TileId, TileTable};

/// Error type for reduction failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReduceError {
    /// The budget is exceeded but only the blank sentinel is left to merge
    /// into; no further elimination is possible.
    #[error(
        "cannot reduce below {remaining} distinct background tiles \
         (budget: {budget}); only the blank tile remains"
    )]
    BudgetInfeasible { remaining: usize, budget: usize },
}

/// Result of a completed reduction.
#[derive(Debug, Clone)]
pub struct Reduction {
    /// The final grid with sprite-assigned cells blanked.
    pub background: TileGrid,
    /// Sprites from the final assignment pass, in discovery order.
    pub sprites: Vec<SpriteDescriptor>,
    /// Cost of each accepted merge, in order. Non-decreasing.
    pub merge_costs: Vec<u64>,
    /// Sum over every tile position of the distance between the tile
    /// originally there and the tile now there. Under merge chains this can
    /// be less than the sum of `merge_costs`: a position rewritten A -> B ->
    /// C contributes dist(A, C), not dist(A, B) + dist(B, C).
    pub total_error: u64,
}

impl Reduction {
    pub fn merges(&self) -> usize {
        self.merge_costs.len()
    }
}

/// An elimination candidate: rewrite `source` to `target` everywhere.
struct Merge {
    source: TileId,
    target: TileId,
    cost: u64,
}

/// Shrink the distinct background tiles to within
/// `budget.max_background_tiles`, never eliminating the blank sentinel.
///
/// The caller is expected to have validated `budget`. Candidate cost is the
/// distance from a tile to its nearest alive neighbour times the tile's
/// occurrence count in the current grid; the globally cheapest candidate is
/// merged each iteration. All ties break to the lowest tile id, so identical
/// inputs always produce identical outputs.
pub fn reduce(
    table: &TileTable,
    grid: &TileGrid,
    budget: &HardwareBudget,
) -> Result<Reduction, ReduceError> {
    let matrix = DistanceMatrix::build(table);

    let mut work = grid.clone();
    let mut counts = work.occurrence_counts(table.len());
    let mut alive = vec![true; table.len()];
    let mut merge_costs: Vec<u64> = Vec::new();
    // Alive sets only shrink and occurrence counts only grow, so candidate
    // costs never decrease across iterations. The largest accepted cost is
    // therefore a floor on every later candidate, and the first candidate
    // that matches it can be accepted without finishing the scan.
    let mut cost_floor = 0u64;

    loop {
        let assignment = sprite::assign(&work, table.len(), budget);
        if assignment.background.distinct_with_blank() <= budget.max_background_tiles {
            // Measured against the merged grid, before sprite cells are
            // blanked; sprites display their tiles unchanged.
            let total_error = grid
                .cells()
                .iter()
                .zip(work.cells())
                .map(|(&from, &to)| u64::from(matrix.get(from, to)))
                .sum();
            return Ok(Reduction {
                background: assignment.background,
                sprites: assignment.sprites,
                merge_costs,
                total_error,
            });
        }

        let merge = match cheapest_merge(&matrix, &alive, &counts, cost_floor) {
            Some(merge) => merge,
            None => {
                return Err(ReduceError::BudgetInfeasible {
                    remaining: work.distinct_with_blank(),
                    budget: budget.max_background_tiles,
                });
            }
        };

        let moved = work.replace(merge.source, merge.target);
        counts[merge.target] += moved;
        counts[merge.source] = 0;
        alive[merge.source] = false;
        cost_floor = cost_floor.max(merge.cost);
        merge_costs.push(merge.cost);
    }
}

/// Find the cheapest elimination merge among alive non-blank tiles.
///
/// Returns `None` when no candidate exists (only the blank sentinel is
/// alive). A candidate whose cost equals `cost_floor` is returned
/// immediately: no candidate can cost less, and the first one encountered in
/// ascending id order is exactly the one the tie-break would pick.
fn cheapest_merge(
    matrix: &DistanceMatrix,
    alive: &[bool],
    counts: &[usize],
    cost_floor: u64,
) -> Option<Merge> {
    let mut best: Option<Merge> = None;

    for source in 1..alive.len() {
        if !alive[source] {
            continue;
        }

        // Nearest alive neighbour, lowest id on distance ties.
        let mut nearest: Option<(TileId, u32)> = None;
        for target in 0..alive.len() {
            if target == source || !alive[target] {
                continue;
            }
            let d = matrix.get(source, target);
            if nearest.map_or(true, |(_, nd)| d < nd) {
                nearest = Some((target, d));
            }
        }
        let (target, distance) = nearest?;

        let cost = distance as u64 * counts[source] as u64;
        let candidate = Merge {
            source,
            target,
            cost,
        };
        if cost <= cost_floor && cost_floor > 0 {
            return Some(candidate);
        }
        if best.as_ref().map_or(true, |b| cost < b.cost) {
            best = Some(candidate);
        }
    }

    best
}
