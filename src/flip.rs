//! Flip canonicalization - deduplicates sprite tile pairs that are mirror
//! images of one another, since the PPU can flip a sprite for free.

use crate::tile::Tile;

/// A vertical pair of tiles, as rendered by one 8x16 sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TilePair {
    pub upper: Tile,
    pub lower: Tile,
}

impl TilePair {
    pub fn new(upper: Tile, lower: Tile) -> Self {
        TilePair { upper, lower }
    }

    /// Mirror left-to-right. Both tiles flip in place; upper stays upper.
    pub fn flip_horizontal(&self) -> TilePair {
        TilePair {
            upper: self.upper.flip_horizontal(),
            lower: self.lower.flip_horizontal(),
        }
    }

    /// Mirror top-to-bottom. The pair's row order reverses: the new upper
    /// is the old lower flipped, and vice versa.
    pub fn flip_vertical(&self) -> TilePair {
        TilePair {
            upper: self.lower.flip_vertical(),
            lower: self.upper.flip_vertical(),
        }
    }

    /// Apply the given flips, horizontal first. The two flips commute, so
    /// the order is only a convention.
    pub fn with_flips(&self, h_flip: bool, v_flip: bool) -> TilePair {
        let mut pair = *self;
        if h_flip {
            pair = pair.flip_horizontal();
        }
        if v_flip {
            pair = pair.flip_vertical();
        }
        pair
    }
}

/// Reference from a sprite to a canonical tile pair: flipping the
/// representative at `index` as indicated reconstructs the original pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairRef {
    pub index: usize,
    pub h_flip: bool,
    pub v_flip: bool,
}

/// Result of canonicalization: representatives in first-seen order plus one
/// [`PairRef`] per input pair, in input order.
#[derive(Debug, Clone)]
pub struct CanonicalPairs {
    pub representatives: Vec<TilePair>,
    pub mapping: Vec<PairRef>,
}

/// Flip combinations in probe order. Identity first, so an exact duplicate
/// maps with no flips set.
const FLIP_PROBES: [(bool, bool); 4] = [(false, false), (true, false), (false, true), (true, true)];

/// Deduplicate `pairs` under the mirror symmetry group.
///
/// Pairs are scanned in input order. Each pair is matched against earlier
/// representatives in ascending index order, probing flip combinations
/// identity, H, V, HV; the first match wins. A pair with no match becomes
/// its own representative. Reconstruction is exact: applying the recorded
/// flips to the representative yields the original pair content.
pub fn canonicalize(pairs: &[TilePair]) -> CanonicalPairs {
    let mut representatives: Vec<TilePair> = Vec::new();
    let mut mapping = Vec::with_capacity(pairs.len());

    for pair in pairs {
        let matched = find_match(&representatives, pair).unwrap_or_else(|| {
            representatives.push(*pair);
            PairRef {
                index: representatives.len() - 1,
                h_flip: false,
                v_flip: false,
            }
        });
        mapping.push(matched);
    }

    CanonicalPairs {
        representatives,
        mapping,
    }
}

fn find_match(representatives: &[TilePair], pair: &TilePair) -> Option<PairRef> {
    for (index, rep) in representatives.iter().enumerate() {
        for (h_flip, v_flip) in FLIP_PROBES {
            if rep.with_flips(h_flip, v_flip) == *pair {
                return Some(PairRef {
                    index,
                    h_flip,
                    v_flip,
                });
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TILE_PIXELS;

    /// An asymmetric pair: distinct corner markers on each tile.
    fn asymmetric_pair() -> TilePair {
        let mut upper = [0u8; TILE_PIXELS];
        upper[0] = 1; // upper tile, top-left
        upper[7] = 2;
        let mut lower = [0u8; TILE_PIXELS];
        lower[56] = 3; // lower tile, bottom-left
        TilePair::new(Tile::new(upper), Tile::new(lower))
    }

    #[test]
    fn test_identity_duplicate_maps_without_flips() {
        let pair = asymmetric_pair();
        let result = canonicalize(&[pair, pair]);
        assert_eq!(result.representatives.len(), 1);
        assert_eq!(
            result.mapping[1],
            PairRef {
                index: 0,
                h_flip: false,
                v_flip: false
            }
        );
    }

    #[test]
    fn test_all_mirrors_collapse_to_one_representative() {
        let pair = asymmetric_pair();
        let variants = [
            pair,
            pair.flip_horizontal(),
            pair.flip_vertical(),
            pair.flip_horizontal().flip_vertical(),
        ];
        let result = canonicalize(&variants);

        assert_eq!(result.representatives.len(), 1);
        assert_eq!(result.representatives[0], pair);
        for (i, variant) in variants.iter().enumerate() {
            let m = result.mapping[i];
            assert_eq!(m.index, 0);
            // Round-trip: the recorded flips reconstruct the original.
            assert_eq!(pair.with_flips(m.h_flip, m.v_flip), *variant);
        }
    }

    #[test]
    fn test_unrelated_pairs_stay_distinct() {
        let a = asymmetric_pair();
        let mut other = [0u8; TILE_PIXELS];
        other[27] = 2; // interior pixel, not on any mirror axis image of a
        let b = TilePair::new(Tile::new(other), Tile::BLANK);

        let result = canonicalize(&[a, b]);
        assert_eq!(result.representatives.len(), 2);
        assert_eq!(result.mapping[1].index, 1);
    }

    #[test]
    fn test_symmetric_pair_prefers_earliest_probe() {
        // A horizontally symmetric pair matches itself under both identity
        // and H; the identity probe comes first.
        let mut upper = [0u8; TILE_PIXELS];
        upper[3] = 1;
        upper[4] = 1; // mirror-symmetric row
        let pair = TilePair::new(Tile::new(upper), Tile::BLANK);

        let result = canonicalize(&[pair, pair.flip_horizontal()]);
        assert_eq!(result.representatives.len(), 1);
        // The H-flipped copy equals the original, so identity matches first.
        assert_eq!(
            result.mapping[1],
            PairRef {
                index: 0,
                h_flip: false,
                v_flip: false
            }
        );
    }

    #[test]
    fn test_vertical_flip_swaps_tiles() {
        let pair = asymmetric_pair();
        let flipped = pair.flip_vertical();
        assert_eq!(flipped.upper, pair.lower.flip_vertical());
        assert_eq!(flipped.lower, pair.upper.flip_vertical());
        assert_eq!(flipped.flip_vertical(), pair);
    }
}
