//! Hardware capacity limits carried as explicit configuration.

use thiserror::Error;

/// Error type for budget validation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BudgetError {
    /// The background budget cannot fit even the blank sentinel
    #[error("background tile budget must be at least 1 (the blank tile)")]
    NoBackgroundTiles,
    /// The background budget exceeds what the name table can index
    #[error("background tile budget {0} exceeds the hardware limit of 256")]
    TooManyBackgroundTiles(usize),
    /// The sprite budget exceeds what the sprite table can hold
    #[error("sprite budget {0} exceeds the hardware limit of 64")]
    TooManySprites(usize),
}

/// Immutable hardware capacity configuration.
///
/// The NES PPU can display at most 256 distinct background tiles, 64
/// hardware sprites, and 8 sprites per scanline. The limits are passed into
/// every component rather than living in module constants so that tests and
/// other targets can tighten them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwareBudget {
    /// Maximum distinct background tiles, including the blank sentinel.
    pub max_background_tiles: usize,
    /// Maximum hardware sprites (8x16 vertical tile pairs).
    pub max_sprites: usize,
    /// Maximum sprites sharing one scanline (here: one 2-tile row band).
    pub max_sprites_per_scanline: usize,
}

impl HardwareBudget {
    /// The stock NES limits.
    pub const NES: HardwareBudget = HardwareBudget {
        max_background_tiles: 256,
        max_sprites: 64,
        max_sprites_per_scanline: 8,
    };

    /// Check the limits the byte layout depends on: at least one background
    /// tile (the blank sentinel), and sheet sizes the one-byte tile indices
    /// of the name and sprite tables can address.
    pub fn validate(&self) -> Result<(), BudgetError> {
        if self.max_background_tiles < 1 {
            return Err(BudgetError::NoBackgroundTiles);
        }
        if self.max_background_tiles > HardwareBudget::NES.max_background_tiles {
            return Err(BudgetError::TooManyBackgroundTiles(
                self.max_background_tiles,
            ));
        }
        if self.max_sprites > HardwareBudget::NES.max_sprites {
            return Err(BudgetError::TooManySprites(self.max_sprites));
        }
        Ok(())
    }
}

impl Default for HardwareBudget {
    fn default() -> Self {
        HardwareBudget::NES
    }
}
