//! px2nes - Convert quantized images into NES PPU background/sprite data
//!
//! This library provides functionality to:
//! - Import a 4-colour PNG and cut it into 8x8 tiles
//! - Reduce the distinct background tiles to the hardware budget by merging
//!   perceptually close tiles
//! - Reassign vertical tile pairs to 8x16 hardware sprites under the
//!   per-scanline and global sprite caps
//! - Deduplicate sprite tile pairs under horizontal/vertical mirroring
//! - Encode the result as PRG (name/attribute/sprite/palette tables) and
//!   CHR (bitplane tile sheet) byte buffers

pub mod budget;
pub mod cli;
pub mod distance;
pub mod flip;
pub mod import;
pub mod layout;
pub mod output;
pub mod palette;
pub mod pipeline;
pub mod reduce;
pub mod sprite;
pub mod tile;
