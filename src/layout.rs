//! Byte layout encoding - serializes the final grid, sprite list and tile
//! sheet into the fixed PPU data layout consumed by the still-image ROM.
//!
//! Everything here is index arithmetic over the formats the hardware
//! dictates: a 32x30 name table, a packed attribute table, 4-byte sprite
//! records, an 8-subpalette block and 16-byte bitplane tiles.

use thiserror::Error;

use crate::budget::HardwareBudget;
use crate::palette::OutputPalette;
use crate::pipeline::Conversion;
use crate::tile::{Tile, TileId, TileTable, TILE_HEIGHT, TILE_WIDTH};

/// Name table width in tiles.
pub const NAME_TABLE_WIDTH: usize = 32;
/// Name table height in tiles.
pub const NAME_TABLE_HEIGHT: usize = 30;
/// Attribute blocks across the screen (16x16 px each).
pub const ATTRIBUTE_COLS: usize = 16;
/// Attribute block rows visible on screen (the 16th is unused padding).
pub const ATTRIBUTE_ROWS: usize = 15;
/// Encoded bytes per tile: two bitplanes of one byte per row.
pub const TILE_BYTES: usize = 2 * TILE_HEIGHT;
/// Bytes per sprite record in OAM.
pub const SPRITE_RECORD_BYTES: usize = 4;
/// Record filler that parks a sprite slot off-screen.
const HIDDEN_SPRITE_BYTE: u8 = 0xff;

/// Error type for geometry construction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("image of {width}x{height} tiles does not fit the 32x30 name table")]
    ImageTooLarge { width: usize, height: usize },
    #[error("image must be at least 1x1 tiles")]
    EmptyImage,
}

/// Placement of a source image within the fixed hardware canvas.
///
/// The margin all sits above and left of the image in the name table, and
/// the scroll registers shift the view back by half the margin, centring
/// the picture. For the stock 32x28-tile image this works out to a two-row
/// top margin and a (0, 8) scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    width_tiles: usize,
    height_tiles: usize,
}

impl Geometry {
    /// The stock still-image shape: 32x28 tiles (256x224 px).
    pub const STOCK: Geometry = Geometry {
        width_tiles: 32,
        height_tiles: 28,
    };

    pub fn new(width_tiles: usize, height_tiles: usize) -> Result<Self, LayoutError> {
        if width_tiles == 0 || height_tiles == 0 {
            return Err(LayoutError::EmptyImage);
        }
        if width_tiles > NAME_TABLE_WIDTH || height_tiles > NAME_TABLE_HEIGHT {
            return Err(LayoutError::ImageTooLarge {
                width: width_tiles,
                height: height_tiles,
            });
        }
        Ok(Geometry {
            width_tiles,
            height_tiles,
        })
    }

    pub fn width_tiles(&self) -> usize {
        self.width_tiles
    }

    pub fn height_tiles(&self) -> usize {
        self.height_tiles
    }

    pub fn width_px(&self) -> usize {
        self.width_tiles * TILE_WIDTH
    }

    pub fn height_px(&self) -> usize {
        self.height_tiles * TILE_HEIGHT
    }

    /// Blank rows above the image in the name table.
    pub fn top_margin_tiles(&self) -> usize {
        NAME_TABLE_HEIGHT - self.height_tiles
    }

    /// Blank columns left of the image in the name table.
    pub fn left_margin_tiles(&self) -> usize {
        NAME_TABLE_WIDTH - self.width_tiles
    }

    /// Horizontal scroll that centres the image.
    pub fn scroll_x(&self) -> u8 {
        (self.left_margin_tiles() * TILE_WIDTH / 2) as u8
    }

    /// Vertical scroll that centres the image.
    pub fn scroll_y(&self) -> u8 {
        (self.top_margin_tiles() * TILE_HEIGHT / 2) as u8
    }

    /// Screen x in pixels of image column 0 after scrolling.
    fn origin_x(&self) -> usize {
        self.left_margin_tiles() * TILE_WIDTH - self.scroll_x() as usize
    }

    /// Screen y in pixels of image row 0 after scrolling.
    fn origin_y(&self) -> usize {
        self.top_margin_tiles() * TILE_HEIGHT - self.scroll_y() as usize
    }
}

/// Encode the PRG-side data block: name table, attribute table, sprite
/// table, palette block and scroll registers, in that order.
pub fn encode_prg(
    conversion: &Conversion,
    palette: &OutputPalette,
    geometry: &Geometry,
    budget: &HardwareBudget,
) -> Vec<u8> {
    let mut prg = Vec::new();
    prg.extend(encode_name_table(conversion, geometry));
    // One output palette only, so every attribute quadrant selects BG0.
    prg.extend(encode_attribute_table(
        &[0u8; ATTRIBUTE_COLS * ATTRIBUTE_ROWS],
    ));
    prg.extend(encode_sprite_table(conversion, geometry, budget));
    prg.extend(encode_palette_block(palette));
    prg.push(geometry.scroll_x());
    prg.push(geometry.scroll_y());
    prg
}

/// Encode the 32x30 name table: the background grid letter-boxed with the
/// blank sentinel, each cell holding a tile-sheet index.
fn encode_name_table(conversion: &Conversion, geometry: &Geometry) -> Vec<u8> {
    // The sheet is ascending by tile id with blank first, so position 0 is
    // always the blank sentinel the margins use.
    let sheet_position = sheet_positions(&conversion.background_sheet);

    let top = geometry.top_margin_tiles();
    let left = geometry.left_margin_tiles();
    let mut bytes = Vec::with_capacity(NAME_TABLE_WIDTH * NAME_TABLE_HEIGHT);
    for row in 0..NAME_TABLE_HEIGHT {
        for col in 0..NAME_TABLE_WIDTH {
            if row < top || col < left {
                bytes.push(0);
            } else {
                let id = conversion.background.get(col - left, row - top);
                bytes.push(sheet_position[id]);
            }
        }
    }
    bytes
}

/// Map tile id to its position in the background sheet.
fn sheet_positions(sheet: &[TileId]) -> Vec<u8> {
    let max_id = sheet.iter().copied().max().unwrap_or(0);
    let mut positions = vec![0u8; max_id + 1];
    for (position, &id) in sheet.iter().enumerate() {
        positions[id] = position as u8;
    }
    positions
}

/// Pack per-block 2-bit palette selects into attribute bytes, one byte per
/// 2x2 block quadrant group.
///
/// `blocks` is the 16x15 visible block grid in row-major order; a 16th row
/// of padding blocks (unused by the PPU) is added before packing.
pub fn encode_attribute_table(blocks: &[u8]) -> Vec<u8> {
    let mut padded = blocks.to_vec();
    padded.resize(ATTRIBUTE_COLS * (ATTRIBUTE_ROWS + 1), 0);

    let mut bytes = Vec::with_capacity(64);
    for y in 0..8 {
        for x in 0..8 {
            let si = (y * ATTRIBUTE_COLS + x) * 2;
            bytes.push(
                padded[si]
                    | (padded[si + 1] << 2)
                    | (padded[si + ATTRIBUTE_COLS] << 4)
                    | (padded[si + ATTRIBUTE_COLS + 1] << 6),
            );
        }
    }
    bytes
}

/// Encode the OAM sprite table: 4 bytes per slot up to the sprite budget,
/// unused slots hidden below the visible frame.
fn encode_sprite_table(
    conversion: &Conversion,
    geometry: &Geometry,
    budget: &HardwareBudget,
) -> Vec<u8> {
    let origin_x = geometry.origin_x();
    let origin_y = geometry.origin_y();

    let mut bytes = Vec::with_capacity(budget.max_sprites * SPRITE_RECORD_BYTES);
    for sprite in &conversion.sprites {
        let screen_y = (origin_y + sprite.band * 2 * TILE_HEIGHT) as u8;
        let screen_x = (origin_x + sprite.x * TILE_WIDTH) as u8;
        // 8x16 sprite tile byte: pair index doubled, low bit selecting the
        // sprite pattern table.
        let tile = (sprite.pair.index * 2 + 1) as u8;
        let mut attributes = 0u8;
        if sprite.pair.v_flip {
            attributes |= 0b1000_0000;
        }
        if sprite.pair.h_flip {
            attributes |= 0b0100_0000;
        }
        bytes.push(screen_y.wrapping_sub(1)); // OAM Y is delayed one line
        bytes.push(tile);
        bytes.push(attributes);
        bytes.push(screen_x);
    }
    for _ in conversion.sprites.len()..budget.max_sprites {
        bytes.extend([HIDDEN_SPRITE_BYTE; SPRITE_RECORD_BYTES]);
    }
    bytes
}

/// Encode the 8x4-byte palette block. Background and sprite palette 0 carry
/// the output palette; the rest are filled with the backdrop colour.
fn encode_palette_block(palette: &OutputPalette) -> Vec<u8> {
    let colors = palette.colors();
    let backdrop = palette.backdrop();

    let mut bytes = Vec::with_capacity(32);
    bytes.extend(colors); // BG0
    bytes.extend([backdrop; 4]); // BG1
    for _ in 0..2 {
        bytes.extend([backdrop, 0x00, 0x00, 0x00]); // BG2-BG3 (unused)
    }
    bytes.extend(colors); // SPR0
    for _ in 0..3 {
        bytes.extend([backdrop, 0x00, 0x00, 0x00]); // SPR1-SPR3 (unused)
    }
    bytes
}

/// Encode the CHR tile sheet: background tiles first, padded to the
/// background budget with the unused filler, then sprite pairs padded to
/// two tiles per sprite slot.
pub fn encode_chr(conversion: &Conversion, table: &TileTable, budget: &HardwareBudget) -> Vec<u8> {
    let mut chr = Vec::new();

    for &id in &conversion.background_sheet {
        chr.extend(encode_tile(table.get(id)));
    }
    for _ in conversion.background_sheet.len()..budget.max_background_tiles {
        chr.extend(encode_tile(&Tile::UNUSED));
    }

    for pair in &conversion.pairs {
        chr.extend(encode_tile(&pair.upper));
        chr.extend(encode_tile(&pair.lower));
    }
    for _ in conversion.pairs.len()..budget.max_sprites {
        chr.extend(encode_tile(&Tile::UNUSED));
        chr.extend(encode_tile(&Tile::UNUSED));
    }

    chr
}

/// Encode one tile as 16 bytes: the less significant bitplane first, one
/// byte per row, most significant bit leftmost.
pub fn encode_tile(tile: &Tile) -> [u8; TILE_BYTES] {
    let mut bytes = [0u8; TILE_BYTES];
    for bitplane in 0..2 {
        for y in 0..TILE_HEIGHT {
            let mut byte = 0u8;
            for x in 0..TILE_WIDTH {
                byte |= ((tile.pixel(x, y) >> bitplane) & 1) << (7 - x);
            }
            bytes[bitplane * TILE_HEIGHT + y] = byte;
        }
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TILE_PIXELS;

    #[test]
    fn test_stock_geometry_margins_and_scroll() {
        let g = Geometry::STOCK;
        assert_eq!(g.top_margin_tiles(), 2);
        assert_eq!(g.left_margin_tiles(), 0);
        assert_eq!((g.scroll_x(), g.scroll_y()), (0, 8));
        // Image row 0 lands 8 px below the top of the frame.
        assert_eq!(g.origin_y(), 8);
        assert_eq!(g.origin_x(), 0);
    }

    #[test]
    fn test_full_canvas_geometry_has_no_margin() {
        let g = Geometry::new(32, 30).unwrap();
        assert_eq!(g.top_margin_tiles(), 0);
        assert_eq!((g.scroll_x(), g.scroll_y()), (0, 0));
    }

    #[test]
    fn test_geometry_rejects_oversize_and_empty() {
        assert!(matches!(
            Geometry::new(33, 28),
            Err(LayoutError::ImageTooLarge { .. })
        ));
        assert_eq!(Geometry::new(0, 4), Err(LayoutError::EmptyImage));
    }

    #[test]
    fn test_encode_tile_blank_and_unused() {
        assert_eq!(encode_tile(&Tile::BLANK), [0u8; TILE_BYTES]);
        assert_eq!(encode_tile(&Tile::UNUSED), [0xffu8; TILE_BYTES]);
    }

    #[test]
    fn test_encode_tile_bitplanes() {
        // Top row: 1 2 3 0 0 0 0 0
        // Plane 0 row 0: 1,0,1,... -> 0b1010_0000
        // Plane 1 row 0: 0,1,1,... -> 0b0110_0000
        let mut pixels = [0u8; TILE_PIXELS];
        pixels[0] = 1;
        pixels[1] = 2;
        pixels[2] = 3;
        let bytes = encode_tile(&Tile::new(pixels));
        assert_eq!(bytes[0], 0b1010_0000);
        assert_eq!(bytes[8], 0b0110_0000);
        assert!(bytes[1..8].iter().all(|&b| b == 0));
        assert!(bytes[9..16].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_attribute_packing_quadrant_order() {
        // Block (0,0)=1, (1,0)=2, (0,1)=3, (1,1)=0 pack into byte 0 as
        // little-endian 2-bit fields: 1 | 2<<2 | 3<<4 | 0<<6.
        let mut blocks = [0u8; ATTRIBUTE_COLS * ATTRIBUTE_ROWS];
        blocks[0] = 1;
        blocks[1] = 2;
        blocks[ATTRIBUTE_COLS] = 3;
        let bytes = encode_attribute_table(&blocks);
        assert_eq!(bytes.len(), 64);
        assert_eq!(bytes[0], 0b0011_1001);
        assert!(bytes[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_attribute_padding_row_is_zero() {
        // The bottom attribute byte row draws its high bits from the padded
        // 16th block row.
        let mut blocks = [0u8; ATTRIBUTE_COLS * ATTRIBUTE_ROWS];
        blocks[ATTRIBUTE_COLS * 14] = 3; // block (0,14), last visible row
        let bytes = encode_attribute_table(&blocks);
        assert_eq!(bytes[56], 0b0000_0011);
    }
}
