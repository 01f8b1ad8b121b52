//! PNG import - decode a quantized source image and cut it into the tile
//! table and position grid the pipeline consumes.

use std::path::Path;

use image::DynamicImage;
use thiserror::Error;

use crate::layout::Geometry;
use crate::palette;
use crate::tile::{Tile, TileGrid, TileTable, TILE_HEIGHT, TILE_PIXELS, TILE_WIDTH};

/// Error type for import failures
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("image must be {expected_w}x{expected_h} pixels, got {actual_w}x{actual_h}")]
    WrongSize {
        expected_w: u32,
        expected_h: u32,
        actual_w: u32,
        actual_h: u32,
    },
    #[error("image contains unsupported colour rgb({0}, {1}, {2})")]
    UnsupportedColor(u8, u8, u8),
    #[error("cannot read image: {0}")]
    Image(#[from] image::ImageError),
}

/// A decoded source image: the deduplicated tile table (blank sentinel
/// included) and the grid of tile ids in reading order.
#[derive(Debug, Clone)]
pub struct ImportedImage {
    pub table: TileTable,
    pub grid: TileGrid,
}

/// Load and import a PNG from disk.
pub fn load_png(path: &Path, geometry: &Geometry) -> Result<ImportedImage, ImportError> {
    let img = image::open(path)?;
    import_image(&img, geometry)
}

/// Import an already-decoded image.
///
/// The image must match the geometry exactly and use only colours from the
/// fixed input palette; every pixel becomes a 2-bit palette index. Tiles
/// are interned in row-major scan order, so distinct ids are first-seen
/// order with blank at id 0.
pub fn import_image(img: &DynamicImage, geometry: &Geometry) -> Result<ImportedImage, ImportError> {
    let expected_w = geometry.width_px() as u32;
    let expected_h = geometry.height_px() as u32;
    let rgb = img.to_rgb8();
    if rgb.width() != expected_w || rgb.height() != expected_h {
        return Err(ImportError::WrongSize {
            expected_w,
            expected_h,
            actual_w: rgb.width(),
            actual_h: rgb.height(),
        });
    }

    let mut table = TileTable::new();
    let mut cells = Vec::with_capacity(geometry.width_tiles() * geometry.height_tiles());

    for tile_y in 0..geometry.height_tiles() {
        for tile_x in 0..geometry.width_tiles() {
            let mut pixels = [0u8; TILE_PIXELS];
            for y in 0..TILE_HEIGHT {
                for x in 0..TILE_WIDTH {
                    let px = rgb.get_pixel(
                        (tile_x * TILE_WIDTH + x) as u32,
                        (tile_y * TILE_HEIGHT + y) as u32,
                    );
                    let [r, g, b] = px.0;
                    let index = palette::input_index([r, g, b])
                        .ok_or(ImportError::UnsupportedColor(r, g, b))?;
                    pixels[y * TILE_WIDTH + x] = index;
                }
            }
            cells.push(table.intern(Tile::new(pixels)));
        }
    }

    Ok(ImportedImage {
        grid: TileGrid::from_cells(geometry.width_tiles(), geometry.height_tiles(), cells),
        table,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::INPUT_PALETTE;
    use crate::tile::BLANK_ID;
    use image::{Rgb, RgbImage};

    fn grey(index: u8) -> Rgb<u8> {
        Rgb(INPUT_PALETTE[index as usize])
    }

    /// 16x16 px image (2x2 tiles): one white tile top-left, rest black.
    fn two_by_two() -> DynamicImage {
        let mut img = RgbImage::from_pixel(16, 16, grey(0));
        for y in 0..8 {
            for x in 0..8 {
                img.put_pixel(x, y, grey(3));
            }
        }
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_import_builds_grid_and_table() {
        let geometry = Geometry::new(2, 2).unwrap();
        let imported = import_image(&two_by_two(), &geometry).unwrap();

        // Blank plus the one solid-white tile.
        assert_eq!(imported.table.len(), 2);
        assert_eq!(imported.grid.cells(), &[1, BLANK_ID, BLANK_ID, BLANK_ID]);
        assert_eq!(imported.table.get(1).pixel(0, 0), 3);
    }

    #[test]
    fn test_import_rejects_wrong_size() {
        let geometry = Geometry::new(3, 2).unwrap();
        let err = import_image(&two_by_two(), &geometry).unwrap_err();
        assert!(matches!(err, ImportError::WrongSize { .. }));
    }

    #[test]
    fn test_import_rejects_unsupported_colour() {
        let geometry = Geometry::new(1, 1).unwrap();
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([1, 2, 3])));
        let err = import_image(&img, &geometry).unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedColor(1, 2, 3)));
    }

    #[test]
    fn test_duplicate_tiles_share_an_id() {
        let geometry = Geometry::new(2, 1).unwrap();
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 8, grey(2)));
        let imported = import_image(&img, &geometry).unwrap();
        assert_eq!(imported.table.len(), 2);
        assert_eq!(imported.grid.cells(), &[1, 1]);
    }
}
