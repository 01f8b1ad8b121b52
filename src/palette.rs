//! Palette handling - the fixed 4-grey input palette a source image must
//! use, and the 4-entry NES output palette the data is written with.

use thiserror::Error;

/// The greyscale palette a quantized source image is allowed to use, in
/// palette-index order.
pub const INPUT_PALETTE: [[u8; 3]; 4] = [
    [0x00, 0x00, 0x00],
    [0x55, 0x55, 0x55],
    [0xaa, 0xaa, 0xaa],
    [0xff, 0xff, 0xff],
];

/// Largest valid NES master-palette colour id.
pub const MAX_NES_COLOR: u8 = 0x3f;

/// Error type for output palette failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaletteError {
    #[error("expected 4 output colours, got {0}")]
    WrongCount(usize),
    #[error("invalid hexadecimal colour '{0}'")]
    InvalidHex(String),
    #[error("colour {0:#04x} is outside the NES range 00-3f")]
    OutOfRange(u8),
}

/// Map an RGB value to its input palette index, or `None` for colours the
/// converter does not support.
pub fn input_index(rgb: [u8; 3]) -> Option<u8> {
    INPUT_PALETTE
        .iter()
        .position(|&entry| entry == rgb)
        .map(|i| i as u8)
}

/// Four NES master-palette colour ids, one per 2-bit pixel value. Entry 0
/// doubles as the backdrop colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputPalette {
    colors: [u8; 4],
}

impl OutputPalette {
    /// Build a palette from colour ids, each in 0x00-0x3f.
    pub fn new(colors: [u8; 4]) -> Result<Self, PaletteError> {
        for &color in &colors {
            if color > MAX_NES_COLOR {
                return Err(PaletteError::OutOfRange(color));
            }
        }
        Ok(OutputPalette { colors })
    }

    /// Parse colours given as hexadecimal strings, e.g. `["0f", "00", "10",
    /// "30"]`.
    pub fn parse(values: &[String]) -> Result<Self, PaletteError> {
        if values.len() != 4 {
            return Err(PaletteError::WrongCount(values.len()));
        }
        let mut colors = [0u8; 4];
        for (slot, value) in colors.iter_mut().zip(values) {
            *slot = u8::from_str_radix(value, 16)
                .map_err(|_| PaletteError::InvalidHex(value.clone()))?;
        }
        OutputPalette::new(colors)
    }

    pub fn colors(&self) -> [u8; 4] {
        self.colors
    }

    /// The universal background colour.
    pub fn backdrop(&self) -> u8 {
        self.colors[0]
    }
}

impl Default for OutputPalette {
    /// Black, dark grey, light grey, white.
    fn default() -> Self {
        OutputPalette {
            colors: [0x0f, 0x00, 0x10, 0x30],
        }
    }
}
