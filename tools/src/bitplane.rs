//! # Tile bitplanes
//!
//! An 8x8 tile is stored one bitplane per byte, one byte per row, with the
//! leftmost pixel in the most significant bit. Planes are interleaved in
//! pairs:
//!
//! | Bytes   | 2bpp              | 4bpp                          |
//! |---------|-------------------|-------------------------------|
//! | 0-15    | row r: bp0, bp1   | row r: bp0, bp1               |
//! | 16-31   |                   | row r: bp2, bp3               |

use std::fmt;

use anyhow::bail;

pub const TILE_SIZE: usize = 8;
pub const TILE_PIXELS: usize = TILE_SIZE * TILE_SIZE;

/// Palette indices of one tile, row-major.
pub type TilePixels = [u8; TILE_PIXELS];

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Bpp {
    Two,
    Four,
}

impl Bpp {
    pub fn bits(self) -> u8 {
        match self {
            Bpp::Two => 2,
            Bpp::Four => 4,
        }
    }

    /// Colors one tile can index.
    pub fn max_colors(self) -> usize {
        1 << self.bits()
    }

    /// Encoded size of one tile.
    pub fn tile_bytes(self) -> usize {
        TILE_SIZE * self.bits() as usize
    }
}

impl fmt::Display for Bpp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

impl TryFrom<u32> for Bpp {
    type Error = anyhow::Error;

    fn try_from(bits: u32) -> anyhow::Result<Self> {
        match bits {
            2 => Ok(Bpp::Two),
            4 => Ok(Bpp::Four),
            _ => bail!("BPP must be 2 or 4"),
        }
    }
}

/// Encode one tile. Index bits above the depth are ignored.
pub fn encode_tile(pixels: &TilePixels, bpp: Bpp) -> Vec<u8> {
    let mut out = vec![0u8; bpp.tile_bytes()];
    for row in 0..TILE_SIZE {
        let line = &pixels[row * TILE_SIZE..(row + 1) * TILE_SIZE];
        for plane in 0..bpp.bits() as usize {
            let byte = line
                .iter()
                .fold(0u8, |acc, &px| acc << 1 | (px >> plane) & 1);
            out[plane_offset(row, plane)] = byte;
        }
    }
    out
}

/// Inverse of [`encode_tile`]. `data` must hold at least one tile.
pub fn decode_tile(data: &[u8], bpp: Bpp) -> TilePixels {
    let mut pixels = [0u8; TILE_PIXELS];
    for row in 0..TILE_SIZE {
        for plane in 0..bpp.bits() as usize {
            let byte = data[plane_offset(row, plane)];
            for col in 0..TILE_SIZE {
                let bit = (byte >> (7 - col)) & 1;
                pixels[row * TILE_SIZE + col] |= bit << plane;
            }
        }
    }
    pixels
}

fn plane_offset(row: usize, plane: usize) -> usize {
    (plane / 2) * 16 + row * 2 + (plane & 1)
}
