//! # VRAM layout
//!
//! VRAM tile viewers and the OBJ name table treat character data as a sheet
//! 16 tiles (128 pixels) wide. A 16x16 sprite is tiles `n`, `n+1`, `n+16`
//! and `n+17`, so its four tiles must sit in a square on that sheet rather
//! than follow each other.
//!
//! [`reorganize_for_vram`] copies the source image block by block onto a
//! 128-pixel-wide sheet, wrapping when a row of blocks is full. Tiles are
//! then read off the sheet left to right, top to bottom.

use anyhow::{bail, Result};
use tracing::debug;

use crate::bitplane::{TilePixels, TILE_PIXELS, TILE_SIZE};

pub const VRAM_WIDTH: usize = 128;

/// Sprite/block sizes the sheet layout supports.
pub const BLOCK_SIZES: [usize; 3] = [8, 16, 32];

/// An index image `VRAM_WIDTH` pixels wide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub height: usize,
    pub pixels: Vec<u8>,
}

pub fn reorganize_for_vram(pixels: &[u8], width: usize, height: usize, block: usize) -> Result<Sheet> {
    if !BLOCK_SIZES.contains(&block) {
        bail!("Block size must be 8, 16, or 32");
    }
    if width % block != 0 || height % block != 0 {
        bail!(
            "Image dimensions ({}x{}) must be multiple of block size ({})",
            width,
            height,
            block
        );
    }
    if pixels.len() < width * height {
        bail!("Image data is shorter than {}x{}", width, height);
    }

    let blocks_x = width / block;
    let blocks_y = height / block;
    let total_blocks = blocks_x * blocks_y;
    let blocks_per_row = VRAM_WIDTH / block;
    let rows = total_blocks.div_ceil(blocks_per_row);
    let sheet_height = rows * block;

    debug!(
        "Reorganizing: {}x{} -> {}x{} ({} blocks)",
        width, height, VRAM_WIDTH, sheet_height, total_blocks
    );

    let mut sheet = vec![0u8; VRAM_WIDTH * sheet_height];
    for n in 0..total_blocks {
        let (bx, by) = (n % blocks_x, n / blocks_x);
        let (dx, dy) = ((n % blocks_per_row) * block, (n / blocks_per_row) * block);
        for line in 0..block {
            let src = (by * block + line) * width + bx * block;
            let dst = (dy + line) * VRAM_WIDTH + dx;
            sheet[dst..dst + block].copy_from_slice(&pixels[src..src + block]);
        }
    }

    Ok(Sheet {
        height: sheet_height,
        pixels: sheet,
    })
}

/// Cut an index image into 8x8 tiles, row-major. `width` and `height` must
/// be multiples of 8.
pub fn extract_tiles(pixels: &[u8], width: usize, height: usize) -> Vec<TilePixels> {
    let tiles_x = width / TILE_SIZE;
    let tiles_y = height / TILE_SIZE;
    let mut tiles = Vec::with_capacity(tiles_x * tiles_y);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let mut tile = [0u8; TILE_PIXELS];
            for py in 0..TILE_SIZE {
                let src = (ty * TILE_SIZE + py) * width + tx * TILE_SIZE;
                tile[py * TILE_SIZE..(py + 1) * TILE_SIZE].copy_from_slice(&pixels[src..src + TILE_SIZE]);
            }
            tiles.push(tile);
        }
    }
    tiles
}

impl Sheet {
    pub fn tiles(&self) -> Vec<TilePixels> {
        extract_tiles(&self.pixels, VRAM_WIDTH, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Every pixel of block `n` holds `n`.
    fn blocks(width: usize, height: usize, block: usize) -> Vec<u8> {
        let per_row = width / block;
        (0..width * height)
            .map(|i| {
                let (x, y) = (i % width, i / width);
                (y / block * per_row + x / block) as u8
            })
            .collect()
    }

    #[test]
    fn wide_strip_wraps_at_128() {
        // 256x16 of 16x16 sprites: 16 blocks, 8 per sheet row
        let src = blocks(256, 16, 16);
        let sheet = reorganize_for_vram(&src, 256, 16, 16).unwrap();
        assert_eq!(sheet.height, 32);
        assert_eq!(sheet.pixels[0], 0);
        assert_eq!(sheet.pixels[127], 7);
        assert_eq!(sheet.pixels[16 * VRAM_WIDTH], 8);
        assert_eq!(sheet.pixels[31 * VRAM_WIDTH + 127], 15);
    }

    #[test]
    fn sprite_tiles_land_in_a_square() {
        let src = blocks(32, 16, 16);
        let tiles = reorganize_for_vram(&src, 32, 16, 16).unwrap().tiles();
        assert_eq!(tiles.len(), 32);
        // sprite 0 is tiles 0, 1, 16, 17; sprite 1 is 2, 3, 18, 19
        for t in [0, 1, 16, 17] {
            assert!(tiles[t].iter().all(|&p| p == 0));
        }
        for t in [2, 3, 18, 19] {
            assert!(tiles[t].iter().all(|&p| p == 1));
        }
    }

    #[test]
    fn every_pixel_is_kept() {
        let src: Vec<u8> = (0..24 * 40).map(|i| (i % 251) as u8).collect();
        let sheet = reorganize_for_vram(&src, 24, 40, 8).unwrap();
        assert_eq!(sheet.height, 8);
        // 15 blocks fill x 0..120 of the single sheet row
        let mut a = src.clone();
        let mut b: Vec<u8> = sheet.pixels.chunks(VRAM_WIDTH).flat_map(|row| row[..120].to_vec()).collect();
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
    }

    #[test]
    fn padding_is_zero() {
        let src = vec![5u8; 8 * 8];
        let sheet = reorganize_for_vram(&src, 8, 8, 8).unwrap();
        assert_eq!(sheet.pixels.len(), VRAM_WIDTH * 8);
        assert_eq!(sheet.pixels.iter().filter(|&&p| p == 5).count(), 64);
    }

    #[test]
    fn dimensions_must_fit_blocks() {
        assert!(reorganize_for_vram(&[0; 24 * 16], 24, 16, 16).is_err());
        assert!(reorganize_for_vram(&[0; 64], 8, 8, 12).is_err());
    }

    #[test]
    fn tiles_are_row_major() {
        let src: Vec<u8> = (0..16 * 16).map(|i| ((i % 16) / 8 + (i / 16) / 8 * 2) as u8).collect();
        let tiles = extract_tiles(&src, 16, 16);
        let firsts: Vec<u8> = tiles.iter().map(|t| t[0]).collect();
        assert_eq!(firsts, vec![0, 1, 2, 3]);
    }
}
