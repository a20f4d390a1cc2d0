//! # Image to tiles
//!
//! The gfx2snes pipeline: index the image, reorganize it onto the 128-pixel
//! VRAM sheet in `block_size` squares, then encode every sheet tile.
//!
//! ```ignore
//! let opts = ConvertOptions { bpp: Bpp::Four, block_size: 16 };
//! let data = gfx::convert_file(Path::new("hero.png"), &opts)?;
//! data.save_c_header(Path::new("hero.h"), "gfx2snes", "hero")?;
//! ```

use std::path::Path;

use anyhow::Result;
use tracing::debug;

use crate::bitplane::{encode_tile, Bpp};
use crate::output::TileData;
use crate::raster::{load_indexed, IndexedImage};
use crate::vram::{reorganize_for_vram, VRAM_WIDTH};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    pub bpp: Bpp,
    /// Sprite/block edge in pixels: 8, 16 or 32.
    pub block_size: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            bpp: Bpp::Four,
            block_size: 8,
        }
    }
}

pub fn convert_file(path: &Path, opts: &ConvertOptions) -> Result<TileData> {
    let image = load_indexed(path, opts.bpp.max_colors())?;
    debug!(
        "Input: {}x{}, block size {}, {}bpp",
        image.width, image.height, opts.block_size, opts.bpp
    );
    convert(&image, opts)
}

pub fn convert(image: &IndexedImage, opts: &ConvertOptions) -> Result<TileData> {
    let sheet = reorganize_for_vram(&image.pixels, image.width, image.height, opts.block_size)?;
    let tiles = sheet.tiles();
    debug!(
        "Output: {} tiles ({}x{} grid)",
        tiles.len(),
        VRAM_WIDTH / 8,
        sheet.height / 8
    );

    Ok(TileData {
        tiles: tiles.iter().flat_map(|t| encode_tile(t, opts.bpp)).collect(),
        tile_size: opts.bpp.tile_bytes(),
        palette: image.palette.to_bgr555(),
    })
}
