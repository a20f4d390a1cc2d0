//! # Image loading
//!
//! Everything comes out as an [`IndexedImage`]. Palette-based BMPs are read
//! with `tinybmp` so the artist's color order survives; anything else goes
//! through `image`, is flattened to RGB and indexed with
//! [`build_palette`](crate::palette::build_palette).

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use embedded_graphics::pixelcolor::RgbColor;
use tinybmp::RawBmp;
use tracing::debug;

use crate::color::Rgb;
use crate::palette::{build_palette, compact_indexed, Palette};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedImage {
    pub width: usize,
    pub height: usize,
    /// One palette index per pixel, row-major.
    pub pixels: Vec<u8>,
    pub palette: Palette,
}

impl IndexedImage {
    pub fn index_at(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * self.width + x]
    }
}

/// Case-insensitive `.bmp` extension check.
pub fn is_bmp(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("bmp"))
}

/// Load `path` and index it against at most `max_colors` colors.
pub fn load_indexed(path: &Path, max_colors: usize) -> Result<IndexedImage> {
    if is_bmp(path) {
        let bytes = std::fs::read(path).with_context(|| format!("Cannot load '{}'", path.display()))?;
        if let Some(image) = decode_indexed_bmp(&bytes, max_colors)
            .with_context(|| format!("Cannot decode BMP '{}'", path.display()))?
        {
            return Ok(image);
        }
    }

    let rgb = image::open(path)
        .with_context(|| format!("Cannot load '{}'", path.display()))?
        .to_rgb8();
    let (width, height) = (rgb.width() as usize, rgb.height() as usize);
    debug!("RGB input: {}x{}", width, height);

    let pixels: Vec<Rgb> = rgb.pixels().map(|p| Rgb::from(p.0)).collect();
    index_rgb(&pixels, width, height, max_colors)
}

/// Index true-color pixels.
pub fn index_rgb(pixels: &[Rgb], width: usize, height: usize, max_colors: usize) -> Result<IndexedImage> {
    let (palette, pixels) = build_palette(pixels, max_colors)?;
    Ok(IndexedImage {
        width,
        height,
        pixels,
        palette,
    })
}

/// Decode a BMP that has a color table. `Ok(None)` for true-color BMPs,
/// which the caller hands to `image` instead.
pub fn decode_indexed_bmp(bytes: &[u8], max_colors: usize) -> Result<Option<IndexedImage>> {
    let bmp = RawBmp::from_slice(bytes).map_err(|e| anyhow!("{:?}", e))?;
    let Some(table) = bmp.color_table() else {
        return Ok(None);
    };

    let size = bmp.header().image_size;
    let (width, height) = (size.width as usize, size.height as usize);

    let table: Vec<Rgb> = (0..table.len() as u32)
        .filter_map(|i| table.get(i))
        .map(|c| Rgb::new(c.r(), c.g(), c.b()))
        .collect();

    let mut indices = vec![0u8; width * height];
    for px in bmp.pixels() {
        let (x, y) = (px.position.x as usize, px.position.y as usize);
        if x < width && y < height {
            indices[y * width + x] = px.color as u8;
        }
    }

    let (palette, pixels) = compact_indexed(&indices, &table, max_colors)?;
    debug!(
        "BMP input: {}x{}, {} colors used (from {} palette entries)",
        width,
        height,
        palette.len(),
        table.len()
    );

    Ok(Some(IndexedImage {
        width,
        height,
        pixels,
        palette,
    }))
}
