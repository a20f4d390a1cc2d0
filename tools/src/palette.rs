//! # Palettes
//!
//! Two ways to get from pixels to palette indices:
//!
//! - [`build_palette`] scans true-color pixels in order, starting with the
//!   first pixel so that it becomes color 0 (transparent). A pixel joins an
//!   existing entry when it is within [`MATCH_DISTANCE`] of it.
//! - [`compact_indexed`] keeps the palette of an already indexed image but
//!   drops unused entries, so a 256-entry BMP table using four colors fits
//!   2bpp.
//!
//! [`MATCH_DISTANCE`]: crate::color::MATCH_DISTANCE

use anyhow::{bail, Result};

use crate::color::Rgb;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_colors(colors: Vec<Rgb>) -> Self {
        Self { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// First entry close enough to `color`.
    pub fn find(&self, color: Rgb) -> Option<u8> {
        self.colors
            .iter()
            .position(|c| c.matches(color))
            .map(|i| i as u8)
    }

    /// Index of `color`, adding it if there is room.
    pub fn add(&mut self, color: Rgb, max_colors: usize) -> Option<u8> {
        if let Some(index) = self.find(color) {
            return Some(index);
        }
        if self.colors.len() >= max_colors {
            return None;
        }
        self.colors.push(color);
        Some((self.colors.len() - 1) as u8)
    }

    pub fn to_bgr555(&self) -> Vec<u16> {
        self.colors.iter().map(|c| c.to_bgr555()).collect()
    }

    /// CGRAM image: little-endian BGR555 words.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.to_bgr555()
            .into_iter()
            .flat_map(u16::to_le_bytes)
            .collect()
    }
}

/// Palette plus one index per pixel.
pub fn build_palette(pixels: &[Rgb], max_colors: usize) -> Result<(Palette, Vec<u8>)> {
    let mut palette = Palette::new();
    let mut indices = Vec::with_capacity(pixels.len());
    for &px in pixels {
        match palette.add(px, max_colors) {
            Some(index) => indices.push(index),
            None => bail!("Image has more than {} colors", max_colors),
        }
    }
    Ok((palette, indices))
}

/// Keep only the entries of `table` that `indices` use, in table order,
/// and remap the pixels onto the compacted palette.
pub fn compact_indexed(indices: &[u8], table: &[Rgb], max_colors: usize) -> Result<(Palette, Vec<u8>)> {
    let mut used = [false; 256];
    for &i in indices {
        used[i as usize] = true;
    }

    let mut remap = [0u8; 256];
    let mut colors = Vec::new();
    for (i, &color) in table.iter().enumerate().take(256) {
        if !used[i] {
            continue;
        }
        if colors.len() >= max_colors {
            bail!("Image uses more than {} palette entries", max_colors);
        }
        remap[i] = colors.len() as u8;
        colors.push(color);
    }

    if let Some(&bad) = indices.iter().find(|&&i| i as usize >= table.len()) {
        bail!("Pixel index {} is outside the {}-entry palette", bad, table.len());
    }

    let pixels = indices.iter().map(|&i| remap[i as usize]).collect();
    Ok((Palette::from_colors(colors), pixels))
}
