//! # Font sheets
//!
//! A font is the 96 printable ASCII characters (32-127) drawn as 8x8 cells
//! in any grid with 96 cells: 16x6 (128x48 pixels) is the usual layout,
//! 96x1 also works. Cells are read row by row.
//!
//! Pixel values become palette indices directly:
//!
//! | Source         | Index                                   |
//! |----------------|-----------------------------------------|
//! | grayscale      | the gray value, which must fit the depth |
//! | RGB            | `(r+g+b)/3` divided by 64 (2bpp) or 16 (4bpp) |
//!
//! The palette is always a gray ramp from black to white.

use std::path::Path;

use anyhow::{bail, Context, Result};
use image::DynamicImage;
use tracing::debug;

use crate::bitplane::{encode_tile, Bpp, TILE_PIXELS, TILE_SIZE};
use crate::color::Rgb;
use crate::output::TileData;

pub const FONT_CHARS: usize = 96;
pub const FIRST_CHAR: u8 = b' ';

/// Gray ramp: `i*255/3` for 2bpp, `i*255/15` for 4bpp.
pub fn grayscale_ramp(bpp: Bpp) -> Vec<u16> {
    let steps = bpp.max_colors() - 1;
    (0..=steps)
        .map(|i| Rgb::gray((i * 255 / steps) as u8).to_bgr555())
        .collect()
}

/// Pixel indices of a decoded font image.
#[derive(Debug, Clone)]
pub struct FontImage {
    pub width: usize,
    pub height: usize,
    pub indices: Vec<u8>,
}

impl FontImage {
    /// Map pixels to indices per the table above.
    pub fn from_image(image: &DynamicImage, bpp: Bpp) -> Result<FontImage> {
        let (width, height) = (image.width() as usize, image.height() as usize);
        let max = bpp.max_colors() as u8 - 1;

        let indices = if image.color().has_color() {
            let divisor = 256 / bpp.max_colors() as u32;
            image
                .to_rgb8()
                .pixels()
                .map(|p| {
                    let [r, g, b] = p.0;
                    let brightness = (r as u32 + g as u32 + b as u32) / 3;
                    (brightness / divisor) as u8
                })
                .collect()
        } else {
            let gray = image.to_luma8();
            if let Some((i, p)) = gray.pixels().enumerate().find(|(_, p)| p.0[0] > max) {
                bail!(
                    "Gray level {} at ({}, {}) is outside the {} levels of {}bpp",
                    p.0[0],
                    i % width,
                    i / width,
                    max as u32 + 1,
                    bpp
                );
            }
            gray.pixels().map(|p| p.0[0]).collect()
        };

        Ok(FontImage {
            width,
            height,
            indices,
        })
    }
}

/// Check the layout and encode the 96 characters.
pub fn convert_font(font: &FontImage, bpp: Bpp) -> Result<TileData> {
    let (w, h) = (font.width, font.height);
    if w % TILE_SIZE != 0 || h % TILE_SIZE != 0 {
        bail!("Image dimensions must be multiples of {} (got {}x{})", TILE_SIZE, w, h);
    }
    let cols = w / TILE_SIZE;
    let rows = h / TILE_SIZE;
    if cols * rows != FONT_CHARS {
        bail!(
            "Image must contain exactly {} characters, got {}x{} = {} chars per row x {} rows = {} chars \
             (supported layouts: 128x48, 768x8, or any {}-char grid)",
            FONT_CHARS,
            w,
            h,
            cols,
            rows,
            cols * rows,
            FONT_CHARS
        );
    }
    debug!("Layout: {} cols x {} rows of 8x8 characters", cols, rows);

    let mut tiles = Vec::with_capacity(FONT_CHARS * bpp.tile_bytes());
    for ch in 0..FONT_CHARS {
        let (bx, by) = ((ch % cols) * TILE_SIZE, (ch / cols) * TILE_SIZE);
        let mut cell = [0u8; TILE_PIXELS];
        for row in 0..TILE_SIZE {
            let src = (by + row) * w + bx;
            cell[row * TILE_SIZE..(row + 1) * TILE_SIZE].copy_from_slice(&font.indices[src..src + TILE_SIZE]);
        }
        tiles.extend(encode_tile(&cell, bpp));
    }

    Ok(TileData {
        tiles,
        tile_size: bpp.tile_bytes(),
        palette: grayscale_ramp(bpp),
    })
}

pub fn convert_font_file(path: &Path, bpp: Bpp) -> Result<TileData> {
    let image = image::open(path).with_context(|| format!("Failed to load {}", path.display()))?;
    debug!("Image: {}x{}, {:?}", image.width(), image.height(), image.color());
    convert_font(&FontImage::from_image(&image, bpp)?, bpp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitplane::decode_tile;
    use image::{GrayImage, Luma, Rgb as Pixel, RgbImage};
    use pretty_assertions::assert_eq;

    #[test]
    fn ramps() {
        assert_eq!(grayscale_ramp(Bpp::Two), vec![0x0000, 0x294A, 0x56B5, 0x7FFF]);
        let four = grayscale_ramp(Bpp::Four);
        assert_eq!(four.len(), 16);
        assert_eq!(four[1], Rgb::gray(17).to_bgr555());
        assert_eq!(four[15], 0x7FFF);
    }

    #[test]
    fn characters_in_grid_order() {
        // character n has its top-left pixel set to n % 4
        let img = GrayImage::from_fn(128, 48, |x, y| {
            let ch = (y / 8) * 16 + x / 8;
            Luma([if x % 8 == 0 && y % 8 == 0 { (ch % 4) as u8 } else { 0 }])
        });
        let font = FontImage::from_image(&DynamicImage::ImageLuma8(img), Bpp::Two).unwrap();
        let data = convert_font(&font, Bpp::Two).unwrap();
        assert_eq!(data.tiles.len(), 1536);
        assert_eq!(data.tile_count(), FONT_CHARS);
        for ch in [0usize, 1, 17, 33, 95] {
            let cell = decode_tile(&data.tiles[ch * 16..], Bpp::Two);
            assert_eq!(cell[0], (ch % 4) as u8, "char {}", ch);
        }
    }

    #[test]
    fn single_row_layout() {
        let img = GrayImage::from_pixel(768, 8, Luma([1]));
        let font = FontImage::from_image(&DynamicImage::ImageLuma8(img), Bpp::Four).unwrap();
        let data = convert_font(&font, Bpp::Four).unwrap();
        assert_eq!(data.tiles.len(), 96 * 32);
        assert_eq!(data.palette.len(), 16);
    }

    #[test]
    fn rgb_brightness_quantized() {
        let img = RgbImage::from_fn(128, 48, |x, _| match x % 4 {
            0 => Pixel([0, 0, 0]),
            1 => Pixel([90, 60, 30]),
            2 => Pixel([255, 255, 0]),
            _ => Pixel([255, 255, 255]),
        });
        let img = DynamicImage::ImageRgb8(img);
        let two = FontImage::from_image(&img, Bpp::Two).unwrap();
        assert_eq!(&two.indices[..4], &[0, 0, 2, 3]);
        let four = FontImage::from_image(&img, Bpp::Four).unwrap();
        assert_eq!(&four.indices[..4], &[0, 3, 10, 15]);
    }

    #[test]
    fn gray_levels_must_fit() {
        let img = GrayImage::from_pixel(128, 48, Luma([200]));
        let err = FontImage::from_image(&DynamicImage::ImageLuma8(img), Bpp::Two).unwrap_err();
        assert!(err.to_string().contains("Gray level 200"));
    }

    #[test]
    fn wrong_layouts_fail() {
        let font = FontImage {
            width: 128,
            height: 40,
            indices: vec![0; 128 * 40],
        };
        assert!(convert_font(&font, Bpp::Two).is_err());
        let font = FontImage {
            width: 130,
            height: 48,
            indices: vec![0; 130 * 48],
        };
        assert!(convert_font(&font, Bpp::Two).is_err());
    }
}
