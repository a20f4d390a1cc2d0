//! OpenSNES asset tools
//!
//! Shared conversion code behind the command-line tools:
//! - gfx2snes: PNG/BMP images to SNES tiles and a BGR555 palette
//! - font2snes: 96-character font sheets to SNES tiles
//!
//! The pipeline is the same for both: index the pixels against a palette,
//! lay the image out the way VRAM expects it, cut it into 8x8 tiles and
//! encode each tile into bitplanes. The result is written either as raw
//! `.pic`/`.pal` files or as a C header.

pub mod bitplane;
pub mod color;
pub mod font;
pub mod gfx;
pub mod output;
pub mod palette;
pub mod raster;
pub mod vram;

pub use bitplane::Bpp;
pub use color::Rgb;
pub use palette::Palette;

use tracing::Level;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the compact stderr subscriber. Warnings only unless `verbose`.
pub fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .compact()
        .finish()
        .init();
}
