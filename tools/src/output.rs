//! # Output formats
//!
//! - binary: raw tile bytes (`.pic`) and little-endian BGR555 words (`.pal`),
//!   ready to DMA into VRAM and CGRAM
//! - C header: the same data as `NAME_pal[]` and `NAME_tiles[]` arrays plus
//!   count/size defines

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Encoded tiles and their palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileData {
    pub tiles: Vec<u8>,
    /// Bytes per tile: 16 (2bpp) or 32 (4bpp).
    pub tile_size: usize,
    pub palette: Vec<u16>,
}

impl TileData {
    pub fn tile_count(&self) -> usize {
        if self.tile_size == 0 {
            0
        } else {
            self.tiles.len() / self.tile_size
        }
    }

    pub fn palette_bytes(&self) -> Vec<u8> {
        self.palette.iter().flat_map(|c| c.to_le_bytes()).collect()
    }

    /// Header text; `generator` names the tool in the banner comment.
    pub fn write_c_header<W: Write>(&self, w: &mut W, generator: &str, name: &str) -> io::Result<()> {
        writeln!(w, "/* Generated by {} */\n", generator)?;
        writeln!(w, "#ifndef {}_H", name)?;
        writeln!(w, "#define {}_H\n", name)?;

        let count = self.palette.len();
        writeln!(w, "/* Palette: {} colors */", count)?;
        write!(w, "const unsigned short {}_pal[{}] = {{\n    ", name, count)?;
        for (i, color) in self.palette.iter().enumerate() {
            write!(w, "0x{:04X}", color)?;
            let last = i + 1 == count;
            if !last {
                write!(w, ", ")?;
                if (i + 1) % 8 == 0 {
                    write!(w, "\n    ")?;
                }
            }
        }
        write!(w, "\n}};\n\n")?;

        let tile_count = self.tile_count();
        writeln!(w, "/* Tiles: {} tiles, {} bytes each */", tile_count, self.tile_size)?;
        writeln!(w, "const unsigned char {}_tiles[{}] = {{", name, self.tiles.len())?;
        for (t, tile) in self.tiles.chunks(self.tile_size.max(1)).enumerate() {
            write!(w, "    /* Tile {} */\n    ", t)?;
            for (b, byte) in tile.iter().enumerate() {
                write!(w, "0x{:02X}", byte)?;
                let last_in_tile = b + 1 == tile.len();
                if t + 1 < tile_count || !last_in_tile {
                    write!(w, ",")?;
                }
                if (b + 1) % 16 == 0 && !last_in_tile {
                    write!(w, "\n    ")?;
                }
            }
            writeln!(w)?;
        }
        writeln!(w, "}};\n")?;

        writeln!(w, "#define {}_TILES_COUNT {}", name, tile_count)?;
        writeln!(w, "#define {}_TILES_SIZE {}", name, self.tiles.len())?;
        writeln!(w, "#define {}_PAL_COUNT {}\n", name, count)?;
        writeln!(w, "#endif /* {}_H */", name)
    }

    pub fn c_header(&self, generator: &str, name: &str) -> String {
        let mut out = Vec::new();
        // writing into a Vec cannot fail
        let _ = self.write_c_header(&mut out, generator, name);
        String::from_utf8_lossy(&out).into_owned()
    }

    pub fn save_c_header(&self, path: &Path, generator: &str, name: &str) -> Result<()> {
        fs::write(path, self.c_header(generator, name))
            .with_context(|| format!("Cannot create '{}'", path.display()))
    }

    pub fn save_tiles(&self, path: &Path) -> Result<()> {
        fs::write(path, &self.tiles).with_context(|| format!("Cannot create '{}'", path.display()))
    }

    pub fn save_palette(&self, path: &Path) -> Result<()> {
        fs::write(path, self.palette_bytes()).with_context(|| format!("Cannot create '{}'", path.display()))
    }
}

/// `out.pic` and `out.pal` both become `out`; other extensions are kept.
pub fn binary_base(output: &Path) -> PathBuf {
    match output.extension().and_then(|e| e.to_str()) {
        Some("pic") | Some("pal") => output.with_extension(""),
        _ => output.to_path_buf(),
    }
}

/// `base` with `.suffix` appended, keeping any extension already there.
pub fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// C identifier from a file stem: anything but ASCII letters and digits
/// becomes `_`.
pub fn sanitize_name(stem: &str) -> String {
    stem.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Sanitized file stem of `path`, `data` if it has none.
pub fn name_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(sanitize_name)
        .unwrap_or_else(|| "data".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn header_layout() {
        let data = TileData {
            tiles: (0..32).collect(),
            tile_size: 16,
            palette: (0..9).map(|i| i * 0x0421).collect(),
        };
        let expected = "\
/* Generated by gfx2snes */

#ifndef demo_H
#define demo_H

/* Palette: 9 colors */
const unsigned short demo_pal[9] = {
    0x0000, 0x0421, 0x0842, 0x0C63, 0x1084, 0x14A5, 0x18C6, 0x1CE7,\x20
    0x2108
};

/* Tiles: 2 tiles, 16 bytes each */
const unsigned char demo_tiles[32] = {
    /* Tile 0 */
    0x00,0x01,0x02,0x03,0x04,0x05,0x06,0x07,0x08,0x09,0x0A,0x0B,0x0C,0x0D,0x0E,0x0F,
    /* Tile 1 */
    0x10,0x11,0x12,0x13,0x14,0x15,0x16,0x17,0x18,0x19,0x1A,0x1B,0x1C,0x1D,0x1E,0x1F
};

#define demo_TILES_COUNT 2
#define demo_TILES_SIZE 32
#define demo_PAL_COUNT 9

#endif /* demo_H */
";
        assert_eq!(data.c_header("gfx2snes", "demo"), expected);
    }

    #[test]
    fn long_tiles_wrap_every_16_bytes() {
        let data = TileData {
            tiles: vec![0xAB; 32],
            tile_size: 32,
            palette: vec![0x7FFF],
        };
        let header = data.c_header("font2snes", "f");
        assert!(header.starts_with("/* Generated by font2snes */"));
        assert!(header.contains("const unsigned short f_pal[1] = {\n    0x7FFF\n};"));
        let row = ["0xAB"; 16].join(",");
        assert!(header.contains(&format!("    {},\n    {}\n}};", row, row)));
    }

    #[test]
    fn names_and_paths() {
        assert_eq!(name_from_path(Path::new("gfx/hero-sprite.v2.png")), "hero_sprite_v2");
        assert_eq!(sanitize_name("font"), "font");
        assert_eq!(binary_base(Path::new("out/hero.pic")), PathBuf::from("out/hero"));
        assert_eq!(binary_base(Path::new("out/hero.pal")), PathBuf::from("out/hero"));
        assert_eq!(binary_base(Path::new("out/hero.bin")), PathBuf::from("out/hero.bin"));
        assert_eq!(with_suffix(Path::new("out/hero"), "pic"), PathBuf::from("out/hero.pic"));
    }

    #[test]
    fn palette_file_is_little_endian() {
        let data = TileData {
            tiles: vec![],
            tile_size: 16,
            palette: vec![0x7C00, 0x001F],
        };
        assert_eq!(data.palette_bytes(), vec![0x00, 0x7C, 0x1F, 0x00]);
        assert_eq!(data.tile_count(), 0);
    }
}
