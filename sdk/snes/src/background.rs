//! # Backgrounds
//!
//! Up to four tile layers, depending on the BG mode. Each layer needs a
//! tilemap (`BGnSC`), a tile data base (`BG12NBA`/`BG34NBA`) and a scroll
//! position. All of those registers are write-only, so [`Backgrounds`] keeps
//! shadows you can read back.
//!
//! ```ignore
//! let mut bgs = Backgrounds::new();
//! bgs.set_mode(&mut bus, 1, true);
//! bgs.init_tileset(&mut bus, BgLayer::Bg1, TILES, TILES_LEN, PAL, 16, 0, ColorDepth::Colors16, 0x0000);
//! bgs.set_map(&mut bus, BgLayer::Bg1, 0x6800, MapSize::Map32x32);
//! bgs.enable(&mut bus, Layers::BG1);
//!
//! loop {
//!     console.wait_for_vblank(&mut bus);
//!     bgs.set_scroll_x(&mut bus, BgLayer::Bg1, bgs.scroll_x(BgLayer::Bg1) + 1);
//! }
//! ```

use crate::{dma, regs, scr::Layers, BgLayer, RegisterFile};

/// Tilemap dimensions in tiles (`BGnSC` bits 0-1).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum MapSize {
    Map32x32 = 0,
    Map64x32 = 1,
    Map32x64 = 2,
    Map64x64 = 3,
}

/// Tile color depth, which decides how CGRAM is split into palettes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColorDepth {
    /// 2bpp in modes 1-5.
    Colors4,
    /// 2bpp in mode 0, where each layer has its own 32-color bank.
    Colors4Mode0,
    Colors16,
    Colors256,
}

impl ColorDepth {
    /// First CGRAM color used by palette `entry`.
    pub fn palette_index(self, entry: u8) -> u8 {
        match self {
            ColorDepth::Colors4 | ColorDepth::Colors4Mode0 => entry.wrapping_mul(4),
            ColorDepth::Colors16 => entry.wrapping_mul(16),
            ColorDepth::Colors256 => 0,
        }
    }
}

/// BGR555 from 5-bit components.
#[inline]
pub const fn rgb(r: u8, g: u8, b: u8) -> u16 {
    ((b as u16 & 0x1F) << 10) | ((g as u16 & 0x1F) << 5) | (r as u16 & 0x1F)
}

/// BGR555 from 8-bit components.
#[inline]
pub const fn rgb24(r: u8, g: u8, b: u8) -> u16 {
    rgb(r >> 3, g >> 3, b >> 3)
}

/// Write one CGRAM color.
pub fn set_palette_color<R: RegisterFile>(bus: &mut R, index: u8, color: u16) {
    bus.write_byte(regs::CGADD, index);
    bus.write_byte(regs::CGDATA, color as u8);
    bus.write_byte(regs::CGDATA, (color >> 8) as u8);
}

/// Shadows of the background registers.
#[derive(Debug, Default, Clone)]
pub struct Backgrounds {
    scroll_x: [u16; 4],
    scroll_y: [u16; 4],
    bg12nba: u8,
    bg34nba: u8,
    bgmode: u8,
    main_screen: u8,
    sub_screen: u8,
}

impl Backgrounds {
    pub const fn new() -> Self {
        Self {
            scroll_x: [0; 4],
            scroll_y: [0; 4],
            bg12nba: 0,
            bg34nba: 0,
            bgmode: 0,
            main_screen: 0,
            sub_screen: 0,
        }
    }

    /// Reset `layer`'s scroll to the origin.
    pub fn init<R: RegisterFile>(&mut self, bus: &mut R, layer: BgLayer) {
        self.set_scroll(bus, layer, 0, 0);
    }

    /// BG mode 0-7; `bg3_priority` lifts BG3 above everything in mode 1.
    pub fn set_mode<R: RegisterFile>(&mut self, bus: &mut R, mode: u8, bg3_priority: bool) {
        self.bgmode = (mode & 0x07) | if bg3_priority { 0x08 } else { 0 };
        bus.write_byte(regs::BGMODE, self.bgmode);
    }

    pub fn mode(&self) -> u8 {
        self.bgmode & 0x07
    }

    pub fn set_scroll<R: RegisterFile>(&mut self, bus: &mut R, layer: BgLayer, x: u16, y: u16) {
        self.set_scroll_x(bus, layer, x);
        self.set_scroll_y(bus, layer, y);
    }

    pub fn set_scroll_x<R: RegisterFile>(&mut self, bus: &mut R, layer: BgLayer, x: u16) {
        self.scroll_x[layer.index()] = x;
        bus.write_twice(layer.hofs(), x);
    }

    pub fn set_scroll_y<R: RegisterFile>(&mut self, bus: &mut R, layer: BgLayer, y: u16) {
        self.scroll_y[layer.index()] = y;
        bus.write_twice(layer.vofs(), y);
    }

    pub fn scroll_x(&self, layer: BgLayer) -> u16 {
        self.scroll_x[layer.index()]
    }

    pub fn scroll_y(&self, layer: BgLayer) -> u16 {
        self.scroll_y[layer.index()]
    }

    /// Tilemap at VRAM word address `vram_addr` (2K-word aligned).
    pub fn set_map<R: RegisterFile>(&mut self, bus: &mut R, layer: BgLayer, vram_addr: u16, size: MapSize) {
        let value = ((vram_addr >> 8) as u8 & 0xFC) | size as u8;
        bus.write_byte(regs::BG1SC + layer.index() as u32, value);
    }

    /// Tile data at VRAM word address `vram_addr` (4K-word aligned).
    pub fn set_gfx<R: RegisterFile>(&mut self, bus: &mut R, layer: BgLayer, vram_addr: u16) {
        let nibble = ((vram_addr >> 12) & 0x0F) as u8;
        match layer {
            BgLayer::Bg1 => {
                self.bg12nba = (self.bg12nba & 0xF0) | nibble;
                bus.write_byte(regs::BG12NBA, self.bg12nba);
            }
            BgLayer::Bg2 => {
                self.bg12nba = (self.bg12nba & 0x0F) | (nibble << 4);
                bus.write_byte(regs::BG12NBA, self.bg12nba);
            }
            BgLayer::Bg3 => {
                self.bg34nba = (self.bg34nba & 0xF0) | nibble;
                bus.write_byte(regs::BG34NBA, self.bg34nba);
            }
            BgLayer::Bg4 => {
                self.bg34nba = (self.bg34nba & 0x0F) | (nibble << 4);
                bus.write_byte(regs::BG34NBA, self.bg34nba);
            }
        }
    }

    /// Load tiles and their palette, then point `layer` at the tiles.
    pub fn init_tileset<R: RegisterFile>(
        &mut self,
        bus: &mut R,
        layer: BgLayer,
        tiles: u32,
        tiles_len: u16,
        palette: u32,
        palette_colors: u16,
        palette_entry: u8,
        depth: ColorDepth,
        vram_addr: u16,
    ) {
        dma::copy_to_vram(bus, tiles, vram_addr, tiles_len);
        dma::copy_to_cgram(bus, palette, depth.palette_index(palette_entry), palette_colors);
        self.set_gfx(bus, layer, vram_addr);
    }

    /// Load tiles only. `layer` of `None` leaves the tile base pointers alone.
    pub fn init_tileset_data<R: RegisterFile>(
        &mut self,
        bus: &mut R,
        layer: Option<BgLayer>,
        tiles: u32,
        tiles_len: u16,
        vram_addr: u16,
    ) {
        dma::copy_to_vram(bus, tiles, vram_addr, tiles_len);
        if let Some(layer) = layer {
            self.set_gfx(bus, layer, vram_addr);
        }
    }

    /// Show `layers` on the main screen (`TM`).
    pub fn enable<R: RegisterFile>(&mut self, bus: &mut R, layers: Layers) {
        self.main_screen |= layers.bits() & 0x1F;
        bus.write_byte(regs::TM, self.main_screen);
    }

    pub fn disable<R: RegisterFile>(&mut self, bus: &mut R, layers: Layers) {
        self.main_screen &= !layers.bits();
        bus.write_byte(regs::TM, self.main_screen);
    }

    /// Replace the sub screen layer set (`TS`), used as the color math source.
    pub fn set_sub_screen<R: RegisterFile>(&mut self, bus: &mut R, layers: Layers) {
        self.sub_screen = layers.bits() & 0x1F;
        bus.write_byte(regs::TS, self.sub_screen);
    }

    pub fn main_screen(&self) -> Layers {
        Layers::from_bits_truncate(self.main_screen)
    }
}
