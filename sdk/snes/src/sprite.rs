//! # Sprites (OAM)
//!
//! The PPU holds 128 sprites in OAM. [`Oam`] is a RAM copy of that table
//! which you edit during the frame and [`Oam::flush`] to the PPU with DMA
//! during vblank.
//!
//! ## Layout (544 bytes)
//!
//! | Bytes       | Content                                                  |
//! |-------------|----------------------------------------------------------|
//! | `0..512`    | 4 bytes per sprite: X low, Y, tile low, attributes       |
//! | `512..544`  | 2 bits per sprite: bit 0 = X bit 8, bit 1 = large size   |
//!
//! The attribute byte is `vhoopppc`: vertical/horizontal flip, priority,
//! palette, tile bit 8.
//!
//! A sprite is hidden by parking it at Y = 240 with X bit 8 set.
//!
//! ```ignore
//! let mut oam = Oam::new();
//! oam.init(&mut bus, ObjSize::Size8Large16, 0);
//! oam.set(0, 120, 100, 0, 0, 3, ObjFlags::empty());
//! oam.set_size(0, true);
//!
//! console.wait_for_vblank(&mut bus);
//! oam.flush(&mut bus);
//! ```

use bit_field::BitField;

use crate::{dma, regs, scr::ObjFlags, RegisterFile};

pub const MAX_SPRITES: u8 = 128;
pub const OAM_SIZE: usize = 544;
const HIGH_TABLE: usize = 512;
/// Y used to park hidden sprites below the visible area.
pub const HIDE_Y: u8 = 240;
/// Default WRAM location the buffer is staged to before DMA.
pub const OAM_BUFFER_ADDR: u32 = regs::WRAM + 0x0300;

/// Small/large sprite dimensions, `OBJSEL` bits 5-7.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum ObjSize {
    Size8Large16 = 0,
    Size8Large32 = 1,
    Size8Large64 = 2,
    Size16Large32 = 3,
    Size16Large64 = 4,
    Size32Large64 = 5,
}

impl ObjSize {
    /// `(small, large)` edge in pixels.
    pub const fn dimensions(self) -> (u8, u8) {
        match self {
            ObjSize::Size8Large16 => (8, 16),
            ObjSize::Size8Large32 => (8, 32),
            ObjSize::Size8Large64 => (8, 64),
            ObjSize::Size16Large32 => (16, 32),
            ObjSize::Size16Large64 => (16, 64),
            ObjSize::Size32Large64 => (32, 64),
        }
    }
}

/// One piece of a multi-sprite object, positioned relative to its origin.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MetaspriteItem {
    pub dx: i16,
    pub dy: i16,
    /// Added to the base tile passed to [`Oam::draw_meta`].
    pub tile: u16,
    /// `vhoopppc`; a palette of 0 means "use the base palette".
    pub attr: u8,
}

impl MetaspriteItem {
    pub const fn new(dx: i16, dy: i16, tile: u16, attr: u8) -> Self {
        Self { dx, dy, tile, attr }
    }
}

/// RAM shadow of OAM.
#[derive(Debug, Clone)]
pub struct Oam {
    buffer: [u8; OAM_SIZE],
    buffer_addr: u32,
    dirty: bool,
}

impl Default for Oam {
    fn default() -> Self {
        Self::new()
    }
}

impl Oam {
    /// A buffer with every sprite hidden.
    pub fn new() -> Self {
        let mut oam = Self {
            buffer: [0; OAM_SIZE],
            buffer_addr: OAM_BUFFER_ADDR,
            dirty: false,
        };
        oam.clear();
        oam
    }

    pub fn with_buffer_addr(mut self, buffer_addr: u32) -> Self {
        self.buffer_addr = buffer_addr;
        self
    }

    /// Select sprite sizes and the VRAM tile base (in 8K-word steps), then
    /// hide every sprite.
    pub fn init<R: RegisterFile>(&mut self, bus: &mut R, size: ObjSize, tile_base: u8) {
        bus.write_byte(regs::OBJSEL, ((size as u8) << 5) | (tile_base & 0x07));
        self.clear();
    }

    /// Load sprite tiles and a 16-color palette, then [`init`](Self::init).
    ///
    /// Sprite palettes start at CGRAM color 128, 16 colors each.
    pub fn init_gfx<R: RegisterFile>(
        &mut self,
        bus: &mut R,
        tiles: u32,
        tiles_len: u16,
        palette: u32,
        palette_colors: u16,
        palette_entry: u8,
        vram_addr: u16,
        size: ObjSize,
    ) {
        dma::copy_to_vram(bus, tiles, vram_addr, tiles_len);
        dma::copy_to_cgram(bus, palette, 128 + (palette_entry & 0x07) * 16, palette_colors);
        self.init(bus, size, ((vram_addr >> 13) & 0x07) as u8);
    }

    #[inline]
    fn high_slot(id: u8) -> (usize, usize) {
        (HIGH_TABLE + (id as usize >> 2), 2 * (id as usize & 0x03))
    }

    fn set_x_high(&mut self, id: u8, high: bool) {
        let (byte, bit) = Self::high_slot(id);
        self.buffer[byte].set_bit(bit, high);
    }

    /// Place sprite `id`. `x` uses its low 9 bits, so negative values wrap in
    /// from the left edge the way the hardware expects.
    pub fn set(&mut self, id: u8, x: i16, y: u8, tile: u16, palette: u8, priority: u8, flags: ObjFlags) {
        if id >= MAX_SPRITES {
            return;
        }
        let offset = id as usize * 4;
        self.buffer[offset] = x as u8;
        self.buffer[offset + 1] = y;
        self.buffer[offset + 2] = tile as u8;
        self.buffer[offset + 3] = (flags.bits() & 0xC0)
            | ((priority & 0x03) << 4)
            | ((palette & 0x07) << 1)
            | ((tile >> 8) as u8 & 0x01);
        self.set_x_high(id, x & 0x100 != 0);
        self.dirty = true;
    }

    pub fn set_x(&mut self, id: u8, x: i16) {
        if id >= MAX_SPRITES {
            return;
        }
        self.buffer[id as usize * 4] = x as u8;
        self.set_x_high(id, x & 0x100 != 0);
        self.dirty = true;
    }

    pub fn set_y(&mut self, id: u8, y: u8) {
        if id >= MAX_SPRITES {
            return;
        }
        self.buffer[id as usize * 4 + 1] = y;
        self.dirty = true;
    }

    pub fn set_xy(&mut self, id: u8, x: i16, y: u8) {
        self.set_x(id, x);
        self.set_y(id, y);
    }

    pub fn set_tile(&mut self, id: u8, tile: u16) {
        if id >= MAX_SPRITES {
            return;
        }
        let offset = id as usize * 4;
        self.buffer[offset + 2] = tile as u8;
        self.buffer[offset + 3].set_bit(0, tile.get_bit(8));
        self.dirty = true;
    }

    pub fn hide(&mut self, id: u8) {
        if id >= MAX_SPRITES {
            return;
        }
        let offset = id as usize * 4;
        self.buffer[offset] = 0;
        self.buffer[offset + 1] = HIDE_Y;
        self.set_x_high(id, true);
        self.dirty = true;
    }

    /// Hiding works by position, so showing a sprite again means giving it a
    /// visible position with [`set`](Self::set) or [`set_xy`](Self::set_xy).
    pub fn set_visible(&mut self, id: u8, visible: bool) {
        if !visible {
            self.hide(id);
        }
    }

    /// Use the large (`true`) or small size from `OBJSEL`.
    pub fn set_size(&mut self, id: u8, large: bool) {
        if id >= MAX_SPRITES {
            return;
        }
        let (byte, bit) = Self::high_slot(id);
        self.buffer[byte].set_bit(bit + 1, large);
        self.dirty = true;
    }

    pub fn set_ex(&mut self, id: u8, large: bool, visible: bool) {
        self.set_size(id, large);
        self.set_visible(id, visible);
    }

    /// Hide all 128 sprites and reset them to small.
    pub fn clear(&mut self) {
        for sprite in self.buffer[..HIGH_TABLE].chunks_exact_mut(4) {
            sprite.copy_from_slice(&[0, HIDE_Y, 0, 0]);
        }
        self.buffer[HIGH_TABLE..].fill(0x55);
        self.dirty = true;
    }

    /// Draw a multi-sprite object at (`x`, `y`) using consecutive ids from
    /// `start_id`. Pieces more than 64 pixels off screen are skipped and
    /// don't consume an id. Returns how many ids were used.
    pub fn draw_meta(
        &mut self,
        start_id: u8,
        x: i16,
        y: i16,
        items: &[MetaspriteItem],
        base_tile: u16,
        base_palette: u8,
        large: bool,
    ) -> u8 {
        self.draw_meta_flip(start_id, x, y, items, base_tile, base_palette, large, false, false, 0, 0)
    }

    /// [`draw_meta`](Self::draw_meta) mirrored inside a `width`×`height` box.
    /// Piece size is taken as 16 pixels when `large`, else 8.
    pub fn draw_meta_flip(
        &mut self,
        start_id: u8,
        x: i16,
        y: i16,
        items: &[MetaspriteItem],
        base_tile: u16,
        base_palette: u8,
        large: bool,
        flip_x: bool,
        flip_y: bool,
        width: u8,
        height: u8,
    ) -> u8 {
        let piece = if large { 16 } else { 8 };
        let mut id = start_id;
        let mut count = 0;

        for item in items {
            if id >= MAX_SPRITES {
                break;
            }

            let mut dx = item.dx;
            let mut dy = item.dy;
            let mut flags = ObjFlags::from_bits_truncate(item.attr);
            if flip_x {
                dx = width as i16 - dx - piece;
                flags.toggle(ObjFlags::FLIP_X);
            }
            if flip_y {
                dy = height as i16 - dy - piece;
                flags.toggle(ObjFlags::FLIP_Y);
            }

            let sx = x.wrapping_add(dx);
            let sy = y.wrapping_add(dy);
            if sx <= -64 || sx >= 256 || sy <= -64 || sy >= 240 {
                continue;
            }

            let palette = match (item.attr >> 1) & 0x07 {
                0 => base_palette,
                p => p,
            };
            let priority = (item.attr >> 4) & 0x03;
            self.set(id, sx, sy as u8, base_tile.wrapping_add(item.tile), palette, priority, flags);
            self.set_size(id, large);
            id += 1;
            count += 1;
        }
        count
    }

    /// Copy the buffer to WRAM and DMA it to OAM. Call during vblank.
    pub fn flush<R: RegisterFile>(&mut self, bus: &mut R) {
        dma::stage(bus, self.buffer_addr, &self.buffer);
        dma::copy_to_oam(bus, self.buffer_addr, OAM_SIZE as u16);
        self.dirty = false;
    }

    /// Whether the buffer changed since the last flush.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn bytes(&self) -> &[u8; OAM_SIZE] {
        &self.buffer
    }

    /// `(x, y, tile, attr)` of sprite `id`, with x including bit 8.
    pub fn get(&self, id: u8) -> Option<(u16, u8, u8, u8)> {
        if id >= MAX_SPRITES {
            return None;
        }
        let offset = id as usize * 4;
        let (byte, bit) = Self::high_slot(id);
        let x = self.buffer[offset] as u16 | ((self.buffer[byte].get_bit(bit) as u16) << 8);
        Some((x, self.buffer[offset + 1], self.buffer[offset + 2], self.buffer[offset + 3]))
    }

    pub fn is_large(&self, id: u8) -> bool {
        if id >= MAX_SPRITES {
            return false;
        }
        let (byte, bit) = Self::high_slot(id);
        self.buffer[byte].get_bit(bit + 1)
    }
}
