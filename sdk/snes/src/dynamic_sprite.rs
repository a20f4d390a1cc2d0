//! # Dynamic sprites
//!
//! Keeps only the animation frames on screen in VRAM. Each drawn sprite gets
//! the next free VRAM slot of its size region, and when its
//! [`refresh`](DynamicSprite::refresh) flag is set the frame's tiles are
//! queued for upload from the ROM sheet. [`DynamicSprites::update`] runs the
//! queued uploads during vblank, [`MAX_UPLOADS_PER_FRAME`] at a time.
//!
//! Sheets are the 128-pixel-wide layout gfx2snes writes with a matching
//! block size: frame `n` of an `s`×`s` sprite sits at column `n % (128/s)`,
//! row `n / (128/s)`. VRAM slots use the same layout, so a 16×16 sprite is
//! two uploads of two tiles each.
//!
//! Sprites of the large `OBJSEL` size use the large region, sprites of the
//! small size the small one. Give the two regions disjoint OAM ranges when
//! drawing both sizes.
//!
//! ```ignore
//! let mut dynamic = DynamicSprites::new();
//! dynamic.init(&mut bus, &mut oam, 0x0000, 0x1000, 0, 64, ObjSize::Size8Large16);
//! let mut hero = DynamicSprite::new(HERO_TILES);
//!
//! loop {
//!     hero.frame = animator.frame() as u16;
//!     hero.refresh = animator.changed();
//!     dynamic.draw_16(&mut oam, &mut hero);
//!     dynamic.end_frame(&mut oam);
//!
//!     console.wait_for_vblank(&mut bus);
//!     dynamic.update(&mut bus);
//!     oam.flush(&mut bus);
//! }
//! ```

use crate::{
    dma,
    scr::ObjFlags,
    sprite::{ObjSize, Oam, MAX_SPRITES},
    RegisterFile,
};

/// Upload queue capacity.
pub const QUEUE_SIZE: usize = 128;
/// Sprites uploaded per [`DynamicSprites::update`].
pub const MAX_UPLOADS_PER_FRAME: usize = 7;

const SHEET_PIXELS: u16 = 128;
const TILE_BYTES: u32 = 32;
const TILE_WORDS: u16 = 16;
/// One row of 16 tiles on the sheet and in VRAM.
const SHEET_ROW_BYTES: u32 = 16 * TILE_BYTES;
const VRAM_ROW_WORDS: u16 = 16 * TILE_WORDS;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DynSize {
    Size8,
    Size16,
    Size32,
}

impl DynSize {
    pub const fn pixels(self) -> u8 {
        match self {
            DynSize::Size8 => 8,
            DynSize::Size16 => 16,
            DynSize::Size32 => 32,
        }
    }

    const fn tiles(self) -> u16 {
        self.pixels() as u16 / 8
    }

    const fn per_row(self) -> u16 {
        SHEET_PIXELS / self.pixels() as u16
    }

    /// VRAM slots in one region.
    pub const fn slots(self) -> u8 {
        match self {
            DynSize::Size8 => 128,
            DynSize::Size16 => 64,
            DynSize::Size32 => 16,
        }
    }

    /// Byte offset of `frame` on a sheet.
    pub fn frame_offset(self, frame: u16) -> u32 {
        let tiles = self.tiles() as u32;
        let per_row = self.per_row();
        (frame % per_row) as u32 * tiles * TILE_BYTES + (frame / per_row) as u32 * tiles * SHEET_ROW_BYTES
    }

    /// First tile of VRAM slot `slot`, counted from the region start.
    pub fn slot_tile(self, slot: u8) -> u16 {
        let tiles = self.tiles();
        let per_row = self.per_row();
        (slot as u16 % per_row) * tiles + (slot as u16 / per_row) * tiles * 16
    }
}

/// Game-side state of one dynamic sprite.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct DynamicSprite {
    pub x: i16,
    pub y: i16,
    /// Frame index on the sheet.
    pub frame: u16,
    /// `vhoopppc`; the tile bit is ignored.
    pub attr: u8,
    /// Upload the current frame on the next draw. Cleared once queued.
    pub refresh: bool,
    /// Bus address of the sheet.
    pub gfx: u32,
}

impl DynamicSprite {
    pub const fn new(gfx: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            frame: 0,
            attr: 0,
            refresh: true,
            gfx,
        }
    }
}

/// One pending frame copy.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VramUpload {
    pub source: u32,
    pub vram: u16,
    pub size: DynSize,
}

impl VramUpload {
    /// One DMA per tile row.
    pub fn run<R: RegisterFile>(&self, bus: &mut R) {
        let tiles = self.size.tiles();
        let row_bytes = tiles * TILE_BYTES as u16;
        for row in 0..tiles {
            dma::copy_to_vram(
                bus,
                self.source.wrapping_add(row as u32 * SHEET_ROW_BYTES),
                self.vram.wrapping_add(row * VRAM_ROW_WORDS),
                row_bytes,
            );
        }
    }
}

#[derive(Debug, Default, Copy, Clone)]
struct Region {
    vram: u16,
    first_id: u8,
    drawn: u8,
    last_drawn: u8,
}

/// Slot allocator and VRAM upload queue for [`DynamicSprite`]s.
#[derive(Debug, Clone)]
pub struct DynamicSprites {
    size: ObjSize,
    name_base: u16,
    large: Region,
    small: Region,
    queue: [Option<VramUpload>; QUEUE_SIZE],
    head: usize,
    len: usize,
}

impl Default for DynamicSprites {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicSprites {
    pub const fn new() -> Self {
        Self {
            size: ObjSize::Size8Large16,
            name_base: 0,
            large: Region {
                vram: 0,
                first_id: 0,
                drawn: 0,
                last_drawn: 0,
            },
            small: Region {
                vram: 0,
                first_id: 0,
                drawn: 0,
                last_drawn: 0,
            },
            queue: [None; QUEUE_SIZE],
            head: 0,
            len: 0,
        }
    }

    /// Set the VRAM word address and first OAM id of each region, select
    /// sprite sizes and point `OBJSEL` at the large region. Clears `oam` and
    /// the queue.
    pub fn init<R: RegisterFile>(
        &mut self,
        bus: &mut R,
        oam: &mut Oam,
        large_vram: u16,
        small_vram: u16,
        large_first_id: u8,
        small_first_id: u8,
        size: ObjSize,
    ) {
        let tile_base = ((large_vram >> 13) & 0x07) as u8;
        oam.init(bus, size, tile_base);
        *self = Self::new();
        self.size = size;
        self.name_base = (tile_base as u16) << 13;
        self.large.vram = large_vram;
        self.large.first_id = large_first_id;
        self.small.vram = small_vram;
        self.small.first_id = small_first_id;
    }

    /// Put `sprite` in OAM with the next slot of its size region, queueing its
    /// frame when [`refresh`](DynamicSprite::refresh) is set. A full queue
    /// leaves `refresh` set so the next draw retries.
    ///
    /// Returns the OAM id, or `None` when `size` is neither `OBJSEL` size or
    /// the region is out of slots or OAM ids.
    pub fn draw(&mut self, oam: &mut Oam, sprite: &mut DynamicSprite, size: DynSize) -> Option<u8> {
        let (small_px, large_px) = self.size.dimensions();
        let large = if size.pixels() == large_px {
            true
        } else if size.pixels() == small_px {
            false
        } else {
            return None;
        };

        let region = if large { &mut self.large } else { &mut self.small };
        let slot = region.drawn;
        if slot >= size.slots() {
            return None;
        }
        let id = region.first_id.checked_add(slot).filter(|&id| id < MAX_SPRITES)?;
        region.drawn += 1;
        let vram = region.vram.wrapping_add(size.slot_tile(slot) * TILE_WORDS);

        if sprite.refresh {
            let upload = VramUpload {
                source: sprite.gfx.wrapping_add(size.frame_offset(sprite.frame)),
                vram,
                size,
            };
            if self.enqueue(upload) {
                sprite.refresh = false;
            }
        }

        let tile = (vram.wrapping_sub(self.name_base) / TILE_WORDS) & 0x1FF;
        let attr = sprite.attr;
        oam.set(
            id,
            sprite.x,
            sprite.y as u8,
            tile,
            (attr >> 1) & 0x07,
            (attr >> 4) & 0x03,
            ObjFlags::from_bits_truncate(attr),
        );
        oam.set_size(id, large);
        Some(id)
    }

    pub fn draw_8(&mut self, oam: &mut Oam, sprite: &mut DynamicSprite) -> Option<u8> {
        self.draw(oam, sprite, DynSize::Size8)
    }

    pub fn draw_16(&mut self, oam: &mut Oam, sprite: &mut DynamicSprite) -> Option<u8> {
        self.draw(oam, sprite, DynSize::Size16)
    }

    pub fn draw_32(&mut self, oam: &mut Oam, sprite: &mut DynamicSprite) -> Option<u8> {
        self.draw(oam, sprite, DynSize::Size32)
    }

    /// Hide the ids drawn last frame but not this one and start a new frame.
    pub fn end_frame(&mut self, oam: &mut Oam) {
        for region in [&mut self.large, &mut self.small] {
            for slot in region.drawn..region.last_drawn {
                if let Some(id) = region.first_id.checked_add(slot) {
                    oam.hide(id);
                }
            }
            region.last_drawn = region.drawn;
            region.drawn = 0;
        }
    }

    /// Add an upload; `false` when the queue is full.
    pub fn enqueue(&mut self, upload: VramUpload) -> bool {
        if self.len == QUEUE_SIZE {
            return false;
        }
        self.queue[(self.head + self.len) % QUEUE_SIZE] = Some(upload);
        self.len += 1;
        true
    }

    pub fn pending(&self) -> usize {
        self.len
    }

    /// Run up to [`MAX_UPLOADS_PER_FRAME`] queued uploads, oldest first. Call
    /// during vblank. Returns how many ran.
    pub fn update<R: RegisterFile>(&mut self, bus: &mut R) -> usize {
        let count = self.len.min(MAX_UPLOADS_PER_FRAME);
        for _ in 0..count {
            if let Some(upload) = self.queue[self.head].take() {
                upload.run(bus);
            }
            self.head = (self.head + 1) % QUEUE_SIZE;
            self.len -= 1;
        }
        count
    }
}
