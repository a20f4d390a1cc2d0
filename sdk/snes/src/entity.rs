//! # Entities
//!
//! A fixed pool of [`MAX_ENTITIES`] game objects with 8.8 position and
//! velocity, each tied to one OAM sprite. Slots are reused: destroying an
//! entity just marks its slot free for the next [`EntityPool::spawn`].
//!
//! ```ignore
//! let mut pool = EntityPool::new();
//! if let Some(id) = pool.spawn(PLAYER, Fixed::from_int(100), Fixed::from_int(80)) {
//!     pool.set_vel(id, Fixed::ONE, Fixed::ZERO);
//! }
//! loop {
//!     pool.update_all();
//!     if pool.collide_type(player, ENEMY).is_some() { /* ... */ }
//!     pool.draw_all(&mut oam);
//!     console.wait_for_vblank(&mut bus);
//!     oam.flush(&mut bus);
//! }
//! ```

use crate::{math::Fixed, scr::ObjFlags, sprite::{Oam, HIDE_Y}};

pub const MAX_ENTITIES: usize = 16;
/// Type id of a free slot.
pub const TYPE_NONE: u8 = 0;

bitflags::bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct EntityFlags: u8 {
        const VISIBLE = 0x01;
        const SOLID   = 0x02;
        const FLIP_X  = 0x04;
        const FLIP_Y  = 0x08;
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Entity {
    pub active: bool,
    /// Game-defined type; [`TYPE_NONE`] when free.
    pub kind: u8,
    pub flags: EntityFlags,
    /// Free for game logic.
    pub state: u8,
    pub x: Fixed,
    pub y: Fixed,
    pub vx: Fixed,
    pub vy: Fixed,
    pub width: u8,
    pub height: u8,
    pub sprite_id: u8,
    pub tile: u8,
    pub palette: u8,
    pub priority: u8,
    pub health: u8,
    /// Counts down by one per [`EntityPool::update_all`] until 0.
    pub timer: u8,
}

impl Entity {
    const fn fresh(slot: u8) -> Self {
        Self {
            active: false,
            kind: TYPE_NONE,
            flags: EntityFlags::empty(),
            state: 0,
            x: Fixed::ZERO,
            y: Fixed::ZERO,
            vx: Fixed::ZERO,
            vy: Fixed::ZERO,
            width: 8,
            height: 8,
            sprite_id: slot,
            tile: 0,
            palette: 0,
            priority: 2,
            health: 1,
            timer: 0,
        }
    }

    pub fn screen_x(&self) -> i16 {
        self.x.to_int()
    }

    pub fn screen_y(&self) -> i16 {
        self.y.to_int()
    }

    /// Bounding box in 8.8 units: `(left, top, right, bottom)`.
    fn bounds(&self) -> (i32, i32, i32, i32) {
        let x = self.x.0 as i32;
        let y = self.y.0 as i32;
        (x, y, x + ((self.width as i32) << 8), y + ((self.height as i32) << 8))
    }

    /// Whether the 8.8 point (`px`, `py`) is inside the entity.
    pub fn contains_point(&self, px: Fixed, py: Fixed) -> bool {
        if !self.active {
            return false;
        }
        let (l, t, r, b) = self.bounds();
        let (px, py) = (px.0 as i32, py.0 as i32);
        px >= l && px < r && py >= t && py < b
    }

    /// Edge-exclusive overlap of two active entities.
    pub fn overlaps(&self, other: &Entity) -> bool {
        if !self.active || !other.active {
            return false;
        }
        let (al, at, ar, ab) = self.bounds();
        let (bl, bt, br, bb) = other.bounds();
        al < br && ar > bl && at < bb && ab > bt
    }
}

#[derive(Debug, Clone)]
pub struct EntityPool {
    entities: [Entity; MAX_ENTITIES],
}

impl Default for EntityPool {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityPool {
    pub fn new() -> Self {
        Self {
            entities: core::array::from_fn(|i| Entity::fresh(i as u8)),
        }
    }

    /// Take the first free slot. The entity starts visible, 8×8, priority
    /// 2, with sprite id equal to its slot. Returns `None` when full.
    pub fn spawn(&mut self, kind: u8, x: Fixed, y: Fixed) -> Option<u8> {
        let slot = self.entities.iter().position(|e| !e.active)?;
        self.entities[slot] = Entity {
            active: true,
            kind,
            flags: EntityFlags::VISIBLE,
            x,
            y,
            ..Entity::fresh(slot as u8)
        };
        Some(slot as u8)
    }

    pub fn destroy(&mut self, id: u8) {
        if let Some(e) = self.entities.get_mut(id as usize) {
            e.active = false;
            e.kind = TYPE_NONE;
        }
    }

    pub fn get(&self, id: u8) -> Option<&Entity> {
        self.entities.get(id as usize)
    }

    pub fn get_mut(&mut self, id: u8) -> Option<&mut Entity> {
        self.entities.get_mut(id as usize)
    }

    /// First active entity of `kind`.
    pub fn find_type(&self, kind: u8) -> Option<u8> {
        self.entities
            .iter()
            .position(|e| e.active && e.kind == kind)
            .map(|i| i as u8)
    }

    pub fn count(&self) -> usize {
        self.entities.iter().filter(|e| e.active).count()
    }

    pub fn count_type(&self, kind: u8) -> usize {
        self.entities.iter().filter(|e| e.active && e.kind == kind).count()
    }

    /// Apply velocity and tick timers.
    pub fn update_all(&mut self) {
        for e in self.entities.iter_mut().filter(|e| e.active) {
            e.x = e.x + e.vx;
            e.y = e.y + e.vy;
            e.timer = e.timer.saturating_sub(1);
        }
    }

    /// Apply velocity only.
    pub fn move_all(&mut self) {
        for e in self.entities.iter_mut().filter(|e| e.active) {
            e.x = e.x + e.vx;
            e.y = e.y + e.vy;
        }
    }

    /// Write every entity's sprite. Free or invisible entities are moved
    /// off screen.
    pub fn draw_all(&self, oam: &mut Oam) {
        for e in &self.entities {
            if !e.active || !e.flags.contains(EntityFlags::VISIBLE) {
                oam.set_y(e.sprite_id, HIDE_Y);
                continue;
            }
            let mut flip = ObjFlags::empty();
            flip.set(ObjFlags::FLIP_X, e.flags.contains(EntityFlags::FLIP_X));
            flip.set(ObjFlags::FLIP_Y, e.flags.contains(EntityFlags::FLIP_Y));
            oam.set(
                e.sprite_id,
                e.screen_x(),
                e.screen_y() as u8,
                e.tile as u16,
                e.palette,
                e.priority,
                flip,
            );
        }
    }

    pub fn hide_all(&self, oam: &mut Oam) {
        for e in &self.entities {
            oam.set_y(e.sprite_id, HIDE_Y);
        }
    }

    pub fn collide(&self, a: u8, b: u8) -> bool {
        match (self.get(a), self.get(b)) {
            (Some(a), Some(b)) => a.overlaps(b),
            _ => false,
        }
    }

    /// First other active entity of `kind` overlapping `id`.
    pub fn collide_type(&self, id: u8, kind: u8) -> Option<u8> {
        let me = self.get(id)?;
        if !me.active {
            return None;
        }
        self.entities
            .iter()
            .enumerate()
            .find(|(i, other)| *i != id as usize && other.kind == kind && me.overlaps(other))
            .map(|(i, _)| i as u8)
    }

    pub fn contains_point(&self, id: u8, px: Fixed, py: Fixed) -> bool {
        self.get(id).is_some_and(|e| e.contains_point(px, py))
    }

    pub fn set_pos(&mut self, id: u8, x: Fixed, y: Fixed) {
        if let Some(e) = self.get_mut(id) {
            e.x = x;
            e.y = y;
        }
    }

    pub fn set_vel(&mut self, id: u8, vx: Fixed, vy: Fixed) {
        if let Some(e) = self.get_mut(id) {
            e.vx = vx;
            e.vy = vy;
        }
    }

    pub fn set_sprite(&mut self, id: u8, sprite_id: u8, tile: u8, palette: u8) {
        if let Some(e) = self.get_mut(id) {
            e.sprite_id = sprite_id;
            e.tile = tile;
            e.palette = palette;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYER: u8 = 1;
    const ENEMY: u8 = 2;

    fn at(x: i16, y: i16) -> (Fixed, Fixed) {
        (Fixed::from_int(x), Fixed::from_int(y))
    }

    #[test]
    fn spawn_uses_first_free_slot() {
        let mut pool = EntityPool::new();
        let (x, y) = at(10, 20);
        assert_eq!(pool.spawn(PLAYER, x, y), Some(0));
        assert_eq!(pool.spawn(ENEMY, x, y), Some(1));
        pool.destroy(0);
        assert_eq!(pool.spawn(ENEMY, x, y), Some(0));

        let e = pool.get(0).copied().unwrap();
        assert_eq!((e.width, e.height, e.priority, e.health, e.sprite_id), (8, 8, 2, 1, 0));
        assert_eq!(e.flags, EntityFlags::VISIBLE);
        assert_eq!(pool.count(), 2);
        assert_eq!(pool.count_type(ENEMY), 2);
        assert_eq!(pool.find_type(PLAYER), None);
    }

    #[test]
    fn pool_fills_up() {
        let mut pool = EntityPool::new();
        for i in 0..MAX_ENTITIES {
            assert_eq!(pool.spawn(ENEMY, Fixed::ZERO, Fixed::ZERO), Some(i as u8));
        }
        assert_eq!(pool.spawn(ENEMY, Fixed::ZERO, Fixed::ZERO), None);
    }

    #[test]
    fn update_moves_and_ticks_timer() {
        let mut pool = EntityPool::new();
        let (x, y) = at(0, 0);
        let id = pool.spawn(PLAYER, x, y).unwrap();
        pool.set_vel(id, Fixed(0x0180), Fixed(-0x0100));
        pool.get_mut(id).unwrap().timer = 1;

        pool.update_all();
        pool.update_all();
        let e = pool.get(id).unwrap();
        assert_eq!(e.x, Fixed(0x0300));
        assert_eq!(e.y, Fixed(-0x0200));
        assert_eq!(e.timer, 0);

        pool.get_mut(id).unwrap().timer = 5;
        pool.move_all();
        assert_eq!(pool.get(id).unwrap().timer, 5);
    }

    #[test]
    fn collision_in_fixed_point() {
        let mut pool = EntityPool::new();
        let (x, y) = at(0, 0);
        let a = pool.spawn(PLAYER, x, y).unwrap();
        let (x, y) = at(7, 7);
        let b = pool.spawn(ENEMY, x, y).unwrap();
        let (x, y) = at(8, 0);
        let c = pool.spawn(ENEMY, x, y).unwrap();

        assert!(pool.collide(a, b));
        assert!(!pool.collide(a, c));
        assert_eq!(pool.collide_type(a, ENEMY), Some(b));
        assert_eq!(pool.collide_type(a, PLAYER), None);

        pool.destroy(b);
        assert!(!pool.collide(a, b));
        assert!(pool.contains_point(a, Fixed(0x07FF), Fixed::ZERO));
        assert!(!pool.contains_point(a, Fixed(0x0800), Fixed::ZERO));
    }

    #[test]
    fn draw_writes_sprites_and_hides_the_rest() {
        let mut pool = EntityPool::new();
        let mut oam = Oam::new();
        let (x, y) = at(40, 30);
        let id = pool.spawn(PLAYER, x, y).unwrap();
        {
            let e = pool.get_mut(id).unwrap();
            e.tile = 4;
            e.palette = 1;
            e.flags |= EntityFlags::FLIP_X;
        }
        oam.set(1, 5, 5, 0, 0, 0, ObjFlags::empty());
        pool.draw_all(&mut oam);

        let attr = 0x40 | (2 << 4) | (1 << 1);
        assert_eq!(oam.get(0), Some((40, 30, 4, attr)));
        assert_eq!(oam.get(1).map(|s| s.1), Some(HIDE_Y));

        pool.get_mut(id).unwrap().flags.remove(EntityFlags::VISIBLE);
        pool.draw_all(&mut oam);
        assert_eq!(oam.get(0).map(|s| s.1), Some(HIDE_Y));
    }

    #[test]
    fn screen_position_floors() {
        let mut pool = EntityPool::new();
        let id = pool.spawn(PLAYER, Fixed(0x1280), Fixed(-0x0080)).unwrap();
        let e = pool.get(id).unwrap();
        assert_eq!((e.screen_x(), e.screen_y()), (0x12, -1));
    }
}
