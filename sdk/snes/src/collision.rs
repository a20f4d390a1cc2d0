//! # Collision
//!
//! Axis-aligned rectangles and tilemap lookups. Edges are exclusive: two
//! rectangles that only touch don't collide.

/// Axis-aligned rectangle in pixels.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Rect {
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub const fn new(x: i16, y: i16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub const fn right(&self) -> i16 {
        self.x.wrapping_add(self.width as i16)
    }

    #[inline]
    pub const fn bottom(&self) -> i16 {
        self.y.wrapping_add(self.height as i16)
    }

    pub fn set_pos(&mut self, x: i16, y: i16) {
        self.x = x;
        self.y = y;
    }

    pub const fn center(&self) -> (i16, i16) {
        (
            self.x.wrapping_add((self.width >> 1) as i16),
            self.y.wrapping_add((self.height >> 1) as i16),
        )
    }

    pub fn collides(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    pub fn contains_point(&self, x: i16, y: i16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Whether `self` lies entirely inside `outer`.
    pub fn inside(&self, outer: &Rect) -> bool {
        self.x >= outer.x
            && self.y >= outer.y
            && self.right() <= outer.right()
            && self.bottom() <= outer.bottom()
    }

    /// Penetration depth when overlapping. Each axis is the shorter way out:
    /// positive means move `self` right/down by that much, negative means
    /// left/up.
    pub fn overlap(&self, other: &Rect) -> Option<(i16, i16)> {
        if !self.collides(other) {
            return None;
        }
        let exit_right = other.right() as i32 - self.x as i32;
        let exit_left = self.right() as i32 - other.x as i32;
        let exit_down = other.bottom() as i32 - self.y as i32;
        let exit_up = self.bottom() as i32 - other.y as i32;

        let dx = if exit_right < exit_left { exit_right } else { -exit_left };
        let dy = if exit_down < exit_up { exit_down } else { -exit_up };
        Some((saturate(dx), saturate(dy)))
    }
}

fn saturate(v: i32) -> i16 {
    v.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Tile under pixel (`px`, `py`) in a map of 8×8 tiles, `width` tiles wide.
/// Negative coordinates and positions past the end of `map` read as 0.
pub fn tile_at(px: i16, py: i16, map: &[u8], width: u16) -> u8 {
    tile_at_shift(px, py, map, width, 3)
}

/// [`tile_at`] for 8, 16 or 32 pixel tiles; other sizes fall back to 8.
pub fn tile_at_ex(px: i16, py: i16, map: &[u8], width: u16, tile_size: u8) -> u8 {
    let shift = match tile_size {
        16 => 4,
        32 => 5,
        _ => 3,
    };
    tile_at_shift(px, py, map, width, shift)
}

fn tile_at_shift(px: i16, py: i16, map: &[u8], width: u16, shift: u32) -> u8 {
    if px < 0 || py < 0 {
        return 0;
    }
    let offset = (py as usize >> shift) * width as usize + (px as usize >> shift);
    map.get(offset).copied().unwrap_or(0)
}

/// Whether any corner of `rect` sits on a non-zero tile.
pub fn rect_hits_tile(rect: &Rect, map: &[u8], width: u16) -> bool {
    let right = rect.right().wrapping_sub(1);
    let bottom = rect.bottom().wrapping_sub(1);
    [(rect.x, rect.y), (right, rect.y), (rect.x, bottom), (right, bottom)]
        .iter()
        .any(|&(x, y)| tile_at(x, y, map, width) != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_collide() {
        let a = Rect::new(0, 0, 16, 16);
        assert!(!a.collides(&Rect::new(16, 0, 16, 16)));
        assert!(!a.collides(&Rect::new(0, 16, 16, 16)));
        assert!(a.collides(&Rect::new(15, 15, 16, 16)));
        assert!(a.collides(&Rect::new(-8, -8, 16, 16)));
    }

    #[test]
    fn point_is_half_open() {
        let r = Rect::new(10, 10, 5, 5);
        assert!(r.contains_point(10, 10));
        assert!(r.contains_point(14, 14));
        assert!(!r.contains_point(15, 10));
        assert!(!r.contains_point(9, 12));
    }

    #[test]
    fn overlap_picks_shortest_exit() {
        let a = Rect::new(0, 0, 16, 16);
        // b sits to the lower right; shortest way out is up/left
        assert_eq!(a.overlap(&Rect::new(12, 14, 16, 16)), Some((-4, -2)));
        // b to the upper left; push a right/down
        assert_eq!(a.overlap(&Rect::new(-12, -10, 16, 16)), Some((4, 6)));
        assert_eq!(a.overlap(&Rect::new(100, 0, 4, 4)), None);
    }

    #[test]
    fn center_and_containment() {
        let r = Rect::new(10, 20, 9, 4);
        assert_eq!(r.center(), (14, 22));
        assert!(Rect::new(11, 21, 2, 2).inside(&r));
        assert!(!Rect::new(11, 21, 20, 2).inside(&r));
    }

    #[test]
    fn tile_lookups() {
        // 4 tiles wide, 2 tall
        let map = [0, 1, 0, 0, 0, 0, 2, 0];
        assert_eq!(tile_at(8, 0, &map, 4), 1);
        assert_eq!(tile_at(15, 7, &map, 4), 1);
        assert_eq!(tile_at(16, 8, &map, 4), 2);
        assert_eq!(tile_at(-1, 0, &map, 4), 0);
        assert_eq!(tile_at(0, 200, &map, 4), 0);

        assert_eq!(tile_at_ex(16, 0, &map, 4, 16), 1);
        assert_eq!(tile_at_ex(8, 0, &map, 4, 12), 1);
    }

    #[test]
    fn rect_corners_against_map() {
        let map = [0, 1, 0, 0, 0, 0, 0, 0];
        assert!(rect_hits_tile(&Rect::new(0, 0, 9, 8), &map, 4));
        assert!(!rect_hits_tile(&Rect::new(0, 0, 8, 8), &map, 4));
    }

    #[test]
    fn overlap_with_large_coordinates() {
        let wide = Rect::new(-20000, 0, 30000, 1);
        let far = Rect::new(5000, 0, 20000, 1);
        assert_eq!(wide.overlap(&far), Some((-5000, -1)));
        assert_eq!(far.overlap(&wide), Some((5000, -1)));

        // exits longer than i16 saturate
        let full = Rect::new(i16::MIN, 0, 65535, 1);
        assert_eq!(full.overlap(&full), Some((i16::MIN, -1)));
        let tall = Rect::new(0, i16::MIN, 1, 65535);
        assert_eq!(tall.overlap(&tall), Some((-1, i16::MIN)));
    }

    #[test]
    fn corners_at_i16_limits() {
        let solid = [1; 4];
        assert!(!rect_hits_tile(&Rect::new(i16::MIN, 0, 0, 0), &solid, 2));
        assert!(!rect_hits_tile(&Rect::new(i16::MIN, i16::MIN, 0, 0), &solid, 2));
        assert!(!rect_hits_tile(&Rect::new(i16::MAX, i16::MAX, 1, 1), &solid, 2));
        assert!(rect_hits_tile(&Rect::new(i16::MIN, 0, 32776, 8), &solid, 2));
    }
}
