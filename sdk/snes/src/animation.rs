//! # Animation
//!
//! Frame-sequence playback for up to [`MAX_SLOTS`] sprites. An [`Animation`]
//! is a list of tile/frame ids shown for `delay` vblanks each; an
//! [`Animator`] slot plays one of them. Call [`Animator::update`] once per
//! frame.
//!
//! ```ignore
//! const WALK: Animation = Animation::new(&[0, 2, 4, 2], 8, true);
//!
//! let mut anims = Animator::new();
//! anims.init(0, WALK);
//! anims.play(0);
//! loop {
//!     console.wait_for_vblank(&mut bus);
//!     anims.update();
//!     oam.set_tile(0, anims.frame(0) as u16);
//! }
//! ```

pub const MAX_SLOTS: usize = 32;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Animation<'a> {
    pub frames: &'a [u8],
    /// Vblanks per frame.
    pub delay: u8,
    pub looping: bool,
}

impl<'a> Animation<'a> {
    pub const fn new(frames: &'a [u8], delay: u8, looping: bool) -> Self {
        Self { frames, delay, looping }
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AnimState {
    Stopped,
    Playing,
    Paused,
    /// A non-looping animation reached its last frame.
    Finished,
}

#[derive(Debug, Copy, Clone)]
struct AnimSlot<'a> {
    anim: Option<Animation<'a>>,
    frame: u8,
    counter: u8,
    state: AnimState,
}

impl AnimSlot<'_> {
    const EMPTY: Self = Self {
        anim: None,
        frame: 0,
        counter: 0,
        state: AnimState::Stopped,
    };
}

/// Fixed pool of animation slots.
#[derive(Debug, Clone)]
pub struct Animator<'a> {
    slots: [AnimSlot<'a>; MAX_SLOTS],
}

impl Default for Animator<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Animator<'a> {
    pub const fn new() -> Self {
        Self {
            slots: [AnimSlot::EMPTY; MAX_SLOTS],
        }
    }

    fn slot(&mut self, id: u8) -> Option<&mut AnimSlot<'a>> {
        self.slots.get_mut(id as usize)
    }

    /// Assign `anim` to slot `id`, stopped on frame 0.
    pub fn init(&mut self, id: u8, anim: Animation<'a>) {
        if let Some(slot) = self.slot(id) {
            *slot = AnimSlot {
                anim: Some(anim),
                frame: 0,
                counter: anim.delay,
                state: AnimState::Stopped,
            };
        }
    }

    /// Restart from frame 0.
    pub fn play(&mut self, id: u8) {
        if let Some(slot) = self.slot(id) {
            if let Some(anim) = slot.anim {
                slot.frame = 0;
                slot.counter = anim.delay;
                slot.state = AnimState::Playing;
            }
        }
    }

    pub fn stop(&mut self, id: u8) {
        if let Some(slot) = self.slot(id) {
            slot.frame = 0;
            slot.counter = 0;
            slot.state = AnimState::Stopped;
        }
    }

    pub fn pause(&mut self, id: u8) {
        if let Some(slot) = self.slot(id) {
            if slot.state == AnimState::Playing {
                slot.state = AnimState::Paused;
            }
        }
    }

    pub fn resume(&mut self, id: u8) {
        if let Some(slot) = self.slot(id) {
            if slot.state == AnimState::Paused {
                slot.state = AnimState::Playing;
            }
        }
    }

    /// Advance every playing slot by one vblank.
    pub fn update(&mut self) {
        for slot in self.slots.iter_mut() {
            if slot.state != AnimState::Playing {
                continue;
            }
            let Some(anim) = slot.anim else {
                continue;
            };

            slot.counter = slot.counter.saturating_sub(1);
            if slot.counter != 0 {
                continue;
            }

            slot.frame = slot.frame.wrapping_add(1);
            if slot.frame as usize >= anim.frame_count() {
                if anim.looping {
                    slot.frame = 0;
                } else {
                    slot.frame = anim.frame_count().saturating_sub(1) as u8;
                    slot.state = AnimState::Finished;
                    continue;
                }
            }
            slot.counter = anim.delay;
        }
    }

    /// Frame id currently shown, or 0 for an empty or invalid slot.
    pub fn frame(&self, id: u8) -> u8 {
        self.slots
            .get(id as usize)
            .and_then(|slot| slot.anim.and_then(|a| a.frames.get(slot.frame as usize).copied()))
            .unwrap_or(0)
    }

    /// Position in the frame list.
    pub fn frame_index(&self, id: u8) -> u8 {
        self.slots.get(id as usize).map_or(0, |s| s.frame)
    }

    pub fn state(&self, id: u8) -> AnimState {
        self.slots.get(id as usize).map_or(AnimState::Stopped, |s| s.state)
    }

    pub fn is_playing(&self, id: u8) -> bool {
        self.state(id) == AnimState::Playing
    }

    pub fn is_finished(&self, id: u8) -> bool {
        self.state(id) == AnimState::Finished
    }

    /// Change the per-frame delay; the frame being shown runs out its
    /// current countdown first.
    pub fn set_speed(&mut self, id: u8, delay: u8) {
        if let Some(slot) = self.slot(id) {
            if let Some(anim) = slot.anim.as_mut() {
                anim.delay = delay;
            }
        }
    }

    /// Jump to `frame`, clamped to the last one.
    pub fn set_frame(&mut self, id: u8, frame: u8) {
        if let Some(slot) = self.slot(id) {
            if let Some(anim) = slot.anim {
                let last = anim.frame_count().saturating_sub(1);
                slot.frame = (frame as usize).min(last) as u8;
                slot.counter = anim.delay;
            }
        }
    }

    /// Swap the animation without changing state. The frame index is kept
    /// when the new animation is long enough.
    pub fn set_animation(&mut self, id: u8, anim: Animation<'a>) {
        if let Some(slot) = self.slot(id) {
            slot.anim = Some(anim);
            if slot.frame as usize >= anim.frame_count() {
                slot.frame = 0;
            }
            slot.counter = anim.delay;
        }
    }
}
