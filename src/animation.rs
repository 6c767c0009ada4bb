//! Animation handles - Opaque references to frame sets owned by the asset loader

/// Resource-table id of an animation set.
pub type AnimationId = u32;

// Default frame sets for the spawn presets (id, frame count)
pub const VILLAGER_STAND: AnimationRef = AnimationRef::new(418, 6);
pub const VILLAGER_WALK: AnimationRef = AnimationRef::new(657, 15);
pub const BERRY_BUSH: AnimationRef = AnimationRef::new(240, 1);
pub const TREE: AnimationRef = AnimationRef::new(463, 4);
pub const GOLD_MINE: AnimationRef = AnimationRef::new(481, 7);
pub const STONE_MINE: AnimationRef = AnimationRef::new(622, 7);
pub const TOWN_CENTER: AnimationRef = AnimationRef::new(280, 4);
pub const TOWN_CENTER_OVERLAY: AnimationRef = AnimationRef::new(254, 4);
pub const HOUSE: AnimationRef = AnimationRef::new(230, 4);
pub const HOUSE_OVERLAY: AnimationRef = AnimationRef::new(226, 4);
pub const DEBRIS: AnimationRef = AnimationRef::new(366, 8);

/// Non-owning handle to a loaded frame set. Entities keep this plus a frame
/// index; pixel data stays with the loader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnimationRef {
    pub id: AnimationId,
    pub frame_count: u32,
}

impl AnimationRef {
    pub const fn new(id: AnimationId, frame_count: u32) -> Self {
        Self { id, frame_count }
    }

    /// Frame index if `index` is in range.
    pub fn frame(&self, index: u32) -> Option<u32> {
        (index < self.frame_count).then_some(index)
    }

    /// Next frame index, wrapping at the end of the set.
    pub fn next_frame(&self, index: u32) -> u32 {
        if self.frame_count == 0 { 0 } else { (index + 1) % self.frame_count }
    }
}
