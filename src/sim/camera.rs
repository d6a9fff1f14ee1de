//! Viewport follow
//!
//! The camera is a pure function of the followed point, the viewport and the
//! level size. It is recomputed every frame and never saved.

use glam::Vec2;

/// Top-left of the visible region in world pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub offset: Vec2,
    pub viewport: Vec2,
}

impl Camera {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            offset: Vec2::ZERO,
            viewport,
        }
    }

    pub fn update(&mut self, target: Vec2, level_size: Vec2) {
        self.offset = follow(target, self.viewport, level_size);
    }

    /// Whether a world-space box is at least partly on screen
    pub fn is_visible(&self, pos: Vec2, size: Vec2) -> bool {
        pos.x + size.x > self.offset.x
            && pos.x < self.offset.x + self.viewport.x
            && pos.y + size.y > self.offset.y
            && pos.y < self.offset.y + self.viewport.y
    }
}

/// Center `target` in the viewport, clamped so the view never leaves the level.
/// A level smaller than the viewport is pinned to the origin on that axis.
pub fn follow(target: Vec2, viewport: Vec2, level_size: Vec2) -> Vec2 {
    let max = (level_size - viewport).max(Vec2::ZERO);
    (target - viewport * 0.5).clamp(Vec2::ZERO, max)
}
