//! Per-body physics integration
//!
//! gravity → friction → position, then tile resolution. A zero step is a
//! no-op so that a degenerate frame never changes state.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, TileContacts, move_and_collide};
use super::tilemap::Tilemap;
use crate::tuning::Tuning;

/// A moving box: position is the top-left corner in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    /// Standing on ground as of the last resolution
    #[serde(default)]
    pub on_ground: bool,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size,
            on_ground: false,
        }
    }

    /// Body standing on the bottom edge of a tile cell
    pub fn standing_in_tile(tx: i32, ty: i32, size: Vec2) -> Self {
        let tile = crate::consts::TILE_SIZE;
        let x = tx as f32 * tile + (tile - size.x) * 0.5;
        let y = (ty + 1) as f32 * tile - size.y;
        Self::new(Vec2::new(x, y), size)
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }
}

/// How a body responds to the world this step
#[derive(Debug, Clone, Copy)]
pub struct Motion {
    /// Multiplier on gravity (0 for flyers)
    pub gravity_scale: f32,
    /// Horizontal thrust is being applied, so friction is skipped
    pub driving: bool,
}

impl Motion {
    pub const GROUNDED: Motion = Motion {
        gravity_scale: 1.0,
        driving: false,
    };
    pub const DRIVEN: Motion = Motion {
        gravity_scale: 1.0,
        driving: true,
    };
    pub const FLYING: Motion = Motion {
        gravity_scale: 0.0,
        driving: true,
    };
}

/// Advance a body by `dt` seconds and resolve it against the tilemap
pub fn integrate(body: &mut Body, map: &Tilemap, tuning: &Tuning, motion: Motion, dt: f32) -> TileContacts {
    if dt <= 0.0 {
        return TileContacts {
            on_ground: body.on_ground,
            ..Default::default()
        };
    }

    if motion.gravity_scale != 0.0 {
        body.vel.y = (body.vel.y + tuning.gravity * motion.gravity_scale * dt).min(tuning.max_fall_speed);
    }

    if !motion.driving {
        body.vel.x *= tuning.friction_factor(dt);
        if body.vel.x.abs() < tuning.rest_speed {
            body.vel.x = 0.0;
        }
    }

    move_and_collide(body, map, body.vel * dt)
}
