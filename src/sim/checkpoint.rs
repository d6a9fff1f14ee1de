//! Checkpoints: active → activated (idempotent respawn point)

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::physics::Body;
use crate::consts::{CHECKPOINT_HEIGHT, CHECKPOINT_WIDTH, PLAYER_HEIGHT, PLAYER_WIDTH};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: u32,
    pub body: Body,
    pub activated: bool,
    /// Flag wave animation clock, runs once activated
    pub glow: f32,
}

impl Checkpoint {
    pub fn spawn(id: u32, tx: i32, ty: i32) -> Self {
        Self {
            id,
            body: Body::standing_in_tile(tx, ty, Vec2::new(CHECKPOINT_WIDTH, CHECKPOINT_HEIGHT)),
            activated: false,
            glow: 0.0,
        }
    }

    pub fn aabb(&self) -> Aabb {
        self.body.aabb()
    }

    pub fn update(&mut self, dt: f32) {
        if self.activated {
            self.glow += dt;
        }
    }

    /// Activate on touch. Returns false (and changes nothing) if already active.
    pub fn activate(&mut self) -> bool {
        if self.activated {
            return false;
        }
        self.activated = true;
        self.glow = 0.0;
        true
    }

    /// Where a player body respawns: standing centered on the checkpoint's floor
    pub fn respawn_position(&self) -> Vec2 {
        Vec2::new(
            self.body.pos.x + (self.body.size.x - PLAYER_WIDTH) * 0.5,
            self.body.bottom() - PLAYER_HEIGHT,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_is_idempotent() {
        let mut cp = Checkpoint::spawn(3, 4, 5);
        assert!(cp.activate());
        cp.update(0.5);
        let glow = cp.glow;
        assert!(!cp.activate());
        assert_eq!(cp.glow, glow);
        assert!(cp.activated);
    }

    #[test]
    fn test_respawn_shares_floor() {
        let cp = Checkpoint::spawn(1, 4, 5);
        let pos = cp.respawn_position();
        assert_eq!(pos.y + PLAYER_HEIGHT, cp.body.bottom());
    }
}
