//! Outbound game events
//!
//! The simulation pushes these as things happen; the session drains them
//! once per frame to drive audio, UI, persistence and score submission.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::achievements::Achievement;
use super::enemy::EnemyKind;
use super::pickup::PickupKind;
use super::weapon::WeaponKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted,
    LevelStarted { index: usize, name: String },
    LevelCompleted { index: usize },
    ShotFired { weapon: WeaponKind },
    EnemyHurt { id: u32, damage: f32 },
    EnemyKilled { kind: EnemyKind, score: u64 },
    PlayerHurt { damage: f32 },
    PlayerDied { lives_left: u8 },
    PlayerRespawned,
    PickupCollected { kind: PickupKind },
    CheckpointActivated { id: u32 },
    CoinsEarned { amount: u32 },
    AchievementUnlocked { achievement: Achievement },
    Explosion { pos: Vec2, radius: f32 },
    BossDefeated,
    Victory,
    /// Run finished (victory or out of lives); carries what the backend needs
    RunEnded {
        score: u64,
        level_index: usize,
        coins: u32,
        victory: bool,
    },
    Paused,
    Resumed,
}
