//! Data-driven game balance
//!
//! Every gameplay constant that a designer might want to tweak lives here.
//! Values deserialize from JSON with per-field defaults, so a tuning file only
//! needs the fields it overrides.

use serde::{Deserialize, Serialize};

/// Physics and combat tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Movement ===
    /// Downward acceleration (pixels/s²)
    pub gravity: f32,
    /// Terminal fall speed (pixels/s)
    pub max_fall_speed: f32,
    /// Player horizontal run speed (pixels/s)
    pub move_speed: f32,
    /// Initial upward speed of a jump (pixels/s, positive value)
    pub jump_speed: f32,
    /// Fraction of horizontal velocity kept after one second without input
    pub friction_per_second: f32,
    /// Horizontal speeds below this snap to zero
    pub rest_speed: f32,

    // === Player combat ===
    pub player_max_health: f32,
    pub player_max_armor: f32,
    /// Fraction of incoming damage soaked by armor (while armor lasts)
    pub armor_absorption: f32,
    /// Invulnerability granted after taking a hit (seconds)
    pub hurt_invulnerability: f32,
    /// Invulnerability granted by the invincibility pickup (seconds)
    pub invincibility_duration: f32,
    /// Damage per spike contact
    pub spike_damage: f32,
    pub starting_lives: u8,

    // === Timing ===
    /// Player death animation length before respawn/game over (seconds)
    pub player_death_time: f32,
    /// Enemy death animation length before removal (seconds)
    pub enemy_death_time: f32,
    pub fade_out_time: f32,
    pub fade_in_time: f32,
    /// Delay between boss death and the victory screen (seconds)
    pub victory_delay: f32,

    // === Rewards ===
    pub boss_bonus_score: u64,
    pub level_complete_score: u64,
    pub coin_pickup_value: u32,

    // === Presentation ===
    /// Screen shake decay multiplier applied per second
    pub shake_decay_per_second: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 1800.0,
            max_fall_speed: 900.0,
            move_speed: 220.0,
            jump_speed: 640.0,
            friction_per_second: 0.0005,
            rest_speed: 2.0,

            player_max_health: 100.0,
            player_max_armor: 100.0,
            armor_absorption: 0.5,
            hurt_invulnerability: 0.75,
            invincibility_duration: 10.0,
            spike_damage: 20.0,
            starting_lives: 3,

            player_death_time: 1.2,
            enemy_death_time: 0.5,
            fade_out_time: 0.4,
            fade_in_time: 0.4,
            victory_delay: 2.0,

            boss_bonus_score: 5000,
            level_complete_score: 1000,
            coin_pickup_value: 5,

            shake_decay_per_second: 0.002,
        }
    }
}

impl Tuning {
    /// Parse tuning overrides from JSON, falling back to defaults on error
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Invalid tuning JSON ({}), using defaults", e);
                Self::default()
            }
        }
    }

    /// Horizontal friction factor for a step of `dt` seconds
    #[inline]
    pub fn friction_factor(&self, dt: f32) -> f32 {
        self.friction_per_second.powf(dt)
    }
}
