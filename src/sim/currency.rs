//! Coin wallet
//!
//! The displayed total counts up toward the real one. `tick` runs in every
//! phase, including pause, so the HUD keeps animating.

use serde::{Deserialize, Serialize};

/// Coins per second the display counter catches up by (at least)
const COUNT_UP_RATE: f32 = 60.0;
/// Seconds the HUD highlights a fresh gain
const FLASH_TIME: f32 = 0.5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    pub coins: u32,
    /// Animated value shown in the HUD
    pub displayed: f32,
    /// Highlight timer
    pub flash: f32,
}

impl Currency {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, amount: u32) {
        if amount == 0 {
            return;
        }
        self.coins = self.coins.saturating_add(amount);
        self.flash = FLASH_TIME;
    }

    pub fn tick(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.flash = (self.flash - dt).max(0.0);
        let target = self.coins as f32;
        let gap = target - self.displayed;
        if gap.abs() < 0.5 {
            self.displayed = target;
            return;
        }
        let step = (gap.abs() * 4.0).max(COUNT_UP_RATE) * dt;
        self.displayed += step.min(gap.abs()).copysign(gap);
    }

    pub fn displayed_coins(&self) -> u32 {
        self.displayed.round() as u32
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
