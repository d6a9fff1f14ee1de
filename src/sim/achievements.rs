//! One-shot achievements

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Achievement {
    /// First enemy kill
    FirstBlood,
    /// Fifty kills in one run
    Slayer,
    /// Killed the boss
    BossSlayer,
    /// Finished a level without taking damage
    Untouchable,
    /// Held a hundred coins at once
    Hoarder,
}

pub const SLAYER_KILLS: u32 = 50;
pub const HOARDER_COINS: u32 = 100;

impl Achievement {
    pub const ALL: [Achievement; 5] = [
        Achievement::FirstBlood,
        Achievement::Slayer,
        Achievement::BossSlayer,
        Achievement::Untouchable,
        Achievement::Hoarder,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Achievement::FirstBlood => "First Blood",
            Achievement::Slayer => "Slayer",
            Achievement::BossSlayer => "Boss Slayer",
            Achievement::Untouchable => "Untouchable",
            Achievement::Hoarder => "Hoarder",
        }
    }
}

/// Unlocked set, kept in unlock order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Achievements {
    unlocked: Vec<Achievement>,
}

impl Achievements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_unlocked(list: &[Achievement]) -> Self {
        let mut a = Self::new();
        for &item in list {
            a.unlock(item);
        }
        a
    }

    pub fn is_unlocked(&self, achievement: Achievement) -> bool {
        self.unlocked.contains(&achievement)
    }

    /// Returns true only the first time
    pub fn unlock(&mut self, achievement: Achievement) -> bool {
        if self.is_unlocked(achievement) {
            return false;
        }
        self.unlocked.push(achievement);
        true
    }

    pub fn unlocked(&self) -> &[Achievement] {
        &self.unlocked
    }

    /// Achievements earned by a kill count, newly unlocked ones only
    pub fn check_kills(&mut self, kills: u32) -> Vec<Achievement> {
        let mut fresh = Vec::new();
        if kills >= 1 && self.unlock(Achievement::FirstBlood) {
            fresh.push(Achievement::FirstBlood);
        }
        if kills >= SLAYER_KILLS && self.unlock(Achievement::Slayer) {
            fresh.push(Achievement::Slayer);
        }
        fresh
    }

    pub fn check_coins(&mut self, coins: u32) -> Option<Achievement> {
        (coins >= HOARDER_COINS && self.unlock(Achievement::Hoarder)).then_some(Achievement::Hoarder)
    }
}
