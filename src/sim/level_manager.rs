//! Level ownership and transitions
//!
//! The manager is the only owner of the live tilemap. Transitions run
//! `Idle → FadingOut → Loading → FadingIn → Idle`; while not idle the
//! game loop suspends gameplay and only the fade advances.

use glam::Vec2;

use super::checkpoint::Checkpoint;
use super::enemy::Enemy;
use super::level::Level;
use super::pickup::Pickup;
use super::player::Player;
use super::state::EntityIds;
use super::tilemap::Tilemap;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionPhase {
    Idle,
    FadingOut { elapsed: f32 },
    /// One frame in which the target level is swapped in
    Loading,
    FadingIn { elapsed: f32 },
}

/// Fresh entities for a just-loaded level
#[derive(Debug, Clone)]
pub struct LevelSpawn {
    /// Player body position
    pub player_start: Vec2,
    pub enemies: Vec<Enemy>,
    pub pickups: Vec<Pickup>,
    pub checkpoints: Vec<Checkpoint>,
}

#[derive(Debug, Clone)]
pub struct LevelManager {
    levels: Vec<Level>,
    current: usize,
    tilemap: Tilemap,
    phase: TransitionPhase,
    pending: Option<usize>,
}

impl LevelManager {
    pub fn new(levels: Vec<Level>) -> Self {
        Self {
            levels,
            current: 0,
            tilemap: Tilemap::new(1, 1),
            phase: TransitionPhase::Idle,
            pending: None,
        }
    }

    pub fn tilemap(&self) -> &Tilemap {
        &self.tilemap
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_level(&self) -> Option<&Level> {
        self.levels.get(self.current)
    }

    pub fn has_next(&self) -> bool {
        self.current + 1 < self.levels.len()
    }

    /// Load level `index` and spawn its entities.
    ///
    /// An out-of-range index or a malformed level logs a warning and leaves
    /// the current level in place.
    pub fn load_level(&mut self, index: usize, ids: &mut EntityIds) -> Option<LevelSpawn> {
        let Some(level) = self.levels.get(index) else {
            log::warn!("Level index {} out of range ({} levels)", index, self.levels.len());
            return None;
        };
        let tilemap = match Tilemap::from_level(level) {
            Ok(map) => map,
            Err(e) => {
                log::warn!("Level {} ('{}') failed to load: {}", index, level.name, e);
                return None;
            }
        };

        let spawn = LevelSpawn {
            player_start: Player::start_position(level.player_start.x, level.player_start.y),
            enemies: level.enemies.iter().map(|s| Enemy::spawn(ids.next(), s.kind, s.x, s.y)).collect(),
            pickups: level.pickups.iter().map(|s| Pickup::spawn(ids.next(), s.kind, s.x, s.y)).collect(),
            checkpoints: level.checkpoints.iter().map(|c| Checkpoint::spawn(ids.next(), c.x, c.y)).collect(),
        };
        log::info!(
            "Loaded level {} '{}' ({}x{}, {} enemies)",
            index,
            level.name,
            level.width,
            level.height,
            spawn.enemies.len()
        );
        self.tilemap = tilemap;
        self.current = index;
        Some(spawn)
    }

    /// Start fading toward `target`. Ignored while a transition is running.
    pub fn begin_transition(&mut self, target: usize) -> bool {
        if self.is_transitioning() {
            return false;
        }
        log::debug!("Transition {} -> {}", self.current, target);
        self.pending = Some(target);
        self.phase = TransitionPhase::FadingOut { elapsed: 0.0 };
        true
    }

    pub fn is_transitioning(&self) -> bool {
        self.phase != TransitionPhase::Idle
    }

    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    /// Advance the transition. Returns the level index to load on the
    /// loading frame.
    pub fn tick(&mut self, tuning: &Tuning, dt: f32) -> Option<usize> {
        match self.phase {
            TransitionPhase::Idle => None,
            TransitionPhase::FadingOut { elapsed } => {
                let elapsed = elapsed + dt;
                self.phase = if elapsed >= tuning.fade_out_time {
                    TransitionPhase::Loading
                } else {
                    TransitionPhase::FadingOut { elapsed }
                };
                None
            }
            TransitionPhase::Loading => {
                self.phase = TransitionPhase::FadingIn { elapsed: 0.0 };
                self.pending.take()
            }
            TransitionPhase::FadingIn { elapsed } => {
                let elapsed = elapsed + dt;
                self.phase = if elapsed >= tuning.fade_in_time {
                    TransitionPhase::Idle
                } else {
                    TransitionPhase::FadingIn { elapsed }
                };
                None
            }
        }
    }

    /// Screen darkness for the fade: 0 clear, 1 black
    pub fn fade_alpha(&self, tuning: &Tuning) -> f32 {
        match self.phase {
            TransitionPhase::Idle => 0.0,
            TransitionPhase::FadingOut { elapsed } => (elapsed / tuning.fade_out_time.max(f32::EPSILON)).min(1.0),
            TransitionPhase::Loading => 1.0,
            TransitionPhase::FadingIn { elapsed } => 1.0 - (elapsed / tuning.fade_in_time.max(f32::EPSILON)).min(1.0),
        }
    }

    /// Drop any running transition
    pub fn cancel_transition(&mut self) {
        self.phase = TransitionPhase::Idle;
        self.pending = None;
    }

    /// Append a level (editor playtest). Returns its index.
    pub fn push_level(&mut self, level: Level) -> usize {
        self.levels.push(level);
        self.levels.len() - 1
    }

    /// Replace the level at `index`, returning false if out of range
    pub fn replace_level(&mut self, index: usize, level: Level) -> bool {
        match self.levels.get_mut(index) {
            Some(slot) => {
                *slot = level;
                true
            }
            None => false,
        }
    }

    /// Tile edits made live, e.g. from the editor during playtest
    pub fn tilemap_mut(&mut self) -> &mut Tilemap {
        &mut self.tilemap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::EnemyKind;
    use crate::sim::level::{EnemySpawn, TilePoint};

    fn manager() -> LevelManager {
        let mut a = Level::bordered("A", 10, 6);
        a.enemies.push(EnemySpawn {
            kind: EnemyKind::Patrol,
            x: 5,
            y: 4,
        });
        a.checkpoints.push(TilePoint::new(3, 4));
        let b = Level::bordered("B", 12, 8);
        LevelManager::new(vec![a, b])
    }

    #[test]
    fn test_load_spawns_entities_with_unique_ids() {
        let mut lm = manager();
        let mut ids = EntityIds::default();
        let spawn = lm.load_level(0, &mut ids).unwrap();
        assert_eq!(spawn.enemies.len(), 1);
        assert_eq!(spawn.checkpoints.len(), 1);
        assert_ne!(spawn.enemies[0].id, spawn.checkpoints[0].id);
        assert_eq!(lm.tilemap().width(), 10);
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let mut lm = manager();
        let mut ids = EntityIds::default();
        lm.load_level(1, &mut ids).unwrap();
        assert!(lm.load_level(7, &mut ids).is_none());
        assert_eq!(lm.current_index(), 1);
        assert_eq!(lm.tilemap().width(), 12);
    }

    #[test]
    fn test_malformed_level_is_noop() {
        let mut lm = manager();
        let mut ids = EntityIds::default();
        lm.load_level(0, &mut ids).unwrap();
        let mut broken = Level::bordered("Broken", 5, 5);
        broken.data[2] = "10x01".to_string();
        let index = lm.push_level(broken);
        assert!(lm.load_level(index, &mut ids).is_none());
        assert_eq!(lm.current_index(), 0);
    }

    #[test]
    fn test_transition_sequence() {
        let mut lm = manager();
        let tuning = Tuning::default();
        assert!(lm.begin_transition(1));
        assert!(!lm.begin_transition(0));
        assert!(lm.is_transitioning());

        let mut loaded = None;
        let mut frames = 0;
        while lm.is_transitioning() && frames < 200 {
            if let Some(index) = lm.tick(&tuning, 0.05) {
                loaded = Some(index);
                assert_eq!(lm.fade_alpha(&tuning), 1.0);
            }
            frames += 1;
        }
        assert_eq!(loaded, Some(1));
        assert_eq!(lm.phase(), TransitionPhase::Idle);
        assert_eq!(lm.fade_alpha(&tuning), 0.0);
    }

    #[test]
    fn test_fade_alpha_rises_while_fading_out() {
        let mut lm = manager();
        let tuning = Tuning::default();
        lm.begin_transition(1);
        lm.tick(&tuning, 0.1);
        let a = lm.fade_alpha(&tuning);
        lm.tick(&tuning, 0.1);
        assert!(lm.fade_alpha(&tuning) > a);
    }
}
