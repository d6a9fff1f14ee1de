//! Simulation state
//!
//! One aggregate owns everything that changes during play. `tick` takes it by
//! mutable reference; nothing lives in globals.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::achievements::Achievements;
use super::camera::Camera;
use super::checkpoint::Checkpoint;
use super::currency::Currency;
use super::enemy::Enemy;
use super::events::GameEvent;
use super::level::Level;
use super::level_manager::LevelManager;
use super::particles::Particle;
use super::pickup::Pickup;
use super::player::Player;
use super::projectile::Projectile;
use super::schedule::Scheduler;
use crate::consts::{VIEWPORT_HEIGHT, VIEWPORT_WIDTH};
use crate::tuning::Tuning;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for Enter
    Menu,
    /// Active gameplay (including level transitions)
    Playing,
    /// Game is paused
    Paused,
    /// Out of lives
    GameOver,
    /// Boss defeated
    Victory,
}

/// Default particle cap when no settings are applied
pub const MAX_PARTICLES: usize = 256;

/// Monotonic entity id source
#[derive(Debug, Clone)]
pub struct EntityIds {
    next: u32,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl EntityIds {
    pub fn next(&mut self) -> u32 {
        let id = self.next;
        self.next = self.next.wrapping_add(1).max(1);
        id
    }
}

#[derive(Debug, Clone)]
pub struct SimulationState {
    pub phase: GamePhase,
    pub tuning: Tuning,
    /// Simulation clock (seconds of gameplay)
    pub time: f64,
    pub frame: u64,
    /// None outside of a run
    pub player: Option<Player>,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub pickups: Vec<Pickup>,
    pub checkpoints: Vec<Checkpoint>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub level_manager: LevelManager,
    pub camera: Camera,
    /// Screen shake intensity (0-1)
    pub screen_shake: f32,
    pub score: u64,
    pub currency: Currency,
    pub achievements: Achievements,
    pub scheduler: Scheduler,
    /// Events since the last drain
    pub events: Vec<GameEvent>,
    /// Running an editor level rather than the campaign
    pub playtest: bool,
    pub max_particles: usize,
    /// Shake and particles are disabled by settings
    pub reduced_motion: bool,
    pub rng: Pcg32,
    ids: EntityIds,
}

impl SimulationState {
    pub fn new(levels: Vec<Level>, tuning: Tuning, seed: u64) -> Self {
        Self {
            phase: GamePhase::Menu,
            tuning,
            time: 0.0,
            frame: 0,
            player: None,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            pickups: Vec::new(),
            checkpoints: Vec::new(),
            particles: Vec::new(),
            level_manager: LevelManager::new(levels),
            camera: Camera::new(Vec2::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT)),
            screen_shake: 0.0,
            score: 0,
            currency: Currency::new(),
            achievements: Achievements::new(),
            scheduler: Scheduler::new(),
            events: Vec::new(),
            playtest: false,
            max_particles: MAX_PARTICLES,
            reduced_motion: false,
            rng: Pcg32::seed_from_u64(seed),
            ids: EntityIds::default(),
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        self.ids.next()
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn level_size(&self) -> Vec2 {
        let map = self.level_manager.tilemap();
        Vec2::new(map.pixel_width(), map.pixel_height())
    }

    pub fn add_shake(&mut self, amount: f32) {
        if !self.reduced_motion {
            self.screen_shake = (self.screen_shake + amount).min(1.0);
        }
    }

    /// Begin a new run at `start_level`. Returns false (and stays put) if
    /// that level cannot be loaded.
    pub fn start_run(&mut self, start_level: usize) -> bool {
        self.level_manager.cancel_transition();
        self.scheduler.clear();
        self.player = None;
        if !self.load_level(start_level) {
            return false;
        }
        self.time = 0.0;
        self.score = 0;
        // The editor sets this again after starting a playtest
        self.playtest = false;
        self.currency.reset();
        self.screen_shake = 0.0;
        self.phase = GamePhase::Playing;
        log::info!("Run started at level {}", start_level);
        // RunStarted precedes the LevelStarted pushed by load_level
        let level_started = self.events.pop();
        self.emit(GameEvent::RunStarted);
        if let Some(event) = level_started {
            self.emit(event);
        }
        true
    }

    /// Swap in level `index`: fresh entities, player reset to the start.
    /// Out-of-range or malformed levels are a logged no-op.
    pub fn load_level(&mut self, index: usize) -> bool {
        let Some(spawn) = self.level_manager.load_level(index, &mut self.ids) else {
            return false;
        };
        self.enemies = spawn.enemies;
        self.pickups = spawn.pickups;
        self.checkpoints = spawn.checkpoints;
        self.projectiles.clear();
        self.particles.clear();
        match self.player.as_mut() {
            Some(player) => player.place_at_level_start(spawn.player_start),
            None => self.player = Some(Player::new(spawn.player_start, &self.tuning)),
        }
        if let Some(player) = &self.player {
            let target = player.center();
            let size = self.level_size();
            self.camera.update(target, size);
        }
        let name = self.level_manager.current_level().map(|l| l.name.clone()).unwrap_or_default();
        self.emit(GameEvent::LevelStarted { index, name });
        true
    }

    /// Full synchronous reset back to the title screen
    pub fn reset_to_menu(&mut self) {
        self.player = None;
        self.enemies.clear();
        self.projectiles.clear();
        self.pickups.clear();
        self.checkpoints.clear();
        self.particles.clear();
        self.scheduler.clear();
        self.level_manager.cancel_transition();
        self.screen_shake = 0.0;
        self.playtest = false;
        self.phase = GamePhase::Menu;
        log::info!("Returned to menu");
    }

    /// Finish the run and report it
    pub fn end_run(&mut self, victory: bool) {
        self.phase = if victory { GamePhase::Victory } else { GamePhase::GameOver };
        if victory {
            self.emit(GameEvent::Victory);
        }
        log::info!(
            "Run ended ({}): score {}, level {}, coins {}",
            if victory { "victory" } else { "game over" },
            self.score,
            self.level_manager.current_index(),
            self.currency.coins
        );
        self.emit(GameEvent::RunEnded {
            score: self.score,
            level_index: self.level_manager.current_index(),
            coins: self.currency.coins,
            victory,
        });
    }
}
