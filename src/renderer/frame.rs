//! Read-only frame snapshot
//!
//! Everything a drawing backend needs for one frame, flattened out of the
//! simulation state. Positions are world pixels; subtract `camera` to get
//! screen pixels. Building a frame never mutates the simulation.

use glam::Vec2;

use crate::consts::TILE_SIZE;
use crate::settings::Settings;
use crate::sim::{
    EnemyKind, GamePhase, LifeState, ParticleKind, PickupKind, ProjectileKind, Side, SimulationState, Tile,
    WeaponKind,
};

/// Peak shake displacement in pixels
const SHAKE_PIXELS: f32 = 12.0;

/// Blink period while invulnerable (seconds)
const BLINK_PERIOD: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpriteKind {
    Player,
    Enemy(EnemyKind),
    Projectile(ProjectileKind, Side),
    Pickup(PickupKind),
    Checkpoint { activated: bool },
    Particle(ParticleKind),
}

/// Per-sprite presentation flags
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualState {
    /// +1 right, -1 left
    pub facing: f32,
    /// Draw white for a hit flash
    pub flash: bool,
    /// Dying animation progress 0-1, None while alive
    pub dying: Option<f32>,
    /// Opacity 0-1
    pub alpha: f32,
}

impl Default for VisualState {
    fn default() -> Self {
        Self {
            facing: 1.0,
            flash: false,
            dying: None,
            alpha: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub kind: SpriteKind,
    /// Top-left, world pixels
    pub pos: Vec2,
    pub size: Vec2,
    pub visual: VisualState,
}

/// A visible non-empty tile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileSprite {
    pub tx: i32,
    pub ty: i32,
    pub tile: Tile,
}

impl TileSprite {
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.tx as f32, self.ty as f32) * TILE_SIZE
    }
}

/// Heads-up display numbers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hud {
    pub health: f32,
    pub armor: f32,
    pub weapon: WeaponKind,
    /// None for infinite ammo
    pub ammo: Option<u32>,
    pub lives: u8,
    pub score: u64,
    /// Animated coin counter
    pub coins: u32,
    /// Seconds of coin counter highlight left
    pub coin_flash: f32,
    pub level_name: String,
    /// Living boss health fraction
    pub boss_health: Option<f32>,
    /// Transient message (achievement, high score)
    pub banner: Option<String>,
    /// Frames per second, when the counter is enabled
    pub fps: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub phase: GamePhase,
    /// View top-left in world pixels, shake included
    pub camera: Vec2,
    pub viewport: Vec2,
    pub tiles: Vec<TileSprite>,
    /// Back to front
    pub sprites: Vec<Sprite>,
    /// Level transition darkness, 0 clear to 1 black
    pub fade_alpha: f32,
    pub hud: Hud,
    pub playtest: bool,
    pub high_contrast: bool,
    /// Draw the parallax backdrop behind the tiles
    pub backdrop: bool,
}

/// A drawing backend
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame);

    fn resize(&mut self, _width: u32, _height: u32) {}
}

/// Flatten the simulation into a frame snapshot
pub fn build_frame(state: &SimulationState, settings: &Settings) -> RenderFrame {
    let camera = state.camera;
    let flash_enabled = settings.effective_hurt_flash();

    let tiles = state
        .level_manager
        .tilemap()
        .tiles_in_rect(camera.offset.x, camera.offset.y, camera.viewport.x, camera.viewport.y)
        .filter(|(_, _, tile)| *tile != Tile::Empty)
        .map(|(tx, ty, tile)| TileSprite { tx, ty, tile })
        .collect();

    let mut sprites = Vec::new();

    for cp in &state.checkpoints {
        if camera.is_visible(cp.body.pos, cp.body.size) {
            sprites.push(Sprite {
                kind: SpriteKind::Checkpoint { activated: cp.activated },
                pos: cp.body.pos,
                size: cp.body.size,
                visual: VisualState::default(),
            });
        }
    }

    for pickup in state.pickups.iter().filter(|p| p.is_active()) {
        let pos = pickup.body.pos + Vec2::new(0.0, pickup.bob_offset());
        if camera.is_visible(pos, pickup.body.size) {
            sprites.push(Sprite {
                kind: SpriteKind::Pickup(pickup.kind),
                pos,
                size: pickup.body.size,
                visual: VisualState::default(),
            });
        }
    }

    let enemy_death_time = state.tuning.enemy_death_time.max(f32::EPSILON);
    for enemy in state.enemies.iter().filter(|e| !e.is_dead()) {
        if !camera.is_visible(enemy.body.pos, enemy.body.size) {
            continue;
        }
        let dying = match enemy.state {
            LifeState::Dying { elapsed } => Some((elapsed / enemy_death_time).min(1.0)),
            _ => None,
        };
        sprites.push(Sprite {
            kind: SpriteKind::Enemy(enemy.kind),
            pos: enemy.body.pos,
            size: enemy.body.size,
            visual: VisualState {
                facing: enemy.facing,
                flash: flash_enabled && enemy.hurt_flash > 0.0,
                dying,
                alpha: 1.0 - dying.unwrap_or(0.0),
            },
        });
    }

    if let Some(player) = &state.player
        && player.life != LifeState::Dead
    {
        let dying = match player.life {
            LifeState::Dying { elapsed } => Some((elapsed / state.tuning.player_death_time.max(f32::EPSILON)).min(1.0)),
            _ => None,
        };
        // Blink while invulnerable
        let blink_off = player.invulnerable > 0.0 && ((player.invulnerable / BLINK_PERIOD) as u32) % 2 == 1;
        sprites.push(Sprite {
            kind: SpriteKind::Player,
            pos: player.body.pos,
            size: player.body.size,
            visual: VisualState {
                facing: player.facing,
                flash: false,
                dying,
                alpha: if blink_off { 0.35 } else { 1.0 },
            },
        });
    }

    for projectile in state.projectiles.iter().filter(|p| p.is_alive()) {
        if camera.is_visible(projectile.pos, projectile.size) {
            sprites.push(Sprite {
                kind: SpriteKind::Projectile(projectile.kind, projectile.owner),
                pos: projectile.pos,
                size: projectile.size,
                visual: VisualState {
                    facing: projectile.vel.x.signum(),
                    ..VisualState::default()
                },
            });
        }
    }

    let particle_cap = settings.max_particles();
    for particle in state.particles.iter().take(particle_cap) {
        let size = Vec2::splat(particle.size);
        let pos = particle.pos - size * 0.5;
        if camera.is_visible(pos, size) {
            sprites.push(Sprite {
                kind: SpriteKind::Particle(particle.kind),
                pos,
                size,
                visual: VisualState {
                    alpha: particle.life.clamp(0.0, 1.0),
                    ..VisualState::default()
                },
            });
        }
    }

    RenderFrame {
        phase: state.phase,
        camera: camera.offset + shake_offset(state, settings),
        viewport: camera.viewport,
        tiles,
        sprites,
        fade_alpha: state.level_manager.fade_alpha(&state.tuning),
        hud: build_hud(state),
        playtest: state.playtest,
        high_contrast: settings.high_contrast,
        backdrop: settings.backdrop() && !settings.high_contrast,
    }
}

/// Camera displacement from screen shake. Derived from the frame counter so
/// drawing never consumes simulation randomness.
fn shake_offset(state: &SimulationState, settings: &Settings) -> Vec2 {
    if !settings.effective_screen_shake() || state.screen_shake <= 0.0 {
        return Vec2::ZERO;
    }
    let t = state.frame as f32;
    Vec2::new((t * 12.9898).sin(), (t * 78.233).cos()) * state.screen_shake * SHAKE_PIXELS
}

fn build_hud(state: &SimulationState) -> Hud {
    let boss_health = state
        .enemies
        .iter()
        .find(|e| e.kind == EnemyKind::Boss && e.is_alive())
        .map(|boss| boss.health / boss.stats().max_health);
    let level_name = state.level_manager.current_level().map(|l| l.name.clone()).unwrap_or_default();

    let mut hud = Hud {
        score: state.score,
        coins: state.currency.displayed_coins(),
        coin_flash: state.currency.flash,
        level_name,
        boss_health,
        ..Hud::default()
    };
    if let Some(player) = &state.player {
        hud.health = player.health.max(0.0);
        hud.armor = player.armor;
        hud.weapon = player.weapon;
        hud.ammo = player.current_ammo();
        hud.lives = player.lives;
    }
    hud
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::QualityPreset;
    use crate::sim::level::{EnemySpawn, Level};
    use crate::tuning::Tuning;

    fn running_state() -> SimulationState {
        let mut level = Level::bordered("Arena", 20, 10);
        level.enemies.push(EnemySpawn {
            kind: EnemyKind::Boss,
            x: 12,
            y: 8,
        });
        let mut state = SimulationState::new(vec![level], Tuning::default(), 3);
        assert!(state.start_run(0));
        state
    }

    #[test]
    fn test_frame_has_player_tiles_and_boss_bar() {
        let state = running_state();
        let frame = build_frame(&state, &Settings::default());
        assert!(frame.sprites.iter().any(|s| s.kind == SpriteKind::Player));
        assert!(frame.tiles.iter().all(|t| t.tile != Tile::Empty));
        assert!(!frame.tiles.is_empty());
        assert_eq!(frame.hud.boss_health, Some(1.0));
        assert_eq!(frame.hud.level_name, "Arena");
        assert_eq!(frame.hud.ammo, None);
        assert_eq!(frame.fade_alpha, 0.0);
    }

    #[test]
    fn test_shake_respects_reduced_motion() {
        let mut state = running_state();
        state.screen_shake = 1.0;
        state.frame = 7;
        let shaken = build_frame(&state, &Settings::default());
        assert_ne!(shaken.camera, state.camera.offset);

        let calm = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        assert_eq!(build_frame(&state, &calm).camera, state.camera.offset);
    }

    #[test]
    fn test_backdrop_off_on_low_quality_and_high_contrast() {
        let state = running_state();
        assert!(build_frame(&state, &Settings::default()).backdrop);
        assert!(!build_frame(&state, &Settings::from_preset(QualityPreset::Low)).backdrop);
        let contrast = Settings {
            high_contrast: true,
            ..Settings::default()
        };
        assert!(!build_frame(&state, &contrast).backdrop);
    }

    #[test]
    fn test_dead_enemies_not_drawn() {
        let mut state = running_state();
        for enemy in &mut state.enemies {
            enemy.state = LifeState::Dead;
        }
        let frame = build_frame(&state, &Settings::default());
        assert!(!frame.sprites.iter().any(|s| matches!(s.kind, SpriteKind::Enemy(_))));
    }

    #[test]
    fn test_menu_frame_without_player() {
        let state = SimulationState::new(vec![Level::bordered("A", 10, 8)], Tuning::default(), 1);
        let frame = build_frame(&state, &Settings::default());
        assert_eq!(frame.phase, GamePhase::Menu);
        assert_eq!(frame.hud.lives, 0);
    }
}
