//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - One clamped variable step per frame
//! - Seeded RNG only
//! - Delayed effects go through the scheduler, never wall-clock timers
//! - No rendering or platform dependencies

pub mod achievements;
pub mod camera;
pub mod checkpoint;
pub mod collision;
pub mod currency;
pub mod enemy;
pub mod events;
pub mod level;
pub mod level_manager;
pub mod particles;
pub mod physics;
pub mod pickup;
pub mod player;
pub mod projectile;
pub mod schedule;
pub mod state;
pub mod tick;
pub mod tile;
pub mod tilemap;
pub mod weapon;

pub use achievements::{Achievement, Achievements};
pub use camera::Camera;
pub use checkpoint::Checkpoint;
pub use collision::{Aabb, AllPairs, BroadPhase, TileContacts};
pub use currency::Currency;
pub use enemy::{Enemy, EnemyKind};
pub use events::GameEvent;
pub use level::{EnemySpawn, Level, LevelError, PickupSpawn, TilePoint};
pub use level_manager::{LevelManager, TransitionPhase};
pub use particles::{Particle, ParticleKind};
pub use physics::Body;
pub use pickup::{Pickup, PickupKind};
pub use player::{LifeState, Player};
pub use projectile::{Projectile, ProjectileState, Side};
pub use schedule::{ScheduledAction, Scheduler};
pub use state::{GamePhase, SimulationState};
pub use tick::{TickInput, tick};
pub use tile::Tile;
pub use tilemap::Tilemap;
pub use weapon::{ProjectileKind, WeaponKind};
