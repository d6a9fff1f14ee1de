//! Enemies
//!
//! One struct for every enemy; the kind selects a data row and a movement
//! policy. Enemies never apply game-level consequences of their own death,
//! the loop reads their state and does that.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, ground_ahead, wall_ahead};
use super::physics::{Body, Motion, integrate};
use super::player::LifeState;
use super::tilemap::Tilemap;
use super::weapon::{ProjectileKind, WeaponSpec};
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    /// Walks back and forth, turning at walls and ledges
    Patrol,
    /// Patrols slowly, stops and fires plasma at the player in sight
    Shooter,
    /// Ignores gravity; hovers until the player comes close, then dives
    Flying,
    /// Slow, tough, fires rocket volleys; enrages at half health
    Boss,
}

/// Static per-kind data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub max_health: f32,
    /// Walk or flight speed (pixels/s)
    pub speed: f32,
    /// Damage dealt on touch
    pub contact_damage: f32,
    pub score: u64,
    pub coins: u32,
    pub size: Vec2,
    /// Seconds between attacks (0 = never fires)
    pub fire_cooldown: f32,
    pub shot: Option<&'static WeaponSpec>,
    /// Projectiles per attack
    pub volley: u32,
    /// Player distance at which the enemy reacts (pixels)
    pub sight_range: f32,
}

const ENEMY_PLASMA: WeaponSpec = WeaponSpec {
    projectile: ProjectileKind::Plasma,
    damage: 10.0,
    speed: 380.0,
    cooldown: 0.0,
    pellets: 1,
    spread: 0.0,
    ammo_per_shot: 0,
    max_ammo: 0,
    grant_ammo: 0,
    pickup_ammo: 0,
    piercing: false,
    explosive_radius: None,
    range: 700.0,
};

const BOSS_ROCKET: WeaponSpec = WeaponSpec {
    projectile: ProjectileKind::Rocket,
    damage: 20.0,
    speed: 420.0,
    cooldown: 0.0,
    pellets: 1,
    spread: 0.25,
    ammo_per_shot: 0,
    max_ammo: 0,
    grant_ammo: 0,
    pickup_ammo: 0,
    piercing: false,
    explosive_radius: None,
    range: 1000.0,
};

const PATROL: EnemyStats = EnemyStats {
    max_health: 40.0,
    speed: 70.0,
    contact_damage: 15.0,
    score: 100,
    coins: 2,
    size: Vec2::new(28.0, 40.0),
    fire_cooldown: 0.0,
    shot: None,
    volley: 0,
    sight_range: 0.0,
};

const SHOOTER: EnemyStats = EnemyStats {
    max_health: 50.0,
    speed: 45.0,
    contact_damage: 10.0,
    score: 150,
    coins: 3,
    size: Vec2::new(28.0, 42.0),
    fire_cooldown: 1.6,
    shot: Some(&ENEMY_PLASMA),
    volley: 1,
    sight_range: 420.0,
};

const FLYING: EnemyStats = EnemyStats {
    max_health: 30.0,
    speed: 110.0,
    contact_damage: 12.0,
    score: 200,
    coins: 3,
    size: Vec2::new(30.0, 26.0),
    fire_cooldown: 0.0,
    shot: None,
    volley: 0,
    sight_range: 300.0,
};

const BOSS: EnemyStats = EnemyStats {
    max_health: 800.0,
    speed: 55.0,
    contact_damage: 30.0,
    score: 2000,
    coins: 50,
    size: Vec2::new(72.0, 96.0),
    fire_cooldown: 2.2,
    shot: Some(&BOSS_ROCKET),
    volley: 3,
    sight_range: 700.0,
};

impl EnemyKind {
    pub const ALL: [EnemyKind; 4] = [EnemyKind::Patrol, EnemyKind::Shooter, EnemyKind::Flying, EnemyKind::Boss];

    pub fn stats(self) -> &'static EnemyStats {
        match self {
            EnemyKind::Patrol => &PATROL,
            EnemyKind::Shooter => &SHOOTER,
            EnemyKind::Flying => &FLYING,
            EnemyKind::Boss => &BOSS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EnemyKind::Patrol => "patrol",
            EnemyKind::Shooter => "shooter",
            EnemyKind::Flying => "flying",
            EnemyKind::Boss => "boss",
        }
    }
}

/// An attack the loop should turn into projectiles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyShot {
    pub spec: &'static WeaponSpec,
    pub origin: Vec2,
    pub dir: Vec2,
    /// Projectiles fanned around `dir`, `spec.spread` radians apart
    pub volley: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub body: Body,
    pub health: f32,
    pub state: LifeState,
    /// +1 right, -1 left
    pub facing: f32,
    pub fire_timer: f32,
    /// Seconds of hit flash left (presentation)
    pub hurt_flash: f32,
    /// Hover oscillator for flyers
    pub phase: f32,
    /// Rewards for this death have been handed out
    pub scored: bool,
    /// Hover altitude for flyers
    pub home_y: f32,
}

impl Enemy {
    /// Place an enemy standing in a tile cell
    pub fn spawn(id: u32, kind: EnemyKind, tx: i32, ty: i32) -> Self {
        let stats = kind.stats();
        let body = Body::standing_in_tile(tx, ty, stats.size);
        Self {
            id,
            kind,
            health: stats.max_health,
            state: LifeState::Alive,
            facing: if id % 2 == 0 { 1.0 } else { -1.0 },
            // Stagger the first attack so groups do not fire in unison
            fire_timer: stats.fire_cooldown * (0.5 + (id % 5) as f32 * 0.1),
            hurt_flash: 0.0,
            phase: id as f32 * 0.9,
            scored: false,
            home_y: body.pos.y,
            body,
        }
    }

    pub fn stats(&self) -> &'static EnemyStats {
        self.kind.stats()
    }

    pub fn is_alive(&self) -> bool {
        self.state == LifeState::Alive
    }

    pub fn is_dead(&self) -> bool {
        self.state == LifeState::Dead
    }

    pub fn aabb(&self) -> Aabb {
        self.body.aabb()
    }

    pub fn center(&self) -> Vec2 {
        self.body.center()
    }

    /// Boss below half health
    pub fn is_enraged(&self) -> bool {
        self.kind == EnemyKind::Boss && self.health < self.stats().max_health * 0.5
    }

    /// Apply damage. Returns true if this hit killed the enemy.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if !self.is_alive() || amount <= 0.0 {
            return false;
        }
        self.health -= amount;
        self.hurt_flash = 0.15;
        if self.health <= 0.0 {
            self.health = 0.0;
            self.state = LifeState::Dying { elapsed: 0.0 };
            return true;
        }
        false
    }

    /// Advance one frame. `target` is the center of a living player, if any.
    pub fn update(&mut self, target: Option<Vec2>, map: &Tilemap, tuning: &Tuning, dt: f32) -> Option<EnemyShot> {
        if dt <= 0.0 {
            return None;
        }
        self.hurt_flash = (self.hurt_flash - dt).max(0.0);

        match self.state {
            LifeState::Alive => {}
            LifeState::Dying { elapsed } => {
                let elapsed = elapsed + dt;
                self.state = if elapsed >= tuning.enemy_death_time {
                    LifeState::Dead
                } else {
                    LifeState::Dying { elapsed }
                };
                self.body.vel.x = 0.0;
                integrate(&mut self.body, map, tuning, Motion::GROUNDED, dt);
                return None;
            }
            LifeState::Dead => return None,
        }

        self.phase += dt;
        let shot = match self.kind {
            EnemyKind::Patrol => {
                self.patrol(self.stats().speed, map, tuning, dt);
                None
            }
            EnemyKind::Shooter => self.update_shooter(target, map, tuning, dt),
            EnemyKind::Flying => {
                self.update_flying(target, map, tuning, dt);
                None
            }
            EnemyKind::Boss => self.update_boss(target, map, tuning, dt),
        };

        // Fell out of the world: gone without rewards
        if self.body.pos.y > map.pixel_height() + self.body.size.y {
            self.state = LifeState::Dead;
            self.scored = true;
        }
        shot
    }

    fn patrol(&mut self, speed: f32, map: &Tilemap, tuning: &Tuning, dt: f32) {
        if wall_ahead(&self.body, map, self.facing) || (self.body.on_ground && !ground_ahead(&self.body, map, self.facing)) {
            self.facing = -self.facing;
        }
        self.body.vel.x = self.facing * speed;
        let contacts = integrate(&mut self.body, map, tuning, Motion::DRIVEN, dt);
        if contacts.hit_wall {
            self.facing = -self.facing;
        }
    }

    fn sees(&self, target: Option<Vec2>, vertical_reach: f32) -> Option<Vec2> {
        let target = target?;
        let delta = target - self.center();
        (delta.length() <= self.stats().sight_range && delta.y.abs() <= vertical_reach).then_some(delta)
    }

    fn tick_fire_timer(&mut self, cooldown: f32, dt: f32) -> bool {
        self.fire_timer -= dt;
        if self.fire_timer <= 0.0 {
            self.fire_timer = cooldown;
            true
        } else {
            false
        }
    }

    fn update_shooter(&mut self, target: Option<Vec2>, map: &Tilemap, tuning: &Tuning, dt: f32) -> Option<EnemyShot> {
        let stats = self.stats();
        match self.sees(target, 64.0) {
            Some(delta) => {
                self.facing = if delta.x < 0.0 { -1.0 } else { 1.0 };
                self.body.vel.x = 0.0;
                integrate(&mut self.body, map, tuning, Motion::GROUNDED, dt);
                let spec = stats.shot?;
                self.tick_fire_timer(stats.fire_cooldown, dt).then(|| EnemyShot {
                    spec,
                    origin: self.center() + Vec2::new(self.facing * self.body.size.x * 0.5, -6.0),
                    dir: Vec2::new(self.facing, 0.0),
                    volley: stats.volley,
                })
            }
            None => {
                self.patrol(stats.speed, map, tuning, dt);
                None
            }
        }
    }

    fn update_flying(&mut self, target: Option<Vec2>, map: &Tilemap, tuning: &Tuning, dt: f32) {
        let speed = self.stats().speed;
        match self.sees(target, f32::INFINITY) {
            Some(delta) => {
                self.body.vel = delta.normalize_or_zero() * speed;
                if delta.x != 0.0 {
                    self.facing = delta.x.signum();
                }
            }
            None => {
                let hover = self.home_y + self.phase.sin() * 16.0;
                self.body.vel = Vec2::new(self.facing * speed * 0.5, (hover - self.body.pos.y) * 2.0);
            }
        }
        let contacts = integrate(&mut self.body, map, tuning, Motion::FLYING, dt);
        if contacts.hit_wall {
            self.facing = -self.facing;
        }
    }

    fn update_boss(&mut self, target: Option<Vec2>, map: &Tilemap, tuning: &Tuning, dt: f32) -> Option<EnemyShot> {
        let stats = self.stats();
        let (speed, cooldown) = if self.is_enraged() {
            (stats.speed * 1.5, stats.fire_cooldown * 0.5)
        } else {
            (stats.speed, stats.fire_cooldown)
        };

        let Some(delta) = self.sees(target, f32::INFINITY) else {
            self.body.vel.x = 0.0;
            integrate(&mut self.body, map, tuning, Motion::GROUNDED, dt);
            return None;
        };

        if delta.x.abs() > 8.0 {
            self.facing = delta.x.signum();
        }
        let motion = if wall_ahead(&self.body, map, self.facing) {
            self.body.vel.x = 0.0;
            Motion::GROUNDED
        } else {
            self.body.vel.x = self.facing * speed;
            Motion::DRIVEN
        };
        integrate(&mut self.body, map, tuning, motion, dt);

        let spec = stats.shot?;
        let volley = if self.is_enraged() { stats.volley + 2 } else { stats.volley };
        self.tick_fire_timer(cooldown, dt).then(|| EnemyShot {
            spec,
            origin: self.center() + Vec2::new(self.facing * self.body.size.x * 0.5, -16.0),
            dir: delta.normalize_or(Vec2::new(self.facing, 0.0)),
            volley,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::Level;

    fn room() -> (Tilemap, Tuning) {
        let map = Tilemap::from_level(&Level::bordered("Room", 30, 12)).unwrap();
        (map, Tuning::default())
    }

    fn settle(enemy: &mut Enemy, map: &Tilemap, tuning: &Tuning) {
        for _ in 0..5 {
            enemy.update(None, map, tuning, 1.0 / 60.0);
        }
    }

    #[test]
    fn test_take_damage_and_death_cycle() {
        let (map, tuning) = room();
        let mut enemy = Enemy::spawn(1, EnemyKind::Patrol, 5, 10);
        assert!(!enemy.take_damage(15.0));
        assert_eq!(enemy.health, 25.0);
        assert!(enemy.take_damage(100.0));
        assert_eq!(enemy.health, 0.0);
        assert!(!enemy.is_alive());
        // Further hits on a dying enemy are ignored
        assert!(!enemy.take_damage(10.0));

        for _ in 0..((tuning.enemy_death_time / 0.05) as usize + 2) {
            enemy.update(None, &map, &tuning, 0.05);
        }
        assert!(enemy.is_dead());
    }

    #[test]
    fn test_patrol_turns_at_wall() {
        let (map, tuning) = room();
        let mut enemy = Enemy::spawn(1, EnemyKind::Patrol, 2, 10);
        enemy.facing = -1.0;
        settle(&mut enemy, &map, &tuning);
        for _ in 0..120 {
            enemy.update(None, &map, &tuning, 1.0 / 60.0);
        }
        assert_eq!(enemy.facing, 1.0);
        assert!(enemy.body.pos.x >= 32.0);
    }

    #[test]
    fn test_patrol_turns_at_ledge() {
        let mut level = Level::bordered("Ledge", 20, 12);
        // Pit in the floor at columns 8..=10
        let mut floor: Vec<char> = level.data[11].chars().collect();
        for c in floor.iter_mut().take(11).skip(8) {
            *c = '0';
        }
        level.data[11] = floor.into_iter().collect();
        let map = Tilemap::from_level(&level).unwrap();
        let tuning = Tuning::default();

        let mut enemy = Enemy::spawn(2, EnemyKind::Patrol, 5, 10);
        enemy.facing = 1.0;
        for _ in 0..240 {
            enemy.update(None, &map, &tuning, 1.0 / 60.0);
        }
        assert!(enemy.is_alive());
        assert!(enemy.body.pos.x + enemy.body.size.x <= 8.0 * 32.0 + 1.0);
    }

    #[test]
    fn test_shooter_fires_at_player_in_sight() {
        let (map, tuning) = room();
        let mut enemy = Enemy::spawn(1, EnemyKind::Shooter, 10, 10);
        settle(&mut enemy, &map, &tuning);
        let target = enemy.center() + Vec2::new(-200.0, 0.0);
        let mut shot = None;
        for _ in 0..200 {
            if let Some(s) = enemy.update(Some(target), &map, &tuning, 1.0 / 60.0) {
                shot = Some(s);
                break;
            }
        }
        let shot = shot.unwrap();
        assert_eq!(shot.dir, Vec2::new(-1.0, 0.0));
        assert_eq!(enemy.facing, -1.0);
        assert_eq!(shot.volley, 1);
    }

    #[test]
    fn test_flyer_ignores_gravity_and_chases() {
        let (map, tuning) = room();
        let mut enemy = Enemy::spawn(1, EnemyKind::Flying, 10, 4);
        let start = enemy.center();
        let target = start + Vec2::new(100.0, 100.0);
        for _ in 0..30 {
            enemy.update(Some(target), &map, &tuning, 1.0 / 60.0);
        }
        let moved = enemy.center() - start;
        assert!(moved.x > 0.0 && moved.y > 0.0);
        assert!(!enemy.body.on_ground);
    }

    #[test]
    fn test_boss_enrages_below_half() {
        let mut boss = Enemy::spawn(1, EnemyKind::Boss, 10, 10);
        assert!(!boss.is_enraged());
        boss.take_damage(BOSS.max_health * 0.6);
        assert!(boss.is_enraged());
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let (map, tuning) = room();
        let mut enemy = Enemy::spawn(1, EnemyKind::Patrol, 5, 10);
        let body = enemy.body;
        assert!(enemy.update(None, &map, &tuning, 0.0).is_none());
        assert_eq!(enemy.body, body);
    }

    #[test]
    fn test_kind_names_match_serde() {
        for kind in EnemyKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}
