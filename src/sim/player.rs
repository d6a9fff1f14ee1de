//! The player character
//!
//! Movement, aiming, firing requests and the damage/death state machine.
//! The player never spawns projectiles itself; it reports a [`ShotRequest`]
//! and the game loop turns it into projectiles.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, TileContacts};
use super::physics::{Body, Motion, integrate};
use super::pickup::PickupKind;
use super::tick::TickInput;
use super::tilemap::Tilemap;
use super::weapon::WeaponKind;
use crate::consts::{PLAYER_HEIGHT, PLAYER_WIDTH};
use crate::tuning::Tuning;

/// Shared alive/dying/dead lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LifeState {
    Alive,
    /// Death animation; `elapsed` seconds since death
    Dying { elapsed: f32 },
    Dead,
}

/// Cumulative run statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub shots_fired: u32,
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub pickups_collected: u32,
    pub kills: u32,
}

/// A trigger pull the loop should turn into projectiles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotRequest {
    pub weapon: WeaponKind,
    pub origin: Vec2,
    pub dir: Vec2,
}

/// Outcome of one player update
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerStep {
    pub contacts: TileContacts,
    pub shot: Option<ShotRequest>,
    /// Fell below the bottom of the map
    pub fell_out: bool,
}

/// Result of a damage attempt
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DamageOutcome {
    /// Health actually lost
    pub health_lost: f32,
    /// Armor consumed
    pub armor_lost: f32,
    /// This hit killed the player
    pub killed: bool,
}

/// Fraction of jump speed kept when the jump button is released early
const JUMP_CUT: f32 = 0.4;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    /// +1 facing right, -1 facing left
    pub facing: f32,
    pub health: f32,
    pub max_health: f32,
    pub armor: f32,
    pub max_armor: f32,
    /// Ammo per weapon slot
    pub ammo: [u32; 5],
    /// Weapons owned per slot
    pub owned: [bool; 5],
    pub weapon: WeaponKind,
    /// Seconds of damage immunity left
    pub invulnerable: f32,
    /// Seconds until the weapon can fire again
    pub fire_cooldown: f32,
    pub life: LifeState,
    pub lives: u8,
    /// Body position used on respawn
    pub respawn_point: Vec2,
    pub stats: PlayerStats,
    /// Took damage since the current level started
    pub hurt_this_level: bool,
    /// The loop has already reacted to the current death
    #[serde(default)]
    pub death_handled: bool,
}

impl Player {
    /// A fresh player at a body position
    pub fn new(pos: Vec2, tuning: &Tuning) -> Self {
        let mut owned = [false; 5];
        owned[WeaponKind::Pistol.index()] = true;
        Self {
            body: Body::new(pos, Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT)),
            facing: 1.0,
            health: tuning.player_max_health,
            max_health: tuning.player_max_health,
            armor: 0.0,
            max_armor: tuning.player_max_armor,
            ammo: [0; 5],
            owned,
            weapon: WeaponKind::Pistol,
            invulnerable: 0.0,
            fire_cooldown: 0.0,
            life: LifeState::Alive,
            lives: tuning.starting_lives,
            respawn_point: pos,
            stats: PlayerStats::default(),
            hurt_this_level: false,
            death_handled: false,
        }
    }

    /// Player body position standing in a tile cell
    pub fn start_position(tx: i32, ty: i32) -> Vec2 {
        Body::standing_in_tile(tx, ty, Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT)).pos
    }

    pub fn is_alive(&self) -> bool {
        self.life == LifeState::Alive
    }

    pub fn is_dying(&self) -> bool {
        matches!(self.life, LifeState::Dying { .. })
    }

    pub fn aabb(&self) -> Aabb {
        self.body.aabb()
    }

    pub fn center(&self) -> Vec2 {
        self.body.center()
    }

    /// Current ammo for the equipped weapon (`None` = infinite)
    pub fn current_ammo(&self) -> Option<u32> {
        if self.weapon.uses_ammo() {
            Some(self.ammo[self.weapon.index()])
        } else {
            None
        }
    }

    /// Place the player at the start of a level
    pub fn place_at_level_start(&mut self, pos: Vec2) {
        self.body = Body::new(pos, self.body.size);
        self.respawn_point = pos;
        self.hurt_this_level = false;
        self.fire_cooldown = 0.0;
    }

    /// Bring the player back after a death
    pub fn respawn(&mut self, tuning: &Tuning) {
        self.body = Body::new(self.respawn_point, self.body.size);
        self.health = self.max_health;
        self.life = LifeState::Alive;
        self.invulnerable = tuning.hurt_invulnerability * 2.0;
        self.fire_cooldown = 0.0;
        self.death_handled = false;
    }

    /// Advance one frame of movement, aiming and firing
    pub fn update(&mut self, input: &TickInput, map: &Tilemap, tuning: &Tuning, dt: f32) -> PlayerStep {
        let mut step = PlayerStep::default();
        if dt <= 0.0 {
            step.contacts.on_ground = self.body.on_ground;
            return step;
        }

        self.invulnerable = (self.invulnerable - dt).max(0.0);
        self.fire_cooldown = (self.fire_cooldown - dt).max(0.0);

        match self.life {
            LifeState::Alive => {}
            LifeState::Dying { elapsed } => {
                let elapsed = elapsed + dt;
                self.life = if elapsed >= tuning.player_death_time {
                    LifeState::Dead
                } else {
                    LifeState::Dying { elapsed }
                };
                self.body.vel.x = 0.0;
                step.contacts = integrate(&mut self.body, map, tuning, Motion::GROUNDED, dt);
                return step;
            }
            LifeState::Dead => return step,
        }

        self.handle_weapon_switch(input);

        // Horizontal movement
        let dir = match (input.left, input.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        let motion = if dir != 0.0 {
            self.facing = dir;
            self.body.vel.x = dir * tuning.move_speed;
            Motion::DRIVEN
        } else {
            Motion::GROUNDED
        };

        // Jumping, with a shorter hop when released early
        if input.jump && self.body.on_ground {
            self.body.vel.y = -tuning.jump_speed;
            self.body.on_ground = false;
        } else if !input.jump && self.body.vel.y < -tuning.jump_speed * JUMP_CUT {
            self.body.vel.y = -tuning.jump_speed * JUMP_CUT;
        }

        step.contacts = integrate(&mut self.body, map, tuning, motion, dt);

        // Keep inside the map horizontally
        let max_x = (map.pixel_width() - self.body.size.x).max(0.0);
        if self.body.pos.x < 0.0 || self.body.pos.x > max_x {
            self.body.pos.x = self.body.pos.x.clamp(0.0, max_x);
            self.body.vel.x = 0.0;
        }

        if self.body.pos.y > map.pixel_height() + self.body.size.y {
            step.fell_out = true;
        }

        if input.fire {
            step.shot = self.try_fire(input);
        }

        step
    }

    fn handle_weapon_switch(&mut self, input: &TickInput) {
        if let Some(weapon) = input.select_weapon {
            self.equip(weapon);
        } else if input.next_weapon {
            self.cycle_weapon(1);
        } else if input.prev_weapon {
            self.cycle_weapon(-1);
        }
    }

    /// Equip a weapon if owned. Returns true if it is now equipped.
    pub fn equip(&mut self, weapon: WeaponKind) -> bool {
        if self.owned[weapon.index()] {
            self.weapon = weapon;
            true
        } else {
            false
        }
    }

    /// Step through owned weapons in slot order
    pub fn cycle_weapon(&mut self, step: i32) {
        let count = WeaponKind::ALL.len() as i32;
        let mut index = self.weapon.index() as i32;
        for _ in 0..count {
            index = (index + step).rem_euclid(count);
            let weapon = WeaponKind::ALL[index as usize];
            if self.owned[weapon.index()] {
                self.weapon = weapon;
                return;
            }
        }
    }

    fn try_fire(&mut self, input: &TickInput) -> Option<ShotRequest> {
        if self.fire_cooldown > 0.0 {
            return None;
        }
        let spec = self.weapon.spec();
        let slot = self.weapon.index();
        if spec.ammo_per_shot > 0 {
            if self.ammo[slot] < spec.ammo_per_shot {
                // Dry: fall back to the pistol
                self.weapon = WeaponKind::Pistol;
                return None;
            }
            self.ammo[slot] -= spec.ammo_per_shot;
        }

        let dir = if input.shoot_up {
            Vec2::NEG_Y
        } else if input.shoot_down {
            Vec2::Y
        } else {
            Vec2::new(self.facing, 0.0)
        };
        let origin = self.center() + dir * (self.body.size * 0.5 + Vec2::splat(4.0));

        self.fire_cooldown = spec.cooldown;
        self.stats.shots_fired += 1;
        Some(ShotRequest {
            weapon: self.weapon,
            origin,
            dir,
        })
    }

    /// Apply incoming damage through invulnerability and armor
    pub fn take_damage(&mut self, amount: f32, tuning: &Tuning) -> DamageOutcome {
        if !self.is_alive() || self.invulnerable > 0.0 || amount <= 0.0 {
            return DamageOutcome::default();
        }

        let armor_lost = (amount * tuning.armor_absorption).min(self.armor);
        let health_lost = (amount - armor_lost).min(self.health);
        self.armor -= armor_lost;
        self.health -= health_lost;
        self.invulnerable = tuning.hurt_invulnerability;
        self.hurt_this_level = true;
        self.stats.damage_taken += health_lost + armor_lost;

        let killed = self.health <= 0.0;
        if killed {
            self.health = 0.0;
            self.life = LifeState::Dying { elapsed: 0.0 };
        }
        DamageOutcome {
            health_lost,
            armor_lost,
            killed,
        }
    }

    /// Die immediately regardless of health or invulnerability (pits)
    pub fn kill(&mut self) {
        if self.is_alive() {
            self.health = 0.0;
            self.life = LifeState::Dying { elapsed: 0.0 };
        }
    }

    /// Apply a collected pickup's effect. Coins are handled by the currency system.
    pub fn apply_pickup(&mut self, kind: PickupKind, tuning: &Tuning) {
        self.stats.pickups_collected += 1;
        match kind {
            PickupKind::Health => {
                self.health = (self.health + kind.restore_amount()).min(self.max_health);
            }
            PickupKind::Armor => {
                self.armor = (self.armor + kind.restore_amount()).min(self.max_armor);
            }
            PickupKind::Ammo => {
                for weapon in WeaponKind::ALL {
                    if weapon.uses_ammo() && self.owned[weapon.index()] {
                        self.add_ammo(weapon, weapon.spec().pickup_ammo);
                    }
                }
            }
            PickupKind::Weapon(weapon) => {
                let first_time = !self.owned[weapon.index()];
                self.owned[weapon.index()] = true;
                self.add_ammo(weapon, weapon.spec().grant_ammo);
                if first_time {
                    self.weapon = weapon;
                }
            }
            PickupKind::Invincibility => {
                self.invulnerable = self.invulnerable.max(tuning.invincibility_duration);
            }
            PickupKind::Coin => {}
        }
    }

    fn add_ammo(&mut self, weapon: WeaponKind, amount: u32) {
        let slot = weapon.index();
        self.ammo[slot] = (self.ammo[slot] + amount).min(weapon.spec().max_ammo);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::Level;

    fn setup() -> (Player, Tilemap, Tuning) {
        let tuning = Tuning::default();
        let map = Tilemap::from_level(&Level::bordered("Room", 30, 12)).unwrap();
        let player = Player::new(Player::start_position(3, 10), &tuning);
        (player, map, tuning)
    }

    #[test]
    fn test_damage_without_armor() {
        let (mut player, _, tuning) = setup();
        let outcome = player.take_damage(25.0, &tuning);
        assert_eq!(player.health, 75.0);
        assert_eq!(outcome.health_lost, 25.0);
        assert!(!outcome.killed);
        assert!(player.is_alive());
    }

    #[test]
    fn test_armor_absorbs_fraction() {
        let (mut player, _, tuning) = setup();
        player.armor = 10.0;
        let outcome = player.take_damage(40.0, &tuning);
        // Half of 40 would be 20, but only 10 armor is left
        assert_eq!(outcome.armor_lost, 10.0);
        assert_eq!(player.armor, 0.0);
        assert_eq!(player.health, 70.0);
    }

    #[test]
    fn test_invulnerability_suppresses_damage() {
        let (mut player, map, tuning) = setup();
        player.take_damage(10.0, &tuning);
        let second = player.take_damage(10.0, &tuning);
        assert_eq!(second, DamageOutcome::default());
        assert_eq!(player.health, 90.0);

        // Wait out the window
        let input = TickInput::default();
        let mut t = 0.0;
        while t < tuning.hurt_invulnerability + 0.05 {
            player.update(&input, &map, &tuning, 0.05);
            t += 0.05;
        }
        player.take_damage(10.0, &tuning);
        assert_eq!(player.health, 80.0);
    }

    #[test]
    fn test_lethal_damage_enters_dying_then_dead() {
        let (mut player, map, tuning) = setup();
        let outcome = player.take_damage(500.0, &tuning);
        assert!(outcome.killed);
        assert_eq!(player.health, 0.0);
        assert!(player.is_dying());

        let input = TickInput::default();
        for _ in 0..((tuning.player_death_time / 0.05) as usize + 2) {
            player.update(&input, &map, &tuning, 0.05);
        }
        assert_eq!(player.life, LifeState::Dead);
    }

    #[test]
    fn test_runs_and_faces() {
        let (mut player, map, tuning) = setup();
        let start = player.body.pos.x;
        let input = TickInput { left: true, ..Default::default() };
        for _ in 0..10 {
            player.update(&input, &map, &tuning, 1.0 / 60.0);
        }
        assert!(player.body.pos.x < start);
        assert_eq!(player.facing, -1.0);
    }

    #[test]
    fn test_jump_only_from_ground() {
        let (mut player, map, tuning) = setup();
        let idle = TickInput::default();
        player.update(&idle, &map, &tuning, 1.0 / 60.0);
        assert!(player.body.on_ground);

        let jump = TickInput { jump: true, ..Default::default() };
        player.update(&jump, &map, &tuning, 1.0 / 60.0);
        assert!(player.body.vel.y < 0.0);
        assert!(!player.body.on_ground);

        // Holding jump in mid-air does not re-launch
        let vy = player.body.vel.y;
        player.update(&jump, &map, &tuning, 1.0 / 60.0);
        assert!(player.body.vel.y > vy);
    }

    #[test]
    fn test_fire_respects_cooldown_and_aim() {
        let (mut player, map, tuning) = setup();
        let fire_up = TickInput { fire: true, shoot_up: true, ..Default::default() };
        let step = player.update(&fire_up, &map, &tuning, 1.0 / 60.0);
        let shot = step.shot.unwrap();
        assert_eq!(shot.weapon, WeaponKind::Pistol);
        assert_eq!(shot.dir, Vec2::NEG_Y);
        assert!(shot.origin.y < player.body.pos.y);

        let step = player.update(&fire_up, &map, &tuning, 1.0 / 60.0);
        assert!(step.shot.is_none());
        assert_eq!(player.stats.shots_fired, 1);
    }

    #[test]
    fn test_empty_weapon_falls_back_to_pistol() {
        let (mut player, map, tuning) = setup();
        player.apply_pickup(PickupKind::Weapon(WeaponKind::RocketLauncher), &tuning);
        assert_eq!(player.weapon, WeaponKind::RocketLauncher);
        player.ammo[WeaponKind::RocketLauncher.index()] = 0;
        let fire = TickInput { fire: true, ..Default::default() };
        let step = player.update(&fire, &map, &tuning, 1.0 / 60.0);
        assert!(step.shot.is_none());
        assert_eq!(player.weapon, WeaponKind::Pistol);
    }

    #[test]
    fn test_pickups_apply_and_clamp() {
        let (mut player, _, tuning) = setup();
        player.health = 90.0;
        player.apply_pickup(PickupKind::Health, &tuning);
        assert_eq!(player.health, 100.0);
        player.apply_pickup(PickupKind::Armor, &tuning);
        assert_eq!(player.armor, 50.0);
        player.apply_pickup(PickupKind::Weapon(WeaponKind::Shotgun), &tuning);
        assert_eq!(player.current_ammo(), Some(WeaponKind::Shotgun.spec().grant_ammo));
        player.apply_pickup(PickupKind::Ammo, &tuning);
        assert_eq!(player.ammo[WeaponKind::Shotgun.index()], 16);
        player.apply_pickup(PickupKind::Invincibility, &tuning);
        assert_eq!(player.invulnerable, tuning.invincibility_duration);
        assert_eq!(player.stats.pickups_collected, 5);
    }

    #[test]
    fn test_cycle_skips_unowned() {
        let (mut player, _, tuning) = setup();
        player.apply_pickup(PickupKind::Weapon(WeaponKind::LaserCannon), &tuning);
        player.equip(WeaponKind::Pistol);
        player.cycle_weapon(1);
        assert_eq!(player.weapon, WeaponKind::LaserCannon);
        player.cycle_weapon(1);
        assert_eq!(player.weapon, WeaponKind::Pistol);
        assert!(!player.equip(WeaponKind::Shotgun));
    }

    #[test]
    fn test_respawn_restores_health_at_point() {
        let (mut player, _, tuning) = setup();
        player.respawn_point = Vec2::new(200.0, 100.0);
        player.take_damage(1000.0, &tuning);
        player.respawn(&tuning);
        assert!(player.is_alive());
        assert_eq!(player.health, player.max_health);
        assert_eq!(player.body.pos, Vec2::new(200.0, 100.0));
        assert!(player.invulnerable > 0.0);
    }
}
