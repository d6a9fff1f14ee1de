//! Projectiles: spawned → traveling → (hit or expired) → dead

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::tilemap::Tilemap;
use super::weapon::{ProjectileKind, WeaponSpec};

/// Which side fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Player,
    Enemy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileState {
    Traveling,
    Dead,
}

/// Distance travelled between solid-tile checks
const SWEEP_STEP: f32 = 8.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub kind: ProjectileKind,
    pub owner: Side,
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub damage: f32,
    pub piercing: bool,
    pub explosive_radius: Option<f32>,
    /// Seconds left before expiry
    pub lifetime: f32,
    /// Pixels left before expiry
    pub range_left: f32,
    pub state: ProjectileState,
    /// Targets currently overlapped and already damaged.
    /// A target is forgotten once it stops overlapping, so re-entry hits again.
    pub contacts: Vec<u32>,
    /// Area damage has been applied
    #[serde(default)]
    pub detonated: bool,
}

impl Projectile {
    /// Spawn a projectile centered on `origin`, flying along `dir`
    pub fn new(id: u32, owner: Side, spec: &WeaponSpec, origin: Vec2, dir: Vec2) -> Self {
        let (w, h) = spec.projectile.size();
        let dir = dir.normalize_or(Vec2::X);
        // Vertical shots use a rotated box
        let size = if dir.y.abs() > dir.x.abs() {
            Vec2::new(h, w)
        } else {
            Vec2::new(w, h)
        };
        Self {
            id,
            kind: spec.projectile,
            owner,
            pos: origin - size * 0.5,
            vel: dir * spec.speed,
            size,
            damage: spec.damage,
            piercing: spec.piercing,
            explosive_radius: spec.explosive_radius,
            lifetime: spec.range / spec.speed.max(1.0) + 0.1,
            range_left: spec.range,
            state: ProjectileState::Traveling,
            contacts: Vec::new(),
            detonated: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.state == ProjectileState::Traveling
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn kill(&mut self) {
        self.state = ProjectileState::Dead;
    }

    /// Fly forward, dying on solid tiles, map exit, or when out of time/range
    pub fn update(&mut self, map: &Tilemap, dt: f32) {
        if !self.is_alive() || dt <= 0.0 {
            return;
        }

        let delta = self.vel * dt;
        let distance = delta.length();
        let steps = (distance / SWEEP_STEP).ceil().max(1.0) as u32;
        let step = delta / steps as f32;
        for _ in 0..steps {
            self.pos += step;
            let c = self.center();
            if map.is_solid_at(c.x, c.y) {
                self.kill();
                return;
            }
        }

        self.lifetime -= dt;
        self.range_left -= distance;
        let c = self.center();
        let outside = c.x < 0.0 || c.y < 0.0 || c.x > map.pixel_width() || c.y > map.pixel_height();
        if self.lifetime <= 0.0 || self.range_left <= 0.0 || outside {
            self.kill();
        }
    }

    /// Record overlap with a target. Returns true when damage should apply:
    /// the first frame of each distinct overlap.
    pub fn begin_contact(&mut self, target: u32) -> bool {
        if self.contacts.contains(&target) {
            return false;
        }
        self.contacts.push(target);
        true
    }

    /// Forget a target that no longer overlaps
    pub fn end_contact(&mut self, target: u32) {
        self.contacts.retain(|&id| id != target);
    }

    /// Pending area-of-effect blast: (center, radius), at most once
    pub fn take_detonation(&mut self) -> Option<(Vec2, f32)> {
        if self.is_alive() || self.detonated {
            return None;
        }
        let radius = self.explosive_radius?;
        self.detonated = true;
        Some((self.center(), radius))
    }
}
