//! Visual particles (not gameplay-affecting)

use glam::Vec2;
use rand::Rng;

/// Particle look, also selects motion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Blood,
    Spark,
    Explosion,
    Coin,
}

impl ParticleKind {
    /// Seconds a particle of this kind lives
    fn lifetime(self) -> f32 {
        match self {
            ParticleKind::Blood => 0.8,
            ParticleKind::Spark => 0.3,
            ParticleKind::Explosion => 0.6,
            ParticleKind::Coin => 0.7,
        }
    }

    fn gravity(self) -> f32 {
        match self {
            ParticleKind::Blood => 900.0,
            ParticleKind::Coin => 600.0,
            ParticleKind::Spark | ParticleKind::Explosion => 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub kind: ParticleKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32, // 0-1, decreases over time
    pub size: f32,
}

/// Emit `count` particles from `pos`, dropping the oldest once `cap` is hit
pub fn spawn_burst<R: Rng>(particles: &mut Vec<Particle>, rng: &mut R, kind: ParticleKind, pos: Vec2, count: usize, speed: f32, cap: usize) {
    if cap == 0 {
        return;
    }
    for _ in 0..count {
        if particles.len() >= cap {
            // Remove oldest particles to make room
            particles.remove(0);
        }
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let magnitude = speed * rng.random_range(0.3..1.0);
        particles.push(Particle {
            kind,
            pos,
            vel: Vec2::new(angle.cos(), angle.sin()) * magnitude,
            life: 1.0,
            size: rng.random_range(2.0..5.0),
        });
    }
}

pub fn update(particles: &mut Vec<Particle>, dt: f32) {
    if dt <= 0.0 {
        return;
    }
    for p in particles.iter_mut() {
        p.vel.y += p.kind.gravity() * dt;
        p.vel *= 0.98;
        p.pos += p.vel * dt;
        p.life -= dt / p.kind.lifetime();
        if p.kind == ParticleKind::Explosion {
            p.size += dt * 20.0;
        }
    }
    particles.retain(|p| p.life > 0.0);
}
