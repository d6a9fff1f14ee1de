//! Weapon table
//!
//! Weapons differ only by data: which projectile they emit, how hard it hits,
//! how fast it flies and how much ammo it burns.

use serde::{Deserialize, Serialize};

/// Projectile variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectileKind {
    Bullet,
    Pellet,
    Plasma,
    Rocket,
    Laser,
}

impl ProjectileKind {
    /// Collision box size (pixels)
    pub fn size(self) -> (f32, f32) {
        match self {
            ProjectileKind::Bullet => (8.0, 4.0),
            ProjectileKind::Pellet => (5.0, 5.0),
            ProjectileKind::Plasma => (10.0, 10.0),
            ProjectileKind::Rocket => (14.0, 8.0),
            ProjectileKind::Laser => (28.0, 4.0),
        }
    }
}

/// Player weapons, in slot order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WeaponKind {
    #[default]
    #[serde(rename = "pistol")]
    Pistol,
    #[serde(rename = "shotgun")]
    Shotgun,
    #[serde(rename = "plasma")]
    PlasmaRifle,
    #[serde(rename = "rocket")]
    RocketLauncher,
    #[serde(rename = "laser")]
    LaserCannon,
}

/// Static weapon data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponSpec {
    pub projectile: ProjectileKind,
    pub damage: f32,
    /// Projectile speed (pixels/s)
    pub speed: f32,
    /// Seconds between shots
    pub cooldown: f32,
    /// Projectiles per trigger pull
    pub pellets: u32,
    /// Half-angle of random spread (radians)
    pub spread: f32,
    /// Ammo consumed per shot (0 = infinite)
    pub ammo_per_shot: u32,
    pub max_ammo: u32,
    /// Ammo granted when the weapon is first picked up
    pub grant_ammo: u32,
    /// Ammo granted by a generic ammo pickup
    pub pickup_ammo: u32,
    pub piercing: bool,
    pub explosive_radius: Option<f32>,
    /// Maximum travel distance (pixels)
    pub range: f32,
}

const PISTOL: WeaponSpec = WeaponSpec {
    projectile: ProjectileKind::Bullet,
    damage: 25.0,
    speed: 700.0,
    cooldown: 0.35,
    pellets: 1,
    spread: 0.0,
    ammo_per_shot: 0,
    max_ammo: 0,
    grant_ammo: 0,
    pickup_ammo: 0,
    piercing: false,
    explosive_radius: None,
    range: 900.0,
};

const SHOTGUN: WeaponSpec = WeaponSpec {
    projectile: ProjectileKind::Pellet,
    damage: 12.0,
    speed: 650.0,
    cooldown: 0.8,
    pellets: 6,
    spread: 0.22,
    ammo_per_shot: 1,
    max_ammo: 50,
    grant_ammo: 8,
    pickup_ammo: 8,
    piercing: false,
    explosive_radius: None,
    range: 360.0,
};

const PLASMA_RIFLE: WeaponSpec = WeaponSpec {
    projectile: ProjectileKind::Plasma,
    damage: 18.0,
    speed: 900.0,
    cooldown: 0.1,
    pellets: 1,
    spread: 0.03,
    ammo_per_shot: 1,
    max_ammo: 300,
    grant_ammo: 40,
    pickup_ammo: 40,
    piercing: false,
    explosive_radius: None,
    range: 1000.0,
};

const ROCKET_LAUNCHER: WeaponSpec = WeaponSpec {
    projectile: ProjectileKind::Rocket,
    damage: 60.0,
    speed: 500.0,
    cooldown: 0.9,
    pellets: 1,
    spread: 0.0,
    ammo_per_shot: 1,
    max_ammo: 30,
    grant_ammo: 5,
    pickup_ammo: 5,
    piercing: false,
    explosive_radius: Some(80.0),
    range: 1200.0,
};

const LASER_CANNON: WeaponSpec = WeaponSpec {
    projectile: ProjectileKind::Laser,
    damage: 30.0,
    speed: 1400.0,
    cooldown: 0.25,
    pellets: 1,
    spread: 0.0,
    ammo_per_shot: 2,
    max_ammo: 200,
    grant_ammo: 40,
    pickup_ammo: 20,
    piercing: true,
    explosive_radius: None,
    range: 1100.0,
};

impl WeaponKind {
    pub const ALL: [WeaponKind; 5] = [
        WeaponKind::Pistol,
        WeaponKind::Shotgun,
        WeaponKind::PlasmaRifle,
        WeaponKind::RocketLauncher,
        WeaponKind::LaserCannon,
    ];

    pub fn spec(self) -> &'static WeaponSpec {
        match self {
            WeaponKind::Pistol => &PISTOL,
            WeaponKind::Shotgun => &SHOTGUN,
            WeaponKind::PlasmaRifle => &PLASMA_RIFLE,
            WeaponKind::RocketLauncher => &ROCKET_LAUNCHER,
            WeaponKind::LaserCannon => &LASER_CANNON,
        }
    }

    /// Slot index (0-based)
    pub fn index(self) -> usize {
        match self {
            WeaponKind::Pistol => 0,
            WeaponKind::Shotgun => 1,
            WeaponKind::PlasmaRifle => 2,
            WeaponKind::RocketLauncher => 3,
            WeaponKind::LaserCannon => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Name used in level files and pickups
    pub fn as_str(self) -> &'static str {
        match self {
            WeaponKind::Pistol => "pistol",
            WeaponKind::Shotgun => "shotgun",
            WeaponKind::PlasmaRifle => "plasma",
            WeaponKind::RocketLauncher => "rocket",
            WeaponKind::LaserCannon => "laser",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.as_str() == s)
    }

    /// Infinite-ammo weapons never run dry
    pub fn uses_ammo(self) -> bool {
        self.spec().ammo_per_shot > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pistol_matches_reference_damage() {
        let pistol = WeaponKind::Pistol.spec();
        assert_eq!(pistol.damage, 25.0);
        assert!(!pistol.piercing);
        assert!(!WeaponKind::Pistol.uses_ammo());
    }

    #[test]
    fn test_slots_round_trip() {
        for weapon in WeaponKind::ALL {
            assert_eq!(WeaponKind::from_index(weapon.index()), Some(weapon));
            assert_eq!(WeaponKind::from_str(weapon.as_str()), Some(weapon));
        }
        assert_eq!(WeaponKind::from_index(5), None);
    }

    #[test]
    fn test_only_laser_pierces_only_rocket_explodes() {
        for weapon in WeaponKind::ALL {
            let spec = weapon.spec();
            assert_eq!(spec.piercing, weapon == WeaponKind::LaserCannon);
            assert_eq!(spec.explosive_radius.is_some(), weapon == WeaponKind::RocketLauncher);
        }
    }
}
