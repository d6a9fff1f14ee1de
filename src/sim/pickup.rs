//! Pickups: active → collected (one-shot)

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::physics::Body;
use super::weapon::WeaponKind;
use crate::consts::PICKUP_SIZE;

/// Pickup types. Serialized as a single lowercase word; weapon grants use
/// the weapon's name (`"shotgun"`, `"rocket"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PickupKind {
    Health,
    Armor,
    Ammo,
    Weapon(WeaponKind),
    Coin,
    Invincibility,
}

impl PickupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PickupKind::Health => "health",
            PickupKind::Armor => "armor",
            PickupKind::Ammo => "ammo",
            PickupKind::Weapon(weapon) => weapon.as_str(),
            PickupKind::Coin => "coin",
            PickupKind::Invincibility => "invincibility",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "health" => Some(PickupKind::Health),
            "armor" => Some(PickupKind::Armor),
            "ammo" => Some(PickupKind::Ammo),
            "coin" => Some(PickupKind::Coin),
            "invincibility" => Some(PickupKind::Invincibility),
            other => WeaponKind::from_str(other).map(PickupKind::Weapon),
        }
    }

    /// Health or armor restored by this pickup
    pub fn restore_amount(&self) -> f32 {
        match self {
            PickupKind::Health => 25.0,
            PickupKind::Armor => 50.0,
            _ => 0.0,
        }
    }
}

impl TryFrom<String> for PickupKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value).ok_or_else(|| format!("unknown pickup type '{}'", value))
    }
}

impl From<PickupKind> for String {
    fn from(kind: PickupKind) -> Self {
        kind.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupState {
    Active,
    Collected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub kind: PickupKind,
    pub body: Body,
    pub state: PickupState,
    /// Bobbing animation clock
    pub bob: f32,
}

impl Pickup {
    /// Place a pickup resting on the floor of a tile cell
    pub fn spawn(id: u32, kind: PickupKind, tx: i32, ty: i32) -> Self {
        Self {
            id,
            kind,
            body: Body::standing_in_tile(tx, ty, Vec2::splat(PICKUP_SIZE)),
            state: PickupState::Active,
            bob: (id as f32 * 0.7) % std::f32::consts::TAU,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == PickupState::Active
    }

    pub fn aabb(&self) -> Aabb {
        self.body.aabb()
    }

    /// Advance the idle animation
    pub fn update(&mut self, dt: f32) {
        if self.is_active() {
            self.bob = (self.bob + dt * 3.0) % std::f32::consts::TAU;
        }
    }

    /// Vertical draw offset for the bobbing animation
    pub fn bob_offset(&self) -> f32 {
        self.bob.sin() * 3.0
    }

    /// Mark collected. Returns false if it already was.
    pub fn collect(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.state = PickupState::Collected;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_strings_round_trip() {
        let kinds = [
            PickupKind::Health,
            PickupKind::Armor,
            PickupKind::Ammo,
            PickupKind::Coin,
            PickupKind::Invincibility,
            PickupKind::Weapon(WeaponKind::RocketLauncher),
        ];
        for kind in kinds {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(serde_json::from_str::<PickupKind>(&json).unwrap(), kind);
        }
        assert_eq!(serde_json::to_string(&PickupKind::Weapon(WeaponKind::Shotgun)).unwrap(), "\"shotgun\"");
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert!(serde_json::from_str::<PickupKind>("\"megasphere\"").is_err());
    }

    #[test]
    fn test_collect_is_one_shot() {
        let mut pickup = Pickup::spawn(1, PickupKind::Coin, 2, 3);
        assert!(pickup.collect());
        assert!(!pickup.collect());
        assert!(!pickup.is_active());
    }

    #[test]
    fn test_spawn_rests_on_cell_floor() {
        let pickup = Pickup::spawn(1, PickupKind::Health, 2, 3);
        assert_eq!(pickup.body.bottom(), 4.0 * crate::consts::TILE_SIZE);
    }
}
