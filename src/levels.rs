//! Built-in campaign levels

use crate::sim::enemy::EnemyKind;
use crate::sim::level::{EnemySpawn, Level, PickupSpawn, TilePoint};
use crate::sim::pickup::PickupKind;
use crate::sim::weapon::WeaponKind;

/// The campaign in play order. The last level is the boss arena.
pub fn campaign() -> Vec<Level> {
    vec![hangar(), nuclear_plant(), phobos_anomaly()]
}

fn build(
    name: &str,
    player_start: TilePoint,
    enemies: &[(EnemyKind, i32, i32)],
    pickups: &[(PickupKind, i32, i32)],
    checkpoints: &[TilePoint],
    rows: &[&str],
) -> Level {
    Level {
        name: name.to_string(),
        player_start,
        width: rows.first().map_or(0, |r| r.len() as u32),
        height: rows.len() as u32,
        enemies: enemies.iter().map(|&(kind, x, y)| EnemySpawn { kind, x, y }).collect(),
        pickups: pickups.iter().map(|&(kind, x, y)| PickupSpawn { kind, x, y }).collect(),
        checkpoints: checkpoints.to_vec(),
        data: rows.iter().map(|r| r.to_string()).collect(),
    }
}

fn hangar() -> Level {
    build(
        "E1M1: Hangar",
        TilePoint::new(2, 13),
        &[
            (EnemyKind::Patrol, 10, 13),
            (EnemyKind::Shooter, 22, 7),
            (EnemyKind::Patrol, 33, 13),
            (EnemyKind::Flying, 42, 6),
            (EnemyKind::Shooter, 50, 13),
        ],
        &[
            (PickupKind::Health, 14, 9),
            (PickupKind::Weapon(WeaponKind::Shotgun), 29, 10),
            (PickupKind::Coin, 37, 9),
            (PickupKind::Coin, 38, 9),
            (PickupKind::Armor, 52, 13),
        ],
        &[TilePoint::new(32, 13)],
        &[
            "111111111111111111111111111111111111111111111111111111111111",
            "144444444444444444444444444444444444444444444444444444444441",
            "144444444444444444444444444444444444444444444444444444444441",
            "144444444444444444444444444444444444444444444444444444444441",
            "100000000000000000000000000000000000000000000000000000000001",
            "100000000000000000000000000000000000000000000000000000000001",
            "100000000000000000000000000000000000000000000000000000000001",
            "100000000000000000000000000000000000000000000000000000000001",
            "100000000000000000002222200000000000000000000000000000000001",
            "100000000000000000000000000000000000000000000000000000000001",
            "100000000000222220000000000000000002222220000000000000000001",
            "100000000000000000000000000011100000000000000000000000000001",
            "100000000000000000000000000011100000000000000011000000000001",
            "100000000000000000000000000011100000333300000011000000000501",
            "111111111111111111111111111111111111111111111111111111111111",
        ],
    )
}

fn nuclear_plant() -> Level {
    build(
        "E1M2: Nuclear Plant",
        TilePoint::new(2, 14),
        &[
            (EnemyKind::Patrol, 6, 14),
            (EnemyKind::Shooter, 12, 11),
            (EnemyKind::Flying, 30, 4),
            (EnemyKind::Shooter, 38, 4),
            (EnemyKind::Flying, 50, 6),
            (EnemyKind::Patrol, 62, 14),
        ],
        &[
            (PickupKind::Weapon(WeaponKind::PlasmaRifle), 17, 10),
            (PickupKind::Coin, 30, 7),
            (PickupKind::Coin, 31, 7),
            (PickupKind::Health, 47, 10),
            (PickupKind::Weapon(WeaponKind::RocketLauncher), 56, 8),
            (PickupKind::Ammo, 60, 14),
        ],
        &[TilePoint::new(24, 9), TilePoint::new(52, 11)],
        &[
            "1111111111111111111111111111111111111111111111111111111111111111111111",
            "1044444440000000000000000000000000000000000000000000000000000000000001",
            "1044444440000000000000000000000000000000000000000000000000000000000001",
            "1044444440000000000000000000000000000000000000000000000000000000000001",
            "1044444440000000000000000000000000000000000000000000000000000000000001",
            "1000000000000000000000000000000000002222220000000000000000000000000001",
            "1000000000000000000000000000000000000000000000000000000000000000000001",
            "1000000000000000000000000000000000000000000000000000000000000000000001",
            "1000000000000000000000000000222222000000000000000000000000000000000001",
            "1000000000000000000000000000000000000000000000000000000111000000000001",
            "1000000000000000000000111100000000000000000000000000000111000000000001",
            "1000000000000000222220111100000000000000000022222200000111000000000001",
            "1000000000111110000000111100000000000000000000111122222111000000000001",
            "1000000000111110000000111100000000000000000000111100000111000000000001",
            "1000000000111113333333111133333333333333333333111100000111000000000501",
            "1111111111111111111111111111111111111111111111111111111111111111111111",
        ],
    )
}

fn phobos_anomaly() -> Level {
    build(
        "E1M8: Phobos Anomaly",
        TilePoint::new(2, 13),
        &[
            (EnemyKind::Boss, 30, 13),
            (EnemyKind::Flying, 10, 5),
            (EnemyKind::Flying, 28, 5),
        ],
        &[
            (PickupKind::Health, 6, 9),
            (PickupKind::Weapon(WeaponKind::RocketLauncher), 19, 6),
            (PickupKind::Weapon(WeaponKind::LaserCannon), 20, 6),
            (PickupKind::Armor, 33, 9),
            (PickupKind::Invincibility, 12, 13),
        ],
        &[TilePoint::new(3, 13)],
        &[
            "1111111111111111111111111111111111111111",
            "1444444444444444444444444444444444444441",
            "1444444444444444444444444444444444444441",
            "1000000000000000000000000000000000000001",
            "1000000000000000000000000000000000000001",
            "1000000000000000000000000000000000000001",
            "1000000000000000000000000000000000000001",
            "1000000000000000222222220000000000000001",
            "1000000000000000000000000000000000000001",
            "1000000000000000000000000000000000000001",
            "1000222220000000000000000000000222220001",
            "1000000000000000000000000000000000000001",
            "1000000000000000000000000000000000000001",
            "1000000000000000003333000000000000000001",
            "1111111111111111111111111111111111111111",
        ],
    )
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tile::Tile;
    use crate::sim::tilemap::Tilemap;

    #[test]
    fn test_campaign_levels_validate() {
        for level in campaign() {
            assert!(level.validate().is_ok(), "{} failed validation", level.name);
        }
    }

    #[test]
    fn test_spawns_are_in_open_cells() {
        for level in campaign() {
            let map = Tilemap::from_level(&level).unwrap();
            let mut points = vec![(level.player_start.x, level.player_start.y)];
            points.extend(level.enemies.iter().map(|e| (e.x, e.y)));
            points.extend(level.pickups.iter().map(|p| (p.x, p.y)));
            points.extend(level.checkpoints.iter().map(|c| (c.x, c.y)));
            for (x, y) in points {
                assert!(!map.tile_at(x, y).is_solid(), "{}: ({}, {}) is inside a wall", level.name, x, y);
            }
        }
    }

    #[test]
    fn test_only_final_level_has_boss_and_no_exit() {
        let levels = campaign();
        let (last, rest) = levels.split_last().unwrap();
        assert!(last.enemies.iter().any(|e| e.kind == EnemyKind::Boss));
        assert_eq!(Tilemap::from_level(last).unwrap().count(Tile::Exit), 0);
        for level in rest {
            assert!(level.enemies.iter().all(|e| e.kind != EnemyKind::Boss));
            assert_eq!(Tilemap::from_level(level).unwrap().count(Tile::Exit), 1);
        }
    }

    #[test]
    fn test_export_import_round_trip() {
        for level in campaign() {
            let json = level.to_json().unwrap();
            assert_eq!(Level::from_json(&json).unwrap(), level);
        }
    }
}
