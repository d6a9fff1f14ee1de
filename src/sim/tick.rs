//! Per-frame simulation tick
//!
//! The order of the steps below is load-bearing: an enemy killed this frame
//! is scored before it is removed, and contact damage sees the frame's
//! pre-removal enemy set. Nothing is removed from a collection while it is
//! being iterated; dead entries are filtered after the pass.

use glam::Vec2;
use rand::Rng;

use super::achievements::Achievement;
use super::collision::{Aabb, AllPairs, overlapping};
use super::enemy::{EnemyKind, EnemyShot};
use super::events::GameEvent;
use super::particles::{self, ParticleKind};
use super::pickup::PickupKind;
use super::player::ShotRequest;
use super::projectile::{Projectile, Side};
use super::schedule::ScheduledAction;
use super::state::{GamePhase, SimulationState};
use super::weapon::WeaponKind;
use crate::clamp_frame_dt;

/// Input commands for a single tick.
///
/// Movement and aim flags are level-triggered (held). `pause`, `menu`,
/// `enter`, weapon switching and `skip_level` are edges: the input source
/// reports each press once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub shoot_up: bool,
    pub shoot_down: bool,
    pub fire: bool,
    /// Pause toggle
    pub pause: bool,
    /// Return to menu
    pub menu: bool,
    /// Start / restart
    pub enter: bool,
    pub next_weapon: bool,
    pub prev_weapon: bool,
    pub select_weapon: Option<WeaponKind>,
    /// Jump to the next level (debug and editor playtest)
    pub skip_level: bool,
}

/// Advance the simulation by one frame of `raw_dt` seconds
pub fn tick(state: &mut SimulationState, input: &TickInput, raw_dt: f32) {
    // Timing normalization
    let dt = clamp_frame_dt(raw_dt);

    // Wallet animates in every phase, pause included
    state.currency.tick(dt);

    // Pause / menu gating
    match state.phase {
        GamePhase::Menu => {
            if input.enter {
                state.start_run(0);
            }
            return;
        }
        GamePhase::GameOver | GamePhase::Victory => {
            if input.enter {
                state.start_run(0);
            } else if input.menu {
                state.reset_to_menu();
            }
            return;
        }
        GamePhase::Paused => {
            if input.menu {
                state.reset_to_menu();
                return;
            }
            if !input.pause {
                return;
            }
            state.phase = GamePhase::Playing;
            state.emit(GameEvent::Resumed);
        }
        GamePhase::Playing => {
            if input.pause {
                state.phase = GamePhase::Paused;
                state.emit(GameEvent::Paused);
                return;
            }
            if input.menu {
                state.reset_to_menu();
                return;
            }
        }
    }

    state.frame += 1;

    // Decay screen shake
    state.screen_shake *= state.tuning.shake_decay_per_second.powf(dt);
    if state.screen_shake < 0.01 {
        state.screen_shake = 0.0;
    }

    // Level transitions suspend gameplay; only the fade advances
    if state.level_manager.is_transitioning() {
        if let Some(index) = state.level_manager.tick(&state.tuning, dt) {
            state.load_level(index);
        }
        return;
    }

    if input.skip_level && state.level_manager.has_next() {
        let next = state.level_manager.current_index() + 1;
        state.level_manager.begin_transition(next);
        return;
    }

    state.time += dt as f64;
    if dt <= 0.0 {
        return;
    }

    run_scheduled(state);
    if state.phase != GamePhase::Playing {
        return;
    }

    update_player(state, input, dt);

    // Camera follow
    if let Some(player) = &state.player {
        let target = player.center();
        let size = state.level_size();
        state.camera.update(target, size);
    }

    update_enemies(state, dt);
    sweep_enemy_deaths(state);
    state.enemies.retain(|e| !e.is_dead());

    update_pickups(state, dt);
    update_checkpoints(state, dt);

    {
        let map = state.level_manager.tilemap();
        for projectile in state.projectiles.iter_mut() {
            projectile.update(map, dt);
        }
    }
    projectiles_vs_enemies(state);
    // Splash kills from a projectile that died on a wall are scored here too
    sweep_enemy_deaths(state);
    projectiles_vs_player(state);
    enemy_contact_damage(state);
    apply_detonations(state);
    state.projectiles.retain(|p| p.is_alive());

    process_player_death(state);

    particles::update(&mut state.particles, dt);
}

fn run_scheduled(state: &mut SimulationState) {
    for action in state.scheduler.due(state.time) {
        match action {
            ScheduledAction::Victory => state.end_run(true),
            ScheduledAction::EndRun => state.end_run(false),
            ScheduledAction::RespawnPlayer => {
                if let Some(player) = state.player.as_mut() {
                    player.respawn(&state.tuning);
                    log::debug!("Player respawned at {:?}", player.respawn_point);
                    state.events.push(GameEvent::PlayerRespawned);
                }
            }
        }
        if state.phase != GamePhase::Playing {
            break;
        }
    }
}

fn update_player(state: &mut SimulationState, input: &TickInput, dt: f32) {
    let Some(player) = state.player.as_mut() else {
        return;
    };
    let tuning = &state.tuning;
    let step = player.update(input, state.level_manager.tilemap(), tuning, dt);

    let mut exit_reached = false;
    let mut spike_hurt = 0.0;
    if player.is_alive() {
        if step.contacts.spikes {
            let outcome = player.take_damage(tuning.spike_damage, tuning);
            spike_hurt = outcome.health_lost + outcome.armor_lost;
        }
        if step.fell_out {
            log::debug!("Player fell out of the map");
            player.kill();
        }
        exit_reached = step.contacts.exit && player.is_alive();
    }
    let hurt_this_level = player.hurt_this_level;

    if spike_hurt > 0.0 {
        state.emit(GameEvent::PlayerHurt { damage: spike_hurt });
        state.add_shake(0.2);
    }
    if let Some(shot) = step.shot {
        spawn_player_shot(state, shot);
    }
    if exit_reached {
        complete_level(state, hurt_this_level);
    }
}

fn complete_level(state: &mut SimulationState, hurt_this_level: bool) {
    if state.scheduler.is_pending(ScheduledAction::Victory) {
        return;
    }
    let index = state.level_manager.current_index();
    state.score += state.tuning.level_complete_score;
    state.emit(GameEvent::LevelCompleted { index });
    if !hurt_this_level && state.achievements.unlock(Achievement::Untouchable) {
        state.emit(GameEvent::AchievementUnlocked {
            achievement: Achievement::Untouchable,
        });
    }
    if state.level_manager.has_next() {
        state.level_manager.begin_transition(index + 1);
    } else {
        // Exit on the final level ends the campaign
        state.scheduler.schedule(state.time, 0.0, ScheduledAction::Victory);
    }
}

fn spawn_player_shot(state: &mut SimulationState, shot: ShotRequest) {
    let spec = shot.weapon.spec();
    for _ in 0..spec.pellets.max(1) {
        let jitter = if spec.spread > 0.0 {
            state.rng.random_range(-spec.spread..=spec.spread)
        } else {
            0.0
        };
        let dir = Vec2::from_angle(jitter).rotate(shot.dir);
        let id = state.next_entity_id();
        state.projectiles.push(Projectile::new(id, Side::Player, spec, shot.origin, dir));
    }
    state.emit(GameEvent::ShotFired { weapon: shot.weapon });
}

fn spawn_enemy_shot(state: &mut SimulationState, shot: EnemyShot) {
    let volley = shot.volley.max(1);
    let middle = (volley - 1) as f32 * 0.5;
    for i in 0..volley {
        let angle = (i as f32 - middle) * shot.spec.spread;
        let dir = Vec2::from_angle(angle).rotate(shot.dir);
        let id = state.next_entity_id();
        state.projectiles.push(Projectile::new(id, Side::Enemy, shot.spec, shot.origin, dir));
    }
}

fn update_enemies(state: &mut SimulationState, dt: f32) {
    let target = state.player.as_ref().filter(|p| p.is_alive()).map(|p| p.center());
    let map = state.level_manager.tilemap();
    let mut shots = Vec::new();
    for enemy in state.enemies.iter_mut() {
        if let Some(shot) = enemy.update(target, map, &state.tuning, dt) {
            shots.push(shot);
        }
    }
    for shot in shots {
        spawn_enemy_shot(state, shot);
    }
}

/// Score every enemy that died since the last sweep, exactly once
fn sweep_enemy_deaths(state: &mut SimulationState) {
    let mut deaths = Vec::new();
    for enemy in state.enemies.iter_mut() {
        if !enemy.is_alive() && !enemy.scored {
            enemy.scored = true;
            deaths.push((enemy.kind, enemy.center()));
        }
    }

    for (kind, pos) in deaths {
        let stats = kind.stats();
        state.score += stats.score;
        state.currency.add(stats.coins);
        state.emit(GameEvent::EnemyKilled { kind, score: stats.score });
        state.emit(GameEvent::CoinsEarned { amount: stats.coins });
        let cap = if state.reduced_motion { 0 } else { state.max_particles };
        particles::spawn_burst(&mut state.particles, &mut state.rng, ParticleKind::Blood, pos, 16, 220.0, cap);

        let kills = match state.player.as_mut() {
            Some(player) => {
                player.stats.kills += 1;
                player.stats.kills
            }
            None => 0,
        };
        for achievement in state.achievements.check_kills(kills) {
            state.emit(GameEvent::AchievementUnlocked { achievement });
        }
        if let Some(achievement) = state.achievements.check_coins(state.currency.coins) {
            state.emit(GameEvent::AchievementUnlocked { achievement });
        }

        if kind == EnemyKind::Boss {
            state.score += state.tuning.boss_bonus_score;
            state.emit(GameEvent::BossDefeated);
            if state.achievements.unlock(Achievement::BossSlayer) {
                state.emit(GameEvent::AchievementUnlocked {
                    achievement: Achievement::BossSlayer,
                });
            }
            state.add_shake(1.0);
            if !state.scheduler.is_pending(ScheduledAction::Victory) {
                log::info!("Boss defeated, victory in {}s", state.tuning.victory_delay);
                state.scheduler.schedule(state.time, state.tuning.victory_delay, ScheduledAction::Victory);
            }
        }
    }
}

fn update_pickups(state: &mut SimulationState, dt: f32) {
    let player_box = state.player.as_ref().filter(|p| p.is_alive()).map(|p| p.aabb());
    let mut collected = Vec::new();
    for pickup in state.pickups.iter_mut() {
        pickup.update(dt);
        if let Some(player_box) = &player_box
            && pickup.is_active()
            && pickup.aabb().intersects(player_box)
            && pickup.collect()
        {
            collected.push((pickup.kind, pickup.body.center()));
        }
    }

    for (kind, pos) in collected {
        match kind {
            PickupKind::Coin => {
                let amount = state.tuning.coin_pickup_value;
                state.currency.add(amount);
                if let Some(player) = state.player.as_mut() {
                    player.stats.pickups_collected += 1;
                }
                state.emit(GameEvent::CoinsEarned { amount });
                if let Some(achievement) = state.achievements.check_coins(state.currency.coins) {
                    state.emit(GameEvent::AchievementUnlocked { achievement });
                }
            }
            _ => {
                if let Some(player) = state.player.as_mut() {
                    player.apply_pickup(kind, &state.tuning);
                }
            }
        }
        state.emit(GameEvent::PickupCollected { kind });
        let cap = if state.reduced_motion { 0 } else { state.max_particles };
        particles::spawn_burst(&mut state.particles, &mut state.rng, ParticleKind::Coin, pos, 6, 120.0, cap);
    }
    state.pickups.retain(|p| p.is_active());
}

fn update_checkpoints(state: &mut SimulationState, dt: f32) {
    let player_box = state.player.as_ref().filter(|p| p.is_alive()).map(|p| p.aabb());
    let mut activated = None;
    for checkpoint in state.checkpoints.iter_mut() {
        checkpoint.update(dt);
        if let Some(player_box) = &player_box
            && checkpoint.aabb().intersects(player_box)
            && checkpoint.activate()
        {
            activated = Some((checkpoint.id, checkpoint.respawn_position()));
        }
    }

    if let Some((id, respawn)) = activated {
        if let Some(player) = state.player.as_mut() {
            player.respawn_point = respawn;
        }
        log::debug!("Checkpoint {} activated", id);
        state.emit(GameEvent::CheckpointActivated { id });
    }
}

/// Player shots against enemies. Piercing shots damage each enemy once per
/// distinct overlap; others stop at the first enemy they hit.
fn projectiles_vs_enemies(state: &mut SimulationState) {
    let mut hits: Vec<(u32, f32, Vec2)> = Vec::new();
    for projectile in state.projectiles.iter_mut() {
        if !projectile.is_alive() || projectile.owner != Side::Player {
            continue;
        }
        let pbox = projectile.aabb();
        for enemy in state.enemies.iter_mut() {
            if !enemy.is_alive() {
                projectile.end_contact(enemy.id);
                continue;
            }
            if !pbox.intersects(&enemy.aabb()) {
                projectile.end_contact(enemy.id);
                continue;
            }
            if !projectile.begin_contact(enemy.id) {
                continue;
            }
            enemy.take_damage(projectile.damage);
            hits.push((enemy.id, projectile.damage, projectile.center()));
            if !projectile.piercing {
                projectile.kill();
                break;
            }
        }
    }

    for (id, damage, pos) in hits {
        if let Some(player) = state.player.as_mut() {
            player.stats.damage_dealt += damage;
        }
        state.emit(GameEvent::EnemyHurt { id, damage });
        let cap = if state.reduced_motion { 0 } else { state.max_particles };
        particles::spawn_burst(&mut state.particles, &mut state.rng, ParticleKind::Spark, pos, 4, 160.0, cap);
    }
}

fn projectiles_vs_player(state: &mut SimulationState) {
    let Some(player) = state.player.as_mut() else {
        return;
    };
    if !player.is_alive() {
        return;
    }
    let mut hurt = 0.0;
    for projectile in state.projectiles.iter_mut() {
        if !projectile.is_alive() || projectile.owner != Side::Enemy {
            continue;
        }
        if projectile.aabb().intersects(&player.aabb()) {
            let outcome = player.take_damage(projectile.damage, &state.tuning);
            hurt += outcome.health_lost + outcome.armor_lost;
            projectile.kill();
        }
    }
    if hurt > 0.0 {
        state.emit(GameEvent::PlayerHurt { damage: hurt });
        state.add_shake(0.3);
    }
}

fn enemy_contact_damage(state: &mut SimulationState) {
    let Some(player) = state.player.as_mut() else {
        return;
    };
    let boxes: Vec<Aabb> = state.enemies.iter().map(|e| e.aabb()).collect();
    let mut hurt = 0.0;
    for index in overlapping(&AllPairs, &player.aabb(), &boxes) {
        let enemy = &state.enemies[index];
        if !player.is_alive() {
            break;
        }
        if enemy.is_alive() {
            let outcome = player.take_damage(enemy.stats().contact_damage, &state.tuning);
            hurt += outcome.health_lost + outcome.armor_lost;
        }
    }
    if hurt > 0.0 {
        state.emit(GameEvent::PlayerHurt { damage: hurt });
        state.add_shake(0.3);
    }
}

/// Point-of-death area damage for explosive projectiles. Enemies the
/// projectile was touching when it died already took the direct hit.
fn apply_detonations(state: &mut SimulationState) {
    let mut blasts = Vec::new();
    for projectile in state.projectiles.iter_mut() {
        if let Some((center, radius)) = projectile.take_detonation() {
            blasts.push((center, radius, projectile.damage, projectile.owner, projectile.contacts.clone()));
        }
    }

    for (center, radius, damage, owner, exclude) in blasts {
        let mut total = 0.0;
        if owner == Side::Player {
            for enemy in state.enemies.iter_mut() {
                if enemy.is_alive() && !exclude.contains(&enemy.id) && enemy.aabb().center_within(center, radius) {
                    enemy.take_damage(damage);
                    total += damage;
                    state.events.push(GameEvent::EnemyHurt { id: enemy.id, damage });
                }
            }
        }
        if let Some(player) = state.player.as_mut() {
            player.stats.damage_dealt += total;
        }
        state.emit(GameEvent::Explosion { pos: center, radius });
        state.add_shake(0.5);
        let cap = if state.reduced_motion { 0 } else { state.max_particles };
        particles::spawn_burst(&mut state.particles, &mut state.rng, ParticleKind::Explosion, center, 24, radius * 3.0, cap);
    }
    // Blast kills are scored in the same frame
    sweep_enemy_deaths(state);
}

fn process_player_death(state: &mut SimulationState) {
    let Some(player) = state.player.as_mut() else {
        return;
    };
    if player.is_alive() || player.death_handled {
        return;
    }
    player.death_handled = true;
    player.lives = player.lives.saturating_sub(1);
    let lives_left = player.lives;
    log::info!("Player died, {} lives left", lives_left);
    state.emit(GameEvent::PlayerDied { lives_left });
    state.add_shake(0.6);

    if state.scheduler.is_pending(ScheduledAction::Victory) {
        return;
    }
    let action = if lives_left > 0 {
        ScheduledAction::RespawnPlayer
    } else {
        ScheduledAction::EndRun
    };
    state.scheduler.schedule(state.time, state.tuning.player_death_time, action);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{MAX_FRAME_DT, NOMINAL_DT, TILE_SIZE};
    use crate::sim::enemy::Enemy;
    use crate::sim::level::{EnemySpawn, Level, PickupSpawn, TilePoint};
    use crate::sim::projectile::Projectile;
    use crate::sim::tile::Tile;
    use crate::tuning::Tuning;

    const DT: f32 = NOMINAL_DT;

    fn playing(levels: Vec<Level>) -> SimulationState {
        let mut state = SimulationState::new(levels, Tuning::default(), 12345);
        let enter = TickInput {
            enter: true,
            ..Default::default()
        };
        tick(&mut state, &enter, DT);
        assert_eq!(state.phase, GamePhase::Playing);
        state.drain_events();
        state
    }

    fn room() -> Level {
        Level::bordered("Room", 40, 12)
    }

    fn idle(state: &mut SimulationState, frames: usize) {
        let input = TickInput::default();
        for _ in 0..frames {
            tick(state, &input, DT);
        }
    }

    #[test]
    fn test_enter_starts_run_from_menu() {
        let mut state = SimulationState::new(vec![room()], Tuning::default(), 1);
        idle(&mut state, 3);
        assert_eq!(state.phase, GamePhase::Menu);
        let state = playing(vec![room()]);
        assert!(state.player.is_some());
    }

    #[test]
    fn test_pistol_hit_on_unarmored_player() {
        let mut state = playing(vec![room()]);
        let center = state.player.as_ref().unwrap().center();
        let id = state.next_entity_id();
        state
            .projectiles
            .push(Projectile::new(id, Side::Enemy, WeaponKind::Pistol.spec(), center, Vec2::X));

        idle(&mut state, 1);

        let player = state.player.as_ref().unwrap();
        assert_eq!(player.health, 75.0);
        assert!(player.is_alive());
        assert!(state.projectiles.is_empty());
        assert!(state.events.contains(&GameEvent::PlayerHurt { damage: 25.0 }));
    }

    #[test]
    fn test_piercing_damages_once_per_overlap_entry() {
        let mut level = room();
        level.enemies.push(EnemySpawn {
            kind: EnemyKind::Patrol,
            x: 30,
            y: 10,
        });
        let mut state = playing(vec![level]);
        state.enemies[0].health = 10.0;
        let enemy_center = state.enemies[0].center();

        let id = state.next_entity_id();
        let mut laser = Projectile::new(id, Side::Player, WeaponKind::LaserCannon.spec(), enemy_center, Vec2::X);
        laser.vel = Vec2::ZERO;
        laser.damage = 6.0;
        state.projectiles.push(laser);

        // Continuous overlap across frames: one hit
        idle(&mut state, 3);
        assert_eq!(state.enemies[0].health, 4.0);
        assert_eq!(state.projectiles.len(), 1);

        // Leave the overlap, then come back: a second hit
        let home = state.enemies[0].body.pos;
        state.enemies[0].body.pos.x -= 8.0 * TILE_SIZE;
        idle(&mut state, 1);
        assert_eq!(state.enemies[0].health, 4.0);
        state.enemies[0].body.pos = home;
        idle(&mut state, 1);
        assert!(!state.enemies[0].is_alive());
        assert!(
            state
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::EnemyKilled { kind: EnemyKind::Patrol, .. }))
        );
    }

    #[test]
    fn test_non_piercing_hits_one_enemy_and_dies() {
        let mut level = room();
        for x in [30, 31] {
            level.enemies.push(EnemySpawn {
                kind: EnemyKind::Patrol,
                x,
                y: 10,
            });
        }
        let mut state = playing(vec![level]);
        let origin = (state.enemies[0].center() + state.enemies[1].center()) * 0.5;
        let id = state.next_entity_id();
        let mut bullet = Projectile::new(id, Side::Player, WeaponKind::Pistol.spec(), origin, Vec2::X);
        bullet.vel = Vec2::ZERO;
        bullet.size = Vec2::new(60.0, 4.0);
        bullet.pos = origin - bullet.size * 0.5;
        state.projectiles.push(bullet);

        idle(&mut state, 1);
        let damaged = state.enemies.iter().filter(|e| e.health < e.stats().max_health).count();
        assert_eq!(damaged, 1);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_transition_suspends_gameplay() {
        let mut level = room();
        level.enemies.push(EnemySpawn {
            kind: EnemyKind::Patrol,
            x: 20,
            y: 10,
        });
        let mut state = playing(vec![level, room()]);
        let id = state.next_entity_id();
        state.projectiles.push(Projectile::new(
            id,
            Side::Player,
            WeaponKind::Pistol.spec(),
            Vec2::new(300.0, 100.0),
            Vec2::X,
        ));
        assert!(state.level_manager.begin_transition(1));

        let player_pos = state.player.as_ref().unwrap().body.pos;
        let enemy_pos = state.enemies[0].body.pos;
        let projectile_pos = state.projectiles[0].pos;

        let run_right = TickInput {
            right: true,
            fire: true,
            ..Default::default()
        };
        for _ in 0..10 {
            tick(&mut state, &run_right, DT);
        }

        assert!(state.level_manager.is_transitioning());
        assert!(state.level_manager.fade_alpha(&state.tuning) > 0.0);
        assert_eq!(state.player.as_ref().unwrap().body.pos, player_pos);
        assert_eq!(state.enemies[0].body.pos, enemy_pos);
        assert_eq!(state.projectiles[0].pos, projectile_pos);
    }

    #[test]
    fn test_exit_tile_advances_level() {
        let mut first = room();
        first.player_start = TilePoint::new(2, 10);
        let mut row: Vec<char> = first.data[10].chars().collect();
        row[4] = Tile::Exit.to_char();
        first.data[10] = row.into_iter().collect();
        let mut state = playing(vec![first, Level::bordered("Second", 30, 12)]);

        let run_right = TickInput {
            right: true,
            ..Default::default()
        };
        let mut frames = 0;
        while !state.level_manager.is_transitioning() && frames < 120 {
            tick(&mut state, &run_right, DT);
            frames += 1;
        }
        assert!(state.level_manager.is_transitioning());
        assert_eq!(state.score, state.tuning.level_complete_score);

        idle(&mut state, 120);
        assert!(!state.level_manager.is_transitioning());
        assert_eq!(state.level_manager.current_index(), 1);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::LevelCompleted { index: 0 }));
        assert!(events.iter().any(|e| matches!(e, GameEvent::LevelStarted { index: 1, .. })));
        assert!(events.contains(&GameEvent::AchievementUnlocked {
            achievement: Achievement::Untouchable
        }));
    }

    #[test]
    fn test_checkpoint_activation_is_idempotent() {
        let mut level = room();
        level.player_start = TilePoint::new(5, 10);
        level.checkpoints.push(TilePoint::new(5, 10));
        let mut state = playing(vec![level]);

        idle(&mut state, 1);
        assert!(state.checkpoints[0].activated);
        let respawn = state.player.as_ref().unwrap().respawn_point;
        let activations = |events: &[GameEvent]| {
            events
                .iter()
                .filter(|e| matches!(e, GameEvent::CheckpointActivated { .. }))
                .count()
        };
        assert_eq!(activations(&state.drain_events()), 1);

        idle(&mut state, 5);
        assert_eq!(activations(&state.drain_events()), 0);
        assert_eq!(state.player.as_ref().unwrap().respawn_point, respawn);
        assert_eq!(state.checkpoints.len(), 1);
    }

    #[test]
    fn test_standing_in_spikes_hurts_once_per_invulnerability() {
        let mut level = room();
        level.player_start = TilePoint::new(5, 10);
        level.data[10].replace_range(5..6, "3");
        let mut state = playing(vec![level]);
        let spike_damage = state.tuning.spike_damage;

        // Well inside the invulnerability window
        idle(&mut state, 10);

        let player = state.player.as_ref().unwrap();
        assert_eq!(player.health, player.max_health - spike_damage);
        assert!(player.is_alive());
        let hurts: Vec<_> = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::PlayerHurt { .. }))
            .collect();
        assert_eq!(hurts, vec![GameEvent::PlayerHurt { damage: spike_damage }]);
    }

    #[test]
    fn test_falling_below_the_map_kills_the_player() {
        let mut state = playing(vec![room()]);
        let below = state.level_size().y + 4.0 * TILE_SIZE;
        state.player.as_mut().unwrap().body.pos.y = below;

        idle(&mut state, 1);

        let player = state.player.as_ref().unwrap();
        assert!(player.is_dying());
        assert!(!player.is_alive());
    }

    #[test]
    fn test_pause_freezes_gameplay_but_not_wallet() {
        let mut state = playing(vec![room()]);
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, DT);
        assert_eq!(state.phase, GamePhase::Paused);

        state.currency.add(40);
        let pos = state.player.as_ref().unwrap().body.pos;
        let run_right = TickInput {
            right: true,
            ..Default::default()
        };
        for _ in 0..10 {
            tick(&mut state, &run_right, DT);
        }
        assert_eq!(state.player.as_ref().unwrap().body.pos, pos);
        assert!(state.currency.displayed > 0.0);

        tick(&mut state, &pause, DT);
        assert_eq!(state.phase, GamePhase::Playing);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::Paused));
        assert!(events.contains(&GameEvent::Resumed));
    }

    #[test]
    fn test_huge_dt_is_clamped() {
        let mut a = playing(vec![room()]);
        let mut b = playing(vec![room()]);
        let input = TickInput {
            right: true,
            ..Default::default()
        };
        tick(&mut a, &input, 5.0);
        tick(&mut b, &input, MAX_FRAME_DT);
        assert_eq!(a.player.as_ref().unwrap().body.pos, b.player.as_ref().unwrap().body.pos);
        assert_eq!(a.time, b.time);
    }

    #[test]
    fn test_zero_dt_changes_nothing() {
        let mut state = playing(vec![room()]);
        let before = state.player.as_ref().unwrap().body;
        let input = TickInput {
            right: true,
            jump: true,
            ..Default::default()
        };
        tick(&mut state, &input, 0.0);
        tick(&mut state, &input, f32::NAN);
        assert_eq!(state.player.as_ref().unwrap().body, before);
    }

    #[test]
    fn test_boss_death_schedules_victory() {
        let mut level = room();
        level.player_start = TilePoint::new(2, 10);
        level.enemies.push(EnemySpawn {
            kind: EnemyKind::Boss,
            x: 35,
            y: 10,
        });
        let mut state = playing(vec![level]);
        state.enemies[0].health = 1.0;
        let center = state.enemies[0].center();
        let id = state.next_entity_id();
        let mut bullet = Projectile::new(id, Side::Player, WeaponKind::Pistol.spec(), center, Vec2::X);
        bullet.vel = Vec2::ZERO;
        state.projectiles.push(bullet);

        idle(&mut state, 1);
        assert!(state.scheduler.is_pending(ScheduledAction::Victory));
        let expected = EnemyKind::Boss.stats().score + state.tuning.boss_bonus_score;
        assert_eq!(state.score, expected);
        assert!(state.drain_events().contains(&GameEvent::BossDefeated));

        let frames = (state.tuning.victory_delay / DT) as usize + 5;
        idle(&mut state, frames);
        assert_eq!(state.phase, GamePhase::Victory);
        let events = state.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::RunEnded { victory: true, .. })));
    }

    #[test]
    fn test_death_respawns_then_game_over() {
        let mut level = room();
        level.checkpoints.push(TilePoint::new(10, 10));
        let mut state = playing(vec![level]);
        let respawn = state.checkpoints[0].respawn_position();
        state.player.as_mut().unwrap().respawn_point = respawn;
        state.player.as_mut().unwrap().lives = 2;

        let tuning = state.tuning.clone();
        state.player.as_mut().unwrap().take_damage(1000.0, &tuning);
        let frames = (tuning.player_death_time / DT) as usize + 5;
        idle(&mut state, frames);

        let player = state.player.as_ref().unwrap();
        assert!(player.is_alive());
        assert_eq!(player.lives, 1);
        assert_eq!(player.health, player.max_health);
        assert!((player.body.pos.x - respawn.x).abs() < 1.0);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::PlayerDied { lives_left: 1 }));
        assert!(events.contains(&GameEvent::PlayerRespawned));

        // Last life
        state.player.as_mut().unwrap().invulnerable = 0.0;
        state.player.as_mut().unwrap().take_damage(1000.0, &tuning);
        idle(&mut state, frames);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(
            state
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::RunEnded { victory: false, .. }))
        );

        // Enter restarts
        let enter = TickInput {
            enter: true,
            ..Default::default()
        };
        tick(&mut state, &enter, DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.as_ref().unwrap().lives, tuning.starting_lives);
    }

    #[test]
    fn test_coin_pickup_goes_to_wallet() {
        let mut level = room();
        level.player_start = TilePoint::new(3, 10);
        level.pickups.push(PickupSpawn {
            kind: PickupKind::Coin,
            x: 3,
            y: 10,
        });
        let mut state = playing(vec![level]);
        idle(&mut state, 1);
        assert_eq!(state.currency.coins, state.tuning.coin_pickup_value);
        assert!(state.pickups.is_empty());
        assert!(state.drain_events().contains(&GameEvent::PickupCollected { kind: PickupKind::Coin }));
    }

    #[test]
    fn test_rocket_splash_spares_direct_target() {
        let mut level = room();
        for x in [25, 27] {
            level.enemies.push(EnemySpawn {
                kind: EnemyKind::Boss,
                x,
                y: 10,
            });
        }
        let mut state = playing(vec![level]);
        let first = state.enemies[0].center();
        let id = state.next_entity_id();
        let mut rocket = Projectile::new(id, Side::Player, WeaponKind::RocketLauncher.spec(), first, Vec2::X);
        rocket.vel = Vec2::ZERO;
        state.projectiles.push(rocket);

        idle(&mut state, 1);
        let damage = WeaponKind::RocketLauncher.spec().damage;
        let max = EnemyKind::Boss.stats().max_health;
        // Direct hit once, neighbor by splash once
        assert_eq!(state.enemies[0].health, max - damage);
        assert_eq!(state.enemies[1].health, max - damage);
        assert!(
            state
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::Explosion { .. }))
        );
    }

    #[test]
    fn test_determinism() {
        let mut level = room();
        level.enemies.push(EnemySpawn {
            kind: EnemyKind::Shooter,
            x: 15,
            y: 10,
        });
        let mut a = playing(vec![level.clone()]);
        let mut b = playing(vec![level]);
        a.player.as_mut().unwrap().apply_pickup(PickupKind::Weapon(WeaponKind::Shotgun), &Tuning::default());
        b.player.as_mut().unwrap().apply_pickup(PickupKind::Weapon(WeaponKind::Shotgun), &Tuning::default());

        let inputs = [
            TickInput {
                right: true,
                fire: true,
                ..Default::default()
            },
            TickInput {
                jump: true,
                ..Default::default()
            },
            TickInput::default(),
        ];
        for _ in 0..40 {
            for input in &inputs {
                tick(&mut a, input, DT);
                tick(&mut b, input, DT);
            }
        }
        assert_eq!(a.player.as_ref().unwrap().body.pos, b.player.as_ref().unwrap().body.pos);
        assert_eq!(a.projectiles.len(), b.projectiles.len());
        for (pa, pb) in a.projectiles.iter().zip(&b.projectiles) {
            assert_eq!(pa.vel, pb.vel);
        }
    }

    #[test]
    fn test_menu_returns_from_play() {
        let mut state = playing(vec![room()]);
        let menu = TickInput {
            menu: true,
            ..Default::default()
        };
        tick(&mut state, &menu, DT);
        assert_eq!(state.phase, GamePhase::Menu);
        assert!(state.player.is_none());
    }

    #[test]
    fn test_enemy_contact_uses_invulnerability() {
        let mut level = room();
        level.player_start = TilePoint::new(10, 10);
        let mut state = playing(vec![level]);
        let id = state.next_entity_id();
        let mut enemy = Enemy::spawn(id, EnemyKind::Patrol, 10, 10);
        enemy.body.pos = state.player.as_ref().unwrap().body.pos;
        state.enemies.push(enemy);

        idle(&mut state, 3);
        let contact = EnemyKind::Patrol.stats().contact_damage;
        assert_eq!(state.player.as_ref().unwrap().health, 100.0 - contact);
    }
}
