//! Weapon roster and firing behaviours
//!
//! Each owned weapon runs on its own cooldown, shortened by the player's
//! attack speed. Orbit is continuous and ignores cooldowns. Beams persist for
//! a duration and deal damage on a fixed sub-interval.
//!
//! Evolved forms:
//! - projectile: +2 shots, double damage, larger explosive rounds, random
//!   directions when targets run out
//! - chain: effectively unlimited hops, longer range, slower decay
//! - boomerang: double count and reach, always pierces and homes
//! - radial: +50% shards, heavy slow and freeze
//! - beam: four times the width, unlimited hits, strong burn
//! - orbit: +4 orbs, wider and faster, pulls nearby enemies in

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::player::WeaponBadge;
use super::projectile::{Projectile, StatusPayload};
use super::state::GameState;
use crate::consts::MAX_WEAPONS;
use crate::tuning::{Tuning, WeaponKind, WeaponLevel, WeaponParams};
use crate::{direction_to, from_angle};

pub const BEAM_TICK_INTERVAL: f32 = 0.1;
/// Fraction of beam damage dealt per tick
pub const BEAM_TICK_FRACTION: f32 = 0.2;
pub const ORBIT_REHIT_DELAY: f32 = 0.2;
pub const VORTEX_PULL_RADIUS: f32 = 150.0;
pub const VORTEX_PULL_SPEED: f32 = 100.0;
/// Seconds a chain-lightning arc stays visible
pub const CHAIN_ARC_LIFETIME: f32 = 0.2;
pub const BOOMERANG_LIFETIME: f32 = 5.0;

/// A weapon on the player's roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponInstance {
    pub id: String,
    /// 0-based level index
    pub level: usize,
    pub cooldown: f32,
    pub evolved: bool,
}

/// A vertical damage column
#[derive(Debug, Clone)]
pub struct Beam {
    pub x: f32,
    pub width: f32,
    pub remaining: f32,
    pub tick_timer: f32,
    pub damage: f32,
    pub max_hits: Option<u32>,
    pub burn_damage: f32,
    pub burn_duration: f32,
    pub evolved: bool,
}

/// Polyline of a chain-lightning strike for the renderer
#[derive(Debug, Clone)]
pub struct ChainArc {
    pub points: Vec<Vec2>,
    pub life: f32,
    pub evolved: bool,
}

/// Current orbiting satellite
#[derive(Debug, Clone, Copy)]
pub struct Orb {
    pub pos: Vec2,
    pub radius: f32,
    pub evolved: bool,
}

/// Result of offering a weapon to the roster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponChange {
    Added,
    Upgraded { level: usize },
    AlreadyMax,
    RosterFull,
    Unknown,
}

#[derive(Debug, Clone, Default)]
pub struct WeaponSystem {
    pub weapons: Vec<WeaponInstance>,
    pub beams: Vec<Beam>,
    pub chains: Vec<ChainArc>,
    pub orbs: Vec<Orb>,
    /// Shared rotation driver for orbit and radial volleys
    pub orbit_angle: f32,
}

impl WeaponSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&WeaponInstance> {
        self.weapons.iter().find(|w| w.id == id)
    }

    pub fn has_weapon(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn is_full(&self) -> bool {
        self.weapons.len() >= MAX_WEAPONS
    }

    /// Add a weapon, or level it up when already owned
    pub fn add_weapon(&mut self, tuning: &Tuning, id: &str) -> WeaponChange {
        if self.has_weapon(id) {
            return match self.upgrade_weapon(tuning, id) {
                Some(level) => WeaponChange::Upgraded { level },
                None => WeaponChange::AlreadyMax,
            };
        }
        if tuning.weapon(id).is_none() {
            log::warn!("Unknown weapon '{id}' offered to roster");
            return WeaponChange::Unknown;
        }
        if self.is_full() {
            return WeaponChange::RosterFull;
        }
        self.weapons.push(WeaponInstance {
            id: id.to_string(),
            level: 0,
            cooldown: 0.0,
            evolved: false,
        });
        log::debug!("Weapon added: {id}");
        WeaponChange::Added
    }

    /// Advance one level, capped at the table's last entry. Returns the new level.
    pub fn upgrade_weapon(&mut self, tuning: &Tuning, id: &str) -> Option<usize> {
        let max = tuning.weapon(id)?.max_level();
        let weapon = self.weapons.iter_mut().find(|w| w.id == id)?;
        if weapon.level >= max {
            return None;
        }
        weapon.level += 1;
        log::debug!("Weapon {id} -> level {}", weapon.level + 1);
        Some(weapon.level)
    }

    pub fn can_evolve(&self, tuning: &Tuning, id: &str) -> bool {
        match (self.get(id), tuning.weapon(id)) {
            (Some(w), Some(config)) => !w.evolved && w.level >= config.max_level(),
            _ => false,
        }
    }

    /// First evolution-eligible weapon in roster order
    pub fn first_evolvable(&self, tuning: &Tuning) -> Option<String> {
        self.weapons
            .iter()
            .find(|w| self.can_evolve(tuning, &w.id))
            .map(|w| w.id.clone())
    }

    /// One-way flip. Returns false when not eligible (including already evolved).
    pub fn evolve_weapon(&mut self, tuning: &Tuning, id: &str) -> bool {
        if !self.can_evolve(tuning, id) {
            return false;
        }
        if let Some(w) = self.weapons.iter_mut().find(|w| w.id == id) {
            w.evolved = true;
            log::debug!("Weapon evolved: {id}");
            return true;
        }
        false
    }

    /// Display entries for the HUD
    pub fn badges(&self, tuning: &Tuning) -> Vec<WeaponBadge> {
        self.weapons
            .iter()
            .filter_map(|w| {
                let config = tuning.weapon(&w.id)?;
                let (name, icon) = if w.evolved {
                    (&config.evolution.name, &config.evolution.icon)
                } else {
                    (&config.name, &config.icon)
                };
                Some(WeaponBadge {
                    id: w.id.clone(),
                    name: name.clone(),
                    icon: icon.clone(),
                    level: w.level as u32 + 1,
                    evolved: w.evolved,
                })
            })
            .collect()
    }

    pub fn update(&mut self, state: &mut GameState, tuning: &Tuning, dt: f32) {
        self.orbit_angle += dt;
        self.orbs.clear();
        let has_targets = state.enemies.iter().any(|e| !e.dead);
        let attack_speed = state.player.attack_speed_mult.max(0.01);

        for i in 0..self.weapons.len() {
            let Some(config) = tuning.weapon(&self.weapons[i].id) else {
                continue;
            };
            let Some(&level) = config.level(self.weapons[i].level) else {
                continue;
            };
            let evolved = self.weapons[i].evolved;

            if let WeaponParams::Orbit { .. } = level.params {
                self.update_orbit(state, &level, evolved, dt);
                continue;
            }

            let weapon = &mut self.weapons[i];
            if weapon.cooldown > 0.0 {
                weapon.cooldown -= dt;
            }
            if weapon.cooldown > 0.0 || !has_targets {
                continue;
            }
            weapon.cooldown = level.cooldown_ms / 1000.0 / attack_speed;

            match level.params {
                WeaponParams::Projectile { .. } => fire_projectile(state, &level, evolved),
                WeaponParams::Chain { .. } => self.fire_chain(state, &level, evolved),
                WeaponParams::Boomerang { .. } => fire_boomerang(state, &level, evolved),
                WeaponParams::Radial { .. } => {
                    fire_radial(state, &level, evolved, self.orbit_angle)
                }
                WeaponParams::Beam { .. } => self.fire_beam(state, &level, evolved),
                WeaponParams::Orbit { .. } => {}
            }
        }

        self.update_beams(state, dt);
        for arc in &mut self.chains {
            arc.life -= dt;
        }
        self.chains.retain(|a| a.life > 0.0);
    }

    fn fire_chain(&mut self, state: &mut GameState, level: &WeaponLevel, evolved: bool) {
        let WeaponParams::Chain {
            chain_count,
            chain_range,
            decay,
        } = level.params
        else {
            return;
        };
        let limit = if evolved { 99 } else { chain_count.max(1) };
        let range = if evolved { 400.0 } else { chain_range };
        let decay = if evolved { 0.95 } else { decay };
        let mut damage = level.damage * state.player.damage_mult * if evolved { 1.5 } else { 1.0 };

        let origin = state.player.pos;
        let Some(mut current) = state.nearest_enemy(origin, f32::INFINITY, &[]) else {
            return;
        };
        let mut struck = Vec::with_capacity(limit as usize);
        let mut points = vec![origin];
        for hop in 0..limit {
            if hop > 0 {
                let from = state.enemies[current].pos;
                match state.nearest_enemy(from, range, &struck) {
                    Some(next) => current = next,
                    None => break,
                }
                damage *= decay;
            }
            struck.push(state.enemies[current].id);
            points.push(state.enemies[current].pos);
            state.damage_enemy(current, damage, WeaponKind::Chain);
        }
        self.chains.push(ChainArc {
            points,
            life: CHAIN_ARC_LIFETIME,
            evolved,
        });
    }

    fn fire_beam(&mut self, state: &mut GameState, level: &WeaponLevel, evolved: bool) {
        let WeaponParams::Beam {
            width,
            duration_ms,
            max_hits,
            burn_damage,
            burn_ms,
        } = level.params
        else {
            return;
        };
        let live: Vec<f32> = state.enemies.iter().filter(|e| !e.dead).map(|e| e.pos.x).collect();
        if live.is_empty() {
            return;
        }
        let x = live[state.rng.random_range(0..live.len())];
        self.beams.push(Beam {
            x,
            width: if evolved { width * 4.0 } else { width },
            remaining: duration_ms / 1000.0,
            tick_timer: 0.0,
            damage: level.damage * if evolved { 2.0 } else { 1.0 },
            max_hits: if evolved { None } else { Some(max_hits) },
            burn_damage: if evolved { 50.0 } else { burn_damage },
            burn_duration: burn_ms / 1000.0,
            evolved,
        });
    }

    fn update_beams(&mut self, state: &mut GameState, dt: f32) {
        for beam in &mut self.beams {
            beam.remaining -= dt;
            beam.tick_timer -= dt;
            if beam.tick_timer > 0.0 {
                continue;
            }
            beam.tick_timer = BEAM_TICK_INTERVAL;
            let damage = beam.damage * BEAM_TICK_FRACTION * state.player.damage_mult;
            let mut hits = 0u32;
            for i in 0..state.enemies.len() {
                if beam.max_hits.is_some_and(|max| hits >= max) {
                    break;
                }
                let e = &state.enemies[i];
                if e.dead || (e.pos.x - beam.x).abs() >= beam.width / 2.0 + e.radius {
                    continue;
                }
                state.damage_enemy(i, damage, WeaponKind::Beam);
                state.enemies[i].apply_burn(beam.burn_damage, beam.burn_duration);
                hits += 1;
            }
        }
        self.beams.retain(|b| b.remaining > 0.0);
    }

    fn update_orbit(&mut self, state: &mut GameState, level: &WeaponLevel, evolved: bool, dt: f32) {
        let WeaponParams::Orbit {
            orb_count,
            radius,
            rotation_speed,
        } = level.params
        else {
            return;
        };
        let count = orb_count + if evolved { 4 } else { 0 } + state.player.extra_projectiles;
        if count == 0 {
            return;
        }
        let radius = if evolved { radius * 1.5 } else { radius };
        let speed = if evolved { rotation_speed * 2.0 } else { rotation_speed };
        let damage = level.damage * state.player.damage_mult * if evolved { 1.5 } else { 1.0 };
        let orb_radius = if evolved { 18.0 } else { 12.0 };
        let center = state.player.pos;

        for k in 0..count {
            let angle = self.orbit_angle * speed + std::f32::consts::TAU / count as f32 * k as f32;
            let orb = center + from_angle(angle) * radius;
            self.orbs.push(Orb {
                pos: orb,
                radius: orb_radius,
                evolved,
            });

            if evolved {
                for enemy in state.enemies.iter_mut().filter(|e| !e.dead) {
                    if enemy.pos.distance(orb) < VORTEX_PULL_RADIUS {
                        if let Some(dir) = direction_to(enemy.pos, orb) {
                            enemy.pos += dir * VORTEX_PULL_SPEED * dt;
                        }
                    }
                }
            }

            for i in 0..state.enemies.len() {
                let e = &state.enemies[i];
                if e.dead || e.orbit_hit_cooldown > 0.0 {
                    continue;
                }
                let reach = orb_radius + e.radius;
                if e.pos.distance_squared(orb) < reach * reach {
                    state.damage_enemy(i, damage, WeaponKind::Orbit);
                    state.enemies[i].orbit_hit_cooldown = ORBIT_REHIT_DELAY;
                }
            }
        }
    }
}

/// Indices of up to `n` live enemies nearest `from`
fn nearest_enemies(state: &GameState, from: Vec2, n: usize) -> Vec<usize> {
    let mut ranked: Vec<(usize, f32)> = state
        .enemies
        .iter()
        .enumerate()
        .filter(|(_, e)| !e.dead)
        .map(|(i, e)| (i, e.pos.distance_squared(from)))
        .collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked.into_iter().take(n).map(|(i, _)| i).collect()
}

fn fire_projectile(state: &mut GameState, level: &WeaponLevel, evolved: bool) {
    let WeaponParams::Projectile {
        speed,
        range,
        count,
        aoe_radius,
        aoe_damage_mult,
    } = level.params
    else {
        return;
    };
    if !(speed > 0.0) {
        return;
    }
    let total = (count + if evolved { 2 } else { 0 } + state.player.extra_projectiles) as usize;
    let origin = state.player.pos;
    let facing = from_angle(state.player.facing);
    let targets = nearest_enemies(state, origin, total);

    let mut dirs: Vec<Vec2> = targets
        .iter()
        .map(|&i| direction_to(origin, state.enemies[i].pos).unwrap_or(facing))
        .collect();
    if evolved {
        while dirs.len() < total {
            let angle = state.random_range(0.0, std::f32::consts::TAU);
            dirs.push(from_angle(angle));
        }
    }

    for dir in dirs {
        let damage = level.damage * if evolved { 2.0 } else { 1.0 };
        let p = Projectile::new(WeaponKind::Projectile, origin, dir, speed, damage)
            .with_lifetime(range / speed)
            .with_radius(if evolved { 15.0 } else { 8.0 })
            .with_aoe(if evolved { 80.0 } else { aoe_radius }, aoe_damage_mult);
        state.spawn_projectile(p);
    }
}

fn fire_boomerang(state: &mut GameState, level: &WeaponLevel, evolved: bool) {
    let WeaponParams::Boomerang {
        speed,
        count,
        max_distance,
        piercing,
        homing,
    } = level.params
    else {
        return;
    };
    let total = count * if evolved { 2 } else { 1 } + state.player.extra_projectiles;
    if total == 0 {
        return;
    }
    let origin = state.player.pos;
    let aim = nearest_enemies(state, origin, 1)
        .first()
        .and_then(|&i| direction_to(origin, state.enemies[i].pos))
        .map(|d| d.y.atan2(d.x));

    for k in 0..total {
        let angle = match aim {
            Some(base) if !evolved => base + state.random_range(-0.3, 0.3) * k as f32,
            _ => state.player.facing + k as f32 * std::f32::consts::TAU / total as f32,
        };
        let mult = if evolved { 1.5 } else { 1.0 };
        let reach = max_distance * if evolved { 2.0 } else { 1.0 };
        let dir = from_angle(angle);
        let damage = level.damage * mult;
        let p = Projectile::new(WeaponKind::Boomerang, origin, dir, speed * mult, damage)
            .with_lifetime(BOOMERANG_LIFETIME)
            .with_radius(if evolved { 16.0 } else { 12.0 })
            .with_piercing(evolved || piercing)
            .boomerang(origin, reach, evolved || homing);
        state.spawn_projectile(p);
    }
}

fn fire_radial(state: &mut GameState, level: &WeaponLevel, evolved: bool, orbit_angle: f32) {
    let WeaponParams::Radial {
        speed,
        range,
        shard_count,
        slow,
        freeze_ms,
    } = level.params
    else {
        return;
    };
    if !(speed > 0.0) {
        return;
    }
    let base = if evolved { (shard_count as f32 * 1.5).floor() as u32 } else { shard_count };
    let total = base + state.player.extra_projectiles;
    if total == 0 {
        return;
    }
    let spin = if evolved { orbit_angle * 2.0 } else { orbit_angle };
    let origin = state.player.pos;
    let status = StatusPayload {
        slow: if evolved { 0.8 } else { slow },
        freeze: if evolved { 3.0 } else { freeze_ms / 1000.0 },
        ..Default::default()
    };

    for k in 0..total {
        let angle = std::f32::consts::TAU / total as f32 * k as f32 + spin;
        let damage = level.damage * if evolved { 1.2 } else { 1.0 };
        let p = Projectile::new(WeaponKind::Radial, origin, from_angle(angle), speed, damage)
            .with_lifetime(range / speed)
            .with_radius(6.0)
            .with_piercing(true)
            .with_status(status);
        state.spawn_projectile(p);
    }
}
