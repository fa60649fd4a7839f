//! Enemy, boss and chest spawning
//!
//! - Regular enemies: one Bernoulli draw per rule every `SPAWN_CHECK_INTERVAL`
//! - Bosses: each schedule entry exactly once, when time first crosses it
//! - Chests: fixed interval, independent of enemies
//!
//! Everything appears on a ring just outside the viewport.

use glam::Vec2;
use rand::Rng;

use super::enemy::MinionRequest;
use super::pickups::TreasureChest;
use super::state::{BossWarning, GameEvent, GameState};
use crate::consts::*;
use crate::tuning::{EnemyKind, Tuning};

/// Scatter radius of a swarm around its anchor
pub const SWARM_SPREAD: f32 = 80.0;
/// Scatter radius of minions around their parent
pub const MINION_SPREAD: f32 = 50.0;

#[derive(Debug, Clone, Default)]
pub struct SpawnManager {
    check_timer: f32,
    chest_timer: f32,
    /// Index of the next unspawned boss
    next_boss: usize,
}

impl SpawnManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bosses_spawned(&self) -> usize {
        self.next_boss
    }

    pub fn update(&mut self, state: &mut GameState, tuning: &Tuning, dt: f32) {
        self.check_bosses(state, tuning);
        self.check_chest(state, dt);

        self.check_timer += dt;
        if self.check_timer < SPAWN_CHECK_INTERVAL {
            return;
        }
        self.check_timer -= SPAWN_CHECK_INTERVAL;

        if state.enemies.len() >= MAX_ENEMIES {
            return;
        }

        let minutes = state.difficulty.rate_minutes(state.time);
        for rule in &tuning.spawn_rules {
            if state.enemies.len() >= MAX_ENEMIES {
                break;
            }
            let chance = (rule.rate(minutes) * SPAWN_CHECK_INTERVAL).clamp(0.0, 1.0);
            if chance <= 0.0 || state.rng.random::<f32>() >= chance {
                continue;
            }
            let Some(config) = tuning.enemy(rule.kind) else {
                log::warn!("No stat block for spawn rule '{}'", rule.kind.as_str());
                continue;
            };
            match rule.swarm {
                Some(swarm) => {
                    let anchor = spawn_position(state);
                    for _ in 0..swarm.group_size(minutes) {
                        if state.enemies.len() >= MAX_ENEMIES {
                            break;
                        }
                        let offset = Vec2::new(
                            state.random_range(-SWARM_SPREAD, SWARM_SPREAD),
                            state.random_range(-SWARM_SPREAD, SWARM_SPREAD),
                        );
                        state.spawn_enemy(config, anchor + offset);
                    }
                }
                None => {
                    let pos = spawn_position(state);
                    state.spawn_enemy(config, pos);
                }
            }
        }
    }

    fn check_bosses(&mut self, state: &mut GameState, tuning: &Tuning) {
        while let Some(boss) = tuning.bosses.get(self.next_boss) {
            if state.time < boss.time {
                break;
            }
            self.next_boss += 1;
            let pos = spawn_position(state);
            let id = state.spawn_enemy_at_time(&boss.as_enemy_config(), pos, 0.0);
            if let Some(enemy) = state.enemies.iter_mut().find(|e| e.id == id) {
                enemy.name = Some(boss.name.clone());
            }
            log::info!("Boss incoming: {} at {:.1}s", boss.name, state.time);
            state.visuals.boss_warning = Some(BossWarning {
                name: boss.name.clone(),
                timer: BOSS_WARNING_DURATION,
            });
            state.push_event(GameEvent::BossSpawned {
                name: boss.name.clone(),
            });
        }
    }

    fn check_chest(&mut self, state: &mut GameState, dt: f32) {
        self.chest_timer += dt;
        if self.chest_timer < CHEST_INTERVAL {
            return;
        }
        self.chest_timer -= CHEST_INTERVAL;
        let pos = spawn_position(state);
        let id = state.next_entity_id();
        state.chests.push(TreasureChest::new(id, pos, state.time));
        log::debug!("Chest spawned at ({:.0}, {:.0})", pos.x, pos.y);
        state.push_event(GameEvent::ChestSpawned { pos });
    }

    /// Spawn the minions a charging enemy asked for, up to the enemy cap
    pub fn spawn_minions(&self, state: &mut GameState, tuning: &Tuning, request: MinionRequest) {
        let Some(config) = tuning.enemy(request.kind) else {
            log::warn!("No stat block for minion type '{}'", request.kind.as_str());
            return;
        };
        for _ in 0..request.count {
            if state.enemies.len() >= MAX_ENEMIES {
                break;
            }
            let offset = Vec2::new(
                state.random_range(-MINION_SPREAD, MINION_SPREAD),
                state.random_range(-MINION_SPREAD, MINION_SPREAD),
            );
            state.spawn_enemy(config, request.pos + offset);
        }
    }

    /// Force-spawn one enemy at the viewport ring (host debug hook)
    pub fn spawn_one(
        &self,
        state: &mut GameState,
        tuning: &Tuning,
        kind: EnemyKind,
    ) -> Option<u32> {
        let config = tuning.enemy(kind)?;
        let pos = spawn_position(state);
        Some(state.spawn_enemy(config, pos))
    }
}

/// A point on one of the four edges just outside the player's view.
///
/// The lateral coordinate spans a full viewport either side of the player.
pub fn spawn_position(state: &mut GameState) -> Vec2 {
    let player = state.player.pos;
    let (w, h) = (state.viewport.width, state.viewport.height);
    let pos = match state.rng.random_range(0..4u8) {
        0 => Vec2::new(player.x + state.random_range(-w, w), player.y - h / 2.0 - SPAWN_PADDING),
        1 => Vec2::new(player.x + state.random_range(-w, w), player.y + h / 2.0 + SPAWN_PADDING),
        2 => Vec2::new(player.x - w / 2.0 - SPAWN_PADDING, player.y + state.random_range(-h, h)),
        _ => Vec2::new(player.x + w / 2.0 + SPAWN_PADDING, player.y + state.random_range(-h, h)),
    };
    pos.clamp(Vec2::ZERO, state.world_size)
}
