//! Circle-overlap collision resolution
//!
//! Runs once per tick after every position update, in two passes:
//! 1. player vs each enemy (contact damage, gated by the enemy's cooldown)
//! 2. each projectile vs each enemy (damage, status payload, area blast)
//!
//! Stateless between ticks. Double-hit prevention lives on the projectile.

use glam::Vec2;

use super::particles::ParticleKind;
use super::player::HitOutcome;
use super::projectile::PROJECTILE_SLOW_DURATION;
use super::state::{GameEvent, GameState};
use crate::consts::*;
use crate::tuning::WeaponKind;

/// What happened during one resolution pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    /// Contacts that reached the player (damaged or absorbed)
    pub player_hits: u32,
    pub player_damage: f32,
    pub projectile_hits: u32,
    pub aoe_hits: u32,
}

/// Strict overlap of two circles
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    a.distance_squared(b) < reach * reach
}

pub fn resolve(state: &mut GameState) -> CollisionReport {
    let mut report = CollisionReport::default();
    player_vs_enemies(state, &mut report);
    projectiles_vs_enemies(state, &mut report);
    report
}

fn player_vs_enemies(state: &mut GameState, report: &mut CollisionReport) {
    let (pos, radius) = (state.player.pos, state.player.radius);
    for i in 0..state.enemies.len() {
        let enemy = &mut state.enemies[i];
        if enemy.dead || !circles_overlap(pos, radius, enemy.pos, enemy.radius) {
            continue;
        }
        if !enemy.can_damage_player() {
            continue;
        }
        enemy.reset_contact_cooldown();
        let raw = enemy.damage;

        match state.player.take_damage(raw) {
            HitOutcome::Damaged(amount) => {
                report.player_hits += 1;
                report.player_damage += amount;
                state.player.add_ultimate_charge(ULTIMATE_CHARGE_ON_HIT);
                state.visuals.shake(4.0, 0.2);
                state.push_event(GameEvent::PlayerHit { damage: amount });
            }
            HitOutcome::Absorbed => {
                report.player_hits += 1;
                state.push_event(GameEvent::ShieldBlocked);
            }
            HitOutcome::Ignored => {}
        }
    }
}

fn projectiles_vs_enemies(state: &mut GameState, report: &mut CollisionReport) {
    for pi in 0..state.projectiles.len() {
        if state.projectiles[pi].consumed {
            continue;
        }
        for ei in 0..state.enemies.len() {
            let (enemy_id, enemy_pos) = {
                let p = &state.projectiles[pi];
                let e = &state.enemies[ei];
                if e.dead || !circles_overlap(p.pos, p.radius, e.pos, e.radius) {
                    continue;
                }
                (e.id, e.pos)
            };
            if !state.projectiles[pi].on_hit(enemy_id) {
                continue;
            }

            let p = &state.projectiles[pi];
            let (source, status, impact, consumed) = (p.source, p.status, p.pos, p.consumed);
            let (aoe_radius, aoe_mult) = (p.aoe_radius, p.aoe_damage_mult);
            // Multiplier read at impact so mid-flight buffs apply
            let damage = p.damage * state.player.damage_mult;

            let enemy = &mut state.enemies[ei];
            if status.slow > 0.0 {
                enemy.apply_slow(status.slow, PROJECTILE_SLOW_DURATION);
            }
            enemy.apply_freeze(status.freeze);
            enemy.apply_burn(status.burn_damage, status.burn_duration);

            state.damage_enemy(ei, damage, source);
            report.projectile_hits += 1;
            let kind = match source {
                WeaponKind::Radial => ParticleKind::Frost,
                _ => ParticleKind::Hit,
            };
            state.particles.burst(&mut state.rng, enemy_pos, kind, 4, 120.0);

            if consumed {
                if aoe_radius > 0.0 {
                    let splash = damage * aoe_mult;
                    report.aoe_hits += area_blast(state, impact, aoe_radius, splash, enemy_id);
                }
                break;
            }
        }
    }
}

/// Damage every other live enemy within `radius` of `center`
fn area_blast(state: &mut GameState, center: Vec2, radius: f32, damage: f32, skip_id: u32) -> u32 {
    let mut hits = 0;
    for i in 0..state.enemies.len() {
        let e = &state.enemies[i];
        if e.dead || e.id == skip_id || e.pos.distance_squared(center) >= radius * radius {
            continue;
        }
        state.damage_enemy(i, damage, WeaponKind::Projectile);
        hits += 1;
    }
    state.particles.burst(&mut state.rng, center, ParticleKind::Explosion, 12, radius * 3.0);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::PermanentLevels;
    use crate::sim::player::Player;
    use crate::sim::projectile::Projectile;
    use crate::sim::state::Difficulty;
    use crate::tuning::{CharacterConfig, EnemyKind, Tuning};

    fn setup() -> (Tuning, GameState) {
        let tuning = Tuning::default();
        let player = Player::new(
            &CharacterConfig::fallback(),
            &PermanentLevels::default(),
            Vec2::new(WORLD_WIDTH, WORLD_HEIGHT),
        );
        let state = GameState::new(5, Difficulty::Normal, player, tuning.scaling);
        (tuning, state)
    }

    fn zombie_at(state: &mut GameState, tuning: &Tuning, pos: Vec2) -> usize {
        let config = tuning.enemy(EnemyKind::Zombie).unwrap().clone();
        state.spawn_enemy(&config, pos);
        state.enemies.len() - 1
    }

    fn bolt(pos: Vec2, damage: f32) -> Projectile {
        Projectile::new(WeaponKind::Projectile, pos, Vec2::X, 400.0, damage)
    }

    #[test]
    fn test_overlap_is_strict() {
        assert!(circles_overlap(Vec2::ZERO, 5.0, Vec2::new(9.9, 0.0), 5.0));
        assert!(!circles_overlap(Vec2::ZERO, 5.0, Vec2::new(10.0, 0.0), 5.0));
    }

    #[test]
    fn test_contact_damage_throttled() {
        let (tuning, mut state) = setup();
        let p = state.player.pos;
        zombie_at(&mut state, &tuning, p + Vec2::new(10.0, 0.0));
        let report = resolve(&mut state);
        assert_eq!(report.player_hits, 1);
        assert_eq!(state.player.hp, 92.0);
        assert_eq!(state.player.ultimate_charge, ULTIMATE_CHARGE_ON_HIT);

        state.player.invuln_timer = 0.0;
        let report = resolve(&mut state);
        assert_eq!(report.player_hits, 0);
        assert_eq!(state.player.hp, 92.0);
    }

    #[test]
    fn test_single_use_projectile_hits_once() {
        let (tuning, mut state) = setup();
        let target = Vec2::new(1000.0, 1000.0);
        zombie_at(&mut state, &tuning, target);
        zombie_at(&mut state, &tuning, target + Vec2::new(3.0, 0.0));
        state.spawn_projectile(bolt(target, 15.0));

        let report = resolve(&mut state);
        assert_eq!(report.projectile_hits, 1);
        assert!(state.projectiles[0].consumed);
        assert_eq!(state.enemies.iter().filter(|e| e.dead).count(), 1);

        let report = resolve(&mut state);
        assert_eq!(report.projectile_hits, 0);
    }

    #[test]
    fn test_piercing_hits_each_enemy_once() {
        let (tuning, mut state) = setup();
        let target = Vec2::new(1000.0, 1000.0);
        for k in 0..3 {
            let i = zombie_at(&mut state, &tuning, target + Vec2::new(k as f32 * 4.0, 0.0));
            state.enemies[i].hp = 500.0;
        }
        let mut p = bolt(target, 5.0);
        p.piercing = true;
        state.spawn_projectile(p);
        assert_eq!(resolve(&mut state).projectile_hits, 3);
        assert_eq!(resolve(&mut state).projectile_hits, 0);
        assert!(!state.projectiles[0].consumed);
    }

    #[test]
    fn test_area_blast_on_consume() {
        let (tuning, mut state) = setup();
        let target = Vec2::new(1000.0, 1000.0);
        zombie_at(&mut state, &tuning, target);
        let near = zombie_at(&mut state, &tuning, target + Vec2::new(40.0, 0.0));
        let far = zombie_at(&mut state, &tuning, target + Vec2::new(200.0, 0.0));
        let mut p = bolt(target, 8.0);
        p.aoe_radius = 60.0;
        p.aoe_damage_mult = 0.5;
        state.spawn_projectile(p);

        let report = resolve(&mut state);
        assert_eq!(report.aoe_hits, 1);
        assert_eq!(state.enemies[near].hp, 6.0);
        assert_eq!(state.enemies[far].hp, 10.0);
    }

    #[test]
    fn test_damage_multiplier_read_at_impact() {
        let (tuning, mut state) = setup();
        let target = Vec2::new(1000.0, 1000.0);
        let i = zombie_at(&mut state, &tuning, target);
        state.enemies[i].hp = 100.0;
        state.spawn_projectile(bolt(target, 10.0));
        state.player.damage_mult = 2.0;
        resolve(&mut state);
        assert_eq!(state.enemies[i].hp, 80.0);
    }

    #[test]
    fn test_status_payload_applied() {
        let (tuning, mut state) = setup();
        let target = Vec2::new(1000.0, 1000.0);
        let i = zombie_at(&mut state, &tuning, target);
        state.enemies[i].hp = 100.0;
        let mut p = bolt(target, 1.0);
        p.piercing = true;
        p.status.slow = 0.4;
        p.status.freeze = 0.5;
        state.spawn_projectile(p);
        resolve(&mut state);
        assert!((state.enemies[i].status.slow_mult - 0.6).abs() < 1e-6);
        assert_eq!(state.enemies[i].status.slow_timer, PROJECTILE_SLOW_DURATION);
        assert!(state.enemies[i].is_frozen());
    }
}
