//! Enemy entity: time-scaled stats, AI movement and status effects

use glam::Vec2;
use rand::Rng;

use crate::direction_to;
use crate::tuning::{AiParams, EnemyConfig, EnemyKind, ScalingLaw};

/// Seconds between burn ticks
pub const BURN_TICK_INTERVAL: f32 = 0.5;
/// Seconds a hit flash lasts
pub const HIT_FLASH_DURATION: f32 = 0.1;

/// Per-instance AI memory. The variant matches the enemy's `AiParams`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AiState {
    Chase,
    /// Dash and charge share the burst cycle
    Burst {
        dashing: bool,
        timer: f32,
        cooldown: f32,
        direction: Vec2,
    },
    Sine {
        phase: f32,
    },
}

impl AiState {
    fn for_params<R: Rng + ?Sized>(params: &AiParams, rng: &mut R) -> Self {
        match params {
            AiParams::Chase => AiState::Chase,
            AiParams::Dash { .. } | AiParams::Charge { .. } => AiState::Burst {
                dashing: false,
                timer: 0.0,
                cooldown: 0.0,
                direction: Vec2::ZERO,
            },
            AiParams::Sine { .. } => AiState::Sine {
                phase: rng.random::<f32>() * std::f32::consts::TAU,
            },
        }
    }
}

/// Slow, freeze and burn, each on its own timer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusEffects {
    pub slow_mult: f32,
    pub slow_timer: f32,
    pub freeze_timer: f32,
    pub burn_damage: f32,
    pub burn_timer: f32,
    pub burn_tick: f32,
}

impl Default for StatusEffects {
    fn default() -> Self {
        Self {
            slow_mult: 1.0,
            slow_timer: 0.0,
            freeze_timer: 0.0,
            burn_damage: 0.0,
            burn_timer: 0.0,
            burn_tick: 0.0,
        }
    }
}

/// Deferred request to spawn minions around a charging enemy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinionRequest {
    pub kind: EnemyKind,
    pub count: u32,
    pub pos: Vec2,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    /// Display name for bosses
    pub name: Option<String>,
    pub pos: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub damage: f32,
    pub speed: f32,
    pub xp_value: u32,
    pub damage_reduction: f32,
    /// Seconds between contact hits
    pub contact_cooldown: f32,
    /// Remaining time before this enemy may hurt the player again
    pub damage_cooldown: f32,
    pub ai: AiParams,
    pub ai_state: AiState,
    pub status: StatusEffects,
    pub hit_flash: f32,
    /// Per-enemy re-hit delay for orbiting satellites
    pub orbit_hit_cooldown: f32,
    pub minions_requested: bool,
    pub dead: bool,
}

impl Enemy {
    /// Create an enemy with stats scaled to `game_time`
    pub fn new<R: Rng + ?Sized>(
        id: u32,
        config: &EnemyConfig,
        pos: Vec2,
        game_time: f32,
        scaling: &ScalingLaw,
        rng: &mut R,
    ) -> Self {
        let hp = config.hp * scaling.hp_multiplier(game_time);
        Self {
            id,
            kind: config.kind,
            name: None,
            pos,
            radius: config.radius,
            hp,
            max_hp: hp,
            damage: config.damage * scaling.damage_multiplier(game_time),
            speed: config.speed,
            xp_value: config.xp_value,
            damage_reduction: config.damage_reduction.clamp(0.0, 0.95),
            contact_cooldown: config.contact_cooldown,
            damage_cooldown: 0.0,
            ai: config.ai,
            ai_state: AiState::for_params(&config.ai, rng),
            status: StatusEffects::default(),
            hit_flash: 0.0,
            orbit_hit_cooldown: 0.0,
            minions_requested: false,
            dead: false,
        }
    }

    pub fn is_boss(&self) -> bool {
        self.kind == EnemyKind::Boss
    }

    pub fn is_frozen(&self) -> bool {
        self.status.freeze_timer > 0.0
    }

    /// Advance status timers and AI. Returns a minion request the first time a
    /// charging enemy falls below half HP.
    pub fn update(
        &mut self,
        dt: f32,
        player_pos: Vec2,
        game_time: f32,
        world_size: Vec2,
    ) -> Option<MinionRequest> {
        if self.dead {
            return None;
        }
        if self.hit_flash > 0.0 {
            self.hit_flash = (self.hit_flash - dt).max(0.0);
        }
        if self.orbit_hit_cooldown > 0.0 {
            self.orbit_hit_cooldown = (self.orbit_hit_cooldown - dt).max(0.0);
        }

        if self.is_frozen() {
            self.status.freeze_timer -= dt;
            self.tick_damage_cooldown(dt);
            self.tick_burn(dt);
            return None;
        }

        if self.status.slow_timer > 0.0 {
            self.status.slow_timer -= dt;
            if self.status.slow_timer <= 0.0 {
                self.status.slow_timer = 0.0;
                self.status.slow_mult = 1.0;
            }
        }

        let speed = self.speed * self.status.slow_mult;
        self.run_ai(dt, speed, player_pos, game_time);
        self.pos = self
            .pos
            .clamp(Vec2::splat(self.radius), world_size - Vec2::splat(self.radius));

        self.tick_damage_cooldown(dt);
        self.tick_burn(dt);

        self.check_minions()
    }

    fn run_ai(&mut self, dt: f32, speed: f32, player_pos: Vec2, game_time: f32) {
        let to_player = direction_to(self.pos, player_pos);
        let slow = self.status.slow_mult;
        match (self.ai, &mut self.ai_state) {
            (AiParams::Chase, _) => {
                if let Some(dir) = to_player {
                    self.pos += dir * speed * dt;
                }
            }
            (
                AiParams::Dash {
                    speed: burst_speed,
                    duration,
                    cooldown: burst_cooldown,
                    range,
                }
                | AiParams::Charge {
                    speed: burst_speed,
                    duration,
                    cooldown: burst_cooldown,
                    range,
                    ..
                },
                AiState::Burst {
                    dashing,
                    timer,
                    cooldown,
                    direction,
                },
            ) => {
                if *dashing {
                    self.pos += *direction * burst_speed * slow * dt;
                    *timer -= dt;
                    if *timer <= 0.0 {
                        *dashing = false;
                        *cooldown = burst_cooldown;
                    }
                } else if self.pos.distance(player_pos) < range && *cooldown <= 0.0 {
                    if let Some(dir) = to_player {
                        *direction = dir;
                        *dashing = true;
                        *timer = duration;
                    }
                } else {
                    if let Some(dir) = to_player {
                        self.pos += dir * speed * dt;
                    }
                    *cooldown -= dt;
                }
            }
            (AiParams::Sine { frequency, amplitude }, AiState::Sine { phase }) => {
                if let Some(dir) = to_player {
                    let perp = dir.perp();
                    let weave = (game_time * frequency + *phase).sin() * amplitude;
                    self.pos += dir * speed * dt + perp * weave * dt;
                }
            }
            // AI state out of sync with params; fall back to chasing
            _ => {
                if let Some(dir) = to_player {
                    self.pos += dir * speed * dt;
                }
            }
        }
    }

    fn check_minions(&mut self) -> Option<MinionRequest> {
        let AiParams::Charge {
            minions: Some(minions),
            ..
        } = self.ai
        else {
            return None;
        };
        if self.minions_requested || self.hp >= self.max_hp * 0.5 {
            return None;
        }
        self.minions_requested = true;
        Some(MinionRequest {
            kind: minions.kind,
            count: minions.count,
            pos: self.pos,
        })
    }

    fn tick_damage_cooldown(&mut self, dt: f32) {
        if self.damage_cooldown > 0.0 {
            self.damage_cooldown = (self.damage_cooldown - dt).max(0.0);
        }
    }

    fn tick_burn(&mut self, dt: f32) {
        if self.status.burn_timer <= 0.0 {
            return;
        }
        self.status.burn_timer -= dt;
        self.status.burn_tick -= dt;
        if self.status.burn_tick <= 0.0 {
            self.status.burn_tick += BURN_TICK_INTERVAL;
            self.take_damage(self.status.burn_damage);
        }
        if self.status.burn_timer <= 0.0 {
            self.status.burn_timer = 0.0;
            self.status.burn_damage = 0.0;
        }
    }

    /// Apply damage after reduction. Returns the amount actually removed.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        if self.dead || !(amount > 0.0) || !amount.is_finite() {
            return 0.0;
        }
        let applied = amount * (1.0 - self.damage_reduction);
        self.hp -= applied;
        self.hit_flash = HIT_FLASH_DURATION;
        if self.hp <= 0.0 {
            self.hp = 0.0;
            self.dead = true;
        }
        applied
    }

    /// Scale speed by `1 - amount` for `duration` seconds
    pub fn apply_slow(&mut self, amount: f32, duration: f32) {
        if !(amount > 0.0) {
            return;
        }
        self.status.slow_mult = (1.0 - amount).clamp(0.0, 1.0);
        self.status.slow_timer = duration.max(0.0);
    }

    pub fn apply_freeze(&mut self, duration: f32) {
        if duration > 0.0 {
            self.status.freeze_timer = self.status.freeze_timer.max(duration);
        }
    }

    pub fn apply_burn(&mut self, damage: f32, duration: f32) {
        if !(damage > 0.0) || !(duration > 0.0) {
            return;
        }
        self.status.burn_damage = damage;
        self.status.burn_timer = duration;
        self.status.burn_tick = BURN_TICK_INTERVAL;
    }

    pub fn can_damage_player(&self) -> bool {
        !self.dead && self.damage_cooldown <= 0.0
    }

    pub fn reset_contact_cooldown(&mut self) {
        self.damage_cooldown = self.contact_cooldown;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const WORLD: Vec2 = Vec2::new(4000.0, 4000.0);

    fn spawn(kind: EnemyKind, pos: Vec2, time: f32) -> Enemy {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(3);
        Enemy::new(1, tuning.enemy(kind).unwrap(), pos, time, &tuning.scaling, &mut rng)
    }

    #[test]
    fn test_scaled_stats() {
        let e = spawn(EnemyKind::Zombie, Vec2::ZERO, 0.0);
        assert_eq!(e.hp, 10.0);
        let late = spawn(EnemyKind::Zombie, Vec2::ZERO, 600.0);
        assert!(late.hp > e.hp);
        assert!(late.damage > e.damage);
    }

    #[test]
    fn test_chase_moves_toward_player() {
        let mut e = spawn(EnemyKind::Zombie, Vec2::new(1000.0, 1000.0), 0.0);
        e.update(1.0, Vec2::new(1200.0, 1000.0), 0.0, WORLD);
        assert!((e.pos.x - 1060.0).abs() < 1e-3);
    }

    #[test]
    fn test_chase_on_top_of_player_is_finite() {
        let mut e = spawn(EnemyKind::Zombie, Vec2::new(500.0, 500.0), 0.0);
        e.update(SIM_DT_TEST, Vec2::new(500.0, 500.0), 0.0, WORLD);
        assert!(e.pos.is_finite());
        assert_eq!(e.pos, Vec2::new(500.0, 500.0));
    }

    const SIM_DT_TEST: f32 = 1.0 / 60.0;

    #[test]
    fn test_slow_reduces_speed_then_expires() {
        let mut e = spawn(EnemyKind::Zombie, Vec2::new(1000.0, 1000.0), 0.0);
        e.apply_slow(0.5, 1.0);
        e.update(0.5, Vec2::new(2000.0, 1000.0), 0.0, WORLD);
        assert!((e.pos.x - 1015.0).abs() < 1e-3);
        e.update(0.6, Vec2::new(2000.0, 1000.0), 0.0, WORLD);
        assert_eq!(e.status.slow_mult, 1.0);
    }

    #[test]
    fn test_freeze_stops_movement_but_burn_ticks() {
        let mut e = spawn(EnemyKind::Zombie, Vec2::new(1000.0, 1000.0), 0.0);
        e.damage_cooldown = 1.0;
        e.apply_freeze(1.0);
        e.apply_burn(20.0, 2.0);
        e.update(0.6, Vec2::new(2000.0, 1000.0), 0.0, WORLD);
        assert_eq!(e.pos, Vec2::new(1000.0, 1000.0));
        assert!((e.damage_cooldown - 0.4).abs() < 1e-5);
        assert!(e.dead, "burn should kill while frozen");
    }

    #[test]
    fn test_damage_reduction() {
        let mut e = spawn(EnemyKind::Tank, Vec2::ZERO, 0.0);
        let applied = e.take_damage(10.0);
        assert!((applied - 8.0).abs() < 1e-5);
        assert_eq!(e.hit_flash, HIT_FLASH_DURATION);
    }

    #[test]
    fn test_dash_burst_cycle() {
        let mut e = spawn(EnemyKind::Runner, Vec2::new(1000.0, 1000.0), 0.0);
        let player = Vec2::new(1100.0, 1000.0);
        e.update(SIM_DT_TEST, player, 0.0, WORLD);
        assert!(matches!(e.ai_state, AiState::Burst { dashing: true, .. }));
        let before = e.pos;
        e.update(0.1, player, 0.0, WORLD);
        assert!((e.pos.x - before.x - 35.0).abs() < 1e-3);
        e.update(0.4, player, 0.0, WORLD);
        assert!(matches!(
            e.ai_state,
            AiState::Burst { dashing: false, cooldown, .. } if cooldown > 2.0
        ));
    }

    #[test]
    fn test_charge_requests_minions_once() {
        let mut e = spawn(EnemyKind::Elite, Vec2::new(1000.0, 1000.0), 0.0);
        let far = Vec2::new(3000.0, 3000.0);
        assert!(e.update(SIM_DT_TEST, far, 0.0, WORLD).is_none());
        e.take_damage(e.max_hp * 0.8);
        let req = e.update(SIM_DT_TEST, far, 0.0, WORLD).unwrap();
        assert_eq!((req.kind, req.count), (EnemyKind::Zombie, 6));
        assert!(e.update(SIM_DT_TEST, far, 0.0, WORLD).is_none());
    }

    #[test]
    fn test_sine_weaves() {
        let mut e = spawn(EnemyKind::Bat, Vec2::new(1000.0, 1000.0), 0.0);
        e.ai_state = AiState::Sine {
            phase: std::f32::consts::FRAC_PI_2,
        };
        e.update(0.1, Vec2::new(2000.0, 1000.0), 0.0, WORLD);
        assert!((e.pos.x - 1011.0).abs() < 1e-3);
        assert!((e.pos.y - 1012.0).abs() < 1e-3);
    }

    #[test]
    fn test_contact_cooldown() {
        let mut e = spawn(EnemyKind::Zombie, Vec2::ZERO, 0.0);
        assert!(e.can_damage_player());
        e.reset_contact_cooldown();
        assert!(!e.can_damage_player());
    }
}
