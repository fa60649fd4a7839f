//! The player entity: movement, damage intake, leveling, dash and ultimate

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::progression::PermanentLevels;
use crate::tuning::{CharacterConfig, PassiveKind, StatKind};

/// XP needed to advance past `level`
pub fn xp_for_level(level: u32) -> f32 {
    let l = level as f32;
    (XP_BASE * l.powf(XP_EXPONENT) + XP_LINEAR * l).floor()
}

/// Damage left after armor: `raw * (1 - A / (A + 100))`
pub fn armor_mitigate(raw: f32, armor: f32) -> f32 {
    let armor = armor.max(0.0);
    raw * (1.0 - armor / (armor + 100.0))
}

/// Result of a hit landing on the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitOutcome {
    /// Invulnerable, nothing happened
    Ignored,
    /// A shield charge soaked the hit
    Absorbed,
    /// HP was reduced by this much
    Damaged(f32),
}

/// Display entry for an owned weapon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponBadge {
    pub id: String,
    pub name: String,
    pub icon: String,
    /// 1-based level for display
    pub level: u32,
    pub evolved: bool,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub armor: f32,
    pub speed: f32,
    pub hp_regen: f32,
    pub damage_mult: f32,
    pub attack_speed_mult: f32,
    pub pickup_range: f32,
    pub xp: f32,
    pub level: u32,
    pub xp_required: f32,
    pub kills: u32,
    pub weapons: Vec<WeaponBadge>,
    /// Facing angle in radians, updated while moving
    pub facing: f32,

    pub ultimate_charge: f32,
    pub ultimate_max: f32,
    pub ultimate_active: bool,
    pub ultimate_timer: f32,

    pub dash_active: bool,
    pub dash_timer: f32,
    pub dash_cooldown: f32,
    dash_dir: Vec2,

    pub invuln_timer: f32,

    /// Passive-driven modifiers
    pub gold_mult: f32,
    pub xp_mult: f32,
    pub luck: f32,
    pub extra_projectiles: u32,
    pub shield: u32,
    pub max_shield: u32,
    pub shield_timer: f32,
    pub shield_interval: f32,
    pub passives: BTreeMap<PassiveKind, u32>,
}

impl Player {
    /// Build a run's player from an archetype and the meta-progression levels
    pub fn new(character: &CharacterConfig, permanent: &PermanentLevels, world_size: Vec2) -> Self {
        let stats = character.stats.sanitized();
        let might = 1.0 + permanent.might as f32 * 0.05;
        let speed = 1.0 + permanent.speed as f32 * 0.05;
        let max_hp = stats.max_hp;

        Self {
            pos: world_size / 2.0,
            radius: PLAYER_RADIUS,
            hp: max_hp,
            max_hp,
            armor: stats.armor + permanent.armor as f32,
            speed: stats.speed * speed,
            hp_regen: stats.hp_regen + permanent.recovery as f32 * 0.1,
            damage_mult: stats.damage_mult * might,
            attack_speed_mult: stats.cooldown_mult,
            pickup_range: PLAYER_BASE_PICKUP_RANGE,
            xp: 0.0,
            level: 1,
            xp_required: xp_for_level(1),
            kills: 0,
            weapons: Vec::new(),
            facing: 0.0,
            ultimate_charge: 0.0,
            ultimate_max: ULTIMATE_MAX,
            ultimate_active: false,
            ultimate_timer: 0.0,
            dash_active: false,
            dash_timer: 0.0,
            dash_cooldown: 0.0,
            dash_dir: Vec2::X,
            invuln_timer: 0.0,
            gold_mult: 1.0 + permanent.greed as f32 * 0.1,
            xp_mult: 1.0,
            luck: 1.0,
            extra_projectiles: 0,
            shield: 0,
            max_shield: 0,
            shield_timer: 0.0,
            shield_interval: 0.0,
            passives: BTreeMap::new(),
        }
    }

    /// Advance timers, regen and movement.
    ///
    /// `movement` is the resolved input vector (magnitude <= 1).
    pub fn update(&mut self, dt: f32, movement: Vec2, world_size: Vec2) {
        if self.invuln_timer > 0.0 {
            self.invuln_timer = (self.invuln_timer - dt).max(0.0);
        }
        if self.dash_cooldown > 0.0 {
            self.dash_cooldown = (self.dash_cooldown - dt).max(0.0);
        }
        if self.dash_active {
            self.dash_timer -= dt;
            if self.dash_timer <= 0.0 {
                self.dash_active = false;
                self.dash_timer = 0.0;
            }
        }
        if self.ultimate_active {
            self.ultimate_timer -= dt;
            if self.ultimate_timer <= 0.0 {
                self.ultimate_active = false;
                self.ultimate_timer = 0.0;
            }
        }
        self.update_shield(dt);

        if self.hp_regen > 0.0 && self.hp > 0.0 {
            self.hp = (self.hp + self.hp_regen * dt).min(self.max_hp);
        }

        let movement = if movement.is_finite() {
            movement.clamp_length_max(1.0)
        } else {
            Vec2::ZERO
        };
        let dir = if self.dash_active { self.dash_dir } else { movement };
        if dir.length_squared() > 0.0 {
            self.facing = dir.y.atan2(dir.x);
            let boost = if self.dash_active { DASH_SPEED_MULT } else { 1.0 };
            let speed = (self.speed * boost).min(PLAYER_MAX_SPEED * boost);
            self.pos += dir * speed * dt;
        }
        self.pos = self.pos.clamp(Vec2::splat(self.radius), world_size - Vec2::splat(self.radius));
    }

    fn update_shield(&mut self, dt: f32) {
        if self.max_shield == 0 || self.shield >= self.max_shield {
            self.shield_timer = 0.0;
            return;
        }
        self.shield_timer += dt;
        if self.shield_timer >= self.shield_interval {
            self.shield_timer = 0.0;
            self.shield += 1;
        }
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invuln_timer > 0.0 || self.dash_active
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    /// Apply a raw hit. Armor mitigates, a shield charge absorbs, and any
    /// landed hit opens the invulnerability window.
    pub fn take_damage(&mut self, raw: f32) -> HitOutcome {
        if self.is_invulnerable() || self.is_dead() || !(raw > 0.0) {
            return HitOutcome::Ignored;
        }
        self.invuln_timer = INVULN_DURATION;
        if self.shield > 0 {
            self.shield -= 1;
            return HitOutcome::Absorbed;
        }
        let applied = armor_mitigate(raw, self.armor);
        self.hp = (self.hp - applied).max(0.0);
        HitOutcome::Damaged(applied)
    }

    pub fn heal(&mut self, amount: f32) {
        self.hp = (self.hp + amount.max(0.0)).min(self.max_hp);
    }

    /// Add XP, leveling up as many times as it covers. Returns levels gained.
    pub fn gain_xp(&mut self, amount: f32) -> u32 {
        if !(amount > 0.0) || !amount.is_finite() {
            return 0;
        }
        self.xp += amount;
        let mut gained = 0;
        while self.xp >= self.xp_required {
            self.xp -= self.xp_required;
            self.level += 1;
            self.xp_required = xp_for_level(self.level);
            gained += 1;
        }
        gained
    }

    pub fn add_ultimate_charge(&mut self, amount: f32) {
        if self.ultimate_active {
            return;
        }
        self.ultimate_charge = (self.ultimate_charge + amount).clamp(0.0, self.ultimate_max);
    }

    pub fn can_use_ultimate(&self) -> bool {
        self.ultimate_charge >= self.ultimate_max && !self.ultimate_active
    }

    /// Spend the full charge. Returns false when not ready.
    pub fn activate_ultimate(&mut self) -> bool {
        if !self.can_use_ultimate() {
            return false;
        }
        self.ultimate_charge = 0.0;
        self.ultimate_active = true;
        self.ultimate_timer = ULTIMATE_DURATION;
        self.invuln_timer = self.invuln_timer.max(ULTIMATE_DURATION);
        true
    }

    /// Start a dash toward `movement`, or along the facing when standing still
    pub fn try_dash(&mut self, movement: Vec2) -> bool {
        if self.dash_cooldown > 0.0 || self.dash_active {
            return false;
        }
        self.dash_dir = if movement.is_finite() && movement.length_squared() > 0.0 {
            movement.normalize()
        } else {
            crate::from_angle(self.facing)
        };
        self.dash_active = true;
        self.dash_timer = DASH_DURATION;
        self.dash_cooldown = DASH_COOLDOWN;
        true
    }

    /// Level-up stat option: multiplicative stats scale, the rest add
    pub fn apply_stat_upgrade(&mut self, stat: StatKind, value: f32) {
        if !value.is_finite() {
            return;
        }
        match stat {
            StatKind::MaxHp => {
                self.max_hp += value;
                self.hp = (self.hp + value).min(self.max_hp);
            }
            StatKind::Damage => self.damage_mult *= value,
            StatKind::AttackSpeed => self.attack_speed_mult *= value,
            StatKind::Speed => self.speed *= value,
            StatKind::PickupRange => self.pickup_range *= value,
            StatKind::Armor => self.armor += value,
            StatKind::HpRegen => self.hp_regen += value,
        }
    }

    pub fn passive_level(&self, kind: PassiveKind) -> u32 {
        self.passives.get(&kind).copied().unwrap_or(0)
    }

    /// Raise a passive by one level. Returns the new level, or `None` when maxed.
    pub fn level_passive(&mut self, kind: PassiveKind, max_level: u32) -> Option<u32> {
        let level = self.passive_level(kind);
        if level >= max_level {
            return None;
        }
        let next = level + 1;
        self.passives.insert(kind, next);
        apply_passive(self, kind, next);
        Some(next)
    }
}

/// Apply the step from `level - 1` to `level` of a passive.
///
/// Multiplicative passives apply the ratio between consecutive levels so they
/// compose with stat upgrades taken in between.
pub fn apply_passive(player: &mut Player, kind: PassiveKind, level: u32) {
    if level == 0 {
        return;
    }
    let l = level as f32;
    let ratio = |per: f32| (1.0 + per * l) / (1.0 + per * (l - 1.0));
    match kind {
        PassiveKind::Magnet => player.pickup_range *= ratio(0.3),
        PassiveKind::Shield => {
            player.max_shield = level;
            player.shield_interval = (30.0 - 2.0 * l).max(1.0);
            player.shield = (player.shield + 1).min(player.max_shield);
        }
        PassiveKind::Luck => player.luck = 1.0 + 0.2 * l,
        PassiveKind::Cooldown => player.attack_speed_mult *= ratio(0.08),
        PassiveKind::Regen => player.hp_regen += 1.0,
        PassiveKind::Armor => player.armor += 2.0,
        PassiveKind::Speed => player.speed *= ratio(0.1),
        PassiveKind::Growth => player.xp_mult = 1.0 + 0.1 * l,
        PassiveKind::Duplicator => player.extra_projectiles = level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn player() -> Player {
        Player::new(
            &CharacterConfig::fallback(),
            &PermanentLevels::default(),
            Vec2::new(WORLD_WIDTH, WORLD_HEIGHT),
        )
    }

    #[test]
    fn test_xp_curve() {
        assert_eq!(xp_for_level(1), 15.0);
        assert_eq!(xp_for_level(2), (10.0 * 2f32.powf(1.8) + 10.0).floor());
    }

    #[test]
    fn test_multi_level_gain_leaves_remainder() {
        let mut p = player();
        let r1 = xp_for_level(1);
        let r2 = xp_for_level(2);
        let gained = r1 + r2 + 3.0;
        assert_eq!(p.gain_xp(gained), 2);
        assert_eq!(p.level, 3);
        assert!((p.xp - (gained - r1 - r2)).abs() < 1e-4);
        assert_eq!(p.xp_required, xp_for_level(3));
    }

    #[test]
    fn test_hit_then_invulnerable() {
        let mut p = player();
        p.hp = 50.0;
        assert_eq!(p.take_damage(20.0), HitOutcome::Damaged(20.0));
        assert_eq!(p.hp, 30.0);
        assert_eq!(p.invuln_timer, INVULN_DURATION);
        assert_eq!(p.take_damage(20.0), HitOutcome::Ignored);
        assert_eq!(p.hp, 30.0);
    }

    #[test]
    fn test_hp_never_negative() {
        let mut p = player();
        p.take_damage(10_000.0);
        assert_eq!(p.hp, 0.0);
        assert!(p.is_dead());
    }

    #[test]
    fn test_shield_absorbs_and_recharges() {
        let mut p = player();
        assert_eq!(p.level_passive(PassiveKind::Shield, 5), Some(1));
        assert_eq!(p.shield, 1);
        assert_eq!(p.take_damage(30.0), HitOutcome::Absorbed);
        assert_eq!(p.hp, p.max_hp);

        let world = Vec2::new(WORLD_WIDTH, WORLD_HEIGHT);
        for _ in 0..(28 * 60 + 5) {
            p.update(SIM_DT, Vec2::ZERO, world);
        }
        assert_eq!(p.shield, 1);
    }

    #[test]
    fn test_ultimate_contract() {
        let mut p = player();
        p.add_ultimate_charge(250.0);
        assert_eq!(p.ultimate_charge, ULTIMATE_MAX);
        assert!(p.can_use_ultimate());
        assert!(p.activate_ultimate());
        assert_eq!(p.ultimate_charge, 0.0);
        assert!(p.ultimate_active);
        assert!(!p.can_use_ultimate());
        p.add_ultimate_charge(50.0);
        assert_eq!(p.ultimate_charge, 0.0);
        assert!(!p.activate_ultimate());
    }

    #[test]
    fn test_dash_gates_on_cooldown() {
        let mut p = player();
        let start = p.pos;
        assert!(p.try_dash(Vec2::X));
        assert!(!p.try_dash(Vec2::X));
        assert!(p.is_invulnerable());
        p.update(0.1, Vec2::ZERO, Vec2::new(WORLD_WIDTH, WORLD_HEIGHT));
        assert!((p.pos.x - start.x - p.speed * DASH_SPEED_MULT * 0.1).abs() < 1e-3);
    }

    #[test]
    fn test_movement_clamped_to_world() {
        let mut p = player();
        p.pos = Vec2::new(5.0, 5.0);
        p.update(1.0, Vec2::new(-1.0, -1.0).normalize(), Vec2::new(WORLD_WIDTH, WORLD_HEIGHT));
        assert_eq!(p.pos, Vec2::splat(PLAYER_RADIUS));
    }

    #[test]
    fn test_stat_upgrades() {
        let mut p = player();
        p.hp = 90.0;
        p.apply_stat_upgrade(StatKind::MaxHp, 20.0);
        assert_eq!((p.max_hp, p.hp), (120.0, 110.0));
        p.apply_stat_upgrade(StatKind::Damage, 1.15);
        assert!((p.damage_mult - 1.15).abs() < 1e-6);
        p.apply_stat_upgrade(StatKind::Armor, 8.0);
        assert_eq!(p.armor, 8.0);
    }

    #[test]
    fn test_passive_steps_compose() {
        let mut p = player();
        for _ in 0..3 {
            p.level_passive(PassiveKind::Magnet, 5);
        }
        assert!((p.pickup_range - PLAYER_BASE_PICKUP_RANGE * 1.9).abs() < 1e-3);
        assert_eq!(p.level_passive(PassiveKind::Duplicator, 2), Some(1));
        assert_eq!(p.level_passive(PassiveKind::Duplicator, 2), Some(2));
        assert_eq!(p.level_passive(PassiveKind::Duplicator, 2), None);
        assert_eq!(p.extra_projectiles, 2);
    }

    #[test]
    fn test_permanent_levels_apply() {
        let perm = PermanentLevels {
            might: 2,
            armor: 3,
            recovery: 1,
            greed: 5,
            speed: 1,
        };
        let p = Player::new(&CharacterConfig::fallback(), &perm, Vec2::splat(100.0));
        assert!((p.damage_mult - 1.1).abs() < 1e-6);
        assert_eq!(p.armor, 3.0);
        assert!((p.hp_regen - 0.1).abs() < 1e-6);
        assert!((p.gold_mult - 1.5).abs() < 1e-6);
        assert!((p.speed - PLAYER_BASE_SPEED * 1.05).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn prop_armor_formula(raw in 0.0f32..10_000.0, armor in 0.0f32..1.0e6) {
            let applied = armor_mitigate(raw, armor);
            let expected = raw * (1.0 - armor / (armor + 100.0));
            prop_assert!((applied - expected).abs() <= raw * 1e-5 + 1e-5);
            prop_assert!(applied <= raw);
            if raw > 0.0 {
                prop_assert!(applied > 0.0);
            }
        }

        #[test]
        fn prop_zero_armor_is_identity(raw in 0.0f32..10_000.0) {
            prop_assert_eq!(armor_mitigate(raw, 0.0), raw);
        }
    }
}
