//! Data-driven game balance
//!
//! Every table here is plain serializable data:
//! - `characters`: playable archetypes (base stats + starting weapon)
//! - `enemies`: enemy stat blocks, AI parameters, scaling laws, spawn rules, bosses
//! - `weapons`: per-level weapon tables and evolutions
//! - `upgrades`: chest passives and the level-up stat pool
//!
//! `Tuning::default()` carries the shipped balance. `Tuning::from_json` lets a
//! host override it and validates before handing it to the engine.

pub mod characters;
pub mod enemies;
pub mod upgrades;
pub mod weapons;

pub use characters::{BaseStats, CharacterConfig};
pub use enemies::{
    AiParams, BossConfig, EnemyConfig, EnemyKind, MinionSpawn, ScalingLaw, SpawnRule, SwarmRule,
};
pub use upgrades::{PassiveConfig, PassiveKind, StatKind, StatUpgrade};
pub use weapons::{Evolution, WeaponConfig, WeaponKind, WeaponLevel, WeaponParams};

use serde::{Deserialize, Serialize};

/// Errors raised while loading or validating tuning data
#[derive(Debug, thiserror::Error)]
pub enum TuningError {
    #[error("invalid tuning JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("weapon '{0}' has no levels")]
    EmptyWeapon(String),

    #[error("weapon '{0}' mixes behaviour kinds across its levels")]
    MixedWeaponKinds(String),

    #[error("default character '{0}' is not defined")]
    UnknownDefaultCharacter(String),

    #[error("default weapon '{0}' is not defined")]
    UnknownDefaultWeapon(String),

    #[error("enemy type '{0}' is referenced but has no stat block")]
    UndefinedEnemy(&'static str),

    #[error("boss '{0}' is not scheduled strictly after the previous boss")]
    BossOrder(String),

    #[error("enemy scaling law must be non-decreasing over time")]
    NonMonotonicScaling,
}

/// Complete balance table consumed by the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tuning {
    pub characters: Vec<CharacterConfig>,
    pub default_character: String,
    pub enemies: Vec<EnemyConfig>,
    #[serde(default)]
    pub scaling: ScalingLaw,
    pub spawn_rules: Vec<SpawnRule>,
    pub bosses: Vec<BossConfig>,
    pub weapons: Vec<WeaponConfig>,
    pub default_weapon: String,
    pub passives: Vec<PassiveConfig>,
    pub stat_upgrades: Vec<StatUpgrade>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            characters: characters::default_characters(),
            default_character: "mage".into(),
            enemies: enemies::default_enemies(),
            scaling: ScalingLaw::default(),
            spawn_rules: enemies::default_spawn_rules(),
            bosses: enemies::default_bosses(),
            weapons: weapons::default_weapons(),
            default_weapon: "fireball".into(),
            passives: upgrades::default_passives(),
            stat_upgrades: upgrades::default_stat_upgrades(),
        }
    }
}

impl Tuning {
    /// Parse and validate a tuning table
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check cross-table references and per-table shape
    pub fn validate(&self) -> Result<(), TuningError> {
        for weapon in &self.weapons {
            let Some(kind) = weapon.kind() else {
                return Err(TuningError::EmptyWeapon(weapon.id.clone()));
            };
            if weapon.levels.iter().any(|l| l.params.kind() != kind) {
                return Err(TuningError::MixedWeaponKinds(weapon.id.clone()));
            }
        }

        if self.character(&self.default_character).is_none() {
            return Err(TuningError::UnknownDefaultCharacter(
                self.default_character.clone(),
            ));
        }
        if self.weapon(&self.default_weapon).is_none() {
            return Err(TuningError::UnknownDefaultWeapon(self.default_weapon.clone()));
        }

        for rule in &self.spawn_rules {
            if self.enemy(rule.kind).is_none() {
                return Err(TuningError::UndefinedEnemy(rule.kind.as_str()));
            }
        }
        for enemy in &self.enemies {
            if let AiParams::Charge {
                minions: Some(m), ..
            } = enemy.ai
            {
                if self.enemy(m.kind).is_none() {
                    return Err(TuningError::UndefinedEnemy(m.kind.as_str()));
                }
            }
        }

        let mut last = 0.0f32;
        for boss in &self.bosses {
            if !(boss.time > last) {
                return Err(TuningError::BossOrder(boss.name.clone()));
            }
            last = boss.time;
        }

        if !self.scaling.is_monotonic() {
            return Err(TuningError::NonMonotonicScaling);
        }
        Ok(())
    }

    pub fn character(&self, id: &str) -> Option<&CharacterConfig> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Resolve a character id, falling back to the default archetype
    pub fn character_or_default(&self, id: &str) -> CharacterConfig {
        if let Some(c) = self.character(id) {
            return c.clone();
        }
        log::warn!("Unknown character '{id}', using '{}'", self.default_character);
        self.character(&self.default_character)
            .cloned()
            .unwrap_or_else(CharacterConfig::fallback)
    }

    pub fn weapon(&self, id: &str) -> Option<&WeaponConfig> {
        self.weapons.iter().find(|w| w.id == id)
    }

    pub fn enemy(&self, kind: EnemyKind) -> Option<&EnemyConfig> {
        self.enemies.iter().find(|e| e.kind == kind)
    }

    pub fn passive(&self, kind: PassiveKind) -> Option<&PassiveConfig> {
        self.passives.iter().find(|p| p.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tuning_validates() {
        Tuning::default().validate().unwrap();
    }

    #[test]
    fn test_json_roundtrip_preserves_tables() {
        let json = Tuning::default().to_json().unwrap();
        let tuning = Tuning::from_json(&json).unwrap();
        assert_eq!(tuning.weapons.len(), 6);
        assert_eq!(tuning.bosses[0].name, "Bone Colossus");
    }

    #[test]
    fn test_rejects_mixed_weapon_kinds() {
        let mut tuning = Tuning::default();
        tuning.weapons[0].levels[1].params = WeaponParams::Orbit {
            orb_count: 1,
            radius: 50.0,
            rotation_speed: 1.0,
        };
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::MixedWeaponKinds(id)) if id == "fireball"
        ));
    }

    #[test]
    fn test_rejects_empty_weapon_and_bad_defaults() {
        let mut tuning = Tuning::default();
        tuning.weapons[2].levels.clear();
        assert!(matches!(tuning.validate(), Err(TuningError::EmptyWeapon(_))));

        let mut tuning = Tuning::default();
        tuning.default_weapon = "laser".into();
        assert!(matches!(tuning.validate(), Err(TuningError::UnknownDefaultWeapon(_))));

        let mut tuning = Tuning::default();
        tuning.default_character = "rogue".into();
        assert!(matches!(tuning.validate(), Err(TuningError::UnknownDefaultCharacter(_))));
    }

    #[test]
    fn test_rejects_undefined_enemy_and_boss_order() {
        let mut tuning = Tuning::default();
        tuning.enemies.retain(|e| e.kind != EnemyKind::Zombie);
        assert!(matches!(tuning.validate(), Err(TuningError::UndefinedEnemy("zombie"))));

        let mut tuning = Tuning::default();
        tuning.bosses.swap(0, 1);
        assert!(matches!(tuning.validate(), Err(TuningError::BossOrder(_))));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(Tuning::from_json("{"), Err(TuningError::Json(_))));
    }

    #[test]
    fn test_character_fallback() {
        let tuning = Tuning::default();
        assert_eq!(tuning.character_or_default("cleric").starting_weapon, "holy_beam");
        assert_eq!(tuning.character_or_default("nobody").id, "mage");
    }
}
