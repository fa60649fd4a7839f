//! Enemy stat tables, AI parameters, time scaling and the boss schedule

use serde::{Deserialize, Serialize};

/// Enemy type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Zombie,
    Runner,
    Tank,
    Bat,
    Elite,
    Boss,
}

impl EnemyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Zombie => "zombie",
            EnemyKind::Runner => "runner",
            EnemyKind::Tank => "tank",
            EnemyKind::Bat => "bat",
            EnemyKind::Elite => "elite",
            EnemyKind::Boss => "boss",
        }
    }
}

/// Minions requested by a charging enemy once it drops below half HP
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinionSpawn {
    pub kind: EnemyKind,
    pub count: u32,
}

/// Movement behaviour and its constants, fixed per enemy type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AiParams {
    Chase,
    Dash {
        speed: f32,
        duration: f32,
        cooldown: f32,
        range: f32,
    },
    Sine {
        frequency: f32,
        amplitude: f32,
    },
    Charge {
        speed: f32,
        duration: f32,
        cooldown: f32,
        range: f32,
        #[serde(default)]
        minions: Option<MinionSpawn>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyConfig {
    pub kind: EnemyKind,
    pub hp: f32,
    pub damage: f32,
    pub speed: f32,
    pub radius: f32,
    pub xp_value: u32,
    /// Seconds between contact hits on the player
    pub contact_cooldown: f32,
    /// Fraction of incoming damage ignored (0..1)
    #[serde(default)]
    pub damage_reduction: f32,
    pub ai: AiParams,
}

/// Time scaling of enemy stats: `1 + minutes^exponent * factor`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingLaw {
    pub hp_exponent: f32,
    pub hp_factor: f32,
    pub damage_exponent: f32,
    pub damage_factor: f32,
}

impl Default for ScalingLaw {
    fn default() -> Self {
        Self {
            hp_exponent: 1.6,
            hp_factor: 0.8,
            damage_exponent: 1.3,
            damage_factor: 0.3,
        }
    }
}

impl ScalingLaw {
    /// HP multiplier at `game_time` seconds (1.0 at t = 0)
    pub fn hp_multiplier(&self, game_time: f32) -> f32 {
        Self::curve(game_time, self.hp_exponent, self.hp_factor)
    }

    /// Damage multiplier at `game_time` seconds (1.0 at t = 0)
    pub fn damage_multiplier(&self, game_time: f32) -> f32 {
        Self::curve(game_time, self.damage_exponent, self.damage_factor)
    }

    fn curve(game_time: f32, exponent: f32, factor: f32) -> f32 {
        let minutes = if game_time.is_finite() { game_time.max(0.0) / 60.0 } else { 0.0 };
        1.0 + minutes.powf(exponent) * factor
    }

    /// Non-decreasing in time for every t >= 0
    pub fn is_monotonic(&self) -> bool {
        self.hp_exponent > 0.0
            && self.damage_exponent > 0.0
            && self.hp_factor >= 0.0
            && self.damage_factor >= 0.0
    }
}

/// Clustered spawning for one enemy type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwarmRule {
    pub base_size: u32,
    pub size_per_minute: u32,
    pub max_size: u32,
}

impl SwarmRule {
    pub fn group_size(&self, minutes: f32) -> u32 {
        let grown = self.base_size + self.size_per_minute * minutes.max(0.0).floor() as u32;
        grown.min(self.max_size)
    }
}

/// Per-type spawn rate as a function of elapsed minutes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnRule {
    pub kind: EnemyKind,
    /// Type is disabled until elapsed minutes exceed this
    pub unlock_minutes: f32,
    /// Spawns per second at unlock
    pub base_rate: f32,
    /// Added spawns per second for each minute after unlock
    pub rate_per_minute: f32,
    #[serde(default)]
    pub swarm: Option<SwarmRule>,
}

impl SpawnRule {
    /// Spawns per second; zero while locked
    pub fn rate(&self, minutes: f32) -> f32 {
        let unlocked = self.unlock_minutes <= 0.0 || minutes > self.unlock_minutes;
        if !unlocked {
            return 0.0;
        }
        (self.base_rate + self.rate_per_minute * (minutes - self.unlock_minutes.max(0.0))).max(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossConfig {
    /// Elapsed seconds at which this boss appears
    pub time: f32,
    pub name: String,
    pub hp: f32,
    pub damage: f32,
    pub speed: f32,
    pub radius: f32,
    pub xp_value: u32,
}

impl BossConfig {
    /// Stat block shared by every boss (chase AI, fixed contact cooldown)
    pub fn as_enemy_config(&self) -> EnemyConfig {
        EnemyConfig {
            kind: EnemyKind::Boss,
            hp: self.hp,
            damage: self.damage,
            speed: self.speed,
            radius: self.radius,
            xp_value: self.xp_value,
            contact_cooldown: 1.0,
            damage_reduction: 0.1,
            ai: AiParams::Chase,
        }
    }
}

pub fn default_enemies() -> Vec<EnemyConfig> {
    vec![
        EnemyConfig {
            kind: EnemyKind::Zombie,
            hp: 10.0,
            damage: 8.0,
            speed: 60.0,
            radius: 14.0,
            xp_value: 1,
            contact_cooldown: 1.0,
            damage_reduction: 0.0,
            ai: AiParams::Chase,
        },
        EnemyConfig {
            kind: EnemyKind::Runner,
            hp: 8.0,
            damage: 6.0,
            speed: 90.0,
            radius: 11.0,
            xp_value: 2,
            contact_cooldown: 0.8,
            damage_reduction: 0.0,
            ai: AiParams::Dash {
                speed: 350.0,
                duration: 0.4,
                cooldown: 2.5,
                range: 200.0,
            },
        },
        EnemyConfig {
            kind: EnemyKind::Tank,
            hp: 60.0,
            damage: 15.0,
            speed: 35.0,
            radius: 24.0,
            xp_value: 5,
            contact_cooldown: 1.2,
            damage_reduction: 0.2,
            ai: AiParams::Chase,
        },
        EnemyConfig {
            kind: EnemyKind::Bat,
            hp: 5.0,
            damage: 4.0,
            speed: 110.0,
            radius: 9.0,
            xp_value: 1,
            contact_cooldown: 0.6,
            damage_reduction: 0.0,
            ai: AiParams::Sine {
                frequency: 4.0,
                amplitude: 120.0,
            },
        },
        EnemyConfig {
            kind: EnemyKind::Elite,
            hp: 400.0,
            damage: 25.0,
            speed: 50.0,
            radius: 32.0,
            xp_value: 25,
            contact_cooldown: 1.0,
            damage_reduction: 0.3,
            ai: AiParams::Charge {
                speed: 400.0,
                duration: 0.6,
                cooldown: 4.0,
                range: 300.0,
                minions: Some(MinionSpawn {
                    kind: EnemyKind::Zombie,
                    count: 6,
                }),
            },
        },
    ]
}

pub fn default_spawn_rules() -> Vec<SpawnRule> {
    vec![
        SpawnRule {
            kind: EnemyKind::Zombie,
            unlock_minutes: 0.0,
            base_rate: 1.0,
            rate_per_minute: 0.3,
            swarm: None,
        },
        SpawnRule {
            kind: EnemyKind::Runner,
            unlock_minutes: 2.0,
            base_rate: 0.5,
            rate_per_minute: 0.2,
            swarm: None,
        },
        SpawnRule {
            kind: EnemyKind::Tank,
            unlock_minutes: 5.0,
            base_rate: 0.2,
            rate_per_minute: 0.1,
            swarm: None,
        },
        SpawnRule {
            kind: EnemyKind::Bat,
            unlock_minutes: 3.0,
            base_rate: 0.3,
            rate_per_minute: 0.0,
            swarm: Some(SwarmRule {
                base_size: 5,
                size_per_minute: 1,
                max_size: 15,
            }),
        },
        SpawnRule {
            kind: EnemyKind::Elite,
            unlock_minutes: 10.0,
            base_rate: 0.015,
            rate_per_minute: 0.0,
            swarm: None,
        },
    ]
}

pub fn default_bosses() -> Vec<BossConfig> {
    let boss = |time: f32, name: &str, hp: f32, damage: f32, speed: f32, radius: f32, xp: u32| {
        BossConfig {
            time,
            name: name.into(),
            hp,
            damage,
            speed,
            radius,
            xp_value: xp,
        }
    };
    vec![
        boss(180.0, "Bone Colossus", 3000.0, 30.0, 45.0, 48.0, 100),
        boss(360.0, "Plague Matriarch", 8000.0, 40.0, 55.0, 52.0, 200),
        boss(540.0, "Storm Warden", 18000.0, 55.0, 60.0, 56.0, 350),
        boss(720.0, "The Hollow King", 40000.0, 75.0, 65.0, 64.0, 600),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_scaling_is_identity_at_zero() {
        let law = ScalingLaw::default();
        assert_eq!(law.hp_multiplier(0.0), 1.0);
        assert_eq!(law.damage_multiplier(0.0), 1.0);
        assert!(law.is_monotonic());
    }

    #[test]
    fn test_spawn_rule_unlocks() {
        let runner = default_spawn_rules()[1];
        assert_eq!(runner.rate(1.0), 0.0);
        assert_eq!(runner.rate(2.0), 0.0);
        assert!((runner.rate(4.0) - 0.9).abs() < 1e-5);

        let zombie = default_spawn_rules()[0];
        assert_eq!(zombie.rate(0.0), 1.0);
    }

    #[test]
    fn test_swarm_size_is_capped() {
        let swarm = SwarmRule {
            base_size: 5,
            size_per_minute: 1,
            max_size: 15,
        };
        assert_eq!(swarm.group_size(3.5), 8);
        assert_eq!(swarm.group_size(60.0), 15);
    }

    proptest! {
        #[test]
        fn prop_scaling_non_decreasing(t in 0.0f32..7200.0, dt in 0.0f32..600.0) {
            let law = ScalingLaw::default();
            prop_assert!(law.hp_multiplier(t + dt) >= law.hp_multiplier(t));
            prop_assert!(law.damage_multiplier(t + dt) >= law.damage_multiplier(t));
        }
    }
}
