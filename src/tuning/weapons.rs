//! Weapon level tables
//!
//! Each weapon is an ordered list of levels. A level carries the damage and
//! cooldown every weapon has plus a behaviour block whose variant fixes the
//! firing pattern.

use serde::{Deserialize, Serialize};

/// Firing pattern of a weapon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponKind {
    Projectile,
    Chain,
    Boomerang,
    Radial,
    Beam,
    Orbit,
}

/// Behaviour-specific parameters for one level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WeaponParams {
    Projectile {
        speed: f32,
        range: f32,
        count: u32,
        #[serde(default)]
        aoe_radius: f32,
        #[serde(default = "default_aoe_mult")]
        aoe_damage_mult: f32,
    },
    Chain {
        chain_count: u32,
        chain_range: f32,
        #[serde(default = "default_chain_decay")]
        decay: f32,
    },
    Boomerang {
        speed: f32,
        count: u32,
        max_distance: f32,
        piercing: bool,
        homing: bool,
    },
    Radial {
        speed: f32,
        range: f32,
        shard_count: u32,
        slow: f32,
        #[serde(default)]
        freeze_ms: f32,
    },
    Beam {
        width: f32,
        duration_ms: f32,
        max_hits: u32,
        #[serde(default)]
        burn_damage: f32,
        #[serde(default)]
        burn_ms: f32,
    },
    Orbit {
        orb_count: u32,
        radius: f32,
        rotation_speed: f32,
    },
}

fn default_aoe_mult() -> f32 {
    0.5
}

fn default_chain_decay() -> f32 {
    0.75
}

impl WeaponParams {
    pub fn kind(&self) -> WeaponKind {
        match self {
            WeaponParams::Projectile { .. } => WeaponKind::Projectile,
            WeaponParams::Chain { .. } => WeaponKind::Chain,
            WeaponParams::Boomerang { .. } => WeaponKind::Boomerang,
            WeaponParams::Radial { .. } => WeaponKind::Radial,
            WeaponParams::Beam { .. } => WeaponKind::Beam,
            WeaponParams::Orbit { .. } => WeaponKind::Orbit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponLevel {
    pub damage: f32,
    /// Milliseconds between activations (ignored by orbit)
    pub cooldown_ms: f32,
    #[serde(flatten)]
    pub params: WeaponParams,
}

/// Display identity a weapon takes on after evolving
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evolution {
    pub name: String,
    pub icon: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponConfig {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub description: String,
    pub levels: Vec<WeaponLevel>,
    pub evolution: Evolution,
}

impl WeaponConfig {
    /// Behaviour kind, taken from the first level
    pub fn kind(&self) -> Option<WeaponKind> {
        self.levels.first().map(|l| l.params.kind())
    }

    /// Highest 0-based level index
    pub fn max_level(&self) -> usize {
        self.levels.len().saturating_sub(1)
    }

    /// Level table entry, clamped to the last level
    pub fn level(&self, level: usize) -> Option<&WeaponLevel> {
        self.levels.get(level.min(self.max_level()))
    }
}

fn levels(
    damage: [f32; 5],
    cooldown_ms: [f32; 5],
    params: impl Fn(usize) -> WeaponParams,
) -> Vec<WeaponLevel> {
    (0..5)
        .map(|i| WeaponLevel {
            damage: damage[i],
            cooldown_ms: cooldown_ms[i],
            params: params(i),
        })
        .collect()
}

fn evolution(name: &str, icon: &str, description: &str) -> Evolution {
    Evolution {
        name: name.into(),
        icon: icon.into(),
        description: description.into(),
    }
}

pub fn default_weapons() -> Vec<WeaponConfig> {
    vec![
        WeaponConfig {
            id: "fireball".into(),
            name: "Fireball".into(),
            icon: "🔥".into(),
            description: "Shoots at the nearest enemy".into(),
            levels: levels(
                [12.0, 16.0, 20.0, 26.0, 34.0],
                [1200.0, 1100.0, 1000.0, 900.0, 800.0],
                |i| WeaponParams::Projectile {
                    speed: 400.0,
                    range: 600.0,
                    count: [1, 1, 2, 2, 3][i],
                    aoe_radius: [0.0, 0.0, 0.0, 40.0, 60.0][i],
                    aoe_damage_mult: 0.5,
                },
            ),
            evolution: evolution(
                "Inferno",
                "☄️",
                "Explosive fireballs rain in every direction",
            ),
        },
        WeaponConfig {
            id: "lightning".into(),
            name: "Chain Lightning".into(),
            icon: "⚡".into(),
            description: "Bounces between nearby enemies".into(),
            levels: levels(
                [15.0, 20.0, 26.0, 32.0, 40.0],
                [1500.0, 1400.0, 1300.0, 1200.0, 1000.0],
                |i| WeaponParams::Chain {
                    chain_count: [3, 4, 5, 6, 8][i],
                    chain_range: 200.0,
                    decay: 0.75,
                },
            ),
            evolution: evolution(
                "Thunder God",
                "🌩️",
                "Lightning arcs through the entire horde",
            ),
        },
        WeaponConfig {
            id: "spectral_blade".into(),
            name: "Spectral Blade".into(),
            icon: "🗡️".into(),
            description: "Flies out and returns".into(),
            levels: levels(
                [10.0, 14.0, 18.0, 24.0, 30.0],
                [1800.0, 1700.0, 1600.0, 1500.0, 1300.0],
                |i| WeaponParams::Boomerang {
                    speed: 300.0,
                    count: [1, 1, 2, 2, 3][i],
                    max_distance: [250.0, 270.0, 290.0, 310.0, 350.0][i],
                    piercing: i >= 2,
                    homing: i >= 3,
                },
            ),
            evolution: evolution("Twin Cyclone", "🌀", "Twice the blades, twice the reach"),
        },
        WeaponConfig {
            id: "frost_shards".into(),
            name: "Frost Shards".into(),
            icon: "❄️".into(),
            description: "Ice in all directions, slows enemies".into(),
            levels: levels(
                [8.0, 10.0, 12.0, 15.0, 18.0],
                [2000.0, 1900.0, 1800.0, 1600.0, 1400.0],
                |i| WeaponParams::Radial {
                    speed: 280.0,
                    range: 350.0,
                    shard_count: [6, 8, 8, 10, 12][i],
                    slow: [0.3, 0.3, 0.4, 0.4, 0.5][i],
                    freeze_ms: [0.0, 0.0, 0.0, 500.0, 1000.0][i],
                },
            ),
            evolution: evolution("Blizzard", "🌨️", "A spinning storm that freezes solid"),
        },
        WeaponConfig {
            id: "holy_beam".into(),
            name: "Holy Beam".into(),
            icon: "✨".into(),
            description: "A pillar of light scorches a column".into(),
            levels: levels(
                [20.0, 26.0, 32.0, 40.0, 50.0],
                [3000.0, 2800.0, 2600.0, 2400.0, 2000.0],
                |i| WeaponParams::Beam {
                    width: [40.0, 45.0, 50.0, 60.0, 70.0][i],
                    duration_ms: [1000.0, 1100.0, 1200.0, 1300.0, 1500.0][i],
                    max_hits: [5, 7, 9, 12, 15][i],
                    burn_damage: [0.0, 0.0, 2.0, 3.0, 4.0][i],
                    burn_ms: [0.0, 0.0, 2000.0, 2000.0, 3000.0][i],
                },
            ),
            evolution: evolution(
                "Divine Judgment",
                "☀️",
                "A vast beam that sets the damned ablaze",
            ),
        },
        WeaponConfig {
            id: "arcane_orbit".into(),
            name: "Arcane Orbit".into(),
            icon: "🔮".into(),
            description: "Orbs circle around you".into(),
            levels: levels(
                [6.0, 8.0, 10.0, 13.0, 16.0],
                [0.0; 5],
                |i| WeaponParams::Orbit {
                    orb_count: [2, 2, 3, 4, 5][i],
                    radius: [70.0, 75.0, 80.0, 90.0, 100.0][i],
                    rotation_speed: [2.0, 2.2, 2.4, 2.7, 3.0][i],
                },
            ),
            evolution: evolution("Void Vortex", "🌑", "A whirling vortex that drags enemies in"),
        },
    ]
}
