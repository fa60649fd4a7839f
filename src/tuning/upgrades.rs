//! Passive upgrades (chest rewards) and the flat stat upgrade pool (level-up options)
//!
//! Both tables are plain data. The effects live in `sim::player`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassiveKind {
    Magnet,
    Shield,
    Luck,
    Cooldown,
    Regen,
    Armor,
    Speed,
    Growth,
    Duplicator,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassiveConfig {
    pub kind: PassiveKind,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub max_level: u32,
}

/// Player stat a level-up option modifies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    MaxHp,
    Damage,
    AttackSpeed,
    Speed,
    Armor,
    HpRegen,
    PickupRange,
}

impl StatKind {
    /// Multiplicative stats scale the current value; the rest add to it
    pub fn is_multiplier(&self) -> bool {
        matches!(
            self,
            StatKind::Damage | StatKind::AttackSpeed | StatKind::Speed | StatKind::PickupRange
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatUpgrade {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub stat: StatKind,
    pub value: f32,
    /// Relative chance of being offered
    pub weight: f32,
}

pub fn default_passives() -> Vec<PassiveConfig> {
    let passive = |kind, name: &str, description: &str, icon: &str, max_level| PassiveConfig {
        kind,
        name: name.into(),
        description: description.into(),
        icon: icon.into(),
        max_level,
    };
    vec![
        passive(PassiveKind::Magnet, "Magnet", "+30% pickup range", "🧲", 5),
        passive(PassiveKind::Shield, "Shield", "Blocks a hit, recharges over time", "🛡️", 5),
        passive(PassiveKind::Luck, "Clover", "Chance to double crystal XP", "🍀", 5),
        passive(PassiveKind::Cooldown, "Tome", "+8% attack speed", "📕", 5),
        passive(PassiveKind::Regen, "Heart", "+1 HP per second", "❤️", 5),
        passive(PassiveKind::Armor, "Plate", "+2 armor", "🪖", 5),
        passive(PassiveKind::Speed, "Wings", "+10% move speed", "🪽", 5),
        passive(PassiveKind::Growth, "Crown", "+10% XP gain", "👑", 5),
        passive(PassiveKind::Duplicator, "Duplicator", "+1 projectile for every weapon", "➕", 2),
    ]
}

pub fn default_stat_upgrades() -> Vec<StatUpgrade> {
    let stat = |id: &str, name: &str, description: &str, icon: &str, stat, value, weight| {
        StatUpgrade {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            icon: icon.into(),
            stat,
            value,
            weight,
        }
    };
    vec![
        stat("max_hp", "Vitality", "+20 max HP", "💗", StatKind::MaxHp, 20.0, 20.0),
        stat("damage", "Power", "+15% damage", "💪", StatKind::Damage, 1.15, 15.0),
        stat(
            "attack_speed",
            "Haste",
            "+10% attack speed",
            "⏩",
            StatKind::AttackSpeed,
            1.10,
            15.0,
        ),
        stat("speed", "Swiftness", "+10% move speed", "👟", StatKind::Speed, 1.10, 12.0),
        stat("armor", "Toughness", "+8 armor", "🛡️", StatKind::Armor, 8.0, 10.0),
        stat("hp_regen", "Renewal", "+0.5 HP per second", "💚", StatKind::HpRegen, 0.5, 8.0),
        stat(
            "pickup_range",
            "Attraction",
            "+20% pickup range",
            "🧲",
            StatKind::PickupRange,
            1.20,
            10.0,
        ),
    ]
}
