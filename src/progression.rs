//! Meta-progression: gold balance and permanent shop upgrades
//!
//! Owned by the menu layer and persisted by the host. The engine only reads
//! `PermanentLevels` at run start and reports earned gold in the run summary.

use serde::{Deserialize, Serialize};

use crate::sim::RunSummary;

/// Purchased levels of each permanent upgrade
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermanentLevels {
    /// +5% damage per level
    pub might: u32,
    /// +1 armor per level
    pub armor: u32,
    /// +0.1 HP/s per level
    pub recovery: u32,
    /// +10% gold per level
    pub greed: u32,
    /// +5% move speed per level
    pub speed: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermanentUpgrade {
    Might,
    Armor,
    Recovery,
    Greed,
    Speed,
}

impl PermanentUpgrade {
    pub const ALL: [PermanentUpgrade; 5] = [
        PermanentUpgrade::Might,
        PermanentUpgrade::Armor,
        PermanentUpgrade::Recovery,
        PermanentUpgrade::Greed,
        PermanentUpgrade::Speed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PermanentUpgrade::Might => "might",
            PermanentUpgrade::Armor => "armor",
            PermanentUpgrade::Recovery => "recovery",
            PermanentUpgrade::Greed => "greed",
            PermanentUpgrade::Speed => "speed",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|u| u.as_str() == id)
    }

    pub fn name(&self) -> &'static str {
        match self {
            PermanentUpgrade::Might => "Might",
            PermanentUpgrade::Armor => "Armor",
            PermanentUpgrade::Recovery => "Recovery",
            PermanentUpgrade::Greed => "Greed",
            PermanentUpgrade::Speed => "Haste",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PermanentUpgrade::Might => "+5% Damage",
            PermanentUpgrade::Armor => "+1 Armor",
            PermanentUpgrade::Recovery => "+0.1 HP/s",
            PermanentUpgrade::Greed => "+10% Gold",
            PermanentUpgrade::Speed => "+5% Move Speed",
        }
    }

    pub fn base_cost(&self) -> u32 {
        match self {
            PermanentUpgrade::Might => 100,
            PermanentUpgrade::Armor => 150,
            PermanentUpgrade::Recovery => 200,
            PermanentUpgrade::Greed => 250,
            PermanentUpgrade::Speed => 120,
        }
    }

    pub fn max_level(&self) -> u32 {
        match self {
            PermanentUpgrade::Might | PermanentUpgrade::Recovery | PermanentUpgrade::Greed => 10,
            PermanentUpgrade::Armor | PermanentUpgrade::Speed => 5,
        }
    }

    /// Price of the next level: `floor(base * 1.5^level)`
    pub fn cost_at(&self, level: u32) -> u32 {
        (self.base_cost() as f64 * 1.5f64.powi(level as i32)).floor() as u32
    }
}

impl PermanentLevels {
    pub fn get(&self, upgrade: PermanentUpgrade) -> u32 {
        match upgrade {
            PermanentUpgrade::Might => self.might,
            PermanentUpgrade::Armor => self.armor,
            PermanentUpgrade::Recovery => self.recovery,
            PermanentUpgrade::Greed => self.greed,
            PermanentUpgrade::Speed => self.speed,
        }
    }

    fn get_mut(&mut self, upgrade: PermanentUpgrade) -> &mut u32 {
        match upgrade {
            PermanentUpgrade::Might => &mut self.might,
            PermanentUpgrade::Armor => &mut self.armor,
            PermanentUpgrade::Recovery => &mut self.recovery,
            PermanentUpgrade::Greed => &mut self.greed,
            PermanentUpgrade::Speed => &mut self.speed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PurchaseError {
    #[error("unknown upgrade '{0}'")]
    UnknownUpgrade(String),

    #[error("{0} is already at max level")]
    MaxLevel(&'static str),

    #[error("need {cost} gold, have {gold}")]
    InsufficientGold { cost: u32, gold: u32 },
}

/// Gold balance plus permanent levels, as saved between runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progression {
    pub gold: u32,
    #[serde(rename = "upgrades")]
    pub levels: PermanentLevels,
}

impl Progression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cost of the next level, or `None` when maxed
    pub fn next_cost(&self, upgrade: PermanentUpgrade) -> Option<u32> {
        let level = self.levels.get(upgrade);
        (level < upgrade.max_level()).then(|| upgrade.cost_at(level))
    }

    /// Buy one level. Returns the new level.
    pub fn purchase(&mut self, upgrade: PermanentUpgrade) -> Result<u32, PurchaseError> {
        let cost = self
            .next_cost(upgrade)
            .ok_or(PurchaseError::MaxLevel(upgrade.name()))?;
        if self.gold < cost {
            return Err(PurchaseError::InsufficientGold {
                cost,
                gold: self.gold,
            });
        }
        self.gold -= cost;
        let level = self.levels.get_mut(upgrade);
        *level += 1;
        log::debug!("Purchased {} level {} for {cost} gold", upgrade.as_str(), *level);
        Ok(*level)
    }

    pub fn purchase_by_id(&mut self, id: &str) -> Result<u32, PurchaseError> {
        let upgrade =
            PermanentUpgrade::from_id(id).ok_or_else(|| PurchaseError::UnknownUpgrade(id.into()))?;
        self.purchase(upgrade)
    }

    pub fn add_gold(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }

    /// Bank the gold from a finished run
    pub fn award_run(&mut self, summary: &RunSummary) {
        self.add_gold(summary.gold);
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_curve() {
        assert_eq!(PermanentUpgrade::Might.cost_at(0), 100);
        assert_eq!(PermanentUpgrade::Might.cost_at(1), 150);
        assert_eq!(PermanentUpgrade::Might.cost_at(2), 225);
        assert_eq!(PermanentUpgrade::Speed.cost_at(3), 405);
    }

    #[test]
    fn test_purchase_flow() {
        let mut p = Progression {
            gold: 260,
            ..Default::default()
        };
        assert_eq!(p.purchase(PermanentUpgrade::Might), Ok(1));
        assert_eq!(p.gold, 160);
        assert_eq!(p.purchase(PermanentUpgrade::Might), Ok(2));
        assert_eq!(p.levels.might, 2);
        assert_eq!(p.gold, 10);
        assert!(matches!(
            p.purchase(PermanentUpgrade::Greed),
            Err(PurchaseError::InsufficientGold { cost: 250, gold: 10 })
        ));
    }

    #[test]
    fn test_max_level_and_unknown() {
        let mut p = Progression {
            gold: u32::MAX,
            ..Default::default()
        };
        for _ in 0..5 {
            p.purchase(PermanentUpgrade::Armor).unwrap();
        }
        assert_eq!(p.next_cost(PermanentUpgrade::Armor), None);
        assert!(matches!(p.purchase(PermanentUpgrade::Armor), Err(PurchaseError::MaxLevel(_))));
        assert!(matches!(p.purchase_by_id("luck"), Err(PurchaseError::UnknownUpgrade(_))));
        assert_eq!(p.purchase_by_id("speed"), Ok(1));
    }

    #[test]
    fn test_json_uses_upgrades_key() {
        let p = Progression::from_json(r#"{"gold":42,"upgrades":{"might":3}}"#).unwrap();
        assert_eq!(p.gold, 42);
        assert_eq!(p.levels.might, 3);
        assert_eq!(p.levels.armor, 0);
        assert!(p.to_json().unwrap().contains("\"upgrades\""));
    }
}
