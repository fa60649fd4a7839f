//! Outbound interface to the UI layer
//!
//! The engine pushes owned snapshots through `GameObserver`; observers never
//! see simulation state by reference after the call returns.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::player::WeaponBadge;
use super::state::GameState;
use crate::tuning::StatKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub hp: f32,
    pub max_hp: f32,
    pub xp: f32,
    pub xp_required: f32,
    pub level: u32,
    pub weapons: Vec<WeaponBadge>,
    pub ultimate_charge: f32,
    pub ultimate_max: f32,
    pub combo_count: u32,
    pub combo_multiplier: f32,
    pub shield: u32,
    pub dash_cooldown: f32,
}

impl PlayerStats {
    pub fn capture(state: &GameState) -> Self {
        let p = &state.player;
        Self {
            hp: p.hp,
            max_hp: p.max_hp,
            xp: p.xp,
            xp_required: p.xp_required,
            level: p.level,
            weapons: p.weapons.clone(),
            ultimate_charge: p.ultimate_charge,
            ultimate_max: p.ultimate_max,
            combo_count: state.combo.count,
            combo_multiplier: state.combo.multiplier(),
            shield: p.shield,
            dash_cooldown: p.dash_cooldown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Whole elapsed seconds
    pub time: u32,
    pub kills: u32,
    pub enemies: usize,
}

impl RunStats {
    pub fn capture(state: &GameState) -> Self {
        Self {
            time: state.time.max(0.0).floor() as u32,
            kills: state.player.kills,
            enemies: state.live_enemy_count(),
        }
    }
}

/// One of the three choices offered on level-up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpgradeOption {
    NewWeapon {
        weapon_id: String,
        name: String,
        icon: String,
        description: String,
    },
    WeaponUpgrade {
        weapon_id: String,
        name: String,
        icon: String,
        /// 1-based level the weapon will reach
        next_level: u32,
    },
    Stat {
        id: String,
        name: String,
        icon: String,
        description: String,
        stat: StatKind,
        value: f32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionInfo {
    pub weapon_id: String,
    pub name: String,
    pub icon: String,
    pub description: String,
}

/// Final summary reported once when the run ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub time: f32,
    pub kills: u32,
    pub level: u32,
    pub max_combo: u32,
    /// Gold earned this run (kills and chests, scaled by greed)
    pub gold: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyMarker {
    pub pos: Vec2,
    pub boss: bool,
}

/// Positions for minimap-style consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub player: Vec2,
    pub enemies: Vec<EnemyMarker>,
    pub chests: Vec<Vec2>,
    pub world_size: Vec2,
    pub camera: Vec2,
    pub viewport: Vec2,
}

impl WorldSnapshot {
    pub fn capture(state: &GameState) -> Self {
        Self {
            player: state.player.pos,
            enemies: state
                .enemies
                .iter()
                .filter(|e| !e.dead)
                .map(|e| EnemyMarker {
                    pos: e.pos,
                    boss: e.is_boss(),
                })
                .collect(),
            chests: state.chests.iter().filter(|c| !c.collected).map(|c| c.pos).collect(),
            world_size: state.world_size,
            camera: state.camera.pos,
            viewport: state.viewport.size(),
        }
    }
}

/// Callbacks invoked by the engine. All methods default to no-ops.
pub trait GameObserver {
    fn on_player_stats(&mut self, _stats: &PlayerStats) {}
    fn on_run_stats(&mut self, _stats: &RunStats) {}
    /// The engine is paused until an option is applied and `resume` is called
    fn on_level_up(&mut self, _options: &[UpgradeOption]) {}
    /// The engine is paused until `resume` is called
    fn on_evolution(&mut self, _info: &EvolutionInfo) {}
    fn on_game_over(&mut self, _summary: &RunSummary) {}
}

/// Observer that ignores everything
#[derive(Debug, Default)]
pub struct NullObserver;

impl GameObserver for NullObserver {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::PermanentLevels;
    use crate::sim::player::Player;
    use crate::sim::state::Difficulty;
    use crate::tuning::{CharacterConfig, ScalingLaw};

    #[test]
    fn test_player_stats_compare_weapon_badges() {
        let player = Player::new(
            &CharacterConfig::fallback(),
            &PermanentLevels::default(),
            Vec2::splat(4000.0),
        );
        let mut state = GameState::new(3, Difficulty::Normal, player, ScalingLaw::default());
        state.player.weapons = vec![WeaponBadge {
            id: "magic_bolt".into(),
            name: "Magic Bolt".into(),
            icon: "*".into(),
            level: 1,
            evolved: false,
        }];
        let before = PlayerStats::capture(&state);
        assert_eq!(before, PlayerStats::capture(&state));

        state.player.weapons[0].level = 2;
        let after = PlayerStats::capture(&state);
        assert_ne!(before, after);
        assert_eq!(after.weapons[0].level, 2);
    }
}
