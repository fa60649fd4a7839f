//! Unlock-once milestones and their toast queue

use serde::{Deserialize, Serialize};

/// Seconds a toast stays on screen
pub const TOAST_DURATION: f32 = 3.0;

/// Run figures the milestones are checked against
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AchievementStats {
    pub kills: u32,
    /// Seconds survived
    pub time: f32,
    pub max_combo: u32,
    pub level: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Milestone {
    Kills(u32),
    SurviveSeconds(u32),
    Combo(u32),
    Level(u32),
}

impl Milestone {
    pub fn is_met(&self, stats: &AchievementStats) -> bool {
        match *self {
            Milestone::Kills(n) => stats.kills >= n,
            Milestone::SurviveSeconds(s) => stats.time >= s as f32,
            Milestone::Combo(n) => stats.max_combo >= n,
            Milestone::Level(n) => stats.level >= n,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub milestone: Milestone,
}

pub const ACHIEVEMENTS: [Achievement; 12] = [
    Achievement {
        id: "first_blood",
        name: "First Blood",
        description: "Kill your first enemy",
        icon: "🩸",
        milestone: Milestone::Kills(1),
    },
    Achievement {
        id: "kill_50",
        name: "Slayer",
        description: "Kill 50 enemies",
        icon: "⚔️",
        milestone: Milestone::Kills(50),
    },
    Achievement {
        id: "kill_100",
        name: "Centurion",
        description: "Kill 100 enemies",
        icon: "🛡️",
        milestone: Milestone::Kills(100),
    },
    Achievement {
        id: "kill_500",
        name: "Warlord",
        description: "Kill 500 enemies",
        icon: "👑",
        milestone: Milestone::Kills(500),
    },
    Achievement {
        id: "kill_1000",
        name: "Annihilator",
        description: "Kill 1000 enemies",
        icon: "💀",
        milestone: Milestone::Kills(1000),
    },
    Achievement {
        id: "survive_5",
        name: "5 Min Survivor",
        description: "Survive 5 minutes",
        icon: "⏱️",
        milestone: Milestone::SurviveSeconds(300),
    },
    Achievement {
        id: "survive_10",
        name: "10 Min Legend",
        description: "Survive 10 minutes",
        icon: "🏅",
        milestone: Milestone::SurviveSeconds(600),
    },
    Achievement {
        id: "survive_15",
        name: "15 Min Immortal",
        description: "Survive 15 minutes",
        icon: "🌟",
        milestone: Milestone::SurviveSeconds(900),
    },
    Achievement {
        id: "combo_10",
        name: "Combo Starter",
        description: "Reach 10x combo",
        icon: "🔥",
        milestone: Milestone::Combo(10),
    },
    Achievement {
        id: "combo_25",
        name: "Combo Master",
        description: "Reach 25x combo",
        icon: "💥",
        milestone: Milestone::Combo(25),
    },
    Achievement {
        id: "combo_50",
        name: "Combo God",
        description: "Reach 50x combo",
        icon: "⚡",
        milestone: Milestone::Combo(50),
    },
    Achievement {
        id: "level_10",
        name: "Leveling Up",
        description: "Reach level 10",
        icon: "📈",
        milestone: Milestone::Level(10),
    },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toast {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub timer: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Achievements {
    /// Ids unlocked so far, in unlock order
    pub unlocked: Vec<String>,
    #[serde(skip)]
    pub toasts: Vec<Toast>,
}

impl Achievements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.iter().any(|u| u == id)
    }

    /// Unlock every newly met milestone. Returns how many were unlocked.
    pub fn check(&mut self, stats: &AchievementStats) -> usize {
        let mut count = 0;
        for ach in &ACHIEVEMENTS {
            if self.is_unlocked(ach.id) || !ach.milestone.is_met(stats) {
                continue;
            }
            self.unlocked.push(ach.id.to_string());
            self.toasts.push(Toast {
                id: ach.id.to_string(),
                name: ach.name.to_string(),
                description: ach.description.to_string(),
                icon: ach.icon.to_string(),
                timer: TOAST_DURATION,
            });
            log::info!("Achievement unlocked: {}", ach.name);
            count += 1;
        }
        count
    }

    pub fn update_toasts(&mut self, dt: f32) {
        for toast in &mut self.toasts {
            toast.timer -= dt;
        }
        self.toasts.retain(|t| t.timer > 0.0);
    }
}
