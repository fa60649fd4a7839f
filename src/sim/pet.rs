//! Companion pet that fetches XP crystals
//!
//! Two states:
//! - `Idle`: trail the player and scan for nearby crystals
//! - `Fetch`: fly to one crystal and magnetize it

use glam::Vec2;

use super::pickups::XpCrystal;
use crate::direction_to;

pub const PET_FOLLOW_DISTANCE: f32 = 60.0;
pub const PET_SPEED: f32 = 250.0;
pub const PET_FETCH_SPEED_MULT: f32 = 1.5;
pub const PET_FETCH_RADIUS: f32 = 300.0;
pub const PET_COLLECT_RADIUS: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PetState {
    Idle,
    Fetch { target: u32 },
}

#[derive(Debug, Clone)]
pub struct Pet {
    pub pos: Vec2,
    pub state: PetState,
}

impl Pet {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos: pos + Vec2::new(-PET_FOLLOW_DISTANCE, 0.0),
            state: PetState::Idle,
        }
    }

    pub fn update(&mut self, dt: f32, player_pos: Vec2, crystals: &mut [XpCrystal]) {
        match self.state {
            PetState::Idle => {
                let dist = self.pos.distance(player_pos);
                if dist > PET_FOLLOW_DISTANCE {
                    if let Some(dir) = direction_to(self.pos, player_pos) {
                        let step = (PET_SPEED * dt).min(dist - PET_FOLLOW_DISTANCE);
                        self.pos += dir * step;
                    }
                }

                let nearest = crystals
                    .iter()
                    .filter(|c| c.is_live())
                    .map(|c| (c.id, c.pos.distance(self.pos)))
                    .filter(|&(_, d)| d < PET_FETCH_RADIUS)
                    .min_by(|a, b| a.1.total_cmp(&b.1));
                if let Some((id, _)) = nearest {
                    self.state = PetState::Fetch { target: id };
                }
            }
            PetState::Fetch { target } => {
                let Some(crystal) = crystals.iter_mut().find(|c| c.id == target && c.is_live())
                else {
                    self.state = PetState::Idle;
                    return;
                };
                let dist = self.pos.distance(crystal.pos);
                if dist < PET_COLLECT_RADIUS {
                    crystal.collected = true;
                    self.state = PetState::Idle;
                    return;
                }
                if let Some(dir) = direction_to(self.pos, crystal.pos) {
                    self.pos += dir * (PET_SPEED * PET_FETCH_SPEED_MULT * dt).min(dist);
                }
            }
        }
    }
}
