//! Cosmetic particles (not gameplay-affecting)

use glam::Vec2;
use rand::Rng;

use crate::consts::MAX_PARTICLES;
use crate::{from_angle, random_range};

/// Palette slot the renderer maps to a color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Hit,
    Death,
    Xp,
    Explosion,
    Frost,
    Holy,
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: ParticleKind,
    /// 0-1, decreases over time
    pub life: f32,
    pub decay: f32,
    pub size: f32,
}

#[derive(Debug, Clone, Default)]
pub struct Particles {
    pub list: Vec<Particle>,
}

impl Particles {
    /// Emit a radial burst; silently drops particles past the cap
    pub fn burst<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        pos: Vec2,
        kind: ParticleKind,
        count: usize,
        speed: f32,
    ) {
        let room = MAX_PARTICLES.saturating_sub(self.list.len());
        for _ in 0..count.min(room) {
            let angle = random_range(rng, 0.0, std::f32::consts::TAU);
            let s = random_range(rng, speed * 0.3, speed);
            self.list.push(Particle {
                pos,
                vel: from_angle(angle) * s,
                kind,
                life: 1.0,
                decay: random_range(rng, 1.5, 3.0),
                size: random_range(rng, 2.0, 5.0),
            });
        }
    }

    pub fn update(&mut self, dt: f32) {
        for p in &mut self.list {
            p.pos += p.vel * dt;
            p.vel *= 1.0 - (3.0 * dt).min(1.0);
            p.life -= p.decay * dt;
        }
        self.list.retain(|p| p.life > 0.0);
    }

    pub fn clear(&mut self) {
        self.list.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_capped_and_fade() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut particles = Particles::default();
        for _ in 0..100 {
            particles.burst(&mut rng, Vec2::ZERO, ParticleKind::Hit, 10, 100.0);
        }
        assert_eq!(particles.list.len(), MAX_PARTICLES);
        particles.update(1.0);
        assert!(particles.list.is_empty());
    }
}
