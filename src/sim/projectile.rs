//! Projectiles fired by weapons

use glam::Vec2;

use crate::direction_to;
use crate::tuning::WeaponKind;

/// Distance at which a returning boomerang is caught by its owner
pub const BOOMERANG_CATCH_RADIUS: f32 = 20.0;
/// Return leg speed relative to the outbound speed
pub const BOOMERANG_RETURN_SPEED: f32 = 1.2;
/// Radians per second a homing blade may turn
pub const HOMING_TURN_RATE: f32 = 4.0;
/// Seconds a projectile slow lasts
pub const PROJECTILE_SLOW_DURATION: f32 = 2.0;

/// Status effects carried by a projectile and applied on hit
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatusPayload {
    pub slow: f32,
    /// Seconds
    pub freeze: f32,
    pub burn_damage: f32,
    /// Seconds
    pub burn_duration: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    Linear,
    Boomerang {
        origin: Vec2,
        max_distance: f32,
        returning: bool,
        homing: bool,
    },
}

#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: u32,
    /// Weapon category, for hit effects
    pub source: WeaponKind,
    pub pos: Vec2,
    /// Unit direction
    pub dir: Vec2,
    pub speed: f32,
    /// Base damage; the player's multiplier applies at hit time
    pub damage: f32,
    pub lifetime: f32,
    pub radius: f32,
    pub piercing: bool,
    pub aoe_radius: f32,
    pub aoe_damage_mult: f32,
    pub status: StatusPayload,
    pub motion: Motion,
    /// Enemy ids already struck
    pub hit: Vec<u32>,
    pub consumed: bool,
}

impl Projectile {
    /// A single-hit linear shot. The id is assigned when it is spawned.
    pub fn new(source: WeaponKind, pos: Vec2, dir: Vec2, speed: f32, damage: f32) -> Self {
        Self {
            id: 0,
            source,
            pos,
            dir,
            speed,
            damage,
            lifetime: 2.0,
            radius: 8.0,
            piercing: false,
            aoe_radius: 0.0,
            aoe_damage_mult: 0.5,
            status: StatusPayload::default(),
            motion: Motion::Linear,
            hit: Vec::new(),
            consumed: false,
        }
    }

    pub fn with_lifetime(mut self, lifetime: f32) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_piercing(mut self, piercing: bool) -> Self {
        self.piercing = piercing;
        self
    }

    /// Splash of `radius` dealing `damage_mult` of the hit damage
    pub fn with_aoe(mut self, radius: f32, damage_mult: f32) -> Self {
        self.aoe_radius = radius;
        self.aoe_damage_mult = damage_mult;
        self
    }

    pub fn with_status(mut self, status: StatusPayload) -> Self {
        self.status = status;
        self
    }

    /// Outbound boomerang leg starting at `origin`
    pub fn boomerang(mut self, origin: Vec2, max_distance: f32, homing: bool) -> Self {
        self.motion = Motion::Boomerang {
            origin,
            max_distance,
            returning: false,
            homing,
        };
        self
    }

    pub fn is_boomerang(&self) -> bool {
        matches!(self.motion, Motion::Boomerang { .. })
    }

    /// Move one step.
    ///
    /// `owner` is the player position (boomerang return target); `seek` is the
    /// nearest enemy for homing blades on their outbound leg.
    pub fn update(&mut self, dt: f32, owner: Vec2, seek: Option<Vec2>) {
        if self.consumed {
            return;
        }
        match &mut self.motion {
            Motion::Linear => {
                self.pos += self.dir * self.speed * dt;
            }
            Motion::Boomerang {
                origin,
                max_distance,
                returning,
                homing,
            } => {
                if !*returning {
                    if *homing {
                        if let Some(desired) = seek.and_then(|t| direction_to(self.pos, t)) {
                            let max_turn = HOMING_TURN_RATE * dt;
                            let turn = self.dir.angle_to(desired).clamp(-max_turn, max_turn);
                            self.dir = Vec2::from_angle(turn).rotate(self.dir);
                        }
                    }
                    self.pos += self.dir * self.speed * dt;
                    // The hit set survives the turn: nothing is struck twice
                    if self.pos.distance(*origin) >= *max_distance {
                        *returning = true;
                    }
                } else {
                    match direction_to(self.pos, owner) {
                        Some(dir) if self.pos.distance(owner) >= BOOMERANG_CATCH_RADIUS => {
                            self.dir = dir;
                            self.pos += dir * self.speed * BOOMERANG_RETURN_SPEED * dt;
                        }
                        _ => {
                            self.consumed = true;
                            return;
                        }
                    }
                }
            }
        }

        self.lifetime -= dt;
        if self.lifetime <= 0.0 {
            self.consumed = true;
        }
    }

    /// Register a hit on `enemy_id`. Returns false if it was already struck.
    ///
    /// Plain projectiles are consumed by their first hit. A non-piercing
    /// boomerang turns back instead.
    pub fn on_hit(&mut self, enemy_id: u32) -> bool {
        if self.consumed || self.hit.contains(&enemy_id) {
            return false;
        }
        self.hit.push(enemy_id);
        match &mut self.motion {
            Motion::Linear if !self.piercing => self.consumed = true,
            Motion::Boomerang { returning, .. } if !self.piercing && !*returning => {
                *returning = true;
            }
            _ => {}
        }
        true
    }

    /// True when it should be dropped: spent or left the world
    pub fn is_expired(&self, world_size: Vec2) -> bool {
        let margin = Vec2::splat(self.radius * 4.0);
        self.consumed
            || self.pos.cmplt(-margin).any()
            || self.pos.cmpgt(world_size + margin).any()
            || !self.pos.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bolt() -> Projectile {
        Projectile::new(WeaponKind::Projectile, Vec2::new(100.0, 100.0), Vec2::X, 400.0, 15.0)
            .with_lifetime(1.5)
    }

    fn blade(pos: Vec2, origin: Vec2, max_distance: f32) -> Projectile {
        Projectile::new(WeaponKind::Boomerang, pos, Vec2::X, 300.0, 10.0)
            .with_lifetime(5.0)
            .with_radius(10.0)
            .boomerang(origin, max_distance, false)
    }

    #[test]
    fn test_builder_defaults() {
        let p = bolt();
        assert_eq!(p.id, 0);
        assert_eq!(p.radius, 8.0);
        assert_eq!(p.lifetime, 1.5);
        assert!(!p.piercing && !p.is_boomerang());

        let splash = bolt().with_aoe(80.0, 0.25).with_piercing(true);
        assert_eq!((splash.aoe_radius, splash.aoe_damage_mult), (80.0, 0.25));
        assert!(splash.piercing);
    }

    #[test]
    fn test_single_hit_consumes() {
        let mut p = bolt();
        assert!(p.on_hit(7));
        assert!(p.consumed);
        assert!(!p.on_hit(8));
        assert_eq!(p.hit, vec![7]);
    }

    #[test]
    fn test_piercing_never_double_hits() {
        let mut p = bolt().with_piercing(true);
        assert!(p.on_hit(7));
        assert!(p.on_hit(8));
        assert!(!p.on_hit(7));
        assert!(!p.consumed);
    }

    #[test]
    fn test_lifetime_and_bounds() {
        let mut p = bolt();
        p.update(1.0, Vec2::ZERO, None);
        assert!(!p.consumed);
        p.update(0.6, Vec2::ZERO, None);
        assert!(p.consumed);

        let mut out = bolt();
        out.pos = Vec2::new(-100.0, 50.0);
        assert!(out.is_expired(Vec2::splat(4000.0)));
    }

    #[test]
    fn test_boomerang_return_leg_skips_struck_enemies() {
        let owner = Vec2::new(100.0, 100.0);
        let mut p = blade(owner, owner, 60.0).with_piercing(true);
        assert!(p.on_hit(3));
        p.update(0.25, owner, None);
        assert!(matches!(p.motion, Motion::Boomerang { returning: true, .. }));

        // Passing back over the same enemy does nothing; a new one still counts
        assert!(!p.on_hit(3));
        assert!(p.on_hit(4));
        assert_eq!(p.hit, vec![3, 4]);

        for _ in 0..60 {
            p.update(1.0 / 60.0, owner, None);
        }
        assert!(p.consumed);
    }

    #[test]
    fn test_non_piercing_boomerang_turns_on_hit() {
        let mut p = blade(Vec2::new(50.0, 0.0), Vec2::ZERO, 300.0);
        assert!(p.on_hit(4));
        assert!(!p.consumed);
        assert!(matches!(p.motion, Motion::Boomerang { returning: true, .. }));
        assert!(!p.on_hit(4));
    }

    #[test]
    fn test_homing_turns_toward_target() {
        let mut p = Projectile::new(WeaponKind::Boomerang, Vec2::ZERO, Vec2::X, 300.0, 10.0)
            .boomerang(Vec2::ZERO, 1000.0, true);
        p.update(0.1, Vec2::ZERO, Some(Vec2::new(0.0, 500.0)));
        assert!(p.dir.y > 0.0);
        assert!((p.dir.length() - 1.0).abs() < 1e-4);
    }
}
