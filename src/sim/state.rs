//! World state and per-run bookkeeping
//!
//! `GameState` owns every entity collection of a run. Subsystems receive a
//! `&mut GameState` and mutate it in the engine's fixed order.

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::combo::Combo;
use super::enemy::Enemy;
use super::particles::Particles;
use super::pet::Pet;
use super::pickups::{TreasureChest, XpCrystal};
use super::player::Player;
use super::projectile::Projectile;
use crate::consts::*;
use crate::tuning::{EnemyConfig, EnemyKind, ScalingLaw, WeaponKind};

/// Difficulty mode chosen at run start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    #[default]
    Normal,
    Hard,
    Endless,
}

impl Difficulty {
    /// Elapsed minutes fed to the spawn-rate formulas
    pub fn rate_minutes(&self, game_time: f32) -> f32 {
        let minutes = game_time.max(0.0) / 60.0;
        match self {
            Difficulty::Endless => minutes,
            Difficulty::Normal | Difficulty::Hard => minutes.min(RATE_GROWTH_CAP_MINUTES),
        }
    }
}

/// Minutes after which spawn rates stop growing outside endless mode
pub const RATE_GROWTH_CAP_MINUTES: f32 = 20.0;

/// Host-reported drawable size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIEW_WIDTH,
            height: DEFAULT_VIEW_HEIGHT,
        }
    }
}

impl Viewport {
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Top-left corner of the visible world rectangle
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub pos: Vec2,
}

impl Camera {
    pub fn follow(&mut self, target: Vec2, viewport: &Viewport) {
        self.pos = target - viewport.size() / 2.0;
    }

    /// Inside the view rectangle grown by `buffer`
    pub fn is_visible(&self, pos: Vec2, viewport: &Viewport, buffer: f32) -> bool {
        let rel = pos - self.pos;
        rel.x >= -buffer
            && rel.y >= -buffer
            && rel.x <= viewport.width + buffer
            && rel.y <= viewport.height + buffer
    }
}

/// Floating combat text
#[derive(Debug, Clone)]
pub struct DamageNumber {
    pub pos: Vec2,
    pub vel_y: f32,
    pub amount: f32,
    /// 1 at spawn, fades to 0
    pub life: f32,
    pub crit: bool,
}

/// Damage above this shows as a crit
pub const CRIT_THRESHOLD: f32 = 50.0;

impl DamageNumber {
    pub fn update(&mut self, dt: f32) {
        self.pos.y += self.vel_y * dt;
        self.vel_y += 20.0 * dt;
        self.life -= dt * 1.2;
    }
}

#[derive(Debug, Clone)]
pub struct BossWarning {
    pub name: String,
    pub timer: f32,
}

#[derive(Debug, Clone)]
pub struct ComboMessage {
    pub text: &'static str,
    pub timer: f32,
}

/// Transient visual state the renderer reads
#[derive(Debug, Clone, Default)]
pub struct VisualTimers {
    pub shake_intensity: f32,
    pub shake_timer: f32,
    pub boss_warning: Option<BossWarning>,
    pub ultimate_flash: f32,
    pub combo_message: Option<ComboMessage>,
}

impl VisualTimers {
    /// Start a shake unless a stronger one is already running
    pub fn shake(&mut self, intensity: f32, duration: f32) {
        if intensity >= self.shake_intensity || self.shake_timer <= 0.0 {
            self.shake_intensity = intensity;
            self.shake_timer = duration;
        }
    }

    pub fn update(&mut self, dt: f32) {
        if self.shake_timer > 0.0 {
            self.shake_timer -= dt;
            if self.shake_timer <= 0.0 {
                self.shake_timer = 0.0;
                self.shake_intensity = 0.0;
            }
        }
        if let Some(warning) = &mut self.boss_warning {
            warning.timer -= dt;
            if warning.timer <= 0.0 {
                self.boss_warning = None;
            }
        }
        if self.ultimate_flash > 0.0 {
            self.ultimate_flash = (self.ultimate_flash - dt).max(0.0);
        }
        if let Some(msg) = &mut self.combo_message {
            msg.timer -= dt;
            if msg.timer <= 0.0 {
                self.combo_message = None;
            }
        }
    }
}

/// Outcome of opening a chest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChestReward {
    Evolution { weapon_id: String },
    Passive { name: String, level: u32 },
    Gold { amount: u32 },
}

/// What dealt a hit, for hit sounds and effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageSource {
    Weapon(WeaponKind),
    Ultimate,
}

impl From<WeaponKind> for DamageSource {
    fn from(kind: WeaponKind) -> Self {
        DamageSource::Weapon(kind)
    }
}

/// Gameplay events for audio/visual collaborators, drained by the host
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    EnemyKilled { kind: EnemyKind, pos: Vec2 },
    BossDefeated { name: String },
    PlayerHit { damage: f32 },
    ShieldBlocked,
    EnemyHit { source: DamageSource, pos: Vec2 },
    BossSpawned { name: String },
    ChestSpawned { pos: Vec2 },
    ChestOpened { reward: ChestReward },
    XpCollected { amount: f32 },
    LevelUp { level: u32 },
    WeaponEvolved { weapon_id: String },
    UltimateActivated,
    Dash,
    GameOver,
}

/// Cap on queued events; older ones are dropped when the host never drains
pub const MAX_PENDING_EVENTS: usize = 1024;

/// All mutable state of one run
#[derive(Debug, Clone)]
pub struct GameState {
    pub seed: u64,
    pub rng: Pcg32,
    pub difficulty: Difficulty,
    /// Elapsed simulated seconds
    pub time: f32,
    pub world_size: Vec2,
    pub viewport: Viewport,
    pub camera: Camera,
    pub scaling: ScalingLaw,
    pub player: Player,
    pub pet: Pet,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub crystals: Vec<XpCrystal>,
    pub chests: Vec<TreasureChest>,
    pub particles: Particles,
    pub damage_numbers: Vec<DamageNumber>,
    pub combo: Combo,
    pub visuals: VisualTimers,
    pub events: VecDeque<GameEvent>,
    pub show_damage_numbers: bool,
    /// Gold granted by chests this run
    pub gold: u32,
    next_id: u32,
}

impl GameState {
    pub fn new(seed: u64, difficulty: Difficulty, player: Player, scaling: ScalingLaw) -> Self {
        let world_size = Vec2::new(WORLD_WIDTH, WORLD_HEIGHT);
        let viewport = Viewport::default();
        let mut camera = Camera::default();
        camera.follow(player.pos, &viewport);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            difficulty,
            time: 0.0,
            world_size,
            viewport,
            camera,
            scaling,
            pet: Pet::new(player.pos),
            player,
            enemies: Vec::with_capacity(MAX_ENEMIES),
            projectiles: Vec::with_capacity(256),
            crystals: Vec::with_capacity(256),
            chests: Vec::new(),
            particles: Particles::default(),
            damage_numbers: Vec::new(),
            combo: Combo::default(),
            visuals: VisualTimers::default(),
            events: VecDeque::new(),
            show_damage_numbers: true,
            gold: 0,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn push_event(&mut self, event: GameEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    /// Create an enemy scaled to the current time
    pub fn spawn_enemy(&mut self, config: &EnemyConfig, pos: Vec2) -> u32 {
        self.spawn_enemy_at_time(config, pos, self.time)
    }

    /// Create an enemy scaled as if `game_time` had elapsed (bosses use 0)
    pub fn spawn_enemy_at_time(&mut self, config: &EnemyConfig, pos: Vec2, game_time: f32) -> u32 {
        let id = self.next_entity_id();
        let margin = Vec2::splat(config.radius);
        let pos = pos.clamp(margin, self.world_size - margin);
        let enemy = Enemy::new(id, config, pos, game_time, &self.scaling, &mut self.rng);
        self.enemies.push(enemy);
        id
    }

    pub fn spawn_crystal(&mut self, pos: Vec2, value: f32) {
        let id = self.next_entity_id();
        self.crystals.push(XpCrystal::new(id, pos, value));
    }

    pub fn spawn_projectile(&mut self, mut projectile: Projectile) {
        projectile.id = self.next_entity_id();
        self.projectiles.push(projectile);
    }

    /// Queue a floating number when the setting allows it
    pub fn push_damage_number(&mut self, pos: Vec2, amount: f32) {
        if !self.show_damage_numbers || !(amount > 0.0) {
            return;
        }
        let vel_y = -60.0 - self.rng.random::<f32>() * 40.0;
        self.damage_numbers.push(DamageNumber {
            pos,
            vel_y,
            amount,
            life: 1.0,
            crit: amount > CRIT_THRESHOLD,
        });
    }

    /// Damage enemy `index` by `amount` (already multiplied), with feedback.
    /// Returns the HP actually removed.
    pub fn damage_enemy(
        &mut self,
        index: usize,
        amount: f32,
        source: impl Into<DamageSource>,
    ) -> f32 {
        let Some(enemy) = self.enemies.get_mut(index) else {
            return 0.0;
        };
        let applied = enemy.take_damage(amount);
        if applied > 0.0 {
            let pos = enemy.pos;
            self.push_damage_number(pos, applied);
            self.push_event(GameEvent::EnemyHit {
                source: source.into(),
                pos,
            });
        }
        applied
    }

    pub fn is_visible(&self, pos: Vec2, buffer: f32) -> bool {
        self.camera.is_visible(pos, &self.viewport, buffer)
    }

    /// Index of the closest live enemy to `from`, skipping ids in `exclude`
    pub fn nearest_enemy(&self, from: Vec2, max_dist: f32, exclude: &[u32]) -> Option<usize> {
        self.enemies
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.dead && !exclude.contains(&e.id))
            .map(|(i, e)| (i, e.pos.distance_squared(from)))
            .filter(|&(_, d2)| d2 <= max_dist * max_dist)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    pub fn live_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| !e.dead).count()
    }

    /// Random point in `[min, max)`
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        crate::random_range(&mut self.rng, min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::PermanentLevels;
    use crate::tuning::{CharacterConfig, Tuning};

    fn state() -> GameState {
        let player = Player::new(
            &CharacterConfig::fallback(),
            &PermanentLevels::default(),
            Vec2::new(WORLD_WIDTH, WORLD_HEIGHT),
        );
        GameState::new(42, Difficulty::Normal, player, ScalingLaw::default())
    }

    #[test]
    fn test_entity_ids_unique() {
        let mut s = state();
        let a = s.next_entity_id();
        let b = s.next_entity_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_camera_centres_player() {
        let s = state();
        let center = s.camera.pos + s.viewport.size() / 2.0;
        assert_eq!(center, s.player.pos);
        assert!(s.is_visible(s.player.pos, 0.0));
        assert!(!s.is_visible(s.player.pos + Vec2::new(2000.0, 0.0), RENDER_BUFFER));
    }

    #[test]
    fn test_nearest_enemy_skips_dead_and_excluded() {
        let tuning = Tuning::default();
        let mut s = state();
        let zombie = tuning.enemy(EnemyKind::Zombie).unwrap().clone();
        let p = s.player.pos;
        let a = s.spawn_enemy(&zombie, p + Vec2::new(50.0, 0.0));
        s.spawn_enemy(&zombie, p + Vec2::new(100.0, 0.0));
        s.spawn_enemy(&zombie, p + Vec2::new(30.0, 0.0));
        s.enemies[2].dead = true;
        assert_eq!(s.nearest_enemy(p, 1000.0, &[]), Some(0));
        assert_eq!(s.nearest_enemy(p, 1000.0, &[a]), Some(1));
        assert_eq!(s.nearest_enemy(p, 40.0, &[]), None);
    }

    #[test]
    fn test_event_queue_drops_oldest() {
        let mut s = state();
        for level in 0..MAX_PENDING_EVENTS as u32 + 5 {
            s.push_event(GameEvent::LevelUp { level });
        }
        assert_eq!(s.events.len(), MAX_PENDING_EVENTS);
        assert_eq!(s.events.front(), Some(&GameEvent::LevelUp { level: 5 }));
        assert_eq!(
            s.events.back(),
            Some(&GameEvent::LevelUp {
                level: MAX_PENDING_EVENTS as u32 + 4
            })
        );
    }

    #[test]
    fn test_damage_numbers_respect_setting() {
        let mut s = state();
        s.push_damage_number(Vec2::ZERO, 60.0);
        assert!(s.damage_numbers[0].crit);
        s.show_damage_numbers = false;
        s.push_damage_number(Vec2::ZERO, 10.0);
        assert_eq!(s.damage_numbers.len(), 1);
    }

    #[test]
    fn test_rate_minutes_cap() {
        assert_eq!(Difficulty::Normal.rate_minutes(3600.0), RATE_GROWTH_CAP_MINUTES);
        assert_eq!(Difficulty::Endless.rate_minutes(3600.0), 60.0);
    }

    #[test]
    fn test_visual_timers_expire() {
        let mut v = VisualTimers::default();
        v.shake(8.0, 0.5);
        v.boss_warning = Some(BossWarning {
            name: "x".into(),
            timer: 0.2,
        });
        v.update(0.6);
        assert_eq!(v.shake_intensity, 0.0);
        assert!(v.boss_warning.is_none());
    }
}
