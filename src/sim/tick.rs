//! Engine loop
//!
//! `Engine` owns one run and advances it tick by tick in a fixed order.
//! `FrameClock` turns host timestamps into tick deltas.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision;
use super::observer::{
    EvolutionInfo, GameObserver, NullObserver, PlayerStats, RunStats, RunSummary, UpgradeOption,
    WorldSnapshot,
};
use super::particles::ParticleKind;
use super::player::Player;
use super::projectile::Motion;
use super::spawn::SpawnManager;
use super::state::{
    ChestReward, ComboMessage, DamageSource, Difficulty, GameEvent, GameState, Viewport,
};
use super::weapons::{WeaponChange, WeaponSystem};
use crate::consts::*;
use crate::progression::PermanentLevels;
use crate::settings::Settings;
use crate::tuning::{EnemyKind, Tuning};
use crate::weighted_index;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Resolved movement vector, magnitude <= 1
    pub movement: Vec2,
    /// Dash requested (edge-triggered)
    pub dash: bool,
    /// Ultimate requested (edge-triggered)
    pub ultimate: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepMode {
    /// One tick per frame with the measured delta
    #[default]
    Variable,
    /// `SIM_DT` substeps drawn from an accumulator
    Fixed,
}

/// Ticks to run for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSteps {
    pub count: u32,
    pub dt: f32,
}

impl FrameSteps {
    const NONE: FrameSteps = FrameSteps { count: 0, dt: 0.0 };
}

/// Host timestamps in, tick deltas out
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    pub mode: StepMode,
    last: Option<f64>,
    accumulator: f32,
}

impl FrameClock {
    pub fn new(mode: StepMode) -> Self {
        Self {
            mode,
            last: None,
            accumulator: 0.0,
        }
    }

    /// Forget the last timestamp so paused wall time is never simulated
    pub fn rebaseline(&mut self) {
        self.last = None;
        self.accumulator = 0.0;
    }

    /// Measure the frame ending at `now_ms`.
    ///
    /// The first frame after construction or `rebaseline` only records the
    /// timestamp. A delta above `MAX_FRAME_DELTA` counts as a stall.
    pub fn advance(&mut self, now_ms: f64) -> FrameSteps {
        if !now_ms.is_finite() {
            return FrameSteps::NONE;
        }
        let Some(last) = self.last.replace(now_ms) else {
            return FrameSteps::NONE;
        };
        let mut delta = ((now_ms - last) / 1000.0) as f32;
        if !(delta > 0.0) {
            return FrameSteps::NONE;
        }
        if delta > MAX_FRAME_DELTA {
            delta = STALLED_FRAME_DELTA;
        }

        match self.mode {
            StepMode::Variable => FrameSteps { count: 1, dt: delta },
            StepMode::Fixed => {
                self.accumulator += delta;
                let mut count = 0;
                while self.accumulator >= SIM_DT && count < MAX_SUBSTEPS {
                    self.accumulator -= SIM_DT;
                    count += 1;
                }
                if count == MAX_SUBSTEPS {
                    // Drop the backlog instead of spiralling
                    self.accumulator = self.accumulator.min(SIM_DT);
                }
                FrameSteps { count, dt: SIM_DT }
            }
        }
    }
}

/// Everything chosen in the menus before a run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub character: String,
    pub difficulty: Difficulty,
    pub seed: u64,
    pub permanent: PermanentLevels,
    pub settings: Settings,
    pub step_mode: StepMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            character: "mage".into(),
            difficulty: Difficulty::Normal,
            seed: 0,
            permanent: PermanentLevels::default(),
            settings: Settings::default(),
            step_mode: StepMode::Variable,
        }
    }
}

/// One run of the game
pub struct Engine {
    state: GameState,
    tuning: Tuning,
    spawner: SpawnManager,
    weapons: WeaponSystem,
    observer: Box<dyn GameObserver>,
    settings: Settings,
    clock: FrameClock,
    running: bool,
    paused: bool,
    game_over: bool,
    /// Level-ups earned but not yet chosen, including the one on offer
    pending_level_ups: u32,
    current_offer: Option<Vec<UpgradeOption>>,
    /// Pulses seen by `frame` that have not reached a tick yet
    queued_dash: bool,
    queued_ultimate: bool,
}

impl Engine {
    pub fn new(tuning: Tuning, config: EngineConfig, observer: Box<dyn GameObserver>) -> Self {
        let character = tuning.character_or_default(&config.character);
        let world_size = Vec2::new(WORLD_WIDTH, WORLD_HEIGHT);
        let player = Player::new(&character, &config.permanent, world_size);
        let mut state = GameState::new(config.seed, config.difficulty, player, tuning.scaling);
        state.show_damage_numbers = config.settings.show_damage_numbers;

        let mut weapons = WeaponSystem::new();
        if weapons.add_weapon(&tuning, &character.starting_weapon) == WeaponChange::Unknown {
            log::warn!(
                "Starting weapon '{}' unknown, using '{}'",
                character.starting_weapon,
                tuning.default_weapon
            );
            weapons.add_weapon(&tuning, &tuning.default_weapon);
        }

        log::info!(
            "Run started: character={} difficulty={:?} seed={}",
            character.id,
            config.difficulty,
            config.seed
        );

        let mut engine = Self {
            state,
            tuning,
            spawner: SpawnManager::new(),
            weapons,
            observer,
            settings: config.settings,
            clock: FrameClock::new(config.step_mode),
            running: true,
            paused: false,
            game_over: false,
            pending_level_ups: 0,
            current_offer: None,
            queued_dash: false,
            queued_ultimate: false,
        };
        engine.sync_weapon_badges();
        engine
    }

    /// Default balance, no observer
    pub fn with_seed(seed: u64) -> Self {
        let config = EngineConfig {
            seed,
            ..Default::default()
        };
        Self::new(Tuning::default(), config, Box::new(NullObserver))
    }

    pub fn set_observer(&mut self, observer: Box<dyn GameObserver>) {
        self.observer = observer;
    }

    /// Drive the run from the host's per-frame callback. Returns ticks run.
    pub fn frame(&mut self, now_ms: f64, input: &TickInput) -> u32 {
        if !self.running {
            return 0;
        }
        if self.paused {
            self.clock.rebaseline();
            return 0;
        }
        self.queued_dash |= input.dash;
        self.queued_ultimate |= input.ultimate;

        let steps = self.clock.advance(now_ms);
        let mut ran = 0;
        for _ in 0..steps.count {
            if self.paused || !self.running {
                break;
            }
            let step_input = TickInput {
                movement: input.movement,
                dash: std::mem::take(&mut self.queued_dash),
                ultimate: std::mem::take(&mut self.queued_ultimate),
            };
            self.tick(steps.dt, &step_input);
            ran += 1;
        }
        ran
    }

    /// Advance the run by `dt` seconds
    pub fn tick(&mut self, dt: f32, input: &TickInput) {
        if !self.running || self.paused || self.game_over {
            return;
        }
        if !(dt > 0.0) {
            return;
        }
        let dt = if dt > MAX_FRAME_DELTA { STALLED_FRAME_DELTA } else { dt };
        self.state.time += dt;

        let movement = if input.movement.is_finite() {
            input.movement.clamp_length_max(1.0)
        } else {
            Vec2::ZERO
        };

        if input.dash && self.state.player.try_dash(movement) {
            let pos = self.state.player.pos;
            self.state.particles.burst(&mut self.state.rng, pos, ParticleKind::Hit, 8, 100.0);
            self.state.push_event(GameEvent::Dash);
        }

        let world_size = self.state.world_size;
        self.state.player.update(dt, movement, world_size);
        let player_pos = self.state.player.pos;
        self.state.pet.update(dt, player_pos, &mut self.state.crystals);

        if input.ultimate && self.state.player.can_use_ultimate() {
            self.trigger_ultimate();
        }

        self.state.camera.follow(player_pos, &self.state.viewport);

        self.spawner.update(&mut self.state, &self.tuning, dt);
        self.weapons.update(&mut self.state, &self.tuning, dt);

        self.update_enemies(dt);
        self.remove_dead_enemies();
        self.update_projectiles(dt);
        self.update_crystals(dt);
        self.update_chests();

        collision::resolve(&mut self.state);

        self.state.particles.update(dt);
        self.state.combo.update(dt);
        for number in &mut self.state.damage_numbers {
            number.update(dt);
        }
        self.state.damage_numbers.retain(|n| n.life > 0.0);
        self.state.visuals.update(dt);

        self.notify_stats();

        if self.state.player.is_dead() {
            self.finish_run();
        }
    }

    fn update_enemies(&mut self, dt: f32) {
        let player_pos = self.state.player.pos;
        let (time, world_size) = (self.state.time, self.state.world_size);
        let mut requests = Vec::new();
        for enemy in &mut self.state.enemies {
            if let Some(request) = enemy.update(dt, player_pos, time, world_size) {
                requests.push(request);
            }
        }
        for request in requests {
            self.spawner.spawn_minions(&mut self.state, &self.tuning, request);
        }
    }

    fn remove_dead_enemies(&mut self) {
        let mut fallen = Vec::new();
        self.state.enemies.retain(|e| {
            if e.dead {
                fallen.push((e.kind, e.pos, e.xp_value, e.name.clone()));
            }
            !e.dead
        });
        for (kind, pos, xp_value, name) in fallen {
            self.reward_kill(kind, pos, xp_value, name);
        }
    }

    fn reward_kill(&mut self, kind: EnemyKind, pos: Vec2, xp_value: u32, name: Option<String>) {
        let state = &mut self.state;
        state.spawn_crystal(pos, xp_value as f32);
        state.particles.burst(&mut state.rng, pos, ParticleKind::Death, 12, 150.0);
        state.player.kills += 1;

        if let Some(callout) = state.combo.register_kill() {
            state.visuals.combo_message = Some(ComboMessage {
                text: callout.text,
                timer: callout.duration_ms as f32 / 1000.0,
            });
        }
        state.player.add_ultimate_charge(ULTIMATE_CHARGE_PER_KILL);
        state.push_event(GameEvent::EnemyKilled { kind, pos });

        if kind == EnemyKind::Boss {
            state.visuals.shake(8.0, 0.5);
            state.player.add_ultimate_charge(ULTIMATE_CHARGE_PER_BOSS);
            let name = name.unwrap_or_else(|| kind.as_str().to_string());
            log::info!("Boss defeated: {name} at {:.1}s", state.time);
            state.push_event(GameEvent::BossDefeated { name });
        }
    }

    fn update_projectiles(&mut self, dt: f32) {
        let owner = self.state.player.pos;
        for i in 0..self.state.projectiles.len() {
            let p = &self.state.projectiles[i];
            let seek = match p.motion {
                Motion::Boomerang {
                    homing: true,
                    returning: false,
                    ..
                } => self
                    .state
                    .nearest_enemy(p.pos, f32::INFINITY, &p.hit)
                    .map(|e| self.state.enemies[e].pos),
                _ => None,
            };
            self.state.projectiles[i].update(dt, owner, seek);
        }
        let world_size = self.state.world_size;
        self.state.projectiles.retain(|p| !p.is_expired(world_size));
    }

    fn update_crystals(&mut self, dt: f32) {
        let player = &self.state.player;
        let (pos, radius, range) = (player.pos, player.radius, player.pickup_range);
        let mut collected = Vec::new();
        for crystal in &mut self.state.crystals {
            crystal.update(dt, pos, radius, range);
            if crystal.collected {
                collected.push(crystal.value);
            }
        }
        self.state.crystals.retain(|c| c.is_live());
        for value in collected {
            self.grant_crystal_xp(value);
        }
    }

    /// Crystal value scaled by combo and growth, doubled on a luck roll
    fn grant_crystal_xp(&mut self, value: f32) {
        let player = &self.state.player;
        let mut xp = (value * self.state.combo.multiplier() * player.xp_mult).floor();
        let double_chance = (player.luck - 1.0).clamp(0.0, 1.0);
        if double_chance > 0.0 && self.state.rng.random::<f32>() < double_chance {
            xp *= 2.0;
        }
        self.state.push_event(GameEvent::XpCollected { amount: xp });
        self.grant_xp(xp);
    }

    fn grant_xp(&mut self, amount: f32) {
        let before = self.state.player.level;
        let gained = self.state.player.gain_xp(amount);
        if gained == 0 {
            return;
        }
        for level in before + 1..=before + gained {
            self.state.push_event(GameEvent::LevelUp { level });
        }
        self.pending_level_ups += gained;
        self.offer_next_level_up();
    }

    fn update_chests(&mut self) {
        let (pos, radius) = (self.state.player.pos, self.state.player.radius);
        let mut opened = 0;
        for chest in &mut self.state.chests {
            if chest.update(pos, radius) {
                opened += 1;
            }
        }
        self.state.chests.retain(|c| !c.collected);
        for _ in 0..opened {
            self.open_chest();
        }
    }

    /// Evolve the first eligible weapon; otherwise level a random passive,
    /// or pay out gold when that passive is maxed
    fn open_chest(&mut self) {
        if let Some(id) = self.weapons.first_evolvable(&self.tuning) {
            if self.weapons.evolve_weapon(&self.tuning, &id) {
                self.sync_weapon_badges();
                self.state.push_event(GameEvent::WeaponEvolved {
                    weapon_id: id.clone(),
                });
                self.state.push_event(GameEvent::ChestOpened {
                    reward: ChestReward::Evolution {
                        weapon_id: id.clone(),
                    },
                });
                if let Some(config) = self.tuning.weapon(&id) {
                    let info = EvolutionInfo {
                        weapon_id: id,
                        name: config.evolution.name.clone(),
                        icon: config.evolution.icon.clone(),
                        description: config.evolution.description.clone(),
                    };
                    log::info!("Chest evolved {} into {}", info.weapon_id, info.name);
                    self.paused = true;
                    self.observer.on_evolution(&info);
                }
                return;
            }
        }

        let passive = match self.tuning.passives.len() {
            0 => None,
            n => Some(self.tuning.passives[self.state.rng.random_range(0..n)].clone()),
        };
        let player = &mut self.state.player;
        let levelled = passive
            .as_ref()
            .and_then(|p| player.level_passive(p.kind, p.max_level).map(|level| (p, level)));
        let reward = match levelled {
            Some((p, level)) => ChestReward::Passive {
                name: p.name.clone(),
                level,
            },
            None => {
                let amount = (CHEST_GOLD as f32 * player.gold_mult).floor() as u32;
                self.state.gold = self.state.gold.saturating_add(amount);
                ChestReward::Gold { amount }
            }
        };
        log::debug!("Chest opened: {reward:?}");
        self.state.push_event(GameEvent::ChestOpened { reward });
    }

    fn trigger_ultimate(&mut self) {
        if !self.state.player.activate_ultimate() {
            return;
        }
        let state = &mut self.state;
        state.visuals.shake(12.0, 0.8);
        state.visuals.ultimate_flash = 0.4;
        let damage = ULTIMATE_DAMAGE * state.player.damage_mult;
        for i in 0..state.enemies.len() {
            let (dead, pos) = (state.enemies[i].dead, state.enemies[i].pos);
            if dead || !state.is_visible(pos, RENDER_BUFFER) {
                continue;
            }
            state.damage_enemy(i, damage, DamageSource::Ultimate);
            state.particles.burst(&mut state.rng, pos, ParticleKind::Explosion, 8, 200.0);
        }
        state.push_event(GameEvent::UltimateActivated);
    }

    /// Present the next queued level-up, pausing until a choice is applied
    fn offer_next_level_up(&mut self) {
        if self.current_offer.is_some() || self.pending_level_ups == 0 || self.game_over {
            return;
        }
        let options = self.build_upgrade_options();
        if options.is_empty() {
            log::warn!("No upgrade options available; skipping level-up offers");
            self.pending_level_ups = 0;
            return;
        }
        log::debug!("Level-up offer: {} options", options.len());
        self.paused = true;
        self.observer.on_level_up(&options);
        self.current_offer = Some(options);
    }

    /// Up to three options: a new weapon if a slot is free, an upgrade for an
    /// owned weapon, then stat boosts drawn by weight without repeats
    fn build_upgrade_options(&mut self) -> Vec<UpgradeOption> {
        let mut options = Vec::with_capacity(3);
        let rng = &mut self.state.rng;

        if !self.weapons.is_full() {
            let fresh: Vec<_> = self
                .tuning
                .weapons
                .iter()
                .filter(|w| !self.weapons.has_weapon(&w.id))
                .collect();
            if !fresh.is_empty() {
                let config = fresh[rng.random_range(0..fresh.len())];
                options.push(UpgradeOption::NewWeapon {
                    weapon_id: config.id.clone(),
                    name: config.name.clone(),
                    icon: config.icon.clone(),
                    description: config.description.clone(),
                });
            }
        }

        let upgradable: Vec<_> = self
            .weapons
            .weapons
            .iter()
            .filter_map(|w| {
                let config = self.tuning.weapon(&w.id)?;
                (w.level < config.max_level()).then_some((w.level, config))
            })
            .collect();
        if !upgradable.is_empty() {
            let (level, config) = upgradable[rng.random_range(0..upgradable.len())];
            options.push(UpgradeOption::WeaponUpgrade {
                weapon_id: config.id.clone(),
                name: config.name.clone(),
                icon: config.icon.clone(),
                next_level: level as u32 + 2,
            });
        }

        let mut pool: Vec<_> = self.tuning.stat_upgrades.iter().collect();
        while options.len() < 3 && !pool.is_empty() {
            let weights: Vec<f32> = pool.iter().map(|s| s.weight).collect();
            let index = weighted_index(rng, &weights).unwrap_or(0);
            let stat = pool.swap_remove(index);
            options.push(UpgradeOption::Stat {
                id: stat.id.clone(),
                name: stat.name.clone(),
                icon: stat.icon.clone(),
                description: stat.description.clone(),
                stat: stat.stat,
                value: stat.value,
            });
        }
        options
    }

    /// Apply a level-up choice. While offers are queued the next one is
    /// presented immediately and the engine stays paused.
    pub fn apply_upgrade(&mut self, option: &UpgradeOption) {
        match option {
            UpgradeOption::NewWeapon { weapon_id, .. } => {
                self.weapons.add_weapon(&self.tuning, weapon_id);
            }
            UpgradeOption::WeaponUpgrade { weapon_id, .. } => {
                self.weapons.upgrade_weapon(&self.tuning, weapon_id);
            }
            UpgradeOption::Stat { stat, value, .. } => {
                self.state.player.apply_stat_upgrade(*stat, *value);
            }
        }
        self.sync_weapon_badges();

        if self.current_offer.take().is_some() {
            self.pending_level_ups = self.pending_level_ups.saturating_sub(1);
            self.offer_next_level_up();
        }
    }

    /// Apply option `index` of the current offer
    pub fn choose_upgrade(&mut self, index: usize) -> bool {
        let Some(option) = self
            .current_offer
            .as_ref()
            .and_then(|offer| offer.get(index))
            .cloned()
        else {
            return false;
        };
        self.apply_upgrade(&option);
        true
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume ticking. Refused while a level-up choice is outstanding or
    /// after the run ended.
    pub fn resume(&mut self) -> bool {
        if self.game_over || !self.running || self.current_offer.is_some() {
            return false;
        }
        self.paused = false;
        self.clock.rebaseline();
        true
    }

    /// End the run and release everything it holds
    pub fn stop(&mut self) {
        self.running = false;
        self.current_offer = None;
        self.pending_level_ups = 0;
        let state = &mut self.state;
        state.enemies.clear();
        state.projectiles.clear();
        state.crystals.clear();
        state.chests.clear();
        state.particles.clear();
        state.damage_numbers.clear();
        self.weapons.beams.clear();
        self.weapons.chains.clear();
        self.weapons.orbs.clear();
        self.observer = Box::new(NullObserver);
        log::debug!("Engine stopped");
    }

    fn finish_run(&mut self) {
        if self.game_over {
            return;
        }
        self.game_over = true;
        self.running = false;
        self.current_offer = None;
        let summary = self.summary();
        log::info!(
            "Game over: survived {}, {} kills, level {}, max combo {}",
            crate::format_time(summary.time),
            summary.kills,
            summary.level,
            summary.max_combo
        );
        self.state.push_event(GameEvent::GameOver);
        self.observer.on_game_over(&summary);
    }

    fn notify_stats(&mut self) {
        let player = PlayerStats::capture(&self.state);
        let run = RunStats::capture(&self.state);
        self.observer.on_player_stats(&player);
        self.observer.on_run_stats(&run);
    }

    fn sync_weapon_badges(&mut self) {
        self.state.player.weapons = self.weapons.badges(&self.tuning);
    }

    /// Gold from chests plus one per kill, scaled by greed
    pub fn run_gold(&self) -> u32 {
        let kills = (self.state.player.kills as f32 * self.state.player.gold_mult).floor() as u32;
        self.state.gold.saturating_add(kills)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            time: self.state.time,
            kills: self.state.player.kills,
            level: self.state.player.level,
            max_combo: self.state.combo.max_count,
            gold: self.run_gold(),
        }
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(&self.state)
    }

    pub fn player_stats(&self) -> PlayerStats {
        PlayerStats::capture(&self.state)
    }

    /// Host-reported drawable size; ignored when degenerate
    pub fn resize(&mut self, width: f32, height: f32) {
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            log::warn!("Ignoring invalid viewport {width}x{height}");
            return;
        }
        self.state.viewport = Viewport { width, height };
        let pos = self.state.player.pos;
        self.state.camera.follow(pos, &self.state.viewport);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.events.drain(..).collect()
    }

    /// Force-spawn an enemy on the viewport ring
    pub fn spawn_enemy(&mut self, kind: EnemyKind) -> Option<u32> {
        self.spawner.spawn_one(&mut self.state, &self.tuning, kind)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn weapons(&self) -> &WeaponSystem {
        &self.weapons
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn pending_level_ups(&self) -> u32 {
        self.pending_level_ups
    }

    pub fn current_offer(&self) -> Option<&[UpgradeOption]> {
        self.current_offer.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::pickups::TreasureChest;
    use crate::sim::player::xp_for_level;
    use crate::sim::projectile::Projectile;
    use crate::tuning::WeaponKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Record {
        level_ups: Vec<Vec<UpgradeOption>>,
        evolutions: Vec<EvolutionInfo>,
        game_overs: Vec<RunSummary>,
    }

    struct Recorder(Rc<RefCell<Record>>);

    impl GameObserver for Recorder {
        fn on_level_up(&mut self, options: &[UpgradeOption]) {
            self.0.borrow_mut().level_ups.push(options.to_vec());
        }
        fn on_evolution(&mut self, info: &EvolutionInfo) {
            self.0.borrow_mut().evolutions.push(info.clone());
        }
        fn on_game_over(&mut self, summary: &RunSummary) {
            self.0.borrow_mut().game_overs.push(summary.clone());
        }
    }

    /// Engine with an empty roster so tests control every hit
    fn engine() -> (Engine, Rc<RefCell<Record>>) {
        let record = Rc::new(RefCell::new(Record::default()));
        let config = EngineConfig {
            seed: 1234,
            ..Default::default()
        };
        let mut engine = Engine::new(Tuning::default(), config, Box::new(Recorder(record.clone())));
        engine.weapons = WeaponSystem::new();
        engine.sync_weapon_badges();
        engine.state.player.hp_regen = 0.0;
        engine.state.player.damage_mult = 1.0;
        (engine, record)
    }

    fn zombie(engine: &mut Engine, pos: Vec2) -> usize {
        let config = engine.tuning.enemy(EnemyKind::Zombie).unwrap().clone();
        engine.state.spawn_enemy(&config, pos);
        engine.state.enemies.len() - 1
    }

    #[test]
    fn test_projectile_kill_drops_one_crystal() {
        let (mut e, _) = engine();
        let at = e.state.player.pos + Vec2::new(800.0, 0.0);
        let i = zombie(&mut e, at);
        assert_eq!(e.state.enemies[i].hp, 10.0);
        let bolt = Projectile::new(WeaponKind::Projectile, at, Vec2::X, 0.0, 15.0);
        e.state.spawn_projectile(bolt);

        e.tick(SIM_DT, &TickInput::default());
        assert!(e.state.enemies[0].dead);
        let death_pos = e.state.enemies[0].pos;

        e.tick(SIM_DT, &TickInput::default());
        assert!(e.state.enemies.is_empty());
        assert!(e.state.projectiles.is_empty());
        assert_eq!(e.state.crystals.len(), 1);
        assert_eq!(e.state.crystals[0].pos, death_pos);
        assert_eq!(e.state.crystals[0].value, 1.0);
        assert_eq!(e.state.player.kills, 1);
        assert_eq!(e.state.combo.count, 1);
        assert_eq!(e.state.player.ultimate_charge, ULTIMATE_CHARGE_PER_KILL);
    }

    #[test]
    fn test_contact_hit_then_invulnerable() {
        let (mut e, _) = engine();
        e.state.player.hp = 50.0;
        e.state.player.armor = 0.0;
        let pos = e.state.player.pos;
        let first = zombie(&mut e, pos + Vec2::new(5.0, 0.0));
        e.state.enemies[first].damage = 20.0;

        e.tick(SIM_DT, &TickInput::default());
        assert_eq!(e.state.player.hp, 30.0);
        assert_eq!(e.state.player.invuln_timer, INVULN_DURATION);
        assert_eq!(e.state.player.ultimate_charge, ULTIMATE_CHARGE_ON_HIT);

        let second = zombie(&mut e, pos + Vec2::new(-5.0, 0.0));
        e.state.enemies[second].damage = 20.0;
        e.tick(SIM_DT, &TickInput::default());
        assert_eq!(e.state.player.hp, 30.0);
    }

    #[test]
    fn test_chest_evolves_maxed_weapon() {
        let (mut e, record) = engine();
        e.weapons.add_weapon(&e.tuning, "fireball");
        while e.weapons.upgrade_weapon(&e.tuning, "fireball").is_some() {}
        let pos = e.state.player.pos;
        e.state.chests.push(TreasureChest::new(999, pos, 0.0));

        e.tick(SIM_DT, &TickInput::default());
        assert!(e.weapons.get("fireball").unwrap().evolved);
        assert!(e.state.player.weapons[0].evolved);
        assert!(e.state.player.passives.is_empty());
        assert_eq!(e.state.gold, 0);
        assert!(e.is_paused());

        let record = record.borrow();
        assert_eq!(record.evolutions.len(), 1);
        let evolution = &e.tuning.weapon("fireball").unwrap().evolution;
        assert_eq!(record.evolutions[0].name, evolution.name);
        assert_eq!(record.evolutions[0].icon, evolution.icon);
    }

    #[test]
    fn test_chest_without_evolution_levels_passive() {
        let (mut e, record) = engine();
        let pos = e.state.player.pos;
        e.state.chests.push(TreasureChest::new(999, pos, 0.0));
        e.tick(SIM_DT, &TickInput::default());

        assert!(record.borrow().evolutions.is_empty());
        let opened = e
            .drain_events()
            .into_iter()
            .filter(|ev| {
                matches!(
                    ev,
                    GameEvent::ChestOpened {
                        reward: ChestReward::Passive { level: 1, .. }
                    }
                )
            })
            .count();
        assert_eq!(opened, 1);
        assert_eq!(e.state.player.passives.values().sum::<u32>(), 1);
        assert!(e.state.chests.is_empty());
        assert!(!e.is_paused());
    }

    #[test]
    fn test_boss_spawns_once_at_threshold() {
        let (mut e, _) = engine();
        e.state.time = 179.9;
        e.tick(0.05, &TickInput::default());
        assert_eq!(e.state.enemies.iter().filter(|x| x.is_boss()).count(), 0);
        for _ in 0..22 {
            e.tick(0.05, &TickInput::default());
        }
        assert!(e.state.time > 180.0);
        let bosses: Vec<_> = e.state.enemies.iter().filter(|x| x.is_boss()).collect();
        assert_eq!(bosses.len(), 1);
        assert_eq!(bosses[0].max_hp, 3000.0);
        assert_eq!(bosses[0].name.as_deref(), Some("Bone Colossus"));
    }

    #[test]
    fn test_game_over_reported_once() {
        let (mut e, record) = engine();
        e.state.player.hp = 1.0;
        let pos = e.state.player.pos;
        zombie(&mut e, pos);
        e.tick(SIM_DT, &TickInput::default());
        assert!(e.is_game_over());
        assert!(!e.is_running());

        e.tick(SIM_DT, &TickInput::default());
        assert_eq!(e.frame(1000.0, &TickInput::default()), 0);
        assert!(!e.resume());
        let record = record.borrow();
        assert_eq!(record.game_overs.len(), 1);
        assert_eq!(record.game_overs[0].level, 1);
    }

    #[test]
    fn test_level_ups_queue_and_resume() {
        let (mut e, record) = engine();
        e.weapons.add_weapon(&e.tuning, "fireball");
        e.grant_xp(xp_for_level(1) + xp_for_level(2) + 1.0);
        assert_eq!(e.state.player.level, 3);
        assert_eq!(e.pending_level_ups(), 2);
        assert!(e.is_paused());
        assert!(!e.resume());
        assert_eq!(record.borrow().level_ups.len(), 1);
        assert_eq!(e.current_offer().unwrap().len(), 3);

        assert!(e.choose_upgrade(0));
        assert_eq!(e.pending_level_ups(), 1);
        assert_eq!(record.borrow().level_ups.len(), 2);
        assert!(!e.resume());

        assert!(e.choose_upgrade(2));
        assert_eq!(e.pending_level_ups(), 0);
        assert!(e.current_offer().is_none());
        assert!(!e.choose_upgrade(0));
        assert!(e.resume());
    }

    #[test]
    fn test_offer_shape() {
        let (mut e, _) = engine();
        e.weapons.add_weapon(&e.tuning, "fireball");
        let options = e.build_upgrade_options();
        assert_eq!(options.len(), 3);
        assert!(matches!(options[0], UpgradeOption::NewWeapon { .. }));
        assert!(matches!(
            &options[1],
            UpgradeOption::WeaponUpgrade { weapon_id, next_level: 2, .. } if weapon_id == "fireball"
        ));
        assert!(matches!(options[2], UpgradeOption::Stat { .. }));
    }

    #[test]
    fn test_ultimate_hits_visible_enemies() {
        let (mut e, _) = engine();
        let pos = e.state.player.pos;
        let near = zombie(&mut e, pos + Vec2::new(300.0, 0.0));
        let far = zombie(&mut e, pos + Vec2::new(1500.0, 0.0));
        e.state.enemies[near].hp = 500.0;
        e.state.enemies[far].hp = 500.0;
        e.state.player.ultimate_charge = ULTIMATE_MAX;

        let input = TickInput {
            ultimate: true,
            ..Default::default()
        };
        e.tick(SIM_DT, &input);
        assert_eq!(e.state.enemies[near].hp, 500.0 - ULTIMATE_DAMAGE);
        assert_eq!(e.state.enemies[far].hp, 500.0);
        assert_eq!(e.state.player.ultimate_charge, 0.0);
        assert!(e.state.player.ultimate_active);
        assert!(e.state.visuals.ultimate_flash > 0.0);
        assert!(e.drain_events().contains(&GameEvent::UltimateActivated));
    }

    #[test]
    fn test_dash_pulse_consumed_once() {
        let (mut e, _) = engine();
        e.clock = FrameClock::new(StepMode::Fixed);
        let input = TickInput {
            movement: Vec2::X,
            dash: true,
            ultimate: false,
        };
        e.frame(0.0, &input);
        assert_eq!(e.frame(60.0, &input), 3);
        let dashes = e
            .drain_events()
            .into_iter()
            .filter(|ev| *ev == GameEvent::Dash)
            .count();
        assert_eq!(dashes, 1);
        assert!(e.state.player.dash_active);
    }

    #[test]
    fn test_pause_freezes_time() {
        let (mut e, _) = engine();
        e.frame(0.0, &TickInput::default());
        e.frame(16.0, &TickInput::default());
        let t = e.state.time;
        e.pause();
        assert_eq!(e.frame(32.0, &TickInput::default()), 0);
        assert!(e.resume());
        // First frame after resume only re-baselines
        assert_eq!(e.frame(5000.0, &TickInput::default()), 0);
        assert_eq!(e.state.time, t);
        e.frame(5016.0, &TickInput::default());
        assert!((e.state.time - t - 0.016).abs() < 1e-4);
    }

    #[test]
    fn test_frame_clock_variable_and_stall() {
        let mut clock = FrameClock::new(StepMode::Variable);
        assert_eq!(clock.advance(1000.0).count, 0);
        let steps = clock.advance(1020.0);
        assert_eq!(steps.count, 1);
        assert!((steps.dt - 0.02).abs() < 1e-5);
        assert_eq!(clock.advance(3000.0).dt, STALLED_FRAME_DELTA);
        assert_eq!(clock.advance(2999.0).count, 0);
    }

    #[test]
    fn test_frame_clock_fixed_substeps() {
        let mut clock = FrameClock::new(StepMode::Fixed);
        clock.advance(0.0);
        let steps = clock.advance(40.0);
        assert_eq!(steps.count, 2);
        assert_eq!(steps.dt, SIM_DT);
        // ~6.7ms carried over plus 15ms
        assert_eq!(clock.advance(55.0).count, 1);
        clock.rebaseline();
        assert_eq!(clock.advance(60.0).count, 0);
    }

    #[test]
    fn test_frame_clock_caps_substeps() {
        let mut clock = FrameClock::new(StepMode::Fixed);
        clock.advance(0.0);
        for t in 1..=10 {
            let steps = clock.advance(t as f64 * 95.0);
            assert!(steps.count <= MAX_SUBSTEPS);
        }
    }

    #[test]
    fn test_stop_tears_down() {
        let (mut e, _) = engine();
        let pos = e.state.player.pos;
        zombie(&mut e, pos + Vec2::new(400.0, 0.0));
        e.stop();
        assert!(e.state.enemies.is_empty());
        assert!(!e.is_running());
        assert_eq!(e.frame(10.0, &TickInput::default()), 0);
    }

    #[test]
    fn test_resize_recentres_camera() {
        let (mut e, _) = engine();
        e.resize(800.0, 600.0);
        assert_eq!(e.state.viewport.width, 800.0);
        let center = e.state.camera.pos + Vec2::new(400.0, 300.0);
        assert_eq!(center, e.state.player.pos);
        e.resize(0.0, f32::NAN);
        assert_eq!(e.state.viewport.width, 800.0);
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = Engine::with_seed(77);
        let mut b = Engine::with_seed(77);
        let input = TickInput {
            movement: Vec2::new(0.6, -0.3),
            ..Default::default()
        };
        for _ in 0..600 {
            a.tick(SIM_DT, &input);
            b.tick(SIM_DT, &input);
            while a.current_offer().is_some() {
                a.choose_upgrade(0);
                b.choose_upgrade(0);
            }
            a.resume();
            b.resume();
        }
        assert_eq!(a.state.enemies.len(), b.state.enemies.len());
        assert_eq!(a.state.player.pos, b.state.player.pos);
        assert_eq!(a.state.player.kills, b.state.player.kills);
        assert_eq!(a.state.player.level, b.state.player.level);
    }

    #[test]
    fn test_unknown_character_falls_back() {
        let config = EngineConfig {
            character: "rogue".into(),
            ..Default::default()
        };
        let e = Engine::new(Tuning::default(), config, Box::new(NullObserver));
        assert!(e.weapons.has_weapon("fireball"));
        assert_eq!(e.state.player.weapons.len(), 1);
    }

    #[test]
    fn test_run_gold_counts_kills_and_chests() {
        let (mut e, _) = engine();
        e.state.player.kills = 7;
        e.state.player.gold_mult = 1.5;
        e.state.gold = 500;
        assert_eq!(e.run_gold(), 510);
        assert_eq!(e.summary().gold, 510);
    }
}
