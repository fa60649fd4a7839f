//! Browser binding
//!
//! `WebEngine` wraps an `Engine` plus the input context for JS hosts. Observer
//! callbacks are forwarded to plain JS functions with JSON payloads.

use glam::Vec2;
use js_sys::{Function, JSON, Reflect};
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::input::InputContext;
use crate::sim::{
    Engine, EngineConfig, EvolutionInfo, GameObserver, PlayerStats, RunStats, RunSummary,
    UpgradeOption,
};
use crate::tuning::{EnemyKind, Tuning};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // Already initialised by an earlier module instance
        return;
    }
    log::info!("Survivor Arena core loaded");
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
    JSON::parse(&json)
}

/// Optional callbacks read once from the host's callbacks object
#[derive(Default)]
struct JsObserver {
    on_player_stats: Option<Function>,
    on_run_stats: Option<Function>,
    on_level_up: Option<Function>,
    on_evolution: Option<Function>,
    on_game_over: Option<Function>,
}

impl JsObserver {
    fn from_object(callbacks: &JsValue) -> Self {
        let get = |name: &str| {
            Reflect::get(callbacks, &JsValue::from_str(name))
                .ok()
                .and_then(|f| f.dyn_into::<Function>().ok())
        };
        Self {
            on_player_stats: get("onPlayerStats"),
            on_run_stats: get("onRunStats"),
            on_level_up: get("onLevelUp"),
            on_evolution: get("onEvolution"),
            on_game_over: get("onGameOver"),
        }
    }

    fn emit<T: Serialize + ?Sized>(callback: &Option<Function>, payload: &T) {
        let Some(callback) = callback else {
            return;
        };
        let result = to_js(payload).and_then(|arg| callback.call1(&JsValue::NULL, &arg));
        if let Err(err) = result {
            log::warn!("Observer callback failed: {err:?}");
        }
    }
}

impl GameObserver for JsObserver {
    fn on_player_stats(&mut self, stats: &PlayerStats) {
        Self::emit(&self.on_player_stats, stats);
    }

    fn on_run_stats(&mut self, stats: &RunStats) {
        Self::emit(&self.on_run_stats, stats);
    }

    fn on_level_up(&mut self, options: &[UpgradeOption]) {
        Self::emit(&self.on_level_up, options);
    }

    fn on_evolution(&mut self, info: &EvolutionInfo) {
        Self::emit(&self.on_evolution, info);
    }

    fn on_game_over(&mut self, summary: &RunSummary) {
        Self::emit(&self.on_game_over, summary);
    }
}

#[wasm_bindgen]
pub struct WebEngine {
    engine: Engine,
    input: InputContext,
}

#[wasm_bindgen]
impl WebEngine {
    /// `config_json` is an `EngineConfig`; `tuning_json` overrides the
    /// built-in balance tables when given.
    #[wasm_bindgen(constructor)]
    pub fn new(
        config_json: &str,
        tuning_json: Option<String>,
        callbacks: JsValue,
    ) -> Result<WebEngine, JsValue> {
        let config: EngineConfig =
            serde_json::from_str(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let tuning = match tuning_json {
            Some(json) => Tuning::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => Tuning::default(),
        };
        let observer = JsObserver::from_object(&callbacks);
        Ok(WebEngine {
            engine: Engine::new(tuning, config, Box::new(observer)),
            input: InputContext::new(),
        })
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.engine.resize(width, height);
    }

    /// Returns true when the host should call `preventDefault`
    pub fn key_down(&mut self, key: &str) -> bool {
        self.input.key_down(key)
    }

    pub fn key_up(&mut self, key: &str) {
        self.input.key_up(key);
    }

    pub fn touch_start(&mut self, id: i32, x: f32, y: f32, screen_w: f32, screen_h: f32) {
        self.input
            .touch_start(id, Vec2::new(x, y), Vec2::new(screen_w, screen_h));
    }

    pub fn touch_move(&mut self, id: i32, x: f32, y: f32) {
        self.input.touch_move(id, Vec2::new(x, y));
    }

    pub fn touch_end(&mut self, id: i32) {
        self.input.touch_end(id);
    }

    /// Window blur or tab hidden
    pub fn blur(&mut self) {
        self.input.release_all();
        self.engine.pause();
    }

    /// Joystick ring for the overlay as `[center, knob]`, or null
    pub fn joystick(&self) -> Result<JsValue, JsValue> {
        match self.input.joystick() {
            Some(stick) => to_js(&[stick.center, stick.knob]),
            None => Ok(JsValue::NULL),
        }
    }

    /// Call from `requestAnimationFrame` with its timestamp
    pub fn frame(&mut self, now_ms: f64) -> u32 {
        let input = self.input.take_tick_input();
        self.engine.frame(now_ms, &input)
    }

    pub fn pause(&mut self) {
        self.engine.pause();
    }

    pub fn resume(&mut self) -> bool {
        self.engine.resume()
    }

    pub fn apply_upgrade(&mut self, index: usize) -> bool {
        self.engine.choose_upgrade(index)
    }

    pub fn stop(&mut self) {
        self.engine.stop();
    }

    pub fn is_paused(&self) -> bool {
        self.engine.is_paused()
    }

    pub fn is_game_over(&self) -> bool {
        self.engine.is_game_over()
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.snapshot())
    }

    pub fn drain_events(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.drain_events())
    }

    /// Debug hook: `kind` is an enemy id such as "zombie"
    pub fn spawn_enemy(&mut self, kind: &str) -> Option<u32> {
        let kind: EnemyKind = serde_json::from_value(serde_json::Value::from(kind)).ok()?;
        self.engine.spawn_enemy(kind)
    }
}
