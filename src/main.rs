//! Survivor Arena native entry point
//!
//! Runs a headless scripted session against the public API and logs the
//! outcome. The browser build uses `platform::web` instead.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    native::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is `platform::web::start`
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use glam::Vec2;

    use survivor_arena::achievements::{AchievementStats, Achievements};
    use survivor_arena::consts::SIM_DT;
    use survivor_arena::format_time;
    use survivor_arena::highscores::HighScores;
    use survivor_arena::progression::Progression;
    use survivor_arena::sim::{Engine, EngineConfig, GameEvent, NullObserver};
    use survivor_arena::{TickInput, Tuning};

    /// Simulated seconds before the script gives up
    const MAX_RUN_SECONDS: f32 = 600.0;

    pub fn run() {
        let mut args = std::env::args().skip(1);
        let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
        let character = args.next().unwrap_or_else(|| "mage".into());

        let config = EngineConfig {
            character,
            seed,
            ..Default::default()
        };
        let mut engine = Engine::new(Tuning::default(), config, Box::new(NullObserver));
        let mut achievements = Achievements::new();
        let mut bosses = 0;

        let mut ticks = 0u32;
        while engine.is_running() && engine.state().time < MAX_RUN_SECONDS {
            let input = scripted_input(ticks, engine.state().player.ultimate_charge);
            engine.tick(SIM_DT, &input);
            ticks += 1;

            // Always take the first option, then carry on
            while engine.current_offer().is_some() {
                engine.choose_upgrade(0);
            }
            if engine.is_paused() {
                engine.resume();
            }

            for event in engine.drain_events() {
                if let GameEvent::BossDefeated { name } = event {
                    log::info!("Defeated {name}");
                    bosses += 1;
                }
            }
            if ticks % 60 == 0 {
                let state = engine.state();
                achievements.check(&AchievementStats {
                    kills: state.player.kills,
                    time: state.time,
                    max_combo: state.combo.max_count,
                    level: state.player.level,
                });
                achievements.update_toasts(1.0);
            }
        }

        let summary = engine.summary();
        let mut scores = HighScores::new();
        let rank = scores.add_run(&summary, 0.0);
        let mut progression = Progression::new();
        progression.award_run(&summary);

        log::info!(
            "Run over after {} ({} ticks): level {}, {} kills, {} bosses, max combo {}",
            format_time(summary.time),
            ticks,
            summary.level,
            summary.kills,
            bosses,
            summary.max_combo
        );
        log::info!(
            "Score {} (rank {:?}), gold banked {}, achievements {}",
            scores.top_score().unwrap_or(0),
            rank,
            progression.gold,
            achievements.unlocked.len()
        );
    }

    /// Walk a slow circle, dash every few seconds, fire the ultimate when full
    fn scripted_input(tick: u32, ultimate_charge: f32) -> TickInput {
        let angle = tick as f32 * SIM_DT * 0.4;
        TickInput {
            movement: Vec2::from_angle(angle),
            dash: tick % 240 == 0,
            ultimate: ultimate_charge >= survivor_arena::consts::ULTIMATE_MAX,
        }
    }
}
