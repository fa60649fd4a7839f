//! Real-time simulation module
//!
//! All gameplay logic lives here. Rules for code in this module:
//! - Single writer: only the engine mutates `GameState`, in one fixed order per tick
//! - Seeded RNG only (one generator per run, owned by the state)
//! - Guard clauses instead of errors; a bad tick never stops the loop
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod combo;
pub mod enemy;
pub mod observer;
pub mod particles;
pub mod pet;
pub mod pickups;
pub mod player;
pub mod projectile;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod weapons;

pub use collision::{CollisionReport, circles_overlap};
pub use combo::{Combo, ComboCallout, combo_multiplier};
pub use enemy::{AiState, Enemy, MinionRequest, StatusEffects};
pub use observer::{
    EnemyMarker, EvolutionInfo, GameObserver, NullObserver, PlayerStats, RunStats, RunSummary,
    UpgradeOption, WorldSnapshot,
};
pub use particles::{Particle, ParticleKind, Particles};
pub use pet::{Pet, PetState};
pub use pickups::{CrystalTier, TreasureChest, XpCrystal};
pub use player::{HitOutcome, Player, WeaponBadge, armor_mitigate, xp_for_level};
pub use projectile::{Motion, Projectile, StatusPayload};
pub use spawn::SpawnManager;
pub use state::{
    Camera, ChestReward, DamageSource, Difficulty, GameEvent, GameState, Viewport, VisualTimers,
};
pub use tick::{Engine, EngineConfig, FrameClock, FrameSteps, StepMode, TickInput};
pub use weapons::{WeaponChange, WeaponInstance, WeaponSystem};
