//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by actor id)
//! - No rendering, audio or input dependencies

pub mod actor;
pub mod actors;
pub mod ai;
pub mod animation;
pub mod collision;
pub mod combat;
pub mod director;
pub mod events;
pub mod level;
pub mod map;
pub mod progression;
pub mod state;
pub mod tick;
pub mod timer;
pub mod upgrades;
pub mod weapons;

pub use actor::{Actor, ActorKind, AiKind, AttackKind, DamageOutcome, Facing, Status};
pub use actors::{ActorId, Actors};
pub use events::SimEvent;
pub use level::LevelProgress;
pub use map::{OpenGround, SpatialQuery, TileGrid};
pub use progression::{KillCounts, Progression};
pub use state::{NextScene, Phase, RunSummary, SimState};
pub use tick::{TickInput, tick};
pub use upgrades::{Unlocks, Upgrade, Weapon, WeaponUpgradeStats};
