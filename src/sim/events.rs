//! Discrete notifications for the presentation layer
//!
//! The simulation never plays sounds or draws overlays. It queues these and
//! the driver drains them once per frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actor::{AiKind, AttackKind};
use super::actors::ActorId;
use super::upgrades::{Upgrade, Weapon};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    HostileSpawned { id: ActorId, ai: AiKind, pos: Vec2 },
    HostileKilled { id: ActorId, ai: AiKind, by: AttackKind, experience: u32 },
    PlayerHurt { damage: i32, hp: i32 },
    ProjectileFired { id: ActorId, kind: AttackKind },
    /// A shield absorbed a hostile shot
    ProjectileBlocked { id: ActorId, shield: ActorId },
    BeamFired { id: ActorId, direction: Vec2 },
    LevelUp { level: u32 },
    UpgradeOffered { options: Vec<Upgrade> },
    UpgradeApplied { upgrade: Upgrade },
    WeaponUnlocked { weapon: Weapon },
    WaveSpawned { at: f32, count: u32 },
    /// A scripted wave went out on a wave level (1-based)
    WaveReleased { wave: usize, count: u32 },
    LevelCleared,
    Won,
    Lost,
}
