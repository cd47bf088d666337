//! Arena Survival - entity simulation and combat resolution core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (actors, collision, AI, weapons, combat, spawning)
//! - `tuning`: Data-driven game balance
//! - `error`: Configuration and lifecycle errors

pub mod error;
pub mod sim;
pub mod tuning;

pub use error::{SimError, SimResult};
pub use tuning::Tuning;

use glam::Vec2;

/// Simulation constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default actor speed scalar (units per second at unit intent)
    pub const DEFAULT_SPEED: f32 = 50.0;
    /// Default seconds per animation frame
    pub const DEFAULT_FRAME_SECONDS: f32 = 1.0 / 14.0;

    /// Minimum vertical overlap before a horizontal contact counts as a wall
    pub const Y_COLLISION_THRESHOLD: f32 = 0.5;
    /// Extra push applied when backing out of a solid tile sideways
    pub const TILE_PUSH_SCALE: f32 = 1.01;

    /// Tolerance for periodic timers so float drift never drops a firing
    pub const TIMER_EPSILON: f32 = 1e-4;
}

/// Unit vector from `from` toward `to`, or `None` when the points coincide
#[inline]
pub fn direction_toward(from: Vec2, to: Vec2) -> Option<Vec2> {
    let delta = to - from;
    let len = delta.length();
    if len > 0.001 { Some(delta / len) } else { None }
}

/// Heading of a direction vector in degrees, plus a sprite offset
#[inline]
pub fn heading_degrees(dir: Vec2, offset_deg: f32) -> f32 {
    if dir.length_squared() < 1e-8 {
        return 0.0;
    }
    dir.y.atan2(dir.x).to_degrees() + offset_deg
}

/// Point on a circle of `radius` around `center` at angle `theta` (radians)
#[inline]
pub fn orbit_point(center: Vec2, radius: f32, theta: f32) -> Vec2 {
    center + Vec2::new(theta.cos(), theta.sin()) * radius
}
