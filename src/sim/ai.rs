//! Hostile behaviour selection
//!
//! Each tick every live hostile gets a fresh movement intent from its
//! `AiKind`. Projectiles (`AiKind::Bullet`) are skipped: they fly on the
//! velocity they were fired with.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::actor::{Actor, ActorKind, AiKind, Facing};
use super::actors::ActorId;
use super::state::SimState;
use crate::tuning::HostileTuning;

/// Snapshot of whoever the hostiles are chasing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub id: ActorId,
    pub pos: Vec2,
}

/// Cardinal step along the larger axis of `delta`; ties go vertical
fn cardinal_toward(delta: Vec2) -> Facing {
    if delta.x.abs() > delta.y.abs() {
        if delta.x > 0.0 { Facing::Right } else { Facing::Left }
    } else if delta.y > 0.0 {
        Facing::Down
    } else {
        Facing::Up
    }
}

fn wander_facing(choice: u32) -> Facing {
    match choice % 4 {
        0 => Facing::Left,
        1 => Facing::Up,
        2 => Facing::Right,
        _ => Facing::Down,
    }
}

/// Stable per-position direction pick. The origin seeds it so neighbouring
/// wanderers do not march in lockstep.
pub fn wander_hash(origin: Vec2, pos: Vec2) -> u32 {
    let seed = (origin.x * 7.0 + origin.y * 11.0) as i32;
    let pos_hash = ((pos.x * 0.1) as i32).wrapping_add((pos.y * 0.1) as i32);
    (pos_hash.wrapping_add(seed).unsigned_abs() / 5) % 4
}

fn wander(actor: &mut Actor, tuning: &HostileTuning, rng: &mut Pcg32) {
    let home = actor.origin - actor.pos;
    if home.length() > tuning.wander_radius {
        actor.head(cardinal_toward(home));
        return;
    }

    let mut choice = wander_hash(actor.origin, actor.pos);
    if actor.movement.length() < 0.1 {
        choice = rng.random_range(0..4);
    }
    if rng.random::<f32>() < tuning.wander_redirect_chance {
        choice = rng.random_range(0..4);
    }
    actor.head(wander_facing(choice));
}

fn fly(actor: &mut Actor, tuning: &HostileTuning) {
    if actor.pos.y >= actor.origin.y + tuning.flyer_span {
        actor.facing = Facing::Up;
    } else if actor.pos.y <= actor.origin.y {
        actor.facing = Facing::Down;
    }
    actor.head(actor.facing);
}

fn follow(actor: &mut Actor, target: Target) {
    let delta = target.pos - actor.pos;
    let dist2 = delta.length_squared();
    if dist2 < 1.0 {
        actor.movement = Vec2::ZERO;
        return;
    }
    let dir = delta / dist2.sqrt();
    actor.movement = dir;
    actor.facing = Facing::from_vector(dir);
}

/// Pick this tick's movement intent for one hostile
pub fn select_intent(
    actor: &mut Actor,
    target: Option<Target>,
    tuning: &HostileTuning,
    rng: &mut Pcg32,
) {
    if !actor.is_active() || actor.kind != ActorKind::Hostile {
        return;
    }
    match actor.ai {
        Some(AiKind::Wanderer) => {
            wander(actor, tuning, rng);
            // a nearby player overrides the idle wander
            if let Some(target) = target {
                let delta = target.pos - actor.pos;
                let radius = tuning.wander_activation_radius;
                if delta.length_squared() < radius * radius {
                    actor.head(cardinal_toward(delta));
                }
            }
        }
        Some(AiKind::Follower) => {
            if let Some(target) = target {
                follow(actor, target);
            }
        }
        Some(AiKind::Flyer) => fly(actor, tuning),
        Some(AiKind::Bullet) | None => {}
    }
}

/// AI pass over every live hostile in id order
pub fn drive(state: &mut SimState) {
    let target = state.player_target();
    for i in 0..state.actors.len() {
        let actor = state.actors.at_mut(i);
        if actor.is_live_hostile() {
            select_intent(actor, target, &state.tuning.hostiles, &mut state.rng);
        }
    }
}
