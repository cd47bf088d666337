//! Fixed timestep simulation tick
//!
//! One call advances the run by `dt` in a fixed order:
//! 1. Director (waves, cap housekeeping, bursts) and hostile speed retune
//! 2. AI intent, then player input
//! 3. Motion and collision, player first
//! 4. Hostile fire, contact damage, player weapons
//! 5. Combat resolution for every projectile
//! 6. Loss check, then the level objective (survival clock, cleared
//!    training bots or last wave), periodic reap

use glam::Vec2;

use super::actor::Facing;
use super::ai;
use super::collision::split_neighbors;
use super::combat;
use super::director;
use super::events::SimEvent;
use super::level;
use super::state::{NextScene, Phase, SimState};
use super::upgrades::{offer_pool, roll_offer};
use super::weapons;
use crate::error::{SimError, SimResult};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired player direction; any length, normalised before use
    pub movement: Vec2,
    /// Index into the current upgrade offer
    pub choose_upgrade: Option<usize>,
    /// Rebuild the run after a win or loss
    pub restart: bool,
}

/// Advance the simulation by one fixed timestep
pub fn tick(state: &mut SimState, input: &TickInput, dt: f32) -> SimResult<()> {
    match state.phase {
        Phase::Won | Phase::Lost | Phase::Cleared => {
            if input.restart {
                state.restart();
            }
            return Ok(());
        }
        Phase::ChoosingUpgrade => {
            if let Some(index) = input.choose_upgrade {
                if let Err(err) = state.choose_upgrade(index) {
                    log::warn!("Ignoring upgrade choice: {err}");
                }
            }
            return Ok(());
        }
        Phase::Running => {}
    }

    if level_up(state) {
        return Ok(());
    }

    state.armory.verify(&state.actors)?;
    if state.actors.get(state.player).is_none() {
        log::error!("player {} missing from the actor list", state.player);
        return Err(SimError::MissingActor {
            role: "player",
            id: state.player,
        });
    }

    if state.tuning.level.uses_director() {
        director::update(state, dt);
        director::retune_speeds(state);
    }
    ai::drive(state);
    steer_player(state, input.movement);
    move_actors(state, dt);
    clamp_player(state);

    weapons::fire_hostile_shots(state, dt);
    combat::contact_damage(state);
    weapons::run(state, dt);
    combat::resolve_projectiles(state);

    check_outcome(state, dt);

    if state.reap_timer.tick(dt) {
        state.reap();
    }
    state.time_ticks += 1;
    Ok(())
}

/// Take a pending level. Returns true when the upgrade menu opened.
fn level_up(state: &mut SimState) -> bool {
    if !state.progression.try_level_up(&state.tuning.progression) {
        return false;
    }
    let level = state.progression.level;
    log::info!("Level up: {level}");
    state.events.push(SimEvent::LevelUp { level });

    // with the ultimate owned every level is a flat health bump
    if state.unlocks.ultimate {
        let bonus = state.tuning.progression.ultimate_level_hp;
        state.stats.player_max_hp += bonus;
        if let Some(player) = state.actors.get_mut(state.player) {
            player.max_hp += bonus;
            player.heal(bonus);
        }
        return false;
    }

    let pool = offer_pool(&state.stats, &state.unlocks, &state.tuning.upgrades);
    let offer = roll_offer(pool, state.tuning.progression.offer_size, &mut state.rng);
    state.events.push(SimEvent::UpgradeOffered {
        options: offer.clone(),
    });
    state.offer = offer;
    state.phase = Phase::ChoosingUpgrade;
    true
}

fn steer_player(state: &mut SimState, movement: Vec2) {
    let Some(player) = state.actors.get_mut(state.player) else {
        return;
    };
    let dir = movement.normalize_or_zero();
    player.movement = dir;
    if dir != Vec2::ZERO {
        player.facing = Facing::from_vector(dir);
    }
}

/// Advance every actor, the player first and then the rest in id order.
/// Later actors see positions already moved this tick.
fn move_actors(state: &mut SimState, dt: f32) {
    let player = state.actors.index_of(state.player);
    let rest = (0..state.actors.len()).filter(|i| Some(*i) != player);
    let order: Vec<usize> = player.into_iter().chain(rest).collect();

    let map = &state.map;
    let list = state.actors.as_mut_slice();
    for i in order {
        if let Some((actor, neighbors)) = split_neighbors(list, i) {
            actor.advance(&neighbors, map, dt);
        }
    }
}

fn clamp_player(state: &mut SimState) {
    let (min, max) = state.tuning.arena.bounds();
    if let Some(player) = state.actors.get_mut(state.player) {
        player.pos = player.pos.clamp(min, max);
    }
}

/// Death wins a tie with the level objective
fn check_outcome(state: &mut SimState, dt: f32) {
    let dead = state
        .actors
        .get(state.player)
        .is_none_or(|p| !p.is_active() || p.is_dead());
    if dead {
        state.phase = Phase::Lost;
        state.next_scene = Some(NextScene::Lose);
        log::info!("Player died at {:.1}s", state.director.elapsed);
        state.events.push(SimEvent::Lost);
        return;
    }

    state.director.elapsed += dt;
    if !state.tuning.level.uses_director() {
        if level::advance(state) {
            state.phase = Phase::Cleared;
            state.next_scene = Some(NextScene::NextLevel);
            log::info!("Level cleared at {:.1}s", state.director.elapsed);
            state.events.push(SimEvent::LevelCleared);
        }
        return;
    }
    if state.director.elapsed >= state.tuning.director.survival_seconds {
        state.phase = Phase::Won;
        state.next_scene = Some(NextScene::Win);
        log::info!("Survived {:.1}s", state.director.elapsed);
        state.events.push(SimEvent::Won);
    }
}
