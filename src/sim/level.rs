//! Level objectives
//!
//! Survival levels hand the arena to the director. Training and wave levels
//! place their hostiles by hand and finish when the field is clear:
//! - training: every practice bot is down
//! - waves: the last scripted wave is down; earlier ones release the next

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actor::{Actor, ActorKind, AiKind, Facing};
use super::animation::Animation;
use super::director;
use super::events::SimEvent;
use super::state::SimState;
use crate::tuning::{LevelMode, Squad};

/// Progress through a scripted level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelProgress {
    /// 1-based wave on the field; 0 outside wave levels
    pub wave: usize,
    pub cleared: bool,
}

/// Opening population for the configured mode
pub fn populate(state: &mut SimState) {
    match state.tuning.level.clone() {
        LevelMode::Survival => director::spawn_initial(state),
        LevelMode::Training { bots } => {
            let placed = spawn_squad(state, &bots);
            log::info!("Training level: {placed} bots placed");
        }
        LevelMode::Waves { waves } => {
            if let Some(first) = waves.first() {
                release_wave(state, 1, first);
            }
        }
    }
}

/// Place every member of `squad` around the arena origin. Returns how many
/// were spawned.
pub fn spawn_squad(state: &mut SimState, squad: &Squad) -> u32 {
    let origin = state.tuning.arena.origin;
    let frames = state.tuning.hostiles.profile(squad.ai).walk_frames;
    let frame_seconds = state.tuning.hostiles.frame_seconds;

    for i in 0..squad.count {
        let pos = origin + squad.offset(i);
        let ai = squad.ai;
        let id = state.actors.spawn(|id| {
            let mut hostile = Actor::new(id, ActorKind::Hostile, pos, Vec2::splat(squad.scale))
                .with_ai(ai)
                .with_collider(Vec2::splat(squad.collider))
                .with_hp(squad.hp)
                .with_speed(squad.speed)
                .with_bounty(squad.experience)
                .with_animation(Animation::uniform(frames, frame_seconds));
            if ai == AiKind::Flyer {
                hostile = hostile.with_cooldown(squad.fire_interval);
                hostile.head(Facing::Down);
            } else {
                hostile.head(Facing::Right);
            }
            hostile
        });
        state.events.push(SimEvent::HostileSpawned { id, ai, pos });
    }
    squad.count
}

fn release_wave(state: &mut SimState, wave: usize, squad: &Squad) {
    let count = spawn_squad(state, squad);
    state.stage.wave = wave;
    log::info!("Wave {wave}: {count} {:?}", squad.ai);
    state.events.push(SimEvent::WaveReleased { wave, count });
}

/// Practice bots knocked down so far
pub fn bots_downed(state: &SimState) -> u32 {
    match &state.tuning.level {
        LevelMode::Training { bots } => {
            bots.count.saturating_sub(state.actors.live_hostiles() as u32)
        }
        _ => 0,
    }
}

/// Check the level objective once per tick. Releases the next wave when
/// one is beaten; true once the level is cleared.
pub fn advance(state: &mut SimState) -> bool {
    if state.stage.cleared {
        return true;
    }
    if state.tuning.level.uses_director() || state.actors.live_hostiles() > 0 {
        return false;
    }

    if let LevelMode::Waves { waves } = &state.tuning.level {
        let next = state.stage.wave;
        if let Some(squad) = waves.get(next).cloned() {
            release_wave(state, next + 1, &squad);
            return false;
        }
    }
    state.stage.cleared = true;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::combat::strike;
    use crate::sim::AttackKind;
    use crate::tuning::Tuning;

    fn level(mode: LevelMode) -> SimState {
        let mut tuning = Tuning::default();
        tuning.level = mode;
        SimState::with_tuning(21, tuning).unwrap()
    }

    fn knock_out_hostiles(state: &mut SimState) {
        let ids: Vec<_> = state
            .actors
            .iter()
            .filter(|a| a.is_live_hostile())
            .map(|a| a.id)
            .collect();
        for id in ids {
            strike(state, id, 10_000, AttackKind::Melee);
        }
    }

    #[test]
    fn test_training_places_static_bots() {
        let state = level(LevelMode::training());
        assert_eq!(state.actors.live_hostiles(), 10);
        let bots: Vec<&Actor> = state.actors.iter().filter(|a| a.is_hostile()).collect();
        assert_eq!(bots[0].pos, Vec2::new(-150.0, -100.0));
        assert_eq!(bots[9].pos, Vec2::new(150.0, -25.0));
        assert!(bots.iter().all(|b| b.speed == 0.0 && b.hp == 30));
        assert_eq!(bots[0].half_extents, Vec2::splat(10.0));
        assert_eq!(bots_downed(&state), 0);
    }

    #[test]
    fn test_training_bounty_overrides_kind() {
        let mut state = level(LevelMode::training());
        let bot = state.actors.iter().find(|a| a.is_hostile()).unwrap().id;
        strike(&mut state, bot, 100, AttackKind::Melee);
        assert_eq!(state.progression.experience, 10);
        assert_eq!(bots_downed(&state), 1);
    }

    #[test]
    fn test_waves_release_in_order() {
        let mut state = level(LevelMode::waves());
        assert_eq!(state.stage.wave, 1);
        assert_eq!(state.actors.live_of(AiKind::Wanderer), 3);
        assert!(!advance(&mut state));

        knock_out_hostiles(&mut state);
        assert!(!advance(&mut state));
        assert_eq!(state.stage.wave, 2);
        assert_eq!(state.actors.live_of(AiKind::Flyer), 2);

        knock_out_hostiles(&mut state);
        assert!(!advance(&mut state));
        assert_eq!(state.stage.wave, 3);
        assert_eq!(state.actors.live_of(AiKind::Follower), 3);

        knock_out_hostiles(&mut state);
        assert!(advance(&mut state));
        assert!(state.stage.cleared);
        let released = state
            .events
            .iter()
            .filter(|e| matches!(e, SimEvent::WaveReleased { .. }))
            .count();
        assert_eq!(released, 3);
    }

    #[test]
    fn test_survival_never_clears() {
        let mut tuning = Tuning::default();
        tuning.director.initial_hostiles = 0;
        let mut state = SimState::with_tuning(4, tuning).unwrap();
        assert_eq!(state.actors.live_hostiles(), 0);
        assert!(!advance(&mut state));
        assert_eq!(state.stage, LevelProgress::default());
    }
}
