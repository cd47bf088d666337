//! Spawn director and difficulty curve
//!
//! Difficulty is a pure function of elapsed survival time and the player's
//! summed weapon level:
//! - time factor ramps 1.0 -> `max_time_multiplier` over the run
//! - power factor adds up to `max_power_bonus` once the grace period is over
//! - the product scales spawned HP; speed has its own capped ramp
//!
//! The live hostile count never exceeds the cap. Bursts stop early at the
//! cap, and a full arena reclaims dead hostiles before anything else.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::actor::{Actor, ActorKind, AiKind, Facing};
use super::actors::ActorId;
use super::animation::Animation;
use super::events::SimEvent;
use super::state::SimState;
use crate::consts::DEFAULT_SPEED;
use crate::tuning::{DirectorTuning, HostileProfile};

/// Spawn bookkeeping. `elapsed` is the run's survival clock.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Director {
    pub elapsed: f32,
    pub spawn_timer: f32,
    /// Indices into `DirectorTuning::waves` that already went out
    pub waves_spawned: Vec<usize>,
}

/// 1.0 at the start, `max_time_multiplier` at the survival time
pub fn time_factor(t: f32, tuning: &DirectorTuning) -> f32 {
    let progress = (t / tuning.survival_seconds).clamp(0.0, 1.0);
    1.0 + progress * (tuning.max_time_multiplier - 1.0)
}

/// Weapon-power scaling; flat 1.0 during the grace period
pub fn power_factor(t: f32, weapon_level: u32, tuning: &DirectorTuning) -> f32 {
    if t <= tuning.power_grace_seconds {
        return 1.0;
    }
    let bonus = (weapon_level as f32 * tuning.power_per_level).min(tuning.max_power_bonus);
    1.0 + bonus
}

pub fn difficulty(t: f32, weapon_level: u32, tuning: &DirectorTuning) -> f32 {
    time_factor(t, tuning) * power_factor(t, weapon_level, tuning)
}

/// HP scale for a fresh spawn; the late surge overrides the curve
pub fn hp_multiplier(t: f32, difficulty: f32, tuning: &DirectorTuning) -> f32 {
    if t >= tuning.late_surge_at {
        tuning.late_surge_hp_multiplier
    } else {
        difficulty
    }
}

pub fn speed_multiplier(t: f32, ultimate: bool, tuning: &DirectorTuning) -> f32 {
    let max = if ultimate {
        tuning.speed_multiplier_max_ultimate
    } else {
        tuning.speed_multiplier_max
    };
    let start = tuning.speed_multiplier_start;
    (start + t / tuning.survival_seconds * (max - start)).min(max)
}

/// Seconds between bursts, shrinking to a floor
pub fn spawn_interval(t: f32, tuning: &DirectorTuning) -> f32 {
    let interval =
        tuning.base_spawn_interval - t / tuning.survival_seconds * tuning.spawn_interval_reduction;
    interval.max(tuning.min_spawn_interval)
}

/// Hostiles per burst: the last step whose threshold `t` is strictly past
pub fn burst_size(t: f32, tuning: &DirectorTuning) -> u32 {
    let first = tuning.burst_steps.first().map_or(1, |s| s.count);
    tuning
        .burst_steps
        .iter()
        .filter(|step| t > step.after)
        .last()
        .map_or(first, |step| step.count)
}

pub fn hostile_cap(ultimate: bool, tuning: &DirectorTuning) -> usize {
    if ultimate {
        tuning.hostile_cap_ultimate
    } else {
        tuning.hostile_cap
    }
}

pub fn flyer_cap(t: f32, tuning: &DirectorTuning) -> usize {
    if t >= tuning.late_mix_at {
        tuning.flyer_cap_late
    } else {
        tuning.flyer_cap
    }
}

/// HP scale of a scripted follower wave
pub fn wave_difficulty(t: f32, weapon_level: u32, tuning: &DirectorTuning) -> f32 {
    let ramp = 1.0 + t / tuning.survival_seconds * tuning.wave_difficulty_slope;
    ramp * power_factor(t, weapon_level, tuning) * tuning.wave_difficulty_scale
}

/// Weighted type roll. Once flyers hit their cap the capped mix takes over.
pub fn roll_hostile(t: f32, live_flyers: usize, tuning: &DirectorTuning, rng: &mut Pcg32) -> AiKind {
    let mix = if live_flyers >= flyer_cap(t, tuning) {
        &tuning.capped_mix
    } else if t >= tuning.late_mix_at {
        &tuning.late_mix
    } else {
        &tuning.early_mix
    };
    let roll = rng.random_range(0..mix.total().max(1));
    mix.pick(roll)
}

/// Movement speed for a hostile of `profile` under the current multiplier
pub fn hostile_speed(profile: &HostileProfile, multiplier: f32) -> f32 {
    ((DEFAULT_SPEED * profile.speed_factor).floor() * multiplier).floor()
}

/// Random point in the spawn box at least the safe radius from the player.
/// Gives up after `spawn_attempts` rolls and keeps the last one.
pub fn spawn_position(state: &mut SimState) -> Vec2 {
    let player = state
        .player_target()
        .map_or(state.tuning.arena.origin, |target| target.pos);
    let arena = &state.tuning.arena;
    let center = arena.origin;
    let half = arena.spawn_half_extent();
    let (min_x, max_x) = ((center.x - half.x) as i32, (center.x + half.x) as i32);
    let (min_y, max_y) = ((center.y - half.y) as i32, (center.y + half.y) as i32);

    let mut pos = center;
    for _ in 0..arena.spawn_attempts.max(1) {
        pos = Vec2::new(
            state.rng.random_range(min_x..=max_x) as f32,
            state.rng.random_range(min_y..=max_y) as f32,
        );
        if pos.distance(player) >= arena.spawn_safe_radius {
            return pos;
        }
    }
    log::warn!(
        "No spawn point {} units clear of the player after {} attempts",
        arena.spawn_safe_radius,
        arena.spawn_attempts
    );
    pos
}

/// Spawn one hostile at a random position
pub fn spawn_hostile(state: &mut SimState, ai: AiKind, hp_multiplier: f32) -> ActorId {
    let pos = spawn_position(state);
    spawn_hostile_at(state, ai, pos, hp_multiplier)
}

/// Spawn one hostile of `ai` at `pos` with its HP scaled by `hp_multiplier`
pub fn spawn_hostile_at(state: &mut SimState, ai: AiKind, pos: Vec2, hp_multiplier: f32) -> ActorId {
    let hostiles = &state.tuning.hostiles;
    let profile = hostiles.profile(ai);
    let multiplier = speed_multiplier(
        state.director.elapsed,
        state.unlocks.ultimate,
        &state.tuning.director,
    );
    let speed = hostile_speed(profile, multiplier);
    let hp = ((profile.base_hp as f32 * hp_multiplier) as i32).max(1);
    let scale = Vec2::splat(profile.scale);
    let collider = scale * profile.collider_fraction;
    let animation = Animation::uniform(profile.walk_frames, hostiles.frame_seconds);
    let fire_interval = hostiles.flyer_fire_interval;

    let id = state.actors.spawn(|id| {
        let mut hostile = Actor::new(id, ActorKind::Hostile, pos, scale)
            .with_ai(ai)
            .with_collider(collider)
            .with_hp(hp)
            .with_speed(speed)
            .with_animation(animation);
        if ai == AiKind::Flyer {
            hostile = hostile.with_cooldown(fire_interval);
            hostile.head(Facing::Down);
        } else {
            hostile.head(Facing::Right);
        }
        hostile
    });
    log::debug!("Spawned {ai:?} {id} at ({:.0}, {:.0}) with {hp} hp", pos.x, pos.y);
    state.events.push(SimEvent::HostileSpawned { id, ai, pos });
    id
}

fn at_cap(state: &SimState) -> bool {
    let cap = hostile_cap(state.unlocks.ultimate, &state.tuning.director);
    state.actors.live_hostiles() >= cap
}

/// Opening population: uniformly random types at base strength
pub fn spawn_initial(state: &mut SimState) {
    for _ in 0..state.tuning.director.initial_hostiles {
        if at_cap(state) {
            break;
        }
        let ai = match state.rng.random_range(0..3) {
            0 => AiKind::Wanderer,
            1 => AiKind::Flyer,
            _ => AiKind::Follower,
        };
        spawn_hostile(state, ai, 1.0);
    }
}

fn spawn_waves(state: &mut SimState, t: f32, weapon_level: u32) {
    let due: Vec<(usize, f32, u32)> = state
        .tuning
        .director
        .waves
        .iter()
        .enumerate()
        .filter(|(i, wave)| t >= wave.at && !state.director.waves_spawned.contains(i))
        .map(|(i, wave)| (i, wave.at, wave.followers))
        .collect();

    for (index, at, followers) in due {
        state.director.waves_spawned.push(index);
        let tuning = &state.tuning.director;
        let multiplier = hp_multiplier(t, wave_difficulty(t, weapon_level, tuning), tuning);
        let mut count = 0;
        for _ in 0..followers {
            if at_cap(state) {
                break;
            }
            spawn_hostile(state, AiKind::Follower, multiplier);
            count += 1;
        }
        log::info!("Wave at {at:.0}s: {count} followers");
        state.events.push(SimEvent::WaveSpawned { at, count });
    }
}

/// One tick of spawning: scripted waves, cap housekeeping, then the burst
/// timer
pub fn update(state: &mut SimState, dt: f32) {
    let t = state.director.elapsed;
    let weapon_level = state.stats.total_weapon_level();

    spawn_waves(state, t, weapon_level);

    if at_cap(state) {
        let removed = state.actors.reap_hostiles();
        if !removed.is_empty() {
            state.progression.forget(&removed);
            log::debug!("Hostile cap reached, reclaimed {} dead", removed.len());
        }
    }

    state.director.spawn_timer += dt;
    if state.director.spawn_timer < spawn_interval(t, &state.tuning.director) {
        return;
    }
    state.director.spawn_timer = 0.0;

    let tuning = &state.tuning.director;
    let multiplier = hp_multiplier(t, difficulty(t, weapon_level, tuning), tuning);
    for _ in 0..burst_size(t, tuning) {
        if at_cap(state) {
            break;
        }
        let live_flyers = state.actors.live_of(AiKind::Flyer);
        let ai = roll_hostile(t, live_flyers, &state.tuning.director, &mut state.rng);
        spawn_hostile(state, ai, multiplier);
    }
}

/// Reset every live hostile's speed to its kind's base times the current
/// multiplier
pub fn retune_speeds(state: &mut SimState) {
    let multiplier = speed_multiplier(
        state.director.elapsed,
        state.unlocks.ultimate,
        &state.tuning.director,
    );
    let hostiles = &state.tuning.hostiles;
    for actor in state.actors.as_mut_slice() {
        if !actor.is_live_hostile() {
            continue;
        }
        if let Some(ai) = actor.ai {
            actor.speed = hostile_speed(hostiles.profile(ai), multiplier);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::tuning::Tuning;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn quiet(configure: impl FnOnce(&mut Tuning)) -> SimState {
        let mut tuning = Tuning::default();
        tuning.director.initial_hostiles = 0;
        configure(&mut tuning);
        SimState::with_tuning(3, tuning).unwrap()
    }

    #[test]
    fn test_difficulty_curve() {
        let d = DirectorTuning::default();
        assert_eq!(time_factor(0.0, &d), 1.0);
        assert!((time_factor(60.0, &d) - 2.5).abs() < 1e-5);
        assert!((time_factor(120.0, &d) - 4.0).abs() < 1e-5);

        assert_eq!(power_factor(10.0, 10, &d), 1.0);
        assert!((power_factor(40.0, 3, &d) - 1.3).abs() < 1e-5);
        // bonus caps at +100 %
        assert!((power_factor(40.0, 25, &d) - 2.0).abs() < 1e-5);
        assert!((difficulty(120.0, 25, &d) - 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_hp_surge_and_speed_ramp() {
        let d = DirectorTuning::default();
        assert_eq!(hp_multiplier(89.0, 3.0, &d), 3.0);
        assert_eq!(hp_multiplier(90.0, 3.0, &d), 12.0);

        assert!((speed_multiplier(0.0, false, &d) - 0.8).abs() < 1e-5);
        assert!((speed_multiplier(120.0, false, &d) - 1.3).abs() < 1e-5);
        assert!((speed_multiplier(500.0, false, &d) - 1.3).abs() < 1e-5);
        assert!((speed_multiplier(60.0, true, &d) - 1.65).abs() < 1e-5);
    }

    #[test]
    fn test_spawn_cadence() {
        let d = DirectorTuning::default();
        assert!((spawn_interval(0.0, &d) - 2.0).abs() < 1e-5);
        assert!((spawn_interval(60.0, &d) - 1.25).abs() < 1e-5);
        assert!((spawn_interval(200.0, &d) - 0.5).abs() < 1e-5);

        assert_eq!(burst_size(0.0, &d), 2);
        assert_eq!(burst_size(30.0, &d), 2);
        assert_eq!(burst_size(30.5, &d), 3);
        assert_eq!(burst_size(61.0, &d), 4);
        assert_eq!(burst_size(95.0, &d), 5);
    }

    #[test]
    fn test_caps_and_wave_difficulty() {
        let d = DirectorTuning::default();
        assert_eq!(hostile_cap(false, &d), 80);
        assert_eq!(hostile_cap(true, &d), 100);
        assert_eq!(flyer_cap(59.0, &d), 5);
        assert_eq!(flyer_cap(60.0, &d), 10);
        // (1 + 2 * 0.5) * 2.0 * 0.7
        assert!((wave_difficulty(60.0, 10, &d) - 2.8).abs() < 1e-4);
    }

    #[test]
    fn test_flyer_cap_blocks_flyers() {
        let d = DirectorTuning::default();
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..300 {
            assert_ne!(roll_hostile(10.0, 5, &d, &mut rng), AiKind::Flyer);
            assert_ne!(roll_hostile(70.0, 10, &d, &mut rng), AiKind::Flyer);
        }
        let flyers = (0..300)
            .filter(|_| roll_hostile(70.0, 0, &d, &mut rng) == AiKind::Flyer)
            .count();
        assert!(flyers > 0);
    }

    #[test]
    fn test_spawned_hostile_stats() {
        let mut state = quiet(|_| {});
        let follower = spawn_hostile_at(&mut state, AiKind::Follower, Vec2::new(200.0, 0.0), 2.0);
        let f = state.actors.get(follower).unwrap();
        assert_eq!(f.max_hp, 50);
        assert_eq!(f.half_extents, Vec2::splat(12.5));
        // floor(50 * 0.3) * 0.8
        assert_eq!(f.speed, 12.0);

        let flyer = spawn_hostile_at(&mut state, AiKind::Flyer, Vec2::new(-200.0, 0.0), 0.01);
        let f = state.actors.get(flyer).unwrap();
        assert_eq!(f.max_hp, 1);
        assert_eq!(f.facing, Facing::Down);
        assert!((f.cooldown.interval() - 3.5).abs() < 1e-6);
        assert!(matches!(
            state.events.last(),
            Some(SimEvent::HostileSpawned { ai: AiKind::Flyer, .. })
        ));
    }

    #[test]
    fn test_spawn_positions_keep_clear_of_player() {
        let mut state = quiet(|_| {});
        let half = state.tuning.arena.spawn_half_extent();
        for _ in 0..100 {
            let pos = spawn_position(&mut state);
            assert!(pos.length() >= 150.0);
            assert!(pos.x.abs() <= half.x && pos.y.abs() <= half.y);
        }
    }

    #[test]
    fn test_spawn_position_search_gives_up() {
        let mut state = quiet(|t| t.arena.spawn_safe_radius = 10_000.0);
        let half = state.tuning.arena.spawn_half_extent();
        let pos = spawn_position(&mut state);
        assert!(pos.x.abs() <= half.x && pos.y.abs() <= half.y);
    }

    #[test]
    fn test_initial_population() {
        let state = SimState::new(21);
        assert_eq!(state.actors.live_hostiles(), 5);
    }

    #[test]
    fn test_wave_spawns_once() {
        let mut state = quiet(|_| {});
        state.director.elapsed = 60.0;
        update(&mut state, SIM_DT);
        assert_eq!(state.actors.live_of(AiKind::Follower), 20);
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, SimEvent::WaveSpawned { count: 20, .. })));

        update(&mut state, SIM_DT);
        assert_eq!(state.actors.live_of(AiKind::Follower), 20);
    }

    #[test]
    fn test_full_arena_reclaims_dead() {
        let mut state = quiet(|t| {
            t.director.hostile_cap = 2;
            t.director.hostile_cap_ultimate = 2;
        });
        spawn_hostile_at(&mut state, AiKind::Follower, Vec2::new(300.0, 0.0), 1.0);
        spawn_hostile_at(&mut state, AiKind::Follower, Vec2::new(-300.0, 0.0), 1.0);
        let dead = spawn_hostile_at(&mut state, AiKind::Wanderer, Vec2::new(0.0, 200.0), 1.0);
        crate::sim::combat::strike(&mut state, dead, 1000, crate::sim::AttackKind::Aura);
        assert!(state.progression.was_granted(dead));

        update(&mut state, SIM_DT);
        assert!(state.actors.get(dead).is_none());
        assert!(!state.progression.was_granted(dead));
        assert_eq!(state.actors.live_hostiles(), 2);
    }

    #[test]
    fn test_retune_tracks_clock() {
        let mut state = quiet(|_| {});
        let id = spawn_hostile_at(&mut state, AiKind::Wanderer, Vec2::new(300.0, 0.0), 1.0);
        state.director.elapsed = 120.0;
        retune_speeds(&mut state);
        // floor(50 * 0.4) * 1.3
        assert_eq!(state.actors.get(id).unwrap().speed, 26.0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_spawn_cap_holds(cap in 1usize..12, start in 0.0f32..119.0, ticks in 1usize..400) {
            let mut state = quiet(|t| {
                t.director.hostile_cap = cap;
                t.director.hostile_cap_ultimate = cap;
                t.director.initial_hostiles = 20;
            });
            prop_assert!(state.actors.live_hostiles() <= cap);
            state.director.elapsed = start;
            for _ in 0..ticks {
                update(&mut state, 0.1);
                state.director.elapsed += 0.1;
                prop_assert!(state.actors.live_hostiles() <= cap);
            }
        }
    }
}
