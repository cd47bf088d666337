//! Player weapon systems
//!
//! Every weapon is driven from the player's position after motion has been
//! resolved:
//! - Blood bullet: single-target shot at the nearest hostile on a cooldown
//! - Bow: ranged piercing arrows, limited to `bow_range`
//! - Blades: N blades orbiting the player, each striking on its own interval
//! - Shields: orbiting blockers that shove hostiles and eat hostile shots
//! - Aura: periodic damage to everything within a radius
//! - Ultimate: a long beam that wipes out whatever it lands on
//!
//! A weapon with no target in range holds its cooldown rather than
//! wasting a shot.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actor::{Actor, ActorKind, AiKind, AttackKind};
use super::actors::{ActorId, Actors};
use super::animation::Animation;
use super::collision::aabb_overlap;
use super::combat;
use super::events::SimEvent;
use super::state::SimState;
use super::timer::{Cooldown, IntervalTimer};
use super::upgrades::Weapon;
use crate::error::{SimError, SimResult};
use crate::{direction_toward, heading_degrees, orbit_point};

const AURA_FRAMES: u32 = 49;
const AURA_FRAME_SECONDS: f32 = 0.1;
const BOW_IDLE_FRAME: u32 = 104;
const BOW_ATTACK_FRAMES: [u32; 5] = [104, 106, 107, 108, 108];
const BOW_FRAME_SECONDS: f32 = 0.12;
/// Sprite offset of the bow art
const BOW_ANGLE_OFFSET: f32 = 45.0;
/// Hostile shot art points down
const HOSTILE_SHOT_ANGLE_OFFSET: f32 = -90.0;

/// One orbiting blade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blade {
    pub actor: ActorId,
    /// Orbit angle in radians
    pub angle: f32,
    pub timer: IntervalTimer,
    /// Hostiles already struck during the current interval
    pub hit: BTreeSet<ActorId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShieldSlot {
    pub actor: ActorId,
    pub angle: f32,
}

/// Remaining pierce of one arrow in flight
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PierceState {
    pub remaining: u32,
    /// Hostiles this arrow has already damaged
    pub hit: BTreeSet<ActorId>,
}

impl PierceState {
    pub fn new(pierce: u32) -> Self {
        Self {
            remaining: pierce,
            hit: BTreeSet::new(),
        }
    }
}

/// A fired ultimate beam
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Beam {
    pub actor: ActorId,
    pub direction: Vec2,
    pub age: f32,
    /// Damage sweep has run
    pub fired: bool,
    pub hit: BTreeSet<ActorId>,
}

/// Registry of the player's weapon actors.
///
/// Per-instance state (angle, timer, hit set) lives next to the actor id in
/// one record, so a ring rebuild can never leave them out of step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Armory {
    pub emitter: Option<ActorId>,
    pub bow: Option<ActorId>,
    pub aura: Option<ActorId>,
    pub blades: Vec<Blade>,
    pub shields: Vec<ShieldSlot>,
    pub arrows: BTreeMap<ActorId, PierceState>,
    pub aura_timer: IntervalTimer,
    pub beam_cooldown: Cooldown,
    pub beams: Vec<Beam>,
}

impl Default for Armory {
    fn default() -> Self {
        Self {
            emitter: None,
            bow: None,
            aura: None,
            blades: Vec::new(),
            shields: Vec::new(),
            arrows: BTreeMap::new(),
            aura_timer: IntervalTimer::new(0.1),
            beam_cooldown: Cooldown::default(),
            beams: Vec::new(),
        }
    }
}

impl Armory {
    /// Long-lived weapon actors; the reaper leaves these alone
    pub fn owns(&self, id: ActorId) -> bool {
        self.emitter == Some(id)
            || self.bow == Some(id)
            || self.aura == Some(id)
            || self.blades.iter().any(|b| b.actor == id)
            || self.shields.iter().any(|s| s.actor == id)
    }

    /// Every registered weapon actor still resolves
    pub fn verify(&self, actors: &Actors) -> SimResult<()> {
        let singles = [
            ("blood emitter", self.emitter),
            ("bow", self.bow),
            ("aura", self.aura),
        ];
        let rings = self
            .blades
            .iter()
            .map(|b| ("blade", Some(b.actor)))
            .chain(self.shields.iter().map(|s| ("shield", Some(s.actor))));

        for (role, id) in singles.into_iter().chain(rings) {
            if let Some(id) = id {
                if actors.get(id).is_none() {
                    log::error!("{role} {id} missing from the actor list");
                    return Err(SimError::MissingActor { role, id });
                }
            }
        }
        Ok(())
    }
}

/// Nearest live hostile within `radius` of `from`. Ties keep the earliest
/// actor in id order.
pub fn find_nearest_hostile(actors: &Actors, from: Vec2, radius: f32) -> Option<(ActorId, Vec2, f32)> {
    let mut best: Option<(ActorId, Vec2, f32)> = None;
    for actor in actors.iter().filter(|a| a.is_live_hostile()) {
        let dist = actor.pos.distance(from);
        if dist > radius {
            continue;
        }
        if best.is_none_or(|(_, _, d)| dist < d) {
            best = Some((actor.id, actor.pos, dist));
        }
    }
    best
}

fn player_pos(state: &SimState) -> Option<Vec2> {
    state.actors.get(state.player).filter(|p| p.is_active()).map(|p| p.pos)
}

/// Weapon effect actor at `pos` that nothing collides with
fn weapon_actor(id: ActorId, pos: Vec2, scale: Vec2, attack: AttackKind) -> Actor {
    Actor::new(id, ActorKind::Effect, pos, scale)
        .with_attack(attack)
        .with_collider(Vec2::ZERO)
        .passive()
}

/// Grant a weapon family and create its actors
pub fn install(state: &mut SimState, weapon: Weapon) {
    if state.unlocks.owns(weapon) {
        return;
    }
    let origin = player_pos(state).unwrap_or(state.tuning.arena.origin);

    match weapon {
        Weapon::BloodBullet => {
            let interval = state.stats.bullet_cooldown;
            let id = state.actors.spawn(|id| {
                weapon_actor(id, origin, Vec2::ZERO, AttackKind::Projectile).with_cooldown(interval)
            });
            state.armory.emitter = Some(id);
        }
        Weapon::Sword => rebuild_blades(state),
        Weapon::Shield => rebuild_shields(state),
        Weapon::Aura => {
            let size = Vec2::splat(state.stats.aura_radius * 2.0);
            let id = state.actors.spawn(|id| {
                weapon_actor(id, origin, size, AttackKind::Aura)
                    .with_animation(Animation::uniform(AURA_FRAMES, AURA_FRAME_SECONDS))
            });
            state.armory.aura = Some(id);
            state.armory.aura_timer = IntervalTimer::new(state.tuning.weapons.aura_interval);
        }
        Weapon::Bow => {
            let size = Vec2::splat(state.tuning.weapons.bow_size);
            let interval = state.stats.bow_cooldown;
            let anim = Animation::looping(vec![BOW_IDLE_FRAME], BOW_FRAME_SECONDS)
                .with_attack(BOW_ATTACK_FRAMES.to_vec());
            let id = state.actors.spawn(|id| {
                weapon_actor(id, origin + Vec2::new(0.0, 2.0), size, AttackKind::Bow)
                    .with_cooldown(interval)
                    .with_animation(anim)
            });
            state.armory.bow = Some(id);
        }
        Weapon::Ultimate => {
            state.armory.beam_cooldown = Cooldown::new(state.tuning.weapons.beam.interval);
            // the beam replaces both ranged weapons
            for retired in [state.armory.emitter.take(), state.armory.bow.take()]
                .into_iter()
                .flatten()
            {
                if let Some(actor) = state.actors.get_mut(retired) {
                    actor.deactivate();
                }
            }
            state.unlocks.blood_bullet = false;
            state.unlocks.bow = false;
        }
    }

    state.unlocks.set(weapon, true);
    log::info!("Weapon unlocked: {weapon:?}");
    state.events.push(SimEvent::WeaponUnlocked { weapon });
}

/// Replace the blade ring with `sword_count` evenly spaced blades
pub fn rebuild_blades(state: &mut SimState) {
    for blade in state.armory.blades.drain(..) {
        if let Some(actor) = state.actors.get_mut(blade.actor) {
            actor.deactivate();
        }
    }
    let Some(center) = player_pos(state) else {
        return;
    };
    let count = state.stats.sword_count;
    let size = Vec2::splat(state.stats.sword_size);
    let radius = state.tuning.weapons.sword_orbit_radius;
    let interval = state.tuning.weapons.sword_interval;

    for i in 0..count {
        let angle = std::f32::consts::TAU / count as f32 * i as f32;
        let pos = orbit_point(center, radius, angle);
        let id = state
            .actors
            .spawn(|id| weapon_actor(id, pos, size, AttackKind::Melee));
        state.armory.blades.push(Blade {
            actor: id,
            angle,
            timer: IntervalTimer::new(interval),
            hit: BTreeSet::new(),
        });
    }
    log::debug!("Blade ring rebuilt with {count} blades");
}

pub fn resize_blades(state: &mut SimState) {
    let size = Vec2::splat(state.stats.sword_size);
    for blade in &state.armory.blades {
        if let Some(actor) = state.actors.get_mut(blade.actor) {
            actor.scale = size;
        }
    }
}

/// Replace the shield ring with `shield_count` evenly spaced shields
pub fn rebuild_shields(state: &mut SimState) {
    for slot in state.armory.shields.drain(..) {
        if let Some(actor) = state.actors.get_mut(slot.actor) {
            actor.deactivate();
        }
    }
    let Some(center) = player_pos(state) else {
        return;
    };
    let count = state.stats.shield_count;
    let radius = state.stats.shield_orbit_radius;
    let size = state.tuning.weapons.shield_size;
    let collider = Vec2::splat(size * state.tuning.weapons.shield_collider_fraction);

    for i in 0..count {
        let angle = std::f32::consts::TAU / count as f32 * i as f32;
        let pos = orbit_point(center, radius, angle);
        let id = state.actors.spawn(|id| {
            Actor::new(id, ActorKind::Effect, pos, Vec2::splat(size))
                .with_attack(AttackKind::Shield)
                .with_collider(collider)
                .passive()
        });
        state.armory.shields.push(ShieldSlot { actor: id, angle });
    }
    log::debug!("Shield ring rebuilt with {count} shields");
}

pub fn resize_aura(state: &mut SimState) {
    let size = Vec2::splat(state.stats.aura_radius * 2.0);
    if let Some(aura) = state.armory.aura.and_then(|id| state.actors.get_mut(id)) {
        aura.scale = size;
    }
}

/// Push upgraded cooldowns into the live emitters
pub fn retime(state: &mut SimState) {
    let bullet = state.stats.bullet_cooldown;
    let bow = state.stats.bow_cooldown;
    if let Some(emitter) = state.armory.emitter.and_then(|id| state.actors.get_mut(id)) {
        emitter.cooldown.set_interval(bullet);
    }
    if let Some(bow_actor) = state.armory.bow.and_then(|id| state.actors.get_mut(id)) {
        bow_actor.cooldown.set_interval(bow);
    }
}

/// Unlock the ultimate as soon as the loadout qualifies
pub fn check_ultimate(state: &mut SimState) {
    if state.unlocks.ultimate_ready(&state.stats, &state.tuning.upgrades) {
        install(state, Weapon::Ultimate);
    }
}

/// Run every owned weapon for one tick
pub fn run(state: &mut SimState, dt: f32) {
    let Some(player) = player_pos(state) else {
        return;
    };
    check_ultimate(state);
    update_aura(state, player, dt);
    update_shields(state, player, dt);
    update_blades(state, player, dt);
    update_emitter(state, player, dt);
    update_bow(state, player, dt);
    update_beam(state, player, dt);

    let actors = &state.actors;
    state.armory.arrows.retain(|id, _| actors.is_live(*id));
}

pub fn update_aura(state: &mut SimState, player: Vec2, dt: f32) {
    if !state.unlocks.aura {
        return;
    }
    let Some(id) = state.armory.aura else {
        return;
    };
    let radius = state.stats.aura_radius;
    if let Some(aura) = state.actors.get_mut(id) {
        aura.pos = player;
        aura.scale = Vec2::splat(radius * 2.0);
    }
    if !state.armory.aura_timer.tick(dt) {
        return;
    }

    let damage = state.stats.aura_damage;
    let heal = state.tuning.weapons.heal_on_kill;
    let victims: Vec<ActorId> = state
        .actors
        .iter()
        .filter(|a| a.is_live_hostile() && a.pos.distance(player) <= radius)
        .map(|a| a.id)
        .collect();
    for victim in victims {
        if combat::strike(state, victim, damage, AttackKind::Aura).is_kill() {
            combat::heal_player(state, heal);
        }
    }
}

pub fn update_shields(state: &mut SimState, player: Vec2, dt: f32) {
    if state.armory.shields.is_empty() {
        return;
    }
    let radius = state.stats.shield_orbit_radius;
    let weapons = &state.tuning.weapons;
    let speed = weapons.shield_base_orbit_speed * (weapons.shield_base_radius / radius);

    let mut boxes = Vec::with_capacity(state.armory.shields.len());
    for slot in state.armory.shields.iter_mut() {
        slot.angle += speed * dt;
        if let Some(shield) = state.actors.get_mut(slot.actor) {
            shield.pos = orbit_point(player, radius, slot.angle);
            if shield.is_active() && shield.has_collider() {
                boxes.push((shield.pos, shield.half_extents));
            }
        }
    }

    let knockback = state.stats.shield_knockback;
    for i in 0..state.actors.len() {
        let hostile = state.actors.at_mut(i);
        if !hostile.is_live_hostile() || !hostile.has_collider() {
            continue;
        }
        for (pos, half) in &boxes {
            if aabb_overlap(hostile.pos, hostile.half_extents, *pos, *half) {
                let away = (hostile.pos - player).normalize_or_zero();
                hostile.pos += away * knockback * dt;
            }
        }
    }
}

pub fn update_blades(state: &mut SimState, player: Vec2, dt: f32) {
    let weapons = &state.tuning.weapons;
    let radius = weapons.sword_orbit_radius;
    let orbit_speed = weapons.sword_orbit_speed;
    let reach = state.stats.sword_hit_radius(weapons);
    let damage = state.stats.sword_damage(weapons);

    for i in 0..state.armory.blades.len() {
        let victims: Vec<ActorId> = {
            let blade = &mut state.armory.blades[i];
            blade.angle += orbit_speed * dt;
            let pos = orbit_point(player, radius, blade.angle);
            if let Some(actor) = state.actors.get_mut(blade.actor) {
                actor.pos = pos;
                actor.angle = blade.angle.to_degrees();
            }
            if !blade.timer.tick(dt) {
                continue;
            }
            blade.hit.clear();
            state
                .actors
                .iter()
                .filter(|a| a.is_live_hostile() && a.pos.distance(pos) <= reach)
                .filter(|a| blade.hit.insert(a.id))
                .map(|a| a.id)
                .collect()
        };
        for victim in victims {
            combat::strike(state, victim, damage, AttackKind::Melee);
        }
    }
}

pub fn update_emitter(state: &mut SimState, player: Vec2, dt: f32) {
    let Some(id) = state.armory.emitter else {
        return;
    };
    let Some(emitter) = state.actors.get_mut(id) else {
        return;
    };
    emitter.pos = player;
    emitter.cooldown.tick(dt);
    if !emitter.cooldown.is_ready() {
        return;
    }

    let weapons = &state.tuning.weapons;
    let Some((_, target, _)) = find_nearest_hostile(&state.actors, player, weapons.target_search_radius)
    else {
        return;
    };
    let Some(dir) = direction_toward(player, target) else {
        return;
    };

    let size = weapons.bullet_size;
    let collider = Vec2::splat(size * weapons.bullet_collider_fraction);
    let speed = weapons.bullet_speed;
    let lifetime = weapons.bullet_lifetime;
    let owner = state.player;
    let shot = state.actors.spawn(|id| {
        let mut bolt = Actor::new(id, ActorKind::Effect, player, Vec2::splat(size))
            .with_ai(AiKind::Bullet)
            .with_attack(AttackKind::Projectile)
            .with_collider(collider)
            .with_heading(dir)
            .with_speed(speed)
            .with_lifetime(lifetime)
            .with_owner(owner)
            .passive();
        bolt.angle = heading_degrees(dir, 0.0);
        bolt
    });
    if let Some(emitter) = state.actors.get_mut(id) {
        emitter.cooldown.trigger();
    }
    state.events.push(SimEvent::ProjectileFired {
        id: shot,
        kind: AttackKind::Projectile,
    });
}

pub fn update_bow(state: &mut SimState, player: Vec2, dt: f32) {
    let Some(id) = state.armory.bow else {
        return;
    };
    let target = find_nearest_hostile(&state.actors, player, state.tuning.weapons.target_search_radius);
    let Some(bow) = state.actors.get_mut(id) else {
        return;
    };
    bow.pos = player + Vec2::new(0.0, 2.0);
    bow.cooldown.tick(dt);
    if let Some((_, pos, _)) = target {
        bow.angle = heading_degrees(pos - player, BOW_ANGLE_OFFSET);
    }
    if !bow.cooldown.is_ready() {
        return;
    }

    let range = state.stats.bow_range;
    let Some((_, target_pos, dist)) = target.filter(|(_, _, d)| *d > 0.001 && *d <= range) else {
        return;
    };
    let dir = (target_pos - player) / dist;
    bow.cooldown.trigger();
    bow.animation.start_attack();

    let weapons = &state.tuning.weapons;
    let start = player + dir * weapons.arrow_muzzle_offset;
    let size = Vec2::splat(weapons.arrow_size);
    let lifetime = weapons.arrow_lifetime;
    let speed = state.stats.arrow_speed;
    let pierce = state.stats.arrow_pierce;
    let owner = state.player;
    let arrow = state.actors.spawn(|id| {
        let mut arrow = Actor::new(id, ActorKind::Effect, start, size)
            .with_ai(AiKind::Bullet)
            .with_attack(AttackKind::Arrow)
            .with_heading(dir)
            .with_speed(speed)
            .with_lifetime(lifetime)
            .with_owner(owner)
            .passive();
        arrow.angle = heading_degrees(dir, 0.0);
        arrow
    });
    state.armory.arrows.insert(arrow, PierceState::new(pierce));
    state.events.push(SimEvent::ProjectileFired {
        id: arrow,
        kind: AttackKind::Arrow,
    });
}

/// Hostiles inside the beam rectangle cast from `origin` along `dir`
fn beam_victims(actors: &Actors, origin: Vec2, dir: Vec2, length: f32, half_width: f32) -> Vec<ActorId> {
    actors
        .iter()
        .filter(|a| a.is_live_hostile())
        .filter(|a| {
            let to = a.pos - origin;
            let along = to.dot(dir);
            along > 0.0 && along < length && dir.perp_dot(to).abs() < half_width
        })
        .map(|a| a.id)
        .collect()
}

pub fn update_beam(state: &mut SimState, player: Vec2, dt: f32) {
    if !state.unlocks.ultimate {
        return;
    }
    let beam = state.tuning.weapons.beam.clone();

    for i in 0..state.armory.beams.len() {
        let victims = {
            let shot = &mut state.armory.beams[i];
            shot.age += dt;
            if shot.fired || shot.age + crate::consts::TIMER_EPSILON < beam.windup {
                continue;
            }
            shot.fired = true;
            let reach = beam.width + beam.tolerance;
            let mut victims = beam_victims(&state.actors, player, shot.direction, beam.length, reach);
            victims.retain(|id| shot.hit.insert(*id));
            victims
        };
        for victim in victims {
            combat::strike(state, victim, beam.damage, AttackKind::Beam);
        }
    }
    state
        .armory
        .beams
        .retain(|b| !(b.fired && b.age >= beam.lifetime));

    state.armory.beam_cooldown.tick(dt);
    if !state.armory.beam_cooldown.is_ready() {
        return;
    }
    let search = state.tuning.weapons.target_search_radius;
    let Some((_, target, _)) = find_nearest_hostile(&state.actors, player, search) else {
        return;
    };
    let Some(dir) = direction_toward(player, target) else {
        return;
    };
    state.armory.beam_cooldown.trigger();

    let pos = player + dir * beam.length * 0.5;
    let id = state.actors.spawn(|id| {
        let mut effect = weapon_actor(id, pos, Vec2::new(beam.length, beam.width), AttackKind::Beam)
            .with_lifetime(beam.lifetime)
            .with_animation(Animation::uniform(beam.frames, beam.frame_seconds));
        effect.angle = heading_degrees(dir, 0.0);
        effect
    });
    state.armory.beams.push(Beam {
        actor: id,
        direction: dir,
        age: 0.0,
        fired: false,
        hit: BTreeSet::new(),
    });
    log::debug!("Beam {id} fired toward {target}");
    state.events.push(SimEvent::BeamFired { id, direction: dir });
}

/// Flyers shoot straight at the player's position at fire time
pub fn fire_hostile_shots(state: &mut SimState, dt: f32) {
    let Some(target) = state.player_target() else {
        return;
    };
    let hostiles = &state.tuning.hostiles;
    let size = hostiles.flyer_shot_size;
    let collider = Vec2::splat(size * hostiles.flyer_shot_collider_fraction);
    let speed = hostiles.flyer_shot_speed;
    let lifetime = hostiles.flyer_shot_lifetime;

    for i in 0..state.actors.len() {
        let flyer = state.actors.at_mut(i);
        if !flyer.is_live_hostile() || flyer.ai != Some(AiKind::Flyer) {
            continue;
        }
        flyer.cooldown.tick(dt);
        if !flyer.cooldown.is_ready() {
            continue;
        }
        let delta = target.pos - flyer.pos;
        if delta.length_squared() < 0.0001 {
            continue;
        }
        flyer.cooldown.trigger();
        let dir = delta.normalize();
        let (origin, owner) = (flyer.pos, flyer.id);

        let shot = state.actors.spawn(|id| {
            let mut shot = Actor::new(id, ActorKind::Effect, origin, Vec2::splat(size))
                .with_ai(AiKind::Bullet)
                .with_attack(AttackKind::Projectile)
                .with_collider(collider)
                .with_heading(dir)
                .with_speed(speed)
                .with_lifetime(lifetime)
                .with_owner(owner)
                .passive();
            shot.angle = heading_degrees(dir, HOSTILE_SHOT_ANGLE_OFFSET);
            shot
        });
        state.events.push(SimEvent::ProjectileFired {
            id: shot,
            kind: AttackKind::Projectile,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::director;
    use crate::tuning::Tuning;

    /// Quiet arena: no initial hostiles, player at the origin
    fn arena(configure: impl FnOnce(&mut Tuning)) -> SimState {
        let mut tuning = Tuning::default();
        tuning.director.initial_hostiles = 0;
        configure(&mut tuning);
        SimState::with_tuning(7, tuning).unwrap()
    }

    fn place(state: &mut SimState, ai: AiKind, pos: Vec2, hp: i32) -> ActorId {
        let id = director::spawn_hostile_at(state, ai, pos, 1.0);
        state.actors.get_mut(id).unwrap().set_max_hp(hp);
        id
    }

    #[test]
    fn test_nearest_tie_keeps_first() {
        let mut state = arena(|_| {});
        let a = place(&mut state, AiKind::Follower, Vec2::new(50.0, 0.0), 10);
        let _b = place(&mut state, AiKind::Follower, Vec2::new(-50.0, 0.0), 10);
        let (id, _, dist) = find_nearest_hostile(&state.actors, Vec2::ZERO, 600.0).unwrap();
        assert_eq!(id, a);
        assert!((dist - 50.0).abs() < 1e-5);
        assert!(find_nearest_hostile(&state.actors, Vec2::ZERO, 10.0).is_none());
    }

    #[test]
    fn test_aura_kills_in_one_second() {
        let mut state = arena(|t| {
            t.unlocks.aura = true;
            t.loadout.aura_damage = 5;
        });
        let victim = place(&mut state, AiKind::Wanderer, Vec2::new(20.0, 0.0), 50);
        for _ in 0..60 {
            update_aura(&mut state, Vec2::ZERO, SIM_DT);
        }
        let actor = state.actors.get(victim).unwrap();
        assert_eq!(actor.hp, 0);
        assert!(!actor.is_active());
        assert_eq!(state.progression.kills.total, 1);
    }

    #[test]
    fn test_aura_scale_tracks_radius() {
        let mut state = arena(|t| t.unlocks.aura = true);
        state.stats.aura_radius = 85.0;
        update_aura(&mut state, Vec2::new(3.0, 4.0), SIM_DT);
        let aura = state.actors.get(state.armory.aura.unwrap()).unwrap();
        assert_eq!(aura.scale, Vec2::splat(170.0));
        assert_eq!(aura.pos, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn test_blade_hits_floor_elapsed_over_interval() {
        let mut state = arena(|t| {
            t.unlocks.sword = true;
            t.loadout.sword_count = 1;
            t.weapons.sword_orbit_speed = 0.0;
        });
        // blade 0 sits at angle 0, radius 30
        let victim = place(&mut state, AiKind::Wanderer, Vec2::new(30.0, 0.0), 100_000);
        let damage = state.stats.sword_damage(&state.tuning.weapons);
        for _ in 0..100 {
            update_blades(&mut state, Vec2::ZERO, SIM_DT);
        }
        let lost = 100_000 - state.actors.get(victim).unwrap().hp;
        // 100 ticks = 1.666 s, interval 0.25 s
        assert_eq!(lost, 6 * damage);
    }

    #[test]
    fn test_emitter_holds_without_target() {
        let mut state = arena(|_| {});
        for _ in 0..120 {
            update_emitter(&mut state, Vec2::ZERO, SIM_DT);
        }
        let emitter = state.actors.get(state.armory.emitter.unwrap()).unwrap();
        assert!(emitter.cooldown.is_ready());
        assert!(!state.actors.iter().any(|a| a.is_projectile()));

        place(&mut state, AiKind::Follower, Vec2::new(0.0, 100.0), 10);
        update_emitter(&mut state, Vec2::ZERO, SIM_DT);
        let shots: Vec<&Actor> = state.actors.iter().filter(|a| a.is_projectile()).collect();
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].owner, Some(state.player));
        assert!((shots[0].movement - Vec2::new(0.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_bow_respects_range() {
        let mut state = arena(|t| t.unlocks.bow = true);
        place(&mut state, AiKind::Follower, Vec2::new(300.0, 0.0), 10);
        for _ in 0..180 {
            update_bow(&mut state, Vec2::ZERO, SIM_DT);
        }
        assert!(state.armory.arrows.is_empty());

        place(&mut state, AiKind::Follower, Vec2::new(100.0, 0.0), 10);
        update_bow(&mut state, Vec2::ZERO, SIM_DT);
        assert_eq!(state.armory.arrows.len(), 1);
        let (id, pierce) = state.armory.arrows.iter().next().unwrap();
        assert_eq!(pierce.remaining, 1);
        assert_eq!(state.actors.get(*id).unwrap().pos, Vec2::new(16.0, 0.0));
    }

    #[test]
    fn test_shield_ring_rebuild_and_knockback() {
        let mut state = arena(|t| t.unlocks.shield = true);
        assert_eq!(state.armory.shields.len(), 1);
        state.stats.shield_count = 3;
        rebuild_shields(&mut state);
        assert_eq!(state.armory.shields.len(), 3);
        assert_eq!(state.actors.iter().filter(|a| a.attack == Some(AttackKind::Shield) && a.is_active()).count(), 3);
        assert!(state.armory.verify(&state.actors).is_ok());

        // hostile parked on the first shield gets shoved outward
        let shield_pos = orbit_point(Vec2::ZERO, state.stats.shield_orbit_radius, 0.0);
        let victim = place(&mut state, AiKind::Follower, shield_pos, 10);
        update_shields(&mut state, Vec2::ZERO, 0.0);
        let moved = state.actors.get(victim).unwrap().pos;
        assert_eq!(moved, shield_pos);
        update_shields(&mut state, Vec2::ZERO, 0.5);
        assert!(state.actors.get(victim).unwrap().pos.x > shield_pos.x);
    }

    #[test]
    fn test_ultimate_retires_ranged_weapons() {
        let mut state = arena(|t| {
            t.unlocks.bow = true;
        });
        let emitter = state.armory.emitter.unwrap();
        let bow = state.armory.bow.unwrap();
        install(&mut state, Weapon::Ultimate);
        assert!(state.unlocks.ultimate);
        assert!(!state.unlocks.blood_bullet && !state.unlocks.bow);
        assert!(state.armory.emitter.is_none() && state.armory.bow.is_none());
        assert!(!state.actors.is_live(emitter) && !state.actors.is_live(bow));
        state.reap();
        assert!(state.actors.get(emitter).is_none());
    }

    #[test]
    fn test_beam_hits_each_hostile_once() {
        let mut state = arena(|t| t.unlocks.ultimate = true);
        let near = place(&mut state, AiKind::Follower, Vec2::new(100.0, 0.0), 5000);
        let far = place(&mut state, AiKind::Follower, Vec2::new(350.0, -30.0), 5000);
        let behind = place(&mut state, AiKind::Follower, Vec2::new(-150.0, 0.0), 5000);
        let off_axis = place(&mut state, AiKind::Follower, Vec2::new(200.0, 90.0), 5000);
        // 1 s cooldown, 0.12 s wind-up, then fizzle out
        for _ in 0..90 {
            update_beam(&mut state, Vec2::ZERO, SIM_DT);
        }
        let hp = |id| state.actors.get(id).unwrap().hp;
        assert_eq!(hp(near), 4000);
        assert_eq!(hp(far), 4000);
        assert_eq!(hp(behind), 5000);
        assert_eq!(hp(off_axis), 5000);
    }

    #[test]
    fn test_flyer_fires_after_interval() {
        let mut state = arena(|_| {});
        let flyer = place(&mut state, AiKind::Flyer, Vec2::new(0.0, -100.0), 10);
        for _ in 0..209 {
            fire_hostile_shots(&mut state, SIM_DT);
        }
        assert!(!state.actors.iter().any(|a| a.is_projectile()));
        fire_hostile_shots(&mut state, SIM_DT);
        let shot = state.actors.iter().find(|a| a.is_projectile()).unwrap();
        assert_eq!(shot.owner, Some(flyer));
        assert!((shot.movement - Vec2::new(0.0, 1.0)).length() < 1e-5);
    }
}
