//! Combat resolution
//!
//! Runs once per tick after motion and weapon fire. Every active projectile
//! is classified by owner:
//! - player shots look for live hostiles (arrows pierce, bullets stop)
//! - hostile shots only ever touch player shields and the player
//!
//! Damage goes through `strike`, which pays experience out exactly once per
//! dead hostile no matter how many systems land the killing blow.

use super::actor::{AiKind, AttackKind, DamageOutcome};
use super::actors::ActorId;
use super::collision::overlaps;
use super::events::SimEvent;
use super::state::SimState;

/// Damage one actor and credit the kill if this hit finished a hostile
pub fn strike(state: &mut SimState, victim: ActorId, damage: i32, source: AttackKind) -> DamageOutcome {
    let Some(actor) = state.actors.get_mut(victim) else {
        return DamageOutcome::Ignored;
    };
    let outcome = actor.take_damage(damage);
    if outcome.is_kill() && actor.is_hostile() {
        let (ai, bounty) = (actor.ai, actor.bounty);
        credit_kill(state, victim, ai, bounty, source);
    }
    outcome
}

fn credit_kill(state: &mut SimState, id: ActorId, ai: Option<AiKind>, bounty: Option<u32>, source: AttackKind) {
    let experience = bounty
        .or_else(|| ai.map(|ai| state.tuning.hostiles.profile(ai).experience))
        .unwrap_or(0);
    if !state.progression.record_kill(id, ai, experience) {
        return;
    }
    log::debug!("Hostile {id} killed by {source:?} (+{experience} exp)");
    if let Some(ai) = ai {
        state.events.push(SimEvent::HostileKilled {
            id,
            ai,
            by: source,
            experience,
        });
    }
}

/// Damage the player, honouring the invincibility window
pub fn hurt_player(state: &mut SimState, damage: i32) -> DamageOutcome {
    let Some(player) = state.actors.get_mut(state.player) else {
        return DamageOutcome::Ignored;
    };
    let outcome = player.take_damage(damage);
    if outcome != DamageOutcome::Ignored {
        let hp = player.hp;
        state.events.push(SimEvent::PlayerHurt { damage, hp });
    }
    outcome
}

pub fn heal_player(state: &mut SimState, amount: i32) -> i32 {
    state
        .actors
        .get_mut(state.player)
        .map_or(0, |player| player.heal(amount))
}

/// Every live hostile touching the player deals its contact damage
pub fn contact_damage(state: &mut SimState) {
    let Some(player) = state.actors.get(state.player).filter(|p| p.is_active()) else {
        return;
    };
    let hits: Vec<i32> = state
        .actors
        .iter()
        .filter(|a| a.is_live_hostile() && overlaps(player, a))
        .map(|a| a.ai.map_or(0, |ai| state.tuning.hostiles.profile(ai).contact_damage))
        .collect();
    for damage in hits {
        hurt_player(state, damage);
    }
}

/// Live hostiles a player shot is touching, in id order
fn player_shot_victims(state: &SimState, index: usize) -> Vec<ActorId> {
    let shot = state.actors.at(index);
    state
        .actors
        .iter()
        .filter(|other| other.is_live_hostile() && Some(other.id) != shot.owner && overlaps(shot, other))
        .map(|other| other.id)
        .collect()
}

/// Arrows carry their pierce in the armory. One without a record was never
/// fired by the bow and is dropped.
fn resolve_arrow(state: &mut SimState, index: usize) {
    let shot_id = state.actors.at(index).id;
    if !state.armory.arrows.contains_key(&shot_id) {
        log::warn!("arrow {shot_id} has no pierce record, dropping it");
        state.actors.at_mut(index).deactivate();
        return;
    }
    let damage = state.tuning.weapons.arrow_damage;

    for victim in player_shot_victims(state, index) {
        let spent = {
            let Some(pierce) = state.armory.arrows.get_mut(&shot_id) else {
                break;
            };
            if pierce.remaining == 0 || !pierce.hit.insert(victim) {
                continue;
            }
            pierce.remaining -= 1;
            pierce.remaining == 0
        };
        strike(state, victim, damage, AttackKind::Arrow);
        if spent {
            state.actors.at_mut(index).deactivate();
            break;
        }
    }
}

fn resolve_bullet(state: &mut SimState, index: usize) {
    let Some(victim) = player_shot_victims(state, index).first().copied() else {
        return;
    };
    state.actors.at_mut(index).deactivate();
    let damage = state.stats.bullet_damage;
    let heal = state.tuning.weapons.heal_on_kill;
    if strike(state, victim, damage, AttackKind::Projectile).is_kill() {
        heal_player(state, heal);
    }
}

/// Hostile shots ignore other hostiles and hostile shots entirely. A live
/// shield in the way absorbs them; otherwise they hit the player.
fn resolve_hostile_shot(state: &mut SimState, index: usize) {
    let shot = state.actors.at(index);
    let shot_id = shot.id;
    let player = state.player;
    let touching = |id: ActorId| {
        state
            .actors
            .get(id)
            .is_some_and(|other| other.is_active() && overlaps(shot, other))
    };

    let shield = state.armory.shields.iter().map(|s| s.actor).find(|id| touching(*id));
    if let Some(shield) = shield {
        state.actors.at_mut(index).deactivate();
        log::debug!("Hostile shot {shot_id} blocked by shield {shield}");
        state.events.push(SimEvent::ProjectileBlocked { id: shot_id, shield });
        return;
    }

    if touching(player) {
        let damage = state.tuning.hostiles.flyer_shot_damage;
        state.actors.at_mut(index).deactivate();
        hurt_player(state, damage);
    }
}

/// Resolve every active projectile against its possible victims
pub fn resolve_projectiles(state: &mut SimState) {
    for i in 0..state.actors.len() {
        let shot = state.actors.at(i);
        if !shot.is_active() || !shot.is_projectile() {
            continue;
        }
        let player_owned = shot.owner == Some(state.player);
        match (player_owned, shot.attack) {
            (true, Some(AttackKind::Arrow)) => resolve_arrow(state, i),
            (true, _) => resolve_bullet(state, i),
            (false, _) => resolve_hostile_shot(state, i),
        }
    }
}
