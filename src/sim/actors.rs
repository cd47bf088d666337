//! Live actor collection
//!
//! Actors are stored in a `Vec` sorted by id. Ids are handed out
//! monotonically and never reused, so appending keeps the order, lookups are
//! binary searches, and a reaped id simply stops resolving. Nothing is removed
//! outside `reap`, which keeps index-based loops in the update passes valid
//! while they spawn new actors.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::actor::{Actor, ActorKind, AiKind};

/// Stable actor handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actors {
    list: Vec<Actor>,
    next_id: u64,
}

impl Default for Actors {
    fn default() -> Self {
        Self::new()
    }
}

impl Actors {
    pub fn new() -> Self {
        Self {
            list: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate an id and insert the actor built for it
    pub fn spawn(&mut self, build: impl FnOnce(ActorId) -> Actor) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id += 1;
        let mut actor = build(id);
        actor.id = id;
        self.list.push(actor);
        id
    }

    pub fn index_of(&self, id: ActorId) -> Option<usize> {
        self.list.binary_search_by_key(&id, |a| a.id).ok()
    }

    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.index_of(id).map(|i| &self.list[i])
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        match self.index_of(id) {
            Some(i) => Some(&mut self.list[i]),
            None => None,
        }
    }

    /// Resolves and is still active
    pub fn is_live(&self, id: ActorId) -> bool {
        self.get(id).is_some_and(Actor::is_active)
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.list.iter()
    }

    pub fn as_mut_slice(&mut self) -> &mut [Actor] {
        &mut self.list
    }

    pub fn at(&self, index: usize) -> &Actor {
        &self.list[index]
    }

    pub fn at_mut(&mut self, index: usize) -> &mut Actor {
        &mut self.list[index]
    }

    /// Active hostiles with health left
    pub fn live_hostiles(&self) -> usize {
        self.list.iter().filter(|a| a.is_live_hostile()).count()
    }

    pub fn live_of(&self, ai: AiKind) -> usize {
        self.list
            .iter()
            .filter(|a| a.is_live_hostile() && a.ai == Some(ai))
            .count()
    }

    /// Physically drop inactive actors. The player and anything `protect`
    /// claims survive regardless. Returns the removed ids in order.
    pub fn reap(&mut self, protect: impl Fn(&Actor) -> bool) -> Vec<ActorId> {
        let mut removed = Vec::new();
        self.list.retain(|a| {
            let keep = a.is_active() || a.kind == ActorKind::Player || protect(a);
            if !keep {
                removed.push(a.id);
            }
            keep
        });
        removed
    }

    /// Drop dead hostiles only
    pub fn reap_hostiles(&mut self) -> Vec<ActorId> {
        let mut removed = Vec::new();
        self.list.retain(|a| {
            let dead = a.kind == ActorKind::Hostile && (a.is_dead() || !a.is_active());
            if dead {
                removed.push(a.id);
            }
            !dead
        });
        removed
    }
}
