//! Experience, levels and the kill ledger

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::actor::AiKind;
use super::actors::ActorId;
use crate::tuning::ProgressionTuning;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillCounts {
    pub total: u32,
    pub wanderers: u32,
    pub followers: u32,
    pub flyers: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progression {
    pub level: u32,
    /// Experience banked toward the next level
    pub experience: u32,
    pub next_threshold: u32,
    /// Hostiles whose experience has been paid out. Entries are dropped when
    /// the actor is reaped.
    granted: BTreeSet<ActorId>,
    pub kills: KillCounts,
}

/// Experience needed to leave `level`: `floor(base * growth^(level-1))`
pub fn experience_for_level(level: u32, tuning: &ProgressionTuning) -> u32 {
    let mut need = tuning.base_experience;
    for _ in 1..level {
        need *= tuning.experience_growth;
    }
    need.floor() as u32
}

impl Progression {
    pub fn new(tuning: &ProgressionTuning) -> Self {
        Self {
            level: 1,
            experience: 0,
            next_threshold: experience_for_level(1, tuning),
            granted: BTreeSet::new(),
            kills: KillCounts::default(),
        }
    }

    /// Pay out a kill. Returns false (and changes nothing) if this hostile
    /// was already paid for.
    pub fn record_kill(&mut self, id: ActorId, ai: Option<AiKind>, experience: u32) -> bool {
        if !self.granted.insert(id) {
            return false;
        }
        self.experience += experience;
        self.kills.total += 1;
        match ai {
            Some(AiKind::Wanderer) => self.kills.wanderers += 1,
            Some(AiKind::Follower) => self.kills.followers += 1,
            Some(AiKind::Flyer) => self.kills.flyers += 1,
            Some(AiKind::Bullet) | None => {}
        }
        true
    }

    pub fn was_granted(&self, id: ActorId) -> bool {
        self.granted.contains(&id)
    }

    /// Take one level if the threshold is met; leftover experience carries
    pub fn try_level_up(&mut self, tuning: &ProgressionTuning) -> bool {
        if self.experience < self.next_threshold {
            return false;
        }
        self.experience -= self.next_threshold;
        self.level += 1;
        self.next_threshold = experience_for_level(self.level, tuning);
        true
    }

    /// Drop reaped actors from the ledger
    pub fn forget(&mut self, removed: &[ActorId]) {
        for id in removed {
            self.granted.remove(id);
        }
    }

    pub fn ledger_len(&self) -> usize {
        self.granted.len()
    }
}
