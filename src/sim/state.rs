//! Simulation state
//!
//! Everything one run owns lives in `SimState`: the live actors, the weapon
//! registry, the upgrade stats, progression, the spawn director and the
//! seeded RNG. Nothing is global, so any number of runs can share a process.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::actor::{Actor, ActorKind};
use super::actors::{ActorId, Actors};
use super::ai::Target;
use super::animation::Animation;
use super::director::Director;
use super::events::SimEvent;
use super::level::{self, LevelProgress};
use super::map::TileGrid;
use super::progression::{KillCounts, Progression};
use super::timer::IntervalTimer;
use super::upgrades::{self, Unlocks, Upgrade, Weapon, WeaponUpgradeStats};
use super::weapons::{self, Armory};
use crate::error::{SimError, SimResult};
use crate::tuning::Tuning;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Running,
    /// World frozen until one of `offer` is picked
    ChoosingUpgrade,
    /// Survived the full run; waits for restart
    Won,
    /// Player died; waits for restart
    Lost,
    /// Level objective met; waits for the next level or a restart
    Cleared,
}

/// Scene the driver should switch to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NextScene {
    Lose,
    Win,
    /// Training or wave level finished
    NextLevel,
}

/// End-of-run report
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub seed: u64,
    pub phase: Phase,
    pub survived_seconds: f32,
    pub level: u32,
    pub kills: KillCounts,
    pub player_hp: i32,
    pub weapons: Vec<Weapon>,
    pub ticks: u64,
    /// Last scripted wave reached, 0 outside wave levels
    pub wave: usize,
}

#[derive(Debug, Clone)]
pub struct SimState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub rng: Pcg32,
    pub actors: Actors,
    pub player: ActorId,
    pub armory: Armory,
    pub stats: WeaponUpgradeStats,
    pub unlocks: Unlocks,
    pub progression: Progression,
    pub director: Director,
    /// Objective progress for training and wave levels
    pub stage: LevelProgress,
    pub phase: Phase,
    /// Set once the run ends
    pub next_scene: Option<NextScene>,
    /// Upgrades on the table while choosing
    pub offer: Vec<Upgrade>,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub reap_timer: IntervalTimer,
    pub map: TileGrid,
    /// Pending notifications for the driver
    pub events: Vec<SimEvent>,
}

impl SimState {
    /// Create a run with the default balance
    pub fn new(seed: u64) -> Self {
        Self::build(seed, Tuning::default())
    }

    /// Create a run with custom balance, rejecting unusable values
    pub fn with_tuning(seed: u64, tuning: Tuning) -> SimResult<Self> {
        tuning.validate()?;
        Ok(Self::build(seed, tuning))
    }

    fn build(seed: u64, tuning: Tuning) -> Self {
        let mut actors = Actors::new();
        let body = &tuning.player;
        let stats = tuning.loadout.clone();
        let start = tuning.arena.origin + body.start_offset;
        let player = actors.spawn(|id| {
            let mut player = Actor::new(id, ActorKind::Player, start, body.scale)
                .with_collider(body.collider)
                .with_hp(stats.player_max_hp)
                .with_speed(stats.player_speed_units())
                .with_animation(Animation::uniform(body.walk_frames, body.frame_seconds));
            player.invincibility_seconds = body.invincibility_seconds;
            player.spawn_grace = body.spawn_grace;
            player
        });

        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            actors,
            player,
            armory: Armory::default(),
            stats,
            unlocks: Unlocks::none(),
            progression: Progression::new(&tuning.progression),
            director: Director::default(),
            stage: LevelProgress::default(),
            phase: Phase::Running,
            next_scene: None,
            offer: Vec::new(),
            time_ticks: 0,
            reap_timer: IntervalTimer::new(tuning.progression.reap_interval),
            map: TileGrid::from_arena(&tuning.arena),
            events: Vec::new(),
            tuning,
        };

        for weapon in state.tuning.unlocks.owned() {
            weapons::install(&mut state, weapon);
        }
        level::populate(&mut state);

        log::info!(
            "Simulation created: seed {seed}, {:?} level, {} hostiles, weapons {:?}",
            state.tuning.level,
            state.actors.live_hostiles(),
            state.unlocks.owned()
        );
        state
    }

    /// Where the hostiles should be heading, if the player is still up
    pub fn player_target(&self) -> Option<Target> {
        self.actors
            .get(self.player)
            .filter(|p| p.is_active())
            .map(|p| Target { id: p.id, pos: p.pos })
    }

    pub fn player(&self) -> Option<&Actor> {
        self.actors.get(self.player)
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::Won | Phase::Lost | Phase::Cleared)
    }

    /// Physically drop inactive actors except the player and registered
    /// weapon actors. Returns how many were removed.
    pub fn reap(&mut self) -> usize {
        let armory = &self.armory;
        let removed = self.actors.reap(|a| armory.owns(a.id));
        if removed.is_empty() {
            return 0;
        }
        self.progression.forget(&removed);
        let actors = &self.actors;
        self.armory.arrows.retain(|id, _| actors.get(*id).is_some());
        log::debug!("Reaped {} actors, {} live", removed.len(), self.actors.len());
        removed.len()
    }

    /// Take every queued event
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Apply the upgrade at `index` of the current offer and resume the run
    pub fn choose_upgrade(&mut self, index: usize) -> SimResult<Upgrade> {
        let Some(&upgrade) = self.offer.get(index).filter(|_| self.phase == Phase::ChoosingUpgrade)
        else {
            return Err(SimError::InvalidUpgradeChoice {
                index,
                offered: self.offer.len(),
            });
        };
        self.offer.clear();
        upgrades::apply_upgrade(self, upgrade);
        self.phase = Phase::Running;
        Ok(upgrade)
    }

    /// Start over from the same seed and balance
    pub fn restart(&mut self) {
        log::info!("Restarting run (seed {})", self.seed);
        *self = Self::build(self.seed, self.tuning.clone());
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            seed: self.seed,
            phase: self.phase,
            survived_seconds: self.director.elapsed,
            level: self.progression.level,
            kills: self.progression.kills.clone(),
            player_hp: self.player().map_or(0, |p| p.hp),
            weapons: self.unlocks.owned(),
            ticks: self.time_ticks,
            wave: self.stage.wave,
        }
    }
}
