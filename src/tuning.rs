//! Game balance
//!
//! Every number the simulation reads for pacing, weapon strength and spawn
//! pressure lives here. Each section is `#[serde(default)]`, so a partial
//! JSON file only overrides the fields it names.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::sim::{AiKind, Unlocks, WeaponUpgradeStats};

/// Arena geometry and spawn placement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaTuning {
    /// World-space centre of the arena
    pub origin: Vec2,
    pub columns: u32,
    pub rows: u32,
    /// Side length of one grid cell
    pub cell_size: f32,
    /// Spawns never land closer than this to the player
    pub spawn_safe_radius: f32,
    /// Rerolls before a spawn position is accepted regardless of distance
    pub spawn_attempts: u32,
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            origin: Vec2::ZERO,
            columns: 36,
            rows: 20,
            cell_size: 25.0,
            spawn_safe_radius: 150.0,
            spawn_attempts: 64,
        }
    }
}

impl ArenaTuning {
    /// Half width/height of the whole arena
    pub fn half_size(&self) -> Vec2 {
        Vec2::new(self.columns as f32, self.rows as f32) * self.cell_size * 0.5
    }

    /// Inclusive player clamp rectangle (min, max)
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let half = self.half_size();
        (self.origin - half, self.origin + half)
    }

    /// Half extents of the spawn box (the central half of the arena)
    pub fn spawn_half_extent(&self) -> Vec2 {
        self.half_size() * 0.5
    }
}

/// Player body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Start position relative to the arena origin
    pub start_offset: Vec2,
    pub scale: Vec2,
    /// Full collider size (stored on the actor as half extents)
    pub collider: Vec2,
    /// Invincibility window after taking a hit
    pub invincibility_seconds: f32,
    /// Frozen time after spawning
    pub spawn_grace: f32,
    pub walk_frames: u32,
    pub frame_seconds: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            start_offset: Vec2::ZERO,
            scale: Vec2::splat(32.0),
            collider: Vec2::new(32.0 / 3.0, 16.0),
            invincibility_seconds: 0.3,
            spawn_grace: 0.0,
            walk_frames: 14,
            frame_seconds: crate::consts::DEFAULT_FRAME_SECONDS,
        }
    }
}

/// Per-type hostile stats
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostileProfile {
    pub base_hp: i32,
    /// Fraction of the default speed before the time multiplier
    pub speed_factor: f32,
    /// Square render size
    pub scale: f32,
    /// Collider size as a fraction of `scale`
    pub collider_fraction: f32,
    pub experience: u32,
    pub contact_damage: i32,
    pub walk_frames: u32,
}

impl Default for HostileProfile {
    fn default() -> Self {
        Self {
            base_hp: 20,
            speed_factor: 0.4,
            scale: 25.0,
            collider_fraction: 0.2,
            experience: 3,
            contact_damage: 10,
            walk_frames: 7,
        }
    }
}

/// Hostile behaviour knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostileTuning {
    pub wanderer: HostileProfile,
    pub flyer: HostileProfile,
    pub follower: HostileProfile,
    pub frame_seconds: f32,
    pub wander_radius: f32,
    /// A wanderer inside this distance of the player walks at it
    pub wander_activation_radius: f32,
    /// Per-tick chance of a wanderer picking a fresh direction
    pub wander_redirect_chance: f32,
    /// Vertical patrol span below a flyer's spawn point
    pub flyer_span: f32,
    pub flyer_fire_interval: f32,
    pub flyer_shot_speed: f32,
    pub flyer_shot_lifetime: f32,
    pub flyer_shot_size: f32,
    pub flyer_shot_collider_fraction: f32,
    pub flyer_shot_damage: i32,
}

impl Default for HostileTuning {
    fn default() -> Self {
        Self {
            wanderer: HostileProfile::default(),
            flyer: HostileProfile {
                base_hp: 18,
                speed_factor: 0.4,
                scale: 30.0,
                collider_fraction: 0.5,
                experience: 3,
                contact_damage: 5,
                walk_frames: 4,
            },
            follower: HostileProfile {
                base_hp: 25,
                speed_factor: 0.3,
                scale: 25.0,
                collider_fraction: 1.0,
                experience: 4,
                contact_damage: 10,
                walk_frames: 10,
            },
            frame_seconds: 0.1,
            wander_radius: 100.0,
            wander_activation_radius: 120.0,
            wander_redirect_chance: 0.05,
            flyer_span: 165.0,
            flyer_fire_interval: 3.5,
            flyer_shot_speed: 80.0,
            flyer_shot_lifetime: 3.0,
            flyer_shot_size: 32.0,
            flyer_shot_collider_fraction: 0.4,
            flyer_shot_damage: 5,
        }
    }
}

impl HostileTuning {
    pub fn profile(&self, ai: AiKind) -> &HostileProfile {
        match ai {
            AiKind::Wanderer | AiKind::Bullet => &self.wanderer,
            AiKind::Flyer => &self.flyer,
            AiKind::Follower => &self.follower,
        }
    }
}

/// Ultimate beam
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamTuning {
    pub interval: f32,
    pub length: f32,
    pub width: f32,
    /// Extra perpendicular slack added to `width` when testing hits
    pub tolerance: f32,
    pub damage: i32,
    /// Delay between firing and the damage sweep
    pub windup: f32,
    pub lifetime: f32,
    pub frames: u32,
    pub frame_seconds: f32,
}

impl Default for BeamTuning {
    fn default() -> Self {
        Self {
            interval: 1.0,
            length: 400.0,
            width: 32.0,
            tolerance: 20.0,
            damage: 1000,
            windup: 0.12,
            lifetime: 0.6,
            frames: 8,
            frame_seconds: 0.06,
        }
    }
}

/// Fixed weapon parameters (the upgradeable ones live in `WeaponUpgradeStats`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponTuning {
    /// Nearest-target search radius shared by every auto-aimed weapon
    pub target_search_radius: f32,
    pub bullet_speed: f32,
    pub bullet_lifetime: f32,
    pub bullet_size: f32,
    pub bullet_collider_fraction: f32,
    pub arrow_damage: i32,
    pub arrow_size: f32,
    pub arrow_lifetime: f32,
    pub arrow_muzzle_offset: f32,
    pub bow_size: f32,
    pub sword_orbit_radius: f32,
    /// Radians per second
    pub sword_orbit_speed: f32,
    pub sword_interval: f32,
    pub sword_base_size: f32,
    pub sword_base_hit_radius: f32,
    pub sword_base_damage: f32,
    pub sword_max_damage: f32,
    pub shield_size: f32,
    pub shield_collider_fraction: f32,
    /// Orbit speed at `shield_base_radius`; wider orbits slow down to match
    pub shield_base_orbit_speed: f32,
    pub shield_base_radius: f32,
    pub aura_interval: f32,
    pub heal_on_kill: i32,
    pub beam: BeamTuning,
}

impl Default for WeaponTuning {
    fn default() -> Self {
        Self {
            target_search_radius: 600.0,
            bullet_speed: 250.0,
            bullet_lifetime: 3.0,
            bullet_size: 15.0,
            bullet_collider_fraction: 0.6,
            arrow_damage: 20,
            arrow_size: 10.0,
            arrow_lifetime: 3.0,
            arrow_muzzle_offset: 16.0,
            bow_size: 10.0,
            sword_orbit_radius: 30.0,
            sword_orbit_speed: 1.5,
            sword_interval: 0.25,
            sword_base_size: 24.0,
            sword_base_hit_radius: 14.0,
            sword_base_damage: 5.0,
            sword_max_damage: 20.0,
            shield_size: 20.0,
            shield_collider_fraction: 0.4,
            shield_base_orbit_speed: 2.0,
            shield_base_radius: 15.0,
            aura_interval: 0.1,
            heal_on_kill: 1,
            beam: BeamTuning::default(),
        }
    }
}

/// One step of the burst-size staircase
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BurstStep {
    /// Applies once elapsed time is strictly past this
    pub after: f32,
    pub count: u32,
}

/// A one-off follower wave
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WaveTuning {
    pub at: f32,
    pub followers: u32,
}

/// Relative spawn weights
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpawnMix {
    pub follower: u32,
    pub wanderer: u32,
    pub flyer: u32,
}

impl SpawnMix {
    pub fn total(&self) -> u32 {
        self.follower + self.wanderer + self.flyer
    }

    /// Map a roll in `0..total()` onto a hostile type
    pub fn pick(&self, roll: u32) -> AiKind {
        if roll < self.follower {
            AiKind::Follower
        } else if roll < self.follower + self.wanderer {
            AiKind::Wanderer
        } else {
            AiKind::Flyer
        }
    }
}

/// Spawn cadence and difficulty curve
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorTuning {
    /// Surviving this long wins the run
    pub survival_seconds: f32,
    pub max_time_multiplier: f32,
    /// Weapon power only scales difficulty after this
    pub power_grace_seconds: f32,
    pub power_per_level: f32,
    pub max_power_bonus: f32,
    pub speed_multiplier_start: f32,
    pub speed_multiplier_max: f32,
    pub speed_multiplier_max_ultimate: f32,
    pub base_spawn_interval: f32,
    pub spawn_interval_reduction: f32,
    pub min_spawn_interval: f32,
    pub burst_steps: Vec<BurstStep>,
    pub waves: Vec<WaveTuning>,
    pub wave_difficulty_slope: f32,
    pub wave_difficulty_scale: f32,
    pub late_surge_at: f32,
    pub late_surge_hp_multiplier: f32,
    pub hostile_cap: usize,
    pub hostile_cap_ultimate: usize,
    pub flyer_cap: usize,
    pub flyer_cap_late: usize,
    pub late_mix_at: f32,
    pub early_mix: SpawnMix,
    pub late_mix: SpawnMix,
    pub capped_mix: SpawnMix,
    pub initial_hostiles: u32,
}

impl Default for DirectorTuning {
    fn default() -> Self {
        Self {
            survival_seconds: 120.0,
            max_time_multiplier: 4.0,
            power_grace_seconds: 30.0,
            power_per_level: 0.1,
            max_power_bonus: 1.0,
            speed_multiplier_start: 0.8,
            speed_multiplier_max: 1.3,
            speed_multiplier_max_ultimate: 2.5,
            base_spawn_interval: 2.0,
            spawn_interval_reduction: 1.5,
            min_spawn_interval: 0.5,
            burst_steps: vec![
                BurstStep { after: 0.0, count: 2 },
                BurstStep { after: 30.0, count: 3 },
                BurstStep { after: 60.0, count: 4 },
                BurstStep { after: 90.0, count: 5 },
            ],
            waves: vec![
                WaveTuning { at: 60.0, followers: 20 },
                WaveTuning { at: 90.0, followers: 20 },
            ],
            wave_difficulty_slope: 2.0,
            wave_difficulty_scale: 0.7,
            late_surge_at: 90.0,
            late_surge_hp_multiplier: 12.0,
            hostile_cap: 80,
            hostile_cap_ultimate: 100,
            flyer_cap: 5,
            flyer_cap_late: 10,
            late_mix_at: 60.0,
            early_mix: SpawnMix { follower: 60, wanderer: 25, flyer: 15 },
            late_mix: SpawnMix { follower: 40, wanderer: 20, flyer: 40 },
            capped_mix: SpawnMix { follower: 70, wanderer: 30, flyer: 0 },
            initial_hostiles: 5,
        }
    }
}

/// Experience curve and housekeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionTuning {
    /// Experience needed to leave level 1
    pub base_experience: f32,
    pub experience_growth: f32,
    pub reap_interval: f32,
    /// Max HP granted per level once the ultimate is owned
    pub ultimate_level_hp: i32,
    /// Upgrades shown per level-up
    pub offer_size: usize,
}

impl Default for ProgressionTuning {
    fn default() -> Self {
        Self {
            base_experience: 10.0,
            experience_growth: 1.2,
            reap_interval: 0.5,
            ultimate_level_hp: 10,
            offer_size: 3,
        }
    }
}

/// Upgrade steps and caps
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeTuning {
    pub cooldown_factor: f32,
    pub bullet_cooldown_min: f32,
    pub bullet_damage_step: i32,
    pub bullet_damage_max: i32,
    /// Blood-bullet upgrades required before the ultimate is offered
    pub ultimate_bullet_upgrades: u32,
    pub sword_count_max: u32,
    pub sword_size_step: f32,
    pub sword_size_max: f32,
    pub shield_count_max: u32,
    pub shield_radius_step: f32,
    pub shield_max_hp_bonus: i32,
    pub knockback_step: f32,
    pub knockback_max: f32,
    pub pierce_max: u32,
    pub bow_cooldown_min: f32,
    pub aura_radius_step: f32,
    pub aura_radius_max: f32,
    pub aura_damage_max: i32,
    pub heal_amount: i32,
    pub speed_step: f32,
    pub speed_max: f32,
}

impl Default for UpgradeTuning {
    fn default() -> Self {
        Self {
            cooldown_factor: 0.7,
            bullet_cooldown_min: 0.25,
            bullet_damage_step: 6,
            bullet_damage_max: 20,
            ultimate_bullet_upgrades: 3,
            sword_count_max: 4,
            sword_size_step: 10.0,
            sword_size_max: 48.0,
            shield_count_max: 3,
            shield_radius_step: 5.0,
            shield_max_hp_bonus: 25,
            knockback_step: 8.0,
            knockback_max: 40.0,
            pierce_max: 4,
            bow_cooldown_min: 1.0,
            aura_radius_step: 25.0,
            aura_radius_max: 80.0,
            aura_damage_max: 5,
            heal_amount: 25,
            speed_step: 0.1,
            speed_max: 1.5,
        }
    }
}

/// A block of hand-placed hostiles laid out in rows of `columns`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Squad {
    pub ai: AiKind,
    pub count: u32,
    pub columns: u32,
    /// First member's offset from the arena origin
    pub first: Vec2,
    /// Column and row spacing
    pub spacing: Vec2,
    pub hp: i32,
    pub speed: f32,
    pub scale: f32,
    /// Full collider side
    pub collider: f32,
    pub experience: u32,
    /// Flyers only
    pub fire_interval: f32,
}

impl Squad {
    /// Offset of member `i` from the arena origin
    pub fn offset(&self, i: u32) -> Vec2 {
        let columns = self.columns.max(1);
        let cell = Vec2::new((i % columns) as f32, (i / columns) as f32);
        self.first + cell * self.spacing
    }

    /// Ten stationary practice targets in two rows of five
    pub fn training_bots() -> Self {
        Self {
            ai: AiKind::Wanderer,
            count: 10,
            columns: 5,
            first: Vec2::new(-150.0, -100.0),
            spacing: Vec2::new(75.0, 75.0),
            hp: 30,
            speed: 0.0,
            scale: 40.0,
            collider: 20.0,
            experience: 10,
            fire_interval: 3.5,
        }
    }

    /// Three waves introducing each hostile kind in turn
    pub fn drill_waves() -> Vec<Self> {
        vec![
            Self {
                ai: AiKind::Wanderer,
                count: 3,
                columns: 3,
                first: Vec2::new(-200.0, -150.0),
                spacing: Vec2::new(100.0, 0.0),
                hp: 50,
                speed: 60.0,
                scale: 40.0,
                collider: 20.0,
                experience: 10,
                fire_interval: 3.5,
            },
            Self {
                ai: AiKind::Flyer,
                count: 2,
                columns: 2,
                first: Vec2::new(150.0, -100.0),
                spacing: Vec2::new(-80.0, 0.0),
                hp: 40,
                speed: 70.0,
                scale: 35.0,
                collider: 17.0,
                experience: 10,
                fire_interval: 3.0,
            },
            Self {
                ai: AiKind::Follower,
                count: 3,
                columns: 3,
                first: Vec2::new(-100.0, 150.0),
                spacing: Vec2::new(100.0, 0.0),
                hp: 60,
                speed: 50.0,
                scale: 45.0,
                collider: 22.0,
                experience: 10,
                fire_interval: 3.5,
            },
        ]
    }
}

/// How a level is populated and what finishes it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LevelMode {
    /// Director-driven spawning; won by outlasting `survival_seconds`
    #[default]
    Survival,
    /// Fixed targets and no spawner; cleared once every bot is down
    Training {
        #[serde(default = "Squad::training_bots")]
        bots: Squad,
    },
    /// Each wave is released when the previous one is dead; cleared after
    /// the last
    Waves {
        #[serde(default = "Squad::drill_waves")]
        waves: Vec<Squad>,
    },
}

impl LevelMode {
    pub fn training() -> Self {
        Self::Training {
            bots: Squad::training_bots(),
        }
    }

    pub fn waves() -> Self {
        Self::Waves {
            waves: Squad::drill_waves(),
        }
    }

    /// Random spawning and the difficulty curve only run in survival
    pub fn uses_director(&self) -> bool {
        matches!(self, Self::Survival)
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub arena: ArenaTuning,
    pub player: PlayerTuning,
    pub hostiles: HostileTuning,
    pub weapons: WeaponTuning,
    pub director: DirectorTuning,
    pub progression: ProgressionTuning,
    pub upgrades: UpgradeTuning,
    /// Starting weapon parameters
    pub loadout: WeaponUpgradeStats,
    /// Weapons owned at the start of a run
    pub unlocks: Unlocks,
    pub level: LevelMode,
}

impl Tuning {
    /// Parse and validate a JSON balance sheet
    pub fn from_json(json: &str) -> SimResult<Self> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read a balance sheet from disk
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values that would stall or divide by zero inside the simulation
    pub fn validate(&self) -> SimResult<()> {
        positive("arena.cell_size", self.arena.cell_size)?;
        if self.arena.columns == 0 || self.arena.rows == 0 {
            return Err(invalid("arena.columns", "arena needs at least one cell"));
        }
        positive("player.frame_seconds", self.player.frame_seconds)?;
        positive("hostiles.frame_seconds", self.hostiles.frame_seconds)?;
        positive("hostiles.flyer_fire_interval", self.hostiles.flyer_fire_interval)?;
        positive("weapons.sword_interval", self.weapons.sword_interval)?;
        positive("weapons.sword_base_size", self.weapons.sword_base_size)?;
        positive("weapons.shield_base_radius", self.weapons.shield_base_radius)?;
        positive("weapons.aura_interval", self.weapons.aura_interval)?;
        positive("weapons.beam.interval", self.weapons.beam.interval)?;
        positive("weapons.beam.frame_seconds", self.weapons.beam.frame_seconds)?;
        positive("director.survival_seconds", self.director.survival_seconds)?;
        positive("director.min_spawn_interval", self.director.min_spawn_interval)?;
        positive("progression.reap_interval", self.progression.reap_interval)?;
        positive("progression.base_experience", self.progression.base_experience)?;
        positive("loadout.bullet_cooldown", self.loadout.bullet_cooldown)?;
        positive("loadout.bow_cooldown", self.loadout.bow_cooldown)?;
        positive("loadout.shield_orbit_radius", self.loadout.shield_orbit_radius)?;

        if self.progression.experience_growth < 1.0 {
            return Err(invalid(
                "progression.experience_growth",
                format!("{} would shrink the level curve", self.progression.experience_growth),
            ));
        }
        if self.progression.offer_size == 0 {
            return Err(invalid("progression.offer_size", "must offer at least one upgrade"));
        }
        if self.director.hostile_cap == 0 {
            return Err(invalid("director.hostile_cap", "cap of zero disables the run"));
        }
        if self.director.hostile_cap_ultimate < self.director.hostile_cap {
            return Err(invalid(
                "director.hostile_cap_ultimate",
                "must not be below director.hostile_cap",
            ));
        }
        if self.director.burst_steps.is_empty() {
            return Err(invalid("director.burst_steps", "at least one step required"));
        }
        for mix in [
            ("director.early_mix", &self.director.early_mix),
            ("director.late_mix", &self.director.late_mix),
            ("director.capped_mix", &self.director.capped_mix),
        ] {
            if mix.1.total() == 0 {
                return Err(invalid(mix.0, "weights sum to zero"));
            }
        }
        match &self.level {
            LevelMode::Survival => {}
            LevelMode::Training { bots } => validate_squad("level.bots", bots)?,
            LevelMode::Waves { waves } => {
                if waves.is_empty() {
                    return Err(invalid("level.waves", "at least one wave required"));
                }
                for squad in waves {
                    validate_squad("level.waves", squad)?;
                }
            }
        }
        let start = self.director.speed_multiplier_start;
        for (field, max) in [
            ("director.speed_multiplier_max", self.director.speed_multiplier_max),
            (
                "director.speed_multiplier_max_ultimate",
                self.director.speed_multiplier_max_ultimate,
            ),
        ] {
            if !max.is_finite() || max < start {
                return Err(invalid(
                    field,
                    format!("{max} is below director.speed_multiplier_start ({start})"),
                ));
            }
        }
        Ok(())
    }
}

fn validate_squad(field: &'static str, squad: &Squad) -> SimResult<()> {
    if squad.count == 0 || squad.columns == 0 {
        return Err(invalid(field, "squads need at least one member and one column"));
    }
    if squad.hp <= 0 {
        return Err(invalid(field, format!("member hp {} must be positive", squad.hp)));
    }
    if squad.ai == AiKind::Bullet {
        return Err(invalid(field, "projectiles cannot be placed as hostiles"));
    }
    if squad.ai == AiKind::Flyer {
        positive(field, squad.fire_interval)?;
    }
    Ok(())
}

fn positive(field: &'static str, value: f32) -> SimResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, format!("expected a positive value, got {value}")))
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> SimError {
    SimError::InvalidTuning {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_arena_geometry() {
        let arena = ArenaTuning::default();
        assert_eq!(arena.half_size(), Vec2::new(450.0, 250.0));
        let (min, max) = arena.bounds();
        assert_eq!(min, Vec2::new(-450.0, -250.0));
        assert_eq!(max, Vec2::new(450.0, 250.0));
        assert_eq!(arena.spawn_half_extent(), Vec2::new(225.0, 125.0));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "director": { "hostile_cap": 12 } }"#).unwrap();
        assert_eq!(tuning.director.hostile_cap, 12);
        assert_eq!(tuning.director.flyer_cap, 5);
        assert_eq!(tuning.weapons.arrow_damage, 20);
        assert_eq!(tuning.loadout.sword_count, 2);
        assert!(tuning.unlocks.blood_bullet);
    }

    #[test]
    fn test_invalid_interval_rejected() {
        let err = Tuning::from_json(r#"{ "weapons": { "aura_interval": 0.0 } }"#).unwrap_err();
        assert!(matches!(
            err,
            SimError::InvalidTuning { field: "weapons.aura_interval", .. }
        ));
    }

    #[test]
    fn test_ultimate_speed_ceiling_checked() {
        let mut tuning = Tuning::default();
        tuning.director.speed_multiplier_max_ultimate = 0.5;
        assert!(matches!(
            tuning.validate(),
            Err(SimError::InvalidTuning { field: "director.speed_multiplier_max_ultimate", .. })
        ));

        tuning.director.speed_multiplier_max_ultimate = f32::NAN;
        assert!(tuning.validate().is_err());

        tuning.director.speed_multiplier_max_ultimate = tuning.director.speed_multiplier_start;
        assert!(tuning.validate().is_ok());
    }

    #[test]
    fn test_level_mode_from_json() {
        let tuning = Tuning::from_json(r#"{ "level": { "mode": "training" } }"#).unwrap();
        assert_eq!(tuning.level, LevelMode::training());
        assert!(!tuning.level.uses_director());

        let tuning = Tuning::from_json(r#"{ "level": { "mode": "waves" } }"#).unwrap();
        let LevelMode::Waves { waves } = &tuning.level else {
            panic!("expected waves, got {:?}", tuning.level);
        };
        assert_eq!(waves.len(), 3);
        assert_eq!(waves[1].ai, AiKind::Flyer);

        assert!(Tuning::default().level.uses_director());
        assert!(Tuning::from_json(r#"{ "level": { "mode": "waves", "waves": [] } }"#).is_err());
    }

    #[test]
    fn test_squad_layout() {
        let bots = Squad::training_bots();
        assert_eq!(bots.offset(0), Vec2::new(-150.0, -100.0));
        assert_eq!(bots.offset(4), Vec2::new(150.0, -100.0));
        assert_eq!(bots.offset(5), Vec2::new(-150.0, -25.0));
        let flyers = &Squad::drill_waves()[1];
        assert_eq!(flyers.offset(1), Vec2::new(70.0, -100.0));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(Tuning::from_json("{ nope"), Err(SimError::Json(_))));
    }

    #[test]
    fn test_json_roundtrip_preserves_caps() {
        let mut tuning = Tuning::default();
        tuning.upgrades.pierce_max = 7;
        let json = tuning.to_json().unwrap();
        let back = Tuning::from_json(&json).unwrap();
        assert_eq!(back.upgrades.pierce_max, 7);
    }

    #[test]
    fn test_spawn_mix_pick() {
        let mix = DirectorTuning::default().early_mix;
        assert_eq!(mix.pick(0), AiKind::Follower);
        assert_eq!(mix.pick(59), AiKind::Follower);
        assert_eq!(mix.pick(60), AiKind::Wanderer);
        assert_eq!(mix.pick(84), AiKind::Wanderer);
        assert_eq!(mix.pick(85), AiKind::Flyer);
    }

    #[test]
    fn test_profile_lookup() {
        let hostiles = HostileTuning::default();
        assert_eq!(hostiles.profile(AiKind::Follower).experience, 4);
        assert_eq!(hostiles.profile(AiKind::Flyer).contact_damage, 5);
        assert_eq!(hostiles.profile(AiKind::Wanderer).base_hp, 20);
    }
}
