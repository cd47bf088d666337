//! Weapon parameters and the level-up upgrade pool
//!
//! `WeaponUpgradeStats` is plain data read by the weapon systems. Upgrades
//! mutate it and, where the change is visible on live actors (blade size,
//! shield ring, aura radius, cooldowns), push it into the armory as well.

use rand::seq::SliceRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::combat;
use super::events::SimEvent;
use super::state::SimState;
use super::weapons;
use crate::consts::DEFAULT_SPEED;
use crate::tuning::{UpgradeTuning, WeaponTuning};

/// Upgradeable weapon parameters plus per-weapon upgrade counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponUpgradeStats {
    pub sword_count: u32,
    pub sword_size: f32,
    /// Cosmetic tier, 1..=4
    pub sword_material: u32,
    pub sword_upgrades: u32,

    pub shield_orbit_radius: f32,
    /// Push distance per second applied to overlapping hostiles
    pub shield_knockback: f32,
    pub shield_count: u32,
    pub shield_material: u32,
    pub shield_upgrades: u32,

    pub bow_range: f32,
    pub bow_cooldown: f32,
    pub arrow_speed: f32,
    pub arrow_pierce: u32,
    pub bow_material: u32,
    pub bow_upgrades: u32,

    pub bullet_cooldown: f32,
    pub bullet_damage: i32,
    pub bullet_upgrades: u32,

    pub aura_radius: f32,
    pub aura_damage: i32,
    pub aura_upgrades: u32,

    /// Multiplier on the default speed
    pub player_speed: f32,
    pub player_max_hp: i32,
}

impl Default for WeaponUpgradeStats {
    fn default() -> Self {
        Self {
            sword_count: 2,
            sword_size: 24.0,
            sword_material: 1,
            sword_upgrades: 0,
            shield_orbit_radius: 15.0,
            shield_knockback: 12.0,
            shield_count: 1,
            shield_material: 1,
            shield_upgrades: 0,
            bow_range: 180.0,
            bow_cooldown: 2.0,
            arrow_speed: 200.0,
            arrow_pierce: 1,
            bow_material: 1,
            bow_upgrades: 0,
            bullet_cooldown: 0.5,
            bullet_damage: 8,
            bullet_upgrades: 0,
            aura_radius: 60.0,
            aura_damage: 1,
            aura_upgrades: 0,
            player_speed: 1.0,
            player_max_hp: 100,
        }
    }
}

impl WeaponUpgradeStats {
    /// Summed weapon power, used by the difficulty curve
    pub fn total_weapon_level(&self) -> u32 {
        let level = self.sword_count as i32
            + (self.sword_size / 8.0) as i32
            + self.shield_count as i32
            + (self.shield_knockback / 10.0) as i32
            + self.arrow_pierce as i32
            + ((2.0 - self.bow_cooldown) / 0.25) as i32
            + (self.aura_radius / 30.0) as i32
            + self.aura_damage / 5;
        level.max(0) as u32
    }

    /// Per-hit blade damage; bigger and more numerous blades hit harder
    pub fn sword_damage(&self, weapons: &WeaponTuning) -> i32 {
        let raw = weapons.sword_base_damage
            + (self.sword_size - weapons.sword_base_size) / 4.0
            + (self.sword_count as f32 - 2.0) * 3.0;
        raw.clamp(1.0, weapons.sword_max_damage) as i32
    }

    /// Blade reach scales with blade size
    pub fn sword_hit_radius(&self, weapons: &WeaponTuning) -> f32 {
        weapons.sword_base_hit_radius * self.sword_size / weapons.sword_base_size
    }

    /// Raise material tiers that the current stats qualify for. Tiers never
    /// drop. Returns how many shield tiers were gained.
    pub fn refresh_materials(&mut self) -> u32 {
        let sword_tier = [
            (2, self.sword_count >= 2 || self.sword_size >= 32.0 || self.sword_upgrades >= 2),
            (3, self.sword_count >= 3 || self.sword_size >= 40.0 || self.sword_upgrades >= 4),
            (4, self.sword_count >= 4 || self.sword_size >= 48.0 || self.sword_upgrades >= 6),
        ];
        self.sword_material = raise(self.sword_material, &sword_tier);

        let before = self.shield_material;
        let shield_tier = [
            (2, self.shield_count >= 2 || self.shield_knockback >= 40.0 || self.shield_upgrades >= 2),
            (3, self.shield_count >= 3 || self.shield_knockback >= 40.0 || self.shield_upgrades >= 4),
        ];
        self.shield_material = raise(self.shield_material, &shield_tier);

        let bow_tier = [
            (2, self.arrow_pierce >= 2 || self.bow_cooldown <= 1.5 || self.bow_upgrades >= 2),
            (3, self.arrow_pierce >= 4 || self.bow_cooldown <= 1.0 || self.bow_upgrades >= 4),
        ];
        self.bow_material = raise(self.bow_material, &bow_tier);

        self.shield_material - before
    }

    /// Player speed in world units
    pub fn player_speed_units(&self) -> f32 {
        (DEFAULT_SPEED * self.player_speed).floor()
    }
}

fn raise(current: u32, tiers: &[(u32, bool)]) -> u32 {
    tiers
        .iter()
        .filter(|(_, reached)| *reached)
        .map(|(tier, _)| *tier)
        .fold(current, u32::max)
}

/// Weapon families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weapon {
    BloodBullet,
    Sword,
    Shield,
    Aura,
    Bow,
    /// Sweeping beam that replaces the bullet and bow
    Ultimate,
}

/// Owned weapons, one flag per family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Unlocks {
    pub blood_bullet: bool,
    pub sword: bool,
    pub shield: bool,
    pub aura: bool,
    pub bow: bool,
    pub ultimate: bool,
}

impl Default for Unlocks {
    fn default() -> Self {
        Self {
            blood_bullet: true,
            sword: false,
            shield: false,
            aura: false,
            bow: false,
            ultimate: false,
        }
    }
}

impl Unlocks {
    pub fn none() -> Self {
        Self {
            blood_bullet: false,
            ..Self::default()
        }
    }

    pub fn owns(&self, weapon: Weapon) -> bool {
        match weapon {
            Weapon::BloodBullet => self.blood_bullet,
            Weapon::Sword => self.sword,
            Weapon::Shield => self.shield,
            Weapon::Aura => self.aura,
            Weapon::Bow => self.bow,
            Weapon::Ultimate => self.ultimate,
        }
    }

    pub fn set(&mut self, weapon: Weapon, owned: bool) {
        let flag = match weapon {
            Weapon::BloodBullet => &mut self.blood_bullet,
            Weapon::Sword => &mut self.sword,
            Weapon::Shield => &mut self.shield,
            Weapon::Aura => &mut self.aura,
            Weapon::Bow => &mut self.bow,
            Weapon::Ultimate => &mut self.ultimate,
        };
        *flag = owned;
    }

    /// Owned families in install order
    pub fn owned(&self) -> Vec<Weapon> {
        [
            Weapon::BloodBullet,
            Weapon::Sword,
            Weapon::Shield,
            Weapon::Aura,
            Weapon::Bow,
            Weapon::Ultimate,
        ]
        .into_iter()
        .filter(|w| self.owns(*w))
        .collect()
    }

    /// Every other family owned and the bullet upgraded enough
    pub fn ultimate_ready(&self, stats: &WeaponUpgradeStats, tuning: &UpgradeTuning) -> bool {
        !self.ultimate
            && self.sword
            && self.shield
            && self.aura
            && self.bow
            && stats.bullet_upgrades >= tuning.ultimate_bullet_upgrades
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Upgrade {
    UnlockSword,
    UnlockShield,
    UnlockAura,
    UnlockBow,
    Ultimate,
    SwordCount,
    SwordSize,
    ShieldCount,
    ShieldKnockback,
    ArrowPierce,
    BowCooldown,
    AuraRadius,
    AuraDamage,
    BulletCooldown,
    BulletDamage,
    Heal,
    Speed,
}

impl Upgrade {
    pub fn title(self) -> &'static str {
        match self {
            Upgrade::UnlockSword => "Orbiting Blades",
            Upgrade::UnlockShield => "Guardian Shield",
            Upgrade::UnlockAura => "Flame Aura",
            Upgrade::UnlockBow => "Longbow",
            Upgrade::Ultimate => "Heaven Laser",
            Upgrade::SwordCount => "Blades: +1 Blade",
            Upgrade::SwordSize => "Blades: Bigger Blades",
            Upgrade::ShieldCount => "Shield: +1 Shield",
            Upgrade::ShieldKnockback => "Shield: Stronger Knockback",
            Upgrade::ArrowPierce => "Bow: +1 Pierce",
            Upgrade::BowCooldown => "Bow: Faster Draw",
            Upgrade::AuraRadius => "Aura: Wider Flames",
            Upgrade::AuraDamage => "Aura: Hotter Flames",
            Upgrade::BulletCooldown => "Blood Bullet: Faster Fire",
            Upgrade::BulletDamage => "Blood Bullet: More Damage",
            Upgrade::Heal => "Heal",
            Upgrade::Speed => "Move Speed",
        }
    }
}

/// Every upgrade the current loadout qualifies for, in a fixed order
pub fn offer_pool(
    stats: &WeaponUpgradeStats,
    unlocks: &Unlocks,
    tuning: &UpgradeTuning,
) -> Vec<Upgrade> {
    let mut pool = Vec::new();

    if !unlocks.sword {
        pool.push(Upgrade::UnlockSword);
    }
    if !unlocks.shield {
        pool.push(Upgrade::UnlockShield);
    }
    if !unlocks.aura {
        pool.push(Upgrade::UnlockAura);
    }
    if !unlocks.bow && !unlocks.ultimate {
        pool.push(Upgrade::UnlockBow);
    }
    if unlocks.ultimate_ready(stats, tuning) {
        pool.push(Upgrade::Ultimate);
    }

    if unlocks.sword {
        if stats.sword_count < tuning.sword_count_max {
            pool.push(Upgrade::SwordCount);
        }
        if stats.sword_size < tuning.sword_size_max {
            pool.push(Upgrade::SwordSize);
        }
    }
    if unlocks.shield {
        if stats.shield_count < tuning.shield_count_max {
            pool.push(Upgrade::ShieldCount);
        }
        if stats.shield_knockback < tuning.knockback_max {
            pool.push(Upgrade::ShieldKnockback);
        }
    }
    if unlocks.bow && !unlocks.ultimate {
        if stats.arrow_pierce < tuning.pierce_max {
            pool.push(Upgrade::ArrowPierce);
        }
        if stats.bow_cooldown > tuning.bow_cooldown_min {
            pool.push(Upgrade::BowCooldown);
        }
    }
    if unlocks.aura {
        if stats.aura_radius < tuning.aura_radius_max {
            pool.push(Upgrade::AuraRadius);
        }
        if stats.aura_damage < tuning.aura_damage_max {
            pool.push(Upgrade::AuraDamage);
        }
    }
    if unlocks.blood_bullet && !unlocks.ultimate {
        if stats.bullet_cooldown > tuning.bullet_cooldown_min {
            pool.push(Upgrade::BulletCooldown);
        }
        if stats.bullet_damage < tuning.bullet_damage_max {
            pool.push(Upgrade::BulletDamage);
        }
    }

    // fillers when the weapons are close to maxed out
    if pool.len() < 3 {
        pool.push(Upgrade::Heal);
        if stats.player_speed < tuning.speed_max {
            pool.push(Upgrade::Speed);
        }
    }
    pool
}

/// Shuffle the pool and keep the first `size`
pub fn roll_offer(mut pool: Vec<Upgrade>, size: usize, rng: &mut Pcg32) -> Vec<Upgrade> {
    pool.shuffle(rng);
    pool.truncate(size);
    pool
}

/// Apply one chosen upgrade to the stats and the live weapon actors
pub fn apply_upgrade(state: &mut SimState, upgrade: Upgrade) {
    let t = state.tuning.upgrades.clone();
    match upgrade {
        Upgrade::UnlockSword => weapons::install(state, Weapon::Sword),
        Upgrade::UnlockShield => weapons::install(state, Weapon::Shield),
        Upgrade::UnlockAura => weapons::install(state, Weapon::Aura),
        Upgrade::UnlockBow => weapons::install(state, Weapon::Bow),
        Upgrade::Ultimate => weapons::install(state, Weapon::Ultimate),
        Upgrade::SwordCount => {
            let s = &mut state.stats;
            s.sword_count = (s.sword_count + 1).min(t.sword_count_max);
            s.sword_upgrades += 1;
            weapons::rebuild_blades(state);
        }
        Upgrade::SwordSize => {
            let s = &mut state.stats;
            s.sword_size = (s.sword_size + t.sword_size_step).min(t.sword_size_max);
            s.sword_upgrades += 1;
            weapons::resize_blades(state);
        }
        Upgrade::ShieldCount => {
            let s = &mut state.stats;
            s.shield_count = (s.shield_count + 1).min(t.shield_count_max);
            s.shield_orbit_radius += t.shield_radius_step;
            s.player_max_hp += t.shield_max_hp_bonus;
            s.shield_upgrades += 1;
            let max_hp = s.player_max_hp;
            if let Some(player) = state.actors.get_mut(state.player) {
                player.set_max_hp(max_hp);
            }
            weapons::rebuild_shields(state);
        }
        Upgrade::ShieldKnockback => {
            let s = &mut state.stats;
            s.shield_knockback = (s.shield_knockback + t.knockback_step).min(t.knockback_max);
            s.shield_upgrades += 1;
        }
        Upgrade::ArrowPierce => {
            let s = &mut state.stats;
            s.arrow_pierce = (s.arrow_pierce + 1).min(t.pierce_max);
            s.bow_upgrades += 1;
        }
        Upgrade::BowCooldown => {
            let s = &mut state.stats;
            s.bow_cooldown = (s.bow_cooldown * t.cooldown_factor).max(t.bow_cooldown_min);
            s.bow_upgrades += 1;
            weapons::retime(state);
        }
        Upgrade::AuraRadius => {
            let s = &mut state.stats;
            s.aura_radius = (s.aura_radius + t.aura_radius_step).min(t.aura_radius_max);
            s.aura_upgrades += 1;
            weapons::resize_aura(state);
        }
        Upgrade::AuraDamage => {
            let s = &mut state.stats;
            s.aura_damage = (s.aura_damage + 1).min(t.aura_damage_max);
            s.aura_upgrades += 1;
        }
        Upgrade::BulletCooldown => {
            let s = &mut state.stats;
            s.bullet_cooldown = (s.bullet_cooldown * t.cooldown_factor).max(t.bullet_cooldown_min);
            s.bullet_upgrades += 1;
            weapons::retime(state);
        }
        Upgrade::BulletDamage => {
            let s = &mut state.stats;
            s.bullet_damage = (s.bullet_damage + t.bullet_damage_step).min(t.bullet_damage_max);
            s.bullet_upgrades += 1;
        }
        Upgrade::Heal => {
            combat::heal_player(state, t.heal_amount);
        }
        Upgrade::Speed => {
            let s = &mut state.stats;
            s.player_speed = (s.player_speed + t.speed_step).min(t.speed_max);
            let speed = s.player_speed_units();
            if let Some(player) = state.actors.get_mut(state.player) {
                player.speed = speed;
            }
        }
    }

    let widened = state.stats.refresh_materials();
    if widened > 0 {
        state.stats.shield_orbit_radius += t.shield_radius_step * widened as f32;
        log::debug!("Shield material tier {}", state.stats.shield_material);
    }

    log::info!("Upgrade applied: {}", upgrade.title());
    state.events.push(SimEvent::UpgradeApplied { upgrade });
}
