//! The Actor record
//!
//! One entity type for everything that moves or fights: the player,
//! hostiles, static blocks, weapon emitters, projectiles and effects. Behaviour
//! is selected by the `kind`, `ai` and `attack` tags.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actors::ActorId;
use super::animation::Animation;
use super::collision::{self, Neighbors};
use super::map::SpatialQuery;
use super::timer::Cooldown;
use crate::consts::DEFAULT_SPEED;

/// Broad category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    Player,
    StaticBlock,
    Platform,
    Hostile,
    Effect,
    Trigger,
    /// No category (scenery, markers)
    Unclassified,
}

/// Movement behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiKind {
    Wanderer,
    Follower,
    Flyer,
    /// Marker for fired projectiles; moved by velocity alone
    Bullet,
}

/// Weapon or effect classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackKind {
    Aura,
    Projectile,
    Melee,
    Shield,
    Bow,
    Arrow,
    Beam,
}

/// Cardinal facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
    Up,
    Down,
}

impl Facing {
    /// Facing along the dominant axis of `dir`; ties go horizontal
    pub fn from_vector(dir: Vec2) -> Self {
        if dir.x.abs() >= dir.y.abs() {
            if dir.x < 0.0 { Facing::Left } else { Facing::Right }
        } else if dir.y < 0.0 {
            Facing::Up
        } else {
            Facing::Down
        }
    }

    pub fn unit(self) -> Vec2 {
        match self {
            Facing::Left => Vec2::new(-1.0, 0.0),
            Facing::Right => Vec2::new(1.0, 0.0),
            Facing::Up => Vec2::new(0.0, -1.0),
            Facing::Down => Vec2::new(0.0, 1.0),
        }
    }

    pub fn index(self) -> usize {
        match self {
            Facing::Left => 0,
            Facing::Right => 1,
            Facing::Up => 2,
            Facing::Down => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Active,
    /// Logically dead; waiting for the reaper
    Inactive,
}

/// Contact flags from the last axis resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Contacts {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

/// Result of a damage application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Inactive target or invincibility window
    Ignored,
    Hit,
    /// This hit took the actor to zero
    Killed,
}

impl DamageOutcome {
    pub fn is_kill(self) -> bool {
        self == DamageOutcome::Killed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub kind: ActorKind,
    pub ai: Option<AiKind>,
    pub attack: Option<AttackKind>,
    pub status: Status,

    pub pos: Vec2,
    pub vel: Vec2,
    pub accel: Vec2,
    /// Movement intent (unit length or zero)
    pub movement: Vec2,
    pub facing: Facing,
    pub speed: f32,
    /// Remembered spawn point (wander centre, flyer patrol top)
    pub origin: Vec2,

    /// Render size
    pub scale: Vec2,
    /// Collider half extents; zero disables collision
    pub half_extents: Vec2,
    /// Render rotation in degrees
    pub angle: f32,
    /// Whether other actors treat this one as a solid
    pub check_collision: bool,
    pub contacts: Contacts,

    pub hp: i32,
    pub max_hp: i32,
    /// Length of the invincibility window granted by a hit (0 = none)
    pub invincibility_seconds: f32,
    pub invincible_timer: f32,
    /// Frozen time after spawning
    pub spawn_grace: f32,
    pub cooldown: Cooldown,
    /// Seconds left to live; `None` lives until killed
    pub lifetime: Option<f32>,
    /// Who fired or spawned this actor
    pub owner: Option<ActorId>,
    /// Last actor overlapped during axis resolution this tick
    pub collided: Option<ActorId>,
    /// Experience paid on death instead of the kind's default
    pub bounty: Option<u32>,

    pub animation: Animation,
}

impl Actor {
    pub fn new(id: ActorId, kind: ActorKind, pos: Vec2, scale: Vec2) -> Self {
        Self {
            id,
            kind,
            ai: None,
            attack: None,
            status: Status::Active,
            pos,
            vel: Vec2::ZERO,
            accel: Vec2::ZERO,
            movement: Vec2::ZERO,
            facing: Facing::Right,
            speed: DEFAULT_SPEED,
            origin: pos,
            scale,
            half_extents: scale * 0.5,
            angle: 0.0,
            check_collision: true,
            contacts: Contacts::default(),
            hp: 100,
            max_hp: 100,
            invincibility_seconds: 0.0,
            invincible_timer: 0.0,
            spawn_grace: 0.0,
            cooldown: Cooldown::default(),
            lifetime: None,
            owner: None,
            collided: None,
            bounty: None,
            animation: Animation::none(),
        }
    }

    /// Full collider size, stored as half extents
    pub fn with_collider(mut self, size: Vec2) -> Self {
        self.half_extents = size * 0.5;
        self
    }

    pub fn with_ai(mut self, ai: AiKind) -> Self {
        self.ai = Some(ai);
        self
    }

    pub fn with_attack(mut self, attack: AttackKind) -> Self {
        self.attack = Some(attack);
        self
    }

    pub fn with_hp(mut self, max_hp: i32) -> Self {
        self.set_max_hp(max_hp);
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_heading(mut self, dir: Vec2) -> Self {
        self.movement = dir;
        self.facing = Facing::from_vector(dir);
        self
    }

    pub fn with_lifetime(mut self, seconds: f32) -> Self {
        self.lifetime = Some(seconds);
        self
    }

    pub fn with_owner(mut self, owner: ActorId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_animation(mut self, animation: Animation) -> Self {
        self.animation = animation;
        self
    }

    pub fn with_bounty(mut self, experience: u32) -> Self {
        self.bounty = Some(experience);
        self
    }

    pub fn with_cooldown(mut self, interval: f32) -> Self {
        self.cooldown = Cooldown::new(interval);
        self
    }

    /// Not a solid for anyone else
    pub fn passive(mut self) -> Self {
        self.check_collision = false;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    pub fn is_hostile(&self) -> bool {
        self.kind == ActorKind::Hostile
    }

    /// Active hostile with health left
    pub fn is_live_hostile(&self) -> bool {
        self.is_hostile() && self.is_active() && !self.is_dead()
    }

    pub fn is_projectile(&self) -> bool {
        self.kind == ActorKind::Effect
            && self.ai == Some(AiKind::Bullet)
            && matches!(self.attack, Some(AttackKind::Projectile | AttackKind::Arrow))
    }

    pub fn has_collider(&self) -> bool {
        self.half_extents.x > 0.0 && self.half_extents.y > 0.0
    }

    pub fn deactivate(&mut self) {
        self.status = Status::Inactive;
    }

    pub fn set_max_hp(&mut self, max_hp: i32) {
        self.max_hp = max_hp.max(0);
        self.hp = self.max_hp;
    }

    /// Point the movement intent along a cardinal axis
    pub fn head(&mut self, facing: Facing) {
        self.facing = facing;
        self.movement = facing.unit();
    }

    /// Apply damage, clamping at zero. Death happens exactly once: an
    /// inactive actor ignores every later hit.
    pub fn take_damage(&mut self, amount: i32) -> DamageOutcome {
        if !self.is_active() {
            return DamageOutcome::Ignored;
        }
        if self.invincibility_seconds > 0.0 {
            if self.invincible_timer > 0.0 {
                return DamageOutcome::Ignored;
            }
            self.invincible_timer = self.invincibility_seconds;
        }
        self.hp = (self.hp - amount.max(0)).clamp(0, self.max_hp);
        if self.hp == 0 {
            self.deactivate();
            DamageOutcome::Killed
        } else {
            DamageOutcome::Hit
        }
    }

    /// Restore health up to the maximum; returns the amount actually healed
    pub fn heal(&mut self, amount: i32) -> i32 {
        if !self.is_active() {
            return 0;
        }
        let before = self.hp;
        self.hp = (self.hp + amount.max(0)).min(self.max_hp);
        self.hp - before
    }

    /// Count down the lifetime; true when it just ran out
    fn expire(&mut self, dt: f32) -> bool {
        let Some(remaining) = self.lifetime.as_mut() else {
            return false;
        };
        *remaining -= dt;
        if *remaining <= 0.0 {
            self.deactivate();
            true
        } else {
            false
        }
    }

    /// One fixed step of motion.
    ///
    /// Effects fly straight along their intent. Everything else integrates
    /// velocity and resolves Y before X, each axis against neighbouring
    /// actors first and the tile map second (blocks and platforms only).
    pub fn advance(&mut self, neighbors: &Neighbors<'_>, map: &dyn SpatialQuery, dt: f32) {
        if self.expire(dt) {
            return;
        }

        if self.kind == ActorKind::Effect {
            if self.is_active() {
                self.animation.advance(self.facing, dt);
                self.vel = self.movement * self.speed;
                self.pos += self.vel * dt;
            }
            return;
        }

        if !self.is_active() {
            return;
        }

        self.contacts = Contacts::default();
        self.collided = None;

        self.vel = self.movement * self.speed + self.accel * dt;
        if self.ai == Some(AiKind::Flyer) {
            match self.facing {
                Facing::Up => self.vel = Vec2::new(0.0, -self.speed),
                Facing::Down => self.vel = Vec2::new(0.0, self.speed),
                _ => {}
            }
        }

        if self.spawn_grace > 0.0 {
            self.spawn_grace -= dt;
            return;
        }

        let solid_map = matches!(self.kind, ActorKind::StaticBlock | ActorKind::Platform);

        self.pos.y += self.vel.y * dt;
        collision::resolve_actors_y(self, neighbors);
        if solid_map {
            collision::resolve_map_y(self, map);
        }

        self.pos.x += self.vel.x * dt;
        collision::resolve_actors_x(self, neighbors);
        if solid_map {
            collision::resolve_map_x(self, map);
        }

        if self.kind == ActorKind::Hostile || self.movement != Vec2::ZERO {
            self.animation.advance(self.facing, dt);
        }

        if self.invincible_timer > 0.0 {
            self.invincible_timer = (self.invincible_timer - dt).max(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::map::OpenGround;
    use proptest::prelude::*;

    fn hostile(hp: i32) -> Actor {
        Actor::new(ActorId(1), ActorKind::Hostile, Vec2::ZERO, Vec2::splat(25.0)).with_hp(hp)
    }

    #[test]
    fn test_facing_from_vector() {
        assert_eq!(Facing::from_vector(Vec2::new(-2.0, 1.0)), Facing::Left);
        assert_eq!(Facing::from_vector(Vec2::new(1.0, 1.0)), Facing::Right);
        assert_eq!(Facing::from_vector(Vec2::new(0.2, -1.0)), Facing::Up);
        assert_eq!(Facing::from_vector(Vec2::new(0.0, 3.0)), Facing::Down);
    }

    #[test]
    fn test_death_happens_once() {
        let mut a = hostile(10);
        assert_eq!(a.take_damage(4), DamageOutcome::Hit);
        assert_eq!(a.take_damage(40), DamageOutcome::Killed);
        assert_eq!(a.hp, 0);
        assert_eq!(a.status, Status::Inactive);
        assert_eq!(a.take_damage(1), DamageOutcome::Ignored);
        assert_eq!(a.hp, 0);
    }

    #[test]
    fn test_player_invincibility_window() {
        let mut p = Actor::new(ActorId(1), ActorKind::Player, Vec2::ZERO, Vec2::splat(32.0));
        p.invincibility_seconds = 0.3;
        assert_eq!(p.take_damage(10), DamageOutcome::Hit);
        assert_eq!(p.take_damage(10), DamageOutcome::Ignored);
        assert_eq!(p.hp, 90);

        let others: [Actor; 0] = [];
        let neighbors = Neighbors::new(&others, &[]);
        for _ in 0..20 {
            p.advance(&neighbors, &OpenGround, 1.0 / 60.0);
        }
        assert_eq!(p.take_damage(10), DamageOutcome::Hit);
        assert_eq!(p.hp, 80);
    }

    #[test]
    fn test_heal_clamps() {
        let mut a = hostile(50);
        a.take_damage(5);
        assert_eq!(a.heal(20), 5);
        assert_eq!(a.hp, 50);
    }

    #[test]
    fn test_lifetime_expires() {
        let mut bolt = Actor::new(ActorId(2), ActorKind::Effect, Vec2::ZERO, Vec2::splat(10.0))
            .with_ai(AiKind::Bullet)
            .with_attack(AttackKind::Arrow)
            .with_heading(Vec2::X)
            .with_speed(100.0)
            .with_lifetime(0.5);
        let neighbors = Neighbors::new(&[], &[]);
        bolt.advance(&neighbors, &OpenGround, 0.25);
        assert!(bolt.is_active());
        assert!((bolt.pos.x - 25.0).abs() < 1e-4);
        bolt.advance(&neighbors, &OpenGround, 0.25);
        assert!(!bolt.is_active());
        // no movement on the expiring step
        assert!((bolt.pos.x - 25.0).abs() < 1e-4);
    }

    #[test]
    fn test_flyer_velocity_follows_facing() {
        let mut flyer = hostile(18).with_ai(AiKind::Flyer).with_speed(20.0);
        flyer.head(Facing::Down);
        let neighbors = Neighbors::new(&[], &[]);
        flyer.advance(&neighbors, &OpenGround, 0.5);
        assert_eq!(flyer.vel, Vec2::new(0.0, 20.0));
        assert!((flyer.pos.y - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_spawn_grace_freezes_motion() {
        let mut a = hostile(20).with_heading(Vec2::X);
        a.spawn_grace = 0.5;
        let neighbors = Neighbors::new(&[], &[]);
        a.advance(&neighbors, &OpenGround, 0.25);
        assert_eq!(a.pos, Vec2::ZERO);
    }

    proptest! {
        #[test]
        fn prop_health_stays_clamped(max_hp in 1i32..500, hits in proptest::collection::vec(-20i32..200, 0..40)) {
            let mut a = hostile(max_hp);
            let mut kills = 0;
            for dmg in hits {
                if a.take_damage(dmg) == DamageOutcome::Killed {
                    kills += 1;
                }
                prop_assert!(a.hp >= 0 && a.hp <= a.max_hp);
                if a.hp == 0 {
                    prop_assert_eq!(a.status, Status::Inactive);
                }
            }
            prop_assert!(kills <= 1);
            prop_assert_eq!(kills == 1, a.hp == 0);
        }
    }
}
