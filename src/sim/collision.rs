//! Collision detection and axis-separated resolution
//!
//! Overlap is a separating-axis test on axis-aligned boxes. Resolution runs
//! one axis at a time: after a Y move the actor is backed out along Y, after
//! the X move along X. Horizontal contacts with almost no vertical overlap are
//! ignored so a surface the actor rests on does not act as a wall.

use glam::Vec2;

use super::actor::{Actor, ActorKind};
use super::map::SpatialQuery;
use crate::consts::{TILE_PUSH_SCALE, Y_COLLISION_THRESHOLD};

/// Boxes given by centre and half extents overlap (touching does not count)
#[inline]
pub fn aabb_overlap(a_pos: Vec2, a_half: Vec2, b_pos: Vec2, b_half: Vec2) -> bool {
    let gap = (a_pos - b_pos).abs() - (a_half + b_half);
    gap.x < 0.0 && gap.y < 0.0
}

/// Penetration depth on each axis for two boxes
#[inline]
pub fn penetration(a_pos: Vec2, a_half: Vec2, b_pos: Vec2, b_half: Vec2) -> Vec2 {
    ((a_pos - b_pos).abs() - a_half - b_half).abs()
}

/// Actor-vs-actor overlap. Inactive actors, the actor itself and zero-size
/// colliders never overlap anything.
pub fn overlaps(a: &Actor, b: &Actor) -> bool {
    if a.id == b.id || !a.is_active() || !b.is_active() {
        return false;
    }
    if !a.has_collider() || !b.has_collider() {
        return false;
    }
    aabb_overlap(a.pos, a.half_extents, b.pos, b.half_extents)
}

/// Every actor except the one being moved
#[derive(Debug, Clone, Copy)]
pub struct Neighbors<'a> {
    before: &'a [Actor],
    after: &'a [Actor],
}

impl<'a> Neighbors<'a> {
    pub fn new(before: &'a [Actor], after: &'a [Actor]) -> Self {
        Self { before, after }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Actor> + 'a {
        self.before.iter().chain(self.after.iter())
    }
}

/// Split out `list[index]` mutably with read access to everyone else
pub fn split_neighbors(list: &mut [Actor], index: usize) -> Option<(&mut Actor, Neighbors<'_>)> {
    if index >= list.len() {
        return None;
    }
    let (before, rest) = list.split_at_mut(index);
    let (actor, after) = rest.split_first_mut()?;
    Some((actor, Neighbors::new(before, after)))
}

/// Which neighbours count as obstacles for `actor`. Records the overlap as the
/// collided object and reports whether a physical push-back applies.
fn contact(actor: &mut Actor, other: &Actor) -> bool {
    // bodies fly through projectiles; the combat pass handles those hits
    if matches!(actor.kind, ActorKind::Player | ActorKind::Hostile) && other.is_projectile() {
        return false;
    }
    if !other.check_collision || !overlaps(actor, other) {
        return false;
    }
    actor.collided = Some(other.id);
    // crowds pass through hostiles
    other.kind != ActorKind::Hostile
}

pub fn resolve_actors_y(actor: &mut Actor, neighbors: &Neighbors<'_>) {
    for other in neighbors.iter() {
        if !contact(actor, other) {
            continue;
        }
        let depth = penetration(actor.pos, actor.half_extents, other.pos, other.half_extents);
        if actor.vel.y > 0.0 {
            actor.pos.y -= depth.y;
            actor.vel.y = 0.0;
            actor.contacts.bottom = true;
        } else if actor.vel.y < 0.0 {
            actor.pos.y += depth.y;
            actor.vel.y = 0.0;
            actor.contacts.top = true;
        }
    }
}

pub fn resolve_actors_x(actor: &mut Actor, neighbors: &Neighbors<'_>) {
    for other in neighbors.iter() {
        if !contact(actor, other) {
            continue;
        }
        let depth = penetration(actor.pos, actor.half_extents, other.pos, other.half_extents);
        if depth.y < Y_COLLISION_THRESHOLD {
            continue;
        }
        if actor.vel.x > 0.0 {
            actor.pos.x -= depth.x;
            actor.vel.x = 0.0;
            actor.contacts.right = true;
        } else if actor.vel.x < 0.0 {
            actor.pos.x += depth.x;
            actor.vel.x = 0.0;
            actor.contacts.left = true;
        }
    }
}

/// First solid hit among the sample points
fn first_solid(map: &dyn SpatialQuery, points: &[Vec2]) -> Option<Vec2> {
    points.iter().find_map(|p| map.solid_depth(*p))
}

pub fn resolve_map_y(actor: &mut Actor, map: &dyn SpatialQuery) {
    let h = actor.half_extents;
    let top = actor.pos.y - h.y;
    let bottom = actor.pos.y + h.y;
    let xs = [actor.pos.x, actor.pos.x - h.x, actor.pos.x + h.x];

    if actor.vel.y < 0.0 {
        if let Some(depth) = first_solid(map, &xs.map(|x| Vec2::new(x, top))) {
            actor.pos.y += depth.y;
            actor.vel.y = 0.0;
            actor.contacts.top = true;
        }
    }
    if actor.vel.y > 0.0 {
        if let Some(depth) = first_solid(map, &xs.map(|x| Vec2::new(x, bottom))) {
            actor.pos.y -= depth.y;
            actor.vel.y = 0.0;
            actor.contacts.bottom = true;
        }
    }
}

pub fn resolve_map_x(actor: &mut Actor, map: &dyn SpatialQuery) {
    let h = actor.half_extents;
    let right = Vec2::new(actor.pos.x + h.x, actor.pos.y);
    let left = Vec2::new(actor.pos.x - h.x, actor.pos.y);

    if actor.vel.x > 0.0 {
        if let Some(depth) = map.solid_depth(right).filter(|d| d.y >= Y_COLLISION_THRESHOLD) {
            actor.pos.x -= depth.x * TILE_PUSH_SCALE;
            actor.vel.x = 0.0;
            actor.contacts.right = true;
        }
    }
    if actor.vel.x < 0.0 {
        if let Some(depth) = map.solid_depth(left).filter(|d| d.y >= Y_COLLISION_THRESHOLD) {
            actor.pos.x += depth.x * TILE_PUSH_SCALE;
            actor.vel.x = 0.0;
            actor.contacts.left = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::actor::{AiKind, AttackKind};
    use crate::sim::actors::ActorId;
    use crate::sim::map::{OpenGround, TileGrid};

    fn body(id: u64, kind: ActorKind, pos: Vec2, size: f32) -> Actor {
        Actor::new(ActorId(id), kind, pos, Vec2::splat(size))
    }

    #[test]
    fn test_aabb_overlap_excludes_touching() {
        let h = Vec2::splat(5.0);
        assert!(aabb_overlap(Vec2::ZERO, h, Vec2::new(9.0, 9.0), h));
        assert!(!aabb_overlap(Vec2::ZERO, h, Vec2::new(10.0, 0.0), h));
        assert!(!aabb_overlap(Vec2::ZERO, h, Vec2::new(3.0, 11.0), h));
    }

    #[test]
    fn test_zero_extent_and_inactive_never_overlap() {
        let a = body(1, ActorKind::Player, Vec2::ZERO, 10.0);
        let emitter = body(2, ActorKind::Effect, Vec2::ZERO, 0.0);
        let mut ghost = body(3, ActorKind::Hostile, Vec2::ZERO, 10.0);
        ghost.deactivate();
        assert!(!overlaps(&a, &emitter));
        assert!(!overlaps(&emitter, &a));
        assert!(!overlaps(&a, &ghost));
        assert!(!overlaps(&a, &a));
    }

    #[test]
    fn test_falling_onto_block_stops_flush() {
        // 10x10 player above a 20x20 block, moving straight down into it
        let mut list = vec![
            body(1, ActorKind::Player, Vec2::new(0.0, 0.0), 10.0),
            body(2, ActorKind::StaticBlock, Vec2::new(0.0, 20.0), 20.0),
        ];
        list[0].movement = Vec2::new(0.0, 1.0);
        list[0].speed = 40.0;

        let (player, neighbors) = split_neighbors(&mut list, 0).unwrap();
        player.advance(&neighbors, &OpenGround, 0.25);

        assert_eq!(player.pos, Vec2::new(0.0, 5.0));
        assert_eq!(player.vel.y, 0.0);
        assert!(player.contacts.bottom);
        assert_eq!(player.collided, Some(ActorId(2)));
        let block = &list[1];
        let player = &list[0];
        assert!(!aabb_overlap(player.pos, player.half_extents, block.pos, block.half_extents));
    }

    #[test]
    fn test_side_push_out() {
        let mut list = vec![
            body(1, ActorKind::StaticBlock, Vec2::new(20.0, 0.0), 20.0),
            body(2, ActorKind::Player, Vec2::new(0.0, 0.0), 10.0),
        ];
        list[1].movement = Vec2::new(1.0, 0.0);
        list[1].speed = 40.0;

        let (player, neighbors) = split_neighbors(&mut list, 1).unwrap();
        player.advance(&neighbors, &OpenGround, 0.25);

        assert_eq!(player.pos, Vec2::new(5.0, 0.0));
        assert_eq!(player.vel.x, 0.0);
        assert!(player.contacts.right);
    }

    #[test]
    fn test_resting_contact_is_not_a_wall() {
        // barely sunk into the block below: horizontal move must not be blocked
        let mut list = vec![
            body(1, ActorKind::Player, Vec2::new(0.0, 0.0), 10.0),
            body(2, ActorKind::StaticBlock, Vec2::new(12.0, 14.75), 20.0),
        ];
        list[0].vel = Vec2::new(10.0, 0.0);
        let (player, neighbors) = split_neighbors(&mut list, 0).unwrap();
        resolve_actors_x(player, &neighbors);
        assert_eq!(player.pos.x, 0.0);
        assert_eq!(player.vel.x, 10.0);
        assert_eq!(player.collided, Some(ActorId(2)));
    }

    #[test]
    fn test_hostiles_are_pass_through() {
        let mut list = vec![
            body(1, ActorKind::Hostile, Vec2::new(0.0, 0.0), 10.0),
            body(2, ActorKind::Hostile, Vec2::new(0.0, 8.0), 10.0),
        ];
        list[0].movement = Vec2::new(0.0, 1.0);
        list[0].speed = 8.0;
        let (a, neighbors) = split_neighbors(&mut list, 0).unwrap();
        a.advance(&neighbors, &OpenGround, 0.25);
        assert_eq!(a.pos, Vec2::new(0.0, 2.0));
        assert_eq!(a.collided, Some(ActorId(2)));
    }

    #[test]
    fn test_projectiles_are_not_obstacles() {
        let mut bolt = body(2, ActorKind::Effect, Vec2::new(0.0, 4.0), 10.0)
            .with_ai(AiKind::Bullet)
            .with_attack(AttackKind::Projectile);
        bolt.check_collision = true;
        let mut list = vec![body(1, ActorKind::Player, Vec2::ZERO, 10.0), bolt];
        list[0].vel = Vec2::new(0.0, 5.0);
        let (player, neighbors) = split_neighbors(&mut list, 0).unwrap();
        resolve_actors_y(player, &neighbors);
        assert_eq!(player.collided, None);
        assert_eq!(player.pos, Vec2::ZERO);
    }

    #[test]
    fn test_block_rests_on_tile_map() {
        // 4x4 grid of 10 centred on origin, bottom row solid (y 10..20)
        let mut grid = TileGrid::new(Vec2::ZERO, 4, 4, 10.0);
        for c in 0..4 {
            grid.set(c, 3, 1);
        }
        let mut crate_box = body(1, ActorKind::StaticBlock, Vec2::new(0.0, 2.0), 10.0);
        crate_box.movement = Vec2::new(0.0, 1.0);
        crate_box.speed = 20.0;
        let neighbors = Neighbors::new(&[], &[]);
        crate_box.advance(&neighbors, &grid, 0.25);
        // moved to y=7, bottom edge at 12 sunk 2 into the row
        assert!((crate_box.pos.y - 5.0).abs() < 1e-5);
        assert_eq!(crate_box.vel.y, 0.0);
        assert!(crate_box.contacts.bottom);
    }

    #[test]
    fn test_block_pushed_out_of_solid_column() {
        // column 2 (x 0..10) solid top to bottom
        let mut grid = TileGrid::new(Vec2::ZERO, 4, 4, 10.0);
        for r in 0..4 {
            grid.set(2, r, 1);
        }
        let mut crate_box = body(1, ActorKind::StaticBlock, Vec2::new(-8.0, 5.0), 10.0);
        crate_box.movement = Vec2::new(1.0, 0.0);
        crate_box.speed = 20.0;
        let neighbors = Neighbors::new(&[], &[]);
        crate_box.advance(&neighbors, &grid, 0.25);
        // moved to x=-3, right edge sunk 2 into the column, backed out 2.02
        assert!((crate_box.pos.x + 5.02).abs() < 1e-4);
        assert_eq!(crate_box.pos.y, 5.0);
        assert_eq!(crate_box.vel.x, 0.0);
        assert!(crate_box.contacts.right);
        assert!(!crate_box.contacts.left);
    }

    #[test]
    fn test_shallow_tile_contact_is_not_a_wall() {
        // single solid cell (x 0..10, y 0..10); sample point sits 0.25 into it
        let mut grid = TileGrid::new(Vec2::ZERO, 4, 4, 10.0);
        grid.set(2, 2, 1);
        let mut crate_box = body(1, ActorKind::StaticBlock, Vec2::new(-3.0, 0.25), 10.0);
        crate_box.vel = Vec2::new(10.0, 0.0);
        resolve_map_x(&mut crate_box, &grid);
        assert_eq!(crate_box.pos.x, -3.0);
        assert_eq!(crate_box.vel.x, 10.0);
        assert!(!crate_box.contacts.right);

        // same contact a full unit deep does block
        crate_box.pos.y = 1.0;
        resolve_map_x(&mut crate_box, &grid);
        assert!((crate_box.pos.x + 5.02).abs() < 1e-4);
        assert!(crate_box.contacts.right);
    }

    #[test]
    fn test_player_ignores_tile_map() {
        let mut grid = TileGrid::new(Vec2::ZERO, 4, 4, 10.0);
        grid.set(1, 2, 1);
        let mut p = body(1, ActorKind::Player, Vec2::new(-5.0, 0.0), 10.0);
        p.movement = Vec2::new(0.0, 1.0);
        p.speed = 20.0;
        let neighbors = Neighbors::new(&[], &[]);
        p.advance(&neighbors, &grid, 0.25);
        assert!((p.pos.y - 5.0).abs() < 1e-5);
    }
}
