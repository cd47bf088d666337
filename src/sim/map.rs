//! Static geometry queries
//!
//! The simulation only asks one question of the level geometry: does this
//! point sit inside a solid cell, and if so how deep on each axis.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::tuning::ArenaTuning;

pub trait SpatialQuery {
    /// Penetration of `point` into a solid cell on each axis, or `None` for
    /// open space. Points outside the grid are never solid.
    fn solid_depth(&self, point: Vec2) -> Option<Vec2>;
}

/// Geometry with no solids at all
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenGround;

impl SpatialQuery for OpenGround {
    fn solid_depth(&self, _point: Vec2) -> Option<Vec2> {
        None
    }
}

/// Row-major grid of tile ids centred on `origin`; id 0 is empty
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileGrid {
    pub origin: Vec2,
    pub columns: u32,
    pub rows: u32,
    pub cell_size: f32,
    cells: Vec<u32>,
}

impl TileGrid {
    /// All-empty grid
    pub fn new(origin: Vec2, columns: u32, rows: u32, cell_size: f32) -> Self {
        Self {
            origin,
            columns,
            rows,
            cell_size,
            cells: vec![0; (columns * rows) as usize],
        }
    }

    pub fn from_arena(arena: &ArenaTuning) -> Self {
        Self::new(arena.origin, arena.columns, arena.rows, arena.cell_size)
    }

    /// Top-left corner of the grid
    fn corner(&self) -> Vec2 {
        self.origin - Vec2::new(self.columns as f32, self.rows as f32) * self.cell_size * 0.5
    }

    pub fn set(&mut self, column: u32, row: u32, tile: u32) {
        if column < self.columns && row < self.rows {
            self.cells[(row * self.columns + column) as usize] = tile;
        }
    }

    pub fn tile(&self, column: u32, row: u32) -> u32 {
        if column < self.columns && row < self.rows {
            self.cells[(row * self.columns + column) as usize]
        } else {
            0
        }
    }

    /// World-space centre of a cell
    pub fn cell_center(&self, column: u32, row: u32) -> Vec2 {
        self.corner() + (Vec2::new(column as f32, row as f32) + 0.5) * self.cell_size
    }
}

impl SpatialQuery for TileGrid {
    fn solid_depth(&self, point: Vec2) -> Option<Vec2> {
        let local = (point - self.corner()) / self.cell_size;
        if local.x < 0.0 || local.y < 0.0 {
            return None;
        }
        let (column, row) = (local.x.floor() as u32, local.y.floor() as u32);
        if column >= self.columns || row >= self.rows || self.tile(column, row) == 0 {
            return None;
        }
        let half = self.cell_size * 0.5;
        let depth = Vec2::splat(half) - (point - self.cell_center(column, row)).abs();
        Some(depth.max(Vec2::ZERO))
    }
}
