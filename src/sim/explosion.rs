//! Explosion: a short-lived cross of blast cells
//!
//! The blast covers the detonation cell plus each cardinal neighbour that is
//! empty at spawn time. Static walls stop it; breakable walls do not (they are
//! what it destroys).

use glam::Vec2;

use super::arena::{Arena, GridPos};
use super::collision::Rect;
use super::entity::{Body, Entity, TextureKey};
use super::error::{SessionError, SessionResult};
use crate::consts::{MS_EXPLOSION, SCALE_EXPLOSION_TO_WALL};

const SPREAD: [(i64, i64); 4] = [(0, -1), (0, 1), (1, 0), (-1, 0)];

/// One cell of an explosion
#[derive(Debug, Clone)]
pub struct BlastCell {
    body: Body,
}

impl Entity for BlastCell {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

#[derive(Debug, Clone)]
pub struct Explosion {
    origin: GridPos,
    cells: Vec<BlastCell>,
    elapsed_ms: f32,
    finished: bool,
}

impl Explosion {
    /// Spawn an explosion centred on `cell`. Border and off-grid cells are
    /// rejected with nothing spawned.
    pub fn spawn(arena: &Arena, cell: GridPos) -> SessionResult<Self> {
        if !arena.in_bounds(cell) || arena.is_border(cell) {
            log::error!("Invalid bomb detonation coordinates: [{}, {}]", cell.col, cell.row);
            return Err(SessionError::InvalidExplosionCell {
                col: cell.col as i64,
                row: cell.row as i64,
            });
        }

        let mut cells = vec![Self::blast(arena, cell)];
        for (dc, dr) in SPREAD {
            if let Some(n) = cell.offset(dc, dr).filter(|n| arena.is_empty(*n)) {
                cells.push(Self::blast(arena, n));
            }
        }

        Ok(Self {
            origin: cell,
            cells,
            elapsed_ms: 0.0,
            finished: false,
        })
    }

    fn blast(arena: &Arena, cell: GridPos) -> BlastCell {
        BlastCell {
            body: Body::spawn_at(arena, cell, SCALE_EXPLOSION_TO_WALL, TextureKey::Explosion),
        }
    }

    /// Advance the lifetime; once it runs out the blast cells are dropped.
    pub fn update(&mut self, dt_ms: f32) {
        if self.finished {
            return;
        }
        self.elapsed_ms += dt_ms;
        if self.elapsed_ms >= MS_EXPLOSION {
            self.cells.clear();
            self.finished = true;
        }
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn origin(&self) -> GridPos {
        self.origin
    }

    pub fn cells(&self) -> &[BlastCell] {
        &self.cells
    }

    pub fn cell_rects(&self) -> impl Iterator<Item = Rect> + '_ {
        self.cells.iter().map(|c| c.rect())
    }

    pub fn redraw(&mut self, arena: &Arena, ratio: Vec2) {
        for cell in &mut self.cells {
            cell.redraw(arena, ratio);
        }
    }
}
