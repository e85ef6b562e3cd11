//! Breakable wall: solid until a blast cell overlaps it

use super::arena::{Arena, GridPos};
use super::entity::{Body, Entity, TextureKey};
use crate::consts::SCALE_BREAKABLE_WALL_TO_WALL;

#[derive(Debug, Clone)]
pub struct BreakableWall {
    body: Body,
    cell: GridPos,
}

impl BreakableWall {
    pub fn spawn(arena: &Arena, cell: GridPos) -> Self {
        Self {
            body: Body::spawn_at(arena, cell, SCALE_BREAKABLE_WALL_TO_WALL, TextureKey::BreakableWall),
            cell,
        }
    }

    /// Grid cell the wall was placed in. Walls never move.
    pub fn grid_pos(&self) -> GridPos {
        self.cell
    }
}

impl Entity for BreakableWall {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn cell(&self, _arena: &Arena) -> GridPos {
        self.cell
    }
}
