//! Entity base: a positioned, sized box with a texture key
//!
//! Every concrete entity (player, enemy, bomb, blast cell, breakable wall,
//! door) owns a [`Body`] and exposes it through the [`Entity`] trait.
//! Entities never hold references to each other; anything they must avoid or
//! react to is passed in through a [`MoveContext`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::arena::{Arena, GridPos};
use super::collision::{self, Rect};

/// Horizontal facing of a sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// Opaque texture handle understood by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "frame")]
pub enum TextureKey {
    PlayerIdle,
    PlayerWalk(u8),
    Ghost(u8),
    Bomb,
    BombIgnited,
    Explosion,
    BreakableWall,
    Door,
}

/// Position, size and presentation state shared by all entities
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Top-left corner in canvas units
    pub pos: Vec2,
    pub size: Vec2,
    /// Size relative to one grid cell
    pub scale_to_wall: f32,
    pub texture: TextureKey,
    pub facing: Facing,
    pub visible: bool,
}

impl Body {
    /// Create a body centred in `cell`
    pub fn spawn_at(arena: &Arena, cell: GridPos, scale_to_wall: f32, texture: TextureKey) -> Self {
        let mut body = Self {
            pos: Vec2::ZERO,
            size: Vec2::ZERO,
            scale_to_wall,
            texture,
            facing: Facing::Right,
            visible: true,
        };
        body.place(arena, cell);
        body
    }

    /// Re-derive the size from the current cell metrics and centre the box in `cell`
    pub fn place(&mut self, arena: &Arena, cell: GridPos) {
        let cell_size = arena.cell_size();
        self.size = cell_size * self.scale_to_wall;
        let origin = arena.grid_to_canvas(cell.col, cell.row).origin();
        self.pos = origin + (cell_size - self.size) / 2.0;
    }

    /// Top-left corner this body would have when centred in `cell`
    pub fn anchor_in(&self, arena: &Arena, cell: GridPos) -> Vec2 {
        let origin = arena.grid_to_canvas(cell.col, cell.row).origin();
        origin + (arena.cell_size() - self.size) / 2.0
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    /// The grid cell containing this body's centre
    pub fn cell(&self, arena: &Arena) -> GridPos {
        let corner = self.rect().center() - arena.cell_size() / 2.0;
        arena.canvas_to_grid(corner.x, corner.y)
    }

    /// Turn to face the direction of horizontal travel. The box does not move.
    pub fn face_towards(&mut self, delta_x: f32) {
        if delta_x < 0.0 {
            self.facing = Facing::Left;
        } else if delta_x > 0.0 {
            self.facing = Facing::Right;
        }
    }

    /// Rescale after a viewport change: size from the new cell metrics,
    /// position by the per-axis resize ratio.
    pub fn redraw(&mut self, arena: &Arena, ratio: Vec2) {
        self.size = arena.cell_size() * self.scale_to_wall;
        self.pos *= ratio;
    }

    /// Hit-test against hazards, then move by `delta` with each axis resolved
    /// independently against walls, solid obstacles and escapable obstacles.
    pub fn step(&mut self, delta: Vec2, ctx: &MoveContext<'_>) -> MoveOutcome {
        let rect = self.rect();
        let hit = collision::hits_any(&rect, ctx.hazards);

        let blocked = ctx
            .arena
            .wall_collision(&rect, delta)
            .merge(collision::resolve(&rect, delta, ctx.obstacles))
            .merge(collision::resolve(&rect, delta, ctx.escapable));

        let applied = blocked.apply(delta);
        self.pos += applied;

        MoveOutcome {
            hit,
            delta: applied,
            fully_blocked: delta != Vec2::ZERO && applied == Vec2::ZERO,
        }
    }
}

/// Everything an entity may collide with during one update
#[derive(Debug, Clone, Copy)]
pub struct MoveContext<'a> {
    pub arena: &'a Arena,
    /// Solid boxes (breakable walls)
    pub obstacles: &'a [Rect],
    /// Boxes that can be walked out of but not into (bombs)
    pub escapable: &'a [Rect],
    /// Boxes that count as a hit on overlap (blast cells, enemy hitboxes)
    pub hazards: &'a [Rect],
}

impl<'a> MoveContext<'a> {
    /// Context with walls only
    pub fn walls_only(arena: &'a Arena) -> Self {
        Self {
            arena,
            obstacles: &[],
            escapable: &[],
            hazards: &[],
        }
    }
}

/// Result of [`Body::step`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveOutcome {
    /// Overlapped a hazard before moving
    pub hit: bool,
    /// Delta actually applied after blocking
    pub delta: Vec2,
    /// A non-zero move was requested but nothing was applied
    pub fully_blocked: bool,
}

/// Common interface of all entity kinds
pub trait Entity {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;

    fn rect(&self) -> Rect {
        self.body().rect()
    }

    fn cell(&self, arena: &Arena) -> GridPos {
        self.body().cell(arena)
    }

    /// Rescale after a viewport change
    fn redraw(&mut self, arena: &Arena, ratio: Vec2) {
        self.body_mut().redraw(arena, ratio);
    }

    fn show(&mut self) {
        self.body_mut().visible = true;
    }

    fn hide(&mut self) {
        self.body_mut().visible = false;
    }
}

/// Exit door: a plain body with no behaviour
#[derive(Debug, Clone)]
pub struct Door {
    body: Body,
}

impl Door {
    pub fn spawn(arena: &Arena, cell: GridPos, scale_to_wall: f32) -> Self {
        Self {
            body: Body::spawn_at(arena, cell, scale_to_wall, TextureKey::Door),
        }
    }

    /// True once `other` is completely inside the door
    pub fn contains(&self, other: &Rect) -> bool {
        self.body.rect().contains(other)
    }
}

impl Entity for Door {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}
