//! The player-controlled bomber

use glam::Vec2;

use super::arena::{Arena, GridPos};
use super::entity::{Body, Entity, MoveContext, MoveOutcome, TextureKey};
use crate::consts::{
    MS_MOVEMENT_SPRITE_CHANGE_PLAYER, PLAYER_SPEED_FACTOR, PLAYER_WALK_FRAMES, SCALE_PLAYER_TO_WALL,
};

/// Held direction keys for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Direction {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Direction {
    /// Unit-free delta: each held key contributes -1 or +1 on its axis
    pub fn as_vec2(&self) -> Vec2 {
        let mut v = Vec2::ZERO;
        if self.left {
            v.x -= 1.0;
        }
        if self.right {
            v.x += 1.0;
        }
        if self.up {
            v.y -= 1.0;
        }
        if self.down {
            v.y += 1.0;
        }
        v
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    body: Body,
    is_moving: bool,
    /// Canvas units per second
    speed: f32,
    walk_frame: u8,
    walk_elapsed_ms: f32,
}

impl Player {
    pub fn spawn(arena: &Arena, cell: GridPos) -> Self {
        Self {
            body: Body::spawn_at(arena, cell, SCALE_PLAYER_TO_WALL, TextureKey::PlayerIdle),
            is_moving: false,
            speed: Self::speed_for(arena),
            walk_frame: 0,
            walk_elapsed_ms: 0.0,
        }
    }

    fn speed_for(arena: &Arena) -> f32 {
        arena.viewport().height * PLAYER_SPEED_FACTOR
    }

    pub fn is_moving(&self) -> bool {
        self.is_moving
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Move by the held keys and advance the walk cycle
    pub fn update(&mut self, dt_ms: f32, keys: Direction, ctx: &MoveContext<'_>) -> MoveOutcome {
        let delta = keys.as_vec2() * (self.speed * dt_ms / 1000.0);
        self.is_moving = delta != Vec2::ZERO;
        self.body.face_towards(delta.x);

        if self.is_moving {
            self.walk_elapsed_ms += dt_ms;
            if self.walk_elapsed_ms >= MS_MOVEMENT_SPRITE_CHANGE_PLAYER {
                self.walk_frame = (self.walk_frame + 1) % PLAYER_WALK_FRAMES;
                self.walk_elapsed_ms = 0.0;
            }
            self.body.texture = TextureKey::PlayerWalk(self.walk_frame);
        } else {
            self.set_idle();
        }

        self.body.step(delta, ctx)
    }

    /// Stop walking and show the idle texture
    pub fn set_idle(&mut self) {
        self.is_moving = false;
        self.walk_elapsed_ms = 0.0;
        self.body.texture = TextureKey::PlayerIdle;
    }
}

impl Entity for Player {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn redraw(&mut self, arena: &Arena, ratio: Vec2) {
        self.body.redraw(arena, ratio);
        self.speed = Self::speed_for(arena);
    }
}
