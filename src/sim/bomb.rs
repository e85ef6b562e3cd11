//! Bomb with a fixed fuse

use super::arena::{Arena, GridPos};
use super::entity::{Body, Entity, TextureKey};
use crate::consts::{MS_BOMB, MS_BOMB_TEXTURE_CHANGE, SCALE_BOMB_TO_WALL};

#[derive(Debug, Clone)]
pub struct Bomb {
    body: Body,
    fuse_ms: f32,
    blink_ms: f32,
    exploding: bool,
}

impl Bomb {
    /// Place a bomb centred in `cell`, fuse at zero
    pub fn place(arena: &Arena, cell: GridPos) -> Self {
        Self {
            body: Body::spawn_at(arena, cell, SCALE_BOMB_TO_WALL, TextureKey::Bomb),
            fuse_ms: 0.0,
            blink_ms: 0.0,
            exploding: false,
        }
    }

    /// Advance the fuse. Once exploding the bomb no longer changes; the owner
    /// must detonate and drop it.
    pub fn update(&mut self, dt_ms: f32) {
        if self.exploding {
            return;
        }
        self.fuse_ms += dt_ms;
        self.blink_ms += dt_ms;

        if self.fuse_ms >= MS_BOMB {
            self.exploding = true;
            return;
        }

        if self.blink_ms >= MS_BOMB_TEXTURE_CHANGE {
            self.body.texture = match self.body.texture {
                TextureKey::Bomb => TextureKey::BombIgnited,
                _ => TextureKey::Bomb,
            };
            self.blink_ms = 0.0;
        }
    }

    #[inline]
    pub fn is_exploding(&self) -> bool {
        self.exploding
    }

    pub fn fuse_ms(&self) -> f32 {
        self.fuse_ms
    }
}

impl Entity for Bomb {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}
