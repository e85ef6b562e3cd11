//! Path-following enemy
//!
//! An enemy with no remaining path spends its frame planning one; otherwise it
//! walks toward the next waypoint, dropping each waypoint once it is within
//! epsilon of it.

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;

use super::arena::{Arena, GridPos};
use super::collision::Rect;
use super::entity::{Body, Entity, MoveContext, MoveOutcome, TextureKey};
use super::pathfind::{self, Difficulty, Graph, OccupancyGrid, Search};
use crate::consts::{
    ENEMY_FRAMES, ENEMY_SPEED_FACTOR, EPSILON_FACTOR, MS_SPRITE_CHANGE_ENEMY, SCALE_ENEMY_HITBOX,
    SCALE_ENEMY_TO_WALL,
};

/// What an enemy needs to know to plan a path
#[derive(Debug, Clone, Copy)]
pub struct PathContext<'a> {
    /// Cells blocked on top of static walls (breakable walls, bombs)
    pub blocked: &'a [GridPos],
    pub player_cell: GridPos,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    body: Body,
    difficulty: Difficulty,
    path: VecDeque<GridPos>,
    speed: f32,
    epsilon: f32,
    frame: u8,
    frame_ms: f32,
}

impl Enemy {
    pub fn spawn(arena: &Arena, cell: GridPos, difficulty: Difficulty) -> Self {
        let height = arena.viewport().height;
        Self {
            body: Body::spawn_at(arena, cell, SCALE_ENEMY_TO_WALL, TextureKey::Ghost(0)),
            difficulty,
            path: VecDeque::new(),
            speed: height * ENEMY_SPEED_FACTOR,
            epsilon: height * EPSILON_FACTOR,
            frame: 0,
            frame_ms: 0.0,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn remaining_path(&self) -> impl ExactSizeIterator<Item = &GridPos> {
        self.path.iter()
    }

    /// Forget the current path; a new one is planned on the next update
    pub fn clear_path(&mut self) {
        self.path.clear();
    }

    /// Box used for player contact: the sprite box shrunk about its centre
    pub fn hitbox(&self) -> Rect {
        self.body.rect().scaled_about_center(SCALE_ENEMY_HITBOX)
    }

    /// Animate, then either plan a path or walk along the current one
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt_ms: f32,
        ctx: &MoveContext<'_>,
        plan: &PathContext<'_>,
        rng: &mut R,
    ) -> MoveOutcome {
        self.animate(dt_ms);

        let delta = if self.path.is_empty() {
            self.calculate_path(ctx.arena, plan, rng);
            Vec2::ZERO
        } else {
            self.delta_towards_waypoint(ctx.arena, dt_ms)
        };

        self.body.face_towards(delta.x);
        let outcome = self.body.step(delta, ctx);
        if outcome.fully_blocked {
            self.path.clear();
        }
        outcome
    }

    fn animate(&mut self, dt_ms: f32) {
        self.frame_ms += dt_ms;
        if self.frame_ms >= MS_SPRITE_CHANGE_ENEMY {
            self.frame = (self.frame + 1) % ENEMY_FRAMES;
            self.body.texture = TextureKey::Ghost(self.frame);
            self.frame_ms = 0.0;
        }
    }

    /// Roll the difficulty policy and search a fresh path
    pub fn calculate_path<R: Rng + ?Sized>(&mut self, arena: &Arena, plan: &PathContext<'_>, rng: &mut R) {
        let (search, target_player) = self.difficulty.policy().roll(rng);
        let start = self.body.cell(arena);

        let mut grid = OccupancyGrid::from_arena(arena);
        for &cell in plan.blocked {
            grid.occupy(cell);
        }
        grid.release(start);

        let target = if target_player {
            Some(plan.player_cell)
        } else {
            grid.random_free_cell(rng)
        };
        let Some(target) = target else {
            return;
        };

        let graph = Graph::from_occupancy(&grid);
        let path = match search {
            Search::Bfs => pathfind::bfs(&graph, start, target),
            Search::Dfs => pathfind::dfs(&graph, start, target, rng),
        };
        log::debug!(
            "Enemy ({:?}) at [{}, {}] planned {:?} path to [{}, {}]: {} cells",
            self.difficulty,
            start.col,
            start.row,
            search,
            target.col,
            target.row,
            path.len()
        );
        self.path = path.into();
    }

    fn delta_towards_waypoint(&mut self, arena: &Arena, dt_ms: f32) -> Vec2 {
        let Some(&next) = self.path.front() else {
            return Vec2::ZERO;
        };
        let target = self.body.anchor_in(arena, next);
        let distance = (target - self.body.pos).abs();

        if distance.x < self.epsilon && distance.y < self.epsilon {
            self.path.pop_front();
            return Vec2::ZERO;
        }

        let step = self.speed * dt_ms / 1000.0;
        let towards = |from: f32, to: f32, dist: f32| {
            if to < from {
                -step.min(dist)
            } else if to > from {
                step.min(dist)
            } else {
                0.0
            }
        };
        Vec2::new(
            towards(self.body.pos.x, target.x, distance.x),
            towards(self.body.pos.y, target.y, distance.y),
        )
    }
}

impl Entity for Enemy {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn redraw(&mut self, arena: &Arena, ratio: Vec2) {
        self.path.clear();
        self.body.redraw(arena, ratio);
        let height = arena.viewport().height;
        self.speed = height * ENEMY_SPEED_FACTOR;
        self.epsilon = height * EPSILON_FACTOR;
    }
}
