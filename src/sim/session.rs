//! Game-session orchestrator
//!
//! Owns the arena, every entity collection, the stats and the state machine.
//! The host calls [`GameSession::tick`] once per frame with the elapsed time
//! and that frame's input, then reads [`GameSession::snapshot`] and drains
//! [`GameSession::drain_events`].
//!
//! In-progress frame order: clock, player movement, enemies, bombs, hit
//! checks, explosion lifetimes, exit door.

use std::collections::VecDeque;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::arena::{Arena, GridPos, Viewport};
use super::bomb::Bomb;
use super::breakable_wall::BreakableWall;
use super::collision::{self, Rect};
use super::enemy::{Enemy, PathContext};
use super::entity::{Door, Entity, MoveContext};
use super::error::{SessionError, SessionResult};
use super::explosion::Explosion;
use super::levels::{self, LevelConfig};
use super::player::{Direction, Player};
use super::snapshot::{self, Banner, EntityView, Snapshot, Stats};
use super::state::{Outcome, SessionState, StateMachine};
use crate::consts::{
    MS_LEVEL_CHANGE, MS_PLAYER_HIT, MS_PLAYER_HIT_BLINK, SCALE_DOOR_TO_WALL, SCORE_BREAKABLE_WALL,
    SCORE_ENEMY,
};
use crate::settings::SessionSettings;

/// Input for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Held direction keys
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Edge-triggered: pressed since the previous frame
    pub place_bomb: bool,
    pub pause: bool,
    pub confirm: bool,
    pub escape: bool,
}

impl TickInput {
    fn direction(&self) -> Direction {
        Direction {
            up: self.up,
            down: self.down,
            left: self.left,
            right: self.right,
        }
    }
}

/// Things the host may want to react to (sounds, effects)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event")]
pub enum GameEvent {
    BombPlaced { col: usize, row: usize },
    Exploded { col: usize, row: usize },
    PlayerHit,
    Scored { points: u64 },
    DoorOpened,
    LevelCleared,
    LevelStarted { level: u32 },
    GameEnded { outcome: Outcome },
}

/// Returned by [`GameSession::tick`] exactly once, on the frame the session ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionEnd {
    pub outcome: Outcome,
    pub stats: Stats,
}

#[derive(Debug)]
pub struct GameSession {
    settings: SessionSettings,
    arena: Arena,
    state: StateMachine,
    rng: Pcg32,
    /// Remaining levels in normal mode; the front one is being played
    levels: VecDeque<LevelConfig>,
    stats: Stats,
    clock_ms: f64,

    player: Option<Player>,
    enemies: Vec<Enemy>,
    bombs: Vec<Bomb>,
    explosions: Vec<Explosion>,
    breakable_walls: Vec<BreakableWall>,
    door: Option<Door>,

    started: bool,
    pending_viewport: Option<Viewport>,
    /// Time spent in the current timed phase (player hit, level info)
    phase_ms: f32,
    blink_ms: f32,
    outcome: Option<Outcome>,
    end_reported: bool,
    events: Vec<GameEvent>,
}

impl GameSession {
    /// Create a session. In normal mode `levels` must be non-empty and every
    /// level must fit the arena; endless mode ignores it.
    pub fn new(settings: SessionSettings, levels: Vec<LevelConfig>) -> SessionResult<Self> {
        settings.validate()?;
        let arena = Arena::new(
            settings.rows,
            settings.cols,
            Viewport::new(settings.viewport_width, settings.viewport_height),
        )?;

        if !settings.endless {
            if levels.is_empty() {
                log::error!("No levels to play");
                return Err(SessionError::LevelData("level list is empty".into()));
            }
            for (i, level) in levels.iter().enumerate() {
                level.validate(&arena, i + 1)?;
            }
        }

        Ok(Self {
            rng: Pcg32::seed_from_u64(settings.seed),
            stats: Stats {
                score: 0,
                elapsed_ms: 0,
                lives: settings.lives,
                level: 1,
            },
            settings,
            arena,
            state: StateMachine::new(),
            levels: levels.into(),
            clock_ms: 0.0,
            player: None,
            enemies: Vec::new(),
            bombs: Vec::new(),
            explosions: Vec::new(),
            breakable_walls: Vec::new(),
            door: None,
            started: false,
            pending_viewport: None,
            phase_ms: 0.0,
            blink_ms: 0.0,
            outcome: None,
            end_reported: false,
            events: Vec::new(),
        })
    }

    /// Session over the bundled levels
    pub fn with_default_levels(settings: SessionSettings) -> SessionResult<Self> {
        Self::new(settings, levels::default_levels()?)
    }

    /// Spawn the first level. Calling it again is a no-op.
    pub fn start(&mut self) -> SessionResult<()> {
        if self.started {
            return Ok(());
        }
        log::info!(
            "Starting session: {}x{} arena, {} lives, endless={}",
            self.arena.cols(),
            self.arena.rows(),
            self.stats.lives,
            self.settings.endless
        );
        self.prepare_level()?;
        self.started = true;
        self.events.push(GameEvent::LevelStarted {
            level: self.stats.level,
        });
        Ok(())
    }

    /// Record a viewport change. It is applied at the start of the next
    /// tick, which then skips gameplay.
    pub fn resize(&mut self, width: f32, height: f32) {
        if !(width > 0.0 && height > 0.0) {
            log::warn!("Ignoring resize to {}x{}", width, height);
            return;
        }
        self.pending_viewport = Some(Viewport::new(width, height));
    }

    /// Advance the session by `dt_ms`
    pub fn tick(&mut self, dt_ms: f32, input: &TickInput) -> SessionResult<Option<SessionEnd>> {
        if !self.started {
            log::error!("Game session not started yet");
            return Err(SessionError::NotStarted);
        }
        let dt_ms = dt_ms.max(0.0);

        if let Some(viewport) = self.pending_viewport.take() {
            self.apply_resize(viewport);
            return Ok(None);
        }

        match self.state.current() {
            SessionState::InProgress => self.tick_in_progress(dt_ms, input)?,
            SessionState::PlayerHit => self.tick_player_hit(dt_ms)?,
            SessionState::LevelInfo => self.tick_level_info(dt_ms)?,
            SessionState::Paused => {
                if input.pause {
                    self.state.switch_state(SessionState::InProgress)?;
                }
            }
            SessionState::LeavePrompt => {
                if input.confirm {
                    self.finish(Outcome::Left)?;
                } else if input.escape {
                    self.state.switch_state(SessionState::InProgress)?;
                }
            }
            SessionState::GameEnd => {}
        }

        Ok(self.take_end())
    }

    fn take_end(&mut self) -> Option<SessionEnd> {
        if self.end_reported || self.state.current() != SessionState::GameEnd {
            return None;
        }
        let outcome = self.outcome?;
        self.end_reported = true;
        Some(SessionEnd {
            outcome,
            stats: self.stats,
        })
    }

    fn finish(&mut self, outcome: Outcome) -> SessionResult<()> {
        self.state.switch_state(SessionState::GameEnd)?;
        log::info!(
            "Session ended ({:?}): score {}, level {}, time {}",
            outcome,
            self.stats.score,
            self.stats.level,
            snapshot::format_time(self.stats.elapsed_ms as i64)
        );
        self.outcome = Some(outcome);
        self.events.push(GameEvent::GameEnded { outcome });
        Ok(())
    }

    fn tick_in_progress(&mut self, dt_ms: f32, input: &TickInput) -> SessionResult<()> {
        if input.pause {
            self.state.switch_state(SessionState::Paused)?;
            self.idle_player();
            return Ok(());
        }
        if input.escape {
            self.state.switch_state(SessionState::LeavePrompt)?;
            self.idle_player();
            return Ok(());
        }
        let bomb_requested = input.place_bomb && self.bombs.is_empty();

        self.clock_ms += f64::from(dt_ms);
        self.stats.elapsed_ms = self.clock_ms as u64;

        let wall_rects: Vec<Rect> = self.breakable_walls.iter().map(|w| w.rect()).collect();
        let bomb_rects: Vec<Rect> = self.bombs.iter().map(|b| b.rect()).collect();
        let mut hazards: Vec<Rect> = self.enemies.iter().map(|e| e.hitbox()).collect();
        hazards.extend(self.blast_rects());

        let Some(player) = self.player.as_mut() else {
            return Ok(());
        };
        let player_ctx = MoveContext {
            arena: &self.arena,
            obstacles: &wall_rects,
            escapable: &bomb_rects,
            hazards: &hazards,
        };

        // Caught where it stood: nothing else moves this frame
        if player.update(dt_ms, input.direction(), &player_ctx).hit {
            return self.enter_player_hit();
        }
        let player_cell = player.cell(&self.arena);
        let player_rect = player.rect();
        let ctx = MoveContext {
            hazards: &[],
            ..player_ctx
        };

        let mut blocked: Vec<GridPos> = self.breakable_walls.iter().map(|w| w.grid_pos()).collect();
        blocked.extend(self.bombs.iter().map(|b| b.cell(&self.arena)));
        let plan = PathContext {
            blocked: &blocked,
            player_cell,
        };
        for enemy in &mut self.enemies {
            enemy.update(dt_ms, &ctx, &plan, &mut self.rng);
        }

        let fresh_explosions = self.update_bombs(dt_ms, bomb_requested, player_cell)?;

        if self.player_is_hit(&player_rect) {
            return self.enter_player_hit();
        }
        self.resolve_blast_hits();

        for explosion in self.explosions.iter_mut().take(fresh_explosions) {
            explosion.update(dt_ms);
        }
        self.explosions.retain(|e| !e.is_finished());

        self.update_door(&player_rect)
    }

    fn enter_player_hit(&mut self) -> SessionResult<()> {
        self.state.switch_state(SessionState::PlayerHit)?;
        self.events.push(GameEvent::PlayerHit);
        self.idle_player();
        self.phase_ms = 0.0;
        self.blink_ms = 0.0;
        Ok(())
    }

    /// Place a requested bomb, advance fuses and detonate. Returns how many
    /// explosions existed before this frame's detonations.
    fn update_bombs(&mut self, dt_ms: f32, bomb_requested: bool, player_cell: GridPos) -> SessionResult<usize> {
        let existing = self.explosions.len();

        for bomb in &mut self.bombs {
            bomb.update(dt_ms);
        }

        if bomb_requested {
            let bomb = Bomb::place(&self.arena, player_cell);
            let pos = bomb.body().pos;
            log::info!(
                "Bomb placed at [{:.1}, {:.1}], grid: [{}, {}]",
                pos.x,
                pos.y,
                player_cell.col,
                player_cell.row
            );
            self.bombs.push(bomb);
            self.events.push(GameEvent::BombPlaced {
                col: player_cell.col,
                row: player_cell.row,
            });
            self.clear_enemy_paths();
        }

        // All explosions are spawned before any bomb is removed
        let mut spawned = Vec::new();
        for bomb in self.bombs.iter().filter(|b| b.is_exploding()) {
            let cell = bomb.cell(&self.arena);
            spawned.push((cell, Explosion::spawn(&self.arena, cell)?));
        }
        self.bombs.retain(|bomb| !bomb.is_exploding());

        for (cell, explosion) in spawned {
            let origin = self.arena.grid_to_canvas(cell.col, cell.row);
            log::info!(
                "Explosion created at [{:.1}, {:.1}], grid: [{}, {}], {} blast cells",
                origin.x,
                origin.y,
                cell.col,
                cell.row,
                explosion.cells().len()
            );
            self.explosions.push(explosion);
            self.events.push(GameEvent::Exploded {
                col: cell.col,
                row: cell.row,
            });
            self.clear_enemy_paths();
        }

        Ok(existing)
    }

    fn blast_rects(&self) -> Vec<Rect> {
        self.explosions.iter().flat_map(|e| e.cell_rects()).collect()
    }

    /// Player against enemy hitboxes and blast cells
    fn player_is_hit(&self, player_rect: &Rect) -> bool {
        let enemy_hitboxes: Vec<Rect> = self.enemies.iter().map(|e| e.hitbox()).collect();
        collision::hits_any(player_rect, &enemy_hitboxes) || collision::hits_any(player_rect, &self.blast_rects())
    }

    /// Remove enemies and breakable walls caught in a blast, then score them.
    /// Everything destroyed in the same frame multiplies the total.
    fn resolve_blast_hits(&mut self) {
        let blasts = self.blast_rects();
        if blasts.is_empty() {
            return;
        }

        let enemies_before = self.enemies.len();
        self.enemies.retain(|e| !collision::hits_any(&e.rect(), &blasts));
        let enemies_hit = (enemies_before - self.enemies.len()) as u64;

        let walls_before = self.breakable_walls.len();
        self.breakable_walls.retain(|w| !collision::hits_any(&w.rect(), &blasts));
        let walls_hit = (walls_before - self.breakable_walls.len()) as u64;
        if walls_hit > 0 {
            self.clear_enemy_paths();
        }

        let result = enemies_hit * SCORE_ENEMY + walls_hit * SCORE_BREAKABLE_WALL;
        let points = result * (enemies_hit + walls_hit);
        if points > 0 {
            self.stats.score += points;
            self.events.push(GameEvent::Scored { points });
        }
    }

    fn update_door(&mut self, player_rect: &Rect) -> SessionResult<()> {
        if !self.enemies.is_empty() || !self.breakable_walls.is_empty() {
            self.door = None;
            return Ok(());
        }

        if self.door.is_none() {
            let Some(cell) = self.arena.center_empty_cell() else {
                return Ok(());
            };
            log::info!("Exit door opened at [{}, {}]", cell.col, cell.row);
            self.door = Some(Door::spawn(&self.arena, cell, SCALE_DOOR_TO_WALL));
            self.events.push(GameEvent::DoorOpened);
        }

        let entered = self.door.as_ref().is_some_and(|d| d.contains(player_rect));
        if entered {
            self.level_cleared()?;
        }
        Ok(())
    }

    fn level_cleared(&mut self) -> SessionResult<()> {
        log::info!("Level {} cleared", self.stats.level);
        self.events.push(GameEvent::LevelCleared);
        if !self.settings.endless {
            self.levels.pop_front();
            if self.levels.is_empty() {
                return self.finish(Outcome::Victory);
            }
        }
        self.stats.level += 1;
        self.state.switch_state(SessionState::LevelInfo)?;
        self.phase_ms = 0.0;
        Ok(())
    }

    fn tick_player_hit(&mut self, dt_ms: f32) -> SessionResult<()> {
        self.phase_ms += dt_ms;
        self.blink_ms += dt_ms;

        if self.blink_ms >= MS_PLAYER_HIT_BLINK {
            if let Some(player) = self.player.as_mut() {
                if player.body().visible {
                    player.hide();
                } else {
                    player.show();
                }
            }
            self.blink_ms = 0.0;
        }

        if self.phase_ms < MS_PLAYER_HIT {
            return Ok(());
        }

        if let Some(player) = self.player.as_mut() {
            player.show();
        }
        self.stats.lives = self.stats.lives.saturating_sub(1);
        log::info!("Player hit, {} lives left", self.stats.lives);
        if self.stats.lives == 0 {
            return self.finish(Outcome::Defeat);
        }
        self.state.switch_state(SessionState::LevelInfo)?;
        self.phase_ms = 0.0;
        Ok(())
    }

    fn tick_level_info(&mut self, dt_ms: f32) -> SessionResult<()> {
        self.phase_ms += dt_ms;
        if self.phase_ms < MS_LEVEL_CHANGE {
            return Ok(());
        }
        self.prepare_level()?;
        self.state.switch_state(SessionState::InProgress)?;
        self.phase_ms = 0.0;
        self.events.push(GameEvent::LevelStarted {
            level: self.stats.level,
        });
        Ok(())
    }

    /// Clear every entity and spawn the current level
    fn prepare_level(&mut self) -> SessionResult<()> {
        let config = if self.settings.endless {
            levels::generate_endless(&self.arena, self.stats.level, &mut self.rng)
        } else {
            match self.levels.front() {
                Some(level) => level.clone(),
                None => {
                    log::error!("No level left to prepare");
                    return Err(SessionError::LevelData("no level left to prepare".into()));
                }
            }
        };

        self.bombs.clear();
        self.explosions.clear();
        self.door = None;
        self.breakable_walls = config
            .breakable_walls
            .iter()
            .map(|&cell| BreakableWall::spawn(&self.arena, cell))
            .collect();
        self.enemies = config
            .enemies
            .iter()
            .map(|e| Enemy::spawn(&self.arena, e.cell(), e.difficulty))
            .collect();
        self.player = Some(Player::spawn(&self.arena, config.player));

        log::info!(
            "Prepared level {}: {} breakable walls, {} enemies, player at [{}, {}]",
            self.stats.level,
            self.breakable_walls.len(),
            self.enemies.len(),
            config.player.col,
            config.player.row
        );
        Ok(())
    }

    fn apply_resize(&mut self, viewport: Viewport) {
        let old = self.arena.viewport();
        let ratio = viewport.as_vec2() / old.as_vec2();
        log::debug!(
            "Resizing {}x{} -> {}x{}",
            old.width,
            old.height,
            viewport.width,
            viewport.height
        );
        self.arena.rebuild_mapping(viewport);
        let arena = &self.arena;

        if let Some(player) = self.player.as_mut() {
            player.redraw(arena, ratio);
        }
        for enemy in &mut self.enemies {
            enemy.redraw(arena, ratio);
        }
        for bomb in &mut self.bombs {
            bomb.redraw(arena, ratio);
        }
        for explosion in &mut self.explosions {
            explosion.redraw(arena, ratio);
        }
        for wall in &mut self.breakable_walls {
            wall.redraw(arena, ratio);
        }
        if let Some(door) = self.door.as_mut() {
            door.redraw(arena, ratio);
        }
    }

    fn idle_player(&mut self) {
        if let Some(player) = self.player.as_mut() {
            player.set_idle();
        }
    }

    fn clear_enemy_paths(&mut self) {
        for enemy in &mut self.enemies {
            enemy.clear_path();
        }
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Snapshot {
        let banner = match self.state.current() {
            SessionState::InProgress => Banner::None,
            SessionState::Paused => Banner::Paused,
            SessionState::LeavePrompt => Banner::LeavePrompt,
            SessionState::PlayerHit => Banner::PlayerHit,
            SessionState::LevelInfo => Banner::LevelInfo {
                level: self.stats.level,
                lives: self.stats.lives,
            },
            SessionState::GameEnd => match self.outcome {
                Some(outcome) => Banner::GameOver { outcome },
                None => Banner::None,
            },
        };

        Snapshot {
            state: self.state.current(),
            banner,
            player: self.player.as_ref().map(EntityView::of),
            enemies: self.enemies.iter().map(EntityView::of).collect(),
            bombs: self.bombs.iter().map(EntityView::of).collect(),
            blasts: self
                .explosions
                .iter()
                .flat_map(|e| e.cells())
                .map(EntityView::of)
                .collect(),
            breakable_walls: self.breakable_walls.iter().map(EntityView::of).collect(),
            door: self.door.as_ref().map(EntityView::of),
            stats: self.stats,
            time: snapshot::format_time(self.stats.elapsed_ms as i64),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.current()
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_ended(&self) -> bool {
        self.state.current() == SessionState::GameEnd
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn bombs(&self) -> &[Bomb] {
        &self.bombs
    }

    pub fn explosions(&self) -> &[Explosion] {
        &self.explosions
    }

    pub fn breakable_walls(&self) -> &[BreakableWall] {
        &self.breakable_walls
    }

    pub fn door(&self) -> Option<&Door> {
        self.door.as_ref()
    }

    /// Player position relative to the viewport, for hosts that track it
    pub fn player_position(&self) -> Option<Vec2> {
        self.player.as_ref().map(|p| p.body().pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{MS_BOMB, MS_EXPLOSION};
    use crate::sim::pathfind::Difficulty;
    use crate::sim::levels::EnemySpawn;

    const IDLE: TickInput = TickInput {
        up: false,
        down: false,
        left: false,
        right: false,
        place_bomb: false,
        pause: false,
        confirm: false,
        escape: false,
    };

    fn press(f: impl FnOnce(&mut TickInput)) -> TickInput {
        let mut input = IDLE;
        f(&mut input);
        input
    }

    fn level(walls: &[(usize, usize)], enemies: &[(usize, usize)], player: (usize, usize)) -> LevelConfig {
        LevelConfig {
            breakable_walls: walls.iter().map(|&(c, r)| GridPos::new(c, r)).collect(),
            enemies: enemies
                .iter()
                .map(|&(col, row)| EnemySpawn {
                    col,
                    row,
                    difficulty: Difficulty::Easy,
                })
                .collect(),
            player: GridPos::new(player.0, player.1),
        }
    }

    fn session(levels: Vec<LevelConfig>) -> GameSession {
        let mut s = GameSession::new(SessionSettings::default(), levels).unwrap();
        s.start().unwrap();
        s
    }

    fn drop_bomb(s: &mut GameSession, col: usize, row: usize) {
        let bomb = Bomb::place(&s.arena, GridPos::new(col, row));
        s.bombs.push(bomb);
    }

    #[test]
    fn test_tick_before_start_fails() {
        let mut s = GameSession::new(SessionSettings::default(), vec![level(&[], &[], (1, 1))]).unwrap();
        assert_eq!(s.tick(16.0, &IDLE), Err(SessionError::NotStarted));
    }

    #[test]
    fn test_empty_level_list_rejected() {
        assert!(GameSession::new(SessionSettings::default(), Vec::new()).is_err());
    }

    #[test]
    fn test_invalid_level_rejected() {
        let err = GameSession::new(SessionSettings::default(), vec![level(&[(2, 2)], &[], (1, 1))]).unwrap_err();
        assert!(matches!(err, SessionError::InvalidLevel { level: 1, .. }));
    }

    #[test]
    fn test_bomb_explodes_and_blasts_expire() {
        // Second wall far away keeps the door closed
        let mut s = session(vec![level(&[(6, 5), (15, 7)], &[], (1, 1))]);
        drop_bomb(&mut s, 5, 5);

        s.tick(MS_BOMB, &IDLE).unwrap();
        assert!(s.bombs().is_empty());
        assert_eq!(s.explosions().len(), 1);
        assert_eq!(s.explosions()[0].cells().len(), 5);
        assert_eq!(s.breakable_walls().len(), 1);
        assert_eq!(s.stats().score, 10);

        s.tick(MS_EXPLOSION, &IDLE).unwrap();
        assert!(s.explosions().is_empty());
        assert!(s.snapshot().blasts.is_empty());
        assert!(s.door().is_none());
        assert_eq!(s.state(), SessionState::InProgress);

        let events = s.drain_events();
        assert!(events.contains(&GameEvent::Exploded { col: 5, row: 5 }));
        assert!(events.contains(&GameEvent::Scored { points: 10 }));
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn test_combo_scoring() {
        // One enemy and two walls in one blast: (100 + 2 * 10) * 3
        let mut s = session(vec![level(&[(4, 5), (6, 5), (15, 7)], &[(5, 4)], (1, 1))]);
        drop_bomb(&mut s, 5, 5);
        s.tick(MS_BOMB, &IDLE).unwrap();
        assert!(s.enemies().is_empty());
        assert_eq!(s.breakable_walls().len(), 1);
        assert_eq!(s.stats().score, 360);
    }

    #[test]
    fn test_place_bomb_one_at_a_time() {
        let mut s = session(vec![level(&[(15, 7)], &[], (1, 1))]);
        let bomb = press(|i| i.place_bomb = true);
        s.tick(16.0, &bomb).unwrap();
        assert_eq!(s.bombs().len(), 1);
        assert_eq!(s.bombs()[0].cell(s.arena()), GridPos::new(1, 1));
        s.tick(16.0, &bomb).unwrap();
        assert_eq!(s.bombs().len(), 1);
        assert_eq!(
            s.drain_events().iter().filter(|e| matches!(e, GameEvent::BombPlaced { .. })).count(),
            1
        );
    }

    #[test]
    fn test_player_hit_then_respawn_same_level() {
        let mut s = session(vec![level(&[(15, 7)], &[], (1, 1)), level(&[(9, 9)], &[], (3, 3))]);
        let bomb = press(|i| i.place_bomb = true);
        s.tick(16.0, &bomb).unwrap();
        s.tick(MS_BOMB, &IDLE).unwrap();
        assert_eq!(s.state(), SessionState::PlayerHit);
        assert!(s.drain_events().contains(&GameEvent::PlayerHit));

        // Input is ignored while hit
        s.tick(MS_PLAYER_HIT / 2.0, &press(|i| i.pause = true)).unwrap();
        assert_eq!(s.state(), SessionState::PlayerHit);
        // One blink toggle so far
        assert!(!s.player().unwrap().body().visible);
        s.tick(MS_PLAYER_HIT / 2.0, &IDLE).unwrap();
        assert_eq!(s.state(), SessionState::LevelInfo);
        assert_eq!(s.stats().lives, 2);
        assert_eq!(s.snapshot().banner, Banner::LevelInfo { level: 1, lives: 2 });

        s.tick(MS_LEVEL_CHANGE, &IDLE).unwrap();
        assert_eq!(s.state(), SessionState::InProgress);
        assert_eq!(s.stats().level, 1);
        assert!(s.explosions().is_empty());
        let player = s.player().unwrap();
        assert_eq!(player.cell(s.arena()), GridPos::new(1, 1));
        assert!(player.body().visible);
    }

    #[test]
    fn test_last_life_lost_ends_in_defeat() {
        let settings = SessionSettings {
            lives: 1,
            ..Default::default()
        };
        let mut s = GameSession::new(settings, vec![level(&[(15, 7)], &[], (1, 1))]).unwrap();
        s.start().unwrap();
        drop_bomb(&mut s, 1, 1);
        s.tick(MS_BOMB, &IDLE).unwrap();
        assert_eq!(s.state(), SessionState::PlayerHit);
        let end = s.tick(MS_PLAYER_HIT, &IDLE).unwrap().unwrap();
        assert_eq!(end.outcome, Outcome::Defeat);
        assert_eq!(end.stats.lives, 0);
        assert_eq!(s.tick(16.0, &IDLE).unwrap(), None);
        assert_eq!(s.snapshot().banner, Banner::GameOver { outcome: Outcome::Defeat });
    }

    /// Tick until every enemy holds a path that one short frame cannot use up
    fn plan_long_paths(s: &mut GameSession) {
        for _ in 0..100 {
            if s.enemies().iter().all(|e| e.remaining_path().len() >= 3) {
                return;
            }
            s.tick(16.0, &IDLE).unwrap();
            assert_eq!(s.state(), SessionState::InProgress);
        }
        panic!("enemies never planned a path");
    }

    #[test]
    fn test_enemy_contact_hits_player() {
        let mut s = session(vec![level(&[(15, 7)], &[(1, 1)], (1, 1))]);
        s.tick(16.0, &IDLE).unwrap();
        assert_eq!(s.state(), SessionState::PlayerHit);
        // Caught on the move: the enemy never got to plan this frame
        assert!(s.enemies()[0].remaining_path().next().is_none());
        assert_eq!(s.stats().elapsed_ms, 16);
    }

    #[test]
    fn test_player_standing_in_blast_is_hit_before_bombs_update() {
        let mut s = session(vec![level(&[(15, 7)], &[], (3, 3))]);
        s.explosions.push(Explosion::spawn(&s.arena, GridPos::new(3, 3)).unwrap());
        drop_bomb(&mut s, 9, 9);
        s.tick(16.0, &IDLE).unwrap();
        assert_eq!(s.state(), SessionState::PlayerHit);
        assert_eq!(s.bombs()[0].fuse_ms(), 0.0);
    }

    #[test]
    fn test_bomb_placement_clears_enemy_paths() {
        // Player boxed in so the enemy can only wander
        let mut s = session(vec![level(&[(2, 1), (1, 2)], &[(19, 9)], (1, 1))]);
        plan_long_paths(&mut s);
        s.tick(16.0, &press(|i| i.place_bomb = true)).unwrap();
        assert_eq!(s.bombs().len(), 1);
        assert!(s.enemies().iter().all(|e| e.remaining_path().next().is_none()));
    }

    #[test]
    fn test_broken_wall_clears_enemy_paths() {
        let mut s = session(vec![level(&[(2, 1), (1, 2), (6, 5)], &[(19, 9)], (1, 1))]);
        plan_long_paths(&mut s);
        // A live blast with no bomb this frame, so only the wall break clears
        s.explosions.push(Explosion::spawn(&s.arena, GridPos::new(5, 5)).unwrap());
        s.tick(16.0, &IDLE).unwrap();
        assert_eq!(s.breakable_walls().len(), 2);
        assert_eq!(s.enemies().len(), 1);
        assert!(s.enemies()[0].remaining_path().next().is_none());
    }

    #[test]
    fn test_pause_and_leave_prompt_freeze_bombs_and_blasts() {
        let mut s = session(vec![level(&[(15, 7)], &[], (1, 1))]);
        drop_bomb(&mut s, 5, 5);
        s.explosions.push(Explosion::spawn(&s.arena, GridPos::new(9, 5)).unwrap());
        s.tick(100.0, &IDLE).unwrap();
        let fuse = s.bombs()[0].fuse_ms();
        assert_eq!(fuse, 100.0);

        for toggle in [press(|i| i.pause = true), press(|i| i.escape = true)] {
            s.tick(16.0, &toggle).unwrap();
            assert_ne!(s.state(), SessionState::InProgress);
            s.tick(MS_BOMB * 10.0, &IDLE).unwrap();
            assert_eq!(s.bombs().len(), 1);
            assert_eq!(s.bombs()[0].fuse_ms(), fuse);
            assert_eq!(s.explosions().len(), 1);
            s.tick(16.0, &toggle).unwrap();
            assert_eq!(s.state(), SessionState::InProgress);
        }

        s.tick(MS_EXPLOSION, &IDLE).unwrap();
        assert!(s.explosions().is_empty());
        assert_eq!(s.bombs()[0].fuse_ms(), fuse + MS_EXPLOSION);
    }

    #[test]
    fn test_rejected_explosion_leaves_bombs_in_place() {
        let mut s = session(vec![level(&[(15, 7)], &[], (1, 1))]);
        drop_bomb(&mut s, 0, 5);
        let err = s.tick(MS_BOMB, &IDLE).unwrap_err();
        assert_eq!(err, SessionError::InvalidExplosionCell { col: 0, row: 5 });
        assert_eq!(s.bombs().len(), 1);
        assert!(s.explosions().is_empty());
    }

    #[test]
    fn test_pause_freezes_clock() {
        let mut s = session(vec![level(&[(15, 7)], &[], (1, 1))]);
        s.tick(100.0, &IDLE).unwrap();
        s.tick(16.0, &press(|i| i.pause = true)).unwrap();
        assert_eq!(s.state(), SessionState::Paused);
        assert_eq!(s.snapshot().banner, Banner::Paused);
        s.tick(5000.0, &press(|i| i.escape = true)).unwrap();
        assert_eq!(s.state(), SessionState::Paused);
        assert_eq!(s.stats().elapsed_ms, 100);
        s.tick(16.0, &press(|i| i.pause = true)).unwrap();
        assert_eq!(s.state(), SessionState::InProgress);
    }

    #[test]
    fn test_leave_prompt() {
        let mut s = session(vec![level(&[(15, 7)], &[], (1, 1))]);
        let esc = press(|i| i.escape = true);
        s.tick(16.0, &esc).unwrap();
        assert_eq!(s.state(), SessionState::LeavePrompt);
        s.tick(16.0, &esc).unwrap();
        assert_eq!(s.state(), SessionState::InProgress);
        s.tick(16.0, &esc).unwrap();
        let end = s.tick(16.0, &press(|i| i.confirm = true)).unwrap();
        assert_eq!(end.map(|e| e.outcome), Some(Outcome::Left));
        assert!(s.is_ended());
        assert_eq!(s.tick(16.0, &IDLE).unwrap(), None);
    }

    #[test]
    fn test_door_clears_levels_until_victory() {
        let mut s = session(vec![level(&[], &[], (1, 1)), level(&[], &[], (1, 1))]);
        s.tick(16.0, &IDLE).unwrap();
        let door_cell = GridPos::new(10, 5);
        assert_eq!(s.door().map(|d| d.cell(s.arena())), Some(door_cell));

        s.player.as_mut().unwrap().body_mut().place(&s.arena, door_cell);
        s.tick(16.0, &IDLE).unwrap();
        assert_eq!(s.state(), SessionState::LevelInfo);
        assert_eq!(s.stats().level, 2);

        s.tick(MS_LEVEL_CHANGE, &IDLE).unwrap();
        assert_eq!(s.state(), SessionState::InProgress);
        assert!(s.door().is_none());
        s.tick(16.0, &IDLE).unwrap();
        s.player.as_mut().unwrap().body_mut().place(&s.arena, door_cell);
        let end = s.tick(16.0, &IDLE).unwrap();
        assert_eq!(end.map(|e| e.outcome), Some(Outcome::Victory));
    }

    #[test]
    fn test_resize_defers_one_frame_and_rescales() {
        let mut s = session(vec![level(&[(15, 7)], &[], (3, 3))]);
        let before = s.player_position().unwrap();
        s.resize(1600.0, 1200.0);
        s.tick(100.0, &press(|i| i.down = true)).unwrap();
        assert_eq!(s.stats().elapsed_ms, 0);
        let after = s.player_position().unwrap();
        assert!((after - before * 2.0).length() < 1e-2);
        assert_eq!(s.player().unwrap().cell(s.arena()), GridPos::new(3, 3));
        assert!((s.player().unwrap().speed() - 240.0).abs() < 1e-3);

        s.tick(100.0, &IDLE).unwrap();
        assert_eq!(s.stats().elapsed_ms, 100);
    }

    #[test]
    fn test_endless_session_spawns_around_centre() {
        let settings = SessionSettings {
            endless: true,
            seed: 1234,
            ..Default::default()
        };
        let mut s = GameSession::new(settings, Vec::new()).unwrap();
        s.start().unwrap();
        assert_eq!(s.player().unwrap().cell(s.arena()), GridPos::new(10, 5));
        assert!(!s.enemies().is_empty());
        assert!(!s.breakable_walls().is_empty());
        s.tick(16.0, &IDLE).unwrap();
        assert_eq!(s.state(), SessionState::InProgress);
    }

    #[test]
    fn test_snapshot_serializes() {
        let s = session(vec![level(&[(15, 7)], &[(9, 9)], (1, 1))]);
        let snap = s.snapshot();
        assert_eq!(snap.enemies.len(), 1);
        assert_eq!(snap.breakable_walls.len(), 1);
        assert_eq!(snap.time, "00:00");
        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"state\":\"InProgress\""));
    }
}
