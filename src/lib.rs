//! Blast Arena - a grid-based bomb arena game-session engine
//!
//! Core modules:
//! - `sim`: Deterministic session engine (arena, entities, pathfinding, state machine)
//! - `settings`: Session settings loaded from JSON
//!
//! Rendering, audio and input polling live in the host. The host feeds
//! [`sim::TickInput`] and frame deltas into a [`sim::GameSession`] and reads
//! back a [`sim::Snapshot`] plus [`sim::GameEvent`]s.

pub mod settings;
pub mod sim;

pub use settings::SessionSettings;

/// Game configuration constants
pub mod consts {
    /// Arena size as a fraction of the viewport
    pub const SCALE_WIDTH_ARENA_TO_SCREEN: f32 = 1.0;
    pub const SCALE_HEIGHT_ARENA_TO_SCREEN: f32 = 0.8;

    /// Entity sizes relative to one grid cell
    pub const SCALE_PLAYER_TO_WALL: f32 = 0.8;
    pub const SCALE_ENEMY_TO_WALL: f32 = 0.9;
    pub const SCALE_BOMB_TO_WALL: f32 = 0.8;
    pub const SCALE_EXPLOSION_TO_WALL: f32 = 0.95;
    pub const SCALE_BREAKABLE_WALL_TO_WALL: f32 = 1.0;
    pub const SCALE_DOOR_TO_WALL: f32 = 1.0;
    /// Enemy hitbox used against the player (coyote-time leeway)
    pub const SCALE_ENEMY_HITBOX: f32 = 0.5;

    /// Durations (milliseconds)
    pub const MS_MOVEMENT_SPRITE_CHANGE_PLAYER: f32 = 250.0;
    pub const MS_SPRITE_CHANGE_ENEMY: f32 = 150.0;
    pub const MS_BOMB: f32 = 3000.0;
    pub const MS_BOMB_TEXTURE_CHANGE: f32 = 500.0;
    pub const MS_EXPLOSION: f32 = 500.0;
    pub const MS_PLAYER_HIT: f32 = 3000.0;
    pub const MS_PLAYER_HIT_BLINK: f32 = 100.0;
    pub const MS_LEVEL_CHANGE: f32 = 5000.0;

    /// Movement speeds as a fraction of viewport height per second
    pub const PLAYER_SPEED_FACTOR: f32 = 0.2;
    pub const ENEMY_SPEED_FACTOR: f32 = 0.12;
    /// Waypoint arrival tolerance as a fraction of viewport height
    pub const EPSILON_FACTOR: f32 = 0.002;

    /// Score values
    pub const SCORE_BREAKABLE_WALL: u64 = 10;
    pub const SCORE_ENEMY: u64 = 100;

    /// Endless mode caps
    pub const ENDLESS_MAX_BREAKABLE_WALLS: usize = 30;
    pub const ENDLESS_MAX_ENEMIES: usize = 6;
    /// Half-width of the spawn exclusion zone around the player
    pub const ENDLESS_SAFE_RADIUS: i32 = 2;

    /// Animation frame counts
    pub const PLAYER_WALK_FRAMES: u8 = 2;
    pub const ENEMY_FRAMES: u8 = 6;

    /// Default arena dimensions
    pub const DEFAULT_ROWS: usize = 11;
    pub const DEFAULT_COLS: usize = 21;
    pub const DEFAULT_LIVES: u8 = 3;
}
