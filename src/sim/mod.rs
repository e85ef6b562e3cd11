//! Deterministic session engine
//!
//! All gameplay logic lives here. This module must stay free of rendering and
//! platform code:
//! - Time only advances through `GameSession::tick`
//! - Seeded RNG only
//! - Entities never reference each other; the session passes obstacle lists in

pub mod arena;
pub mod bomb;
pub mod breakable_wall;
pub mod collision;
pub mod enemy;
pub mod entity;
pub mod error;
pub mod explosion;
pub mod levels;
pub mod pathfind;
pub mod player;
pub mod session;
pub mod snapshot;
pub mod state;

pub use arena::{Arena, CellRect, CellType, GridPos, Viewport};
pub use collision::{Blocked, Rect};
pub use entity::{Body, Entity, Facing, TextureKey};
pub use error::{SessionError, SessionResult};
pub use levels::{EnemySpawn, LevelConfig, default_levels, generate_endless, parse_levels};
pub use pathfind::Difficulty;
pub use session::{GameEvent, GameSession, SessionEnd, TickInput};
pub use snapshot::{Banner, EntityView, Snapshot, Stats, format_time};
pub use state::{Outcome, SessionState, StateMachine};
