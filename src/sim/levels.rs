//! Level descriptors and endless-mode generation
//!
//! Normal mode plays a fixed list of levels (bundled JSON by default). Endless
//! mode builds each level from the session RNG.

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};

use super::arena::{Arena, GridPos};
use super::error::{SessionError, SessionResult};
use super::pathfind::Difficulty;
use crate::consts::{ENDLESS_MAX_BREAKABLE_WALLS, ENDLESS_MAX_ENEMIES, ENDLESS_SAFE_RADIUS};

const BUNDLED_LEVELS: &str = include_str!("../../assets/levels.json");

/// Enemy placement in a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub col: usize,
    pub row: usize,
    pub difficulty: Difficulty,
}

impl EnemySpawn {
    pub fn cell(&self) -> GridPos {
        GridPos::new(self.col, self.row)
    }
}

/// One level: breakable walls, enemies and the player's start cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelConfig {
    pub breakable_walls: Vec<GridPos>,
    pub enemies: Vec<EnemySpawn>,
    pub player: GridPos,
}

impl LevelConfig {
    /// Check every cell against the arena. `level` is 1-based, for messages.
    pub fn validate(&self, arena: &Arena, level: usize) -> SessionResult<()> {
        let invalid = |reason: String| {
            log::error!("Level {} rejected: {}", level, reason);
            Err(SessionError::InvalidLevel { level, reason })
        };

        let cells = self
            .breakable_walls
            .iter()
            .map(|c| ("breakable wall", *c))
            .chain(self.enemies.iter().map(|e| ("enemy", e.cell())))
            .chain(std::iter::once(("player", self.player)));
        for (what, cell) in cells {
            if !arena.in_bounds(cell) || !arena.is_empty(cell) {
                return invalid(format!("{} at [{}, {}] is not an empty arena cell", what, cell.col, cell.row));
            }
        }

        if self.breakable_walls.contains(&self.player) {
            return invalid("player starts inside a breakable wall".into());
        }
        if let Some(e) = self.enemies.iter().find(|e| self.breakable_walls.contains(&e.cell())) {
            return invalid(format!("enemy at [{}, {}] starts inside a breakable wall", e.col, e.row));
        }
        Ok(())
    }
}

/// Parse a level list from JSON
pub fn parse_levels(json: &str) -> SessionResult<Vec<LevelConfig>> {
    serde_json::from_str(json).map_err(|e| {
        log::error!("Failed to parse level data: {}", e);
        SessionError::LevelData(e.to_string())
    })
}

/// The levels shipped with the crate
pub fn default_levels() -> SessionResult<Vec<LevelConfig>> {
    parse_levels(BUNDLED_LEVELS)
}

/// Difficulties an endless level may draw from
pub fn endless_difficulties(level: u32) -> &'static [Difficulty] {
    match level {
        0..=2 => &[Difficulty::Easy],
        3..=5 => &[Difficulty::Easy, Difficulty::Medium],
        _ => &Difficulty::ALL,
    }
}

/// Build a random level.
///
/// The player starts at the centre. Nothing spawns within
/// `ENDLESS_SAFE_RADIUS` cells of the player, so the opening moves are safe.
/// Breakable walls never share a cell; enemies never start inside a wall.
pub fn generate_endless<R: Rng + ?Sized>(arena: &Arena, level: u32, rng: &mut R) -> LevelConfig {
    let Some(player) = arena.center_empty_cell() else {
        return LevelConfig {
            breakable_walls: Vec::new(),
            enemies: Vec::new(),
            player: GridPos::new(1, 1),
        };
    };

    let safe = |c: &GridPos| {
        (c.col as i32 - player.col as i32).abs() <= ENDLESS_SAFE_RADIUS
            && (c.row as i32 - player.row as i32).abs() <= ENDLESS_SAFE_RADIUS
    };
    let mut candidates: Vec<GridPos> = arena.empty_cells().filter(|c| !safe(c)).collect();
    candidates.shuffle(rng);

    let wall_count = rng.random_range(1..=ENDLESS_MAX_BREAKABLE_WALLS).min(candidates.len());
    let breakable_walls: Vec<GridPos> = candidates.drain(..wall_count).collect();

    let difficulties = endless_difficulties(level);
    let enemy_count = rng.random_range(1..=ENDLESS_MAX_ENEMIES);
    let mut enemies = Vec::with_capacity(enemy_count);
    if !candidates.is_empty() {
        for _ in 0..enemy_count {
            let (Some(cell), Some(&difficulty)) = (candidates.choose(rng), difficulties.choose(rng)) else {
                break;
            };
            enemies.push(EnemySpawn {
                col: cell.col,
                row: cell.row,
                difficulty,
            });
        }
    }

    log::info!(
        "Generated endless level {}: {} breakable walls, {} enemies",
        level,
        breakable_walls.len(),
        enemies.len()
    );
    LevelConfig {
        breakable_walls,
        enemies,
        player,
    }
}
