//! Read-only view of a session for the presentation layer

use serde::Serialize;

use super::entity::{Body, Entity, Facing, TextureKey};
use super::state::{Outcome, SessionState};

/// One drawable entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EntityView {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub facing: Facing,
    pub texture: TextureKey,
    pub visible: bool,
}

impl EntityView {
    pub fn of<E: Entity + ?Sized>(entity: &E) -> Self {
        Self::from(entity.body())
    }
}

impl From<&Body> for EntityView {
    fn from(body: &Body) -> Self {
        Self {
            x: body.pos.x,
            y: body.pos.y,
            width: body.size.x,
            height: body.size.y,
            facing: body.facing,
            texture: body.texture,
            visible: body.visible,
        }
    }
}

/// Overlay the host should draw on top of the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum Banner {
    None,
    Paused,
    LeavePrompt,
    PlayerHit,
    LevelInfo { level: u32, lives: u8 },
    GameOver { outcome: Outcome },
}

/// HUD numbers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub score: u64,
    /// Gameplay time in milliseconds (in-progress frames only)
    pub elapsed_ms: u64,
    pub lives: u8,
    /// 1-based level number
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub state: SessionState,
    pub banner: Banner,
    pub player: Option<EntityView>,
    pub enemies: Vec<EntityView>,
    pub bombs: Vec<EntityView>,
    pub blasts: Vec<EntityView>,
    pub breakable_walls: Vec<EntityView>,
    pub door: Option<EntityView>,
    pub stats: Stats,
    /// `stats.elapsed_ms` formatted for the HUD
    pub time: String,
}

/// Format milliseconds as `mm:ss`, or `hh:mm:ss` once an hour has passed
pub fn format_time(ms: i64) -> String {
    let seconds = ms.max(0) / 1000;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let seconds = seconds % 60;

    if hours > 99 {
        return "99:59:59+".to_string();
    }
    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes % 60, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}
