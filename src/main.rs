//! Blast Arena headless runner
//!
//! Plays a session with a scripted input pattern at a fixed frame rate and
//! prints the final snapshot as JSON.
//!
//! Usage: `blast-arena [settings.json] [levels.json]`

#[cfg(not(target_arch = "wasm32"))]
use blast_arena::SessionSettings;
#[cfg(not(target_arch = "wasm32"))]
use blast_arena::sim::{GameEvent, GameSession, SessionResult, TickInput, default_levels, parse_levels};

/// Fixed frame step (60 Hz)
#[cfg(not(target_arch = "wasm32"))]
const FRAME_MS: f32 = 1000.0 / 60.0;
/// Give up after ten minutes of simulated time
#[cfg(not(target_arch = "wasm32"))]
const MAX_FRAMES: u64 = 60 * 60 * 10;
/// Frames spent walking in one direction
#[cfg(not(target_arch = "wasm32"))]
const WALK_FRAMES: u64 = 45;
/// Frames between bomb drops
#[cfg(not(target_arch = "wasm32"))]
const BOMB_EVERY: u64 = 240;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Blast Arena (headless) starting...");

    if let Err(e) = run() {
        log::error!("Session aborted: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page on the web; nothing to run here
}

#[cfg(not(target_arch = "wasm32"))]
fn run() -> SessionResult<()> {
    let mut args = std::env::args().skip(1);

    let settings = match args.next() {
        Some(path) => {
            let json = read(&path)?;
            SessionSettings::from_json(&json)?
        }
        None => SessionSettings::default(),
    };
    let levels = match args.next() {
        Some(path) => parse_levels(&read(&path)?)?,
        None => default_levels()?,
    };

    let mut session = GameSession::new(settings, levels)?;
    session.start()?;

    for frame in 0..MAX_FRAMES {
        let input = scripted_input(frame);
        let end = session.tick(FRAME_MS, &input)?;

        for event in session.drain_events() {
            match event {
                GameEvent::Scored { points } => log::info!("+{} points", points),
                GameEvent::LevelStarted { level } => log::info!("Level {} started", level),
                other => log::debug!("{:?}", other),
            }
        }

        if let Some(end) = end {
            log::info!(
                "Finished after {} frames: {:?}, score {}",
                frame + 1,
                end.outcome,
                end.stats.score
            );
            break;
        }
    }

    let snapshot = session.snapshot();
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{}", json),
        Err(e) => log::warn!("Could not serialize snapshot: {}", e),
    }
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn read(path: &str) -> SessionResult<String> {
    std::fs::read_to_string(path).map_err(|e| {
        blast_arena::sim::SessionError::Settings(format!("cannot read {}: {}", path, e))
    })
}

/// Walk a right/down/left/up loop and drop a bomb every few seconds
#[cfg(not(target_arch = "wasm32"))]
fn scripted_input(frame: u64) -> TickInput {
    let mut input = TickInput {
        place_bomb: frame % BOMB_EVERY == 0,
        ..Default::default()
    };
    match (frame / WALK_FRAMES) % 4 {
        0 => input.right = true,
        1 => input.down = true,
        2 => input.left = true,
        _ => input.up = true,
    }
    input
}
