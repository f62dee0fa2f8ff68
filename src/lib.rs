//! Color Cascade - a falling-orb color matching puzzle
//!
//! Core modules:
//! - `sim`: Deterministic simulation (integration, collisions, matching, tick)
//! - `session`: Host-facing controller (input gestures, fixed timestep, best score)
//! - `persistence`: Best-score storage backends
//! - `settings`: Difficulty presets and physics tuning
//! - `platform`: Browser bindings (wasm only)

pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;

#[cfg(not(target_arch = "wasm32"))]
pub use persistence::JsonFileStore;
pub use persistence::{MemoryStore, ScoreStore, StoreError};
pub use session::{FixedTimestep, Session};
pub use settings::{Difficulty, Settings, Tuning};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation tick (~60 Hz). Physics quantities are per tick.
    pub const TICK_MS: u32 = 16;
    /// Maximum ticks per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta the timestep will accept (ms)
    pub const MAX_FRAME_MS: f32 = 100.0;

    /// Board dimensions (board-relative units, y grows downward)
    pub const BOARD_WIDTH: f32 = 400.0;
    pub const BOARD_HEIGHT: f32 = 600.0;
    /// Gap between the resting floor and the bottom edge
    pub const FLOOR_MARGIN: f32 = 10.0;

    /// Orb defaults
    pub const ORB_RADIUS: f32 = 15.0;
    /// Added to vy every tick
    pub const GRAVITY: f32 = 0.3;
    /// Velocity multiplier applied every tick
    pub const FRICTION: f32 = 0.98;
    /// Restitution for walls, orb-orb and orb-barrier contacts
    pub const BOUNCE: f32 = 0.7;
    /// Horizontal damping while touching the floor
    pub const FLOOR_DAMPING: f32 = 0.5;
    /// Both speed components must be below this to lock
    pub const LOCK_EPSILON: f32 = 0.1;
    /// Horizontal spawn jitter, vx is drawn from [-JITTER, JITTER)
    pub const SPAWN_JITTER: f32 = 1.0;

    /// Matching
    pub const MATCH_DISTANCE: f32 = ORB_RADIUS * 2.5;
    pub const MIN_MATCH_SIZE: usize = 3;
    pub const POINTS_PER_ORB: u64 = 100;
    pub const MATCHES_PER_LEVEL: u32 = 5;
    /// Matched orbs stay on the board this long for the removal animation
    pub const REMOVAL_GRACE_MS: u32 = 200;

    /// Spawn cadence: max(BASE - level * SPEEDUP, FLOOR)
    pub const SPAWN_INTERVAL_MS: u32 = 2000;
    pub const SPAWN_SPEEDUP_MS: u32 = 100;
    pub const SPAWN_FLOOR_MS: u32 = 500;

    /// Barriers
    pub const BARRIER_LIFETIME_MS: u32 = 3000;
    pub const MAX_BARRIERS: usize = 3;
    pub const MIN_BARRIER_LENGTH: f32 = 20.0;

    /// Pile-up (loss) detection
    pub const PILE_UP_Y: f32 = 100.0;
    pub const PILE_UP_LIMIT: usize = 10;

    /// Orb palette as 0xRRGGBB (red, teal, blue, green, yellow, plum)
    pub const PALETTE: [u32; 6] = [0xFF6B6B, 0x4ECDC4, 0x45B7D1, 0x96CEB4, 0xFFEAA7, 0xDDA0DD];
}

/// Convert a palette color index into a `#RRGGBB` string for hosts that style with CSS
pub fn palette_hex(color: u8) -> String {
    let rgb = consts::PALETTE[color as usize % consts::PALETTE.len()];
    format!("#{:06X}", rgb)
}
