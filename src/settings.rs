//! Difficulty presets and physics tuning
//!
//! Loaded from JSON (a file on native, LocalStorage on web). Anything missing
//! or malformed falls back to the defaults in `consts`.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Relaxed,
    #[default]
    Normal,
    Frantic,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Relaxed => "Relaxed",
            Difficulty::Normal => "Normal",
            Difficulty::Frantic => "Frantic",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "relaxed" | "easy" => Some(Difficulty::Relaxed),
            "normal" => Some(Difficulty::Normal),
            "frantic" | "hard" => Some(Difficulty::Frantic),
            _ => None,
        }
    }

    /// Base spawn interval (ms) before level speedup
    pub fn spawn_interval_ms(&self) -> u32 {
        match self {
            Difficulty::Relaxed => 2500,
            Difficulty::Normal => SPAWN_INTERVAL_MS,
            Difficulty::Frantic => 1500,
        }
    }

    /// Number of palette colors in play (fewer colors = easier matches)
    pub fn color_count(&self) -> u8 {
        match self {
            Difficulty::Relaxed => 5,
            Difficulty::Normal | Difficulty::Frantic => PALETTE.len() as u8,
        }
    }

    /// Barrier lifetime (ms)
    pub fn barrier_lifetime_ms(&self) -> u32 {
        match self {
            Difficulty::Relaxed => 4000,
            Difficulty::Normal => BARRIER_LIFETIME_MS,
            Difficulty::Frantic => 2000,
        }
    }
}

/// Every number the simulation reads at runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Physics (per tick) ===
    pub gravity: f32,
    pub friction: f32,
    pub bounce: f32,
    pub floor_damping: f32,
    pub lock_epsilon: f32,
    pub spawn_jitter: f32,
    pub orb_radius: f32,

    // === Matching & scoring ===
    pub match_distance: f32,
    pub min_match_size: usize,
    pub points_per_orb: u64,
    pub matches_per_level: u32,
    pub removal_grace_ms: u32,

    // === Spawning ===
    pub spawn_interval_ms: u32,
    pub spawn_speedup_ms: u32,
    pub spawn_floor_ms: u32,
    pub color_count: u8,

    // === Barriers ===
    pub barrier_lifetime_ms: u32,
    pub max_barriers: usize,
    pub min_barrier_length: f32,

    // === Loss condition ===
    pub pile_up_y: f32,
    pub pile_up_limit: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            friction: FRICTION,
            bounce: BOUNCE,
            floor_damping: FLOOR_DAMPING,
            lock_epsilon: LOCK_EPSILON,
            spawn_jitter: SPAWN_JITTER,
            orb_radius: ORB_RADIUS,

            match_distance: MATCH_DISTANCE,
            min_match_size: MIN_MATCH_SIZE,
            points_per_orb: POINTS_PER_ORB,
            matches_per_level: MATCHES_PER_LEVEL,
            removal_grace_ms: REMOVAL_GRACE_MS,

            spawn_interval_ms: SPAWN_INTERVAL_MS,
            spawn_speedup_ms: SPAWN_SPEEDUP_MS,
            spawn_floor_ms: SPAWN_FLOOR_MS,
            color_count: PALETTE.len() as u8,

            barrier_lifetime_ms: BARRIER_LIFETIME_MS,
            max_barriers: MAX_BARRIERS,
            min_barrier_length: MIN_BARRIER_LENGTH,

            pile_up_y: PILE_UP_Y,
            pile_up_limit: PILE_UP_LIMIT,
        }
    }
}

impl Tuning {
    /// Spawn interval at the given level, never below the floor
    pub fn spawn_interval_at(&self, level: u32) -> u32 {
        self.spawn_interval_ms
            .saturating_sub(level.saturating_mul(self.spawn_speedup_ms))
            .max(self.spawn_floor_ms)
    }
}

/// Game settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Difficulty preset
    pub difficulty: Difficulty,
    /// Effective tuning (preset applied on top of defaults)
    #[serde(default)]
    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_preset(Difficulty::Normal)
    }
}

impl Settings {
    /// Create settings from a difficulty preset (applies preset defaults)
    pub fn from_preset(preset: Difficulty) -> Self {
        let mut settings = Self {
            difficulty: preset,
            tuning: Tuning::default(),
        };
        settings.apply_preset(preset);
        settings
    }

    /// Apply a difficulty preset (updates preset-dependent tuning)
    pub fn apply_preset(&mut self, preset: Difficulty) {
        self.difficulty = preset;
        self.tuning.spawn_interval_ms = preset.spawn_interval_ms();
        self.tuning.color_count = preset.color_count();
        self.tuning.barrier_lifetime_ms = preset.barrier_lifetime_ms();
    }

    /// Parse settings from JSON, falling back to defaults on malformed input.
    /// Without an explicit `tuning` object the preset's tuning is used.
    pub fn from_json(json: &str) -> Self {
        #[derive(Deserialize)]
        struct Raw {
            #[serde(default)]
            difficulty: Difficulty,
            tuning: Option<Tuning>,
        }

        match serde_json::from_str::<Raw>(json) {
            Ok(raw) => {
                let mut settings = match raw.tuning {
                    Some(tuning) => Self {
                        difficulty: raw.difficulty,
                        tuning,
                    },
                    None => Self::from_preset(raw.difficulty),
                };
                settings.sanitize();
                settings
            }
            Err(e) => {
                log::warn!("Ignoring malformed settings: {}", e);
                Self::default()
            }
        }
    }

    /// Clamp values that would break the simulation
    fn sanitize(&mut self) {
        let t = &mut self.tuning;
        t.color_count = t.color_count.clamp(1, PALETTE.len() as u8);
        t.min_match_size = t.min_match_size.max(1);
        t.matches_per_level = t.matches_per_level.max(1);
        t.spawn_floor_ms = t.spawn_floor_ms.max(TICK_MS);
        if t.orb_radius <= 0.0 || !t.orb_radius.is_finite() {
            t.orb_radius = ORB_RADIUS;
        }
        // Two orbs must fit side by side
        t.orb_radius = t.orb_radius.min(BOARD_WIDTH / 4.0);
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "colorCascadeSettings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                log::info!("Loaded settings from LocalStorage");
                return Self::from_json(&json);
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Load settings from a JSON file; a missing file means defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                log::info!("Loaded settings from {}", path.display());
                Self::from_json(&json)
            }
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }
}
