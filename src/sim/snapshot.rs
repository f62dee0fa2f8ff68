//! Immutable per-frame view of the simulation for renderers

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Barrier, GamePhase, GameState, Orb};
use crate::palette_hex;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrbSnapshot {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub color: u8,
    /// `#RRGGBB` for hosts that style with CSS
    pub color_hex: String,
    pub locked: bool,
    pub removing: bool,
}

impl From<&Orb> for OrbSnapshot {
    fn from(orb: &Orb) -> Self {
        Self {
            id: orb.id,
            pos: orb.pos,
            radius: orb.radius(),
            color: orb.color,
            color_hex: palette_hex(orb.color),
            locked: orb.is_locked(),
            removing: orb.pending_removal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarrierSnapshot {
    pub id: u32,
    pub start: Vec2,
    pub end: Vec2,
    /// 1.0 when fresh, 0.0 when about to vanish
    pub remaining: f32,
}

impl From<&Barrier> for BarrierSnapshot {
    fn from(barrier: &Barrier) -> Self {
        Self {
            id: barrier.id,
            start: barrier.start,
            end: barrier.end,
            remaining: barrier.remaining_fraction(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountersSnapshot {
    pub score: u64,
    pub best_score: u64,
    pub level: u32,
    pub matches: u32,
    pub combo: u32,
    pub game_time_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub phase: GamePhase,
    pub orbs: Vec<OrbSnapshot>,
    pub barriers: Vec<BarrierSnapshot>,
    /// Barrier being dragged, not yet committed
    pub preview: Option<(Vec2, Vec2)>,
    pub counters: CountersSnapshot,
    pub board_width: f32,
    pub board_height: f32,
}

impl Snapshot {
    pub fn capture(state: &GameState, preview: Option<(Vec2, Vec2)>) -> Self {
        Self {
            phase: state.phase,
            orbs: state.orbs.iter().map(OrbSnapshot::from).collect(),
            barriers: state.barriers.iter().map(BarrierSnapshot::from).collect(),
            preview,
            counters: CountersSnapshot {
                score: state.score,
                best_score: state.best_score,
                level: state.level,
                matches: state.match_count,
                combo: state.combo,
                game_time_ms: state.game_time_ms,
            },
            board_width: state.board.width,
            board_height: state.board.height,
        }
    }
}
