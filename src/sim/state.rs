//! Game state and core simulation types
//!
//! Everything the tick mutates lives in one owned `GameState`. Hosts read it
//! through `Snapshot` copies and mutate it only between ticks.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::settings::Tuning;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GamePhase {
    /// No session started yet
    Idle,
    /// Ticking
    Running,
    /// Frozen, resumes to Running
    Paused,
    /// Pile-up reached; terminal until a new session starts
    GameOver,
}

/// Board geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub width: f32,
    pub height: f32,
    /// Resting surface, slightly above the bottom edge
    pub floor_y: f32,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            floor_y: BOARD_HEIGHT - FLOOR_MARGIN,
        }
    }
}

/// A falling orb
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Orb {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Fixed at creation
    radius: f32,
    /// Palette index
    pub color: u8,
    /// Resting on the floor; one-way
    locked: bool,
    /// Part of a scored match, waiting out the removal grace period
    pub pending_removal: bool,
    /// Game time (ms) at or after which the orb is dropped from the board
    pub removal_deadline_ms: Option<u64>,
}

impl Orb {
    pub fn new(id: u32, pos: Vec2, radius: f32, color: u8) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            radius,
            color,
            locked: false,
            pending_removal: false,
            removal_deadline_ms: None,
        }
    }

    /// Create an orb that is already resting (used for board setups)
    pub fn new_locked(id: u32, pos: Vec2, radius: f32, color: u8) -> Self {
        let mut orb = Self::new(id, pos, radius, color);
        orb.locked = true;
        orb
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Lock the orb in place. There is no unlock.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Flag for removal once `deadline_ms` is reached
    pub fn mark_for_removal(&mut self, deadline_ms: u64) {
        if !self.pending_removal {
            self.pending_removal = true;
            self.removal_deadline_ms = Some(deadline_ms);
        }
    }

    /// True once the grace period has run out
    pub fn removal_due(&self, now_ms: u64) -> bool {
        self.removal_deadline_ms.is_some_and(|deadline| now_ms >= deadline)
    }
}

/// A player-drawn barrier segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Barrier {
    pub id: u32,
    pub start: Vec2,
    pub end: Vec2,
    /// Counts down by the tick duration
    pub remaining_ms: i32,
    /// Lifetime at creation, for fade-out fractions
    pub lifetime_ms: i32,
    pub active: bool,
}

impl Barrier {
    pub fn new(id: u32, start: Vec2, end: Vec2, lifetime_ms: u32) -> Self {
        let lifetime_ms = lifetime_ms.min(i32::MAX as u32) as i32;
        Self {
            id,
            start,
            end,
            remaining_ms: lifetime_ms,
            lifetime_ms,
            active: lifetime_ms > 0,
        }
    }

    /// Remaining lifetime in [0, 1]
    pub fn remaining_fraction(&self) -> f32 {
        if self.lifetime_ms <= 0 {
            return 0.0;
        }
        (self.remaining_ms as f32 / self.lifetime_ms as f32).clamp(0.0, 1.0)
    }

    /// Advance the countdown; returns true if the barrier just expired
    pub fn age(&mut self, dt_ms: u32) -> bool {
        let was_active = self.active;
        self.remaining_ms = self.remaining_ms.saturating_sub(dt_ms.min(i32::MAX as u32) as i32);
        self.active = self.remaining_ms > 0;
        was_active && !self.active
    }
}

/// Why a barrier was not added. Not surfaced to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrierRejection {
    /// Pointer-up with no drag in progress
    NoGesture,
    /// Session is not running (idle, paused, or over)
    NotRunning,
    /// Segment length at or below the minimum
    TooShort,
    /// Barrier cap already reached
    AtCapacity,
}

/// Things hosts may want to react to (sound, haptics, animation)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    OrbSpawned { id: u32, color: u8 },
    OrbLocked { id: u32 },
    Matched { size: usize, color: u8, points: u64 },
    LevelUp { level: u32 },
    NewBestScore { score: u64 },
    BarrierExpired { id: u32 },
    GameOver { score: u64 },
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Session seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub tuning: Tuning,
    pub board: Board,
    pub phase: GamePhase,
    pub score: u64,
    pub best_score: u64,
    /// Starts at 1, never decreases within a session
    pub level: u32,
    /// Number of match groups scored
    pub match_count: u32,
    /// Consecutive ticks with at least one match
    pub combo: u32,
    /// Simulated time (ms)
    pub game_time_ms: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Game time of the last spawn (None until the first)
    pub last_spawn_ms: Option<u64>,
    /// Active orbs in ascending id order (appended on spawn, removal keeps order)
    pub orbs: Vec<Orb>,
    /// Active barriers in ascending id order
    pub barriers: Vec<Barrier>,
    /// Events produced since the host last drained them
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create an idle state with the given seed
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            board: Board::default(),
            phase: GamePhase::Idle,
            score: 0,
            best_score: 0,
            level: 1,
            match_count: 0,
            combo: 0,
            game_time_ms: 0,
            time_ticks: 0,
            last_spawn_ms: None,
            orbs: Vec::new(),
            barriers: Vec::new(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Create a state that is already running
    pub fn running(seed: u64, tuning: Tuning) -> Self {
        let mut state = Self::new(seed, tuning);
        state.phase = GamePhase::Running;
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn an orb just above the top edge at a random x with a random color
    pub fn spawn_random_orb(&mut self) -> u32 {
        let r = self.tuning.orb_radius;
        let max_x = self.board.width - r;
        // An orb too wide for the board drops from the middle
        let x = if max_x > r {
            self.rng.random_range(r..max_x)
        } else {
            self.board.width / 2.0
        };
        let color = self.rng.random_range(0..self.tuning.color_count.max(1));
        let jitter = self.tuning.spawn_jitter;
        let vx = if jitter > 0.0 {
            self.rng.random_range(-jitter..jitter)
        } else {
            0.0
        };
        self.spawn_orb(x, vx, color)
    }

    /// Spawn an orb at `x`, just above the visible top edge
    pub fn spawn_orb(&mut self, x: f32, vx: f32, color: u8) -> u32 {
        let id = self.next_entity_id();
        let r = self.tuning.orb_radius;
        let mut orb = Orb::new(id, Vec2::new(x, -r), r, color);
        orb.vel = Vec2::new(vx, 0.0);
        self.orbs.push(orb);
        self.last_spawn_ms = Some(self.game_time_ms);
        self.events.push(GameEvent::OrbSpawned { id, color });
        log::debug!("Spawned orb {} (color {}) at x={:.1}", id, color, x);
        id
    }

    /// Place a resting orb directly on the board
    pub fn place_locked_orb(&mut self, pos: Vec2, color: u8) -> u32 {
        let id = self.next_entity_id();
        self.orbs
            .push(Orb::new_locked(id, pos, self.tuning.orb_radius, color));
        id
    }

    /// Try to add a barrier between two points
    pub fn add_barrier(&mut self, start: Vec2, end: Vec2) -> Result<u32, BarrierRejection> {
        if self.phase != GamePhase::Running {
            return Err(BarrierRejection::NotRunning);
        }
        if start.distance(end) <= self.tuning.min_barrier_length {
            return Err(BarrierRejection::TooShort);
        }
        if !self.can_add_barrier() {
            return Err(BarrierRejection::AtCapacity);
        }
        let id = self.next_entity_id();
        self.barriers
            .push(Barrier::new(id, start, end, self.tuning.barrier_lifetime_ms));
        Ok(id)
    }

    /// Whether another barrier fits under the cap
    pub fn can_add_barrier(&self) -> bool {
        self.barriers.len() < self.tuning.max_barriers
    }

    /// Locked orbs sitting above the pile-up line
    pub fn piled_up_count(&self) -> usize {
        self.orbs
            .iter()
            .filter(|o| o.is_locked() && o.pos.y < self.tuning.pile_up_y)
            .count()
    }

    /// Take all events produced so far
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawned_orb_starts_above_board() {
        let mut state = GameState::running(7, Tuning::default());
        let id = state.spawn_random_orb();
        let orb = &state.orbs[0];
        assert_eq!(orb.id, id);
        assert_eq!(orb.pos.y, -ORB_RADIUS);
        assert_eq!(orb.vel.y, 0.0);
        assert!(orb.vel.x.abs() <= SPAWN_JITTER);
        assert!(orb.pos.x >= ORB_RADIUS && orb.pos.x <= BOARD_WIDTH - ORB_RADIUS);
        assert!((orb.color as usize) < PALETTE.len());
        assert!(!orb.is_locked());
    }

    #[test]
    fn test_oversized_orb_spawns_mid_board() {
        let tuning = Tuning {
            orb_radius: 300.0,
            ..Tuning::default()
        };
        let mut state = GameState::running(3, tuning);
        state.spawn_random_orb();
        assert_eq!(state.orbs[0].pos.x, BOARD_WIDTH / 2.0);

        // A full tick with the same tuning spawns and moves without panicking
        let mut state = GameState::running(3, state.tuning.clone());
        crate::sim::tick(&mut state, TICK_MS);
        assert_eq!(state.orbs.len(), 1);
        assert!(state.orbs[0].pos.x.is_finite());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut state = GameState::running(1, Tuning::default());
        let a = state.spawn_random_orb();
        let b = state
            .add_barrier(Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0))
            .unwrap();
        let c = state.spawn_random_orb();
        assert!(a != b && b != c && a != c);
    }

    #[test]
    fn test_add_barrier_rules() {
        let mut state = GameState::new(1, Tuning::default());
        let a = Vec2::new(10.0, 10.0);
        let far = Vec2::new(60.0, 10.0);
        assert_eq!(state.add_barrier(a, far), Err(BarrierRejection::NotRunning));

        state.phase = GamePhase::Running;
        // Exactly the minimum length is still too short
        assert_eq!(
            state.add_barrier(a, Vec2::new(30.0, 10.0)),
            Err(BarrierRejection::TooShort)
        );
        for _ in 0..MAX_BARRIERS {
            assert!(state.add_barrier(a, far).is_ok());
        }
        assert_eq!(state.add_barrier(a, far), Err(BarrierRejection::AtCapacity));
        assert_eq!(state.barriers.len(), MAX_BARRIERS);
    }

    #[test]
    fn test_barrier_aging() {
        let mut barrier = Barrier::new(1, Vec2::ZERO, Vec2::new(50.0, 0.0), 32);
        assert_eq!(barrier.remaining_fraction(), 1.0);
        assert!(!barrier.age(16));
        assert!((barrier.remaining_fraction() - 0.5).abs() < 1e-6);
        assert!(barrier.age(16));
        assert!(!barrier.active);
        // Already expired, doesn't report again
        assert!(!barrier.age(16));
        assert_eq!(barrier.remaining_fraction(), 0.0);
    }

    #[test]
    fn test_removal_deadline() {
        let mut orb = Orb::new_locked(1, Vec2::new(50.0, 575.0), ORB_RADIUS, 0);
        assert!(!orb.removal_due(1_000_000));
        orb.mark_for_removal(200);
        assert!(!orb.removal_due(199));
        assert!(orb.removal_due(200));
        // Re-marking keeps the first deadline
        orb.mark_for_removal(900);
        assert_eq!(orb.removal_deadline_ms, Some(200));
    }

    #[test]
    fn test_same_seed_same_spawns() {
        let mut a = GameState::running(99, Tuning::default());
        let mut b = GameState::running(99, Tuning::default());
        for _ in 0..10 {
            a.spawn_random_orb();
            b.spawn_random_orb();
        }
        assert_eq!(a.orbs, b.orbs);
    }
}
