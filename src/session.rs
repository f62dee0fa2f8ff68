//! Host-facing session controller
//!
//! Owns the `GameState`, turns pointer gestures into barriers between ticks,
//! runs whole ticks off a fixed-timestep accumulator, and writes the best
//! score through a `ScoreStore` whenever it improves.

use glam::Vec2;

use crate::consts::{MAX_FRAME_MS, MAX_SUBSTEPS, TICK_MS};
use crate::persistence::ScoreStore;
use crate::settings::Settings;
use crate::sim::{BarrierRejection, GameEvent, GamePhase, GameState, Snapshot, tick};

/// Fixed timestep accumulator.
/// Turns variable frame times into a whole number of ticks.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    /// Tick length (ms)
    dt_ms: u32,
    /// Leftover frame time (ms)
    accumulator: f32,
    max_substeps: u32,
}

impl FixedTimestep {
    pub fn new(dt_ms: u32, max_substeps: u32) -> Self {
        Self {
            dt_ms: dt_ms.max(1),
            accumulator: 0.0,
            max_substeps,
        }
    }

    /// Add frame time; returns how many ticks to run now
    pub fn accumulate(&mut self, frame_ms: f32) -> u32 {
        let frame_ms = if frame_ms.is_finite() {
            frame_ms.clamp(0.0, MAX_FRAME_MS)
        } else {
            0.0
        };
        self.accumulator += frame_ms;

        let dt = self.dt_ms as f32;
        let mut steps = 0;
        while self.accumulator >= dt && steps < self.max_substeps {
            self.accumulator -= dt;
            steps += 1;
        }
        // Drop whatever the substep cap didn't cover (spiral of death)
        if steps == self.max_substeps {
            self.accumulator = self.accumulator.min(dt);
        }
        steps
    }

    /// Forget leftover time (after pause or reset)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }

    pub fn dt_ms(&self) -> u32 {
        self.dt_ms
    }
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(TICK_MS, MAX_SUBSTEPS)
    }
}

/// A barrier drag in progress
#[derive(Debug, Clone, Copy, PartialEq)]
struct DragGesture {
    start: Vec2,
    end: Vec2,
}

/// One player's game: the simulation plus its input, clock and score store
pub struct Session<S: ScoreStore> {
    state: GameState,
    settings: Settings,
    store: S,
    timestep: FixedTimestep,
    drag: Option<DragGesture>,
    /// Base seed; each new game derives its own from it
    seed: u64,
    games_started: u64,
}

impl<S: ScoreStore> Session<S> {
    /// Create an idle session, reading the best score once from `store`
    pub fn new(settings: Settings, mut store: S, seed: u64) -> Self {
        let best = match store.load_best() {
            Ok(best) => best,
            Err(e) => {
                log::warn!("Could not read best score, starting from 0: {}", e);
                0
            }
        };
        let mut state = GameState::new(seed, settings.tuning.clone());
        state.best_score = best;
        log::info!("Session ready (best score {}, {})", best, settings.difficulty.as_str());

        Self {
            state,
            settings,
            store,
            timestep: FixedTimestep::default(),
            drag: None,
            seed,
            games_started: 0,
        }
    }

    /// Throw away the current game (orbs, barriers, counters, pending removals)
    /// and start a fresh one immediately.
    pub fn start_new_game(&mut self) {
        let seed = self
            .seed
            .wrapping_add(self.games_started.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        self.games_started += 1;

        let mut state = GameState::running(seed, self.settings.tuning.clone());
        state.best_score = self.state.best_score;
        self.state = state;
        self.drag = None;
        self.timestep.reset();
        log::info!("New game #{} (seed {})", self.games_started, seed);
    }

    /// Running ⇄ Paused. Other phases are unaffected.
    pub fn toggle_pause(&mut self) {
        self.state.phase = match self.state.phase {
            GamePhase::Running => GamePhase::Paused,
            GamePhase::Paused => {
                self.timestep.reset();
                GamePhase::Running
            }
            other => other,
        };
        self.drag = None;
        log::debug!("Phase now {:?}", self.state.phase);
    }

    /// Feed a frame's elapsed time; runs as many whole ticks as it covers.
    /// Returns the number of ticks run.
    pub fn advance(&mut self, frame_ms: f32) -> u32 {
        if self.state.phase != GamePhase::Running {
            return 0;
        }
        let steps = self.timestep.accumulate(frame_ms);
        let mut ran = 0;
        for _ in 0..steps {
            if self.state.phase != GamePhase::Running {
                break;
            }
            self.step();
            ran += 1;
        }
        ran
    }

    /// Run exactly one tick (no-op unless running)
    pub fn step(&mut self) {
        let best_before = self.state.best_score;
        tick(&mut self.state, self.timestep.dt_ms());
        if self.state.best_score > best_before {
            self.persist_best();
        }
    }

    /// Write the in-memory best score. Failures are logged and retried on the
    /// next improvement, which writes the then-current value.
    fn persist_best(&mut self) {
        let best = self.state.best_score;
        match self.store.save_best(best) {
            Ok(()) => log::debug!("Best score {} saved", best),
            Err(e) => log::warn!("Could not save best score {}: {}", best, e),
        }
    }

    /// Begin a barrier drag at board coordinates
    pub fn pointer_down(&mut self, x: f32, y: f32) {
        if self.state.phase != GamePhase::Running || !self.state.can_add_barrier() {
            return;
        }
        let p = Vec2::new(x, y);
        self.drag = Some(DragGesture { start: p, end: p });
    }

    /// Move the provisional end of the drag
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if let Some(drag) = self.drag.as_mut() {
            drag.end = Vec2::new(x, y);
        }
    }

    /// Finish the drag and try to commit it as a barrier
    pub fn pointer_up(&mut self, x: f32, y: f32) -> Result<u32, BarrierRejection> {
        let Some(mut drag) = self.drag.take() else {
            return Err(BarrierRejection::NoGesture);
        };
        drag.end = Vec2::new(x, y);
        let result = self.state.add_barrier(drag.start, drag.end);
        match result {
            Ok(id) => log::debug!("Barrier {} added ({:.0} long)", id, drag.start.distance(drag.end)),
            Err(reason) => log::debug!("Barrier discarded: {:?}", reason),
        }
        result
    }

    /// Pointer left the board: the drag ends where it last was
    pub fn pointer_cancel(&mut self) -> Result<u32, BarrierRejection> {
        match self.drag {
            Some(drag) => self.pointer_up(drag.end.x, drag.end.y),
            None => Err(BarrierRejection::NoGesture),
        }
    }

    /// Immutable copy of everything a renderer needs
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state, self.drag.map(|d| (d.start, d.end)))
    }

    /// Events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for board setups; call only between ticks
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}
