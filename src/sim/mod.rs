//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, storage or platform dependencies

pub mod collision;
pub mod integrate;
pub mod matching;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use collision::{CollisionResult, orb_barrier_collision, orb_orb_collision, reflect_velocity, resolve_collisions};
pub use integrate::integrate;
pub use matching::{MatchGroup, find_matches, mark_for_removal};
pub use snapshot::{BarrierSnapshot, CountersSnapshot, OrbSnapshot, Snapshot};
pub use state::{Barrier, BarrierRejection, Board, GameEvent, GamePhase, GameState, Orb};
pub use tick::tick;
