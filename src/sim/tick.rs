//! Fixed timestep simulation tick
//!
//! One call advances a running session by exactly one tick:
//! removals → spawn → integrate → collide → match/score → combo → pile-up → barriers.

use super::collision::resolve_collisions;
use super::integrate::integrate;
use super::matching::{MatchGroup, find_matches, mark_for_removal};
use super::state::{GameEvent, GamePhase, GameState};

/// Advance the game state by one fixed timestep of `dt_ms` milliseconds
pub fn tick(state: &mut GameState, dt_ms: u32) {
    // Don't tick unless running
    if state.phase != GamePhase::Running {
        return;
    }

    state.time_ticks += 1;
    state.game_time_ms += u64::from(dt_ms);
    let now = state.game_time_ms;

    // Drop orbs whose removal grace period is over
    state.orbs.retain(|o| !o.removal_due(now));

    // Spawn
    let interval = u64::from(state.tuning.spawn_interval_at(state.level));
    let spawn_due = state
        .last_spawn_ms
        .is_none_or(|last| now.saturating_sub(last) > interval);
    if spawn_due {
        state.spawn_random_orb();
    }

    // Physics
    for id in integrate(&mut state.orbs, &state.board, &state.tuning) {
        state.events.push(GameEvent::OrbLocked { id });
    }
    resolve_collisions(&mut state.orbs, &state.barriers, state.tuning.bounce);

    // Matching
    let groups = find_matches(
        &state.orbs,
        state.tuning.match_distance,
        state.tuning.min_match_size,
    );
    if groups.is_empty() {
        state.combo = 0;
    } else {
        let deadline = now + u64::from(state.tuning.removal_grace_ms);
        mark_for_removal(&mut state.orbs, &groups, deadline);
        apply_matches(state, &groups);
    }

    // Pile-up
    let piled = state.piled_up_count();
    if piled > state.tuning.pile_up_limit {
        state.phase = GamePhase::GameOver;
        state.events.push(GameEvent::GameOver { score: state.score });
        log::info!(
            "Game over: {} orbs piled up, final score {} (level {})",
            piled,
            state.score,
            state.level
        );
    }

    // Barrier lifetimes
    for barrier in &mut state.barriers {
        if barrier.age(dt_ms) {
            state.events.push(GameEvent::BarrierExpired { id: barrier.id });
        }
    }
    state.barriers.retain(|b| b.active);
}

/// Score the tick's match groups, then advance combo and level
fn apply_matches(state: &mut GameState, groups: &[MatchGroup]) {
    let per_level = state.tuning.matches_per_level.max(1);

    for group in groups {
        let points = group.size() as u64
            * state.tuning.points_per_orb
            * (u64::from(state.combo) + 1)
            * u64::from(state.level);
        state.score += points;
        state.events.push(GameEvent::Matched {
            size: group.size(),
            color: group.color,
            points,
        });

        let before = state.match_count / per_level;
        state.match_count += 1;
        if state.match_count / per_level > before {
            state.level += 1;
            state.events.push(GameEvent::LevelUp { level: state.level });
            log::info!("Level up: {} ({} matches)", state.level, state.match_count);
        }
    }

    // One combo step per tick, however many groups matched
    state.combo += 1;

    if state.score > state.best_score {
        state.best_score = state.score;
        state.events.push(GameEvent::NewBestScore { score: state.score });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::settings::Tuning;
    use glam::Vec2;
    use proptest::prelude::*;

    /// Tuning that never spawns, so tests control every orb
    fn quiet() -> Tuning {
        Tuning {
            spawn_interval_ms: u32::MAX,
            spawn_floor_ms: u32::MAX,
            ..Tuning::default()
        }
    }

    fn quiet_state() -> GameState {
        let mut state = GameState::running(12345, quiet());
        // Pretend the opening spawn already happened
        state.last_spawn_ms = Some(0);
        state
    }

    fn place_row(state: &mut GameState, color: u8, xs: &[f32]) {
        for &x in xs {
            state.place_locked_orb(Vec2::new(x, 575.0), color);
        }
    }

    #[test]
    fn test_first_tick_spawns() {
        let mut state = GameState::running(1, Tuning::default());
        tick(&mut state, TICK_MS);
        assert_eq!(state.orbs.len(), 1);
        assert_eq!(state.last_spawn_ms, Some(u64::from(TICK_MS)));
    }

    #[test]
    fn test_spawn_cadence_follows_level() {
        let mut state = GameState::running(1, Tuning::default());
        tick(&mut state, TICK_MS);
        // Interval at level 1 is 1900ms: the next spawn needs strictly more elapsed
        let ticks_to_next = 1900 / TICK_MS + 1;
        for _ in 0..ticks_to_next - 1 {
            tick(&mut state, TICK_MS);
        }
        assert_eq!(state.orbs.len(), 1);
        tick(&mut state, TICK_MS);
        assert_eq!(state.orbs.len(), 2);
    }

    #[test]
    fn test_paused_and_idle_do_not_tick() {
        let mut state = GameState::new(1, Tuning::default());
        tick(&mut state, TICK_MS);
        assert_eq!(state.time_ticks, 0);

        state.phase = GamePhase::Paused;
        tick(&mut state, TICK_MS);
        assert_eq!(state.time_ticks, 0);
        assert!(state.orbs.is_empty());
    }

    #[test]
    fn test_match_scores_and_removes_after_grace() {
        let mut state = quiet_state();
        place_row(&mut state, 0, &[100.0, 130.0, 160.0]);

        tick(&mut state, TICK_MS);
        assert_eq!(state.score, 300);
        assert_eq!(state.match_count, 1);
        assert_eq!(state.combo, 1);
        assert_eq!(state.best_score, 300);
        assert!(state.orbs.iter().all(|o| o.pending_removal));

        // Still on the board during the grace period
        let grace_ticks = REMOVAL_GRACE_MS / TICK_MS;
        for _ in 0..grace_ticks - 1 {
            tick(&mut state, TICK_MS);
            assert_eq!(state.orbs.len(), 3);
        }
        // Removing orbs can't score twice
        assert_eq!(state.score, 300);

        tick(&mut state, TICK_MS);
        tick(&mut state, TICK_MS);
        assert!(state.orbs.is_empty());
    }

    #[test]
    fn test_combo_builds_and_resets() {
        let mut state = quiet_state();
        place_row(&mut state, 0, &[20.0, 50.0, 80.0]);
        tick(&mut state, TICK_MS);
        assert_eq!(state.combo, 1);

        place_row(&mut state, 1, &[200.0, 230.0, 260.0]);
        tick(&mut state, TICK_MS);
        assert_eq!(state.combo, 2);
        // Second match scored with combo multiplier 2
        assert_eq!(state.score, 300 + 300 * 2);

        tick(&mut state, TICK_MS);
        assert_eq!(state.combo, 0);
    }

    #[test]
    fn test_two_groups_one_tick_single_combo_step() {
        let mut state = quiet_state();
        place_row(&mut state, 0, &[20.0, 50.0, 80.0]);
        place_row(&mut state, 1, &[200.0, 230.0, 260.0]);
        tick(&mut state, TICK_MS);
        assert_eq!(state.match_count, 2);
        assert_eq!(state.combo, 1);
        assert_eq!(state.score, 600);
    }

    #[test]
    fn test_level_up_never_skips_a_multiple() {
        let mut state = quiet_state();
        state.match_count = 4;
        // Two groups in one tick take match_count from 4 to 6
        place_row(&mut state, 0, &[20.0, 50.0, 80.0]);
        place_row(&mut state, 1, &[200.0, 230.0, 260.0]);
        tick(&mut state, TICK_MS);
        assert_eq!(state.match_count, 6);
        assert_eq!(state.level, 2);
        // First group at level 1, second after the level-up
        assert_eq!(state.score, 300 + 600);
    }

    #[test]
    fn test_barriers_expire() {
        let mut state = quiet_state();
        state.tuning.barrier_lifetime_ms = 3 * TICK_MS;
        state
            .add_barrier(Vec2::new(10.0, 300.0), Vec2::new(200.0, 300.0))
            .unwrap();
        tick(&mut state, TICK_MS);
        tick(&mut state, TICK_MS);
        assert_eq!(state.barriers.len(), 1);
        tick(&mut state, TICK_MS);
        assert!(state.barriers.is_empty());
        assert!(
            state
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::BarrierExpired { .. }))
        );
    }

    #[test]
    fn test_pile_up_ends_game() {
        let mut state = quiet_state();
        for i in 0..=PILE_UP_LIMIT {
            // Alternate colors, 35 apart: no overlaps, no matches
            state.place_locked_orb(Vec2::new(20.0 + i as f32 * 35.0, 50.0), (i % 2) as u8);
        }
        tick(&mut state, TICK_MS);
        assert_eq!(state.phase, GamePhase::GameOver);
        let ticks = state.time_ticks;
        tick(&mut state, TICK_MS);
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_pile_at_limit_keeps_running() {
        let mut state = quiet_state();
        for i in 0..PILE_UP_LIMIT {
            state.place_locked_orb(Vec2::new(20.0 + i as f32 * 35.0, 50.0), (i % 2) as u8);
        }
        tick(&mut state, TICK_MS);
        assert_eq!(state.phase, GamePhase::Running);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = GameState::running(99999, Tuning::default());
        let mut state2 = GameState::running(99999, Tuning::default());

        for i in 0..600 {
            if i == 100 {
                let a = Vec2::new(50.0, 400.0);
                let b = Vec2::new(350.0, 450.0);
                state1.add_barrier(a, b).unwrap();
                state2.add_barrier(a, b).unwrap();
            }
            tick(&mut state1, TICK_MS);
            tick(&mut state2, TICK_MS);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.orbs, state2.orbs);
        assert_eq!(state1.score, state2.score);
    }

    proptest! {
        #[test]
        fn prop_combo_resets_on_matchless_tick(combo in 0u32..50, seed in any::<u64>()) {
            let mut state = GameState::running(seed, quiet());
            state.last_spawn_ms = Some(0);
            state.combo = combo;
            tick(&mut state, TICK_MS);
            prop_assert_eq!(state.combo, 0);
        }

        #[test]
        fn prop_radius_and_lock_invariants(seed in any::<u64>(), ticks in 1usize..600) {
            let mut state = GameState::running(seed, Tuning::default());
            let mut locked_ids = std::collections::HashSet::new();
            for _ in 0..ticks {
                tick(&mut state, TICK_MS);
                for orb in &state.orbs {
                    prop_assert_eq!(orb.radius(), ORB_RADIUS);
                    if locked_ids.contains(&orb.id) {
                        prop_assert!(orb.is_locked());
                    }
                    if orb.is_locked() {
                        locked_ids.insert(orb.id);
                    }
                }
            }
        }
    }
}
