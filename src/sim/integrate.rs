//! Per-tick motion integration
//!
//! Gravity, friction, side walls and the floor. Velocities are in board units
//! per tick, so there is no dt here: the tick rate is the time unit.

use super::state::{Board, Orb};
use crate::settings::Tuning;

/// Advance every unlocked orb by one tick.
///
/// Returns the ids of orbs that locked during this tick. Locked orbs are
/// skipped entirely.
pub fn integrate(orbs: &mut [Orb], board: &Board, tuning: &Tuning) -> Vec<u32> {
    let mut newly_locked = Vec::new();

    for orb in orbs.iter_mut() {
        if orb.is_locked() {
            continue;
        }
        let r = orb.radius();

        orb.vel.y += tuning.gravity;
        orb.pos += orb.vel;
        orb.vel *= tuning.friction;

        // Side walls
        if orb.pos.x - r < 0.0 {
            orb.pos.x = r;
            orb.vel.x = -orb.vel.x * tuning.bounce;
        }
        if orb.pos.x + r > board.width {
            orb.pos.x = board.width - r;
            orb.vel.x = -orb.vel.x * tuning.bounce;
        }

        // Floor: clamp, kill vertical motion, bleed off horizontal drift.
        // Only an orb on the floor may lock.
        if orb.pos.y + r >= board.floor_y {
            orb.pos.y = board.floor_y - r;
            orb.vel.y = 0.0;
            orb.vel.x *= tuning.floor_damping;

            if orb.vel.x.abs() < tuning.lock_epsilon && orb.vel.y.abs() < tuning.lock_epsilon {
                orb.lock();
                newly_locked.push(orb.id);
            }
        }
    }

    newly_locked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use glam::Vec2;
    use proptest::prelude::*;

    fn falling(x: f32, y: f32, vx: f32, vy: f32) -> Orb {
        let mut orb = Orb::new(1, Vec2::new(x, y), ORB_RADIUS, 0);
        orb.vel = Vec2::new(vx, vy);
        orb
    }

    #[test]
    fn test_gravity_then_move_then_friction() {
        let mut orbs = vec![falling(100.0, 100.0, 1.0, 0.0)];
        integrate(&mut orbs, &Board::default(), &Tuning::default());
        let orb = &orbs[0];
        assert!((orb.pos.x - 101.0).abs() < 1e-5);
        assert!((orb.pos.y - (100.0 + GRAVITY)).abs() < 1e-5);
        assert!((orb.vel.x - FRICTION).abs() < 1e-5);
        assert!((orb.vel.y - GRAVITY * FRICTION).abs() < 1e-5);
    }

    #[test]
    fn test_left_wall_bounce() {
        let mut orbs = vec![falling(16.0, 100.0, -5.0, 0.0)];
        integrate(&mut orbs, &Board::default(), &Tuning::default());
        let orb = &orbs[0];
        assert_eq!(orb.pos.x, ORB_RADIUS);
        assert!((orb.vel.x - 5.0 * FRICTION * BOUNCE).abs() < 1e-5);
    }

    #[test]
    fn test_right_wall_bounce() {
        let mut orbs = vec![falling(BOARD_WIDTH - 16.0, 100.0, 5.0, 0.0)];
        integrate(&mut orbs, &Board::default(), &Tuning::default());
        let orb = &orbs[0];
        assert_eq!(orb.pos.x, BOARD_WIDTH - ORB_RADIUS);
        assert!(orb.vel.x < 0.0);
    }

    #[test]
    fn test_floor_clamps_and_locks_when_still() {
        let board = Board::default();
        let mut orbs = vec![falling(200.0, board.floor_y - ORB_RADIUS - 1.0, 0.05, 3.0)];
        let locked = integrate(&mut orbs, &board, &Tuning::default());
        assert_eq!(orbs[0].pos.y, board.floor_y - ORB_RADIUS);
        assert_eq!(orbs[0].vel.y, 0.0);
        assert!(orbs[0].is_locked());
        assert_eq!(locked, vec![1]);
    }

    #[test]
    fn test_floor_without_lock_when_drifting() {
        let board = Board::default();
        let mut orbs = vec![falling(200.0, board.floor_y - ORB_RADIUS - 1.0, 4.0, 3.0)];
        let locked = integrate(&mut orbs, &board, &Tuning::default());
        assert!(!orbs[0].is_locked());
        assert!(locked.is_empty());
        // vx damped by friction then by the floor
        assert!((orbs[0].vel.x - 4.0 * FRICTION * FLOOR_DAMPING).abs() < 1e-5);
    }

    #[test]
    fn test_slow_orb_in_mid_air_never_locks() {
        let board = Board::default();
        let tuning = Tuning {
            gravity: 0.0,
            ..Tuning::default()
        };
        let mut orbs = vec![falling(200.0, 300.0, 0.0, 0.0)];
        for _ in 0..100 {
            integrate(&mut orbs, &board, &tuning);
        }
        assert!(!orbs[0].is_locked());
    }

    #[test]
    fn test_locked_orb_untouched() {
        let orb = Orb::new_locked(1, Vec2::new(100.0, 50.0), ORB_RADIUS, 2);
        let mut orbs = vec![orb.clone()];
        integrate(&mut orbs, &Board::default(), &Tuning::default());
        assert_eq!(orbs[0], orb);
    }

    proptest! {
        #[test]
        fn prop_floor_clamp_holds(
            x in 0.0f32..400.0,
            y in -20.0f32..600.0,
            vx in -20.0f32..20.0,
            vy in -20.0f32..40.0,
            ticks in 1usize..200,
        ) {
            let board = Board::default();
            let tuning = Tuning::default();
            let mut orbs = vec![falling(x, y, vx, vy)];
            for _ in 0..ticks {
                integrate(&mut orbs, &board, &tuning);
                let orb = &orbs[0];
                if !orb.is_locked() {
                    prop_assert!(orb.pos.y <= board.floor_y - orb.radius() + 1e-3);
                }
                prop_assert_eq!(orb.radius(), ORB_RADIUS);
            }
        }

        #[test]
        fn prop_lock_is_monotonic(
            x in 20.0f32..380.0,
            vx in -3.0f32..3.0,
            ticks in 1usize..400,
        ) {
            let board = Board::default();
            let tuning = Tuning::default();
            let mut orbs = vec![falling(x, -ORB_RADIUS, vx, 0.0)];
            let mut was_locked = false;
            for _ in 0..ticks {
                integrate(&mut orbs, &board, &tuning);
                if was_locked {
                    prop_assert!(orbs[0].is_locked());
                }
                was_locked = orbs[0].is_locked();
            }
        }
    }
}
