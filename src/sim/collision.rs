//! Collision detection and response
//!
//! Orb-orb contacts get positional separation plus an equal-mass impulse.
//! Orb-barrier contacts only reflect velocity; leftover overlap is resolved
//! by the reflected motion on later ticks.

use glam::Vec2;

use super::state::{Barrier, Orb};

/// Below this squared length a vector is treated as zero
const DEGENERATE_EPS_SQ: f32 = 1e-12;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Unit normal (from the second body toward the first, or the barrier normal)
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check two orbs for overlap.
///
/// Coincident centres report a miss: there is no axis to separate along.
pub fn orb_orb_collision(a: &Orb, b: &Orb) -> CollisionResult {
    let delta = a.pos - b.pos;
    let dist_sq = delta.length_squared();
    let radii = a.radius() + b.radius();

    if dist_sq >= radii * radii || dist_sq < DEGENERATE_EPS_SQ {
        return CollisionResult::miss();
    }

    let dist = dist_sq.sqrt();
    CollisionResult {
        hit: true,
        normal: delta / dist,
        penetration: radii - dist,
    }
}

/// Separate two overlapping orbs and exchange momentum along the normal.
///
/// Two unlocked orbs each move out by half the overlap. A locked orb is
/// immovable: its unlocked partner takes the whole overlap. Two locked orbs
/// are left alone.
pub fn resolve_orb_orb(a: &mut Orb, b: &mut Orb, hit: &CollisionResult, bounce: f32) {
    let n = hit.normal;
    match (a.is_locked(), b.is_locked()) {
        (true, true) => return,
        (true, false) => b.pos -= n * hit.penetration,
        (false, true) => a.pos += n * hit.penetration,
        (false, false) => {
            let half = hit.penetration / 2.0;
            a.pos += n * half;
            b.pos -= n * half;
        }
    }

    let relative_normal_speed = (a.vel - b.vel).dot(n);
    if relative_normal_speed >= 0.0 {
        // Already separating
        return;
    }

    // Equal masses: equal and opposite impulse along the normal
    let impulse = n * relative_normal_speed * bounce;
    if !a.is_locked() {
        a.vel -= impulse;
    }
    if !b.is_locked() {
        b.vel += impulse;
    }
}

/// Check an orb against a barrier segment.
///
/// Hit when the centre is within one radius of the infinite line through the
/// segment and inside the segment's bounding box grown by the radius.
pub fn orb_barrier_collision(orb: &Orb, barrier: &Barrier) -> CollisionResult {
    if !barrier.active {
        return CollisionResult::miss();
    }

    let line = barrier.end - barrier.start;
    let len_sq = line.length_squared();
    if len_sq < DEGENERATE_EPS_SQ {
        return CollisionResult::miss(); // Degenerate segment
    }

    let normal = line.perp() / len_sq.sqrt();
    let distance = (orb.pos - barrier.start).dot(normal).abs();
    let r = orb.radius();
    if distance >= r {
        return CollisionResult::miss();
    }

    let min = barrier.start.min(barrier.end) - Vec2::splat(r);
    let max = barrier.start.max(barrier.end) + Vec2::splat(r);
    let inside = orb.pos.cmpge(min).all() && orb.pos.cmple(max).all();
    if !inside {
        return CollisionResult::miss();
    }

    CollisionResult {
        hit: true,
        normal,
        penetration: r - distance,
    }
}

/// Reflect velocity off a surface, scaled by restitution
///
/// v' = v - 2(v·n)n·bounce
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2, bounce: f32) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal * bounce
}

/// Resolve every orb pair and every (orb, active barrier) pair once.
///
/// `orbs` must be sorted by id; pairs are visited in (i, j) index order.
/// Returns the number of contacts resolved.
pub fn resolve_collisions(orbs: &mut [Orb], barriers: &[Barrier], bounce: f32) -> usize {
    let mut contacts = 0;

    for i in 0..orbs.len() {
        let (head, tail) = orbs.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            let hit = orb_orb_collision(a, b);
            if hit.hit {
                resolve_orb_orb(a, b, &hit, bounce);
                contacts += 1;
            }
        }
    }

    for barrier in barriers.iter().filter(|b| b.active) {
        for orb in orbs.iter_mut() {
            if orb.is_locked() {
                continue;
            }
            let hit = orb_barrier_collision(orb, barrier);
            if hit.hit {
                orb.vel = reflect_velocity(orb.vel, hit.normal, bounce);
                contacts += 1;
            }
        }
    }

    contacts
}
