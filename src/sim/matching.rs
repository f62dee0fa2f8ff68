//! Same-color cluster detection over resting orbs
//!
//! Locked orbs form an undirected graph: two orbs of one color are adjacent
//! when their centres are within the match distance. Connected components of
//! at least `min_size` orbs are matches.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::state::Orb;

/// A maximal connected same-color cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchGroup {
    pub color: u8,
    /// Member ids, ascending
    pub orb_ids: Vec<u32>,
}

impl MatchGroup {
    #[inline]
    pub fn size(&self) -> usize {
        self.orb_ids.len()
    }
}

/// Can this orb take part in a match right now?
#[inline]
fn matchable(orb: &Orb) -> bool {
    orb.is_locked() && !orb.pending_removal
}

/// Find every same-color cluster of at least `min_size` locked orbs.
///
/// Pure: orbs already waiting for removal and orbs still falling are ignored,
/// and the same input always yields the same groups in the same order
/// (groups ordered by their lowest id).
pub fn find_matches(orbs: &[Orb], match_distance: f32, min_size: usize) -> Vec<MatchGroup> {
    let mut candidates: Vec<usize> = (0..orbs.len()).filter(|&i| matchable(&orbs[i])).collect();
    candidates.sort_by_key(|&i| orbs[i].id);

    let max_dist_sq = match_distance * match_distance;
    let mut visited = vec![false; candidates.len()];
    let mut queue = VecDeque::new();
    let mut groups = Vec::new();

    for start in 0..candidates.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        queue.push_back(start);
        let color = orbs[candidates[start]].color;
        let mut members = Vec::new();

        while let Some(current) = queue.pop_front() {
            let here = &orbs[candidates[current]];
            members.push(here.id);

            for (next, &idx) in candidates.iter().enumerate() {
                if visited[next] {
                    continue;
                }
                let other = &orbs[idx];
                if other.color == color && here.pos.distance_squared(other.pos) <= max_dist_sq {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }

        if members.len() >= min_size {
            members.sort_unstable();
            groups.push(MatchGroup {
                color,
                orb_ids: members,
            });
        }
    }

    groups
}

/// Flag every member of `groups` for removal at `deadline_ms`.
///
/// Returns the number of orbs flagged.
pub fn mark_for_removal(orbs: &mut [Orb], groups: &[MatchGroup], deadline_ms: u64) -> usize {
    let mut flagged = 0;
    for orb in orbs.iter_mut() {
        if groups.iter().any(|g| g.orb_ids.binary_search(&orb.id).is_ok()) {
            orb.mark_for_removal(deadline_ms);
            flagged += 1;
        }
    }
    flagged
}
