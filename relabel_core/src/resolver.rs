//! The proximity voting resolver.
//!
//! Given one problem trajectory and its position at a reference frame, the
//! resolver ranks every recorded sample of every candidate in the trouble
//! pool by Euclidean distance to that position and lets the K nearest
//! samples vote on which candidate the problem trajectory belongs to.
//!
//! The ranking is all-samples, not per-candidate-nearest: a candidate that
//! spent many frames near the reference position earns many votes, which is
//! what makes the decision robust to individual noisy samples.

use crate::geom;
use crate::trouble_pool::TroublePool;
use relabel_host::{HostContext, HostError, TrajectoryId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Number of nearest samples that take part in the vote.
pub const CLOSEST_SAMPLES: usize = 30;

/// One candidate sample's distance to the reference position.
///
/// Short-lived: built fresh per resolution, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceVote {
    pub id: TrajectoryId,
    pub distance: f64,
}

/// The winning candidate of a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Candidate the problem trajectory should be merged into
    pub winner: TrajectoryId,
    /// How many of the K nearest samples belonged to the winner
    pub votes: usize,
}

/// Errors terminating a single resolution.
///
/// All of them abort the call before any merge is requested; the pool and
/// the store are left untouched. Nothing is retried - the operator
/// re-triggers the command after fixing the selection or the data.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FixError {
    /// The problem trajectory has no position at the reference frame,
    /// so there is no query point to vote around
    #[error("no sample for trajectory {trajectory} at frame {frame}")]
    NoReferenceSample {
        trajectory: TrajectoryId,
        frame: usize,
    },

    /// A boundary query failed while gathering candidate histories
    #[error("{source}")]
    Store {
        #[source]
        source: HostError,
        /// The candidate set in flight when the store failed
        candidates: Vec<TrajectoryId>,
    },

    /// No distance votes could be tallied
    #[error("no distance votes could be tallied")]
    NoVotes,
}

/// Decides which pool candidate the problem trajectory belongs to.
///
/// Read-only: the caller owns the follow-up merge request and all operator
/// notifications. Returns [`FixError::NoVotes`] when the pool is empty or no
/// candidate has a single present sample.
pub fn resolve<H: HostContext>(
    host: &H,
    pool: &TroublePool,
    problem: TrajectoryId,
    reference_frame: usize,
) -> Result<Resolution, FixError> {
    let reference = host
        .sample_at(problem, reference_frame)
        .map_err(|source| FixError::Store {
            source,
            candidates: vec![problem],
        })?
        .ok_or(FixError::NoReferenceSample {
            trajectory: problem,
            frame: reference_frame,
        })?;

    // Entire recorded history of every candidate, gaps discarded. A failed
    // fetch aborts the whole resolution; partial rankings are never voted on.
    let mut votes: Vec<DistanceVote> = Vec::new();
    for entry in pool.entries() {
        let history = host.history(entry.id).map_err(|source| FixError::Store {
            source,
            candidates: pool.entries().iter().map(|e| e.id).collect(),
        })?;
        for (_, position) in geom::present(&history) {
            votes.push(DistanceVote {
                id: entry.id,
                distance: geom::distance(position, &reference),
            });
        }
    }

    // All-samples ranking: stable sort keeps equal distances in pool order
    votes.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));
    votes.truncate(CLOSEST_SAMPLES);

    tally(&votes).ok_or(FixError::NoVotes)
}

/// Counts votes per candidate and picks the winner.
///
/// Tie-break, in order: higher vote count, then smaller nearest contributing
/// distance, then smaller trajectory id. The last tier is total over distinct
/// ids, so the outcome never depends on tally iteration order.
fn tally(votes: &[DistanceVote]) -> Option<Resolution> {
    let mut counts: HashMap<TrajectoryId, (usize, f64)> = HashMap::new();
    for vote in votes {
        let slot = counts.entry(vote.id).or_insert((0, f64::INFINITY));
        slot.0 += 1;
        if vote.distance < slot.1 {
            slot.1 = vote.distance;
        }
    }

    counts
        .into_iter()
        .max_by(|(id_a, (count_a, near_a)), (id_b, (count_b, near_b))| {
            count_a
                .cmp(count_b)
                .then_with(|| near_b.partial_cmp(near_a).unwrap_or(Ordering::Equal))
                .then_with(|| id_b.cmp(id_a))
        })
        .map(|(winner, (votes, _))| Resolution { winner, votes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use relabel_host::MemoryHost;

    fn cluster(center: [f64; 3], count: usize, step: f64) -> Vec<Option<Point3<f64>>> {
        (0..count)
            .map(|i| {
                Some(Point3::new(
                    center[0] + i as f64 * step,
                    center[1],
                    center[2],
                ))
            })
            .collect()
    }

    fn loaded_pool(host: &mut MemoryHost, ids: &[TrajectoryId]) -> TroublePool {
        host.select(ids);
        let mut pool = TroublePool::new();
        pool.load(host);
        pool
    }

    #[test]
    fn test_nearby_cluster_wins() {
        let mut host = MemoryHost::new(100.0);
        let left = host.insert(Some("LeftHand"), cluster([0.0, 0.0, 0.0], 5, 0.01));
        let right = host.insert(Some("RightHand"), cluster([10.0, 10.0, 10.0], 5, 0.01));
        let problem = host.insert(None, vec![Some(Point3::new(0.02, 0.0, 0.0))]);

        let pool = loaded_pool(&mut host, &[left, right]);
        let resolution = resolve(&host, &pool, problem, 0).unwrap();

        assert_eq!(resolution.winner, left);
        assert_eq!(resolution.votes, 5);
    }

    #[test]
    fn test_vote_bounded_by_k() {
        let mut host = MemoryHost::new(100.0);
        // Far more than K samples in one candidate
        let near = host.insert(Some("Near"), cluster([0.0, 0.0, 0.0], 200, 0.001));
        let problem = host.insert(None, vec![Some(Point3::new(0.0, 0.0, 0.0))]);

        let pool = loaded_pool(&mut host, &[near]);
        let resolution = resolve(&host, &pool, problem, 0).unwrap();

        assert_eq!(resolution.winner, near);
        assert_eq!(resolution.votes, CLOSEST_SAMPLES);
    }

    #[test]
    fn test_dense_candidate_outvotes_closer_sparse_one() {
        let mut host = MemoryHost::new(100.0);
        // Sparse candidate is nearer, but only contributes 5 of the 30 votes
        let sparse = host.insert(Some("Sparse"), cluster([0.0, 0.0, 0.0], 5, 0.001));
        let dense = host.insert(Some("Dense"), cluster([0.5, 0.0, 0.0], 100, 0.0001));
        let problem = host.insert(None, vec![Some(Point3::new(0.0, 0.0, 0.0))]);

        let pool = loaded_pool(&mut host, &[sparse, dense]);
        let resolution = resolve(&host, &pool, problem, 0).unwrap();

        assert_eq!(resolution.winner, dense);
        assert_eq!(resolution.votes, CLOSEST_SAMPLES - 5);
    }

    #[test]
    fn test_gaps_are_excluded_from_voting() {
        let mut host = MemoryHost::new(100.0);
        let mut gappy = vec![None; 40];
        gappy[7] = Some(Point3::new(0.0, 0.0, 0.0));
        let candidate = host.insert(Some("Gappy"), gappy);
        let problem = host.insert(None, vec![Some(Point3::new(0.0, 0.0, 0.0))]);

        let pool = loaded_pool(&mut host, &[candidate]);
        let resolution = resolve(&host, &pool, problem, 0).unwrap();

        // Only the single present sample votes
        assert_eq!(resolution.votes, 1);
    }

    #[test]
    fn test_count_tie_broken_by_nearest_distance() {
        let mut host = MemoryHost::new(100.0);
        let farther = host.insert(Some("Farther"), vec![Some(Point3::new(2.0, 0.0, 0.0))]);
        let nearer = host.insert(Some("Nearer"), vec![Some(Point3::new(1.0, 0.0, 0.0))]);
        let problem = host.insert(None, vec![Some(Point3::new(0.0, 0.0, 0.0))]);

        // One vote each; the nearer candidate must win regardless of pool order
        let pool = loaded_pool(&mut host, &[farther, nearer]);
        assert_eq!(resolve(&host, &pool, problem, 0).unwrap().winner, nearer);

        let pool = loaded_pool(&mut host, &[nearer, farther]);
        assert_eq!(resolve(&host, &pool, problem, 0).unwrap().winner, nearer);
    }

    #[test]
    fn test_exact_tie_broken_by_smaller_id() {
        let mut host = MemoryHost::new(100.0);
        // Mirror-image samples: both exactly 1.0 from the reference
        let first = host.insert(Some("A"), vec![Some(Point3::new(1.0, 0.0, 0.0))]);
        let second = host.insert(Some("B"), vec![Some(Point3::new(-1.0, 0.0, 0.0))]);
        let problem = host.insert(None, vec![Some(Point3::new(0.0, 0.0, 0.0))]);

        let expected = first.min(second);
        let pool = loaded_pool(&mut host, &[second, first]);
        assert_eq!(resolve(&host, &pool, problem, 0).unwrap().winner, expected);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let mut host = MemoryHost::new(100.0);
        let a = host.insert(Some("A"), cluster([0.0, 0.0, 0.0], 20, 0.01));
        let b = host.insert(Some("B"), cluster([0.1, 0.0, 0.0], 20, 0.01));
        let problem = host.insert(None, vec![Some(Point3::new(0.05, 0.0, 0.0))]);

        let pool = loaded_pool(&mut host, &[a, b]);
        let one = resolve(&host, &pool, problem, 0).unwrap();
        let two = resolve(&host, &pool, problem, 0).unwrap();

        assert_eq!(one, two);
    }

    #[test]
    fn test_missing_reference_sample_is_fatal() {
        let mut host = MemoryHost::new(100.0);
        let candidate = host.insert(Some("A"), cluster([0.0, 0.0, 0.0], 3, 0.01));
        let problem = host.insert(None, vec![None, Some(Point3::new(0.0, 0.0, 0.0))]);

        let pool = loaded_pool(&mut host, &[candidate]);
        let err = resolve(&host, &pool, problem, 0).unwrap_err();

        assert!(matches!(err, FixError::NoReferenceSample { frame: 0, .. }));
    }

    #[test]
    fn test_store_failure_aborts_without_partial_result() {
        let mut host = MemoryHost::new(100.0);
        let good = host.insert(Some("Good"), cluster([0.0, 0.0, 0.0], 3, 0.01));
        let bad = host.insert(Some("Bad"), cluster([0.0, 0.0, 0.0], 3, 0.01));
        host.corrupt(bad);
        let problem = host.insert(None, vec![Some(Point3::new(0.0, 0.0, 0.0))]);

        let pool = loaded_pool(&mut host, &[good, bad]);
        let err = resolve(&host, &pool, problem, 0).unwrap_err();

        match err {
            FixError::Store { candidates, .. } => {
                // Error names the whole candidate set in flight
                assert_eq!(candidates, vec![good, bad]);
            }
            other => panic!("expected store error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_pool_yields_no_votes() {
        let mut host = MemoryHost::new(100.0);
        let problem = host.insert(None, vec![Some(Point3::new(0.0, 0.0, 0.0))]);

        let pool = TroublePool::new();
        let err = resolve(&host, &pool, problem, 0).unwrap_err();
        assert!(matches!(err, FixError::NoVotes));
    }

    #[test]
    fn test_all_gap_candidates_yield_no_votes() {
        let mut host = MemoryHost::new(100.0);
        let empty = host.insert(Some("Empty"), vec![None, None, None]);
        let problem = host.insert(None, vec![Some(Point3::new(0.0, 0.0, 0.0))]);

        let pool = loaded_pool(&mut host, &[empty]);
        let err = resolve(&host, &pool, problem, 0).unwrap_err();
        assert!(matches!(err, FixError::NoVotes));
    }
}
