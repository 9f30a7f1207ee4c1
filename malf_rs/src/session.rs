//! Per-target session state: the bound target and its vote accumulators.

use malf_core::{voxel_vote, SignConvention, VoteParams};
use malf_io::Volume;
use rayon::prelude::*;

use crate::normalize::LikelihoodRange;

/// Voxels handed to a rayon task at a time.
pub(crate) const CHUNK_SIZE: usize = 4096;

/// Read-only view of the vote accumulators.
#[derive(Debug, Clone, Copy)]
pub struct Accumulator<'a> {
    /// Pooled likelihood of "outside", one value per target voxel.
    pub like_outside: &'a [f32],
    /// Pooled likelihood of "inside", one value per target voxel.
    pub like_inside: &'a [f32],
    /// Number of votes accumulated so far.
    pub votes: usize,
}

#[derive(Debug)]
pub(crate) struct Normalized {
    pub(crate) weight_map: Volume,
    pub(crate) range: LikelihoodRange,
}

/// One fusion session. Created by `bind_target`, finalized by `normalize`.
#[derive(Debug)]
pub(crate) struct Session {
    pub(crate) target: Volume,
    pub(crate) like_outside: Vec<f32>,
    pub(crate) like_inside: Vec<f32>,
    pub(crate) votes: usize,
    pub(crate) normalized: Option<Normalized>,
}

impl Session {
    pub(crate) fn new(target: Volume) -> Self {
        let len = target.len();
        Self {
            target,
            like_outside: vec![0.0; len],
            like_inside: vec![0.0; len],
            votes: 0,
            normalized: None,
        }
    }

    #[inline]
    pub(crate) fn is_normalized(&self) -> bool {
        self.normalized.is_some()
    }

    pub(crate) fn accumulator(&self) -> Accumulator<'_> {
        Accumulator {
            like_outside: &self.like_outside,
            like_inside: &self.like_inside,
            votes: self.votes,
        }
    }

    /// Add one atlas's votes to every voxel.
    ///
    /// Callers have already checked that all slices share the target's length.
    pub(crate) fn accumulate(
        &mut self,
        atlas: &[f32],
        distance: &[f32],
        convention: SignConvention,
        params: &VoteParams,
    ) {
        accumulate_votes(
            self.target.as_slice(),
            atlas,
            distance,
            convention,
            params,
            &mut self.like_outside,
            &mut self.like_inside,
        );
        self.votes += 1;
    }
}

/// Parallel per-voxel accumulation over disjoint chunks.
///
/// Each accumulator element is written by exactly one task, so no
/// synchronization is needed inside the loop.
pub(crate) fn accumulate_votes(
    target: &[f32],
    atlas: &[f32],
    distance: &[f32],
    convention: SignConvention,
    params: &VoteParams,
    like_outside: &mut [f32],
    like_inside: &mut [f32],
) {
    like_outside
        .par_chunks_mut(CHUNK_SIZE)
        .zip(like_inside.par_chunks_mut(CHUNK_SIZE))
        .zip(target.par_chunks(CHUNK_SIZE))
        .zip(atlas.par_chunks(CHUNK_SIZE).zip(distance.par_chunks(CHUNK_SIZE)))
        .for_each(|(((outside, inside), target), (atlas, distance))| {
            let inputs = target.iter().zip(atlas).zip(distance);
            for ((o, i), ((&t, &a), &d)) in outside.iter_mut().zip(inside.iter_mut()).zip(inputs) {
                let d = convention.to_outside_positive(d as f64);
                let vote = voxel_vote(t as f64, a as f64, d, params);
                *o += vote.outside as f32;
                *i += vote.inside as f32;
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use malf_core::GridGeometry;

    const PARAMS: VoteParams = VoteParams {
        rho: 1.0,
        sigma: 50.0,
        minimum_similarity: 1e-4,
    };

    #[test]
    fn test_new_session_is_zeroed() {
        let target = Volume::filled(GridGeometry::with_dims([5, 5, 5]).unwrap(), 3.0);
        let session = Session::new(target);
        assert_eq!(session.like_outside.len(), 125);
        assert!(session.like_outside.iter().all(|&v| v == 0.0));
        assert!(session.like_inside.iter().all(|&v| v == 0.0));
        assert_eq!(session.votes, 0);
        assert!(!session.is_normalized());
    }

    #[test]
    fn test_accumulate_matches_scalar_reference() {
        let n = CHUNK_SIZE * 2 + 17;
        let target: Vec<f32> = (0..n).map(|i| (i % 97) as f32).collect();
        let atlas: Vec<f32> = (0..n).map(|i| (i % 89) as f32 * 1.5).collect();
        let distance: Vec<f32> = (0..n).map(|i| (i % 41) as f32 - 20.0).collect();

        let mut outside = vec![0.0f32; n];
        let mut inside = vec![0.0f32; n];
        accumulate_votes(
            &target,
            &atlas,
            &distance,
            SignConvention::InsideNegative,
            &PARAMS,
            &mut outside,
            &mut inside,
        );

        for v in 0..n {
            let expected = voxel_vote(target[v] as f64, atlas[v] as f64, distance[v] as f64, &PARAMS);
            assert_eq!(outside[v], expected.outside as f32, "voxel {}", v);
            assert_eq!(inside[v], expected.inside as f32, "voxel {}", v);
        }
    }

    #[test]
    fn test_accumulate_flips_inside_positive_maps() {
        let target = [0.0f32; 4];
        let distance = [100.0f32, -100.0, 100.0, -100.0];
        let mut outside = [0.0f32; 4];
        let mut inside = [0.0f32; 4];
        accumulate_votes(
            &target,
            &target,
            &distance,
            SignConvention::InsidePositive,
            &PARAMS,
            &mut outside,
            &mut inside,
        );
        assert_eq!(inside, [1.0, 0.0, 1.0, 0.0]);
        assert_eq!(outside, [0.0, 1.0, 0.0, 1.0]);
    }
}
