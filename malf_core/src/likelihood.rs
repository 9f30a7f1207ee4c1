//! Per-voxel likelihood math for atlas voting.
//!
//! Each atlas contributes, at every voxel, a pair of likelihoods
//! `(outside, inside)` built from two factors:
//!
//! - an intensity similarity `exp(-(t - a)² / 2σ²)`, floored at a configured
//!   minimum so one outlier voxel never silences an atlas;
//! - a structure prior from the signed distance `d` (positive outside),
//!   `(e^{ρd}, e^{-ρd})` normalized to sum to one.
//!
//! The Gaussian normalizing constant is omitted: it scales both likelihoods
//! equally and cancels in the posterior `L_in / (L_out + L_in)`.
//!
//! These functions are the scalar reference for the parallel engine in
//! `malf_rs`; the engine calls them per voxel.

/// Magnitude of `ρ·d` beyond which the distance prior saturates.
///
/// `e^50 ≈ 5.2e21` stays well inside `f32` range, so neither the exponentials
/// nor their sum overflow before normalization.
pub const SATURATION_LIMIT: f64 = 50.0;

/// Scalar parameters read by every vote.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoteParams {
    /// Distance-prior sharpness (1/mm).
    pub rho: f64,
    /// Intensity-similarity width.
    pub sigma: f64,
    /// Lower bound for the intensity similarity.
    pub minimum_similarity: f64,
}

/// Structure-prior likelihoods for one voxel, normalized to sum to one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceLikelihood {
    /// Likelihood that the voxel lies outside the structure.
    pub outside: f64,
    /// Likelihood that the voxel lies inside the structure.
    pub inside: f64,
}

/// Weighted contribution of one atlas at one voxel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VoxelVote {
    /// Amount added to the outside accumulator.
    pub outside: f64,
    /// Amount added to the inside accumulator.
    pub inside: f64,
}

/// Gaussian intensity similarity between target and atlas, floored at
/// `minimum_similarity`.
///
/// A NaN intensity yields the floor, since `f64::max` ignores NaN.
#[inline]
pub fn intensity_similarity(target: f64, atlas: f64, sigma: f64, minimum_similarity: f64) -> f64 {
    let diff = target - atlas;
    let similarity = (-(diff * diff) / (2.0 * sigma * sigma)).exp();
    similarity.max(minimum_similarity)
}

/// Unnormalized structure-prior likelihoods with saturation.
///
/// `outside_distance` follows the inside-negative convention. When
/// `|ρ·d|` exceeds [`SATURATION_LIMIT`] the pair is pinned to exactly
/// `(1, 0)` or `(0, 1)`.
#[inline]
pub fn saturated_likelihoods(outside_distance: f64, rho: f64) -> (f64, f64) {
    let exponent = rho * outside_distance;
    if exponent > SATURATION_LIMIT {
        (1.0, 0.0)
    } else if exponent < -SATURATION_LIMIT {
        (0.0, 1.0)
    } else {
        (exponent.exp(), (-exponent).exp())
    }
}

/// Structure-prior likelihoods normalized to a probability pair.
#[inline]
pub fn distance_likelihood(outside_distance: f64, rho: f64) -> DistanceLikelihood {
    let (outside, inside) = saturated_likelihoods(outside_distance, rho);
    let sum = outside + inside;
    DistanceLikelihood {
        outside: outside / sum,
        inside: inside / sum,
    }
}

/// Full contribution of one atlas voxel.
#[inline]
pub fn voxel_vote(target: f64, atlas: f64, outside_distance: f64, params: &VoteParams) -> VoxelVote {
    let similarity =
        intensity_similarity(target, atlas, params.sigma, params.minimum_similarity);
    let prior = distance_likelihood(outside_distance, params.rho);
    VoxelVote {
        outside: prior.outside * similarity,
        inside: prior.inside * similarity,
    }
}

/// Posterior probability of "inside" from pooled likelihoods.
///
/// Assumes 1:1 prior odds and a linear opinion pool. Returns 0 when both
/// likelihoods are zero.
#[inline]
pub fn posterior(like_outside: f64, like_inside: f64) -> f64 {
    let sum = like_outside + like_inside;
    if sum > 0.0 {
        like_inside / sum
    } else {
        0.0
    }
}
