//! Normalization of pooled likelihoods into a posterior weight map.
//!
//! `weight = L_in / (L_out + L_in)`: a Bayesian posterior with 1:1 prior
//! odds over likelihoods pooled additively across atlases (a linear opinion
//! pool, not a product of independent likelihoods).
//!
//! The observed likelihood range is reported alongside for diagnostics. It is
//! reduced with a per-task fold followed by a pairwise merge, so the result
//! does not depend on how rayon partitions the voxels.

use malf_core::posterior;
use rayon::prelude::*;

use crate::session::CHUNK_SIZE;

/// Observed min/max of both accumulators across all voxels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LikelihoodRange {
    /// Smallest pooled "outside" likelihood.
    pub outside_min: f32,
    /// Largest pooled "outside" likelihood.
    pub outside_max: f32,
    /// Smallest pooled "inside" likelihood.
    pub inside_min: f32,
    /// Largest pooled "inside" likelihood.
    pub inside_max: f32,
}

impl LikelihoodRange {
    /// Identity element for [`merge`](Self::merge).
    pub const EMPTY: Self = Self {
        outside_min: f32::INFINITY,
        outside_max: f32::NEG_INFINITY,
        inside_min: f32::INFINITY,
        inside_max: f32::NEG_INFINITY,
    };

    /// Extend the range with one voxel.
    #[inline]
    pub fn include(self, outside: f32, inside: f32) -> Self {
        Self {
            outside_min: self.outside_min.min(outside),
            outside_max: self.outside_max.max(outside),
            inside_min: self.inside_min.min(inside),
            inside_max: self.inside_max.max(inside),
        }
    }

    /// Combine two partial ranges.
    #[inline]
    pub fn merge(self, other: Self) -> Self {
        Self {
            outside_min: self.outside_min.min(other.outside_min),
            outside_max: self.outside_max.max(other.outside_max),
            inside_min: self.inside_min.min(other.inside_min),
            inside_max: self.inside_max.max(other.inside_max),
        }
    }

    /// `(min, max)` of the outside accumulator.
    #[inline]
    pub fn outside(&self) -> (f32, f32) {
        (self.outside_min, self.outside_max)
    }

    /// `(min, max)` of the inside accumulator.
    #[inline]
    pub fn inside(&self) -> (f32, f32) {
        (self.inside_min, self.inside_max)
    }
}

/// Write the posterior weight of every voxel into `weights`.
///
/// All three slices have the target's voxel count.
pub(crate) fn write_weights(like_outside: &[f32], like_inside: &[f32], weights: &mut [f32]) {
    weights
        .par_iter_mut()
        .zip(like_outside.par_iter().zip(like_inside.par_iter()))
        .with_min_len(CHUNK_SIZE)
        .for_each(|(w, (&o, &i))| *w = posterior(o as f64, i as f64) as f32);
}

/// Min/max of both accumulators.
pub(crate) fn likelihood_range(like_outside: &[f32], like_inside: &[f32]) -> LikelihoodRange {
    like_outside
        .par_iter()
        .zip(like_inside.par_iter())
        .with_min_len(CHUNK_SIZE)
        .fold(
            || LikelihoodRange::EMPTY,
            |range, (&o, &i)| range.include(o, i),
        )
        .reduce(|| LikelihoodRange::EMPTY, LikelihoodRange::merge)
}
