//! Voting over many atlases at once.
//!
//! Atlases whose lattice does not match the target are skipped with a
//! warning rather than aborting the whole fusion; any other error still
//! aborts.

use malf_io::{FusionConfig, SignedDistanceMap, Volume};

use crate::engine::VotingEngine;
use crate::error::{FusionError, Result};
use crate::normalize::LikelihoodRange;

/// Outcome of [`VotingEngine::vote_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteSummary {
    /// Number of atlases whose votes were accumulated.
    pub accepted: usize,
    /// Positions (in input order) of atlases skipped for geometry mismatch.
    pub skipped: Vec<usize>,
}

/// Everything a completed fusion produces.
#[derive(Debug)]
pub struct FusionOutput {
    /// Posterior weight map on the target geometry.
    pub weight_map: Volume,
    /// Observed accumulator range.
    pub range: LikelihoodRange,
    /// Which atlases took part.
    pub summary: VoteSummary,
}

impl VotingEngine {
    /// Vote every `(intensity, distance)` pair in order.
    ///
    /// # Errors
    /// Any error other than `GeometryMismatch` stops the loop and is returned;
    /// votes already accumulated stay in the session.
    pub fn vote_all<'a, I>(&mut self, atlases: I) -> Result<VoteSummary>
    where
        I: IntoIterator<Item = (&'a Volume, &'a SignedDistanceMap)>,
    {
        let mut summary = VoteSummary::default();

        for (position, (intensity, distance)) in atlases.into_iter().enumerate() {
            match self.vote(intensity, distance) {
                Ok(()) => summary.accepted += 1,
                Err(FusionError::GeometryMismatch { role, field }) => {
                    log::warn!(
                        "Skipping atlas {}: {} geometry differs from target in {}",
                        position,
                        role,
                        field
                    );
                    summary.skipped.push(position);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(summary)
    }
}

/// Run a complete fusion: bind, vote every atlas, normalize.
///
/// # Errors
/// - `InvalidConfig` / `ThreadPool` from engine construction
/// - `NoVotesRecorded` if every atlas was skipped (or none was given)
///
/// # Example
///
/// ```
/// use malf_core::GridGeometry;
/// use malf_io::{FusionConfig, SignedDistanceMap, Volume};
///
/// let geometry = GridGeometry::with_dims([4, 4, 4]).unwrap();
/// let target = Volume::filled(geometry.clone(), 80.0);
/// let atlas = Volume::filled(geometry.clone(), 80.0);
/// let outside = SignedDistanceMap::from_volume(Volume::filled(geometry, 100.0)).unwrap();
///
/// let output = malf_rs::fuse(FusionConfig::default(), target, [(&atlas, &outside)]).unwrap();
/// assert_eq!(output.summary.accepted, 1);
/// assert!(output.weight_map.as_slice().iter().all(|&w| w < 1e-6));
/// ```
pub fn fuse<'a, I>(config: FusionConfig, target: Volume, atlases: I) -> Result<FusionOutput>
where
    I: IntoIterator<Item = (&'a Volume, &'a SignedDistanceMap)>,
{
    let mut engine = VotingEngine::new(config)?;
    engine.bind_target(target);
    let summary = engine.vote_all(atlases)?;
    let range = engine.normalize()?;
    let weight_map = engine.finish()?;

    Ok(FusionOutput {
        weight_map,
        range,
        summary,
    })
}
