//! The voting engine: bind a target, accumulate atlas votes, normalize.

use malf_core::{GridGeometry, VolumeRole};
use malf_io::{FusionConfig, SignedDistanceMap, Volume};
use rayon::ThreadPool;

use crate::error::{FusionError, Result};
use crate::normalize::{likelihood_range, write_weights, LikelihoodRange};
use crate::session::{Accumulator, Normalized, Session};

/// Multi-atlas voting engine.
///
/// One engine runs one session at a time:
///
/// 1. [`bind_target`](Self::bind_target) allocates zeroed accumulators,
/// 2. [`vote`](Self::vote) adds one atlas per call, in any order,
/// 3. [`normalize`](Self::normalize) turns the accumulators into a weight map,
/// 4. [`weight_map`](Self::weight_map) or [`finish`](Self::finish) hands it out.
///
/// # Example
///
/// ```
/// use malf_core::GridGeometry;
/// use malf_io::{FusionConfig, SignedDistanceMap, Volume};
/// use malf_rs::VotingEngine;
///
/// let geometry = GridGeometry::with_dims([4, 4, 4]).unwrap();
/// let target = Volume::filled(geometry.clone(), 100.0);
/// let atlas = Volume::filled(geometry.clone(), 100.0);
/// let inside = SignedDistanceMap::from_volume(Volume::filled(geometry, -100.0)).unwrap();
///
/// let mut engine = VotingEngine::new(FusionConfig::default()).unwrap();
/// engine.bind_target(target);
/// engine.vote(&atlas, &inside).unwrap();
/// engine.normalize().unwrap();
///
/// let weights = engine.weight_map().unwrap();
/// assert!(weights.as_slice().iter().all(|&w| (w - 1.0).abs() < 1e-6));
/// ```
#[derive(Debug)]
pub struct VotingEngine {
    config: FusionConfig,
    /// Dedicated pool when `config.num_threads > 0`.
    pool: Option<ThreadPool>,
    session: Option<Session>,
}

impl VotingEngine {
    /// Create an engine with validated parameters and no bound target.
    ///
    /// # Errors
    /// - `InvalidConfig` if a parameter is out of range
    /// - `ThreadPool` if a dedicated pool was requested and could not be built
    pub fn new(config: FusionConfig) -> Result<Self> {
        validate_config(&config)?;
        let pool = build_pool(config.num_threads)?;
        Ok(Self {
            config,
            pool,
            session: None,
        })
    }

    /// Current parameters.
    #[inline]
    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Replace the parameters.
    ///
    /// Allowed before or between votes; each vote reads the parameters that
    /// are current when it starts. On error the previous parameters stay.
    pub fn set_config(&mut self, config: FusionConfig) -> Result<()> {
        validate_config(&config)?;
        if config.num_threads != self.config.num_threads {
            self.pool = build_pool(config.num_threads)?;
        }
        self.config = config;
        Ok(())
    }

    /// Start a new session on `target`, discarding any previous one.
    pub fn bind_target(&mut self, target: Volume) {
        log::info!(
            "Binding target {:?} ({} voxels)",
            target.geometry().dim(),
            target.len()
        );
        self.session = Some(Session::new(target));
    }

    /// Whether a target is bound.
    #[inline]
    pub fn is_bound(&self) -> bool {
        self.session.is_some()
    }

    /// Geometry of the bound target.
    pub fn target_geometry(&self) -> Option<&GridGeometry> {
        self.session.as_ref().map(|s| s.target.geometry())
    }

    /// Add one atlas's votes to the accumulators.
    ///
    /// Both volumes must share the target's geometry. All checks happen
    /// before any voxel is written, so a failed call leaves the accumulators
    /// untouched.
    ///
    /// # Errors
    /// - `NoTargetBound` if no target is bound
    /// - `SessionFinalized` if the session was already normalized
    /// - `GeometryMismatch` if either volume's geometry differs from the target's
    pub fn vote(&mut self, atlas: &Volume, distance: &SignedDistanceMap) -> Result<()> {
        let params = self.config.vote_params();
        let session = self.session.as_mut().ok_or(FusionError::NoTargetBound)?;
        if session.is_normalized() {
            return Err(FusionError::SessionFinalized);
        }

        let target_geometry = session.target.geometry();
        check_geometry(target_geometry, atlas.geometry(), VolumeRole::AtlasIntensity)?;
        check_geometry(target_geometry, distance.geometry(), VolumeRole::AtlasDistance)?;

        let convention = distance.convention();
        install(self.pool.as_ref(), || {
            session.accumulate(atlas.as_slice(), distance.as_slice(), convention, &params)
        });

        log::debug!(
            "Accumulated vote {} over {} voxels (rho={}, sigma={})",
            session.votes,
            session.target.len(),
            params.rho,
            params.sigma
        );
        Ok(())
    }

    /// Number of votes accumulated in the current session (0 if unbound).
    pub fn votes_cast(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.votes)
    }

    /// Read-only view of the accumulators.
    pub fn accumulator(&self) -> Result<Accumulator<'_>> {
        self.session
            .as_ref()
            .map(Session::accumulator)
            .ok_or(FusionError::NoTargetBound)
    }

    /// Convert the accumulators into the posterior weight map.
    ///
    /// Also records the observed likelihood range. Once normalized the
    /// accumulators are frozen; calling again returns the recorded range.
    ///
    /// # Errors
    /// - `NoTargetBound` if no target is bound
    /// - `NoVotesRecorded` if no vote has been accumulated
    pub fn normalize(&mut self) -> Result<LikelihoodRange> {
        let session = self.session.as_mut().ok_or(FusionError::NoTargetBound)?;
        if let Some(done) = &session.normalized {
            return Ok(done.range);
        }
        if session.votes == 0 {
            return Err(FusionError::NoVotesRecorded);
        }

        let mut weight_map = Volume::filled(session.target.geometry().clone(), 0.0);
        let weights = weight_map.as_mut_slice();
        let (like_outside, like_inside) = (&session.like_outside, &session.like_inside);
        let ((), range) = install(self.pool.as_ref(), || {
            rayon::join(
                || write_weights(like_outside, like_inside, weights),
                || likelihood_range(like_outside, like_inside),
            )
        });

        log::info!(
            "Normalized {} votes: outside in [{:.4e}, {:.4e}], inside in [{:.4e}, {:.4e}]",
            session.votes,
            range.outside_min,
            range.outside_max,
            range.inside_min,
            range.inside_max
        );

        session.normalized = Some(Normalized { weight_map, range });
        Ok(range)
    }

    /// Whether the current session has been normalized.
    pub fn is_normalized(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_normalized)
    }

    /// Likelihood range recorded by [`normalize`](Self::normalize).
    pub fn likelihood_range(&self) -> Option<LikelihoodRange> {
        self.session
            .as_ref()
            .and_then(|s| s.normalized.as_ref())
            .map(|n| n.range)
    }

    /// The posterior weight map, each voxel in `[0, 1]`.
    ///
    /// # Errors
    /// - `NoTargetBound` if no target is bound
    /// - `NotNormalized` if [`normalize`](Self::normalize) has not run
    pub fn weight_map(&self) -> Result<&Volume> {
        let session = self.session.as_ref().ok_or(FusionError::NoTargetBound)?;
        session
            .normalized
            .as_ref()
            .map(|n| &n.weight_map)
            .ok_or(FusionError::NotNormalized)
    }

    /// Hand out the weight map and end the session.
    ///
    /// On error the session is kept.
    pub fn finish(&mut self) -> Result<Volume> {
        match self.session.take() {
            None => Err(FusionError::NoTargetBound),
            Some(Session {
                normalized: Some(done),
                ..
            }) => Ok(done.weight_map),
            Some(session) => {
                self.session = Some(session);
                Err(FusionError::NotNormalized)
            }
        }
    }
}

impl Default for VotingEngine {
    fn default() -> Self {
        Self {
            config: FusionConfig::default(),
            pool: None,
            session: None,
        }
    }
}

fn validate_config(config: &FusionConfig) -> Result<()> {
    match config.violation() {
        Some(message) => Err(FusionError::InvalidConfig(message)),
        None => Ok(()),
    }
}

fn check_geometry(target: &GridGeometry, other: &GridGeometry, role: VolumeRole) -> Result<()> {
    match target.mismatch(other) {
        None => Ok(()),
        Some(field) => Err(FusionError::GeometryMismatch { role, field }),
    }
}

fn build_pool(num_threads: usize) -> Result<Option<ThreadPool>> {
    if num_threads == 0 {
        return Ok(None);
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map(Some)
        .map_err(|e| FusionError::ThreadPool(e.to_string()))
}

/// Run `op` on the dedicated pool if there is one, else on rayon's global pool.
fn install<R, F>(pool: Option<&ThreadPool>, op: F) -> R
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    match pool {
        Some(pool) => pool.install(op),
        None => op(),
    }
}
