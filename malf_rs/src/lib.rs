//! # malf_rs
//!
//! Parallel multi-atlas label fusion.
//!
//! Given a target image and atlases registered to it, each with a signed
//! distance map of the structure of interest, this crate computes a per-voxel
//! posterior probability that the target voxel lies inside the structure.
//!
//! - **Data parallel**: per-voxel loops fan out over rayon with no
//!   inter-voxel synchronization
//! - **Order independent**: votes are summed, so atlases may arrive in any order
//! - **Numerically safe**: saturated distance priors and a similarity floor
//!   instead of overflow, underflow or `0/0`
//! - **Fail fast**: mismatched lattices are rejected before any voxel is touched
//!
//! ## Quick Start
//!
//! ```
//! use malf_core::GridGeometry;
//! use malf_io::{FusionConfig, SignedDistanceMap, Volume};
//! use malf_rs::VotingEngine;
//!
//! let geometry = GridGeometry::with_dims([16, 16, 16]).unwrap();
//! let target = Volume::from_fn(geometry.clone(), |c| c.x as f32 * 10.0);
//!
//! // One atlas: same intensities, structure is the half-space x < 8
//! let atlas = target.clone();
//! let distance = Volume::from_fn(geometry, |c| c.x as f32 - 7.5);
//! let distance = SignedDistanceMap::from_volume(distance).unwrap();
//!
//! let mut engine = VotingEngine::new(FusionConfig::default().with_rho(2.0)).unwrap();
//! engine.bind_target(target);
//! engine.vote(&atlas, &distance).unwrap();
//! let range = engine.normalize().unwrap();
//!
//! let weights = engine.weight_map().unwrap();
//! assert!(weights.as_slice()[0] > 0.99);   // x = 0, deep inside
//! assert!(weights.as_slice()[15] < 0.01);  // x = 15, far outside
//! assert!(range.inside_max <= 1.0);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! malf_core (geometry, per-voxel math)
//!     │
//!     ▼
//! malf_io (volumes, distance maps, config)
//!     │
//!     ▼
//! malf_rs (session, parallel vote, normalize)
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: forwards to `malf_io/serde` so [`FusionConfig`](malf_io::FusionConfig)
//!   can be loaded from configuration files
//!
//! ## Logging
//!
//! Uses the `log` facade: `info` on bind and normalize, `debug` per vote,
//! `warn` for atlases skipped by [`VotingEngine::vote_all`].

#![warn(missing_docs)]
#![warn(clippy::all)]

mod batch;
mod engine;
mod error;
mod normalize;
mod session;

pub use batch::{fuse, FusionOutput, VoteSummary};
pub use engine::VotingEngine;
pub use error::{FusionError, Result};
pub use normalize::LikelihoodRange;
pub use session::Accumulator;

// Re-export the types callers need to build inputs
pub use malf_core::{GeometryField, GridGeometry, SignConvention, VolumeRole, VoxelCoord};
pub use malf_io::{FusionConfig, SignedDistanceMap, Volume};

/// Prelude module for convenient imports.
///
/// ```
/// use malf_rs::prelude::*;
/// ```
pub mod prelude {
    pub use crate::batch::{fuse, FusionOutput, VoteSummary};
    pub use crate::engine::VotingEngine;
    pub use crate::error::{FusionError, Result};
    pub use crate::normalize::LikelihoodRange;

    pub use malf_core::{GridGeometry, SignConvention, VoxelCoord};
    pub use malf_io::{FusionConfig, SignedDistanceMap, Volume};
}
