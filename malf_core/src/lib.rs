//! # malf_core
//!
//! Pure mathematical building blocks for multi-atlas label fusion.
//!
//! This crate provides the foundations for the MALF workspace: the voxel
//! lattice description every volume shares, and the per-voxel likelihood
//! math the voting engine applies to every atlas.
//!
//! ## Features
//!
//! - **Grid geometry**: dimensions, origin, spacing and direction cosines with
//!   validated construction and tolerance-based compatibility checks
//! - **Pure algorithms**: no storage, no threading, just math
//! - **Overflow-safe priors**: the distance prior saturates instead of
//!   overflowing `exp`
//!
//! ## Feature Flags
//!
//! - `serde`: `Serialize`/`Deserialize` for the small value types
//!
//! ## Modules
//!
//! - [`types`]: Voxel coordinates, sign convention, volume roles, tolerances
//! - [`geometry`]: [`GridGeometry`] and [`GeometryField`]
//! - [`likelihood`]: Similarity, saturated distance prior, posterior
//! - [`error`]: Error types
//!
//! ## Usage
//!
//! ```
//! use malf_core::prelude::*;
//!
//! let a = GridGeometry::with_dims([4, 4, 4]).unwrap();
//! let b = GridGeometry::with_dims([4, 4, 4]).unwrap();
//! assert!(a.is_compatible(&b));
//!
//! let params = VoteParams { rho: 1.0, sigma: 50.0, minimum_similarity: 1e-4 };
//! let vote = voxel_vote(100.0, 100.0, -1000.0, &params);
//! assert_eq!(vote.inside, 1.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod geometry;
pub mod likelihood;
pub mod types;

/// Prelude module for convenient imports.
///
/// Provides the most commonly used types and functions.
pub mod prelude {
    pub use crate::error::CoreError;
    pub use crate::geometry::{GeometryField, GridGeometry};
    pub use crate::likelihood::{
        distance_likelihood, intensity_similarity, posterior, saturated_likelihoods,
        voxel_vote, DistanceLikelihood, VoteParams, VoxelVote, SATURATION_LIMIT,
    };
    pub use crate::types::{
        SignConvention, VolumeRole, VoxelCoord, GEOMETRY_TOLERANCE, MIN_DIRECTION_DETERMINANT,
    };
}

// Re-export everything at crate root for convenience
pub use error::{CoreError, Result};
pub use geometry::{GeometryField, GridGeometry};
pub use likelihood::{
    distance_likelihood, intensity_similarity, posterior, saturated_likelihoods, voxel_vote,
    DistanceLikelihood, VoteParams, VoxelVote, SATURATION_LIMIT,
};
pub use types::{
    SignConvention, VolumeRole, VoxelCoord, GEOMETRY_TOLERANCE, MIN_DIRECTION_DETERMINANT,
};

// Re-export nalgebra types used in the public API
pub use nalgebra::{Matrix3, Vector3};
