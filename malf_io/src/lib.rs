//! malf_io - volume storage, distance-map contract and configuration for
//! multi-atlas label fusion.
//!
//! This crate provides the data layer for the MALF workspace. File formats
//! are deliberately absent: volumes arrive from an external loading and
//! registration pipeline as plain `f32` buffers plus a [`GridGeometry`].
//!
//! # Core Types
//!
//! - [`Volume`]: A dense `f32` volume on a validated lattice
//! - [`SignedDistanceMap`]: A finite distance volume with a declared sign convention
//! - [`FusionConfig`]: Voting parameters (`rho`, `sigma`, `minimum_similarity`)
//!
//! # Example
//!
//! ```
//! use malf_core::GridGeometry;
//! use malf_io::{FusionConfig, SignedDistanceMap, Volume};
//!
//! let geometry = GridGeometry::with_dims([8, 8, 8]).unwrap();
//! let intensity = Volume::filled(geometry.clone(), 100.0);
//!
//! // Distance to a sphere of radius 3 centered in the volume
//! let distance = Volume::from_physical_fn(geometry, |p| {
//!     let c = 3.5;
//!     (((p.x - c).powi(2) + (p.y - c).powi(2) + (p.z - c).powi(2)).sqrt() - 3.0) as f32
//! });
//! let distance = SignedDistanceMap::from_volume(distance).unwrap();
//! assert!(distance.inside_voxel_count() > 0);
//!
//! let config = FusionConfig::new().with_sigma(25.0);
//! assert!(config.validate().is_ok());
//! # let _ = intensity;
//! ```
//!
//! # Crate Features
//!
//! - `serde`: `Serialize`/`Deserialize` for [`FusionConfig`]

#![warn(missing_docs)]

pub mod config;
pub mod distance;
pub mod error;
pub mod volume;

// Re-export core types from malf_core
pub use malf_core::{GeometryField, GridGeometry, SignConvention, VoxelCoord};

// Re-export main types
pub use config::{FusionConfig, DEFAULT_MINIMUM_SIMILARITY, DEFAULT_RHO, DEFAULT_SIGMA};
pub use distance::SignedDistanceMap;
pub use error::{IoError, Result};
pub use volume::Volume;
