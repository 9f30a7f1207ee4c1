//! Error types for malf_rs.

use malf_core::{GeometryField, VolumeRole};
use malf_io::IoError;
use thiserror::Error;

/// Errors that can occur during a fusion session.
///
/// Every variant is a precondition violation detected before any voxel is
/// touched, so a failed call never leaves a partially accumulated session.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FusionError {
    /// An atlas volume is sampled on a different lattice than the target.
    #[error("{role} geometry does not match the target: {field} differ")]
    GeometryMismatch {
        /// Which input volume was rejected.
        role: VolumeRole,
        /// First geometry field that differs.
        field: GeometryField,
    },

    /// Operation requires a bound target.
    #[error("no target bound: call bind_target() first")]
    NoTargetBound,

    /// Normalization requested before any vote was accumulated.
    #[error("no votes recorded: call vote() at least once before normalize()")]
    NoVotesRecorded,

    /// Weight map requested before normalization.
    #[error("weight map not available: call normalize() first")]
    NotNormalized,

    /// Vote attempted after the session was normalized.
    #[error("session already normalized: bind a new target to vote again")]
    SessionFinalized,

    /// A fusion parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// The dedicated worker pool could not be created.
    #[error("thread pool error: {0}")]
    ThreadPool(String),

    /// Error from the volume layer, so input construction can use `?`
    /// inside functions returning this crate's [`Result`].
    #[error("volume error: {0}")]
    Io(#[from] IoError),
}

/// Result type for malf_rs operations.
pub type Result<T> = std::result::Result<T, FusionError>;
