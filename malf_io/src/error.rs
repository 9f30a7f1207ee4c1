//! Error types for malf_io operations.
//!
//! Provides specific error variants for volume construction, distance map
//! validation and configuration failures.

use core::fmt;

use malf_core::CoreError;

/// Errors that can occur during malf_io operations.
#[derive(Debug, Clone, PartialEq)]
pub enum IoError {
    /// Invalid grid geometry.
    Core(CoreError),

    /// Voxel buffer length does not match the geometry.
    InvalidVoxelCount {
        /// Number of voxels the geometry describes.
        expected: usize,
        /// Number of values provided.
        got: usize,
    },

    /// A signed distance value is NaN or infinite.
    NonFiniteDistance {
        /// Linear index of the first offending voxel.
        index: usize,
        /// The rejected value.
        value: f32,
    },

    /// A fusion parameter is out of range.
    InvalidConfig {
        /// Description of the violated constraint.
        message: &'static str,
    },
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoError::Core(err) => write!(f, "invalid geometry: {}", err),
            IoError::InvalidVoxelCount { expected, got } => {
                write!(
                    f,
                    "invalid voxel count: expected {} values, got {}",
                    expected, got
                )
            }
            IoError::NonFiniteDistance { index, value } => {
                write!(f, "non-finite signed distance {} at voxel {}", value, index)
            }
            IoError::InvalidConfig { message } => {
                write!(f, "invalid configuration: {}", message)
            }
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IoError::Core(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CoreError> for IoError {
    fn from(err: CoreError) -> Self {
        IoError::Core(err)
    }
}

/// Result type alias for malf_io operations.
pub type Result<T> = core::result::Result<T, IoError>;
