//! Error types for malf_core operations.
//!
//! Provides a simple error enum with no external dependencies.

use core::fmt;

/// Error types that can occur during malf_core operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoreError {
    /// A grid dimension was zero.
    InvalidDimension {
        /// The axis (0 = x, 1 = y, 2 = z) with zero extent.
        axis: usize,
    },
    /// A spacing component was zero or not finite.
    InvalidSpacing {
        /// The offending axis.
        axis: usize,
        /// The rejected spacing value.
        value: f64,
    },
    /// The direction cosine matrix is not invertible.
    SingularDirection {
        /// Determinant of the rejected matrix.
        determinant: f64,
    },
    /// The product of the grid dimensions does not fit in `usize`.
    VoxelCountOverflow {
        /// The rejected dimensions.
        dim: [usize; 3],
    },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::InvalidDimension { axis } => {
                write!(f, "grid dimension on axis {} must be positive", axis)
            }
            CoreError::InvalidSpacing { axis, value } => {
                write!(f, "spacing {} on axis {} must be finite and nonzero", value, axis)
            }
            CoreError::SingularDirection { determinant } => {
                write!(
                    f,
                    "direction cosine matrix is singular (determinant {:e})",
                    determinant
                )
            }
            CoreError::VoxelCountOverflow { dim } => {
                write!(f, "voxel count of grid {:?} overflows usize", dim)
            }
        }
    }
}

impl std::error::Error for CoreError {}

/// Result type alias for malf_core operations.
pub type Result<T> = core::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::InvalidDimension { axis: 2 };
        assert_eq!(format!("{}", err), "grid dimension on axis 2 must be positive");

        let err = CoreError::InvalidSpacing { axis: 0, value: 0.0 };
        assert_eq!(format!("{}", err), "spacing 0 on axis 0 must be finite and nonzero");

        let err = CoreError::SingularDirection { determinant: 0.0 };
        assert!(format!("{}", err).starts_with("direction cosine matrix is singular"));

        let err = CoreError::VoxelCountOverflow { dim: [2, 3, 4] };
        assert_eq!(format!("{}", err), "voxel count of grid [2, 3, 4] overflows usize");
    }

    #[test]
    fn test_error_equality() {
        let err1 = CoreError::InvalidDimension { axis: 1 };
        let err2 = CoreError::InvalidDimension { axis: 1 };
        let err3 = CoreError::InvalidDimension { axis: 2 };

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }
}
