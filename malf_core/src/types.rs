//! Core types for malf_core voxel operations.
//!
//! Provides voxel coordinate types, the signed-distance sign convention, and
//! the numeric constants shared across the workspace.

/// Absolute/relative tolerance used when comparing geometry fields.
///
/// Two real values `a` and `b` match when `|a - b| <= GEOMETRY_TOLERANCE * max(1, |a|, |b|)`.
pub const GEOMETRY_TOLERANCE: f64 = 1e-4;

/// Smallest determinant magnitude accepted for a direction cosine matrix.
pub const MIN_DIRECTION_DETERMINANT: f64 = 1e-8;

/// Integer voxel coordinate inside a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoxelCoord {
    /// X index (fastest varying).
    pub x: usize,
    /// Y index.
    pub y: usize,
    /// Z index (slowest varying).
    pub z: usize,
}

impl VoxelCoord {
    /// Create a new voxel coordinate.
    #[inline]
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// Convert to an array.
    #[inline]
    pub const fn as_array(&self) -> [usize; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[usize; 3]> for VoxelCoord {
    #[inline]
    fn from(arr: [usize; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }
}

impl From<(usize, usize, usize)> for VoxelCoord {
    #[inline]
    fn from((x, y, z): (usize, usize, usize)) -> Self {
        Self::new(x, y, z)
    }
}

/// Which side of the boundary carries negative signed distances.
///
/// The voting math works in the "inside negative" convention: a positive
/// distance means the voxel lies outside the structure. Maps produced with
/// the opposite convention are flipped on read, never guessed from data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SignConvention {
    /// Negative inside the structure, positive outside.
    #[default]
    InsideNegative,
    /// Positive inside the structure, negative outside.
    InsidePositive,
}

impl SignConvention {
    /// Express a raw distance in the inside-negative convention.
    #[inline]
    pub fn to_outside_positive(self, distance: f64) -> f64 {
        match self {
            SignConvention::InsideNegative => distance,
            SignConvention::InsidePositive => -distance,
        }
    }
}

/// Which input volume of a vote a check refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeRole {
    /// The bound target intensity volume.
    Target,
    /// An atlas intensity volume.
    AtlasIntensity,
    /// An atlas signed-distance volume.
    AtlasDistance,
}

impl core::fmt::Display for VolumeRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            VolumeRole::Target => write!(f, "target"),
            VolumeRole::AtlasIntensity => write!(f, "atlas intensity"),
            VolumeRole::AtlasDistance => write!(f, "atlas distance"),
        }
    }
}
