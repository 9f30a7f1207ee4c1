//! Regular 3D sampling lattices and their compatibility checks.
//!
//! A [`GridGeometry`] maps integer voxel indices to physical space:
//!
//! ```text
//! physical = origin + direction * (spacing ∘ index)
//! ```
//!
//! Every volume taking part in a voting session must share one geometry, so
//! the engine compares geometries with [`GridGeometry::mismatch`] before it
//! touches any voxel.

use nalgebra::{Matrix3, Vector3};

use crate::error::{CoreError, Result};
use crate::types::{VoxelCoord, GEOMETRY_TOLERANCE, MIN_DIRECTION_DETERMINANT};

/// The geometry field on which two lattices first disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryField {
    /// Voxel counts per axis differ.
    Dimensions,
    /// Physical position of voxel (0, 0, 0) differs.
    Origin,
    /// Voxel size differs.
    Spacing,
    /// Axis orientation differs.
    Direction,
}

impl core::fmt::Display for GeometryField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            GeometryField::Dimensions => write!(f, "dimensions"),
            GeometryField::Origin => write!(f, "origin"),
            GeometryField::Spacing => write!(f, "spacing"),
            GeometryField::Direction => write!(f, "direction cosines"),
        }
    }
}

/// Dimensions, origin, spacing and direction cosines of a voxel lattice.
///
/// Constructed through [`GridGeometry::new`], which enforces:
/// - every dimension is positive and their product fits in `usize`,
/// - every spacing component is finite and nonzero,
/// - the direction matrix has `|det| > 1e-8`.
#[derive(Debug, Clone, PartialEq)]
pub struct GridGeometry {
    dim: [usize; 3],
    voxel_count: usize,
    origin: Vector3<f64>,
    spacing: Vector3<f64>,
    direction: Matrix3<f64>,
    /// Cached inverse of `direction`, valid by construction.
    inverse_direction: Matrix3<f64>,
}

impl GridGeometry {
    /// Create a validated geometry.
    ///
    /// # Errors
    /// - `InvalidDimension` if any axis has zero voxels
    /// - `VoxelCountOverflow` if the total voxel count does not fit in `usize`
    /// - `InvalidSpacing` if any spacing is zero, NaN or infinite
    /// - `SingularDirection` if the direction matrix cannot be inverted
    pub fn new(
        dim: [usize; 3],
        origin: Vector3<f64>,
        spacing: Vector3<f64>,
        direction: Matrix3<f64>,
    ) -> Result<Self> {
        if let Some(axis) = dim.iter().position(|&d| d == 0) {
            return Err(CoreError::InvalidDimension { axis });
        }
        let voxel_count = dim[0]
            .checked_mul(dim[1])
            .and_then(|plane| plane.checked_mul(dim[2]))
            .ok_or(CoreError::VoxelCountOverflow { dim })?;
        for axis in 0..3 {
            let value = spacing[axis];
            if value == 0.0 || !value.is_finite() {
                return Err(CoreError::InvalidSpacing { axis, value });
            }
        }

        let determinant = direction.determinant();
        if !determinant.is_finite() || determinant.abs() <= MIN_DIRECTION_DETERMINANT {
            return Err(CoreError::SingularDirection { determinant });
        }
        let inverse_direction = direction
            .try_inverse()
            .ok_or(CoreError::SingularDirection { determinant })?;

        Ok(Self {
            dim,
            voxel_count,
            origin,
            spacing,
            direction,
            inverse_direction,
        })
    }

    /// Axis-aligned geometry with unit spacing and the origin at zero.
    pub fn with_dims(dim: [usize; 3]) -> Result<Self> {
        Self::new(
            dim,
            Vector3::zeros(),
            Vector3::new(1.0, 1.0, 1.0),
            Matrix3::identity(),
        )
    }

    /// Voxel counts along x, y, z.
    #[inline]
    pub fn dim(&self) -> [usize; 3] {
        self.dim
    }

    /// Physical position of voxel (0, 0, 0).
    #[inline]
    pub fn origin(&self) -> &Vector3<f64> {
        &self.origin
    }

    /// Physical voxel size along each index axis.
    #[inline]
    pub fn spacing(&self) -> &Vector3<f64> {
        &self.spacing
    }

    /// Direction cosines; column `i` is the physical direction of index axis `i`.
    #[inline]
    pub fn direction(&self) -> &Matrix3<f64> {
        &self.direction
    }

    /// Total number of voxels.
    #[inline]
    pub fn voxel_count(&self) -> usize {
        self.voxel_count
    }

    /// Whether the coordinate lies inside the lattice.
    #[inline]
    pub fn contains(&self, coord: VoxelCoord) -> bool {
        coord.x < self.dim[0] && coord.y < self.dim[1] && coord.z < self.dim[2]
    }

    /// Flat index of a voxel, x fastest.
    ///
    /// Returns `None` if the coordinate is outside the lattice.
    #[inline]
    pub fn linear_index(&self, coord: VoxelCoord) -> Option<usize> {
        if !self.contains(coord) {
            return None;
        }
        Some(coord.x + self.dim[0] * (coord.y + self.dim[1] * coord.z))
    }

    /// Inverse of [`linear_index`](Self::linear_index).
    #[inline]
    pub fn voxel_coords(&self, index: usize) -> Option<VoxelCoord> {
        if index >= self.voxel_count() {
            return None;
        }
        let plane = self.dim[0] * self.dim[1];
        let z = index / plane;
        let rem = index % plane;
        Some(VoxelCoord::new(rem % self.dim[0], rem / self.dim[0], z))
    }

    /// Physical position of a voxel center.
    pub fn index_to_physical(&self, coord: VoxelCoord) -> Vector3<f64> {
        let scaled = Vector3::new(
            coord.x as f64 * self.spacing.x,
            coord.y as f64 * self.spacing.y,
            coord.z as f64 * self.spacing.z,
        );
        self.origin + self.direction * scaled
    }

    /// Continuous index of a physical point: `(D^-1 (p - origin)) / spacing`.
    pub fn physical_to_continuous_index(&self, point: &Vector3<f64>) -> Vector3<f64> {
        let local = self.inverse_direction * (point - self.origin);
        local.component_div(&self.spacing)
    }

    /// First field on which `other` is incompatible with `self`, if any.
    ///
    /// Dimensions must be exactly equal. Origin, spacing and direction
    /// cosines match within [`GEOMETRY_TOLERANCE`], relative for magnitudes
    /// above one and absolute below.
    pub fn mismatch(&self, other: &GridGeometry) -> Option<GeometryField> {
        if self.dim != other.dim {
            return Some(GeometryField::Dimensions);
        }
        if !all_close(self.origin.iter(), other.origin.iter()) {
            return Some(GeometryField::Origin);
        }
        if !all_close(self.spacing.iter(), other.spacing.iter()) {
            return Some(GeometryField::Spacing);
        }
        if !all_close(self.direction.iter(), other.direction.iter()) {
            return Some(GeometryField::Direction);
        }
        None
    }

    /// Whether two lattices describe the same voxels.
    #[inline]
    pub fn is_compatible(&self, other: &GridGeometry) -> bool {
        self.mismatch(other).is_none()
    }
}

#[inline]
fn close(a: f64, b: f64) -> bool {
    let scale = 1.0f64.max(a.abs()).max(b.abs());
    (a - b).abs() <= GEOMETRY_TOLERANCE * scale
}

fn all_close<'a>(
    a: impl Iterator<Item = &'a f64>,
    b: impl Iterator<Item = &'a f64>,
) -> bool {
    a.zip(b).all(|(&x, &y)| close(x, y))
}
