//! Signed distance maps consumed by the voting engine.
//!
//! The distance transform itself is computed elsewhere; this module only
//! fixes the contract a map must satisfy:
//!
//! - every voxel holds a finite distance in physical units (mm),
//! - the sign convention is declared explicitly and never inferred.
//!
//! Internally the engine reads distances as "positive outside"; maps in the
//! opposite convention are flipped on read.

use malf_core::{GridGeometry, SignConvention};

use crate::error::{IoError, Result};
use crate::volume::Volume;

/// A validated signed distance volume with a declared sign convention.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedDistanceMap {
    volume: Volume,
    convention: SignConvention,
}

impl SignedDistanceMap {
    /// Wrap a distance volume produced in the given convention.
    ///
    /// # Errors
    /// Returns `NonFiniteDistance` for the first NaN or infinite voxel.
    pub fn new(volume: Volume, convention: SignConvention) -> Result<Self> {
        if let Some((index, &value)) = volume
            .as_slice()
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite())
        {
            return Err(IoError::NonFiniteDistance { index, value });
        }
        Ok(Self { volume, convention })
    }

    /// Wrap a distance volume that is negative inside the structure.
    pub fn from_volume(volume: Volume) -> Result<Self> {
        Self::new(volume, SignConvention::InsideNegative)
    }

    /// The lattice the map is sampled on.
    #[inline]
    pub fn geometry(&self) -> &GridGeometry {
        self.volume.geometry()
    }

    /// Declared sign convention.
    #[inline]
    pub fn convention(&self) -> SignConvention {
        self.convention
    }

    /// Raw distances as stored, in the declared convention.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        self.volume.as_slice()
    }

    /// Distance at a linear index, positive outside the structure.
    #[inline]
    pub fn outside_distance(&self, index: usize) -> Option<f64> {
        self.volume
            .as_slice()
            .get(index)
            .map(|&d| self.convention.to_outside_positive(d as f64))
    }

    /// Number of voxels lying inside the structure (strictly negative
    /// outside-positive distance).
    pub fn inside_voxel_count(&self) -> usize {
        self.volume
            .as_slice()
            .iter()
            .filter(|&&d| self.convention.to_outside_positive(d as f64) < 0.0)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> GridGeometry {
        GridGeometry::with_dims([2, 2, 1]).unwrap()
    }

    #[test]
    fn test_accepts_finite_values() {
        let volume = Volume::new(geometry(), vec![-1.0, 0.0, 2.5, 1e6]).unwrap();
        let map = SignedDistanceMap::from_volume(volume).unwrap();
        assert_eq!(map.convention(), SignConvention::InsideNegative);
        assert_eq!(map.as_slice().len(), 4);
    }

    #[test]
    fn test_rejects_nan() {
        let volume = Volume::new(geometry(), vec![-1.0, f32::NAN, 2.5, 0.0]).unwrap();
        let result = SignedDistanceMap::from_volume(volume);
        assert!(matches!(
            result,
            Err(IoError::NonFiniteDistance { index: 1, .. })
        ));
    }

    #[test]
    fn test_rejects_infinity() {
        let volume = Volume::new(geometry(), vec![0.0, 0.0, 0.0, f32::NEG_INFINITY]).unwrap();
        let result = SignedDistanceMap::new(volume, SignConvention::InsidePositive);
        assert_eq!(
            result,
            Err(IoError::NonFiniteDistance {
                index: 3,
                value: f32::NEG_INFINITY
            })
        );
    }

    #[test]
    fn test_outside_distance_respects_convention() {
        let volume = Volume::new(geometry(), vec![-3.0, 0.0, 4.0, 1.0]).unwrap();

        let negative_inside = SignedDistanceMap::from_volume(volume.clone()).unwrap();
        assert_eq!(negative_inside.outside_distance(0), Some(-3.0));
        assert_eq!(negative_inside.outside_distance(2), Some(4.0));
        assert_eq!(negative_inside.outside_distance(4), None);
        assert_eq!(negative_inside.inside_voxel_count(), 1);

        let positive_inside = SignedDistanceMap::new(volume, SignConvention::InsidePositive).unwrap();
        assert_eq!(positive_inside.outside_distance(0), Some(3.0));
        assert_eq!(positive_inside.outside_distance(2), Some(-4.0));
        assert_eq!(positive_inside.inside_voxel_count(), 2);
    }
}
