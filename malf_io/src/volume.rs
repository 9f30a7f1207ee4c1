//! Dense scalar volumes on a [`GridGeometry`].
//!
//! Memory layout: `data[x + dim_x * (y + dim_y * z)]`, x fastest.

use malf_core::{GridGeometry, Vector3, VoxelCoord};

use crate::error::{IoError, Result};

/// A dense `f32` volume together with its lattice.
///
/// The buffer length always equals `geometry.voxel_count()`; every
/// constructor enforces it.
///
/// # Example
///
/// ```
/// use malf_core::GridGeometry;
/// use malf_io::Volume;
///
/// let geometry = GridGeometry::with_dims([4, 4, 4]).unwrap();
/// let ramp = Volume::from_fn(geometry, |c| c.x as f32);
/// assert_eq!(ramp.len(), 64);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    geometry: GridGeometry,
    data: Vec<f32>,
}

impl Volume {
    /// Wrap an existing voxel buffer.
    ///
    /// # Errors
    /// Returns `InvalidVoxelCount` if `data` does not hold exactly one value
    /// per voxel.
    pub fn new(geometry: GridGeometry, data: Vec<f32>) -> Result<Self> {
        let expected = geometry.voxel_count();
        if data.len() != expected {
            return Err(IoError::InvalidVoxelCount {
                expected,
                got: data.len(),
            });
        }
        Ok(Self { geometry, data })
    }

    /// A volume with every voxel set to `value`.
    pub fn filled(geometry: GridGeometry, value: f32) -> Self {
        let data = vec![value; geometry.voxel_count()];
        Self { geometry, data }
    }

    /// A volume with values computed from each voxel coordinate.
    pub fn from_fn<F>(geometry: GridGeometry, value_fn: F) -> Self
    where
        F: Fn(VoxelCoord) -> f32,
    {
        let [nx, ny, nz] = geometry.dim();
        let mut data = Vec::with_capacity(geometry.voxel_count());

        for z in 0..nz {
            for y in 0..ny {
                for x in 0..nx {
                    data.push(value_fn(VoxelCoord::new(x, y, z)));
                }
            }
        }

        Self { geometry, data }
    }

    /// A volume with values computed from each voxel's physical position.
    ///
    /// Handy for sampling analytic signed distance functions.
    pub fn from_physical_fn<F>(geometry: GridGeometry, value_fn: F) -> Self
    where
        F: Fn(Vector3<f64>) -> f32,
    {
        let positions = geometry.clone();
        Self::from_fn(geometry, |coord| value_fn(positions.index_to_physical(coord)))
    }

    /// The lattice this volume is sampled on.
    #[inline]
    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Number of voxels.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false for a validly constructed volume; provided for API symmetry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Voxel values in linear order.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Value at a voxel coordinate, or `None` outside the lattice.
    #[inline]
    pub fn get(&self, coord: VoxelCoord) -> Option<f32> {
        self.geometry.linear_index(coord).map(|i| self.data[i])
    }

    /// Mutable voxel values in linear order.
    ///
    /// The slice cannot change length, so the buffer keeps matching the
    /// geometry.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use malf_core::Matrix3;

    fn geometry() -> GridGeometry {
        GridGeometry::with_dims([3, 2, 2]).unwrap()
    }

    #[test]
    fn test_new_checks_length() {
        assert!(Volume::new(geometry(), vec![0.0; 12]).is_ok());

        let result = Volume::new(geometry(), vec![0.0; 11]);
        assert_eq!(
            result,
            Err(IoError::InvalidVoxelCount {
                expected: 12,
                got: 11
            })
        );
    }

    #[test]
    fn test_filled() {
        let volume = Volume::filled(geometry(), 2.5);
        assert_eq!(volume.len(), 12);
        assert!(!volume.is_empty());
        assert!(volume.as_slice().iter().all(|&v| v == 2.5));
    }

    #[test]
    fn test_from_fn_layout_is_x_fastest() {
        let volume = Volume::from_fn(geometry(), |c| (c.x + 10 * c.y + 100 * c.z) as f32);
        assert_eq!(volume.as_slice()[0], 0.0);
        assert_eq!(volume.as_slice()[1], 1.0);
        assert_eq!(volume.as_slice()[3], 10.0);
        assert_eq!(volume.as_slice()[6], 100.0);
        assert_eq!(volume.get(VoxelCoord::new(2, 1, 1)), Some(112.0));
        assert_eq!(volume.get(VoxelCoord::new(3, 0, 0)), None);
    }

    #[test]
    fn test_from_physical_fn_uses_geometry() {
        let geometry = GridGeometry::new(
            [4, 1, 1],
            Vector3::new(10.0, 0.0, 0.0),
            Vector3::new(2.0, 1.0, 1.0),
            Matrix3::identity(),
        )
        .unwrap();
        let volume = Volume::from_physical_fn(geometry, |p| p.x as f32);
        assert_eq!(volume.as_slice(), &[10.0, 12.0, 14.0, 16.0]);
    }

    #[test]
    fn test_as_mut_slice_writes_in_place() {
        let mut volume = Volume::filled(geometry(), 0.0);
        volume.as_mut_slice()[5] = 4.0;
        assert_eq!(volume.len(), 12);
        assert_eq!(volume.get(VoxelCoord::new(2, 1, 0)), Some(4.0));
    }
}
