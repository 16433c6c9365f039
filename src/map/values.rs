//! Per-point map values.
//!
//! [`MapValues`] stores an m-component value for every mesh point, e.g. the
//! (u, v) coordinates of a planar map or the (x, y, z) coordinates of a map onto
//! the unit sphere. Values are stored contiguously, one row per point.

use std::marker::PhantomData;

use nalgebra::{Point2, Point3};

use crate::error::{MapError, Result};
use crate::mesh::{MeshIndex, VertexId};

/// Map values for mesh points.
///
/// # Example
///
/// ```
/// use surfmap::map::MapValues;
/// use surfmap::mesh::VertexId;
///
/// let mut values: MapValues = MapValues::zeros(3, 2);
/// values.set(VertexId::new(1), &[0.5, 1.0]);
/// assert_eq!(values.get(VertexId::new(1)), &[0.5, 1.0]);
/// assert_eq!(values.get(VertexId::new(0)), &[0.0, 0.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MapValues<I: MeshIndex = u32> {
    /// Row-major values, `components` entries per point.
    data: Vec<f64>,
    /// Number of components per point.
    components: usize,
    /// Phantom data for the index type.
    _marker: PhantomData<I>,
}

impl<I: MeshIndex> MapValues<I> {
    /// Create map values from row-major data.
    ///
    /// # Errors
    ///
    /// Returns an error if `components` is zero or `data.len()` is not a
    /// multiple of `components`.
    pub fn new(data: Vec<f64>, components: usize) -> Result<Self> {
        if components == 0 {
            return Err(MapError::invalid_param(
                "components",
                components,
                "must be at least 1",
            ));
        }
        if data.len() % components != 0 {
            return Err(MapError::invalid_param(
                "data",
                data.len(),
                "length must be a multiple of the number of components",
            ));
        }
        Ok(Self {
            data,
            components,
            _marker: PhantomData,
        })
    }

    /// Create map values filled with zeros.
    ///
    /// # Panics
    /// Panics if `components` is zero.
    pub fn zeros(n: usize, components: usize) -> Self {
        assert!(components > 0, "map values need at least one component");
        Self {
            data: vec![0.0; n * components],
            components,
            _marker: PhantomData,
        }
    }

    /// Create two-component values from planar points.
    pub fn from_points2(points: &[Point2<f64>]) -> Self {
        Self {
            data: points.iter().flat_map(|p| [p.x, p.y]).collect(),
            components: 2,
            _marker: PhantomData,
        }
    }

    /// Create three-component values from 3D points.
    pub fn from_points3(points: &[Point3<f64>]) -> Self {
        Self {
            data: points.iter().flat_map(|p| [p.x, p.y, p.z]).collect(),
            components: 3,
            _marker: PhantomData,
        }
    }

    /// Get the value of a point.
    #[inline]
    pub fn get(&self, v: VertexId<I>) -> &[f64] {
        let start = v.index() * self.components;
        &self.data[start..start + self.components]
    }

    /// Get a mutable reference to the value of a point.
    #[inline]
    pub fn get_mut(&mut self, v: VertexId<I>) -> &mut [f64] {
        let start = v.index() * self.components;
        &mut self.data[start..start + self.components]
    }

    /// Get a single component of a point value.
    #[inline]
    pub fn component(&self, v: VertexId<I>, l: usize) -> f64 {
        self.data[v.index() * self.components + l]
    }

    /// Set the value of a point.
    ///
    /// # Panics
    /// Panics if `value` does not have exactly [`components`](Self::components) entries.
    #[inline]
    pub fn set(&mut self, v: VertexId<I>, value: &[f64]) {
        self.get_mut(v).copy_from_slice(value);
    }

    /// Set a single component of a point value.
    #[inline]
    pub fn set_component(&mut self, v: VertexId<I>, l: usize, value: f64) {
        self.data[v.index() * self.components + l] = value;
    }

    /// Get the number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() / self.components
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the number of components per point.
    #[inline]
    pub fn components(&self) -> usize {
        self.components
    }

    /// Iterate over all values with their point IDs.
    pub fn iter(&self) -> impl Iterator<Item = (VertexId<I>, &[f64])> + '_ {
        self.data
            .chunks_exact(self.components)
            .enumerate()
            .map(|(i, value)| (VertexId::new(i), value))
    }

    /// Get the raw row-major data.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_values_basic() {
        let values: MapValues<u32> = MapValues::from_points2(&[
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.5, 1.0),
        ]);

        assert_eq!(values.len(), 3);
        assert_eq!(values.components(), 2);
        assert!(!values.is_empty());
        assert_eq!(values.get(VertexId::new(2)), &[0.5, 1.0]);
        assert_eq!(values.component(VertexId::new(1), 0), 1.0);
    }

    #[test]
    fn test_map_values_new_validates() {
        assert!(MapValues::<u32>::new(vec![1.0, 2.0, 3.0], 2).is_err());
        assert!(MapValues::<u32>::new(vec![1.0, 2.0], 0).is_err());

        let values = MapValues::<u32>::new(vec![1.0, 2.0, 3.0], 3).unwrap();
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn test_map_values_set() {
        let mut values: MapValues = MapValues::zeros(2, 3);
        let v = VertexId::new(1);
        values.set(v, &[1.0, 2.0, 3.0]);
        values.set_component(v, 2, 4.0);
        assert_eq!(values.get(v), &[1.0, 2.0, 4.0]);
        assert_eq!(values.as_slice(), &[0.0, 0.0, 0.0, 1.0, 2.0, 4.0]);
    }

    #[test]
    fn test_map_values_iter_and_points() {
        let points = vec![Point3::new(1.0, 2.0, 3.0), Point3::new(4.0, 5.0, 6.0)];
        let values: MapValues = MapValues::from_points3(&points);
        let collected: Vec<(usize, Vec<f64>)> = values
            .iter()
            .map(|(v, x)| (v.index(), x.to_vec()))
            .collect();
        assert_eq!(collected[1], (1, vec![4.0, 5.0, 6.0]));
    }
}
