//! Output representations of a computed surface map.

use std::fmt::Debug;

use nalgebra::Point3;

use super::values::MapValues;
use crate::mesh::{FaceId, MeshIndex, SurfaceMesh, VertexId};

/// An immutable map from the points of a surface mesh to m-dimensional values.
pub trait SurfaceMap<I: MeshIndex = u32>: Debug + Send + Sync {
    /// Number of value components.
    fn components(&self) -> usize;

    /// Number of domain points.
    fn num_points(&self) -> usize;

    /// Value at a domain point.
    fn evaluate(&self, v: VertexId<I>) -> Vec<f64>;

    /// Value inside a face given barycentric coordinates.
    fn interpolate(&self, f: FaceId<I>, barycentric: [f64; 3]) -> Vec<f64>;

    /// Deep copy behind a fresh box.
    fn clone_box(&self) -> Box<dyn SurfaceMap<I>>;
}

impl<I: MeshIndex> Clone for Box<dyn SurfaceMap<I>> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Map values interpolated linearly across each triangle of the domain.
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseLinearMap<I: MeshIndex = u32> {
    domain: SurfaceMesh<I>,
    values: MapValues<I>,
}

impl<I: MeshIndex> PiecewiseLinearMap<I> {
    /// Create a map from a domain mesh and one value per domain point.
    ///
    /// # Panics
    /// Panics if the number of values differs from the number of points.
    pub fn new(domain: SurfaceMesh<I>, values: MapValues<I>) -> Self {
        assert_eq!(
            domain.num_points(),
            values.len(),
            "one map value per domain point required"
        );
        Self { domain, values }
    }

    /// The domain mesh.
    pub fn domain(&self) -> &SurfaceMesh<I> {
        &self.domain
    }

    /// The values at the domain points.
    pub fn values(&self) -> &MapValues<I> {
        &self.values
    }

    /// Consume the map, returning its domain and values.
    pub fn into_parts(self) -> (SurfaceMesh<I>, MapValues<I>) {
        (self.domain, self.values)
    }

    /// Value at a location on a face.
    ///
    /// The location is projected onto the plane of the face before computing its
    /// barycentric coordinates. Locations outside the triangle are extrapolated
    /// linearly. Returns `None` for degenerate faces.
    pub fn evaluate_at(&self, f: FaceId<I>, p: &Point3<f64>) -> Option<Vec<f64>> {
        barycentric_coordinates(&self.domain.face_positions(f), p)
            .map(|bary| self.interpolate(f, bary))
    }
}

impl<I: MeshIndex> SurfaceMap<I> for PiecewiseLinearMap<I> {
    fn components(&self) -> usize {
        self.values.components()
    }

    fn num_points(&self) -> usize {
        self.domain.num_points()
    }

    fn evaluate(&self, v: VertexId<I>) -> Vec<f64> {
        self.values.get(v).to_vec()
    }

    fn interpolate(&self, f: FaceId<I>, barycentric: [f64; 3]) -> Vec<f64> {
        let mut result = vec![0.0; self.values.components()];
        for (v, w) in self.domain.face(f).into_iter().zip(barycentric) {
            for (acc, x) in result.iter_mut().zip(self.values.get(v)) {
                *acc += w * x;
            }
        }
        result
    }

    fn clone_box(&self) -> Box<dyn SurfaceMap<I>> {
        Box::new(self.clone())
    }
}

/// Barycentric coordinates of the projection of `p` onto a triangle's plane.
fn barycentric_coordinates(tri: &[Point3<f64>; 3], p: &Point3<f64>) -> Option<[f64; 3]> {
    let e1 = tri[1] - tri[0];
    let e2 = tri[2] - tri[0];
    let d = p - tri[0];

    let d11 = e1.dot(&e1);
    let d12 = e1.dot(&e2);
    let d22 = e2.dot(&e2);
    let denom = d11 * d22 - d12 * d12;
    if denom.abs() < 1e-20 {
        return None;
    }

    let d1 = d.dot(&e1);
    let d2 = d.dot(&e2);
    let b1 = (d22 * d1 - d12 * d2) / denom;
    let b2 = (d11 * d2 - d12 * d1) / denom;
    Some([1.0 - b1 - b2, b1, b2])
}
