//! Edge weights of the discrete Dirichlet energy.
//!
//! The energy minimized by the linear mappers is
//! `E = 1/2 Σ_(i,j) w_ij |f(i) - f(j)|²` over all mesh edges. The weight policy
//! decides the kind of map that results:
//!
//! - [`UniformWeight`]: Tutte's barycentric embedding
//! - [`InverseLengthWeight`]: shorter edges pull harder
//! - [`CotangentWeight`]: discrete harmonic map (Pinkall & Polthier 1993)
//!
//! Any closure `Fn(&SurfaceMesh<I>, Edge<I>) -> f64` is accepted as well.

use nalgebra::Point3;

use crate::mesh::{Edge, EdgeId, EdgeTable, MeshIndex, SurfaceMesh};

/// Weight of a mesh edge.
///
/// Weights are expected to be symmetric in the edge end points; they are
/// evaluated once per undirected edge.
pub trait EdgeWeight<I: MeshIndex = u32>: Send + Sync {
    /// Compute the weight of edge `e`.
    fn weight(&self, mesh: &SurfaceMesh<I>, edges: &EdgeTable<I>, e: EdgeId<I>) -> f64;
}

impl<I, F> EdgeWeight<I> for F
where
    I: MeshIndex,
    F: Fn(&SurfaceMesh<I>, Edge<I>) -> f64 + Send + Sync,
{
    fn weight(&self, mesh: &SurfaceMesh<I>, edges: &EdgeTable<I>, e: EdgeId<I>) -> f64 {
        self(mesh, edges.edge(e))
    }
}

/// Unit weight for every edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformWeight;

impl<I: MeshIndex> EdgeWeight<I> for UniformWeight {
    #[inline]
    fn weight(&self, _mesh: &SurfaceMesh<I>, _edges: &EdgeTable<I>, _e: EdgeId<I>) -> f64 {
        1.0
    }
}

/// Reciprocal of the edge length.
///
/// Zero-length edges get zero weight.
#[derive(Debug, Clone, Copy, Default)]
pub struct InverseLengthWeight;

impl<I: MeshIndex> EdgeWeight<I> for InverseLengthWeight {
    fn weight(&self, mesh: &SurfaceMesh<I>, edges: &EdgeTable<I>, e: EdgeId<I>) -> f64 {
        let edge = edges.edge(e);
        let length = mesh.distance(edge.v0, edge.v1);
        if length < 1e-12 {
            0.0
        } else {
            1.0 / length
        }
    }
}

/// Cotangent weight `(cot α + cot β) / 2`.
///
/// α and β are the angles opposite to the edge in its incident faces; boundary
/// edges have only one term. Obtuse triangles produce negative weights unless
/// `clamp_negative` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct CotangentWeight {
    /// Replace negative weights by zero.
    pub clamp_negative: bool,
}

impl CotangentWeight {
    /// Cotangent weights clamped to be non-negative.
    pub fn clamped() -> Self {
        Self {
            clamp_negative: true,
        }
    }
}

impl<I: MeshIndex> EdgeWeight<I> for CotangentWeight {
    fn weight(&self, mesh: &SurfaceMesh<I>, edges: &EdgeTable<I>, e: EdgeId<I>) -> f64 {
        let edge = edges.edge(e);
        let p0 = mesh.position(edge.v0);
        let p1 = mesh.position(edge.v1);

        let weight: f64 = edges
            .opposite_points(mesh, e)
            .map(|v| cotangent_angle(mesh.position(v), p0, p1))
            .sum::<f64>()
            * 0.5;

        if self.clamp_negative {
            weight.max(0.0)
        } else {
            weight
        }
    }
}

/// Compute the cotangent of the angle at vertex `a` in triangle (a, b, c).
fn cotangent_angle(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    let ab = b - a;
    let ac = c - a;

    let cross_norm = ab.cross(&ac).norm();
    if cross_norm < 1e-10 {
        return 0.0; // Degenerate triangle
    }

    ab.dot(&ac) / cross_norm
}
