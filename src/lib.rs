//! # Surfmap
//!
//! Linear surface maps of triangle meshes with fixed boundary values.
//!
//! Given a triangulated surface, input values for a subset of its points and an
//! edge weight policy, surfmap computes values for the remaining points by
//! solving a sparse discrete Laplace equation. With the mesh boundary mapped to
//! a convex planar polygon this yields a planar parameterization of the surface.
//!
//! ## Features
//!
//! - **Surface meshes**: Point/face meshes with type-safe, generic indices
//! - **Edge weights**: Uniform, inverse length, cotangent or any closure
//! - **Iterative solver**: Jacobi preconditioned conjugate gradient with warm
//!   starts, solving value components in parallel
//! - **Explicit lifecycle**: Initialize, solve and finalize with typed errors
//!
//! ## Quick Start
//!
//! ```
//! use surfmap::prelude::*;
//! use nalgebra::Point3;
//!
//! // A fan of four triangles around point 0
//! let points = vec![
//!     Point3::new(0.0, 0.0, 0.5),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(-1.0, 0.0, 0.0),
//!     Point3::new(0.0, -1.0, 0.0),
//! ];
//! let faces = [[0, 1, 2], [0, 2, 3], [0, 3, 4], [0, 4, 1]];
//! let mesh: SurfaceMesh = SurfaceMesh::from_triangles(&points, &faces).unwrap();
//!
//! // One scalar value per point; only the boundary values matter
//! let input = MapValues::new(vec![0.0, 1.0, 2.0, 3.0, 4.0], 1).unwrap();
//!
//! let mut mapper = SymmetricLinearMapper::new(SymmetricLinear::new(UniformWeight))
//!     .with_mesh(mesh)
//!     .with_input(input)
//!     .with_options(MapperOptions::default().with_tolerance(1e-12));
//! let map = mapper.run().unwrap();
//!
//! // The centre receives the average of its neighbours
//! assert!((map.evaluate(VertexId::new(0))[0] - 2.5).abs() < 1e-10);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod map;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types:
///
/// ```
/// use surfmap::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{MapError, Result};
    pub use crate::map::{
        CotangentWeight, EdgeWeight, InverseLengthWeight, MapSolve, MapValues, MapperOptions,
        MapperState, PiecewiseLinearMap, PointIndex, SolveReport, SurfaceMap, SurfaceMapper,
        SymmetricLinear, SymmetricLinearMapper, UniformWeight,
    };
    pub use crate::mesh::{Edge, EdgeId, EdgeTable, FaceId, MeshIndex, SurfaceMesh, VertexId};
}

// Re-export nalgebra types for convenience
pub use nalgebra;
