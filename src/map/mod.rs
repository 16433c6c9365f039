//! Surface maps with fixed boundary values.
//!
//! This module computes maps from the points of a triangulated surface to
//! m-dimensional values, where a subset of points (by default the topological
//! boundary) has prescribed values and the rest are found by minimizing a
//! weighted Dirichlet energy.
//!
//! # Available Strategies
//!
//! - [`SymmetricLinear`]: Symmetric edge-weighted Laplacian solved with a
//!   preconditioned conjugate gradient. Combine with [`UniformWeight`] for
//!   Tutte's embedding or [`CotangentWeight`] for a discrete harmonic map.
//!
//! # Example
//!
//! ```
//! use surfmap::prelude::*;
//! use nalgebra::Point3;
//!
//! // Unit square split into four triangles around a centre point
//! let points = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.4, 0.7, 0.2),
//! ];
//! let faces = [[0, 1, 4], [1, 2, 4], [2, 3, 4], [3, 0, 4]];
//! let mesh: SurfaceMesh = SurfaceMesh::from_triangles(&points, &faces).unwrap();
//!
//! // Boundary keeps its planar coordinates
//! let mut input = MapValues::zeros(5, 2);
//! for i in 0..4 {
//!     input.set(VertexId::new(i), &[points[i].x, points[i].y]);
//! }
//!
//! let options = MapperOptions::default().with_tolerance(1e-12);
//! let mut mapper = SymmetricLinearMapper::new(SymmetricLinear::new(UniformWeight))
//!     .with_mesh(mesh)
//!     .with_input(input)
//!     .with_options(options);
//! let map = mapper.run().unwrap();
//!
//! let centre = map.evaluate(VertexId::new(4));
//! assert!((centre[0] - 0.5).abs() < 1e-10);
//! assert!((centre[1] - 0.5).abs() < 1e-10);
//! ```

mod mapper;
mod output;
mod partition;
mod sparse;
mod stiffness;
mod symmetric;
mod values;
mod weight;

pub use mapper::{
    MapProblem, MapSolve, MapperOptions, MapperState, SolveReport, SurfaceMapper,
};
pub use output::{PiecewiseLinearMap, SurfaceMap};
pub use partition::{PointIndex, PointPartition};
pub use sparse::{
    conjugate_gradient, CgOutcome, ConjugateGradient, CsrMatrix, LinearSolution, LinearSolver,
    SolverSettings, DEFAULT_TOLERANCE,
};
pub use stiffness::StiffnessSystem;
pub use symmetric::{SymmetricLinear, SymmetricLinearMapper};
pub use values::MapValues;
pub use weight::{CotangentWeight, EdgeWeight, InverseLengthWeight, UniformWeight};
