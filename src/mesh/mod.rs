//! Surface mesh data structures.
//!
//! This module provides the triangle mesh representation consumed by the
//! surface mappers and the edge table derived from it.
//!
//! # Overview
//!
//! - [`SurfaceMesh`] stores point positions and triangle faces.
//! - [`EdgeTable`] enumerates each undirected edge exactly once and answers
//!   adjacency queries, including topological boundary detection.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a point
//! - [`FaceId`] - Identifies a face
//! - [`EdgeId`] - Identifies an undirected edge of an [`EdgeTable`]
//!
//! These indices are generic over the underlying integer type ([`MeshIndex`] trait),
//! allowing you to choose `u16`, `u32`, or `u64` based on mesh size.
//!
//! # Construction
//!
//! ```
//! use surfmap::mesh::{EdgeTable, SurfaceMesh};
//! use nalgebra::Point3;
//!
//! let points = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let mesh: SurfaceMesh = SurfaceMesh::from_triangles(&points, &[[0, 1, 2]]).unwrap();
//! let edges = EdgeTable::new(&mesh);
//! assert_eq!(edges.num_edges(), 3);
//! ```

mod edges;
mod index;
mod surface;

pub use edges::{Edge, EdgeTable};
pub use index::{EdgeId, FaceId, MeshIndex, VertexId};
pub use surface::SurfaceMesh;
