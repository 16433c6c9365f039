//! Triangulated surface mesh.
//!
//! [`SurfaceMesh`] is a face-vertex representation: an ordered list of point
//! positions plus triangle faces referencing them. It may also carry auxiliary
//! line cells (e.g. traced curves), which do not contribute to surface adjacency
//! and are dropped by [`SurfaceMesh::working_copy`].

use nalgebra::Point3;

use super::index::{FaceId, MeshIndex, VertexId};
use crate::error::{MapError, Result};

/// A triangle mesh stored as points and faces.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceMesh<I: MeshIndex = u32> {
    points: Vec<Point3<f64>>,
    faces: Vec<[VertexId<I>; 3]>,
    lines: Vec<[VertexId<I>; 2]>,
}

impl<I: MeshIndex> Default for SurfaceMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> SurfaceMesh<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            faces: Vec::new(),
            lines: Vec::new(),
        }
    }

    /// Build a surface mesh from point positions and triangle faces.
    ///
    /// # Errors
    ///
    /// Returns an error if `faces` is empty, if a face references a point that
    /// does not exist, or if a face repeats a point.
    ///
    /// # Example
    /// ```
    /// use surfmap::mesh::SurfaceMesh;
    /// use nalgebra::Point3;
    ///
    /// let points = vec![
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(0.5, 1.0, 0.0),
    /// ];
    /// let mesh: SurfaceMesh = SurfaceMesh::from_triangles(&points, &[[0, 1, 2]]).unwrap();
    /// assert_eq!(mesh.num_points(), 3);
    /// assert_eq!(mesh.num_faces(), 1);
    /// ```
    pub fn from_triangles(points: &[Point3<f64>], faces: &[[usize; 3]]) -> Result<Self> {
        if faces.is_empty() {
            return Err(MapError::EmptyMesh);
        }

        let mut mesh = Self::new();
        mesh.points.extend_from_slice(points);
        mesh.faces.reserve(faces.len());
        for &face in faces {
            mesh.add_face(face)?;
        }
        Ok(mesh)
    }

    // ==================== Accessors ====================

    /// Get the number of points.
    #[inline]
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Get the number of triangle faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get the number of auxiliary line cells.
    #[inline]
    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }

    /// Get the position of a point.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.points[v.index()]
    }

    /// Set the position of a point.
    #[inline]
    pub fn set_position(&mut self, v: VertexId<I>, pos: Point3<f64>) {
        self.points[v.index()] = pos;
    }

    /// Get the three points of a face.
    #[inline]
    pub fn face(&self, f: FaceId<I>) -> [VertexId<I>; 3] {
        self.faces[f.index()]
    }

    /// Get all point positions.
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Get all faces.
    pub fn faces(&self) -> &[[VertexId<I>; 3]] {
        &self.faces
    }

    /// Get all auxiliary line cells.
    pub fn lines(&self) -> &[[VertexId<I>; 2]] {
        &self.lines
    }

    /// Iterate over all point IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        (0..self.points.len()).map(VertexId::new)
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    // ==================== Geometry ====================

    /// Get the positions of the three points of a face.
    pub fn face_positions(&self, f: FaceId<I>) -> [Point3<f64>; 3] {
        let [v0, v1, v2] = self.face(f);
        [*self.position(v0), *self.position(v1), *self.position(v2)]
    }

    /// Compute the distance between two points.
    pub fn distance(&self, a: VertexId<I>, b: VertexId<I>) -> f64 {
        (self.position(b) - self.position(a)).norm()
    }

    // ==================== Construction ====================

    /// Add a new point and return its ID.
    pub fn add_point(&mut self, position: Point3<f64>) -> VertexId<I> {
        let id = VertexId::new(self.points.len());
        self.points.push(position);
        id
    }

    /// Add a triangle face and return its ID.
    pub fn add_face(&mut self, face: [usize; 3]) -> Result<FaceId<I>> {
        let fi = self.faces.len();
        for &vi in &face {
            if vi >= self.points.len() {
                return Err(MapError::InvalidVertexIndex { face: fi, vertex: vi });
            }
        }
        if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
            return Err(MapError::DegenerateFace { face: fi });
        }
        self.faces.push(face.map(VertexId::new));
        Ok(FaceId::new(fi))
    }

    /// Add an auxiliary line cell between two existing points.
    pub fn add_line(&mut self, a: VertexId<I>, b: VertexId<I>) -> Result<()> {
        for v in [a, b] {
            if v.index() >= self.points.len() {
                return Err(MapError::invalid_param(
                    "line",
                    v.index(),
                    "point index out of range",
                ));
            }
        }
        self.lines.push([a, b]);
        Ok(())
    }

    /// Copy of this mesh reduced to the adjacency induced by its faces.
    ///
    /// Point positions and faces are kept; line cells are discarded.
    pub fn working_copy(&self) -> Self {
        Self {
            points: self.points.clone(),
            faces: self.faces.clone(),
            lines: Vec::new(),
        }
    }
}
