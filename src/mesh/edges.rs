//! Undirected edge table of a surface mesh.
//!
//! The [`EdgeTable`] enumerates every edge of the face set exactly once, in
//! ascending `(v0, v1)` order with `v0 < v1`, and answers neighbour and incidence
//! queries. Edges are derived from faces only; auxiliary line cells of the mesh
//! never contribute.

use super::index::{EdgeId, FaceId, MeshIndex, VertexId};
use super::surface::SurfaceMesh;

/// An undirected edge with `v0 < v1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge<I: MeshIndex = u32> {
    /// Smaller point ID.
    pub v0: VertexId<I>,
    /// Larger point ID.
    pub v1: VertexId<I>,
}

impl<I: MeshIndex> Edge<I> {
    /// Create an edge, ordering the end points.
    pub fn new(a: VertexId<I>, b: VertexId<I>) -> Self {
        if a < b {
            Self { v0: a, v1: b }
        } else {
            Self { v0: b, v1: a }
        }
    }

    /// The end point that is not `v`.
    #[inline]
    pub fn other(&self, v: VertexId<I>) -> VertexId<I> {
        if v == self.v0 {
            self.v1
        } else {
            self.v0
        }
    }
}

/// Edge table with vertex adjacency and edge-face incidence.
#[derive(Debug, Clone)]
pub struct EdgeTable<I: MeshIndex = u32> {
    edges: Vec<Edge<I>>,
    /// `face_ptr[e]..face_ptr[e + 1]` indexes `edge_faces` for edge `e`.
    face_ptr: Vec<usize>,
    edge_faces: Vec<FaceId<I>>,
    /// `adj_ptr[v]..adj_ptr[v + 1]` indexes `adj` for point `v`.
    adj_ptr: Vec<usize>,
    adj: Vec<(VertexId<I>, EdgeId<I>)>,
}

impl<I: MeshIndex> EdgeTable<I> {
    /// Build the edge table of a mesh.
    pub fn new(mesh: &SurfaceMesh<I>) -> Self {
        // Directed face sides, sorted so that equal edges become adjacent
        let mut sides: Vec<(Edge<I>, FaceId<I>)> = Vec::with_capacity(3 * mesh.num_faces());
        for f in mesh.face_ids() {
            let [a, b, c] = mesh.face(f);
            sides.push((Edge::new(a, b), f));
            sides.push((Edge::new(b, c), f));
            sides.push((Edge::new(c, a), f));
        }
        sides.sort_unstable();

        let mut edges: Vec<Edge<I>> = Vec::with_capacity(sides.len() / 2 + 1);
        let mut face_ptr = vec![0usize];
        let mut edge_faces = Vec::with_capacity(sides.len());
        for (edge, face) in sides {
            if edges.last() != Some(&edge) {
                if !edges.is_empty() {
                    face_ptr.push(edge_faces.len());
                }
                edges.push(edge);
            }
            edge_faces.push(face);
        }
        face_ptr.push(edge_faces.len());
        if edges.is_empty() {
            face_ptr.truncate(1);
        }

        // Point adjacency in CSR layout
        let n = mesh.num_points();
        let mut degree = vec![0usize; n];
        for edge in &edges {
            degree[edge.v0.index()] += 1;
            degree[edge.v1.index()] += 1;
        }
        let mut adj_ptr = vec![0usize; n + 1];
        for v in 0..n {
            adj_ptr[v + 1] = adj_ptr[v] + degree[v];
        }
        let mut fill = adj_ptr[..n].to_vec();
        let mut adj = vec![(VertexId::invalid(), EdgeId::invalid()); adj_ptr[n]];
        for (ei, edge) in edges.iter().enumerate() {
            let e = EdgeId::new(ei);
            adj[fill[edge.v0.index()]] = (edge.v1, e);
            fill[edge.v0.index()] += 1;
            adj[fill[edge.v1.index()]] = (edge.v0, e);
            fill[edge.v1.index()] += 1;
        }

        Self {
            edges,
            face_ptr,
            edge_faces,
            adj_ptr,
            adj,
        }
    }

    /// Get the number of edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Get the number of points covered by the adjacency.
    #[inline]
    pub fn num_points(&self) -> usize {
        self.adj_ptr.len() - 1
    }

    /// Get an edge by ID.
    #[inline]
    pub fn edge(&self, e: EdgeId<I>) -> Edge<I> {
        self.edges[e.index()]
    }

    /// All edges in enumeration order.
    pub fn as_slice(&self) -> &[Edge<I>] {
        &self.edges
    }

    /// Iterate over all edges with their IDs.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId<I>, Edge<I>)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .map(|(i, &e)| (EdgeId::new(i), e))
    }

    /// Faces incident to an edge.
    #[inline]
    pub fn edge_faces(&self, e: EdgeId<I>) -> &[FaceId<I>] {
        let i = e.index();
        &self.edge_faces[self.face_ptr[i]..self.face_ptr[i + 1]]
    }

    /// Whether the edge belongs to exactly one face.
    #[inline]
    pub fn is_boundary_edge(&self, e: EdgeId<I>) -> bool {
        self.edge_faces(e).len() == 1
    }

    /// Number of edges incident to a point.
    #[inline]
    pub fn valence(&self, v: VertexId<I>) -> usize {
        self.adj_ptr[v.index() + 1] - self.adj_ptr[v.index()]
    }

    /// Iterate over the points adjacent to `v`.
    pub fn neighbors(&self, v: VertexId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.incident(v).map(|(w, _)| w)
    }

    /// Iterate over `(neighbour, edge)` pairs around `v`.
    pub fn incident(&self, v: VertexId<I>) -> impl Iterator<Item = (VertexId<I>, EdgeId<I>)> + '_ {
        self.adj[self.adj_ptr[v.index()]..self.adj_ptr[v.index() + 1]]
            .iter()
            .copied()
    }

    /// Find the edge between two points.
    pub fn find_edge(&self, a: VertexId<I>, b: VertexId<I>) -> Option<EdgeId<I>> {
        self.incident(a).find(|&(w, _)| w == b).map(|(_, e)| e)
    }

    /// Points opposite to an edge in its incident faces.
    pub fn opposite_points<'a>(
        &'a self,
        mesh: &'a SurfaceMesh<I>,
        e: EdgeId<I>,
    ) -> impl Iterator<Item = VertexId<I>> + 'a {
        let edge = self.edge(e);
        self.edge_faces(e).iter().filter_map(move |&f| {
            mesh.face(f)
                .into_iter()
                .find(|&v| v != edge.v0 && v != edge.v1)
        })
    }

    /// Mark every point incident to a boundary edge.
    pub fn boundary_points(&self) -> Vec<bool> {
        let mut is_boundary = vec![false; self.num_points()];
        for (e, edge) in self.edges() {
            if self.is_boundary_edge(e) {
                is_boundary[edge.v0.index()] = true;
                is_boundary[edge.v1.index()] = true;
            }
        }
        is_boundary
    }
}
