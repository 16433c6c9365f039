//! Assembly of the discrete Laplace system restricted to free points.
//!
//! For free points `r, c` and edge weights `w`, the stiffness matrix is
//!
//! ```text
//! A[r][c] = -Σ w(edges between r and c)       r ≠ c
//! A[r][r] =  Σ w(edges incident to r)
//! ```
//!
//! and the right-hand side collects the values of fixed neighbours,
//! `b[r] = Σ w · value(fixed neighbour)`.

use nalgebra::DMatrix;
use rayon::prelude::*;

use super::partition::{PointIndex, PointPartition};
use super::sparse::CsrMatrix;
use super::values::MapValues;
use super::weight::EdgeWeight;
use crate::mesh::{EdgeId, EdgeTable, MeshIndex, SurfaceMesh};

/// Stiffness matrix and right-hand side of a linear surface map.
#[derive(Debug, Clone)]
pub struct StiffnessSystem {
    /// Symmetric `n × n` matrix over the free points.
    pub matrix: CsrMatrix,
    /// Dense `n × m` right-hand side.
    pub rhs: DMatrix<f64>,
}

impl StiffnessSystem {
    /// Assemble the system for the free points of `partition`.
    ///
    /// Every edge is visited once. Edges between two free points contribute to
    /// both `(r, c)` and `(c, r)`, so the matrix is symmetric by construction.
    /// Edges between two fixed points are skipped without evaluating their weight.
    pub fn assemble<I, W>(
        mesh: &SurfaceMesh<I>,
        edges: &EdgeTable<I>,
        partition: &PointPartition<I>,
        values: &MapValues<I>,
        weight: &W,
        parallel: bool,
    ) -> Self
    where
        I: MeshIndex,
        W: EdgeWeight<I> + ?Sized,
    {
        let n = partition.num_free();
        let m = values.components();

        let edge_weight = |(i, edge): (usize, &crate::mesh::Edge<I>)| {
            if partition.is_fixed(edge.v0) && partition.is_fixed(edge.v1) {
                0.0
            } else {
                weight.weight(mesh, edges, EdgeId::new(i))
            }
        };
        let weights: Vec<f64> = if parallel {
            edges.as_slice().par_iter().enumerate().map(edge_weight).collect()
        } else {
            edges.as_slice().iter().enumerate().map(edge_weight).collect()
        };

        let mut triplets: Vec<(usize, usize, f64)> = Vec::with_capacity(2 * edges.num_edges() + n);
        let mut diagonal = vec![0.0; n];
        let mut rhs = DMatrix::zeros(n, m);

        for ((_, edge), &w) in edges.edges().zip(&weights) {
            match (partition.index_of(edge.v0), partition.index_of(edge.v1)) {
                (PointIndex::Free(r), PointIndex::Free(c)) => {
                    triplets.push((r, c, -w));
                    triplets.push((c, r, -w));
                    diagonal[r] += w;
                    diagonal[c] += w;
                }
                (PointIndex::Free(r), PointIndex::Fixed(_)) => {
                    for (l, &x) in values.get(edge.v1).iter().enumerate() {
                        rhs[(r, l)] += w * x;
                    }
                    diagonal[r] += w;
                }
                (PointIndex::Fixed(_), PointIndex::Free(c)) => {
                    for (l, &x) in values.get(edge.v0).iter().enumerate() {
                        rhs[(c, l)] += w * x;
                    }
                    diagonal[c] += w;
                }
                (PointIndex::Fixed(_), PointIndex::Fixed(_)) => {}
            }
        }

        triplets.extend(diagonal.into_iter().enumerate().map(|(r, w)| (r, r, w)));

        Self {
            matrix: CsrMatrix::from_triplets(n, n, triplets),
            rhs,
        }
    }

    /// Get the number of unknowns.
    #[inline]
    pub fn num_free(&self) -> usize {
        self.matrix.nrows()
    }

    /// Initial guess gathered from the current values of the free points.
    pub fn initial_guess<I: MeshIndex>(
        partition: &PointPartition<I>,
        values: &MapValues<I>,
    ) -> DMatrix<f64> {
        let m = values.components();
        DMatrix::from_fn(partition.num_free(), m, |r, l| {
            values.component(partition.free_point(r), l)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::weight::{InverseLengthWeight, UniformWeight};
    use crate::mesh::VertexId;
    use nalgebra::Point3;

    fn create_grid_mesh(n: usize) -> SurfaceMesh {
        let mut points = Vec::new();
        let mut faces = Vec::new();

        for j in 0..=n {
            for i in 0..=n {
                points.push(Point3::new(i as f64, j as f64, 0.0));
            }
        }
        for j in 0..n {
            for i in 0..n {
                let v00 = j * (n + 1) + i;
                let v10 = v00 + 1;
                let v01 = v00 + (n + 1);
                let v11 = v01 + 1;
                faces.push([v00, v10, v11]);
                faces.push([v00, v11, v01]);
            }
        }

        SurfaceMesh::from_triangles(&points, &faces).unwrap()
    }

    fn boundary_setup(mesh: &SurfaceMesh) -> (EdgeTable, PointPartition, MapValues) {
        let edges = EdgeTable::new(mesh);
        let partition = PointPartition::from_mask(&edges.boundary_points());
        let points: Vec<Point3<f64>> = mesh.points().to_vec();
        let values = MapValues::from_points3(&points);
        (edges, partition, values)
    }

    #[test]
    fn test_assemble_symmetric_and_diagonally_dominant() {
        let mesh = create_grid_mesh(4);
        let (edges, partition, values) = boundary_setup(&mesh);

        for parallel in [false, true] {
            let system = StiffnessSystem::assemble(
                &mesh,
                &edges,
                &partition,
                &values,
                &InverseLengthWeight,
                parallel,
            );
            let a = &system.matrix;
            assert_eq!(a.nrows(), 9);
            assert!(a.is_symmetric());

            for r in 0..a.nrows() {
                let off_diagonal: f64 = a.row(r).filter(|&(c, _)| c != r).map(|(_, v)| v.abs()).sum();
                assert!(a.get(r, r) >= off_diagonal);
                assert!(a.get(r, r) > 0.0);
            }
        }
    }

    #[test]
    fn test_assemble_uniform_entries() {
        let mesh = create_grid_mesh(2);
        let (edges, partition, values) = boundary_setup(&mesh);

        // Only the centre point (index 4) is free
        assert_eq!(partition.num_free(), 1);
        let system =
            StiffnessSystem::assemble(&mesh, &edges, &partition, &values, &UniformWeight, false);

        // Centre has 6 incident edges in this triangulation
        assert_eq!(system.matrix.nnz(), 1);
        assert_eq!(system.matrix.get(0, 0), 6.0);

        // b = Σ neighbour positions = 6 * centre for a symmetric one-ring
        assert!((system.rhs[(0, 0)] - 6.0).abs() < 1e-12);
        assert!((system.rhs[(0, 1)] - 6.0).abs() < 1e-12);
        assert_eq!(system.rhs[(0, 2)], 0.0);
    }

    #[test]
    fn test_assemble_free_free_entries() {
        let mesh = create_grid_mesh(3);
        let (edges, partition, values) = boundary_setup(&mesh);
        let system =
            StiffnessSystem::assemble(&mesh, &edges, &partition, &values, &UniformWeight, true);

        // Free points 5 and 6 share one edge; 5 and 10 share the diagonal
        let r5 = partition.free_index(VertexId::new(5)).unwrap();
        let r6 = partition.free_index(VertexId::new(6)).unwrap();
        let r10 = partition.free_index(VertexId::new(10)).unwrap();
        let r9 = partition.free_index(VertexId::new(9)).unwrap();
        assert_eq!(system.matrix.get(r5, r6), -1.0);
        assert_eq!(system.matrix.get(r5, r10), -1.0);
        assert_eq!(system.matrix.get(r6, r9), 0.0);

        // Row sums of A plus the fixed-neighbour weights equal zero
        for r in 0..system.num_free() {
            let row_sum: f64 = system.matrix.row(r).map(|(_, v)| v).sum();
            let v = partition.free_point(r);
            let fixed_neighbours = edges.neighbors(v).filter(|&w| partition.is_fixed(w)).count();
            assert!((row_sum - fixed_neighbours as f64).abs() < 1e-12);
        }
    }

    #[test]
    fn test_assemble_all_fixed() {
        let mesh = create_grid_mesh(2);
        let edges = EdgeTable::new(&mesh);
        let partition = PointPartition::from_mask(&vec![true; mesh.num_points()]);
        let values = MapValues::zeros(mesh.num_points(), 2);

        let evaluated = std::sync::atomic::AtomicUsize::new(0);
        let weight = |_: &SurfaceMesh, _: crate::mesh::Edge| {
            evaluated.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            1.0
        };
        let system = StiffnessSystem::assemble(&mesh, &edges, &partition, &values, &weight, false);

        assert_eq!(system.num_free(), 0);
        assert_eq!(system.matrix.nnz(), 0);
        assert_eq!(system.rhs.shape(), (0, 2));
        assert_eq!(evaluated.load(std::sync::atomic::Ordering::Relaxed), 0);
    }

    #[test]
    fn test_initial_guess() {
        let mesh = create_grid_mesh(2);
        let (_, partition, values) = boundary_setup(&mesh);
        let guess = StiffnessSystem::initial_guess(&partition, &values);
        assert_eq!(guess.shape(), (1, 3));
        assert_eq!(guess[(0, 0)], 1.0);
        assert_eq!(guess[(0, 1)], 1.0);
    }
}
