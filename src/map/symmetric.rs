//! Linear surface maps from a symmetric edge-weighted Laplacian.
//!
//! The free point values minimize the weighted Dirichlet energy subject to the
//! fixed point values. Since weights are symmetric, the normal equations form a
//! symmetric positive definite system (for positive weights and at least one
//! fixed point per connected component) which is solved iteratively.

use super::mapper::{MapProblem, MapSolve, SolveReport, SurfaceMapper};
use super::sparse::{ConjugateGradient, LinearSolver};
use super::stiffness::StiffnessSystem;
use super::weight::EdgeWeight;
use crate::mesh::MeshIndex;

/// Solve strategy for symmetric linear surface maps.
///
/// `W` is the edge weight policy and `L` the solver for the sparse system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymmetricLinear<W, L = ConjugateGradient> {
    weight: W,
    solver: L,
}

impl<W> SymmetricLinear<W> {
    /// Strategy using the given edge weights and the default solver.
    pub fn new(weight: W) -> Self {
        Self {
            weight,
            solver: ConjugateGradient,
        }
    }
}

impl<W, L> SymmetricLinear<W, L> {
    /// Replace the linear solver.
    pub fn with_solver<S: LinearSolver>(self, solver: S) -> SymmetricLinear<W, S> {
        SymmetricLinear {
            weight: self.weight,
            solver,
        }
    }

    /// The edge weight policy.
    pub fn weight(&self) -> &W {
        &self.weight
    }

    /// The linear solver.
    pub fn solver(&self) -> &L {
        &self.solver
    }
}

impl<I, W, L> MapSolve<I> for SymmetricLinear<W, L>
where
    I: MeshIndex,
    W: EdgeWeight<I>,
    L: LinearSolver,
{
    fn solve(&self, problem: MapProblem<'_, I>) -> SolveReport {
        let MapProblem {
            surface,
            edges,
            partition,
            values,
            options,
        } = problem;

        let n = partition.num_free();
        let m = values.components();
        if n == 0 {
            return SolveReport::trivial(surface.num_points(), m);
        }

        let system =
            StiffnessSystem::assemble(surface, edges, partition, values, &self.weight, options.parallel);
        let x0 = StiffnessSystem::initial_guess(partition, values);
        let settings = options.solver_settings();
        let solution = self.solver.solve(&system.matrix, &system.rhs, &x0, &settings);

        for (r, &v) in partition.free_points().iter().enumerate() {
            for l in 0..m {
                values.set_component(v, l, solution.x[(r, l)]);
            }
        }

        SolveReport {
            num_points: surface.num_points(),
            num_free: n,
            num_nonzeros: system.matrix.nnz(),
            components: m,
            iterations: solution.iterations,
            error: solution.error,
            converged: solution.error <= settings.effective_tolerance(),
        }
    }
}

/// Surface mapper with a symmetric edge-weighted Laplacian.
pub type SymmetricLinearMapper<W, I = u32> = SurfaceMapper<SymmetricLinear<W>, I>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::mapper::MapperOptions;
    use crate::map::values::MapValues;
    use crate::map::weight::{CotangentWeight, InverseLengthWeight, UniformWeight};
    use crate::mesh::{Edge, SurfaceMesh, VertexId};
    use nalgebra::Point3;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

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

    /// Boundary points map to the unit square, interior points start at (-1, -1).
    fn square_input(n: usize) -> MapValues {
        let mut values = MapValues::zeros((n + 1) * (n + 1), 2);
        for j in 0..=n {
            for i in 0..=n {
                let v = VertexId::new(j * (n + 1) + i);
                if i == 0 || j == 0 || i == n || j == n {
                    values.set(v, &[i as f64 / n as f64, j as f64 / n as f64]);
                } else {
                    values.set(v, &[-1.0, -1.0]);
                }
            }
        }
        values
    }

    fn options() -> MapperOptions {
        MapperOptions::default().with_tolerance(1e-12)
    }

    #[test]
    fn test_grid_to_unit_square() {
        init_logging();
        let n = 10;
        let mut mapper = SymmetricLinearMapper::new(SymmetricLinear::new(UniformWeight))
            .with_mesh(create_grid_mesh(n))
            .with_input(square_input(n))
            .with_options(options().with_verbose(true));
        let map = mapper.run().unwrap();

        for j in 0..=n {
            for i in 0..=n {
                let value = map.evaluate(VertexId::new(j * (n + 1) + i));
                assert!((value[0] - i as f64 / n as f64).abs() < 1e-8);
                assert!((value[1] - j as f64 / n as f64).abs() < 1e-8);
            }
        }

        let report = mapper.last_report().unwrap();
        assert_eq!(report.num_points, 121);
        assert_eq!(report.num_free, 81);
        assert_eq!(report.components, 2);
        assert!(report.converged);
        assert!(report.error <= 1e-12);
    }

    #[test]
    fn test_fixed_values_unchanged() {
        let n = 6;
        let input = square_input(n);
        let mut mapper = SymmetricLinearMapper::new(SymmetricLinear::new(InverseLengthWeight))
            .with_mesh(create_grid_mesh(n))
            .with_input(input.clone())
            .with_options(options());
        mapper.run().unwrap();

        let values = mapper.values().unwrap();
        for &v in mapper.partition().unwrap().fixed_points() {
            assert_eq!(values.get(v), input.get(v));
        }
    }

    #[test]
    fn test_tutte_centre_is_neighbour_average() {
        // Square fan: centre 0 with four boundary points
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
        ];
        let faces = [[0, 1, 2], [0, 2, 3], [0, 3, 4], [0, 4, 1]];
        let mesh: SurfaceMesh = SurfaceMesh::from_triangles(&points, &faces).unwrap();

        let mut input = MapValues::zeros(5, 1);
        for (i, x) in [(1, 2.0), (2, 4.0), (3, 6.0), (4, 12.0)] {
            input.set(VertexId::new(i), &[x]);
        }
        let mut mapper = SymmetricLinearMapper::new(SymmetricLinear::new(UniformWeight))
            .with_mesh(mesh)
            .with_input(input)
            .with_options(options());
        let map = mapper.run().unwrap();

        assert!((map.evaluate(VertexId::new(0))[0] - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_cotangent_weights_reproduce_linear_map() {
        let n = 5;
        let mut mesh = create_grid_mesh(n);
        for j in 1..n {
            for i in 1..n {
                let v = VertexId::new(j * (n + 1) + i);
                let dx = ((i * 7 + j * 3) % 5) as f64 * 0.04 - 0.08;
                let dy = ((i * 3 + j * 5) % 5) as f64 * 0.04 - 0.08;
                let p = mesh.position(v);
                mesh.set_position(v, Point3::new(p.x + dx, p.y + dy, 0.0));
            }
        }

        // Boundary values are the positions; interior starts at zero
        let mut input = MapValues::zeros(mesh.num_points(), 2);
        let edges = crate::mesh::EdgeTable::new(&mesh);
        for (i, on_boundary) in edges.boundary_points().into_iter().enumerate() {
            if on_boundary {
                let p = mesh.points()[i];
                input.set(VertexId::new(i), &[p.x, p.y]);
            }
        }

        let mut mapper = SymmetricLinearMapper::new(SymmetricLinear::new(CotangentWeight::default()))
            .with_mesh(mesh.clone())
            .with_input(input)
            .with_options(options());
        let map = mapper.run().unwrap();

        for v in mesh.vertex_ids() {
            let p = mesh.position(v);
            let value = map.evaluate(v);
            assert!((value[0] - p.x).abs() < 1e-8);
            assert!((value[1] - p.y).abs() < 1e-8);
        }
    }

    #[test]
    fn test_all_fixed_is_noop() {
        let n = 3;
        let input = square_input(n);
        let mut mapper = SymmetricLinearMapper::new(SymmetricLinear::new(UniformWeight))
            .with_mesh(create_grid_mesh(n))
            .with_input(input.clone())
            .with_mask(vec![true; 16]);
        let map = mapper.run().unwrap();

        for i in 0..16 {
            let v = VertexId::new(i);
            assert_eq!(map.evaluate(v), input.get(v));
        }
        let report = mapper.last_report().unwrap();
        assert_eq!(report.num_free, 0);
        assert_eq!(report.iterations, 0);
        assert!(report.converged);
    }

    #[test]
    fn test_isolated_free_point_keeps_value() {
        let mut mesh = create_grid_mesh(2);
        let isolated = mesh.add_point(Point3::new(5.0, 5.0, 0.0));

        let mut input = square_input(2);
        let mut data = input.as_slice().to_vec();
        data.extend_from_slice(&[3.0, 4.0]);
        input = MapValues::new(data, 2).unwrap();

        let mut mapper = SymmetricLinearMapper::new(SymmetricLinear::new(UniformWeight))
            .with_mesh(mesh)
            .with_input(input)
            .with_options(options());
        let map = mapper.run().unwrap();

        assert_eq!(map.evaluate(isolated), vec![3.0, 4.0]);
        let centre = map.evaluate(VertexId::new(4));
        assert!((centre[0] - 0.5).abs() < 1e-10);
        assert!((centre[1] - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_isolated_free_point_keeps_value_with_zero_boundary() {
        // Square fan around point 0 plus an unconnected point 5
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
            Point3::new(4.0, 4.0, 0.0),
        ];
        let faces = [[0, 1, 2], [0, 2, 3], [0, 3, 4], [0, 4, 1]];
        let mesh: SurfaceMesh = SurfaceMesh::from_triangles(&points, &faces).unwrap();

        // All boundary values are zero, so the right-hand side vanishes
        let input = MapValues::new(vec![1.0, 0.0, 0.0, 0.0, 0.0, 3.0], 1).unwrap();
        let mut mapper = SymmetricLinearMapper::new(SymmetricLinear::new(UniformWeight))
            .with_mesh(mesh)
            .with_input(input)
            .with_options(options());
        let map = mapper.run().unwrap();

        assert_eq!(map.evaluate(VertexId::new(5)), vec![3.0]);
        assert_eq!(map.evaluate(VertexId::new(0)), vec![0.0]);
        assert_eq!(mapper.last_report().unwrap().iterations, 0);
    }

    #[test]
    fn test_warm_restart() {
        let n = 8;
        let mut first = SymmetricLinearMapper::new(SymmetricLinear::new(InverseLengthWeight))
            .with_mesh(create_grid_mesh(n))
            .with_input(square_input(n))
            .with_options(MapperOptions::default().with_tolerance(1e-10));
        first.run().unwrap();
        let first_report = first.last_report().unwrap().clone();
        assert!(first_report.iterations > 0);

        let solved = first.values().unwrap().clone();
        let mut second = first.clone();
        second.set_input(Some(solved));
        second.run().unwrap();
        let second_report = second.last_report().unwrap();

        assert!(second_report.iterations <= first_report.iterations);
        assert_eq!(second_report.iterations, 0);
        assert!(second_report.error <= 1e-10);
    }

    #[test]
    fn test_repeated_solve_restarts_from_solution() {
        let n = 8;
        let mut mapper = SymmetricLinearMapper::new(SymmetricLinear::new(UniformWeight))
            .with_mesh(create_grid_mesh(n))
            .with_input(square_input(n))
            .with_options(MapperOptions::default().with_tolerance(1e-10));
        mapper.initialize().unwrap();
        let first = mapper.solve().unwrap().iterations;
        let second = mapper.solve().unwrap().iterations;
        assert!(first > 0);
        assert_eq!(second, 0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let n = 6;
        let solve = |parallel: bool| {
            let mut mapper =
                SymmetricLinearMapper::new(SymmetricLinear::new(CotangentWeight::clamped()))
                    .with_mesh(create_grid_mesh(n))
                    .with_input(square_input(n))
                    .with_options(options().with_parallel(parallel));
            mapper.run().unwrap();
            mapper.values().unwrap().clone()
        };
        assert_eq!(solve(true), solve(false));
    }

    #[test]
    fn test_iteration_limit_is_soft() {
        init_logging();
        let n = 10;
        let mut mapper = SymmetricLinearMapper::new(SymmetricLinear::new(UniformWeight))
            .with_mesh(create_grid_mesh(n))
            .with_input(square_input(n))
            .with_options(options().with_max_iterations(1));
        assert!(mapper.run().is_ok());

        let report = mapper.last_report().unwrap();
        assert_eq!(report.iterations, 1);
        assert!(!report.converged);
    }

    #[test]
    fn test_closure_weight() {
        let n = 4;
        let weight = |_: &SurfaceMesh, _: Edge| 2.0;
        let mut mapper = SymmetricLinearMapper::new(SymmetricLinear::new(weight))
            .with_mesh(create_grid_mesh(n))
            .with_input(square_input(n))
            .with_options(options());
        let map = mapper.run().unwrap();

        // Scaling all weights leaves the harmonic map unchanged
        let value = map.evaluate(VertexId::new(2 * (n + 1) + 1));
        assert!((value[0] - 0.25).abs() < 1e-10);
        assert!((value[1] - 0.5).abs() < 1e-10);
    }
}
