//! Surface mapper orchestration.
//!
//! A [`SurfaceMapper`] runs three steps strictly in order:
//!
//! 1. [`initialize`](SurfaceMapper::initialize) validates the input, makes a
//!    working copy of the mesh, copies the input values, derives the fixed point
//!    mask and partitions the points.
//! 2. [`solve`](SurfaceMapper::solve) computes the values of the free points
//!    using the mapper's [`MapSolve`] strategy.
//! 3. [`finalize`](SurfaceMapper::finalize) wraps the result into a
//!    [`SurfaceMap`], by default a [`PiecewiseLinearMap`].

use super::output::{PiecewiseLinearMap, SurfaceMap};
use super::partition::{PointIndex, PointPartition};
use super::sparse::SolverSettings;
use super::values::MapValues;
use crate::error::{MapError, Result};
use crate::mesh::{EdgeTable, MeshIndex, SurfaceMesh, VertexId};

/// Options shared by all surface mappers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapperOptions {
    /// Maximum number of solver iterations; `0` uses the solver default.
    pub max_iterations: usize,

    /// Convergence tolerance; non-positive values use the solver default.
    pub tolerance: f64,

    /// Report solve diagnostics at `info` instead of `debug` level.
    pub verbose: bool,

    /// Evaluate edge weights and solve value components in parallel.
    pub parallel: bool,
}

impl Default for MapperOptions {
    fn default() -> Self {
        Self {
            max_iterations: 0,
            tolerance: 0.0,
            verbose: false,
            parallel: true,
        }
    }
}

impl MapperOptions {
    /// Set the maximum number of solver iterations.
    pub fn with_max_iterations(mut self, max_iter: usize) -> Self {
        self.max_iterations = max_iter;
        self
    }

    /// Set the convergence tolerance.
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Enable or disable verbose diagnostics.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Enable or disable parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Stopping criteria for the linear solver.
    pub fn solver_settings(&self) -> SolverSettings {
        SolverSettings {
            max_iterations: self.max_iterations,
            tolerance: self.tolerance,
            parallel: self.parallel,
        }
    }
}

/// Diagnostics of a single solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveReport {
    /// Number of surface points.
    pub num_points: usize,
    /// Number of free points, i.e. unknowns per component.
    pub num_free: usize,
    /// Number of stored non-zero stiffness values.
    pub num_nonzeros: usize,
    /// Dimension of the map codomain.
    pub components: usize,
    /// Solver iterations (maximum over components).
    pub iterations: usize,
    /// Estimated relative residual (maximum over components).
    pub error: f64,
    /// Whether the residual reached the tolerance.
    pub converged: bool,
}

impl SolveReport {
    /// Report for a system without unknowns.
    pub fn trivial(num_points: usize, components: usize) -> Self {
        Self {
            num_points,
            num_free: 0,
            num_nonzeros: 0,
            components,
            iterations: 0,
            error: 0.0,
            converged: true,
        }
    }

    /// Emit the report through the `log` facade.
    pub fn log(&self, verbose: bool) {
        let level = if verbose {
            log::Level::Info
        } else {
            log::Level::Debug
        };
        log::log!(level, "No. of surface points             = {}", self.num_points);
        log::log!(level, "No. of free points                = {}", self.num_free);
        log::log!(level, "No. of non-zero stiffness values  = {}", self.num_nonzeros);
        log::log!(level, "Dimension of surface map codomain = {}", self.components);
        log::log!(level, "No. of iterations                 = {}", self.iterations);
        log::log!(level, "Estimated error                   = {:e}", self.error);
        if !self.converged {
            log::warn!(
                "linear solver stopped after {} iterations with relative residual {:e}",
                self.iterations,
                self.error
            );
        }
    }
}

/// The state a solve strategy operates on.
#[derive(Debug)]
pub struct MapProblem<'a, I: MeshIndex = u32> {
    /// Working copy of the surface mesh.
    pub surface: &'a SurfaceMesh<I>,
    /// Edges of the working surface.
    pub edges: &'a EdgeTable<I>,
    /// Fixed and free points.
    pub partition: &'a PointPartition<I>,
    /// Current values; only free entries may be modified.
    pub values: &'a mut MapValues<I>,
    /// Mapper options.
    pub options: &'a MapperOptions,
}

/// Strategy of a concrete surface mapper.
///
/// Only [`solve`](MapSolve::solve) is required. The remaining hooks default to
/// doing nothing, in which case the input mesh is used as is and the result is
/// wrapped in a [`PiecewiseLinearMap`].
pub trait MapSolve<I: MeshIndex = u32> {
    /// Modify the working surface before the points are partitioned.
    ///
    /// Implementations that change the points must update `values` and, if
    /// present, `mask` accordingly. Returns whether the surface was changed.
    fn remesh(
        &self,
        _surface: &mut SurfaceMesh<I>,
        _values: &mut MapValues<I>,
        _mask: &mut Option<Vec<bool>>,
    ) -> Result<bool> {
        Ok(false)
    }

    /// Compute the values of the free points.
    fn solve(&self, problem: MapProblem<'_, I>) -> SolveReport;

    /// Build a custom output map from the solved values.
    fn build_output(
        &self,
        _surface: &SurfaceMesh<I>,
        _values: &MapValues<I>,
    ) -> Option<Box<dyn SurfaceMap<I>>> {
        None
    }
}

/// Execution state of a [`SurfaceMapper`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapperState {
    /// No valid input processed yet.
    Uninitialized,
    /// Input validated and points partitioned.
    Initialized,
    /// Free point values computed.
    Solved,
    /// Output map available.
    Finalized,
}

/// State produced by `initialize`.
#[derive(Debug, Clone)]
struct Working<I: MeshIndex> {
    surface: SurfaceMesh<I>,
    edges: EdgeTable<I>,
    values: MapValues<I>,
    mask: Vec<bool>,
    partition: PointPartition<I>,
}

/// Computes a surface map with fixed values at a subset of points.
///
/// Cloning a mapper deep-copies its input, working state and output.
///
/// # Example
///
/// ```
/// use surfmap::prelude::*;
/// use nalgebra::Point3;
///
/// // Hexagon with one interior point
/// let mut points = vec![Point3::new(0.0, 0.0, 0.0)];
/// for k in 0..6 {
///     let a = std::f64::consts::PI * k as f64 / 3.0;
///     points.push(Point3::new(a.cos(), a.sin(), 0.3));
/// }
/// let faces: Vec<[usize; 3]> = (0..6).map(|k| [0, k + 1, (k + 1) % 6 + 1]).collect();
/// let mesh: SurfaceMesh = SurfaceMesh::from_triangles(&points, &faces).unwrap();
///
/// // Boundary points keep their planar coordinates, the centre starts at (5, 5)
/// let mut input = MapValues::zeros(points.len(), 2);
/// for (i, p) in points.iter().enumerate().skip(1) {
///     input.set(VertexId::new(i), &[p.x, p.y]);
/// }
/// input.set(VertexId::new(0), &[5.0, 5.0]);
///
/// let mut mapper = SymmetricLinearMapper::new(SymmetricLinear::new(UniformWeight))
///     .with_mesh(mesh)
///     .with_input(input);
/// let map = mapper.run().unwrap();
///
/// let centre = map.evaluate(VertexId::new(0));
/// assert!(centre[0].abs() < 1e-10 && centre[1].abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct SurfaceMapper<S, I: MeshIndex = u32> {
    strategy: S,
    options: MapperOptions,
    mesh: Option<SurfaceMesh<I>>,
    input: Option<MapValues<I>>,
    mask: Option<Vec<bool>>,
    state: MapperState,
    working: Option<Working<I>>,
    report: Option<SolveReport>,
    output: Option<Box<dyn SurfaceMap<I>>>,
}

impl<S, I> SurfaceMapper<S, I>
where
    S: MapSolve<I>,
    I: MeshIndex,
{
    /// Create a mapper with the given strategy and default options.
    pub fn new(strategy: S) -> Self {
        Self {
            strategy,
            options: MapperOptions::default(),
            mesh: None,
            input: None,
            mask: None,
            state: MapperState::Uninitialized,
            working: None,
            report: None,
            output: None,
        }
    }

    /// Set the input surface mesh.
    pub fn with_mesh(mut self, mesh: SurfaceMesh<I>) -> Self {
        self.mesh = Some(mesh);
        self
    }

    /// Set the boundary conditions and initial guess, one value per point.
    pub fn with_input(mut self, values: MapValues<I>) -> Self {
        self.input = Some(values);
        self
    }

    /// Set the fixed point mask; `true` marks a point with prescribed value.
    pub fn with_mask(mut self, mask: Vec<bool>) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Set the mapper options.
    pub fn with_options(mut self, options: MapperOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the input surface mesh.
    pub fn set_mesh(&mut self, mesh: Option<SurfaceMesh<I>>) {
        self.mesh = mesh;
    }

    /// Replace the input values.
    pub fn set_input(&mut self, values: Option<MapValues<I>>) {
        self.input = values;
    }

    /// Replace the fixed point mask; `None` derives it from the mesh boundary.
    pub fn set_mask(&mut self, mask: Option<Vec<bool>>) {
        self.mask = mask;
    }

    /// Replace the mapper options.
    pub fn set_options(&mut self, options: MapperOptions) {
        self.options = options;
    }

    /// The input surface mesh.
    pub fn mesh(&self) -> Option<&SurfaceMesh<I>> {
        self.mesh.as_ref()
    }

    /// The input values.
    pub fn input(&self) -> Option<&MapValues<I>> {
        self.input.as_ref()
    }

    /// The mapper options.
    pub fn options(&self) -> &MapperOptions {
        &self.options
    }

    /// The solve strategy.
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Current execution state.
    pub fn state(&self) -> MapperState {
        self.state
    }

    // ==================== Execution ====================

    /// Initialize, solve and finalize.
    pub fn run(&mut self) -> Result<&dyn SurfaceMap<I>> {
        self.initialize()?;
        self.solve()?;
        self.finalize()
    }

    /// Validate the input and partition the surface points.
    ///
    /// Any previous output is discarded, also when validation fails.
    ///
    /// # Errors
    ///
    /// - [`MapError::MissingMesh`] if no mesh is set
    /// - [`MapError::NotASurface`] if the mesh has no faces
    /// - [`MapError::InvalidInputValues`] if the number of input values differs
    ///   from the number of points
    /// - [`MapError::InvalidMask`] if the mask length differs from the number of
    ///   points
    /// - [`MapError::MissingBoundaryConditions`] if no input values are set
    /// - [`MapError::InvalidState`] if the remesh hook leaves values or mask
    ///   inconsistent with the remeshed surface
    pub fn initialize(&mut self) -> Result<()> {
        self.output = None;
        self.report = None;
        self.working = None;
        self.state = MapperState::Uninitialized;

        let mesh = self.mesh.as_ref().ok_or(MapError::MissingMesh)?;
        if mesh.num_faces() == 0 {
            return Err(MapError::NotASurface);
        }
        let num_points = mesh.num_points();
        if let Some(input) = &self.input {
            if input.len() != num_points {
                return Err(MapError::InvalidInputValues {
                    expected: num_points,
                    actual: input.len(),
                });
            }
        }
        if let Some(mask) = &self.mask {
            if mask.len() != num_points {
                return Err(MapError::InvalidMask {
                    expected: num_points,
                    actual: mask.len(),
                });
            }
        }

        let mut surface = mesh.working_copy();
        let mut values = self
            .input
            .clone()
            .ok_or(MapError::MissingBoundaryConditions)?;
        let mut mask = self.mask.clone();

        if self.strategy.remesh(&mut surface, &mut values, &mut mask)? {
            log::debug!(
                "remeshed surface: {} -> {} points, {} faces",
                num_points,
                surface.num_points(),
                surface.num_faces()
            );
        }
        // Checked whatever the hook reports
        if values.len() != surface.num_points() {
            return Err(MapError::InvalidState(format!(
                "remeshing left {} values for {} points",
                values.len(),
                surface.num_points()
            )));
        }
        if mask.as_ref().is_some_and(|m| m.len() != surface.num_points()) {
            return Err(MapError::InvalidState(
                "remeshing left a mask of the wrong length".to_string(),
            ));
        }

        let edges = EdgeTable::new(&surface);
        let mask = mask.unwrap_or_else(|| edges.boundary_points());
        let partition = PointPartition::from_mask(&mask);

        log::debug!(
            "initialized surface map: {} fixed, {} free points",
            partition.num_fixed(),
            partition.num_free()
        );

        self.working = Some(Working {
            surface,
            edges,
            values,
            mask,
            partition,
        });
        self.state = MapperState::Initialized;
        Ok(())
    }

    /// Compute the values of the free points.
    ///
    /// The current values of the free points serve as initial guess, so solving
    /// again after a previous solve restarts from the previous solution. Fixed
    /// point values are never modified.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidState`] unless the mapper was initialized and
    /// not yet finalized.
    pub fn solve(&mut self) -> Result<&SolveReport> {
        if !matches!(self.state, MapperState::Initialized | MapperState::Solved) {
            return Err(MapError::InvalidState(format!(
                "cannot solve in state {:?}",
                self.state
            )));
        }
        let working = self
            .working
            .as_mut()
            .ok_or_else(|| MapError::InvalidState("missing initialized surface".to_string()))?;

        let report = self.strategy.solve(MapProblem {
            surface: &working.surface,
            edges: &working.edges,
            partition: &working.partition,
            values: &mut working.values,
            options: &self.options,
        });
        report.log(self.options.verbose);

        self.state = MapperState::Solved;
        Ok(&*self.report.insert(report))
    }

    /// Produce the output map.
    ///
    /// Does nothing if the output already exists.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidState`] if the mapper has not been solved.
    pub fn finalize(&mut self) -> Result<&dyn SurfaceMap<I>> {
        if !matches!(self.state, MapperState::Solved | MapperState::Finalized) {
            return Err(MapError::InvalidState(format!(
                "cannot finalize in state {:?}",
                self.state
            )));
        }
        let output = match self.output.take() {
            Some(output) => output,
            None => {
                let working = self.working.as_ref().ok_or_else(|| {
                    MapError::InvalidState("missing solved surface".to_string())
                })?;
                self.strategy
                    .build_output(&working.surface, &working.values)
                    .unwrap_or_else(|| {
                        Box::new(PiecewiseLinearMap::new(
                            working.surface.clone(),
                            working.values.clone(),
                        ))
                    })
            }
        };

        self.state = MapperState::Finalized;
        Ok(&**self.output.insert(output))
    }

    // ==================== Results ====================

    /// The output map, once finalized.
    pub fn output(&self) -> Option<&dyn SurfaceMap<I>> {
        self.output.as_deref()
    }

    /// Take ownership of the output map.
    pub fn take_output(&mut self) -> Option<Box<dyn SurfaceMap<I>>> {
        self.output.take()
    }

    /// Diagnostics of the last solve.
    pub fn last_report(&self) -> Option<&SolveReport> {
        self.report.as_ref()
    }

    /// Working copy of the surface mesh, once initialized.
    pub fn surface(&self) -> Option<&SurfaceMesh<I>> {
        self.working.as_ref().map(|w| &w.surface)
    }

    /// Edges of the working surface, once initialized.
    pub fn edges(&self) -> Option<&EdgeTable<I>> {
        self.working.as_ref().map(|w| &w.edges)
    }

    /// Current map values, once initialized.
    pub fn values(&self) -> Option<&MapValues<I>> {
        self.working.as_ref().map(|w| &w.values)
    }

    /// Effective fixed point mask, once initialized.
    pub fn fixed_mask(&self) -> Option<&[bool]> {
        self.working.as_ref().map(|w| w.mask.as_slice())
    }

    /// Partition of the surface points, once initialized.
    pub fn partition(&self) -> Option<&PointPartition<I>> {
        self.working.as_ref().map(|w| &w.partition)
    }

    /// Number of map value components.
    pub fn num_components(&self) -> usize {
        self.values()
            .or(self.input.as_ref())
            .map_or(0, |v| v.components())
    }

    /// Number of free points; zero before initialization.
    pub fn num_free_points(&self) -> usize {
        self.partition().map_or(0, |p| p.num_free())
    }

    /// Number of fixed points; zero before initialization.
    pub fn num_fixed_points(&self) -> usize {
        self.partition().map_or(0, |p| p.num_fixed())
    }

    /// Point ID of the free point in row `r`.
    pub fn free_point_id(&self, r: usize) -> Option<VertexId<I>> {
        self.partition()
            .and_then(|p| p.free_points().get(r).copied())
    }

    /// Point ID of the `k`-th fixed point.
    pub fn fixed_point_id(&self, k: usize) -> Option<VertexId<I>> {
        self.partition()
            .and_then(|p| p.fixed_points().get(k).copied())
    }

    /// Classification of a surface point.
    pub fn point_index(&self, v: VertexId<I>) -> Option<PointIndex> {
        self.partition()
            .filter(|p| v.index() < p.num_points())
            .map(|p| p.index_of(v))
    }

    /// Mask of the points on the topological boundary.
    ///
    /// Uses the working surface once initialized, the input mesh otherwise.
    pub fn boundary_mask(&self) -> Result<Vec<bool>> {
        match (&self.working, &self.mesh) {
            (Some(working), _) => Ok(working.edges.boundary_points()),
            (None, Some(mesh)) => Ok(EdgeTable::new(mesh).boundary_points()),
            (None, None) => Err(MapError::MissingMesh),
        }
    }
}
