//! Error types for surfmap.
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Result type alias using [`MapError`].
pub type Result<T> = std::result::Result<T, MapError>;

/// Errors that can occur while building meshes or computing surface maps.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapError {
    /// A mesh was built from an empty face list.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has duplicate vertex indices (degenerate triangle).
    #[error("face {face} is degenerate (has duplicate vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// No surface mesh was given to the mapper.
    #[error("missing input surface mesh")]
    MissingMesh,

    /// The input point set has no faces and therefore is not a surface.
    #[error("input point set must be a surface mesh")]
    NotASurface,

    /// No boundary condition values were given to the mapper.
    #[error("missing boundary conditions")]
    MissingBoundaryConditions,

    /// The input map values do not match the number of mesh points.
    #[error("invalid input map values array: expected {expected} tuples, got {actual}")]
    InvalidInputValues {
        /// Number of mesh points.
        expected: usize,
        /// Number of value tuples given.
        actual: usize,
    },

    /// The fixed point mask does not match the number of mesh points.
    #[error("invalid input mask: expected {expected} entries, got {actual}")]
    InvalidMask {
        /// Number of mesh points.
        expected: usize,
        /// Number of mask entries given.
        actual: usize,
    },

    /// Invalid mapper state for the requested operation.
    #[error("invalid mapper state: {0}")]
    InvalidState(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MapError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MapError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Whether this error stems from invalid mapper input.
    ///
    /// These are the errors detected by [`SurfaceMapper::initialize`]; the caller
    /// decides whether to abort or retry with corrected input.
    ///
    /// [`SurfaceMapper::initialize`]: crate::map::SurfaceMapper::initialize
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            MapError::MissingMesh
                | MapError::NotASurface
                | MapError::MissingBoundaryConditions
                | MapError::InvalidInputValues { .. }
                | MapError::InvalidMask { .. }
        )
    }
}
