//! Partition of mesh points into fixed and free points.

use crate::mesh::{MeshIndex, VertexId};

/// Position of a mesh point within the fixed or free point list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointIndex {
    /// Index into the list of fixed points.
    Fixed(usize),
    /// Index into the list of free points, i.e. the row of the linear system.
    Free(usize),
}

impl PointIndex {
    /// Row of the linear system, if the point is free.
    #[inline]
    pub fn free(self) -> Option<usize> {
        match self {
            PointIndex::Free(r) => Some(r),
            PointIndex::Fixed(_) => None,
        }
    }

    /// Whether the point has a prescribed value.
    #[inline]
    pub fn is_fixed(self) -> bool {
        matches!(self, PointIndex::Fixed(_))
    }
}

/// Disjoint, ordered lists of fixed and free points with a reverse lookup.
///
/// Both lists are in ascending point ID order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointPartition<I: MeshIndex = u32> {
    fixed: Vec<VertexId<I>>,
    free: Vec<VertexId<I>>,
    index: Vec<PointIndex>,
}

impl<I: MeshIndex> PointPartition<I> {
    /// Partition points by a mask in which `true` marks a fixed point.
    pub fn from_mask(mask: &[bool]) -> Self {
        let num_fixed = mask.iter().filter(|&&m| m).count();
        let mut fixed = Vec::with_capacity(num_fixed);
        let mut free = Vec::with_capacity(mask.len() - num_fixed);
        let index = mask
            .iter()
            .enumerate()
            .map(|(i, &is_fixed)| {
                if is_fixed {
                    fixed.push(VertexId::new(i));
                    PointIndex::Fixed(fixed.len() - 1)
                } else {
                    free.push(VertexId::new(i));
                    PointIndex::Free(free.len() - 1)
                }
            })
            .collect();

        Self { fixed, free, index }
    }

    /// Get the total number of points.
    #[inline]
    pub fn num_points(&self) -> usize {
        self.index.len()
    }

    /// Get the number of fixed points.
    #[inline]
    pub fn num_fixed(&self) -> usize {
        self.fixed.len()
    }

    /// Get the number of free points.
    #[inline]
    pub fn num_free(&self) -> usize {
        self.free.len()
    }

    /// Get the classification of a point.
    #[inline]
    pub fn index_of(&self, v: VertexId<I>) -> PointIndex {
        self.index[v.index()]
    }

    /// Row of the linear system for a point, if it is free.
    #[inline]
    pub fn free_index(&self, v: VertexId<I>) -> Option<usize> {
        self.index_of(v).free()
    }

    /// Whether a point is fixed.
    #[inline]
    pub fn is_fixed(&self, v: VertexId<I>) -> bool {
        self.index_of(v).is_fixed()
    }

    /// Point ID of the free point in row `r`.
    #[inline]
    pub fn free_point(&self, r: usize) -> VertexId<I> {
        self.free[r]
    }

    /// Point ID of the `k`-th fixed point.
    #[inline]
    pub fn fixed_point(&self, k: usize) -> VertexId<I> {
        self.fixed[k]
    }

    /// All free points in row order.
    pub fn free_points(&self) -> &[VertexId<I>] {
        &self.free
    }

    /// All fixed points.
    pub fn fixed_points(&self) -> &[VertexId<I>] {
        &self.fixed
    }
}
