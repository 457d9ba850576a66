// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor shape descriptors.

use std::fmt;

/// The extents of a rank-`DIM` tensor, outermost axis first.
///
/// The rank is part of the type, so expressions over tensors of different
/// rank are told apart by the compiler. Axis `DIM - 1` is the lowest
/// (contiguous) axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape<const DIM: usize> {
    dims: [usize; DIM],
}

impl<const DIM: usize> Shape<DIM> {
    /// Creates a new shape from the given extents.
    ///
    /// # Examples
    /// ```
    /// use tensor_expr::Shape;
    /// let s = Shape::new([2, 3, 4]);
    /// assert_eq!(s.rank(), 3);
    /// assert_eq!(s.num_elements(), 24);
    /// ```
    pub const fn new(dims: [usize; DIM]) -> Self {
        Self { dims }
    }

    /// Returns the number of axes.
    pub const fn rank(&self) -> usize {
        DIM
    }

    /// Returns the total number of elements (1 for rank 0).
    pub fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }

    /// Returns the extents as a slice.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Returns the extent of one axis, or `None` if out of bounds.
    pub fn dim(&self, index: usize) -> Option<usize> {
        self.dims.get(index).copied()
    }

    /// Extent of the lowest axis (1 for rank 0).
    pub fn lowest(&self) -> usize {
        self.dims.last().copied().unwrap_or(1)
    }

    /// Collapses the shape to `(rows, cols)`: `cols` is the lowest extent
    /// and `rows` the product of every other axis.
    pub fn flat_2d(&self) -> (usize, usize) {
        match self.dims.split_last() {
            Some((&cols, outer)) => (outer.iter().product(), cols),
            None => (1, 1),
        }
    }

    /// Returns the shape with its two lowest axes swapped.
    ///
    /// Shapes of rank below 2 are returned unchanged.
    pub fn transposed(mut self) -> Self {
        if DIM >= 2 {
            self.dims.swap(DIM - 2, DIM - 1);
        }
        self
    }

    /// Returns the extents as an owned vector (used in error reports).
    pub fn to_vec(&self) -> Vec<usize> {
        self.dims.to_vec()
    }
}

impl Shape<1> {
    /// Creates a 1-D shape.
    pub const fn vector(len: usize) -> Self {
        Self::new([len])
    }
}

impl Shape<2> {
    /// Creates a 2-D shape (matrix).
    pub const fn matrix(rows: usize, cols: usize) -> Self {
        Self::new([rows, cols])
    }

    pub const fn rows(&self) -> usize {
        self.dims[0]
    }

    pub const fn cols(&self) -> usize {
        self.dims[1]
    }
}

impl<const DIM: usize> fmt::Display for Shape<DIM> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}

/// Convenience: `Shape::from([2, 3])`.
impl<const DIM: usize> From<[usize; DIM]> for Shape<DIM> {
    fn from(dims: [usize; DIM]) -> Self {
        Self::new(dims)
    }
}
