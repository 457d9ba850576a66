// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Shape-making extensions.
//!
//! A [`MakeTensorExp`] wraps an extension that reads a source expression
//! and presents it under a new shape of its own. The node takes part in
//! fusion like any map node: its rank is its own as long as the source is
//! well-formed, its device mask is the source's, shape checking reports the
//! stored shape, and its plan is whatever the extension builds.
//!
//! New extensions implement [`MakeTensor`]. Two ship with the crate:
//! [`repmat`] (repeat a vector as the rows of a matrix) and [`reshape`]
//! (reinterpret the row-major element order under another shape).
//!
//! ```
//! use tensor_expr::{repmat, Cpu, Shape, Tensor, TensorAssign};
//!
//! let x = Tensor::<Cpu, 2, f32>::from_slice(Shape::matrix(2, 3), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
//! let bias = Tensor::<Cpu, 1, f32>::from_slice(Shape::vector(3), &[10.0, 20.0, 30.0]).unwrap();
//! let mut y = Tensor::<Cpu, 2, f32>::zeros(Shape::matrix(2, 3));
//!
//! y.assign(&x + repmat(&bias, 2).unwrap()).unwrap();
//! assert_eq!(y.to_vec(), vec![11.0, 22.0, 33.0, 14.0, 25.0, 36.0]);
//! ```

use crate::infer::DIM_MISMATCH;
use crate::plan::{MakePlan, Plan};
use crate::{Chainer, Exp, ExprError, Shape, ShapeCheck};

/// An extension that evaluates some source expression under a new shape.
pub trait MakeTensor: Copy {
    /// The expression the extension reads from.
    type Src: Exp;
    type Plan: Plan<Elem = <Self::Src as Exp>::Elem>;

    fn make_plan(&self) -> Self::Plan;
}

/// Node wrapping a [`MakeTensor`] extension together with its result shape.
#[derive(Debug, Clone, Copy)]
pub struct MakeTensorExp<X, const N: usize> {
    ext: X,
    shape: Shape<N>,
}

impl<X: MakeTensor, const N: usize> MakeTensorExp<X, N> {
    /// Wraps `ext`, which must produce values for every coordinate of `shape`.
    pub fn new(ext: X, shape: Shape<N>) -> Self {
        Self { ext, shape }
    }

    /// The shape this node presents.
    pub fn shape(&self) -> &Shape<N> {
        &self.shape
    }

    pub fn ext(&self) -> &X {
        &self.ext
    }
}

impl<X: MakeTensor, const N: usize> Exp for MakeTensorExp<X, N> {
    type Elem = <X::Src as Exp>::Elem;
    type Kind = Chainer;
    const DIM: i32 = if <X::Src as Exp>::DIM >= 0 {
        N as i32
    } else {
        DIM_MISMATCH
    };
    const DEV_MASK: u32 = <X::Src as Exp>::DEV_MASK;
}

impl<X: MakeTensor, const N: usize> ShapeCheck<N> for MakeTensorExp<X, N> {
    fn check_shape(&self) -> Result<Option<Shape<N>>, ExprError> {
        Ok(Some(self.shape))
    }
}

impl<X: MakeTensor, const N: usize> MakePlan for MakeTensorExp<X, N> {
    type Plan = X::Plan;

    fn make_plan(&self) -> X::Plan {
        MakeTensor::make_plan(&self.ext)
    }
}

/// Shape of a source that must not be a scalar-only expression.
fn source_shape<const S: usize, E: ShapeCheck<S>>(
    src: &E,
    op: &'static str,
    wanted: Vec<usize>,
) -> Result<Shape<S>, ExprError> {
    src.check_shape()?.ok_or_else(|| ExprError::ShapeMismatch {
        op,
        lhs: wanted,
        rhs: Vec::new(),
    })
}

// ── repmat ─────────────────────────────────────────────────────────

/// Repeats a rank-1 source as every row of a matrix.
#[derive(Debug, Clone, Copy)]
pub struct Repmat<E> {
    src: E,
}

#[derive(Debug, Clone, Copy)]
pub struct RepmatPlan<P> {
    src: P,
}

impl<P: Plan> Plan for RepmatPlan<P> {
    type Elem = P::Elem;

    #[inline]
    fn eval(&self, _y: usize, x: usize) -> P::Elem {
        self.src.eval(0, x)
    }
}

impl<E: MakePlan> MakeTensor for Repmat<E> {
    type Src = E;
    type Plan = RepmatPlan<E::Plan>;

    fn make_plan(&self) -> Self::Plan {
        RepmatPlan {
            src: self.src.make_plan(),
        }
    }
}

/// A `rows x len` matrix whose every row is the rank-1 expression `src`.
///
/// Fails with [`ExprError::ShapeMismatch`] (`op: "repmat"`) when `src` has
/// no extent of its own, i.e. is built from scalars only.
pub fn repmat<E>(src: E, rows: usize) -> Result<MakeTensorExp<Repmat<E>, 2>, ExprError>
where
    E: MakePlan + ShapeCheck<1>,
{
    let len = source_shape(&src, "repmat", vec![rows])?.lowest();
    Ok(MakeTensorExp::new(Repmat { src }, Shape::matrix(rows, len)))
}

// ── reshape ────────────────────────────────────────────────────────

/// Reads a source in row-major order under another shape.
#[derive(Debug, Clone, Copy)]
pub struct Reshape<E> {
    src: E,
    cols: usize,
    src_cols: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct ReshapePlan<P> {
    src: P,
    cols: usize,
    src_cols: usize,
}

impl<P: Plan> Plan for ReshapePlan<P> {
    type Elem = P::Elem;

    #[inline]
    fn eval(&self, y: usize, x: usize) -> P::Elem {
        let i = y * self.cols + x;
        self.src.eval(i / self.src_cols, i % self.src_cols)
    }
}

impl<E: MakePlan> MakeTensor for Reshape<E> {
    type Src = E;
    type Plan = ReshapePlan<E::Plan>;

    fn make_plan(&self) -> Self::Plan {
        ReshapePlan {
            src: self.src.make_plan(),
            cols: self.cols,
            src_cols: self.src_cols,
        }
    }
}

/// Views the rank-`S` expression `src` as a rank-`N` expression of `shape`.
///
/// The element counts must agree; otherwise [`ExprError::ShapeMismatch`]
/// (`op: "reshape"`) is returned. Nothing is copied: the source is read
/// through its own plan at the matching row-major position.
///
/// # Examples
/// ```
/// use tensor_expr::{reshape, Cpu, Shape, Tensor, TensorAssign};
///
/// let v = Tensor::<Cpu, 1, f64>::from_slice(Shape::vector(6), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
/// let mut m = Tensor::<Cpu, 2, f64>::zeros(Shape::matrix(3, 2));
/// m.assign(reshape(&v, Shape::matrix(3, 2)).unwrap()).unwrap();
/// assert_eq!(m.get([2, 0]), Some(5.0));
/// ```
pub fn reshape<E, const S: usize, const N: usize>(
    src: E,
    shape: Shape<N>,
) -> Result<MakeTensorExp<Reshape<E>, N>, ExprError>
where
    E: MakePlan + ShapeCheck<S>,
{
    let from = source_shape(&src, "reshape", shape.to_vec())?;
    if from.num_elements() != shape.num_elements() {
        return Err(ExprError::ShapeMismatch {
            op: "reshape",
            lhs: shape.to_vec(),
            rhs: from.to_vec(),
        });
    }
    let ext = Reshape {
        src,
        cols: shape.flat_2d().1,
        src_cols: from.flat_2d().1,
    };
    Ok(MakeTensorExp::new(ext, shape))
}
