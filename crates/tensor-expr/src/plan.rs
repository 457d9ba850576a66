// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Plans: per-coordinate evaluators built from expressions.
//!
//! [`MakePlan`] turns an expression into a tree of plan nodes of the same
//! shape, children first. A plan only holds borrowed slices and constants,
//! so it is `Copy` and can be handed to several worker threads at once.
//! Coordinates are `(y, x)`: `x` indexes the lowest axis and `y` the
//! flattened outer axes.

use crate::op::{BinaryOp, UnaryOp};
use crate::{BinaryMapExp, Exp, ScalarExp, Tensor, TransposeExp, UnaryMapExp};
use blas_engine::{Device, Element};
use std::marker::PhantomData;

/// Read-only evaluator of an expression at a coordinate.
pub trait Plan: Copy + Send + Sync {
    type Elem: Element;

    fn eval(&self, y: usize, x: usize) -> Self::Elem;
}

/// Expressions that can be evaluated element by element.
///
/// Complex nodes (dot products) do not implement this trait, so they cannot
/// appear inside an element-wise expression.
pub trait MakePlan: Exp {
    type Plan: Plan<Elem = Self::Elem>;

    fn make_plan(&self) -> Self::Plan;
}

// ── Leaf ───────────────────────────────────────────────────────────

/// Reads `data[y * stride + x]`.
#[derive(Debug, Clone, Copy)]
pub struct TensorPlan<'a, T> {
    data: &'a [T],
    stride: usize,
}

impl<'a, T: Element> Plan for TensorPlan<'a, T> {
    type Elem = T;

    #[inline]
    fn eval(&self, y: usize, x: usize) -> T {
        self.data[y * self.stride + x]
    }
}

impl<'a, D: Device, const N: usize, T: Element> MakePlan for &'a Tensor<D, N, T> {
    type Plan = TensorPlan<'a, T>;

    fn make_plan(&self) -> TensorPlan<'a, T> {
        // Rank-1 tensors have a single row; the stride is elided.
        let stride = if N == 1 { 0 } else { self.stride() };
        TensorPlan {
            data: self.data(),
            stride,
        }
    }
}

/// Writable view of a destination buffer.
#[derive(Debug)]
pub struct TensorPlanMut<'a, T> {
    data: &'a mut [T],
    stride: usize,
}

impl<'a, T> TensorPlanMut<'a, T> {
    pub(crate) fn new(data: &'a mut [T], stride: usize) -> Self {
        Self { data, stride }
    }

    /// The destination cell at `(y, x)`.
    #[inline]
    pub fn eval_mut(&mut self, y: usize, x: usize) -> &mut T {
        &mut self.data[y * self.stride + x]
    }
}

impl<D: Device, const DIM: usize, T: Element> Tensor<D, DIM, T> {
    /// Writable plan over this tensor.
    pub fn plan_mut(&mut self) -> TensorPlanMut<'_, T> {
        let stride = self.stride();
        TensorPlanMut::new(self.data_mut(), stride)
    }
}

// ── Scalar ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct ScalarPlan<T> {
    value: T,
}

impl<T: Element> Plan for ScalarPlan<T> {
    type Elem = T;

    #[inline]
    fn eval(&self, _y: usize, _x: usize) -> T {
        self.value
    }
}

impl<T: Element> MakePlan for ScalarExp<T> {
    type Plan = ScalarPlan<T>;

    fn make_plan(&self) -> ScalarPlan<T> {
        ScalarPlan { value: self.value }
    }
}

// ── Maps ───────────────────────────────────────────────────────────

pub struct UnaryMapPlan<Op, P> {
    src: P,
    _op: PhantomData<fn() -> Op>,
}

impl<Op, P: Copy> Clone for UnaryMapPlan<Op, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Op, P: Copy> Copy for UnaryMapPlan<Op, P> {}

impl<Op: UnaryOp, P: Plan> Plan for UnaryMapPlan<Op, P> {
    type Elem = P::Elem;

    #[inline]
    fn eval(&self, y: usize, x: usize) -> P::Elem {
        Op::map(self.src.eval(y, x))
    }
}

impl<Op: UnaryOp, A: MakePlan> MakePlan for UnaryMapExp<Op, A> {
    type Plan = UnaryMapPlan<Op, A::Plan>;

    fn make_plan(&self) -> Self::Plan {
        UnaryMapPlan {
            src: self.src.make_plan(),
            _op: PhantomData,
        }
    }
}

pub struct BinaryMapPlan<Op, PA, PB> {
    lhs: PA,
    rhs: PB,
    _op: PhantomData<fn() -> Op>,
}

impl<Op, PA: Copy, PB: Copy> Clone for BinaryMapPlan<Op, PA, PB> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Op, PA: Copy, PB: Copy> Copy for BinaryMapPlan<Op, PA, PB> {}

impl<Op: BinaryOp, PA: Plan, PB: Plan<Elem = PA::Elem>> Plan for BinaryMapPlan<Op, PA, PB> {
    type Elem = PA::Elem;

    #[inline]
    fn eval(&self, y: usize, x: usize) -> PA::Elem {
        Op::map(self.lhs.eval(y, x), self.rhs.eval(y, x))
    }
}

impl<Op: BinaryOp, A: MakePlan, B: MakePlan<Elem = A::Elem>> MakePlan for BinaryMapExp<Op, A, B> {
    type Plan = BinaryMapPlan<Op, A::Plan, B::Plan>;

    fn make_plan(&self) -> Self::Plan {
        BinaryMapPlan {
            lhs: self.lhs.make_plan(),
            rhs: self.rhs.make_plan(),
            _op: PhantomData,
        }
    }
}

// ── Transpose ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct TransposePlan<P> {
    src: P,
}

impl<P: Plan> Plan for TransposePlan<P> {
    type Elem = P::Elem;

    #[inline]
    fn eval(&self, y: usize, x: usize) -> P::Elem {
        self.src.eval(x, y)
    }
}

impl<E: MakePlan> MakePlan for TransposeExp<E> {
    type Plan = TransposePlan<E::Plan>;

    fn make_plan(&self) -> Self::Plan {
        TransposePlan {
            src: self.exp.make_plan(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::Maximum;
    use crate::{binary, scalar, ExpExt, Shape};
    use blas_engine::Cpu;

    fn matrix(rows: usize, cols: usize, values: &[f32]) -> Tensor<Cpu, 2, f32> {
        Tensor::from_slice(Shape::matrix(rows, cols), values).unwrap()
    }

    #[test]
    fn test_tensor_plan_reads_row_major() {
        let a = matrix(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let p = (&a).make_plan();
        assert_eq!(p.eval(0, 2), 3.0);
        assert_eq!(p.eval(1, 0), 4.0);
    }

    #[test]
    fn test_vector_plan_ignores_row() {
        let v = Tensor::<Cpu, 1, f32>::from_slice(Shape::vector(3), &[7.0, 8.0, 9.0]).unwrap();
        let p = (&v).make_plan();
        assert_eq!(p.eval(0, 1), 8.0);
        assert_eq!(p.eval(5, 1), 8.0);
    }

    #[test]
    fn test_scalar_plan_is_constant() {
        let p = scalar(4.5f64).make_plan();
        assert_eq!(p.eval(0, 0), 4.5);
        assert_eq!(p.eval(100, 3), 4.5);
    }

    #[test]
    fn test_fused_plan() {
        let a = matrix(1, 3, &[1.0, -5.0, 3.0]);
        let b = matrix(1, 3, &[2.0, 2.0, 2.0]);
        let e = binary::<Maximum, _, _>(&a, &b) * scalar(10.0) - &a;
        let p = e.make_plan();
        assert_eq!(p.eval(0, 0), 19.0);
        assert_eq!(p.eval(0, 1), 25.0);
        assert_eq!(p.eval(0, 2), 27.0);
    }

    #[test]
    fn test_transpose_plan_swaps_coordinates() {
        let a = matrix(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let p = a.t().make_plan();
        assert_eq!(p.eval(2, 1), 6.0);
        assert_eq!(p.eval(0, 1), 4.0);
        let pp = a.t().t().make_plan();
        assert_eq!(pp.eval(1, 2), 6.0);
    }

    #[test]
    fn test_plan_mut_honours_stride() {
        let mut t = Tensor::<Cpu, 2, f32>::with_stride(Shape::matrix(2, 2), 3).unwrap();
        {
            let mut p = t.plan_mut();
            *p.eval_mut(1, 1) = 5.0;
        }
        assert_eq!(t.data()[4], 5.0);
        assert_eq!(t.get([1, 1]), Some(5.0));
    }
}
