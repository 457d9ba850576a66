// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime shape derivation over an expression tree.

use crate::{BinaryMapExp, ExprError, ScalarExp, Shape, Tensor, TransposeExp, UnaryMapExp};
use blas_engine::{Device, Element};

/// Derives the shape an expression produces when viewed at rank `DIM`.
///
/// `Ok(None)` is the broadcast marker: the expression (a scalar, or a tree
/// of scalars) fits any destination shape.
pub trait ShapeCheck<const DIM: usize> {
    fn check_shape(&self) -> Result<Option<Shape<DIM>>, ExprError>;
}

impl<'a, D: Device, const DIM: usize, T: Element> ShapeCheck<DIM> for &'a Tensor<D, DIM, T> {
    fn check_shape(&self) -> Result<Option<Shape<DIM>>, ExprError> {
        Ok(Some(*self.shape()))
    }
}

impl<const DIM: usize, T: Element> ShapeCheck<DIM> for ScalarExp<T> {
    fn check_shape(&self) -> Result<Option<Shape<DIM>>, ExprError> {
        Ok(None)
    }
}

impl<const DIM: usize, Op, A: ShapeCheck<DIM>> ShapeCheck<DIM> for UnaryMapExp<Op, A> {
    fn check_shape(&self) -> Result<Option<Shape<DIM>>, ExprError> {
        self.src.check_shape()
    }
}

impl<const DIM: usize, Op, A: ShapeCheck<DIM>, B: ShapeCheck<DIM>> ShapeCheck<DIM>
    for BinaryMapExp<Op, A, B>
{
    fn check_shape(&self) -> Result<Option<Shape<DIM>>, ExprError> {
        match (self.lhs.check_shape()?, self.rhs.check_shape()?) {
            (None, rhs) => Ok(rhs),
            (lhs, None) => Ok(lhs),
            (Some(lhs), Some(rhs)) if lhs == rhs => Ok(Some(lhs)),
            (Some(lhs), Some(rhs)) => Err(ExprError::ShapeMismatch {
                op: "binary map",
                lhs: lhs.to_vec(),
                rhs: rhs.to_vec(),
            }),
        }
    }
}

struct TransposeRank<const DIM: usize>;

impl<const DIM: usize> TransposeRank<DIM> {
    const ASSERT: () = assert!(DIM == 2, "transpose inside a map requires rank 2");
}

impl<const DIM: usize, E: ShapeCheck<DIM>> ShapeCheck<DIM> for TransposeExp<E> {
    fn check_shape(&self) -> Result<Option<Shape<DIM>>, ExprError> {
        let () = TransposeRank::<DIM>::ASSERT;
        Ok(self.exp.check_shape()?.map(Shape::transposed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{scalar, ExpExt};
    use blas_engine::Cpu;

    fn mat(rows: usize, cols: usize) -> Tensor<Cpu, 2, f32> {
        Tensor::zeros(Shape::matrix(rows, cols))
    }

    #[test]
    fn test_leaf_and_scalar() {
        let a = mat(2, 3);
        assert_eq!((&a).check_shape().unwrap(), Some(Shape::matrix(2, 3)));
        assert_eq!(ShapeCheck::<2>::check_shape(&scalar(1.0f32)).unwrap(), None);
    }

    #[test]
    fn test_scalar_broadcasts() {
        let a = mat(2, 3);
        let e = &a * scalar(2.0);
        assert_eq!(e.check_shape().unwrap(), Some(Shape::matrix(2, 3)));
        let e = scalar(2.0) + &a;
        assert_eq!(e.check_shape().unwrap(), Some(Shape::matrix(2, 3)));
    }

    #[test]
    fn test_scalar_tree_stays_broadcast() {
        let e = scalar(1.0f32) + scalar(2.0);
        assert_eq!(ShapeCheck::<2>::check_shape(&e).unwrap(), None);
    }

    #[test]
    fn test_transpose_swaps() {
        let a = mat(2, 3);
        assert_eq!(a.t().check_shape().unwrap(), Some(Shape::matrix(3, 2)));
        assert_eq!(a.t().t().check_shape().unwrap(), Some(Shape::matrix(2, 3)));
    }

    #[test]
    fn test_mismatch_reports_both_shapes() {
        let a = mat(2, 3);
        let b = mat(3, 2);
        let err = (&a + &b).check_shape().unwrap_err();
        match err {
            ExprError::ShapeMismatch { op, lhs, rhs } => {
                assert_eq!(op, "binary map");
                assert_eq!(lhs, vec![2, 3]);
                assert_eq!(rhs, vec![3, 2]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_transpose_resolves_mismatch() {
        let a = mat(2, 3);
        let b = mat(3, 2);
        assert_eq!((&a + b.t()).check_shape().unwrap(), Some(Shape::matrix(2, 3)));
    }

    #[test]
    fn test_nested_mismatch_propagates() {
        let a = mat(2, 2);
        let b = mat(2, 3);
        let e = -(&a * scalar(3.0)) + (&b - &b);
        assert!(e.check_shape().is_err());
    }
}
