// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Static type inference over expression types.
//!
//! Each node's rank and device mask are associated constants of its type
//! (see [`crate::Exp`]), computed by structural recursion over the type
//! parameters. [`TypeCheck`] combines them with the destination's rank and
//! device. Its `ASSERT_*` constants are evaluated when an engine is
//! instantiated, so an ill-formed assignment is a compile error:
//!
//! ```compile_fail
//! use tensor_expr::{Cpu, Shape, Tensor, TensorAssign};
//!
//! let m = Tensor::<Cpu, 2, f32>::zeros(Shape::matrix(2, 2));
//! let v = Tensor::<Cpu, 1, f32>::zeros(Shape::vector(2));
//! let mut dst = Tensor::<Cpu, 2, f32>::zeros(Shape::matrix(2, 2));
//! // `&m + &v` has no `ShapeCheck<2>` impl: the rank-1 leaf only checks
//! // against rank 1, so the engine bound is unsatisfied.
//! dst.assign(&m + &v).unwrap();
//! ```
//!
//! ```compile_fail
//! use tensor_expr::{Cpu, Gpu, Shape, Tensor, TensorAssign};
//!
//! let g = Tensor::<Gpu, 1, f32>::zeros(Shape::vector(2));
//! let mut dst = Tensor::<Cpu, 1, f32>::zeros(Shape::vector(2));
//! // "expression device does not match destination device"
//! dst.assign(&g).unwrap();
//! ```
//!
//! Reductions must lower the rank. A rank-1 source has no `ShapeCheck<2>`
//! impl, and a scalar-only source fails `RED_PASS`:
//!
//! ```compile_fail
//! use tensor_expr::{Cpu, Evaluator, Shape, Tensor};
//!
//! let src = Tensor::<Cpu, 1, f32>::zeros(Shape::vector(3));
//! let mut dst = Tensor::<Cpu, 1, f32>::zeros(Shape::vector(3));
//! Evaluator::default().sum_rows(&mut dst, &src).unwrap();
//! ```
//!
//! ```compile_fail
//! use tensor_expr::{scalar, Cpu, Evaluator, Shape, Tensor};
//!
//! let mut dst = Tensor::<Cpu, 1, f64>::zeros(Shape::vector(3));
//! // "expression cannot be reduced to destination dimension"
//! Evaluator::default().max_rows(&mut dst, scalar(0.0f64) + scalar(1.0f64)).unwrap();
//! ```
//!
//! Dot products only accept policies with BLAS coefficients:
//!
//! ```compile_fail
//! use tensor_expr::{dot, Cpu, Shape, Tensor, TensorAssign};
//!
//! let a = Tensor::<Cpu, 2, f32>::zeros(Shape::matrix(2, 2));
//! let mut c = Tensor::<Cpu, 2, f32>::zeros(Shape::matrix(2, 2));
//! c.assign_mul(dot(&a, &a)).unwrap();
//! ```

use crate::Exp;
use blas_engine::Device;
use std::marker::PhantomData;

/// Rank sentinel for operands that disagree.
pub const DIM_MISMATCH: i32 = -1;

/// Rank of a binary map node.
///
/// A scalar (rank 0) side adopts the other side's rank; otherwise both
/// sides must agree.
pub const fn binary_dim(lhs: i32, rhs: i32) -> i32 {
    if lhs < 0 || rhs < 0 {
        DIM_MISMATCH
    } else if lhs == 0 {
        rhs
    } else if rhs == 0 || lhs == rhs {
        lhs
    } else {
        DIM_MISMATCH
    }
}

/// Rank of a dot node. Only matrix·matrix, vector·matrix and the outer
/// product of a transposed vector with a vector are defined.
pub const fn dot_dim(ldim: usize, rdim: usize, ltrans: bool) -> i32 {
    match (ldim, rdim, ltrans) {
        (2, 2, _) => 2,
        (1, 2, false) => 1,
        (1, 1, true) => 2,
        _ => DIM_MISMATCH,
    }
}

/// Compatibility of expression `E` with a rank-`DIM` destination on `D`.
pub struct TypeCheck<D, const DIM: usize, E>(PhantomData<(D, E)>);

impl<D: Device, const DIM: usize, E: Exp> TypeCheck<D, DIM, E> {
    /// Static rank of the expression.
    pub const EXP_DIM: i32 = E::DIM;
    /// Whether the expression can run on the destination's device.
    pub const DEV_PASS: bool = (E::DEV_MASK & D::DEV_MASK) != 0;
    /// Whether the expression can be mapped element-wise onto the destination.
    pub const MAP_PASS: bool =
        (Self::EXP_DIM == 0 || Self::EXP_DIM == DIM as i32) && Self::DEV_PASS;
    /// Whether the expression can be reduced onto the destination.
    pub const RED_PASS: bool = Self::EXP_DIM > DIM as i32 && Self::DEV_PASS;

    pub(crate) const ASSERT_MAP: () = {
        assert!(
            Self::EXP_DIM >= 0,
            "All tensors in an expression must share the same shape/type"
        );
        assert!(
            Self::DEV_PASS,
            "expression device does not match destination device"
        );
        assert!(
            Self::MAP_PASS,
            "expression does not meet dimension requirement"
        );
    };

    pub(crate) const ASSERT_REDUCE: () = {
        assert!(
            Self::EXP_DIM >= 0,
            "All tensors in an expression must share the same shape/type"
        );
        assert!(
            Self::DEV_PASS,
            "expression device does not match destination device"
        );
        assert!(
            Self::RED_PASS,
            "expression cannot be reduced to destination dimension"
        );
    };
}
