// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-expr
//!
//! Fused, compile-time expression evaluation for tensors.
//!
//! Arithmetic on tensor references builds an expression value instead of a
//! result. Assigning that expression into a destination evaluates the whole
//! tree in one pass over the destination, with no temporaries:
//!
//! ```
//! use tensor_expr::op::Maximum;
//! use tensor_expr::{binary, Cpu, Shape, Tensor, TensorAssign};
//!
//! let b = Tensor::<Cpu, 1, f32>::from_slice(Shape::vector(3), &[2.0, 3.0, 4.0]).unwrap();
//! let c = Tensor::<Cpu, 1, f32>::from_slice(Shape::vector(3), &[3.0, 4.0, 5.0]).unwrap();
//! let mut a = Tensor::<Cpu, 1, f32>::zeros(Shape::vector(3));
//!
//! a.assign(&b * binary::<Maximum, _, _>(&c, &b)).unwrap();
//! assert_eq!(a.to_vec(), vec![6.0, 12.0, 20.0]);
//! ```
//!
//! This crate provides:
//! - [`Tensor`] and [`Shape`]: the row-major, optionally row-padded container.
//! - Expression nodes ([`ScalarExp`], [`UnaryMapExp`], [`BinaryMapExp`],
//!   [`TransposeExp`], [`DotExp`]) and the operators in [`op`].
//! - Shape-making extensions ([`MakeTensorExp`], [`repmat`], [`reshape`]).
//! - Static rank and device checking ([`TypeCheck`]) and runtime shape
//!   checking ([`ShapeCheck`]).
//! - The element-wise engine ([`engine::map_exp`]), the dot engine
//!   ([`dot::ComplexEngine`]) and column reductions ([`reduce`]).
//! - [`Evaluator`] / [`TensorAssign`]: the assignment entry points, with
//!   the accumulation policies of [`save`].
//!
//! # Design Goals
//! - Rank and device mismatches are compile errors, not runtime errors.
//! - Every runtime check runs before the destination is written.
//! - Matrix products go straight to BLAS on the operands' own buffers.

mod config;
mod error;
mod evaluator;
mod expr;
mod infer;
mod proptests;
mod shape;
mod shape_check;
mod tensor;

pub mod dot;
pub mod engine;
pub mod extend;
pub mod op;
pub mod plan;
pub mod reduce;
pub mod save;

pub use blas_engine::{Cpu, DType, Device, Element, Gpu, HostDevice};
pub use config::{EvalConfig, DEFAULT_PARALLEL_THRESHOLD};
pub use error::ExprError;
pub use evaluator::{Evaluator, TensorAssign};
pub use expr::{
    binary, dot, scalar, unary, BinaryMapExp, Chainer, Complex, Container, Dot, DotExp, Exp,
    ExpExt, ExpKind, Mapper, ScalarExp, TransposeExp, UnaryMapExp,
};
pub use extend::{repmat, reshape, MakeTensor, MakeTensorExp};
pub use infer::{binary_dim, dot_dim, TypeCheck, DIM_MISMATCH};
pub use shape::Shape;
pub use shape_check::ShapeCheck;
pub use tensor::Tensor;

/// Everything needed to build and assign expressions.
pub mod prelude {
    pub use crate::{
        binary, dot, repmat, reshape, scalar, unary, Cpu, EvalConfig, Evaluator, Exp, ExpExt,
        ExprError, Shape, Tensor, TensorAssign,
    };
}
