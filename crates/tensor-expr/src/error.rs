// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for expression evaluation.

/// Runtime errors raised while checking or evaluating an expression.
///
/// Dimension and device mismatches never show up here: they are rejected
/// at compile time by [`crate::TypeCheck`]. What remains are properties
/// that depend on runtime extents.
#[derive(Debug, thiserror::Error)]
pub enum ExprError {
    /// Two operands (or an operand and the destination) disagree in shape.
    #[error("incompatible shapes for {op}: {lhs:?} vs {rhs:?}")]
    ShapeMismatch {
        op: &'static str,
        lhs: Vec<usize>,
        rhs: Vec<usize>,
    },

    /// The operands of a dot expression do not multiply into the destination.
    #[error("{op}: matrix shape mismatch (dst {dst:?}, lhs {lhs:?}, rhs {rhs:?})")]
    DotShapeMismatch {
        op: &'static str,
        dst: Vec<usize>,
        lhs: Vec<usize>,
        rhs: Vec<usize>,
    },

    /// The provided buffer length does not match the shape and stride.
    #[error("buffer size mismatch: expected {expected} elements, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// The row stride is shorter than the lowest extent.
    #[error("invalid stride {stride}: must be at least the lowest extent {cols}")]
    InvalidStride { stride: usize, cols: usize },

    /// The BLAS backend rejected its operands.
    #[error("blas error: {0}")]
    Blas(#[from] blas_engine::BlasError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}
