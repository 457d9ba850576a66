// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for BLAS routines.

/// Errors raised by a [`crate::BlasEngine`] backend.
#[derive(Debug, thiserror::Error)]
pub enum BlasError {
    /// The buffer, extents and leading dimension do not describe a valid
    /// non-overlapping strided view.
    #[error("invalid operand layout for {op}: {detail}")]
    InvalidLayout { op: &'static str, detail: String },
}
