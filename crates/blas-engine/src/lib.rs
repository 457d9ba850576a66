// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # blas-engine
//!
//! The low-level collaborators of the `tensor-expr` evaluation core:
//!
//! - [`Device`]: zero-sized execution-target tags carrying a compile-time
//!   capability mask ([`Cpu`], [`Gpu`]).
//! - [`Element`] / [`DType`]: the numeric element types an expression can
//!   produce (`f32`, `f64`).
//! - [`BlasEngine`]: column-major `gemm` / `gemv` / `ger`, parameterised
//!   over the device. The [`Cpu`] backend runs on `ndarray`'s
//!   `general_mat_mul` over strided views, so no system BLAS is required.
//!
//! # Column-major convention
//! Every routine follows reference BLAS semantics: matrices are column-major
//! with an explicit leading dimension, vectors carry an increment. Row-major
//! callers swap operands and transpose flags instead of copying data.

mod blas;
mod device;
mod dtype;
mod error;

pub use blas::BlasEngine;
pub use device::{Cpu, Device, Gpu, HostDevice, ALL_DEVICES};
pub use dtype::{DType, Element};
pub use error::BlasError;
