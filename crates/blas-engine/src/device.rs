// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Execution-target tags.
//!
//! A device is a zero-sized marker type. Its capability mask is an
//! associated constant, so device compatibility of an expression is a
//! property of the expression's type and is decided at compile time.

use std::fmt;

/// Mask carried by device-agnostic expression nodes (scalars).
pub const ALL_DEVICES: u32 = 0xffff;

/// A compute target.
pub trait Device: Copy + Default + fmt::Debug + Send + Sync + 'static {
    /// Capability bitmask. Two operands are compatible when their masks
    /// intersect.
    const DEV_MASK: u32;
    /// Short human-readable name, used in log output.
    const NAME: &'static str;
}

/// Devices whose buffers live in host memory and can be walked by the
/// generic element-wise evaluator.
pub trait HostDevice: Device {}

/// The host CPU.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Cpu;

impl Device for Cpu {
    const DEV_MASK: u32 = 1 << 0;
    const NAME: &'static str = "cpu";
}

impl HostDevice for Cpu {}

/// A CUDA-class accelerator.
///
/// Only the tag exists: it takes part in static device checks, but no
/// evaluator or BLAS backend is provided for it, so assigning into a
/// `Gpu` tensor is rejected by the type checker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Gpu;

impl Device for Gpu {
    const DEV_MASK: u32 = 1 << 1;
    const NAME: &'static str = "gpu";
}
