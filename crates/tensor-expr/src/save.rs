// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Save policies: how an evaluated value is combined into the destination.
//!
//! Every assignment is parameterised by a policy. Element-wise engines call
//! [`SavePolicy::save`] once per destination cell. The dot engine instead
//! folds the policy into BLAS coefficients, `dst = alpha * product + beta *
//! dst`, which only exists for the policies implementing [`BlasPolicy`].

use blas_engine::Element;

/// Combines a computed value into a destination cell.
pub trait SavePolicy: Send + Sync + 'static {
    /// Short name used in log output.
    const NAME: &'static str;

    fn save<T: Element>(dst: &mut T, src: T);
}

/// Policies expressible as BLAS `alpha` / `beta` coefficients.
pub trait BlasPolicy: SavePolicy {
    const ALPHA_BLAS: f64;
    const BETA_BLAS: f64;
}

/// `dst = src`
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveTo;

/// `dst += src`
#[derive(Debug, Clone, Copy, Default)]
pub struct PlusTo;

/// `dst -= src`
#[derive(Debug, Clone, Copy, Default)]
pub struct MinusTo;

/// `dst *= src`
#[derive(Debug, Clone, Copy, Default)]
pub struct MulTo;

/// `dst /= src`
#[derive(Debug, Clone, Copy, Default)]
pub struct DivTo;

impl SavePolicy for SaveTo {
    const NAME: &'static str = "saveto";

    #[inline]
    fn save<T: Element>(dst: &mut T, src: T) {
        *dst = src;
    }
}

impl SavePolicy for PlusTo {
    const NAME: &'static str = "plusto";

    #[inline]
    fn save<T: Element>(dst: &mut T, src: T) {
        *dst = *dst + src;
    }
}

impl SavePolicy for MinusTo {
    const NAME: &'static str = "minusto";

    #[inline]
    fn save<T: Element>(dst: &mut T, src: T) {
        *dst = *dst - src;
    }
}

impl SavePolicy for MulTo {
    const NAME: &'static str = "multo";

    #[inline]
    fn save<T: Element>(dst: &mut T, src: T) {
        *dst = *dst * src;
    }
}

impl SavePolicy for DivTo {
    const NAME: &'static str = "divto";

    #[inline]
    fn save<T: Element>(dst: &mut T, src: T) {
        *dst = *dst / src;
    }
}

impl BlasPolicy for SaveTo {
    const ALPHA_BLAS: f64 = 1.0;
    const BETA_BLAS: f64 = 0.0;
}

impl BlasPolicy for PlusTo {
    const ALPHA_BLAS: f64 = 1.0;
    const BETA_BLAS: f64 = 1.0;
}

impl BlasPolicy for MinusTo {
    const ALPHA_BLAS: f64 = -1.0;
    const BETA_BLAS: f64 = 1.0;
}
