// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Element-wise operators applied by map expressions.
//!
//! Operators are zero-sized types: the function is chosen by type, so a
//! fused expression compiles down to straight-line arithmetic. `map` must
//! be pure. The evaluator calls it once per destination cell in any order,
//! possibly from several threads.
//!
//! User-defined operators just implement [`BinaryOp`] or [`UnaryOp`]:
//!
//! ```
//! use tensor_expr::op::BinaryOp;
//! use tensor_expr::Element;
//!
//! struct Hypot;
//!
//! impl BinaryOp for Hypot {
//!     fn map<T: Element>(a: T, b: T) -> T {
//!         (a * a + b * b).sqrt()
//!     }
//! }
//! ```

use blas_engine::Element;

/// A pure function of two elements.
pub trait BinaryOp {
    fn map<T: Element>(a: T, b: T) -> T;
}

/// A pure function of one element.
pub trait UnaryOp {
    fn map<T: Element>(a: T) -> T;
}

/// `a + b`
#[derive(Debug, Clone, Copy, Default)]
pub struct Plus;

/// `a - b`
#[derive(Debug, Clone, Copy, Default)]
pub struct Minus;

/// `a * b`
#[derive(Debug, Clone, Copy, Default)]
pub struct Mul;

/// `a / b`
#[derive(Debug, Clone, Copy, Default)]
pub struct Div;

/// `max(a, b)`
#[derive(Debug, Clone, Copy, Default)]
pub struct Maximum;

/// `min(a, b)`
#[derive(Debug, Clone, Copy, Default)]
pub struct Minimum;

impl BinaryOp for Plus {
    #[inline]
    fn map<T: Element>(a: T, b: T) -> T {
        a + b
    }
}

impl BinaryOp for Minus {
    #[inline]
    fn map<T: Element>(a: T, b: T) -> T {
        a - b
    }
}

impl BinaryOp for Mul {
    #[inline]
    fn map<T: Element>(a: T, b: T) -> T {
        a * b
    }
}

impl BinaryOp for Div {
    #[inline]
    fn map<T: Element>(a: T, b: T) -> T {
        a / b
    }
}

impl BinaryOp for Maximum {
    #[inline]
    fn map<T: Element>(a: T, b: T) -> T {
        if a > b {
            a
        } else {
            b
        }
    }
}

impl BinaryOp for Minimum {
    #[inline]
    fn map<T: Element>(a: T, b: T) -> T {
        if a < b {
            a
        } else {
            b
        }
    }
}

/// `a`
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

/// `-a`
#[derive(Debug, Clone, Copy, Default)]
pub struct Negate;

/// `a * a`
#[derive(Debug, Clone, Copy, Default)]
pub struct Square;

/// `sqrt(a)`
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqrt;

/// `e^a`
#[derive(Debug, Clone, Copy, Default)]
pub struct Exp;

/// `ln(a)`
#[derive(Debug, Clone, Copy, Default)]
pub struct Log;

/// `|a|`
#[derive(Debug, Clone, Copy, Default)]
pub struct Abs;

impl UnaryOp for Identity {
    #[inline]
    fn map<T: Element>(a: T) -> T {
        a
    }
}

impl UnaryOp for Negate {
    #[inline]
    fn map<T: Element>(a: T) -> T {
        -a
    }
}

impl UnaryOp for Square {
    #[inline]
    fn map<T: Element>(a: T) -> T {
        a * a
    }
}

impl UnaryOp for Sqrt {
    #[inline]
    fn map<T: Element>(a: T) -> T {
        a.sqrt()
    }
}

impl UnaryOp for Exp {
    #[inline]
    fn map<T: Element>(a: T) -> T {
        a.exp()
    }
}

impl UnaryOp for Log {
    #[inline]
    fn map<T: Element>(a: T) -> T {
        a.ln()
    }
}

impl UnaryOp for Abs {
    #[inline]
    fn map<T: Element>(a: T) -> T {
        a.abs()
    }
}
