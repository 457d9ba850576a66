// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Reductions of a matrix expression onto a vector, keeping the lowest axis.
//!
//! `dst[x] SV= scale * reduce_y exp(y, x)`, e.g. the column sums of a
//! fused expression without materialising the expression first.

use crate::plan::{MakePlan, Plan};
use crate::save::SavePolicy;
use crate::{ExprError, ShapeCheck, Tensor, TypeCheck};
use blas_engine::{Element, HostDevice};

/// An associative reduction with an identity element.
pub trait ReduceOp {
    const NAME: &'static str;

    fn identity<T: Element>() -> T;

    fn reduce<T: Element>(acc: T, value: T) -> T;
}

/// Sum reducer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sum;

/// Maximum reducer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Maximum;

impl ReduceOp for Sum {
    const NAME: &'static str = "sum";

    #[inline]
    fn identity<T: Element>() -> T {
        T::ZERO
    }

    #[inline]
    fn reduce<T: Element>(acc: T, value: T) -> T {
        acc + value
    }
}

impl ReduceOp for Maximum {
    const NAME: &'static str = "max";

    #[inline]
    fn identity<T: Element>() -> T {
        T::MIN
    }

    #[inline]
    fn reduce<T: Element>(acc: T, value: T) -> T {
        acc.max(value)
    }
}

/// Reduces every column of the rank-2 expression `exp` into `dst`.
///
/// The lowest extent of `exp` must equal `dst`'s length; otherwise
/// [`ExprError::ShapeMismatch`] is returned and `dst` is left untouched.
/// Expressions whose rank does not exceed the destination's fail to compile,
/// which includes scalar-only expressions:
///
/// ```compile_fail
/// use tensor_expr::{scalar, Cpu, Evaluator, Shape, Tensor};
///
/// let mut v = Tensor::<Cpu, 1, f32>::zeros(Shape::vector(3));
/// // "expression cannot be reduced to destination dimension"
/// Evaluator::default().sum_rows(&mut v, scalar(1.0f32)).unwrap();
/// ```
pub fn map_reduce_keep_lowest<SV, R, D, T, E>(
    dst: &mut Tensor<D, 1, T>,
    exp: E,
    scale: T,
) -> Result<(), ExprError>
where
    SV: SavePolicy,
    R: ReduceOp,
    D: HostDevice,
    T: Element,
    E: MakePlan<Elem = T> + ShapeCheck<2>,
{
    let () = TypeCheck::<D, 1, E>::ASSERT_REDUCE;
    let len = dst.shape().lowest();
    // Scalar-only expressions (`None`) never pass `ASSERT_REDUCE`.
    let shape = match exp.check_shape()? {
        Some(shape) if shape.cols() == len => shape,
        other => {
            return Err(ExprError::ShapeMismatch {
                op: "reduce",
                lhs: dst.shape().to_vec(),
                rhs: other.map(|s| s.to_vec()).unwrap_or_default(),
            });
        }
    };
    let (rows, cols) = (shape.rows(), shape.cols());
    tracing::trace!(policy = SV::NAME, reducer = R::NAME, rows, cols, "reduce keep lowest");

    let plan = exp.make_plan();
    let mut out = dst.plan_mut();
    for x in 0..cols {
        let mut acc = R::identity::<T>();
        for y in 0..rows {
            acc = R::reduce(acc, plan.eval(y, x));
        }
        SV::save(out.eval_mut(0, x), scale * acc);
    }
    Ok(())
}
