// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Dispatch from an expression's kind to the engine that evaluates it,
//! and the generic element-wise engine.
//!
//! # Execution Model
//! ```text
//! assign(dst, exp)
//!   └─ <E::Kind as KindEngine>::eval
//!        ├─ Mapper / Container / Chainer ─► map_exp
//!        │     static check ─► shape check ─► make_plan ─► one pass over dst
//!        └─ Complex ─────────────► ComplexEngine (gemm / gemv / ger)
//! ```
//!
//! Only the destination is written. Every check completes before the first
//! cell changes, so a failed assignment leaves the destination untouched.

use crate::dot::ComplexEngine;
use crate::plan::{MakePlan, Plan, TensorPlanMut};
use crate::save::SavePolicy;
use crate::{
    Chainer, Complex, Container, EvalConfig, Exp, ExprError, Mapper, Shape, ShapeCheck, Tensor,
    TypeCheck,
};
use blas_engine::{Device, Element, HostDevice};
use rayon::prelude::*;

/// Routes an expression to its engine based on its kind marker.
///
/// Implemented for [`Mapper`], [`Container`] and [`Chainer`] (element-wise
/// evaluation) and for [`Complex`] (dot products).
pub trait KindEngine<SV, D: Device, const DIM: usize, T: Element, E: Exp<Elem = T>> {
    fn eval(dst: &mut Tensor<D, DIM, T>, exp: E, config: &EvalConfig) -> Result<(), ExprError>;
}

impl<SV, D, const DIM: usize, T, E> KindEngine<SV, D, DIM, T, E> for Mapper
where
    SV: SavePolicy,
    D: HostDevice,
    T: Element,
    E: MakePlan<Elem = T> + ShapeCheck<DIM>,
{
    fn eval(dst: &mut Tensor<D, DIM, T>, exp: E, config: &EvalConfig) -> Result<(), ExprError> {
        map_exp::<SV, D, DIM, T, E>(dst, exp, config)
    }
}

impl<SV, D, const DIM: usize, T, E> KindEngine<SV, D, DIM, T, E> for Container
where
    SV: SavePolicy,
    D: HostDevice,
    T: Element,
    E: MakePlan<Elem = T> + ShapeCheck<DIM>,
{
    fn eval(dst: &mut Tensor<D, DIM, T>, exp: E, config: &EvalConfig) -> Result<(), ExprError> {
        map_exp::<SV, D, DIM, T, E>(dst, exp, config)
    }
}

impl<SV, D, const DIM: usize, T, E> KindEngine<SV, D, DIM, T, E> for Chainer
where
    SV: SavePolicy,
    D: HostDevice,
    T: Element,
    E: MakePlan<Elem = T> + ShapeCheck<DIM>,
{
    fn eval(dst: &mut Tensor<D, DIM, T>, exp: E, config: &EvalConfig) -> Result<(), ExprError> {
        map_exp::<SV, D, DIM, T, E>(dst, exp, config)
    }
}

impl<SV, D, const DIM: usize, T, E> KindEngine<SV, D, DIM, T, E> for Complex
where
    D: Device,
    T: Element,
    E: Exp<Elem = T> + ComplexEngine<SV, D, DIM, T>,
{
    fn eval(dst: &mut Tensor<D, DIM, T>, exp: E, _config: &EvalConfig) -> Result<(), ExprError> {
        exp.eval_complex(dst)
    }
}

/// Checks that the shape of `exp` matches `dst`.
///
/// A `None` shape (a scalar-only expression) matches any destination.
pub(crate) fn check_against<const DIM: usize, E: ShapeCheck<DIM>>(
    exp: &E,
    dst: &Shape<DIM>,
    op: &'static str,
) -> Result<(), ExprError> {
    match exp.check_shape()? {
        Some(shape) if shape != *dst => Err(ExprError::ShapeMismatch {
            op,
            lhs: dst.to_vec(),
            rhs: shape.to_vec(),
        }),
        _ => Ok(()),
    }
}

/// Evaluates `dst SV= exp` element by element in a single pass.
///
/// Rank mismatches and device mismatches between `exp` and `dst` fail to
/// compile. A runtime shape mismatch returns [`ExprError::ShapeMismatch`]
/// before anything is written.
///
/// With `config` resolving to more than one thread and a destination of at
/// least `config.parallel_threshold` elements, rows are split into
/// contiguous blocks evaluated on the rayon pool.
pub fn map_exp<SV, D, const DIM: usize, T, E>(
    dst: &mut Tensor<D, DIM, T>,
    exp: E,
    config: &EvalConfig,
) -> Result<(), ExprError>
where
    SV: SavePolicy,
    D: HostDevice,
    T: Element,
    E: MakePlan<Elem = T> + ShapeCheck<DIM>,
{
    let () = TypeCheck::<D, DIM, E>::ASSERT_MAP;
    check_against(&exp, dst.shape(), "assign")?;

    let (rows, cols) = dst.shape().flat_2d();
    if rows == 0 || cols == 0 {
        return Ok(());
    }

    let plan = exp.make_plan();
    let stride = dst.stride();

    if rows > 1 && config.should_parallelize(rows * cols) {
        let threads = config.resolve_threads();
        let block_rows = rows.div_ceil(threads);
        tracing::debug!(
            policy = SV::NAME,
            rows,
            cols,
            threads,
            block_rows,
            "parallel map"
        );
        dst.data_mut()
            .par_chunks_mut(block_rows * stride)
            .enumerate()
            .for_each(|(block, chunk)| {
                let y0 = block * block_rows;
                let n = block_rows.min(rows.saturating_sub(y0));
                let mut out = TensorPlanMut::new(chunk, stride);
                for dy in 0..n {
                    for x in 0..cols {
                        SV::save(out.eval_mut(dy, x), plan.eval(y0 + dy, x));
                    }
                }
            });
    } else {
        tracing::trace!(policy = SV::NAME, rows, cols, "map");
        let mut out = dst.plan_mut();
        for y in 0..rows {
            for x in 0..cols {
                SV::save(out.eval_mut(y, x), plan.eval(y, x));
            }
        }
    }
    Ok(())
}
