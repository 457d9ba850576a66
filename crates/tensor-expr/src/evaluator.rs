// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Entry points for assigning expressions into tensors.

use crate::engine::KindEngine;
use crate::plan::MakePlan;
use crate::reduce::{self, map_reduce_keep_lowest};
use crate::save::{DivTo, MinusTo, MulTo, PlusTo, SaveTo};
use crate::{EvalConfig, Exp, ExprError, ShapeCheck, Tensor};
use blas_engine::{Device, Element, HostDevice};

/// Evaluates expressions into destination tensors.
///
/// # Examples
/// ```
/// use tensor_expr::{dot, Cpu, Evaluator, Shape, Tensor};
///
/// let a = Tensor::<Cpu, 2, f64>::from_slice(Shape::matrix(2, 2), &[1.0, 2.0, 3.0, 4.0]).unwrap();
/// let mut c = Tensor::<Cpu, 2, f64>::zeros(Shape::matrix(2, 2));
///
/// let eval = Evaluator::default();
/// eval.assign(&mut c, dot(&a, &a)).unwrap();
/// eval.assign_add(&mut c, &a * 2.0).unwrap();
/// assert_eq!(c.to_vec(), vec![9.0, 14.0, 21.0, 30.0]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    config: EvalConfig,
}

impl Evaluator {
    pub fn new(config: EvalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// `dst SV= exp` with an explicit save policy.
    pub fn assign_with<SV, D, const DIM: usize, T, E>(
        &self,
        dst: &mut Tensor<D, DIM, T>,
        exp: E,
    ) -> Result<(), ExprError>
    where
        D: Device,
        T: Element,
        E: Exp<Elem = T>,
        E::Kind: KindEngine<SV, D, DIM, T, E>,
    {
        <E::Kind as KindEngine<SV, D, DIM, T, E>>::eval(dst, exp, &self.config)
    }

    /// `dst = exp`
    pub fn assign<D, const DIM: usize, T, E>(
        &self,
        dst: &mut Tensor<D, DIM, T>,
        exp: E,
    ) -> Result<(), ExprError>
    where
        D: Device,
        T: Element,
        E: Exp<Elem = T>,
        E::Kind: KindEngine<SaveTo, D, DIM, T, E>,
    {
        self.assign_with::<SaveTo, D, DIM, T, E>(dst, exp)
    }

    /// `dst += exp`
    pub fn assign_add<D, const DIM: usize, T, E>(
        &self,
        dst: &mut Tensor<D, DIM, T>,
        exp: E,
    ) -> Result<(), ExprError>
    where
        D: Device,
        T: Element,
        E: Exp<Elem = T>,
        E::Kind: KindEngine<PlusTo, D, DIM, T, E>,
    {
        self.assign_with::<PlusTo, D, DIM, T, E>(dst, exp)
    }

    /// `dst -= exp`
    pub fn assign_sub<D, const DIM: usize, T, E>(
        &self,
        dst: &mut Tensor<D, DIM, T>,
        exp: E,
    ) -> Result<(), ExprError>
    where
        D: Device,
        T: Element,
        E: Exp<Elem = T>,
        E::Kind: KindEngine<MinusTo, D, DIM, T, E>,
    {
        self.assign_with::<MinusTo, D, DIM, T, E>(dst, exp)
    }

    /// `dst *= exp`
    pub fn assign_mul<D, const DIM: usize, T, E>(
        &self,
        dst: &mut Tensor<D, DIM, T>,
        exp: E,
    ) -> Result<(), ExprError>
    where
        D: Device,
        T: Element,
        E: Exp<Elem = T>,
        E::Kind: KindEngine<MulTo, D, DIM, T, E>,
    {
        self.assign_with::<MulTo, D, DIM, T, E>(dst, exp)
    }

    /// `dst /= exp`
    pub fn assign_div<D, const DIM: usize, T, E>(
        &self,
        dst: &mut Tensor<D, DIM, T>,
        exp: E,
    ) -> Result<(), ExprError>
    where
        D: Device,
        T: Element,
        E: Exp<Elem = T>,
        E::Kind: KindEngine<DivTo, D, DIM, T, E>,
    {
        self.assign_with::<DivTo, D, DIM, T, E>(dst, exp)
    }

    /// `dst[x] = sum_y exp(y, x)`
    pub fn sum_rows<D, T, E>(&self, dst: &mut Tensor<D, 1, T>, exp: E) -> Result<(), ExprError>
    where
        D: HostDevice,
        T: Element,
        E: MakePlan<Elem = T> + ShapeCheck<2>,
    {
        map_reduce_keep_lowest::<SaveTo, reduce::Sum, D, T, E>(dst, exp, T::ONE)
    }

    /// `dst[x] = max_y exp(y, x)`
    pub fn max_rows<D, T, E>(&self, dst: &mut Tensor<D, 1, T>, exp: E) -> Result<(), ExprError>
    where
        D: HostDevice,
        T: Element,
        E: MakePlan<Elem = T> + ShapeCheck<2>,
    {
        map_reduce_keep_lowest::<SaveTo, reduce::Maximum, D, T, E>(dst, exp, T::ONE)
    }
}

/// Assignment methods on [`Tensor`] using the default [`Evaluator`].
///
/// # Examples
/// ```
/// use tensor_expr::{scalar, Cpu, Shape, Tensor, TensorAssign};
///
/// let b = Tensor::<Cpu, 1, f32>::from_slice(Shape::vector(3), &[1.0, 2.0, 3.0]).unwrap();
/// let mut a = Tensor::<Cpu, 1, f32>::zeros(Shape::vector(3));
/// a.assign(&b * scalar(2.0)).unwrap();
/// a.assign_sub(&b).unwrap();
/// assert_eq!(a.to_vec(), vec![1.0, 2.0, 3.0]);
/// ```
pub trait TensorAssign<D: Device, const DIM: usize, T: Element> {
    fn assign<E>(&mut self, exp: E) -> Result<(), ExprError>
    where
        E: Exp<Elem = T>,
        E::Kind: KindEngine<SaveTo, D, DIM, T, E>;

    fn assign_add<E>(&mut self, exp: E) -> Result<(), ExprError>
    where
        E: Exp<Elem = T>,
        E::Kind: KindEngine<PlusTo, D, DIM, T, E>;

    fn assign_sub<E>(&mut self, exp: E) -> Result<(), ExprError>
    where
        E: Exp<Elem = T>,
        E::Kind: KindEngine<MinusTo, D, DIM, T, E>;

    fn assign_mul<E>(&mut self, exp: E) -> Result<(), ExprError>
    where
        E: Exp<Elem = T>,
        E::Kind: KindEngine<MulTo, D, DIM, T, E>;

    fn assign_div<E>(&mut self, exp: E) -> Result<(), ExprError>
    where
        E: Exp<Elem = T>,
        E::Kind: KindEngine<DivTo, D, DIM, T, E>;
}

impl<D: Device, const DIM: usize, T: Element> TensorAssign<D, DIM, T> for Tensor<D, DIM, T> {
    fn assign<E>(&mut self, exp: E) -> Result<(), ExprError>
    where
        E: Exp<Elem = T>,
        E::Kind: KindEngine<SaveTo, D, DIM, T, E>,
    {
        Evaluator::default().assign(self, exp)
    }

    fn assign_add<E>(&mut self, exp: E) -> Result<(), ExprError>
    where
        E: Exp<Elem = T>,
        E::Kind: KindEngine<PlusTo, D, DIM, T, E>,
    {
        Evaluator::default().assign_add(self, exp)
    }

    fn assign_sub<E>(&mut self, exp: E) -> Result<(), ExprError>
    where
        E: Exp<Elem = T>,
        E::Kind: KindEngine<MinusTo, D, DIM, T, E>,
    {
        Evaluator::default().assign_sub(self, exp)
    }

    fn assign_mul<E>(&mut self, exp: E) -> Result<(), ExprError>
    where
        E: Exp<Elem = T>,
        E::Kind: KindEngine<MulTo, D, DIM, T, E>,
    {
        Evaluator::default().assign_mul(self, exp)
    }

    fn assign_div<E>(&mut self, exp: E) -> Result<(), ExprError>
    where
        E: Exp<Elem = T>,
        E::Kind: KindEngine<DivTo, D, DIM, T, E>,
    {
        Evaluator::default().assign_div(self, exp)
    }
}
