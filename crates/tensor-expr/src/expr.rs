// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Expression nodes.
//!
//! An expression is a small `Copy` value describing a computation over
//! tensor coordinates. Leaves borrow tensors (`&Tensor`), inner nodes hold
//! their children by value, and nothing allocates. Evaluation happens only
//! when an expression is assigned into a destination.
//!
//! Every node type carries its kind, static rank and device mask as
//! associated items of [`Exp`], so routing and compatibility checks are
//! resolved per type at compile time:
//!
//! ```text
//! Container   &Tensor                          → element-wise engine
//! Mapper      ScalarExp, UnaryMapExp,
//!             BinaryMapExp, TransposeExp       → element-wise engine
//! Chainer     MakeTensorExp                    → element-wise engine
//! Complex     DotExp                           → dot / BLAS engine
//! ```

use crate::extend::{MakeTensor, MakeTensorExp};
use crate::infer;
use crate::op::{self, BinaryOp, UnaryOp};
use crate::Tensor;
use blas_engine::{Device, Element, ALL_DEVICES};
use std::marker::PhantomData;
use std::ops;

// ── Kinds ──────────────────────────────────────────────────────────

mod sealed {
    pub trait Sealed {}
}

/// Marker trait for the expression kinds.
pub trait ExpKind: sealed::Sealed {
    const NAME: &'static str;
}

/// Element-wise nodes evaluated through a plan.
#[derive(Debug)]
pub struct Mapper;

/// Tensor leaves.
#[derive(Debug)]
pub struct Container;

/// Extension nodes that carry their own shape ([`MakeTensorExp`]).
#[derive(Debug)]
pub struct Chainer;

/// Nodes with a dedicated engine (dot products).
#[derive(Debug)]
pub struct Complex;

impl sealed::Sealed for Mapper {}
impl sealed::Sealed for Container {}
impl sealed::Sealed for Chainer {}
impl sealed::Sealed for Complex {}

impl ExpKind for Mapper {
    const NAME: &'static str = "mapper";
}

impl ExpKind for Container {
    const NAME: &'static str = "container";
}

impl ExpKind for Chainer {
    const NAME: &'static str = "chainer";
}

impl ExpKind for Complex {
    const NAME: &'static str = "complex";
}

// ── The expression trait ───────────────────────────────────────────

/// Implemented by every expression node.
pub trait Exp: Copy {
    /// Element type produced at each coordinate.
    type Elem: Element;
    /// Evaluation strategy of this node.
    type Kind: ExpKind;
    /// Static rank of the result. `0` means scalar (broadcasts
    /// anywhere), `-1` means the operands disagree.
    const DIM: i32;
    /// Devices this expression can be evaluated on.
    const DEV_MASK: u32;
}

impl<'a, D: Device, const N: usize, T: Element> Exp for &'a Tensor<D, N, T> {
    type Elem = T;
    type Kind = Container;
    const DIM: i32 = N as i32;
    const DEV_MASK: u32 = D::DEV_MASK;
}

// ── Scalar ─────────────────────────────────────────────────────────

/// A constant broadcast to every coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarExp<T: Element> {
    pub(crate) value: T,
}

/// Wraps a constant as an expression.
pub fn scalar<T: Element>(value: T) -> ScalarExp<T> {
    ScalarExp { value }
}

impl<T: Element> Exp for ScalarExp<T> {
    type Elem = T;
    type Kind = Mapper;
    const DIM: i32 = 0;
    const DEV_MASK: u32 = ALL_DEVICES;
}

// ── Unary map ──────────────────────────────────────────────────────

/// `Op::map(src)` at every coordinate.
#[derive(Debug)]
pub struct UnaryMapExp<Op, A> {
    pub(crate) src: A,
    _op: PhantomData<fn() -> Op>,
}

impl<Op, A: Copy> Clone for UnaryMapExp<Op, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Op, A: Copy> Copy for UnaryMapExp<Op, A> {}

/// Applies the unary operator `Op` to `src`.
pub fn unary<Op: UnaryOp, A: Exp>(src: A) -> UnaryMapExp<Op, A> {
    UnaryMapExp {
        src,
        _op: PhantomData,
    }
}

impl<Op: UnaryOp, A: Exp> Exp for UnaryMapExp<Op, A> {
    type Elem = A::Elem;
    type Kind = Mapper;
    const DIM: i32 = A::DIM;
    const DEV_MASK: u32 = A::DEV_MASK;
}

// ── Binary map ─────────────────────────────────────────────────────

/// `Op::map(lhs, rhs)` at every coordinate.
#[derive(Debug)]
pub struct BinaryMapExp<Op, A, B> {
    pub(crate) lhs: A,
    pub(crate) rhs: B,
    _op: PhantomData<fn() -> Op>,
}

impl<Op, A: Copy, B: Copy> Clone for BinaryMapExp<Op, A, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Op, A: Copy, B: Copy> Copy for BinaryMapExp<Op, A, B> {}

/// Combines two expressions with the binary operator `Op`.
///
/// # Examples
/// ```
/// use tensor_expr::op::Maximum;
/// use tensor_expr::{binary, Cpu, Shape, Tensor, TensorAssign};
///
/// let b = Tensor::<Cpu, 1, f32>::from_slice(Shape::vector(3), &[2.0, 3.0, 4.0]).unwrap();
/// let c = Tensor::<Cpu, 1, f32>::from_slice(Shape::vector(3), &[3.0, 4.0, 5.0]).unwrap();
/// let mut a = Tensor::<Cpu, 1, f32>::zeros(Shape::vector(3));
///
/// a.assign(&b * binary::<Maximum, _, _>(&c, &b)).unwrap();
/// assert_eq!(a.to_vec(), vec![6.0, 12.0, 20.0]);
/// ```
pub fn binary<Op: BinaryOp, A: Exp, B: Exp<Elem = A::Elem>>(
    lhs: A,
    rhs: B,
) -> BinaryMapExp<Op, A, B> {
    BinaryMapExp {
        lhs,
        rhs,
        _op: PhantomData,
    }
}

impl<Op: BinaryOp, A: Exp, B: Exp<Elem = A::Elem>> Exp for BinaryMapExp<Op, A, B> {
    type Elem = A::Elem;
    type Kind = Mapper;
    const DIM: i32 = infer::binary_dim(A::DIM, B::DIM);
    const DEV_MASK: u32 = A::DEV_MASK & B::DEV_MASK;
}

// ── Transpose ──────────────────────────────────────────────────────

/// Swaps the two lowest axes of `exp` at evaluation time. The underlying
/// memory is not reordered.
#[derive(Debug, Clone, Copy)]
pub struct TransposeExp<E> {
    pub(crate) exp: E,
}

impl<E: Exp> Exp for TransposeExp<E> {
    type Elem = E::Elem;
    type Kind = Mapper;
    const DIM: i32 = E::DIM;
    const DEV_MASK: u32 = E::DEV_MASK;
}

/// Methods available on every expression.
pub trait ExpExt: Exp {
    /// Transposed view of this expression.
    fn t(self) -> TransposeExp<Self> {
        TransposeExp { exp: self }
    }
}

impl<E: Exp> ExpExt for E {}

// ── Dot ────────────────────────────────────────────────────────────

/// `scale * op(lhs) · op(rhs)`, where `op` transposes when `LT` / `RT` is set.
///
/// Built with [`dot`]. Dot expressions have their own engine and cannot be
/// nested inside element-wise expressions; they can only be assigned.
#[derive(Debug)]
pub struct DotExp<
    'a,
    D: Device,
    const LDIM: usize,
    const RDIM: usize,
    T: Element,
    const LT: bool,
    const RT: bool,
> {
    pub(crate) lhs: &'a Tensor<D, LDIM, T>,
    pub(crate) rhs: &'a Tensor<D, RDIM, T>,
    pub(crate) scale: T,
}

impl<'a, D: Device, const LDIM: usize, const RDIM: usize, T: Element, const LT: bool, const RT: bool>
    Clone for DotExp<'a, D, LDIM, RDIM, T, LT, RT>
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, D: Device, const LDIM: usize, const RDIM: usize, T: Element, const LT: bool, const RT: bool>
    Copy for DotExp<'a, D, LDIM, RDIM, T, LT, RT>
{
}

impl<'a, D: Device, const LDIM: usize, const RDIM: usize, T: Element, const LT: bool, const RT: bool>
    DotExp<'a, D, LDIM, RDIM, T, LT, RT>
{
    fn new(lhs: &'a Tensor<D, LDIM, T>, rhs: &'a Tensor<D, RDIM, T>) -> Self {
        Self {
            lhs,
            rhs,
            scale: T::ONE,
        }
    }

    /// Multiplies the product by `factor`.
    pub fn scaled(mut self, factor: T) -> Self {
        self.scale = self.scale * factor;
        self
    }

    /// The accumulated scale factor.
    pub fn scale(&self) -> T {
        self.scale
    }
}

impl<'a, D: Device, const LDIM: usize, const RDIM: usize, T: Element, const LT: bool, const RT: bool>
    Exp for DotExp<'a, D, LDIM, RDIM, T, LT, RT>
{
    type Elem = T;
    type Kind = Complex;
    const DIM: i32 = infer::dot_dim(LDIM, RDIM, LT);
    const DEV_MASK: u32 = D::DEV_MASK;
}

impl<'a, D: Device, const LDIM: usize, const RDIM: usize, T: Element, const LT: bool, const RT: bool>
    ops::Mul<T> for DotExp<'a, D, LDIM, RDIM, T, LT, RT>
{
    type Output = Self;

    fn mul(self, factor: T) -> Self {
        self.scaled(factor)
    }
}

/// Operand pairs a dot product can be formed from: tensors, optionally
/// wrapped in [`TransposeExp`]. Transposition becomes a type-level flag.
pub trait Dot<Rhs> {
    type Output;
    fn dot(self, rhs: Rhs) -> Self::Output;
}

impl<'a, D: Device, const L: usize, const R: usize, T: Element> Dot<&'a Tensor<D, R, T>>
    for &'a Tensor<D, L, T>
{
    type Output = DotExp<'a, D, L, R, T, false, false>;

    fn dot(self, rhs: &'a Tensor<D, R, T>) -> Self::Output {
        DotExp::new(self, rhs)
    }
}

impl<'a, D: Device, const L: usize, const R: usize, T: Element> Dot<&'a Tensor<D, R, T>>
    for TransposeExp<&'a Tensor<D, L, T>>
{
    type Output = DotExp<'a, D, L, R, T, true, false>;

    fn dot(self, rhs: &'a Tensor<D, R, T>) -> Self::Output {
        DotExp::new(self.exp, rhs)
    }
}

impl<'a, D: Device, const L: usize, const R: usize, T: Element>
    Dot<TransposeExp<&'a Tensor<D, R, T>>> for &'a Tensor<D, L, T>
{
    type Output = DotExp<'a, D, L, R, T, false, true>;

    fn dot(self, rhs: TransposeExp<&'a Tensor<D, R, T>>) -> Self::Output {
        DotExp::new(self, rhs.exp)
    }
}

impl<'a, D: Device, const L: usize, const R: usize, T: Element>
    Dot<TransposeExp<&'a Tensor<D, R, T>>> for TransposeExp<&'a Tensor<D, L, T>>
{
    type Output = DotExp<'a, D, L, R, T, true, true>;

    fn dot(self, rhs: TransposeExp<&'a Tensor<D, R, T>>) -> Self::Output {
        DotExp::new(self.exp, rhs.exp)
    }
}

/// Matrix / vector product of two tensors.
///
/// | lhs | rhs | result |
/// |---|---|---|
/// | `&m` or `m.t()` (rank 2) | `&m` or `m.t()` (rank 2) | matrix (gemm) |
/// | `&v` (rank 1) | `&m` or `m.t()` (rank 2) | vector (gemv) |
/// | `v.t()` (rank 1) | `&v` (rank 1) | outer product (ger) |
///
/// Both operands must live on the same device and share an element type.
pub fn dot<L: Dot<R>, R>(lhs: L, rhs: R) -> L::Output {
    lhs.dot(rhs)
}

// ── Operator overloading ───────────────────────────────────────────

macro_rules! impl_exp_ops {
    ($([$($gen:tt)*] $ty:ty;)*) => {$(
        impl<$($gen)*, Rhs: Exp<Elem = <$ty as Exp>::Elem>> ops::Add<Rhs> for $ty {
            type Output = BinaryMapExp<op::Plus, $ty, Rhs>;

            #[inline]
            fn add(self, rhs: Rhs) -> Self::Output {
                binary(self, rhs)
            }
        }

        impl<$($gen)*, Rhs: Exp<Elem = <$ty as Exp>::Elem>> ops::Sub<Rhs> for $ty {
            type Output = BinaryMapExp<op::Minus, $ty, Rhs>;

            #[inline]
            fn sub(self, rhs: Rhs) -> Self::Output {
                binary(self, rhs)
            }
        }

        impl<$($gen)*, Rhs: Exp<Elem = <$ty as Exp>::Elem>> ops::Mul<Rhs> for $ty {
            type Output = BinaryMapExp<op::Mul, $ty, Rhs>;

            #[inline]
            fn mul(self, rhs: Rhs) -> Self::Output {
                binary(self, rhs)
            }
        }

        impl<$($gen)*, Rhs: Exp<Elem = <$ty as Exp>::Elem>> ops::Div<Rhs> for $ty {
            type Output = BinaryMapExp<op::Div, $ty, Rhs>;

            #[inline]
            fn div(self, rhs: Rhs) -> Self::Output {
                binary(self, rhs)
            }
        }

        impl<$($gen)*> ops::Neg for $ty {
            type Output = UnaryMapExp<op::Negate, $ty>;

            #[inline]
            fn neg(self) -> Self::Output {
                unary(self)
            }
        }
    )*};
}

impl_exp_ops! {
    ['a, D: Device, const N: usize, T: Element] &'a Tensor<D, N, T>;
    [T: Element] ScalarExp<T>;
    [Op: UnaryOp, A: Exp] UnaryMapExp<Op, A>;
    [Op: BinaryOp, A: Exp, B: Exp<Elem = A::Elem>] BinaryMapExp<Op, A, B>;
    [E: Exp] TransposeExp<E>;
    [X: MakeTensor, const N: usize] MakeTensorExp<X, N>;
}

// Plain `f32` / `f64` right-hand sides are wrapped in a `ScalarExp`. No
// float type implements `Exp`, so these never overlap the impls above.
macro_rules! impl_literal_ops {
    (@float [$($gen:tt)*] $ty:ty; $Trait:ident $method:ident $Op:ident $f:ty) => {
        impl<$($gen)*> ops::$Trait<$f> for $ty
        where
            $ty: Exp<Elem = $f>,
        {
            type Output = BinaryMapExp<op::$Op, $ty, ScalarExp<$f>>;

            #[inline]
            fn $method(self, rhs: $f) -> Self::Output {
                binary(self, scalar(rhs))
            }
        }
    };
    (@op [$($gen:tt)*] $ty:ty; $Trait:ident $method:ident $Op:ident) => {
        impl_literal_ops!(@float [$($gen)*] $ty; $Trait $method $Op f32);
        impl_literal_ops!(@float [$($gen)*] $ty; $Trait $method $Op f64);
    };
    ($([$($gen:tt)*] $ty:ty;)*) => {$(
        impl_literal_ops!(@op [$($gen)*] $ty; Add add Plus);
        impl_literal_ops!(@op [$($gen)*] $ty; Sub sub Minus);
        impl_literal_ops!(@op [$($gen)*] $ty; Mul mul Mul);
        impl_literal_ops!(@op [$($gen)*] $ty; Div div Div);
    )*};
}

impl_literal_ops! {
    ['a, D: Device, const N: usize, T: Element] &'a Tensor<D, N, T>;
    [T: Element] ScalarExp<T>;
    [Op: UnaryOp, A: Exp] UnaryMapExp<Op, A>;
    [Op: BinaryOp, A: Exp, B: Exp<Elem = A::Elem>] BinaryMapExp<Op, A, B>;
    [E: Exp] TransposeExp<E>;
    [X: MakeTensor, const N: usize] MakeTensorExp<X, N>;
}
