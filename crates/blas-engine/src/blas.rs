// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Column-major BLAS level-2/3 routines, parameterised over the device.

use crate::{BlasError, Cpu, Device, Element};
use ndarray::{ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2, Axis, ShapeBuilder};

/// The BLAS binding used by the dot engine.
///
/// All matrices are column-major: element `(i, j)` of an `m x n` operand
/// with leading dimension `ld` lives at `data[i + j * ld]`. Vectors are
/// strided by their increment.
///
/// Implementations exist per device; a device without one cannot evaluate
/// dot expressions, which surfaces as a missing trait bound at compile time.
#[allow(clippy::too_many_arguments)]
pub trait BlasEngine<T: Element>: Device {
    /// `C = alpha * op(A) * op(B) + beta * C` with `op(A)` of size `m x k`
    /// and `op(B)` of size `k x n`.
    fn gemm(
        transa: bool,
        transb: bool,
        m: usize,
        n: usize,
        k: usize,
        alpha: T,
        a: &[T],
        lda: usize,
        b: &[T],
        ldb: usize,
        beta: T,
        c: &mut [T],
        ldc: usize,
    ) -> Result<(), BlasError>;

    /// `y = alpha * op(A) * x + beta * y` where `A` is stored `m x n`.
    fn gemv(
        trans: bool,
        m: usize,
        n: usize,
        alpha: T,
        a: &[T],
        lda: usize,
        x: &[T],
        incx: usize,
        beta: T,
        y: &mut [T],
        incy: usize,
    ) -> Result<(), BlasError>;

    /// Rank-1 update `A = alpha * x * y^T + A` where `A` is `m x n`.
    fn ger(
        m: usize,
        n: usize,
        alpha: T,
        x: &[T],
        incx: usize,
        y: &[T],
        incy: usize,
        a: &mut [T],
        lda: usize,
    ) -> Result<(), BlasError>;
}

fn layout_error(op: &'static str, err: ndarray::ShapeError) -> BlasError {
    BlasError::InvalidLayout {
        op,
        detail: err.to_string(),
    }
}

/// Views `data` as a column-major `rows x cols` matrix.
fn matrix<'a, T>(
    op: &'static str,
    data: &'a [T],
    rows: usize,
    cols: usize,
    ld: usize,
) -> Result<ArrayView2<'a, T>, BlasError> {
    ArrayView2::from_shape((rows, cols).strides((1, ld)), data).map_err(|e| layout_error(op, e))
}

fn matrix_mut<'a, T>(
    op: &'static str,
    data: &'a mut [T],
    rows: usize,
    cols: usize,
    ld: usize,
) -> Result<ArrayViewMut2<'a, T>, BlasError> {
    ArrayViewMut2::from_shape((rows, cols).strides((1, ld)), data).map_err(|e| layout_error(op, e))
}

fn vector<'a, T>(
    op: &'static str,
    data: &'a [T],
    len: usize,
    inc: usize,
) -> Result<ArrayView1<'a, T>, BlasError> {
    ArrayView1::from_shape(len.strides(inc), data).map_err(|e| layout_error(op, e))
}

fn vector_mut<'a, T>(
    op: &'static str,
    data: &'a mut [T],
    len: usize,
    inc: usize,
) -> Result<ArrayViewMut1<'a, T>, BlasError> {
    ArrayViewMut1::from_shape(len.strides(inc), data).map_err(|e| layout_error(op, e))
}

/// `y = beta * y`. A zero `beta` overwrites, NaNs included.
fn scale_in_place<T: Element, D: ndarray::Dimension>(
    mut y: ndarray::ArrayViewMut<'_, T, D>,
    beta: T,
) {
    if beta == T::ZERO {
        y.fill(T::ZERO);
    } else {
        y.map_inplace(|v| *v = *v * beta);
    }
}

impl<T: Element> BlasEngine<T> for Cpu {
    fn gemm(
        transa: bool,
        transb: bool,
        m: usize,
        n: usize,
        k: usize,
        alpha: T,
        a: &[T],
        lda: usize,
        b: &[T],
        ldb: usize,
        beta: T,
        c: &mut [T],
        ldc: usize,
    ) -> Result<(), BlasError> {
        tracing::trace!(transa, transb, m, n, k, "cpu gemm");
        if k == 0 {
            // Empty inner dimension: the product term vanishes.
            scale_in_place(matrix_mut("gemm", c, m, n, ldc)?, beta);
            return Ok(());
        }
        // A transposed operand is stored with its extents swapped.
        let a = if transa {
            matrix("gemm", a, k, m, lda)?.reversed_axes()
        } else {
            matrix("gemm", a, m, k, lda)?
        };
        let b = if transb {
            matrix("gemm", b, n, k, ldb)?.reversed_axes()
        } else {
            matrix("gemm", b, k, n, ldb)?
        };
        let mut c = matrix_mut("gemm", c, m, n, ldc)?;
        ndarray::linalg::general_mat_mul(alpha, &a, &b, beta, &mut c);
        Ok(())
    }

    fn gemv(
        trans: bool,
        m: usize,
        n: usize,
        alpha: T,
        a: &[T],
        lda: usize,
        x: &[T],
        incx: usize,
        beta: T,
        y: &mut [T],
        incy: usize,
    ) -> Result<(), BlasError> {
        tracing::trace!(trans, m, n, "cpu gemv");
        let (x_len, y_len) = if trans { (m, n) } else { (n, m) };
        if x_len == 0 {
            scale_in_place(vector_mut("gemv", y, y_len, incy)?, beta);
            return Ok(());
        }
        let a = matrix("gemv", a, m, n, lda)?;
        let a = if trans { a.reversed_axes() } else { a };
        let x = vector("gemv", x, x_len, incx)?;
        let mut y = vector_mut("gemv", y, y_len, incy)?;
        ndarray::linalg::general_mat_vec_mul(alpha, &a, &x, beta, &mut y);
        Ok(())
    }

    fn ger(
        m: usize,
        n: usize,
        alpha: T,
        x: &[T],
        incx: usize,
        y: &[T],
        incy: usize,
        a: &mut [T],
        lda: usize,
    ) -> Result<(), BlasError> {
        tracing::trace!(m, n, "cpu ger");
        let x = vector("ger", x, m, incx)?;
        let y = vector("ger", y, n, incy)?;
        let mut a = matrix_mut("ger", a, m, n, lda)?;
        for (mut column, &yj) in a.axis_iter_mut(Axis(1)).zip(y.iter()) {
            column.scaled_add(alpha * yj, &x);
        }
        Ok(())
    }
}
