// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The dot engine: evaluates [`DotExp`] through the device's BLAS binding.
//!
//! Tensors are row-major while BLAS is column-major. A row-major `r x c`
//! matrix with row stride `s` is exactly a column-major `c x r` matrix with
//! leading dimension `s`, so every product is computed as its transpose:
//! `dst^T = op(rhs)^T * op(lhs)^T`. The operands are swapped and the
//! transpose flags passed through unchanged. No data is copied.
//!
//! | dst | lhs | rhs | flags | routine |
//! |---|---|---|---|---|
//! | 2 | 2 | 2 | any | `gemm` |
//! | 1 | 1 | 2 | lhs plain | `gemv` |
//! | 2 | 1 | 1 | lhs transposed, rhs plain | `ger` (or `gemm` when accumulating) |
//!
//! Any other combination has no engine and fails to compile.

use crate::save::BlasPolicy;
use crate::{DotExp, ExprError, Tensor};
use blas_engine::{BlasEngine, Device, Element};

/// `beta` values below this are treated as an overwrite.
const BETA_EPSILON: f64 = 1e-6;

/// Evaluation of a complex (non element-wise) expression into `dst`.
pub trait ComplexEngine<SV, D: Device, const DIM: usize, T: Element> {
    fn eval_complex(self, dst: &mut Tensor<D, DIM, T>) -> Result<(), ExprError>;
}

fn shape_mismatch<D: Device, const A: usize, const B: usize, const C: usize, T: Element>(
    op: &'static str,
    dst: &Tensor<D, A, T>,
    lhs: &Tensor<D, B, T>,
    rhs: &Tensor<D, C, T>,
) -> ExprError {
    ExprError::DotShapeMismatch {
        op,
        dst: dst.shape().to_vec(),
        lhs: lhs.shape().to_vec(),
        rhs: rhs.shape().to_vec(),
    }
}

fn coefficients<SV: BlasPolicy, T: Element>(scale: T) -> (T, T) {
    (
        scale * T::from_f64(SV::ALPHA_BLAS),
        T::from_f64(SV::BETA_BLAS),
    )
}

// ── gemm: matrix = op(matrix) · op(matrix) ─────────────────────────

impl<'a, SV, D, T, const LT: bool, const RT: bool> ComplexEngine<SV, D, 2, T>
    for DotExp<'a, D, 2, 2, T, LT, RT>
where
    SV: BlasPolicy,
    D: BlasEngine<T>,
    T: Element,
{
    fn eval_complex(self, dst: &mut Tensor<D, 2, T>) -> Result<(), ExprError> {
        let (lhs, rhs) = (self.lhs, self.rhs);
        let l = lhs.shape();
        let r = rhs.shape();
        let (m, k) = if LT { (l.cols(), l.rows()) } else { (l.rows(), l.cols()) };
        let (rk, n) = if RT { (r.cols(), r.rows()) } else { (r.rows(), r.cols()) };
        if k != rk || dst.shape().rows() != m || dst.shape().cols() != n {
            return Err(shape_mismatch("dot-gemm", dst, lhs, rhs));
        }
        tracing::debug!(
            op = "dot-gemm",
            policy = SV::NAME,
            m,
            n,
            k,
            lt = LT,
            rt = RT,
            "dot dispatch"
        );
        if m == 0 || n == 0 {
            return Ok(());
        }

        let (alpha, beta) = coefficients::<SV, T>(self.scale);
        let ldc = dst.stride();
        D::gemm(
            RT,
            LT,
            n,
            m,
            k,
            alpha,
            rhs.data(),
            rhs.stride(),
            lhs.data(),
            lhs.stride(),
            beta,
            dst.data_mut(),
            ldc,
        )?;
        Ok(())
    }
}

// ── gemv: vector = vector · op(matrix) ─────────────────────────────

impl<'a, SV, D, T, const RT: bool> ComplexEngine<SV, D, 1, T> for DotExp<'a, D, 1, 2, T, false, RT>
where
    SV: BlasPolicy,
    D: BlasEngine<T>,
    T: Element,
{
    fn eval_complex(self, dst: &mut Tensor<D, 1, T>) -> Result<(), ExprError> {
        let (lhs, rhs) = (self.lhs, self.rhs);
        let r = rhs.shape();
        let (k, n) = if RT { (r.cols(), r.rows()) } else { (r.rows(), r.cols()) };
        if lhs.shape().lowest() != k || dst.shape().lowest() != n {
            return Err(shape_mismatch("dot-gemv", dst, lhs, rhs));
        }
        tracing::debug!(op = "dot-gemv", policy = SV::NAME, n, k, rt = RT, "dot dispatch");
        if n == 0 {
            return Ok(());
        }

        let (alpha, beta) = coefficients::<SV, T>(self.scale);
        D::gemv(
            RT,
            r.cols(),
            r.rows(),
            alpha,
            rhs.data(),
            rhs.stride(),
            lhs.data(),
            1,
            beta,
            dst.data_mut(),
            1,
        )?;
        Ok(())
    }
}

// ── ger: matrix = vector^T ⊗ vector ────────────────────────────────

impl<'a, SV, D, T> ComplexEngine<SV, D, 2, T> for DotExp<'a, D, 1, 1, T, true, false>
where
    SV: BlasPolicy,
    D: BlasEngine<T>,
    T: Element,
{
    fn eval_complex(self, dst: &mut Tensor<D, 2, T>) -> Result<(), ExprError> {
        let (lhs, rhs) = (self.lhs, self.rhs);
        let m = lhs.shape().lowest();
        let n = rhs.shape().lowest();
        if dst.shape().rows() != m || dst.shape().cols() != n {
            return Err(shape_mismatch("dot-ger", dst, lhs, rhs));
        }
        if m == 0 || n == 0 {
            return Ok(());
        }

        let (alpha, beta) = coefficients::<SV, T>(self.scale);
        let ldc = dst.stride();
        if SV::BETA_BLAS < BETA_EPSILON {
            tracing::debug!(op = "dot-ger", policy = SV::NAME, m, n, "dot dispatch");
            // ger only accumulates; clear the logical cells for an overwrite.
            for row in dst.data_mut().chunks_mut(ldc).take(m) {
                row[..n].fill(T::ZERO);
            }
            D::ger(n, m, alpha, rhs.data(), 1, lhs.data(), 1, dst.data_mut(), ldc)?;
        } else {
            // Both vectors as single-row matrices: lhs^T (m x 1) · rhs (1 x n).
            tracing::debug!(op = "dot-gemm", policy = SV::NAME, m, n, k = 1, "dot dispatch");
            D::gemm(
                false,
                true,
                n,
                m,
                1,
                alpha,
                rhs.data(),
                n,
                lhs.data(),
                m,
                beta,
                dst.data_mut(),
                ldc,
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::{MinusTo, PlusTo, SaveTo};
    use crate::{dot, ExpExt, Shape};
    use blas_engine::Cpu;

    type Mat = Tensor<Cpu, 2, f64>;
    type Vector = Tensor<Cpu, 1, f64>;

    fn matrix(rows: usize, cols: usize, values: &[f64]) -> Mat {
        Tensor::from_slice(Shape::matrix(rows, cols), values).unwrap()
    }

    fn vector(values: &[f64]) -> Vector {
        Tensor::from_slice(Shape::vector(values.len()), values).unwrap()
    }

    #[test]
    fn test_gemm_plain() {
        let a = matrix(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let b = matrix(3, 2, &[7.0, 8.0, 9.0, 10.0, 11.0, 12.0]);
        let mut c = Mat::zeros(Shape::matrix(2, 2));
        ComplexEngine::<SaveTo, _, 2, _>::eval_complex(dot(&a, &b), &mut c).unwrap();
        assert_eq!(c.to_vec(), vec![58.0, 64.0, 139.0, 154.0]);
    }

    #[test]
    fn test_gemm_transposed_operands() {
        // a^T · b^T with a: 3x2, b: 2x3 gives the same product as above.
        let a = matrix(3, 2, &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        let b = matrix(2, 3, &[7.0, 9.0, 11.0, 8.0, 10.0, 12.0]);
        let mut c = Mat::zeros(Shape::matrix(2, 2));
        ComplexEngine::<SaveTo, _, 2, _>::eval_complex(dot(a.t(), b.t()), &mut c).unwrap();
        assert_eq!(c.to_vec(), vec![58.0, 64.0, 139.0, 154.0]);
    }

    #[test]
    fn test_gemm_scale_and_policies() {
        let i = matrix(2, 2, &[1.0, 0.0, 0.0, 1.0]);
        let b = matrix(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let mut c = matrix(2, 2, &[10.0, 10.0, 10.0, 10.0]);
        ComplexEngine::<PlusTo, _, 2, _>::eval_complex(dot(&i, &b) * 2.0, &mut c).unwrap();
        assert_eq!(c.to_vec(), vec![12.0, 14.0, 16.0, 18.0]);
        ComplexEngine::<MinusTo, _, 2, _>::eval_complex(dot(&i, &b), &mut c).unwrap();
        assert_eq!(c.to_vec(), vec![11.0, 12.0, 13.0, 14.0]);
    }

    #[test]
    fn test_gemm_shape_mismatch() {
        let a = matrix(2, 3, &[0.0; 6]);
        let b = matrix(2, 3, &[0.0; 6]);
        let mut c = matrix(2, 3, &[5.0; 6]);
        let err = ComplexEngine::<SaveTo, _, 2, _>::eval_complex(dot(&a, &b), &mut c).unwrap_err();
        match err {
            ExprError::DotShapeMismatch { op, dst, lhs, rhs } => {
                assert_eq!(op, "dot-gemm");
                assert_eq!(dst, vec![2, 3]);
                assert_eq!(lhs, vec![2, 3]);
                assert_eq!(rhs, vec![2, 3]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(c.to_vec(), vec![5.0; 6]);
    }

    #[test]
    fn test_gemm_empty_inner_dimension() {
        // (2x0) · (0x3) is a 2x3 matrix of zeros.
        let a = Mat::zeros(Shape::matrix(2, 0));
        let b = Mat::zeros(Shape::matrix(0, 3));
        let mut c = matrix(2, 3, &[7.0; 6]);
        ComplexEngine::<SaveTo, _, 2, _>::eval_complex(dot(&a, &b), &mut c).unwrap();
        assert_eq!(c.to_vec(), vec![0.0; 6]);

        // Same product with both operands stored transposed.
        let at = Mat::zeros(Shape::matrix(0, 2));
        let bt = Mat::zeros(Shape::matrix(3, 0));
        let mut c = matrix(2, 3, &[7.0; 6]);
        ComplexEngine::<SaveTo, _, 2, _>::eval_complex(dot(at.t(), bt.t()), &mut c).unwrap();
        assert_eq!(c.to_vec(), vec![0.0; 6]);

        // Accumulating an empty product leaves the destination as it was.
        let mut c = matrix(2, 3, &[7.0; 6]);
        ComplexEngine::<PlusTo, _, 2, _>::eval_complex(dot(&a, &b), &mut c).unwrap();
        assert_eq!(c.to_vec(), vec![7.0; 6]);
    }

    #[test]
    fn test_gemv_empty_inner_dimension() {
        let x = Vector::zeros(Shape::vector(0));
        let w = Mat::zeros(Shape::matrix(0, 3));
        let mut y = vector(&[7.0, 7.0, 7.0]);
        ComplexEngine::<SaveTo, _, 1, _>::eval_complex(dot(&x, &w), &mut y).unwrap();
        assert_eq!(y.to_vec(), vec![0.0; 3]);

        let wt = Mat::zeros(Shape::matrix(3, 0));
        let mut y = vector(&[7.0, 7.0, 7.0]);
        ComplexEngine::<PlusTo, _, 1, _>::eval_complex(dot(&x, wt.t()), &mut y).unwrap();
        assert_eq!(y.to_vec(), vec![7.0; 3]);
    }

    #[test]
    fn test_gemv() {
        let x = vector(&[1.0, 2.0]);
        let w = matrix(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let mut y = Vector::zeros(Shape::vector(3));
        ComplexEngine::<SaveTo, _, 1, _>::eval_complex(dot(&x, &w), &mut y).unwrap();
        assert_eq!(y.to_vec(), vec![9.0, 12.0, 15.0]);

        // x · w^T with w: 2x3 needs a length-3 lhs.
        let x3 = vector(&[1.0, 1.0, 1.0]);
        let mut y2 = Vector::zeros(Shape::vector(2));
        ComplexEngine::<SaveTo, _, 1, _>::eval_complex(dot(&x3, w.t()), &mut y2).unwrap();
        assert_eq!(y2.to_vec(), vec![6.0, 15.0]);
    }

    #[test]
    fn test_gemv_shape_mismatch() {
        let x = vector(&[1.0, 2.0, 3.0]);
        let w = matrix(2, 3, &[0.0; 6]);
        let mut y = Vector::zeros(Shape::vector(3));
        let err = ComplexEngine::<SaveTo, _, 1, _>::eval_complex(dot(&x, &w), &mut y).unwrap_err();
        assert!(matches!(err, ExprError::DotShapeMismatch { op: "dot-gemv", .. }));
    }

    #[test]
    fn test_ger_overwrites_dirty_destination() {
        let x = vector(&[1.0, 2.0]);
        let y = vector(&[3.0, 4.0]);
        let mut c = matrix(2, 2, &[100.0; 4]);
        ComplexEngine::<SaveTo, _, 2, _>::eval_complex(dot(x.t(), &y), &mut c).unwrap();
        assert_eq!(c.to_vec(), vec![3.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_ger_accumulates_through_gemm() {
        let x = vector(&[1.0, 2.0]);
        let y = vector(&[3.0, 4.0, 5.0]);
        let mut c = matrix(2, 3, &[1.0; 6]);
        ComplexEngine::<PlusTo, _, 2, _>::eval_complex(dot(x.t(), &y), &mut c).unwrap();
        assert_eq!(c.to_vec(), vec![4.0, 5.0, 6.0, 7.0, 9.0, 11.0]);
    }

    #[test]
    fn test_ger_padded_destination() {
        let x = vector(&[1.0, 2.0]);
        let y = vector(&[3.0, 4.0]);
        let mut c = Mat::with_stride(Shape::matrix(2, 2), 3).unwrap();
        c.fill(-1.0);
        ComplexEngine::<SaveTo, _, 2, _>::eval_complex(dot(x.t(), &y), &mut c).unwrap();
        assert_eq!(c.data(), &[3.0, 4.0, -1.0, 6.0, 8.0, -1.0]);
    }

    #[test]
    fn test_ger_shape_mismatch() {
        let x = vector(&[1.0, 2.0]);
        let y = vector(&[3.0, 4.0]);
        let mut c = Mat::zeros(Shape::matrix(3, 2));
        let err = ComplexEngine::<SaveTo, _, 2, _>::eval_complex(dot(x.t(), &y), &mut c).unwrap_err();
        assert!(matches!(err, ExprError::DotShapeMismatch { op: "dot-ger", .. }));
    }
}
