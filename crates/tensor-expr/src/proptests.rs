// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Property-based tests for element-wise and dot evaluation.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::op::{Maximum, Minus};
    use crate::{binary, dot, scalar, Cpu, EvalConfig, Evaluator, ExpExt, Shape, Tensor, TensorAssign};

    type Mat = Tensor<Cpu, 2, f64>;

    // Strategy for a matrix extent pair with its contents
    fn matrix_strategy(max: usize) -> impl Strategy<Value = (usize, usize, Vec<f64>)> {
        (1..=max, 1..=max).prop_flat_map(|(rows, cols)| {
            (
                Just(rows),
                Just(cols),
                prop::collection::vec(-100i32..100, rows * cols)
                    .prop_map(|v| v.into_iter().map(f64::from).collect()),
            )
        })
    }

    fn values(len: usize) -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec(-100i32..100, len).prop_map(|v| v.into_iter().map(f64::from).collect())
    }

    proptest! {
        #[test]
        fn map_matches_elementwise((rows, cols, a) in matrix_strategy(9), s in -10i32..10) {
            let b: Vec<f64> = a.iter().rev().copied().collect();
            let ta = Mat::from_slice(Shape::matrix(rows, cols), &a).unwrap();
            let tb = Mat::from_slice(Shape::matrix(rows, cols), &b).unwrap();
            let s = f64::from(s);

            let mut dst = Mat::zeros(Shape::matrix(rows, cols));
            dst.assign(binary::<Maximum, _, _>(&ta, &tb) * scalar(s) - &tb).unwrap();
            let expected: Vec<f64> = a.iter().zip(&b).map(|(x, y)| x.max(*y) * s - y).collect();
            prop_assert_eq!(dst.to_vec(), expected);
        }

        #[test]
        fn transpose_twice_is_identity((rows, cols, a) in matrix_strategy(8)) {
            let ta = Mat::from_slice(Shape::matrix(rows, cols), &a).unwrap();
            let mut dst = Mat::zeros(Shape::matrix(rows, cols));
            dst.assign(binary::<Minus, _, _>(ta.t().t(), scalar(0.0))).unwrap();
            prop_assert_eq!(dst.to_vec(), a);
        }

        #[test]
        fn parallel_matches_sequential((rows, cols, a) in matrix_strategy(24), threads in 2usize..6) {
            let ta = Mat::from_slice(Shape::matrix(rows, cols), &a).unwrap();
            let seq = Evaluator::new(EvalConfig::sequential());
            let par = Evaluator::new(EvalConfig { num_threads: Some(threads), parallel_threshold: 1 });

            let mut s = Mat::zeros(Shape::matrix(rows, cols));
            let mut p = Mat::zeros(Shape::matrix(rows, cols));
            seq.assign(&mut s, &ta * &ta + scalar(1.0)).unwrap();
            par.assign(&mut p, &ta * &ta + scalar(1.0)).unwrap();
            prop_assert_eq!(p.to_vec(), s.to_vec());
        }

        #[test]
        fn gemm_matches_triple_loop(
            (m, k, n) in (1usize..7, 1usize..7, 1usize..7),
            seed in any::<u64>(),
        ) {
            let seeded = |len: usize, salt: u64| -> Vec<f64> {
                (0..len as u64)
                    .map(|i| ((i.wrapping_mul(31) ^ seed.wrapping_add(salt)) % 9) as f64 - 4.0)
                    .collect()
            };
            let a = seeded(m * k, 1);
            let b = seeded(k * n, 2);
            let ta = Mat::from_slice(Shape::matrix(m, k), &a).unwrap();
            let tb = Mat::from_slice(Shape::matrix(k, n), &b).unwrap();

            let mut expected = vec![0.0; m * n];
            for i in 0..m {
                for j in 0..n {
                    for p in 0..k {
                        expected[i * n + j] += a[i * k + p] * b[p * n + j];
                    }
                }
            }

            let mut dst = Mat::zeros(Shape::matrix(m, n));
            dst.assign(dot(&ta, &tb)).unwrap();
            prop_assert_eq!(dst.to_vec(), expected.clone());

            // (B^T · A^T)^T == A · B
            let mut t = Mat::zeros(Shape::matrix(n, m));
            t.assign(dot(tb.t(), ta.t())).unwrap();
            let mut back = Mat::zeros(Shape::matrix(m, n));
            back.assign(t.t()).unwrap();
            prop_assert_eq!(back.to_vec(), expected);
        }

        #[test]
        fn outer_product_matches((x, y) in (1usize..8, 1usize..8).prop_flat_map(|(m, n)| (values(m), values(n)))) {
            let tx = Tensor::<Cpu, 1, f64>::from_slice(Shape::vector(x.len()), &x).unwrap();
            let ty = Tensor::<Cpu, 1, f64>::from_slice(Shape::vector(y.len()), &y).unwrap();
            let mut dst = Mat::zeros(Shape::matrix(x.len(), y.len()));
            dst.fill(3.0);
            dst.assign(dot(tx.t(), &ty)).unwrap();
            let expected: Vec<f64> = x.iter().flat_map(|a| y.iter().map(move |b| a * b)).collect();
            prop_assert_eq!(dst.to_vec(), expected);
        }
    }
}
