// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for fused element-wise evaluation and the dot engine.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tensor_expr::op::Maximum;
use tensor_expr::{binary, dot, scalar, Cpu, EvalConfig, Evaluator, ExpExt, Shape, Tensor};

type Mat = Tensor<Cpu, 2, f32>;

fn filled(rows: usize, cols: usize, seed: usize) -> Mat {
    let values: Vec<f32> = (0..rows * cols)
        .map(|i| ((i * 13 + seed) % 17) as f32 * 0.25)
        .collect();
    Tensor::from_slice(Shape::matrix(rows, cols), &values).unwrap()
}

fn bench_fused_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("fused_map");
    for n in [64, 256, 1024] {
        let a = filled(n, n, 1);
        let b = filled(n, n, 2);
        let mut dst = Mat::zeros(Shape::matrix(n, n));

        let seq = Evaluator::new(EvalConfig::sequential());
        group.bench_with_input(BenchmarkId::new("sequential", n), &n, |bench, _| {
            bench.iter(|| {
                seq.assign(&mut dst, &a * binary::<Maximum, _, _>(&b, scalar(1.0)) + &a)
                    .unwrap();
                black_box(dst.data()[0])
            })
        });

        let par = Evaluator::default();
        group.bench_with_input(BenchmarkId::new("parallel", n), &n, |bench, _| {
            bench.iter(|| {
                par.assign(&mut dst, &a * binary::<Maximum, _, _>(&b, scalar(1.0)) + &a)
                    .unwrap();
                black_box(dst.data()[0])
            })
        });
    }
    group.finish();
}

fn bench_transpose_map(c: &mut Criterion) {
    let a = filled(512, 512, 3);
    let mut dst = Mat::zeros(Shape::matrix(512, 512));
    let eval = Evaluator::new(EvalConfig::sequential());
    c.bench_function("transpose_map_512", |bench| {
        bench.iter(|| {
            eval.assign(&mut dst, a.t() + &a).unwrap();
            black_box(dst.data()[1])
        })
    });
}

fn bench_gemm(c: &mut Criterion) {
    let mut group = c.benchmark_group("gemm");
    for n in [32, 128, 256] {
        let a = filled(n, n, 4);
        let b = filled(n, n, 5);
        let mut dst = Mat::zeros(Shape::matrix(n, n));
        let eval = Evaluator::default();
        group.bench_with_input(BenchmarkId::new("plain", n), &n, |bench, _| {
            bench.iter(|| {
                eval.assign(&mut dst, dot(&a, &b)).unwrap();
                black_box(dst.data()[0])
            })
        });
        group.bench_with_input(BenchmarkId::new("transposed_rhs", n), &n, |bench, _| {
            bench.iter(|| {
                eval.assign(&mut dst, dot(&a, b.t())).unwrap();
                black_box(dst.data()[0])
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_fused_map, bench_transpose_map, bench_gemm);
criterion_main!(benches);
