// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

use ci_matrix::{ConfigFormat, MatrixConfig, parse_config};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn config_with(build_types: usize, devices: usize,) -> MatrixConfig
{
    MatrixConfig {
        build_types: (0..build_types).map(|i| format!("profile{i}"),).collect(),
        devices:     (0..devices).map(|i| format!("device{i}"),).collect(),
    }
}

fn benchmark_parse_config(c: &mut Criterion,)
{
    let json = r#"{"build_types": ["debug", "release"], "devices": ["xc7a35t", "xczu7ev"]}"#;

    c.bench_function("parse_config_json", |b| {
        b.iter(|| parse_config(black_box(json,), ConfigFormat::Json,).expect("parse failed",),)
    },);
}

fn benchmark_expand_small(c: &mut Criterion,)
{
    let config = config_with(2, 2,);

    c.bench_function("expand_2x2", |b| b.iter(|| black_box(&config,).expand(),),);
}

fn benchmark_expand_large(c: &mut Criterion,)
{
    let config = config_with(16, 64,);

    c.bench_function("expand_16x64", |b| {
        b.iter(|| {
            let matrix = black_box(&config,).expand();
            black_box(matrix.len(),)
        },)
    },);
}

fn benchmark_serialize_matrix(c: &mut Criterion,)
{
    let matrix = config_with(16, 64,).expand();

    c.bench_function("serialize_16x64", |b| {
        b.iter(|| black_box(&matrix,).to_json().expect("serialize failed",),)
    },);
}

criterion_group!(
    benches,
    benchmark_parse_config,
    benchmark_expand_small,
    benchmark_expand_large,
    benchmark_serialize_matrix
);
criterion_main!(benches);
