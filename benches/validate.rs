// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Skilltree-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Skilltree and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use skilltree::query::validate;

mod fixtures;
mod profiler;

// Benchmark identity (keep stable):
// - Group name in this file: `query.validate`
// - Case IDs (`small`, `medium`, `large`, `large_cyclic`) must stay stable so results remain
//   comparable over time.
fn benches_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("query.validate");

    for case in fixtures::Case::ALL {
        let elements = fixtures::layered_tree(case);
        group.throughput(Throughput::Elements(elements.len() as u64));
        group.bench_function(case.id(), |b| {
            b.iter(|| {
                let report = validate(black_box(&elements));
                black_box(report.is_valid())
            })
        });
    }

    let cyclic = fixtures::cyclic_tree(fixtures::Case::Large);
    group.throughput(Throughput::Elements(cyclic.len() as u64));
    group.bench_function("large_cyclic", |b| {
        b.iter(|| {
            let report = validate(black_box(&cyclic));
            black_box(report.cycle.as_ref().map(Vec::len))
        })
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = benches_validate
}
criterion_main!(benches);
