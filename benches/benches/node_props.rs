// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for `understory_node_props`.

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::rc::Rc;
use std::sync::Once;

use kurbo::Affine;
use understory_node_props::{
    DerivedProp, HostValue, LocalMatrixProp, NameRegistry, Numbers16Prop, PropName,
    PropsContainer, RRectProps, process_transform,
};

fn discrete_rrect(x: f64) -> [(PropName, HostValue); 5] {
    [
        (PropName::X, HostValue::Number(x)),
        (PropName::Y, HostValue::Number(0.0)),
        (PropName::WIDTH, HostValue::Number(100.0)),
        (PropName::HEIGHT, HostValue::Number(50.0)),
        (PropName::R, HostValue::Number(4.0)),
    ]
}

fn transform_array(len: usize) -> HostValue {
    let keys = [
        PropName::TRANSLATE_X,
        PropName::SCALE,
        PropName::ROTATE,
        PropName::SKEW_X,
    ];
    HostValue::Array(
        (0..len)
            .map(|i| HostValue::object([(keys[i % keys.len()], HostValue::Number(0.25))]))
            .collect(),
    )
}

fn bench_node_props(c: &mut Criterion) {
    static PRINT_SIZES: Once = Once::new();
    PRINT_SIZES.call_once(|| {
        eprintln!(
            "sizes: PropsContainer={} HostValue={} RRectProps={}",
            core::mem::size_of::<PropsContainer>(),
            core::mem::size_of::<HostValue>(),
            core::mem::size_of::<RRectProps>(),
        );
    });

    let names = Rc::new(NameRegistry::new());

    let mut group = c.benchmark_group("node_props/derive");

    group.bench_function("rrect/cached", |b| {
        let mut props = PropsContainer::new(names.clone());
        let mut rrect = RRectProps::new(&mut props, PropName::RECT);
        props.begin_update_pass(discrete_rrect(0.0));
        b.iter(|| black_box(rrect.derived_value(&props).is_ok()));
    });

    group.bench_function("rrect/recompute_each_pass", |b| {
        let mut props = PropsContainer::new(names.clone());
        let mut rrect = RRectProps::new(&mut props, PropName::RECT);
        props.begin_update_pass(discrete_rrect(0.0));
        let mut x = 0.0;
        b.iter(|| {
            x += 1.0;
            props.begin_update_pass([(PropName::X, HostValue::Number(x))]);
            black_box(rrect.derived_value(&props).is_ok_and(|v| v.is_some()))
        });
    });

    group.bench_function("rrect/unread_passes", |b| {
        let mut props = PropsContainer::new(names.clone());
        let _rrect = RRectProps::new(&mut props, PropName::RECT);
        b.iter(|| props.begin_update_pass(discrete_rrect(1.0)));
    });

    group.bench_function("local_matrix/transform4", |b| {
        b.iter_batched(
            || {
                let mut props = PropsContainer::new(names.clone());
                let local = LocalMatrixProp::new(&mut props);
                props.begin_update_pass([(PropName::TRANSFORM, transform_array(4))]);
                (props, local)
            },
            |(props, mut local)| black_box(local.derived_value(&props).is_ok()),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("numbers16/1024", |b| {
        let mut names = NameRegistry::new();
        let indices = names.intern("indices");
        let mut props = PropsContainer::new(Rc::new(names));
        let mut narrowed = Numbers16Prop::new(&mut props, indices);
        let values = HostValue::numbers((0..1024).map(f64::from));
        b.iter_batched(
            || values.clone(),
            |values| {
                props.begin_update_pass([(indices, values)]);
                black_box(narrowed.derived_value(&props).is_ok())
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();

    let mut group = c.benchmark_group("node_props/transform");
    for len in [1_usize, 4, 16] {
        let transform = transform_array(len);
        group.bench_function(BenchmarkId::new("fold", len), |b| {
            b.iter(|| black_box(process_transform(Affine::IDENTITY, &transform, &names)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_node_props);
criterion_main!(benches);
