use bso::{
    from_slice, from_slice_with_options, from_str, from_tag, to_bytes, to_bytes_with_options,
    to_string, to_string_pretty, to_tag, BinaryOptions, Tag,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone)]
struct Entity {
    id: u32,
    name: String,
    pos: (f64, f64, f64),
    health: f32,
    alive: bool,
}

fn entities(count: u32) -> Vec<Entity> {
    (0..count)
        .map(|i| Entity {
            id: i,
            name: format!("entity_{i}"),
            pos: (f64::from(i) * 1.5, 64.0, -f64::from(i)),
            health: 20.0,
            alive: i % 3 != 0,
        })
        .collect()
}

fn world(count: u32) -> Tag {
    Tag::map([
        ("name", Tag::String("overworld".into())),
        ("seed", Tag::Long(-4_172_144_997_902_289_642)),
        ("heights", Tag::IntArray((0..256).map(|i| i * 3 - 100).collect())),
        ("entities", to_tag(&entities(count)).unwrap()),
    ])
    .unwrap()
}

fn benchmark_encode_binary(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_binary");
    for size in [10, 100, 500].iter() {
        let tag = world(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &tag, |b, tag| {
            b.iter(|| to_bytes(black_box(tag)))
        });
    }
    group.finish();
}

fn benchmark_decode_binary(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_binary");
    for size in [10, 100, 500].iter() {
        let bytes = to_bytes(&world(*size)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &bytes, |b, bytes| {
            b.iter(|| from_slice(black_box(bytes)))
        });
    }
    group.finish();
}

fn benchmark_binary_options(c: &mut Criterion) {
    let tag = world(100);
    let mut group = c.benchmark_group("binary_options");

    let options = [
        ("counted_narrowed", BinaryOptions::new()),
        ("counted_native", BinaryOptions::new().with_narrowing(false)),
        ("indefinite", BinaryOptions::indefinite()),
    ];
    for (name, options) in options {
        let bytes = to_bytes_with_options(&tag, &options).unwrap();
        group.bench_function(format!("encode_{name}"), |b| {
            b.iter(|| to_bytes_with_options(black_box(&tag), &options))
        });
        group.bench_function(format!("decode_{name}"), |b| {
            b.iter(|| from_slice_with_options(black_box(&bytes), &options))
        });
    }
    group.finish();
}

fn benchmark_text(c: &mut Criterion) {
    let tag = world(100);
    let compact = to_string(&tag);
    let pretty = to_string_pretty(&tag);

    let mut group = c.benchmark_group("text");
    group.bench_function("render_compact", |b| b.iter(|| to_string(black_box(&tag))));
    group.bench_function("render_pretty", |b| {
        b.iter(|| to_string_pretty(black_box(&tag)))
    });
    group.bench_function("parse_compact", |b| b.iter(|| from_str(black_box(&compact))));
    group.bench_function("parse_pretty", |b| b.iter(|| from_str(black_box(&pretty))));
    group.finish();
}

fn benchmark_serde_bridge(c: &mut Criterion) {
    let data = entities(100);
    let tag = to_tag(&data).unwrap();
    let json = serde_json::to_string(&data).unwrap();
    let bytes = to_bytes(&tag).unwrap();

    let mut group = c.benchmark_group("comparison");
    group.bench_function("bso_serialize", |b| {
        b.iter(|| to_bytes(&to_tag(black_box(&data)).unwrap()))
    });
    group.bench_function("json_serialize", |b| {
        b.iter(|| serde_json::to_string(black_box(&data)))
    });
    group.bench_function("bso_deserialize", |b| {
        b.iter(|| from_tag::<Vec<Entity>>(from_slice(black_box(&bytes)).unwrap()))
    });
    group.bench_function("json_deserialize", |b| {
        b.iter(|| serde_json::from_str::<Vec<Entity>>(black_box(&json)))
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_encode_binary,
    benchmark_decode_binary,
    benchmark_binary_options,
    benchmark_text,
    benchmark_serde_bridge
);
criterion_main!(benches);
