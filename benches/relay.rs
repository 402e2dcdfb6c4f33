//! Benchmarks for the binary relay codec: object encoding and frame
//! compression/decompression.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use slirc_proto::relay::{decode_frame, encode_frame, FieldKind, Hdata, HdataRow, Object, ObjectKind};

fn sample_hdata(rows: usize) -> Object {
    let keys = vec![
        ("group".to_string(), FieldKind::Scalar(ObjectKind::Char)),
        ("visible".to_string(), FieldKind::Scalar(ObjectKind::Char)),
        ("level".to_string(), FieldKind::Scalar(ObjectKind::Int)),
        ("name".to_string(), FieldKind::Scalar(ObjectKind::Str)),
        ("color".to_string(), FieldKind::Scalar(ObjectKind::Str)),
        ("prefix".to_string(), FieldKind::Scalar(ObjectKind::Str)),
        ("prefix_color".to_string(), FieldKind::Scalar(ObjectKind::Str)),
    ];
    let rows = (0..rows)
        .map(|i| HdataRow {
            path_pointers: vec![0x1000, 0x2000 + i as u64],
            values: vec![
                Object::Char(0),
                Object::Char(1),
                Object::Int(0),
                Object::Str(Some(format!("nick{i}"))),
                Object::Str(Some("bar_fg".to_string())),
                Object::Str(Some(String::new())),
                Object::Str(Some(String::new())),
            ],
        })
        .collect();
    Object::Hdata(Hdata { hpath: "buffer/nicklist_item".to_string(), keys, rows })
}

fn benchmark_object_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("Relay Object Encoding");
    for count in [10usize, 100, 1000] {
        let obj = sample_hdata(count);
        group.bench_with_input(BenchmarkId::new("hdata_write_tagged", count), &obj, |b, obj| {
            b.iter(|| {
                let mut buf = Vec::new();
                black_box(obj).write_tagged(&mut buf);
                black_box(buf)
            })
        });
    }
    group.finish();
}

fn benchmark_frame_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("Relay Frame Round Trip");

    for count in [10usize, 100, 1000] {
        let obj = sample_hdata(count);
        let mut payload = Vec::new();
        payload.extend_from_slice(&0i32.to_be_bytes());
        obj.write_tagged(&mut payload);

        group.bench_with_input(BenchmarkId::new("encode_frame", count), &payload, |b, payload| {
            b.iter(|| black_box(encode_frame(black_box(payload))))
        });

        let frame = encode_frame(&payload);
        group.bench_with_input(BenchmarkId::new("decode_frame", count), &frame, |b, frame| {
            b.iter(|| black_box(decode_frame(black_box(frame)).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_object_encoding, benchmark_frame_round_trip);
criterion_main!(benches);
