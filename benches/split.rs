//! Benchmarks for outgoing message splitting/framing.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use slirc_proto::command::Command;
use slirc_proto::split::{split, SplitContext};

fn short_message_ctx() -> SplitContext {
    SplitContext::default()
}

fn multiline_ctx() -> SplitContext {
    SplitContext {
        batch_enabled: true,
        multiline_enabled: true,
        ..SplitContext::default()
    }
}

fn benchmark_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("Message Splitting");

    let short = Command::PRIVMSG("#channel".to_string(), "hello there".to_string());
    group.bench_function("short_single_frame", |b| {
        let ctx = short_message_ctx();
        b.iter(|| black_box(split(black_box(&ctx), black_box(&short))))
    });

    let long_text = "x".repeat(2000);
    let long = Command::PRIVMSG("#channel".to_string(), long_text);
    group.bench_function("long_message_multi_frame", |b| {
        let ctx = short_message_ctx();
        b.iter(|| black_box(split(black_box(&ctx), black_box(&long))))
    });

    for lines in [2usize, 10, 50] {
        let body = std::iter::repeat("a line of chat text")
            .take(lines)
            .collect::<Vec<_>>()
            .join("\n");
        let multiline = Command::PRIVMSG("#channel".to_string(), body);
        group.bench_with_input(BenchmarkId::new("multiline_batch", lines), &multiline, |b, cmd| {
            let ctx = multiline_ctx();
            b.iter(|| black_box(split(black_box(&ctx), black_box(cmd))))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_split);
criterion_main!(benches);
