//! Codec and pattern benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use oscar_core::{codec, Message, Pattern, TimeTag};

fn sample_message() -> Message {
    Message::new("/test/benchmark/value")
        .with_arg(42)
        .with_arg(3.14159f32)
        .with_arg("sine")
        .with_arg(TimeTag::IMMEDIATELY)
        .with_arg(true)
}

fn encode_benchmark(c: &mut Criterion) {
    let msg = sample_message();

    c.bench_function("encode_message", |b| {
        b.iter(|| black_box(codec::encode(&msg)))
    });
}

fn decode_benchmark(c: &mut Criterion) {
    let encoded = codec::encode(&sample_message());

    c.bench_function("decode_message", |b| {
        b.iter(|| black_box(codec::decode(&encoded).unwrap()))
    });
}

fn pattern_benchmark(c: &mut Criterion) {
    let pattern = Pattern::parse("/synth/*/osc[0-9]/fr?q*").unwrap();

    c.bench_function("pattern_match", |b| {
        b.iter(|| black_box(pattern.matches("/synth/voice/12/osc3/freq/fine")))
    });

    c.bench_function("pattern_compile", |b| {
        b.iter(|| black_box(Pattern::parse("/synth/*/osc[0-9]/fr?q*").unwrap()))
    });
}

criterion_group!(benches, encode_benchmark, decode_benchmark, pattern_benchmark);
criterion_main!(benches);
