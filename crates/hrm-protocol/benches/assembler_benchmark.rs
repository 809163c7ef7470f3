//! Throughput benchmarks for the frame assembler.
//!
//! ## Running the benchmarks
//!
//! ```bash
//! cargo bench -p hrm-protocol
//! ```
//!
//! ## Benchmarks included
//!
//! - `ingest_chunked/N` - A recorded-like stream fed in N-byte chunks
//! - `ingest_misaligned` - Chunks that never start on a header byte, per resync mode

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hrm_protocol::{Frame, FrameAssembler, ResyncMode, DEFAULT_BUFFER_CAPACITY};

/// Build a stream of `count` consecutive frames.
fn make_stream(count: usize) -> Vec<u8> {
    (0..count)
        .flat_map(|i| {
            Frame::new(i as u8, 0xF0 | (i as u8 & 1), 60 + (i % 120) as u8, 800 + i as u16)
                .as_bytes()
                .to_vec()
        })
        .collect()
}

fn bench_ingest_chunked(c: &mut Criterion) {
    let stream = make_stream(4096);
    let mut group = c.benchmark_group("ingest_chunked");
    group.throughput(Throughput::Bytes(stream.len() as u64));

    for chunk_size in [1usize, 7, 8, 64, 1024].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(chunk_size), chunk_size, |b, &size| {
            b.iter(|| {
                let mut assembler = FrameAssembler::new();
                let mut total = 0u64;
                for chunk in stream.chunks(size) {
                    assembler.ingest(chunk, |reading| {
                        total += u64::from(reading.heart_rate.unwrap_or(0));
                    });
                }
                black_box(total)
            });
        });
    }
    group.finish();
}

fn bench_ingest_misaligned(c: &mut Criterion) {
    let mut stream = vec![0x00, 0x01, 0x02];
    stream.extend(make_stream(4096));
    let mut group = c.benchmark_group("ingest_misaligned");
    group.throughput(Throughput::Bytes(stream.len() as u64));

    for mode in [ResyncMode::ChunkStart, ResyncMode::ScanBuffer] {
        group.bench_with_input(BenchmarkId::from_parameter(mode), &mode, |b, &mode| {
            b.iter(|| {
                let mut assembler = FrameAssembler::with_options(DEFAULT_BUFFER_CAPACITY, mode);
                let mut count = 0usize;
                for chunk in stream.chunks(13) {
                    count += assembler.ingest(chunk, |_| {});
                }
                black_box(count)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_ingest_chunked, bench_ingest_misaligned);
criterion_main!(benches);
