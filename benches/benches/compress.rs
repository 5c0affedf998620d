//! Benchmark suite for the segment compressor
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml --bench compress

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use mml2_benches::{noise, sizes, texture_like};
use mml2_types::file::compress::{compress, decompress};

fn bench_compress(c: &mut Criterion) {
	let mut group = c.benchmark_group("compress");

	let inputs = [
		("texture", texture_like()),
		("noise_segment", noise(sizes::SEGMENT)),
		("noise_archive", noise(sizes::TEXTURE_ARCHIVE)),
	];

	for (name, data) in &inputs {
		group.throughput(Throughput::Bytes(data.len() as u64));
		group.bench_with_input(BenchmarkId::new("compress", name), data, |b, data| {
			b.iter(|| black_box(compress(black_box(data))));
		});
	}

	group.finish();
}

fn bench_decompress(c: &mut Criterion) {
	let mut group = c.benchmark_group("decompress");

	let inputs = [("texture", texture_like()), ("noise_archive", noise(sizes::TEXTURE_ARCHIVE))];

	for (name, data) in &inputs {
		let packed = compress(data);
		group.throughput(Throughput::Bytes(data.len() as u64));
		group.bench_with_input(BenchmarkId::new("decompress", name), &packed, |b, packed| {
			b.iter(|| black_box(decompress(&packed.bitfield, &packed.payload, data.len())));
		});
	}

	group.finish();
}

criterion_group!(benches, bench_compress, bench_decompress);
criterion_main!(benches);
