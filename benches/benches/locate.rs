//! Benchmark suite for locating archives in a disc image
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml --bench locate

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use mml2_benches::{disc_image, noise, sizes};
use mml2_types::file::rom::locate;

fn bench_locate(c: &mut Criterion) {
	let mut group = c.benchmark_group("rom_locate");
	let file = noise(sizes::TEXTURE_ARCHIVE);

	for decoys in [0usize, 16] {
		let image = disc_image(&file, sizes::SMALL_IMAGE / 2, sizes::SMALL_IMAGE, decoys);
		group.throughput(Throughput::Bytes(image.len() as u64));
		group.bench_with_input(BenchmarkId::new("decoys", decoys), &image, |b, image| {
			b.iter(|| black_box(locate(black_box(image), &file, "PL00T.BIN")));
		});
	}

	group.finish();
}

criterion_group!(benches, bench_locate);
criterion_main!(benches);
