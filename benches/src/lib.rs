//! Benchmark helper utilities for mml2-rs
//!
//! Generates synthetic textures and disc images so the benches run without
//! game files.

use mml2_types::file::{ROM_STRIDE, SECTOR_SIZE, rom, texture::TEXTURE_SIZE};
use rand::{Rng, SeedableRng, rngs::SmallRng};

/// Fixed seed so every run measures the same data
pub const SEED: u64 = 0x4D4D_4C32;

/// Uniformly random bytes (worst case for the compressor)
pub fn noise(len: usize) -> Vec<u8> {
	seeded_noise(len, SEED)
}

fn seeded_noise(len: usize, seed: u64) -> Vec<u8> {
	let mut rng = SmallRng::seed_from_u64(seed);
	let mut data = vec![0u8; len];
	rng.fill(data.as_mut_slice());
	data
}

/// A texture-sized blob resembling a 4bpp image: long runs of few colors
pub fn texture_like() -> Vec<u8> {
	let mut rng = SmallRng::seed_from_u64(SEED);
	let mut data = Vec::with_capacity(TEXTURE_SIZE);
	while data.len() < TEXTURE_SIZE {
		let value = rng.random_range(0..4u8) * 0x11;
		let run = rng.random_range(1..64usize);
		data.extend(std::iter::repeat_n(value, run));
	}
	data.truncate(TEXTURE_SIZE);
	data
}

/// Builds a disc image of `size` bytes holding `file` at `offset`, with
/// decoy copies of its first sector earlier in the image.
pub fn disc_image(file: &[u8], offset: usize, size: usize, decoys: usize) -> Vec<u8> {
	let mut image = seeded_noise(size, !SEED);
	let first = &file[..file.len().min(SECTOR_SIZE)];
	for i in 0..decoys {
		let at = i * ROM_STRIDE * 4;
		if at + first.len() <= offset {
			image[at..at + first.len()].copy_from_slice(first);
		}
	}
	// Sizes are chosen by the benches so the file always fits
	if rom::patch(&mut image, offset, file).is_err() {
		image.clear();
	}
	image
}

/// Common benchmark sizes
pub mod sizes {
	/// One compression segment
	pub const SEGMENT: usize = 0x2000;
	/// `PL00T.BIN`
	pub const TEXTURE_ARCHIVE: usize = 0x8000;
	/// Small disc image (16 MiB)
	pub const SMALL_IMAGE: usize = 16 << 20;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_noise_is_deterministic() {
		assert_eq!(noise(64), noise(64));
	}

	#[test]
	fn test_texture_like_size() {
		assert_eq!(texture_like().len(), TEXTURE_SIZE);
	}

	#[test]
	fn test_disc_image_holds_file() {
		let file = noise(SECTOR_SIZE * 2);
		let image = disc_image(&file, 0x10000, 0x40000, 4);
		assert_eq!(rom::locate(&image, &file, "bench").unwrap(), 0x10000);
	}
}
