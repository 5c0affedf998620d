//! Locating and replacing archives inside a raw disc image.
//!
//! A raw (2352-byte sector) image stores each 0x800-byte data sector inside
//! a [`ROM_STRIDE`]-byte frame, so a file spanning several sectors appears as
//! 0x800-byte runs spaced 0x930 bytes apart.
//!
//! Locating a file works in four steps:
//!
//! 1. Split the original file into 0x800-byte sectors (the last may be short).
//! 2. Collect every occurrence of the first sector, scanning byte by byte.
//! 3. Verify candidates from the last one backwards: sector `i` must be the
//!    first occurrence at or after sector `i - 1`, exactly `0x930` bytes
//!    further for middle sectors and `0x800..=0x950` bytes further for the
//!    final one. A single-sector file is verified by its anchor alone.
//! 4. The first fully verified chain wins.
//!
//! Patching writes sector `i` of the new file at `offset + i × 0x930`. Only
//! the sector's own bytes are written, so a short final sector leaves the
//! rest of its frame untouched.

use std::path::Path;

use memchr::memmem;

use super::{AssetError, AssetKind, ROM_STRIDE, SECTOR_SIZE};

/// Smallest distance to the final sector
const FINAL_MIN_DISTANCE: usize = 0x800;

/// Largest distance to the final sector
const FINAL_MAX_DISTANCE: usize = 0x950;

/// Splits `data` into sectors.
pub fn split_sectors(data: &[u8]) -> Vec<&[u8]> {
	data.chunks(SECTOR_SIZE).collect()
}

/// Finds the offset of `needle` inside `image`.
///
/// `name` is used in the error when no candidate verifies.
///
/// # Examples
///
/// ```
/// use mml2_types::file::rom::locate;
///
/// let mut image = vec![0u8; 0x3000];
/// image[0x1234..0x1238].copy_from_slice(b"PL00");
/// assert_eq!(locate(&image, b"PL00", "PL00T.BIN").unwrap(), 0x1234);
/// assert!(locate(&image, b"ST00", "ST00.BIN").is_err());
/// ```
pub fn locate(image: &[u8], needle: &[u8], name: &str) -> Result<usize, AssetError> {
	let sectors = split_sectors(needle);
	let Some(first) = sectors.first() else {
		return Err(AssetError::format(AssetKind::Rom, format!("cannot search for empty file {name}")));
	};

	let anchors = find_overlapping(image, first);
	log::debug!("{name}: {} candidate(s) for the first sector", anchors.len());

	for &anchor in anchors.iter().rev() {
		if verify_chain(image, &sectors, anchor) {
			log::info!("Located {name} at 0x{anchor:X}");
			return Ok(anchor);
		}
		log::debug!("{name}: candidate 0x{anchor:X} rejected");
	}

	Err(AssetError::NotFound {
		name: name.to_string(),
	})
}

/// Every occurrence of `needle`, including overlapping ones.
fn find_overlapping(image: &[u8], needle: &[u8]) -> Vec<usize> {
	let finder = memmem::Finder::new(needle);
	let mut found = Vec::new();
	let mut from = 0;
	while let Some(pos) = image.get(from..).and_then(|rest| finder.find(rest)) {
		found.push(from + pos);
		from += pos + 1;
	}
	found
}

fn verify_chain(image: &[u8], sectors: &[&[u8]], anchor: usize) -> bool {
	let last_index = sectors.len() - 1;
	let mut previous = anchor;

	for (i, sector) in sectors.iter().enumerate().skip(1) {
		let Some(distance) = image.get(previous..).and_then(|rest| memmem::find(rest, sector)) else {
			return false;
		};
		let accepted = if i == last_index {
			(FINAL_MIN_DISTANCE..=FINAL_MAX_DISTANCE).contains(&distance)
		} else {
			distance == ROM_STRIDE
		};
		if !accepted {
			return false;
		}
		previous += distance;
	}

	true
}

/// Writes `data` sector by sector starting at `offset`.
pub fn patch(image: &mut [u8], offset: usize, data: &[u8]) -> Result<(), AssetError> {
	let size = image.len();
	for (i, sector) in split_sectors(data).into_iter().enumerate() {
		let start = offset + i * ROM_STRIDE;
		let end = start + sector.len();
		image
			.get_mut(start..end)
			.ok_or(AssetError::OutOfRange {
				kind: AssetKind::Rom,
				offset: start,
				end,
				size,
			})?
			.copy_from_slice(sector);
	}
	Ok(())
}

/// An in-memory disc image
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RomImage {
	data: Vec<u8>,
}

impl RomImage {
	/// Wraps raw image bytes.
	pub fn from_bytes(data: Vec<u8>) -> Self {
		Self {
			data,
		}
	}

	/// Loads an image from disk.
	pub fn open(path: impl AsRef<Path>) -> Result<Self, AssetError> {
		let data = std::fs::read(path)?;
		Ok(Self::from_bytes(data))
	}

	/// Writes the image to disk.
	pub fn save(&self, path: impl AsRef<Path>) -> Result<(), AssetError> {
		std::fs::write(path, &self.data)?;
		Ok(())
	}

	/// Raw image bytes
	pub fn as_bytes(&self) -> &[u8] {
		&self.data
	}

	/// Image size in bytes
	pub fn len(&self) -> usize {
		self.data.len()
	}

	/// Returns `true` if the image is empty.
	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	/// Finds `original` in the image. See [`locate`].
	pub fn locate(&self, original: &[u8], name: &str) -> Result<usize, AssetError> {
		locate(&self.data, original, name)
	}

	/// Writes `data` at `offset`. See [`patch`].
	pub fn patch(&mut self, offset: usize, data: &[u8]) -> Result<(), AssetError> {
		patch(&mut self.data, offset, data)
	}

	/// Finds `original` and overwrites it with `replacement`.
	///
	/// Returns the offset that was patched.
	pub fn replace(&mut self, original: &[u8], replacement: &[u8], name: &str) -> Result<usize, AssetError> {
		let offset = self.locate(original, name)?;
		self.patch(offset, replacement)?;
		log::info!("Patched {name} at 0x{offset:X} ({} bytes)", replacement.len());
		Ok(offset)
	}
}
