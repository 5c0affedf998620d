//! Palette + 4bpp texture codec.
//!
//! A texture is a 16-entry palette of [`Texel`]s followed by a 256×256
//! image with two pixels per byte, first pixel in the low nibble.
//!
//! ```text
//! +0x0000  u16 × 16     palette, entry 0 reserved as 0x0000
//! +0x0020  u8 × 0x8000  4bpp pixels, row-major
//! ```

use std::collections::HashMap;

use crate::{
	codec::{CodecOptions, Texel},
	file::{AssetError, AssetKind},
};

/// Width of a full texture
pub const TEXTURE_WIDTH: u32 = 256;

/// Height of a full texture
pub const TEXTURE_HEIGHT: u32 = 256;

/// Number of palette entries
pub const PALETTE_COLORS: usize = 16;

/// Size of the serialized palette
pub const PALETTE_SIZE: usize = PALETTE_COLORS * 2;

/// Size of the serialized 256×256 image
pub const IMAGE_SIZE: usize = (TEXTURE_WIDTH * TEXTURE_HEIGHT / 2) as usize;

/// Size of palette + image
pub const TEXTURE_SIZE: usize = PALETTE_SIZE + IMAGE_SIZE;

/// An image quantized to a palette, any even width
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedImage {
	/// Width in pixels
	pub width: u32,
	/// Height in pixels
	pub height: u32,
	/// Palette in index order, at most [`PALETTE_COLORS`] entries
	pub palette: Vec<Texel>,
	/// Packed pixels, `width / 2` bytes per row
	pub pixels: Vec<u8>,
}

/// Quantizes RGBA8 pixels to a palette and packs them two per byte.
///
/// The palette starts with [`Texel::TRANSPARENT`] at index 0; every other
/// texel gets the next free index the first time it is seen. More than
/// [`PALETTE_COLORS`] distinct texels is an [`AssetError::PaletteOverflow`]
/// in strict mode. In compatible mode the extra entries are dropped from the
/// palette and their indices are packed unmasked, like existing patched
/// archives.
///
/// # Examples
///
/// ```
/// use mml2_types::{codec::CodecOptions, file::texture::index_image};
///
/// let red = [255, 0, 0, 255];
/// let green = [0, 255, 0, 255];
/// let blue = [0, 0, 255, 255];
/// let rgba = [red, green, red, blue].concat();
///
/// let image = index_image(&rgba, 2, 2, CodecOptions::default()).unwrap();
/// assert_eq!(image.pixels, vec![0x21, 0x31]);
/// assert_eq!(image.palette.len(), 4);
/// ```
pub fn index_image(rgba: &[u8], width: u32, height: u32, options: CodecOptions) -> Result<IndexedImage, AssetError> {
	if width % 2 != 0 {
		return Err(AssetError::format(AssetKind::Texture, format!("image width {width} is not even")));
	}

	let pixel_count = (width as usize) * (height as usize);
	if rgba.len() != pixel_count * 4 {
		return Err(AssetError::insufficient_data(AssetKind::Texture, pixel_count * 4, rgba.len()));
	}

	let mut palette = vec![Texel::TRANSPARENT];
	let mut lookup = HashMap::from([(Texel::TRANSPARENT, 0usize)]);
	let mut index_of = |texel: Texel| -> usize {
		*lookup.entry(texel).or_insert_with(|| {
			palette.push(texel);
			palette.len() - 1
		})
	};

	let mut pixels = Vec::with_capacity(pixel_count / 2);
	for pair in rgba.chunks_exact(8) {
		let low = index_of(Texel::from_rgba([pair[0], pair[1], pair[2], pair[3]]));
		let high = index_of(Texel::from_rgba([pair[4], pair[5], pair[6], pair[7]]));
		pixels.push(((high << 4) | low) as u8);
	}

	if palette.len() > PALETTE_COLORS {
		if options.strict {
			return Err(AssetError::PaletteOverflow {
				colors: palette.len(),
				capacity: PALETTE_COLORS,
			});
		}
		log::warn!(
			"Image uses {} colors, dropping {} palette entries",
			palette.len(),
			palette.len() - PALETTE_COLORS
		);
		palette.truncate(PALETTE_COLORS);
	}

	Ok(IndexedImage {
		width,
		height,
		palette,
		pixels,
	})
}

/// Expands packed 4bpp pixels to RGBA8 through `palette`.
///
/// Indices past the end of the palette decode as transparent.
pub fn expand_pixels(palette: &[Texel], pixels: &[u8]) -> Vec<u8> {
	let lookup = |index: u8| palette.get(index as usize).copied().unwrap_or_default().to_rgba();
	let mut rgba = Vec::with_capacity(pixels.len() * 8);
	for &byte in pixels {
		rgba.extend_from_slice(&lookup(byte & 0x0F));
		rgba.extend_from_slice(&lookup(byte >> 4));
	}
	rgba
}

/// A full 256×256 texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
	/// Palette, unused entries are [`Texel::TRANSPARENT`]
	pub palette: [Texel; PALETTE_COLORS],
	/// Packed pixels, [`IMAGE_SIZE`] bytes
	pub image: Vec<u8>,
}

impl Default for Texture {
	fn default() -> Self {
		Self {
			palette: [Texel::TRANSPARENT; PALETTE_COLORS],
			image: vec![0; IMAGE_SIZE],
		}
	}
}

impl Texture {
	/// Encodes a 256×256 RGBA8 image.
	pub fn from_rgba(rgba: &[u8], width: u32, height: u32, options: CodecOptions) -> Result<Self, AssetError> {
		if width != TEXTURE_WIDTH || height != TEXTURE_HEIGHT {
			return Err(AssetError::InvalidDimensions {
				width,
				height,
				expected_width: TEXTURE_WIDTH,
				expected_height: TEXTURE_HEIGHT,
			});
		}

		let indexed = index_image(rgba, width, height, options)?;
		let mut palette = [Texel::TRANSPARENT; PALETTE_COLORS];
		palette[..indexed.palette.len()].copy_from_slice(&indexed.palette);

		Ok(Self {
			palette,
			image: indexed.pixels,
		})
	}

	/// Parses palette + image bytes.
	pub fn from_bytes(data: &[u8]) -> Result<Self, AssetError> {
		if data.len() < TEXTURE_SIZE {
			return Err(AssetError::insufficient_data(AssetKind::Texture, TEXTURE_SIZE, data.len()));
		}

		let mut palette = [Texel::TRANSPARENT; PALETTE_COLORS];
		for (i, texel) in palette.iter_mut().enumerate() {
			*texel = Texel::from_le_bytes([data[i * 2], data[i * 2 + 1]]);
		}

		Ok(Self {
			palette,
			image: data[PALETTE_SIZE..TEXTURE_SIZE].to_vec(),
		})
	}

	/// Serialized palette
	pub fn palette_bytes(&self) -> [u8; PALETTE_SIZE] {
		let mut out = [0u8; PALETTE_SIZE];
		for (chunk, texel) in out.chunks_exact_mut(2).zip(self.palette) {
			chunk.copy_from_slice(&texel.to_le_bytes());
		}
		out
	}

	/// Serialized palette followed by the image.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut out = Vec::with_capacity(TEXTURE_SIZE);
		out.extend_from_slice(&self.palette_bytes());
		out.extend_from_slice(&self.image);
		out
	}

	/// Decodes to 256×256 RGBA8.
	pub fn to_rgba(&self) -> Vec<u8> {
		expand_pixels(&self.palette, &self.image)
	}
}
