//! Texture pages rendered from a captured framebuffer.
//!
//! VRAM is 1024×512 16-bit words. Entity texture tables reference a 4bpp
//! texture page and a palette row by packed coordinate words.

use super::{AssetError, AssetKind, raw, texture::PALETTE_COLORS};
use crate::codec::Texel;

/// VRAM width in 16-bit words
pub const VRAM_WIDTH: usize = 1024;

/// VRAM height in rows
pub const VRAM_HEIGHT: usize = 512;

/// Size of a full VRAM dump
pub const VRAM_SIZE: usize = VRAM_WIDTH * VRAM_HEIGHT * 2;

/// Side of a rendered texture page
pub const PAGE_SIZE: usize = 256;

const ROW_BYTES: usize = VRAM_WIDTH * 2;

/// Decodes a texture page coordinate word to VRAM `(x, y)`.
///
/// # Examples
///
/// ```
/// use mml2_types::file::vram::image_origin;
///
/// assert_eq!(image_origin(0x0005), (0x140, 0));
/// assert_eq!(image_origin(0x0015), (0x140, 256));
/// ```
pub fn image_origin(image_coords: u16) -> (usize, usize) {
	let x = ((image_coords & 0x0F) as usize) << 6;
	let y = if image_coords & 0x10 != 0 {
		0x100
	} else {
		0
	};
	(x, y)
}

/// Decodes a palette coordinate word to VRAM `(x, y)`.
pub fn palette_origin(palette_coords: u16) -> (usize, usize) {
	let x = ((palette_coords & 0x3F) as usize) << 4;
	let y = (palette_coords >> 6) as usize;
	(x, y)
}

/// A borrowed VRAM dump
#[derive(Debug, Clone, Copy)]
pub struct Framebuffer<'a> {
	data: &'a [u8],
}

impl<'a> Framebuffer<'a> {
	/// Wraps a VRAM dump; it must hold at least [`VRAM_SIZE`] bytes.
	pub fn new(data: &'a [u8]) -> Result<Self, AssetError> {
		if data.len() < VRAM_SIZE {
			return Err(AssetError::insufficient_data(AssetKind::Texture, VRAM_SIZE, data.len()));
		}
		Ok(Self {
			data,
		})
	}

	/// Reads the 16 palette entries at a palette coordinate word.
	pub fn palette(&self, palette_coords: u16) -> Result<[Texel; PALETTE_COLORS], AssetError> {
		let (x, y) = palette_origin(palette_coords);
		let ofs = y * ROW_BYTES + x * 2;
		let mut palette = [Texel::TRANSPARENT; PALETTE_COLORS];
		for (i, texel) in palette.iter_mut().enumerate() {
			*texel = Texel(raw::read_u16(self.data, ofs + i * 2, AssetKind::Texture)?);
		}
		Ok(palette)
	}

	/// Renders a 256×256 RGBA8 page.
	pub fn render_page(&self, image_coords: u16, palette_coords: u16) -> Result<Vec<u8>, AssetError> {
		let palette = self.palette(palette_coords)?;
		let (x, y) = image_origin(image_coords);

		let mut rgba = Vec::with_capacity(PAGE_SIZE * PAGE_SIZE * 4);
		for row in 0..PAGE_SIZE {
			let ofs = (y + row) * ROW_BYTES + x * 2;
			let pixels = raw::slice(self.data, ofs, PAGE_SIZE / 2, AssetKind::Texture)?;
			for &byte in pixels {
				rgba.extend_from_slice(&palette[(byte & 0x0F) as usize].to_rgba());
				rgba.extend_from_slice(&palette[(byte >> 4) as usize].to_rgba());
			}
		}
		Ok(rgba)
	}
}
