//! PC `.DAT` texture archives.
//!
//! The first sector is a table of 16-byte entries (`type`, `length`, two
//! unused parameters) terminated by the `dumm` marker or the end of the
//! sector. Payloads follow sequentially from `0x800`:
//!
//! - type 4: a palette record followed by an image record
//! - type 3: a palette record applied to the previous image
//!
//! Palette record: `u32 length, u16 x, u16 y, u16 colors, u16 palettes`,
//! then `colors` texels. Image record: `u32 length, u16 x, u16 y,
//! u16 width / 4, u16 height`, then `length - 12` bytes of 4bpp pixels.

use super::{AssetError, AssetKind, SECTOR_SIZE, raw, texture::PALETTE_COLORS};
use crate::codec::Texel;

/// Header table terminator (`"dumm"`)
pub const DUMMY_MARKER: u32 = 0x6D6D_7564;

/// Size of a header table entry
const ENTRY_SIZE: usize = 16;

/// Size of a palette or image record header
const RECORD_HEADER_SIZE: usize = 12;

/// Header table entry types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
	/// Palette for the previous image
	Palette,
	/// Palette and image
	Image,
	/// Anything else, skipped
	Other(u32),
}

impl From<u32> for EntryType {
	fn from(value: u32) -> Self {
		match value {
			3 => Self::Palette,
			4 => Self::Image,
			other => Self::Other(other),
		}
	}
}

/// One header table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatEntry {
	/// Entry type
	pub entry_type: EntryType,
	/// Payload length
	pub length: u32,
}

/// A decoded texture: first palette plus unpacked indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatTexture {
	/// Palette VRAM coordinates
	pub palette_coords: (u16, u16),
	/// Image VRAM coordinates
	pub image_coords: (u16, u16),
	/// Image width in pixels
	pub width: u32,
	/// Image height in pixels
	pub height: u32,
	/// First palette of the record
	pub palette: [Texel; PALETTE_COLORS],
	/// One palette index per pixel
	pub indices: Vec<u8>,
}

impl DatTexture {
	/// Expands to RGBA8.
	pub fn to_rgba(&self) -> Vec<u8> {
		self.indices.iter().flat_map(|&i| self.palette[(i & 0x0F) as usize].to_rgba()).collect()
	}
}

/// Reads the header table.
pub fn read_entries(data: &[u8]) -> Result<Vec<DatEntry>, AssetError> {
	let kind = AssetKind::DatArchive;
	let mut entries = Vec::new();
	let mut ofs = 0;
	while ofs < SECTOR_SIZE {
		let entry_type = raw::read_u32(data, ofs, kind)?;
		if entry_type == DUMMY_MARKER {
			break;
		}
		entries.push(DatEntry {
			entry_type: entry_type.into(),
			length: raw::read_u32(data, ofs + 4, kind)?,
		});
		ofs += ENTRY_SIZE;
	}
	Ok(entries)
}

struct PaletteRecord {
	coords: (u16, u16),
	palette: [Texel; PALETTE_COLORS],
}

struct ImageRecord {
	coords: (u16, u16),
	width: u32,
	height: u32,
	indices: Vec<u8>,
}

fn read_palette(data: &[u8], ofs: &mut usize) -> Result<PaletteRecord, AssetError> {
	let kind = AssetKind::DatArchive;
	let x = raw::read_u16(data, *ofs + 4, kind)?;
	let y = raw::read_u16(data, *ofs + 6, kind)?;
	let color_count = raw::read_u16(data, *ofs + 8, kind)? as usize;
	*ofs += RECORD_HEADER_SIZE;

	// Only whole 16-color palettes are stored
	let palette_count = color_count / PALETTE_COLORS;
	if palette_count == 0 {
		return Err(AssetError::format(kind, format!("palette at 0x{:X} has {color_count} colors", *ofs)));
	}

	let mut palette = [Texel::TRANSPARENT; PALETTE_COLORS];
	for (i, texel) in palette.iter_mut().enumerate() {
		*texel = Texel(raw::read_u16(data, *ofs + i * 2, kind)?);
	}
	*ofs += palette_count * PALETTE_COLORS * 2;

	Ok(PaletteRecord {
		coords: (x, y),
		palette,
	})
}

fn read_image(data: &[u8], ofs: &mut usize) -> Result<ImageRecord, AssetError> {
	let kind = AssetKind::DatArchive;
	let length = (raw::read_u32(data, *ofs, kind)? as usize).checked_sub(RECORD_HEADER_SIZE).ok_or_else(|| {
		AssetError::format(kind, format!("image record at 0x{:X} is shorter than its header", *ofs))
	})?;
	let x = raw::read_u16(data, *ofs + 4, kind)?;
	let y = raw::read_u16(data, *ofs + 6, kind)?;
	let width = u32::from(raw::read_u16(data, *ofs + 8, kind)?) * 4;
	let height = u32::from(raw::read_u16(data, *ofs + 10, kind)?);
	*ofs += RECORD_HEADER_SIZE;

	let pixels = raw::slice(data, *ofs, length, kind)?;
	*ofs += length;

	Ok(ImageRecord {
		coords: (x, y),
		width,
		height,
		indices: pixels.iter().flat_map(|&b| [b & 0x0F, b >> 4]).collect(),
	})
}

/// Reads every texture of the archive.
///
/// A palette-only entry produces a texture sharing the previous image; one
/// appearing before any image is a format error.
pub fn read_textures(data: &[u8]) -> Result<Vec<DatTexture>, AssetError> {
	let entries = read_entries(data)?;
	let mut textures: Vec<DatTexture> = Vec::with_capacity(entries.len());
	let mut ofs = SECTOR_SIZE;

	for entry in entries {
		match entry.entry_type {
			EntryType::Palette => {
				let palette = read_palette(data, &mut ofs)?;
				let previous = textures.last().ok_or_else(|| {
					AssetError::format(AssetKind::DatArchive, "palette entry without a preceding image")
				})?;
				let texture = DatTexture {
					palette_coords: palette.coords,
					palette: palette.palette,
					..previous.clone()
				};
				textures.push(texture);
			}
			EntryType::Image => {
				let palette = read_palette(data, &mut ofs)?;
				let image = read_image(data, &mut ofs)?;
				textures.push(DatTexture {
					palette_coords: palette.coords,
					image_coords: image.coords,
					width: image.width,
					height: image.height,
					palette: palette.palette,
					indices: image.indices,
				});
			}
			EntryType::Other(value) => {
				log::debug!("Skipping DAT entry type {value} ({} bytes)", entry.length);
			}
		}
	}

	Ok(textures)
}
