//! PSX texture archive (`PL00T.BIN`).
//!
//! Each compressed image is stored as a 0x30-byte header, the packed flag
//! bits, then the token payload:
//!
//! ```text
//! +0x00  u32  type
//! +0x04  u32  decompressed size (palette + image)
//! +0x0C  u16  palette x        +0x0E  u16  palette y
//! +0x10  u16  color count      +0x12  u16  palette count
//! +0x14  u16  image x          +0x16  u16  image y
//! +0x18  u16  width            +0x1A  u16  height
//! +0x24  u16  bitfield size    +0x26  u16  flag
//! ```
//!
//! The player archive holds the body image, a block of secondary palettes,
//! then the face image, each starting on a sector boundary.

use std::ops::Range;

use super::{
	AssetError, AssetKind,
	archive::{align_to_sector, write_at},
	compress::{compress, decompress_counted},
	raw,
	texture::{IMAGE_SIZE, PALETTE_COLORS, Texture},
};

/// Bytes of the face image that hold the special weapon artwork
pub const SPECIAL_WEAPON_SIZE: usize = 0x4000;

/// Header preceding a compressed image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageHeader {
	/// Entry type
	pub kind: u32,
	/// Decompressed size in bytes
	pub full_size: u32,
	/// Palette VRAM x
	pub palette_x: u16,
	/// Palette VRAM y
	pub palette_y: u16,
	/// Number of palette colors
	pub color_count: u16,
	/// Number of palettes
	pub palette_count: u16,
	/// Image VRAM x
	pub image_x: u16,
	/// Image VRAM y
	pub image_y: u16,
	/// Width in VRAM units
	pub width: u16,
	/// Height in rows
	pub height: u16,
	/// Size of the packed flag bits
	pub bitfield_size: u16,
	/// Unknown flag, preserved
	pub flag: u16,
}

impl ImageHeader {
	/// Size of the header in bytes
	pub const SIZE: usize = 0x30;

	/// Parses the header at `offset`.
	pub fn from_bytes(data: &[u8], offset: usize) -> Result<Self, AssetError> {
		let kind = AssetKind::TextureArchive;
		let data = raw::slice(data, offset, Self::SIZE, kind)?;
		let u16_at = |ofs| raw::read_u16(data, ofs, kind);

		Ok(Self {
			kind: raw::read_u32(data, 0x00, kind)?,
			full_size: raw::read_u32(data, 0x04, kind)?,
			palette_x: u16_at(0x0C)?,
			palette_y: u16_at(0x0E)?,
			color_count: u16_at(0x10)?,
			palette_count: u16_at(0x12)?,
			image_x: u16_at(0x14)?,
			image_y: u16_at(0x16)?,
			width: u16_at(0x18)?,
			height: u16_at(0x1A)?,
			bitfield_size: u16_at(0x24)?,
			flag: u16_at(0x26)?,
		})
	}

	/// Serializes the header; unknown bytes are written as zero.
	pub fn to_bytes(&self) -> [u8; Self::SIZE] {
		let mut out = [0u8; Self::SIZE];
		out[0x00..0x04].copy_from_slice(&self.kind.to_le_bytes());
		out[0x04..0x08].copy_from_slice(&self.full_size.to_le_bytes());
		let fields = [
			(0x0C, self.palette_x),
			(0x0E, self.palette_y),
			(0x10, self.color_count),
			(0x12, self.palette_count),
			(0x14, self.image_x),
			(0x16, self.image_y),
			(0x18, self.width),
			(0x1A, self.height),
			(0x24, self.bitfield_size),
			(0x26, self.flag),
		];
		for (ofs, value) in fields {
			out[ofs..ofs + 2].copy_from_slice(&value.to_le_bytes());
		}
		out
	}
}

/// One compressed image with its header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureEntry {
	/// Image header
	pub header: ImageHeader,
	/// Packed flag bits
	pub bitfield: Vec<u8>,
	/// Token payload
	pub payload: Vec<u8>,
}

impl TextureEntry {
	/// Compresses `texture` reusing the placement fields of `template`.
	///
	/// The color count, decompressed size and bitfield size are updated.
	pub fn encode(template: ImageHeader, texture: &Texture) -> Result<Self, AssetError> {
		let bytes = texture.to_bytes();
		let compressed = compress(&bytes);
		let bitfield_size = u16::try_from(compressed.bitfield.len()).map_err(|_| AssetError::NoSpace {
			what: "texture bitfield",
			len: compressed.bitfield.len(),
		})?;

		Ok(Self {
			header: ImageHeader {
				color_count: PALETTE_COLORS as u16,
				full_size: bytes.len() as u32,
				bitfield_size,
				..template
			},
			bitfield: compressed.bitfield,
			payload: compressed.payload,
		})
	}

	/// Parses the entry at `offset`, consuming exactly the payload it needs.
	pub fn parse(data: &[u8], offset: usize) -> Result<Self, AssetError> {
		let kind = AssetKind::TextureArchive;
		let header = ImageHeader::from_bytes(data, offset)?;
		let bits_start = offset + ImageHeader::SIZE;
		let bitfield = raw::slice(data, bits_start, header.bitfield_size as usize, kind)?;
		let payload_start = bits_start + bitfield.len();
		let rest = data.get(payload_start..).unwrap_or_default();
		let (_, consumed) = decompress_counted(bitfield, rest, header.full_size as usize)?;

		Ok(Self {
			header,
			bitfield: bitfield.to_vec(),
			payload: rest[..consumed].to_vec(),
		})
	}

	/// Decompresses the raw palette + image bytes.
	pub fn decompress(&self) -> Result<Vec<u8>, AssetError> {
		decompress_counted(&self.bitfield, &self.payload, self.header.full_size as usize).map(|(data, _)| data)
	}

	/// Decompresses into a [`Texture`].
	pub fn decode(&self) -> Result<Texture, AssetError> {
		Texture::from_bytes(&self.decompress()?)
	}

	/// Serialized size in bytes
	pub fn len(&self) -> usize {
		ImageHeader::SIZE + self.bitfield.len() + self.payload.len()
	}

	/// Returns `true` if the entry has no compressed data.
	pub fn is_empty(&self) -> bool {
		self.bitfield.is_empty() && self.payload.is_empty()
	}

	/// Header, bitfield and payload.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut out = Vec::with_capacity(self.len());
		out.extend_from_slice(&self.header.to_bytes());
		out.extend_from_slice(&self.bitfield);
		out.extend_from_slice(&self.payload);
		out
	}
}

/// Fixed offsets of a player texture archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerTextureLayout {
	/// Offset of the body entry
	pub body_offset: usize,
	/// Secondary palette block
	pub palette_block: Range<usize>,
	/// Offset of the face entry
	pub face_offset: usize,
}

impl PlayerTextureLayout {
	/// Layout of Mega Man's `PL00T.BIN`
	pub fn megaman() -> Self {
		Self {
			body_offset: 0x0000,
			palette_block: 0x3000..0x30B0,
			face_offset: 0x3800,
		}
	}
}

/// Body texture, palette block and face texture of a player archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerTextureArchive {
	/// Body texture entry
	pub body: TextureEntry,
	/// Secondary palettes, copied verbatim
	pub palette_block: Vec<u8>,
	/// Face texture entry
	pub face: TextureEntry,
}

impl PlayerTextureArchive {
	/// Parses an archive laid out as `layout`.
	pub fn parse(data: &[u8], layout: &PlayerTextureLayout) -> Result<Self, AssetError> {
		Ok(Self {
			body: TextureEntry::parse(data, layout.body_offset)?,
			palette_block: read_palette_block(data, layout)?,
			face: TextureEntry::parse(data, layout.face_offset)?,
		})
	}

	/// Reads only the entry headers and the palette block of `data`.
	///
	/// The entries hold no compressed data until [`Self::replace_textures`]
	/// fills them; the stored payloads are never decompressed.
	pub fn from_template(data: &[u8], layout: &PlayerTextureLayout) -> Result<Self, AssetError> {
		let header_only = |offset| -> Result<TextureEntry, AssetError> {
			Ok(TextureEntry {
				header: ImageHeader::from_bytes(data, offset)?,
				bitfield: Vec::new(),
				payload: Vec::new(),
			})
		};

		Ok(Self {
			body: header_only(layout.body_offset)?,
			palette_block: read_palette_block(data, layout)?,
			face: header_only(layout.face_offset)?,
		})
	}

	/// Replaces both textures, keeping each entry's placement fields.
	pub fn replace_textures(&mut self, body: &Texture, face: &Texture) -> Result<(), AssetError> {
		self.body = TextureEntry::encode(self.body.header, body)?;
		self.face = TextureEntry::encode(self.face.header, face)?;
		Ok(())
	}

	/// Writes the archive into a zeroed buffer of `size` bytes.
	///
	/// Entries are packed body, palette block, face, each starting on a
	/// sector boundary. Content that does not fit is [`AssetError::NoSpace`].
	pub fn to_bytes(&self, size: usize) -> Result<Vec<u8>, AssetError> {
		let body = self.body.to_bytes();
		let palette_ofs = align_to_sector(body.len());
		let face_ofs = align_to_sector(palette_ofs + self.palette_block.len());
		let end = face_ofs + self.face.len();
		if end > size {
			return Err(AssetError::NoSpace {
				what: "texture archive",
				len: end,
			});
		}

		let mut out = vec![0u8; size];
		let kind = AssetKind::TextureArchive;
		write_at(&mut out, 0, &body, kind)?;
		write_at(&mut out, palette_ofs, &self.palette_block, kind)?;
		write_at(&mut out, face_ofs, &self.face.to_bytes(), kind)?;

		log::debug!(
			"Texture archive: body 0x{:X} bytes, palettes at 0x{palette_ofs:X}, face at 0x{face_ofs:X}, end 0x{end:X}",
			body.len()
		);
		Ok(out)
	}
}

fn read_palette_block(data: &[u8], layout: &PlayerTextureLayout) -> Result<Vec<u8>, AssetError> {
	let block = &layout.palette_block;
	Ok(raw::slice(data, block.start, block.len(), AssetKind::TextureArchive)?.to_vec())
}

/// Returns the special weapon artwork stored at the end of a PC `PL00T.DAT`.
pub fn special_weapon_block(dat: &[u8]) -> Result<&[u8], AssetError> {
	let start = dat.len().checked_sub(SPECIAL_WEAPON_SIZE).ok_or_else(|| {
		AssetError::insufficient_data(AssetKind::DatArchive, SPECIAL_WEAPON_SIZE, dat.len())
	})?;
	Ok(&dat[start..])
}

/// Overwrites the second half of a face texture with special weapon artwork.
pub fn splice_special_weapon(face: &mut Texture, block: &[u8]) -> Result<(), AssetError> {
	if block.len() != SPECIAL_WEAPON_SIZE {
		return Err(AssetError::insufficient_data(AssetKind::Texture, SPECIAL_WEAPON_SIZE, block.len()));
	}
	face.image[IMAGE_SIZE - SPECIAL_WEAPON_SIZE..].copy_from_slice(block);
	Ok(())
}
