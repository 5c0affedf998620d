//! 12-byte face records.
//!
//! ```text
//! +0x00  u8 × 8   UV bytes: au av bu bv cu cv du dv
//! +0x08  u32      a:7 | b:7 << 7 | c:7 << 14 | d:7 << 21 | material << 28
//! ```
//!
//! Triangles store `d = 0` and a zero `d` UV. A quad is rendered as the two
//! triangles `(A, C, B)` and `(B, C, D)`.

use super::CodecOptions;
use crate::file::AssetError;

/// Mask of a single 7-bit vertex index
pub const INDEX_MASK: u32 = 0x7F;

/// Highest vertex count a submesh may have
pub const MAX_VERTICES: usize = 127;

/// One UV texel step
pub const UV_STEP: f32 = 0.003_906_25;

/// Half-texel offset applied on both quantization and expansion
pub const UV_HALF_STEP: f32 = 0.001_953_125;

/// Triangle or quad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceKind {
	/// Three corners, `d` unused
	Triangle,
	/// Four corners
	Quad,
}

impl FaceKind {
	/// Number of corners used by this kind
	pub fn corner_count(self) -> usize {
		match self {
			Self::Triangle => 3,
			Self::Quad => 4,
		}
	}
}

/// One face corner: vertex index and UV bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Corner {
	/// Vertex index within the submesh
	pub index: u8,
	/// Horizontal texel coordinate
	pub u: u8,
	/// Vertical texel coordinate
	pub v: u8,
}

impl Corner {
	/// Creates a corner.
	pub fn new(index: u8, u: u8, v: u8) -> Self {
		Self {
			index,
			u,
			v,
		}
	}

	/// Returns the UV as normalized floats (`byte / 256 + half texel`).
	pub fn uv(&self) -> [f32; 2] {
		[expand_uv(self.u), expand_uv(self.v)]
	}
}

/// Quantizes a normalized texture coordinate to a texel byte.
///
/// # Examples
///
/// ```
/// use mml2_types::codec::face::quantize_uv;
///
/// assert_eq!(quantize_uv(0.0), 0);
/// assert_eq!(quantize_uv(0.5), 128);
/// assert_eq!(quantize_uv(1.0), 255);
/// assert_eq!(quantize_uv(-0.2), 0);
/// ```
pub fn quantize_uv(value: f32) -> u8 {
	(value / UV_STEP + UV_HALF_STEP).floor().clamp(0.0, 255.0) as u8
}

/// Expands a texel byte to a normalized coordinate.
pub fn expand_uv(value: u8) -> f32 {
	f32::from(value) * UV_STEP + UV_HALF_STEP
}

/// Fails in strict mode when `count` vertices cannot be addressed by 7-bit indices.
pub fn check_vertex_count(count: usize, options: CodecOptions) -> Result<(), AssetError> {
	if options.strict && count > MAX_VERTICES {
		return Err(AssetError::TooManyVertices {
			count,
			max: MAX_VERTICES,
		});
	}

	Ok(())
}

/// A decoded face record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Face {
	/// Triangle or quad
	pub kind: FaceKind,
	/// Corners `A`, `B`, `C`, `D`
	pub corners: [Corner; 4],
	/// Material index (bits 28-29)
	pub material: u8,
	/// Render flags (bits 30-31), written back untouched
	pub flags: u8,
}

impl Face {
	/// Size of a face record in bytes
	pub const SIZE: usize = 12;

	/// Creates a triangle; `d` is zeroed.
	pub fn triangle(a: Corner, b: Corner, c: Corner, material: u8) -> Self {
		Self {
			kind: FaceKind::Triangle,
			corners: [a, b, c, Corner::default()],
			material,
			flags: 0,
		}
	}

	/// Creates a quad.
	pub fn quad(a: Corner, b: Corner, c: Corner, d: Corner, material: u8) -> Self {
		Self {
			kind: FaceKind::Quad,
			corners: [a, b, c, d],
			material,
			flags: 0,
		}
	}

	/// Packs the indices, material and flags into the record dword.
	///
	/// Indices are masked to 7 bits, material and flags to 2 bits each.
	pub fn index_dword(&self) -> u32 {
		let [a, b, c, d] = self.corners.map(|corner| u32::from(corner.index) & INDEX_MASK);
		let material = u32::from(self.material) & 0x3;
		let flags = u32::from(self.flags) & 0x3;
		a | (b << 7) | (c << 14) | (d << 21) | (material << 28) | (flags << 30)
	}

	/// Serializes the record.
	pub fn to_bytes(&self) -> [u8; Self::SIZE] {
		let mut out = [0u8; Self::SIZE];
		for (i, corner) in self.corners.iter().enumerate() {
			out[i * 2] = corner.u;
			out[i * 2 + 1] = corner.v;
		}
		out[8..12].copy_from_slice(&self.index_dword().to_le_bytes());
		out
	}

	/// Parses a record of the given kind.
	pub fn from_bytes(bytes: &[u8; Self::SIZE], kind: FaceKind) -> Self {
		let dword = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
		let mut corners = [Corner::default(); 4];
		for (i, corner) in corners.iter_mut().enumerate() {
			corner.index = ((dword >> (i * 7)) & INDEX_MASK) as u8;
			corner.u = bytes[i * 2];
			corner.v = bytes[i * 2 + 1];
		}

		Self {
			kind,
			corners,
			material: ((dword >> 28) & 0x3) as u8,
			flags: (dword >> 30) as u8,
		}
	}

	/// Returns the render triangles: `(A, C, B)`, then `(B, C, D)` for quads.
	///
	/// # Examples
	///
	/// ```
	/// use mml2_types::codec::{Corner, Face};
	///
	/// let c = |i| Corner::new(i, 0, 0);
	/// let quad = Face::quad(c(0), c(1), c(2), c(3), 0);
	/// let order: Vec<[u8; 3]> =
	/// 	quad.triangles().iter().map(|t| t.map(|corner| corner.index)).collect();
	/// assert_eq!(order, vec![[0, 2, 1], [1, 2, 3]]);
	/// ```
	pub fn triangles(&self) -> Vec<[Corner; 3]> {
		let [a, b, c, d] = self.corners;
		match self.kind {
			FaceKind::Triangle => vec![[a, c, b]],
			FaceKind::Quad => vec![[a, c, b], [b, c, d]],
		}
	}

	/// Returns the highest vertex index referenced by the used corners.
	pub fn max_index(&self) -> u8 {
		self.corners[..self.kind.corner_count()].iter().map(|c| c.index).max().unwrap_or(0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_triangle_layout() {
		let face = Face::triangle(Corner::new(1, 10, 11), Corner::new(2, 20, 21), Corner::new(3, 30, 31), 2);
		let bytes = face.to_bytes();
		assert_eq!(&bytes[..8], &[10, 11, 20, 21, 30, 31, 0, 0]);
		let dword = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
		assert_eq!(dword, 1 | (2 << 7) | (3 << 14) | (2 << 28));
	}

	#[test]
	fn test_parse_matches_write() {
		let face = Face::quad(
			Corner::new(127, 1, 2),
			Corner::new(0, 3, 4),
			Corner::new(64, 5, 6),
			Corner::new(5, 7, 8),
			1,
		);
		assert_eq!(Face::from_bytes(&face.to_bytes(), FaceKind::Quad), face);
	}

	#[test]
	fn test_indices_are_masked() {
		let face = Face::triangle(Corner::new(0x80 | 3, 0, 0), Corner::default(), Corner::default(), 0);
		assert_eq!(face.index_dword(), 3);
	}

	#[test]
	fn test_material_reads_two_bits() {
		let mut bytes = [0u8; 12];
		bytes[8..12].copy_from_slice(&0x7000_0000u32.to_le_bytes());
		assert_eq!(Face::from_bytes(&bytes, FaceKind::Triangle).material, 3);
	}

	#[test]
	fn test_flag_bits_survive_rewrite() {
		let mut bytes = [0u8; 12];
		bytes[..6].copy_from_slice(&[0x01, 0x10, 0x1f, 0x1b, 0x05, 0x1f]);
		bytes[8..12].copy_from_slice(&[0x8a, 0x81, 0x00, 0xe0]);
		let face = Face::from_bytes(&bytes, FaceKind::Triangle);
		assert_eq!(face.material, 2);
		assert_eq!(face.flags, 3);
		assert_eq!(face.to_bytes(), bytes);
	}

	#[test]
	fn test_quad_winding() {
		let c = |i| Corner::new(i, 0, 0);
		let quad = Face::quad(c(10), c(11), c(12), c(13), 0);
		let order: Vec<[u8; 3]> = quad.triangles().iter().map(|t| t.map(|corner| corner.index)).collect();
		assert_eq!(order, vec![[10, 12, 11], [11, 12, 13]]);

		let tri = Face::triangle(c(4), c(5), c(6), 0);
		let order: Vec<[u8; 3]> = tri.triangles().iter().map(|t| t.map(|corner| corner.index)).collect();
		assert_eq!(order, vec![[4, 6, 5]]);
	}

	#[test]
	fn test_uv_conversion() {
		assert_eq!(expand_uv(0), UV_HALF_STEP);
		assert_eq!(quantize_uv(expand_uv(200)), 200);
		assert_eq!(quantize_uv(2.0), 255);
	}

	#[test]
	fn test_vertex_count_check() {
		assert!(check_vertex_count(127, CodecOptions::strict()).is_ok());
		assert!(matches!(
			check_vertex_count(128, CodecOptions::strict()),
			Err(AssetError::TooManyVertices {
				count: 128,
				max: 127
			})
		));
		assert!(check_vertex_count(200, CodecOptions::compatible()).is_ok());
	}
}
