//! Packed vertex dwords.
//!
//! ```text
//! bit 31   30        20         10          0
//!     [--][H][  z:10  ][  y:10  ][  x:10  ]
//! ```
//!
//! `H` is set when the coordinates were halved to fit; the decoder doubles
//! them back.

use super::{
	CodecOptions,
	field::{FIELD_BITS, FIELD_MASK, encode_field_with, field_at},
};
use crate::file::AssetError;
use glam::Vec3;

/// Half-scale flag
pub const HALF_SCALE_FLAG: u32 = 1 << 30;

/// Meters per model unit
pub const MODEL_SCALE: f32 = 0.00125;

/// Converts model units to a Y-up position: scaled by `scale` and rotated
/// 180° about X.
///
/// # Examples
///
/// ```
/// use glam::Vec3;
/// use mml2_types::codec::vertex::{MODEL_SCALE, to_world};
///
/// let p = to_world([800.0, 800.0, -800.0], MODEL_SCALE);
/// assert!(p.abs_diff_eq(Vec3::new(1.0, -1.0, 1.0), 1e-6));
/// ```
pub fn to_world([x, y, z]: [f32; 3], scale: f32) -> Vec3 {
	Vec3::new(x, -y, -z) * scale
}

/// A vertex packed into one little-endian dword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PackedVertex(pub u32);

impl PackedVertex {
	/// Size of a packed vertex in bytes
	pub const SIZE: usize = 4;

	/// Encodes a vertex given in integer model units.
	///
	/// In strict mode the coordinates are first encoded as-is; if any axis
	/// overflows, all three are floor-halved and [`HALF_SCALE_FLAG`] is set.
	/// A vertex that still does not fit is an [`AssetError::VertexOverflow`]
	/// carrying the original coordinates.
	///
	/// In compatible mode every axis is clamped to the field range and the
	/// half-scale path is never taken.
	///
	/// # Examples
	///
	/// ```
	/// use mml2_types::codec::{CodecOptions, PackedVertex};
	///
	/// let v = PackedVertex::encode(700, 0, 0, CodecOptions::strict()).unwrap();
	/// assert!(v.is_half_scale());
	/// assert_eq!(v.decode(), [700, 0, 0]);
	/// ```
	pub fn encode(x: i32, y: i32, z: i32, options: CodecOptions) -> Result<Self, AssetError> {
		if !options.strict {
			return Self::pack(x, y, z, false);
		}

		if let Ok(packed) = Self::pack(x, y, z, true) {
			return Ok(packed);
		}

		let (hx, hy, hz) = (x.div_euclid(2), y.div_euclid(2), z.div_euclid(2));
		match Self::pack(hx, hy, hz, true) {
			Ok(packed) => Ok(Self(packed.0 | HALF_SCALE_FLAG)),
			Err(_) => Err(AssetError::VertexOverflow {
				x,
				y,
				z,
			}),
		}
	}

	fn pack(x: i32, y: i32, z: i32, strict: bool) -> Result<Self, AssetError> {
		let x = encode_field_with(x, strict)?;
		let y = encode_field_with(y, strict)?;
		let z = encode_field_with(z, strict)?;
		Ok(Self(x | (y << FIELD_BITS) | (z << (FIELD_BITS * 2))))
	}

	/// Returns `true` when the half-scale flag is set.
	pub fn is_half_scale(self) -> bool {
		self.0 & HALF_SCALE_FLAG != 0
	}

	/// Returns the raw field values without applying the half-scale flag.
	pub fn fields(self) -> [i32; 3] {
		[field_at(self.0, 0), field_at(self.0, FIELD_BITS), field_at(self.0, FIELD_BITS * 2)]
	}

	/// Decodes the vertex, doubling halved coordinates back.
	pub fn decode(self) -> [i32; 3] {
		let scale = if self.is_half_scale() {
			2
		} else {
			1
		};
		self.fields().map(|v| v * scale)
	}

	/// Reads a packed vertex from four little-endian bytes.
	pub fn from_le_bytes(bytes: [u8; 4]) -> Self {
		Self(u32::from_le_bytes(bytes))
	}

	/// Returns the little-endian encoding of the dword.
	pub fn to_le_bytes(self) -> [u8; 4] {
		self.0.to_le_bytes()
	}

	/// Returns `true` if no bits outside the three fields and the flag are set.
	pub fn is_canonical(self) -> bool {
		let used = FIELD_MASK | (FIELD_MASK << FIELD_BITS) | (FIELD_MASK << (FIELD_BITS * 2));
		self.0 & !(used | HALF_SCALE_FLAG) == 0
	}
}

impl From<PackedVertex> for u32 {
	fn from(value: PackedVertex) -> Self {
		value.0
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;

	#[test]
	fn test_direct_encode() {
		let v = PackedVertex::encode(1, -1, 511, CodecOptions::strict()).unwrap();
		assert_eq!(v.0, 0x001 | (0x3FF << 10) | (0x1FF << 20));
		assert!(!v.is_half_scale());
		assert_eq!(v.decode(), [1, -1, 511]);
	}

	#[test]
	fn test_half_scale_fallback() {
		let v = PackedVertex::encode(700, 0, 0, CodecOptions::strict()).unwrap();
		assert_ne!(v.0 & HALF_SCALE_FLAG, 0);
		assert_eq!(v.fields(), [350, 0, 0]);
		assert_eq!(v.decode(), [700, 0, 0]);
	}

	#[test]
	fn test_half_scale_floors_negative_odd() {
		let v = PackedVertex::encode(-1001, 3, 0, CodecOptions::strict()).unwrap();
		assert!(v.is_half_scale());
		assert_eq!(v.fields(), [-501, 1, 0]);
	}

	#[test]
	fn test_overflow_reports_original_triple() {
		match PackedVertex::encode(1100, -5, 7, CodecOptions::strict()) {
			Err(AssetError::VertexOverflow {
				x: 1100,
				y: -5,
				z: 7,
			}) => {}
			other => panic!("Expected VertexOverflow, got {other:?}"),
		}
	}

	#[test]
	fn test_compatible_clamps() {
		let v = PackedVertex::encode(700, -700, 0, CodecOptions::compatible()).unwrap();
		assert!(!v.is_half_scale());
		assert_eq!(v.fields(), [511, -1, 0]);
	}

	#[test]
	fn test_canonical() {
		assert!(PackedVertex(HALF_SCALE_FLAG | 0x3FFF_FFFF).is_canonical());
		assert!(!PackedVertex(1 << 31).is_canonical());
	}

	proptest! {
		#[test]
		fn prop_in_range_round_trips(x in -512i32..=511, y in -512i32..=511, z in -512i32..=511) {
			let v = PackedVertex::encode(x, y, z, CodecOptions::strict()).unwrap();
			prop_assert!(!v.is_half_scale());
			prop_assert_eq!(v.decode(), [x, y, z]);
		}

		#[test]
		fn prop_even_half_scale_round_trips(x in -512i32..=511, y in -512i32..=511, z in -512i32..=511) {
			prop_assume!(x.abs() > 256 || y.abs() > 256 || z.abs() > 256);
			let (x, y, z) = (x * 2, y * 2, z * 2);
			let v = PackedVertex::encode(x, y, z, CodecOptions::strict()).unwrap();
			prop_assert_eq!(v.decode(), [x, y, z]);
		}
	}
}
