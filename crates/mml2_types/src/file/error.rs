//! Error types for asset parsing, encoding and ROM patching.

use std::fmt;

use thiserror::Error;

/// Identifies which codec or container produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
	/// Packed vertex, texel and face fields
	Bits,
	/// Palette + 4bpp texture
	Texture,
	/// Segment compressor
	Compression,
	/// PSX texture archive
	TextureArchive,
	/// PC `.DAT` texture archive
	DatArchive,
	/// Text mesh (OBJ)
	Obj,
	/// Player model writer / reader
	Model,
	/// Entity mesh with skeleton
	Entity,
	/// Keyframe pools and animation definitions
	Animation,
	/// Disc image
	Rom,
	/// Generic archive container
	Archive,
}

impl fmt::Display for AssetKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Bits => "bit-packed value",
			Self::Texture => "texture",
			Self::Compression => "compressed texture",
			Self::TextureArchive => "texture archive",
			Self::DatArchive => "DAT archive",
			Self::Obj => "OBJ mesh",
			Self::Model => "player model",
			Self::Entity => "entity mesh",
			Self::Animation => "animation",
			Self::Rom => "disc image",
			Self::Archive => "archive",
		};
		write!(f, "{name}")
	}
}

/// Unified error type for every codec in this crate
#[derive(Debug, Error)]
pub enum AssetError {
	/// Not enough data to read a record
	#[error("{kind}: insufficient data, expected {expected} bytes, got {actual} bytes")]
	InsufficientData {
		/// Which format was being read
		kind: AssetKind,
		/// Number of bytes required
		expected: usize,
		/// Number of bytes available
		actual: usize,
	},

	/// Malformed input (bad line, unknown flag, bad reference)
	#[error("{kind}: {message}")]
	Format {
		/// Which format was being read
		kind: AssetKind,
		/// Description including the offending line or byte context
		message: String,
	},

	/// Image dimensions not supported by the texture codec
	#[error("Invalid image dimensions {width}x{height}, expected {expected_width}x{expected_height}")]
	InvalidDimensions {
		/// Actual width
		width: u32,
		/// Actual height
		height: u32,
		/// Required width
		expected_width: u32,
		/// Required height
		expected_height: u32,
	},

	/// More distinct colors than a 16-entry palette can hold
	#[error("Palette overflow: image uses {colors} colors, at most {capacity} fit")]
	PaletteOverflow {
		/// Number of distinct texels found (including the reserved entry)
		colors: usize,
		/// Palette capacity
		capacity: usize,
	},

	/// Submesh has more vertices than a 7-bit face index can address
	#[error("Too many vertices in submesh: {count} (max {max})")]
	TooManyVertices {
		/// Number of vertices in the submesh
		count: usize,
		/// Highest supported vertex count
		max: usize,
	},

	/// No free region large enough for a primitive array
	#[error("No space for {what}: {len} bytes requested")]
	NoSpace {
		/// What was being placed
		what: &'static str,
		/// Size of the array in bytes
		len: usize,
	},

	/// A single signed field does not fit in 10 bits
	#[error("Value {value} does not fit in a 10-bit signed field")]
	FieldOverflow {
		/// Offending value
		value: i32,
	},

	/// Vertex does not fit even after halving
	#[error("Vertex ({x}, {y}, {z}) cannot be encoded, even at half scale")]
	VertexOverflow {
		/// X coordinate
		x: i32,
		/// Y coordinate
		y: i32,
		/// Z coordinate
		z: i32,
	},

	/// Corrupt compressed stream
	#[error("Decompression failed: {message}")]
	Decompression {
		/// What went wrong
		message: String,
	},

	/// A file could not be located inside the disc image
	#[error("Could not find {name} in ROM")]
	NotFound {
		/// Name of the file that was searched for
		name: String,
	},

	/// Read or write outside of a buffer
	#[error("{kind}: range 0x{offset:X}..0x{end:X} is outside of buffer of 0x{size:X} bytes")]
	OutOfRange {
		/// Which buffer was accessed
		kind: AssetKind,
		/// Start offset
		offset: usize,
		/// End offset (exclusive)
		end: usize,
		/// Buffer size
		size: usize,
	},

	/// IO error
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

impl AssetError {
	/// Shorthand for [`AssetError::InsufficientData`]
	pub fn insufficient_data(kind: AssetKind, expected: usize, actual: usize) -> Self {
		Self::InsufficientData {
			kind,
			expected,
			actual,
		}
	}

	/// Shorthand for [`AssetError::Format`]
	pub fn format(kind: AssetKind, message: impl Into<String>) -> Self {
		Self::Format {
			kind,
			message: message.into(),
		}
	}

	/// Shorthand for [`AssetError::Decompression`]
	pub fn decompression(message: impl Into<String>) -> Self {
		Self::Decompression {
			message: message.into(),
		}
	}
}
