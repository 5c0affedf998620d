//! Bit-level value codecs shared by every asset format.
//!
//! - [`field`]: 10-bit signed fields (vertices, rotations)
//! - [`vertex`]: packed vertex dwords with the half-scale fallback
//! - [`texel`]: 15-bit color + visibility flag
//! - [`face`]: 12-byte face records (UVs + packed indices)
//! - [`bitfield`]: MSB-first bit streams packed into little-endian dwords

pub mod bitfield;
pub mod face;
pub mod field;
pub mod options;
pub mod texel;
pub mod vertex;

pub use bitfield::{pack_bitfield, unpack_bitfield};
pub use face::{Corner, Face, FaceKind};
pub use options::CodecOptions;
pub use texel::Texel;
pub use vertex::PackedVertex;
