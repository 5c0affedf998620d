//! This crate provides the binary codecs and file formats for the `mml2-rs` project.
//!
//! # Codecs
//!
//! - **Fields**: 10-bit signed fixed-point values used by vertices and rotations
//! - **Vertices**: three fields per dword with a half-scale fallback
//! - **Texels**: BGR555 colors with a visibility bit
//! - **Faces**: 12-byte triangle / quad records with 7-bit vertex indices
//!
//! # File Formats
//!
//! - **Textures**: 256×256 4bpp images with a 16-color palette, segment compressed
//! - **Texture archives**: PSX `PL00T.BIN` and PC `.DAT` containers
//! - **Player models**: fixed-layout `PL00P010` meshes, read and written
//! - **Entity meshes**: skinned meshes with a bone hierarchy
//! - **Animations**: keyframe pools sampled by animation definitions
//! - **Disc images**: locating and patching archives by sector fingerprint
//!
//! # Examples
//!
//! Using the prelude (recommended):
//!
//! ```no_run
//! use mml2_types::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let obj = std::fs::read_to_string("body.obj")?;
//! let mesh = encode_obj(&obj, 0, CodecOptions::strict())?;
//!
//! let mut writer = ModelWriter::new(PlayerModelLayout::megaman());
//! writer.write_submesh(0x80, &mesh)?;
//! let model = writer.finish();
//! # Ok(())
//! # }
//! ```
//!
//! Or use explicit paths:
//!
//! ```
//! use mml2_types::file::compress::{compress, decompress};
//!
//! let data = vec![7u8; 0x100];
//! let packed = compress(&data);
//! assert_eq!(decompress(&packed.bitfield, &packed.payload, data.len()).unwrap(), data);
//! ```

pub mod codec;
pub mod file;

/// `use mml2_types::prelude::*;` to import commonly used items.
pub mod prelude;
