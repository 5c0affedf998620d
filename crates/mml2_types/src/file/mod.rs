//! Container and record formats for `mml2-rs` project.

mod error;
mod raw;

pub mod anim;
pub mod archive;
pub mod compress;
pub mod dat;
pub mod entity;
pub mod entity_table;
pub mod model;
pub mod obj;
pub mod rom;
pub mod texture;
pub mod texture_archive;
pub mod vram;

/// CD data sector size (2048 bytes / 0x0800)
pub const SECTOR_SIZE: usize = 0x0800;

/// Distance between consecutive data sectors in a raw disc image
pub const ROM_STRIDE: usize = 0x0930;

// Re-export unified error type
pub use error::{AssetError, AssetKind};

// Re-export main file types
pub use anim::{AnimationClip, AnimationDefinition, AnimationSet, KeyframePool, PackedRotation, PoseFrame};
pub use compress::{Compressed, compress, decompress};
pub use entity::{EntityHeader, EntityMesh, Skeleton};
pub use entity_table::{EntityRecord, read_entity_table};
pub use model::{ModelWriter, PlayerModel, PlayerModelLayout, read_player_model};
pub use obj::{EncodedMesh, encode_obj};
pub use rom::RomImage;
pub use texture::{IndexedImage, Texture};
pub use texture_archive::{ImageHeader, PlayerTextureArchive, PlayerTextureLayout, TextureEntry};
