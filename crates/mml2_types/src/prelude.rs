//! Prelude module for `mml2_types`.
//!
//! This module provides a convenient way to import commonly used types, traits, and constants.
//!
//! # Examples
//!
//! ```
//! use mml2_types::prelude::*;
//!
//! let vertex = PackedVertex::encode(700, 0, 0, CodecOptions::strict()).unwrap();
//! assert!(vertex.is_half_scale());
//! let layout = PlayerModelLayout::megaman();
//! assert_eq!(layout.submesh_count(), 17);
//! ```

// Codec types
#[doc(inline)]
pub use crate::codec::{CodecOptions, Corner, Face, FaceKind, PackedVertex, Texel};

// File module types
#[doc(inline)]
pub use crate::file::{
	// Animation types
	AnimationClip,
	AnimationDefinition,
	AnimationSet,
	// Error types
	AssetError,
	AssetKind,
	// Compression
	Compressed,
	// Model types
	EncodedMesh,
	// Entity types
	EntityHeader,
	EntityMesh,
	EntityRecord,
	// Texture types
	ImageHeader,
	IndexedImage,
	KeyframePool,
	ModelWriter,
	PackedRotation,
	PlayerModel,
	PlayerModelLayout,
	PlayerTextureArchive,
	PlayerTextureLayout,
	PoseFrame,
	// Constants
	ROM_STRIDE,
	// Disc image
	RomImage,
	SECTOR_SIZE,
	Skeleton,
	Texture,
	TextureEntry,
	compress,
	decompress,
	encode_obj,
	read_entity_table,
	read_player_model,
};
