//! This module is separated into its own crate to enable simple dynamic linking for `mml2`, and should not be used directly.

/// `use mml2::prelude::*;` to import commonly used items.
pub mod prelude;

// Re-export mml2_types for convenience
pub use mml2_types;

// Re-export commonly used types at crate root
pub use mml2_types::file::{AssetError, AssetKind, ROM_STRIDE, RomImage, SECTOR_SIZE};
