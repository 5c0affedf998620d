//! Prelude module for `mml2_internal`.
//!
//! This module provides a convenient way to import commonly used types and traits.
//!
//! # Examples
//!
//! ```rust
//! use mml2_internal::prelude::*;
//!
//! let texture = Texture::default();
//! let packed = compress(&texture.to_bytes());
//! assert!(!packed.payload.is_empty());
//! ```

// Re-export everything from mml2_types::prelude
#[doc(inline)]
pub use mml2_types::prelude::*;

// Re-export the entire mml2_types module for advanced usage
#[doc(inline)]
pub use mml2_types;
