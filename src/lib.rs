#![allow(clippy::single_component_path_imports)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! `mml2-rs` reads and re-encodes the binary assets of Mega Man Legends 2:
//! compressed paletted textures, player and entity meshes, keyframe
//! animations, and the disc image they are patched into.
//!
pub use mml2_internal::*;

#[cfg(all(feature = "dynamic_linking", not(target_family = "wasm")))]
#[allow(unused_imports)]
use mml2_dylib;
