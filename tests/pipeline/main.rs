//! End-to-end tests for `mml2-rs`: encode assets, rebuild archives and
//! patch them into a disc image.

mod animation;
mod model;
mod texture;

/// RGBA8 pixels of a 256×256 image with a few flat regions.
pub(crate) fn striped_rgba(colors: &[[u8; 4]]) -> Vec<u8> {
	(0..256 * 256).flat_map(|i| colors[(i / 256 / 16) % colors.len()]).collect()
}
