//! Player model files (`PL00P010`).
//!
//! A player model is a fixed-size blob split into five groups of submeshes
//! (body, head, feet, left arm, right arm). Each group starts with a table
//! of 24-byte submesh headers; the primitive arrays they point to live in
//! the free space between the tables.
//!
//! # Submesh Header (24 bytes)
//!
//! ```text
//! Offset  Size  Field          Description
//! ------  ----  -------------  ------------------------------------------
//! 0x00    1     tri_count      Number of triangles
//! 0x01    1     quad_count     Number of quads
//! 0x02    1     vert_count     Number of vertices
//! 0x03    1     padding        Always 0
//! 0x04    4     tri_offset     Triangle array, relative to the blob
//! 0x08    4     quad_offset    Quad array
//! 0x0C    4     vert_offset    Vertex array
//! 0x10    4     tri_shading    Per-corner shading bytes for triangles
//! 0x14    4     quad_shading   Per-corner shading bytes for quads
//! ```
//!
//! # Placement
//!
//! The writer places arrays first-fit over a list of [`FreeRegion`]s,
//! always in the order triangles, quads, vertices. Only the first
//! `search_limit` regions are considered; the remaining ones are reserved.
//!
//! # Containers
//!
//! The PC archive stores the blob as its first sub-file at `0x800`; the PSX
//! archive stores it shifted by `0x30` bytes. Only bytes from the first
//! header table onwards are replaced.

mod reader;
mod writer;

use std::ops::Range;

pub use reader::{PlayerModel, PlayerSubmesh, ShadedCorner, read_player_model, shade};
pub use writer::{FreeRegion, ModelWriter, allocate, patch_pc_archive, patch_psx_archive};

/// Size of a submesh header
pub const SUBMESH_HEADER_SIZE: usize = 0x18;

/// A fixed table of submesh headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmeshGroup {
	/// Display name
	pub name: &'static str,
	/// Offset of the first header
	pub header_offset: usize,
	/// Number of submeshes
	pub count: usize,
}

impl SubmeshGroup {
	/// Offset of the header of submesh `index`.
	pub fn header_at(&self, index: usize) -> usize {
		self.header_offset + index * SUBMESH_HEADER_SIZE
	}
}

/// Fixed layout of a player model blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerModelLayout {
	/// Size of the blob
	pub size: usize,
	/// Header tables, in file order
	pub groups: Vec<SubmeshGroup>,
	/// Free space available to primitive arrays
	pub regions: Vec<FreeRegion>,
	/// Number of leading regions the allocator may use
	pub search_limit: usize,
	/// Shared shading block every header points to
	pub shading_offset: usize,
	/// Byte ranges overwritten with a constant after writing
	pub fills: Vec<(Range<usize>, u8)>,
	/// Offset where the replaced part of the blob starts
	pub patch_start: usize,
	/// Shift of the blob inside the PSX archive
	pub psx_shift: usize,
}

impl PlayerModelLayout {
	/// Layout of Mega Man's `PL00P010` (no helmet, normal shoes)
	pub fn megaman() -> Self {
		const BUSTER_START: usize = 0x2220;
		const SHADING: usize = 0x2268;
		const RIGHT_START: usize = 0x26F0;
		const EOF: usize = 0x2B40;

		Self {
			size: EOF,
			groups: vec![
				SubmeshGroup {
					name: "body",
					header_offset: 0x0080,
					count: 6,
				},
				SubmeshGroup {
					name: "head",
					header_offset: 0x0B60,
					count: 3,
				},
				SubmeshGroup {
					name: "feet",
					header_offset: 0x1800,
					count: 2,
				},
				SubmeshGroup {
					name: "left",
					header_offset: 0x1DD0,
					count: 3,
				},
				SubmeshGroup {
					name: "right",
					header_offset: RIGHT_START,
					count: 3,
				},
			],
			regions: vec![
				FreeRegion::new(0x0110, 0x0B60),
				FreeRegion::new(0x0BA8, 0x1800),
				FreeRegion::new(0x1830, 0x1DD0),
				FreeRegion::new(0x1E18, BUSTER_START),
				FreeRegion::new(0x2738, EOF),
			],
			search_limit: 3,
			shading_offset: SHADING,
			fills: vec![(BUSTER_START..SHADING, 0x00), (SHADING..RIGHT_START, 0x80)],
			patch_start: 0x80,
			psx_shift: 0x30,
		}
	}

	/// Finds a group by name.
	pub fn group(&self, name: &str) -> Option<&SubmeshGroup> {
		self.groups.iter().find(|group| group.name == name)
	}

	/// Total number of submeshes across all groups
	pub fn submesh_count(&self) -> usize {
		self.groups.iter().map(|group| group.count).sum()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_megaman_layout() {
		let layout = PlayerModelLayout::megaman();
		assert_eq!(layout.submesh_count(), 17);
		assert_eq!(layout.group("head").map(|g| g.header_at(2)), Some(0xB60 + 0x30));
		assert!(layout.group("helmet").is_none());

		// Header tables never overlap free regions
		for group in &layout.groups {
			let table = group.header_offset..group.header_at(group.count);
			for region in &layout.regions {
				assert!(table.end <= region.start || table.start >= region.end, "{}", group.name);
			}
		}
	}
}
