use super::{PlayerModelLayout, SUBMESH_HEADER_SIZE};
use crate::file::{
	AssetError, AssetKind,
	archive::{first_file_mut, write_at},
	obj::EncodedMesh,
};

/// A span of unused bytes; `start` advances as arrays are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeRegion {
	/// First free byte
	pub start: usize,
	/// One past the last free byte
	pub end: usize,
}

impl FreeRegion {
	/// Creates a region.
	pub fn new(start: usize, end: usize) -> Self {
		Self {
			start,
			end,
		}
	}

	/// Remaining free bytes
	pub fn len(&self) -> usize {
		self.end.saturating_sub(self.start)
	}

	/// Returns `true` if nothing fits anymore.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Reserves `len` bytes in the first of the leading `search_limit` regions
/// with enough room and returns their offset.
///
/// # Examples
///
/// ```
/// use mml2_types::file::model::{FreeRegion, allocate};
///
/// let mut regions = [FreeRegion::new(0x10, 0x20), FreeRegion::new(0x40, 0x80)];
/// assert_eq!(allocate(&mut regions, 2, 0x18, "quads").unwrap(), 0x40);
/// assert_eq!(allocate(&mut regions, 2, 0x08, "verts").unwrap(), 0x10);
/// assert_eq!(regions[1].start, 0x58);
/// assert!(allocate(&mut regions, 2, 0x30, "tris").is_err());
/// ```
pub fn allocate(
	regions: &mut [FreeRegion],
	search_limit: usize,
	len: usize,
	what: &'static str,
) -> Result<usize, AssetError> {
	let region = regions.iter_mut().take(search_limit).find(|region| region.len() >= len).ok_or(
		AssetError::NoSpace {
			what,
			len,
		},
	)?;

	let offset = region.start;
	region.start += len;
	Ok(offset)
}

/// Assembles a player model blob group by group
#[derive(Debug, Clone)]
pub struct ModelWriter {
	layout: PlayerModelLayout,
	regions: Vec<FreeRegion>,
	data: Vec<u8>,
}

impl ModelWriter {
	/// Starts from a zeroed blob.
	pub fn new(layout: PlayerModelLayout) -> Self {
		let regions = layout.regions.clone();
		let data = vec![0u8; layout.size];
		Self {
			layout,
			regions,
			data,
		}
	}

	/// Regions in their current state
	pub fn regions(&self) -> &[FreeRegion] {
		&self.regions
	}

	/// Writes one submesh header at `header_offset` and places its arrays.
	pub fn write_submesh(&mut self, header_offset: usize, mesh: &EncodedMesh) -> Result<(), AssetError> {
		let count = |len: usize, what: &str| {
			u8::try_from(len).map_err(|_| AssetError::format(AssetKind::Model, format!("{len} {what} in one submesh")))
		};

		let mut header = [0u8; SUBMESH_HEADER_SIZE];
		header[0] = count(mesh.triangles.len(), "triangles")?;
		header[1] = count(mesh.quads.len(), "quads")?;
		header[2] = count(mesh.vertices.len(), "vertices")?;

		let arrays: [(&'static str, Vec<u8>); 3] = [
			("triangles", mesh.triangle_bytes()),
			("quads", mesh.quad_bytes()),
			("vertices", mesh.vertex_bytes()),
		];
		for (slot, (what, bytes)) in arrays.iter().enumerate() {
			let offset = allocate(&mut self.regions, self.layout.search_limit, bytes.len(), what)?;
			write_at(&mut self.data, offset, bytes, AssetKind::Model)?;
			let field = 0x04 + slot * 4;
			header[field..field + 4].copy_from_slice(&(offset as u32).to_le_bytes());
		}

		let shading = (self.layout.shading_offset as u32).to_le_bytes();
		header[0x10..0x14].copy_from_slice(&shading);
		header[0x14..0x18].copy_from_slice(&shading);

		write_at(&mut self.data, header_offset, &header, AssetKind::Model)
	}

	/// Writes every submesh of the named group.
	pub fn write_group(&mut self, name: &str, meshes: &[EncodedMesh]) -> Result<(), AssetError> {
		let group = self
			.layout
			.group(name)
			.cloned()
			.ok_or_else(|| AssetError::format(AssetKind::Model, format!("unknown submesh group `{name}`")))?;

		if meshes.len() != group.count {
			return Err(AssetError::format(
				AssetKind::Model,
				format!("group `{name}` needs {} submeshes, got {}", group.count, meshes.len()),
			));
		}

		for (i, mesh) in meshes.iter().enumerate() {
			self.write_submesh(group.header_at(i), mesh)?;
		}
		log::debug!("Wrote {} submeshes for `{name}`", meshes.len());
		Ok(())
	}

	/// Applies the layout's constant fills and returns the blob.
	pub fn finish(mut self) -> Vec<u8> {
		for (range, value) in &self.layout.fills {
			if let Some(bytes) = self.data.get_mut(range.clone()) {
				bytes.fill(*value);
			}
		}

		for (i, region) in self.regions.iter().enumerate() {
			log::debug!("Region {i}: 0x{:X} bytes left at 0x{:X}", region.len(), region.start);
		}
		self.data
	}
}

/// Copies `model` into a PSX archive, shifted by the layout's PSX offset.
pub fn patch_psx_archive(archive: &mut [u8], model: &[u8], layout: &PlayerModelLayout) -> Result<(), AssetError> {
	let part = model.get(layout.patch_start..).unwrap_or_default();
	write_at(archive, layout.patch_start + layout.psx_shift, part, AssetKind::Archive)
}

/// Copies `model` into the first sub-file of a PC archive.
pub fn patch_pc_archive(archive: &mut [u8], model: &[u8], layout: &PlayerModelLayout) -> Result<(), AssetError> {
	let file = first_file_mut(archive)?;
	let part = model.get(layout.patch_start..).unwrap_or_default();
	write_at(file, layout.patch_start, part, AssetKind::Archive)
}
