//! Skinned entity meshes.
//!
//! An entity mesh bundles a skeleton, a hierarchy mapping each submesh to a
//! bone, the submesh geometry and a table of texture pages. All offsets are
//! relative to the buffer the mesh is read from.
//!
//! # Header
//!
//! ```text
//! Offset  Size  Field           Description
//! ------  ----  --------------  ------------------------------------------
//! 0x00    1     submesh_count   Number of geometry records
//! 0x04    4     geometry_ofs    Geometry records (16 bytes each)
//! 0x10    4     skeleton_ofs    Bone rest positions (3 × i16 each)
//! 0x14    4     hierarchy_ofs   Hierarchy entries (4 bytes each)
//! 0x18    4     texture_ofs     Texture table, 0 if none
//! 0x1C    4     collision_ofs   Collision data, 0 if none
//! 0x20    4     shadow_ofs      Shadow data, 0 if none
//! ```
//!
//! Tables are contiguous: the bone count is `(hierarchy - skeleton) / 6`,
//! the hierarchy runs up to the texture table and the texture table up to
//! the collision (or shadow) data.
//!
//! # Geometry Record (16 bytes)
//!
//! ```text
//! Offset  Size  Field        Description
//! ------  ----  -----------  ------------------------------------------
//! 0x00    1     tri_count    Number of triangles
//! 0x01    1     quad_count   Number of quads
//! 0x02    1     vert_count   Number of vertices
//! 0x03    1     scale        -1 for ×0.5, otherwise ×(1 << scale)
//! 0x04    4     tri_ofs      Triangle array
//! 0x08    4     quad_ofs     Quad array
//! 0x0C    4     vert_ofs     Vertex array
//! ```
//!
//! # Hierarchy Entry (4 bytes)
//!
//! ```text
//! Offset  Size  Field     Description
//! ------  ----  --------  ------------------------------------------
//! 0x00    1     polygon   Polygon index (i8)
//! 0x01    1     parent    Parent bone (i8, -1 for the root)
//! 0x02    1     bone      Bone index
//! 0x03    1     flags     0x80 hide, 0x40 share vertices with the parent
//! ```
//!
//! Entry `i` drives submesh `i`. When the share flag is set, a vertex whose
//! position (rounded to centimeters) matches a vertex already emitted for the
//! parent bone is skinned to the parent instead.

mod geometry;
mod skeleton;

use std::collections::HashSet;

pub use geometry::{DrawCall, EntityCorner, GEOMETRY_RECORD_SIZE, GeometryRecord, WeightedVertex, group_draw_calls};
pub use skeleton::{
	BONE_SIZE, Bone, HIERARCHY_ENTRY_SIZE, HierarchyEntry, HierarchyFlags, Skeleton, read_hierarchy,
};

use super::{AssetError, AssetKind, raw};
use crate::codec::{CodecOptions, FaceKind};

/// Size of the mesh header
pub const HEADER_SIZE: usize = 0x24;

/// Mesh header offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntityHeader {
	/// Number of geometry records
	pub submesh_count: u8,
	/// Geometry records
	pub geometry_ofs: u32,
	/// Bone records
	pub skeleton_ofs: u32,
	/// Hierarchy entries
	pub hierarchy_ofs: u32,
	/// Texture table
	pub texture_ofs: u32,
	/// Collision data
	pub collision_ofs: u32,
	/// Shadow data
	pub shadow_ofs: u32,
}

impl EntityHeader {
	/// Reads the header at `ofs`.
	pub fn read(data: &[u8], ofs: usize) -> Result<Self, AssetError> {
		let kind = AssetKind::Entity;
		Ok(Self {
			submesh_count: raw::read_u8(data, ofs, kind)?,
			geometry_ofs: raw::read_u32(data, ofs + 0x04, kind)?,
			skeleton_ofs: raw::read_u32(data, ofs + 0x10, kind)?,
			hierarchy_ofs: raw::read_u32(data, ofs + 0x14, kind)?,
			texture_ofs: raw::read_u32(data, ofs + 0x18, kind)?,
			collision_ofs: raw::read_u32(data, ofs + 0x1C, kind)?,
			shadow_ofs: raw::read_u32(data, ofs + 0x20, kind)?,
		})
	}

	/// Serializes the header.
	pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
		let mut out = [0u8; HEADER_SIZE];
		out[0] = self.submesh_count;
		for (field, value) in [
			(0x04, self.geometry_ofs),
			(0x10, self.skeleton_ofs),
			(0x14, self.hierarchy_ofs),
			(0x18, self.texture_ofs),
			(0x1C, self.collision_ofs),
			(0x20, self.shadow_ofs),
		] {
			out[field..field + 4].copy_from_slice(&value.to_le_bytes());
		}
		out
	}

	/// Number of bone records.
	pub fn bone_count(&self) -> usize {
		(self.hierarchy_ofs.saturating_sub(self.skeleton_ofs) as usize) / BONE_SIZE
	}

	/// First offset after the texture table.
	fn trailing_ofs(&self) -> u32 {
		if self.collision_ofs != 0 {
			self.collision_ofs
		} else {
			self.shadow_ofs
		}
	}

	/// Number of hierarchy entries.
	pub fn hierarchy_count(&self) -> Result<usize, AssetError> {
		let end = if self.texture_ofs != 0 {
			self.texture_ofs
		} else {
			self.trailing_ofs()
		};
		span(self.hierarchy_ofs, end, HIERARCHY_ENTRY_SIZE, "hierarchy")
	}

	/// Number of texture table entries.
	pub fn texture_count(&self) -> Result<usize, AssetError> {
		if self.texture_ofs == 0 {
			return Ok(0);
		}
		span(self.texture_ofs, self.trailing_ofs(), TEXTURE_ENTRY_SIZE, "texture table")
	}
}

fn span(start: u32, end: u32, size: usize, what: &str) -> Result<usize, AssetError> {
	end.checked_sub(start).map(|len| len as usize / size).ok_or_else(|| {
		AssetError::format(AssetKind::Entity, format!("{what} ends at 0x{end:X} before it starts at 0x{start:X}"))
	})
}

/// Size of a texture table entry
pub const TEXTURE_ENTRY_SIZE: usize = 4;

/// VRAM coordinates of a texture page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureRef {
	/// Image coordinate word
	pub image_coords: u16,
	/// Palette coordinate word
	pub palette_coords: u16,
}

/// A parsed entity mesh in bind pose
#[derive(Debug, Clone, PartialEq)]
pub struct EntityMesh {
	/// Header offsets
	pub header: EntityHeader,
	/// Linked skeleton
	pub skeleton: Skeleton,
	/// Hierarchy entries
	pub hierarchy: Vec<HierarchyEntry>,
	/// Every vertex in emission order
	pub vertices: Vec<WeightedVertex>,
	/// Render corners, three per triangle
	pub corners: Vec<EntityCorner>,
	/// Texture pages, one per material
	pub textures: Vec<TextureRef>,
}

impl EntityMesh {
	/// Parses the mesh whose header is at `mesh_ofs`.
	pub fn parse(data: &[u8], mesh_ofs: usize, options: CodecOptions) -> Result<Self, AssetError> {
		let kind = AssetKind::Entity;
		let header = EntityHeader::read(data, mesh_ofs)?;

		let mut skeleton = Skeleton::read_bones(data, header.skeleton_ofs as usize, header.bone_count())?;
		let hierarchy = read_hierarchy(data, header.hierarchy_ofs as usize, header.hierarchy_count()?, options)?;
		skeleton.link(&hierarchy);
		let world = skeleton.world_matrices();

		let mut vertices: Vec<WeightedVertex> = Vec::new();
		let mut corners = Vec::new();
		for i in 0..usize::from(header.submesh_count) {
			let entry = hierarchy.get(i).ok_or_else(|| {
				AssetError::format(kind, format!("submesh {i} has no hierarchy entry ({} entries)", hierarchy.len()))
			})?;
			let bone = usize::from(entry.bone);
			let matrix = *world
				.get(bone)
				.ok_or_else(|| AssetError::format(kind, format!("submesh {i} uses missing bone {bone}")))?;

			let record = GeometryRecord::read(data, header.geometry_ofs as usize + i * GEOMETRY_RECORD_SIZE)?;
			let mut local = geometry::read_vertices(data, &record, matrix, bone)?;

			if entry.flags.share_vertices()
				&& skeleton.bones()[bone].parent.is_some()
				&& let Some(parent) = entry.parent_bone()
			{
				let haystack: HashSet<_> =
					vertices.iter().filter(|v| v.bone == parent).map(|v| geometry::weld_key(v.position)).collect();
				geometry::weld(&mut local, &haystack, parent);
			}

			geometry::read_corners(
				data,
				record.tri_ofs as usize,
				usize::from(record.tri_count),
				FaceKind::Triangle,
				&local,
				&mut corners,
			)?;
			geometry::read_corners(
				data,
				record.quad_ofs as usize,
				usize::from(record.quad_count),
				FaceKind::Quad,
				&local,
				&mut corners,
			)?;
			vertices.extend(local);
		}

		let mut textures = Vec::with_capacity(header.texture_count()?);
		for i in 0..header.texture_count()? {
			let ofs = header.texture_ofs as usize + i * TEXTURE_ENTRY_SIZE;
			textures.push(TextureRef {
				image_coords: raw::read_u16(data, ofs, kind)?,
				palette_coords: raw::read_u16(data, ofs + 2, kind)?,
			});
		}

		log::debug!(
			"Entity mesh at 0x{mesh_ofs:X}: {} bones, {} submeshes, {} corners, {} textures",
			skeleton.len(),
			header.submesh_count,
			corners.len(),
			textures.len()
		);

		Ok(Self {
			header,
			skeleton,
			hierarchy,
			vertices,
			corners,
			textures,
		})
	}

	/// Draw calls over [`Self::corners`].
	pub fn draw_calls(&self) -> Vec<DrawCall> {
		group_draw_calls(self.corners.iter().map(|c| c.material))
	}
}

#[cfg(test)]
mod tests {
	use glam::Vec3;

	use super::*;
	use crate::codec::{Corner, Face, PackedVertex};

	/// Two bones, two submeshes sharing one vertex position.
	fn sample(flags: u8) -> Vec<u8> {
		let geometry_ofs = HEADER_SIZE as u32;
		let skeleton_ofs = geometry_ofs + 2 * GEOMETRY_RECORD_SIZE as u32;
		let hierarchy_ofs = skeleton_ofs + 2 * BONE_SIZE as u32;
		let texture_ofs = hierarchy_ofs + 2 * HIERARCHY_ENTRY_SIZE as u32;
		let shadow_ofs = texture_ofs + TEXTURE_ENTRY_SIZE as u32;
		let vert_ofs = shadow_ofs;
		let tri_ofs = vert_ofs + 7 * 4;

		let header = EntityHeader {
			submesh_count: 2,
			geometry_ofs,
			skeleton_ofs,
			hierarchy_ofs,
			texture_ofs,
			collision_ofs: 0,
			shadow_ofs,
		};
		let mut data = header.to_bytes().to_vec();

		// Geometry: submesh 0 has one triangle, submesh 1 has one quad
		let record = |tri: u8, quad: u8, vert: u32, face: u32| {
			let mut out = vec![tri, quad, 3, 0];
			let (tri_at, quad_at) = if tri > 0 {
				(face, 0)
			} else {
				(0, face)
			};
			out.extend_from_slice(&tri_at.to_le_bytes());
			out.extend_from_slice(&quad_at.to_le_bytes());
			out.extend_from_slice(&vert.to_le_bytes());
			out
		};
		data.extend(record(1, 0, vert_ofs, tri_ofs));
		data.extend(record(0, 1, vert_ofs + 12, tri_ofs + 12));
		data[HEADER_SIZE + GEOMETRY_RECORD_SIZE + 2] = 4;
		// Submesh 0 doubles its vertices through the record scale
		data[HEADER_SIZE + 3] = 1;

		// Bones: root at origin, child 800 units up (Y flips to -1 m)
		for v in [0i16, 0, 0, 0, 800, 0] {
			data.extend_from_slice(&v.to_le_bytes());
		}

		data.extend([0, 0xFF, 0, 0]);
		data.extend([1, 0, 1, flags]);
		data.extend_from_slice(&0x0013u16.to_le_bytes());
		data.extend_from_slice(&0x7C02u16.to_le_bytes());

		// Vertices: submesh 1 starts with the child's origin, which equals
		// the root's vertex at -1 m after the bone transform
		let vertex = |x, y, z| PackedVertex::encode(x, y, z, CodecOptions::strict()).unwrap().to_le_bytes();
		for v in [vertex(0, 0, 0), vertex(0, 400, 0), vertex(400, 0, 0)] {
			data.extend(v);
		}
		for v in [vertex(0, 0, 0), vertex(8, 0, 0), vertex(0, 0, 8)] {
			data.extend(v);
		}
		data.extend(vertex(0, 8, 0));

		let c = |i| Corner::new(i, 0, 0);
		data.extend(Face::triangle(c(0), c(1), c(2), 1).to_bytes());
		data.extend(Face::quad(c(0), c(1), c(2), c(3), 0).to_bytes());
		data
	}

	#[test]
	fn test_parse_sample() {
		let mesh = EntityMesh::parse(&sample(0x40), 0, CodecOptions::strict()).unwrap();
		assert_eq!(mesh.skeleton.len(), 2);
		assert_eq!(mesh.skeleton.bones()[1].parent, Some(0));
		assert_eq!(mesh.vertices.len(), 7);
		assert_eq!(mesh.corners.len(), 3 + 6);
		assert_eq!(
			mesh.textures,
			vec![TextureRef {
				image_coords: 0x13,
				palette_coords: 0x7C02,
			}]
		);

		assert!(mesh.vertices[1].position.abs_diff_eq(Vec3::new(0.0, -1.0, 0.0), 1e-6));
		assert!(mesh.vertices[2].position.abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-6));

		// Child vertices are offset by the child bone
		assert!(mesh.vertices[3].position.abs_diff_eq(Vec3::new(0.0, -1.0, 0.0), 1e-6));
		assert!(mesh.vertices[4].position.abs_diff_eq(Vec3::new(0.01, -1.0, 0.0), 1e-6));
	}

	#[test]
	fn test_shared_vertex_welds_to_parent() {
		let mesh = EntityMesh::parse(&sample(0x40), 0, CodecOptions::strict()).unwrap();
		let bones: Vec<usize> = mesh.vertices.iter().map(|v| v.bone).collect();
		assert_eq!(bones, vec![0, 0, 0, 0, 1, 1, 1]);

		let mesh = EntityMesh::parse(&sample(0x00), 0, CodecOptions::strict()).unwrap();
		assert_eq!(mesh.vertices[3].bone, 1);
	}

	#[test]
	fn test_draw_calls() {
		let mesh = EntityMesh::parse(&sample(0), 0, CodecOptions::strict()).unwrap();
		let calls = mesh.draw_calls();
		assert_eq!(calls.len(), 2);
		assert_eq!((calls[0].start, calls[0].count, calls[0].material), (0, 3, 1));
		assert_eq!((calls[1].start, calls[1].count, calls[1].material), (3, 6, 0));
	}

	#[test]
	fn test_unknown_flags_by_mode() {
		let data = sample(0x41);
		assert!(EntityMesh::parse(&data, 0, CodecOptions::strict()).is_err());
		assert!(EntityMesh::parse(&data, 0, CodecOptions::compatible()).is_ok());
	}

	#[test]
	fn test_truncated_mesh() {
		let data = sample(0);
		assert!(EntityMesh::parse(&data[..data.len() - 1], 0, CodecOptions::strict()).is_err());
	}
}
