use glam::Vec3;

use super::PlayerModelLayout;
use crate::{
	codec::{
		Face, FaceKind, PackedVertex,
		vertex::{MODEL_SCALE, to_world},
	},
	file::{AssetError, AssetKind, raw},
};

/// Shading bytes above this value saturate to full brightness.
const FULL_BRIGHTNESS: u8 = 0x80;

/// One render corner with its resolved position, UV and shade
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadedCorner {
	/// Position in meters (Y up)
	pub position: Vec3,
	/// Normalized texture coordinate
	pub uv: [f32; 2],
	/// Gray level in `0.0..=1.0`
	pub shade: f32,
}

/// A decoded submesh of a player model
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSubmesh {
	/// Group name from the layout
	pub group: &'static str,
	/// Index within the group
	pub index: usize,
	/// Vertex positions in meters (Y up)
	pub positions: Vec<Vec3>,
	/// Triangle records
	pub triangles: Vec<Face>,
	/// Quad records
	pub quads: Vec<Face>,
	/// Per-corner shading bytes of each triangle
	pub triangle_shading: Vec<[u8; 4]>,
	/// Per-corner shading bytes of each quad
	pub quad_shading: Vec<[u8; 4]>,
}

/// Converts a shading byte to a gray level.
///
/// # Examples
///
/// ```
/// use mml2_types::file::model::shade;
///
/// assert_eq!(shade(0x40), 0.5);
/// assert_eq!(shade(0x80), 1.0);
/// assert_eq!(shade(0xFF), 1.0);
/// ```
pub fn shade(value: u8) -> f32 {
	f32::from(value.min(FULL_BRIGHTNESS)) / f32::from(FULL_BRIGHTNESS)
}

impl PlayerSubmesh {
	/// Expands every face into render triangles, `(A, C, B)` then `(B, C, D)`.
	///
	/// Fails if a face references a vertex the submesh does not have.
	pub fn shaded_triangles(&self) -> Result<Vec<[ShadedCorner; 3]>, AssetError> {
		let faces = self.triangles.iter().zip(&self.triangle_shading).chain(self.quads.iter().zip(&self.quad_shading));

		let mut out = Vec::with_capacity(self.triangles.len() + self.quads.len() * 2);
		for (face, shading) in faces {
			let slots: &[[usize; 3]] = match face.kind {
				FaceKind::Triangle => &[[0, 2, 1]],
				FaceKind::Quad => &[[0, 2, 1], [1, 2, 3]],
			};
			for triangle in slots {
				let mut corners = [ShadedCorner {
					position: Vec3::ZERO,
					uv: [0.0; 2],
					shade: 0.0,
				}; 3];
				for (corner, &slot) in corners.iter_mut().zip(triangle) {
					let source = face.corners[slot];
					corner.position = *self.positions.get(usize::from(source.index)).ok_or_else(|| {
						AssetError::format(
							AssetKind::Model,
							format!(
								"{} submesh {} references vertex {} of {}",
								self.group,
								self.index,
								source.index,
								self.positions.len()
							),
						)
					})?;
					corner.uv = source.uv();
					corner.shade = shade(shading[slot]);
				}
				out.push(corners);
			}
		}

		Ok(out)
	}
}

/// A decoded player model
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerModel {
	/// Submeshes in layout order
	pub submeshes: Vec<PlayerSubmesh>,
}

impl PlayerModel {
	/// Finds a submesh by group name and index.
	pub fn submesh(&self, group: &str, index: usize) -> Option<&PlayerSubmesh> {
		self.submeshes.iter().find(|s| s.group == group && s.index == index)
	}
}

fn read_faces(blob: &[u8], ofs: usize, count: usize, kind: FaceKind) -> Result<Vec<Face>, AssetError> {
	let bytes = raw::slice(blob, ofs, count * Face::SIZE, AssetKind::Model)?;
	Ok(bytes
		.chunks_exact(Face::SIZE)
		.map(|chunk| {
			let mut record = [0u8; Face::SIZE];
			record.copy_from_slice(chunk);
			Face::from_bytes(&record, kind)
		})
		.collect())
}

fn read_shading(blob: &[u8], ofs: usize, count: usize) -> Result<Vec<[u8; 4]>, AssetError> {
	let bytes = raw::slice(blob, ofs, count * 4, AssetKind::Model)?;
	Ok(bytes.chunks_exact(4).map(|c| [c[0], c[1], c[2], c[3]]).collect())
}

/// Reads every submesh named by `layout` from a model blob.
pub fn read_player_model(blob: &[u8], layout: &PlayerModelLayout) -> Result<PlayerModel, AssetError> {
	let kind = AssetKind::Model;
	let mut submeshes = Vec::with_capacity(layout.submesh_count());

	for group in &layout.groups {
		for index in 0..group.count {
			let header = group.header_at(index);
			let tri_count = usize::from(raw::read_u8(blob, header, kind)?);
			let quad_count = usize::from(raw::read_u8(blob, header + 1, kind)?);
			let vert_count = usize::from(raw::read_u8(blob, header + 2, kind)?);
			let offset = |field: usize| raw::read_u32(blob, header + field, kind).map(|v| v as usize);

			let vertices = raw::slice(blob, offset(0x0C)?, vert_count * PackedVertex::SIZE, kind)?;
			let positions = vertices
				.chunks_exact(PackedVertex::SIZE)
				.map(|c| {
					let [x, y, z] = PackedVertex::from_le_bytes([c[0], c[1], c[2], c[3]]).decode();
					to_world([x as f32, y as f32, z as f32], MODEL_SCALE)
				})
				.collect();

			submeshes.push(PlayerSubmesh {
				group: group.name,
				index,
				positions,
				triangles: read_faces(blob, offset(0x04)?, tri_count, FaceKind::Triangle)?,
				quads: read_faces(blob, offset(0x08)?, quad_count, FaceKind::Quad)?,
				triangle_shading: read_shading(blob, offset(0x10)?, tri_count)?,
				quad_shading: read_shading(blob, offset(0x14)?, quad_count)?,
			});
		}
	}

	log::debug!("Read {} player submeshes", submeshes.len());
	Ok(PlayerModel {
		submeshes,
	})
}
