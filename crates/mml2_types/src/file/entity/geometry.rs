//! Geometry records, weighted vertices and draw calls.

use std::collections::HashSet;

use glam::{Mat4, Vec3};

use crate::{
	codec::{
		Face, FaceKind, PackedVertex,
		vertex::{MODEL_SCALE, to_world},
	},
	file::{AssetError, AssetKind, raw},
};

/// Size of a geometry record
pub const GEOMETRY_RECORD_SIZE: usize = 0x10;

/// Primitive counts and offsets of one submesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryRecord {
	/// Number of triangles
	pub tri_count: u8,
	/// Number of quads
	pub quad_count: u8,
	/// Number of vertices
	pub vert_count: u8,
	/// Vertex scale exponent, `-1` for half scale
	pub scale: i8,
	/// Triangle array offset
	pub tri_ofs: u32,
	/// Quad array offset
	pub quad_ofs: u32,
	/// Vertex array offset
	pub vert_ofs: u32,
}

impl GeometryRecord {
	/// Reads the record at `ofs`.
	pub fn read(data: &[u8], ofs: usize) -> Result<Self, AssetError> {
		let kind = AssetKind::Entity;
		Ok(Self {
			tri_count: raw::read_u8(data, ofs, kind)?,
			quad_count: raw::read_u8(data, ofs + 1, kind)?,
			vert_count: raw::read_u8(data, ofs + 2, kind)?,
			scale: raw::read_i8(data, ofs + 3, kind)?,
			tri_ofs: raw::read_u32(data, ofs + 4, kind)?,
			quad_ofs: raw::read_u32(data, ofs + 8, kind)?,
			vert_ofs: raw::read_u32(data, ofs + 0x0C, kind)?,
		})
	}

	/// Multiplier applied to the decoded vertex fields.
	///
	/// # Examples
	///
	/// ```
	/// use mml2_types::file::entity::GeometryRecord;
	///
	/// let mut record = GeometryRecord {
	/// 	tri_count: 0,
	/// 	quad_count: 0,
	/// 	vert_count: 0,
	/// 	scale: -1,
	/// 	tri_ofs: 0,
	/// 	quad_ofs: 0,
	/// 	vert_ofs: 0,
	/// };
	/// assert_eq!(record.scale_factor().unwrap(), 0.5);
	/// record.scale = 3;
	/// assert_eq!(record.scale_factor().unwrap(), 8.0);
	/// ```
	pub fn scale_factor(&self) -> Result<f32, AssetError> {
		match self.scale {
			-1 => Ok(0.5),
			0..=30 => Ok((1u32 << self.scale) as f32),
			other => Err(AssetError::format(AssetKind::Entity, format!("unsupported vertex scale {other}"))),
		}
	}
}

/// A vertex in bind pose with the bone it follows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedVertex {
	/// World position in meters
	pub position: Vec3,
	/// Skinning bone
	pub bone: usize,
}

/// A render corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityCorner {
	/// World position in meters
	pub position: Vec3,
	/// Normalized texture coordinate
	pub uv: [f32; 2],
	/// Skinning bone
	pub bone: usize,
	/// Material index
	pub material: u8,
}

/// A run of corners drawn with one material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
	/// First corner
	pub start: usize,
	/// Number of corners
	pub count: usize,
	/// Material index
	pub material: u8,
}

/// Groups consecutive equal materials into draw calls.
///
/// # Examples
///
/// ```
/// use mml2_types::file::entity::{DrawCall, group_draw_calls};
///
/// let calls = group_draw_calls([0, 0, 0, 1, 1, 1, 0, 0, 0]);
/// assert_eq!(calls.len(), 3);
/// assert_eq!(calls[1], DrawCall { start: 3, count: 3, material: 1 });
/// ```
pub fn group_draw_calls(materials: impl IntoIterator<Item = u8>) -> Vec<DrawCall> {
	let mut calls: Vec<DrawCall> = Vec::new();
	for (index, material) in materials.into_iter().enumerate() {
		match calls.last_mut() {
			Some(call) if call.material == material => call.count += 1,
			_ => calls.push(DrawCall {
				start: index,
				count: 1,
				material,
			}),
		}
	}
	calls
}

/// Position rounded to centimeters, used to find shared vertices.
pub(crate) type WeldKey = (i64, i64, i64);

pub(crate) fn weld_key(position: Vec3) -> WeldKey {
	let round = |v: f32| (f64::from(v) * 100.0).round() as i64;
	(round(position.x), round(position.y), round(position.z))
}

/// Decodes a vertex array and moves it into the bone's world space.
pub(crate) fn read_vertices(
	data: &[u8],
	record: &GeometryRecord,
	world: Mat4,
	bone: usize,
) -> Result<Vec<WeightedVertex>, AssetError> {
	let scale = record.scale_factor()?;
	let count = usize::from(record.vert_count);
	let bytes = raw::slice(data, record.vert_ofs as usize, count * PackedVertex::SIZE, AssetKind::Entity)?;

	Ok(bytes
		.chunks_exact(PackedVertex::SIZE)
		.map(|c| {
			// Only the record scale applies; bit 30 is left alone
			let [x, y, z] = PackedVertex::from_le_bytes([c[0], c[1], c[2], c[3]]).fields();
			let local = to_world([x as f32 * scale, y as f32 * scale, z as f32 * scale], MODEL_SCALE);
			WeightedVertex {
				position: world.transform_point3(local),
				bone,
			}
		})
		.collect())
}

/// Reassigns vertices that coincide with a vertex of `parent` to `parent`.
pub(crate) fn weld(vertices: &mut [WeightedVertex], haystack: &HashSet<WeldKey>, parent: usize) {
	for vertex in vertices {
		if haystack.contains(&weld_key(vertex.position)) {
			vertex.bone = parent;
		}
	}
}

/// Reads `count` faces and expands them into render corners.
pub(crate) fn read_corners(
	data: &[u8],
	ofs: usize,
	count: usize,
	kind: FaceKind,
	vertices: &[WeightedVertex],
	out: &mut Vec<EntityCorner>,
) -> Result<(), AssetError> {
	let bytes = raw::slice(data, ofs, count * Face::SIZE, AssetKind::Entity)?;
	for chunk in bytes.chunks_exact(Face::SIZE) {
		let mut record = [0u8; Face::SIZE];
		record.copy_from_slice(chunk);
		let face = Face::from_bytes(&record, kind);

		for triangle in face.triangles() {
			for corner in triangle {
				let vertex = vertices.get(usize::from(corner.index)).ok_or_else(|| {
					AssetError::format(
						AssetKind::Entity,
						format!("face references vertex {} of {}", corner.index, vertices.len()),
					)
				})?;
				out.push(EntityCorner {
					position: vertex.position,
					uv: corner.uv(),
					bone: vertex.bone,
					material: face.material,
				});
			}
		}
	}
	Ok(())
}
