//! Text mesh (OBJ subset) to primitive arrays.
//!
//! Only `v`, `vt` and `f` lines are read. Every face corner must reference
//! both a position and a texture coordinate (`v/vt` or `v/vt/vn`).

use super::{AssetError, AssetKind};
use crate::codec::{
	CodecOptions, Corner, Face, FaceKind, PackedVertex,
	face::{check_vertex_count, quantize_uv},
};

/// Model units per OBJ unit
pub const MODEL_UNITS_PER_METER: f32 = 1.0 / 0.00125;

/// Material index used for faces drawn with the second palette
pub const FACE_MATERIAL: u8 = 2;

/// Primitive arrays of one submesh
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EncodedMesh {
	/// Packed vertices
	pub vertices: Vec<PackedVertex>,
	/// Triangle records
	pub triangles: Vec<Face>,
	/// Quad records
	pub quads: Vec<Face>,
}

impl EncodedMesh {
	/// Serialized vertex array
	pub fn vertex_bytes(&self) -> Vec<u8> {
		self.vertices.iter().flat_map(|v| v.to_le_bytes()).collect()
	}

	/// Serialized triangle array
	pub fn triangle_bytes(&self) -> Vec<u8> {
		self.triangles.iter().flat_map(Face::to_bytes).collect()
	}

	/// Serialized quad array
	pub fn quad_bytes(&self) -> Vec<u8> {
		self.quads.iter().flat_map(Face::to_bytes).collect()
	}

	/// Parses already encoded primitive arrays.
	pub fn from_raw_parts(vertices: &[u8], triangles: &[u8], quads: &[u8]) -> Result<Self, AssetError> {
		let check = |bytes: &[u8], size: usize, what: &str| {
			if bytes.len() % size == 0 {
				Ok(())
			} else {
				Err(AssetError::format(
					AssetKind::Model,
					format!("{what} array of {} bytes is not a multiple of {size}", bytes.len()),
				))
			}
		};
		check(vertices, PackedVertex::SIZE, "vertex")?;
		check(triangles, Face::SIZE, "triangle")?;
		check(quads, Face::SIZE, "quad")?;

		let faces = |bytes: &[u8], kind: FaceKind| -> Vec<Face> {
			bytes
				.chunks_exact(Face::SIZE)
				.map(|chunk| {
					let mut record = [0u8; Face::SIZE];
					record.copy_from_slice(chunk);
					Face::from_bytes(&record, kind)
				})
				.collect()
		};

		Ok(Self {
			vertices: vertices
				.chunks_exact(4)
				.map(|c| PackedVertex::from_le_bytes([c[0], c[1], c[2], c[3]]))
				.collect(),
			triangles: faces(triangles, FaceKind::Triangle),
			quads: faces(quads, FaceKind::Quad),
		})
	}
}

fn format_error(line_no: usize, line: &str, message: &str) -> AssetError {
	AssetError::format(AssetKind::Obj, format!("line {}: {message}: `{line}`", line_no + 1))
}

fn parse_floats<const N: usize>(line_no: usize, line: &str) -> Result<[f32; N], AssetError> {
	let mut out = [0.0; N];
	let mut parts = line.split_whitespace().skip(1);
	for value in &mut out {
		*value = parts
			.next()
			.and_then(|s| s.parse().ok())
			.ok_or_else(|| format_error(line_no, line, "expected a number"))?;
	}
	Ok(out)
}

/// Scales, rotates 180° about X and rounds half up.
fn to_model_units([x, y, z]: [f32; 3]) -> [i32; 3] {
	let round = |v: f32| (v * MODEL_UNITS_PER_METER + 0.5).floor() as i32;
	[round(x), round(-y), round(-z)]
}

struct FaceLine<'a> {
	line_no: usize,
	line: &'a str,
	corners: Vec<&'a str>,
}

/// Encodes OBJ text into primitive arrays.
///
/// Triangles use `triangle_material`; quads always use material 0.
///
/// # Examples
///
/// ```
/// use mml2_types::{codec::CodecOptions, file::obj::encode_obj};
///
/// let obj = "v 0 0 0\nv 0.1 0 0\nv 0 0.1 0\nvt 0 0\nf 1/1 2/1 3/1\n";
/// let mesh = encode_obj(obj, 0, CodecOptions::default()).unwrap();
/// assert_eq!(mesh.vertices.len(), 3);
/// assert_eq!(mesh.triangles.len(), 1);
/// assert!(mesh.quads.is_empty());
/// ```
pub fn encode_obj(text: &str, triangle_material: u8, options: CodecOptions) -> Result<EncodedMesh, AssetError> {
	let mut positions = Vec::new();
	let mut uvs = Vec::new();
	let mut faces = Vec::new();

	for (line_no, line) in text.lines().enumerate() {
		if line.starts_with("v ") {
			let [x, y, z] = to_model_units(parse_floats::<3>(line_no, line)?);
			positions.push(PackedVertex::encode(x, y, z, options)?);
		} else if line.starts_with("vt ") {
			let [u, v] = parse_floats::<2>(line_no, line)?;
			uvs.push((quantize_uv(u), quantize_uv(1.0 - v)));
		} else if line.starts_with("f ") {
			let corners: Vec<&str> = line.split_whitespace().filter(|token| token.contains('/')).collect();
			if corners.len() != 3 && corners.len() != 4 {
				return Err(format_error(line_no, line, "face must have 3 or 4 `v/vt` corners"));
			}
			faces.push(FaceLine {
				line_no,
				line,
				corners,
			});
		}
	}

	check_vertex_count(positions.len(), options)?;

	let corner = |face: &FaceLine<'_>, slot: usize| -> Result<Corner, AssetError> {
		let mut refs = face.corners[slot].split('/');
		let mut index = |len: usize| -> Result<usize, AssetError> {
			refs.next()
				.and_then(|s| s.parse::<usize>().ok())
				.filter(|&i| (1..=len).contains(&i))
				.map(|i| i - 1)
				.ok_or_else(|| format_error(face.line_no, face.line, "invalid vertex reference"))
		};
		let vertex = index(positions.len())?;
		let (u, v) = uvs[index(uvs.len())?];
		Ok(Corner::new(vertex as u8, u, v))
	};

	let mut mesh = EncodedMesh {
		vertices: positions.clone(),
		..Default::default()
	};
	for face in &faces {
		if face.corners.len() == 3 {
			mesh.triangles.push(Face::triangle(corner(face, 1)?, corner(face, 0)?, corner(face, 2)?, triangle_material));
		} else {
			mesh.quads.push(Face::quad(corner(face, 0)?, corner(face, 3)?, corner(face, 1)?, corner(face, 2)?, 0));
		}
	}

	Ok(mesh)
}
