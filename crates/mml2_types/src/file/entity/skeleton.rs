//! Bones and the polygon hierarchy.

use glam::{Mat4, Vec3};

use crate::{
	codec::{
		CodecOptions,
		vertex::{MODEL_SCALE, to_world},
	},
	file::{AssetError, AssetKind, raw},
};

/// Size of a bone record (3 × `i16`)
pub const BONE_SIZE: usize = 6;

/// Size of a hierarchy entry
pub const HIERARCHY_ENTRY_SIZE: usize = 4;

/// Flags of a hierarchy entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HierarchyFlags(pub u8);

impl HierarchyFlags {
	/// The polygon is not drawn
	pub const HIDE: u8 = 0x80;

	/// Vertices shared with the parent bone are welded to it
	pub const SHARE_VERTICES: u8 = 0x40;

	/// Returns `true` if the polygon is hidden.
	pub fn hide(self) -> bool {
		self.0 & Self::HIDE != 0
	}

	/// Returns `true` if vertex welding is enabled.
	pub fn share_vertices(self) -> bool {
		self.0 & Self::SHARE_VERTICES != 0
	}

	/// Bits with no known meaning
	pub fn unknown(self) -> u8 {
		self.0 & !(Self::HIDE | Self::SHARE_VERTICES)
	}
}

/// Maps a submesh to its bone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HierarchyEntry {
	/// Polygon index
	pub polygon: i8,
	/// Parent bone, negative for none
	pub parent: i8,
	/// Bone driving the submesh
	pub bone: u8,
	/// Flags
	pub flags: HierarchyFlags,
}

impl HierarchyEntry {
	/// Parent bone index, if any.
	pub fn parent_bone(&self) -> Option<usize> {
		usize::try_from(self.parent).ok()
	}

	/// Parses a 4-byte entry.
	pub fn from_bytes(bytes: [u8; HIERARCHY_ENTRY_SIZE]) -> Self {
		Self {
			polygon: bytes[0] as i8,
			parent: bytes[1] as i8,
			bone: bytes[2],
			flags: HierarchyFlags(bytes[3]),
		}
	}

	/// Serializes the entry.
	pub fn to_bytes(&self) -> [u8; HIERARCHY_ENTRY_SIZE] {
		[self.polygon as u8, self.parent as u8, self.bone, self.flags.0]
	}
}

/// Reads `count` hierarchy entries.
///
/// Unknown flag bits are an error in strict mode and logged otherwise.
pub fn read_hierarchy(
	data: &[u8],
	ofs: usize,
	count: usize,
	options: CodecOptions,
) -> Result<Vec<HierarchyEntry>, AssetError> {
	let bytes = raw::slice(data, ofs, count * HIERARCHY_ENTRY_SIZE, AssetKind::Entity)?;
	let mut entries = Vec::with_capacity(count);
	for (i, chunk) in bytes.chunks_exact(HIERARCHY_ENTRY_SIZE).enumerate() {
		let entry = HierarchyEntry::from_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
		let unknown = entry.flags.unknown();
		if unknown != 0 {
			if options.strict {
				return Err(AssetError::format(
					AssetKind::Entity,
					format!("hierarchy entry {i} has unknown flags 0x{unknown:02X}"),
				));
			}
			log::error!("Hierarchy entry {i} has unknown flags 0x{unknown:02X}");
		}
		entries.push(entry);
	}
	Ok(entries)
}

/// A bone with its rest position relative to the parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bone {
	/// Rest position in meters (Y up), relative to the parent
	pub position: Vec3,
	/// Parent bone
	pub parent: Option<usize>,
}

/// A bone tree
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Skeleton {
	bones: Vec<Bone>,
}

impl Skeleton {
	/// Reads `count` bone records as unparented bones.
	pub fn read_bones(data: &[u8], ofs: usize, count: usize) -> Result<Self, AssetError> {
		let kind = AssetKind::Entity;
		let mut bones = Vec::with_capacity(count);
		for i in 0..count {
			let base = ofs + i * BONE_SIZE;
			let x = raw::read_i16(data, base, kind)?;
			let y = raw::read_i16(data, base + 2, kind)?;
			let z = raw::read_i16(data, base + 4, kind)?;
			bones.push(Bone {
				position: to_world([f32::from(x), f32::from(y), f32::from(z)], MODEL_SCALE),
				parent: None,
			});
		}
		Ok(Self {
			bones,
		})
	}

	/// Creates a skeleton from explicit bones.
	pub fn from_bones(bones: Vec<Bone>) -> Self {
		Self {
			bones,
		}
	}

	/// Bones in file order
	pub fn bones(&self) -> &[Bone] {
		&self.bones
	}

	/// Number of bones
	pub fn len(&self) -> usize {
		self.bones.len()
	}

	/// Returns `true` if there are no bones.
	pub fn is_empty(&self) -> bool {
		self.bones.is_empty()
	}

	/// Returns `true` if `ancestor` is `bone` or one of its ancestors.
	fn is_ancestor(&self, ancestor: usize, bone: usize) -> bool {
		let mut current = Some(bone);
		let mut steps = 0;
		while let Some(index) = current {
			if index == ancestor {
				return true;
			}
			steps += 1;
			if steps > self.bones.len() {
				return false;
			}
			current = self.bones.get(index).and_then(|b| b.parent);
		}
		false
	}

	/// Attaches bones to their parents following the hierarchy.
	///
	/// A bone is attached on its first appearance only, and only when both
	/// bones exist. Links that would close a cycle are skipped.
	pub fn link(&mut self, hierarchy: &[HierarchyEntry]) {
		for entry in hierarchy {
			let bone = usize::from(entry.bone);
			let Some(parent) = entry.parent_bone() else {
				continue;
			};
			if bone >= self.bones.len() || parent >= self.bones.len() || self.bones[bone].parent.is_some() {
				continue;
			}
			if self.is_ancestor(bone, parent) {
				log::warn!("Skipping bone {bone} -> {parent}: would create a cycle");
				continue;
			}
			self.bones[bone].parent = Some(parent);
		}
	}

	/// World transform of a bone at rest.
	pub fn world_matrix(&self, bone: usize) -> Option<Mat4> {
		let mut matrix = Mat4::from_translation(self.bones.get(bone)?.position);
		let mut current = self.bones[bone].parent;
		let mut steps = 0;
		while let Some(index) = current {
			steps += 1;
			if steps > self.bones.len() {
				break;
			}
			let parent = self.bones.get(index)?;
			matrix = Mat4::from_translation(parent.position) * matrix;
			current = parent.parent;
		}
		Some(matrix)
	}

	/// World transforms of every bone.
	pub fn world_matrices(&self) -> Vec<Mat4> {
		(0..self.bones.len()).filter_map(|i| self.world_matrix(i)).collect()
	}
}
